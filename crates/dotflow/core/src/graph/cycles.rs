// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Elementary cycle enumeration
//!
//! Strongly connected components are found with Tarjan's algorithm, then
//! Johnson's circuit search lists every elementary cycle inside each
//! component exactly once, starting from its lowest actor.

use super::{ActorId, EdgeId, Graph};
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, HashSet};

/// One elementary cycle, viewed through the parent graph's handles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Actors in path order, starting from the lowest handle
    pub actors: Vec<ActorId>,

    /// Edges along the circuit, hop by hop, parallel edges included
    pub edges: Vec<EdgeId>,
}

impl Cycle {
    pub fn contains(&self, actor: ActorId) -> bool {
        self.actors.contains(&actor)
    }

    /// Edges of each hop `actors[k] -> actors[k + 1]`, closing back to the first actor
    pub fn hops<'c>(&'c self, graph: &'c Graph) -> impl Iterator<Item = Vec<EdgeId>> + 'c {
        (0..self.actors.len()).map(move |k| {
            let (from, to) = (self.actors[k], self.actors[(k + 1) % self.actors.len()]);
            self.edges.iter().copied().filter(|id| graph.edge(*id).producer == from && graph.edge(*id).consumer == to).collect()
        })
    }
}

pub struct CycleDetector<'g> {
    graph: &'g Graph,

    /// Actor topology mirrored into petgraph
    topology: DiGraph<ActorId, EdgeId>,
}

impl<'g> CycleDetector<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let mut topology = DiGraph::with_capacity(graph.actor_count(), graph.edge_count());
        let nodes: Vec<NodeIndex> = graph.actors().map(|(id, _)| topology.add_node(id)).collect();
        for (id, edge) in graph.edges() {
            topology.add_edge(nodes[edge.producer.index()], nodes[edge.consumer.index()], id);
        }
        Self { graph, topology }
    }

    pub fn cycles(&self) -> Vec<Cycle> {
        let mut circuits = Vec::new();
        for mut component in tarjan_scc(&self.topology) {
            if component.len() == 1 && self.topology.find_edge(component[0], component[0]).is_none() {
                continue;
            }
            component.sort();
            for (position, &start) in component.iter().enumerate() {
                let mut search = CircuitSearch {
                    topology: &self.topology,
                    start,
                    allowed: component[position..].iter().copied().collect(),
                    blocked: HashSet::new(),
                    blocked_by: HashMap::new(),
                    path: Vec::new(),
                    found: Vec::new(),
                };
                search.circuit(start);
                circuits.extend(search.found);
            }
        }
        circuits.into_iter().map(|path| self.to_cycle(&path)).collect()
    }

    fn to_cycle(&self, path: &[NodeIndex]) -> Cycle {
        let actors: Vec<ActorId> = path.iter().map(|node| self.topology[*node]).collect();
        let mut edges = Vec::new();
        for (k, &from) in actors.iter().enumerate() {
            let to = actors[(k + 1) % actors.len()];
            edges.extend(self.graph.edges().filter(|(_, edge)| edge.producer == from && edge.consumer == to).map(|(id, _)| id));
        }
        Cycle { actors, edges }
    }
}

struct CircuitSearch<'t> {
    topology: &'t DiGraph<ActorId, EdgeId>,
    start: NodeIndex,
    allowed: HashSet<NodeIndex>,
    blocked: HashSet<NodeIndex>,
    blocked_by: HashMap<NodeIndex, HashSet<NodeIndex>>,
    path: Vec<NodeIndex>,
    found: Vec<Vec<NodeIndex>>,
}

impl CircuitSearch<'_> {
    fn successors(&self, node: NodeIndex) -> BTreeSet<NodeIndex> {
        self.topology.neighbors_directed(node, Direction::Outgoing).filter(|next| self.allowed.contains(next)).collect()
    }

    fn circuit(&mut self, node: NodeIndex) -> bool {
        let mut closed = false;
        self.path.push(node);
        self.blocked.insert(node);

        let successors = self.successors(node);
        for &next in &successors {
            if next == self.start {
                self.found.push(self.path.clone());
                closed = true;
            } else if !self.blocked.contains(&next) && self.circuit(next) {
                closed = true;
            }
        }

        if closed {
            self.unblock(node);
        } else {
            for next in successors {
                self.blocked_by.entry(next).or_default().insert(node);
            }
        }
        self.path.pop();
        closed
    }

    fn unblock(&mut self, node: NodeIndex) {
        self.blocked.remove(&node);
        if let Some(waiting) = self.blocked_by.remove(&node) {
            for other in waiting {
                if self.blocked.contains(&other) {
                    self.unblock(other);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Actor, EdgeSpec};

    fn graph(actors: &[&str], edges: &[(&str, &str)]) -> Graph {
        let mut graph = Graph::new();
        for name in actors {
            graph.add_actor(Actor::new(*name)).unwrap();
        }
        for (producer, consumer) in edges {
            graph.add_edge(EdgeSpec::new(*producer, "1", *consumer, "1").unwrap()).unwrap();
        }
        graph
    }

    fn names(graph: &Graph, cycle: &Cycle) -> Vec<String> {
        cycle.actors.iter().map(|id| graph.actor(*id).name().to_string()).collect()
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let graph = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("A", "C")]);
        assert!(CycleDetector::new(&graph).cycles().is_empty());
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let graph = graph(&["A", "B"], &[("A", "A"), ("A", "B")]);
        let cycles = CycleDetector::new(&graph).cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(names(&graph, &cycles[0]), vec!["A"]);
        assert_eq!(cycles[0].edges, vec![EdgeId(0)]);
    }

    #[test]
    fn test_overlapping_cycles_are_all_found() {
        // A -> B -> A and A -> B -> C -> A share the edge A -> B.
        let graph = graph(&["A", "B", "C"], &[("A", "B"), ("B", "A"), ("B", "C"), ("C", "A")]);
        let mut found: Vec<Vec<String>> = CycleDetector::new(&graph).cycles().iter().map(|cycle| names(&graph, cycle)).collect();
        found.sort();
        assert_eq!(found, vec![vec!["A", "B"], vec!["A", "B", "C"]]);
    }

    #[test]
    fn test_nested_components() {
        // Two cycles joined by a one-way bridge, plus a triangle with both orientations.
        let graph = graph(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("B", "A"), ("B", "C"), ("C", "D"), ("D", "E"), ("E", "C"), ("C", "E"), ("E", "D")],
        );
        let cycles = CycleDetector::new(&graph).cycles();
        let mut found: Vec<Vec<String>> = cycles.iter().map(|cycle| names(&graph, cycle)).collect();
        found.sort();
        assert_eq!(found, vec![vec!["A", "B"], vec!["C", "D", "E"], vec!["C", "E"], vec!["D", "E"]]);
    }

    #[test]
    fn test_cycle_edges_include_parallel_edges() {
        let graph = graph(&["A", "B"], &[("A", "B"), ("A", "B"), ("B", "A")]);
        let cycles = CycleDetector::new(&graph).cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].edges.len(), 3);
    }

    #[test]
    fn test_chords_are_not_cycle_edges() {
        // C -> E shortcuts the triangle C -> D -> E -> C without closing a circuit.
        let graph = graph(&["C", "D", "E"], &[("C", "D"), ("D", "E"), ("E", "C"), ("C", "E")]);
        let cycles = CycleDetector::new(&graph).cycles();
        let triangle = cycles.iter().find(|cycle| cycle.actors.len() == 3).unwrap();
        assert_eq!(triangle.edges, vec![EdgeId(0), EdgeId(1), EdgeId(2)]);

        let hops: Vec<Vec<EdgeId>> = triangle.hops(&graph).collect();
        assert_eq!(hops, vec![vec![EdgeId(0)], vec![EdgeId(1)], vec![EdgeId(2)]]);
    }
}
