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

//! Dataflow graph model
//!
//! Holds the topology (actors, edges, modifier registry) and the results of
//! the analyses. Topology is fixed once loaded; analyses only write the
//! repetition vector, reading periods and verification flags.

use crate::analysis::AnalysisReport;
use crate::error::GraphError;
use crate::schedule::Schedule;
use dotflow_symbol::{Expression, Product};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub mod actor;
pub mod cycles;
pub mod edge;

pub use actor::Actor;
pub use cycles::{Cycle, CycleDetector};
pub use edge::{Edge, EdgeSpec};

/// Stable actor handle, the insertion index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub(crate) usize);

impl ActorId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable edge handle, the insertion index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) actors: Vec<Actor>,

    pub(crate) edges: Vec<Edge>,

    /// Actor name to handle
    names: HashMap<String, ActorId>,

    /// Boolean parameter to its single modifier
    pub(crate) modifiers: BTreeMap<String, ActorId>,

    /// Integral firing count per actor, set by consistency analysis
    pub(crate) vector: Option<Vec<Product>>,

    pub(crate) consistent: Option<bool>,

    pub(crate) live: Option<bool>,

    pub(crate) safe: Option<bool>,

    /// Firing sequence found by the parametric liveness simulation
    pub(crate) live_schedule: Option<Schedule>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an actor and registers it as modifier of its parameters
    pub fn add_actor(&mut self, actor: Actor) -> Result<ActorId, GraphError> {
        if self.names.contains_key(&actor.name) {
            return Err(GraphError::DuplicateActor(actor.name));
        }
        if let Some((parameter, owner)) = actor.modifies.keys().find_map(|parameter| self.modifiers.get(parameter).map(|owner| (parameter, *owner))) {
            return Err(GraphError::DuplicateModifier {
                parameter: parameter.clone(),
                owner: self.actors[owner.0].name.clone(),
                actor: actor.name,
            });
        }

        let id = ActorId(self.actors.len());
        for parameter in actor.modifies.keys() {
            self.modifiers.insert(parameter.clone(), id);
        }
        self.names.insert(actor.name.clone(), id);
        self.actors.push(actor);
        self.invalidate();
        Ok(id)
    }

    /// Connects two existing actors
    pub fn add_edge(&mut self, spec: EdgeSpec) -> Result<EdgeId, GraphError> {
        let producer = self.actor_id(&spec.producer).ok_or_else(|| GraphError::UnknownActor(spec.producer.clone()))?;
        let consumer = self.actor_id(&spec.consumer).ok_or_else(|| GraphError::UnknownActor(spec.consumer.clone()))?;

        let id = EdgeId(self.edges.len());
        self.edges.push(Edge {
            producer,
            consumer,
            rate_in: spec.rate_in,
            rate_out: spec.rate_out,
            tokens: spec.tokens,
            guard: spec.guard,
        });
        self.actors[producer.0].outgoing.push(id);
        self.actors[consumer.0].incoming.push(id);
        self.invalidate();
        Ok(id)
    }

    /// Drops analysis results after a topology change
    fn invalidate(&mut self) {
        self.vector = None;
        self.consistent = None;
        self.live = None;
        self.safe = None;
        self.live_schedule = None;
        for actor in &mut self.actors {
            actor.reading_periods.clear();
        }
    }

    pub fn actor_id(&self, name: &str) -> Option<ActorId> {
        self.names.get(name).copied()
    }

    pub fn actor(&self, id: ActorId) -> &Actor {
        &self.actors[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub fn actors(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.actors.iter().enumerate().map(|(index, actor)| (ActorId(index), actor))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().enumerate().map(|(index, edge)| (EdgeId(index), edge))
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn modifiers(&self) -> &BTreeMap<String, ActorId> {
        &self.modifiers
    }

    pub fn modifier_of(&self, parameter: &str) -> Option<ActorId> {
        self.modifiers.get(parameter).copied()
    }

    /// Actors that modify `parameter` or own an edge guarded by it
    pub fn users(&self, parameter: &str) -> Vec<ActorId> {
        self.actors()
            .filter(|(_, actor)| {
                actor.modifies.contains_key(parameter)
                    || actor
                        .incoming
                        .iter()
                        .chain(actor.outgoing.iter())
                        .any(|edge| self.edges[edge.0].guard.as_ref().is_some_and(|guard| guard.mentions(parameter)))
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Boolean parameters read by some guard
    pub fn guard_parameters(&self) -> Vec<String> {
        let mut parameters: Vec<String> = self.edges.iter().filter_map(|edge| edge.guard.as_ref()).flat_map(|guard| guard.parameters()).collect();
        parameters.sort();
        parameters.dedup();
        parameters
    }

    /// Repetition count of an actor once consistency is known
    pub fn repetitions(&self, id: ActorId) -> Option<&Product> {
        self.vector.as_ref().and_then(|vector| vector.get(id.0))
    }

    /// Actor name to repetition count
    pub fn vector(&self) -> Option<BTreeMap<String, Expression>> {
        let vector = self.vector.as_ref()?;
        Some(self.actors.iter().zip(vector).map(|(actor, count)| (actor.name.clone(), Expression::from(count.clone()))).collect())
    }

    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            consistent: self.consistent.unwrap_or(false),
            live: self.live.unwrap_or(false),
            safe: self.safe.unwrap_or(false),
        }
    }

    pub fn is_verified(&self) -> bool {
        self.report().is_verified()
    }

    /// Witness schedule of the parametric liveness simulation, when it ran
    pub fn live_schedule(&self) -> Option<&Schedule> {
        self.live_schedule.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Graph {
        let mut graph = Graph::new();
        graph.add_actor(Actor::new("A").with_modifier("a", Product::new(1))).unwrap();
        graph.add_actor(Actor::new("B")).unwrap();
        graph.add_actor(Actor::new("C")).unwrap();
        graph.add_edge(EdgeSpec::new("A", "1", "B", "1").unwrap().with_guard("a").unwrap()).unwrap();
        graph.add_edge(EdgeSpec::new("B", "1", "C", "1").unwrap()).unwrap();
        graph
    }

    #[test]
    fn test_edges_are_wired_to_actors() {
        let graph = chain();
        let b = graph.actor_id("B").unwrap();
        assert_eq!(graph.actor(b).incoming().len(), 1);
        assert_eq!(graph.actor(b).outgoing().len(), 1);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_unknown_endpoint_is_rejected() {
        let mut graph = chain();
        let result = graph.add_edge(EdgeSpec::new("A", "1", "Z", "1").unwrap());
        assert!(matches!(result, Err(GraphError::UnknownActor(name)) if name == "Z"));
    }

    #[test]
    fn test_duplicate_modifier_is_rejected() {
        let mut graph = chain();
        let result = graph.add_actor(Actor::new("D").with_modifier("a", Product::new(2)));
        assert!(matches!(result, Err(GraphError::DuplicateModifier { ref owner, .. }) if owner == "A"));
        assert!(matches!(graph.add_actor(Actor::new("A")), Err(GraphError::DuplicateActor(_))));
    }

    #[test]
    fn test_users_include_modifier_and_guarded_edges() {
        let graph = chain();
        let users: Vec<&str> = graph.users("a").into_iter().map(|id| graph.actor(id).name()).collect();
        assert_eq!(users, vec!["A", "B"]);
        assert_eq!(graph.guard_parameters(), vec!["a".to_string()]);
        assert_eq!(graph.modifier_of("a"), graph.actor_id("A"));
    }

    #[test]
    fn test_unanalysed_graph_is_not_verified() {
        let graph = chain();
        assert!(graph.vector().is_none());
        assert!(!graph.is_verified());
    }
}
