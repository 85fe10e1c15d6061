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

use crate::error::GraphError;
use crate::graph::Graph;
use dotflow_symbol::{Equation, Product, Solution, SystemSolver};
use tracing::{debug, warn};

impl Graph {
    /// Solves one balance equation per edge for the repetition vector
    pub fn check_consistency(&mut self) -> Result<bool, GraphError> {
        let unknowns = self.actors.iter().map(|actor| actor.name.clone()).collect();
        let equations = self
            .edges
            .iter()
            .map(|edge| {
                Equation::new(
                    self.actors[edge.producer.index()].name.clone(),
                    edge.rate_in.clone(),
                    self.actors[edge.consumer.index()].name.clone(),
                    edge.rate_out.clone(),
                )
            })
            .collect();

        match SystemSolver::new(unknowns, equations).solve()? {
            Solution::Unique(mut values) => {
                let vector: Vec<Product> = self.actors.iter().map(|actor| values.remove(&actor.name).unwrap_or_else(Product::one)).collect();
                debug!(vector = ?vector.iter().map(ToString::to_string).collect::<Vec<_>>(), "Repetition vector solved");
                self.vector = Some(vector);
                self.consistent = Some(true);
                Ok(true)
            }
            Solution::Inconsistent { unknown, first, second } => {
                warn!(actor = %unknown, first = %first, second = %second, "Balance equations are inconsistent");
                self.vector = None;
                self.consistent = Some(false);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{Actor, EdgeSpec, Graph};
    use dotflow_symbol::Expression;

    #[test]
    fn test_two_actor_vector() {
        let mut graph = Graph::new();
        graph.add_actor(Actor::new("A")).unwrap();
        graph.add_actor(Actor::new("B")).unwrap();
        graph.add_edge(EdgeSpec::new("A", "2", "B", "1").unwrap()).unwrap();

        assert!(graph.check_consistency().unwrap());
        let vector = graph.vector().unwrap();
        assert_eq!(vector["A"], Expression::number(1));
        assert_eq!(vector["B"], Expression::number(2));
    }

    #[test]
    fn test_parametric_vector_balances_every_edge() {
        let mut graph = Graph::new();
        for name in ["A", "B", "C"] {
            graph.add_actor(Actor::new(name)).unwrap();
        }
        graph.add_edge(EdgeSpec::new("A", "p", "B", "2").unwrap()).unwrap();
        graph.add_edge(EdgeSpec::new("B", "3", "C", "q").unwrap()).unwrap();
        assert!(graph.check_consistency().unwrap());

        for (_, edge) in graph.edges() {
            let produced = Expression::from(edge.rate_in().clone()).multiply(&graph.repetitions(edge.producer()).unwrap().clone().into());
            let consumed = Expression::from(edge.rate_out().clone()).multiply(&graph.repetitions(edge.consumer()).unwrap().clone().into());
            assert!(produced.is_equal_to(&consumed).unwrap());
        }
    }

    #[test]
    fn test_self_loop_with_unequal_rates_is_inconsistent() {
        let mut graph = Graph::new();
        graph.add_actor(Actor::new("A")).unwrap();
        graph.add_edge(EdgeSpec::new("A", "2", "A", "1").unwrap()).unwrap();
        assert!(!graph.check_consistency().unwrap());
    }
}
