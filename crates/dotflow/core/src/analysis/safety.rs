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
use crate::graph::{ActorId, Graph};
use dotflow_symbol::{Expression, Product};
use tracing::{debug, warn};

impl Graph {
    /// Checks that every user reads each boolean parameter a whole number of
    /// times per modification, storing the resulting reading periods
    pub fn check_period_safety(&mut self) -> Result<bool, GraphError> {
        let vector = self.vector.clone().ok_or(GraphError::AnalysisOrder {
            analysis: "period safety",
            requires: "consistency",
        })?;

        let mut periods: Vec<(ActorId, String, Product)> = Vec::new();
        for (parameter, modifier) in &self.modifiers {
            let Some(period) = self.actor(*modifier).modifies.get(parameter) else {
                continue;
            };
            let frequency = Expression::from(vector[modifier.index()].clone()).divide(&Expression::from(period.clone()))?;
            if !frequency.is_product() {
                warn!(parameter = %parameter, frequency = %frequency, "Modification period does not divide the modifier's repetitions");
                return self.mark_safe(false);
            }

            for user in self.users(parameter) {
                let reading = Expression::from(vector[user.index()].clone()).divide(&frequency)?;
                if !reading.is_product() {
                    warn!(parameter = %parameter, actor = self.actor(user).name(), reading = %reading, "Reading period is not integral");
                    return self.mark_safe(false);
                }
                periods.push((user, parameter.clone(), reading.as_product()?));
            }
        }

        for (user, parameter, period) in periods {
            debug!(actor = self.actor(user).name(), parameter = %parameter, period = %period, "Reading period derived");
            self.actors[user.index()].reading_periods.insert(parameter, period);
        }
        self.mark_safe(true)
    }

    fn mark_safe(&mut self, safe: bool) -> Result<bool, GraphError> {
        self.safe = Some(safe);
        Ok(safe)
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{Actor, EdgeSpec, Graph};
    use dotflow_symbol::Product;

    /// `M` modifies `a` every `period` firings and guards the edge into `U`
    fn guarded(period: i64, user_rate: &str) -> Graph {
        let mut graph = Graph::new();
        graph.add_actor(Actor::new("M").with_modifier("a", Product::new(period))).unwrap();
        graph.add_actor(Actor::new("U")).unwrap();
        graph.add_edge(EdgeSpec::new("M", "1", "U", user_rate).unwrap().with_guard("a").unwrap()).unwrap();
        graph
    }

    #[test]
    fn test_exact_periods_are_stored() {
        // M fires twice and modifies every 2 firings, so U reads one value per firing.
        let mut graph = guarded(2, "2");
        graph.check_consistency().unwrap();
        assert!(graph.check_period_safety().unwrap());
        let u = graph.actor_id("U").unwrap();
        let m = graph.actor_id("M").unwrap();
        assert_eq!(graph.actor(m).reading_period("a"), Some(&Product::new(2)));
        assert_eq!(graph.actor(u).reading_period("a"), Some(&Product::one()));
    }

    #[test]
    fn test_inexact_period_is_unsafe() {
        // M fires once but claims a period of 2.
        let mut graph = guarded(2, "1");
        graph.check_consistency().unwrap();
        assert!(!graph.check_period_safety().unwrap());
        assert!(graph.actor(graph.actor_id("U").unwrap()).reading_periods().is_empty());
    }

    #[test]
    fn test_period_safety_requires_consistency() {
        let mut graph = guarded(1, "1");
        assert!(graph.check_period_safety().is_err());
    }
}
