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

use super::EdgeId;
use dotflow_symbol::Product;
use std::collections::BTreeMap;

/// Firing time used when no timing is declared
pub const DEFAULT_EXECUTION_TIME: u64 = 1;

/// Dataflow node
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    /// Unique name within the graph
    pub(crate) name: String,

    /// Edges consumed from, in insertion order
    pub(crate) incoming: Vec<EdgeId>,

    /// Edges produced on, in insertion order
    pub(crate) outgoing: Vec<EdgeId>,

    /// Boolean parameters this actor changes, with their modification period
    pub(crate) modifies: BTreeMap<String, Product>,

    /// Firing interval at which a new value of each read parameter is seen
    pub(crate) reading_periods: BTreeMap<String, Product>,

    pub(crate) execution_time: u64,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            incoming: Vec::new(),
            outgoing: Vec::new(),
            modifies: BTreeMap::new(),
            reading_periods: BTreeMap::new(),
            execution_time: DEFAULT_EXECUTION_TIME,
        }
    }

    /// Declares this actor as the modifier of `parameter`
    pub fn with_modifier(mut self, parameter: impl Into<String>, period: Product) -> Self {
        self.modifies.insert(parameter.into(), period);
        self
    }

    pub fn with_execution_time(mut self, execution_time: u64) -> Self {
        self.execution_time = execution_time;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    pub fn modifies(&self) -> &BTreeMap<String, Product> {
        &self.modifies
    }

    pub fn is_modifier(&self) -> bool {
        !self.modifies.is_empty()
    }

    pub fn reading_periods(&self) -> &BTreeMap<String, Product> {
        &self.reading_periods
    }

    pub fn reading_period(&self, parameter: &str) -> Option<&Product> {
        self.reading_periods.get(parameter)
    }

    pub fn execution_time(&self) -> u64 {
        self.execution_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_records_modifiers() {
        let actor = Actor::new("M").with_modifier("a", Product::new(2)).with_execution_time(4);
        assert!(actor.is_modifier());
        assert_eq!(actor.modifies().get("a"), Some(&Product::new(2)));
        assert_eq!(actor.execution_time(), 4);
        assert_eq!(Actor::new("U").execution_time(), DEFAULT_EXECUTION_TIME);
    }
}
