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

//! Serializable graph descriptions
//!
//! A description lists actors, edges, modifier declarations and execution
//! times as plain records. Rates, periods and token counts use the product
//! grammar and guards the boolean grammar, both parsed when the graph is built.

use crate::error::GraphError;
use crate::graph::{Actor, EdgeSpec, Graph};
use dotflow_symbol::Product;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRecord {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub producer: String,

    pub producer_rate: String,

    pub consumer: String,

    pub consumer_rate: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,

    #[serde(default = "no_tokens")]
    pub initial_tokens: String,
}

fn no_tokens() -> String {
    "0".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierRecord {
    pub actor: String,

    pub parameter: String,

    /// Firings between two writes of the parameter
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingRecord {
    pub actor: String,

    pub execution_time: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphDescription {
    pub actors: Vec<ActorRecord>,

    pub edges: Vec<EdgeRecord>,

    pub modifiers: Vec<ModifierRecord>,

    pub timings: Vec<TimingRecord>,
}

impl GraphDescription {
    pub fn from_json_str(content: &str) -> Result<Self, GraphError> {
        serde_json::from_str(content).map_err(|e| GraphError::Description(format!("invalid JSON: {e}")))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, GraphError> {
        toml::from_str(content).map_err(|e| GraphError::Description(format!("invalid TOML: {e}")))
    }

    /// Loads a `.json` or `.toml` description
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| GraphError::Description(format!("cannot read {}: {e}", path.display())))?;
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(GraphError::Description(format!("unsupported description format: {}", path.display()))),
        }
    }

    pub fn to_json_string(&self) -> Result<String, GraphError> {
        serde_json::to_string_pretty(self).map_err(|e| GraphError::Description(e.to_string()))
    }

    /// Builds the graph, attaching modifiers and timings to their actors
    pub fn build(&self) -> Result<Graph, GraphError> {
        let names: BTreeSet<&str> = self.actors.iter().map(|actor| actor.name.as_str()).collect();
        let referenced = self.modifiers.iter().map(|record| &record.actor).chain(self.timings.iter().map(|record| &record.actor));
        for name in referenced {
            if !names.contains(name.as_str()) {
                return Err(GraphError::UnknownActor(name.clone()));
            }
        }

        let mut graph = Graph::new();
        for record in &self.actors {
            let mut actor = Actor::new(&record.name);
            for modifier in self.modifiers.iter().filter(|modifier| modifier.actor == record.name) {
                actor = actor.with_modifier(&modifier.parameter, modifier.period.parse::<Product>()?);
            }
            if let Some(timing) = self.timings.iter().rev().find(|timing| timing.actor == record.name) {
                actor = actor.with_execution_time(timing.execution_time);
            }
            graph.add_actor(actor)?;
        }

        for record in &self.edges {
            let mut spec = EdgeSpec::new(&record.producer, &record.producer_rate, &record.consumer, &record.consumer_rate)?.with_tokens(&record.initial_tokens)?;
            if let Some(guard) = &record.guard {
                spec = spec.with_guard(guard)?;
            }
            graph.add_edge(spec)?;
        }

        debug!(actors = graph.actor_count(), edges = graph.edge_count(), "Graph built from description");
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
        actors = [{ name = "A" }, { name = "B" }]
        modifiers = [{ actor = "A", parameter = "a", period = "1" }]
        timings = [{ actor = "B", execution_time = 4 }]

        [[edges]]
        producer = "A"
        producer_rate = "2"
        consumer = "B"
        consumer_rate = "p"
        guard = "a | !a"
    "#;

    #[test]
    fn test_toml_description_builds_graph() {
        let graph = GraphDescription::from_toml_str(TOML).unwrap().build().unwrap();
        let a = graph.actor_id("A").unwrap();
        let b = graph.actor_id("B").unwrap();
        assert!(graph.actor(a).is_modifier());
        assert_eq!(graph.actor(b).execution_time(), 4);

        let (_, edge) = graph.edges().next().unwrap();
        assert!(edge.tokens().is_zero());
        assert_eq!(edge.rate_out(), &Product::parameter("p"));
        assert!(edge.guard().unwrap().mentions("a"));
    }

    #[test]
    fn test_json_round_trip_preserves_records() {
        let description = GraphDescription::from_toml_str(TOML).unwrap();
        let json = description.to_json_string().unwrap();
        assert_eq!(GraphDescription::from_json_str(&json).unwrap(), description);
    }

    #[test]
    fn test_unknown_actor_in_records() {
        let description = GraphDescription {
            actors: vec![ActorRecord { name: "A".to_string() }],
            timings: vec![TimingRecord {
                actor: "Z".to_string(),
                execution_time: 2,
            }],
            ..Default::default()
        };
        assert!(matches!(description.build(), Err(GraphError::UnknownActor(name)) if name == "Z"));
    }

    #[test]
    fn test_bad_input_is_a_description_error() {
        assert!(matches!(GraphDescription::from_json_str("{"), Err(GraphError::Description(_))));
        assert!(matches!(GraphDescription::from_path("graph.yaml"), Err(GraphError::Description(_))));
    }
}
