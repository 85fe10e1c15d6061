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

use super::load_graph;
use anyhow::Result;
use clap::Args;
use dotflow_core::{AnalysisReport, CycleDetector, Graph};
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AnalyseArgs {
    /// Graph description (.json or .toml)
    pub graph: PathBuf,
}

/// Runs consistency, liveness and period safety on a graph description
pub fn run_analyse(args: &AnalyseArgs) -> Result<String> {
    let mut graph = load_graph(&args.graph)?;
    let report = graph.analyse()?;
    Ok(render_report(&graph, report))
}

fn verdict(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn render_report(graph: &Graph, report: AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Actors: {}, edges: {}", graph.actor_count(), graph.edge_count());
    let _ = writeln!(out, "Consistent: {}", verdict(report.consistent));
    if let Some(vector) = graph.vector() {
        for (actor, count) in vector {
            let _ = writeln!(out, "  #{actor} = {count}");
        }
    }
    if !report.consistent {
        return out;
    }

    let cycles = CycleDetector::new(graph).cycles();
    let _ = writeln!(out, "Cycles: {}", cycles.len());
    for cycle in &cycles {
        let names: Vec<&str> = cycle.actors.iter().map(|actor| graph.actor(*actor).name()).collect();
        let _ = writeln!(out, "  {}", names.join(" -> "));
    }
    let _ = writeln!(out, "Live: {}", verdict(report.live));
    if let Some(schedule) = graph.live_schedule() {
        let _ = writeln!(out, "  witness: {}", schedule.compact());
    }
    if !report.live {
        return out;
    }

    let _ = writeln!(out, "Period-safe: {}", verdict(report.safe));
    for (_, actor) in graph.actors() {
        for (parameter, period) in actor.reading_periods() {
            let _ = writeln!(out, "  {} reads {parameter} every {period}", actor.name());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotflow_core::GraphDescription;

    fn report_for(json: &str) -> String {
        let mut graph = GraphDescription::from_json_str(json).unwrap().build().unwrap();
        let report = graph.analyse().unwrap();
        render_report(&graph, report)
    }

    #[test]
    fn test_report_lists_vector_and_cycles() {
        let out = report_for(
            r#"{
                "actors": [{"name": "A"}, {"name": "B"}],
                "edges": [
                    {"producer": "A", "producer_rate": "2", "consumer": "B", "consumer_rate": "1"},
                    {"producer": "B", "producer_rate": "1", "consumer": "A", "consumer_rate": "2", "initial_tokens": "2"}
                ]
            }"#,
        );
        assert!(out.contains("Consistent: yes"), "unexpected report:\n{out}");
        assert!(out.contains("#B = 2"), "unexpected report:\n{out}");
        assert!(out.contains("Cycles: 1"), "unexpected report:\n{out}");
        assert!(out.contains("Period-safe: yes"), "unexpected report:\n{out}");
    }

    #[test]
    fn test_report_stops_at_first_failure() {
        let out = report_for(
            r#"{
                "actors": [{"name": "A"}],
                "edges": [{"producer": "A", "producer_rate": "2", "consumer": "A", "consumer_rate": "1"}]
            }"#,
        );
        assert!(out.contains("Consistent: no"));
        assert!(!out.contains("Live:"));
    }
}
