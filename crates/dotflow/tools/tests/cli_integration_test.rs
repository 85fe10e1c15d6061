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

use dotflow_core::SchedulingStrategy;
use dotflow_tools::cli::analyse::{AnalyseArgs, run_analyse};
use dotflow_tools::cli::schedule::{ScheduleArgs, parse_user_constraint, run_schedule};
use dotflow_tools::ToolsConfig;
use std::path::PathBuf;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../demos").join(name)
}

fn schedule_args(graph: &str) -> ScheduleArgs {
    ScheduleArgs {
        graph: demo(graph),
        ints: Vec::new(),
        bools: Vec::new(),
        strategy: None,
        seed: Some(1),
        runs: 1,
        trace: false,
        constraints: Vec::new(),
    }
}

#[test]
fn test_analyse_demo_pipeline() {
    let out = run_analyse(&AnalyseArgs { graph: demo("pipeline.toml") }).unwrap();
    assert!(out.contains("Consistent: yes"), "unexpected report:\n{out}");
    assert!(out.contains("#F = p"), "unexpected report:\n{out}");
    assert!(out.contains("Cycles: 0"), "unexpected report:\n{out}");
    assert!(out.contains("Period-safe: yes"), "unexpected report:\n{out}");
    assert!(out.contains("K reads w every p"), "unexpected report:\n{out}");
}

#[test]
fn test_schedule_demo_ring_traced() {
    let mut args = schedule_args("ring.json");
    args.trace = true;
    args.runs = 2;
    let out = run_schedule(&args, &ToolsConfig::default()).unwrap();
    assert!(out.contains("Strategy: slotted"), "unexpected output:\n{out}");
    assert!(out.contains("Run 1: total time 3"), "unexpected output:\n{out}");
    assert!(out.contains("Run 2: total time 3"), "unexpected output:\n{out}");
    assert!(out.contains("slot 1: A"), "unexpected output:\n{out}");
}

#[test]
fn test_schedule_demo_pipeline_with_bindings() {
    let mut args = schedule_args("pipeline.toml");
    args.ints = vec![("p".to_string(), 3)];
    args.bools = vec![("w".to_string(), "1".to_string())];
    args.strategy = Some(SchedulingStrategy::NonSlotted);
    args.trace = true;
    let out = run_schedule(&args, &ToolsConfig::default()).unwrap();
    assert!(out.contains("Strategy: non-slotted"), "unexpected output:\n{out}");
    assert!(out.contains("slot 1: S"), "unexpected output:\n{out}");
    assert!(out.contains("K[i] >= F["), "constraints should be listed:\n{out}");
}

#[test]
fn test_schedule_requires_bindings() {
    let args = schedule_args("pipeline.toml");
    let err = run_schedule(&args, &ToolsConfig::default()).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to set up scheduler"), "unexpected error: {err:#}");
}

#[test]
fn test_schedule_rejects_unknown_constraint_actor() {
    let mut args = schedule_args("ring.json");
    args.constraints = vec![parse_user_constraint("Z:A:i").unwrap()];
    assert!(run_schedule(&args, &ToolsConfig::default()).is_err());
}

#[test]
fn test_demo_config_loads() {
    let config = ToolsConfig::load_from_file(demo("dotflow.toml")).unwrap();
    assert_eq!(config.scheduler.strategy, SchedulingStrategy::NonSlotted);
    assert_eq!(config.scheduler.seed, Some(42));
}
