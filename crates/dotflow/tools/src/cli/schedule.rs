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
use crate::config::ToolsConfig;
use anyhow::{Context, Result, bail};
use clap::Args;
use dotflow_core::{Scheduler, SchedulingStrategy, UserConstraint};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Graph description (.json or .toml)
    pub graph: PathBuf,

    /// Integer parameter value, as NAME=VALUE
    #[arg(long = "int", value_name = "NAME=VALUE", value_parser = parse_int_binding)]
    pub ints: Vec<(String, i64)>,

    /// Boolean value sequence over 0, 1 and *, as NAME=SEQUENCE
    #[arg(long = "bool", value_name = "NAME=SEQUENCE", value_parser = parse_bool_binding)]
    pub bools: Vec<(String, String)>,

    /// Overrides the configured strategy
    #[arg(long)]
    pub strategy: Option<SchedulingStrategy>,

    /// Overrides the configured random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of iterations to run
    #[arg(long, default_value_t = 1)]
    pub runs: u32,

    /// Print constraints, slots and firings of every run
    #[arg(long)]
    pub trace: bool,

    /// Extra constraint, as DEPENDENT:DEPENDENCY:REQUIREMENT[:GUARD[:SHIFT]]
    #[arg(long = "constraint", value_name = "SPEC", value_parser = parse_user_constraint)]
    pub constraints: Vec<UserConstraint>,
}

fn split_binding(text: &str) -> Result<(String, String), String> {
    match text.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.trim().to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{text}'")),
    }
}

pub fn parse_int_binding(text: &str) -> Result<(String, i64), String> {
    let (name, value) = split_binding(text)?;
    let value = value.parse::<i64>().map_err(|e| format!("invalid value for {name}: {e}"))?;
    Ok((name, value))
}

pub fn parse_bool_binding(text: &str) -> Result<(String, String), String> {
    split_binding(text)
}

pub fn parse_user_constraint(text: &str) -> Result<UserConstraint, String> {
    let parts: Vec<&str> = text.split(':').map(str::trim).collect();
    if !(3..=5).contains(&parts.len()) {
        return Err(format!("expected DEPENDENT:DEPENDENCY:REQUIREMENT[:GUARD[:SHIFT]], got '{text}'"));
    }
    let mut constraint = UserConstraint::new(parts[0], parts[1], parts[2]).map_err(|e| e.to_string())?;
    if let Some(guard) = parts.get(3).filter(|guard| !guard.is_empty()) {
        constraint = constraint.with_guard(guard).map_err(|e| e.to_string())?;
    }
    if let Some(shift) = parts.get(4) {
        let shift = shift.parse::<i64>().map_err(|e| format!("invalid shift '{shift}': {e}"))?;
        constraint = constraint.with_shift(shift);
    }
    Ok(constraint)
}

/// Analyses the graph, then runs it under the configured scheduler
pub fn run_schedule(args: &ScheduleArgs, config: &ToolsConfig) -> Result<String> {
    let mut graph = load_graph(&args.graph)?;
    let report = graph.analyse()?;
    if !report.is_verified() {
        bail!("Graph {} cannot be scheduled: consistent={}, live={}, safe={}", args.graph.display(), report.consistent, report.live, report.safe);
    }

    let mut scheduler_config = config.scheduler.clone();
    if let Some(strategy) = args.strategy {
        scheduler_config = scheduler_config.with_strategy(strategy);
    }
    if let Some(seed) = args.seed {
        scheduler_config = scheduler_config.with_seed(seed);
    }

    let ints: BTreeMap<String, i64> = args.ints.iter().cloned().collect();
    let bools: BTreeMap<String, String> = args.bools.iter().cloned().collect();
    let mut scheduler = Scheduler::with_config(&graph, &ints, &bools, scheduler_config).context("Failed to set up scheduler")?;
    for constraint in &args.constraints {
        scheduler.add_constraint(constraint.clone()).with_context(|| format!("Failed to add constraint on {}", constraint.dependent))?;
    }

    let mut out = String::new();
    let _ = writeln!(out, "Strategy: {}", scheduler.config().strategy);
    if args.trace {
        let _ = writeln!(out, "Constraints:");
        for constraint in scheduler.constraints() {
            let _ = writeln!(out, "  {}", constraint.describe(&graph));
        }
    }

    for run in 1..=args.runs {
        let execution = scheduler.execute().with_context(|| format!("Run {run} failed"))?;
        info!(run, total_time = execution.total_time, "Run finished");
        let _ = writeln!(out, "Run {run}: total time {}", execution.total_time);
        if args.trace {
            for (slot, actors) in execution.slots.iter().enumerate() {
                let _ = writeln!(out, "  slot {}: {}", slot + 1, actors.join(" "));
            }
            let _ = writeln!(out, "  firings: {}", execution.schedule.compact());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bindings() {
        assert_eq!(parse_int_binding("p=3"), Ok(("p".to_string(), 3)));
        assert_eq!(parse_int_binding(" q = -2 "), Ok(("q".to_string(), -2)));
        assert!(parse_int_binding("p").is_err());
        assert!(parse_int_binding("=3").is_err());
        assert!(parse_int_binding("p=three").is_err());
        assert_eq!(parse_bool_binding("w=01*"), Ok(("w".to_string(), "01*".to_string())));
    }

    #[test]
    fn test_parse_user_constraint() {
        let constraint = parse_user_constraint("B:A:2*i").unwrap();
        assert_eq!(constraint.dependent, "B");
        assert_eq!(constraint.dependency, "A");
        assert!(constraint.guard.is_none());
        assert_eq!(constraint.shift, 0);

        let guarded = parse_user_constraint("B:A:i:w & !v:-1").unwrap();
        assert!(guarded.guard.is_some());
        assert_eq!(guarded.shift, -1);

        let shifted = parse_user_constraint("B:A:i::2").unwrap();
        assert!(shifted.guard.is_none());
        assert_eq!(shifted.shift, 2);
    }

    #[test]
    fn test_parse_user_constraint_errors() {
        assert!(parse_user_constraint("B:A").is_err());
        assert!(parse_user_constraint("B:A:i:w:x").is_err());
        assert!(parse_user_constraint("B:A:i:w:1:extra").is_err());
    }
}
