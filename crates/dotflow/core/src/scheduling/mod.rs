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

//! Constraint-driven execution of a verified graph
//!
//! Integer parameters are fixed and boolean parameters are drawn from value
//! sequences while the graph runs one iteration under the selected strategy.

use crate::error::{GraphError, ScheduleError};
use crate::graph::{ActorId, Graph};
use crate::schedule::Schedule;
use dotflow_symbol::{Expression, Product};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use tracing::{debug, info};

pub mod config;
pub mod constraint;
pub mod sequence;
pub mod state;
pub mod strategies;

pub use config::{DEFAULT_IDLE_TIME, SchedulerConfig, SchedulingStrategy};
pub use constraint::{Constraint, ConstraintKind, FIRING_INDEX, Requirement, UserConstraint};
pub use sequence::BooleanSequence;
pub use state::SchedulingState;

/// Read-only inputs shared by the strategies
pub struct SchedulingContext<'a> {
    pub graph: &'a Graph,

    /// Parameter to its modifier and resolved modification period
    pub periods: &'a BTreeMap<String, (ActorId, u64)>,

    pub idle_time: u64,
}

/// Outcome of one scheduling run
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub total_time: u64,

    /// Every firing in completion order
    pub schedule: Schedule,

    /// Actors started together, one entry per slot or start event
    pub slots: Vec<Vec<String>>,
}

pub struct Scheduler<'g> {
    graph: &'g Graph,

    config: SchedulerConfig,

    bindings: BTreeMap<String, i64>,

    repetitions: Vec<u64>,

    periods: BTreeMap<String, (ActorId, u64)>,

    constraints: Vec<Constraint>,

    sequences: BTreeMap<String, BooleanSequence>,

    rng: StdRng,
}

impl<'g> Scheduler<'g> {
    pub fn new(graph: &'g Graph, int_values: &BTreeMap<String, i64>, bool_sequences: &BTreeMap<String, String>) -> Result<Self, ScheduleError> {
        Self::with_config(graph, int_values, bool_sequences, SchedulerConfig::default())
    }

    /// Builds the constraint set of a verified graph with parameters fixed
    pub fn with_config(graph: &'g Graph, int_values: &BTreeMap<String, i64>, bool_sequences: &BTreeMap<String, String>, config: SchedulerConfig) -> Result<Self, ScheduleError> {
        if !graph.is_verified() {
            return Err(ScheduleError::Unverified);
        }
        if let Some(parameter) = graph.guard_parameters().into_iter().find(|parameter| graph.modifier_of(parameter).is_none()) {
            return Err(ScheduleError::UnmodifiedParameter(parameter));
        }
        if int_values.contains_key(FIRING_INDEX) {
            return Err(ScheduleError::UnresolvedParameter {
                what: format!("integer parameter {FIRING_INDEX}"),
                value: "reserved for the firing index".to_string(),
            });
        }

        let mut sequences = BTreeMap::new();
        for parameter in graph.modifiers().keys() {
            let text = bool_sequences.get(parameter).ok_or_else(|| ScheduleError::MissingSequence(parameter.clone()))?;
            sequences.insert(parameter.clone(), BooleanSequence::parse(parameter, text)?);
        }

        let bindings = int_values.clone();
        let mut repetitions = Vec::with_capacity(graph.actor_count());
        for (id, actor) in graph.actors() {
            let count = graph.repetitions(id).cloned().ok_or(ScheduleError::Unverified)?;
            repetitions.push(resolve_count(&format!("repetition count of {}", actor.name()), &count, &bindings, 0)?);
        }

        let mut periods = BTreeMap::new();
        for (parameter, modifier) in graph.modifiers() {
            let period = graph.actor(*modifier).modifies().get(parameter).cloned().unwrap_or_else(Product::one);
            let resolved = resolve_count(&format!("modification period of {parameter}"), &period, &bindings, 1)?;
            periods.insert(parameter.clone(), (*modifier, resolved));
        }

        let mut constraints = Vec::new();
        for (id, _) in graph.edges() {
            constraints.push(Constraint::data(graph, id)?);
        }
        for (parameter, modifier) in graph.modifiers() {
            let period = graph.actor(*modifier).modifies().get(parameter).cloned().unwrap_or_else(Product::one);
            for user in graph.users(parameter).into_iter().filter(|user| user != modifier) {
                let reading = graph.actor(user).reading_period(parameter).ok_or(ScheduleError::Unverified)?;
                constraints.push(Constraint::modifier(parameter, user, *modifier, &period, reading)?);
            }
        }
        for constraint in &mut constraints {
            constraint.resolve(&bindings)?;
        }
        debug!(constraints = constraints.len(), parameters = periods.len(), "Scheduler constraints built");

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            graph,
            config,
            bindings,
            repetitions,
            periods,
            constraints,
            sequences,
            rng,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Resolved firing count per actor, in actor order
    pub fn repetitions(&self) -> &[u64] {
        &self.repetitions
    }

    /// Adds a caller-written dependency
    ///
    /// Reading periods missing on the dependent are derived from the
    /// modifier's rate and must come out whole.
    pub fn add_constraint(&mut self, user: UserConstraint) -> Result<(), ScheduleError> {
        let dependent = self.graph.actor_id(&user.dependent).ok_or_else(|| GraphError::UnknownActor(user.dependent.clone()))?;
        let dependency = self.graph.actor_id(&user.dependency).ok_or_else(|| GraphError::UnknownActor(user.dependency.clone()))?;

        let mut constraint = Constraint::user(dependent, dependency, user.requirement, user.shift);
        if let Some(guard) = user.guard {
            let mut periods = BTreeMap::new();
            for parameter in guard.parameters() {
                let period = match self.graph.actor(dependent).reading_period(&parameter) {
                    Some(period) => Expression::from(period.clone()),
                    None => self.derive_reading_period(dependent, &parameter)?,
                };
                periods.insert(parameter, period);
            }
            constraint = constraint.with_guard(guard, periods);
        }
        constraint.resolve(&self.bindings)?;
        debug!(constraint = %constraint.describe(self.graph), "User constraint added");
        self.constraints.push(constraint);
        Ok(())
    }

    fn derive_reading_period(&self, actor: ActorId, parameter: &str) -> Result<Expression, ScheduleError> {
        let modifier = self.graph.modifier_of(parameter).ok_or_else(|| ScheduleError::UnmodifiedParameter(parameter.to_string()))?;
        let period = self.graph.actor(modifier).modifies().get(parameter).cloned().unwrap_or_else(Product::one);
        let solution = |id| self.graph.repetitions(id).cloned().map(Expression::from).ok_or(ScheduleError::Unverified);

        let frequency = solution(modifier)?.divide(&Expression::from(period))?;
        let reading = solution(actor)?.divide(&frequency)?;
        if !reading.is_product() {
            return Err(ScheduleError::InvalidConstraint(format!(
                "{} reads {parameter} {reading} times per modification",
                self.graph.actor(actor).name()
            )));
        }
        Ok(reading)
    }

    /// Runs one iteration with a fresh state and returns its trace
    pub fn execute(&mut self) -> Result<Execution, ScheduleError> {
        let context = SchedulingContext {
            graph: self.graph,
            periods: &self.periods,
            idle_time: self.config.idle_time,
        };
        let mut state = SchedulingState::new(self.repetitions.clone(), self.constraints.clone(), self.sequences.clone());

        match self.config.strategy {
            SchedulingStrategy::Slotted => strategies::slotted::run_slotted(&context, &mut state, &mut self.rng)?,
            SchedulingStrategy::NonSlotted => strategies::non_slotted::run_non_slotted(&context, &mut state, &mut self.rng)?,
        }
        state.ensure_drained(&context)?;

        let execution = state.into_execution();
        info!(strategy = %self.config.strategy, total_time = execution.total_time, firings = execution.schedule.len(), "Scheduling run finished");
        Ok(execution)
    }

    /// Total time of one iteration
    pub fn run(&mut self) -> Result<u64, ScheduleError> {
        Ok(self.execute()?.total_time)
    }
}

/// Substitutes integer parameters into a count that must end up a number
/// no smaller than `minimum`
fn resolve_count(what: &str, value: &Product, bindings: &BTreeMap<String, i64>, minimum: i64) -> Result<u64, ScheduleError> {
    let resolved = Expression::from(value.clone()).evaluate_all(bindings.iter().map(|(name, value)| (name.as_str(), *value)))?;
    match resolved.as_number() {
        Ok(number) if number >= minimum => Ok(number as u64),
        _ => Err(ScheduleError::UnresolvedParameter {
            what: what.to_string(),
            value: resolved.to_string(),
        }),
    }
}
