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

//! Mutable state of one scheduling run

use super::constraint::{Constraint, Requirement};
use super::sequence::BooleanSequence;
use super::{Execution, SchedulingContext};
use crate::error::ScheduleError;
use crate::graph::ActorId;
use crate::schedule::Schedule;
use dotflow_symbol::Expression;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SchedulingState {
    /// Completed firings per actor
    counts: Vec<u64>,

    repetitions: Vec<u64>,

    /// Actors currently firing, non-slotted only
    active: Vec<bool>,

    /// Time left on the current firing, non-slotted only
    remaining: Vec<u64>,

    constraints: Vec<Constraint>,

    sequences: BTreeMap<String, BooleanSequence>,

    pub(crate) total_time: u64,

    schedule: Schedule,

    /// Actor names started together, in order
    slots: Vec<Vec<String>>,
}

impl SchedulingState {
    pub fn new(repetitions: Vec<u64>, constraints: Vec<Constraint>, sequences: BTreeMap<String, BooleanSequence>) -> Self {
        let actors = repetitions.len();
        Self {
            counts: vec![0; actors],
            repetitions,
            active: vec![false; actors],
            remaining: vec![0; actors],
            constraints,
            sequences,
            total_time: 0,
            schedule: Schedule::new(),
            slots: Vec::new(),
        }
    }

    /// Actors whose next firing satisfies every constraint on them
    pub fn fireable(&mut self, context: &SchedulingContext<'_>, skip_active: bool) -> Result<Vec<ActorId>, ScheduleError> {
        let mut fireable = Vec::new();
        for (id, actor) in context.graph.actors() {
            let index = id.index();
            if skip_active && self.active[index] {
                continue;
            }
            let (count, repetitions) = (self.counts[index], self.repetitions[index]);
            if count > repetitions {
                return Err(ScheduleError::Overfire {
                    actor: actor.name().to_string(),
                    count,
                    repetitions,
                });
            }
            if count == repetitions {
                continue;
            }

            let mut ready = true;
            for constraint in self.constraints.iter_mut().filter(|constraint| constraint.dependent() == id) {
                match constraint.evaluate(count + 1)? {
                    Requirement::Needs(needed) if self.counts[constraint.dependency().index()] >= needed => {}
                    _ => {
                        ready = false;
                        break;
                    }
                }
            }
            if ready {
                fireable.push(id);
            }
        }
        Ok(fireable)
    }

    /// Draws new values for parameters whose modifier is about to fire on a
    /// period boundary and hands them to every constraint
    pub fn propagate_booleans<R: Rng + ?Sized>(&mut self, context: &SchedulingContext<'_>, fireable: &[ActorId], rng: &mut R) -> Result<(), ScheduleError> {
        for (parameter, (modifier, period)) in context.periods {
            if !fireable.contains(modifier) || self.counts[modifier.index()] % period != 0 {
                continue;
            }
            let sequence = self.sequences.get_mut(parameter).ok_or_else(|| ScheduleError::MissingSequence(parameter.clone()))?;
            let value = sequence.next_value(rng);
            debug!(parameter = %parameter, value, "Boolean value propagated");
            for constraint in &mut self.constraints {
                constraint.set_param(parameter, value);
            }
        }
        Ok(())
    }

    /// Duration of the actor's next firing
    ///
    /// Execution time when one of its data constraints carries data at the
    /// current index, the idle time otherwise.
    pub fn cost(&mut self, context: &SchedulingContext<'_>, actor: ActorId) -> Result<u64, ScheduleError> {
        let count = self.counts[actor.index()];
        for constraint in self.constraints.iter_mut().filter(|constraint| constraint.is_data() && constraint.involves(actor)) {
            if constraint.is_active(count)? {
                return Ok(context.graph.actor(actor).execution_time());
            }
        }
        Ok(context.idle_time)
    }

    pub fn complete_firing(&mut self, context: &SchedulingContext<'_>, actor: ActorId) -> Result<(), ScheduleError> {
        let index = actor.index();
        self.counts[index] += 1;
        let name = context.graph.actor(actor).name();
        if self.counts[index] > self.repetitions[index] {
            return Err(ScheduleError::Overfire {
                actor: name.to_string(),
                count: self.counts[index],
                repetitions: self.repetitions[index],
            });
        }
        self.schedule.push(name, Expression::one());
        Ok(())
    }

    pub fn activate(&mut self, actor: ActorId, duration: u64) {
        self.active[actor.index()] = true;
        self.remaining[actor.index()] = duration;
    }

    /// Shortest time left among active actors
    pub fn next_completion(&self) -> Option<u64> {
        self.active.iter().zip(&self.remaining).filter(|(active, _)| **active).map(|(_, remaining)| *remaining).min()
    }

    /// Advances every active actor, returning those that finish
    pub fn advance(&mut self, step: u64) -> Vec<ActorId> {
        let mut finished = Vec::new();
        for index in 0..self.active.len() {
            if !self.active[index] {
                continue;
            }
            self.remaining[index] = self.remaining[index].saturating_sub(step);
            if self.remaining[index] == 0 {
                self.active[index] = false;
                finished.push(ActorId(index));
            }
        }
        finished
    }

    pub fn record_slot(&mut self, context: &SchedulingContext<'_>, actors: &[ActorId]) {
        self.slots.push(actors.iter().map(|actor| context.graph.actor(*actor).name().to_string()).collect());
    }

    /// Fails when some actor did not complete its repetitions
    pub fn ensure_drained(&self, context: &SchedulingContext<'_>) -> Result<(), ScheduleError> {
        let residual: Vec<String> = context
            .graph
            .actors()
            .filter(|(id, _)| self.counts[id.index()] < self.repetitions[id.index()])
            .map(|(id, actor)| format!("{} {}/{}", actor.name(), self.counts[id.index()], self.repetitions[id.index()]))
            .collect();
        if residual.is_empty() { Ok(()) } else { Err(ScheduleError::Stalled(residual.join(", "))) }
    }

    pub fn into_execution(self) -> Execution {
        Execution {
            total_time: self.total_time,
            schedule: self.schedule,
            slots: self.slots,
        }
    }
}
