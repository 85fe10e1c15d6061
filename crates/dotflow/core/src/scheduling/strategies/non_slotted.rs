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

// Purpose: Starts every actor as soon as it is fireable and advances time to the next completion.

use crate::error::ScheduleError;
use crate::scheduling::{SchedulingContext, SchedulingState};
use rand::Rng;
use tracing::debug;

/// Runs until nothing is active and nothing can start.
pub fn run_non_slotted<R: Rng + ?Sized>(context: &SchedulingContext<'_>, state: &mut SchedulingState, rng: &mut R) -> Result<(), ScheduleError> {
    loop {
        let fireable = state.fireable(context, true)?;
        state.propagate_booleans(context, &fireable, rng)?;
        for &actor in &fireable {
            let duration = state.cost(context, actor)?;
            state.activate(actor, duration);
        }
        if !fireable.is_empty() {
            state.record_slot(context, &fireable);
        }

        let Some(step) = state.next_completion() else {
            break;
        };
        state.total_time += step;
        for actor in state.advance(step) {
            state.complete_firing(context, actor)?;
        }
        debug!(step, total_time = state.total_time, started = fireable.len(), "Time advanced");
    }
    Ok(())
}
