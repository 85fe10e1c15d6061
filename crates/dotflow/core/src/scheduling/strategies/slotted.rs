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

// Purpose: Fires the whole fireable set per slot, paying the slowest actor's cost.

use crate::error::ScheduleError;
use crate::scheduling::{SchedulingContext, SchedulingState};
use rand::Rng;
use tracing::debug;

/// Runs slots until no actor is fireable.
///
/// # Arguments
/// * `context`: Graph and modification periods of the run.
/// * `state`: Fresh state, drained in place.
/// * `rng`: Source for `*` sequence values.
pub fn run_slotted<R: Rng + ?Sized>(context: &SchedulingContext<'_>, state: &mut SchedulingState, rng: &mut R) -> Result<(), ScheduleError> {
    let mut slot = 0usize;
    loop {
        let fireable = state.fireable(context, false)?;
        if fireable.is_empty() {
            break;
        }

        // Costs see the guard history as it stood when the slot opened.
        let mut slot_time = 0;
        for &actor in &fireable {
            slot_time = slot_time.max(state.cost(context, actor)?);
        }
        state.propagate_booleans(context, &fireable, rng)?;

        for &actor in &fireable {
            state.complete_firing(context, actor)?;
        }
        state.total_time += slot_time;
        state.record_slot(context, &fireable);

        slot += 1;
        debug!(slot, actors = fireable.len(), slot_time, total_time = state.total_time, "Slot fired");
    }
    Ok(())
}
