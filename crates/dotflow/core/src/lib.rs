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

//! Boolean parametric dataflow graphs
//!
//! Builds graphs of actors and guarded edges, verifies them with the
//! consistency, liveness and period safety analyses, and schedules verified
//! graphs with slotted or non-slotted constraint-driven strategies.

pub mod analysis;
pub mod description;
pub mod error;
pub mod graph;
pub mod schedule;
pub mod scheduling;

pub use analysis::AnalysisReport;
pub use description::GraphDescription;
pub use error::{GraphError, ScheduleError};
pub use graph::{Actor, ActorId, Cycle, CycleDetector, Edge, EdgeId, EdgeSpec, Graph};
pub use schedule::{Firing, Schedule};
pub use scheduling::{Execution, Scheduler, SchedulerConfig, SchedulingStrategy, UserConstraint};
