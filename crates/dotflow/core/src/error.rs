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

//! Error types for graph construction, analysis and scheduling

use dotflow_symbol::SymbolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Actor {0} already exists")]
    DuplicateActor(String),

    #[error("Parameter {parameter} is already modified by {owner}, {actor} cannot modify it too")]
    DuplicateModifier { parameter: String, owner: String, actor: String },

    #[error("Unknown actor: {0}")]
    UnknownActor(String),

    #[error("{analysis} analysis requires {requires} analysis first")]
    AnalysisOrder { analysis: &'static str, requires: &'static str },

    #[error("Failed to load graph description: {0}")]
    Description(String),

    #[error("Symbolic error: {0}")]
    Symbol(#[from] SymbolError),
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Graph must be consistent, live and period-safe before scheduling")]
    Unverified,

    #[error("No value sequence for boolean parameter {0}")]
    MissingSequence(String),

    #[error("Invalid value sequence '{sequence}' for parameter {parameter}: expected a non-empty string of 0, 1 and *")]
    InvalidSequence { parameter: String, sequence: String },

    #[error("Boolean parameter {0} is read but no actor modifies it")]
    UnmodifiedParameter(String),

    #[error("Cannot resolve {what} to a positive integer: {value}")]
    UnresolvedParameter { what: String, value: String },

    #[error("Invalid user constraint: {0}")]
    InvalidConstraint(String),

    #[error("Actor {actor} fired {count} times, exceeding its repetition count {repetitions}")]
    Overfire { actor: String, count: u64, repetitions: u64 },

    #[error("Guard {guard} evaluated at index {index} before its parameters were set")]
    GuardUnset { guard: String, index: i64 },

    #[error("Scheduling stalled with residual firings: {0}")]
    Stalled(String),

    #[error("Symbolic error: {0}")]
    Symbol(#[from] SymbolError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}
