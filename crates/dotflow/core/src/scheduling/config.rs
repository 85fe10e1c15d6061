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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cost of a firing that moves no data
pub const DEFAULT_IDLE_TIME: u64 = 10;

/// Scheduling algorithm implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchedulingStrategy {
    /// Fire the whole fireable set per slot, paying the slowest actor
    #[default]
    Slotted,

    /// Let every actor start as soon as it becomes fireable
    NonSlotted,
}

impl FromStr for SchedulingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slotted" => Ok(Self::Slotted),
            "non-slotted" | "nonslotted" | "non_slotted" => Ok(Self::NonSlotted),
            other => Err(format!("unknown scheduling strategy '{other}', expected slotted or non-slotted")),
        }
    }
}

impl fmt::Display for SchedulingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slotted => write!(f, "slotted"),
            Self::NonSlotted => write!(f, "non-slotted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub strategy: SchedulingStrategy,

    /// Seed for `*` sequence values, entropy when absent
    pub seed: Option<u64>,

    pub idle_time: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            strategy: SchedulingStrategy::default(),
            seed: None,
            idle_time: DEFAULT_IDLE_TIME,
        }
    }
}

impl SchedulerConfig {
    pub fn with_strategy(mut self, strategy: SchedulingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
