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

//! Static analyses of a dataflow graph
//!
//! Consistency solves the balance equations, liveness proves the graph can
//! iterate without deadlock and period safety derives the reading period of
//! every boolean parameter user. Outcomes are booleans, not errors.

use crate::error::GraphError;
use crate::graph::Graph;
use dotflow_symbol::{SymbolError, SymbolResult};
use tracing::info;

pub mod consistency;
pub mod liveness;
pub mod safety;

/// Verification flags of a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalysisReport {
    pub consistent: bool,

    pub live: bool,

    pub safe: bool,
}

impl AnalysisReport {
    /// True when the graph can be scheduled
    pub fn is_verified(&self) -> bool {
        self.consistent && self.live && self.safe
    }
}

impl Graph {
    /// Runs consistency, liveness and period safety in order
    ///
    /// A failed analysis skips the ones that depend on it.
    pub fn analyse(&mut self) -> Result<AnalysisReport, GraphError> {
        let consistent = self.check_consistency()?;
        let live = consistent && self.check_liveness()?;
        let safe = live && self.check_period_safety()?;
        let report = AnalysisReport { consistent, live, safe };
        info!(consistent, live, safe, actors = self.actor_count(), edges = self.edge_count(), "Graph analysed");
        Ok(report)
    }
}

/// Treats an undecidable comparison as not holding
pub(crate) fn holds(comparison: SymbolResult<bool>) -> SymbolResult<bool> {
    match comparison {
        Err(SymbolError::Incomparable { .. }) => Ok(false),
        other => other,
    }
}
