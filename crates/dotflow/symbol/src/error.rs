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

//! Error types for the symbolic algebra

use thiserror::Error;

/// Result type for symbolic operations
pub type SymbolResult<T> = Result<T, SymbolError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("Failed to parse '{input}': {reason}")]
    Parse { input: String, reason: String },

    #[error("Division by zero in {0}")]
    DivisionByZero(String),

    #[error("Type mismatch: {found} is not a {expected}")]
    TypeMismatch { expected: &'static str, found: String },

    #[error("Cannot divide by the polynomial {0}")]
    PolynomialDivision(String),

    #[error("Composite expression {0} cannot be compared before evaluation")]
    CompositeComparison(String),

    #[error("Cannot decide the ordering of {left} and {right}")]
    Incomparable { left: String, right: String },

    #[error("Cannot round composite expression {0}")]
    NestedRounding(String),

    #[error("Boolean parameter {0} is not bound")]
    UnboundGuard(String),

    #[error("Integer overflow evaluating {0}")]
    Overflow(String),
}

impl SymbolError {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        SymbolError::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(expected: &'static str, found: impl ToString) -> Self {
        SymbolError::TypeMismatch { expected, found: found.to_string() }
    }
}
