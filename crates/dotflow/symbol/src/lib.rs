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

//! Exact symbolic arithmetic for parametric dataflow analysis
//!
//! Provides integer products of named parameters, fractions and sums of them,
//! deferred composites for arithmetic through pending rounding, boolean guard
//! expressions, and the balance equation solver.

pub mod boolean;
pub mod compare;
pub mod equation;
pub mod error;
pub mod expression;
pub mod fraction;
pub mod polynomial;
pub mod product;
pub mod solver;

pub use boolean::{BooleanExpression, BooleanOperator, BooleanValue};
pub use compare::Sign;
pub use equation::Equation;
pub use error::{SymbolError, SymbolResult};
pub use expression::Expression;
pub use fraction::{Fraction, Rounding};
pub use polynomial::Polynomial;
pub use product::Product;
pub use solver::{Solution, SystemSolver};
