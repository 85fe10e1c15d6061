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

//! Balance equations between two unknowns

use crate::error::SymbolResult;
use crate::expression::Expression;
use crate::product::Product;
use std::fmt;

/// `production * x_producer = consumption * x_consumer`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    producer: String,

    production: Product,

    consumer: String,

    consumption: Product,
}

impl Equation {
    pub fn new(producer: impl Into<String>, production: Product, consumer: impl Into<String>, consumption: Product) -> Self {
        Self {
            producer: producer.into(),
            production,
            consumer: consumer.into(),
            consumption,
        }
    }

    pub fn producer(&self) -> &str {
        &self.producer
    }

    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    pub fn involves(&self, unknown: &str) -> bool {
        self.producer == unknown || self.consumer == unknown
    }

    /// Derives the other unknown from a known value
    ///
    /// Returns `None` if `known` does not appear in the equation. For a
    /// self-loop the derived value is for the same unknown, which lets the
    /// caller detect unequal rates as a conflict.
    pub fn solve(&self, known: &str, value: &Expression) -> SymbolResult<Option<(&str, Expression)>> {
        if known == self.producer {
            let derived = value.multiply(&self.production.clone().into()).divide(&self.consumption.clone().into())?;
            Ok(Some((&self.consumer, derived)))
        } else if known == self.consumer {
            let derived = value.multiply(&self.consumption.clone().into()).divide(&self.production.clone().into())?;
            Ok(Some((&self.producer, derived)))
        } else {
            Ok(None)
        }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*{} = {}*{}", self.production, self.producer, self.consumption, self.consumer)
    }
}
