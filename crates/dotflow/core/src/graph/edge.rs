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

use super::ActorId;
use crate::error::GraphError;
use dotflow_symbol::{BooleanExpression, Expression, Product};

/// Token channel between two actors
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub(crate) producer: ActorId,

    pub(crate) consumer: ActorId,

    /// Tokens produced per producer firing
    pub(crate) rate_in: Product,

    /// Tokens consumed per consumer firing
    pub(crate) rate_out: Product,

    /// Initially stored tokens
    pub(crate) tokens: Expression,

    pub(crate) guard: Option<BooleanExpression>,
}

impl Edge {
    pub fn producer(&self) -> ActorId {
        self.producer
    }

    pub fn consumer(&self) -> ActorId {
        self.consumer
    }

    pub fn rate_in(&self) -> &Product {
        &self.rate_in
    }

    pub fn rate_out(&self) -> &Product {
        &self.rate_out
    }

    pub fn tokens(&self) -> &Expression {
        &self.tokens
    }

    pub fn guard(&self) -> Option<&BooleanExpression> {
        self.guard.as_ref()
    }

    pub fn is_self_loop(&self) -> bool {
        self.producer == self.consumer
    }
}

/// Edge description by actor name, resolved by [`super::Graph::add_edge`]
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec {
    pub(crate) producer: String,

    pub(crate) rate_in: Product,

    pub(crate) consumer: String,

    pub(crate) rate_out: Product,

    pub(crate) tokens: Expression,

    pub(crate) guard: Option<BooleanExpression>,
}

impl EdgeSpec {
    /// Parses both rates, starting with no tokens and no guard
    pub fn new(producer: impl Into<String>, rate_in: &str, consumer: impl Into<String>, rate_out: &str) -> Result<Self, GraphError> {
        Ok(Self {
            producer: producer.into(),
            rate_in: rate_in.parse()?,
            consumer: consumer.into(),
            rate_out: rate_out.parse()?,
            tokens: Expression::zero(),
            guard: None,
        })
    }

    pub fn with_tokens(mut self, tokens: &str) -> Result<Self, GraphError> {
        self.tokens = Expression::parse(tokens)?;
        Ok(self)
    }

    /// Parses a guard; a blank guard means always active
    pub fn with_guard(mut self, guard: &str) -> Result<Self, GraphError> {
        self.guard = if guard.trim().is_empty() { None } else { Some(BooleanExpression::parse(guard)?) };
        Ok(self)
    }
}
