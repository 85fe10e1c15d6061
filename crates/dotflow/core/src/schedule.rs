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

//! Recorded firing sequences

use dotflow_symbol::Expression;
use std::fmt;

/// `count` consecutive firings of one actor
#[derive(Debug, Clone, PartialEq)]
pub struct Firing {
    pub actor: String,

    pub count: Expression,
}

/// Append-only firing log of one execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    firings: Vec<Firing>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, actor: impl Into<String>, count: Expression) {
        self.firings.push(Firing { actor: actor.into(), count });
    }

    pub fn firings(&self) -> &[Firing] {
        &self.firings
    }

    pub fn len(&self) -> usize {
        self.firings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.firings.is_empty()
    }

    /// Total number of firings of `actor`
    pub fn total_for(&self, actor: &str) -> Expression {
        self.firings
            .iter()
            .filter(|firing| firing.actor == actor)
            .fold(Expression::zero(), |total, firing| total.add(&firing.count))
    }

    /// Merges consecutive firings of the same actor
    pub fn compact(&self) -> Schedule {
        let mut firings: Vec<Firing> = Vec::new();
        for firing in &self.firings {
            match firings.last_mut() {
                Some(last) if last.actor == firing.actor => last.count = last.count.add(&firing.count),
                _ => firings.push(firing.clone()),
            }
        }
        Schedule { firings }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .firings
            .iter()
            .map(|firing| if firing.count.is_unit() { firing.actor.clone() } else { format!("{}^({})", firing.actor, firing.count) })
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}
