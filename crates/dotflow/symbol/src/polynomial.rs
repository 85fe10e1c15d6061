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

//! Sums of fractions in normal form

use crate::error::SymbolResult;
use crate::fraction::{Fraction, Rounding};
use crate::product::Product;
use std::fmt;

/// Sum of non-zero, pairwise unlike fractions
///
/// Like terms are merged, zero terms dropped and every constant folded into a
/// single trailing term whenever the term list changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Polynomial {
    terms: Vec<Fraction>,

    rounding: Rounding,
}

impl Polynomial {
    pub fn new(terms: impl IntoIterator<Item = Fraction>) -> Self {
        Self {
            terms: normalize(terms),
            rounding: Rounding::Exact,
        }
    }

    pub fn terms(&self) -> &[Fraction] {
        &self.terms
    }

    pub fn rounding(&self) -> Rounding {
        self.rounding
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// True when every term has a unit denominator
    pub fn is_integral(&self) -> bool {
        self.terms.iter().all(Fraction::is_product)
    }

    pub fn add(&self, other: &Polynomial) -> Polynomial {
        Self::new(self.terms.iter().chain(other.terms.iter()).cloned())
    }

    /// Distributes the product over both term lists
    pub fn multiply(&self, other: &Polynomial) -> Polynomial {
        Self::new(self.terms.iter().flat_map(|left| other.terms.iter().map(move |right| left.multiply(right))))
    }

    /// Divides every term by a single fraction
    pub fn divide(&self, divisor: &Fraction) -> SymbolResult<Polynomial> {
        let terms = self.terms.iter().map(|term| term.divide(divisor)).collect::<SymbolResult<Vec<_>>>()?;
        Ok(Self::new(terms))
    }

    /// Negates the unrounded value, so a pending marker applies to the result.
    /// `Expression::negate` keeps `-ceil(x)` apart from `ceil(-x)`.
    pub fn negate(&self) -> Polynomial {
        Self {
            terms: self.terms.iter().map(Fraction::negate).collect(),
            rounding: self.rounding,
        }
    }

    /// Marks the sum for rounding unless it is already integral
    pub fn with_rounding(&self, rounding: Rounding) -> Polynomial {
        if self.rounding.is_pending() || self.is_integral() {
            return self.clone();
        }
        Self {
            terms: self.terms.clone(),
            rounding,
        }
        .resolve()
    }

    fn resolve(self) -> Polynomial {
        if !self.rounding.is_pending() {
            return self;
        }
        match self.terms.as_slice() {
            [] => Polynomial::default(),
            [single] if single.is_constant() => {
                let value = self.rounding.apply(single.numerator().coefficient(), single.denominator().coefficient());
                Polynomial::new([Fraction::from_product(Product::new(value))])
            }
            _ if self.is_integral() => Self {
                rounding: Rounding::Exact,
                ..self
            },
            _ => self,
        }
    }

    pub fn evaluate(&self, parameter: &str, value: i64) -> SymbolResult<Polynomial> {
        let terms = self.terms.iter().map(|term| term.evaluate(parameter, value)).collect::<SymbolResult<Vec<_>>>()?;
        Ok(Self {
            terms: normalize(terms),
            rounding: self.rounding,
        }
        .resolve())
    }
}

impl From<Fraction> for Polynomial {
    fn from(term: Fraction) -> Self {
        Self::new([term.exact()])
    }
}

fn normalize(terms: impl IntoIterator<Item = Fraction>) -> Vec<Fraction> {
    let mut merged: Vec<Fraction> = Vec::new();
    for term in terms {
        if term.is_zero() {
            continue;
        }
        match merged.iter_mut().find(|existing| existing.same_shape(&term)) {
            Some(existing) => *existing = existing.combine_like(&term),
            None => merged.push(term),
        }
    }
    let (mut parametric, constants): (Vec<_>, Vec<_>) = merged.into_iter().filter(|term| !term.is_zero()).partition(|term| !term.is_constant());
    parametric.extend(constants);
    parametric
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut body = String::new();
        for (index, term) in self.terms.iter().enumerate() {
            if index == 0 {
                body.push_str(&term.to_string());
            } else if term.is_negative() {
                body.push_str(&format!(" - {}", term.negate()));
            } else {
                body.push_str(&format!(" + {term}"));
            }
        }
        if body.is_empty() {
            body.push('0');
        }
        self.rounding.wrap(f, &body)
    }
}
