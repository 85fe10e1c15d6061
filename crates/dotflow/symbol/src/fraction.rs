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

//! Ratios of products with optional pending rounding

use crate::error::{SymbolError, SymbolResult};
use crate::product::Product;
use num_integer::Integer;
use std::fmt;

/// Rounding still to be applied once a value becomes concrete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rounding {
    #[default]
    Exact,
    Ceiling,
    Floor,
}

impl Rounding {
    pub fn is_pending(self) -> bool {
        self != Rounding::Exact
    }

    /// Applies the rounding to `numerator / denominator`
    pub(crate) fn apply(self, numerator: i64, denominator: i64) -> i64 {
        match self {
            Rounding::Ceiling => Integer::div_ceil(&numerator, &denominator),
            Rounding::Floor | Rounding::Exact => Integer::div_floor(&numerator, &denominator),
        }
    }

    pub(crate) fn wrap(self, f: &mut fmt::Formatter<'_>, body: &str) -> fmt::Result {
        match self {
            Rounding::Exact => write!(f, "{body}"),
            Rounding::Ceiling => write!(f, "ceil({body})"),
            Rounding::Floor => write!(f, "floor({body})"),
        }
    }
}

/// `numerator / denominator`, kept in lowest terms with a positive denominator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fraction {
    numerator: Product,

    denominator: Product,

    rounding: Rounding,
}

impl Fraction {
    /// Builds a normalized fraction, failing on a zero denominator
    pub fn new(numerator: Product, denominator: Product) -> SymbolResult<Self> {
        if denominator.is_zero() {
            return Err(SymbolError::DivisionByZero(format!("{numerator}/{denominator}")));
        }
        Ok(Self::normalized(numerator, denominator))
    }

    /// Callers guarantee a non-zero denominator
    fn normalized(numerator: Product, denominator: Product) -> Self {
        if numerator.is_zero() {
            return Self::from_product(Product::zero());
        }
        let common = numerator.gcd(&denominator);
        let (mut numerator, mut denominator) = (numerator.strip(&common), denominator.strip(&common));
        if denominator.is_negative() {
            numerator = numerator.negate();
            denominator = denominator.negate();
        }
        Self {
            numerator,
            denominator,
            rounding: Rounding::Exact,
        }
    }

    pub fn from_product(product: Product) -> Self {
        Self {
            numerator: product,
            denominator: Product::one(),
            rounding: Rounding::Exact,
        }
    }

    pub fn numerator(&self) -> &Product {
        &self.numerator
    }

    pub fn denominator(&self) -> &Product {
        &self.denominator
    }

    pub fn rounding(&self) -> Rounding {
        self.rounding
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    /// True when the denominator is one
    pub fn is_product(&self) -> bool {
        self.denominator.is_unit()
    }

    /// True when both sides are parameter free
    pub fn is_constant(&self) -> bool {
        self.numerator.is_number() && self.denominator.is_number()
    }

    pub fn is_number(&self) -> bool {
        self.is_constant() && self.numerator.coefficient() % self.denominator.coefficient() == 0
    }

    pub fn is_negative(&self) -> bool {
        self.numerator.is_negative()
    }

    /// True if both fractions have the same parameters above and below the bar
    pub fn same_shape(&self, other: &Fraction) -> bool {
        self.numerator.same_parameters(&other.numerator) && self.denominator.same_parameters(&other.denominator)
    }

    /// Drops the rounding marker
    pub(crate) fn exact(&self) -> Fraction {
        Self {
            rounding: Rounding::Exact,
            ..self.clone()
        }
    }

    /// Negates the unrounded value, so a pending marker applies to the result.
    /// `Expression::negate` keeps `-ceil(x)` apart from `ceil(-x)`.
    pub fn negate(&self) -> Fraction {
        Self {
            numerator: self.numerator.negate(),
            ..self.clone()
        }
    }

    pub fn multiply(&self, other: &Fraction) -> Fraction {
        Self::normalized(self.numerator.multiply(&other.numerator), self.denominator.multiply(&other.denominator))
    }

    pub fn divide(&self, other: &Fraction) -> SymbolResult<Fraction> {
        if other.is_zero() {
            return Err(SymbolError::DivisionByZero(format!("{self}/{other}")));
        }
        Ok(Self::normalized(self.numerator.multiply(&other.denominator), self.denominator.multiply(&other.numerator)))
    }

    /// Sums two fractions of the same shape into one term
    pub(crate) fn combine_like(&self, other: &Fraction) -> Fraction {
        let left = self.numerator.coefficient() * other.denominator.coefficient();
        let right = other.numerator.coefficient() * self.denominator.coefficient();
        let numerator = Product::new(left + right).multiply(&self.numerator.parameter_part());
        let denominator = Product::new(self.denominator.coefficient() * other.denominator.coefficient()).multiply(&self.denominator.parameter_part());
        Self::normalized(numerator, denominator)
    }

    /// Marks the fraction for rounding
    ///
    /// Integral values ignore the marker, constants are rounded right away and
    /// an already pending value keeps its first marker.
    pub fn with_rounding(&self, rounding: Rounding) -> Fraction {
        if self.is_product() || self.rounding.is_pending() {
            return self.clone();
        }
        let marked = Self { rounding, ..self.clone() };
        marked.resolve()
    }

    /// Applies pending rounding once both sides are concrete integers
    fn resolve(self) -> Fraction {
        if !self.rounding.is_pending() || !self.is_constant() {
            return self;
        }
        let value = self.rounding.apply(self.numerator.coefficient(), self.denominator.coefficient());
        Self::from_product(Product::new(value))
    }

    /// Substitutes an integer for a parameter on both sides
    pub fn evaluate(&self, parameter: &str, value: i64) -> SymbolResult<Fraction> {
        let denominator = self.denominator.evaluate(parameter, value)?;
        if denominator.is_zero() {
            return Err(SymbolError::DivisionByZero(format!("{self} with {parameter}={value}")));
        }
        let mut evaluated = Self::normalized(self.numerator.evaluate(parameter, value)?, denominator);
        if !evaluated.is_product() {
            evaluated.rounding = self.rounding;
        }
        Ok(evaluated.resolve())
    }
}

impl From<Product> for Fraction {
    fn from(product: Product) -> Self {
        Self::from_product(product)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = if self.is_product() {
            self.numerator.to_string()
        } else {
            format!("{}/{}", self.numerator, self.denominator)
        };
        self.rounding.wrap(f, &body)
    }
}
