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

//! Magnitude comparison of plain expressions
//!
//! Integer parameters stand for token rates and counts, so every parameter is
//! assumed to be a positive integer. Under that assumption a monomial with a
//! positive coefficient `c` is at least `c`, which is enough to order the
//! differences the analyses produce.

use crate::error::{SymbolError, SymbolResult};
use crate::expression::Expression;
use crate::fraction::Fraction;

/// What is known about the sign of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Negative,
    NonPositive,
    Zero,
    NonNegative,
    Positive,
    Unknown,
}

impl Sign {
    /// `Some(true)` if the value is known to be `> 0`
    pub fn is_positive(self) -> Option<bool> {
        match self {
            Sign::Positive => Some(true),
            Sign::Zero | Sign::Negative | Sign::NonPositive => Some(false),
            Sign::NonNegative | Sign::Unknown => None,
        }
    }

    /// `Some(true)` if the value is known to be `>= 0`
    pub fn is_non_negative(self) -> Option<bool> {
        match self {
            Sign::Positive | Sign::Zero | Sign::NonNegative => Some(true),
            Sign::Negative => Some(false),
            Sign::NonPositive | Sign::Unknown => None,
        }
    }
}

impl Expression {
    fn ensure_comparable(&self) -> SymbolResult<()> {
        if self.is_composite() || self.is_pending() {
            return Err(SymbolError::CompositeComparison(self.to_string()));
        }
        Ok(())
    }

    /// Sign of a plain value
    pub fn sign(&self) -> SymbolResult<Sign> {
        self.ensure_comparable()?;
        let terms = self.as_polynomial()?.terms().to_vec();
        Ok(sign_of_terms(&terms))
    }

    /// Sign of `self - other`
    pub fn sign_of_difference(&self, other: &Expression) -> SymbolResult<Sign> {
        self.ensure_comparable()?;
        other.ensure_comparable()?;
        self.subtract(other).sign()
    }

    /// Symbolic equality of two plain values
    pub fn is_equal_to(&self, other: &Expression) -> SymbolResult<bool> {
        Ok(self.sign_of_difference(other)? == Sign::Zero)
    }

    pub fn is_greater_than(&self, other: &Expression) -> SymbolResult<bool> {
        self.sign_of_difference(other)?.is_positive().ok_or_else(|| self.incomparable(other))
    }

    pub fn is_at_least(&self, other: &Expression) -> SymbolResult<bool> {
        self.sign_of_difference(other)?.is_non_negative().ok_or_else(|| self.incomparable(other))
    }

    fn incomparable(&self, other: &Expression) -> SymbolError {
        SymbolError::Incomparable {
            left: self.to_string(),
            right: other.to_string(),
        }
    }
}

fn sign_of_terms(terms: &[Fraction]) -> Sign {
    if terms.is_empty() {
        return Sign::Zero;
    }
    let negatives = terms.iter().filter(|term| term.is_negative()).count();
    if negatives == 0 {
        return Sign::Positive;
    }
    if negatives == terms.len() {
        return Sign::Negative;
    }

    // Mixed signs: only a constant offset against integral monomials of one sign is decidable.
    let (constants, monomials): (Vec<&Fraction>, Vec<&Fraction>) = terms.iter().partition(|term| term.is_constant());
    let [constant] = constants.as_slice() else {
        return Sign::Unknown;
    };
    if !monomials.iter().all(|term| term.is_product()) {
        return Sign::Unknown;
    }
    let monomials_negative = monomials[0].is_negative();
    if monomials.iter().any(|term| term.is_negative() != monomials_negative) || constant.is_negative() == monomials_negative {
        return Sign::Unknown;
    }

    // Lower bound of the monomials' magnitude against the constant's magnitude, cross multiplied.
    let bound: i64 = monomials.iter().map(|term| term.numerator().coefficient().abs()).sum();
    let scaled_bound = bound * constant.denominator().coefficient();
    let offset = constant.numerator().coefficient().abs();
    match (scaled_bound.cmp(&offset), monomials_negative) {
        (std::cmp::Ordering::Greater, false) => Sign::Positive,
        (std::cmp::Ordering::Equal, false) => Sign::NonNegative,
        (std::cmp::Ordering::Greater, true) => Sign::Negative,
        (std::cmp::Ordering::Equal, true) => Sign::NonPositive,
        (std::cmp::Ordering::Less, _) => Sign::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(text: &str) -> Expression {
        Expression::parse(text).unwrap()
    }

    #[test]
    fn test_numbers_compare_exactly() {
        assert!(expr("3").is_greater_than(&expr("2")).unwrap());
        assert!(!expr("2").is_greater_than(&expr("2")).unwrap());
        assert!(expr("2").is_at_least(&expr("2")).unwrap());
        assert!(expr("2").is_equal_to(&expr("2")).unwrap());
    }

    #[test]
    fn test_parametric_comparison_assumes_positive_parameters() {
        assert_eq!(expr("p").sign_of_difference(&expr("0")).unwrap(), Sign::Positive);
        assert!(expr("2*p").is_greater_than(&expr("p")).unwrap());
        assert!(expr("p").is_at_least(&expr("1")).unwrap());
        assert!(matches!(expr("p").is_greater_than(&expr("1")), Err(SymbolError::Incomparable { .. })));
        assert!(expr("2*p").is_greater_than(&expr("1")).unwrap());
        assert!(matches!(expr("p").is_at_least(&expr("q")), Err(SymbolError::Incomparable { .. })));
        assert!(!expr("p").is_equal_to(&expr("q")).unwrap());
    }

    #[test]
    fn test_fractional_offsets() {
        let half = expr("1").divide(&expr("2")).unwrap();
        assert!(expr("p").is_greater_than(&half).unwrap());
        assert!(!half.is_at_least(&expr("p")).unwrap());
    }

    #[test]
    fn test_composites_cannot_be_compared() {
        let pending = expr("i").divide(&expr("2")).unwrap().ceiling().unwrap();
        assert!(matches!(pending.is_equal_to(&expr("1")), Err(SymbolError::CompositeComparison(_))));
        let composite = expr("2").multiply(&pending);
        assert!(matches!(expr("1").is_greater_than(&composite), Err(SymbolError::CompositeComparison(_))));
    }
}
