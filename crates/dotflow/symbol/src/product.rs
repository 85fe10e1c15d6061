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

//! Signed monomials over named integer parameters
//!
//! A [`Product`] is the leaf of the algebra: an integer coefficient times a
//! product of parameters raised to positive exponents, e.g. `-6*p^2*q`.

use crate::error::{SymbolError, SymbolResult};
use num_integer::Integer;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Integer monomial `coefficient * p1^e1 * ... * pn^en`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Product {
    /// Signed numeric part; zero forces an empty parameter map
    coefficient: i64,

    /// Parameter name to exponent, exponents are always positive
    powers: BTreeMap<String, u32>,
}

impl Product {
    /// Creates a constant product
    pub fn new(coefficient: i64) -> Self {
        Self { coefficient, powers: BTreeMap::new() }
    }

    pub fn zero() -> Self {
        Self::new(0)
    }

    pub fn one() -> Self {
        Self::new(1)
    }

    /// Creates `name^1` with a unit coefficient
    pub fn parameter(name: impl Into<String>) -> Self {
        Self::one().with_power(name, 1)
    }

    /// Multiplies in `name^exponent`
    pub fn with_power(mut self, name: impl Into<String>, exponent: u32) -> Self {
        if exponent > 0 && self.coefficient != 0 {
            *self.powers.entry(name.into()).or_insert(0) += exponent;
        }
        self
    }

    pub fn coefficient(&self) -> i64 {
        self.coefficient
    }

    pub fn powers(&self) -> &BTreeMap<String, u32> {
        &self.powers
    }

    /// Names of the parameters this product depends on
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.powers.keys().map(String::as_str)
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient == 0
    }

    pub fn is_unit(&self) -> bool {
        self.coefficient == 1 && self.powers.is_empty()
    }

    /// True when no parameter is left
    pub fn is_number(&self) -> bool {
        self.powers.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.coefficient < 0
    }

    /// The parametric part with a unit coefficient
    pub fn parameter_part(&self) -> Product {
        Self {
            coefficient: if self.coefficient == 0 { 0 } else { 1 },
            powers: self.powers.clone(),
        }
    }

    /// True if both products share the same parameters with the same exponents
    pub fn same_parameters(&self, other: &Product) -> bool {
        self.powers == other.powers
    }

    pub fn negate(&self) -> Product {
        Self {
            coefficient: -self.coefficient,
            powers: self.powers.clone(),
        }
    }

    pub fn abs(&self) -> Product {
        Self {
            coefficient: self.coefficient.abs(),
            powers: self.powers.clone(),
        }
    }

    /// Sums exponents and multiplies coefficients
    pub fn multiply(&self, other: &Product) -> Product {
        let coefficient = self.coefficient * other.coefficient;
        if coefficient == 0 {
            return Product::zero();
        }
        let mut powers = self.powers.clone();
        for (name, exponent) in &other.powers {
            *powers.entry(name.clone()).or_insert(0) += exponent;
        }
        Self { coefficient, powers }
    }

    /// Greatest common divisor, always non-negative
    ///
    /// The numeric part follows Euclid (so `gcd(0, x) = |x|`) and the
    /// parametric part keeps the shared parameters at their minimum exponent.
    pub fn gcd(&self, other: &Product) -> Product {
        if self.is_zero() {
            return other.abs();
        }
        if other.is_zero() {
            return self.abs();
        }
        let coefficient = Integer::gcd(&self.coefficient, &other.coefficient);
        let powers = self
            .powers
            .iter()
            .filter_map(|(name, exponent)| other.powers.get(name).map(|theirs| (name.clone(), (*exponent).min(*theirs))))
            .collect();
        Self { coefficient, powers }
    }

    /// Least common multiple, always non-negative
    pub fn lcm(&self, other: &Product) -> Product {
        if self.is_zero() || other.is_zero() {
            return Product::zero();
        }
        let coefficient = Integer::lcm(&self.coefficient, &other.coefficient);
        let mut powers = self.powers.clone();
        for (name, exponent) in &other.powers {
            let entry = powers.entry(name.clone()).or_insert(0);
            *entry = (*entry).max(*exponent);
        }
        Self { coefficient, powers }
    }

    /// Divides by a known factor of `self`, such as the result of [`Product::gcd`]
    pub(crate) fn strip(&self, factor: &Product) -> Product {
        if factor.is_zero() || self.is_zero() {
            return self.clone();
        }
        let mut powers = self.powers.clone();
        for (name, exponent) in &factor.powers {
            if let Some(current) = powers.get_mut(name) {
                *current = current.saturating_sub(*exponent);
                if *current == 0 {
                    powers.remove(name);
                }
            }
        }
        Self {
            coefficient: self.coefficient / factor.coefficient,
            powers,
        }
    }

    /// Substitutes an integer for a parameter
    pub fn evaluate(&self, parameter: &str, value: i64) -> SymbolResult<Product> {
        let Some(exponent) = self.powers.get(parameter) else {
            return Ok(self.clone());
        };
        let mut powers = self.powers.clone();
        powers.remove(parameter);
        let coefficient = num_traits::checked_pow(value, *exponent as usize)
            .and_then(|factor| self.coefficient.checked_mul(factor))
            .ok_or_else(|| SymbolError::Overflow(format!("{self} with {parameter}={value}")))?;
        if coefficient == 0 {
            return Ok(Product::zero());
        }
        Ok(Self { coefficient, powers })
    }
}

impl Default for Product {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for Product {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl FromStr for Product {
    type Err = SymbolError;

    /// Parses `-? coefficient? (name ('^' exponent)?) ('*' ...)*`
    fn from_str(input: &str) -> SymbolResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SymbolError::parse(input, "empty expression"));
        }

        let mut product = Product::one();
        for raw in trimmed.split('*') {
            let mut token = raw.trim();
            while let Some(rest) = token.strip_prefix('-') {
                product.coefficient = -product.coefficient;
                token = rest.trim_start();
            }
            if token.is_empty() {
                return Err(SymbolError::parse(input, "empty factor"));
            }

            let (base, exponent) = match token.split_once('^') {
                Some((base, exponent)) => (base.trim(), parse_exponent(input, exponent.trim())?),
                None => (token, 1),
            };

            if base.chars().all(|c| c.is_ascii_digit()) {
                let number: i64 = base.parse().map_err(|_| SymbolError::parse(input, format!("invalid number '{base}'")))?;
                let factor = num_traits::checked_pow(number, exponent as usize).ok_or_else(|| SymbolError::parse(input, "coefficient overflow"))?;
                product.coefficient = product.coefficient.checked_mul(factor).ok_or_else(|| SymbolError::parse(input, "coefficient overflow"))?;
            } else if is_identifier(base) {
                product = product.with_power(base, exponent);
            } else {
                return Err(SymbolError::parse(input, format!("invalid factor '{base}'")));
            }
        }

        if product.coefficient == 0 {
            return Ok(Product::zero());
        }
        Ok(product)
    }
}

fn parse_exponent(input: &str, exponent: &str) -> SymbolResult<u32> {
    if exponent.starts_with('-') {
        return Err(SymbolError::parse(input, "negative exponent"));
    }
    exponent.parse().map_err(|_| SymbolError::parse(input, format!("invalid exponent '{exponent}'")))
}

pub(crate) fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.powers.is_empty() {
            return write!(f, "{}", self.coefficient);
        }
        match self.coefficient {
            1 => {}
            -1 => write!(f, "-")?,
            other => write!(f, "{other}*")?,
        }
        let factors: Vec<String> = self
            .powers
            .iter()
            .map(|(name, exponent)| if *exponent == 1 { name.clone() } else { format!("{name}^{exponent}") })
            .collect();
        write!(f, "{}", factors.join("*"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(text: &str) -> Product {
        text.parse().unwrap()
    }

    #[test]
    fn test_parse_coefficient_and_powers() {
        let p = product("6*p^2*q");
        assert_eq!(p.coefficient(), 6);
        assert_eq!(p.powers().get("p"), Some(&2));
        assert_eq!(p.powers().get("q"), Some(&1));
        assert_eq!(p.to_string(), "6*p^2*q");
    }

    #[test]
    fn test_parse_leading_minus_and_numeric_power() {
        assert_eq!(product("-p").to_string(), "-p");
        assert_eq!(product("2^3*x").coefficient(), 8);
        assert_eq!(product("- 3 * - n").to_string(), "3*n");
        assert!(product("0*p").is_zero());
        assert!(product("p^0").is_unit());
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(matches!("p^-1".parse::<Product>(), Err(SymbolError::Parse { .. })));
        assert!(matches!("".parse::<Product>(), Err(SymbolError::Parse { .. })));
        assert!(matches!("2**p".parse::<Product>(), Err(SymbolError::Parse { .. })));
        assert!(matches!("1p".parse::<Product>(), Err(SymbolError::Parse { .. })));
    }

    #[test]
    fn test_multiply_merges_exponents() {
        assert_eq!(product("6*p").multiply(&product("p")), product("6*p^2"));
        assert_eq!(product("-2*q").multiply(&product("-3*p")), product("6*p*q"));
        assert!(product("p").multiply(&Product::zero()).is_zero());
    }

    #[test]
    fn test_gcd_and_lcm() {
        assert_eq!(product("6*p^2*q").gcd(&product("4*p*r")), product("2*p"));
        assert_eq!(product("6*p").lcm(&product("4*p^2")), product("12*p^2"));
        assert_eq!(Product::zero().gcd(&product("-3*p")), product("3*p"));
    }

    #[test]
    fn test_evaluate_substitutes_powers() {
        let p = product("3*p^2*q");
        let partial = p.evaluate("p", 2).unwrap();
        assert_eq!(partial, product("12*q"));
        assert_eq!(partial.evaluate("q", 5).unwrap(), Product::new(60));
        assert_eq!(p.evaluate("r", 9).unwrap(), p);
    }

    #[test]
    fn test_evaluate_overflow_is_an_error() {
        assert!(matches!(product("p^3").evaluate("p", 4_294_967_296), Err(SymbolError::Overflow(_))));
        assert!(matches!(product("4294967296*p").evaluate("p", 4_294_967_296), Err(SymbolError::Overflow(_))));
        assert_eq!(product("p^2").evaluate("p", 3_037_000_499).unwrap(), Product::new(9_223_372_030_926_249_001));
    }
}
