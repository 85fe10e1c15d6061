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

//! Closed expression type and its arithmetic
//!
//! Plain values ([`Product`], [`Fraction`], [`Polynomial`]) are kept in their
//! simplest shape after every operation. Once a value carries a pending
//! ceiling or floor, any further arithmetic is recorded in one of the
//! composite variants and replayed by [`Expression::evaluate`] when the
//! rounding can be resolved.

use crate::error::{SymbolError, SymbolResult};
use crate::fraction::{Fraction, Rounding};
use crate::polynomial::Polynomial;
use crate::product::Product;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Product(Product),
    Fraction(Fraction),
    Polynomial(Polynomial),
    /// Deferred multiplication of every item
    CompositeProduct(Vec<Expression>),
    /// Deferred sum of every item
    CompositePolynomial(Vec<Expression>),
    /// Deferred division
    CompositeFraction(Box<Expression>, Box<Expression>),
}

impl Expression {
    pub fn zero() -> Self {
        Expression::Product(Product::zero())
    }

    pub fn one() -> Self {
        Expression::Product(Product::one())
    }

    pub fn number(value: i64) -> Self {
        Expression::Product(Product::new(value))
    }

    /// Parses the product grammar, e.g. `2*p^2*q`
    pub fn parse(input: &str) -> SymbolResult<Self> {
        input.parse::<Product>().map(Expression::Product)
    }

    fn from_fraction(fraction: Fraction) -> Self {
        if fraction.is_product() {
            Expression::Product(fraction.numerator().clone())
        } else {
            Expression::Fraction(fraction)
        }
    }

    fn from_polynomial(polynomial: Polynomial) -> Self {
        match polynomial.terms() {
            [] => Expression::zero(),
            [single] => Self::from_fraction(single.with_rounding(polynomial.rounding())),
            _ => Expression::Polynomial(polynomial),
        }
    }

    /// Terms of a plain value, ignoring any rounding marker
    fn terms(&self) -> Option<Vec<Fraction>> {
        match self {
            Expression::Product(product) => Some(vec![Fraction::from_product(product.clone())]),
            Expression::Fraction(fraction) => Some(vec![fraction.exact()]),
            Expression::Polynomial(polynomial) => Some(polynomial.terms().to_vec()),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Expression::CompositeProduct(_) | Expression::CompositePolynomial(_) | Expression::CompositeFraction(..))
    }

    /// Every parameter the value still mentions
    pub fn parameters(&self) -> BTreeSet<String> {
        match self {
            Expression::Product(product) => product.parameters().map(str::to_string).collect(),
            Expression::Fraction(fraction) => fraction.numerator().parameters().chain(fraction.denominator().parameters()).map(str::to_string).collect(),
            Expression::Polynomial(polynomial) => polynomial
                .terms()
                .iter()
                .flat_map(|term| term.numerator().parameters().chain(term.denominator().parameters()))
                .map(str::to_string)
                .collect(),
            Expression::CompositeProduct(items) | Expression::CompositePolynomial(items) => items.iter().flat_map(Expression::parameters).collect(),
            Expression::CompositeFraction(numerator, denominator) => numerator.parameters().into_iter().chain(denominator.parameters()).collect(),
        }
    }

    pub fn has_ceiling(&self) -> bool {
        match self {
            Expression::Product(_) => false,
            Expression::Fraction(fraction) => fraction.rounding() == Rounding::Ceiling,
            Expression::Polynomial(polynomial) => polynomial.rounding() == Rounding::Ceiling,
            Expression::CompositeProduct(items) | Expression::CompositePolynomial(items) => items.iter().any(Expression::has_ceiling),
            Expression::CompositeFraction(numerator, denominator) => numerator.has_ceiling() || denominator.has_ceiling(),
        }
    }

    pub fn has_floor(&self) -> bool {
        match self {
            Expression::Product(_) => false,
            Expression::Fraction(fraction) => fraction.rounding() == Rounding::Floor,
            Expression::Polynomial(polynomial) => polynomial.rounding() == Rounding::Floor,
            Expression::CompositeProduct(items) | Expression::CompositePolynomial(items) => items.iter().any(Expression::has_floor),
            Expression::CompositeFraction(numerator, denominator) => numerator.has_floor() || denominator.has_floor(),
        }
    }

    /// True while some rounding is unresolved
    pub fn is_pending(&self) -> bool {
        self.has_ceiling() || self.has_floor()
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Expression::Product(product) => product.is_zero(),
            Expression::Fraction(fraction) => fraction.is_zero(),
            Expression::Polynomial(polynomial) => polynomial.is_zero(),
            _ => false,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Expression::Product(product) if product.is_unit())
    }

    /// True for a parameter-free whole number
    pub fn is_number(&self) -> bool {
        match self {
            Expression::Product(product) => product.is_number(),
            Expression::Fraction(fraction) => !fraction.rounding().is_pending() && fraction.is_number(),
            _ => false,
        }
    }

    pub fn is_product(&self) -> bool {
        matches!(self, Expression::Product(_))
    }

    /// True for a single exact term
    pub fn is_fraction(&self) -> bool {
        match self {
            Expression::Product(_) => true,
            Expression::Fraction(fraction) => !fraction.rounding().is_pending(),
            _ => false,
        }
    }

    pub fn as_product(&self) -> SymbolResult<Product> {
        match self {
            Expression::Product(product) => Ok(product.clone()),
            other => Err(SymbolError::mismatch("product", other)),
        }
    }

    pub fn as_fraction(&self) -> SymbolResult<Fraction> {
        match self {
            Expression::Product(product) => Ok(Fraction::from_product(product.clone())),
            Expression::Fraction(fraction) => Ok(fraction.clone()),
            other => Err(SymbolError::mismatch("fraction", other)),
        }
    }

    pub fn as_polynomial(&self) -> SymbolResult<Polynomial> {
        match self {
            Expression::Polynomial(polynomial) => Ok(polynomial.clone()),
            other if !other.is_pending() => match other.terms() {
                Some(terms) => Ok(Polynomial::new(terms)),
                None => Err(SymbolError::mismatch("polynomial", other)),
            },
            other => Err(SymbolError::mismatch("polynomial", other)),
        }
    }

    pub fn as_number(&self) -> SymbolResult<i64> {
        match self {
            Expression::Product(product) if product.is_number() => Ok(product.coefficient()),
            other => Err(SymbolError::mismatch("number", other)),
        }
    }

    pub fn add(&self, other: &Expression) -> Expression {
        if self.is_pending() || other.is_pending() {
            let mut items = Vec::new();
            for side in [self, other] {
                match side {
                    Expression::CompositePolynomial(inner) => items.extend(inner.iter().cloned()),
                    plain => items.push(plain.clone()),
                }
            }
            return Expression::CompositePolynomial(items);
        }
        let terms = self.terms().into_iter().flatten().chain(other.terms().into_iter().flatten());
        Self::from_polynomial(Polynomial::new(terms))
    }

    pub fn negate(&self) -> Expression {
        if self.is_pending() {
            return Expression::number(-1).multiply(self);
        }
        match self {
            Expression::Product(product) => Expression::Product(product.negate()),
            Expression::Fraction(fraction) => Expression::Fraction(fraction.negate()),
            Expression::Polynomial(polynomial) => Expression::Polynomial(polynomial.negate()),
            composite => Expression::number(-1).multiply(composite),
        }
    }

    pub fn subtract(&self, other: &Expression) -> Expression {
        self.add(&other.negate())
    }

    pub fn multiply(&self, other: &Expression) -> Expression {
        if self.is_pending() || other.is_pending() {
            let mut items = Vec::new();
            for side in [self, other] {
                match side {
                    Expression::CompositeProduct(inner) => items.extend(inner.iter().cloned()),
                    plain => items.push(plain.clone()),
                }
            }
            return Expression::CompositeProduct(items);
        }
        match (self, other) {
            (Expression::Product(left), Expression::Product(right)) => Expression::Product(left.multiply(right)),
            (Expression::Polynomial(_), _) | (_, Expression::Polynomial(_)) => {
                let left = Polynomial::new(self.terms().unwrap_or_default());
                let right = Polynomial::new(other.terms().unwrap_or_default());
                Self::from_polynomial(left.multiply(&right))
            }
            _ => {
                let left = self.terms().unwrap_or_default();
                let right = other.terms().unwrap_or_default();
                match (left.first(), right.first()) {
                    (Some(left), Some(right)) => Self::from_fraction(left.multiply(right)),
                    _ => Expression::zero(),
                }
            }
        }
    }

    pub fn divide(&self, other: &Expression) -> SymbolResult<Expression> {
        if other.is_zero() {
            return Err(SymbolError::DivisionByZero(format!("{self}/{other}")));
        }
        if other.is_unit() {
            return Ok(self.clone());
        }
        if self.is_pending() || other.is_pending() {
            return Ok(Expression::CompositeFraction(Box::new(self.clone()), Box::new(other.clone())));
        }
        let divisor = match other {
            Expression::Polynomial(_) => return Err(SymbolError::PolynomialDivision(other.to_string())),
            _ => other.as_fraction()?,
        };
        match self {
            Expression::Polynomial(polynomial) => Ok(Self::from_polynomial(polynomial.divide(&divisor)?)),
            _ => Ok(Self::from_fraction(self.as_fraction()?.divide(&divisor)?)),
        }
    }

    /// Greatest common divisor of every numerator on both sides
    pub fn gcd(&self, other: &Expression) -> SymbolResult<Product> {
        let mut numerators = Vec::new();
        for side in [self, other] {
            let terms = side.terms().ok_or_else(|| SymbolError::mismatch("plain expression", side))?;
            numerators.extend(terms.into_iter().map(|term| term.numerator().clone()));
        }
        Ok(numerators.iter().fold(Product::zero(), |acc, numerator| acc.gcd(numerator)))
    }

    pub fn ceiling(&self) -> SymbolResult<Expression> {
        self.round(Rounding::Ceiling)
    }

    pub fn floor(&self) -> SymbolResult<Expression> {
        self.round(Rounding::Floor)
    }

    fn round(&self, rounding: Rounding) -> SymbolResult<Expression> {
        match self {
            Expression::Product(_) => Ok(self.clone()),
            Expression::Fraction(fraction) => Ok(Self::from_fraction(fraction.with_rounding(rounding))),
            Expression::Polynomial(polynomial) => Ok(Self::from_polynomial(polynomial.with_rounding(rounding))),
            composite => Err(SymbolError::NestedRounding(composite.to_string())),
        }
    }

    /// Substitutes an integer for a parameter
    ///
    /// Composites fold back into plain values once none of their items is
    /// still pending.
    pub fn evaluate(&self, parameter: &str, value: i64) -> SymbolResult<Expression> {
        match self {
            Expression::Product(product) => Ok(Expression::Product(product.evaluate(parameter, value)?)),
            Expression::Fraction(fraction) => Ok(Self::from_fraction(fraction.evaluate(parameter, value)?)),
            Expression::Polynomial(polynomial) => Ok(Self::from_polynomial(polynomial.evaluate(parameter, value)?)),
            Expression::CompositeProduct(items) => {
                let items = evaluate_items(items, parameter, value)?;
                if items.iter().any(Expression::is_pending) {
                    return Ok(Expression::CompositeProduct(items));
                }
                Ok(items.iter().fold(Expression::one(), |acc, item| acc.multiply(item)))
            }
            Expression::CompositePolynomial(items) => {
                let items = evaluate_items(items, parameter, value)?;
                if items.iter().any(Expression::is_pending) {
                    return Ok(Expression::CompositePolynomial(items));
                }
                Ok(items.iter().fold(Expression::zero(), |acc, item| acc.add(item)))
            }
            Expression::CompositeFraction(numerator, denominator) => {
                let numerator = numerator.evaluate(parameter, value)?;
                let denominator = denominator.evaluate(parameter, value)?;
                if numerator.is_pending() || denominator.is_pending() {
                    return Ok(Expression::CompositeFraction(Box::new(numerator), Box::new(denominator)));
                }
                numerator.divide(&denominator)
            }
        }
    }

    /// Substitutes every binding in turn
    pub fn evaluate_all<'a>(&self, bindings: impl IntoIterator<Item = (&'a str, i64)>) -> SymbolResult<Expression> {
        bindings.into_iter().try_fold(self.clone(), |acc, (parameter, value)| acc.evaluate(parameter, value))
    }
}

fn evaluate_items(items: &[Expression], parameter: &str, value: i64) -> SymbolResult<Vec<Expression>> {
    items.iter().map(|item| item.evaluate(parameter, value)).collect()
}

impl Default for Expression {
    fn default() -> Self {
        Expression::zero()
    }
}

impl From<Product> for Expression {
    fn from(product: Product) -> Self {
        Expression::Product(product)
    }
}

impl From<Fraction> for Expression {
    fn from(fraction: Fraction) -> Self {
        Self::from_fraction(fraction)
    }
}

impl From<Polynomial> for Expression {
    fn from(polynomial: Polynomial) -> Self {
        Self::from_polynomial(polynomial)
    }
}

impl From<i64> for Expression {
    fn from(value: i64) -> Self {
        Expression::number(value)
    }
}

impl FromStr for Expression {
    type Err = SymbolError;

    fn from_str(input: &str) -> SymbolResult<Self> {
        Expression::parse(input)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Product(product) => write!(f, "{product}"),
            Expression::Fraction(fraction) => write!(f, "{fraction}"),
            Expression::Polynomial(polynomial) => write!(f, "{polynomial}"),
            Expression::CompositeProduct(items) => {
                let rendered: Vec<String> = items.iter().map(|item| format!("({item})")).collect();
                write!(f, "{}", rendered.join("*"))
            }
            Expression::CompositePolynomial(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", rendered.join(" + "))
            }
            Expression::CompositeFraction(numerator, denominator) => write!(f, "({numerator})/({denominator})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(text: &str) -> Expression {
        Expression::parse(text).unwrap()
    }

    #[test]
    fn test_product_arithmetic() {
        assert_eq!(expr("6*p").multiply(&expr("p")), expr("6*p^2"));
        assert_eq!(expr("3*q^3").divide(&expr("3")).unwrap(), expr("q^3"));
        assert_eq!(expr("p").divide(&expr("1")).unwrap(), expr("p"));
    }

    #[test]
    fn test_divide_by_zero_fails() {
        assert!(matches!(expr("p").divide(&Expression::zero()), Err(SymbolError::DivisionByZero(_))));
    }

    #[test]
    fn test_negating_pending_rounding_rounds_first() {
        let ceiling = expr("i").divide(&expr("3")).unwrap().ceiling().unwrap();
        let negated = Expression::zero().subtract(&ceiling);
        assert!(negated.is_composite());
        assert_eq!(negated.evaluate("i", 4).unwrap(), Expression::number(-2));

        let floor = expr("i").divide(&expr("3")).unwrap().floor().unwrap();
        assert_eq!(floor.negate().evaluate("i", 4).unwrap(), Expression::number(-1));
        assert_eq!(expr("5").subtract(&floor).evaluate("i", 7).unwrap(), Expression::number(3));
    }

    #[test]
    fn test_six_over_four_reduces() {
        let value = expr("6").divide(&expr("4")).unwrap();
        let fraction = value.as_fraction().unwrap();
        assert_eq!(fraction.numerator(), &Product::new(3));
        assert_eq!(fraction.denominator(), &Product::new(2));
        assert!(!value.is_product());
        assert!(!value.is_number());
    }

    #[test]
    fn test_addition_collapses_to_simplest_shape() {
        let sum = expr("p").add(&expr("2*p"));
        assert_eq!(sum, expr("3*p"));
        let mixed = expr("p").add(&expr("1"));
        assert!(matches!(mixed, Expression::Polynomial(_)));
        assert_eq!(mixed.subtract(&expr("p")), expr("1"));
        assert!(mixed.as_product().is_err());
    }

    #[test]
    fn test_polynomial_divisor_is_rejected() {
        let poly = expr("p").add(&expr("1"));
        assert!(matches!(expr("q").divide(&poly), Err(SymbolError::PolynomialDivision(_))));
    }

    #[test]
    fn test_gcd_over_numerators() {
        let poly = expr("4*p^2").add(&expr("6*p"));
        assert_eq!(poly.gcd(&expr("10*p^3")).unwrap(), Product::parameter("p").multiply(&Product::new(2)));
    }

    #[test]
    fn test_ceiling_is_noop_on_products() {
        assert_eq!(expr("2*p").ceiling().unwrap(), expr("2*p"));
        assert_eq!(expr("7").divide(&expr("2")).unwrap().ceiling().unwrap(), expr("4"));
    }

    #[test]
    fn test_arithmetic_through_rounding_builds_composites() {
        let rounded = expr("i").divide(&expr("3")).unwrap().ceiling().unwrap();
        assert!(rounded.has_ceiling());

        let scaled = expr("2").multiply(&rounded);
        assert!(matches!(scaled, Expression::CompositeProduct(ref items) if items.len() == 2));

        let shifted = scaled.add(&expr("1")).add(&expr("-2"));
        assert!(matches!(shifted, Expression::CompositePolynomial(ref items) if items.len() == 3));
        assert!(matches!(shifted.ceiling(), Err(SymbolError::NestedRounding(_))));

        assert_eq!(shifted.evaluate("i", 1).unwrap(), expr("1"));
        assert_eq!(shifted.evaluate("i", 4).unwrap(), expr("3"));
        assert_eq!(shifted.evaluate("i", 6).unwrap(), expr("3"));
    }

    #[test]
    fn test_composite_fraction_folds() {
        let rounded = expr("p").divide(&expr("2")).unwrap().floor().unwrap();
        let ratio = expr("q").divide(&rounded).unwrap();
        assert!(matches!(ratio, Expression::CompositeFraction(..)));
        let partial = ratio.evaluate("q", 6).unwrap();
        assert!(partial.is_composite());
        assert_eq!(partial.evaluate("p", 5).unwrap(), expr("3"));
    }

    #[test]
    fn test_evaluate_all_in_order() {
        let value = expr("p*q").divide(&expr("r")).unwrap();
        let result = value.evaluate_all([("p", 3), ("q", 4), ("r", 6)]).unwrap();
        assert_eq!(result.as_number().unwrap(), 2);
    }

    #[test]
    fn test_conversions_report_mismatch() {
        let poly = expr("p").add(&expr("q"));
        assert!(matches!(poly.as_product(), Err(SymbolError::TypeMismatch { .. })));
        assert!(matches!(poly.as_fraction(), Err(SymbolError::TypeMismatch { .. })));
        assert_eq!(poly.as_polynomial().unwrap().terms().len(), 2);
        assert!(matches!(expr("p").as_number(), Err(SymbolError::TypeMismatch { .. })));
    }

    #[test]
    fn test_parameters_reach_into_composites() {
        let rounded = expr("i").divide(&expr("r")).unwrap().ceiling().unwrap();
        let value = expr("w").multiply(&rounded).add(&expr("q"));
        let names: Vec<String> = value.parameters().into_iter().collect();
        assert_eq!(names, vec!["i", "q", "r", "w"]);
        assert!(expr("6").parameters().is_empty());
    }
}
