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

//! Boolean guard expressions
//!
//! Guards are written with `!`, `&`, `|`, parentheses, parameter names and
//! the literals `tt`/`ff`. Negation binds tightest, then `&`, then `|`.

use crate::error::{SymbolError, SymbolResult};
use crate::product::is_identifier;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOperator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Atom {
    Literal(bool),
    Parameter(String),
}

/// Leaf of a guard: one parameter or literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanValue {
    atom: Atom,

    negated: bool,

    /// Value bound for the current evaluation round
    bound: Option<bool>,
}

impl BooleanValue {
    pub fn parameter(name: impl Into<String>) -> Self {
        Self {
            atom: Atom::Parameter(name.into()),
            negated: false,
            bound: None,
        }
    }

    pub fn literal(value: bool) -> Self {
        Self {
            atom: Atom::Literal(value),
            negated: false,
            bound: Some(value),
        }
    }

    /// Parameter name, `None` for literals
    pub fn name(&self) -> Option<&str> {
        match &self.atom {
            Atom::Parameter(name) => Some(name),
            Atom::Literal(_) => None,
        }
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BooleanExpression {
    Value(BooleanValue),
    Composite {
        left: Box<BooleanExpression>,
        operator: BooleanOperator,
        right: Box<BooleanExpression>,
        negated: bool,
    },
}

impl BooleanExpression {
    pub fn parse(input: &str) -> SymbolResult<Self> {
        let tokens = tokenize(input)?;
        let mut parser = Parser { input, tokens, position: 0 };
        let expression = parser.disjunction()?;
        match parser.peek() {
            None => Ok(expression),
            Some(token) => Err(SymbolError::parse(input, format!("unexpected '{token}'"))),
        }
    }

    /// The guard that always holds
    pub fn always() -> Self {
        BooleanExpression::Value(BooleanValue::literal(true))
    }

    pub fn negate(self) -> Self {
        match self {
            BooleanExpression::Value(mut value) => {
                value.negated = !value.negated;
                BooleanExpression::Value(value)
            }
            BooleanExpression::Composite { left, operator, right, negated } => BooleanExpression::Composite {
                left,
                operator,
                right,
                negated: !negated,
            },
        }
    }

    /// Every parameter name mentioned, literals excluded
    pub fn parameters(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_parameters(&mut names);
        names
    }

    fn collect_parameters(&self, names: &mut BTreeSet<String>) {
        match self {
            BooleanExpression::Value(value) => {
                if let Some(name) = value.name() {
                    names.insert(name.to_string());
                }
            }
            BooleanExpression::Composite { left, right, .. } => {
                left.collect_parameters(names);
                right.collect_parameters(names);
            }
        }
    }

    pub fn mentions(&self, parameter: &str) -> bool {
        match self {
            BooleanExpression::Value(value) => value.name() == Some(parameter),
            BooleanExpression::Composite { left, right, .. } => left.mentions(parameter) || right.mentions(parameter),
        }
    }

    /// Binds every leaf naming `parameter`
    pub fn bind(&mut self, parameter: &str, value: bool) {
        match self {
            BooleanExpression::Value(leaf) => {
                if leaf.name() == Some(parameter) {
                    leaf.bound = Some(value);
                }
            }
            BooleanExpression::Composite { left, right, .. } => {
                left.bind(parameter, value);
                right.bind(parameter, value);
            }
        }
    }

    /// Forgets every parameter binding
    pub fn reset(&mut self) {
        match self {
            BooleanExpression::Value(leaf) => {
                if let Atom::Parameter(_) = leaf.atom {
                    leaf.bound = None;
                }
            }
            BooleanExpression::Composite { left, right, .. } => {
                left.reset();
                right.reset();
            }
        }
    }

    pub fn is_bound(&self) -> bool {
        match self {
            BooleanExpression::Value(leaf) => leaf.bound.is_some(),
            BooleanExpression::Composite { left, right, .. } => left.is_bound() && right.is_bound(),
        }
    }

    /// Value under the current bindings
    pub fn value(&self) -> SymbolResult<bool> {
        match self {
            BooleanExpression::Value(leaf) => match leaf.bound {
                Some(value) => Ok(value != leaf.negated),
                None => Err(SymbolError::UnboundGuard(leaf.name().unwrap_or_default().to_string())),
            },
            BooleanExpression::Composite { left, operator, right, negated } => {
                let combined = match operator {
                    BooleanOperator::And => left.value()? && right.value()?,
                    BooleanOperator::Or => left.value()? || right.value()?,
                };
                Ok(combined != *negated)
            }
        }
    }
}

impl FromStr for BooleanExpression {
    type Err = SymbolError;

    fn from_str(input: &str) -> SymbolResult<Self> {
        BooleanExpression::parse(input)
    }
}

impl fmt::Display for BooleanExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanExpression::Value(leaf) => {
                if leaf.negated {
                    write!(f, "!")?;
                }
                match &leaf.atom {
                    Atom::Literal(true) => write!(f, "tt"),
                    Atom::Literal(false) => write!(f, "ff"),
                    Atom::Parameter(name) => write!(f, "{name}"),
                }
            }
            BooleanExpression::Composite { left, operator, right, negated } => {
                let symbol = match operator {
                    BooleanOperator::And => "&",
                    BooleanOperator::Or => "|",
                };
                if *negated {
                    write!(f, "!")?;
                }
                write!(f, "({left} {symbol} {right})")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Not,
    And,
    Or,
    Open,
    Close,
    Name(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Not => write!(f, "!"),
            Token::And => write!(f, "&"),
            Token::Or => write!(f, "|"),
            Token::Open => write!(f, "("),
            Token::Close => write!(f, ")"),
            Token::Name(name) => write!(f, "{name}"),
        }
    }
}

fn tokenize(input: &str) -> SymbolResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '!' => tokens.push(Token::Not),
            '&' => tokens.push(Token::And),
            '|' => tokens.push(Token::Or),
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            _ => {
                let mut end = start + c.len_utf8();
                while let Some(&(index, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        end = index + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let name = &input[start..end];
                if !is_identifier(name) {
                    return Err(SymbolError::parse(input, format!("invalid name '{name}'")));
                }
                tokens.push(Token::Name(name.to_string()));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn disjunction(&mut self) -> SymbolResult<BooleanExpression> {
        let mut left = self.conjunction()?;
        while self.peek() == Some(&Token::Or) {
            self.position += 1;
            let right = self.conjunction()?;
            left = combine(left, BooleanOperator::Or, right);
        }
        Ok(left)
    }

    fn conjunction(&mut self) -> SymbolResult<BooleanExpression> {
        let mut left = self.unary()?;
        while self.peek() == Some(&Token::And) {
            self.position += 1;
            let right = self.unary()?;
            left = combine(left, BooleanOperator::And, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> SymbolResult<BooleanExpression> {
        match self.next() {
            Some(Token::Not) => Ok(self.unary()?.negate()),
            Some(Token::Open) => {
                let inner = self.disjunction()?;
                match self.next() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(SymbolError::parse(self.input, "missing ')'")),
                }
            }
            Some(Token::Name(name)) => Ok(BooleanExpression::Value(match name.as_str() {
                "tt" => BooleanValue::literal(true),
                "ff" => BooleanValue::literal(false),
                _ => BooleanValue::parameter(name),
            })),
            Some(token) => Err(SymbolError::parse(self.input, format!("unexpected '{token}'"))),
            None => Err(SymbolError::parse(self.input, "unexpected end of guard")),
        }
    }
}

fn combine(left: BooleanExpression, operator: BooleanOperator, right: BooleanExpression) -> BooleanExpression {
    BooleanExpression::Composite {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        negated: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_and_rendering() {
        let guard = BooleanExpression::parse("a | b & !c").unwrap();
        assert_eq!(guard.to_string(), "(a | (b & !c))");
        let grouped = BooleanExpression::parse("!(a | b) & c").unwrap();
        assert_eq!(grouped.to_string(), "(!(a | b) & c)");
    }

    #[test]
    fn test_nested_parentheses() {
        let guard = BooleanExpression::parse("((a & (b | c)) | !(d))").unwrap();
        assert_eq!(guard.parameters().into_iter().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
        assert!(guard.mentions("c"));
        assert!(!guard.mentions("e"));
    }

    #[test]
    fn test_literals_are_always_bound() {
        let mut guard = BooleanExpression::parse("tt & p").unwrap();
        assert!(!guard.is_bound());
        assert!(matches!(guard.value(), Err(SymbolError::UnboundGuard(ref name)) if name == "p"));
        guard.bind("p", false);
        assert!(guard.is_bound());
        assert!(!guard.value().unwrap());
        guard.bind("p", true);
        assert!(guard.value().unwrap());
        guard.reset();
        assert!(!guard.is_bound());
        assert!(BooleanExpression::parse("!ff").unwrap().value().unwrap());
    }

    #[test]
    fn test_negated_composite_evaluates() {
        let mut guard = BooleanExpression::parse("!(a & b)").unwrap();
        guard.bind("a", true);
        guard.bind("b", true);
        assert!(!guard.value().unwrap());
        guard.bind("b", false);
        assert!(guard.value().unwrap());
    }

    #[test]
    fn test_malformed_guards_are_rejected() {
        for input in ["", "a &", "(a | b", "a b", "a & 1x", ")"] {
            assert!(matches!(BooleanExpression::parse(input), Err(SymbolError::Parse { .. })), "{input}");
        }
    }
}
