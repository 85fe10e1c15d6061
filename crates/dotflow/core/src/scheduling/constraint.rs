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

//! Firing constraints between actors
//!
//! A constraint states that the `i`-th firing of its dependent actor needs
//! `f(i)` completed firings of its dependency. Guarded constraints only
//! apply when their guard holds for the boolean values the dependent reads
//! at that firing.

use crate::error::ScheduleError;
use crate::graph::{ActorId, EdgeId, Graph};
use dotflow_symbol::{BooleanExpression, Expression, Product};
use std::collections::BTreeMap;

/// Parameter bound to the dependent's firing number in requirement functions
pub const FIRING_INDEX: &str = "i";

/// Origin of a constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Token availability on an edge
    Data(EdgeId),

    /// A user must not read a boolean value before its modifier wrote it
    Modifier { parameter: String },

    /// Added by the caller
    User,
}

/// Outcome of evaluating a constraint for one firing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The guard depends on values not propagated yet
    Unset,

    /// Completed dependency firings needed
    Needs(u64),
}

#[derive(Debug, Clone)]
pub struct Constraint {
    kind: ConstraintKind,

    dependent: ActorId,

    dependency: ActorId,

    /// `f(i)` over the firing index and integer parameters
    requirement: Expression,

    guard: Option<BooleanExpression>,

    /// Reading period per guard parameter, symbolic until resolved
    periods: BTreeMap<String, Expression>,

    /// Reading period per guard parameter once resolved
    reading: BTreeMap<String, u64>,

    /// Values seen per guard parameter, one entry per dependent firing
    history: BTreeMap<String, Vec<bool>>,

    shift: i64,
}

impl Constraint {
    fn new(kind: ConstraintKind, dependent: ActorId, dependency: ActorId, requirement: Expression) -> Self {
        Self {
            kind,
            dependent,
            dependency,
            requirement,
            guard: None,
            periods: BTreeMap::new(),
            reading: BTreeMap::new(),
            history: BTreeMap::new(),
            shift: 0,
        }
    }

    /// `consumer[i]` needs `producer[ceil((rate_out*i - tokens)/rate_in)]`
    pub fn data(graph: &Graph, id: EdgeId) -> Result<Self, ScheduleError> {
        let edge = graph.edge(id);
        let index = Expression::from(Product::parameter(FIRING_INDEX));
        let requirement = Expression::from(edge.rate_out().clone())
            .multiply(&index)
            .subtract(edge.tokens())
            .divide(&Expression::from(edge.rate_in().clone()))?
            .ceiling()?;

        let mut constraint = Self::new(ConstraintKind::Data(id), edge.consumer(), edge.producer(), requirement);
        if let Some(guard) = edge.guard() {
            let consumer = graph.actor(edge.consumer());
            let periods = guard
                .parameters()
                .into_iter()
                .map(|parameter| {
                    let period = consumer.reading_period(&parameter).cloned().unwrap_or_else(Product::one);
                    (parameter, Expression::from(period))
                })
                .collect();
            constraint = constraint.with_guard(guard.clone(), periods);
        }
        Ok(constraint)
    }

    /// `user[i]` needs `modifier[w*ceil(i/reading_period) + 1 - w]`
    pub fn modifier(parameter: &str, user: ActorId, modifier: ActorId, period: &Product, reading_period: &Product) -> Result<Self, ScheduleError> {
        let index = Expression::from(Product::parameter(FIRING_INDEX));
        let period = Expression::from(period.clone());
        let requirement = period
            .multiply(&index.divide(&Expression::from(reading_period.clone()))?.ceiling()?)
            .add(&Expression::one())
            .subtract(&period);
        Ok(Self::new(ConstraintKind::Modifier { parameter: parameter.to_string() }, user, modifier, requirement))
    }

    pub(crate) fn user(dependent: ActorId, dependency: ActorId, requirement: Expression, shift: i64) -> Self {
        let mut constraint = Self::new(ConstraintKind::User, dependent, dependency, requirement);
        constraint.shift = shift;
        constraint
    }

    pub(crate) fn with_guard(mut self, guard: BooleanExpression, periods: BTreeMap<String, Expression>) -> Self {
        self.history = periods.keys().map(|parameter| (parameter.clone(), Vec::new())).collect();
        self.periods = periods;
        self.guard = Some(guard);
        self
    }

    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    pub fn dependent(&self) -> ActorId {
        self.dependent
    }

    pub fn dependency(&self) -> ActorId {
        self.dependency
    }

    pub fn requirement(&self) -> &Expression {
        &self.requirement
    }

    pub fn guard(&self) -> Option<&BooleanExpression> {
        self.guard.as_ref()
    }

    pub fn is_data(&self) -> bool {
        matches!(self.kind, ConstraintKind::Data(_))
    }

    pub fn involves(&self, actor: ActorId) -> bool {
        self.dependent == actor || self.dependency == actor
    }

    /// Substitutes integer parameters into the requirement and reading periods
    ///
    /// Afterwards the requirement may only mention the firing index.
    pub fn resolve(&mut self, bindings: &BTreeMap<String, i64>) -> Result<(), ScheduleError> {
        let pairs = || bindings.iter().map(|(name, value)| (name.as_str(), *value));
        self.requirement = self.requirement.evaluate_all(pairs())?;
        if self.requirement.parameters().iter().any(|name| name != FIRING_INDEX) {
            return Err(ScheduleError::UnresolvedParameter {
                what: "constraint requirement".to_string(),
                value: self.requirement.to_string(),
            });
        }

        for (parameter, period) in &self.periods {
            let resolved = period.evaluate_all(pairs())?;
            match resolved.as_number() {
                Ok(value) if value >= 1 => {
                    self.reading.insert(parameter.clone(), value as u64);
                }
                _ => {
                    return Err(ScheduleError::UnresolvedParameter {
                        what: format!("reading period of {parameter}"),
                        value: resolved.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Records a newly written value, repeated once per reading firing
    pub fn set_param(&mut self, parameter: &str, value: bool) {
        if let (Some(period), Some(values)) = (self.reading.get(parameter), self.history.get_mut(parameter)) {
            values.extend(std::iter::repeat_n(value, *period as usize));
        }
    }

    /// True when every guard parameter has a value at `index`
    pub fn is_set(&self, index: i64) -> bool {
        index >= 0 && self.history.values().all(|values| values.len() as i64 > index)
    }

    /// Value of the guard at `index`, true for unguarded constraints
    pub fn guard_value(&mut self, index: i64) -> Result<bool, ScheduleError> {
        if !self.is_set(index) {
            return match &self.guard {
                Some(guard) => Err(ScheduleError::GuardUnset { guard: guard.to_string(), index }),
                None => Ok(true),
            };
        }
        let Some(guard) = self.guard.as_mut() else {
            return Ok(true);
        };
        guard.reset();
        for (parameter, values) in &self.history {
            guard.bind(parameter, values[index as usize]);
        }
        Ok(guard.value()?)
    }

    /// Whether the edge behind this constraint carries data at the actor's
    /// `count`-th completed firing
    pub fn is_active(&mut self, count: u64) -> Result<bool, ScheduleError> {
        let index = count as i64 + self.shift;
        if !self.is_set(index) {
            return Ok(false);
        }
        self.guard_value(index)
    }

    /// Requirement for firing number `i`, counted from 1
    pub fn evaluate(&mut self, i: u64) -> Result<Requirement, ScheduleError> {
        let index = i as i64 + self.shift - 1;
        if self.guard.is_none() || index < 0 {
            return Ok(Requirement::Needs(self.needed(i)?));
        }
        if !self.is_set(index) {
            return Ok(Requirement::Unset);
        }
        if self.guard_value(index)? {
            Ok(Requirement::Needs(self.needed(i)?))
        } else {
            Ok(Requirement::Needs(0))
        }
    }

    fn needed(&self, i: u64) -> Result<u64, ScheduleError> {
        let value = self.requirement.evaluate(FIRING_INDEX, i as i64)?.as_number()?;
        Ok(value.max(0) as u64)
    }

    /// Human readable form, e.g. `B[i] >= A[ceil((2*i - 1)/3)] when a`
    pub fn describe(&self, graph: &Graph) -> String {
        let mut text = format!("{}[i] >= {}[{}]", graph.actor(self.dependent).name(), graph.actor(self.dependency).name(), self.requirement);
        if let Some(guard) = &self.guard {
            text.push_str(&format!(" when {guard}"));
        }
        if self.shift != 0 {
            text.push_str(&format!(" (shift {})", self.shift));
        }
        text
    }
}

/// Caller-written dependency, added with `Scheduler::add_constraint`
#[derive(Debug, Clone)]
pub struct UserConstraint {
    pub dependent: String,

    pub dependency: String,

    /// `f(i)` in the product grammar, e.g. `2*i`
    pub requirement: Expression,

    pub guard: Option<BooleanExpression>,

    /// Offset between firing number and guard history index
    pub shift: i64,
}

impl UserConstraint {
    pub fn new(dependent: impl Into<String>, dependency: impl Into<String>, requirement: &str) -> Result<Self, ScheduleError> {
        Ok(Self {
            dependent: dependent.into(),
            dependency: dependency.into(),
            requirement: Expression::parse(requirement)?,
            guard: None,
            shift: 0,
        })
    }

    pub fn with_guard(mut self, guard: &str) -> Result<Self, ScheduleError> {
        self.guard = Some(BooleanExpression::parse(guard)?);
        Ok(self)
    }

    pub fn with_shift(mut self, shift: i64) -> Self {
        self.shift = shift;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Actor, EdgeSpec};

    fn graph(guard: &str) -> Graph {
        let mut graph = Graph::new();
        graph.add_actor(Actor::new("A").with_modifier("a", Product::one())).unwrap();
        graph.add_actor(Actor::new("B")).unwrap();
        graph.add_edge(EdgeSpec::new("A", "3", "B", "2").unwrap().with_tokens("1").unwrap().with_guard(guard).unwrap()).unwrap();
        graph
    }

    fn data(graph: &Graph) -> Constraint {
        let id = graph.edges().next().unwrap().0;
        let mut constraint = Constraint::data(graph, id).unwrap();
        constraint.resolve(&BTreeMap::new()).unwrap();
        constraint
    }

    #[test]
    fn test_data_requirement() {
        let graph = graph("");
        let mut constraint = data(&graph);
        // ceil((2*i - 1)/3)
        let needs: Vec<Requirement> = (1..=4).map(|i| constraint.evaluate(i).unwrap()).collect();
        assert_eq!(needs, vec![Requirement::Needs(1), Requirement::Needs(1), Requirement::Needs(2), Requirement::Needs(3)]);
        assert!(constraint.is_active(0).unwrap());
    }

    #[test]
    fn test_guarded_requirement_follows_history() {
        let graph = graph("a");
        let mut constraint = data(&graph);
        assert_eq!(constraint.evaluate(1).unwrap(), Requirement::Unset);
        assert!(matches!(constraint.guard_value(0), Err(ScheduleError::GuardUnset { index: 0, .. })));

        constraint.set_param("a", false);
        constraint.set_param("a", true);
        constraint.set_param("other", true);
        assert_eq!(constraint.evaluate(1).unwrap(), Requirement::Needs(0));
        assert_eq!(constraint.evaluate(2).unwrap(), Requirement::Needs(1));
        assert_eq!(constraint.evaluate(3).unwrap(), Requirement::Unset);
        assert!(!constraint.is_active(0).unwrap());
        assert!(constraint.is_active(1).unwrap());
    }

    #[test]
    fn test_reading_period_repeats_values() {
        let mut graph = graph("a");
        let b = graph.actor_id("B").unwrap();
        graph.actors[b.index()].reading_periods.insert("a".to_string(), Product::parameter("p"));
        let id = graph.edges().next().unwrap().0;
        let mut constraint = Constraint::data(&graph, id).unwrap();

        let bindings = BTreeMap::from([("p".to_string(), 3)]);
        constraint.resolve(&bindings).unwrap();
        constraint.set_param("a", true);
        assert!(constraint.is_set(2));
        assert!(!constraint.is_set(3));
    }

    #[test]
    fn test_modifier_requirement() {
        let mut constraint = Constraint::modifier("a", ActorId(1), ActorId(0), &Product::new(2), &Product::new(3)).unwrap();
        constraint.resolve(&BTreeMap::new()).unwrap();
        // 2*ceil(i/3) - 1
        let needs: Vec<Requirement> = [1, 3, 4, 6].into_iter().map(|i| constraint.evaluate(i).unwrap()).collect();
        assert_eq!(needs, vec![Requirement::Needs(1), Requirement::Needs(1), Requirement::Needs(3), Requirement::Needs(3)]);
    }

    #[test]
    fn test_unbound_parameter_is_unresolved() {
        let mut constraint = Constraint::modifier("a", ActorId(1), ActorId(0), &Product::parameter("w"), &Product::one()).unwrap();
        assert!(matches!(constraint.resolve(&BTreeMap::new()), Err(ScheduleError::UnresolvedParameter { .. })));
        let bindings = BTreeMap::from([("w".to_string(), 2)]);
        constraint.resolve(&bindings).unwrap();
        assert_eq!(constraint.evaluate(2).unwrap(), Requirement::Needs(3));
    }

    #[test]
    fn test_negative_shift_applies_unconditionally() {
        let requirement = Expression::parse("i").unwrap();
        let guard = BooleanExpression::parse("a").unwrap();
        let periods = BTreeMap::from([("a".to_string(), Expression::one())]);
        let mut constraint = Constraint::user(ActorId(0), ActorId(1), requirement, -1).with_guard(guard, periods);
        constraint.resolve(&BTreeMap::new()).unwrap();

        assert_eq!(constraint.evaluate(1).unwrap(), Requirement::Needs(1));
        assert_eq!(constraint.evaluate(2).unwrap(), Requirement::Unset);
        constraint.set_param("a", false);
        assert_eq!(constraint.evaluate(2).unwrap(), Requirement::Needs(0));
    }
}
