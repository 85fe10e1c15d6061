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

//! Propagation solver for systems of balance equations
//!
//! Each connected group of unknowns is seeded with one at its first unknown,
//! values are pushed along the equations and a group is finally rescaled by
//! the least common multiple of its denominators so every value is integral.

use crate::equation::Equation;
use crate::error::SymbolResult;
use crate::expression::Expression;
use crate::product::Product;
use std::collections::{BTreeMap, VecDeque};

/// Outcome of solving a system
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Solution {
    /// Smallest integral value of every unknown
    Unique(BTreeMap<String, Product>),

    /// An unknown received two different values
    Inconsistent { unknown: String, first: Expression, second: Expression },
}

impl Solution {
    pub fn is_consistent(&self) -> bool {
        matches!(self, Solution::Unique(_))
    }
}

pub struct SystemSolver {
    unknowns: Vec<String>,

    equations: Vec<Equation>,
}

impl SystemSolver {
    pub fn new(unknowns: Vec<String>, equations: Vec<Equation>) -> Self {
        Self { unknowns, equations }
    }

    pub fn solve(&self) -> SymbolResult<Solution> {
        let mut values: BTreeMap<String, Expression> = BTreeMap::new();
        let mut solution = BTreeMap::new();

        for seed in &self.unknowns {
            if values.contains_key(seed) {
                continue;
            }
            values.insert(seed.clone(), Expression::one());
            let mut group = vec![seed.clone()];
            let mut queue = VecDeque::from([seed.clone()]);

            while let Some(known) = queue.pop_front() {
                let known_value = values[&known].clone();
                for equation in self.equations.iter().filter(|equation| equation.involves(&known)) {
                    let Some((other, derived)) = equation.solve(&known, &known_value)? else {
                        continue;
                    };
                    match values.get(other) {
                        Some(existing) => {
                            if !existing.is_equal_to(&derived)? {
                                return Ok(Solution::Inconsistent {
                                    unknown: other.to_string(),
                                    first: existing.clone(),
                                    second: derived,
                                });
                            }
                        }
                        None => {
                            values.insert(other.to_string(), derived);
                            group.push(other.to_string());
                            queue.push_back(other.to_string());
                        }
                    }
                }
            }

            let mut scale = Product::one();
            for name in &group {
                scale = scale.lcm(values[name].as_fraction()?.denominator());
            }
            let scale = Expression::from(scale);
            for name in group {
                let value = values[&name].multiply(&scale).as_product()?;
                solution.insert(name, value);
            }
        }

        Ok(Solution::Unique(solution))
    }
}
