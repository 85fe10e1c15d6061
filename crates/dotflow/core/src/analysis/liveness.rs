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

use super::holds;
use crate::error::GraphError;
use crate::graph::{ActorId, Cycle, CycleDetector, EdgeId, Graph};
use crate::schedule::Schedule;
use dotflow_symbol::{Expression, Product, SymbolResult};
use tracing::{debug, info};

impl Graph {
    /// Decides whether one iteration can complete without deadlock
    ///
    /// Acyclic graphs and graphs whose every cycle is saturated are live
    /// outright. Otherwise a symbolic firing simulation is attempted and its
    /// sequence is kept as the witness schedule.
    pub fn check_liveness(&mut self) -> Result<bool, GraphError> {
        let vector = self.vector.clone().ok_or(GraphError::AnalysisOrder {
            analysis: "liveness",
            requires: "consistency",
        })?;
        self.live_schedule = None;

        let cycles = CycleDetector::new(self).cycles();
        let live = if cycles.is_empty() {
            debug!("Graph is acyclic");
            true
        } else if self.all_saturated(&cycles, &vector)? {
            debug!(cycles = cycles.len(), "Every cycle is saturated");
            true
        } else {
            match Simulation::new(self, &vector).run()? {
                Some(schedule) => {
                    info!(schedule = %schedule, "Symbolic simulation found a schedule");
                    self.live_schedule = Some(schedule);
                    true
                }
                None => false,
            }
        };

        self.live = Some(live);
        Ok(live)
    }

    /// True when every cycle has a hop whose edges all hold a full iteration of tokens
    fn all_saturated(&self, cycles: &[Cycle], vector: &[Product]) -> SymbolResult<bool> {
        for cycle in cycles {
            let mut saturated = false;
            for hop in cycle.hops(self) {
                if self.hop_saturated(&hop, vector)? {
                    saturated = true;
                    break;
                }
            }
            if !saturated {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn hop_saturated(&self, hop: &[EdgeId], vector: &[Product]) -> SymbolResult<bool> {
        if hop.is_empty() {
            return Ok(false);
        }
        for id in hop {
            let edge = self.edge(*id);
            let needed = edge.rate_out.multiply(&vector[edge.consumer.index()]);
            if !holds(edge.tokens.is_at_least(&Expression::from(needed)))? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Firing simulation over a private copy of the token state
struct Simulation<'g> {
    graph: &'g Graph,

    tokens: Vec<Expression>,

    remaining: Vec<Expression>,

    schedule: Schedule,
}

impl<'g> Simulation<'g> {
    fn new(graph: &'g Graph, vector: &[Product]) -> Self {
        Self {
            graph,
            tokens: graph.edges.iter().map(|edge| edge.tokens.clone()).collect(),
            remaining: vector.iter().cloned().map(Expression::from).collect(),
            schedule: Schedule::new(),
        }
    }

    /// Returns the firing sequence, or `None` when a pass makes no progress
    fn run(mut self) -> SymbolResult<Option<Schedule>> {
        while self.remaining.iter().any(|count| !count.is_zero()) {
            let mut progress = false;
            for (id, actor) in self.graph.actors() {
                let left = self.remaining[id.index()].clone();
                if left.is_zero() {
                    continue;
                }
                if left.is_number() {
                    let once = Expression::one();
                    if self.can_fire(id, &once)? {
                        self.fire(id, &once);
                        progress = true;
                    }
                } else {
                    // Parametric counts fire a whole parameter block, then the pass restarts.
                    let block = Expression::from(left.as_product()?.parameter_part());
                    if self.can_fire(id, &block)? {
                        debug!(actor = actor.name(), firings = %block, "Firing parameter block");
                        self.fire(id, &block);
                        progress = true;
                        break;
                    }
                }
            }
            if !progress {
                debug!(remaining = ?self.remaining.iter().map(ToString::to_string).collect::<Vec<_>>(), "Simulation is stuck");
                return Ok(None);
            }
        }
        Ok(Some(self.schedule))
    }

    fn can_fire(&self, actor: ActorId, times: &Expression) -> SymbolResult<bool> {
        for id in self.graph.actor(actor).incoming() {
            let edge = self.graph.edge(*id);
            let needed = Expression::from(edge.rate_out.clone()).multiply(times);
            if !holds(self.tokens[id.index()].is_at_least(&needed))? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn fire(&mut self, actor: ActorId, times: &Expression) {
        let node = self.graph.actor(actor);
        for id in node.incoming() {
            let consumed = Expression::from(self.graph.edge(*id).rate_out.clone()).multiply(times);
            self.tokens[id.index()] = self.tokens[id.index()].subtract(&consumed);
        }
        for id in node.outgoing() {
            let produced = Expression::from(self.graph.edge(*id).rate_in.clone()).multiply(times);
            self.tokens[id.index()] = self.tokens[id.index()].add(&produced);
        }
        self.remaining[actor.index()] = self.remaining[actor.index()].subtract(times);
        self.schedule.push(node.name(), times.clone());
    }
}
