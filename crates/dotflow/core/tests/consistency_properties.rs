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

use dotflow_core::{Actor, EdgeSpec, Graph, Scheduler};
use num_integer::Integer;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn chain(rates: &[(u32, u32)]) -> Graph {
    let mut graph = Graph::new();
    for index in 0..=rates.len() {
        graph.add_actor(Actor::new(format!("A{index}"))).unwrap();
    }
    for (index, (produced, consumed)) in rates.iter().enumerate() {
        let spec = EdgeSpec::new(format!("A{index}"), &produced.to_string(), format!("A{}", index + 1), &consumed.to_string()).unwrap();
        graph.add_edge(spec).unwrap();
    }
    graph
}

proptest! {
    #[test]
    fn chain_vector_balances_every_edge(rates in prop::collection::vec((1u32..7, 1u32..7), 1..6)) {
        let mut graph = chain(&rates);
        prop_assert!(graph.analyse().unwrap().is_verified());

        let vector = graph.vector().unwrap();
        let counts: Vec<i64> = (0..=rates.len()).map(|index| vector[&format!("A{index}")].as_number().unwrap()).collect();
        for (index, (produced, consumed)) in rates.iter().enumerate() {
            prop_assert_eq!(counts[index] * i64::from(*produced), counts[index + 1] * i64::from(*consumed));
        }
        prop_assert_eq!(counts.iter().fold(0i64, |acc, count| Integer::gcd(&acc, count)), 1, "vector {:?} is not minimal", counts);
    }

    #[test]
    fn chain_schedule_fires_whole_iteration(rates in prop::collection::vec((1u32..5, 1u32..5), 1..5)) {
        let mut graph = chain(&rates);
        graph.analyse().unwrap();
        let mut scheduler = Scheduler::new(&graph, &BTreeMap::new(), &BTreeMap::new()).unwrap();
        let execution = scheduler.execute().unwrap();

        let expected: u64 = scheduler.repetitions().iter().sum();
        prop_assert_eq!(execution.schedule.len() as u64, expected);
        prop_assert!(execution.total_time <= expected);
    }
}
