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

//! Integration tests for graph analyses

use dotflow_core::{Actor, CycleDetector, EdgeSpec, Graph, GraphDescription};
use dotflow_symbol::{Expression, Product};

fn build(actors: &[&str], edges: &[(&str, &str, &str, &str, &str)]) -> Graph {
    let mut graph = Graph::new();
    for name in actors {
        graph.add_actor(Actor::new(*name)).unwrap();
    }
    for (producer, rate_in, consumer, rate_out, tokens) in edges {
        graph.add_edge(EdgeSpec::new(*producer, rate_in, *consumer, rate_out).unwrap().with_tokens(tokens).unwrap()).unwrap();
    }
    graph
}

#[test]
fn test_balance_equations_hold_after_analysis() {
    // Two parametric paths from S to K that agree.
    let mut graph = build(&["S", "F", "K"], &[("S", "p", "F", "2", "0"), ("F", "3", "K", "1", "0"), ("S", "3*p", "K", "2", "0")]);
    assert!(graph.analyse().unwrap().is_verified());

    for (_, edge) in graph.edges() {
        let produced = Expression::from(edge.rate_in().multiply(graph.repetitions(edge.producer()).unwrap()));
        let consumed = Expression::from(edge.rate_out().multiply(graph.repetitions(edge.consumer()).unwrap()));
        assert!(produced.is_equal_to(&consumed).unwrap(), "Edge should be balanced");
    }
    assert_eq!(graph.vector().unwrap()["S"], Expression::number(2));
}

#[test]
fn test_multirate_chain() {
    let mut graph = build(&["A", "B", "C"], &[("A", "2", "B", "3", "0"), ("B", "1", "C", "2", "0"), ("A", "1", "C", "1", "0")]);
    let report = graph.analyse().unwrap();
    assert!(!report.consistent, "A->C directly and through B disagree");
    assert!(graph.vector().is_none());

    let mut graph = build(&["A", "B", "C"], &[("A", "2", "B", "3", "0"), ("B", "1", "C", "2", "0")]);
    assert!(graph.analyse().unwrap().is_verified());
    let vector = graph.vector().unwrap();
    assert_eq!(vector["A"], Expression::number(3));
    assert_eq!(vector["B"], Expression::number(2));
    assert_eq!(vector["C"], Expression::number(1));
}

#[test]
fn test_disconnected_components_are_seeded_independently() {
    let mut graph = build(&["A", "B", "C", "D"], &[("A", "1", "B", "2", "0"), ("C", "3", "D", "1", "0")]);
    assert!(graph.analyse().unwrap().is_verified());
    let vector = graph.vector().unwrap();
    assert_eq!(vector["A"], Expression::number(2));
    assert_eq!(vector["B"], Expression::number(1));
    assert_eq!(vector["C"], Expression::number(1));
    assert_eq!(vector["D"], Expression::number(3));
}

#[test]
fn test_saturated_cycle_is_live_without_simulation() {
    let mut graph = build(&["A", "B"], &[("A", "1", "B", "1", "0"), ("B", "1", "A", "1", "1")]);
    let report = graph.analyse().unwrap();
    assert!(report.live);
    assert!(graph.live_schedule().is_none());
    assert_eq!(CycleDetector::new(&graph).cycles().len(), 1);
}

#[test]
fn test_deadlocked_cycle_is_not_live() {
    let mut graph = build(&["A", "B"], &[("A", "1", "B", "1", "0"), ("B", "1", "A", "1", "0")]);
    let report = graph.analyse().unwrap();
    assert!(report.consistent);
    assert!(!report.live);
    assert!(!report.safe, "Safety is skipped once liveness fails");
}

#[test]
fn test_chord_does_not_make_triangle_live() {
    let mut graph = build(&["C", "D", "E"], &[("C", "1", "D", "1", "0"), ("D", "1", "E", "1", "0"), ("E", "1", "C", "1", "0"), ("C", "1", "E", "1", "5")]);
    let report = graph.analyse().unwrap();
    assert!(report.consistent);
    assert!(!report.live, "C, D and E all wait on the empty triangle");
    assert!(!report.is_verified());
}

#[test]
fn test_period_safety_exact_and_inexact() {
    let description = |period: &str| {
        GraphDescription::from_json_str(&format!(
            r#"{{
                "actors": [{{"name": "M"}}, {{"name": "U"}}],
                "edges": [{{"producer": "M", "producer_rate": "1", "consumer": "U", "consumer_rate": "2", "guard": "a"}}],
                "modifiers": [{{"actor": "M", "parameter": "a", "period": "{period}"}}]
            }}"#
        ))
        .unwrap()
    };

    let mut exact = description("2").build().unwrap();
    assert!(exact.analyse().unwrap().is_verified());
    let u = exact.actor_id("U").unwrap();
    assert_eq!(exact.actor(u).reading_period("a"), Some(&Product::one()));

    let mut inexact = description("4").build().unwrap();
    let report = inexact.analyse().unwrap();
    assert!(report.live);
    assert!(!report.safe);
}
