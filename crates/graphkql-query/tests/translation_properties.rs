//! Property tests over generated queries

use graphkql_query::{parse, OptimizerConfig, QueryOptimizer, QueryTranslator};
use proptest::prelude::*;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
struct Hop {
    label: Option<&'static str>,
    rel_type: Option<&'static str>,
    length: Option<(u32, u32)>,
    outgoing: bool,
}

fn hop() -> impl Strategy<Value = Hop> {
    (
        proptest::option::of(prop::sample::select(vec!["User", "Host", "Process"])),
        proptest::option::of(prop::sample::select(vec!["KNOWS", "OWNS", "RUNS"])),
        proptest::option::of((1u32..4, 0u32..3)),
        any::<bool>(),
    )
        .prop_map(|(label, rel_type, length, outgoing)| Hop {
            label,
            rel_type,
            length: length.map(|(lo, span)| (lo, lo + span)),
            outgoing,
        })
}

fn condition() -> impl Strategy<Value = (usize, &'static str, &'static str, i64)> {
    (
        0usize..4,
        prop::sample::select(vec!["age", "pid", "Timestamp"]),
        prop::sample::select(vec!["=", "<>", "<", ">=", ">"]),
        -50i64..50,
    )
}

/// Cypher text for a single path with `hops.len()` relationships
fn render(
    start: Option<&str>,
    hops: &[Hop],
    conditions: &[(usize, &str, &str, i64)],
    limit: Option<u8>,
) -> String {
    let mut text = String::from("MATCH (n0");
    if let Some(label) = start {
        text.push(':');
        text.push_str(label);
    }
    text.push(')');

    for (i, hop) in hops.iter().enumerate() {
        let mut body = String::new();
        if let Some(t) = hop.rel_type {
            body.push(':');
            body.push_str(t);
        }
        if let Some((lo, hi)) = hop.length {
            body.push_str(&format!("*{}..{}", lo, hi));
        }
        if hop.outgoing {
            text.push_str(&format!("-[{}]->", body));
        } else {
            text.push_str(&format!("<-[{}]-", body));
        }
        text.push_str(&format!("(n{}", i + 1));
        if let Some(label) = hop.label {
            text.push(':');
            text.push_str(label);
        }
        text.push(')');
    }

    let clauses: Vec<String> = conditions
        .iter()
        .map(|(node, key, op, value)| {
            format!("n{}.{} {} {}", node % (hops.len() + 1), key, op, value)
        })
        .collect();
    if !clauses.is_empty() {
        text.push_str(" WHERE ");
        text.push_str(&clauses.join(" AND "));
    }

    text.push_str(" RETURN n0");
    if let Some(limit) = limit {
        text.push_str(&format!(" LIMIT {}", limit));
    }
    text
}

fn is_balanced(text: &str) -> bool {
    let mut stack = Vec::new();
    for c in text.chars() {
        match c {
            '(' | '[' => stack.push(c),
            ')' => {
                if stack.pop() != Some('(') {
                    return false;
                }
            }
            ']' => {
                if stack.pop() != Some('[') {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty()
}

proptest! {
    #[test]
    fn prop_translation_is_balanced(
        start in proptest::option::of(prop::sample::select(vec!["User", "Host"])),
        hops in proptest::collection::vec(hop(), 0..4),
        conditions in proptest::collection::vec(condition(), 0..4),
        limit in proptest::option::of(1u8..100),
    ) {
        init_tracing();
        let text = render(start, &hops, &conditions, limit);
        let query = parse(&text).unwrap();

        for path in query.paths() {
            prop_assert_eq!(path.relationships().len() + 1, path.nodes().len());
        }

        let translated = QueryTranslator::new().translate(&query, 0.9).unwrap();
        prop_assert!(translated.query.starts_with("graph-match "), "{}", translated.query);
        prop_assert!(is_balanced(&translated.query), "{}", translated.query);
    }

    #[test]
    fn prop_optimized_query_round_trips(
        hops in proptest::collection::vec(hop(), 1..4),
        conditions in proptest::collection::vec(condition(), 0..4),
    ) {
        init_tracing();
        let query = parse(&render(Some("User"), &hops, &conditions, None)).unwrap();
        let report = QueryOptimizer::new(OptimizerConfig::default()).optimize(&query).unwrap();

        prop_assert!(report.reduction_percent >= 0.0);
        prop_assert!(report.reduction_percent <= 100.0);
        prop_assert_eq!(parse(&report.optimized_cypher).unwrap(), report.optimized_query.clone());

        let translated = QueryTranslator::new().translate(&report.optimized_query, 1.0).unwrap();
        prop_assert!(is_balanced(&translated.query), "{}", translated.query);
    }
}
