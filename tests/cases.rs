use pretty_assertions::assert_eq;
use serde::Deserialize;
use std::fs;
use telenode::{Node, convert};

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    input: String,
    expected: serde_json::Value,
}

fn load_cases() -> Vec<Case> {
    let data = fs::read_to_string("tests/data/cases.json").expect("Failed to read cases.json");
    serde_json::from_str(&data).expect("Failed to parse cases.json")
}

#[test]
fn conversion_cases() {
    let cases = load_cases();
    assert!(!cases.is_empty());

    let mut failures = Vec::new();
    for case in &cases {
        let actual = serde_json::to_value(convert(&case.input)).expect("nodes serialize");
        if actual != case.expected {
            eprintln!("\nCase failed: {}", case.name);
            eprintln!("  Input: {:?}", case.input);
            eprintln!("  Expected: {}", case.expected);
            eprintln!("  Got: {}", actual);
            failures.push(case.name.as_str());
        }
    }

    assert_eq!(failures, Vec::<&str>::new());
}

#[test]
fn expected_outputs_deserialize_back_into_nodes() {
    for case in load_cases() {
        let nodes: Vec<Node> = serde_json::from_value(case.expected.clone())
            .unwrap_or_else(|err| panic!("case {:?} holds invalid nodes: {err}", case.name));
        assert_eq!(serde_json::to_value(&nodes).unwrap(), case.expected);
    }
}
