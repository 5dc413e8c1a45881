//! End-to-end scenarios: generate tables from grammar text, drive token
//! sequences through them, and check the traces and parse trees.

use lariat::engine::{DriverError, ParseEngine, ParseResult};
use lariat::parse_table::ConflictKind;
use lariat_tests::grammars;

fn run(source: &str, input: &str) -> ParseResult {
    let (_, _, table) = grammars::build(source);
    ParseEngine::new(&table).run(input)
}

#[test]
fn simple_grammar_accepts() {
    let result = run(grammars::SIMPLE, "c c d d");
    assert!(result.accepted);

    // the first `d` is reduced to C while the second is still lookahead
    let first_d_reduce = result
        .steps
        .iter()
        .find(|step| step.action == "rC → d")
        .expect("a reduce by C → d must occur");
    assert_eq!(first_d_reduce.input, ["d", "$"]);

    let tree = result.tree.expect("accepted parses carry a tree");
    assert_eq!(tree.symbol(), "S");
    assert_eq!(tree.leaves(), ["c", "c", "d", "d"]);
}

#[test]
fn assignment_grammar_accepts() {
    let result = run(grammars::ASSIGNMENT, "* i = i");
    assert!(result.accepted);

    let equals_shifts = result
        .steps
        .iter()
        .filter(|step| step.action.starts_with('s') && step.input.first().is_some_and(|t| t == "="))
        .count();
    assert_eq!(equals_shifts, 1, "exactly one `=` shift");

    // the final reduction, right before ACC
    let final_reduce = &result.steps[result.steps.len() - 2];
    assert_eq!(final_reduce.action, "rS → L = R");
    assert_eq!(result.steps.last().unwrap().action, "ACC");
}

#[test]
fn expression_grammar_builds_the_expected_tree() {
    let result = run(grammars::EXPRESSION, "i + i * i");
    assert!(result.accepted);

    let root = result.tree.expect("accepted parses carry a tree");
    assert_eq!(root.symbol(), "E");
    let child_symbols: Vec<_> = root.children().iter().map(|node| node.symbol()).collect();
    assert_eq!(child_symbols, ["E", "+", "T"]);

    let right = &root.children()[2];
    let right_symbols: Vec<_> = right.children().iter().map(|node| node.symbol()).collect();
    assert_eq!(right_symbols, ["T", "*", "F"]);

    // yield law: the tree's frontier is the input token sequence
    assert_eq!(root.leaves(), ["i", "+", "i", "*", "i"]);
}

#[test]
fn truncated_expression_is_rejected() {
    let result = run(grammars::EXPRESSION, "i +");
    assert!(!result.accepted);
    assert!(result.tree.is_none());
    assert!(!result.steps.is_empty(), "the partial trace is preserved");

    match result.error {
        Some(DriverError::Syntax { ref token, .. }) => assert_eq!(token, "$"),
        ref other => panic!("expected a syntax error, got {:?}", other),
    }
    let message = result.error.unwrap().to_string();
    assert!(message.contains("`$`"), "message: {}", message);
}

#[test]
fn ambiguous_grammar_is_flagged() {
    let (_, _, table) = grammars::build(grammars::AMBIGUOUS);
    assert!(!table.is_consistent());
    assert!(table
        .conflicts()
        .iter()
        .any(|conflict| conflict.kind == ConflictKind::ShiftReduce && conflict.symbol == "+"));
}

#[test]
fn epsilon_production_yields_epsilon_leaf() {
    let result = run(grammars::EPSILON, "b");
    assert!(result.accepted);

    let root = result.tree.expect("accepted parses carry a tree");
    assert_eq!(root.symbol(), "S");
    let child_symbols: Vec<_> = root.children().iter().map(|node| node.symbol()).collect();
    assert_eq!(child_symbols, ["A", "b"]);

    let a_node = &root.children()[0];
    assert_eq!(a_node.children().len(), 1);
    assert!(a_node.children()[0].is_epsilon());

    // the synthetic leaf does not show up in the yield
    assert_eq!(root.leaves(), ["b"]);
}

#[test]
fn empty_input_accepts_iff_the_start_symbol_is_nullable() {
    let nullable = run(grammars::NULLABLE_START, "");
    assert!(nullable.accepted);
    let tree = nullable.tree.unwrap();
    assert_eq!(tree.symbol(), "S");
    assert!(tree.leaves().is_empty());

    let not_nullable = run(grammars::EXPRESSION, "");
    assert!(!not_nullable.accepted);
    assert!(matches!(
        not_nullable.error,
        Some(DriverError::Syntax { .. })
    ));
}

#[test]
fn syntax_error_lists_expected_terminals() {
    let result = run(grammars::SIMPLE, "c c x");
    assert!(!result.accepted);
    match result.error {
        Some(DriverError::Syntax { token, mut expected, state: _ }) => {
            assert_eq!(token, "x");
            expected.sort_unstable();
            assert_eq!(expected, ["c", "d"]);
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn reversed_reductions_form_a_rightmost_derivation() {
    let (grammar, _, table) = grammars::build(grammars::EXPRESSION);
    let input = "i + i * i";
    let result = ParseEngine::new(&table).run(input);
    assert!(result.accepted);

    let reduces: Vec<(String, Vec<String>)> = result
        .steps
        .iter()
        .filter_map(|step| step.action.strip_prefix('r'))
        .map(|rule| {
            let (lhs, rhs) = rule.split_once(" → ").unwrap();
            let rhs = rhs
                .split_whitespace()
                .filter(|name| *name != "ε")
                .map(String::from)
                .collect();
            (lhs.to_string(), rhs)
        })
        .collect();

    // replay the reductions backwards, always expanding the rightmost
    // nonterminal, and end up at the input token sequence
    let original_start = grammar.production(0).rhs()[0].name();
    let mut sentential = vec![original_start.to_string()];
    for (lhs, rhs) in reduces.iter().rev() {
        let position = sentential
            .iter()
            .rposition(|name| grammar.is_nonterminal(name))
            .expect("a nonterminal to expand");
        assert_eq!(&sentential[position], lhs);
        sentential.splice(position..=position, rhs.iter().cloned());
    }
    let tokens: Vec<_> = input.split_whitespace().collect();
    assert_eq!(sentential, tokens);
}

#[test]
fn trace_steps_are_monotonic_and_start_at_one() {
    let result = run(grammars::EXPRESSION, "i + i * i");
    for (i, step) in result.steps.iter().enumerate() {
        assert_eq!(step.step, i + 1);
    }
    assert_eq!(result.steps[0].stack, ["0"]);
    assert_eq!(result.steps[0].input, ["i", "+", "i", "*", "i", "$"]);
}
