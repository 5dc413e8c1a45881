//! Grammar fixtures for integration tests.

use lariat::{grammar::Grammar, lr1::Automaton, parse_table::ParseTable};

/// `S → C C`, `C → c C | d` — the textbook canonical-LR(1) grammar.
pub const SIMPLE: &str = "S -> C C\nC -> c C | d\n";

/// Pointer/assignment grammar with a nontrivial GOTO structure.
pub const ASSIGNMENT: &str = "S -> L = R | R\nL -> * R | i\nR -> L\n";

/// Left-recursive arithmetic expression grammar.
pub const EXPRESSION: &str = "E -> E + T | T\nT -> T * F | F\nF -> ( E ) | i\n";

/// Ambiguous grammar; shift/reduce conflict on `+`.
pub const AMBIGUOUS: &str = "E -> E + E | i\n";

/// Grammar with an ε-production in front of a terminal.
pub const EPSILON: &str = "S -> A b\nA -> ε\n";

/// Grammar whose start symbol derives ε.
pub const NULLABLE_START: &str = "S -> a S | ε\n";

/// Run the full generator pipeline over a grammar source.
pub fn build(source: &str) -> (Grammar, Automaton, ParseTable) {
    let grammar = Grammar::parse(source).expect("fixture grammar must parse");
    let automaton = Automaton::generate(&grammar);
    let table = ParseTable::generate(&grammar, &automaton);
    (grammar, automaton, table)
}
