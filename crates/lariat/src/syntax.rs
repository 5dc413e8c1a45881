//! Textual grammar definitions.
//!
//! A grammar is line-oriented: every non-empty line is a rule of the form
//! `LHS -> ALT1 | ALT2 | …` with whitespace-separated symbol names. The empty
//! alternative and the tokens `ε`, `''` and `""` all denote an ε-production.

use crate::grammar::{Grammar, Production, Symbol};
use crate::types::Set;
use compact_str::{format_compact, CompactString};

/// Errors detected while reading a grammar definition.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GrammarError {
    /// The source contained no production rules at all.
    #[error("the grammar definition contains no production rules")]
    EmptyGrammar,

    /// A non-empty line was not of the form `LHS -> RHS`.
    #[error("malformed rule on line {line}: `{text}`")]
    MalformedRule { line: usize, text: String },
}

struct RawRule {
    lhs: CompactString,
    alternatives: Vec<Vec<CompactString>>,
}

/// Parse `source` into an augmented [`Grammar`].
///
/// The left-hand side of the first rule becomes the original start symbol
/// `S`; a fresh nonterminal (the start name with trailing primes appended
/// until unique) is introduced and `S' → S` is inserted as production 0.
pub fn parse_grammar(source: &str) -> Result<Grammar, GrammarError> {
    let span = tracing::trace_span!("parse_grammar");
    let _entered = span.enter();

    let mut raw_rules: Vec<RawRule> = vec![];
    for (lineno, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let malformed = || GrammarError::MalformedRule {
            line: lineno + 1,
            text: line.to_owned(),
        };

        let (lhs, rhs) = line.split_once("->").ok_or_else(|| malformed())?;
        let mut lhs_parts = lhs.split_whitespace();
        let lhs = match (lhs_parts.next(), lhs_parts.next()) {
            (Some(name), None) => name,
            _ => return Err(malformed()),
        };

        let alternatives = rhs
            .split('|')
            .map(|alternative| {
                alternative
                    .split_whitespace()
                    .filter(|name| !matches!(*name, "ε" | "''" | "\"\""))
                    .map(CompactString::from)
                    .collect()
            })
            .collect::<Vec<Vec<_>>>();

        tracing::trace!(line = lineno + 1, lhs, "rule parsed");
        raw_rules.push(RawRule {
            lhs: lhs.into(),
            alternatives,
        });
    }

    if raw_rules.is_empty() {
        return Err(GrammarError::EmptyGrammar);
    }

    // A name is a nonterminal iff it appears as some lhs.
    let lhs_names: Set<CompactString> = raw_rules.iter().map(|rule| rule.lhs.clone()).collect();

    let mut used_names = lhs_names.clone();
    for rule in &raw_rules {
        for alternative in &rule.alternatives {
            used_names.extend(alternative.iter().cloned());
        }
    }

    let original_start = raw_rules[0].lhs.clone();
    let mut start_name = format_compact!("{}'", original_start);
    while used_names.contains(&start_name) {
        start_name.push('\'');
    }

    let mut terminals = Set::default();
    let mut nonterminals: Set<CompactString> = lhs_names.iter().cloned().collect();
    nonterminals.insert(start_name.clone());

    let mut productions = vec![Production::new(
        0,
        Symbol::nonterminal(start_name.clone()),
        vec![Symbol::nonterminal(original_start)],
    )];
    for rule in &raw_rules {
        for alternative in &rule.alternatives {
            let rhs = alternative
                .iter()
                .map(|name| {
                    if lhs_names.contains(name) {
                        Symbol::nonterminal(name.clone())
                    } else {
                        terminals.insert(name.clone());
                        Symbol::terminal(name.clone())
                    }
                })
                .collect();
            let index = productions.len();
            productions.push(Production::new(index, Symbol::nonterminal(rule.lhs.clone()), rhs));
        }
    }

    Ok(Grammar::new(
        productions,
        Symbol::nonterminal(start_name),
        terminals,
        nonterminals,
    ))
}
