//! The table-driven shift/reduce engine.

use crate::grammar::{END_MARKER, EPSILON};
use crate::parse_table::{Action, ParseTable};
use compact_str::CompactString;
use std::fmt;

/// A node of the concrete parse tree. Leaves are terminals or the synthetic
/// `ε` leaf produced by empty reductions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    symbol: CompactString,
    children: Vec<ParseNode>,
}

impl ParseNode {
    fn leaf(symbol: impl Into<CompactString>) -> Self {
        Self {
            symbol: symbol.into(),
            children: vec![],
        }
    }

    fn epsilon() -> Self {
        Self::leaf(EPSILON)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn children(&self) -> &[ParseNode] {
        &self.children
    }

    pub fn is_epsilon(&self) -> bool {
        self.symbol == EPSILON && self.children.is_empty()
    }

    /// The terminal leaves left to right, skipping synthetic ε leaves; for
    /// an accepted parse this equals the input token sequence.
    pub fn leaves(&self) -> Vec<&str> {
        let mut leaves = vec![];
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a str>) {
        if self.children.is_empty() {
            if self.symbol != EPSILON {
                leaves.push(self.symbol.as_str());
            }
            return;
        }
        for child in &self.children {
            child.collect_leaves(leaves);
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:width$}{}", "", self.symbol, width = depth * 2)?;
        for child in &self.children {
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Indented one-symbol-per-line rendering of the subtree.
impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// One row of the step-by-step trace. The stack snapshot interleaves state
/// numbers and symbol names bottom to top; the input snapshot is the
/// remaining input including the appended `$`.
#[derive(Debug, Clone)]
pub struct TraceStep {
    pub step: usize,
    pub stack: Vec<String>,
    pub input: Vec<String>,
    pub action: String,
}

/// Failures the driver reports inside a [`ParseResult`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum DriverError {
    /// No action is defined for the current state and token.
    #[error("unexpected token `{token}` in state {state}; expected one of: {}", .expected.join(", "))]
    Syntax {
        token: String,
        state: usize,
        expected: Vec<String>,
    },

    /// A reduction uncovered a state with no GOTO for the reduced
    /// nonterminal; the table is corrupt or conflicted.
    #[error("no goto entry for `{symbol}` from state {state}")]
    Goto { symbol: String, state: usize },

    /// The input contained the reserved end-of-input marker.
    #[error("the end-of-input marker `$` must not appear in the input")]
    ReservedToken,
}

/// The outcome of driving one input through the tables: the full trace, the
/// verdict, and on success the parse tree.
#[derive(Debug)]
pub struct ParseResult {
    pub steps: Vec<TraceStep>,
    pub accepted: bool,
    pub error: Option<DriverError>,
    pub tree: Option<ParseNode>,
}

enum StackEntry {
    State(usize),
    Symbol(CompactString),
}

/// The shift/reduce driver. One instance drives one input sequence; all
/// per-parse state lives here and is discarded with the engine.
pub struct ParseEngine<'t> {
    table: &'t ParseTable,
    tokens: Vec<CompactString>,
    cursor: usize,
    stack: Vec<StackEntry>,
    nodes: Vec<ParseNode>,
    steps: Vec<TraceStep>,
}

impl<'t> ParseEngine<'t> {
    pub fn new(table: &'t ParseTable) -> Self {
        Self {
            table,
            tokens: vec![],
            cursor: 0,
            stack: vec![StackEntry::State(0)],
            nodes: vec![],
            steps: vec![],
        }
    }

    /// Split `input` on ASCII whitespace, append `$`, and run the
    /// shift/reduce loop to acceptance or failure.
    pub fn run(mut self, input: &str) -> ParseResult {
        for token in input.split_ascii_whitespace() {
            if token == END_MARKER {
                return self.fail(DriverError::ReservedToken);
            }
            self.tokens.push(token.into());
        }
        self.tokens.push(END_MARKER.into());

        let table = self.table;
        loop {
            let state = self.top_state();
            let token = self.tokens[self.cursor].clone();

            let Some(action) = table.action(state, &token) else {
                let expected = table
                    .expected_terminals(state)
                    .iter()
                    .map(|name| name.to_string())
                    .collect();
                return self.fail(DriverError::Syntax {
                    token: token.into(),
                    state,
                    expected,
                });
            };
            self.record_step(action.to_string());

            match action {
                Action::Shift(next) => {
                    tracing::trace!(token = %token, next, "shift");
                    self.stack.push(StackEntry::Symbol(token.clone()));
                    self.stack.push(StackEntry::State(*next));
                    self.nodes.push(ParseNode::leaf(token));
                    self.cursor += 1;
                }

                Action::Reduce(entry) => {
                    tracing::trace!(rule = %entry.display, "reduce");
                    self.stack.truncate(self.stack.len() - 2 * entry.len);
                    let uncovered = self.top_state();

                    let children = if entry.len == 0 {
                        vec![ParseNode::epsilon()]
                    } else {
                        self.nodes.split_off(self.nodes.len() - entry.len)
                    };

                    let Some(target) = table.goto(uncovered, &entry.lhs) else {
                        return self.fail(DriverError::Goto {
                            symbol: entry.lhs.to_string(),
                            state: uncovered,
                        });
                    };
                    self.stack.push(StackEntry::Symbol(entry.lhs.clone()));
                    self.stack.push(StackEntry::State(target));
                    self.nodes.push(ParseNode {
                        symbol: entry.lhs.clone(),
                        children,
                    });
                }

                Action::Accept => {
                    tracing::trace!("accept");
                    let tree = self.nodes.pop();
                    return ParseResult {
                        steps: self.steps,
                        accepted: true,
                        error: None,
                        tree,
                    };
                }
            }
        }
    }

    fn top_state(&self) -> usize {
        match self.stack.last() {
            Some(StackEntry::State(state)) => *state,
            _ => unreachable!("the parse stack always ends with a state"),
        }
    }

    fn record_step(&mut self, action: String) {
        let stack = self
            .stack
            .iter()
            .map(|entry| match entry {
                StackEntry::State(state) => state.to_string(),
                StackEntry::Symbol(name) => name.to_string(),
            })
            .collect();
        let input = self.tokens[self.cursor..]
            .iter()
            .map(ToString::to_string)
            .collect();
        self.steps.push(TraceStep {
            step: self.steps.len() + 1,
            stack,
            input,
            action,
        });
    }

    fn fail(self, error: DriverError) -> ParseResult {
        ParseResult {
            steps: self.steps,
            accepted: false,
            error: Some(error),
            tree: None,
        }
    }
}
