//! ACTION/GOTO table construction with conflict detection.

use crate::grammar::Grammar;
use crate::lr1::Automaton;
use crate::types::Map;
use compact_str::CompactString;
use indexmap::map::Entry;
use std::fmt;

/// Everything needed to execute a reduction without consulting the
/// production list again: the stable production index, the left-hand side,
/// the number of right-hand-side symbols and the printable rule form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceEntry {
    pub production: usize,
    pub lhs: CompactString,
    pub len: usize,
    pub display: String,
}

/// A parse action. Absence from the table means error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(ReduceEntry),
    Accept,
}

impl Action {
    /// Whether a second write with `other` is a no-op rather than a
    /// conflict. Reductions compare by production index.
    fn matches(&self, other: &Action) -> bool {
        match (self, other) {
            (Action::Shift(left), Action::Shift(right)) => left == right,
            (Action::Reduce(left), Action::Reduce(right)) => left.production == right.production,
            (Action::Accept, Action::Accept) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(target) => write!(f, "s{}", target),
            Action::Reduce(entry) => write!(f, "r{}", entry.display),
            Action::Accept => f.write_str("ACC"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::ShiftReduce => f.write_str("shift/reduce"),
            ConflictKind::ReduceReduce => f.write_str("reduce/reduce"),
        }
    }
}

/// A table cell that construction tried to assign two different actions.
/// Report-only: the first entry stays in the cell.
#[derive(Debug, Clone)]
pub struct Conflict {
    pub state: usize,
    pub symbol: CompactString,
    pub kind: ConflictKind,
    pub kept: String,
    pub rejected: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} conflict in state {} on `{}`: kept {}, rejected {}",
            self.kind, self.state, self.symbol, self.kept, self.rejected
        )
    }
}

/// The ACTION and GOTO tables compiled from the canonical collection.
/// Rows are indexed by state; ACTION columns are terminal names or `$`,
/// GOTO columns are nonterminal names.
#[derive(Debug)]
pub struct ParseTable {
    actions: Vec<Map<CompactString, Action>>,
    gotos: Vec<Map<CompactString, usize>>,
    conflicts: Vec<Conflict>,
}

impl ParseTable {
    pub fn generate(grammar: &Grammar, automaton: &Automaton) -> Self {
        let mut actions = Vec::with_capacity(automaton.len());
        let mut gotos = Vec::with_capacity(automaton.len());
        let mut conflicts = Vec::new();

        for (state_id, state) in automaton.states() {
            let mut action_row: Map<CompactString, Action> = Map::default();
            let mut goto_row: Map<CompactString, usize> = Map::default();

            // shift, goto
            for (symbol, target) in state.edges() {
                if symbol.is_terminal() {
                    insert_action(
                        &mut action_row,
                        &mut conflicts,
                        state_id,
                        symbol.name(),
                        Action::Shift(target),
                    );
                } else {
                    goto_row.insert(symbol.name().into(), target);
                }
            }

            // reduce, accept
            for item in state.items() {
                if !item.is_complete(grammar) {
                    continue;
                }
                let production = grammar.production(item.production);
                let action = if item.production == 0 {
                    Action::Accept
                } else {
                    Action::Reduce(ReduceEntry {
                        production: item.production,
                        lhs: production.lhs().name().into(),
                        len: production.rhs().len(),
                        display: production.to_string(),
                    })
                };
                insert_action(
                    &mut action_row,
                    &mut conflicts,
                    state_id,
                    item.lookahead.name(),
                    action,
                );
            }

            actions.push(action_row);
            gotos.push(goto_row);
        }

        Self {
            actions,
            gotos,
            conflicts,
        }
    }

    /// `ACTION[state, terminal]`; `None` means error.
    pub fn action(&self, state: usize, terminal: &str) -> Option<&Action> {
        self.actions.get(state)?.get(terminal)
    }

    /// `GOTO[state, nonterminal]`.
    pub fn goto(&self, state: usize, nonterminal: &str) -> Option<usize> {
        self.gotos.get(state)?.get(nonterminal).copied()
    }

    /// The terminals with a defined action in `state`, for error reporting.
    pub fn expected_terminals(&self, state: usize) -> Vec<&str> {
        self.actions
            .get(state)
            .map(|row| row.keys().map(CompactString::as_str).collect())
            .unwrap_or_default()
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// `false` when any conflict was recorded; such a table is not CLR(1).
    pub fn is_consistent(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Display for ParseTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (state, (action_row, goto_row)) in self.actions.iter().zip(&self.gotos).enumerate() {
            if state > 0 {
                writeln!(f)?;
            }
            writeln!(f, "#### State {:02}", state)?;
            writeln!(f, "## actions")?;
            for (symbol, action) in action_row {
                writeln!(f, "- {} => {}", symbol, action)?;
            }
            writeln!(f, "## gotos")?;
            for (symbol, target) in goto_row {
                writeln!(f, "- {} => {:02}", symbol, target)?;
            }
        }
        Ok(())
    }
}

fn insert_action(
    row: &mut Map<CompactString, Action>,
    conflicts: &mut Vec<Conflict>,
    state: usize,
    symbol: &str,
    action: Action,
) {
    match row.entry(symbol.into()) {
        Entry::Vacant(entry) => {
            entry.insert(action);
        }
        Entry::Occupied(entry) => {
            let kept = entry.get();
            if kept.matches(&action) {
                return;
            }
            let kind = if matches!(kept, Action::Shift(_)) || matches!(action, Action::Shift(_)) {
                ConflictKind::ShiftReduce
            } else {
                ConflictKind::ReduceReduce
            };
            conflicts.push(Conflict {
                state,
                symbol: symbol.into(),
                kind,
                kept: kept.to_string(),
                rejected: action.to_string(),
            });
        }
    }
}
