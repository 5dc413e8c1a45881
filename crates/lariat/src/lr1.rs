//! LR(1) items and the canonical collection automaton.

use crate::first_sets::FirstSets;
use crate::grammar::{Grammar, Symbol};
use crate::types::Map;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

/// An LR(1) item: a production with a marker position and one lookahead
/// terminal (or `$`). Complete when the marker has reached the end of the
/// right-hand side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LRItem {
    pub production: usize,
    pub marker: usize,
    pub lookahead: Symbol,
}

impl LRItem {
    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.marker == grammar.production(self.production).rhs().len()
    }

    /// The symbol immediately after the marker, or `None` when complete.
    pub fn next_symbol<'g>(&self, grammar: &'g Grammar) -> Option<&'g Symbol> {
        grammar.production(self.production).rhs().get(self.marker)
    }

    /// `A → α · β , a`
    pub fn display<'g>(&'g self, grammar: &'g Grammar) -> ItemDisplay<'g> {
        ItemDisplay {
            grammar,
            item: self,
        }
    }
}

pub struct ItemDisplay<'g> {
    grammar: &'g Grammar,
    item: &'g LRItem,
}

impl fmt::Display for ItemDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { grammar, item } = self;
        let production = grammar.production(item.production);
        write!(f, "{} →", production.lhs())?;
        for (i, symbol) in production.rhs().iter().enumerate() {
            if i == item.marker {
                f.write_str(" ·")?;
            }
            write!(f, " {}", symbol)?;
        }
        if item.marker == production.rhs().len() {
            f.write_str(" ·")?;
        }
        write!(f, " , {}", item.lookahead)
    }
}

/// An item set. `BTreeSet` makes equality order-insensitive and doubles as
/// the canonical key used to deduplicate states.
pub type ItemSet = BTreeSet<LRItem>;

/// CLOSURE(I): worklist saturation under nonterminal expansion with
/// propagated lookaheads. ε never appears as a lookahead.
pub fn closure(grammar: &Grammar, first_sets: &FirstSets, seed: &ItemSet) -> ItemSet {
    let mut items = seed.clone();
    let mut pending: VecDeque<LRItem> = items.iter().cloned().collect();

    while let Some(item) = pending.pop_front() {
        let production = grammar.production(item.production);

        // [A → α · B β, a] with B nonterminal
        let (b_symbol, beta) = match &production.rhs()[item.marker..] {
            [b_symbol, beta @ ..] if b_symbol.is_nonterminal() => (b_symbol, beta),
            _ => continue,
        };

        let lookaheads = first_sets.lookaheads(beta, &item.lookahead);
        for expansion in grammar.productions_for(b_symbol) {
            for lookahead in &lookaheads {
                let item = LRItem {
                    production: expansion.index(),
                    marker: 0,
                    lookahead: lookahead.clone(),
                };
                if items.insert(item.clone()) {
                    pending.push_back(item);
                }
            }
        }
    }

    items
}

/// GOTO(I, X): the closure of the marker-advanced items of `I` that have `X`
/// directly after their marker. Empty when no item qualifies.
pub fn goto_set(
    grammar: &Grammar,
    first_sets: &FirstSets,
    items: &ItemSet,
    symbol: &Symbol,
) -> ItemSet {
    let kernel: ItemSet = items
        .iter()
        .filter(|item| item.next_symbol(grammar) == Some(symbol))
        .map(|item| LRItem {
            marker: item.marker + 1,
            ..item.clone()
        })
        .collect();
    if kernel.is_empty() {
        return kernel;
    }
    closure(grammar, first_sets, &kernel)
}

/// Group the marker-advanced successor kernels of `items` by transition
/// label, preserving first-seen label order.
fn extract_transitions(grammar: &Grammar, items: &ItemSet) -> Map<Symbol, ItemSet> {
    let mut kernels: Map<Symbol, ItemSet> = Map::default();
    for item in items {
        let Some(label) = item.next_symbol(grammar) else {
            continue;
        };
        kernels.entry(label.clone()).or_default().insert(LRItem {
            marker: item.marker + 1,
            ..item.clone()
        });
    }
    kernels
}

/// One state of the automaton: a closed item set plus its outgoing
/// transitions.
#[derive(Debug)]
pub struct State {
    items: ItemSet,
    edges: Map<Symbol, usize>,
}

impl State {
    pub fn items(&self) -> impl Iterator<Item = &LRItem> + '_ {
        self.items.iter()
    }

    pub fn item_set(&self) -> &ItemSet {
        &self.items
    }

    pub fn edges(&self) -> impl Iterator<Item = (&Symbol, usize)> + '_ {
        self.edges.iter().map(|(symbol, target)| (symbol, *target))
    }

    pub fn transition(&self, symbol: &str) -> Option<usize> {
        self.edges
            .iter()
            .find_map(|(label, target)| (label.name() == symbol).then_some(*target))
    }
}

/// The canonical collection of LR(1) item sets. State 0 is
/// `CLOSURE({[S' → · S, $]})`; indices follow discovery order.
#[derive(Debug)]
pub struct Automaton {
    states: Vec<State>,
}

impl Automaton {
    pub fn generate(grammar: &Grammar) -> Self {
        let first_sets = FirstSets::new(grammar);

        let start_kernel: ItemSet = [LRItem {
            production: 0,
            marker: 0,
            lookahead: Symbol::end_marker(),
        }]
        .into();
        let start = closure(grammar, &first_sets, &start_kernel);

        let mut states = vec![State {
            items: start.clone(),
            edges: Map::default(),
        }];
        let mut known: Map<ItemSet, usize> = Map::default();
        known.insert(start, 0);
        let mut pending = VecDeque::from([0usize]);

        while let Some(id) = pending.pop_front() {
            let items = states[id].items.clone();
            let mut edges = Map::default();

            for (symbol, kernel) in extract_transitions(grammar, &items) {
                let target = closure(grammar, &first_sets, &kernel);
                let target_id = match known.get(&target) {
                    Some(&existing) => existing,
                    None => {
                        let new_id = states.len();
                        states.push(State {
                            items: target.clone(),
                            edges: Map::default(),
                        });
                        known.insert(target, new_id);
                        pending.push_back(new_id);
                        new_id
                    }
                };
                edges.insert(symbol, target_id);
            }

            states[id].edges = edges;
        }

        tracing::debug!(states = states.len(), "canonical collection generated");
        Automaton { states }
    }

    pub fn states(&self) -> impl Iterator<Item = (usize, &State)> + '_ {
        self.states.iter().enumerate()
    }

    pub fn state(&self, id: usize) -> &State {
        &self.states[id]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// `δ(from, symbol)`.
    pub fn transition(&self, from: usize, symbol: &str) -> Option<usize> {
        self.states.get(from)?.transition(symbol)
    }

    pub fn display<'g>(&'g self, grammar: &'g Grammar) -> AutomatonDisplay<'g> {
        AutomatonDisplay {
            grammar,
            automaton: self,
        }
    }
}

pub struct AutomatonDisplay<'g> {
    grammar: &'g Grammar,
    automaton: &'g Automaton,
}

impl fmt::Display for AutomatonDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (id, state)) in self.automaton.states().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "#### State {:02}", id)?;
            writeln!(f, "## items")?;
            for item in state.items() {
                writeln!(f, "- {}", item.display(self.grammar))?;
            }
            writeln!(f, "## edges")?;
            for (symbol, target) in state.edges() {
                writeln!(f, "- {} -> {:02}", symbol, target)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expression_grammar() -> Grammar {
        Grammar::parse("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | i\n").unwrap()
    }

    fn start_closure(grammar: &Grammar, first_sets: &FirstSets) -> ItemSet {
        let kernel: ItemSet = [LRItem {
            production: 0,
            marker: 0,
            lookahead: Symbol::end_marker(),
        }]
        .into();
        closure(grammar, first_sets, &kernel)
    }

    #[test]
    fn closure_is_idempotent() {
        let grammar = expression_grammar();
        let first_sets = FirstSets::new(&grammar);
        let once = start_closure(&grammar, &first_sets);
        let twice = closure(&grammar, &first_sets, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn closure_never_produces_epsilon_lookaheads() {
        let grammar = Grammar::parse("S -> A b\nA -> ε\n").unwrap();
        let automaton = Automaton::generate(&grammar);
        for (_, state) in automaton.states() {
            for item in state.items() {
                assert!(!item.lookahead.is_epsilon(), "item {:?}", item);
            }
        }
    }

    #[test]
    fn goto_ignores_insertion_order() {
        let grammar = expression_grammar();
        let first_sets = FirstSets::new(&grammar);
        let items = start_closure(&grammar, &first_sets);

        let mut forward = ItemSet::new();
        for item in items.iter().cloned() {
            forward.insert(item);
        }
        let mut backward = ItemSet::new();
        for item in items.iter().rev().cloned() {
            backward.insert(item);
        }

        let symbol = Symbol::nonterminal("E");
        assert_eq!(
            goto_set(&grammar, &first_sets, &forward, &symbol),
            goto_set(&grammar, &first_sets, &backward, &symbol),
        );
    }

    #[test]
    fn goto_is_empty_without_matching_items() {
        let grammar = expression_grammar();
        let first_sets = FirstSets::new(&grammar);
        let items = start_closure(&grammar, &first_sets);
        let absent = goto_set(&grammar, &first_sets, &items, &Symbol::terminal(")"));
        assert!(absent.is_empty());
    }

    #[test]
    fn start_state_is_the_closed_start_kernel() {
        let grammar = expression_grammar();
        let first_sets = FirstSets::new(&grammar);
        let automaton = Automaton::generate(&grammar);
        assert_eq!(
            automaton.state(0).item_set(),
            &start_closure(&grammar, &first_sets)
        );
    }

    #[test]
    fn states_are_pairwise_distinct() {
        let grammar = expression_grammar();
        let automaton = Automaton::generate(&grammar);
        for (i, left) in automaton.states() {
            for (j, right) in automaton.states() {
                if i < j {
                    assert_ne!(left.item_set(), right.item_set(), "states {} and {}", i, j);
                }
            }
        }
    }

    #[test]
    fn transitions_match_goto() {
        let grammar = expression_grammar();
        let first_sets = FirstSets::new(&grammar);
        let automaton = Automaton::generate(&grammar);
        for (_, state) in automaton.states() {
            for (symbol, target) in state.edges() {
                let expected = goto_set(&grammar, &first_sets, state.item_set(), symbol);
                assert_eq!(automaton.state(target).item_set(), &expected);
            }
        }
    }

    #[test]
    fn smoketest_display() {
        let grammar = Grammar::parse("S -> C C\nC -> c C | d\n").unwrap();
        eprintln!("grammar:\n{}", grammar);
        let automaton = Automaton::generate(&grammar);
        eprintln!("states:\n---\n{}", automaton.display(&grammar));
        // the canonical LR(1) construction for this textbook grammar has 10 states
        assert_eq!(automaton.len(), 10);
    }
}
