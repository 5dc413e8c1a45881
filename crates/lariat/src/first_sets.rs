//! Calculation of FIRST sets.

use crate::grammar::{Grammar, Symbol, SymbolKind};
use crate::types::{Map, Set};
use compact_str::CompactString;

/// FIRST sets for every grammar symbol, with explicit ε propagation.
///
/// A pure function of the grammar: computed once per grammar and queried by
/// the closure engine for every lookahead projection.
#[derive(Debug)]
pub struct FirstSets {
    nulls: Set<CompactString>,
    map: Map<CompactString, Set<Symbol>>,
}

impl FirstSets {
    pub fn new(grammar: &Grammar) -> Self {
        let nulls = nulls_set(grammar);
        let map = first_map(grammar, &nulls);
        Self { nulls, map }
    }

    /// `FIRST(X)` for a single symbol. Terminals and `$` yield themselves;
    /// nullable nonterminals include ε.
    pub fn first(&self, symbol: &Symbol) -> Set<Symbol> {
        match symbol.kind() {
            SymbolKind::Terminal | SymbolKind::EndMarker => {
                [symbol.clone()].into_iter().collect()
            }
            SymbolKind::Epsilon => [Symbol::epsilon()].into_iter().collect(),
            SymbolKind::Nonterminal => {
                let mut first = self.map.get(symbol.name()).cloned().unwrap_or_default();
                if self.nulls.contains(symbol.name()) {
                    first.insert(Symbol::epsilon());
                }
                first
            }
        }
    }

    /// `FIRST(α)` for a sequence, folded left to right. The empty sequence
    /// yields `{ε}`; ε stays an explicit member until a caller projects it
    /// away.
    pub fn first_of_sequence(&self, sequence: &[Symbol]) -> Set<Symbol> {
        let mut result = Set::default();
        for symbol in sequence {
            let first = self.first(symbol);
            let nullable = first.contains(&Symbol::epsilon());
            result.extend(first.into_iter().filter(|sym| !sym.is_epsilon()));
            if !nullable {
                return result;
            }
        }
        result.insert(Symbol::epsilon());
        result
    }

    /// `FIRST(β a) \ {ε}`: the lookahead set of a closure expansion. When β
    /// derives ε the propagated lookahead `a` (which may be `$`) takes ε's
    /// place, so the result never contains ε.
    pub fn lookaheads(&self, beta: &[Symbol], lookahead: &Symbol) -> Set<Symbol> {
        let mut result = self.first_of_sequence(beta);
        if result.swap_remove(&Symbol::epsilon()) {
            result.insert(lookahead.clone());
        }
        result
    }

    pub fn is_nullable(&self, name: &str) -> bool {
        self.nulls.contains(name)
    }
}

/// The set of nonterminals that derive ε.
fn nulls_set(grammar: &Grammar) -> Set<CompactString> {
    let mut nulls: Set<CompactString> = grammar
        .productions()
        .iter()
        .filter(|production| production.is_epsilon())
        .map(|production| CompactString::from(production.lhs().name()))
        .collect();

    // repeat until the set no longer grows
    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.productions() {
            if nulls.contains(production.lhs().name()) {
                continue;
            }
            let rhs_nullable = production
                .rhs()
                .iter()
                .all(|symbol| symbol.is_nonterminal() && nulls.contains(symbol.name()));
            if rhs_nullable {
                changed = true;
                nulls.insert(production.lhs().name().into());
            }
        }
    }

    nulls
}

/// ε-free FIRST sets, solved as subset constraints.
///
/// For every rule `X → Y1 Y2 … Yn`, each Yi up to and including the first
/// non-nullable symbol contributes the constraint `FIRST(X) ⊇ FIRST(Yi)`.
fn first_map(grammar: &Grammar, nulls: &Set<CompactString>) -> Map<CompactString, Set<Symbol>> {
    let mut map: Map<CompactString, Set<Symbol>> = Map::default();

    for name in grammar.terminals() {
        map.insert(name.into(), [Symbol::terminal(name)].into_iter().collect());
    }
    for name in grammar.nonterminals() {
        map.insert(name.into(), Set::default());
    }

    struct Constraint<'g> {
        sup: &'g str,
        sub: &'g str,
    }
    let mut constraints = vec![];
    for production in grammar.productions() {
        for symbol in production.rhs() {
            if symbol.name() != production.lhs().name() {
                constraints.push(Constraint {
                    sup: production.lhs().name(),
                    sub: symbol.name(),
                });
            }
            if !(symbol.is_nonterminal() && nulls.contains(symbol.name())) {
                break;
            }
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for Constraint { sup, sub } in &constraints {
            let mut superset = map.swap_remove(*sup).unwrap_or_default();
            if let Some(subset) = map.get(*sub) {
                for symbol in subset {
                    if !superset.contains(symbol) {
                        superset.insert(symbol.clone());
                        changed = true;
                    }
                }
            }
            map.insert((*sup).into(), superset);
        }
    }

    map
}
