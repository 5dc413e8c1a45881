//! Grammar types.

use crate::syntax::GrammarError;
use crate::types::Set;
use compact_str::CompactString;
use std::fmt;

/// Canonical name of the epsilon symbol.
pub const EPSILON: &str = "ε";

/// Canonical name of the end-of-input marker.
pub const END_MARKER: &str = "$";

/// Classification tag attached to every grammar symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    Terminal,
    Nonterminal,
    Epsilon,
    EndMarker,
}

/// A named grammar symbol. Equality, ordering and hashing are by
/// (name, kind).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    name: CompactString,
    kind: SymbolKind,
}

impl Symbol {
    pub fn terminal(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Terminal,
        }
    }

    pub fn nonterminal(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Nonterminal,
        }
    }

    pub fn epsilon() -> Self {
        Self {
            name: EPSILON.into(),
            kind: SymbolKind::Epsilon,
        }
    }

    pub fn end_marker() -> Self {
        Self {
            name: END_MARKER.into(),
            kind: SymbolKind::EndMarker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Terminal)
    }

    pub fn is_nonterminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Nonterminal)
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self.kind, SymbolKind::Epsilon)
    }

    pub fn is_end_marker(&self) -> bool {
        matches!(self.kind, SymbolKind::EndMarker)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A production rule. An empty right-hand side is an ε-production.
#[derive(Debug, Clone)]
pub struct Production {
    index: usize,
    lhs: Symbol,
    rhs: Vec<Symbol>,
}

impl Production {
    pub(crate) fn new(index: usize, lhs: Symbol, rhs: Vec<Symbol>) -> Self {
        Self { index, lhs, rhs }
    }

    /// The stable index assigned at grammar construction; index 0 is the
    /// augmented start production.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn lhs(&self) -> &Symbol {
        &self.lhs
    }

    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} →", self.lhs)?;
        if self.rhs.is_empty() {
            return write!(f, " {}", EPSILON);
        }
        for symbol in &self.rhs {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

/// An augmented context-free grammar. Immutable once constructed; every
/// derived artifact (FIRST sets, automaton, tables) is rebuilt from scratch
/// when the grammar text changes.
#[derive(Debug)]
pub struct Grammar {
    productions: Vec<Production>,
    start: Symbol,
    terminals: Set<CompactString>,
    nonterminals: Set<CompactString>,
}

impl Grammar {
    pub(crate) fn new(
        productions: Vec<Production>,
        start: Symbol,
        terminals: Set<CompactString>,
        nonterminals: Set<CompactString>,
    ) -> Self {
        Self {
            productions,
            start,
            terminals,
            nonterminals,
        }
    }

    /// Parse a textual grammar definition. See [`crate::syntax::parse_grammar`].
    pub fn parse(source: &str) -> Result<Self, GrammarError> {
        crate::syntax::parse_grammar(source)
    }

    /// All productions in declaration order, the augmented start production
    /// first.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    /// Productions whose left-hand side is `lhs`.
    pub fn productions_for<'g>(&'g self, lhs: &'g Symbol) -> impl Iterator<Item = &'g Production> + 'g {
        self.productions.iter().filter(move |prod| prod.lhs() == lhs)
    }

    /// The augmented start symbol `S'`.
    pub fn start_symbol(&self) -> &Symbol {
        &self.start
    }

    pub fn terminals(&self) -> impl Iterator<Item = &str> + '_ {
        self.terminals.iter().map(|name| name.as_str())
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &str> + '_ {
        self.nonterminals.iter().map(|name| name.as_str())
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminals.contains(name)
    }

    pub fn is_nonterminal(&self, name: &str) -> bool {
        self.nonterminals.contains(name)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "terminals: ")?;
        for (i, name) in self.terminals().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", name)?;
        }
        write!(f, "\nnonterminals: ")?;
        for (i, name) in self.nonterminals().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", name)?;
        }
        writeln!(f, "\nstart_symbol: {}", self.start)?;
        writeln!(f, "rules:")?;
        for production in &self.productions {
            writeln!(f, "  [{:02}] {}", production.index(), production)?;
        }
        Ok(())
    }
}
