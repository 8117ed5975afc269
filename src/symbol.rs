use std::fmt;

/// Whether a symbol stands for itself in the input or for a set of
/// derivations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
}

/// A named grammar atom.
///
/// Equality, ordering and hashing are over the (name, kind) pair, so two
/// symbols with the same name but different kinds are distinct. Symbols are
/// plain values; clone them freely.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    /// The name of this symbol in the grammar.
    pub name: String,
    /// Terminal or nonterminal.
    pub kind: SymbolKind,
}

impl Symbol {
    /// Construct a terminal symbol.
    pub fn terminal(name: impl Into<String>) -> Self {
        Symbol {
            name: name.into(),
            kind: SymbolKind::Terminal,
        }
    }

    /// Construct a nonterminal symbol.
    pub fn nonterminal(name: impl Into<String>) -> Self {
        Symbol {
            name: name.into(),
            kind: SymbolKind::NonTerminal,
        }
    }

    /// The empty symbol. A terminal by convention; it never consumes input
    /// and never appears in FOLLOW sets.
    pub fn epsilon() -> Self {
        Symbol::terminal("ε")
    }

    /// The distinguished end-of-input terminal appended to token streams for
    /// LR parsing.
    pub fn end() -> Self {
        Symbol::terminal("$")
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == SymbolKind::Terminal
    }

    pub fn is_nonterminal(&self) -> bool {
        self.kind == SymbolKind::NonTerminal
    }

    pub fn is_epsilon(&self) -> bool {
        self.kind == SymbolKind::Terminal && self.name == "ε"
    }

    pub fn is_end(&self) -> bool {
        self.kind == SymbolKind::Terminal && self.name == "$"
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_name_and_kind() {
        assert_eq!(Symbol::terminal("x"), Symbol::terminal("x"));
        assert_ne!(Symbol::terminal("x"), Symbol::nonterminal("x"));
        assert_ne!(Symbol::terminal("x"), Symbol::terminal("y"));
    }

    #[test]
    fn distinguished_terminals() {
        assert!(Symbol::epsilon().is_epsilon());
        assert!(Symbol::end().is_end());
        assert!(Symbol::end().is_terminal());
        assert!(!Symbol::nonterminal("ε").is_epsilon());
    }
}
