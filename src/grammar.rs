// src/grammar.rs
//! The context-free grammar bundle handed to the parser generator.
//!
//! A [`Grammar`] is immutable once constructed. Construction validates the
//! well-formedness rules the later stages rely on: the start symbol is a
//! declared nonterminal, every production head is a declared nonterminal,
//! and every symbol used on a right hand side is declared as a terminal or
//! nonterminal. The ε symbol may be written on right hand sides for
//! convenience; it is normalized away so that an empty right side is the
//! only representation of an ε-production.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::production::Production;
use crate::symbol::Symbol;

/// Why a grammar was rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("start symbol `{0}` is not a declared nonterminal")]
    InvalidStartSymbol(Symbol),
    #[error("production head `{0}` is not a declared nonterminal")]
    InvalidProductionHead(Symbol),
    #[error("production for `{lhs}` uses undeclared symbol `{symbol}`")]
    UndefinedSymbol { lhs: Symbol, symbol: Symbol },
}

/// An immutable context-free grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grammar {
    /// The terminal symbols of the grammar.
    pub terminals: BTreeSet<Symbol>,
    /// The nonterminal symbols of the grammar.
    pub nonterminals: BTreeSet<Symbol>,
    /// The productions, in declaration order. Declaration order matters: it
    /// breaks reduce/reduce ties during table construction.
    pub productions: Vec<Production>,
    /// The distinguished start symbol.
    pub start: Symbol,
}

impl Grammar {
    /// Validate and construct a grammar.
    pub fn new(
        terminals: BTreeSet<Symbol>,
        nonterminals: BTreeSet<Symbol>,
        productions: Vec<Production>,
        start: Symbol,
    ) -> Result<Grammar, GrammarError> {
        if !start.is_nonterminal() || !nonterminals.contains(&start) {
            return Err(GrammarError::InvalidStartSymbol(start));
        }

        // Normalize ε out of right hand sides up front so every later stage
        // can treat an empty rhs as the one representation of ε.
        let productions: Vec<Production> = productions
            .into_iter()
            .map(|p| {
                let rhs = p.rhs.into_iter().filter(|s| !s.is_epsilon()).collect();
                Production { lhs: p.lhs, rhs }
            })
            .collect();

        for production in &productions {
            if !production.lhs.is_nonterminal() || !nonterminals.contains(&production.lhs) {
                return Err(GrammarError::InvalidProductionHead(production.lhs.clone()));
            }
            for symbol in &production.rhs {
                if !terminals.contains(symbol) && !nonterminals.contains(symbol) {
                    return Err(GrammarError::UndefinedSymbol {
                        lhs: production.lhs.clone(),
                        symbol: symbol.clone(),
                    });
                }
            }
        }

        Ok(Grammar {
            terminals,
            nonterminals,
            productions,
            start,
        })
    }

    /// The productions whose left hand side is `lhs`, in declaration order.
    pub fn productions_for<'a>(
        &'a self,
        lhs: &'a Symbol,
    ) -> impl Iterator<Item = &'a Production> + 'a {
        self.productions.iter().filter(move |p| p.lhs == *lhs)
    }

    /// All grammar symbols, terminals then nonterminals, excluding ε.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.terminals
            .iter()
            .chain(self.nonterminals.iter())
            .filter(|s| !s.is_epsilon())
    }
}
