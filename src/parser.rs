// src/parser.rs
//! The table-driven shift/reduce engine.
//!
//! The engine keeps a stack of state ids, initially just the table's start
//! state, and consumes one terminal at a time. Each step looks up
//! `ACTION[top, current]`: a shift pushes the target state and advances, a
//! reduce pops once per right-hand-side symbol and pushes the GOTO of the
//! uncovered state, accept succeeds, and a missing entry is a syntax error.
//! The engine appends `$` to the input itself.

use thiserror::Error;

use crate::production::Production;
use crate::symbol::Symbol;
use crate::table::{Action, LalrTable};
use crate::token::TokenType;

/// Why a parse failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("no action in state {state} on `{symbol}`")]
    UnexpectedSymbol { state: usize, symbol: Symbol },
    #[error("no goto in state {state} on `{nonterminal}` after reducing")]
    MissingGoto { state: usize, nonterminal: Symbol },
    #[error("state stack underflow while reducing by `{production}`")]
    StackUnderflow { production: Production },
}

/// An LALR(1) parser: a table plus the drive loop.
#[derive(Clone, Debug)]
pub struct LalrParser {
    pub table: LalrTable,
}

impl LalrParser {
    pub fn new(table: LalrTable) -> LalrParser {
        LalrParser { table }
    }

    /// Parse a stream of lexer token types. The token names are matched
    /// against the grammar's terminal names.
    pub fn parse(&self, tokens: &[TokenType]) -> bool {
        let symbols: Vec<Symbol> = tokens
            .iter()
            .map(|token| Symbol::terminal(token.name.clone()))
            .collect();
        self.parse_symbols(&symbols).is_ok()
    }

    /// Parse a stream of terminal symbols.
    pub fn parse_symbols(&self, input: &[Symbol]) -> Result<(), ParseError> {
        self.parse_with(input, |_| {})
    }

    /// Parse and invoke `on_reduce` for every reduction, in the order the
    /// engine performs them. This is the hook a tree builder or evaluator
    /// attaches to.
    pub fn parse_with<F>(&self, input: &[Symbol], mut on_reduce: F) -> Result<(), ParseError>
    where
        F: FnMut(&Production),
    {
        let mut stack: Vec<usize> = vec![self.table.start_state];
        let mut symbols: Vec<Symbol> = input.to_vec();
        symbols.push(Symbol::end());

        let mut ip = 0;
        loop {
            // The stack always holds at least the start state; reductions
            // check their own popping below.
            let state = *stack.last().ok_or_else(|| ParseError::UnexpectedSymbol {
                state: self.table.start_state,
                symbol: symbols[ip].clone(),
            })?;
            let current = &symbols[ip];

            let Some(action) = self.table.actions.get(&(state, current.clone())) else {
                return Err(ParseError::UnexpectedSymbol {
                    state,
                    symbol: current.clone(),
                });
            };

            match action {
                Action::Shift(target) => {
                    stack.push(*target);
                    ip += 1;
                }
                Action::Reduce(production) => {
                    // Pop one state per right-hand-side symbol; ε pops none.
                    for _ in 0..production.rhs.len() {
                        if stack.pop().is_none() {
                            return Err(ParseError::StackUnderflow {
                                production: production.clone(),
                            });
                        }
                    }
                    let uncovered = *stack.last().ok_or_else(|| ParseError::StackUnderflow {
                        production: production.clone(),
                    })?;
                    let Some(target) = self
                        .table
                        .gotos
                        .get(&(uncovered, production.lhs.clone()))
                    else {
                        return Err(ParseError::MissingGoto {
                            state: uncovered,
                            nonterminal: production.lhs.clone(),
                        });
                    };
                    stack.push(*target);
                    on_reduce(production);
                }
                Action::Accept => return Ok(()),
            }
        }
    }
}
