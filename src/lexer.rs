// src/lexer.rs
/*!
The tokenizing DFA simulator.

Scanning is maximal munch: from each position the simulator walks the DFA
as far as it can, remembering the last accepting position, and emits the
token recorded there. Ties between patterns were already decided when the
DFA was tagged, so the simulator never consults priorities itself.

When no prefix matches at all, the simulator does not give up: it collects
the longest unmatched run into a single ERROR token and carries on at the
next position where a match succeeds. Callers decide whether an ERROR token
aborts their pipeline.

Whitespace gets no special treatment. A WHITESPACE pattern participates
like any other pattern, and [`Lexer`] can be told to drop token types on
the way out, which is how a caller typically filters it.
!*/

use std::collections::HashSet;

use tracing::trace;

use crate::dfa::{determinize, Alphabet, Dfa};
use crate::minimize::minimize;
use crate::nfa;
use crate::regex::PatternError;
use crate::token::{LexicalToken, TokenType};

/// Match a single token starting at byte offset `start`.
///
/// Walks the DFA until it gets stuck and returns the end byte offset and
/// token of the longest accepted prefix, or `None` if no prefix from
/// `start` is accepted. `start` must lie on a character boundary.
pub fn match_token(dfa: &Dfa, input: &str, start: usize) -> Option<(usize, TokenType)> {
    let mut state = dfa.start;
    let mut best: Option<(usize, TokenType)> = None;

    for (offset, c) in input[start..].char_indices() {
        match dfa.state(state).transition(c) {
            Some(next) => state = next,
            None => break,
        }
        let reached = dfa.state(state);
        if reached.accepting {
            if let Some(token) = reached.token.clone() {
                best = Some((start + offset + c.len_utf8(), token));
            }
        }
    }

    best
}

/// Run the DFA over the whole input and return the token of the final
/// state, or `None` if the input is not a single complete token.
pub fn validate_token(dfa: &Dfa, input: &str) -> Option<TokenType> {
    let mut state = dfa.start;
    for c in input.chars() {
        state = dfa.state(state).transition(c)?;
    }
    let final_state = dfa.state(state);
    if final_state.accepting {
        final_state.token.clone()
    } else {
        None
    }
}

/// A compiled tokenizer: the tagged DFA plus the token types to drop.
#[derive(Clone, Debug)]
pub struct Lexer {
    /// The DFA driving the scan.
    pub dfa: Dfa,
    /// Token types silently skipped when emitting, typically WHITESPACE.
    pub ignore: HashSet<TokenType>,
}

/// Configuration for building a [`Lexer`] from pattern definitions.
pub struct LexerBuilder {
    patterns: Vec<(String, TokenType)>,
    ignore: HashSet<TokenType>,
    minimize: bool,
}

impl LexerBuilder {
    pub fn new() -> Self {
        LexerBuilder {
            patterns: Vec::new(),
            ignore: HashSet::new(),
            minimize: false,
        }
    }

    /// Add a pattern recognized as `token`.
    pub fn pattern(mut self, pattern: &str, token: TokenType) -> Self {
        self.patterns.push((pattern.into(), token));
        self
    }

    /// Drop tokens of this type from the output stream. The type still has
    /// to be registered with [`Self::pattern`] to be recognized at all.
    pub fn ignore(mut self, token: TokenType) -> Self {
        self.ignore.insert(token);
        self
    }

    /// Run the minimization pass on the built DFA.
    pub fn minimize(mut self, yes: bool) -> Self {
        self.minimize = yes;
        self
    }

    /// Compile every pattern, merge the tagged NFAs, determinize, and
    /// optionally minimize.
    pub fn build(self, alphabet: &Alphabet) -> Result<Lexer, PatternError> {
        if self.patterns.is_empty() {
            return Err(PatternError::EmptyPattern);
        }

        let mut nfas = Vec::with_capacity(self.patterns.len());
        for (pattern, token) in self.patterns {
            nfas.push(nfa::compile_pattern(&pattern, token)?);
        }

        let mut dfa = determinize(&nfa::merge(nfas), alphabet);
        if self.minimize {
            dfa = minimize(&dfa, alphabet);
        }

        Ok(Lexer {
            dfa,
            ignore: self.ignore,
        })
    }
}

impl Default for LexerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    pub fn builder() -> LexerBuilder {
        LexerBuilder::new()
    }

    /// Lazily tokenize `input` by repeated maximal munch.
    pub fn tokens<'a>(&'a self, input: &'a str) -> Tokens<'a> {
        Tokens {
            lexer: self,
            input,
            pos: 0,
        }
    }

    /// Tokenize the whole input into a vector.
    pub fn tokenize(&self, input: &str) -> Vec<LexicalToken> {
        self.tokens(input).collect()
    }

    /// Check whether the whole input is one token and return its type.
    pub fn validate(&self, input: &str) -> Option<TokenType> {
        validate_token(&self.dfa, input)
    }
}

/// Iterator over the lexical tokens of one input string.
pub struct Tokens<'a> {
    lexer: &'a Lexer,
    input: &'a str,
    pos: usize,
}

impl Iterator for Tokens<'_> {
    type Item = LexicalToken;

    fn next(&mut self) -> Option<LexicalToken> {
        loop {
            if self.pos >= self.input.len() {
                return None;
            }

            if let Some((end, token)) = match_token(&self.lexer.dfa, self.input, self.pos) {
                let lexeme = &self.input[self.pos..end];
                self.pos = end;
                if self.lexer.ignore.contains(&token) {
                    continue;
                }
                return Some(LexicalToken::new(token, lexeme));
            }

            // Nothing matches here. Swallow characters until some position
            // starts a token again and report the run as one ERROR token.
            let error_start = self.pos;
            while self.pos < self.input.len()
                && match_token(&self.lexer.dfa, self.input, self.pos).is_none()
            {
                let step = self.input[self.pos..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                self.pos += step;
            }
            let lexeme = &self.input[error_start..self.pos];
            trace!(start = error_start, lexeme, "lexical error run");
            return Some(LexicalToken::error(lexeme));
        }
    }
}
