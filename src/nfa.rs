// src/nfa.rs
/*!
Thompson construction of nondeterministic finite automata.

States live in an arena owned by the [`Nfa`] and are addressed by index, so
the cyclic transition graphs the construction produces (loops are the whole
point of `*` and `+`) need no reference counting. A transition labeled
`None` is an ε-transition.

A pattern compiled with [`compile_pattern`] is "tagged": its end state is
accepting and carries the pattern's token type. [`merge`] unions a batch of
tagged NFAs under a fresh start state, which is the shape the subset
construction in [`crate::dfa`] expects.
!*/

use crate::regex::{self, PatternError, CONCAT};
use crate::token::TokenType;

/// Index of a state inside its owning [`Nfa`].
pub type StateId = usize;

/// A single NFA state.
#[derive(Clone, Debug)]
pub struct NfaState {
    /// Outgoing transitions in insertion order. `None` labels ε.
    pub transitions: Vec<(Option<char>, StateId)>,
    /// Whether this state accepts.
    pub accepting: bool,
    /// The token this state recognizes, set only on tagged end states.
    pub token: Option<TokenType>,
}

impl NfaState {
    fn new() -> Self {
        NfaState {
            transitions: Vec::new(),
            accepting: false,
            token: None,
        }
    }

    /// The states reachable from here on ε.
    pub fn epsilon_targets(&self) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .iter()
            .filter(|(label, _)| label.is_none())
            .map(|&(_, target)| target)
    }

    /// The states reachable from here on `c`.
    pub fn targets_on(&self, c: char) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .iter()
            .filter(move |(label, _)| *label == Some(c))
            .map(|&(_, target)| target)
    }
}

/// A nondeterministic finite automaton with a distinguished start and end.
///
/// For an NFA fresh out of Thompson construction, `end` is the single
/// accepting state. A merged NFA keeps each input's tagged end states and
/// `end` is a placeholder that nothing reaches.
#[derive(Clone, Debug)]
pub struct Nfa {
    states: Vec<NfaState>,
    pub start: StateId,
    pub end: StateId,
}

impl Nfa {
    pub fn state(&self, id: StateId) -> &NfaState {
        &self.states[id]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &NfaState)> {
        self.states.iter().enumerate()
    }

    /// Simulate the NFA on `input` directly, without determinizing.
    ///
    /// Mostly useful for cross-checking the DFA pipeline; tokenization goes
    /// through [`crate::dfa`] and [`crate::lexer`].
    pub fn accepts(&self, input: &str) -> bool {
        let mut current = self.epsilon_closure(vec![self.start]);
        for c in input.chars() {
            let mut moved: Vec<StateId> = Vec::new();
            for &id in &current {
                for target in self.states[id].targets_on(c) {
                    if !moved.contains(&target) {
                        moved.push(target);
                    }
                }
            }
            if moved.is_empty() {
                return false;
            }
            current = self.epsilon_closure(moved);
        }
        current.iter().any(|&id| self.states[id].accepting)
    }

    fn epsilon_closure(&self, seed: Vec<StateId>) -> Vec<StateId> {
        let mut visited = vec![false; self.states.len()];
        let mut stack = seed.clone();
        let mut closure = seed;
        for &id in &closure {
            visited[id] = true;
        }
        while let Some(id) = stack.pop() {
            for target in self.states[id].epsilon_targets() {
                if !visited[target] {
                    visited[target] = true;
                    closure.push(target);
                    stack.push(target);
                }
            }
        }
        closure
    }
}

/// A partially built automaton on the construction stack: a start/end pair
/// into the arena being filled.
struct Fragment {
    start: StateId,
    end: StateId,
}

/// Compile an infix pattern into an untagged NFA.
pub fn compile(pattern: &str) -> Result<Nfa, PatternError> {
    let postfix = regex::to_postfix(pattern)?;
    build_from_postfix(&postfix)
}

/// Compile an infix pattern into a tagged NFA: the end state accepts and
/// carries `token`.
pub fn compile_pattern(pattern: &str, token: TokenType) -> Result<Nfa, PatternError> {
    let mut nfa = compile(pattern)?;
    let end = nfa.end;
    nfa.states[end].accepting = true;
    nfa.states[end].token = Some(token);
    Ok(nfa)
}

/// Union a non-empty batch of tagged NFAs under a fresh start state.
///
/// Every input keeps its own accepting end state and token tag; the fresh
/// start gets one ε-transition per input. A single-element batch is
/// returned unchanged.
///
/// # Panics
///
/// Panics if `nfas` is empty.
pub fn merge(mut nfas: Vec<Nfa>) -> Nfa {
    assert!(!nfas.is_empty(), "cannot merge an empty batch of NFAs");

    if nfas.len() == 1 {
        return nfas.pop().unwrap();
    }

    let mut states = vec![NfaState::new()];
    let start = 0;

    for nfa in &nfas {
        let offset = states.len();
        for state in &nfa.states {
            let mut copied = state.clone();
            for (_, target) in copied.transitions.iter_mut() {
                *target += offset;
            }
            states.push(copied);
        }
        states[start].transitions.push((None, nfa.start + offset));
    }

    // No common end: each input keeps its own. The placeholder is a fresh
    // unreachable state, mirroring the start/end pair shape everywhere else.
    let placeholder = states.len();
    states.push(NfaState::new());

    Nfa {
        states,
        start,
        end: placeholder,
    }
}

fn build_from_postfix(postfix: &str) -> Result<Nfa, PatternError> {
    let mut states: Vec<NfaState> = Vec::new();
    let mut stack: Vec<Fragment> = Vec::new();

    let mut new_state = |states: &mut Vec<NfaState>| -> StateId {
        states.push(NfaState::new());
        states.len() - 1
    };

    for c in postfix.chars() {
        if regex::is_operand(c) {
            let start = new_state(&mut states);
            let end = new_state(&mut states);
            states[start].transitions.push((Some(c), end));
            stack.push(Fragment { start, end });
            continue;
        }

        match c {
            CONCAT => {
                let b = stack.pop().ok_or(PatternError::MissingOperand(c))?;
                let a = stack.pop().ok_or(PatternError::MissingOperand(c))?;
                states[a.end].transitions.push((None, b.start));
                stack.push(Fragment {
                    start: a.start,
                    end: b.end,
                });
            }
            '|' => {
                let b = stack.pop().ok_or(PatternError::MissingOperand(c))?;
                let a = stack.pop().ok_or(PatternError::MissingOperand(c))?;
                let start = new_state(&mut states);
                let end = new_state(&mut states);
                states[start].transitions.push((None, a.start));
                states[start].transitions.push((None, b.start));
                states[a.end].transitions.push((None, end));
                states[b.end].transitions.push((None, end));
                stack.push(Fragment { start, end });
            }
            '*' => {
                let inner = stack.pop().ok_or(PatternError::MissingOperand(c))?;
                let start = new_state(&mut states);
                let end = new_state(&mut states);
                states[start].transitions.push((None, end));
                states[start].transitions.push((None, inner.start));
                states[inner.end].transitions.push((None, inner.start));
                states[inner.end].transitions.push((None, end));
                stack.push(Fragment { start, end });
            }
            '+' => {
                let inner = stack.pop().ok_or(PatternError::MissingOperand(c))?;
                let start = new_state(&mut states);
                let end = new_state(&mut states);
                states[start].transitions.push((None, inner.start));
                states[inner.end].transitions.push((None, inner.start));
                states[inner.end].transitions.push((None, end));
                stack.push(Fragment { start, end });
            }
            '?' => {
                let inner = stack.pop().ok_or(PatternError::MissingOperand(c))?;
                let start = new_state(&mut states);
                let end = new_state(&mut states);
                states[start].transitions.push((None, end));
                states[start].transitions.push((None, inner.start));
                states[inner.end].transitions.push((None, end));
                stack.push(Fragment { start, end });
            }
            _ => return Err(PatternError::MissingOperand(c)),
        }
    }

    if stack.len() != 1 {
        return Err(PatternError::DanglingFragments(stack.len()));
    }

    let Fragment { start, end } = stack.pop().unwrap();
    Ok(Nfa { states, start, end })
}
