// src/table.rs
/*!
LALR(1) table construction.

The LR(1) states are grouped by kernel, the set of (production, dot) pairs
with lookaheads stripped. Each group merges into a single LALR(1) state
holding the union of the group's items, and the goto graph is rewritten
through the resulting id map. That rewrite is well defined: LR(1) states
sharing a kernel have the same outgoing symbols, and their goto targets
share kernels too.

ACTION and GOTO are then filled per state. Shifts and gotos come straight
from the merged transitions; a dot-at-end item contributes a reduce on its
lookahead, or accept for the augmented start production on `$`. Collisions
never abort the build. They are resolved by the default policy, recorded in
the conflict list, and logged: shift beats reduce, and of two reduces the
production declared earlier wins.
!*/

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::automaton::{ItemSet, Lr1Automaton};
use crate::production::Production;
use crate::symbol::Symbol;

/// A parsing instruction stored in one ACTION cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Consume the terminal and move to the given state.
    Shift(usize),
    /// Reduce the stack by this production.
    Reduce(Production),
    /// The input belongs to the language.
    Accept,
}

/// The ACTION table: `(state, terminal)` to instruction.
pub type ActionTable = HashMap<(usize, Symbol), Action>;

/// The GOTO table: `(state, nonterminal)` to state.
pub type GotoTable = HashMap<(usize, Symbol), usize>;

/// A recorded table collision, resolved by the default policy.
#[derive(Clone, Debug, PartialEq)]
pub enum Conflict {
    /// Shift and reduce compete on `symbol`; the shift was kept.
    ShiftReduce {
        state: usize,
        symbol: Symbol,
        shift_state: usize,
        production: Production,
    },
    /// Two reductions compete on `symbol`; the production declared earlier
    /// was kept.
    ReduceReduce {
        state: usize,
        symbol: Symbol,
        kept: Production,
        dropped: Production,
    },
}

/// The kernel of a state: its (production, dot) pairs without lookaheads.
pub type Kernel = BTreeSet<(usize, usize)>;

fn kernel_of(state: &ItemSet) -> Kernel {
    state.iter().map(|item| (item.production, item.dot)).collect()
}

/// An LALR(1) parse table with its merged state machine and conflict list.
#[derive(Clone, Debug)]
pub struct LalrTable {
    /// The ACTION table.
    pub actions: ActionTable,
    /// The GOTO table.
    pub gotos: GotoTable,
    /// Id of the state the engine starts in.
    pub start_state: usize,
    /// The merged LALR(1) states, for inspection.
    pub states: Vec<ItemSet>,
    /// The merged goto graph.
    pub transitions: HashMap<(usize, Symbol), usize>,
    /// Every collision encountered while filling the table.
    pub conflicts: Vec<Conflict>,
}

impl LalrTable {
    /// Merge `automaton` by kernel and fill ACTION/GOTO.
    pub fn build(automaton: &Lr1Automaton) -> LalrTable {
        // Merge states that share a kernel. LALR ids are handed out in
        // order of first appearance, so state numbering is reproducible.
        let mut kernel_ids: HashMap<Kernel, usize> = HashMap::new();
        let mut lr1_to_lalr: Vec<usize> = Vec::with_capacity(automaton.states.len());
        let mut states: Vec<ItemSet> = Vec::new();

        for state in &automaton.states {
            let kernel = kernel_of(state);
            match kernel_ids.get(&kernel) {
                Some(&id) => {
                    states[id].extend(state.iter().cloned());
                    lr1_to_lalr.push(id);
                }
                None => {
                    let id = states.len();
                    kernel_ids.insert(kernel, id);
                    states.push(state.clone());
                    lr1_to_lalr.push(id);
                }
            }
        }

        // Rewrite the goto graph through the merge map.
        let mut transitions: HashMap<(usize, Symbol), usize> = HashMap::new();
        for ((from, symbol), to) in &automaton.transitions {
            transitions.insert((lr1_to_lalr[*from], symbol.clone()), lr1_to_lalr[*to]);
        }

        let mut table = LalrTable {
            actions: HashMap::new(),
            gotos: HashMap::new(),
            start_state: lr1_to_lalr[0],
            states,
            transitions,
            conflicts: Vec::new(),
        };
        table.fill(automaton);
        table
    }

    fn fill(&mut self, automaton: &Lr1Automaton) {
        // Shifts and gotos first, straight off the merged transitions.
        for ((state, symbol), target) in &self.transitions {
            if symbol.is_terminal() {
                self.actions
                    .insert((*state, symbol.clone()), Action::Shift(*target));
            } else {
                self.gotos.insert((*state, symbol.clone()), *target);
            }
        }

        // Reduce and accept actions from dot-at-end items. The reduce index
        // per cell is kept on the side so a reduce/reduce collision can keep
        // whichever production was declared first.
        let mut reduce_index: HashMap<(usize, Symbol), usize> = HashMap::new();

        for (state, items) in self.states.iter().enumerate() {
            for item in items {
                let production = &automaton.productions[item.production];
                if item.dot < production.rhs.len() {
                    continue;
                }

                if item.production == 0 {
                    // [S' -> S •, $] accepts. Nothing else competes here.
                    if item.lookahead.is_end() {
                        self.actions
                            .insert((state, item.lookahead.clone()), Action::Accept);
                    }
                    continue;
                }

                let cell = (state, item.lookahead.clone());
                match self.actions.get(&cell) {
                    None => {
                        self.actions
                            .insert(cell.clone(), Action::Reduce(production.clone()));
                        reduce_index.insert(cell, item.production);
                    }
                    Some(Action::Shift(target)) => {
                        let conflict = Conflict::ShiftReduce {
                            state,
                            symbol: item.lookahead.clone(),
                            shift_state: *target,
                            production: production.clone(),
                        };
                        warn!(
                            state,
                            symbol = %item.lookahead,
                            production = %production,
                            "shift/reduce conflict, keeping the shift"
                        );
                        self.conflicts.push(conflict);
                    }
                    Some(Action::Reduce(_)) => {
                        let existing = reduce_index[&cell];
                        let (kept, dropped) = if item.production < existing {
                            (item.production, existing)
                        } else {
                            (existing, item.production)
                        };
                        warn!(
                            state,
                            symbol = %item.lookahead,
                            kept = %automaton.productions[kept],
                            dropped = %automaton.productions[dropped],
                            "reduce/reduce conflict, keeping the earlier production"
                        );
                        self.conflicts.push(Conflict::ReduceReduce {
                            state,
                            symbol: item.lookahead.clone(),
                            kept: automaton.productions[kept].clone(),
                            dropped: automaton.productions[dropped].clone(),
                        });
                        self.actions.insert(
                            cell.clone(),
                            Action::Reduce(automaton.productions[kept].clone()),
                        );
                        reduce_index.insert(cell, kept);
                    }
                    Some(Action::Accept) => {
                        // Unreachable in practice: the accept state contains
                        // only the augmented item.
                    }
                }
            }
        }
    }

    /// The recorded conflicts, in discovery order.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }
}
