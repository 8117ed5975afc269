// src/automaton.rs
/*!
The canonical collection of LR(1) items.

The grammar is augmented with a fresh start production `S' -> S` and the
collection grows from `CLOSURE({[S' -> • S, $]})` by taking GOTO on every
grammar symbol until no new state appears. States are sets of items;
equality is set equality including lookaheads, which is what makes this
LR(1) rather than LALR(1). The kernel merge happens later, in
[`crate::table`].

Items refer to productions by index into the automaton's augmented
production list (index 0 is the start production), which keeps items small,
hashing cheap, and "declared earlier" a plain index comparison.
!*/

use std::collections::{BTreeSet, HashMap, VecDeque};

use tracing::debug;

use crate::analysis::Analysis;
use crate::grammar::Grammar;
use crate::production::Production;
use crate::symbol::Symbol;

/// An LR(1) item: a dotted production with one lookahead terminal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lr1Item {
    /// Index into the automaton's augmented production list.
    pub production: usize,
    /// Dot position, in `0..=rhs.len()`.
    pub dot: usize,
    /// The lookahead terminal.
    pub lookahead: Symbol,
}

/// A state of the automaton: a set of items closed under CLOSURE.
pub type ItemSet = BTreeSet<Lr1Item>;

/// The canonical LR(1) collection for one grammar.
#[derive(Clone, Debug)]
pub struct Lr1Automaton {
    /// The augmented production list. `productions[0]` is `S' -> S`; the
    /// grammar's own productions follow in declaration order.
    pub productions: Vec<Production>,
    /// Every state, indexed by id. State 0 is the initial state.
    pub states: Vec<ItemSet>,
    /// The goto graph over grammar symbols.
    pub transitions: HashMap<(usize, Symbol), usize>,
    /// The fresh start symbol `S'`.
    pub augmented_start: Symbol,
}

impl Lr1Automaton {
    /// Build the canonical collection for `grammar`.
    pub fn build(grammar: &Grammar) -> Lr1Automaton {
        let augmented_start = Symbol::nonterminal(format!("{}'", grammar.start.name));
        let mut productions =
            vec![Production::new(augmented_start.clone(), vec![grammar.start.clone()])];
        productions.extend(grammar.productions.iter().cloned());

        let builder = Builder {
            productions: &productions,
            analysis: Analysis::of(grammar),
        };

        let initial = builder.closure(BTreeSet::from([Lr1Item {
            production: 0,
            dot: 0,
            lookahead: Symbol::end(),
        }]));

        let mut states: Vec<ItemSet> = vec![initial.clone()];
        let mut known: HashMap<ItemSet, usize> = HashMap::from([(initial, 0)]);
        let mut transitions: HashMap<(usize, Symbol), usize> = HashMap::new();
        let mut worklist: VecDeque<usize> = VecDeque::from([0]);

        let symbols: Vec<Symbol> = grammar.symbols().cloned().collect();

        while let Some(current) = worklist.pop_front() {
            let current_items = states[current].clone();
            for symbol in &symbols {
                let target_items = builder.goto(&current_items, symbol);
                if target_items.is_empty() {
                    continue;
                }
                let target = match known.get(&target_items) {
                    Some(&existing) => existing,
                    None => {
                        let id = states.len();
                        states.push(target_items.clone());
                        known.insert(target_items, id);
                        worklist.push_back(id);
                        id
                    }
                };
                transitions.insert((current, symbol.clone()), target);
            }
        }

        debug!(states = states.len(), "LR(1) canonical collection finished");

        Lr1Automaton {
            productions,
            states,
            transitions,
            augmented_start,
        }
    }

    /// The symbol after the dot, or `None` when the dot is at the end.
    pub fn symbol_after_dot<'a>(&'a self, item: &Lr1Item) -> Option<&'a Symbol> {
        self.productions[item.production].rhs.get(item.dot)
    }
}

struct Builder<'a> {
    productions: &'a [Production],
    analysis: Analysis,
}

impl Builder<'_> {
    /// CLOSURE(I): for each `[A -> α • B β, a]` with nonterminal B, add
    /// `[B -> • γ, b]` for every production of B and every terminal b in
    /// FIRST(β a), to fixpoint.
    fn closure(&self, items: ItemSet) -> ItemSet {
        let mut closure = items.clone();
        let mut worklist: VecDeque<Lr1Item> = items.into_iter().collect();

        while let Some(item) = worklist.pop_front() {
            let rhs = &self.productions[item.production].rhs;
            let Some(after_dot) = rhs.get(item.dot) else {
                continue;
            };
            if !after_dot.is_nonterminal() {
                continue;
            }

            let mut beta_a: Vec<Symbol> = rhs[item.dot + 1..].to_vec();
            beta_a.push(item.lookahead.clone());
            let lookaheads = self.analysis.first_of_sequence(&beta_a);

            for (index, production) in self.productions.iter().enumerate() {
                if production.lhs != *after_dot {
                    continue;
                }
                for lookahead in &lookaheads {
                    let new_item = Lr1Item {
                        production: index,
                        dot: 0,
                        lookahead: lookahead.clone(),
                    };
                    if closure.insert(new_item.clone()) {
                        worklist.push_back(new_item);
                    }
                }
            }
        }

        closure
    }

    /// GOTO(I, X): advance the dot over X in every item that has X next,
    /// then close.
    fn goto(&self, items: &ItemSet, symbol: &Symbol) -> ItemSet {
        let mut moved = ItemSet::new();
        for item in items {
            if self.productions[item.production].rhs.get(item.dot) == Some(symbol) {
                moved.insert(Lr1Item {
                    production: item.production,
                    dot: item.dot + 1,
                    lookahead: item.lookahead.clone(),
                });
            }
        }
        if moved.is_empty() {
            moved
        } else {
            self.closure(moved)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(name: &str) -> Symbol {
        Symbol::terminal(name)
    }

    fn nt(name: &str) -> Symbol {
        Symbol::nonterminal(name)
    }

    // S -> C C ; C -> c C | d. The canonical LR(1) collection for this
    // grammar is the textbook ten-state one.
    fn cc_grammar() -> Grammar {
        let Ok(grammar) = Grammar::new(
            [t("c"), t("d")].into_iter().collect(),
            [nt("S"), nt("C")].into_iter().collect(),
            vec![
                Production::new(nt("S"), vec![nt("C"), nt("C")]),
                Production::new(nt("C"), vec![t("c"), nt("C")]),
                Production::new(nt("C"), vec![t("d")]),
            ],
            nt("S"),
        ) else {
            panic!()
        };
        grammar
    }

    #[test]
    fn initial_state_closure() {
        let automaton = Lr1Automaton::build(&cc_grammar());
        let initial = &automaton.states[0];

        // [S' -> • S, $], [S -> • C C, $], and [C -> • c C | • d, c/d].
        assert_eq!(initial.len(), 6);
        assert!(initial.contains(&Lr1Item {
            production: 0,
            dot: 0,
            lookahead: Symbol::end(),
        }));
        assert!(initial.contains(&Lr1Item {
            production: 2,
            dot: 0,
            lookahead: t("c"),
        }));
        assert!(initial.contains(&Lr1Item {
            production: 3,
            dot: 0,
            lookahead: t("d"),
        }));
    }

    #[test]
    fn canonical_collection_has_ten_states() {
        let automaton = Lr1Automaton::build(&cc_grammar());
        assert_eq!(automaton.states.len(), 10);
    }

    #[test]
    fn goto_graph_covers_the_initial_state() {
        let automaton = Lr1Automaton::build(&cc_grammar());
        for symbol in [nt("S"), nt("C"), t("c"), t("d")] {
            assert!(
                automaton.transitions.contains_key(&(0, symbol.clone())),
                "missing transition on {symbol}"
            );
        }
    }

    #[test]
    fn lookaheads_distinguish_states() {
        // The states around c C differ only in lookahead; canonical LR(1)
        // keeps them apart.
        let automaton = Lr1Automaton::build(&cc_grammar());
        let on_c = automaton.transitions[&(0, t("c"))];
        let after_cc = automaton.transitions[&(automaton.transitions[&(0, nt("C"))], t("c"))];
        assert_ne!(on_c, after_cc);
    }

    #[test]
    fn dots_never_pass_the_end() {
        let automaton = Lr1Automaton::build(&cc_grammar());
        for state in &automaton.states {
            for item in state {
                assert!(item.dot <= automaton.productions[item.production].rhs.len());
            }
        }
    }
}
