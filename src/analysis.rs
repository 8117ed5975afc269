// src/analysis.rs
//! FIRST and FOLLOW set computation.
//!
//! Both sets are pure functions of the grammar, computed by sweeping over
//! all productions until a sweep adds nothing. [`Analysis::of`] runs the
//! computation once and keeps the results, so the LR(1) closure can look up
//! lookaheads without recomputing anything.
//!
//! ε can appear in FIRST sets; it never appears in FOLLOW sets.

use std::collections::{BTreeSet, HashMap};

use crate::grammar::Grammar;
use crate::production::Production;
use crate::symbol::Symbol;

/// A symbol's prediction set.
pub type SymbolSet = BTreeSet<Symbol>;

/// Precomputed FIRST and FOLLOW sets for one grammar.
#[derive(Clone, Debug)]
pub struct Analysis {
    first: HashMap<Symbol, SymbolSet>,
    follow: HashMap<Symbol, SymbolSet>,
}

impl Analysis {
    /// Compute both set families for `grammar`.
    pub fn of(grammar: &Grammar) -> Analysis {
        let mut first = initial_first(grammar);
        while first_pass(grammar, &mut first) {}

        let mut follow = initial_follow(grammar);
        while follow_pass(grammar, &first, &mut follow) {}

        Analysis { first, follow }
    }

    /// FIRST(symbol), if the symbol belongs to the grammar.
    pub fn first(&self, symbol: &Symbol) -> Option<&SymbolSet> {
        self.first.get(symbol)
    }

    /// FOLLOW(nonterminal), if the nonterminal belongs to the grammar.
    pub fn follow(&self, symbol: &Symbol) -> Option<&SymbolSet> {
        self.follow.get(symbol)
    }

    /// FIRST of a symbol sequence, accumulating `FIRST(Yᵢ) \ {ε}` while
    /// every prefix symbol is nullable. The empty sequence yields {ε}.
    pub fn first_of_sequence(&self, sequence: &[Symbol]) -> SymbolSet {
        first_of_sequence(&self.first, sequence)
    }
}

fn initial_first(grammar: &Grammar) -> HashMap<Symbol, SymbolSet> {
    let mut first: HashMap<Symbol, SymbolSet> = HashMap::new();
    for terminal in &grammar.terminals {
        first.insert(terminal.clone(), BTreeSet::from([terminal.clone()]));
    }
    for nonterminal in &grammar.nonterminals {
        first.insert(nonterminal.clone(), BTreeSet::new());
    }
    // FIRST(ε) = {ε}, whether or not the grammar declares ε.
    first.insert(Symbol::epsilon(), BTreeSet::from([Symbol::epsilon()]));
    first
}

/// One sweep of the FIRST fixpoint. Returns whether any set grew.
pub(crate) fn first_pass(grammar: &Grammar, first: &mut HashMap<Symbol, SymbolSet>) -> bool {
    let mut changed = false;
    for production in &grammar.productions {
        let rhs_first = first_of_sequence(first, &production.rhs);
        if let Some(lhs_first) = first.get_mut(&production.lhs) {
            let before = lhs_first.len();
            lhs_first.extend(rhs_first);
            changed |= lhs_first.len() > before;
        }
    }
    changed
}

fn first_of_sequence(first: &HashMap<Symbol, SymbolSet>, sequence: &[Symbol]) -> SymbolSet {
    let mut result = SymbolSet::new();
    if sequence.is_empty() {
        result.insert(Symbol::epsilon());
        return result;
    }

    let mut all_nullable = true;
    for symbol in sequence {
        match first.get(symbol) {
            Some(symbol_first) => {
                result.extend(symbol_first.iter().filter(|s| !s.is_epsilon()).cloned());
                if !symbol_first.contains(&Symbol::epsilon()) {
                    all_nullable = false;
                    break;
                }
            }
            None => {
                // A symbol outside the grammar, in practice the `$` appended
                // as an LR lookahead. It stands for itself.
                result.insert(symbol.clone());
                all_nullable = false;
                break;
            }
        }
    }

    if all_nullable {
        result.insert(Symbol::epsilon());
    }
    result
}

fn initial_follow(grammar: &Grammar) -> HashMap<Symbol, SymbolSet> {
    let mut follow: HashMap<Symbol, SymbolSet> = grammar
        .nonterminals
        .iter()
        .map(|nt| (nt.clone(), BTreeSet::new()))
        .collect();
    if let Some(start_follow) = follow.get_mut(&grammar.start) {
        start_follow.insert(Symbol::end());
    }
    follow
}

/// One sweep of the FOLLOW fixpoint. Returns whether any set grew.
pub(crate) fn follow_pass(
    grammar: &Grammar,
    first: &HashMap<Symbol, SymbolSet>,
    follow: &mut HashMap<Symbol, SymbolSet>,
) -> bool {
    let mut changed = false;
    for production in &grammar.productions {
        changed |= follow_production_pass(production, first, follow);
    }
    changed
}

fn follow_production_pass(
    production: &Production,
    first: &HashMap<Symbol, SymbolSet>,
    follow: &mut HashMap<Symbol, SymbolSet>,
) -> bool {
    let mut changed = false;
    for (i, symbol) in production.rhs.iter().enumerate() {
        if !symbol.is_nonterminal() {
            continue;
        }

        let beta = &production.rhs[i + 1..];
        let first_of_beta = first_of_sequence(first, beta);
        let beta_nullable = first_of_beta.contains(&Symbol::epsilon());

        // Clone FOLLOW(lhs) up front; symbol may be the lhs itself.
        let lhs_follow = if beta_nullable {
            follow.get(&production.lhs).cloned().unwrap_or_default()
        } else {
            SymbolSet::new()
        };

        if let Some(symbol_follow) = follow.get_mut(symbol) {
            let before = symbol_follow.len();
            symbol_follow.extend(first_of_beta.into_iter().filter(|s| !s.is_epsilon()));
            symbol_follow.extend(lhs_follow);
            changed |= symbol_follow.len() > before;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    fn t(name: &str) -> Symbol {
        Symbol::terminal(name)
    }

    fn nt(name: &str) -> Symbol {
        Symbol::nonterminal(name)
    }

    fn set(symbols: &[Symbol]) -> SymbolSet {
        symbols.iter().cloned().collect()
    }

    // The textbook expression grammar with explicit nullable tails:
    //   E  -> T E'        E' -> + T E' | ε
    //   T  -> F T'        T' -> * F T' | ε
    //   F  -> ( E ) | id
    fn expression_grammar() -> Grammar {
        let terminals = ["+", "*", "(", ")", "id"].map(t).into_iter().collect();
        let nonterminals = ["E", "E'", "T", "T'", "F"].map(nt).into_iter().collect();
        let productions = vec![
            Production::new(nt("E"), vec![nt("T"), nt("E'")]),
            Production::new(nt("E'"), vec![t("+"), nt("T"), nt("E'")]),
            Production::new(nt("E'"), vec![]),
            Production::new(nt("T"), vec![nt("F"), nt("T'")]),
            Production::new(nt("T'"), vec![t("*"), nt("F"), nt("T'")]),
            Production::new(nt("T'"), vec![]),
            Production::new(nt("F"), vec![t("("), nt("E"), t(")")]),
            Production::new(nt("F"), vec![t("id")]),
        ];
        let Ok(grammar) = Grammar::new(terminals, nonterminals, productions, nt("E")) else {
            panic!()
        };
        grammar
    }

    #[test]
    fn first_sets_of_the_expression_grammar() {
        let analysis = Analysis::of(&expression_grammar());

        assert_eq!(analysis.first(&nt("E")), Some(&set(&[t("("), t("id")])));
        assert_eq!(analysis.first(&nt("F")), Some(&set(&[t("("), t("id")])));
        assert_eq!(
            analysis.first(&nt("E'")),
            Some(&set(&[t("+"), Symbol::epsilon()]))
        );
        assert_eq!(
            analysis.first(&nt("T'")),
            Some(&set(&[t("*"), Symbol::epsilon()]))
        );
        assert_eq!(analysis.first(&t("+")), Some(&set(&[t("+")])));
    }

    #[test]
    fn follow_sets_of_the_expression_grammar() {
        let analysis = Analysis::of(&expression_grammar());

        assert_eq!(
            analysis.follow(&nt("E")),
            Some(&set(&[t(")"), Symbol::end()]))
        );
        assert_eq!(
            analysis.follow(&nt("E'")),
            Some(&set(&[t(")"), Symbol::end()]))
        );
        assert_eq!(
            analysis.follow(&nt("T")),
            Some(&set(&[t("+"), t(")"), Symbol::end()]))
        );
        assert_eq!(
            analysis.follow(&nt("F")),
            Some(&set(&[t("+"), t("*"), t(")"), Symbol::end()]))
        );
    }

    #[test]
    fn epsilon_never_leaks_into_follow() {
        let analysis = Analysis::of(&expression_grammar());
        for symbol in ["E", "E'", "T", "T'", "F"] {
            let follow = analysis.follow(&nt(symbol)).unwrap();
            assert!(!follow.contains(&Symbol::epsilon()), "FOLLOW({symbol})");
        }
    }

    #[test]
    fn sequence_first_handles_nullable_prefixes() {
        let analysis = Analysis::of(&expression_grammar());

        // E' is nullable, so FIRST(E' )) reaches the paren.
        let result = analysis.first_of_sequence(&[nt("E'"), t(")")]);
        assert_eq!(result, set(&[t("+"), t(")")]));

        // All-nullable sequences produce ε.
        let result = analysis.first_of_sequence(&[nt("E'"), nt("T'")]);
        assert_eq!(result, set(&[t("+"), t("*"), Symbol::epsilon()]));

        assert_eq!(
            analysis.first_of_sequence(&[]),
            set(&[Symbol::epsilon()])
        );
    }

    #[test]
    fn unknown_symbols_stand_for_themselves_in_sequences() {
        // The LR closure computes FIRST(β $); $ is not a grammar terminal.
        let analysis = Analysis::of(&expression_grammar());
        let result = analysis.first_of_sequence(&[nt("E'"), Symbol::end()]);
        assert_eq!(result, set(&[t("+"), Symbol::end()]));
    }

    #[test]
    fn computation_is_at_fixpoint() {
        // One extra sweep after convergence must not grow anything.
        let grammar = expression_grammar();
        let mut first = initial_first(&grammar);
        while first_pass(&grammar, &mut first) {}
        assert!(!first_pass(&grammar, &mut first));

        let mut follow = initial_follow(&grammar);
        while follow_pass(&grammar, &first, &mut follow) {}
        assert!(!follow_pass(&grammar, &first, &mut follow));
    }
}
