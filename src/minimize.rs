// src/minimize.rs
/*!
DFA minimization by table filling.

Pairs of states are marked distinguishable until fixpoint, unmarked pairs
are unioned into equivalence classes, and the minimized DFA is rebuilt with
one state per class. The pass is optional in the lexing pipeline but must
not change the language or any token decision, so the initial marking also
separates accepting states that carry different token tags. Without that
clause two states recognizing different tokens could collapse into one.
!*/

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::dfa::{Alphabet, Dfa, DfaState};

/// A state pair in canonical order, smaller id first.
fn pair(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Minimize `dfa` over `alphabet`.
pub fn minimize(dfa: &Dfa, alphabet: &Alphabet) -> Dfa {
    // Only reachable states take part; anything else is dead weight left
    // over from however the input was built.
    let reachable = reachable_states(dfa);

    // Mark the trivially distinguishable pairs: one accepts and the other
    // does not, or both accept but for different tokens.
    let mut marked: HashSet<(usize, usize)> = HashSet::new();
    for (i, &p) in reachable.iter().enumerate() {
        for &q in &reachable[i + 1..] {
            let sp = dfa.state(p);
            let sq = dfa.state(q);
            let distinguishable =
                sp.accepting != sq.accepting || (sp.accepting && sp.token != sq.token);
            if distinguishable {
                marked.insert(pair(p, q));
            }
        }
    }

    // Propagate: a pair splits if some character leads out of exactly one of
    // the two, or leads both into an already split pair.
    let mut changed = true;
    while changed {
        changed = false;
        for (i, &p) in reachable.iter().enumerate() {
            for &q in &reachable[i + 1..] {
                if marked.contains(&pair(p, q)) {
                    continue;
                }
                for &c in alphabet {
                    let next_p = dfa.state(p).transition(c);
                    let next_q = dfa.state(q).transition(c);
                    let split = match (next_p, next_q) {
                        (Some(np), Some(nq)) => np != nq && marked.contains(&pair(np, nq)),
                        (None, None) => false,
                        _ => true,
                    };
                    if split {
                        marked.insert(pair(p, q));
                        changed = true;
                        break;
                    }
                }
            }
        }
    }

    // Union the unmarked pairs into equivalence classes.
    let mut parent: HashMap<usize, usize> = reachable.iter().map(|&s| (s, s)).collect();
    for (i, &p) in reachable.iter().enumerate() {
        for &q in &reachable[i + 1..] {
            if !marked.contains(&pair(p, q)) {
                union(&mut parent, p, q);
            }
        }
    }

    // Number the classes by their smallest member so the rebuilt automaton
    // comes out the same way every run.
    let mut class_members: HashMap<usize, Vec<usize>> = HashMap::new();
    for &s in &reachable {
        class_members.entry(find(&mut parent, s)).or_default().push(s);
    }
    let mut classes: Vec<Vec<usize>> = class_members.into_values().collect();
    for members in &mut classes {
        members.sort_unstable();
    }
    classes.sort_by_key(|members| members[0]);

    let mut class_of: HashMap<usize, usize> = HashMap::new();
    for (class_id, members) in classes.iter().enumerate() {
        for &member in members {
            class_of.insert(member, class_id);
        }
    }

    // Rebuild one state per class. Transition targets agree across members
    // by construction, so any member serves as the representative.
    let mut states: Vec<DfaState> = Vec::with_capacity(classes.len());
    for (class_id, members) in classes.iter().enumerate() {
        let mut nfa_states: Vec<usize> = members
            .iter()
            .flat_map(|&m| dfa.state(m).nfa_states.iter().copied())
            .collect();
        nfa_states.sort_unstable();
        nfa_states.dedup();

        let accepting = members.iter().any(|&m| dfa.state(m).accepting);
        let token = members
            .iter()
            .filter_map(|&m| dfa.state(m).token.as_ref())
            .min()
            .cloned();

        let mut transitions = HashMap::new();
        for &c in alphabet {
            let target = members.iter().find_map(|&m| dfa.state(m).transition(c));
            if let Some(target) = target {
                transitions.insert(c, class_of[&target]);
            }
        }

        states.push(DfaState {
            id: class_id,
            nfa_states,
            transitions,
            accepting,
            token,
        });
    }

    debug!(
        before = reachable.len(),
        after = states.len(),
        "minimization finished"
    );

    Dfa {
        start: class_of[&dfa.start],
        states,
    }
}

fn reachable_states(dfa: &Dfa) -> Vec<usize> {
    let mut visited: HashSet<usize> = HashSet::from([dfa.start]);
    let mut order: Vec<usize> = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::from([dfa.start]);

    while let Some(current) = queue.pop_front() {
        order.push(current);
        let mut targets: Vec<usize> = dfa.state(current).transitions.values().copied().collect();
        targets.sort_unstable();
        for target in targets {
            if visited.insert(target) {
                queue.push_back(target);
            }
        }
    }

    order
}

fn find(parent: &mut HashMap<usize, usize>, state: usize) -> usize {
    let p = parent[&state];
    if p == state {
        return state;
    }
    let root = find(parent, p);
    parent.insert(state, root);
    root
}

fn union(parent: &mut HashMap<usize, usize>, a: usize, b: usize) {
    let root_a = find(parent, a);
    let root_b = find(parent, b);
    if root_a != root_b {
        parent.insert(root_a, root_b);
    }
}
