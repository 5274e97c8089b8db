//! Structural well-formedness checks shared by both automaton kinds.
//!
//! State ids and alphabet symbols are distinct types, so the two domains
//! can never overlap; what remains to check at runtime is set membership
//! of every declared start, accepting, and transition endpoint.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::fa::{Dfa, Nfa, StateId};
use crate::Symbol;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StructuralError {
    #[error("states set is empty")]
    EmptyStates,
    #[error("alphabet set is empty")]
    EmptyAlphabet,
    #[error("initial state {0} does not exist in the states set")]
    UnknownStartState(StateId),
    #[error("there is no transition that starts in the initial state")]
    NoStartTransition,
    #[error("transition source state {0} does not exist in the states set")]
    UnknownSourceState(StateId),
    #[error("transition symbol '{0}' does not exist in the alphabet")]
    UnknownSymbol(Symbol),
    #[error("transition target state {0} does not exist in the states set")]
    UnknownTargetState(StateId),
    #[error("final state {0} does not exist in the states set")]
    UnknownAcceptingState(StateId),
}

/// Read-only structural view of an automaton. Epsilon edges carry a
/// `None` label; deterministic automata never produce one.
pub trait Automaton {
    fn state_set(&self) -> &BTreeSet<StateId>;
    fn symbol_set(&self) -> &BTreeSet<Symbol>;
    fn start_state(&self) -> StateId;
    fn accepting_states(&self) -> Vec<StateId>;
    fn edges(&self) -> Vec<(StateId, Option<Symbol>, StateId)>;
}

impl Automaton for Nfa {
    fn state_set(&self) -> &BTreeSet<StateId> {
        self.states()
    }

    fn symbol_set(&self) -> &BTreeSet<Symbol> {
        self.alphabet()
    }

    fn start_state(&self) -> StateId {
        self.start()
    }

    fn accepting_states(&self) -> Vec<StateId> {
        vec![self.accept()]
    }

    fn edges(&self) -> Vec<(StateId, Option<Symbol>, StateId)> {
        self.transitions()
            .iter()
            .flat_map(|((from, label), targets)| {
                targets.iter().map(move |&to| (*from, *label, to))
            })
            .collect()
    }
}

impl Automaton for Dfa {
    fn state_set(&self) -> &BTreeSet<StateId> {
        self.states()
    }

    fn symbol_set(&self) -> &BTreeSet<Symbol> {
        self.alphabet()
    }

    fn start_state(&self) -> StateId {
        self.start()
    }

    fn accepting_states(&self) -> Vec<StateId> {
        self.accepting().iter().copied().collect()
    }

    fn edges(&self) -> Vec<(StateId, Option<Symbol>, StateId)> {
        self.transitions()
            .iter()
            .map(|((from, symbol), to)| (*from, Some(*symbol), *to))
            .collect()
    }
}

/// Checks an automaton's structure, reporting the first violation found.
/// A structurally invalid automaton must not be printed or matched
/// against.
pub fn validate<A: Automaton>(automaton: &A) -> Result<(), StructuralError> {
    let states = automaton.state_set();
    let alphabet = automaton.symbol_set();

    if states.is_empty() {
        return Err(StructuralError::EmptyStates);
    }
    if alphabet.is_empty() {
        return Err(StructuralError::EmptyAlphabet);
    }

    let start = automaton.start_state();
    if !states.contains(&start) {
        return Err(StructuralError::UnknownStartState(start));
    }

    let edges = automaton.edges();
    if !edges.iter().any(|(from, _, _)| *from == start) {
        return Err(StructuralError::NoStartTransition);
    }

    for (from, label, to) in &edges {
        if !states.contains(from) {
            return Err(StructuralError::UnknownSourceState(*from));
        }
        if let Some(symbol) = label {
            if !alphabet.contains(symbol) {
                return Err(StructuralError::UnknownSymbol(*symbol));
            }
        }
        if !states.contains(to) {
            return Err(StructuralError::UnknownTargetState(*to));
        }
    }

    for state in automaton.accepting_states() {
        if !states.contains(&state) {
            return Err(StructuralError::UnknownAcceptingState(state));
        }
    }

    Ok(())
}
