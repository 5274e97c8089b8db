//! Regular expression to finite automaton compilation.
//!
//! The pipeline: a pattern is validated, normalized with explicit
//! concatenation markers, converted to postfix form, evaluated into an
//! NFA by Thompson's construction, and determinized by subset
//! construction. Matching is then a deterministic walk over the DFA.
//!
//! Supported syntax: ASCII alphanumeric operands, alternation `|`,
//! Kleene star `*`, grouping parentheses, and `.` as the (normally
//! implicit) concatenation operator.

pub mod check;
mod fa;
mod syntax;
mod table;

#[cfg(test)]
mod fa_tests;

use thiserror::Error;

pub use check::{Automaton, StructuralError};
pub use fa::{Dfa, Nfa, StateAllocator, StateId};
pub use syntax::{normalize, to_postfix, SyntaxError};
pub use table::DfaTable;

/// A single alphabet character.
pub type Symbol = char;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Structure(#[from] StructuralError),
}

/// Checks a pattern's syntax without building any automaton.
pub fn validate_syntax(pattern: &str) -> Result<(), SyntaxError> {
    syntax::validate(pattern)
}

/// Full pipeline: pattern to NFA to DFA, with a structural check on the
/// result before it is handed to callers.
pub fn compile(pattern: &str) -> Result<Dfa, CompileError> {
    let nfa = Nfa::from_regex(pattern)?;
    let dfa = Dfa::from_nfa(&nfa);
    dfa.validate()?;
    Ok(dfa)
}
