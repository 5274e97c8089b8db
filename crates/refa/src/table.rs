// Dense row-major encoding of a DFA for serialization and fast lookups.
//
// states = rows, plus one trailing error row whose entries all point back
// to itself; symbols = columns, in `symbols` order. Transitions missing
// from the DFA's partial map point at the error row.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_binary::binary_stream::Endian;

use crate::fa::Dfa;
use crate::CompileError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfaTable {
    data: Vec<u32>,
    accepting: Vec<bool>,
    states: u32,
    inputs: u32,
    symbols: String,
    initial_state: u32,
}

impl DfaTable {
    /// Compiles a pattern straight to a table.
    pub fn from_pattern(pattern: &str) -> Result<DfaTable, CompileError> {
        let dfa = crate::compile(pattern)?;
        Ok(DfaTable::from_dfa(&dfa))
    }

    pub fn from_dfa(dfa: &Dfa) -> DfaTable {
        let rows: HashMap<_, _> = dfa
            .states()
            .iter()
            .enumerate()
            .map(|(row, &state)| (state, row as u32))
            .collect();
        let columns: HashMap<_, _> = dfa
            .alphabet()
            .iter()
            .enumerate()
            .map(|(column, &symbol)| (symbol, column))
            .collect();

        let num_states = dfa.states().len() + 1;
        let num_inputs = dfa.alphabet().len();
        let error_row = (num_states - 1) as u32;

        let mut data = vec![error_row; num_states * num_inputs];
        for ((from, symbol), to) in dfa.transitions() {
            let row = rows[from] as usize;
            data[row * num_inputs + columns[symbol]] = rows[to];
        }

        let mut accepting = vec![false; num_states];
        for state in dfa.accepting() {
            accepting[rows[state] as usize] = true;
        }

        DfaTable {
            data,
            accepting,
            states: num_states as u32,
            inputs: num_inputs as u32,
            symbols: dfa.alphabet().iter().collect(),
            initial_state: rows[&dfa.start()],
        }
    }

    fn next_state(&self, state: u32, column: usize) -> u32 {
        self.data[state as usize * self.inputs as usize + column]
    }

    /// Table-driven counterpart of [`Dfa::simulate`]; agrees with it on
    /// every word.
    pub fn matches(&self, word: &str) -> bool {
        let error_state = self.states - 1;
        let mut state = self.initial_state;
        for symbol in word.chars() {
            let Some(column) = self.symbols.chars().position(|c| c == symbol) else {
                return false;
            };
            state = self.next_state(state, column);
            if state == error_state {
                return false;
            }
        }
        self.accepting[state as usize]
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_binary::Error> {
        serde_binary::to_vec(self, Endian::Little)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<DfaTable, serde_binary::Error> {
        serde_binary::from_slice(bytes, Endian::Little)
    }
}
