// Finite automaton models and the two construction algorithms: Thompson's
// construction (postfix pattern -> NFA) and subset construction
// (NFA -> DFA).
//
// State ids are plain integers behind a newtype, minted by an allocator
// that is threaded through a single construction. Subsets of NFA states
// are represented as bitsets during determinization so that equal subsets
// always compare and hash equal.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;

use bit_set::BitSet;

use crate::check::{self, StructuralError};
use crate::syntax::{self, SyntaxError};
use crate::Symbol;

/// Identifier of an automaton state, unique within the automaton that owns
/// it. A distinct type from [`Symbol`], so states and alphabet symbols
/// live in disjoint domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u32);

impl StateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> StateId {
        StateId(index as u32)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mints fresh state ids. One allocator is threaded through a single NFA
/// construction, so fragments combined there never share ids; independent
/// compilations each get their own allocator.
#[derive(Debug, Default)]
pub struct StateAllocator {
    next: u32,
}

impl StateAllocator {
    pub fn new() -> StateAllocator {
        StateAllocator::default()
    }

    pub fn fresh(&mut self) -> StateId {
        let id = StateId(self.next);
        self.next += 1;
        id
    }
}

/// Nondeterministic finite automaton with exactly one start and one accept
/// state. A `None` transition label is an epsilon move; epsilon is never a
/// member of the alphabet.
#[derive(Debug, Clone)]
pub struct Nfa {
    pub(crate) states: BTreeSet<StateId>,
    pub(crate) alphabet: BTreeSet<Symbol>,
    pub(crate) transitions: BTreeMap<(StateId, Option<Symbol>), BTreeSet<StateId>>,
    pub(crate) start: StateId,
    pub(crate) accept: StateId,
}

impl Nfa {
    fn new(start: StateId, accept: StateId) -> Nfa {
        let mut states = BTreeSet::new();
        states.insert(start);
        states.insert(accept);
        Nfa {
            states,
            alphabet: BTreeSet::new(),
            transitions: BTreeMap::new(),
            start,
            accept,
        }
    }

    pub fn states(&self) -> &BTreeSet<StateId> {
        &self.states
    }

    pub fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    pub fn transitions(&self) -> &BTreeMap<(StateId, Option<Symbol>), BTreeSet<StateId>> {
        &self.transitions
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn accept(&self) -> StateId {
        self.accept
    }

    fn add_transition(&mut self, from: StateId, label: Option<Symbol>, to: StateId) {
        self.states.insert(from);
        self.states.insert(to);
        if let Some(symbol) = label {
            self.alphabet.insert(symbol);
        }
        self.transitions.entry((from, label)).or_default().insert(to);
    }

    fn copy_transitions(&mut self, other: &Nfa) {
        for ((from, label), targets) in &other.transitions {
            for &to in targets {
                self.add_transition(*from, *label, to);
            }
        }
    }

    /// Compiles a pattern into an NFA: validation, normalization, postfix
    /// conversion, then Thompson's construction.
    pub fn from_regex(pattern: &str) -> Result<Nfa, SyntaxError> {
        syntax::validate(pattern)?;
        let normalized = syntax::normalize(pattern);
        let postfix = syntax::to_postfix(&normalized);
        Self::from_postfix(&postfix, &mut StateAllocator::new())
    }

    /// Evaluates a postfix pattern on a stack of partial automata. Fresh
    /// states come from `alloc`, so fragments merged here cannot collide.
    pub fn from_postfix(
        postfix: &[Symbol],
        alloc: &mut StateAllocator,
    ) -> Result<Nfa, SyntaxError> {
        let mut stack: Vec<Nfa> = Vec::new();

        for &token in postfix {
            match token {
                '.' => {
                    let right = stack.pop().ok_or(SyntaxError::Malformed)?;
                    let left = stack.pop().ok_or(SyntaxError::Malformed)?;
                    stack.push(Self::concatenate(left, right));
                }
                '|' => {
                    let right = stack.pop().ok_or(SyntaxError::Malformed)?;
                    let left = stack.pop().ok_or(SyntaxError::Malformed)?;
                    stack.push(Self::alternate(left, right, alloc));
                }
                '*' => {
                    let inner = stack.pop().ok_or(SyntaxError::Malformed)?;
                    stack.push(Self::kleene_star(inner, alloc));
                }
                symbol => {
                    let start = alloc.fresh();
                    let accept = alloc.fresh();
                    let mut fragment = Nfa::new(start, accept);
                    fragment.add_transition(start, Some(symbol), accept);
                    stack.push(fragment);
                }
            }
        }

        // exactly one fragment must remain; boundaries like ")(" leave two
        let result = stack.pop().ok_or(SyntaxError::Malformed)?;
        if !stack.is_empty() {
            return Err(SyntaxError::Malformed);
        }
        Ok(result)
    }

    // A fragment's start state never has incoming transitions, so the seam
    // between the two operands is collapsed by re-sourcing the right
    // fragment's start transitions from the left fragment's accept state.
    // The right start state is dropped with them; no epsilon hop needed.
    fn concatenate(left: Nfa, right: Nfa) -> Nfa {
        let mut result = Nfa::new(left.start, right.accept);
        result.copy_transitions(&left);
        for ((from, label), targets) in &right.transitions {
            let from = if *from == right.start { left.accept } else { *from };
            for &to in targets {
                result.add_transition(from, *label, to);
            }
        }
        result
    }

    fn alternate(left: Nfa, right: Nfa, alloc: &mut StateAllocator) -> Nfa {
        let start = alloc.fresh();
        let accept = alloc.fresh();
        let mut result = Nfa::new(start, accept);
        result.copy_transitions(&left);
        result.copy_transitions(&right);
        result.add_transition(start, None, left.start);
        result.add_transition(left.accept, None, accept);
        result.add_transition(start, None, right.start);
        result.add_transition(right.accept, None, accept);
        result
    }

    fn kleene_star(inner: Nfa, alloc: &mut StateAllocator) -> Nfa {
        let start = alloc.fresh();
        let accept = alloc.fresh();
        let mut result = Nfa::new(start, accept);
        result.copy_transitions(&inner);
        result.add_transition(start, None, inner.start);
        result.add_transition(inner.accept, None, accept);
        result.add_transition(start, None, accept); // zero repetitions
        result.add_transition(inner.accept, None, inner.start); // loop back
        result
    }

    // basic BFS over epsilon transitions only
    pub(crate) fn epsilon_closure(&self, set: &mut BitSet) {
        let mut queue: VecDeque<usize> = set.iter().collect();
        while let Some(index) = queue.pop_front() {
            let key = (StateId::from_index(index), None);
            if let Some(targets) = self.transitions.get(&key) {
                for &target in targets {
                    if set.insert(target.index()) {
                        queue.push_back(target.index());
                    }
                }
            }
        }
    }

    pub(crate) fn move_set(&self, set: &BitSet, symbol: Symbol) -> BitSet {
        let mut result = BitSet::new();
        for index in set.iter() {
            let key = (StateId::from_index(index), Some(symbol));
            if let Some(targets) = self.transitions.get(&key) {
                for &target in targets {
                    result.insert(target.index());
                }
            }
        }
        result
    }

    /// Direct simulation of the NFA: steps the set of active states
    /// through the word, closing over epsilon moves at every step. Slower
    /// than matching on the determinized automaton, but useful as a
    /// reference for it.
    pub fn simulate(&self, word: &str) -> bool {
        let mut current = BitSet::new();
        current.insert(self.start.index());
        self.epsilon_closure(&mut current);

        for symbol in word.chars() {
            let mut next = self.move_set(&current, symbol);
            if next.is_empty() {
                return false;
            }
            self.epsilon_closure(&mut next);
            current = next;
        }

        current.contains(self.accept.index())
    }

    /// Structural well-formedness check, see [`check::validate`].
    pub fn validate(&self) -> Result<(), StructuralError> {
        check::validate(self)
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "States:")?;
        for state in &self.states {
            writeln!(f, "  {state}")?;
        }
        writeln!(f, "Alphabet:")?;
        for symbol in &self.alphabet {
            writeln!(f, "  {symbol}")?;
        }
        writeln!(f, "Transitions:")?;
        for ((from, label), targets) in &self.transitions {
            let label = match label {
                Some(symbol) => symbol.to_string(),
                None => "ε".to_string(),
            };
            let targets: Vec<String> = targets.iter().map(|t| t.to_string()).collect();
            writeln!(f, "  {} --{}--> {}", from, label, targets.join(" "))?;
        }
        writeln!(f, "Initial state:\n  {}", self.start)?;
        write!(f, "Final state:\n  {}", self.accept)
    }
}

/// Deterministic finite automaton. The transition map is a partial
/// function: a missing entry is a dead end for the word being matched,
/// not an error.
#[derive(Debug, Clone)]
pub struct Dfa {
    pub(crate) states: BTreeSet<StateId>,
    pub(crate) alphabet: BTreeSet<Symbol>,
    pub(crate) transitions: BTreeMap<(StateId, Symbol), StateId>,
    pub(crate) start: StateId,
    pub(crate) accepting: BTreeSet<StateId>,
}

impl Dfa {
    pub fn states(&self) -> &BTreeSet<StateId> {
        &self.states
    }

    pub fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    pub fn transitions(&self) -> &BTreeMap<(StateId, Symbol), StateId> {
        &self.transitions
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn accepting(&self) -> &BTreeSet<StateId> {
        &self.accepting
    }

    /// Subset construction. Every reachable epsilon-closed set of NFA
    /// states becomes one DFA state; closures are compared by full
    /// membership equality, so the subset-to-state mapping is a bijection.
    /// The worklist terminates because each subset is enqueued at most
    /// once and there are finitely many of them.
    pub fn from_nfa(nfa: &Nfa) -> Dfa {
        let mut alloc = StateAllocator::new();

        let mut start_closure = BitSet::new();
        start_closure.insert(nfa.start.index());
        nfa.epsilon_closure(&mut start_closure);

        let start = alloc.fresh();
        let mut subsets: HashMap<BitSet, StateId> = HashMap::new();
        subsets.insert(start_closure.clone(), start);

        let mut states = BTreeSet::new();
        states.insert(start);
        let mut accepting = BTreeSet::new();
        if start_closure.contains(nfa.accept.index()) {
            accepting.insert(start);
        }

        let mut transitions: BTreeMap<(StateId, Symbol), StateId> = BTreeMap::new();
        let mut work_queue: VecDeque<BitSet> = VecDeque::new();
        work_queue.push_back(start_closure);

        while let Some(current) = work_queue.pop_front() {
            let current_id = subsets[&current];
            for &symbol in &nfa.alphabet {
                let mut next = nfa.move_set(&current, symbol);
                if next.is_empty() {
                    continue; // partial function, no transition recorded
                }
                nfa.epsilon_closure(&mut next);

                let next_id = match subsets.get(&next) {
                    Some(&id) => id,
                    None => {
                        let id = alloc.fresh();
                        subsets.insert(next.clone(), id);
                        states.insert(id);
                        if next.contains(nfa.accept.index()) {
                            accepting.insert(id);
                        }
                        work_queue.push_back(next);
                        id
                    }
                };
                transitions.insert((current_id, symbol), next_id);
            }
        }

        Dfa {
            states,
            alphabet: nfa.alphabet.clone(),
            transitions,
            start,
            accepting,
        }
    }

    /// Runs a word through the automaton. A symbol with no outgoing
    /// transition rejects immediately; the empty word is accepted iff the
    /// start state is accepting.
    pub fn simulate(&self, word: &str) -> bool {
        let mut current = self.start;
        for symbol in word.chars() {
            match self.transitions.get(&(current, symbol)) {
                Some(&next) => current = next,
                None => return false,
            }
        }
        self.accepting.contains(&current)
    }

    /// Structural well-formedness check, see [`check::validate`].
    pub fn validate(&self) -> Result<(), StructuralError> {
        check::validate(self)
    }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "States:")?;
        for state in &self.states {
            writeln!(f, "  {state}")?;
        }
        writeln!(f, "Alphabet:")?;
        for symbol in &self.alphabet {
            writeln!(f, "  {symbol}")?;
        }
        writeln!(f, "Transitions:")?;
        for ((from, symbol), to) in &self.transitions {
            writeln!(f, "  {} --{}--> {}", from, symbol, to)?;
        }
        writeln!(f, "Initial state:\n  {}", self.start)?;
        write!(f, "Final states:")?;
        for state in &self.accepting {
            write!(f, "\n  {state}")?;
        }
        Ok(())
    }
}
