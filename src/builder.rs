//! Incremental construction of automata whose size is not known in advance.
//!
//! Every combining algorithm follows the same pattern with a
//! [`KeyedBuilder`]:
//!
//! 1. Describe each state of the result by a byte key (a packed subset, a
//!    tuple of operand states, ...).
//! 2. Insert the failure key first so it gets id 0, then the initial keys.
//! 3. Walk the ids from 1 upwards. For each id, decode its key, compute the
//!    successor key under every symbol, look each one up with
//!    [`find_state`](KeyedBuilder::find_state) and store the row.
//!
//! The walk ends when the id catches up with the number of keys, at which
//! point the builder is turned into a finished [`Automaton`].

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::automaton::{Automaton, StorageFormat};
use crate::error::{FsaError, Result};
use crate::symbols::{Alphabet, Symbol};
use crate::StateId;

/// A hash-indexed state table that assigns each distinct key one state id.
#[derive(Debug)]
pub struct KeyedBuilder {
    fsa: Automaton,
    index: FxHashMap<Rc<[u8]>, StateId>,
    keys: Vec<Option<Rc<[u8]>>>,
    definitions: Option<Vec<Option<(StateId, Symbol)>>>,
    redirects: FxHashMap<StateId, StateId>,
    limit: usize,
}

impl KeyedBuilder {
    /// A builder for an automaton with `nr_symbols` transitions per state
    /// that may create at most `limit` states.
    pub fn new(alphabet: Alphabet, nr_symbols: usize, limit: usize) -> Self {
        let mut fsa = Automaton::new(alphabet, nr_symbols, 1, StorageFormat::Sparse);
        fsa.initial_mut().clear();
        KeyedBuilder {
            fsa,
            index: FxHashMap::default(),
            keys: Vec::new(),
            definitions: None,
            redirects: FxHashMap::default(),
            limit,
        }
    }

    /// Record for every state the transition that first reached it.
    pub fn with_definitions(mut self) -> Self {
        self.definitions = Some(Vec::new());
        self
    }

    /// Number of ids handed out, including 0.
    pub fn state_count(&self) -> usize {
        self.keys.len()
    }

    /// The id for `key`, allocating the next id if the key is new.
    pub fn find_state(&mut self, key: &[u8]) -> Result<StateId> {
        if let Some(&id) = self.index.get(key) {
            return Ok(id);
        }
        let id = self.keys.len();
        if id >= self.limit {
            log::warn!("state limit of {} reached", self.limit);
            return Err(FsaError::StateLimitExceeded { limit: self.limit });
        }
        let key: Rc<[u8]> = Rc::from(key);
        self.index.insert(key.clone(), id as StateId);
        self.keys.push(Some(key));
        if id > 0 {
            self.fsa.grow(id + 1);
        }
        if let Some(defs) = &mut self.definitions {
            defs.push(None);
        }
        Ok(id as StateId)
    }

    /// The id already assigned to `key`, if any.
    pub fn lookup(&self, key: &[u8]) -> Option<StateId> {
        self.index.get(key).copied()
    }

    /// The key a state was created from. `None` after
    /// [`remove_keys`](KeyedBuilder::remove_keys), or for removed and
    /// redirected states.
    pub fn state_key(&self, state: StateId) -> Option<&[u8]> {
        self.keys.get(state as usize)?.as_deref()
    }

    /// Store the row of `state`. Targets that were redirected are replaced
    /// by their new state.
    pub fn set_transitions(&mut self, state: StateId, row: &[StateId]) -> Result<()> {
        if let Some(defs) = &mut self.definitions {
            for (symbol, &target) in row.iter().enumerate() {
                let t = target as usize;
                if t > 0 && t < defs.len() && defs[t].is_none() && !self.fsa.is_initial(target) {
                    defs[t] = Some((state, symbol));
                }
            }
        }
        if self.redirects.is_empty() {
            self.fsa.set_transitions(state, row)
        } else {
            let mapped: Vec<StateId> = row.iter().map(|&t| self.resolve(t)).collect();
            self.fsa.set_transitions(state, &mapped)
        }
    }

    fn resolve(&self, state: StateId) -> StateId {
        self.redirects.get(&state).copied().unwrap_or(state)
    }

    /// Forget every key. Rows, labels and sets are kept.
    pub fn remove_keys(&mut self) {
        self.index = FxHashMap::default();
        for key in &mut self.keys {
            *key = None;
        }
    }

    /// Declare that `old` is the same state as `new`.
    ///
    /// The key of `old` now finds `new`, and transitions into `old` are
    /// rewritten when the automaton is finished. If `new` was itself
    /// redirected, `old` follows it to its final state, so redirects never
    /// form chains or cycles.
    pub fn redirect_state(&mut self, old: StateId, new: StateId) -> Result<()> {
        let count = self.keys.len();
        if old == 0 || old as usize >= count || new as usize >= count {
            return Err(FsaError::InvalidState { state: old, count });
        }
        let target = self.resolve(new);
        if target == old || self.redirects.contains_key(&old) {
            return Err(FsaError::InvalidState { state: old, count });
        }
        if let Some(key) = self.keys[old as usize].take() {
            self.index.insert(key, target);
        }
        for id in self.index.values_mut().chain(self.redirects.values_mut()) {
            if *id == old {
                *id = target;
            }
        }
        let empty = vec![0; self.fsa.alphabet_size()];
        self.fsa.set_transitions(old, &empty)?;
        self.fsa.accepting_mut().exclude(old);
        self.redirects.insert(old, target);
        Ok(())
    }

    /// Remove a provisional state that nothing leads to.
    ///
    /// If it is the most recent state the id is reused; otherwise it is left
    /// as an unreachable empty state.
    pub fn remove_state(&mut self, state: StateId) -> Result<()> {
        let s = state as usize;
        if s == 0 || s >= self.keys.len() {
            return Err(FsaError::InvalidState {
                state,
                count: self.keys.len(),
            });
        }
        if let Some(key) = self.keys[s].take() {
            self.index.remove(&key);
        }
        if s + 1 == self.keys.len() {
            self.keys.pop();
            if let Some(defs) = &mut self.definitions {
                defs.truncate(s);
            }
            self.fsa.truncate(s);
        } else {
            let empty = vec![0; self.fsa.alphabet_size()];
            self.fsa.set_transitions(state, &empty)?;
            self.fsa.accepting_mut().exclude(state);
        }
        Ok(())
    }

    /// The transition that first reached `state`.
    pub fn definition(&self, state: StateId) -> Option<(StateId, Symbol)> {
        self.definitions.as_ref()?.get(state as usize).copied().flatten()
    }

    /// A shortest word leading from an initial state to `state`, if
    /// definitions are being recorded.
    pub fn defining_word(&self, state: StateId) -> Option<Vec<Symbol>> {
        self.definitions.as_ref()?;
        let mut word = Vec::new();
        let mut s = state;
        while let Some((from, symbol)) = self.definition(s) {
            word.push(symbol);
            s = from;
            if word.len() > self.keys.len() {
                return None;
            }
        }
        if !self.fsa.is_initial(s) {
            return None;
        }
        word.reverse();
        Some(word)
    }

    /// The automaton under construction.
    pub fn automaton(&self) -> &Automaton {
        &self.fsa
    }

    /// Mutable access to the automaton under construction, for setting
    /// initial and accepting states, labels and flags.
    pub fn automaton_mut(&mut self) -> &mut Automaton {
        &mut self.fsa
    }

    /// Finish construction. The transition rows move into the result.
    pub fn into_automaton(mut self, format: StorageFormat, cell_limit: usize) -> Result<Automaton> {
        if !self.redirects.is_empty() {
            let mut row = vec![0; self.fsa.alphabet_size()];
            for s in 1..self.fsa.state_count() as StateId {
                self.fsa.row(s, &mut row);
                if row.iter().any(|t| self.redirects.contains_key(t)) {
                    for t in row.iter_mut() {
                        *t = self.resolve(*t);
                    }
                    self.fsa.set_transitions(s, &row)?;
                }
            }
        }
        let mut fsa = self.fsa;
        fsa.set_storage(format, cell_limit);
        fsa.tidy();
        Ok(fsa)
    }
}
