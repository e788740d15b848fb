//! The automaton store.
//!
//! An [`Automaton`] owns its transition table, its initial and accepting
//! state sets, an optional label table and its [`Flags`]. States are numbered
//! densely from 1; state 0 is the failure state, whose row is never stored and
//! always reads as all zeros.
//!
//! Transitions are kept either as one flat array ([`StorageFormat::Dense`]) or
//! as one compressed byte string per row ([`StorageFormat::Sparse`]), see
//! [`crate::codec`]. The choice is made at construction and only changes when
//! explicitly requested.
//!
//! # Example
//!
//! ```rust
//! use fsakit::prelude::*;
//!
//! // Words over {a, b} that end in "a"
//! let mut fsa = Automaton::new(Alphabet::new(2), 2, 3, StorageFormat::Dense);
//! fsa.set_transitions(1, &[2, 1]).unwrap();
//! fsa.set_transitions(2, &[2, 1]).unwrap();
//! fsa.accepting_mut().include(2);
//!
//! assert!(fsa.accepts(&[1, 0]));
//! assert!(!fsa.accepts(&[0, 1]));
//! ```

pub mod flags;
pub mod labels;

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};

use crate::codec::TransitionCodec;
use crate::error::{FsaError, Result};
use crate::subset::StateSubset;
use crate::symbols::{Alphabet, Symbol, SymbolSpace};
use crate::{StateId, REWRITE_BASE};

pub use flags::Flags;
pub use labels::{LabelData, LabelId, LabelMerger, LabelType, Labels, Word};

/// Number of table cells below which [`StorageFormat::Default`] picks dense storage.
pub const DEFAULT_DENSE_CELL_LIMIT: usize = 1 << 20;

/// How transition rows are stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum StorageFormat {
    /// Dense for small tables, compressed for large ones
    #[default]
    Default,
    /// One flat array of state ids
    Dense,
    /// One compressed byte string per row
    Sparse,
}

impl StorageFormat {
    /// Whether a table of `states` x `symbols` should be dense.
    pub fn is_dense(self, states: usize, symbols: usize, cell_limit: usize) -> bool {
        match self {
            StorageFormat::Dense => true,
            StorageFormat::Sparse => false,
            StorageFormat::Default => states.saturating_mul(symbols) < cell_limit,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
enum Storage {
    /// Rows of states `1..state_count`, back to back
    Dense(Vec<StateId>),
    /// Row `i` holds the encoding for state `i + 1`
    Compressed {
        rows: Vec<Box<[u8]>>,
        codec: TransitionCodec,
    },
}

/// A finite state automaton.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Automaton {
    alphabet: Alphabet,
    nr_symbols: usize,
    state_count: usize,
    storage: Storage,
    initial: StateSubset,
    accepting: StateSubset,
    labels: Option<Labels>,
    flags: Flags,
}

impl Automaton {
    /// Create an automaton with `state_count` states (including the failure
    /// state) whose transitions all fail.
    ///
    /// The initial set is `{1}` when there is a state 1, and nothing accepts.
    pub fn new(
        alphabet: Alphabet,
        nr_symbols: usize,
        state_count: usize,
        format: StorageFormat,
    ) -> Self {
        let state_count = state_count.max(1);
        let dense = format.is_dense(state_count, nr_symbols, DEFAULT_DENSE_CELL_LIMIT);
        let storage = if dense {
            Storage::Dense(vec![0; (state_count - 1) * nr_symbols])
        } else {
            Storage::Compressed {
                rows: vec![Box::default(); state_count - 1],
                codec: TransitionCodec::new(nr_symbols),
            }
        };
        let initial = if state_count > 1 {
            StateSubset::singleton(state_count, 1)
        } else {
            StateSubset::empty(state_count)
        };
        Automaton {
            alphabet,
            nr_symbols,
            state_count,
            storage,
            initial,
            accepting: StateSubset::empty(state_count),
            labels: None,
            flags: Flags::DFA | if dense { Flags::DENSE } else { Flags::SPARSE },
        }
    }

    /// An automaton over the letters of `alphabet`.
    pub fn base(alphabet: Alphabet, state_count: usize, format: StorageFormat) -> Self {
        let n = alphabet.letter_count();
        Self::new(alphabet, n, state_count, format)
    }

    /// An automaton over the padded pairs of `alphabet`.
    pub fn product(alphabet: Alphabet, state_count: usize, format: StorageFormat) -> Self {
        let n = alphabet.product_alphabet_size();
        Self::new(alphabet, n, state_count, format)
    }

    /// The alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Number of transitions per state.
    pub fn alphabet_size(&self) -> usize {
        self.nr_symbols
    }

    /// Number of states including the failure state.
    pub fn state_count(&self) -> usize {
        self.state_count
    }

    /// True if the automaton reads pairs of letters.
    pub fn is_product(&self) -> bool {
        self.nr_symbols == self.alphabet.product_alphabet_size()
            && self.nr_symbols != self.alphabet.letter_count()
    }

    /// True if the automaton reads plain letters.
    pub fn is_base(&self) -> bool {
        self.nr_symbols == self.alphabet.letter_count()
    }

    /// True if transitions are stored as a flat array.
    pub fn is_dense(&self) -> bool {
        matches!(self.storage, Storage::Dense(_))
    }

    /// The flags.
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Replace the flags. The storage flags always describe the actual storage.
    pub fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
        self.sync_storage_flags();
    }

    /// Set or clear some flags.
    pub fn change_flags(&mut self, set: Flags, clear: Flags) {
        self.flags.remove(clear);
        self.flags.insert(set);
        self.sync_storage_flags();
    }

    fn sync_storage_flags(&mut self) {
        let dense = self.is_dense();
        self.flags.set(Flags::DENSE, dense);
        self.flags.set(Flags::SPARSE, !dense);
    }

    /// True for ids of real states (not failure, not a rewrite marker).
    pub fn is_valid_state(&self, state: StateId) -> bool {
        state != 0 && (state as usize) < self.state_count
    }

    /// True for rewrite markers in automata with the `RWS` flag.
    pub fn is_rewrite(&self, target: StateId) -> bool {
        target >= REWRITE_BASE
    }

    fn check_state(&self, state: StateId) -> Result<()> {
        if self.is_valid_state(state) {
            Ok(())
        } else {
            Err(FsaError::InvalidState {
                state,
                count: self.state_count,
            })
        }
    }

    // ---- transitions ----

    /// The target of `state` under `symbol`.
    pub fn new_state(&self, state: StateId, symbol: Symbol) -> StateId {
        if !self.is_valid_state(state) || symbol >= self.nr_symbols {
            return 0;
        }
        let i = state as usize - 1;
        match &self.storage {
            Storage::Dense(cells) => cells[i * self.nr_symbols + symbol],
            Storage::Compressed { rows, codec } => codec.new_state(&rows[i], symbol),
        }
    }

    /// Decode the row of `state` into `out`. Invalid states read as all zeros.
    pub fn row(&self, state: StateId, out: &mut [StateId]) {
        if !self.is_valid_state(state) {
            out.fill(0);
            return;
        }
        let i = state as usize - 1;
        match &self.storage {
            Storage::Dense(cells) => {
                out.copy_from_slice(&cells[i * self.nr_symbols..(i + 1) * self.nr_symbols])
            }
            Storage::Compressed { rows, codec } => codec.decompress(&rows[i], out),
        }
    }

    /// The row of `state` as a new vector.
    pub fn row_vec(&self, state: StateId) -> Vec<StateId> {
        let mut out = vec![0; self.nr_symbols];
        self.row(state, &mut out);
        out
    }

    /// Store the row of `state`.
    pub fn set_transitions(&mut self, state: StateId, row: &[StateId]) -> Result<()> {
        self.check_state(state)?;
        if row.len() != self.nr_symbols {
            return Err(FsaError::internal(
                "set_transitions",
                state,
                format!("row has {} entries, expected {}", row.len(), self.nr_symbols),
            ));
        }
        self.store_row(state, row);
        Ok(())
    }

    fn store_row(&mut self, state: StateId, row: &[StateId]) {
        let i = state as usize - 1;
        let n = self.nr_symbols;
        match &mut self.storage {
            Storage::Dense(cells) => cells[i * n..(i + 1) * n].copy_from_slice(row),
            Storage::Compressed { rows, codec } => rows[i] = codec.compress(row).into(),
        }
    }

    /// Edit the row of `state` in place. The edit is stored when the guard drops.
    pub fn row_mut(&mut self, state: StateId) -> Result<RowGuard<'_>> {
        self.check_state(state)?;
        let row = self.row_vec(state);
        Ok(RowGuard {
            fsa: self,
            state,
            row,
        })
    }

    /// Bytes used by the transition table.
    pub fn table_size(&self) -> usize {
        match &self.storage {
            Storage::Dense(cells) => cells.len() * std::mem::size_of::<StateId>(),
            Storage::Compressed { rows, .. } => rows.iter().map(|r| r.len()).sum(),
        }
    }

    /// Switch between dense and compressed storage.
    pub fn set_storage(&mut self, format: StorageFormat, cell_limit: usize) {
        let dense = format.is_dense(self.state_count, self.nr_symbols, cell_limit);
        if dense == self.is_dense() {
            return;
        }
        let mut scratch = vec![0; self.nr_symbols];
        let storage = if dense {
            let mut cells = Vec::with_capacity((self.state_count - 1) * self.nr_symbols);
            for s in 1..self.state_count {
                self.row(s as StateId, &mut scratch);
                cells.extend_from_slice(&scratch);
            }
            Storage::Dense(cells)
        } else {
            let mut codec = TransitionCodec::new(self.nr_symbols);
            let mut rows = Vec::with_capacity(self.state_count - 1);
            for s in 1..self.state_count {
                self.row(s as StateId, &mut scratch);
                rows.push(Box::<[u8]>::from(codec.compress(&scratch)));
            }
            Storage::Compressed { rows, codec }
        };
        self.storage = storage;
        self.sync_storage_flags();
    }

    /// Add failing states until there are `state_count` states.
    pub(crate) fn grow(&mut self, state_count: usize) {
        if state_count <= self.state_count {
            return;
        }
        match &mut self.storage {
            Storage::Dense(cells) => cells.resize((state_count - 1) * self.nr_symbols, 0),
            Storage::Compressed { rows, .. } => rows.resize(state_count - 1, Box::default()),
        }
        self.state_count = state_count;
        self.initial.set_universe(state_count);
        self.accepting.set_universe(state_count);
        if let Some(labels) = &mut self.labels {
            labels.set_state_count(state_count);
        }
    }

    /// Drop trailing states so that `state_count` remain.
    pub(crate) fn truncate(&mut self, state_count: usize) {
        let state_count = state_count.max(1);
        if state_count >= self.state_count {
            return;
        }
        match &mut self.storage {
            Storage::Dense(cells) => cells.truncate((state_count - 1) * self.nr_symbols),
            Storage::Compressed { rows, .. } => rows.truncate(state_count - 1),
        }
        self.state_count = state_count;
        self.initial.set_universe(state_count);
        self.accepting.set_universe(state_count);
        if let Some(labels) = &mut self.labels {
            labels.set_state_count(state_count);
        }
    }

    // ---- initial and accepting states ----

    /// The initial states.
    pub fn initial(&self) -> &StateSubset {
        &self.initial
    }

    /// Mutable access to the initial states.
    pub fn initial_mut(&mut self) -> &mut StateSubset {
        &mut self.initial
    }

    /// The accepting states.
    pub fn accepting(&self) -> &StateSubset {
        &self.accepting
    }

    /// Mutable access to the accepting states.
    pub fn accepting_mut(&mut self) -> &mut StateSubset {
        &mut self.accepting
    }

    /// True if `state` is accepting.
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(state)
    }

    /// True if `state` is initial.
    pub fn is_initial(&self, state: StateId) -> bool {
        self.initial.contains(state)
    }

    /// True for multi-initial automata.
    pub fn has_multiple_initial_states(&self) -> bool {
        self.initial.count() > 1
    }

    /// Normalise the initial and accepting set representations.
    pub fn tidy(&mut self) {
        self.initial.shrink();
        self.accepting.shrink();
    }

    // ---- labels ----

    /// The label table, if the states are labelled.
    pub fn labels(&self) -> Option<&Labels> {
        self.labels.as_ref()
    }

    /// Mutable label table.
    pub fn labels_mut(&mut self) -> Option<&mut Labels> {
        self.labels.as_mut()
    }

    /// Attach or remove a label table.
    pub fn set_labels(&mut self, labels: Option<Labels>) {
        self.labels = labels.map(|mut l| {
            l.set_state_count(self.state_count);
            l
        });
    }

    /// True if the states carry labels.
    pub fn is_labelled(&self) -> bool {
        self.labels.is_some()
    }

    /// Label of a state (0 when unlabelled).
    pub fn label_nr(&self, state: StateId) -> LabelId {
        self.labels.as_ref().map_or(0, |l| l.label_nr(state))
    }

    /// Number of labels including the null label (1 when unlabelled).
    pub fn label_count(&self) -> usize {
        self.labels.as_ref().map_or(1, Labels::label_count)
    }

    // ---- renumbering ----

    /// Renumber the states.
    ///
    /// Without `sort_sequence`, `perm[old]` is the new number of state `old`
    /// and 0 drops the state. With `sort_sequence`, `perm` lists the old states
    /// in their new order, starting at new state 1 (a leading 0 entry for the
    /// failure state is allowed). New numbers must be distinct and dense.
    /// Transitions into dropped states become failures.
    pub fn permute_states(&mut self, perm: &[StateId], sort_sequence: bool) -> Result<()> {
        let map = if sort_sequence {
            let sequence = match perm.first() {
                Some(0) => &perm[1..],
                _ => perm,
            };
            let mut map = vec![0; self.state_count];
            for (i, &old) in sequence.iter().enumerate() {
                self.check_state(old)
                    .map_err(|_| FsaError::InvalidPermutation(format!("state {} out of range", old)))?;
                if map[old as usize] != 0 {
                    return Err(FsaError::InvalidPermutation(format!(
                        "state {} listed twice",
                        old
                    )));
                }
                map[old as usize] = (i + 1) as StateId;
            }
            map
        } else {
            if perm.len() != self.state_count {
                return Err(FsaError::InvalidPermutation(format!(
                    "map has {} entries for {} states",
                    perm.len(),
                    self.state_count
                )));
            }
            let mut seen = vec![false; self.state_count];
            for &new in &perm[1..] {
                if new == 0 {
                    continue;
                }
                match seen.get_mut(new as usize) {
                    Some(slot) if !*slot => *slot = true,
                    _ => {
                        return Err(FsaError::InvalidPermutation(format!(
                            "state {} assigned twice or out of range",
                            new
                        )))
                    }
                }
            }
            let mut map = perm.to_vec();
            map[0] = 0;
            map
        };

        let new_count = map.iter().copied().max().unwrap_or(0) as usize + 1;
        if map.iter().filter(|&&s| s != 0).count() != new_count - 1 {
            return Err(FsaError::InvalidPermutation("new numbers are not dense".into()));
        }

        let format = if self.is_dense() {
            StorageFormat::Dense
        } else {
            StorageFormat::Sparse
        };
        let mut scratch = Automaton::new(self.alphabet.clone(), self.nr_symbols, new_count, format);
        let mut row = vec![0; self.nr_symbols];
        for old in 1..self.state_count {
            let new = map[old];
            if new == 0 {
                continue;
            }
            self.row(old as StateId, &mut row);
            for t in row.iter_mut() {
                if self.is_valid_state(*t) {
                    *t = map[*t as usize];
                }
            }
            scratch.store_row(new, &row);
        }

        self.initial = self.initial.renumber(&map, new_count);
        self.accepting = self.accepting.renumber(&map, new_count);
        self.labels = self.labels.take().map(|l| l.renumber(&map, new_count));
        self.storage = scratch.storage;
        self.state_count = new_count;
        self.flags.remove(Flags::BFS);
        Ok(())
    }

    /// Renumber the states in breadth-first order from the initial states.
    /// Unreachable states are dropped.
    pub fn sort_bfs(&mut self) -> Result<()> {
        let mut map = vec![0 as StateId; self.state_count];
        let mut queue = VecDeque::new();
        let mut next = 1;
        for s in self.initial.iter() {
            map[s as usize] = next;
            next += 1;
            queue.push_back(s);
        }
        let mut row = vec![0; self.nr_symbols];
        while let Some(s) = queue.pop_front() {
            self.row(s, &mut row);
            for &t in &row {
                if self.is_valid_state(t) && map[t as usize] == 0 {
                    map[t as usize] = next;
                    next += 1;
                    queue.push_back(t);
                }
            }
        }
        let keep_minimised = self.flags.contains(Flags::MINIMISED);
        self.permute_states(&map, false)?;
        self.flags.insert(Flags::BFS | Flags::ACCESSIBLE);
        self.flags.set(Flags::MINIMISED, keep_minimised);
        Ok(())
    }

    /// Replace rewrite markers by failure transitions.
    pub fn remove_rewrites(&mut self) {
        let mut row = vec![0; self.nr_symbols];
        for s in 1..self.state_count {
            let s = s as StateId;
            self.row(s, &mut row);
            let mut changed = false;
            for t in row.iter_mut() {
                if *t != 0 && !self.is_valid_state(*t) {
                    *t = 0;
                    changed = true;
                }
            }
            if changed {
                self.store_row(s, &row);
            }
        }
        self.flags.remove(Flags::RWS | Flags::MINIMISED);
    }

    // ---- words ----

    /// Follow `word` from `state`. Returns 0 if a transition fails.
    pub fn read_word(&self, state: StateId, word: &[Symbol]) -> StateId {
        let mut s = state;
        for &g in word {
            s = self.new_state(s, g);
            if !self.is_valid_state(s) {
                return 0;
            }
        }
        s
    }

    /// True if some initial state reaches an accepting state on `word`.
    pub fn accepts(&self, word: &[Symbol]) -> bool {
        self.initial
            .iter()
            .any(|s| self.is_accepting(self.read_word(s, word)))
    }

    /// All accepted words of length at most `max_len`, shortest first and
    /// in symbol order within each length.
    pub fn words(&self, max_len: usize) -> Vec<Vec<Symbol>> {
        let mut found = Vec::new();
        let mut level: Vec<(Vec<Symbol>, Vec<StateId>)> = vec![(Vec::new(), self.initial.to_vec())];
        for len in 0..=max_len {
            let mut next_level = Vec::new();
            for (word, states) in level {
                if states.iter().any(|&s| self.is_accepting(s)) {
                    found.push(word.clone());
                }
                if len == max_len {
                    continue;
                }
                for g in 0..self.nr_symbols {
                    let mut targets: Vec<StateId> = states
                        .iter()
                        .map(|&s| self.new_state(s, g))
                        .filter(|&t| self.is_valid_state(t))
                        .collect();
                    if targets.is_empty() {
                        continue;
                    }
                    targets.sort_unstable();
                    targets.dedup();
                    let mut w = word.clone();
                    w.push(g);
                    next_level.push((w, targets));
                }
            }
            level = next_level;
        }
        found
    }

    /// Number of accepted words of length at most `max_len`.
    pub fn language_size(&self, max_len: usize) -> u128 {
        if self.initial.count() != 1 {
            return self.words(max_len).len() as u128;
        }
        // paths in a deterministic automaton correspond to words
        let mut counts = vec![0u128; self.state_count];
        if let Some(s) = self.initial.first() {
            counts[s as usize] = 1;
        }
        let mut total = 0u128;
        let mut row = vec![0; self.nr_symbols];
        for len in 0..=max_len {
            total += self.accepting.iter().map(|s| counts[s as usize]).sum::<u128>();
            if len == max_len {
                break;
            }
            let mut next = vec![0u128; self.state_count];
            for s in 1..self.state_count {
                if counts[s] == 0 {
                    continue;
                }
                self.row(s as StateId, &mut row);
                for &t in &row {
                    if self.is_valid_state(t) {
                        next[t as usize] = next[t as usize].saturating_add(counts[s]);
                    }
                }
            }
            counts = next;
        }
        total
    }

    /// Structural equality: same states, transitions, initial and accepting
    /// sets and label payloads. Storage format and flags are ignored.
    pub fn compare(&self, other: &Automaton) -> bool {
        if self.nr_symbols != other.nr_symbols
            || self.state_count != other.state_count
            || self.initial != other.initial
            || self.accepting != other.accepting
            || self.is_labelled() != other.is_labelled()
        {
            return false;
        }
        let mut a = vec![0; self.nr_symbols];
        let mut b = vec![0; self.nr_symbols];
        for s in 1..self.state_count as StateId {
            self.row(s, &mut a);
            other.row(s, &mut b);
            if a != b {
                return false;
            }
            if let (Some(x), Some(y)) = (&self.labels, &other.labels) {
                if x.state_data(s) != y.state_data(s) {
                    return false;
                }
            }
        }
        true
    }
}

impl PartialEq for Automaton {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other)
    }
}

/// Scoped write access to one row, stored back when dropped.
pub struct RowGuard<'a> {
    fsa: &'a mut Automaton,
    state: StateId,
    row: Vec<StateId>,
}

impl RowGuard<'_> {
    /// The state whose row is being edited.
    pub fn state(&self) -> StateId {
        self.state
    }
}

impl Deref for RowGuard<'_> {
    type Target = [StateId];

    fn deref(&self) -> &[StateId] {
        &self.row
    }
}

impl DerefMut for RowGuard<'_> {
    fn deref_mut(&mut self) -> &mut [StateId] {
        &mut self.row
    }
}

impl Drop for RowGuard<'_> {
    fn drop(&mut self) {
        let row = std::mem::take(&mut self.row);
        self.fsa.store_row(self.state, &row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ends_in_a(format: StorageFormat) -> Automaton {
        let mut fsa = Automaton::new(Alphabet::new(2), 2, 3, format);
        fsa.set_transitions(1, &[2, 1]).unwrap();
        fsa.set_transitions(2, &[2, 1]).unwrap();
        fsa.accepting_mut().include(2);
        fsa
    }

    #[test]
    fn test_dense_and_sparse_agree() {
        let dense = ends_in_a(StorageFormat::Dense);
        let sparse = ends_in_a(StorageFormat::Sparse);
        assert!(dense.is_dense());
        assert!(!sparse.is_dense());
        assert_eq!(dense, sparse);
        for s in 0..3 {
            for g in 0..2 {
                assert_eq!(dense.new_state(s, g), sparse.new_state(s, g));
            }
        }
        assert_eq!(dense.row_vec(0), vec![0, 0]);
    }

    #[test]
    fn test_set_transitions_rejects_bad_state() {
        let mut fsa = ends_in_a(StorageFormat::Dense);
        assert!(matches!(
            fsa.set_transitions(3, &[1, 1]),
            Err(FsaError::InvalidState { state: 3, .. })
        ));
        assert!(fsa.set_transitions(0, &[1, 1]).is_err());
    }

    #[test]
    fn test_row_guard_commits_on_drop() {
        let mut fsa = ends_in_a(StorageFormat::Sparse);
        {
            let mut row = fsa.row_mut(2).unwrap();
            row.swap(0, 1);
        }
        assert_eq!(fsa.row_vec(2), vec![1, 2]);
    }

    #[test]
    fn test_words_and_language_size() {
        let fsa = ends_in_a(StorageFormat::Dense);
        assert_eq!(fsa.words(2), vec![vec![0], vec![0, 0], vec![1, 0]]);
        assert_eq!(fsa.language_size(2), 3);
        assert_eq!(fsa.language_size(10), (1..=10).map(|n| 1u128 << (n - 1)).sum());
    }

    #[test]
    fn test_sort_bfs_drops_unreachable_states() {
        let mut fsa = Automaton::new(Alphabet::new(2), 2, 5, StorageFormat::Dense);
        fsa.set_transitions(1, &[4, 0]).unwrap();
        fsa.set_transitions(4, &[2, 4]).unwrap();
        fsa.set_transitions(3, &[1, 1]).unwrap();
        fsa.accepting_mut().include(2);
        fsa.accepting_mut().include(3);
        fsa.sort_bfs().unwrap();
        assert_eq!(fsa.state_count(), 4);
        assert_eq!(fsa.row_vec(1), vec![2, 0]);
        assert_eq!(fsa.row_vec(2), vec![3, 2]);
        assert_eq!(fsa.accepting().to_vec(), vec![3]);
        assert!(fsa.flags().contains(Flags::BFS));
    }

    #[test]
    fn test_permute_states_validation() {
        let mut fsa = ends_in_a(StorageFormat::Dense);
        assert!(fsa.permute_states(&[0, 1, 1], false).is_err());
        assert!(fsa.permute_states(&[2, 2], true).is_err());
        fsa.permute_states(&[0, 2, 1], true).unwrap();
        assert_eq!(fsa.initial().to_vec(), vec![2]);
        assert_eq!(fsa.accepting().to_vec(), vec![1]);
        assert_eq!(fsa.row_vec(2), vec![1, 2]);
    }

    #[test]
    fn test_remove_rewrites() {
        let mut fsa = ends_in_a(StorageFormat::Dense);
        fsa.set_transitions(2, &[REWRITE_BASE + 3, 1]).unwrap();
        fsa.change_flags(Flags::RWS, Flags::NONE);
        fsa.remove_rewrites();
        assert_eq!(fsa.row_vec(2), vec![0, 1]);
        assert!(!fsa.flags().contains(Flags::RWS));
    }

    #[test]
    fn test_grow_keeps_sets() {
        let mut fsa = ends_in_a(StorageFormat::Sparse);
        fsa.accepting_mut().set_all();
        fsa.grow(6);
        assert_eq!(fsa.state_count(), 6);
        assert_eq!(fsa.accepting().to_vec(), vec![1, 2]);
        assert_eq!(fsa.row_vec(5), vec![0, 0]);
        fsa.truncate(2);
        assert_eq!(fsa.accepting().to_vec(), vec![1]);
    }
}
