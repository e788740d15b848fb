//! Sets of states with compact special cases.
//!
//! Initial sets are usually a single state and accepting sets are often every
//! state, so [`StateSubset`] stores those cases (and the empty set) in
//! constant space and only falls back to a bitset for general sets. State 0
//! is never a member.

use crate::codec::packer::{pack_state_list, unpack_state_list};
use crate::StateId;

const LIST_TAG: u8 = 1;
const BITMAP_TAG: u8 = 2;

/// Internal representation of a [`StateSubset`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
enum Repr {
    Empty,
    Singleton(StateId),
    All,
    Bitset { words: Vec<u64>, count: usize },
}

/// A set of states drawn from `1..universe`.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct StateSubset {
    universe: usize,
    repr: Repr,
}

impl StateSubset {
    /// The empty set over `universe` state ids (state 0 included in the count).
    pub fn empty(universe: usize) -> Self {
        StateSubset {
            universe,
            repr: Repr::Empty,
        }
    }

    /// The set `{state}`.
    pub fn singleton(universe: usize, state: StateId) -> Self {
        let mut s = Self::empty(universe);
        s.include(state);
        s
    }

    /// Every non-failure state.
    pub fn all(universe: usize) -> Self {
        StateSubset {
            universe,
            repr: Repr::All,
        }
    }

    /// Collect states into a set, normalising the representation.
    pub fn from_states<I: IntoIterator<Item = StateId>>(universe: usize, states: I) -> Self {
        let mut s = Self::empty(universe);
        for state in states {
            s.include(state);
        }
        s.tidy();
        s
    }

    /// Size of the universe, including the failure state.
    pub fn universe(&self) -> usize {
        self.universe
    }

    fn in_range(&self, state: StateId) -> bool {
        state != 0 && (state as usize) < self.universe
    }

    fn to_bitset(&mut self) {
        let nwords = (self.universe + 63) / 64;
        let repr = std::mem::replace(&mut self.repr, Repr::Empty);
        let mut words = vec![0u64; nwords];
        let count = match repr {
            Repr::Bitset { words, count } => {
                self.repr = Repr::Bitset { words, count };
                return;
            }
            Repr::Empty => 0,
            Repr::Singleton(s) => {
                words[s as usize / 64] |= 1 << (s % 64);
                1
            }
            Repr::All => {
                for s in 1..self.universe {
                    words[s / 64] |= 1 << (s % 64);
                }
                self.universe.saturating_sub(1)
            }
        };
        self.repr = Repr::Bitset { words, count };
    }

    /// Add a state. States outside the universe are ignored.
    pub fn include(&mut self, state: StateId) {
        if !self.in_range(state) {
            return;
        }
        match &mut self.repr {
            Repr::All => {}
            Repr::Empty => self.repr = Repr::Singleton(state),
            Repr::Singleton(s) if *s == state => {}
            Repr::Singleton(_) => {
                self.to_bitset();
                self.include(state);
            }
            Repr::Bitset { words, count } => {
                let (w, bit) = (state as usize / 64, 1u64 << (state % 64));
                if words[w] & bit == 0 {
                    words[w] |= bit;
                    *count += 1;
                }
            }
        }
    }

    /// Remove a state.
    pub fn exclude(&mut self, state: StateId) {
        if !self.contains(state) {
            return;
        }
        match &mut self.repr {
            Repr::Singleton(_) => self.repr = Repr::Empty,
            Repr::All => {
                self.to_bitset();
                self.exclude(state);
            }
            Repr::Bitset { words, count } => {
                words[state as usize / 64] &= !(1u64 << (state % 64));
                *count -= 1;
            }
            Repr::Empty => {}
        }
    }

    /// Membership test.
    pub fn contains(&self, state: StateId) -> bool {
        if !self.in_range(state) {
            return false;
        }
        match &self.repr {
            Repr::Empty => false,
            Repr::Singleton(s) => *s == state,
            Repr::All => true,
            Repr::Bitset { words, .. } => words[state as usize / 64] & (1u64 << (state % 64)) != 0,
        }
    }

    /// Number of members.
    pub fn count(&self) -> usize {
        match &self.repr {
            Repr::Empty => 0,
            Repr::Singleton(_) => 1,
            Repr::All => self.universe.saturating_sub(1),
            Repr::Bitset { count, .. } => *count,
        }
    }

    /// True if there are no members.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// True if every non-failure state is a member.
    pub fn is_all(&self) -> bool {
        self.count() + 1 >= self.universe
    }

    /// The smallest member.
    pub fn first(&self) -> Option<StateId> {
        self.iter().next()
    }

    /// Members in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter { set: self, next: 1 }
    }

    /// Remove every member.
    pub fn clear(&mut self) {
        self.repr = Repr::Empty;
    }

    /// Make every state a member.
    pub fn set_all(&mut self) {
        self.repr = Repr::All;
    }

    /// Normalise to the most compact representation.
    pub fn tidy(&mut self) {
        let count = self.count();
        if count == 0 {
            self.repr = Repr::Empty;
        } else if count + 1 == self.universe {
            self.repr = Repr::All;
        } else if count == 1 {
            if let Some(s) = self.first() {
                self.repr = Repr::Singleton(s);
            }
        }
    }

    /// [`tidy`](StateSubset::tidy), then release spare bitset capacity.
    pub fn shrink(&mut self) {
        self.tidy();
        if let Repr::Bitset { words, .. } = &mut self.repr {
            words.shrink_to_fit();
        }
    }

    /// Change the universe size, keeping the current members.
    ///
    /// An "all states" set keeps exactly its old members when grown.
    pub fn set_universe(&mut self, universe: usize) {
        if universe > self.universe && matches!(self.repr, Repr::All) {
            self.to_bitset();
        }
        if universe < self.universe {
            let members: Vec<StateId> = self
                .iter()
                .filter(|&s| (s as usize) < universe)
                .collect();
            *self = Self::from_states(universe, members);
            return;
        }
        self.universe = universe;
        if let Repr::Bitset { words, .. } = &mut self.repr {
            words.resize((universe + 63) / 64, 0);
        }
    }

    /// Map every member through `perm` into a set over `new_universe`.
    /// Members mapped to 0 are dropped.
    pub fn renumber(&self, perm: &[StateId], new_universe: usize) -> StateSubset {
        StateSubset::from_states(
            new_universe,
            self.iter().map(|s| perm[s as usize]).filter(|&s| s != 0),
        )
    }

    /// Members collected into a vector.
    pub fn to_vec(&self) -> Vec<StateId> {
        self.iter().collect()
    }

    /// Encode the set as a builder key.
    ///
    /// The empty set encodes to no bytes. Otherwise the shorter of a sorted
    /// list and a bitmap is used, with a leading tag byte; the choice depends
    /// only on the members, so equal sets give equal keys.
    pub fn pack(&self, out: &mut Vec<u8>) {
        out.clear();
        if self.is_empty() {
            return;
        }
        let members = self.to_vec();
        let mut list = Vec::new();
        pack_state_list(&members, &mut list);
        let last = *members.last().unwrap_or(&0) as usize;
        let bitmap_len = last / 8 + 1;
        if list.len() <= bitmap_len {
            out.push(LIST_TAG);
            out.extend_from_slice(&list);
        } else {
            out.push(BITMAP_TAG);
            out.resize(1 + bitmap_len, 0);
            for s in members {
                out[1 + s as usize / 8] |= 1 << (s % 8);
            }
        }
    }

    /// Decode a key produced by [`pack`](StateSubset::pack).
    pub fn unpack(universe: usize, key: &[u8]) -> StateSubset {
        match key.split_first() {
            None => StateSubset::empty(universe),
            Some((&LIST_TAG, rest)) => StateSubset::from_states(universe, unpack_state_list(rest)),
            Some((_, rest)) => StateSubset::from_states(
                universe,
                rest.iter().enumerate().flat_map(|(i, &b)| {
                    (0..8)
                        .filter(move |bit| b & (1 << bit) != 0)
                        .map(move |bit| (i * 8 + bit) as StateId)
                }),
            ),
        }
    }
}

impl PartialEq for StateSubset {
    fn eq(&self, other: &Self) -> bool {
        self.count() == other.count() && self.iter().eq(other.iter())
    }
}

impl Eq for StateSubset {}

/// Ascending iterator over the members of a [`StateSubset`].
pub struct Iter<'a> {
    set: &'a StateSubset,
    next: usize,
}

impl Iterator for Iter<'_> {
    type Item = StateId;

    fn next(&mut self) -> Option<StateId> {
        let universe = self.set.universe;
        match &self.set.repr {
            Repr::Empty => None,
            Repr::Singleton(s) => {
                if self.next <= *s as usize {
                    self.next = *s as usize + 1;
                    Some(*s)
                } else {
                    None
                }
            }
            Repr::All => {
                if self.next < universe {
                    self.next += 1;
                    Some((self.next - 1) as StateId)
                } else {
                    None
                }
            }
            Repr::Bitset { words, .. } => {
                while self.next < universe {
                    let w = words[self.next / 64] >> (self.next % 64);
                    if w == 0 {
                        self.next = (self.next / 64 + 1) * 64;
                        continue;
                    }
                    let s = self.next + w.trailing_zeros() as usize;
                    self.next = s + 1;
                    return Some(s as StateId);
                }
                None
            }
        }
    }
}

impl<'a> IntoIterator for &'a StateSubset {
    type Item = StateId;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
