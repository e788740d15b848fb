//! Automata over pairs of words: building them from two word acceptors and
//! projecting them back.
//!
//! A product automaton reads two words in parallel, one letter pair per
//! transition. The shorter word is padded at the end, so after the padding
//! symbol appears on one side it must stay there.

use super::{check_base, check_product, check_same_alphabet, key_of, step, DeterminizePolicy, Factory};
use crate::automaton::{Automaton, Flags};
use crate::codec::packer::TuplePacker;
use crate::error::Result;
use crate::subset::StateSubset;
use crate::symbols::{Alphabet, SymbolSpace};
use crate::StateId;

/// Key of the absorbing accepting state of a sticky projection. Subset keys
/// start with a tag byte of 1 or 2, so this cannot collide with one.
const STICKY_KEY: &[u8] = &[0xff];

impl Factory {
    /// The product automaton accepting `(u, v)` for every `u` accepted by
    /// `fsa_0` and `v` accepted by `fsa_1`.
    pub fn cartesian_product(&self, fsa_0: &Automaton, fsa_1: &Automaton) -> Result<Automaton> {
        check_same_alphabet(fsa_0, fsa_1)?;
        check_base(fsa_0, "cartesian_product")?;
        if fsa_0.initial().count() != 1 {
            let dfa = self.determinize(fsa_0)?;
            return self.cartesian_product(&dfa, fsa_1);
        }
        if fsa_1.initial().count() != 1 {
            let dfa = self.determinize_with(fsa_1, DeterminizePolicy::All, true)?;
            return self.cartesian_product(fsa_0, &dfa);
        }

        let alphabet = fsa_0.alphabet();
        let letters = alphabet.letter_count();
        let nr_transitions = alphabet.product_alphabet_size();
        // one past the last state: "this word has ended"
        let end_0 = fsa_0.state_count() as StateId;
        let end_1 = fsa_1.state_count() as StateId;
        let packer = TuplePacker::new(&[end_0, end_1]);

        let mut builder = self.builder(alphabet, nr_transitions);
        let mut key = Vec::with_capacity(packer.key_size());
        packer.pack(&[0, 0], &mut key);
        builder.find_state(&key)?;
        let initial = [
            fsa_0.initial().first().unwrap_or(0),
            fsa_1.initial().first().unwrap_or(0),
        ];
        packer.pack(&initial, &mut key);
        if builder.find_state(&key)? != 0 {
            builder.automaton_mut().initial_mut().include(1);
        }

        let advance = |fsa: &Automaton, end: StateId, state: StateId, g: usize| -> StateId {
            if state == end {
                if g == letters {
                    end
                } else {
                    0
                }
            } else if g == letters {
                if fsa.is_accepting(state) {
                    end
                } else {
                    0
                }
            } else {
                step(fsa, state, g)
            }
        };

        let mut status = self.status();
        let mut row = vec![0 as StateId; nr_transitions];
        let mut id: StateId = 1;
        while (id as usize) < builder.state_count() {
            self.check_abort()?;
            let old = packer.unpack(key_of(&builder, id, "cartesian_product")?);
            for g1 in 0..=letters {
                let k0 = advance(fsa_0, end_0, old[0], g1);
                for g2 in 0..=letters {
                    let ti = alphabet.product_id(g1, g2);
                    if ti >= nr_transitions {
                        continue;
                    }
                    let k1 = if k0 == 0 { 0 } else { advance(fsa_1, end_1, old[1], g2) };
                    row[ti] = if k1 == 0 {
                        0
                    } else {
                        packer.pack(&[k0, k1], &mut key);
                        builder.find_state(&key)?
                    };
                }
            }
            builder.set_transitions(id, &row)?;
            let count = builder.state_count();
            status.report(|| format!("cartesian product: state {} of {}", id, count - 1));
            id += 1;
        }

        for id in 1..builder.state_count() as StateId {
            let pair = packer.unpack(key_of(&builder, id, "cartesian_product")?);
            let accept_0 = pair[0] == end_0 || fsa_0.is_accepting(pair[0]);
            let accept_1 = pair[1] == end_1 || fsa_1.is_accepting(pair[1]);
            if accept_0 && accept_1 {
                builder.automaton_mut().accepting_mut().include(id);
            }
        }
        builder.remove_keys();
        let built = self.finish(builder)?;
        self.minimize(&built)
    }

    /// Project a product automaton onto one of its words.
    ///
    /// The result accepts `u` if the input accepts `(u, v)` for some `v`, or
    /// `(v, u)` when `swapped` is set. With `sticky`, once a prefix of `u` is
    /// accepted every extension is accepted too, which is much cheaper when
    /// that is known to give the right answer.
    pub fn exists(&self, fsa: &Automaton, sticky: bool, swapped: bool) -> Result<Automaton> {
        check_product(fsa, "exists")?;
        let alphabet = fsa.alphabet();
        let letters = alphabet.letter_count();
        let universe = fsa.state_count();
        let pair = |kept: usize, other: usize| {
            if swapped {
                alphabet.product_id(other, kept)
            } else {
                alphabet.product_id(kept, other)
            }
        };

        let mut builder = self.builder(alphabet, letters);
        let mut key = Vec::new();
        builder.find_state(&key)?;
        StateSubset::from_states(universe, fsa.initial().iter()).pack(&mut key);
        if builder.find_state(&key)? != 0 {
            builder.automaton_mut().initial_mut().include(1);
        }

        let mut status = self.status();
        let mut sticky_state: StateId = 0;
        let mut row = vec![0 as StateId; letters];
        let mut id: StateId = 1;
        while (id as usize) < builder.state_count() {
            self.check_abort()?;
            if id == sticky_state {
                row.fill(sticky_state);
            } else {
                let current = StateSubset::unpack(universe, key_of(&builder, id, "exists")?);
                for (g1, cell) in row.iter_mut().enumerate() {
                    let mut next = StateSubset::empty(universe);
                    let mut accepts = false;
                    'members: for s in current.iter() {
                        for g2 in 0..=letters {
                            let t = step(fsa, s, pair(g1, g2));
                            if t == 0 {
                                continue;
                            }
                            next.include(t);
                            if sticky && fsa.is_accepting(t) {
                                accepts = true;
                                break 'members;
                            }
                        }
                    }
                    *cell = if accepts {
                        if sticky_state == 0 {
                            sticky_state = builder.find_state(STICKY_KEY)?;
                        }
                        sticky_state
                    } else {
                        next.pack(&mut key);
                        builder.find_state(&key)?
                    };
                }
            }
            builder.set_transitions(id, &row)?;
            let count = builder.state_count();
            status.report(|| format!("exists: state {} of {}", id, count - 1));
            id += 1;
        }

        // a subset accepts if it reaches an accepting state on padding
        for id in 1..builder.state_count() as StateId {
            let accepts = id == sticky_state || {
                let start = StateSubset::unpack(universe, key_of(&builder, id, "exists")?);
                let mut reached = start.clone();
                let mut frontier = start.to_vec();
                let mut found = false;
                while !frontier.is_empty() {
                    if frontier.iter().any(|&s| fsa.is_accepting(s)) {
                        found = true;
                        break;
                    }
                    let mut next = Vec::new();
                    for &s in &frontier {
                        for g2 in 0..letters {
                            let t = step(fsa, s, pair(letters, g2));
                            if t != 0 && !reached.contains(t) {
                                reached.include(t);
                                next.push(t);
                            }
                        }
                    }
                    frontier = next;
                }
                found
            };
            if accepts {
                builder.automaton_mut().accepting_mut().include(id);
            }
        }
        builder.remove_keys();
        let built = self.finish(builder)?;
        log::debug!(
            "exists: {} product states -> {} states before minimising",
            universe - 1,
            built.state_count() - 1
        );
        self.minimize(&built)
    }

    /// The automaton accepting `w` whenever the product automaton accepts
    /// `(w, w)`.
    pub fn diagonal(&self, fsa: &Automaton) -> Result<Automaton> {
        check_product(fsa, "diagonal")?;
        let alphabet = fsa.alphabet();
        let letters = alphabet.letter_count();
        let packer = TuplePacker::new(&[fsa.state_count().saturating_sub(1) as StateId]);

        let mut builder = self.builder(alphabet, letters);
        let mut key = Vec::with_capacity(packer.key_size());
        packer.pack(&[0], &mut key);
        builder.find_state(&key)?;
        for s in fsa.initial().iter() {
            packer.pack(&[s], &mut key);
            let id = builder.find_state(&key)?;
            builder.automaton_mut().initial_mut().include(id);
        }

        let mut row = vec![0 as StateId; letters];
        let mut id: StateId = 1;
        while (id as usize) < builder.state_count() {
            self.check_abort()?;
            let s = packer.unpack(key_of(&builder, id, "diagonal")?)[0];
            if fsa.is_accepting(s) {
                builder.automaton_mut().accepting_mut().include(id);
            }
            for (g, cell) in row.iter_mut().enumerate() {
                packer.pack(&[step(fsa, s, alphabet.product_id(g, g))], &mut key);
                *cell = builder.find_state(&key)?;
            }
            builder.set_transitions(id, &row)?;
            id += 1;
        }
        builder.remove_keys();
        let built = self.finish(builder)?;
        self.minimize(&built)
    }

    /// The product automaton accepting `(u, v)` whenever `fsa` accepts
    /// `(v, u)`.
    pub fn transpose(&self, fsa: &Automaton) -> Result<Automaton> {
        check_product(fsa, "transpose")?;
        let alphabet = fsa.alphabet().clone();
        let padding = alphabet.padding_symbol();
        let mut answer = self.copy(fsa)?;
        for s in 1..answer.state_count() as StateId {
            let mut row = answer.row_mut(s)?;
            for g1 in 0..padding {
                for g2 in g1 + 1..=padding {
                    row.swap(alphabet.product_id(g1, g2), alphabet.product_id(g2, g1));
                }
            }
        }
        if answer.flags().contains(Flags::BFS) {
            answer.sort_bfs()?;
        }
        Ok(answer)
    }

    /// The product automaton accepting every correctly padded pair of words:
    /// padding may only appear at the end of one of the two words.
    pub fn pad_language(&self, alphabet: &Alphabet) -> Result<Automaton> {
        let letters = alphabet.letter_count();
        let nr_transitions = alphabet.product_alphabet_size();
        // 1: no padding yet, 2: right word ended, 3: left word ended
        let mut fsa = self.new_automaton(alphabet, nr_transitions, 4)?;
        let mut row = vec![0 as StateId; nr_transitions];
        for s in 1..=3 {
            for g1 in 0..=letters {
                for g2 in 0..=letters {
                    let ti = alphabet.product_id(g1, g2);
                    if ti >= nr_transitions {
                        continue;
                    }
                    row[ti] = if g1 == letters {
                        if s == 1 || s == 3 {
                            3
                        } else {
                            0
                        }
                    } else if g2 == letters {
                        if s == 1 || s == 2 {
                            2
                        } else {
                            0
                        }
                    } else if s == 1 {
                        1
                    } else {
                        0
                    };
                }
            }
            fsa.set_transitions(s, &row)?;
        }
        fsa.accepting_mut().set_all();
        fsa.change_flags(
            Flags::MINIMISED | Flags::TRIM | Flags::ACCESSIBLE | Flags::BFS,
            Flags::NONE,
        );
        Ok(fsa)
    }
}
