//! Kleene star and concatenation.
//!
//! Both build subsets of source states, as determinisation does. Whenever a
//! member reaches an accepting state, the subset also gets the state where
//! the next word starts: the initial state of the same automaton for star,
//! the initial state of the second automaton for concatenation.

use super::{check_same_alphabet, key_of, step, Factory};
use crate::automaton::{Automaton, Flags};
use crate::error::Result;
use crate::subset::StateSubset;
use crate::StateId;

impl Factory {
    /// The automaton accepting any sequence of zero or more words of `fsa`.
    pub fn star(&self, fsa: &Automaton) -> Result<Automaton> {
        if fsa.has_multiple_initial_states() {
            let dfa = self.determinize(fsa)?;
            return self.star(&dfa);
        }
        let nr_symbols = fsa.alphabet_size();
        let initial = match fsa.initial().first() {
            Some(s) => s,
            None => {
                // nothing is accepted, so only the empty word is left
                let mut empty = self.new_automaton(fsa.alphabet(), nr_symbols, 2)?;
                empty.accepting_mut().include(1);
                empty.change_flags(
                    Flags::MINIMISED | Flags::TRIM | Flags::ACCESSIBLE | Flags::BFS,
                    Flags::NONE,
                );
                return Ok(empty);
            }
        };

        if fsa.accepting().count() == 1 {
            if fsa.is_accepting(initial) {
                return self.copy(fsa);
            }
            if let Some(accepting) = fsa.accepting().first() {
                if fsa.row_vec(accepting).iter().all(|&t| t == 0) && !has_edge_into(fsa, initial) {
                    return self.star_by_merging(fsa, initial, accepting);
                }
            }
        }

        if (0..nr_symbols).all(|symbol| fsa.is_accepting(step(fsa, initial, symbol))) {
            // every one letter word is accepted
            let mut all = self.new_automaton(fsa.alphabet(), nr_symbols, 2)?;
            all.set_transitions(1, &vec![1; nr_symbols])?;
            all.accepting_mut().include(1);
            all.change_flags(
                Flags::MINIMISED | Flags::TRIM | Flags::ACCESSIBLE | Flags::BFS,
                Flags::NONE,
            );
            return Ok(all);
        }

        // The start subset carries an extra marker member so that it stays
        // apart from any subset reached by a nonempty word.
        let marker = fsa.state_count() as StateId;
        let universe = fsa.state_count() + 1;
        let mut builder = self.builder(fsa.alphabet(), nr_symbols);
        let mut key = Vec::new();
        builder.find_state(&key)?;
        let mut start = StateSubset::singleton(universe, initial);
        start.include(marker);
        start.pack(&mut key);
        let start = builder.find_state(&key)?;
        builder.automaton_mut().initial_mut().include(start);

        let mut status = self.status();
        let mut row = vec![0 as StateId; nr_symbols];
        let mut id: StateId = 1;
        while (id as usize) < builder.state_count() {
            self.check_abort()?;
            let current = StateSubset::unpack(universe, key_of(&builder, id, "star")?);
            for (symbol, cell) in row.iter_mut().enumerate() {
                let mut next = StateSubset::empty(universe);
                for s in current.iter().filter(|&s| s != marker) {
                    let t = step(fsa, s, symbol);
                    if t == 0 {
                        continue;
                    }
                    next.include(t);
                    if fsa.is_accepting(t) {
                        next.include(initial);
                    }
                }
                next.pack(&mut key);
                *cell = builder.find_state(&key)?;
            }
            builder.set_transitions(id, &row)?;
            let count = builder.state_count();
            status.report(|| format!("star: state {} of {}", id, count - 1));
            id += 1;
        }

        for id in 1..builder.state_count() as StateId {
            let members = StateSubset::unpack(universe, key_of(&builder, id, "star")?);
            if members.iter().any(|s| s == marker || fsa.is_accepting(s)) {
                builder.automaton_mut().accepting_mut().include(id);
            }
        }
        builder.remove_keys();
        builder
            .automaton_mut()
            .change_flags(Flags::BFS | Flags::ACCESSIBLE, Flags::NONE);
        let built = self.finish(builder)?;
        self.minimize(&built)
    }

    /// Star of an automaton whose only accepting state has no transitions
    /// and whose initial state is never re-entered:
    /// that state can simply become the initial state.
    fn star_by_merging(&self, fsa: &Automaton, initial: StateId, accepting: StateId) -> Result<Automaton> {
        let renumbered = |s: StateId| if s > accepting { s - 1 } else { s };
        let map: Vec<StateId> = (0..fsa.state_count() as StateId)
            .map(|s| if s == accepting { renumbered(initial) } else { renumbered(s) })
            .collect();
        let mut merged = if fsa.is_labelled() {
            let mut plain = fsa.clone();
            plain.set_labels(None);
            self.merge(&plain, &map)?
        } else {
            self.merge(fsa, &map)?
        };
        merged.sort_bfs()?;
        Ok(merged)
    }

    /// The automaton accepting `uv` for every `u` accepted by `fsa_0` and
    /// `v` accepted by `fsa_1`.
    pub fn concat(&self, fsa_0: &Automaton, fsa_1: &Automaton) -> Result<Automaton> {
        check_same_alphabet(fsa_0, fsa_1)?;
        if fsa_1.has_multiple_initial_states() {
            let dfa = self.determinize(fsa_1)?;
            return self.concat(fsa_0, &dfa);
        }
        let nr_symbols = fsa_0.alphabet_size();
        // states of fsa_1 are numbered after those of fsa_0
        let offset = fsa_0.state_count() as StateId;
        let universe = fsa_0.state_count() + fsa_1.state_count();
        let second_start = fsa_1.initial().first().map(|s| s + offset);

        let mut builder = self.builder(fsa_0.alphabet(), nr_symbols);
        let mut key = Vec::new();
        builder.find_state(&key)?;
        let mut start = StateSubset::empty(universe);
        for s in fsa_0.initial().iter() {
            start.include(s);
            if fsa_0.is_accepting(s) {
                if let Some(s1) = second_start {
                    start.include(s1);
                }
            }
        }
        start.pack(&mut key);
        let start = builder.find_state(&key)?;
        if start != 0 {
            builder.automaton_mut().initial_mut().include(start);
        }

        let mut status = self.status();
        let mut row = vec![0 as StateId; nr_symbols];
        let mut id: StateId = 1;
        while (id as usize) < builder.state_count() {
            self.check_abort()?;
            let current = StateSubset::unpack(universe, key_of(&builder, id, "concat")?);
            for (symbol, cell) in row.iter_mut().enumerate() {
                let mut next = StateSubset::empty(universe);
                for s in current.iter() {
                    if s < offset {
                        let t = step(fsa_0, s, symbol);
                        if t == 0 {
                            continue;
                        }
                        next.include(t);
                        if fsa_0.is_accepting(t) {
                            if let Some(s1) = second_start {
                                next.include(s1);
                            }
                        }
                    } else {
                        let t = step(fsa_1, s - offset, symbol);
                        if t != 0 {
                            next.include(t + offset);
                        }
                    }
                }
                next.pack(&mut key);
                *cell = builder.find_state(&key)?;
            }
            builder.set_transitions(id, &row)?;
            let count = builder.state_count();
            status.report(|| format!("concat: state {} of {}", id, count - 1));
            id += 1;
        }

        for id in 1..builder.state_count() as StateId {
            let members = StateSubset::unpack(universe, key_of(&builder, id, "concat")?);
            if members
                .iter()
                .any(|s| s >= offset && fsa_1.is_accepting(s - offset))
            {
                builder.automaton_mut().accepting_mut().include(id);
            }
        }
        builder.remove_keys();
        builder
            .automaton_mut()
            .change_flags(Flags::BFS | Flags::ACCESSIBLE, Flags::NONE);
        let built = self.finish(builder)?;
        log::debug!(
            "concat: {} + {} states -> {} states before minimising",
            fsa_0.state_count() - 1,
            fsa_1.state_count() - 1,
            built.state_count() - 1
        );
        self.minimize(&built)
    }
}

fn has_edge_into(fsa: &Automaton, target: StateId) -> bool {
    (1..fsa.state_count() as StateId).any(|s| fsa.row_vec(s).contains(&target))
}
