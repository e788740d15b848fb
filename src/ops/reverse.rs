//! Reversal: the automaton accepting every accepted word read backwards.

use super::{key_of, step, Factory};
use crate::automaton::{Automaton, Flags, LabelData, LabelType, Labels};
use crate::error::Result;
use crate::subset::StateSubset;
use crate::StateId;

impl Factory {
    /// The automaton accepting the reversal of every word `fsa` accepts.
    ///
    /// States of the result are sets of states of `fsa`, started from the
    /// accepting states and followed backwards. With `create_midfa` each
    /// accepting state starts its own initial state, so the result may have
    /// several. With `labelled` each result state carries the list of the
    /// `fsa` states it stands for.
    pub fn reverse(&self, fsa: &Automaton, create_midfa: bool, labelled: bool) -> Result<Automaton> {
        let nr_states = fsa.state_count();
        let nr_symbols = fsa.alphabet_size();

        // predecessors[t * nr_symbols + symbol] lists the states reaching t on symbol
        let mut predecessors: Vec<Vec<StateId>> = vec![Vec::new(); nr_states * nr_symbols];
        for s in 1..nr_states as StateId {
            for symbol in 0..nr_symbols {
                let t = step(fsa, s, symbol);
                if t != 0 {
                    predecessors[t as usize * nr_symbols + symbol].push(s);
                }
            }
        }

        let mut builder = self.builder(fsa.alphabet(), nr_symbols);
        let mut key = Vec::new();
        builder.find_state(&key)?;
        if create_midfa {
            for s in fsa.accepting().iter() {
                StateSubset::singleton(nr_states, s).pack(&mut key);
                let id = builder.find_state(&key)?;
                builder.automaton_mut().initial_mut().include(id);
            }
        } else {
            fsa.accepting().pack(&mut key);
            let id = builder.find_state(&key)?;
            if id != 0 {
                builder.automaton_mut().initial_mut().include(id);
            }
        }

        let mut status = self.status();
        let mut row = vec![0 as StateId; nr_symbols];
        let mut id: StateId = 1;
        while (id as usize) < builder.state_count() {
            self.check_abort()?;
            let current = StateSubset::unpack(nr_states, key_of(&builder, id, "reverse")?);
            for (symbol, cell) in row.iter_mut().enumerate() {
                let mut next = StateSubset::empty(nr_states);
                for t in current.iter() {
                    for &s in &predecessors[t as usize * nr_symbols + symbol] {
                        next.include(s);
                    }
                }
                next.pack(&mut key);
                *cell = builder.find_state(&key)?;
            }
            builder.set_transitions(id, &row)?;
            let count = builder.state_count();
            status.report(|| format!("reverse: state {} of {}", id, count - 1));
            id += 1;
        }

        let state_count = builder.state_count();
        let mut labels = labelled.then(|| Labels::new(LabelType::ListOfIntegers, state_count));
        for id in 1..state_count as StateId {
            let members = StateSubset::unpack(nr_states, key_of(&builder, id, "reverse")?);
            if members.iter().any(|s| fsa.is_initial(s)) {
                builder.automaton_mut().accepting_mut().include(id);
            }
            if let Some(labels) = &mut labels {
                let label = labels.add_label(LabelData::Integers(members.to_vec()));
                labels.set_label_nr(id, label)?;
            }
        }
        builder.remove_keys();

        let built = builder.automaton_mut();
        built.set_labels(labels);
        built.change_flags(Flags::BFS | Flags::ACCESSIBLE, Flags::NONE);
        if built.has_multiple_initial_states() {
            built.change_flags(Flags::MIDFA, Flags::DFA);
        }
        let built = self.finish(builder)?;
        log::debug!(
            "reverse: {} states -> {} states before minimising",
            nr_states - 1,
            built.state_count() - 1
        );
        self.minimize(&built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::fixtures::finite;

    #[test]
    fn test_reverse_reads_words_backwards() {
        let fsa = finite(2, &[&[0, 1], &[1, 1, 0]]);
        let reversed = Factory::default().reverse(&fsa, false, false).unwrap();
        assert_eq!(reversed.initial().count(), 1);
        assert!(reversed.accepts(&[1, 0]));
        assert!(reversed.accepts(&[0, 1, 1]));
        assert!(!reversed.accepts(&[0, 1]));
        assert_eq!(reversed.language_size(4), 2);
    }

    #[test]
    fn test_midfa_reverse_has_one_start_per_accepting_state() {
        let fsa = finite(2, &[&[0], &[1, 1]]);
        assert_eq!(fsa.accepting().count(), 2);
        let reversed = Factory::default().reverse(&fsa, true, false).unwrap();
        assert_eq!(reversed.initial().count(), 2);
        assert!(reversed.flags().contains(Flags::MIDFA));
        assert!(reversed.accepts(&[0]));
        assert!(reversed.accepts(&[1, 1]));
        assert!(!reversed.accepts(&[1]));
    }

    #[test]
    fn test_labelled_reverse_lists_original_states() {
        // 1 -a-> 2 -b-> 3, only 3 accepts
        let fsa = finite(2, &[&[0, 1]]);
        let reversed = Factory::default().reverse(&fsa, false, true).unwrap();
        let labels = reversed.labels().unwrap();
        assert_eq!(labels.label_type(), LabelType::ListOfIntegers);
        let start = reversed.initial().first().unwrap();
        assert_eq!(labels.state_data(start), Some(&LabelData::Integers(vec![3])));
        let end = reversed.read_word(start, &[1, 0]);
        assert!(reversed.is_accepting(end));
        assert_eq!(labels.state_data(end), Some(&LabelData::Integers(vec![1])));
    }

    #[test]
    fn test_reverse_of_empty_language() {
        let fsa = finite(2, &[]);
        let reversed = Factory::default().reverse(&fsa, false, false).unwrap();
        assert!(reversed.accepting().is_empty());
        assert_eq!(reversed.state_count(), 2);
    }
}
