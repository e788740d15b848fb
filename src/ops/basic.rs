//! Small fixed automata and state merging.

use super::Factory;
use crate::automaton::{Automaton, Flags};
use crate::error::{FsaError, Result};
use crate::symbols::{Alphabet, SymbolSpace};
use crate::StateId;

impl Factory {
    /// The two state automaton accepting every word over `alphabet`.
    pub fn universal(&self, alphabet: &Alphabet) -> Result<Automaton> {
        let letters = alphabet.letter_count();
        let mut fsa = self.new_automaton(alphabet, letters, 2)?;
        fsa.set_transitions(1, &vec![1; letters])?;
        fsa.accepting_mut().include(1);
        fsa.change_flags(
            Flags::MINIMISED | Flags::TRIM | Flags::ACCESSIBLE | Flags::BFS,
            Flags::NONE,
        );
        Ok(fsa)
    }

    /// The automaton accepting every word of length at most `max_length`.
    ///
    /// State `i` has read `i - 1` letters, so there are `max_length + 2`
    /// states including the failure state, all of them accepting.
    pub fn all_words(&self, alphabet: &Alphabet, max_length: i64) -> Result<Automaton> {
        if max_length < 0 {
            return Err(FsaError::InvalidLength(max_length));
        }
        let letters = alphabet.letter_count();
        let nr_states = max_length as usize + 2;
        let mut fsa = self.new_automaton(alphabet, letters, nr_states)?;
        for s in 1..nr_states - 1 {
            fsa.set_transitions(s as StateId, &vec![s as StateId + 1; letters])?;
        }
        fsa.accepting_mut().set_all();
        fsa.change_flags(
            Flags::BFS | Flags::MINIMISED | Flags::DFA | Flags::TRIM | Flags::ACCESSIBLE,
            Flags::NONE,
        );
        Ok(fsa)
    }

    /// Merge the states of `fsa` that share a number in `new_numbers`.
    ///
    /// `new_numbers[s]` is the state that `s` becomes; 0 drops the state.
    /// The used numbers must run densely from 0. Merged states must agree on
    /// their labels and on every transition both of them define. The result
    /// is not minimised.
    pub fn merge(&self, fsa: &Automaton, new_numbers: &[StateId]) -> Result<Automaton> {
        let nr_states = fsa.state_count();
        if new_numbers.len() != nr_states {
            return Err(FsaError::InvalidPermutation(format!(
                "expected {} entries, got {}",
                nr_states,
                new_numbers.len()
            )));
        }
        let mut used = vec![false; nr_states];
        for &n in new_numbers {
            match used.get_mut(n as usize) {
                Some(slot) => *slot = true,
                None => {
                    return Err(FsaError::InvalidPermutation(format!(
                        "state number {} is out of range",
                        n
                    )))
                }
            }
        }
        let new_count = used.iter().take_while(|&&u| u).count();
        if new_count == 0 || used[new_count..].iter().any(|&u| u) {
            return Err(FsaError::InvalidPermutation(
                "state numbers are not dense from 0".to_string(),
            ));
        }

        let nr_symbols = fsa.alphabet_size();
        let mut merged = self.new_automaton(fsa.alphabet(), nr_symbols, new_count)?;
        merged.set_flags(fsa.flags());
        merged.change_flags(Flags::NONE, Flags::BFS | Flags::MINIMISED);
        merged.initial_mut().clear();
        merged.set_labels(fsa.labels().map(|l| l.renumber(&[], new_count)));

        let mut status = self.status();
        let mut row = vec![0 as StateId; nr_symbols];
        for s in 1..nr_states {
            let id = s as StateId;
            let state = new_numbers[s];
            if state == 0 {
                continue;
            }
            self.check_abort()?;
            let label = fsa.label_nr(id);
            if label != 0 {
                if let Some(labels) = merged.labels_mut() {
                    let current = labels.label_nr(state);
                    if current != 0 && current != label {
                        return Err(FsaError::MergeConflict { state, what: "label" });
                    }
                    labels.set_label_nr(state, label)?;
                }
            }

            fsa.row(id, &mut row);
            {
                let mut target = merged.row_mut(state)?;
                for (cell, &t) in target.iter_mut().zip(&row) {
                    let t = if fsa.is_valid_state(t) { new_numbers[t as usize] } else { t };
                    if *cell != 0 && t != 0 && *cell != t {
                        return Err(FsaError::MergeConflict {
                            state,
                            what: "transition",
                        });
                    }
                    if t != 0 {
                        *cell = t;
                    }
                }
            }
            if fsa.is_accepting(id) {
                merged.accepting_mut().include(state);
            }
            if fsa.is_initial(id) {
                merged.initial_mut().include(state);
            }
            status.report(|| format!("merge: state {} of {}", s, nr_states - 1));
        }
        merged.tidy();
        log::debug!("merge: {} states -> {}", nr_states - 1, new_count - 1);
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{LabelData, LabelType, Labels, StorageFormat};

    #[test]
    fn test_all_words_up_to_length_two() {
        let fsa = Factory::default().all_words(&Alphabet::new(2), 2).unwrap();
        assert_eq!(fsa.state_count(), 4);
        assert_eq!(fsa.alphabet_size(), 2);
        assert_eq!(fsa.accepting().count(), 3);
        assert!(fsa
            .flags()
            .contains(Flags::MINIMISED | Flags::TRIM | Flags::ACCESSIBLE | Flags::BFS));
        assert_eq!(fsa.language_size(5), 7);
        assert!(fsa.accepts(&[1, 0]));
        assert!(!fsa.accepts(&[1, 0, 0]));
    }

    #[test]
    fn test_all_words_rejects_negative_length() {
        let err = Factory::default().all_words(&Alphabet::new(2), -1).unwrap_err();
        assert!(matches!(err, FsaError::InvalidLength(-1)));
        assert!(err.is_precondition());
    }

    #[test]
    fn test_universal_accepts_everything() {
        let fsa = Factory::default().universal(&Alphabet::new(3)).unwrap();
        assert_eq!(fsa.state_count(), 2);
        assert!(fsa.accepts(&[]));
        assert!(fsa.accepts(&[2, 0, 1, 1]));
    }

    #[test]
    fn test_merge_combines_states() {
        // 1 -a-> 2, 1 -b-> 3, both accepting dead ends
        let mut fsa = Automaton::new(Alphabet::new(2), 2, 4, StorageFormat::Dense);
        fsa.set_transitions(1, &[2, 3]).unwrap();
        fsa.accepting_mut().include(2);
        fsa.accepting_mut().include(3);
        let merged = Factory::default().merge(&fsa, &[0, 1, 2, 2]).unwrap();
        assert_eq!(merged.state_count(), 3);
        assert_eq!(merged.row_vec(1), vec![2, 2]);
        assert!(merged.is_accepting(2));
        assert!(merged.is_initial(1));
        assert!(!merged.flags().contains(Flags::MINIMISED));
    }

    #[test]
    fn test_merge_conflicts() {
        let mut fsa = Automaton::new(Alphabet::new(1), 1, 4, StorageFormat::Dense);
        fsa.set_transitions(1, &[2]).unwrap();
        fsa.set_transitions(2, &[3]).unwrap();
        let factory = Factory::default();
        let err = factory.merge(&fsa, &[0, 1, 1, 2]).unwrap_err();
        assert!(matches!(err, FsaError::MergeConflict { what: "transition", .. }));

        let mut labels = Labels::new(LabelType::Strings, 4);
        let x = labels.add_label(LabelData::Text("x".into()));
        let y = labels.add_label(LabelData::Text("y".into()));
        labels.set_label_nr(2, x).unwrap();
        labels.set_label_nr(3, y).unwrap();
        fsa.set_labels(Some(labels));
        let err = factory.merge(&fsa, &[0, 1, 2, 2]).unwrap_err();
        assert!(matches!(err, FsaError::MergeConflict { what: "label", .. }));
    }

    #[test]
    fn test_merge_rejects_sparse_numbering() {
        let fsa = Automaton::new(Alphabet::new(1), 1, 3, StorageFormat::Dense);
        let factory = Factory::default();
        assert!(factory.merge(&fsa, &[0, 1, 3]).is_err());
        assert!(factory.merge(&fsa, &[0, 2, 2]).is_err());
        assert!(factory.merge(&fsa, &[0, 1]).is_err());
    }
}
