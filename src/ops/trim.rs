//! Removal of useless states.

use super::Factory;
use crate::automaton::{Automaton, Flags};
use crate::error::Result;
use crate::StateId;

const SUCCEEDING: u8 = 1;
const ACCESSIBLE: u8 = 2;
const GOOD: u8 = SUCCEEDING | ACCESSIBLE;
const ACCESSIBLE_NOT_SET: u8 = 4;
const DYING: u8 = 8;

/// Marks the states that are reachable from an initial state and can reach
/// an accepting state.
///
/// There is no reverse index, so "can reach an accepting state" is found by
/// scanning all states repeatedly until nothing changes. A state with no
/// accepting state in reach and no successor that might still succeed is
/// marked dying and skipped by later scans.
pub(crate) fn useful_states(factory: &Factory, fsa: &Automaton) -> Result<Vec<bool>> {
    let nr_states = fsa.state_count();
    let mut flags = vec![0u8; nr_states];
    for s in 1..nr_states {
        let id = s as StateId;
        flags[s] = if fsa.is_accepting(id) {
            SUCCEEDING | ACCESSIBLE_NOT_SET
        } else {
            ACCESSIBLE_NOT_SET
        };
        if fsa.is_initial(id) {
            flags[s] |= ACCESSIBLE;
        }
    }

    let mut status = factory.status();
    let mut row = vec![0; fsa.alphabet_size()];
    let mut pass = 0;
    loop {
        pass += 1;
        let mut found_accessible = false;
        let mut found_succeeding = false;
        for s in 1..nr_states {
            if flags[s] == GOOD || flags[s] & DYING != 0 {
                continue;
            }
            let succeeding = flags[s] & SUCCEEDING != 0;
            let mut dying = !succeeding;
            let newly_accessible = flags[s] & ACCESSIBLE != 0 && flags[s] & ACCESSIBLE_NOT_SET != 0;
            if newly_accessible {
                flags[s] &= !ACCESSIBLE_NOT_SET;
            }
            if dying {
                flags[s] |= DYING;
            }
            fsa.row(s as StateId, &mut row);
            for &t in &row {
                if !fsa.is_valid_state(t) {
                    continue;
                }
                let t = t as usize;
                flags[s] |= flags[t] & SUCCEEDING;
                if dying && flags[t] & DYING == 0 {
                    dying = false;
                }
                if newly_accessible && flags[t] & ACCESSIBLE == 0 {
                    flags[t] |= ACCESSIBLE;
                    found_accessible = true;
                }
            }
            if !dying {
                flags[s] &= !DYING;
            }
            if !succeeding && flags[s] & SUCCEEDING != 0 {
                found_succeeding = true;
            }
        }
        factory.check_abort()?;
        status.report(|| format!("trim pass {} over {} states", pass, nr_states));
        if !found_accessible && !found_succeeding {
            break;
        }
    }
    Ok(flags.iter().enumerate().map(|(s, &f)| s != 0 && f == GOOD).collect())
}

impl Factory {
    /// Copy `fsa`, keeping only states with `keep[state]` set.
    ///
    /// The kept states are renumbered densely in their original order and
    /// transitions into removed states fail. Flags, labels, initial and
    /// accepting states are carried over.
    pub fn filtered_copy(&self, fsa: &Automaton, keep: &[bool]) -> Result<Automaton> {
        let nr_states = fsa.state_count();
        let mut map = vec![0 as StateId; nr_states];
        let mut final_count = 1;
        for s in 1..nr_states {
            if keep.get(s).copied().unwrap_or(false) {
                map[s] = final_count as StateId;
                final_count += 1;
            }
        }

        let mut result = self.new_automaton(fsa.alphabet(), fsa.alphabet_size(), final_count)?;
        result.set_flags(fsa.flags());
        let mut row = vec![0; fsa.alphabet_size()];
        for s in 1..nr_states {
            if map[s] == 0 {
                continue;
            }
            fsa.row(s as StateId, &mut row);
            for t in row.iter_mut() {
                if fsa.is_valid_state(*t) {
                    *t = map[*t as usize];
                }
            }
            result.set_transitions(map[s], &row)?;
        }
        *result.initial_mut() = fsa.initial().renumber(&map, final_count);
        *result.accepting_mut() = fsa.accepting().renumber(&map, final_count);
        result.set_labels(fsa.labels().map(|l| l.renumber(&map, final_count)));
        result.tidy();
        Ok(result)
    }

    /// A copy of `fsa` using this factory's storage settings.
    pub fn copy(&self, fsa: &Automaton) -> Result<Automaton> {
        let keep = vec![true; fsa.state_count()];
        self.filtered_copy(fsa, &keep)
    }

    /// Remove states that are unreachable or cannot reach an accepting state.
    pub fn trim(&self, fsa: &Automaton) -> Result<Automaton> {
        let keep = useful_states(self, fsa)?;
        let mut result = self.filtered_copy(fsa, &keep)?;
        result.change_flags(Flags::TRIM | Flags::ACCESSIBLE, Flags::NONE);
        log::debug!(
            "trim: {} states -> {}",
            fsa.state_count() - 1,
            result.state_count() - 1
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::StorageFormat;
    use crate::symbols::Alphabet;

    #[test]
    fn test_trim_removes_dead_and_unreachable_states() {
        // 1 -a-> 2 (accepting), 1 -b-> 3 (dead end), 4 unreachable, 5 loops forever
        let mut fsa = Automaton::new(Alphabet::new(2), 2, 6, StorageFormat::Dense);
        fsa.set_transitions(1, &[2, 3]).unwrap();
        fsa.set_transitions(2, &[5, 0]).unwrap();
        fsa.set_transitions(4, &[2, 2]).unwrap();
        fsa.set_transitions(5, &[5, 5]).unwrap();
        fsa.accepting_mut().include(2);
        fsa.accepting_mut().include(4);

        let trimmed = Factory::default().trim(&fsa).unwrap();
        assert_eq!(trimmed.state_count(), 3);
        assert_eq!(trimmed.row_vec(1), vec![2, 0]);
        assert_eq!(trimmed.row_vec(2), vec![0, 0]);
        assert!(trimmed.flags().contains(Flags::TRIM));
        assert!(trimmed.accepts(&[0]));
    }

    #[test]
    fn test_trim_of_empty_language() {
        let mut fsa = Automaton::new(Alphabet::new(1), 1, 3, StorageFormat::Dense);
        fsa.set_transitions(1, &[2]).unwrap();
        fsa.set_transitions(2, &[1]).unwrap();
        let trimmed = Factory::default().trim(&fsa).unwrap();
        assert_eq!(trimmed.state_count(), 1);
        assert!(trimmed.initial().is_empty());
    }

    #[test]
    fn test_filtered_copy_keeps_rewrite_markers() {
        let mut fsa = Automaton::new(Alphabet::new(2), 2, 3, StorageFormat::Sparse);
        fsa.set_transitions(1, &[2, crate::REWRITE_BASE + 1]).unwrap();
        fsa.set_transitions(2, &[1, 1]).unwrap();
        let copy = Factory::default().copy(&fsa).unwrap();
        assert_eq!(copy.row_vec(1), vec![2, crate::REWRITE_BASE + 1]);
    }
}
