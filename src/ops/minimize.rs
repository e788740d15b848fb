//! Minimisation by hash-based partition refinement.
//!
//! States start out partitioned by acceptance (and label). Every pass gives
//! each state a key made of its current class and the classes of its
//! successors; states with equal keys share a class in the next pass. Looking
//! keys up in a hash table rather than comparing states pairwise keeps each
//! pass linear. Passes stop when the number of classes stops growing.
//!
//! Two refinements keep the passes cheap on large inputs:
//!
//! - A duplicate pre-pass first collapses states whose rows are already
//!   identical. It cannot find every equivalence (all states of
//!   `[2 3 4] [3 4 2] [4 2 3] [4 2 2]` are equivalent if all accept, yet no
//!   two rows are equal) but on typical automata it removes most of the
//!   redundancy in a few rounds.
//! - A class none of whose states can still split is "decided". Its states
//!   are keyed by a constant-size key instead of their full row.

use rustc_hash::FxHashMap;

use super::trim::useful_states;
use super::Factory;
use crate::automaton::{Automaton, Flags, LabelMerger};
use crate::codec::TransitionCodec;
use crate::error::Result;
use crate::StateId;

/// How labels of merged states are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeLabels {
    /// States only merge if their labels are equal; labels are kept
    #[default]
    None,
    /// Labels of non-accepting states are ignored when partitioning; word
    /// labels of merged states are combined
    NonAccepting,
    /// Labels are ignored when partitioning; word labels of merged states
    /// are combined
    All,
}

const ATOM_1: u8 = 1;
const DECIDED_1: u8 = 2;
const CLASS_1: u8 = ATOM_1 | DECIDED_1;
const ATOM_2: u8 = 4;
const DECIDED_2: u8 = 8;
const CLASS_2: u8 = ATOM_2 | DECIDED_2;

/// Hash table assigning consecutive class numbers to byte keys.
struct ClassTable {
    map: FxHashMap<Vec<u8>, StateId>,
}

impl ClassTable {
    fn with_capacity(n: usize) -> Self {
        let mut map = FxHashMap::default();
        map.reserve(n);
        ClassTable { map }
    }

    fn clear(&mut self) {
        self.map.clear();
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns the class and whether it was new.
    fn insert(&mut self, key: &[u8]) -> (StateId, bool) {
        if let Some(&class) = self.map.get(key) {
            return (class, false);
        }
        let class = self.map.len() as StateId;
        self.map.insert(key.to_vec(), class);
        (class, true)
    }
}

fn key_target(fsa: &Automaton, classes: &[StateId], target: StateId) -> StateId {
    if target == 0 || fsa.is_valid_state(target) {
        classes[target as usize]
    } else {
        // rewrite marker
        target
    }
}

impl Factory {
    /// The minimal automaton accepting the same language with the same labels.
    pub fn minimize(&self, fsa: &Automaton) -> Result<Automaton> {
        self.minimize_with(fsa, MergeLabels::None)
    }

    /// Minimise, choosing how labels constrain and survive merging.
    pub fn minimize_with(&self, fsa: &Automaton, merge_labels: MergeLabels) -> Result<Automaton> {
        let nr_states = fsa.state_count();
        let nr_symbols = fsa.alphabet_size();
        let labelled = fsa.is_labelled();
        let mut status = self.status();
        let mut codec = TransitionCodec::new(nr_symbols + 1);
        let mut key = vec![0 as StateId; nr_symbols + 1];
        let mut row = vec![0 as StateId; nr_symbols];

        let mut trim = !fsa.flags().contains(Flags::ACCESSIBLE);
        let was_trim = fsa.flags().contains(Flags::TRIM) && !trim;
        let accept_all = fsa.accepting().is_all();
        if nr_states > self.config.force_trim_threshold && !accept_all && !was_trim {
            trim = true;
        }

        // initial partition
        let mut classes = vec![0 as StateId; nr_states];
        let trim_label: StateId;
        if !labelled || merge_labels == MergeLabels::All {
            for (s, class) in classes.iter_mut().enumerate().skip(1) {
                *class = fsa.is_accepting(s as StateId) as StateId;
            }
            trim_label = 2;
        } else {
            let mut seen: FxHashMap<(u32, bool), StateId> = FxHashMap::default();
            seen.insert((0, false), 0);
            for s in 1..nr_states {
                let id = s as StateId;
                let accepting = fsa.is_accepting(id);
                if accepting || merge_labels != MergeLabels::NonAccepting {
                    let next = seen.len() as StateId;
                    let class = *seen.entry((fsa.label_nr(id), accepting)).or_insert(next);
                    classes[s] = class;
                    if !accepting && class != 0 {
                        trim = true;
                    }
                }
            }
            trim_label = seen.len() as StateId;
        }

        let mut trim_count = nr_states;
        if trim {
            if !was_trim {
                let keep = useful_states(self, fsa)?;
                for s in 1..nr_states {
                    if !keep[s] {
                        trim_count -= 1;
                        classes[s] = 0;
                    } else if classes[s] == 0 {
                        classes[s] = trim_label;
                    }
                }
            } else {
                for class in classes.iter_mut().skip(1) {
                    if *class == 0 {
                        *class = trim_label;
                    }
                }
            }
        } else if accept_all {
            // every state accepts, so the failure state is alone in its class
            trim = true;
        }

        // duplicate pre-pass: clone[s] is the first state known to equal s
        let mut clone: Vec<StateId> = (0..nr_states)
            .map(|s| {
                if trim && classes[s] == 0 {
                    0
                } else {
                    s as StateId
                }
            })
            .collect();
        let mut previous = vec![0 as StateId; nr_states];
        let mut final_count = trim_count;
        let mut table = ClassTable::with_capacity(trim_count);
        let mut pass = 0;
        loop {
            let initial_count = final_count;
            std::mem::swap(&mut previous, &mut clone);
            table.clear();
            key.fill(0);
            clone[0] = table.insert(codec.compress(&key)).0;
            for s in 1..nr_states {
                if previous[s] != s as StateId {
                    clone[s] = clone[previous[s] as usize];
                    continue;
                }
                fsa.row(s as StateId, &mut row);
                for (k, &t) in key.iter_mut().zip(&row) {
                    *k = key_target(fsa, &previous, t);
                }
                key[nr_symbols] = classes[s];
                clone[s] = table.insert(codec.compress(&key)).0;
            }
            self.check_abort()?;

            // turn class numbers into first representatives
            let class_count = table.len();
            let mut first = Vec::with_capacity(class_count);
            for (s, &class) in clone.iter().enumerate() {
                if class as usize == first.len() {
                    first.push(s as StateId);
                    if first.len() == class_count {
                        break;
                    }
                }
            }
            for c in clone.iter_mut() {
                *c = first[*c as usize];
            }
            final_count = class_count;
            pass += 1;
            status.report(|| {
                format!(
                    "minimise pre-pass {}: {} classes from {} states",
                    pass, final_count, initial_count
                )
            });
            let reduction = initial_count.saturating_sub(final_count);
            if !(reduction > initial_count / self.config.prepass_reduction_divisor.max(1)
                && reduction >= self.config.prepass_min_reduction)
            {
                break;
            }
        }
        let trim_count = final_count;

        // refinement proper
        let flag_count = nr_states.max(trim_label as usize + 1).max(trim_count) + 1;
        let mut flags = vec![0u8; flag_count];
        let mut new_class_mask = CLASS_1;
        if trim {
            flags[0] = new_class_mask;
        }
        let mut old_classes = vec![0 as StateId; nr_states];
        let mut final_count = 0;
        let mut table = ClassTable::with_capacity(trim_count);
        let mut pass = 0;
        loop {
            let initial_count = final_count;
            let (old_class_mask, new_decided, new_atom) = if new_class_mask == CLASS_1 {
                new_class_mask = CLASS_2;
                (CLASS_1, DECIDED_2, ATOM_2)
            } else {
                new_class_mask = CLASS_1;
                (CLASS_2, DECIDED_1, ATOM_1)
            };
            std::mem::swap(&mut old_classes, &mut classes);
            table.clear();

            let decided = if flags[0] & old_class_mask == 0 {
                key.fill(0);
                table.insert(codec.compress(&key));
                0
            } else {
                table.insert(codec.key_for_decided_state(0));
                new_decided
            };
            classes[0] = 0;
            flags[0] = (flags[0] & old_class_mask) | new_atom | decided;

            for s in 1..nr_states {
                if clone[s] != s as StateId {
                    classes[s] = classes[clone[s] as usize];
                    continue;
                }
                let old = old_classes[s];
                if old == 0 && trim {
                    classes[s] = 0;
                    continue;
                }
                let mut decided = new_decided;
                let mut atom = new_atom;
                let data = if flags[old as usize] & old_class_mask == 0 {
                    fsa.row(s as StateId, &mut row);
                    key[0] = old;
                    for (k, &t) in key[1..].iter_mut().zip(&row) {
                        *k = key_target(fsa, &old_classes, t);
                        if decided != 0
                            && (t == 0 || fsa.is_valid_state(t))
                            && flags[*k as usize] & old_class_mask == 0
                        {
                            decided = 0;
                        }
                    }
                    codec.compress(&key)
                } else {
                    codec.key_for_decided_state(old)
                };
                let (class, is_new) = table.insert(data);
                if !is_new {
                    atom = 0;
                }
                classes[s] = class;
                let f = &mut flags[class as usize];
                *f = (*f & old_class_mask) | decided | atom;
            }
            self.check_abort()?;

            final_count = table.len();
            pass += 1;
            status.report(|| {
                format!(
                    "minimise pass {}: {} classes ({} states checked)",
                    pass, final_count, trim_count
                )
            });
            if final_count <= initial_count {
                break;
            }
        }
        drop(table);

        self.rebuild_minimised(fsa, &classes, final_count, merge_labels)
    }

    fn rebuild_minimised(
        &self,
        fsa: &Automaton,
        classes: &[StateId],
        class_count: usize,
        merge_labels: MergeLabels,
    ) -> Result<Automaton> {
        let nr_states = fsa.state_count();
        let nr_symbols = fsa.alphabet_size();
        let fudged = class_count <= 1;
        let final_count = if fudged { 2 } else { class_count };

        let mut result = self.new_automaton(fsa.alphabet(), nr_symbols, final_count)?;
        result.set_flags(fsa.flags());
        result.initial_mut().clear();

        if fudged {
            // empty language: a lone initial state with no transitions
            result.initial_mut().include(1);
            result.change_flags(Flags::ACCESSIBLE, Flags::MINIMISED | Flags::TRIM);
            log::debug!("minimise: empty language");
            return Ok(result);
        }

        let keep_labels = merge_labels == MergeLabels::None && fsa.is_labelled();
        let merge_words = merge_labels != MergeLabels::None
            && fsa.labels().map_or(false, |l| l.label_type().is_words());
        if keep_labels {
            if let Some(labels) = fsa.labels() {
                result.set_labels(Some(labels.renumber(&vec![0; nr_states], final_count)));
            }
        }

        let mut row = vec![0 as StateId; nr_symbols];
        let mut next = 1;
        for s in 1..nr_states {
            let id = s as StateId;
            let class = classes[s];
            if class == 0 {
                continue;
            }
            if class as usize == next {
                next += 1;
                fsa.row(id, &mut row);
                for t in row.iter_mut() {
                    if fsa.is_valid_state(*t) {
                        *t = classes[*t as usize];
                    }
                }
                result.set_transitions(class, &row)?;
                if keep_labels {
                    if let Some(labels) = result.labels_mut() {
                        labels.set_label_nr(class, fsa.label_nr(id))?;
                    }
                }
            }
            if fsa.is_accepting(id) {
                result.accepting_mut().include(class);
            }
            if fsa.is_initial(id) {
                result.initial_mut().include(class);
            }
        }

        if merge_words {
            let mut members: Vec<Vec<StateId>> = vec![Vec::new(); final_count];
            for s in 1..nr_states {
                if classes[s] != 0 {
                    members[classes[s] as usize].push(s as StateId);
                }
            }
            let mut merger = LabelMerger::new(final_count);
            for (class, states) in members.iter().enumerate().skip(1) {
                merger.start();
                for &s in states {
                    merger.include(fsa.labels().and_then(|l| l.state_data(s)));
                }
                let label = merger.finish();
                merger.set_label_nr(class as StateId, label)?;
            }
            result.set_labels(Some(merger.into_labels()));
        }

        if fsa.is_labelled() {
            result.change_flags(Flags::TRIM | Flags::ACCESSIBLE, Flags::NONE);
        } else {
            result.change_flags(Flags::MINIMISED | Flags::TRIM | Flags::ACCESSIBLE, Flags::NONE);
        }
        result.tidy();
        log::info!(
            "minimise: {} states -> {}",
            nr_states - 1,
            final_count - 1
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{LabelData, LabelType, Labels, StorageFormat};
    use crate::symbols::Alphabet;

    fn from_rows(rows: &[&[StateId]], accepting: &[StateId]) -> Automaton {
        let n = rows[0].len();
        let mut fsa = Automaton::new(Alphabet::new(n), n, rows.len() + 1, StorageFormat::Dense);
        for (i, r) in rows.iter().enumerate() {
            fsa.set_transitions(i as StateId + 1, r).unwrap();
        }
        for &s in accepting {
            fsa.accepting_mut().include(s);
        }
        fsa
    }

    #[test]
    fn test_rotating_rows_collapse_to_one_state() {
        // no two rows are equal, so only refinement can find this
        let fsa = from_rows(&[&[2, 3, 4], &[3, 4, 2], &[4, 2, 3], &[4, 2, 2]], &[1, 2, 3, 4]);
        let min = Factory::default().minimize(&fsa).unwrap();
        assert_eq!(min.state_count(), 2);
        assert_eq!(min.row_vec(1), vec![1, 1, 1]);
        assert!(min.is_accepting(1));
        assert!(min.flags().contains(Flags::MINIMISED | Flags::TRIM | Flags::ACCESSIBLE));
    }

    #[test]
    fn test_parity_automaton() {
        // states 1..4 alternate even/odd count of a's; 1 and 3 are equivalent, as are 2 and 4
        let fsa = from_rows(&[&[2, 1], &[3, 2], &[4, 3], &[1, 4]], &[1, 3]);
        let min = Factory::default().minimize(&fsa).unwrap();
        assert_eq!(min.state_count(), 3);
        assert!(min.accepts(&[0, 0, 1]));
        assert!(!min.accepts(&[0, 1]));
    }

    #[test]
    fn test_empty_language_gives_two_states() {
        let fsa = from_rows(&[&[2, 0], &[1, 0]], &[]);
        let min = Factory::default().minimize(&fsa).unwrap();
        assert_eq!(min.state_count(), 2);
        assert_eq!(min.initial().to_vec(), vec![1]);
        assert!(min.accepting().is_empty());
        assert_eq!(min.row_vec(1), vec![0, 0]);
        assert!(!min.flags().contains(Flags::MINIMISED));
    }

    #[test]
    fn test_labels_prevent_merging() {
        let mut fsa = from_rows(&[&[2, 3], &[0, 0], &[0, 0]], &[2, 3]);
        let mut labels = Labels::new(LabelType::Strings, 4);
        let x = labels.add_label(LabelData::Text("x".into()));
        let y = labels.add_label(LabelData::Text("y".into()));
        labels.set_label_nr(2, x).unwrap();
        labels.set_label_nr(3, y).unwrap();
        fsa.set_labels(Some(labels.clone()));

        let min = Factory::default().minimize(&fsa).unwrap();
        assert_eq!(min.state_count(), 4);
        assert!(!min.flags().contains(Flags::MINIMISED));
        assert_eq!(
            min.labels().and_then(|l| l.state_data(min.read_word(1, &[1]))),
            Some(&LabelData::Text("y".into()))
        );

        labels.set_label_nr(3, x).unwrap();
        fsa.set_labels(Some(labels));
        let min = Factory::default().minimize(&fsa).unwrap();
        assert_eq!(min.state_count(), 3);
    }

    #[test]
    fn test_rewrite_markers_are_kept() {
        let marker = crate::REWRITE_BASE + 5;
        let mut fsa = from_rows(&[&[2, marker], &[2, marker]], &[1, 2]);
        fsa.change_flags(Flags::RWS, Flags::NONE);
        let min = Factory::default().minimize(&fsa).unwrap();
        assert_eq!(min.state_count(), 2);
        assert_eq!(min.row_vec(1), vec![1, marker]);
    }
}
