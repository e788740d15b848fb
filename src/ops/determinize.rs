//! Subset construction for automata with several initial states.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use super::minimize::MergeLabels;
use super::trim::useful_states;
use super::{key_of, Factory};
use crate::automaton::{Automaton, Flags, LabelMerger, Word};
use crate::codec::packer::{pack_state_list, unpack_state_list};
use crate::error::Result;
use crate::StateId;

/// Which initial states of a MIDFA are merged into one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeterminizePolicy {
    /// A single initial state: the result is a DFA
    #[default]
    All,
    /// Only initial states with the same label are merged
    Identical,
    /// Initial states are merged while their word labels share a word
    Equal,
}

/// Partition `pending` into groups whose label word sets overlap, closing
/// each group transitively.
fn overlapping_groups(fsa: &Automaton, mut pending: Vec<StateId>) -> Vec<Vec<StateId>> {
    let words_of = |s: StateId| -> Vec<Word> { fsa.labels().map(|l| l.state_words(s)).unwrap_or_default() };
    let mut groups = Vec::new();
    while !pending.is_empty() {
        let first = pending.remove(0);
        let mut words: FxHashSet<Word> = words_of(first).into_iter().collect();
        let mut group = vec![first];
        let mut changed = true;
        while changed {
            changed = false;
            let mut i = 0;
            while i < pending.len() {
                let other = words_of(pending[i]);
                if other.iter().any(|w| words.contains(w)) {
                    words.extend(other);
                    group.push(pending.remove(i));
                    changed = true;
                } else {
                    i += 1;
                }
            }
        }
        group.sort_unstable();
        groups.push(group);
    }
    groups
}

impl Factory {
    /// A DFA accepting the same language as `fsa`.
    pub fn determinize(&self, fsa: &Automaton) -> Result<Automaton> {
        self.determinize_with(fsa, DeterminizePolicy::All, false)
    }

    /// Subset construction with a choice of which initial states to merge.
    ///
    /// With `merge_labels` and word labels, each result state is labelled
    /// with the union of the words of its members. Without word labels,
    /// `merge_labels` is ignored and [`DeterminizePolicy::Equal`] falls back
    /// to [`DeterminizePolicy::Identical`].
    pub fn determinize_with(
        &self,
        fsa: &Automaton,
        policy: DeterminizePolicy,
        merge_labels: bool,
    ) -> Result<Automaton> {
        if fsa.initial().count() == 1 && fsa.initial().first() == Some(1) {
            return self.minimize(fsa);
        }
        let nr_states = fsa.state_count();
        let nr_symbols = fsa.alphabet_size();

        let mut policy = policy;
        if fsa.label_count() == 1 {
            policy = DeterminizePolicy::All;
        }
        let mut merge = merge_labels;
        if merge && !fsa.labels().map_or(false, |l| l.label_type().is_words()) {
            merge = false;
            if policy == DeterminizePolicy::Equal {
                policy = DeterminizePolicy::Identical;
            }
        }

        let keep = if fsa.flags().contains(Flags::TRIM) {
            vec![true; nr_states]
        } else {
            useful_states(self, fsa)?
        };
        let initial: Vec<StateId> = fsa.initial().iter().filter(|&s| keep[s as usize]).collect();
        let groups = match policy {
            DeterminizePolicy::All => vec![initial],
            DeterminizePolicy::Identical => {
                let mut by_label: BTreeMap<u32, Vec<StateId>> = BTreeMap::new();
                for s in initial {
                    by_label.entry(fsa.label_nr(s)).or_default().push(s);
                }
                by_label.into_values().collect()
            }
            DeterminizePolicy::Equal => overlapping_groups(fsa, initial),
        };

        let mut builder = self.builder(fsa.alphabet(), nr_symbols);
        let mut key = Vec::new();
        builder.find_state(&key)?;
        for group in &groups {
            key.clear();
            pack_state_list(group, &mut key);
            let id = builder.find_state(&key)?;
            if id != 0 {
                builder.automaton_mut().initial_mut().include(id);
            }
        }

        let mut status = self.status();
        let mut row = vec![0 as StateId; nr_symbols];
        let mut targets = Vec::new();
        let mut id: StateId = 1;
        while (id as usize) < builder.state_count() {
            self.check_abort()?;
            let members = unpack_state_list(key_of(&builder, id, "determinize")?);
            for (symbol, cell) in row.iter_mut().enumerate() {
                targets.clear();
                for &s in &members {
                    let t = fsa.new_state(s, symbol);
                    if fsa.is_valid_state(t) && keep[t as usize] {
                        targets.push(t);
                    }
                }
                targets.sort_unstable();
                targets.dedup();
                key.clear();
                pack_state_list(&targets, &mut key);
                *cell = builder.find_state(&key)?;
            }
            builder.set_transitions(id, &row)?;
            let count = builder.state_count();
            status.report(|| format!("determinise: {} of {} states built", id, count - 1));
            id += 1;
        }

        let state_count = builder.state_count();
        let mut merger = merge.then(|| LabelMerger::new(state_count));
        let mut labels = if !merge && policy == DeterminizePolicy::Identical {
            fsa.labels().map(|l| l.renumber(&[], state_count))
        } else {
            None
        };
        for id in 1..state_count as StateId {
            let members = unpack_state_list(key_of(&builder, id, "determinize")?);
            if let Some(m) = &mut merger {
                m.start();
            }
            let mut accepting = false;
            for &s in &members {
                let label = fsa.label_nr(s);
                if label != 0 {
                    if let Some(m) = &mut merger {
                        m.include(fsa.labels().and_then(|l| l.label_data(label)));
                    } else if let Some(l) = &mut labels {
                        l.set_label_nr(id, label)?;
                    }
                }
                accepting |= fsa.is_accepting(s);
            }
            if accepting {
                builder.automaton_mut().accepting_mut().include(id);
            }
            if let Some(m) = &mut merger {
                let label = m.finish();
                m.set_label_nr(id, label)?;
            }
        }
        builder.remove_keys();
        if let Some(m) = merger {
            labels = Some(m.into_labels());
        }
        let built = builder.automaton_mut();
        built.set_labels(labels);
        built.change_flags(Flags::BFS | Flags::ACCESSIBLE | Flags::TRIM, Flags::NONE);
        let built = self.finish(builder)?;
        log::info!(
            "determinise: {} states, {} initial -> {} states",
            nr_states - 1,
            fsa.initial().count(),
            built.state_count() - 1
        );

        let merge_mode = if merge && policy != DeterminizePolicy::All {
            MergeLabels::NonAccepting
        } else {
            MergeLabels::None
        };
        self.minimize_with(&built, merge_mode)
    }
}
