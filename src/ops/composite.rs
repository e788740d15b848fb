//! Relational composition of two product automata.
//!
//! If `fsa_0` relates `u` to `w` and `fsa_1` relates `w` to `v`, the
//! composite relates `u` to `v`. A state of the result is the set of all
//! `(state_0, state_1)` pairs reachable for some middle word `w`, so its key
//! is a [`StatePairList`] of unbounded length.
//!
//! Once the middle word is padding, a pair can be asked to read a
//! `(padding, padding)` letter that does not exist. It then stays where it
//! is if accepting. The key therefore remembers which outer side has started
//! padding, so that letters cannot follow padding on that side.

use super::{check_product, check_same_alphabet, key_of, step, DeterminizePolicy, Factory};
use crate::automaton::{Automaton, Flags, LabelMerger, Word};
use crate::codec::pair_list::{Padding, StatePairList};
use crate::error::Result;
use crate::symbols::SymbolSpace;
use crate::StateId;

/// Concatenated label words of a pair. Words whose first letters disagree
/// on being a generator are not combined.
fn pair_label_words(fsa_0: &Automaton, fsa_1: &Automaton, p0: StateId, p1: StateId, letters: usize) -> Vec<Word> {
    let words_0 = fsa_0.labels().map(|l| l.state_words(p0)).unwrap_or_default();
    let words_1 = fsa_1.labels().map(|l| l.state_words(p1)).unwrap_or_default();
    let mut out = Vec::with_capacity(words_0.len() * words_1.len());
    for w0 in &words_0 {
        for w1 in &words_1 {
            if let (Some(&a), Some(&b)) = (w0.first(), w1.first()) {
                if ((a as usize) < letters) != ((b as usize) < letters) {
                    continue;
                }
            }
            let mut word = w0.clone();
            word.extend_from_slice(w1);
            out.push(word);
        }
    }
    out
}

/// True if any label word of `fsa` uses a letter beyond the base alphabet,
/// as the coset symbol of a coset multiplier does.
fn labels_extend_alphabet(fsa: &Automaton, letters: usize) -> bool {
    fsa.labels().map_or(false, |labels| {
        (1..labels.label_count() as u32)
            .filter_map(|l| labels.label_data(l))
            .flat_map(|data| data.word_list())
            .flatten()
            .any(|g| g as usize >= letters)
    })
}

/// Whether the composite must be determinised rather than minimised:
/// either operand has several initial states, or it is a labelled
/// multiplier whose labels are written over a larger alphabet.
fn is_coset_multiplier(fsa_0: &Automaton, fsa_1: &Automaton, labelled_multiplier: bool, letters: usize) -> bool {
    (labelled_multiplier && labels_extend_alphabet(fsa_0, letters))
        || fsa_0.has_multiple_initial_states()
        || fsa_1.has_multiple_initial_states()
}

impl Factory {
    /// The product automaton accepting `(u, v)` when some `w` has `fsa_0`
    /// accepting `(u, w)` and `fsa_1` accepting `(w, v)`.
    ///
    /// With `labelled_multiplier` every pair of initial states starts its own
    /// initial state, and the initial and accepting states are labelled with
    /// the concatenations of the operands' label words. If either operand has
    /// several initial states, or `fsa_0` is a labelled multiplier whose
    /// label words use letters beyond the base alphabet, the result is
    /// determinised, merging initial states whose labels share a word.
    pub fn composite(&self, fsa_0: &Automaton, fsa_1: &Automaton, labelled_multiplier: bool) -> Result<Automaton> {
        check_same_alphabet(fsa_0, fsa_1)?;
        check_product(fsa_0, "composite")?;
        check_product(fsa_1, "composite")?;
        let alphabet = fsa_0.alphabet();
        let letters = alphabet.letter_count();
        let pad = alphabet.padding_symbol();
        let nr_transitions = alphabet.product_alphabet_size();
        let coset = is_coset_multiplier(fsa_0, fsa_1, labelled_multiplier, letters);

        let mut builder = self.builder(alphabet, nr_transitions);
        let mut key = Vec::new();
        builder.find_state(&key)?;
        let mut pairs = StatePairList::new();
        for p0 in fsa_0.initial().iter() {
            for p1 in fsa_1.initial().iter() {
                pairs.insert(p0, p1);
                if labelled_multiplier {
                    pairs.pack(&mut key);
                    let id = builder.find_state(&key)?;
                    builder.automaton_mut().initial_mut().include(id);
                    pairs.clear();
                }
            }
        }
        if !labelled_multiplier {
            pairs.pack(&mut key);
            let id = builder.find_state(&key)?;
            if id != 0 {
                builder.automaton_mut().initial_mut().include(id);
            }
        }
        let initial_end = builder.state_count() as StateId;

        let mut status = self.status();
        let mut row = vec![0 as StateId; nr_transitions];
        let mut next = StatePairList::new();
        let mut id: StateId = 1;
        while (id as usize) < builder.state_count() {
            self.check_abort()?;
            let current = StatePairList::unpack(key_of(&builder, id, "composite")?);
            row.fill(0);
            let g1_start = if current.is_left_padded() { pad } else { 0 };
            let g2_start = if current.is_right_padded() { pad } else { 0 };
            for g1 in g1_start..=pad {
                for g2 in g2_start..=pad {
                    let ti = alphabet.product_id(g1, g2);
                    if ti >= nr_transitions {
                        continue;
                    }
                    next.clear();
                    for (p0, p1) in current.iter() {
                        for m in 0..letters {
                            let t0 = step(fsa_0, p0, alphabet.product_id(g1, m));
                            if t0 == 0 {
                                continue;
                            }
                            let t1 = step(fsa_1, p1, alphabet.product_id(m, g2));
                            if t1 != 0 {
                                next.insert(t0, t1);
                            }
                        }
                        // middle word already ended
                        let t0 = if g1 == pad {
                            if fsa_0.is_accepting(p0) {
                                p0
                            } else {
                                0
                            }
                        } else {
                            step(fsa_0, p0, alphabet.product_id(g1, pad))
                        };
                        if t0 == 0 {
                            continue;
                        }
                        let t1 = if g2 == pad {
                            if fsa_1.is_accepting(p1) {
                                p1
                            } else {
                                0
                            }
                        } else {
                            step(fsa_1, p1, alphabet.product_id(pad, g2))
                        };
                        if t1 != 0 {
                            next.insert(t0, t1);
                        }
                    }
                    next.set_padding(if g1 == pad {
                        Padding::Left
                    } else if g2 == pad {
                        Padding::Right
                    } else {
                        Padding::None
                    });
                    next.pack(&mut key);
                    row[ti] = builder.find_state(&key)?;
                }
            }
            builder.set_transitions(id, &row)?;
            let count = builder.state_count();
            status.report(|| format!("composite: state {} of {} ({} pairs)", id, count - 1, current.len()));
            id += 1;
        }

        // A state accepts if some pair accepts after both outer words have
        // ended and the middle word has run on.
        let state_count = builder.state_count();
        let mut merger = labelled_multiplier.then(|| LabelMerger::new(state_count));
        for id in 1..state_count as StateId {
            let start = StatePairList::unpack(key_of(&builder, id, "composite")?);
            let is_initial = id < initial_end;
            let mut seen = start.clone();
            let mut frontier: Vec<(StateId, StateId)> = start.iter().collect();
            let mut accepted = false;
            if let Some(m) = &mut merger {
                m.start();
            }
            while !frontier.is_empty() {
                for &(p0, p1) in &frontier {
                    let accepting_pair = fsa_0.is_accepting(p0) && fsa_1.is_accepting(p1);
                    accepted |= accepting_pair;
                    if let Some(m) = &mut merger {
                        let initial_pair = is_initial && fsa_0.is_initial(p0) && fsa_1.is_initial(p1);
                        if initial_pair || accepting_pair {
                            m.include_words(pair_label_words(fsa_0, fsa_1, p0, p1, letters));
                        }
                    }
                }
                if accepted && merger.is_none() {
                    break;
                }
                let mut grown = Vec::new();
                for &(p0, p1) in &frontier {
                    for m in 0..letters {
                        let t0 = step(fsa_0, p0, alphabet.product_id(pad, m));
                        if t0 == 0 {
                            continue;
                        }
                        let t1 = step(fsa_1, p1, alphabet.product_id(m, pad));
                        if t1 != 0 && seen.insert(t0, t1) {
                            grown.push((t0, t1));
                        }
                    }
                }
                frontier = grown;
            }
            if accepted {
                builder.automaton_mut().accepting_mut().include(id);
            }
            if let Some(m) = &mut merger {
                if accepted || is_initial {
                    let label = m.finish();
                    m.set_label_nr(id, label)?;
                }
            }
        }
        builder.remove_keys();

        let built = builder.automaton_mut();
        if let Some(m) = merger {
            built.set_labels(Some(m.into_labels()));
        }
        built.change_flags(Flags::BFS | Flags::ACCESSIBLE, Flags::NONE);
        if built.has_multiple_initial_states() {
            built.change_flags(Flags::MIDFA, Flags::DFA);
        }
        let built = self.finish(builder)?;
        log::info!(
            "composite: {} x {} states -> {} states",
            fsa_0.state_count() - 1,
            fsa_1.state_count() - 1,
            built.state_count() - 1
        );
        if coset {
            self.determinize_with(&built, DeterminizePolicy::Equal, true)
        } else {
            self.minimize(&built)
        }
    }
}
