// Property-based tests for the automaton algorithms.
//
// Every property compares an algorithm's result against a brute force
// oracle: the input automata are run over every word up to a small length
// and the expected language is computed with plain set operations.

mod common;

use std::collections::{BTreeSet, VecDeque};

use common::{all_words, arb_dfa, arb_dfa_pair, arb_midfa, language, splits_into};
use fsakit::prelude::*;
use proptest::prelude::*;

const MAX_LEN: usize = 4;

fn reachable_and_useful(fsa: &Automaton) -> bool {
    let n = fsa.state_count();
    let mut forward = vec![false; n];
    let mut queue: VecDeque<StateId> = fsa.initial().iter().collect();
    for s in fsa.initial().iter() {
        forward[s as usize] = true;
    }
    while let Some(s) = queue.pop_front() {
        for t in fsa.row_vec(s) {
            if fsa.is_valid_state(t) && !forward[t as usize] {
                forward[t as usize] = true;
                queue.push_back(t);
            }
        }
    }
    let mut backward = vec![false; n];
    for s in fsa.accepting().iter() {
        backward[s as usize] = true;
    }
    let mut changed = true;
    while changed {
        changed = false;
        for s in 1..n as StateId {
            if !backward[s as usize]
                && fsa
                    .row_vec(s)
                    .iter()
                    .any(|&t| fsa.is_valid_state(t) && backward[t as usize])
            {
                backward[s as usize] = true;
                changed = true;
            }
        }
    }
    (1..n).all(|s| forward[s] && backward[s])
}

// ============================================================================
// MINIMISE AND TRIM
// ============================================================================

proptest! {
    #[test]
    fn minimize_preserves_language(fsa in arb_dfa()) {
        let minimal = Factory::default().minimize(&fsa).unwrap();
        prop_assert_eq!(language(&minimal, MAX_LEN), language(&fsa, MAX_LEN));
        prop_assert!(minimal.state_count() <= fsa.state_count().max(2));
    }

    #[test]
    fn minimize_is_idempotent(fsa in arb_dfa()) {
        let factory = Factory::default();
        let once = factory.minimize(&fsa).unwrap();
        let twice = factory.minimize(&once).unwrap();
        prop_assert_eq!(twice.state_count(), once.state_count());
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn minimize_ignores_storage(fsa in arb_dfa()) {
        let mut sparse = fsa.clone();
        sparse.set_storage(StorageFormat::Sparse, 0);
        let factory = Factory::default();
        prop_assert_eq!(factory.minimize(&sparse).unwrap(), factory.minimize(&fsa).unwrap());
    }

    #[test]
    fn trim_preserves_language(fsa in arb_dfa()) {
        let trimmed = Factory::default().trim(&fsa).unwrap();
        prop_assert_eq!(language(&trimmed, MAX_LEN), language(&fsa, MAX_LEN));
    }

    #[test]
    fn trim_reaches_a_fixpoint(fsa in arb_dfa()) {
        let factory = Factory::default();
        let once = factory.trim(&fsa).unwrap();
        let twice = factory.trim(&once).unwrap();
        prop_assert_eq!(&twice, &once);
        prop_assert!(reachable_and_useful(&once));
        prop_assert!(once.flags().contains(Flags::TRIM | Flags::ACCESSIBLE));
    }
}

// ============================================================================
// DETERMINISE
// ============================================================================

proptest! {
    #[test]
    fn determinize_preserves_language(fsa in arb_midfa()) {
        let dfa = Factory::default().determinize(&fsa).unwrap();
        prop_assert!(dfa.initial().count() <= 1);
        prop_assert_eq!(language(&dfa, MAX_LEN), language(&fsa, MAX_LEN));
    }

    #[test]
    fn determinize_single_initial_is_minimize(fsa in arb_dfa()) {
        let factory = Factory::default();
        prop_assert_eq!(factory.determinize(&fsa).unwrap(), factory.minimize(&fsa).unwrap());
    }
}

// ============================================================================
// BOOLEAN ALGEBRA
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn union_intersection_and_difference((a, b) in arb_dfa_pair()) {
        let factory = Factory::default();
        let la = language(&a, MAX_LEN);
        let lb = language(&b, MAX_LEN);

        let union = factory.or(&a, &b).unwrap();
        let expected: BTreeSet<_> = la.union(&lb).cloned().collect();
        prop_assert_eq!(language(&union, MAX_LEN), expected);

        let both = factory.and(&a, &b).unwrap();
        let expected: BTreeSet<_> = la.intersection(&lb).cloned().collect();
        prop_assert_eq!(language(&both, MAX_LEN), expected);

        let only_a = factory.and_not(&a, &b).unwrap();
        let expected: BTreeSet<_> = la.difference(&lb).cloned().collect();
        prop_assert_eq!(language(&only_a, MAX_LEN), expected);

        let only_b = factory.binop(&a, &b, BinopKind::NotAnd).unwrap();
        let expected: BTreeSet<_> = lb.difference(&la).cloned().collect();
        prop_assert_eq!(language(&only_b, MAX_LEN), expected);
    }

    #[test]
    fn complement_swaps_accepted_and_rejected(fsa in arb_dfa()) {
        let rejected = Factory::default().complement(&fsa, false).unwrap();
        for word in all_words(fsa.alphabet_size(), MAX_LEN) {
            prop_assert_ne!(rejected.accepts(&word), fsa.accepts(&word), "word {:?}", word);
        }
    }

    #[test]
    fn de_morgan((a, b) in arb_dfa_pair()) {
        let factory = Factory::default();
        let both = factory.and(&a, &b).unwrap();
        let not_a = factory.complement(&a, false).unwrap();
        let not_b = factory.complement(&b, false).unwrap();
        let either_not = factory.or(&not_a, &not_b).unwrap();
        let via_complements = factory.complement(&either_not, false).unwrap();
        prop_assert_eq!(language(&via_complements, MAX_LEN), language(&both, MAX_LEN));
    }

    #[test]
    fn self_difference_is_empty(fsa in arb_dfa()) {
        let empty = Factory::default().and_not(&fsa, &fsa).unwrap();
        prop_assert_eq!(empty.state_count(), 2);
        prop_assert!(empty.accepting().is_empty());
    }
}

// ============================================================================
// REVERSE, STAR AND CONCATENATION
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn reverse_reads_backwards(fsa in arb_dfa()) {
        let reversed = Factory::default().reverse(&fsa, false, false).unwrap();
        let expected: BTreeSet<Vec<Symbol>> = language(&fsa, MAX_LEN)
            .into_iter()
            .map(|w| w.into_iter().rev().collect())
            .collect();
        prop_assert_eq!(language(&reversed, MAX_LEN), expected);
    }

    #[test]
    fn star_accepts_sequences_of_words(fsa in arb_dfa()) {
        let starred = Factory::default().star(&fsa).unwrap();
        for word in all_words(fsa.alphabet_size(), MAX_LEN) {
            let expected = splits_into(&word, |piece| fsa.accepts(piece));
            prop_assert_eq!(starred.accepts(&word), expected, "word {:?}", word);
        }
    }

    #[test]
    fn concat_accepts_split_words((a, b) in arb_dfa_pair()) {
        let both = Factory::default().concat(&a, &b).unwrap();
        for word in all_words(a.alphabet_size(), MAX_LEN) {
            let expected = (0..=word.len()).any(|i| a.accepts(&word[..i]) && b.accepts(&word[i..]));
            prop_assert_eq!(both.accepts(&word), expected, "word {:?}", word);
        }
    }
}
