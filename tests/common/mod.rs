//! Shared generators and language oracles for the integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;

use fsakit::prelude::*;
use proptest::prelude::*;

/// A random automaton description: letter count, one row per state and
/// the accepting flags. Targets may be 0 (failure).
#[derive(Debug, Clone)]
pub struct Shape {
    pub letters: usize,
    pub rows: Vec<Vec<StateId>>,
    pub accepting: Vec<bool>,
}

/// Random shapes with 1 to 3 letters and 1 to 6 states.
pub fn arb_shape() -> impl Strategy<Value = Shape> {
    (1usize..=3, 1usize..=6).prop_flat_map(|(letters, states)| {
        let row = prop::collection::vec(0..=states as StateId, letters);
        (
            Just(letters),
            prop::collection::vec(row, states),
            prop::collection::vec(any::<bool>(), states),
        )
            .prop_map(|(letters, rows, accepting)| Shape {
                letters,
                rows,
                accepting,
            })
    })
}

/// Build the automaton described by `shape`, with `{1}` as initial set.
pub fn build(shape: &Shape, format: StorageFormat) -> Automaton {
    let mut fsa = Automaton::new(
        Alphabet::new(shape.letters),
        shape.letters,
        shape.rows.len() + 1,
        format,
    );
    for (i, row) in shape.rows.iter().enumerate() {
        fsa.set_transitions(i as StateId + 1, row).unwrap();
    }
    for (i, &accepts) in shape.accepting.iter().enumerate() {
        if accepts {
            fsa.accepting_mut().include(i as StateId + 1);
        }
    }
    fsa
}

/// Random DFAs.
pub fn arb_dfa() -> impl Strategy<Value = Automaton> {
    arb_shape().prop_map(|shape| build(&shape, StorageFormat::Default))
}

/// Pairs of random DFAs over the same alphabet.
pub fn arb_dfa_pair() -> impl Strategy<Value = (Automaton, Automaton)> {
    (arb_shape(), arb_shape()).prop_map(|(a, mut b)| {
        // force b onto a's alphabet
        b.rows = b
            .rows
            .iter()
            .map(|row| (0..a.letters).map(|g| row.get(g).copied().unwrap_or(0)).collect())
            .collect();
        b.letters = a.letters;
        (build(&a, StorageFormat::Default), build(&b, StorageFormat::Sparse))
    })
}

/// Random automata with several initial states, always including state 1.
pub fn arb_midfa() -> impl Strategy<Value = Automaton> {
    arb_shape().prop_flat_map(|shape| {
        let n = shape.rows.len();
        (Just(shape), prop::collection::vec(any::<bool>(), n)).prop_map(|(shape, initial)| {
            let mut fsa = build(&shape, StorageFormat::Default);
            for (i, &init) in initial.iter().enumerate() {
                if init {
                    fsa.initial_mut().include(i as StateId + 1);
                }
            }
            if fsa.has_multiple_initial_states() {
                fsa.change_flags(Flags::MIDFA, Flags::DFA);
            }
            fsa
        })
    })
}

/// Every word over `letters` letters of length at most `max_len`.
pub fn all_words(letters: usize, max_len: usize) -> Vec<Vec<Symbol>> {
    let mut out = vec![Vec::new()];
    let mut level = vec![Vec::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for word in &level {
            for g in 0..letters {
                let mut w: Vec<Symbol> = word.clone();
                w.push(g);
                next.push(w);
            }
        }
        out.extend(next.iter().cloned());
        level = next;
    }
    out
}

/// The accepted words of length at most `max_len`, found by running every
/// candidate word through the automaton.
pub fn language(fsa: &Automaton, max_len: usize) -> BTreeSet<Vec<Symbol>> {
    all_words(fsa.alphabet_size(), max_len)
        .into_iter()
        .filter(|w| fsa.accepts(w))
        .collect()
}

/// True if `word` splits into pieces that each satisfy `piece`, allowing
/// zero pieces.
pub fn splits_into<F: Fn(&[Symbol]) -> bool>(word: &[Symbol], piece: F) -> bool {
    let n = word.len();
    let mut reachable = vec![false; n + 1];
    reachable[0] = true;
    for end in 1..=n {
        reachable[end] = (0..end).any(|start| reachable[start] && piece(&word[start..end]));
    }
    reachable[n]
}

/// A trie accepting exactly `words` over `letters` letters.
pub fn trie(letters: usize, words: &[&[Symbol]]) -> Automaton {
    let mut prefixes: Vec<Vec<Symbol>> = vec![Vec::new()];
    for word in words {
        for end in 1..=word.len() {
            let prefix = word[..end].to_vec();
            if !prefixes.contains(&prefix) {
                prefixes.push(prefix);
            }
        }
    }
    let id = |prefix: &[Symbol]| prefixes.iter().position(|p| p == prefix).map_or(0, |i| i as StateId + 1);
    let mut fsa = Automaton::new(
        Alphabet::new(letters),
        letters,
        prefixes.len() + 1,
        StorageFormat::Default,
    );
    for prefix in &prefixes {
        let row: Vec<StateId> = (0..letters)
            .map(|g| {
                let mut next = prefix.clone();
                next.push(g);
                id(&next)
            })
            .collect();
        fsa.set_transitions(id(prefix), &row).unwrap();
    }
    for word in words {
        fsa.accepting_mut().include(id(word));
    }
    fsa
}
