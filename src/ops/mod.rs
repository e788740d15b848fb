//! Automaton algorithms.
//!
//! Every algorithm is a method on [`Factory`], which carries the
//! [`EngineConfig`], the [`AbortHandle`] checked between states and the
//! progress settings. Algorithms never modify their inputs; each call returns
//! a new [`Automaton`].
//!
//! # Example
//!
//! ```rust
//! use fsakit::prelude::*;
//!
//! let factory = Factory::default();
//! let alphabet = Alphabet::new(2);
//!
//! let short = factory.all_words(&alphabet, 1).unwrap();
//! let any = factory.universal(&alphabet).unwrap();
//! let long = factory.and_not(&any, &short).unwrap();
//!
//! assert!(!long.accepts(&[1]));
//! assert!(long.accepts(&[1, 1]));
//! ```

mod basic;
mod binop;
mod composite;
mod determinize;
mod minimize;
mod product;
mod reverse;
mod star;
mod trim;

use std::time::Duration;

use crate::automaton::{Automaton, StorageFormat};
use crate::builder::KeyedBuilder;
use crate::config::EngineConfig;
use crate::error::{FsaError, Result};
use crate::progress::{AbortHandle, StatusReporter};
use crate::symbols::Alphabet;
use crate::StateId;

pub use binop::BinopKind;
pub use determinize::DeterminizePolicy;
pub use minimize::MergeLabels;

/// Entry point for all automaton algorithms.
#[derive(Debug, Clone, Default)]
pub struct Factory {
    config: EngineConfig,
    abort: AbortHandle,
}

impl Factory {
    /// A factory with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Factory {
            config,
            abort: AbortHandle::new(),
        }
    }

    /// Use `abort` as the cancellation flag.
    pub fn with_abort(mut self, abort: AbortHandle) -> Self {
        self.abort = abort;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A handle that cancels running algorithms of this factory.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    fn check_abort(&self) -> Result<()> {
        self.abort.check()
    }

    fn status(&self) -> StatusReporter {
        StatusReporter::new(Duration::from_millis(self.config.status_interval_ms))
    }

    fn builder(&self, alphabet: &Alphabet, nr_symbols: usize) -> KeyedBuilder {
        KeyedBuilder::new(alphabet.clone(), nr_symbols, self.config.max_states)
    }

    fn finish(&self, builder: KeyedBuilder) -> Result<Automaton> {
        builder.into_automaton(self.config.storage, self.config.dense_cell_limit)
    }

    fn storage_for(&self, states: usize, nr_symbols: usize) -> StorageFormat {
        if self
            .config
            .storage
            .is_dense(states, nr_symbols, self.config.dense_cell_limit)
        {
            StorageFormat::Dense
        } else {
            StorageFormat::Sparse
        }
    }

    fn new_automaton(&self, alphabet: &Alphabet, nr_symbols: usize, states: usize) -> Result<Automaton> {
        if states > self.config.max_states {
            return Err(FsaError::StateLimitExceeded {
                limit: self.config.max_states,
            });
        }
        Ok(Automaton::new(
            alphabet.clone(),
            nr_symbols,
            states,
            self.storage_for(states, nr_symbols),
        ))
    }
}

/// The target of a transition, with rewrite markers read as failures.
fn step(fsa: &Automaton, state: StateId, symbol: usize) -> StateId {
    let t = fsa.new_state(state, symbol);
    if fsa.is_valid_state(t) {
        t
    } else {
        0
    }
}

/// The key of a state still under construction.
fn key_of<'a>(builder: &'a KeyedBuilder, state: StateId, operation: &'static str) -> Result<&'a [u8]> {
    builder
        .state_key(state)
        .ok_or_else(|| FsaError::internal(operation, state, "state has no key"))
}

fn check_same_alphabet(a: &Automaton, b: &Automaton) -> Result<()> {
    if a.alphabet_size() != b.alphabet_size() {
        return Err(FsaError::AlphabetMismatch {
            left: a.alphabet_size(),
            right: b.alphabet_size(),
        });
    }
    Ok(())
}

fn check_product(a: &Automaton, operation: &'static str) -> Result<()> {
    if a.is_product() {
        Ok(())
    } else {
        Err(FsaError::NotProductAutomaton { operation })
    }
}

fn check_base(a: &Automaton, operation: &'static str) -> Result<()> {
    if a.is_base() {
        Ok(())
    } else {
        Err(FsaError::NotBaseAutomaton { operation })
    }
}
