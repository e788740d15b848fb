//! # fsakit
//!
//! A finite state automaton engine: compact transition storage, incremental
//! keyed construction, minimisation and the algebra of regular languages and
//! of two-tape (product) automata.
//!
//! The pieces, from the bottom up:
//!
//! - [`codec`]: byte encodings of transition rows and builder keys
//! - [`subset`]: sets of states with constant-size special cases
//! - [`automaton`]: the [`Automaton`](automaton::Automaton) store
//! - [`builder`]: the [`KeyedBuilder`](builder::KeyedBuilder) used by every
//!   construction
//! - [`ops`]: the algorithms, reached through [`Factory`](ops::Factory)
//! - [`text`]: the GAP-style record format
//!
//! ## Example
//!
//! ```rust
//! use fsakit::prelude::*;
//!
//! let factory = Factory::default();
//! let alphabet = Alphabet::new(2);
//!
//! // All words of length at most 2, and its complement
//! let short = factory.all_words(&alphabet, 2).unwrap();
//! let long = factory.complement(&short, false).unwrap();
//!
//! assert!(short.accepts(&[0, 1]));
//! assert!(!long.accepts(&[0, 1]));
//! assert!(long.accepts(&[0, 1, 1]));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod automaton;
pub mod builder;
pub mod codec;
pub mod config;
pub mod error;
pub mod ops;
pub mod progress;
pub mod subset;
pub mod symbols;
pub mod text;

#[cfg(feature = "serialization")]
pub mod serialization;

/// Command line interface
#[cfg(feature = "cli")]
pub mod cli;

pub use error::{FsaError, Result};

/// A state number. 0 is the failure state.
pub type StateId = u32;

/// Transition values at or above this are rewrite markers, not states.
pub const REWRITE_BASE: StateId = 0x8000_0000;

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::automaton::{
        Automaton, Flags, LabelData, LabelId, LabelType, Labels, StorageFormat,
    };
    pub use crate::builder::KeyedBuilder;
    pub use crate::config::EngineConfig;
    pub use crate::error::{FsaError, Result};
    pub use crate::ops::{BinopKind, DeterminizePolicy, Factory, MergeLabels};
    pub use crate::progress::AbortHandle;
    pub use crate::subset::StateSubset;
    pub use crate::symbols::{Alphabet, Symbol, SymbolSpace};
    pub use crate::StateId;

    #[cfg(feature = "serialization")]
    pub use crate::serialization::{AutomatonSerializer, BincodeSerializer, JsonSerializer};

    #[cfg(feature = "compression")]
    pub use crate::serialization::GzipSerializer;
}
