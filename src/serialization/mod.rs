//! Binary and JSON snapshots of automata.
//!
//! Snapshots store the automaton exactly as it is in memory, including its
//! storage format and flags, so loading one needs no rebuilding. Use the
//! [`text`](crate::text) format for files meant to be read or edited.
//!
//! # Example
//!
//! ```rust
//! use fsakit::prelude::*;
//!
//! let fsa = Factory::default().all_words(&Alphabet::new(2), 2).unwrap();
//!
//! let mut buffer = Vec::new();
//! BincodeSerializer::serialize(&fsa, &mut buffer).unwrap();
//! let loaded = BincodeSerializer::deserialize(&buffer[..]).unwrap();
//! assert_eq!(loaded, fsa);
//! ```

use crate::automaton::Automaton;
use std::io::{Read, Write};

mod bincode_impl;
mod json_impl;

#[cfg(feature = "compression")]
mod compression_impl;

pub use self::bincode_impl::BincodeSerializer;
pub use self::json_impl::JsonSerializer;

#[cfg(feature = "compression")]
pub use self::compression_impl::GzipSerializer;

/// Trait for writing and reading automaton snapshots.
pub trait AutomatonSerializer {
    /// Serialize an automaton to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    fn serialize<W: Write>(fsa: &Automaton, writer: W) -> Result<(), SerializationError>;

    /// Deserialize an automaton from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or decoding fails, or if the decoded
    /// automaton is inconsistent.
    fn deserialize<R: Read>(reader: R) -> Result<Automaton, SerializationError>;
}

/// Errors that can occur during serialization/deserialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// Error during bincode serialization
    #[error("Bincode error")]
    Bincode(#[from] bincode::Error),
    /// Error during JSON serialization
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
    /// I/O error
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    /// The snapshot decoded to an unusable automaton
    #[error("invalid automaton: {0}")]
    Automaton(String),
}

/// Reject snapshots whose parts disagree on the number of states.
pub(crate) fn check_snapshot(fsa: Automaton) -> Result<Automaton, SerializationError> {
    let count = fsa.state_count();
    let sets = [fsa.initial(), fsa.accepting()];
    if sets.iter().any(|set| set.universe() != count) {
        return Err(SerializationError::Automaton(format!(
            "state sets do not cover {} states",
            count
        )));
    }
    if let Some(s) = sets
        .iter()
        .flat_map(|set| set.iter())
        .find(|&s| !fsa.is_valid_state(s))
    {
        return Err(SerializationError::Automaton(format!("state {} is out of range", s)));
    }
    log::debug!("loaded snapshot with {} states", count - 1);
    Ok(fsa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{LabelData, LabelType, Labels, StorageFormat};
    use crate::ops::Factory;
    use crate::symbols::Alphabet;

    fn sample() -> Automaton {
        let mut fsa = Factory::default().all_words(&Alphabet::new(3), 3).unwrap();
        let mut labels = Labels::new(LabelType::Strings, fsa.state_count());
        let l = labels.add_label(LabelData::Text("start".into()));
        labels.set_label_nr(1, l).unwrap();
        fsa.set_labels(Some(labels));
        fsa
    }

    #[test]
    fn test_bincode_roundtrip() {
        let fsa = sample();
        let mut buffer = Vec::new();
        BincodeSerializer::serialize(&fsa, &mut buffer).unwrap();
        let loaded = BincodeSerializer::deserialize(&buffer[..]).unwrap();
        assert_eq!(loaded, fsa);
        assert_eq!(loaded.flags(), fsa.flags());
        assert_eq!(loaded.alphabet(), fsa.alphabet());
    }

    #[test]
    fn test_json_roundtrip_keeps_sparse_storage() {
        let mut fsa = sample();
        fsa.set_storage(StorageFormat::Sparse, 0);
        let mut buffer = Vec::new();
        JsonSerializer::serialize(&fsa, &mut buffer).unwrap();
        let loaded = JsonSerializer::deserialize(&buffer[..]).unwrap();
        assert!(!loaded.is_dense());
        assert_eq!(loaded, fsa);
    }

    #[test]
    fn test_truncated_snapshot_is_an_error() {
        let mut buffer = Vec::new();
        BincodeSerializer::serialize(&sample(), &mut buffer).unwrap();
        buffer.truncate(buffer.len() / 2);
        assert!(BincodeSerializer::deserialize(&buffer[..]).is_err());
    }

    #[cfg(feature = "compression")]
    #[test]
    fn test_gzip_roundtrip() {
        let fsa = sample();
        let mut buffer = Vec::new();
        GzipSerializer::<BincodeSerializer>::serialize(&fsa, &mut buffer).unwrap();
        let loaded = GzipSerializer::<BincodeSerializer>::deserialize(&buffer[..]).unwrap();
        assert_eq!(loaded, fsa);
    }
}
