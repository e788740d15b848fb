//! Gzip compression wrapper for serializers.

use crate::automaton::Automaton;
use std::io::{Read, Write};

use super::{AutomatonSerializer, SerializationError};

/// Gzip-compressed serializer wrapper.
///
/// Compressed rows already remove most redundancy, so this pays off mainly
/// for dense tables and JSON.
///
/// # Example
///
/// ```rust
/// use fsakit::prelude::*;
///
/// let fsa = Factory::default().universal(&Alphabet::new(4)).unwrap();
/// let mut buffer = Vec::new();
/// GzipSerializer::<JsonSerializer>::serialize(&fsa, &mut buffer).unwrap();
/// let loaded = GzipSerializer::<JsonSerializer>::deserialize(&buffer[..]).unwrap();
/// assert_eq!(loaded, fsa);
/// ```
pub struct GzipSerializer<S> {
    _inner: std::marker::PhantomData<S>,
}

impl<S: AutomatonSerializer> AutomatonSerializer for GzipSerializer<S> {
    fn serialize<W: Write>(fsa: &Automaton, writer: W) -> Result<(), SerializationError> {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut encoder = GzEncoder::new(writer, Compression::default());
        S::serialize(fsa, &mut encoder)?;
        encoder.finish().map_err(SerializationError::Io)?;
        Ok(())
    }

    fn deserialize<R: Read>(reader: R) -> Result<Automaton, SerializationError> {
        use flate2::read::GzDecoder;

        S::deserialize(GzDecoder::new(reader))
    }
}
