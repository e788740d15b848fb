//! JSON serializer for inspectable snapshots.

use crate::automaton::Automaton;
use std::io::{Read, Write};

use super::{check_snapshot, AutomatonSerializer, SerializationError};

/// JSON serializer for inspectable snapshots.
///
/// Larger and slower than bincode but handy when debugging.
pub struct JsonSerializer;

impl AutomatonSerializer for JsonSerializer {
    fn serialize<W: Write>(fsa: &Automaton, mut writer: W) -> Result<(), SerializationError> {
        serde_json::to_writer_pretty(&mut writer, fsa)?;
        Ok(())
    }

    fn deserialize<R: Read>(mut reader: R) -> Result<Automaton, SerializationError> {
        let fsa: Automaton = serde_json::from_reader(&mut reader)?;
        check_snapshot(fsa)
    }
}
