//! Bincode serializer for compact binary snapshots.

use crate::automaton::Automaton;
use std::io::{Read, Write};

use super::{check_snapshot, AutomatonSerializer, SerializationError};

/// Bincode serializer for compact binary snapshots.
///
/// The fastest format to load; use it for automata that are built once and
/// read many times.
pub struct BincodeSerializer;

impl AutomatonSerializer for BincodeSerializer {
    fn serialize<W: Write>(fsa: &Automaton, mut writer: W) -> Result<(), SerializationError> {
        bincode::serialize_into(&mut writer, fsa)?;
        Ok(())
    }

    fn deserialize<R: Read>(mut reader: R) -> Result<Automaton, SerializationError> {
        let fsa: Automaton = bincode::deserialize_from(&mut reader)?;
        check_snapshot(fsa)
    }
}
