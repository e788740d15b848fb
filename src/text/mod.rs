//! Human-readable automaton files.
//!
//! Automata are stored as GAP-style records:
//!
//! ```text
//! fsa := rec
//! (
//!   isFSA := true,
//!   alphabet := rec(type := "identifiers", size := 2, format := "dense", names := [a,b]),
//!   states := rec
//!   (
//!     type := "simple",
//!     size := 2
//!   ),
//!   flags := ["DFA","minimized"],
//!   initial := [1],
//!   accepting := [1],
//!   table := rec
//!   (
//!     format := "dense deterministic",
//!     numTransitions := 2,
//!     transitions :=
//!     [
//!       [2,1],
//!       [1,2]
//!     ]
//!   )
//! );
//! ```
//!
//! States and letters are numbered from 1 in the file. Product automata
//! always use the sparse table format, where each row lists `[symbol, target]`
//! pairs for the transitions that do not fail. Rewrite markers are written as
//! negative numbers.
//!
//! # Example
//!
//! ```rust
//! use fsakit::prelude::*;
//! use fsakit::text::TextFormat;
//!
//! let factory = Factory::default();
//! let fsa = factory.all_words(&Alphabet::new(2), 3).unwrap();
//! let format = TextFormat::default();
//! let text = format.format(&fsa);
//! let back = format.parse(&text).unwrap();
//! assert_eq!(back, fsa);
//! ```

mod reader;
mod value;
mod writer;

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::automaton::{Automaton, StorageFormat};
use crate::error::{FsaError, Result};

/// Options for reading and writing the text format.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFormat {
    /// Record name written before `:=`
    pub name: String,
    /// Write base automata with the sparse table format too
    pub sparse: bool,
    /// Storage of automata read back
    pub storage: StorageFormat,
}

impl Default for TextFormat {
    fn default() -> Self {
        TextFormat {
            name: "fsa".to_string(),
            sparse: false,
            storage: StorageFormat::Default,
        }
    }
}

impl TextFormat {
    /// Options writing records under `name`.
    pub fn named(name: impl Into<String>) -> Self {
        TextFormat {
            name: name.into(),
            ..TextFormat::default()
        }
    }

    /// The record text for `fsa`.
    pub fn format(&self, fsa: &Automaton) -> String {
        writer::record_text(fsa, &self.name, self.sparse)
    }

    /// Write the record for `fsa`.
    pub fn write<W: Write>(&self, fsa: &Automaton, mut out: W) -> Result<()> {
        out.write_all(self.format(fsa).as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Save `fsa` to a file.
    pub fn save<P: AsRef<Path>>(&self, fsa: &Automaton, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write(fsa, BufWriter::new(file))?;
        log::debug!("wrote {} states to {}", fsa.state_count() - 1, path.as_ref().display());
        Ok(())
    }

    /// Parse every automaton record in `text`, in order, with their names.
    pub fn parse_all(&self, text: &str) -> Result<Vec<(String, Automaton)>> {
        let mut parser = value::Parser::new(text)?;
        let mut out = Vec::new();
        while !parser.at_end() {
            let (name, value) = parser.assignment()?;
            out.push((name, reader::automaton_from_value(&value, self.storage)?));
        }
        Ok(out)
    }

    /// Parse the single automaton record in `text`.
    pub fn parse(&self, text: &str) -> Result<Automaton> {
        let mut records = self.parse_all(text)?;
        match records.len() {
            1 => Ok(records.remove(0).1),
            0 => Err(FsaError::parse(1, "no automaton record found")),
            n => Err(FsaError::parse(1, format!("expected one automaton record, found {}", n))),
        }
    }

    /// Read the single automaton record from `reader`.
    pub fn read<R: Read>(&self, mut reader: R) -> Result<Automaton> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.parse(&text)
    }

    /// Load the single automaton record in a file.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Automaton> {
        let fsa = self.read(File::open(path.as_ref())?)?;
        log::debug!("read {} states from {}", fsa.state_count() - 1, path.as_ref().display());
        Ok(fsa)
    }
}

/// Parse one automaton record with default options.
pub fn parse(text: &str) -> Result<Automaton> {
    TextFormat::default().parse(text)
}

/// Format `fsa` as a record named `fsa`.
pub fn to_text(fsa: &Automaton) -> String {
    TextFormat::default().format(fsa)
}
