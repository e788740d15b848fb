//! Per-state labels.
//!
//! Many states may share one label. A label is identified by a [`LabelId`];
//! id 0 is the null label and means "unlabelled". Label payloads are opaque to
//! the algorithms except for word lists, which the label merger and
//! `composite` know how to combine.

use rustc_hash::FxHashMap;

use crate::error::{FsaError, Result};
use crate::StateId;

/// Index into a label table. 0 is the null label.
pub type LabelId = u32;

/// A word over the base alphabet, as letter indices.
pub type Word = Vec<u32>;

/// The kind of payload stored in a label table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum LabelType {
    /// No labels
    Unlabelled,
    /// Identifier names
    Identifiers,
    /// Arbitrary strings
    Strings,
    /// A single word per label
    Words,
    /// A list of words per label
    ListOfWords,
    /// A list of integers per label
    ListOfIntegers,
}

impl LabelType {
    /// Name used by the text format.
    pub fn name(self) -> &'static str {
        match self {
            LabelType::Unlabelled => "simple",
            LabelType::Identifiers => "identifiers",
            LabelType::Strings => "strings",
            LabelType::Words => "words",
            LabelType::ListOfWords => "list of words",
            LabelType::ListOfIntegers => "list of integers",
        }
    }

    /// Parse a text-format name.
    pub fn from_name(name: &str) -> Option<LabelType> {
        Some(match name {
            "simple" => LabelType::Unlabelled,
            "identifiers" => LabelType::Identifiers,
            "strings" => LabelType::Strings,
            "words" => LabelType::Words,
            "list of words" => LabelType::ListOfWords,
            "list of integers" => LabelType::ListOfIntegers,
            _ => return None,
        })
    }

    /// True for label types whose payloads are words.
    pub fn is_words(self) -> bool {
        matches!(self, LabelType::Words | LabelType::ListOfWords)
    }
}

/// A label payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum LabelData {
    /// An identifier
    Identifier(String),
    /// A string
    Text(String),
    /// One word
    Word(Word),
    /// Several words
    Words(Vec<Word>),
    /// Several integers
    Integers(Vec<u32>),
}

impl LabelData {
    /// The label's words; empty for non-word payloads.
    pub fn word_list(&self) -> Vec<Word> {
        match self {
            LabelData::Word(w) => vec![w.clone()],
            LabelData::Words(ws) => ws.clone(),
            _ => Vec::new(),
        }
    }

    /// True if the payload has the shape `label_type` expects.
    pub fn fits(&self, label_type: LabelType) -> bool {
        matches!(
            (self, label_type),
            (LabelData::Identifier(_), LabelType::Identifiers)
                | (LabelData::Text(_), LabelType::Strings)
                | (LabelData::Word(_), LabelType::Words)
                | (LabelData::Words(_), LabelType::ListOfWords)
                | (LabelData::Integers(_), LabelType::ListOfIntegers)
        )
    }

    /// Append a byte encoding of the payload to `out`.
    pub fn pack(&self, out: &mut Vec<u8>) {
        fn push_u32s(v: &[u32], out: &mut Vec<u8>) {
            out.extend_from_slice(&(v.len() as u32).to_le_bytes());
            for x in v {
                out.extend_from_slice(&x.to_le_bytes());
            }
        }
        match self {
            LabelData::Identifier(s) | LabelData::Text(s) => {
                out.extend_from_slice(&(s.len() as u32).to_le_bytes());
                out.extend_from_slice(s.as_bytes());
            }
            LabelData::Word(w) | LabelData::Integers(w) => push_u32s(w, out),
            LabelData::Words(ws) => {
                out.extend_from_slice(&(ws.len() as u32).to_le_bytes());
                for w in ws {
                    push_u32s(w, out);
                }
            }
        }
    }

    /// Decode a payload of type `label_type` written by [`pack`](LabelData::pack).
    pub fn unpack(label_type: LabelType, data: &[u8]) -> Option<LabelData> {
        let mut reader = Reader { data, pos: 0 };
        let label = match label_type {
            LabelType::Unlabelled => return None,
            LabelType::Identifiers => LabelData::Identifier(reader.string()?),
            LabelType::Strings => LabelData::Text(reader.string()?),
            LabelType::Words => LabelData::Word(reader.u32s()?),
            LabelType::ListOfIntegers => LabelData::Integers(reader.u32s()?),
            LabelType::ListOfWords => {
                let n = reader.u32()? as usize;
                let mut ws = Vec::with_capacity(n);
                for _ in 0..n {
                    ws.push(reader.u32s()?);
                }
                LabelData::Words(ws)
            }
        };
        Some(label)
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let slice = self.data.get(self.pos..self.pos + n)?;
        self.pos += n;
        Some(slice)
    }

    fn u32(&mut self) -> Option<u32> {
        let b = self.bytes(4)?;
        Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u32s(&mut self) -> Option<Vec<u32>> {
        let n = self.u32()? as usize;
        (0..n).map(|_| self.u32()).collect()
    }

    fn string(&mut self) -> Option<String> {
        let n = self.u32()? as usize;
        String::from_utf8(self.bytes(n)?.to_vec()).ok()
    }
}

/// The label table of an automaton plus the state-to-label map.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Labels {
    label_type: LabelType,
    names: Vec<Option<LabelData>>,
    state_labels: Vec<LabelId>,
}

impl Labels {
    /// An empty table (just the null label) for `state_count` states.
    pub fn new(label_type: LabelType, state_count: usize) -> Self {
        Labels {
            label_type,
            names: vec![None],
            state_labels: vec![0; state_count],
        }
    }

    /// Payload type of this table.
    pub fn label_type(&self) -> LabelType {
        self.label_type
    }

    /// Number of labels including the null label.
    pub fn label_count(&self) -> usize {
        self.names.len()
    }

    /// Append a label and return its id.
    pub fn add_label(&mut self, data: LabelData) -> LabelId {
        self.names.push(Some(data));
        (self.names.len() - 1) as LabelId
    }

    /// Make room for labels up to `count - 1`.
    pub fn set_label_count(&mut self, count: usize) {
        self.names.resize(count.max(1), None);
    }

    /// Replace the payload of an existing label.
    pub fn set_label_data(&mut self, label: LabelId, data: Option<LabelData>) -> Result<()> {
        let count = self.names.len();
        match self.names.get_mut(label as usize) {
            Some(slot) if label != 0 => {
                *slot = data;
                Ok(())
            }
            _ => Err(FsaError::InvalidLabel { label, count }),
        }
    }

    /// Payload of a label.
    pub fn label_data(&self, label: LabelId) -> Option<&LabelData> {
        self.names.get(label as usize).and_then(Option::as_ref)
    }

    /// Label of a state (0 if none).
    pub fn label_nr(&self, state: StateId) -> LabelId {
        self.state_labels.get(state as usize).copied().unwrap_or(0)
    }

    /// Payload of the label of a state.
    pub fn state_data(&self, state: StateId) -> Option<&LabelData> {
        self.label_data(self.label_nr(state))
    }

    /// Attach a label to a state.
    pub fn set_label_nr(&mut self, state: StateId, label: LabelId) -> Result<()> {
        if label as usize >= self.names.len() {
            return Err(FsaError::InvalidLabel {
                label,
                count: self.names.len(),
            });
        }
        if state as usize >= self.state_labels.len() {
            self.state_labels.resize(state as usize + 1, 0);
        }
        self.state_labels[state as usize] = label;
        Ok(())
    }

    /// Words attached to a state.
    pub fn state_words(&self, state: StateId) -> Vec<Word> {
        self.state_data(state).map(LabelData::word_list).unwrap_or_default()
    }

    pub(crate) fn set_state_count(&mut self, count: usize) {
        self.state_labels.resize(count, 0);
    }

    /// Labels renumbered for a new state numbering (`perm[old] = new`).
    pub(crate) fn renumber(&self, perm: &[StateId], new_count: usize) -> Labels {
        let mut state_labels = vec![0; new_count];
        for (old, &new) in perm.iter().enumerate() {
            if new != 0 {
                state_labels[new as usize] = self.label_nr(old as StateId);
            }
        }
        Labels {
            label_type: self.label_type,
            names: self.names.clone(),
            state_labels,
        }
    }
}

/// Assigns one label id per distinct set of merged labels.
///
/// Merging is by content: the word lists of all input labels are sorted and
/// deduplicated, and equal results share a label id.
pub struct LabelMerger {
    labels: Labels,
    index: FxHashMap<Vec<Word>, LabelId>,
    key: Vec<Word>,
}

impl LabelMerger {
    /// A merger producing a `list of words` table for `state_count` states.
    pub fn new(state_count: usize) -> Self {
        LabelMerger {
            labels: Labels::new(LabelType::ListOfWords, state_count),
            index: FxHashMap::default(),
            key: Vec::new(),
        }
    }

    /// Begin collecting a new label set.
    pub fn start(&mut self) {
        self.key.clear();
    }

    /// Add the words of `data` to the current set.
    pub fn include(&mut self, data: Option<&LabelData>) {
        if let Some(data) = data {
            self.key.extend(data.word_list());
        }
    }

    /// Add single words to the current set.
    pub fn include_words<I: IntoIterator<Item = Word>>(&mut self, words: I) {
        self.key.extend(words);
    }

    /// Finish the current set and return its label id, 0 for an empty set.
    pub fn finish(&mut self) -> LabelId {
        self.key.sort();
        self.key.dedup();
        if self.key.is_empty() {
            return 0;
        }
        if let Some(&id) = self.index.get(&self.key) {
            return id;
        }
        let words = std::mem::take(&mut self.key);
        let id = self.labels.add_label(LabelData::Words(words.clone()));
        self.index.insert(words, id);
        id
    }

    /// Attach a label produced by [`finish`](LabelMerger::finish) to a state.
    pub fn set_label_nr(&mut self, state: StateId, label: LabelId) -> Result<()> {
        self.labels.set_label_nr(state, label)
    }

    /// The finished label table.
    pub fn into_labels(self) -> Labels {
        self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_table() {
        let mut labels = Labels::new(LabelType::Strings, 4);
        let a = labels.add_label(LabelData::Text("a".into()));
        labels.set_label_nr(2, a).unwrap();
        assert_eq!(labels.label_nr(2), a);
        assert_eq!(labels.label_nr(1), 0);
        assert!(labels.state_data(1).is_none());
        assert!(labels.set_label_nr(1, 9).is_err());
        assert_eq!(labels.label_count(), 2);
    }

    #[test]
    fn test_payload_pack() {
        let data = LabelData::Words(vec![vec![0, 1], vec![], vec![2]]);
        let mut bytes = Vec::new();
        data.pack(&mut bytes);
        assert_eq!(LabelData::unpack(LabelType::ListOfWords, &bytes), Some(data));
        assert_eq!(LabelData::unpack(LabelType::ListOfWords, &bytes[..3]), None);
    }

    #[test]
    fn test_merger_canonicalises() {
        let mut merger = LabelMerger::new(3);
        let x = LabelData::Word(vec![1]);
        let y = LabelData::Words(vec![vec![0], vec![1]]);

        merger.start();
        merger.include(Some(&y));
        merger.include(Some(&x));
        let first = merger.finish();

        merger.start();
        merger.include(Some(&LabelData::Word(vec![0])));
        merger.include(Some(&x));
        merger.include(None);
        let second = merger.finish();

        assert_eq!(first, second);
        merger.start();
        assert_eq!(merger.finish(), 0);

        let labels = merger.into_labels();
        assert_eq!(labels.label_count(), 2);
        assert_eq!(
            labels.label_data(first),
            Some(&LabelData::Words(vec![vec![0], vec![1]]))
        );
    }
}
