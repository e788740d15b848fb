//! Compact byte encodings for transition rows and builder keys.
//!
//! A transition row holds one successor state per symbol. Most rows of the
//! automata this engine builds are either nearly full or nearly empty, so a
//! row is stored in whichever of three layouts is smallest:
//!
//! | Format | Byte 0 (low bits) | Layout |
//! |--------|-------------------|--------|
//! | Dense   | `0` | every state id in symbol order |
//! | Bitmask | `1` | a bit per symbol starting at bit 2 of byte 0, then the non-zero ids |
//! | Gap     | `2` | `(gap, id)` pairs ending with a `255` byte |
//! | Empty   | n/a | no bytes at all: every transition fails |
//!
//! State ids are stored as 4 little-endian bytes. A gap byte counts the
//! failing transitions that precede the id. Gaps of 255 or more are split
//! with `(254, 0)` filler pairs, each of which accounts for 255 symbols.
//!
//! Encoding is deterministic: equal rows always produce equal bytes, which is
//! what lets the minimiser use compressed rows directly as hash keys.

pub mod packer;
pub mod pair_list;

use crate::StateId;

const ID_SIZE: usize = std::mem::size_of::<StateId>();
const GAP_END: u8 = u8::MAX;
const GAP_FILL: u8 = u8::MAX - 1;
const GAP_SPAN: usize = u8::MAX as usize;

/// The layout of an encoded row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFormat {
    /// All ids stored in symbol order
    Dense,
    /// Presence bitmask followed by the non-zero ids
    Bitmask,
    /// Gap/id pairs terminated by a sentinel byte
    Gap,
    /// No stored data; every transition goes to the failure state
    Empty,
}

impl RowFormat {
    /// Determine the layout of an encoded row.
    pub fn of(data: &[u8]) -> RowFormat {
        match data.first().map(|b| b & 3) {
            None | Some(3) => RowFormat::Empty,
            Some(0) => RowFormat::Dense,
            Some(1) => RowFormat::Bitmask,
            _ => RowFormat::Gap,
        }
    }
}

#[inline]
fn read_id(data: &[u8], offset: usize) -> StateId {
    let mut bytes = [0u8; ID_SIZE];
    bytes.copy_from_slice(&data[offset..offset + ID_SIZE]);
    StateId::from_le_bytes(bytes)
}

#[inline]
fn mask_bit(symbol: usize) -> (usize, u8) {
    ((symbol + 2) / 8, 1u8 << ((symbol + 2) % 8))
}

/// Encoder/decoder for rows of a fixed number of symbols.
///
/// The encoder remembers whether the previous row came out in bitmask or gap
/// layout and tries that layout first for the next row; rows from the same
/// automaton tend to have similar sparsity, so this usually avoids building
/// the row twice.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TransitionCodec {
    nr_symbols: usize,
    mask_size: usize,
    expect_bitmask: bool,
    #[cfg_attr(feature = "serialization", serde(skip))]
    buffer: Vec<u8>,
}

impl TransitionCodec {
    /// Create a codec for rows of `nr_symbols` entries.
    pub fn new(nr_symbols: usize) -> Self {
        TransitionCodec {
            nr_symbols,
            mask_size: (nr_symbols + 2 + 7) / 8,
            expect_bitmask: true,
            buffer: Vec::with_capacity(2 + (1 + ID_SIZE) * nr_symbols),
        }
    }

    /// Number of symbols per row.
    pub fn nr_symbols(&self) -> usize {
        self.nr_symbols
    }

    fn dense_size(&self) -> usize {
        1 + self.nr_symbols * ID_SIZE
    }

    /// Encode a row and return the encoded bytes.
    ///
    /// The returned slice is empty when every entry is 0. It stays valid until
    /// the next call on this codec.
    pub fn compress(&mut self, row: &[StateId]) -> &[u8] {
        debug_assert_eq!(row.len(), self.nr_symbols);
        self.buffer.clear();

        if self.expect_bitmask {
            let (count, pairs) = self.write_bitmask(row);
            if count == 0 {
                self.buffer.clear();
                return &self.buffer;
            }
            let bitmask_size = self.buffer.len();
            if 2 + pairs * (1 + ID_SIZE) < bitmask_size {
                self.expect_bitmask = false;
                self.buffer.clear();
                self.write_gap(row);
            } else if self.dense_size() < bitmask_size {
                self.buffer.clear();
                self.write_dense(row);
            }
        } else {
            let count = self.write_gap(row);
            if count == 0 {
                self.buffer.clear();
                return &self.buffer;
            }
            let bitmask_size = self.mask_size + count * ID_SIZE;
            if bitmask_size <= self.buffer.len() {
                self.expect_bitmask = true;
                self.buffer.clear();
                if bitmask_size <= self.dense_size() {
                    self.write_bitmask(row);
                } else {
                    self.write_dense(row);
                }
            }
        }
        &self.buffer
    }

    /// Writes the bitmask layout, returning (non-zero count, gap pair count).
    fn write_bitmask(&mut self, row: &[StateId]) -> (usize, usize) {
        self.buffer.resize(self.mask_size, 0);
        self.buffer[0] = 1;
        let mut count = 0;
        let mut pairs = 0;
        let mut gap = 0usize;
        for (i, &id) in row.iter().enumerate() {
            if id != 0 {
                let (byte, bit) = mask_bit(i);
                self.buffer[byte] |= bit;
                self.buffer.extend_from_slice(&id.to_le_bytes());
                pairs += gap / GAP_SPAN + 1;
                gap = 0;
                count += 1;
            } else {
                gap += 1;
            }
        }
        (count, pairs)
    }

    /// Writes the gap layout, returning the non-zero count.
    fn write_gap(&mut self, row: &[StateId]) -> usize {
        self.buffer.push(2);
        let mut count = 0;
        let mut gap = 0usize;
        for &id in row {
            if id != 0 {
                while gap >= GAP_SPAN {
                    self.buffer.push(GAP_FILL);
                    self.buffer.extend_from_slice(&0u32.to_le_bytes());
                    gap -= GAP_SPAN;
                }
                self.buffer.push(gap as u8);
                self.buffer.extend_from_slice(&id.to_le_bytes());
                count += 1;
                gap = 0;
            } else {
                gap += 1;
            }
        }
        self.buffer.push(GAP_END);
        count
    }

    fn write_dense(&mut self, row: &[StateId]) {
        self.buffer.push(0);
        for &id in row {
            self.buffer.extend_from_slice(&id.to_le_bytes());
        }
    }

    /// Encode the degenerate row `[key, 0, 0, ...]`.
    ///
    /// The minimiser uses this as the hash key of a state whose class can no
    /// longer split, without reading the state's real row. It decodes to that
    /// row, so it can only collide with a state whose first entry is also
    /// `key`. A zero key yields the empty encoding.
    pub fn key_for_decided_state(&mut self, key: StateId) -> &[u8] {
        self.buffer.clear();
        if key == 0 {
            return &self.buffer;
        }
        if self.nr_symbols > 14 {
            self.buffer.push(2);
            self.buffer.push(0);
            self.buffer.extend_from_slice(&key.to_le_bytes());
            self.buffer.push(GAP_END);
        } else {
            self.buffer.push(5);
            if self.nr_symbols > 6 {
                self.buffer.push(0);
            }
            self.buffer.extend_from_slice(&key.to_le_bytes());
        }
        &self.buffer
    }

    /// Decode a row into `out`. Empty data decodes to an all-failure row.
    pub fn decompress(&self, data: &[u8], out: &mut [StateId]) {
        debug_assert_eq!(out.len(), self.nr_symbols);
        match RowFormat::of(data) {
            RowFormat::Empty => out.fill(0),
            RowFormat::Dense => {
                for (i, slot) in out.iter_mut().enumerate() {
                    *slot = read_id(data, 1 + i * ID_SIZE);
                }
            }
            RowFormat::Bitmask => {
                let mut offset = self.mask_size;
                for (i, slot) in out.iter_mut().enumerate() {
                    let (byte, bit) = mask_bit(i);
                    if data[byte] & bit != 0 {
                        *slot = read_id(data, offset);
                        offset += ID_SIZE;
                    } else {
                        *slot = 0;
                    }
                }
            }
            RowFormat::Gap => {
                out.fill(0);
                let mut j = 0usize;
                let mut pos = 1usize;
                while data[pos] != GAP_END {
                    j += data[pos] as usize;
                    let id = read_id(data, pos + 1);
                    if j < out.len() {
                        out[j] = id;
                    }
                    j += 1;
                    pos += 1 + ID_SIZE;
                }
            }
        }
    }

    /// Decode a whole row into a new vector.
    pub fn decode(&self, data: &[u8]) -> Vec<StateId> {
        let mut out = vec![0; self.nr_symbols];
        self.decompress(data, &mut out);
        out
    }

    /// Fetch a single transition without decoding the whole row.
    pub fn new_state(&self, data: &[u8], symbol: usize) -> StateId {
        match RowFormat::of(data) {
            RowFormat::Empty => 0,
            RowFormat::Dense => read_id(data, 1 + symbol * ID_SIZE),
            RowFormat::Bitmask => {
                let (byte, bit) = mask_bit(symbol);
                if data[byte] & bit == 0 {
                    return 0;
                }
                // Rank of the symbol among the set bits gives its value slot.
                let mut rank = 0;
                for i in 0..symbol {
                    let (b, m) = mask_bit(i);
                    if data[b] & m != 0 {
                        rank += 1;
                    }
                }
                read_id(data, self.mask_size + rank * ID_SIZE)
            }
            RowFormat::Gap => {
                let mut j = 0usize;
                let mut pos = 1usize;
                while data[pos] != GAP_END && j <= symbol {
                    j += data[pos] as usize;
                    if j == symbol {
                        return read_id(data, pos + 1);
                    }
                    j += 1;
                    pos += 1 + ID_SIZE;
                }
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(codec: &mut TransitionCodec, row: &[StateId]) -> (RowFormat, usize) {
        let data = codec.compress(row).to_vec();
        let format = RowFormat::of(&data);
        assert_eq!(codec.decode(&data), row);
        for (i, &id) in row.iter().enumerate() {
            assert_eq!(codec.new_state(&data, i), id, "symbol {}", i);
        }
        (format, data.len())
    }

    #[test]
    fn test_empty_row_has_no_bytes() {
        let mut codec = TransitionCodec::new(5);
        let (format, size) = roundtrip(&mut codec, &[0, 0, 0, 0, 0]);
        assert_eq!(format, RowFormat::Empty);
        assert_eq!(size, 0);
    }

    #[test]
    fn test_full_row_is_dense() {
        let mut codec = TransitionCodec::new(4);
        let (format, size) = roundtrip(&mut codec, &[1, 2, 3, 4]);
        assert_eq!(format, RowFormat::Dense);
        assert_eq!(size, 1 + 4 * 4);
    }

    #[test]
    fn test_half_full_row_is_bitmask() {
        let mut codec = TransitionCodec::new(8);
        let (format, size) = roundtrip(&mut codec, &[7, 0, 9, 0, 0, 11, 0, 2]);
        assert_eq!(format, RowFormat::Bitmask);
        assert_eq!(size, 2 + 4 * 4);
    }

    #[test]
    fn test_very_sparse_row_uses_gaps() {
        let mut codec = TransitionCodec::new(200);
        let mut row = vec![0; 200];
        row[150] = 42;
        let (format, size) = roundtrip(&mut codec, &row);
        assert_eq!(format, RowFormat::Gap);
        assert_eq!(size, 1 + 5 + 1);
    }

    #[test]
    fn test_long_gaps_are_split() {
        let mut codec = TransitionCodec::new(1000);
        let mut row = vec![0; 1000];
        row[0] = 3;
        row[600] = 5;
        row[999] = 8;
        let (format, _) = roundtrip(&mut codec, &row);
        assert_eq!(format, RowFormat::Gap);

        // exactly one full span of failures
        let mut codec = TransitionCodec::new(600);
        let mut row = vec![0; 600];
        row[255] = 1;
        let (format, size) = roundtrip(&mut codec, &row);
        assert_eq!(format, RowFormat::Gap);
        assert_eq!(size, 2 + 2 * 5);
    }

    #[test]
    fn test_adaptive_hint_does_not_change_encoding() {
        let mut sparse = vec![0; 30];
        sparse[24] = 1;
        let full: Vec<StateId> = (1..=30).collect();
        let alternating: Vec<StateId> = (1..=30).map(|i| if i % 2 == 0 { i } else { 0 }).collect();
        let rows = [sparse, full, alternating];

        for order in [[0, 1, 2], [2, 0, 1], [1, 2, 0], [0, 0, 2]] {
            let mut warmed = TransitionCodec::new(30);
            for &i in &order {
                let expected = TransitionCodec::new(30).compress(&rows[i]).to_vec();
                assert_eq!(warmed.compress(&rows[i]), expected.as_slice());
            }
        }
    }

    #[test]
    fn test_decided_key_matches_compressed_row() {
        for n in [3usize, 6, 7, 14, 15, 40] {
            let mut codec = TransitionCodec::new(n);
            let decided = codec.key_for_decided_state(9).to_vec();
            let mut row = vec![0; n];
            row[0] = 9;
            assert_eq!(codec.decode(&decided), row, "n = {}", n);
            assert!(codec.key_for_decided_state(0).is_empty());
        }
    }
}
