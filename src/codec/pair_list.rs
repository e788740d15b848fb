//! Sorted sets of state pairs with a padding marker, used as keys when
//! composing two product automata.

use crate::StateId;

/// Which side of a pair list has started reading padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Padding {
    /// Neither side padded yet
    #[default]
    None,
    /// The left input has ended
    Left,
    /// The right input has ended
    Right,
}

impl Padding {
    fn bits(self) -> u32 {
        match self {
            Padding::None => 0,
            Padding::Left => 1,
            Padding::Right => 2,
        }
    }

    fn from_bits(bits: u32) -> Self {
        match bits & 3 {
            1 => Padding::Left,
            2 => Padding::Right,
            _ => Padding::None,
        }
    }
}

const WIDE_FLAG: u32 = 4;

/// A sorted, duplicate-free list of `(left, right)` state pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePairList {
    pairs: Vec<(StateId, StateId)>,
    pad: Padding,
}

impl StatePairList {
    /// An empty list with no padding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair. Returns `false` if it was already present.
    pub fn insert(&mut self, left: StateId, right: StateId) -> bool {
        match self.pairs.binary_search(&(left, right)) {
            Ok(_) => false,
            Err(pos) => {
                self.pairs.insert(pos, (left, right));
                true
            }
        }
    }

    /// Remove a pair. Returns `false` if it was absent.
    pub fn remove(&mut self, left: StateId, right: StateId) -> bool {
        match self.pairs.binary_search(&(left, right)) {
            Ok(pos) => {
                self.pairs.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Whether the pair is present.
    pub fn contains(&self, left: StateId, right: StateId) -> bool {
        self.pairs.binary_search(&(left, right)).is_ok()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Remove all pairs and the padding marker.
    pub fn clear(&mut self) {
        self.pairs.clear();
        self.pad = Padding::None;
    }

    /// Pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, StateId)> + '_ {
        self.pairs.iter().copied()
    }

    /// Current padding marker.
    pub fn padding(&self) -> Padding {
        self.pad
    }

    /// Set the padding marker.
    pub fn set_padding(&mut self, pad: Padding) {
        self.pad = pad;
    }

    /// True once the left input has ended.
    pub fn is_left_padded(&self) -> bool {
        self.pad == Padding::Left
    }

    /// True once the right input has ended.
    pub fn is_right_padded(&self) -> bool {
        self.pad == Padding::Right
    }

    /// Encode into `out`, replacing its contents.
    ///
    /// An empty list encodes to no bytes. Otherwise a 4-byte header holds the
    /// pair count, a width flag and the padding marker, followed by the pairs
    /// as 16-bit values when they all fit, else as 32-bit values.
    pub fn pack(&self, out: &mut Vec<u8>) {
        out.clear();
        if self.pairs.is_empty() {
            return;
        }
        let narrow = self
            .pairs
            .iter()
            .all(|&(a, b)| a <= u16::MAX as u32 && b <= u16::MAX as u32);
        let header = (self.pairs.len() as u32) * 8
            + if narrow { 0 } else { WIDE_FLAG }
            + self.pad.bits();
        out.extend_from_slice(&header.to_le_bytes());
        for &(a, b) in &self.pairs {
            if narrow {
                out.extend_from_slice(&(a as u16).to_le_bytes());
                out.extend_from_slice(&(b as u16).to_le_bytes());
            } else {
                out.extend_from_slice(&a.to_le_bytes());
                out.extend_from_slice(&b.to_le_bytes());
            }
        }
    }

    /// Decode a key produced by [`pack`](StatePairList::pack).
    pub fn unpack(key: &[u8]) -> Self {
        let mut list = StatePairList::new();
        if key.len() < 4 {
            return list;
        }
        let header = u32::from_le_bytes([key[0], key[1], key[2], key[3]]);
        list.pad = Padding::from_bits(header);
        let count = (header / 8) as usize;
        let wide = header & WIDE_FLAG != 0;
        list.pairs.reserve(count);
        let mut pos = 4;
        for _ in 0..count {
            let pair = if wide {
                let a = u32::from_le_bytes([key[pos], key[pos + 1], key[pos + 2], key[pos + 3]]);
                let b = u32::from_le_bytes([key[pos + 4], key[pos + 5], key[pos + 6], key[pos + 7]]);
                pos += 8;
                (a, b)
            } else {
                let a = u16::from_le_bytes([key[pos], key[pos + 1]]) as u32;
                let b = u16::from_le_bytes([key[pos + 2], key[pos + 3]]) as u32;
                pos += 4;
                (a, b)
            };
            list.pairs.push(pair);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_uniqueness() {
        let mut list = StatePairList::new();
        assert!(list.insert(3, 1));
        assert!(list.insert(1, 7));
        assert!(!list.insert(3, 1));
        assert!(list.insert(1, 2));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![(1, 2), (1, 7), (3, 1)]);
        assert!(list.remove(1, 7));
        assert!(!list.remove(1, 7));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_empty_list_packs_to_failure_key() {
        let mut key = vec![1, 2, 3];
        let mut list = StatePairList::new();
        list.set_padding(Padding::Left);
        list.pack(&mut key);
        assert!(key.is_empty());
    }

    #[test]
    fn test_pack_width_and_padding() {
        let mut list = StatePairList::new();
        list.insert(1, 2);
        list.insert(5, 6);
        list.set_padding(Padding::Right);
        let mut key = Vec::new();
        list.pack(&mut key);
        assert_eq!(key.len(), 4 + 2 * 4);
        assert_eq!(StatePairList::unpack(&key), list);

        list.insert(70_000, 1);
        list.pack(&mut key);
        assert_eq!(key.len(), 4 + 3 * 8);
        let back = StatePairList::unpack(&key);
        assert!(back.is_right_padded());
        assert!(back.contains(70_000, 1));
        assert_eq!(back, list);
    }
}
