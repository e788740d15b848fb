//! Fixed-width keys for tuples of bounded integers and variable-width keys
//! for sorted state lists.
//!
//! Builders identify new states by byte strings. When a new state stands for
//! a tuple of old states (a product construction) the tuple is packed into
//! the fewest bytes that can hold every possible value, so that equal tuples
//! always give equal keys and keys stay short.

use smallvec::SmallVec;

use crate::StateId;

/// Packs tuples `(v0, v1, ...)` with `v_i <= max_i` into fixed-size keys.
///
/// If the product of the ranges fits in 64 bits the tuple is encoded as a
/// mixed-radix number. Otherwise each component gets its own bit field.
/// Either way the key is the little-endian value truncated to
/// [`key_size`](TuplePacker::key_size) bytes.
#[derive(Debug, Clone)]
pub struct TuplePacker {
    radices: SmallVec<[u64; 4]>,
    bits: SmallVec<[u32; 4]>,
    arithmetic: bool,
    key_size: usize,
}

fn bits_for(max: u64) -> u32 {
    64 - max.leading_zeros()
}

impl TuplePacker {
    /// Create a packer for tuples whose components are bounded by `maxima`.
    ///
    /// # Panics
    ///
    /// Panics if `maxima` is empty or has more than 4 components.
    pub fn new(maxima: &[StateId]) -> Self {
        assert!(
            (1..=4).contains(&maxima.len()),
            "tuple packer supports 1 to 4 components"
        );
        let radices: SmallVec<[u64; 4]> = maxima.iter().map(|&m| m as u64 + 1).collect();
        let bits: SmallVec<[u32; 4]> = maxima.iter().map(|&m| bits_for(m as u64)).collect();

        let product = radices
            .iter()
            .try_fold(1u64, |acc, &r| acc.checked_mul(r));
        let (arithmetic, key_bits) = match product {
            Some(p) => (true, bits_for(p - 1)),
            None => (false, bits.iter().sum()),
        };
        TuplePacker {
            radices,
            bits,
            arithmetic,
            key_size: ((key_bits as usize + 7) / 8).max(1),
        }
    }

    /// Number of bytes in every key this packer produces.
    pub fn key_size(&self) -> usize {
        self.key_size
    }

    /// Number of tuple components.
    pub fn arity(&self) -> usize {
        self.radices.len()
    }

    /// Pack `values` into `out`, replacing its contents.
    pub fn pack(&self, values: &[StateId], out: &mut Vec<u8>) {
        debug_assert_eq!(values.len(), self.arity());
        let value: u128 = if self.arithmetic {
            let mut v = 0u64;
            for (&x, &r) in values.iter().zip(&self.radices).rev() {
                debug_assert!((x as u64) < r);
                v = v * r + x as u64;
            }
            v as u128
        } else {
            let mut v = 0u128;
            let mut shift = 0;
            for (&x, &b) in values.iter().zip(&self.bits) {
                v |= (x as u128) << shift;
                shift += b;
            }
            v
        };
        out.clear();
        out.extend_from_slice(&value.to_le_bytes()[..self.key_size]);
    }

    /// Recover the tuple from a key produced by [`pack`](TuplePacker::pack).
    pub fn unpack(&self, key: &[u8]) -> SmallVec<[StateId; 4]> {
        let mut bytes = [0u8; 16];
        bytes[..self.key_size].copy_from_slice(&key[..self.key_size]);
        let mut value = u128::from_le_bytes(bytes);
        let mut out = SmallVec::new();
        if self.arithmetic {
            for &r in &self.radices {
                out.push((value % r as u128) as StateId);
                value /= r as u128;
            }
        } else {
            for &b in &self.bits {
                out.push((value & ((1u128 << b) - 1)) as StateId);
                value >>= b;
            }
        }
        out
    }
}

fn push_varint(mut v: u32, out: &mut Vec<u8>) {
    while v >= 0x80 {
        out.push((v as u8) | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

/// Pack a strictly increasing list of states as delta-encoded varints.
///
/// The empty list packs to no bytes, matching the failure key of a builder.
pub fn pack_state_list(states: &[StateId], out: &mut Vec<u8>) {
    out.clear();
    let mut prev = 0;
    for &s in states {
        debug_assert!(s > prev || prev == 0);
        push_varint(s - prev, out);
        prev = s;
    }
}

/// Inverse of [`pack_state_list`].
pub fn unpack_state_list(key: &[u8]) -> Vec<StateId> {
    let mut states = Vec::new();
    let mut prev = 0u32;
    let mut value = 0u32;
    let mut shift = 0;
    for &b in key {
        value |= ((b & 0x7f) as u32) << shift;
        if b & 0x80 != 0 {
            shift += 7;
        } else {
            prev += value;
            states.push(prev);
            value = 0;
            shift = 0;
        }
    }
    states
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_keys_are_minimal() {
        let packer = TuplePacker::new(&[9, 9]);
        assert_eq!(packer.key_size(), 1);
        let mut key = Vec::new();
        packer.pack(&[9, 9], &mut key);
        assert_eq!(key, vec![99]);
        assert_eq!(packer.unpack(&key).as_slice(), &[9, 9]);
    }

    #[test]
    fn test_wide_tuples_use_bit_fields() {
        let packer = TuplePacker::new(&[u32::MAX, u32::MAX, u32::MAX]);
        assert_eq!(packer.key_size(), 12);
        let mut key = Vec::new();
        packer.pack(&[u32::MAX, 0, 12345], &mut key);
        assert_eq!(packer.unpack(&key).as_slice(), &[u32::MAX, 0, 12345]);
    }

    #[test]
    fn test_distinct_tuples_give_distinct_keys() {
        let packer = TuplePacker::new(&[3, 4, 2]);
        let mut seen = std::collections::HashSet::new();
        let mut key = Vec::new();
        for a in 0..=3 {
            for b in 0..=4 {
                for c in 0..=2 {
                    packer.pack(&[a, b, c], &mut key);
                    assert!(seen.insert(key.clone()));
                }
            }
        }
    }

    #[test]
    fn test_state_list_keys() {
        let mut key = Vec::new();
        pack_state_list(&[], &mut key);
        assert!(key.is_empty());

        let states = vec![1, 2, 130, 100_000, 100_001];
        pack_state_list(&states, &mut key);
        assert_eq!(unpack_state_list(&key), states);
    }
}
