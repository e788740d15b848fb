//! Structural property flags carried by every automaton.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A set of structural properties of an automaton.
///
/// Flags are claims made by whoever built the automaton. Algorithms set the
/// flags they can guarantee and clear those they may have invalidated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Flags(u32);

impl Flags {
    /// No flags set
    pub const NONE: Flags = Flags(0);
    /// Deterministic with a single initial state
    pub const DFA: Flags = Flags(1);
    /// Non-deterministic
    pub const NFA: Flags = Flags(2);
    /// Deterministic transitions but several initial states
    pub const MIDFA: Flags = Flags(4);
    /// No two states accept the same language
    pub const MINIMISED: Flags = Flags(8);
    /// Every state is reachable from an initial state
    pub const ACCESSIBLE: Flags = Flags(16);
    /// Accessible, and every state can reach an accepting state
    pub const TRIM: Flags = Flags(32);
    /// Transitions stored compressed
    pub const SPARSE: Flags = Flags(64);
    /// Transitions stored as a flat array
    pub const DENSE: Flags = Flags(128);
    /// States numbered in breadth-first order from the initial states
    pub const BFS: Flags = Flags(256);
    /// Some transitions are rewrite markers rather than states
    pub const RWS: Flags = Flags(512);

    /// Raw bit value.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Flags(bits)
    }

    /// True if every flag in `other` is set.
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any flag in `other` is set.
    pub const fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    /// Set the flags in `other`.
    pub fn insert(&mut self, other: Flags) {
        self.0 |= other.0;
    }

    /// Clear the flags in `other`.
    pub fn remove(&mut self, other: Flags) {
        self.0 &= !other.0;
    }

    /// Set or clear the flags in `other`.
    pub fn set(&mut self, other: Flags, value: bool) {
        if value {
            self.insert(other)
        } else {
            self.remove(other)
        }
    }

    /// Names of the set flags as written in the text format.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        FLAG_NAMES
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
    }

    /// Look up a flag by its text-format name.
    pub fn from_name(name: &str) -> Option<Flags> {
        FLAG_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| *flag)
    }
}

/// Text-format names of the flags, in bit order.
pub const FLAG_NAMES: [(Flags, &str); 10] = [
    (Flags::DFA, "DFA"),
    (Flags::NFA, "NFA"),
    (Flags::MIDFA, "MIDFA"),
    (Flags::MINIMISED, "minimized"),
    (Flags::ACCESSIBLE, "accessible"),
    (Flags::TRIM, "trim"),
    (Flags::SPARSE, "sparse"),
    (Flags::DENSE, "dense"),
    (Flags::BFS, "BFS"),
    (Flags::RWS, "RWS"),
];

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.names().collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_names() {
        let f = Flags::DFA | Flags::MINIMISED | Flags::BFS;
        assert_eq!(f.names().collect::<Vec<_>>(), vec!["DFA", "minimized", "BFS"]);
        assert_eq!(Flags::from_name("trim"), Some(Flags::TRIM));
        assert_eq!(Flags::from_name("bogus"), None);
        assert_eq!(f.to_string(), "[DFA, minimized, BFS]");
    }

    #[test]
    fn test_set_and_clear() {
        let mut f = Flags::NONE;
        f.insert(Flags::TRIM | Flags::ACCESSIBLE);
        assert!(f.contains(Flags::TRIM));
        f.remove(Flags::TRIM);
        assert!(!f.contains(Flags::TRIM));
        assert!(f.intersects(Flags::TRIM | Flags::ACCESSIBLE));
        f.set(Flags::RWS, true);
        assert_eq!(f.bits(), 16 | 512);
    }
}
