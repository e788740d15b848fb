//! Symbol spaces: plain alphabets and the paired alphabets of product automata.
//!
//! The engine never looks at what a symbol means. A transition index is just
//! a column in a transition row; for product automata a column stands for a
//! pair of letters, either of which may be the padding symbol.
//!
//! Letters are numbered `0..letter_count`. The padding symbol is the index
//! `letter_count`, so a product transition for `(g1, g2)` sits at column
//! `g1 * (letter_count + 1) + g2`. The pair `(padding, padding)` is the last
//! column of that grid and is excluded, which gives the product alphabet
//! `(n + 1)^2 - 1` columns.

/// A transition index (column in a transition row).
pub type Symbol = usize;

/// Collaborator interface describing the symbols an automaton reads.
pub trait SymbolSpace {
    /// Number of letters in the base alphabet.
    fn letter_count(&self) -> usize;

    /// Index of the padding symbol used by product alphabets.
    fn padding_symbol(&self) -> usize {
        self.letter_count()
    }

    /// Number of transitions of a product automaton over this alphabet.
    fn product_alphabet_size(&self) -> usize {
        let n = self.letter_count() + 1;
        n * n - 1
    }

    /// Transition index for the letter pair `(g1, g2)`.
    fn product_id(&self, g1: usize, g2: usize) -> Symbol {
        g1 * (self.letter_count() + 1) + g2
    }

    /// Transition index of `(g1, 0)`: the start of the block of pairs with left letter `g1`.
    fn product_base(&self, g1: usize) -> Symbol {
        self.product_id(g1, 0)
    }

    /// Inverse of [`product_id`](SymbolSpace::product_id).
    fn product_generators(&self, ti: Symbol) -> (usize, usize) {
        let n = self.letter_count() + 1;
        (ti / n, ti % n)
    }
}

/// A finite alphabet with printable letter names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Alphabet {
    names: Vec<String>,
}

impl Alphabet {
    /// Create an alphabet of `letter_count` letters with generated names.
    ///
    /// Up to 26 letters are named `a`..`z`, larger alphabets use `x1`, `x2`, ...
    pub fn new(letter_count: usize) -> Self {
        let names = (0..letter_count)
            .map(|i| {
                if letter_count <= 26 {
                    char::from(b'a' + i as u8).to_string()
                } else {
                    format!("x{}", i + 1)
                }
            })
            .collect();
        Alphabet { names }
    }

    /// Create an alphabet from explicit letter names.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Alphabet {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Name of a letter, or `_` for the padding symbol.
    pub fn glyph(&self, g: usize) -> &str {
        self.names.get(g).map(String::as_str).unwrap_or("_")
    }

    /// All letter names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl SymbolSpace for Alphabet {
    fn letter_count(&self) -> usize {
        self.names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_layout() {
        let a = Alphabet::new(2);
        assert_eq!(a.product_alphabet_size(), 8);
        assert_eq!(a.product_id(0, 0), 0);
        assert_eq!(a.product_id(1, 2), 5);
        assert_eq!(a.product_id(2, 1), 7);
        assert_eq!(a.product_base(1), 3);
        for ti in 0..a.product_alphabet_size() {
            let (g1, g2) = a.product_generators(ti);
            assert_eq!(a.product_id(g1, g2), ti);
            assert!(!(g1 == 2 && g2 == 2));
        }
    }

    #[test]
    fn test_generated_names() {
        let a = Alphabet::new(3);
        assert_eq!(a.names(), &["a", "b", "c"]);
        assert_eq!(a.glyph(3), "_");
        let big = Alphabet::new(30);
        assert_eq!(big.glyph(0), "x1");
        assert_eq!(big.glyph(29), "x30");
    }
}
