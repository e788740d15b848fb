//! Boolean combinations of two automata and complement.

use super::{check_same_alphabet, key_of, step, Factory};
use crate::automaton::{Automaton, Flags};
use crate::codec::packer::TuplePacker;
use crate::error::Result;
use crate::StateId;

/// The boolean operation computed by [`Factory::binop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinopKind {
    /// Words accepted by both
    And,
    /// Words accepted by either
    Or,
    /// Words accepted by the first but not the second
    AndNot,
    /// Words accepted by the second but not the first
    NotAnd,
    /// Like [`AndNot`](BinopKind::AndNot), but words with a prefix in the
    /// result are dropped
    AndNotFirst,
    /// [`AndNotFirst`](BinopKind::AndNotFirst) finished by trimming instead
    /// of minimising
    AndNotFirstTrim,
    /// Like [`And`](BinopKind::And), but words with a prefix in the result
    /// are dropped
    AndFirst,
}

impl BinopKind {
    /// Name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            BinopKind::And => "and",
            BinopKind::Or => "or",
            BinopKind::AndNot => "and-not",
            BinopKind::NotAnd => "not-and",
            BinopKind::AndNotFirst => "and-not-first",
            BinopKind::AndNotFirstTrim => "and-not-first-trim",
            BinopKind::AndFirst => "and-first",
        }
    }

    fn accepts(self, accept_0: bool, accept_1: bool) -> bool {
        match self {
            BinopKind::And | BinopKind::AndFirst => accept_0 && accept_1,
            BinopKind::Or => accept_0 || accept_1,
            BinopKind::AndNot | BinopKind::AndNotFirst | BinopKind::AndNotFirstTrim => {
                accept_0 && !accept_1
            }
            BinopKind::NotAnd => !accept_0 && accept_1,
        }
    }
}

impl Factory {
    /// Combine the languages of `fsa_0` and `fsa_1`.
    ///
    /// States of the result are pairs of operand states. Once an operand's
    /// outcome is settled its component is replaced by a sentinel one past
    /// its last state, so it is no longer followed. Labels are taken from
    /// `fsa_0`. Operands with several initial states are determinised first.
    pub fn binop(&self, fsa_0: &Automaton, fsa_1: &Automaton, kind: BinopKind) -> Result<Automaton> {
        check_same_alphabet(fsa_0, fsa_1)?;
        if fsa_0.initial().count() != 1 {
            let dfa = self.determinize(fsa_0)?;
            return self.binop(&dfa, fsa_1, kind);
        }
        if fsa_1.initial().count() != 1 {
            let dfa = self.determinize_with(fsa_1, super::DeterminizePolicy::All, true)?;
            return self.binop(fsa_0, &dfa, kind);
        }
        let nr_symbols = fsa_0.alphabet_size();
        let n0 = fsa_0.state_count() as StateId;
        let n1 = fsa_1.state_count() as StateId;
        let fail_0 = if kind == BinopKind::NotAnd { n0 } else { 0 };
        let fail_1 = match kind {
            BinopKind::AndNot | BinopKind::AndNotFirst | BinopKind::AndNotFirstTrim => n1,
            _ => 0,
        };
        let first_only = matches!(kind, BinopKind::AndNotFirst | BinopKind::AndNotFirstTrim);
        let packer = TuplePacker::new(&[n0, n1]);

        let mut builder = self.builder(fsa_0.alphabet(), nr_symbols);
        let mut key = Vec::with_capacity(packer.key_size());
        packer.pack(&[fail_0, fail_1], &mut key);
        builder.find_state(&key)?;
        let initial = [
            fsa_0.initial().first().unwrap_or(0),
            fsa_1.initial().first().unwrap_or(0),
        ];
        packer.pack(&initial, &mut key);
        let start = builder.find_state(&key)?;
        if start != 0 {
            builder.automaton_mut().initial_mut().include(start);
        }

        let mut status = self.status();
        let mut row = vec![0 as StateId; nr_symbols];
        let mut pairs: Vec<[StateId; 2]> = vec![[fail_0, fail_1]];
        let mut id: StateId = 1;
        while (id as usize) < builder.state_count() {
            self.check_abort()?;
            let old = packer.unpack(key_of(&builder, id, "binop")?);
            let (s0, s1) = (old[0], old[1]);
            pairs.push([s0, s1]);
            let no_transitions = (first_only && fsa_0.is_accepting(s0) && !fsa_1.is_accepting(s1))
                || (kind == BinopKind::AndFirst && fsa_0.is_accepting(s0) && fsa_1.is_accepting(s1));

            for (symbol, cell) in row.iter_mut().enumerate() {
                let mut k0 = if s0 == fail_0 { fail_0 } else { step(fsa_0, s0, symbol) };
                let mut k1 = if s1 == fail_1 { fail_1 } else { step(fsa_1, s1, symbol) };
                match kind {
                    BinopKind::Or => {}
                    BinopKind::And | BinopKind::AndFirst => {
                        if no_transitions || k0 == 0 || k1 == 0 {
                            k0 = 0;
                            k1 = 0;
                        }
                    }
                    BinopKind::NotAnd => {
                        if k0 == 0 {
                            k0 = fail_0;
                        }
                        if k1 == 0 {
                            k0 = fail_0;
                        }
                    }
                    BinopKind::AndNot | BinopKind::AndNotFirst | BinopKind::AndNotFirstTrim => {
                        if k1 == 0 {
                            k1 = fail_1;
                        }
                        if k0 == 0 || no_transitions {
                            k0 = 0;
                            k1 = fail_1;
                        }
                    }
                }
                packer.pack(&[k0, k1], &mut key);
                *cell = builder.find_state(&key)?;
            }
            builder.set_transitions(id, &row)?;
            let count = builder.state_count();
            status.report(|| format!("binop {}: state {} of {}", kind.name(), id, count - 1));
            id += 1;
        }

        let state_count = builder.state_count();
        let mut labels = fsa_0.labels().map(|l| l.renumber(&[], state_count));
        for (id, &[s0, s1]) in pairs.iter().enumerate().skip(1) {
            if kind.accepts(fsa_0.is_accepting(s0), fsa_1.is_accepting(s1)) {
                builder.automaton_mut().accepting_mut().include(id as StateId);
            }
            if let Some(l) = &mut labels {
                l.set_label_nr(id as StateId, fsa_0.label_nr(s0))?;
            }
        }
        builder.remove_keys();
        builder.automaton_mut().set_labels(labels);
        let built = self.finish(builder)?;
        log::info!(
            "binop {}: {} x {} states -> {}",
            kind.name(),
            n0 - 1,
            n1 - 1,
            built.state_count() - 1
        );
        if kind == BinopKind::AndNotFirstTrim {
            self.trim(&built)
        } else {
            self.minimize(&built)
        }
    }

    /// Intersection.
    pub fn and(&self, fsa_0: &Automaton, fsa_1: &Automaton) -> Result<Automaton> {
        self.binop(fsa_0, fsa_1, BinopKind::And)
    }

    /// Union.
    pub fn or(&self, fsa_0: &Automaton, fsa_1: &Automaton) -> Result<Automaton> {
        self.binop(fsa_0, fsa_1, BinopKind::Or)
    }

    /// Difference.
    pub fn and_not(&self, fsa_0: &Automaton, fsa_1: &Automaton) -> Result<Automaton> {
        self.binop(fsa_0, fsa_1, BinopKind::AndNot)
    }

    /// The words `fsa` rejects.
    ///
    /// Every failing transition is sent to a new sink state, which accepts
    /// if any transition failed at all. With `first_only` the sink has no
    /// transitions of its own, so only words whose last letter is the first
    /// to fail are accepted. Rewrite markers count as failures.
    ///
    /// The initial states are kept as they are. For an automaton with several
    /// initial states the result accepts a word rejected from any one of
    /// them, which is the union of the complements of each start. Call
    /// [`determinize`](Factory::determinize) first to complement the
    /// language itself.
    pub fn complement(&self, fsa: &Automaton, first_only: bool) -> Result<Automaton> {
        let nr_states = fsa.state_count();
        let nr_symbols = fsa.alphabet_size();
        let sink = nr_states as StateId;
        let mut result = self.new_automaton(fsa.alphabet(), nr_symbols, nr_states + 1)?;

        let mut found = false;
        let mut row = vec![0 as StateId; nr_symbols];
        for s in 1..sink {
            fsa.row(s, &mut row);
            for t in row.iter_mut() {
                if !fsa.is_valid_state(*t) {
                    *t = sink;
                    found = true;
                }
            }
            result.set_transitions(s, &row)?;
            if !fsa.is_accepting(s) {
                result.accepting_mut().include(s);
            }
        }
        if !first_only {
            row.fill(sink);
            result.set_transitions(sink, &row)?;
        }
        // an unreachable sink must not accept, so minimising removes it
        if found {
            result.accepting_mut().include(sink);
        }
        *result.initial_mut() = fsa.initial().renumber(&identity(nr_states), nr_states + 1);
        result.set_labels(fsa.labels().map(|l| l.renumber(&identity(nr_states), nr_states + 1)));
        result.tidy();

        let mut answer = self.minimize(&result)?;
        if fsa.flags().contains(Flags::BFS) {
            answer.sort_bfs()?;
        }
        Ok(answer)
    }

    /// Flip acceptance on every state and minimise. For a trim `fsa` this
    /// accepts the prefixes of accepted words that are not accepted
    /// themselves.
    pub fn unaccepted_prefix(&self, fsa: &Automaton) -> Result<Automaton> {
        let mut flipped = self.copy(fsa)?;
        for s in 1..flipped.state_count() as StateId {
            if flipped.is_accepting(s) {
                flipped.accepting_mut().exclude(s);
            } else {
                flipped.accepting_mut().include(s);
            }
        }
        flipped.change_flags(Flags::NONE, Flags::MINIMISED | Flags::TRIM);
        self.minimize(&flipped)
    }
}

fn identity(n: usize) -> Vec<StateId> {
    (0..n as StateId).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::StorageFormat;
    use crate::symbols::Alphabet;

    /// Words over {a, b} containing an `a`.
    fn has_a() -> Automaton {
        let mut fsa = Automaton::new(Alphabet::new(2), 2, 3, StorageFormat::Dense);
        fsa.set_transitions(1, &[2, 1]).unwrap();
        fsa.set_transitions(2, &[2, 2]).unwrap();
        fsa.accepting_mut().include(2);
        fsa
    }

    /// Words over {a, b} of even length.
    fn even() -> Automaton {
        let mut fsa = Automaton::new(Alphabet::new(2), 2, 3, StorageFormat::Dense);
        fsa.set_transitions(1, &[2, 2]).unwrap();
        fsa.set_transitions(2, &[1, 1]).unwrap();
        fsa.accepting_mut().include(1);
        fsa
    }

    fn all_words(max: usize) -> Vec<Vec<usize>> {
        let mut words = vec![vec![]];
        let mut level = vec![vec![]];
        for _ in 0..max {
            let mut next = Vec::new();
            for w in &level {
                for g in 0..2 {
                    let mut v: Vec<usize> = w.clone();
                    v.push(g);
                    next.push(v);
                }
            }
            words.extend(next.iter().cloned());
            level = next;
        }
        words
    }

    #[test]
    fn test_boolean_operations() {
        let factory = Factory::default();
        let (a, e) = (has_a(), even());
        let and = factory.and(&a, &e).unwrap();
        let or = factory.or(&a, &e).unwrap();
        let and_not = factory.and_not(&a, &e).unwrap();
        let not_and = factory.binop(&a, &e, BinopKind::NotAnd).unwrap();
        for w in all_words(4) {
            let (x, y) = (a.accepts(&w), e.accepts(&w));
            assert_eq!(and.accepts(&w), x && y, "and {:?}", w);
            assert_eq!(or.accepts(&w), x || y, "or {:?}", w);
            assert_eq!(and_not.accepts(&w), x && !y, "and-not {:?}", w);
            assert_eq!(not_and.accepts(&w), !x && y, "not-and {:?}", w);
        }
    }

    #[test]
    fn test_and_not_with_itself_is_empty() {
        let fsa = has_a();
        let empty = Factory::default().and_not(&fsa, &fsa).unwrap();
        assert_eq!(empty.state_count(), 2);
        assert!(empty.accepting().is_empty());
    }

    #[test]
    fn test_first_variants_stop_at_first_accept() {
        let factory = Factory::default();
        let (a, e) = (has_a(), even());
        let first = factory.binop(&a, &e, BinopKind::AndNotFirst).unwrap();
        // "a" is accepted; "ab" extends an accepted word so it is not
        assert!(first.accepts(&[0]));
        assert!(!first.accepts(&[0, 1, 1]));
        // "bba" has no accepted proper prefix
        assert!(first.accepts(&[1, 1, 0]));

        let trimmed = factory.binop(&a, &e, BinopKind::AndNotFirstTrim).unwrap();
        for w in all_words(4) {
            assert_eq!(trimmed.accepts(&w), first.accepts(&w));
        }

        let and_first = factory.binop(&a, &e, BinopKind::AndFirst).unwrap();
        assert!(and_first.accepts(&[0, 1]));
        assert!(!and_first.accepts(&[0, 1, 1, 1]));
    }

    #[test]
    fn test_alphabet_mismatch() {
        let other = Automaton::new(Alphabet::new(3), 3, 2, StorageFormat::Dense);
        let err = Factory::default().and(&has_a(), &other).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_complement() {
        let factory = Factory::default();
        let fsa = has_a();
        let not = factory.complement(&fsa, false).unwrap();
        for w in all_words(4) {
            assert_eq!(not.accepts(&w), !fsa.accepts(&w));
        }

        // a then anything: the first failure is reading b first
        let mut prefix = Automaton::new(Alphabet::new(2), 2, 3, StorageFormat::Dense);
        prefix.set_transitions(1, &[2, 0]).unwrap();
        prefix.set_transitions(2, &[2, 2]).unwrap();
        prefix.accepting_mut().include(2);
        let first = factory.complement(&prefix, true).unwrap();
        assert!(first.accepts(&[]));
        assert!(first.accepts(&[1]));
        assert!(!first.accepts(&[1, 1]));
        assert!(!first.accepts(&[0, 1]));
    }

    #[test]
    fn test_complement_of_several_starts_is_per_start() {
        // 1 reads a and 2 reads b into the accepting state 3
        let mut fsa = Automaton::new(Alphabet::new(2), 2, 4, StorageFormat::Dense);
        fsa.set_transitions(1, &[3, 0]).unwrap();
        fsa.set_transitions(2, &[0, 3]).unwrap();
        fsa.initial_mut().include(2);
        fsa.accepting_mut().include(3);
        let factory = Factory::default();

        let per_start = factory.complement(&fsa, false).unwrap();
        assert!(per_start.accepts(&[0]));
        assert!(per_start.accepts(&[1]));
        assert!(per_start.accepts(&[]));

        let dfa = factory.determinize(&fsa).unwrap();
        let not = factory.complement(&dfa, false).unwrap();
        assert!(!not.accepts(&[0]));
        assert!(!not.accepts(&[1]));
        assert!(not.accepts(&[]));
        assert!(not.accepts(&[0, 0]));
    }

    #[test]
    fn test_unaccepted_prefix() {
        // accepts exactly "ab"
        let mut fsa = Automaton::new(Alphabet::new(2), 2, 4, StorageFormat::Dense);
        fsa.set_transitions(1, &[2, 0]).unwrap();
        fsa.set_transitions(2, &[0, 3]).unwrap();
        fsa.accepting_mut().include(3);
        let prefixes = Factory::default().unaccepted_prefix(&fsa).unwrap();
        assert!(prefixes.accepts(&[]));
        assert!(prefixes.accepts(&[0]));
        assert!(!prefixes.accepts(&[0, 1]));
        assert!(!prefixes.accepts(&[1]));
    }
}
