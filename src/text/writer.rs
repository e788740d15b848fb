//! Formatting automata as GAP-style records.

use crate::automaton::flags::FLAG_NAMES;
use crate::automaton::{Automaton, Flags, LabelData, Labels};
use crate::subset::StateSubset;
use crate::symbols::{Alphabet, SymbolSpace};
use crate::StateId;

const RESERVED: [&str; 4] = ["rec", "true", "false", "_"];

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let first_ok = chars.next().map_or(false, |c| c.is_alphabetic() || c == '_');
    first_ok && chars.all(|c| c.is_alphanumeric() || c == '_') && !RESERVED.contains(&name)
}

fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn name_text(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        quoted(name)
    }
}

fn alphabet_text(alphabet: &Alphabet) -> String {
    let names: Vec<String> = alphabet.names().iter().map(|n| name_text(n)).collect();
    format!(
        "rec(type := \"identifiers\", size := {}, format := \"dense\", names := [{}])",
        alphabet.letter_count(),
        names.join(",")
    )
}

fn word_text(word: &[u32]) -> String {
    let letters: Vec<String> = word.iter().map(|g| (g + 1).to_string()).collect();
    format!("[{}]", letters.join(","))
}

fn label_text(data: Option<&LabelData>) -> String {
    match data {
        None => "_".to_string(),
        Some(LabelData::Identifier(s)) => name_text(s),
        Some(LabelData::Text(s)) => quoted(s),
        Some(LabelData::Word(w)) => word_text(w),
        Some(LabelData::Words(words)) => {
            let words: Vec<String> = words.iter().map(|w| word_text(w)).collect();
            format!("[{}]", words.join(","))
        }
        Some(LabelData::Integers(values)) => {
            let values: Vec<String> = values.iter().map(u32::to_string).collect();
            format!("[{}]", values.join(","))
        }
    }
}

fn subset_text(set: &StateSubset, state_count: usize) -> String {
    let n = state_count.saturating_sub(1);
    if n > 1 && set.count() == n {
        return format!("[1..{}]", n);
    }
    let members: Vec<String> = set.iter().map(|s| s.to_string()).collect();
    format!("[{}]", members.join(","))
}

/// Rewrite markers are written as the negative numbers they look like.
fn target_text(fsa: &Automaton, target: StateId) -> String {
    if fsa.is_rewrite(target) {
        (target as i32).to_string()
    } else {
        target.to_string()
    }
}

fn labels_text(out: &mut String, labels: &Labels, state_count: usize) {
    out.push_str("    type := \"labelled\",\n");
    out.push_str(&format!("    size := {},\n", state_count - 1));
    out.push_str("    labels := rec\n    (\n");
    out.push_str(&format!("      type := {},\n", quoted(labels.label_type().name())));
    out.push_str(&format!("      size := {},\n", labels.label_count() - 1));
    out.push_str("      names :=\n      [\n");
    let names: Vec<String> = (1..labels.label_count() as u32)
        .map(|l| format!("        {}", label_text(labels.label_data(l))))
        .collect();
    if !names.is_empty() {
        out.push_str(&names.join(",\n"));
        out.push('\n');
    }
    out.push_str("      ]\n    ),\n");
    out.push_str("    format := \"sparse\",\n");
    out.push_str("    setToLabels :=\n    [\n");
    let pairs: Vec<String> = (1..state_count as StateId)
        .filter(|&s| labels.label_nr(s) != 0)
        .map(|s| format!("      [{},{}]", s, labels.label_nr(s)))
        .collect();
    if !pairs.is_empty() {
        out.push_str(&pairs.join(",\n"));
        out.push('\n');
    }
    out.push_str("    ]\n");
}

/// The full record text, ending with `;` and a newline.
pub(super) fn record_text(fsa: &Automaton, name: &str, sparse: bool) -> String {
    let state_count = fsa.state_count();
    let alphabet = fsa.alphabet();
    let product = fsa.is_product();
    let sparse = sparse || product;
    let mut out = String::new();

    out.push_str(&format!("{} := rec\n(\n  isFSA := true,\n", name));
    if product {
        out.push_str(&format!(
            "  alphabet := rec(type := \"product\", size := {}, arity := 2, padding := _, base := {}),\n",
            alphabet.product_alphabet_size(),
            alphabet_text(alphabet)
        ));
    } else {
        out.push_str(&format!("  alphabet := {},\n", alphabet_text(alphabet)));
    }

    out.push_str("  states := rec\n  (\n");
    match fsa.labels() {
        Some(labels) if labels.label_count() > 1 => labels_text(&mut out, labels, state_count),
        _ => {
            out.push_str("    type := \"simple\",\n");
            out.push_str(&format!("    size := {}\n", state_count - 1));
        }
    }
    out.push_str("  ),\n");

    let mut flags = vec![if fsa.has_multiple_initial_states() { "MIDFA" } else { "DFA" }];
    let shape = Flags::DFA | Flags::NFA | Flags::MIDFA;
    flags.extend(
        FLAG_NAMES
            .iter()
            .filter(|(flag, _)| !shape.intersects(*flag) && fsa.flags().contains(*flag))
            .map(|(_, name)| *name),
    );
    let flags: Vec<String> = flags.iter().map(|f| quoted(f)).collect();
    out.push_str(&format!("  flags := [{}],\n", flags.join(",")));
    out.push_str(&format!("  initial := {},\n", subset_text(fsa.initial(), state_count)));
    out.push_str(&format!("  accepting := {},\n", subset_text(fsa.accepting(), state_count)));

    let format = if sparse { "sparse" } else { "dense deterministic" };
    out.push_str("  table := rec\n  (\n");
    out.push_str(&format!("    format := {},\n", quoted(format)));
    out.push_str(&format!("    numTransitions := {},\n", fsa.alphabet_size()));
    out.push_str("    transitions :=\n    [\n");
    let mut row = vec![0; fsa.alphabet_size()];
    let mut rows = Vec::with_capacity(state_count);
    for s in 1..state_count as StateId {
        fsa.row(s, &mut row);
        let cells: Vec<String> = if sparse {
            row.iter()
                .enumerate()
                .filter(|(_, &t)| t != 0)
                .map(|(ti, &t)| format!("[{},{}]", ti + 1, target_text(fsa, t)))
                .collect()
        } else {
            row.iter().map(|&t| target_text(fsa, t)).collect()
        };
        rows.push(format!("      [{}]", cells.join(",")));
    }
    if !rows.is_empty() {
        out.push_str(&rows.join(",\n"));
        out.push('\n');
    }
    out.push_str("    ]\n  )\n);\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::StorageFormat;

    #[test]
    fn test_identifier_detection() {
        assert!(is_identifier("a"));
        assert!(is_identifier("x_1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("rec"));
        assert!(!is_identifier("a b"));
        assert_eq!(name_text("a b"), "\"a b\"");
    }

    #[test]
    fn test_record_layout() {
        let mut fsa = Automaton::new(Alphabet::new(2), 2, 4, StorageFormat::Dense);
        fsa.set_transitions(1, &[2, 2]).unwrap();
        fsa.set_transitions(2, &[3, 3]).unwrap();
        fsa.accepting_mut().set_all();
        let text = record_text(&fsa, "fsa", false);
        assert!(text.starts_with("fsa := rec\n(\n  isFSA := true,\n"));
        assert!(text.contains("names := [a,b]"));
        assert!(text.contains("type := \"simple\""));
        assert!(text.contains("accepting := [1..3]"));
        assert!(text.contains("initial := [1]"));
        assert!(text.contains("\"dense deterministic\""));
        assert!(text.contains("      [2,2],\n      [3,3],\n      [0,0]\n"));
        assert!(text.ends_with(");\n"));
    }

    #[test]
    fn test_sparse_rows_and_markers() {
        let mut fsa = Automaton::new(Alphabet::new(3), 3, 2, StorageFormat::Sparse);
        fsa.set_transitions(1, &[0, crate::REWRITE_BASE + 2, 1]).unwrap();
        let text = record_text(&fsa, "rws", true);
        let marker = (crate::REWRITE_BASE + 2) as i32;
        assert!(text.contains(&format!("[[2,{}],[3,1]]", marker)));
    }
}
