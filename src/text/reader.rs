//! Building automata from parsed record values.

use super::value::{Kind, Value};
use crate::automaton::{Automaton, Flags, LabelData, LabelType, Labels, StorageFormat};
use crate::error::{FsaError, Result};
use crate::subset::StateSubset;
use crate::symbols::{Alphabet, SymbolSpace};
use crate::{StateId, REWRITE_BASE};

/// Alphabet and whether the automaton reads padded pairs of its letters.
fn read_alphabet(value: &Value) -> Result<(Alphabet, bool)> {
    let kind = value.field("type").map(Value::as_str).transpose()?.unwrap_or("identifiers");
    if kind == "product" {
        let (base, nested) = read_alphabet(value.required("base")?)?;
        if nested {
            return Err(value.invalid("nested product alphabets are not supported"));
        }
        if let Some(size) = value.field("size") {
            if size.as_usize()? != base.product_alphabet_size() {
                return Err(size.invalid("product alphabet size does not match its base"));
            }
        }
        return Ok((base, true));
    }
    let alphabet = match value.field("names") {
        Some(names) => {
            let names = names
                .as_list()?
                .iter()
                .map(|n| n.as_str().map(str::to_string))
                .collect::<Result<Vec<_>>>()?;
            let alphabet = Alphabet::with_names(names);
            if let Some(size) = value.field("size") {
                if size.as_usize()? != alphabet.letter_count() {
                    return Err(size.invalid("alphabet size does not match its names"));
                }
            }
            alphabet
        }
        None => Alphabet::new(value.required("size")?.as_usize()?),
    };
    Ok((alphabet, false))
}

fn read_word(value: &Value) -> Result<Vec<u32>> {
    value
        .as_int_list()?
        .into_iter()
        .map(|g| {
            if g < 1 || g > u32::MAX as i64 {
                Err(value.invalid(format!("letter {} is out of range", g)))
            } else {
                Ok((g - 1) as u32)
            }
        })
        .collect()
}

fn read_label(label_type: LabelType, value: &Value) -> Result<Option<LabelData>> {
    if value.kind == Kind::Blank {
        return Ok(None);
    }
    let data = match label_type {
        LabelType::Unlabelled => return Ok(None),
        LabelType::Identifiers => LabelData::Identifier(value.as_str()?.to_string()),
        LabelType::Strings => LabelData::Text(value.as_str()?.to_string()),
        LabelType::Words => LabelData::Word(read_word(value)?),
        LabelType::ListOfWords => LabelData::Words(
            value
                .as_list()?
                .iter()
                .map(read_word)
                .collect::<Result<Vec<_>>>()?,
        ),
        LabelType::ListOfIntegers => LabelData::Integers(
            value
                .as_int_list()?
                .into_iter()
                .map(|i| u32::try_from(i).map_err(|_| value.invalid(format!("{} is not a label integer", i))))
                .collect::<Result<Vec<_>>>()?,
        ),
    };
    Ok(Some(data))
}

fn label_type_of(value: &Value) -> Result<LabelType> {
    let name = value.required("type")?;
    LabelType::from_name(name.as_str()?)
        .ok_or_else(|| name.invalid(format!("unknown state type `{}`", name.as_str().unwrap_or(""))))
}

/// Labels of the states record, or `None` for simple states.
fn read_labels(states: &Value, state_count: usize) -> Result<Option<Labels>> {
    let type_value = states.required("type")?;
    if type_value.as_str()? == "labelled" {
        let table = states.required("labels")?;
        let label_type = label_type_of(table)?;
        let names = table.required("names")?.as_list()?;
        let mut labels = Labels::new(label_type, state_count);
        labels.set_label_count(names.len() + 1);
        for (i, name) in names.iter().enumerate() {
            labels.set_label_data(i as u32 + 1, read_label(label_type, name)?)?;
        }
        for pair in states.required("setToLabels")?.as_list()? {
            let pair_values = pair.as_int_list()?;
            let (state, label) = match pair_values.as_slice() {
                [s, l] => (*s, *l),
                _ => return Err(pair.invalid("expected a [state, label] pair")),
            };
            if state < 1 || state as usize >= state_count {
                return Err(pair.invalid(format!("state {} is out of range", state)));
            }
            if label < 0 || label as usize > names.len() {
                return Err(pair.invalid(format!("label {} is out of range", label)));
            }
            labels.set_label_nr(state as StateId, label as u32)?;
        }
        return Ok(Some(labels));
    }

    let label_type = label_type_of(states)?;
    if label_type == LabelType::Unlabelled {
        return Ok(None);
    }
    // one label per state, numbered like the states
    let names = states.required("names")?.as_list()?;
    if names.len() + 1 != state_count {
        return Err(states.invalid("state names do not match the number of states"));
    }
    let mut labels = Labels::new(label_type, state_count);
    labels.set_label_count(state_count);
    for (i, name) in names.iter().enumerate() {
        let id = i as u32 + 1;
        labels.set_label_data(id, read_label(label_type, name)?)?;
        labels.set_label_nr(id, id)?;
    }
    Ok(Some(labels))
}

fn read_subset(value: &Value, state_count: usize) -> Result<StateSubset> {
    if let Kind::Ident(s) | Kind::Str(s) = &value.kind {
        if s == "SSF_All" {
            return Ok(StateSubset::all(state_count));
        }
    }
    let mut set = StateSubset::empty(state_count);
    for s in value.as_int_list()? {
        if s < 1 || s as usize >= state_count {
            return Err(value.invalid(format!("state {} is out of range", s)));
        }
        set.include(s as StateId);
    }
    Ok(set)
}

fn read_flags(value: &Value) -> Result<Flags> {
    let mut flags = Flags::NONE;
    for item in value.as_list()? {
        let name = item.as_str()?;
        let flag = Flags::from_name(name).ok_or_else(|| item.invalid(format!("unknown flag `{}`", name)))?;
        flags.insert(flag);
    }
    Ok(flags)
}

/// Negative targets are rewrite markers.
fn read_target(value: &Value, state_count: usize) -> Result<StateId> {
    let t = value.as_int()?;
    if t < 0 {
        let marker = t as i32 as u32;
        if t < i32::MIN as i64 || marker < REWRITE_BASE {
            return Err(value.invalid(format!("{} is not a rewrite marker", t)));
        }
        return Ok(marker);
    }
    if t as usize >= state_count {
        return Err(value.invalid(format!("target {} is out of range", t)));
    }
    Ok(t as StateId)
}

fn read_table(fsa: &mut Automaton, table: &Value) -> Result<()> {
    let nr_symbols = fsa.alphabet_size();
    let state_count = fsa.state_count();
    if let Some(n) = table.field("numTransitions") {
        if n.as_usize()? != nr_symbols {
            return Err(n.invalid(format!("expected {} transitions per state", nr_symbols)));
        }
    }
    let format = table.field("format").map(Value::as_str).transpose()?.unwrap_or("dense deterministic");
    let sparse = match format {
        "dense deterministic" => false,
        "sparse" => true,
        other => return Err(table.invalid(format!("unknown table format `{}`", other))),
    };
    let rows = table.required("transitions")?.as_list()?;
    if rows.len() + 1 != state_count {
        return Err(table.invalid(format!("expected {} rows, found {}", state_count - 1, rows.len())));
    }
    let mut row = vec![0 as StateId; nr_symbols];
    for (i, line) in rows.iter().enumerate() {
        row.fill(0);
        let cells = line.as_list()?;
        if sparse {
            for cell in cells {
                let pair = cell.as_list()?;
                let (symbol, target) = match pair {
                    [symbol, target] => (symbol.as_int()?, target),
                    _ => return Err(cell.invalid("expected a [symbol, target] pair")),
                };
                if symbol < 1 || symbol as usize > nr_symbols {
                    return Err(cell.invalid(format!("symbol {} is out of range", symbol)));
                }
                row[symbol as usize - 1] = read_target(target, state_count)?;
            }
        } else {
            if cells.len() != nr_symbols {
                return Err(line.invalid(format!("expected {} targets, found {}", nr_symbols, cells.len())));
            }
            for (slot, cell) in row.iter_mut().zip(cells) {
                *slot = read_target(cell, state_count)?;
            }
        }
        fsa.set_transitions(i as StateId + 1, &row)?;
    }
    Ok(())
}

/// Build an automaton from a parsed `rec(isFSA := true, ...)` value.
pub(super) fn automaton_from_value(value: &Value, storage: StorageFormat) -> Result<Automaton> {
    match value.field("isFSA").map(|v| &v.kind) {
        Some(Kind::Bool(true)) => {}
        _ => return Err(value.invalid("not an automaton record (isFSA := true is missing)")),
    }
    let (alphabet, product) = read_alphabet(value.required("alphabet")?)?;
    let states = value.required("states")?;
    let state_count = states.required("size")?.as_usize()? + 1;
    if state_count > (REWRITE_BASE as usize) {
        return Err(FsaError::StateLimitExceeded {
            limit: REWRITE_BASE as usize - 1,
        });
    }
    let labels = read_labels(states, state_count)?;

    let mut fsa = if product {
        Automaton::product(alphabet, state_count, storage)
    } else {
        Automaton::base(alphabet, state_count, storage)
    };
    let flags = match value.field("flags") {
        Some(flags) => read_flags(flags)?,
        None => Flags::DFA,
    };
    *fsa.initial_mut() = match value.field("initial") {
        Some(initial) => read_subset(initial, state_count)?,
        None => StateSubset::empty(state_count),
    };
    *fsa.accepting_mut() = read_subset(value.required("accepting")?, state_count)?;
    read_table(&mut fsa, value.required("table")?)?;
    fsa.set_labels(labels);
    fsa.set_flags(flags);
    if fsa.has_multiple_initial_states() {
        fsa.change_flags(Flags::MIDFA, Flags::DFA);
    }
    fsa.tidy();
    Ok(fsa)
}
