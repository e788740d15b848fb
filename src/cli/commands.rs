//! CLI command implementations

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::automaton::{Automaton, StorageFormat};
use crate::ops::Factory;
use crate::serialization::{AutomatonSerializer, BincodeSerializer, JsonSerializer};
use crate::symbols::{Alphabet, Symbol, SymbolSpace};
use crate::text::TextFormat;

#[cfg(feature = "compression")]
use crate::serialization::GzipSerializer;

use super::args::{Cli, Commands, FileFormat, OutputArgs};
use super::detect::{detect_format, output_format};
use super::paths::load_engine_config;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let config = load_engine_config(cli.config.as_deref())?;
    let storage = config.storage;
    let factory = Factory::new(config);

    let unary = |input: &Path, out: &OutputArgs, op: &dyn Fn(&Automaton) -> crate::Result<Automaton>| -> Result<()> {
        let fsa = load_automaton(input, storage)?;
        let result = op(&fsa).with_context(|| format!("Failed to process {}", input.display()))?;
        save_automaton(&result, out)
    };
    let binary = |left: &Path,
                  right: &Path,
                  out: &OutputArgs,
                  op: &dyn Fn(&Automaton, &Automaton) -> crate::Result<Automaton>|
     -> Result<()> {
        let fsa_0 = load_automaton(left, storage)?;
        let fsa_1 = load_automaton(right, storage)?;
        let result = op(&fsa_0, &fsa_1)
            .with_context(|| format!("Failed to combine {} and {}", left.display(), right.display()))?;
        save_automaton(&result, out)
    };

    match cli.command {
        Commands::Info { input, count_up_to } => cmd_info(&input, count_up_to, storage),
        Commands::Minimize { input, out } => unary(&input, &out, &|a| factory.minimize(a)),
        Commands::Trim { input, out } => unary(&input, &out, &|a| factory.trim(a)),
        Commands::Determinize {
            input,
            policy,
            merge_labels,
            out,
        } => unary(&input, &out, &|a| {
            factory.determinize_with(a, policy.into(), merge_labels)
        }),
        Commands::Reverse {
            input,
            midfa,
            labelled,
            out,
        } => unary(&input, &out, &|a| factory.reverse(a, midfa, labelled)),
        Commands::Star { input, out } => unary(&input, &out, &|a| factory.star(a)),
        Commands::Not {
            input,
            first_only,
            out,
        } => unary(&input, &out, &|a| factory.complement(a, first_only)),
        Commands::Binop {
            left,
            right,
            op,
            out,
        } => binary(&left, &right, &out, &|a, b| factory.binop(a, b, op.into())),
        Commands::Concat { left, right, out } => {
            binary(&left, &right, &out, &|a, b| factory.concat(a, b))
        }
        Commands::Product { left, right, out } => {
            binary(&left, &right, &out, &|a, b| factory.cartesian_product(a, b))
        }
        Commands::Composite {
            left,
            right,
            labelled,
            out,
        } => binary(&left, &right, &out, &|a, b| factory.composite(a, b, labelled)),
        Commands::Exists {
            input,
            sticky,
            swapped,
            out,
        } => unary(&input, &out, &|a| factory.exists(a, sticky, swapped)),
        Commands::Diagonal { input, out } => unary(&input, &out, &|a| factory.diagonal(a)),
        Commands::Transpose { input, out } => unary(&input, &out, &|a| factory.transpose(a)),
        Commands::AllWords {
            max_length,
            letters,
            names,
            out,
        } => {
            let alphabet = match names {
                Some(names) => Alphabet::with_names(names),
                None => Alphabet::new(letters),
            };
            let fsa = factory.all_words(&alphabet, max_length)?;
            save_automaton(&fsa, &out)
        }
        Commands::Accepts { input, words } => cmd_accepts(&input, &words, storage),
    }
}

/// Load an automaton in any supported format
pub fn load_automaton(path: &Path, storage: StorageFormat) -> Result<Automaton> {
    let detection = detect_format(path)?;
    log::debug!(
        "reading {} as {} ({})",
        path.display(),
        detection.format,
        detection.method
    );
    let open = || {
        File::open(path)
            .map(BufReader::new)
            .with_context(|| format!("Failed to open file: {}", path.display()))
    };
    let fsa = match detection.format {
        FileFormat::Text => TextFormat {
            storage,
            ..TextFormat::default()
        }
        .load(path)
        .map_err(anyhow::Error::from),
        FileFormat::Bincode => BincodeSerializer::deserialize(open()?).map_err(anyhow::Error::from),
        FileFormat::Json => JsonSerializer::deserialize(open()?).map_err(anyhow::Error::from),
        #[cfg(feature = "compression")]
        FileFormat::BincodeGzip => {
            GzipSerializer::<BincodeSerializer>::deserialize(open()?).map_err(anyhow::Error::from)
        }
        #[cfg(feature = "compression")]
        FileFormat::JsonGzip => {
            GzipSerializer::<JsonSerializer>::deserialize(open()?).map_err(anyhow::Error::from)
        }
    };
    fsa.with_context(|| format!("Failed to read automaton from {}", path.display()))
}

/// Write an automaton as the output options ask
pub fn save_automaton(fsa: &Automaton, out: &OutputArgs) -> Result<()> {
    let format = output_format(out.output.as_deref(), out.format);
    let text = TextFormat {
        name: out.name.clone(),
        sparse: out.sparse,
        ..TextFormat::default()
    };
    let path = match &out.output {
        Some(path) => path,
        None => {
            if format != FileFormat::Text {
                bail!("{} output needs an output file (--output)", format);
            }
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            text.write(fsa, &mut lock)?;
            lock.flush()?;
            return Ok(());
        }
    };

    let file = File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    match format {
        FileFormat::Text => text.write(fsa, &mut writer)?,
        FileFormat::Bincode => BincodeSerializer::serialize(fsa, &mut writer)?,
        FileFormat::Json => JsonSerializer::serialize(fsa, &mut writer)?,
        #[cfg(feature = "compression")]
        FileFormat::BincodeGzip => GzipSerializer::<BincodeSerializer>::serialize(fsa, &mut writer)?,
        #[cfg(feature = "compression")]
        FileFormat::JsonGzip => GzipSerializer::<JsonSerializer>::serialize(fsa, &mut writer)?,
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    eprintln!(
        "{} {} states ({}) {} {}",
        "Wrote".green(),
        (fsa.state_count() - 1).to_string().cyan(),
        format,
        "→".cyan(),
        path.display().to_string().yellow()
    );
    Ok(())
}

/// Info command
fn cmd_info(path: &Path, count_up_to: usize, storage: StorageFormat) -> Result<()> {
    let detection = detect_format(path)?;
    let fsa = load_automaton(path, storage)?;
    let alphabet = fsa.alphabet();

    println!("{}", "Automaton Information".bold().underline());
    println!();
    println!("  Path:      {}", path.display().to_string().cyan());
    println!(
        "  Format:    {} (detected via {})",
        detection.format.to_string().green(),
        detection.method.to_string().yellow()
    );
    println!("  States:    {}", (fsa.state_count() - 1).to_string().green());
    if fsa.is_product() {
        println!(
            "  Alphabet:  pairs over [{}] ({} symbols)",
            alphabet.names().join(", "),
            fsa.alphabet_size()
        );
    } else {
        println!("  Alphabet:  [{}]", alphabet.names().join(", "));
    }
    let flags: Vec<&str> = fsa.flags().names().collect();
    println!("  Flags:     {}", flags.join(" ").yellow());
    println!("  Initial:   {}", fsa.initial().count());
    println!("  Accepting: {}", fsa.accepting().count());
    if let Some(labels) = fsa.labels() {
        println!(
            "  Labels:    {} ({})",
            labels.label_count() - 1,
            labels.label_type().name()
        );
    }
    println!(
        "  Storage:   {}, {} bytes",
        if fsa.is_dense() { "dense" } else { "compressed" },
        fsa.table_size()
    );
    if !fsa.is_product() {
        println!(
            "  Words:     {} of length at most {}",
            fsa.language_size(count_up_to).to_string().green(),
            count_up_to
        );
    }
    Ok(())
}

/// Accepts command
fn cmd_accepts(path: &Path, words: &[String], storage: StorageFormat) -> Result<()> {
    let fsa = load_automaton(path, storage)?;
    let mut accepted = 0;
    for word in words {
        let symbols = parse_word(&fsa, word)?;
        if fsa.accepts(&symbols) {
            accepted += 1;
            println!("  {} {:?}", "accepted".green(), word);
        } else {
            println!("  {} {:?}", "rejected".red(), word);
        }
    }
    println!();
    println!("{} of {} word(s) accepted", accepted, words.len());
    Ok(())
}

fn letter(alphabet: &Alphabet, name: &str, allow_padding: bool) -> Result<usize> {
    if allow_padding && name == "_" {
        return Ok(alphabet.padding_symbol());
    }
    alphabet
        .names()
        .iter()
        .position(|n| n == name)
        .with_context(|| format!("Unknown letter `{}`", name))
}

/// Parse a comma separated word into transition symbols.
///
/// Letters of product automata are written `x:y`, with `_` for padding.
pub fn parse_word(fsa: &Automaton, word: &str) -> Result<Vec<Symbol>> {
    let word = word.trim();
    if word.is_empty() {
        return Ok(Vec::new());
    }
    let alphabet = fsa.alphabet();
    let product = fsa.is_product();
    word.split(',')
        .map(|item| {
            let item = item.trim();
            if !product {
                return letter(alphabet, item, false);
            }
            let (left, right) = item
                .split_once(':')
                .with_context(|| format!("Expected a letter pair x:y, got `{}`", item))?;
            let g1 = letter(alphabet, left.trim(), true)?;
            let g2 = letter(alphabet, right.trim(), true)?;
            let pad = alphabet.padding_symbol();
            if g1 == pad && g2 == pad {
                bail!("`_:_` is not a letter");
            }
            Ok(alphabet.product_id(g1, g2))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_word() {
        let factory = Factory::default();
        let fsa = factory.all_words(&Alphabet::new(2), 2).unwrap();
        assert_eq!(parse_word(&fsa, "b,a").unwrap(), vec![1, 0]);
        assert_eq!(parse_word(&fsa, "").unwrap(), Vec::<Symbol>::new());
        assert!(parse_word(&fsa, "c").is_err());

        let pairs = factory.cartesian_product(&fsa, &fsa).unwrap();
        assert_eq!(parse_word(&pairs, "a:b, _:a").unwrap(), vec![1, 6]);
        assert!(parse_word(&pairs, "_:_").is_err());
        assert!(parse_word(&pairs, "a").is_err());
    }

    #[test]
    fn test_save_and_load_each_format() {
        let dir = tempfile::tempdir().unwrap();
        let fsa = Factory::default().all_words(&Alphabet::new(3), 2).unwrap();
        for name in ["words.fsa", "words.bin", "words.json"] {
            let out = OutputArgs {
                output: Some(dir.path().join(name)),
                name: "words".to_string(),
                ..OutputArgs::default()
            };
            save_automaton(&fsa, &out).unwrap();
            let back = load_automaton(&dir.path().join(name), StorageFormat::Default).unwrap();
            assert_eq!(back, fsa, "{}", name);
        }
    }

    #[test]
    fn test_binary_output_needs_a_file() {
        let fsa = Factory::default().all_words(&Alphabet::new(1), 1).unwrap();
        let out = OutputArgs {
            format: Some(FileFormat::Bincode),
            ..OutputArgs::default()
        };
        assert!(save_automaton(&fsa, &out).is_err());
    }
}
