//! CLI argument definitions

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::ops::{BinopKind, DeterminizePolicy};

/// Command line of the `fsakit` binary.
#[derive(Parser)]
#[command(name = "fsakit")]
#[command(about = "Build, combine and minimise finite state automata")]
#[command(version)]
pub struct Cli {
    /// Engine configuration file (JSON)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where and how a result is written.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output file (text format on stdout if not given)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (guessed from the output file extension if not given)
    #[arg(short = 'f', long)]
    pub format: Option<FileFormat>,

    /// Record name used by the text format
    #[arg(long, default_value = "fsa")]
    pub name: String,

    /// Write base automata with the sparse table layout
    #[arg(long)]
    pub sparse: bool,
}

/// The subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show states, flags and language statistics of an automaton
    Info {
        /// Automaton file
        input: PathBuf,

        /// Count accepted words up to this length
        #[arg(long, default_value = "4")]
        count_up_to: usize,
    },

    /// Minimise an automaton
    Minimize {
        /// Automaton file
        input: PathBuf,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Remove states that are unreachable or cannot reach acceptance
    Trim {
        /// Automaton file
        input: PathBuf,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Turn a multi-initial automaton into a deterministic one
    Determinize {
        /// Automaton file
        input: PathBuf,

        /// Which initial states are merged
        #[arg(long, default_value = "all")]
        policy: PolicyChoice,

        /// Label result states with the union of their members' words
        #[arg(long)]
        merge_labels: bool,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Accept the reversed words
    Reverse {
        /// Automaton file
        input: PathBuf,

        /// One initial state per accepting state of the input
        #[arg(long)]
        midfa: bool,

        /// Label each state with the input states it stands for
        #[arg(long)]
        labelled: bool,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Kleene star
    Star {
        /// Automaton file
        input: PathBuf,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Complement
    Not {
        /// Automaton file
        input: PathBuf,

        /// Only accept the shortest rejected prefixes
        #[arg(long)]
        first_only: bool,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Boolean combination of two automata
    Binop {
        /// First automaton file
        left: PathBuf,

        /// Second automaton file
        right: PathBuf,

        /// The operation
        #[arg(long, default_value = "and")]
        op: BinopChoice,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Concatenation of two languages
    Concat {
        /// First automaton file
        left: PathBuf,

        /// Second automaton file
        right: PathBuf,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Product automaton of two languages read side by side
    Product {
        /// Automaton for the left side
        left: PathBuf,

        /// Automaton for the right side
        right: PathBuf,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Relational composition of two product automata
    Composite {
        /// First product automaton file
        left: PathBuf,

        /// Second product automaton file
        right: PathBuf,

        /// Keep initial states of each pair apart and label them
        #[arg(long)]
        labelled: bool,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Project a product automaton onto one side
    Exists {
        /// Product automaton file
        input: PathBuf,

        /// Accept every extension of an accepted word
        #[arg(long)]
        sticky: bool,

        /// Keep the right side instead of the left
        #[arg(long)]
        swapped: bool,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Words w whose pair (w, w) a product automaton accepts
    Diagonal {
        /// Product automaton file
        input: PathBuf,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Swap the two sides of a product automaton
    Transpose {
        /// Product automaton file
        input: PathBuf,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Automaton accepting every word up to a length
    AllWords {
        /// Maximum word length
        max_length: i64,

        /// Number of letters (named a, b, ...)
        #[arg(short, long, default_value = "2", conflicts_with = "names")]
        letters: usize,

        /// Explicit letter names
        #[arg(long, value_delimiter = ',')]
        names: Option<Vec<String>>,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Test words for membership
    Accepts {
        /// Automaton file
        input: PathBuf,

        /// Words as comma separated letter names; product letters are
        /// written `x:y` with `_` for padding. An empty string is the empty word.
        words: Vec<String>,
    },
}

/// Automaton file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileFormat {
    /// GAP-style text records
    Text,
    /// Bincode snapshot
    Bincode,
    /// JSON snapshot
    Json,
    /// Gzip-compressed bincode snapshot
    #[cfg(feature = "compression")]
    #[value(name = "bincode-gz")]
    BincodeGzip,
    /// Gzip-compressed JSON snapshot
    #[cfg(feature = "compression")]
    #[value(name = "json-gz")]
    JsonGzip,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Bincode => write!(f, "bincode"),
            Self::Json => write!(f, "json"),
            #[cfg(feature = "compression")]
            Self::BincodeGzip => write!(f, "bincode-gz"),
            #[cfg(feature = "compression")]
            Self::JsonGzip => write!(f, "json-gz"),
        }
    }
}

/// Values of `binop --op`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BinopChoice {
    /// Intersection
    And,
    /// Union
    Or,
    /// First minus second
    AndNot,
    /// Second minus first
    NotAnd,
    /// First minus second, without words extending a result word
    AndNotFirst,
    /// As and-not-first, trimmed instead of minimised
    AndNotFirstTrim,
    /// Intersection, without words extending a result word
    AndFirst,
}

impl From<BinopChoice> for BinopKind {
    fn from(choice: BinopChoice) -> Self {
        match choice {
            BinopChoice::And => BinopKind::And,
            BinopChoice::Or => BinopKind::Or,
            BinopChoice::AndNot => BinopKind::AndNot,
            BinopChoice::NotAnd => BinopKind::NotAnd,
            BinopChoice::AndNotFirst => BinopKind::AndNotFirst,
            BinopChoice::AndNotFirstTrim => BinopKind::AndNotFirstTrim,
            BinopChoice::AndFirst => BinopKind::AndFirst,
        }
    }
}

/// Values of `determinize --policy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyChoice {
    /// One initial state
    All,
    /// Merge initial states with the same label
    Identical,
    /// Merge initial states whose word labels overlap
    Equal,
}

impl From<PolicyChoice> for DeterminizePolicy {
    fn from(choice: PolicyChoice) -> Self {
        match choice {
            PolicyChoice::All => DeterminizePolicy::All,
            PolicyChoice::Identical => DeterminizePolicy::Identical,
            PolicyChoice::Equal => DeterminizePolicy::Equal,
        }
    }
}
