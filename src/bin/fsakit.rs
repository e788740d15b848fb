//! fsakit - finite state automaton toolkit
//!
//! Reads automata in the text record format or as snapshots, applies one
//! operation and writes the result.

use clap::Parser;
use colored::Colorize;
use std::process;

use fsakit::cli::commands;
use fsakit::cli::Cli;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = commands::execute(cli) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(1);
    }
}
