//! Lark unified CLI tool
//!
//! Single command-line interface for running, evaluating, and interactively
//! exploring Lark programs.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lark")]
#[command(about = "Lark S-expression language toolchain")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a file to native code and run it
    #[command(alias = "r")]
    Run {
        /// Source file path
        file: PathBuf,
        /// Print the result of every top-level form, not just `print` output
        #[arg(short, long)]
        results: bool,
    },

    /// Compile and run an inline expression
    #[command(alias = "e")]
    Eval {
        /// Expression, e.g. "(+ 1 2)"
        code: String,
        /// Do not print the result
        #[arg(long)]
        no_print: bool,
    },

    /// Interactive read-eval-print loop
    Repl,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(cmd) => dispatch(cmd),
        None => commands::repl::execute(),
    }
}

fn dispatch(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Run { file, results } => commands::run::execute(&file, results),
        Commands::Eval { code, no_print } => commands::eval::execute(&code, no_print),
        Commands::Repl => commands::repl::execute(),
    }
}
