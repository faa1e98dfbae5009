//! Command-line arguments and subcommands for the camlpad CLI.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::catalog::Difficulty;

#[derive(Debug, Parser)]
#[command(
    name = "camlpad",
    version,
    about = "Practice OCaml exercises with instant, simulated feedback."
)]
pub struct CamlpadArgs {
    /// Configuration file (defaults to $CAMLPAD_CONFIG when set).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Exercise catalog file or directory, replacing the builtin exercises.
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Progress store file.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List exercises with their completion status.
    List {
        #[arg(long, value_enum)]
        difficulty: Option<Difficulty>,
        #[arg(long)]
        category: Option<String>,
        /// Only exercises whose title or description contains this text.
        #[arg(long)]
        search: Option<String>,
    },
    /// Show an exercise statement, starter code and tests.
    Show {
        id: String,
        /// Also print the reference solution.
        #[arg(long)]
        solution: bool,
        /// Also print the hints.
        #[arg(long)]
        hints: bool,
    },
    /// Run code against an exercise's tests. Uses saved or starter code unless --code is given.
    Run {
        id: String,
        #[arg(long)]
        code: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Run a code file against a test file.
    Check {
        code: PathBuf,
        #[arg(long)]
        tests: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print the instrumented version of a test file.
    Rewrite {
        tests: PathBuf,
        /// Show a line diff against the original instead.
        #[arg(long)]
        diff: bool,
    },
    /// Simulate a source file as is, without test injection.
    Simulate {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Forget saved code for an exercise and print its starter code.
    Reset { id: String },
    /// List completed exercises.
    Progress,
}
