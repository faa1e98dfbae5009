//! The camlpad Command-Line Interface.
//!
//! This module parses arguments, sets up logging and configuration, and dispatches each
//! subcommand to the library.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::catalog::{Catalog, CatalogFilter};
use crate::cli::args::{CamlpadArgs, Command};
use crate::config::Config;
use crate::errors::{CamlpadError, Result};
use crate::injector;
use crate::progress::{JsonFileStore, Progress};
use crate::result::ExecutionResult;
use crate::session::Session;
use crate::simulator;
use crate::toplevel::Toplevel;

pub mod args;
pub mod output;

type CliSession = Session<Toplevel, JsonFileStore>;

/// The main entry point for the CLI.
pub fn run() -> miette::Result<ExitCode> {
    let args = CamlpadArgs::parse();
    init_logging(args.verbose);

    let mut config = Config::discover(args.config.as_deref())?;
    if let Some(catalog) = args.catalog {
        config.catalog = Some(catalog);
    }
    if let Some(store) = args.store {
        config.store = Some(store);
    }
    debug!(?config, "resolved configuration");

    let code = match args.command {
        Command::List {
            difficulty,
            category,
            search,
        } => handle_list(&config, CatalogFilter {
            difficulty,
            category,
            query: search,
        })?,
        Command::Show {
            id,
            solution,
            hints,
        } => {
            let catalog = load_catalog(&config)?;
            output::print_exercise(catalog.require(&id)?, solution, hints);
            ExitCode::SUCCESS
        }
        Command::Run { id, code, json } => handle_run(&config, &id, code.as_deref(), json)?,
        Command::Check { code, tests, json } => {
            let user_code = read_file(&code)?;
            let test_code = read_file(&tests)?;
            let result = Toplevel::from_config(&config, None).run_with_tests(&user_code, &test_code);
            report(&result, json)?
        }
        Command::Rewrite { tests, diff } => {
            let original = read_file(&tests)?;
            let rewritten = injector::rewrite_tests("", &original);
            if diff {
                output::print_diff(&original, &rewritten);
            } else {
                println!("{rewritten}");
            }
            ExitCode::SUCCESS
        }
        Command::Simulate { file, json } => {
            let source = read_file(&file)?;
            report(&simulator::run_simulated(&source), json)?
        }
        Command::Reset { id } => {
            let catalog = load_catalog(&config)?;
            let exercise = catalog.require(&id)?;
            let starter = open_session(&config)?.reset(exercise)?;
            println!("{}", starter.trim_end());
            ExitCode::SUCCESS
        }
        Command::Progress => handle_progress(&config)?,
    };
    Ok(code)
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `-v` flags.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    match config.catalog_path() {
        Some(path) => Catalog::load(path),
        None => Catalog::builtin(),
    }
}

fn open_session(config: &Config) -> Result<CliSession> {
    let store = JsonFileStore::open(config.store_path())?;
    Ok(Session::new(
        Toplevel::from_config(config, None),
        Progress::new(store),
    ))
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| CamlpadError::io(path, e))
}

fn report(result: &ExecutionResult, json: bool) -> Result<ExitCode> {
    output::print_result(result, json)?;
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn handle_list(config: &Config, filter: CatalogFilter) -> Result<ExitCode> {
    let catalog = load_catalog(config)?;
    let session = open_session(config)?;
    for exercise in catalog.filter(&filter) {
        output::print_exercise_line(exercise, session.progress().is_completed(&exercise.id));
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_run(config: &Config, id: &str, code: Option<&Path>, json: bool) -> Result<ExitCode> {
    let catalog = load_catalog(config)?;
    let exercise = catalog.require(id)?;
    let mut session = open_session(config)?;
    let user_code = match code {
        Some(path) => read_file(path)?,
        None => session.current_code(exercise),
    };
    let result = session.run(exercise, &user_code)?;
    report(&result, json)
}

fn handle_progress(config: &Config) -> Result<ExitCode> {
    let catalog = load_catalog(config)?;
    let session = open_session(config)?;
    let completed = session.progress().completed();
    for id in &completed {
        match catalog.get(id) {
            Some(exercise) => println!("✓ {} ({})", exercise.id, exercise.title),
            None => println!("✓ {id}"),
        }
    }
    println!();
    for tally in catalog.completion_by_category(&completed) {
        println!("{:<24} {}/{}", tally.category, tally.completed, tally.total);
    }
    let done = catalog
        .exercises()
        .iter()
        .filter(|e| completed.contains(&e.id))
        .count();
    println!("{done}/{} exercises completed", catalog.len());
    Ok(ExitCode::SUCCESS)
}
