//! # Execution Simulator
//!
//! Produces an [`ExecutionResult`] resembling what the OCaml toplevel would print for a combined
//! source, using only lexical heuristics. Nothing is parsed or evaluated.
//!
//! ## Pipeline
//! 1. Pre-scan for the `failwith "TODO"` placeholder.
//! 2. Balance check on parentheses, then brackets. Imbalance ends the run with an empty trace.
//! 3. One pass over the lines through [`rules`], in order. An assertion reached while the
//!    placeholder is present ends the run as an uncaught `Failure "TODO"`.
//! 4. Finalization: default unit line, placeholder verdict, or the unverified-success caveat.
//!
//! ## Invariants
//! - Pure: the same text always yields the same result.
//! - Total: internal errors and panics become a `Processing error` result.
//! - Placeholder code is never reported as successful.

use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::errors::{panic_message, Result};
use crate::result::{ExecutionResult, Failure, SIMULATION_CAVEAT};

pub(crate) mod rules;
pub mod scan;
pub mod trace;

use rules::{rule_for, ScanState, Step};

/// Simulates running `source` through the toplevel. Never panics.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn run_simulated(source: &str) -> ExecutionResult {
    guarded(|| simulate(source))
}

/// Runs `scan`, turning its errors and panics into a `Processing error` result.
fn guarded<F>(scan: F) -> ExecutionResult
where
    F: FnOnce() -> Result<ExecutionResult>,
{
    match panic::catch_unwind(AssertUnwindSafe(scan)) {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => ExecutionResult::failure("", Failure::Processing(e.to_string())),
        Err(payload) => ExecutionResult::failure(
            "",
            Failure::Processing(panic_message(payload.as_ref())),
        ),
    }
}

fn simulate(source: &str) -> Result<ExecutionResult> {
    let has_placeholder = scan::has_placeholder(source);

    if let Some(delimiter) = scan::unbalanced_delimiter(source) {
        debug!(?delimiter, "unbalanced source");
        return Ok(ExecutionResult::failure("", Failure::Unbalanced(delimiter)));
    }

    let mut state = ScanState::new(has_placeholder);

    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("(*") {
            continue;
        }
        let Some(rule) = rule_for(trimmed) else {
            continue;
        };
        tracing::trace!(rule = rule.name, line = trimmed, "line matched");
        if let Step::Halt(result) = (rule.action)(trimmed, &mut state)? {
            debug!(lines = state.trace.len(), "scan halted");
            return Ok(result);
        }
    }

    Ok(finalize(source, state))
}

fn finalize(source: &str, mut state: ScanState) -> ExecutionResult {
    if state.trace.is_empty() {
        state.trace.push(trace::UNIT_RESULT);
    }
    let output = state.trace.render();

    if state.has_placeholder {
        return ExecutionResult::failure(output, Failure::UnimplementedPlaceholder);
    }
    if source.contains("assert") {
        return ExecutionResult::passed(format!("{output}\n\n{SIMULATION_CAVEAT}"));
    }
    ExecutionResult::passed(output)
}
