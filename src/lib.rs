//! camlpad: an OCaml exercise workbench.
//!
//! The core is a pipeline of two pure text transformations:
//! [`rewrite_tests`] instruments an exercise's test snippet, and [`run_simulated`] inspects the
//! combined source and produces an [`ExecutionResult`] that imitates toplevel output without
//! running anything. [`run_with_tests`] composes the two.
//!
//! Around the core sit the exercise [`catalog`], learner [`progress`], an optional real
//! execution backend behind [`toplevel::Toplevel`], the [`session`] layer and the [`cli`].

pub use crate::errors::{CamlpadError, Result};
pub use crate::injector::{rewrite_tests, CombinedSource};
pub use crate::result::{ExecutionResult, Failure};
pub use crate::simulator::run_simulated;

pub mod catalog;
pub mod cli;
pub mod config;
pub mod errors;
pub mod injector;
pub mod progress;
pub mod result;
pub mod session;
pub mod simulator;
pub mod toplevel;

/// Rewrites `test_code`, assembles it with the prelude and `user_code`, and simulates the result.
pub fn run_with_tests(user_code: &str, test_code: &str) -> ExecutionResult {
    let combined = CombinedSource::assemble(user_code, test_code);
    run_simulated(combined.as_str())
}
