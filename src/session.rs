//! Exercise session: the layer a front end drives.
//!
//! A session saves the learner's code, runs it against the exercise tests, and sets the
//! completion flag when the run succeeds. Runs are wrapped in a last-resort panic guard so the
//! caller always receives an [`ExecutionResult`].

use std::panic::{self, AssertUnwindSafe};

use tracing::{info, warn};

use crate::catalog::Exercise;
use crate::errors::{panic_message, Result};
use crate::progress::{KeyValueStore, Progress};
use crate::result::{ExecutionResult, Failure};
use crate::toplevel::Toplevel;

/// Anything able to run learner code against a test snippet.
pub trait ExerciseRunner {
    fn run_with_tests(&mut self, user_code: &str, test_code: &str) -> ExecutionResult;
}

impl ExerciseRunner for Toplevel {
    fn run_with_tests(&mut self, user_code: &str, test_code: &str) -> ExecutionResult {
        Toplevel::run_with_tests(self, user_code, test_code)
    }
}

#[derive(Debug)]
pub struct Session<R, S> {
    runner: R,
    progress: Progress<S>,
}

impl<R: ExerciseRunner, S: KeyValueStore> Session<R, S> {
    pub fn new(runner: R, progress: Progress<S>) -> Self {
        Self { runner, progress }
    }

    /// Saved code for `exercise`, or its starter code.
    pub fn current_code(&self, exercise: &Exercise) -> String {
        self.progress
            .saved_code(&exercise.id)
            .unwrap_or_else(|| exercise.starter_code.clone())
    }

    /// Saves `code`, runs it against the exercise tests, and records completion on success.
    pub fn run(&mut self, exercise: &Exercise, code: &str) -> Result<ExecutionResult> {
        self.progress.save_code(&exercise.id, code)?;

        let runner = &mut self.runner;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            runner.run_with_tests(code, &exercise.tests)
        }))
        .unwrap_or_else(|payload| {
            let detail = panic_message(payload.as_ref());
            warn!(exercise = %exercise.id, %detail, "exercise run panicked");
            ExecutionResult::failure("", Failure::Execution(detail))
        });

        if result.success {
            info!(exercise = %exercise.id, "exercise completed");
            self.progress.mark_completed(&exercise.id)?;
        }
        Ok(result)
    }

    /// Forgets saved code and returns the starter code.
    pub fn reset(&mut self, exercise: &Exercise) -> Result<String> {
        self.progress.clear_code(&exercise.id)?;
        Ok(exercise.starter_code.clone())
    }

    pub fn progress(&self) -> &Progress<S> {
        &self.progress
    }

    pub fn into_progress(self) -> Progress<S> {
        self.progress
    }
}
