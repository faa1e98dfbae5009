//! # Test Injector
//!
//! Rewrites the fixed test snippet of an exercise so that failures say which assertion broke and
//! with which values, then assembles the combined source handed to the toplevel.
//!
//! ## Rules
//! - `assert (<expr> = <expected>);` becomes a call to the comparison routine matching the
//!   literal shape of `<expected>` (see [`ExpectedKind`]).
//! - A `print_endline` line mentioning "passed" becomes `__test_pass ()`.
//! - Every other line passes through untouched.
//! - Text that already calls the prelude is returned as is, so rewriting is idempotent.
//!
//! The rewrite never changes pass/fail semantics and never fails observably: on any internal
//! error the original test text is used.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::errors::{panic_message, Result};

pub mod assertion;
pub mod prelude;

pub use assertion::{ExpectedKind, TestAssertion};
pub use prelude::{is_instrumented, ASSERT_MARKER, HELPER_PRELUDE, PASS_MARKER};

/// Output of a rewrite pass over a test snippet.
#[derive(Debug, Clone, Default)]
pub struct Rewrite {
    pub text: String,
    pub assertions: Vec<TestAssertion>,
    pub summary_lines: usize,
}

/// Rewrites `test_code`, reporting what was instrumented.
pub fn rewrite(test_code: &str) -> Result<Rewrite> {
    if is_instrumented(test_code) {
        debug!("test code already instrumented, leaving it unchanged");
        return Ok(Rewrite {
            text: test_code.to_string(),
            ..Rewrite::default()
        });
    }

    let mut rewritten = Rewrite::default();
    let mut lines = Vec::new();

    for line in test_code.split('\n') {
        let trimmed = line.trim();
        let indent = &line[..line.len() - line.trim_start().len()];

        if let Some(assertion) = TestAssertion::parse(trimmed)? {
            lines.push(assertion.render(indent, trimmed.ends_with(';')));
            rewritten.assertions.push(assertion);
        } else if trimmed.contains("print_endline") && trimmed.contains("passed") {
            lines.push(format!("{indent}{PASS_MARKER} ()"));
            rewritten.summary_lines += 1;
        } else {
            lines.push(line.to_string());
        }
    }

    rewritten.text = lines.join("\n");
    debug!(
        assertions = rewritten.assertions.len(),
        summaries = rewritten.summary_lines,
        "rewrote test code"
    );
    Ok(rewritten)
}

/// Rewrites equality assertions in `test_code` into instrumented calls.
///
/// Total: if the rewrite fails for any reason the original `test_code` is returned.
#[tracing::instrument(skip_all, fields(user_len = user_code.len(), test_len = test_code.len()))]
pub fn rewrite_tests(user_code: &str, test_code: &str) -> String {
    rewrite_or_original(test_code, rewrite)
}

fn rewrite_or_original<F>(test_code: &str, pass: F) -> String
where
    F: FnOnce(&str) -> Result<Rewrite>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| pass(test_code))) {
        Ok(Ok(rewritten)) => rewritten.text,
        Ok(Err(e)) => {
            warn!(error = %e, "test rewrite failed, using original tests");
            test_code.to_string()
        }
        Err(payload) => {
            warn!(
                panic = %panic_message(payload.as_ref()),
                "test rewrite panicked, using original tests"
            );
            test_code.to_string()
        }
    }
}

/// Prelude, learner code and rewritten tests joined into one blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedSource {
    text: String,
}

impl CombinedSource {
    pub fn assemble(user_code: &str, test_code: &str) -> Self {
        let tests = rewrite_tests(user_code, test_code);
        Self {
            text: format!("{HELPER_PRELUDE}\n\n{user_code}\n\n{tests}"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl AsRef<str> for CombinedSource {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for CombinedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
