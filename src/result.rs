//! The outcome record every execution path resolves to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caveat appended to the trace when assertions were seen but could not actually be evaluated.
pub const SIMULATION_CAVEAT: &str = "⚠️ Simulation mode - tests not verified.";

/// Result of running a piece of OCaml source, real or simulated.
///
/// `error` is `Some` only when `success` is false and a specific cause was identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn passed(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failed(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
            error: Some(error.into()),
        }
    }

    pub fn failure(output: impl Into<String>, cause: Failure) -> Self {
        Self::failed(output, cause.to_string())
    }

    /// True when the run succeeded without the simulation caveat, i.e. the verdict was backed
    /// by a real evaluation or there was nothing to verify.
    pub fn is_verified(&self) -> bool {
        self.success && !self.output.contains(SIMULATION_CAVEAT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Parenthesis,
    Bracket,
}

/// Specific failure causes surfaced through [`ExecutionResult::error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The submission still calls `failwith "TODO"`.
    UnimplementedPlaceholder,
    Unbalanced(Delimiter),
    /// Internal failure while scanning the source.
    Processing(String),
    /// Residual failure caught by the outermost caller.
    Execution(String),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::UnimplementedPlaceholder => {
                write!(f, "Function not implemented (failwith \"TODO\")")
            }
            Failure::Unbalanced(Delimiter::Parenthesis) => {
                write!(f, "Syntax error: unbalanced parentheses")
            }
            Failure::Unbalanced(Delimiter::Bracket) => {
                write!(f, "Syntax error: unbalanced brackets")
            }
            Failure::Processing(detail) => write!(f, "Processing error: {detail}"),
            Failure::Execution(detail) => write!(f, "Execution error: {detail}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_carries_message() {
        let result = ExecutionResult::failure("", Failure::Unbalanced(Delimiter::Bracket));
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Syntax error: unbalanced brackets"));
    }

    #[test]
    fn test_is_verified_rejects_caveat() {
        let unverified = ExecutionResult::passed(format!("- : unit = ()\n\n{SIMULATION_CAVEAT}"));
        assert!(!unverified.is_verified());
        assert!(ExecutionResult::passed("- : unit = ()").is_verified());
        assert!(!ExecutionResult::failed("", "boom").is_verified());
    }

    #[test]
    fn test_json_omits_missing_error() {
        let json = serde_json::to_string(&ExecutionResult::passed("ok")).unwrap();
        assert_eq!(json, r#"{"success":true,"output":"ok"}"#);
    }
}
