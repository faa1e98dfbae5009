//! camlpad error handling.
//!
//! Execution outcomes are never errors here: the simulator, the toplevel and the session always
//! resolve to an [`ExecutionResult`](crate::result::ExecutionResult). `CamlpadError` covers the
//! machinery around them (catalog loading, the progress store, configuration, lookups) and is
//! rendered through `miette` by the CLI.

use std::any::Any;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T, E = CamlpadError> = std::result::Result<T, E>;

/// Coarse classification of [`CamlpadError`] variants, used by callers and tests that only care
/// about which subsystem failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    Io,
    Catalog,
    Store,
    Config,
    Backend,
    Internal,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Io => "Io",
            ErrorType::Catalog => "Catalog",
            ErrorType::Store => "Store",
            ErrorType::Config => "Config",
            ErrorType::Backend => "Backend",
            ErrorType::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unified error type for everything outside the execution path.
#[derive(Debug, Error, Diagnostic)]
pub enum CamlpadError {
    #[error("failed to access {}", .path.display())]
    #[diagnostic(code(camlpad::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid exercise catalog '{origin}': {message}")]
    #[diagnostic(
        code(camlpad::catalog),
        help("catalog files are YAML lists of exercises with id, title, description, difficulty, category, starter_code, solution and tests")
    )]
    Catalog { origin: String, message: String },

    #[error("duplicate exercise id '{id}'")]
    #[diagnostic(code(camlpad::catalog::duplicate))]
    DuplicateExercise { id: String },

    #[error("unknown exercise '{id}'")]
    #[diagnostic(
        code(camlpad::catalog::unknown),
        help("run `camlpad list` to see the available exercises")
    )]
    UnknownExercise { id: String },

    #[error("progress store {}: {message}", .path.display())]
    #[diagnostic(code(camlpad::store))]
    Store { path: PathBuf, message: String },

    #[error("invalid configuration {}: {message}", .path.display())]
    #[diagnostic(code(camlpad::config))]
    Config { path: PathBuf, message: String },

    #[error("backend '{backend}' unavailable: {message}")]
    #[diagnostic(code(camlpad::backend))]
    Backend { backend: String, message: String },

    #[error("{message}")]
    #[diagnostic(code(camlpad::internal))]
    Internal { message: String },
}

impl CamlpadError {
    pub fn error_type(&self) -> ErrorType {
        match self {
            CamlpadError::Io { .. } => ErrorType::Io,
            CamlpadError::Catalog { .. }
            | CamlpadError::DuplicateExercise { .. }
            | CamlpadError::UnknownExercise { .. } => ErrorType::Catalog,
            CamlpadError::Store { .. } => ErrorType::Store,
            CamlpadError::Config { .. } => ErrorType::Config,
            CamlpadError::Backend { .. } => ErrorType::Backend,
            CamlpadError::Internal { .. } => ErrorType::Internal,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CamlpadError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Constructs a message-only `CamlpadError::Internal` with `format!` arguments.
#[macro_export]
macro_rules! internal_err {
    ($($arg:tt)*) => {
        $crate::errors::CamlpadError::Internal {
            message: format!($($arg)*),
        }
    };
}

/// Extracts a readable message from a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type_groups_catalog_variants() {
        let unknown = CamlpadError::UnknownExercise { id: "x".into() };
        let duplicate = CamlpadError::DuplicateExercise { id: "x".into() };
        assert_eq!(unknown.error_type(), ErrorType::Catalog);
        assert_eq!(duplicate.error_type(), ErrorType::Catalog);
        assert_eq!(internal_err!("boom {}", 1).error_type(), ErrorType::Internal);
    }

    #[test]
    fn test_panic_message_downcasts() {
        let static_payload: Box<dyn Any + Send> = Box::new("static");
        let owned_payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other_payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(static_payload.as_ref()), "static");
        assert_eq!(panic_message(owned_payload.as_ref()), "owned");
        assert_eq!(panic_message(other_payload.as_ref()), "unknown panic");
    }

    #[test]
    fn test_display_includes_path() {
        let err = CamlpadError::Store {
            path: PathBuf::from("/tmp/progress.json"),
            message: "corrupt".into(),
        };
        assert_eq!(err.to_string(), "progress store /tmp/progress.json: corrupt");
    }
}
