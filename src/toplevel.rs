//! # Toplevel
//!
//! Front door for executing exercise code. A [`Toplevel`] may own a real
//! [`ExecutionBackend`]; it initializes it at most once, and anything that goes wrong on that
//! path (no backend, load failure, readiness timeout, panic) falls through to the simulator.
//! Every call resolves to an [`ExecutionResult`].

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::{panic_message, CamlpadError, Result};
use crate::injector::CombinedSource;
use crate::result::ExecutionResult;
use crate::simulator::run_simulated;

/// An embeddable interpreter runtime able to evaluate OCaml phrases.
pub trait ExecutionBackend {
    fn name(&self) -> &str;

    /// Starts loading the runtime. Readiness is then polled through [`Self::is_ready`].
    fn load(&mut self) -> Result<()>;

    fn is_ready(&self) -> bool;

    /// Evaluates a complete phrase and returns the toplevel's printed output.
    fn evaluate(&mut self, phrase: &str) -> Result<String>;
}

/// Initialization state of the optional backend. `Ready` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendState {
    #[default]
    Uninitialized,
    Ready,
    Failed,
}

/// Timing of backend readiness polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitPolicy {
    pub initial_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for InitPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 200,
            poll_interval_ms: 100,
            max_attempts: 50,
        }
    }
}

impl InitPolicy {
    /// No waiting at all; useful for backends that are ready as soon as they load.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            initial_delay_ms: 0,
            poll_interval_ms: 0,
            max_attempts,
        }
    }
}

/// Runs code through the backend when one is available, otherwise through the simulator.
pub struct Toplevel {
    backend: Option<Box<dyn ExecutionBackend>>,
    state: BackendState,
    policy: InitPolicy,
}

impl fmt::Debug for Toplevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toplevel")
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .field("state", &self.state)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Default for Toplevel {
    fn default() -> Self {
        Self::simulated()
    }
}

impl Toplevel {
    /// A toplevel with no backend: every run is simulated.
    pub fn simulated() -> Self {
        Self {
            backend: None,
            state: BackendState::Uninitialized,
            policy: InitPolicy::default(),
        }
    }

    pub fn with_backend(backend: Box<dyn ExecutionBackend>, policy: InitPolicy) -> Self {
        Self {
            backend: Some(backend),
            state: BackendState::Uninitialized,
            policy,
        }
    }

    /// A toplevel using the configured readiness policy, simulated when `backend` is `None`.
    pub fn from_config(config: &Config, backend: Option<Box<dyn ExecutionBackend>>) -> Self {
        Self {
            backend,
            state: BackendState::Uninitialized,
            policy: config.backend.clone(),
        }
    }

    pub fn policy(&self) -> &InitPolicy {
        &self.policy
    }

    pub fn state(&self) -> BackendState {
        self.state
    }

    /// Brings the backend up, once. Later calls return the cached outcome.
    pub fn initialize(&mut self) -> Result<()> {
        match self.state {
            BackendState::Ready => return Ok(()),
            BackendState::Failed => {
                return Err(self.backend_error("initialization failed previously"))
            }
            BackendState::Uninitialized => {}
        }

        let policy = self.policy.clone();
        let Some(backend) = self.backend.as_mut() else {
            self.state = BackendState::Failed;
            return Err(CamlpadError::Backend {
                backend: "none".to_string(),
                message: "no backend configured".to_string(),
            });
        };

        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| wait_until_ready(&mut **backend, &policy)));
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(payload) => Err(CamlpadError::Backend {
                backend: backend.name().to_string(),
                message: format!(
                    "panicked during initialization: {}",
                    panic_message(payload.as_ref())
                ),
            }),
        };

        match outcome {
            Ok(()) => {
                info!(backend = backend.name(), "toplevel backend initialized");
                self.state = BackendState::Ready;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "toplevel backend unavailable, using simulation mode");
                self.state = BackendState::Failed;
                Err(e)
            }
        }
    }

    /// Executes `code`, preferring the backend. Never panics.
    #[tracing::instrument(skip_all, fields(code_len = code.len()))]
    pub fn execute(&mut self, code: &str) -> ExecutionResult {
        if self.backend.is_some() && self.state != BackendState::Failed {
            match self.initialize() {
                Ok(()) => {
                    if let Some(result) = self.evaluate(code) {
                        return result;
                    }
                }
                Err(e) => debug!(error = %e, "falling back to simulation"),
            }
        }
        run_simulated(code)
    }

    /// Assembles prelude, learner code and rewritten tests, then executes the result.
    pub fn run_with_tests(&mut self, user_code: &str, test_code: &str) -> ExecutionResult {
        let combined = CombinedSource::assemble(user_code, test_code);
        self.execute(combined.as_str())
    }

    /// Returns `None` when the backend panicked; the caller then simulates instead.
    fn evaluate(&mut self, code: &str) -> Option<ExecutionResult> {
        let backend = self.backend.as_mut()?;
        let phrase = format!("{code};;");
        match panic::catch_unwind(AssertUnwindSafe(|| backend.evaluate(&phrase))) {
            Ok(Ok(output)) => Some(classify_output(output)),
            Ok(Err(e)) => Some(ExecutionResult::failed("", e.to_string())),
            Err(payload) => {
                warn!(
                    panic = %panic_message(payload.as_ref()),
                    "toplevel backend panicked, disabling it"
                );
                self.state = BackendState::Failed;
                None
            }
        }
    }

    fn backend_error(&self, message: &str) -> CamlpadError {
        CamlpadError::Backend {
            backend: self
                .backend
                .as_ref()
                .map(|b| b.name().to_string())
                .unwrap_or_else(|| "none".to_string()),
            message: message.to_string(),
        }
    }
}

fn wait_until_ready(backend: &mut dyn ExecutionBackend, policy: &InitPolicy) -> Result<()> {
    backend.load()?;
    thread::sleep(Duration::from_millis(policy.initial_delay_ms));

    for attempt in 1..=policy.max_attempts {
        if backend.is_ready() {
            debug!(attempt, "backend ready");
            return Ok(());
        }
        if attempt < policy.max_attempts {
            thread::sleep(Duration::from_millis(policy.poll_interval_ms));
        }
    }

    Err(CamlpadError::Backend {
        backend: backend.name().to_string(),
        message: format!("not ready after {} attempts", policy.max_attempts),
    })
}

/// Real toplevel output reports failures inline rather than through a status.
fn classify_output(output: String) -> ExecutionResult {
    if output.contains("Error:") || output.contains("Exception:") {
        ExecutionResult {
            success: false,
            error: Some(output.clone()),
            output,
        }
    } else {
        ExecutionResult::passed(output)
    }
}
