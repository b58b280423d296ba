//! Type-checking oracle boundary.
//!
//! The validator treats type checking as an opaque request/response call: hand over the
//! artifact text, get back compiler diagnostics. [`ProcessOracle`] shells out to a compiler;
//! [`NoopOracle`] and [`StaticOracle`] cover offline use and tests.

mod process;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use process::ProcessOracle;

/// One compiler-reported diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDiagnostic {
    /// Compiler message.
    pub message: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    /// Compiler code or class, e.g. `TS2304`.
    pub category: String,
}

/// Failure to obtain diagnostics at all.
#[derive(thiserror::Error, Debug)]
pub enum OracleError {
    /// The checker executable could not be started.
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        /// Program that failed to start.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The checker did not finish in time and was killed.
    #[error("type check timed out after {0:?}")]
    Timeout(Duration),

    /// Scratch file or pipe failure.
    #[error("oracle i/o: {0}")]
    Io(#[from] std::io::Error),

    /// The checker ran but produced no usable result.
    #[error("{0}")]
    Failed(String),
}

/// Narrow type-checking interface used by the validator.
pub trait TypeOracle: Send + Sync {
    /// Type-check `source` and return its diagnostics.
    fn check_types(&self, source: &str) -> Result<Vec<TypeDiagnostic>, OracleError>;
}

/// Oracle that reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOracle;

impl TypeOracle for NoopOracle {
    fn check_types(&self, _source: &str) -> Result<Vec<TypeDiagnostic>, OracleError> {
        Ok(Vec::new())
    }
}

/// Oracle returning canned diagnostics (or a canned failure), counting its calls.
#[derive(Debug)]
pub struct StaticOracle {
    outcome: Result<Vec<TypeDiagnostic>, String>,
    calls: AtomicUsize,
}

impl Default for StaticOracle {
    fn default() -> Self {
        Self::with_diagnostics(Vec::new())
    }
}

impl StaticOracle {
    /// Always report `diagnostics`.
    pub fn with_diagnostics(diagnostics: Vec<TypeDiagnostic>) -> Self {
        Self {
            outcome: Ok(diagnostics),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `check_types` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl TypeOracle for StaticOracle {
    fn check_types(&self, _source: &str) -> Result<Vec<TypeDiagnostic>, OracleError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.outcome.clone().map_err(OracleError::Failed)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/oracle/mod.rs"]
mod tests;
