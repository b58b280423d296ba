use crate::syntax::error::SyntaxError;

/// Crate-wide result alias.
pub type WrightResult<T> = Result<T, WrightError>;

/// Errors surfaced by the pipeline, the project checker and the renderer bridge.
///
/// Validator diagnostics are never errors; they travel as `Finding`s inside a
/// `ValidationReport`.
#[derive(thiserror::Error, Debug)]
pub enum WrightError {
    /// Unparseable source.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Project directory could not be inspected or written.
    #[error("project error: {0}")]
    Project(String),

    /// Another recovery cycle holds the project lock. Carries the lock file path.
    #[error("project busy: '{0}' is held by another recovery; delete it if none is running")]
    ProjectBusy(String),

    /// Retry budget exhausted while manifest entries were still missing.
    #[error("recovery exhausted after {attempts} attempt(s); still missing: {}", missing.join(", "))]
    RecoveryExhausted {
        /// Attempts performed.
        attempts: u32,
        /// Relative paths still missing or malformed.
        missing: Vec<String>,
    },

    /// The transpiled artifact failed validation and must not be deployed.
    #[error("artifact '{identifier}' rejected: {summary}")]
    Rejected {
        /// Artifact identifier.
        identifier: String,
        /// Validation tally and first blocking finding.
        summary: String,
    },

    /// Type-checking oracle failure surfaced outside the validator.
    #[error("oracle error: {0}")]
    Oracle(String),

    /// External renderer failure.
    #[error("render error: {0}")]
    Render(String),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WrightError {
    /// Build a [`WrightError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`WrightError::Project`].
    pub fn project(msg: impl Into<String>) -> Self {
        Self::Project(msg.into())
    }

    /// Build a [`WrightError::Oracle`].
    pub fn oracle(msg: impl Into<String>) -> Self {
        Self::Oracle(msg.into())
    }

    /// Build a [`WrightError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
