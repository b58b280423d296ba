use crate::syntax::lexer::Span;
use std::fmt;

/// First unrecoverable lexing or parsing failure in an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Offending span.
    pub span: Span,
    /// Human-readable description.
    pub message: String,
}

impl SyntaxError {
    pub(crate) fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    pub(crate) fn at(offset: usize, message: impl Into<String>) -> Self {
        Self::new(
            Span {
                start: offset,
                end: offset,
            },
            message,
        )
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at byte {}: {}", self.span.start, self.message)
    }
}

impl std::error::Error for SyntaxError {}
