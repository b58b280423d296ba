//! Artifact parser: an on-demand lexer and a recursive-descent parser for JSX/TSX modules.

pub mod ast;
pub(crate) mod error;
pub(crate) mod lexer;
pub(crate) mod parser;
pub(crate) mod visit;

use crate::syntax::ast::StructuralTree;
use crate::syntax::error::SyntaxError;

/// Parse artifact source into a [`StructuralTree`].
///
/// Fails with the first offending span; never returns a partial tree.
pub fn parse(source: &str) -> Result<StructuralTree, SyntaxError> {
    let tree = parser::parse_module(source)?;
    tracing::trace!(statements = tree.body.len(), "parsed artifact");
    Ok(tree)
}
