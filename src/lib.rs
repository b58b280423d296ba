#![forbid(unsafe_code)]
#![warn(missing_docs)]
//! framewright turns stateful React/JSX artifacts into deterministic, frame-indexed
//! components for a programmatic video renderer.
//!
//! The core is five synchronous, pure operations over in-memory text:
//! [`parse`], [`classify`], [`rewrite`], [`repair`] and [`validate()`]. They can run
//! concurrently for different artifacts with no shared state. [`project`] is the only
//! module that touches the file system; [`pipeline::Pipeline`] ties everything together.
//!
//! ```no_run
//! use std::sync::Arc;
//! use framewright::{Artifact, NoopOracle, Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(Arc::new(PipelineConfig::default()), Arc::new(NoopOracle));
//! let artifact = Artifact::from_path("counter.jsx")?;
//! match pipeline.transpile(&artifact) {
//!     Ok(done) => println!("{}", done.text),
//!     Err(rejected) => eprintln!("{rejected}"),
//! }
//! # Ok::<(), framewright::WrightError>(())
//! ```

pub(crate) mod foundation;

pub mod classify;
pub mod config;
pub mod oracle;
pub mod pipeline;
pub mod project;
pub mod render;
pub mod repair;
pub mod rewrite;
pub mod syntax;
pub mod validate;

pub use classify::{ClassifyOptions, MutationRule, StateBinding, classify, classify_with};
pub use config::PipelineConfig;
pub use foundation::core::{Artifact, LineIndex};
pub use foundation::error::{WrightError, WrightResult};
pub use oracle::{NoopOracle, ProcessOracle, StaticOracle, TypeDiagnostic, TypeOracle};
pub use pipeline::{Deployment, Pipeline, Rejected, Transpiled};
pub use project::{
    IntegrityReport, ProjectManifest, RecoverOptions, auto_recover_project,
    check_project_integrity,
};
pub use repair::{RepairOutcome, repair};
pub use rewrite::{RewriteOptions, RewriteResult, rewrite, rewrite_with};
pub use syntax::ast::StructuralTree;
pub use syntax::error::SyntaxError;
pub use syntax::lexer::Span;
pub use syntax::parse;
pub use validate::{
    Finding, FindingCategory, Layer, Severity, ValidationReport, Validator, validate,
};
