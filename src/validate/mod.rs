//! Multi-layer validator.
//!
//! Layers run in a fixed order: syntax, variable flow, type check, template sanity and
//! domain rules. A syntax failure is Critical and stops the run; every other layer only
//! adds findings. Findings are data, never errors.

mod domain;
mod flow;
mod template;

use std::fmt;

use serde::Serialize;

use crate::foundation::core::LineIndex;
use crate::oracle::{NoopOracle, TypeOracle};
use crate::syntax::lexer::Span;
use crate::syntax::parse;

/// Validation layer, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Layer {
    Syntax,
    VariableFlow,
    TypeCheck,
    Template,
    Domain,
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusable artifact.
    Critical,
    /// Do not deploy.
    Major,
    /// Warn and proceed.
    Minor,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
        })
    }
}

/// What kind of problem a finding describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingCategory {
    /// Source does not parse.
    Syntax,
    /// Identifier does not resolve.
    VariableFlow,
    /// Compiler-reported type error.
    TypeCheck,
    /// The type checker could not be consulted.
    TypeCheckInconclusive,
    /// Interpolation renders a sentinel as text.
    Template,
    /// Renderer API misuse or residual nondeterminism.
    ApiMisuse,
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FindingCategory::Syntax => "syntax",
            FindingCategory::VariableFlow => "variable-flow",
            FindingCategory::TypeCheck => "type-check",
            FindingCategory::TypeCheckInconclusive => "type-check-inconclusive",
            FindingCategory::Template => "template",
            FindingCategory::ApiMisuse => "api-misuse",
        })
    }
}

/// One validation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    /// Producing layer.
    pub layer: Layer,
    /// Severity.
    pub severity: Severity,
    /// Category.
    pub category: FindingCategory,
    /// Human-readable description.
    pub message: String,
    /// Location in the validated text.
    pub span: Span,
    /// 1-based line of `span.start`.
    pub line: u32,
    /// 1-based column of `span.start`.
    pub column: u32,
}

impl Finding {
    fn new(
        index: &LineIndex,
        layer: Layer,
        severity: Severity,
        category: FindingCategory,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        let (line, column) = index.line_col(span.start);
        Self {
            layer,
            severity,
            category,
            message: message.into(),
            span,
            line,
            column,
        }
    }

    /// Whether this finding makes the artifact invalid.
    ///
    /// Critical findings always block; Major ones block unless the type checker was merely
    /// unavailable.
    pub fn is_blocking(&self) -> bool {
        match self.severity {
            Severity::Critical => true,
            Severity::Major => self.category != FindingCategory::TypeCheckInconclusive,
            Severity::Minor => false,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {} [{}] {}",
            self.line, self.column, self.severity, self.category, self.message
        )
    }
}

/// Outcome of [`Validator::validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Artifact identifier.
    pub identifier: String,
    /// Findings ordered by layer, then discovery.
    pub findings: Vec<Finding>,
    /// No blocking finding.
    pub is_valid: bool,
}

impl ValidationReport {
    fn from_findings(identifier: &str, findings: Vec<Finding>) -> Self {
        let is_valid = !findings.iter().any(Finding::is_blocking);
        Self {
            identifier: identifier.to_owned(),
            findings,
            is_valid,
        }
    }

    /// Findings of one severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Findings of one category.
    pub fn of_category(&self, category: FindingCategory) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.category == category)
    }

    /// One-line tally, e.g. `invalid: 0 critical, 1 major, 0 minor`.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} critical, {} major, {} minor",
            if self.is_valid { "valid" } else { "invalid" },
            self.count(Severity::Critical),
            self.count(Severity::Major),
            self.count(Severity::Minor)
        )
    }
}

/// Runs the five layers against one oracle.
pub struct Validator<'o> {
    oracle: &'o dyn TypeOracle,
}

impl<'o> Validator<'o> {
    /// Validator that consults `oracle` for the type-check layer.
    pub fn new(oracle: &'o dyn TypeOracle) -> Self {
        Self { oracle }
    }

    /// Validate `text`. The oracle is called at most once.
    #[tracing::instrument(skip_all, fields(identifier = %identifier))]
    pub fn validate(&self, text: &str, identifier: &str) -> ValidationReport {
        let index = LineIndex::new(text);
        let tree = match parse(text) {
            Ok(tree) => tree,
            Err(e) => {
                let finding = Finding::new(
                    &index,
                    Layer::Syntax,
                    Severity::Critical,
                    FindingCategory::Syntax,
                    e.message,
                    e.span,
                );
                tracing::debug!(%finding, "syntax layer failed");
                return ValidationReport::from_findings(identifier, vec![finding]);
            }
        };

        let mut findings: Vec<Finding> = flow::unresolved(&tree)
            .into_iter()
            .map(|id| {
                Finding::new(
                    &index,
                    Layer::VariableFlow,
                    Severity::Major,
                    FindingCategory::VariableFlow,
                    format!("`{}` is not defined", id.name),
                    id.span,
                )
            })
            .collect();

        match self.oracle.check_types(text) {
            Ok(diagnostics) => {
                for d in diagnostics {
                    let at = index.offset_utf16(text, d.line, d.column);
                    let duplicate = findings
                        .iter()
                        .any(|f| f.layer == Layer::VariableFlow && f.span.start == at);
                    if duplicate {
                        continue;
                    }
                    findings.push(Finding::new(
                        &index,
                        Layer::TypeCheck,
                        Severity::Major,
                        FindingCategory::TypeCheck,
                        format!("{}: {}", d.category, d.message),
                        Span::new(at, at),
                    ));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "type check inconclusive");
                findings.push(Finding::new(
                    &index,
                    Layer::TypeCheck,
                    Severity::Major,
                    FindingCategory::TypeCheckInconclusive,
                    format!("type check inconclusive: {e}"),
                    Span::new(0, 0),
                ));
            }
        }

        findings.extend(template::sentinels(&tree).into_iter().map(|(span, msg)| {
            Finding::new(
                &index,
                Layer::Template,
                Severity::Minor,
                FindingCategory::Template,
                msg,
                span,
            )
        }));
        findings.extend(domain::misuses(&tree).into_iter().map(|(span, msg)| {
            Finding::new(
                &index,
                Layer::Domain,
                Severity::Major,
                FindingCategory::ApiMisuse,
                msg,
                span,
            )
        }));

        let report = ValidationReport::from_findings(identifier, findings);
        tracing::debug!(summary = %report.summary(), "validated artifact");
        report
    }
}

/// Validate without a type checker.
pub fn validate(text: &str, identifier: &str) -> ValidationReport {
    Validator::new(&NoopOracle).validate(text, identifier)
}

#[cfg(test)]
#[path = "../../tests/unit/validate/mod.rs"]
mod tests;
