//! End-to-end orchestration: repair, parse, classify, rewrite, validate, then deploy into a
//! project directory.

use std::path::Path;
use std::sync::Arc;

use crate::classify::{ClassifyOptions, StateBinding, classify_with};
use crate::config::PipelineConfig;
use crate::foundation::core::Artifact;
use crate::foundation::error::{WrightError, WrightResult};
use crate::oracle::TypeOracle;
use crate::project::{IntegrityReport, auto_recover_project, write_payload};
use crate::repair::{RepairOutcome, repair};
use crate::rewrite::{RewriteOptions, RewriteResult, placeholder, rewrite_with};
use crate::syntax::parse;
use crate::validate::{ValidationReport, Validator};

/// Successful transpilation.
#[derive(Debug, Clone)]
pub struct Transpiled {
    /// Artifact identifier.
    pub identifier: String,
    /// Final text: rewritten (or placeholder) output after the repair pass.
    pub text: String,
    /// xxh3-64 of `text`.
    pub fingerprint: u64,
    /// Classified state bindings.
    pub bindings: Vec<StateBinding>,
    /// Rewriter output before the final repair.
    pub rewrite: RewriteResult,
    /// Repairs applied to the input.
    pub input_repair: RepairOutcome,
    /// Repairs applied to the rewritten output.
    pub output_repair: RepairOutcome,
    /// The rewrite had zero confidence and was replaced by a static placeholder.
    pub used_placeholder: bool,
    /// Validation of `text`; always valid here, though it may carry Minor or
    /// non-blocking findings.
    pub report: ValidationReport,
}

impl Transpiled {
    /// Audit lines from both repair passes.
    pub fn repair_audit(&self) -> Vec<String> {
        let mut lines = self.input_repair.audit();
        lines.extend(self.output_repair.audit().into_iter().map(|l| format!("output: {l}")));
        lines
    }
}

/// A transpilation that must not be deployed.
#[derive(thiserror::Error, Debug, Clone)]
#[error("artifact '{}' rejected: {}", report.identifier, report.summary())]
pub struct Rejected {
    /// Why.
    pub report: ValidationReport,
    /// The candidate text that failed, when the input parsed.
    pub text: Option<String>,
}

impl From<Rejected> for WrightError {
    fn from(r: Rejected) -> Self {
        let first = r
            .report
            .findings
            .iter()
            .find(|f| f.is_blocking())
            .map(|f| format!("; first: {f}"))
            .unwrap_or_default();
        let summary = format!(
            "{} critical, {} major{first}",
            r.report.count(crate::validate::Severity::Critical),
            r.report.count(crate::validate::Severity::Major)
        );
        WrightError::Rejected {
            identifier: r.report.identifier,
            summary,
        }
    }
}

/// Transpiled artifact written into a recovered project.
#[derive(Debug, Clone)]
pub struct Deployment {
    /// Transpilation result.
    pub transpiled: Transpiled,
    /// Recovery outcome (always complete here).
    pub integrity: IntegrityReport,
    /// The payload file was (re)written by [`write_payload`].
    pub payload_written: bool,
}

/// Shared, immutable pipeline. Cheap to clone; safe to use from many threads.
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    oracle: Arc<dyn TypeOracle>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Pipeline over a validated config and a type checker.
    pub fn new(config: Arc<PipelineConfig>, oracle: Arc<dyn TypeOracle>) -> Self {
        Self { config, oracle }
    }

    /// Configuration in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Turn one artifact into a validated, frame-driven component.
    #[tracing::instrument(skip_all, fields(identifier = %artifact.identifier()))]
    pub fn transpile(&self, artifact: &Artifact) -> Result<Transpiled, Rejected> {
        let validator = Validator::new(self.oracle.as_ref());
        let identifier = artifact.identifier();

        let input_repair = repair(artifact.source_text());
        if input_repair.fix_count > 0 {
            tracing::debug!(fixes = input_repair.fix_count, "repaired input");
        }

        let tree = match parse(&input_repair.text) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::info!(error = %e, "input does not parse");
                return Err(Rejected {
                    report: validator.validate(&input_repair.text, identifier),
                    text: None,
                });
            }
        };

        let bindings = classify_with(&tree, &ClassifyOptions::default());
        let rewritten = rewrite_with(
            &tree,
            &bindings,
            &RewriteOptions {
                fps: self.config.fps,
            },
        );
        let used_placeholder = rewritten.confidence <= 0.0;
        let candidate = if used_placeholder {
            tracing::warn!("no state binding could be rewritten; deploying placeholder");
            placeholder(identifier)
        } else {
            rewritten.output_text.clone()
        };

        let output_repair = repair(&candidate);
        let text = output_repair.text.clone();
        let report = validator.validate(&text, identifier);
        if !report.is_valid {
            tracing::info!(summary = %report.summary(), "rejected");
            return Err(Rejected {
                report,
                text: Some(text),
            });
        }

        tracing::debug!(
            bindings = bindings.len(),
            confidence = rewritten.confidence,
            summary = %report.summary(),
            "transpiled"
        );
        Ok(Transpiled {
            identifier: identifier.to_owned(),
            fingerprint: xxhash_rust::xxh3::xxh3_64(text.as_bytes()),
            text,
            bindings,
            rewrite: rewritten,
            input_repair,
            output_repair,
            used_placeholder,
            report,
        })
    }

    /// Transpile, recover the project, then write the payload.
    ///
    /// Rejection and partial recovery are both errors here.
    pub fn deploy(&self, artifact: &Artifact, project_dir: &Path) -> WrightResult<Deployment> {
        let transpiled = self.transpile(artifact)?;
        self.install(transpiled, &artifact.composition_id(), project_dir)
    }

    /// Recover `project_dir` around an already transpiled artifact and write its payload.
    #[tracing::instrument(skip_all, fields(identifier = %transpiled.identifier, dir = %project_dir.display()))]
    pub fn install(
        &self,
        transpiled: Transpiled,
        composition: &str,
        project_dir: &Path,
    ) -> WrightResult<Deployment> {
        let opts = self
            .config
            .recover_options(composition, Some(transpiled.text.clone()));
        let integrity =
            auto_recover_project(project_dir, &self.config.manifest, &opts)?.into_result()?;
        let payload_written = write_payload(project_dir, &self.config.manifest, &transpiled.text)?;
        tracing::info!(
            state = ?integrity.state,
            payload_written,
            "deployed"
        );
        Ok(Deployment {
            transpiled,
            integrity,
            payload_written,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/mod.rs"]
mod tests;
