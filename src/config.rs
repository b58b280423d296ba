//! Pipeline configuration.
//!
//! Built once (from JSON or defaults), validated, then shared immutably behind an `Arc`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{WrightError, WrightResult};
use crate::oracle::{NoopOracle, ProcessOracle, TypeOracle};
use crate::project::{CompositionSpec, ProjectManifest, RecoverOptions};

/// Everything a [`crate::pipeline::Pipeline`] needs besides its oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Composition frame rate; also the rewrite tick rate.
    pub fps: u32,
    /// Composition length in frames.
    pub duration_frames: u32,
    /// Composition width in pixels.
    pub width: u32,
    /// Composition height in pixels.
    pub height: u32,
    /// Required project layout.
    pub manifest: ProjectManifest,
    /// Type checker invocation.
    pub oracle: OracleConfig,
    /// Recovery limits.
    pub recovery: RecoveryConfig,
    /// External renderer invocation.
    pub renderer: RendererConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let comp = CompositionSpec::default();
        Self {
            fps: comp.fps,
            duration_frames: comp.duration_frames,
            width: comp.width,
            height: comp.height,
            manifest: ProjectManifest::default(),
            oracle: OracleConfig::default(),
            recovery: RecoveryConfig::default(),
            renderer: RendererConfig::default(),
        }
    }
}

/// Type checker process settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OracleConfig {
    /// Skip type checking entirely.
    pub enabled: bool,
    /// Executable.
    pub command: String,
    /// Arguments placed before the scratch file path.
    pub args: Vec<String>,
    /// Kill the checker after this many milliseconds.
    pub timeout_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "npx".to_owned(),
            args: [
                "tsc",
                "--noEmit",
                "--pretty",
                "false",
                "--jsx",
                "react-jsx",
                "--skipLibCheck",
            ]
            .map(str::to_owned)
            .to_vec(),
            timeout_ms: 10_000,
        }
    }
}

impl OracleConfig {
    /// Build the configured oracle; a disabled checker is a [`NoopOracle`].
    pub fn build(&self, working_dir: Option<&Path>) -> Arc<dyn TypeOracle> {
        if !self.enabled {
            return Arc::new(NoopOracle);
        }
        let mut oracle = ProcessOracle::new(self.command.clone(), self.args.iter().cloned())
            .timeout(Duration::from_millis(self.timeout_ms));
        if let Some(dir) = working_dir {
            oracle = oracle.working_dir(dir);
        }
        Arc::new(oracle)
    }
}

/// Recovery limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecoveryConfig {
    /// Maximum recovery passes.
    pub retry_budget: u32,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self { retry_budget: 3 }
    }
}

/// External renderer command. `{entry}`, `{composition}` and `{out}` in `args` are substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// Executable.
    pub program: String,
    /// Argument templates.
    pub args: Vec<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: "npx".to_owned(),
            args: ["remotion", "render", "{entry}", "{composition}", "{out}"]
                .map(str::to_owned)
                .to_vec(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a JSON config file. Missing keys take their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> WrightResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| WrightError::config(format!("read config '{}': {e}", path.display())))?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| WrightError::config(format!("parse config '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values no composition can use.
    pub fn validate(&self) -> WrightResult<()> {
        if !(1..=240).contains(&self.fps) {
            return Err(WrightError::config(format!(
                "fps must be in 1..=240, got {}",
                self.fps
            )));
        }
        if self.duration_frames == 0 {
            return Err(WrightError::config("duration_frames must be > 0"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(WrightError::config(format!(
                "composition size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.oracle.enabled && (self.oracle.command.is_empty() || self.oracle.timeout_ms == 0) {
            return Err(WrightError::config(
                "oracle needs a command and a non-zero timeout_ms",
            ));
        }
        if self.renderer.program.is_empty() {
            return Err(WrightError::config("renderer program must not be empty"));
        }
        self.manifest.validate()
    }

    /// Composition settings for the artifact `id`.
    pub fn composition(&self, id: &str) -> CompositionSpec {
        CompositionSpec {
            id: id.to_owned(),
            fps: self.fps,
            duration_frames: self.duration_frames,
            width: self.width,
            height: self.height,
        }
    }

    /// Recovery options carrying `payload` for the artifact `id`.
    pub fn recover_options(&self, id: &str, payload: Option<String>) -> RecoverOptions {
        RecoverOptions {
            payload,
            retry_budget: self.recovery.retry_budget,
            composition: self.composition(id),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
