use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::RendererConfig;
use crate::foundation::error::{WrightError, WrightResult};
use crate::project::{ProjectManifest, TemplateId};

const STDERR_TAIL_LINES: usize = 20;

/// What to render: the bundler entry, the composition id and the output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    /// Entry point, relative to the project root.
    pub entry: String,
    /// Composition id registered by the root template.
    pub composition: String,
    /// Output video path.
    pub out: PathBuf,
}

impl RenderJob {
    /// Job using the manifest's entry-template file as the entry point.
    pub fn for_manifest(
        manifest: &ProjectManifest,
        composition: impl Into<String>,
        out: impl Into<PathBuf>,
    ) -> Self {
        let entry = manifest
            .with_template(TemplateId::EntryTemplate)
            .map_or_else(|| "src/index.ts".to_owned(), |e| e.path.clone());
        Self {
            entry,
            composition: composition.into(),
            out: out.into(),
        }
    }
}

/// Spawns the configured renderer CLI inside a project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRenderer {
    program: String,
    args: Vec<String>,
}

impl ExternalRenderer {
    /// Renderer invoked as `program args...`, with placeholders substituted per job.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Renderer described by a config section.
    pub fn from_config(cfg: &RendererConfig) -> Self {
        Self::new(cfg.program.clone(), cfg.args.iter().cloned())
    }

    /// Arguments with `{entry}`, `{composition}` and `{out}` substituted.
    pub fn command_line(&self, job: &RenderJob) -> Vec<String> {
        let out = job.out.to_string_lossy();
        self.args
            .iter()
            .map(|a| {
                a.replace("{entry}", &job.entry)
                    .replace("{composition}", &job.composition)
                    .replace("{out}", &out)
            })
            .collect()
    }

    /// Run the renderer to completion. Returns the output path.
    #[tracing::instrument(skip_all, fields(program = %self.program, composition = %job.composition))]
    pub fn render(&self, project_dir: &Path, job: &RenderJob) -> WrightResult<PathBuf> {
        if let Some(parent) = job.out.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                WrightError::render(format!("create output dir '{}': {e}", parent.display()))
            })?;
        }

        let args = self.command_line(job);
        tracing::debug!(?args, dir = %project_dir.display(), "spawning renderer");
        let mut child = Command::new(&self.program)
            .args(&args)
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                WrightError::render(format!(
                    "failed to spawn `{}` (is it installed and on PATH?): {e}",
                    self.program
                ))
            })?;

        let stderr = child
            .stderr
            .take()
            .map(|pipe| std::thread::spawn(move || drain(pipe)));

        let status = child.wait().map_err(|e| {
            WrightError::render(format!("failed to wait for `{}`: {e}", self.program))
        })?;
        let stderr = match stderr {
            Some(h) => h
                .join()
                .map_err(|_| WrightError::render("stderr drain thread panicked"))?,
            None => Vec::new(),
        };

        if !status.success() {
            let text = String::from_utf8_lossy(&stderr);
            let lines: Vec<&str> = text.trim_end().lines().collect();
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
            return Err(WrightError::render(format!(
                "`{}` exited with status {status}: {}",
                self.program,
                tail.trim()
            )));
        }
        tracing::info!(out = %job.out.display(), "render finished");
        Ok(job.out.clone())
    }
}

/// Everything readable from `pipe`. A read error keeps the bytes read so far.
pub(super) fn drain(mut pipe: impl Read) -> Vec<u8> {
    let mut bytes = Vec::new();
    if let Err(e) = pipe.read_to_end(&mut bytes) {
        tracing::debug!(error = %e, read = bytes.len(), "renderer stderr drain failed");
    }
    bytes
}
