use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

use crate::foundation::error::{WrightError, WrightResult};
use crate::project::manifest::{EntryKind, ManifestEntry, ProjectManifest};
use crate::project::templates::{CompositionSpec, render_template};
use crate::rewrite::placeholder;

const LOCK_FILE: &str = ".framewright.lock";

/// Recovery state machine: `Unknown -> Checked -> {Healthy | Recovering -> {Recovered |
/// PartiallyRecovered}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum ProjectState {
    Unknown,
    Checked,
    Healthy,
    Recovering,
    Recovered,
    PartiallyRecovered,
}

/// Whether every manifest entry is present and well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum FinalState {
    Complete,
    StillIncomplete,
}

/// Result of a check or recovery cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    /// Entries that do not exist.
    pub missing: Vec<String>,
    /// Required files that exist but are empty (or are not files).
    pub malformed: Vec<String>,
    /// Human-readable audit of every write.
    pub actions_taken: Vec<String>,
    /// Completeness after the last check.
    pub final_state: FinalState,
    /// Where the state machine stopped.
    pub state: ProjectState,
    /// Recovery passes performed.
    pub attempts: u32,
}

impl IntegrityReport {
    /// No missing or malformed entries.
    pub fn is_complete(&self) -> bool {
        self.final_state == FinalState::Complete
    }

    /// Turn a still-incomplete project into [`WrightError::RecoveryExhausted`].
    pub fn into_result(self) -> WrightResult<Self> {
        match self.final_state {
            FinalState::Complete => Ok(self),
            FinalState::StillIncomplete => Err(WrightError::RecoveryExhausted {
                attempts: self.attempts,
                missing: self.missing.into_iter().chain(self.malformed).collect(),
            }),
        }
    }
}

/// Caller-supplied inputs for [`auto_recover_project`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverOptions {
    /// Text for a missing primary payload; a static placeholder is written when absent.
    pub payload: Option<String>,
    /// Maximum recovery passes.
    pub retry_budget: u32,
    /// Settings for generated templates.
    pub composition: CompositionSpec,
}

impl Default for RecoverOptions {
    fn default() -> Self {
        Self {
            payload: None,
            retry_budget: 3,
            composition: CompositionSpec::default(),
        }
    }
}

enum Presence {
    Ok,
    Missing,
    Malformed,
}

fn presence(entry: &ManifestEntry, root: &Path) -> Presence {
    let Ok(meta) = fs::metadata(entry.resolve(root)) else {
        return Presence::Missing;
    };
    match entry.kind {
        EntryKind::Dir if meta.is_dir() => Presence::Ok,
        EntryKind::File if meta.is_file() && meta.len() > 0 => Presence::Ok,
        _ => Presence::Malformed,
    }
}

/// Test every manifest entry. Never writes.
pub fn check_project_integrity(dir: &Path, manifest: &ProjectManifest) -> IntegrityReport {
    let mut missing = Vec::new();
    let mut malformed = Vec::new();
    for entry in manifest.entries() {
        match presence(entry, dir) {
            Presence::Ok => {}
            Presence::Missing => missing.push(entry.path.clone()),
            Presence::Malformed => malformed.push(entry.path.clone()),
        }
    }
    let complete = missing.is_empty() && malformed.is_empty();
    tracing::debug!(
        dir = %dir.display(),
        missing = missing.len(),
        malformed = malformed.len(),
        "checked project"
    );
    IntegrityReport {
        missing,
        malformed,
        actions_taken: Vec::new(),
        final_state: if complete {
            FinalState::Complete
        } else {
            FinalState::StillIncomplete
        },
        state: if complete {
            ProjectState::Healthy
        } else {
            ProjectState::Checked
        },
        attempts: 0,
    }
}

/// Synthesize missing or malformed entries, re-checking after each pass.
///
/// A healthy project returns immediately without writing. Otherwise the project lock is
/// held for the whole cycle; a second concurrent recovery gets [`WrightError::ProjectBusy`].
/// An exhausted budget is reported as [`ProjectState::PartiallyRecovered`], not as an error;
/// see [`IntegrityReport::into_result`].
#[tracing::instrument(skip_all, fields(dir = %dir.display(), budget = opts.retry_budget))]
pub fn auto_recover_project(
    dir: &Path,
    manifest: &ProjectManifest,
    opts: &RecoverOptions,
) -> WrightResult<IntegrityReport> {
    let mut report = check_project_integrity(dir, manifest);
    if report.is_complete() {
        return Ok(report);
    }

    let mut actions = Vec::new();
    if !dir.is_dir() {
        fs::create_dir_all(dir).map_err(|e| {
            WrightError::project(format!("create project dir '{}': {e}", dir.display()))
        })?;
        actions.push(format!("created project directory {}", dir.display()));
    }
    let _lock = ProjectLock::acquire(dir)?;
    report.state = ProjectState::Recovering;

    let mut attempts = 0;
    while !report.is_complete() && attempts < opts.retry_budget {
        attempts += 1;
        for entry in manifest.entries() {
            let broken = report.missing.contains(&entry.path) || report.malformed.contains(&entry.path);
            if !broken {
                continue;
            }
            match synthesize(dir, entry, manifest, opts) {
                Ok(action) => actions.push(action),
                Err(e) => {
                    tracing::warn!(path = %entry.path, error = %e, "recovery write failed");
                    actions.push(format!("failed to create {}: {e}", entry.path));
                }
            }
        }
        report = check_project_integrity(dir, manifest);
    }

    report.state = if report.is_complete() {
        ProjectState::Recovered
    } else {
        ProjectState::PartiallyRecovered
    };
    report.attempts = attempts;
    report.actions_taken = actions;
    if report.is_complete() {
        tracing::info!(attempts, actions = report.actions_taken.len(), "project recovered");
    } else {
        tracing::warn!(
            attempts,
            missing = ?report.missing,
            malformed = ?report.malformed,
            "project only partially recovered"
        );
    }
    Ok(report)
}

fn synthesize(
    dir: &Path,
    entry: &ManifestEntry,
    manifest: &ProjectManifest,
    opts: &RecoverOptions,
) -> std::io::Result<String> {
    let path = entry.resolve(dir);
    if entry.kind == EntryKind::Dir {
        fs::create_dir_all(&path)?;
        return Ok(format!("created directory {}", entry.path));
    }
    let (text, source) = if entry.primary_payload {
        match &opts.payload {
            Some(p) => (p.clone(), "rewritten artifact".to_owned()),
            None => (placeholder(&opts.composition.id), "placeholder".to_owned()),
        }
    } else if let Some(template) = entry.template {
        (
            render_template(template, &entry.path, manifest, &opts.composition),
            template.to_string(),
        )
    } else {
        ("export {};\n".to_owned(), "empty module".to_owned())
    };
    if path.is_dir() {
        return Err(std::io::Error::other(format!(
            "a directory occupies file path {}",
            path.display()
        )));
    }
    write_atomic(&path, &text)?;
    Ok(format!("wrote {} from {source} ({} bytes)", entry.path, text.len()))
}

/// Replace the primary payload when its content differs. Returns whether a write happened.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn write_payload(dir: &Path, manifest: &ProjectManifest, text: &str) -> WrightResult<bool> {
    let entry = manifest
        .primary()
        .ok_or_else(|| WrightError::project("manifest has no primary payload entry"))?;
    let path = entry.resolve(dir);
    if let Ok(existing) = fs::read(&path)
        && xxh3_64(&existing) == xxh3_64(text.as_bytes())
    {
        tracing::debug!(path = %entry.path, "payload unchanged");
        return Ok(false);
    }
    let _lock = ProjectLock::acquire(dir)?;
    write_atomic(&path, text)
        .map_err(|e| WrightError::project(format!("write '{}': {e}", path.display())))?;
    tracing::debug!(path = %entry.path, bytes = text.len(), "payload written");
    Ok(true)
}

/// Whole-file replace: temp file in the destination directory, then rename.
fn write_atomic(path: &Path, text: &str) -> std::io::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".framewright-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    tmp.write_all(text.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Exclusive per-project lock; released on drop.
#[derive(Debug)]
struct ProjectLock {
    path: PathBuf,
}

impl ProjectLock {
    /// Take the lock, replacing it once when its recorded owner is no longer running.
    fn acquire(dir: &Path) -> WrightResult<Self> {
        let path = dir.join(LOCK_FILE);
        match Self::create(&path) {
            Err(WrightError::ProjectBusy(_)) if lock_is_stale(&path) => {
                tracing::warn!(lock = %path.display(), "removing stale project lock");
                fs::remove_file(&path).map_err(|e| {
                    WrightError::project(format!("remove stale lock '{}': {e}", path.display()))
                })?;
                Self::create(&path)
            }
            other => other,
        }
    }

    fn create(path: &Path) -> WrightResult<Self> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                writeln!(file, "{}", std::process::id()).map_err(|e| {
                    WrightError::project(format!("write lock '{}': {e}", path.display()))
                })?;
                tracing::trace!(lock = %path.display(), "acquired project lock");
                Ok(Self {
                    path: path.to_path_buf(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(WrightError::ProjectBusy(path.display().to_string()))
            }
            Err(e) => Err(WrightError::project(format!(
                "create lock '{}': {e}",
                path.display()
            ))),
        }
    }
}

/// `true` only when the lock names a pid that is known not to be running.
fn lock_is_stale(path: &Path) -> bool {
    let Some(pid) = fs::read_to_string(path)
        .ok()
        .and_then(|text| text.trim().parse::<u32>().ok())
    else {
        return false;
    };
    pid_alive(pid) == Some(false)
}

#[cfg(target_os = "linux")]
fn pid_alive(pid: u32) -> Option<bool> {
    let proc_root = Path::new("/proc");
    proc_root
        .is_dir()
        .then(|| proc_root.join(pid.to_string()).exists())
}

#[cfg(not(target_os = "linux"))]
fn pid_alive(_pid: u32) -> Option<bool> {
    None
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
