//! Required project layout: which paths must exist and how missing files are generated.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{WrightError, WrightResult};

/// Whether a manifest entry is a directory or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Created empty when missing.
    Dir,
    /// Must exist and be non-empty.
    File,
}

/// Generator used to synthesize a missing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    /// Composition registry (`Root.tsx`).
    RootTemplate,
    /// Bundler entry point calling `registerRoot`.
    EntryTemplate,
    /// Renderer CLI configuration.
    ConfigTemplate,
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TemplateId::RootTemplate => "root-template",
            TemplateId::EntryTemplate => "entry-template",
            TemplateId::ConfigTemplate => "config-template",
        })
    }
}

/// One required path, relative to the project root. Directory paths end with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ManifestEntry {
    /// Relative path.
    pub path: String,
    /// Directory or file.
    pub kind: EntryKind,
    /// Receives the transpiled artifact.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub primary_payload: bool,
    /// Generator for missing files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateId>,
}

impl ManifestEntry {
    /// Required directory.
    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Dir,
            primary_payload: false,
            template: None,
        }
    }

    /// Required file generated from `template`.
    pub fn file(path: impl Into<String>, template: TemplateId) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            primary_payload: false,
            template: Some(template),
        }
    }

    /// The file that receives the transpiled artifact.
    pub fn payload(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            primary_payload: true,
            template: None,
        }
    }

    /// Absolute location under `root`.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(self.path.trim_end_matches('/'))
    }
}

/// Ordered list of paths a renderable project must contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectManifest {
    entries: Vec<ManifestEntry>,
}

impl Default for ProjectManifest {
    fn default() -> Self {
        Self {
            entries: vec![
                ManifestEntry::dir("src/"),
                ManifestEntry::payload("src/Artifact.tsx"),
                ManifestEntry::file("src/Root.tsx", TemplateId::RootTemplate),
                ManifestEntry::file("src/index.ts", TemplateId::EntryTemplate),
                ManifestEntry::file("remotion.config.ts", TemplateId::ConfigTemplate),
                ManifestEntry::dir("public/"),
            ],
        }
    }
}

impl ProjectManifest {
    /// Build and validate a manifest.
    pub fn new(entries: Vec<ManifestEntry>) -> WrightResult<Self> {
        let manifest = Self { entries };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Entries in manifest order.
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// The primary payload entry, if any.
    pub fn primary(&self) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.primary_payload)
    }

    /// First file generated from `template`.
    pub fn with_template(&self, template: TemplateId) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.template == Some(template))
    }

    /// Check paths and flags. Deserialized manifests are not validated automatically.
    pub fn validate(&self) -> WrightResult<()> {
        if self.entries.is_empty() {
            return Err(WrightError::config("manifest has no entries"));
        }
        let mut primaries = 0usize;
        for (i, e) in self.entries.iter().enumerate() {
            let trimmed = e.path.trim_end_matches('/');
            if trimmed.is_empty() {
                return Err(WrightError::config(format!("manifest entry {i} has an empty path")));
            }
            let escapes = Path::new(trimmed)
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                return Err(WrightError::config(format!(
                    "manifest path '{}' must stay inside the project",
                    e.path
                )));
            }
            if self.entries[..i].iter().any(|p| p.path == e.path) {
                return Err(WrightError::config(format!("duplicate manifest path '{}'", e.path)));
            }
            match e.kind {
                EntryKind::Dir if e.primary_payload || e.template.is_some() => {
                    return Err(WrightError::config(format!(
                        "directory entry '{}' cannot carry a template or payload",
                        e.path
                    )));
                }
                EntryKind::File if e.path.ends_with('/') => {
                    return Err(WrightError::config(format!(
                        "file entry '{}' ends with '/'",
                        e.path
                    )));
                }
                _ => {}
            }
            primaries += usize::from(e.primary_payload);
        }
        if primaries > 1 {
            return Err(WrightError::config("manifest names more than one primary payload"));
        }
        Ok(())
    }
}
