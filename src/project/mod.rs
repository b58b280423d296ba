//! Project directory integrity checking and auto-recovery.
//!
//! This is the only part of the core that touches the file system. Checks are read-only;
//! recovery holds an exclusive lock on the directory and replaces whole files atomically.

mod integrity;
pub mod manifest;
mod templates;

pub use integrity::{
    FinalState, IntegrityReport, ProjectState, RecoverOptions, auto_recover_project,
    check_project_integrity, write_payload,
};
pub use manifest::{EntryKind, ManifestEntry, ProjectManifest, TemplateId};
pub use templates::{CompositionSpec, render_template};

#[cfg(test)]
#[path = "../../tests/unit/project/mod.rs"]
mod tests;
