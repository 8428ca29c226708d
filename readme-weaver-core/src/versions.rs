//! Versioned README drafts on disk.
//!
//! During the revision loop draft N lives in `README_v<N>.md` next to the
//! canonical `README.md`. Accepting a draft renames it onto the canonical name;
//! older drafts are removed on a best-effort basis.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

pub const CANONICAL_README: &str = "README.md";

/// Draft files of one repository.
#[derive(Debug, Clone)]
pub struct ReadmeVersions {
    root: PathBuf,
}

impl ReadmeVersions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn file_name(version: u32) -> String {
        format!("README_v{version}.md")
    }

    pub fn version_path(&self, version: u32) -> PathBuf {
        self.root.join(Self::file_name(version))
    }

    pub fn canonical_path(&self) -> PathBuf {
        self.root.join(CANONICAL_README)
    }

    /// Persist `content` as draft `version`.
    pub fn write(&self, version: u32, content: &str) -> io::Result<PathBuf> {
        let path = self.version_path(version);
        fs::write(&path, content)?;
        debug!(path = %path.display(), bytes = content.len(), "Wrote README draft");
        Ok(path)
    }

    /// Delete draft `version`. Failures are logged and otherwise ignored.
    pub fn discard(&self, version: u32) {
        let path = self.version_path(version);
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "Removed superseded README draft"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(error = %e, path = %path.display(), "Error removing README draft"),
        }
    }

    /// Make draft `version` the canonical README, replacing any previous one.
    ///
    /// When the draft file is missing (e.g. it could not be written), `content` is
    /// written to the canonical path instead so the accepted text is never lost.
    pub fn promote(&self, version: u32, content: &str) -> io::Result<PathBuf> {
        let draft = self.version_path(version);
        let canonical = self.canonical_path();

        if draft.is_file() {
            if canonical.exists() {
                fs::remove_file(&canonical)?;
            }
            fs::rename(&draft, &canonical)?;
        } else {
            warn!(path = %draft.display(), "README draft missing, writing final content directly");
            fs::write(&canonical, content)?;
        }
        info!(path = %canonical.display(), version, "Final README saved");
        Ok(canonical)
    }

    /// Remove drafts `1..up_to` that are still on disk.
    pub fn clean_up(&self, up_to: u32) {
        for version in 1..up_to {
            if self.version_path(version).exists() {
                self.discard(version);
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
