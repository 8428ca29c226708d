//! Ignore rules consulted by the traversal: directory names to prune, exact file
//! names to skip and file-extension suffixes to skip.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

/// File name that is excluded regardless of what the lists say.
pub const ALWAYS_IGNORED_FILE: &str = "LICENSE";

/// Exclusion sets, loaded once at startup and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreRules {
    directories: BTreeSet<String>,
    files: BTreeSet<String>,
    extensions: BTreeSet<String>,
}

impl IgnoreRules {
    /// Build rules from in-memory lists. `LICENSE` is always added to the file names.
    pub fn new<D, F, E>(directories: D, files: F, extensions: E) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        let mut files: BTreeSet<String> = files.into_iter().map(Into::into).collect();
        files.insert(ALWAYS_IGNORED_FILE.to_string());
        Self {
            directories: directories.into_iter().map(Into::into).collect(),
            files,
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Load the three lists from disk. A list that cannot be read contributes nothing.
    pub fn load(directories: &Path, files: &Path, extensions: &Path) -> Self {
        let rules = Self::new(
            read_list(directories),
            read_list(files),
            read_list(extensions),
        );
        info!(
            directories = rules.directories.len(),
            files = rules.files.len(),
            extensions = rules.extensions.len(),
            "Loaded ignore rules"
        );
        rules
    }

    /// True when a directory with this name must not be descended into.
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.directories.contains(name)
    }

    /// True when a file with this name is excluded by exact name or extension suffix.
    pub fn is_ignored_file(&self, name: &str) -> bool {
        self.files.contains(name) || self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }
}

/// Split a single-column list into tokens. Newlines and commas both separate entries.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == '\n' || c == ',')
        .map(|token| token.trim().trim_matches('"').trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_list(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(raw) => {
            let tokens = parse_list(&raw);
            if tokens.is_empty() {
                warn!(path = %path.display(), "Ignore list is empty");
            } else {
                debug!(path = %path.display(), count = tokens.len(), "Read ignore list");
            }
            tokens
        }
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Could not read ignore list, using no entries");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::write;
    use tempfile::tempdir;

    #[test]
    fn parse_list_accepts_newlines_and_commas() {
        let tokens = parse_list("node_modules\n.git, target\r\n\n  dist  ,\n");
        assert_eq!(tokens, vec!["node_modules", ".git", "target", "dist"]);
    }

    #[test]
    fn license_is_always_ignored() {
        let rules = IgnoreRules::new(Vec::<String>::new(), Vec::<String>::new(), Vec::<String>::new());
        assert!(rules.is_ignored_file("LICENSE"));
        assert!(!rules.is_ignored_file("LICENSE.md"));
    }

    #[test]
    fn extensions_match_by_suffix_and_names_match_exactly() {
        let rules = IgnoreRules::new([".git"], ["Cargo.lock"], [".png", ".min.js"]);
        assert!(rules.is_ignored_file("logo.png"));
        assert!(rules.is_ignored_file("bundle.min.js"));
        assert!(!rules.is_ignored_file("bundle.js"));
        assert!(rules.is_ignored_file("Cargo.lock"));
        assert!(!rules.is_ignored_file("sub/Cargo.lock.bak"));
        assert!(rules.is_ignored_dir(".git"));
        assert!(!rules.is_ignored_dir(".github"));
    }

    #[test]
    fn load_tolerates_missing_lists() {
        let tmp = tempdir().unwrap();
        let dirs = tmp.path().join("ignored_dir.csv");
        write(&dirs, ".git\nnode_modules\n").unwrap();

        let rules = IgnoreRules::load(
            &dirs,
            &tmp.path().join("missing_files.csv"),
            &tmp.path().join("missing_exts.csv"),
        );

        assert!(rules.is_ignored_dir("node_modules"));
        assert!(rules.is_ignored_file("LICENSE"));
        assert!(!rules.is_ignored_file("main.rs"));
    }
}
