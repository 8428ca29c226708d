//! Locating the repository to document: either a local directory or a git
//! remote cloned into a root directory.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Where the repository comes from.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RepoSource {
    /// Clone `repo_url` into `root` (or reuse an existing clone there).
    Git {
        repo_url: String,
        root: Option<PathBuf>,
    },
    /// Document a directory that already exists.
    Local { path: PathBuf },
}

#[derive(Debug)]
pub enum SourceError {
    InvalidLocalPath(PathBuf),
    MissingRoot,
    CloneFailed { repo_url: String, reason: String },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::InvalidLocalPath(p) => {
                write!(f, "The provided path is not a valid directory: {}", p.display())
            }
            SourceError::MissingRoot => {
                write!(f, "Please provide a root directory for cloning Git repositories.")
            }
            SourceError::CloneFailed { repo_url, reason } => {
                write!(f, "Failed to clone {repo_url}: {reason}")
            }
        }
    }
}

impl std::error::Error for SourceError {}

impl RepoSource {
    /// Resolve to an absolute directory, cloning when needed.
    pub fn resolve(&self) -> Result<PathBuf, SourceError> {
        match self {
            RepoSource::Local { path } => resolve_local(path),
            RepoSource::Git { repo_url, root } => {
                let root = root.as_deref().ok_or(SourceError::MissingRoot)?;
                let target = clone_target(repo_url, root);
                if target.exists() {
                    tracing::info!(
                        repo_url = repo_url.as_str(),
                        path = %target.display(),
                        "Repository is already cloned, reusing existing directory"
                    );
                } else {
                    clone_repository(repo_url, &target)?;
                }
                resolve_local(&target)
            }
        }
    }
}

pub fn resolve_local(path: &Path) -> Result<PathBuf, SourceError> {
    if !path.is_dir() {
        tracing::error!(path = %path.display(), "Not a directory");
        return Err(SourceError::InvalidLocalPath(path.to_path_buf()));
    }
    fs::canonicalize(path).map_err(|e| {
        tracing::error!(error = ?e, path = %path.display(), "Failed to canonicalize path");
        SourceError::InvalidLocalPath(path.to_path_buf())
    })
}

/// `<root>/<last segment of the url>`, without a trailing `.git`.
pub fn clone_target(repo_url: &str, root: &Path) -> PathBuf {
    let last = repo_url
        .trim_end_matches('/')
        .rsplit(|c: char| c == '/' || c == ':')
        .next()
        .unwrap_or(repo_url);
    let name = last.strip_suffix(".git").unwrap_or(last);
    root.join(name)
}

/// `git clone <repo_url> <target>`.
pub fn clone_repository(repo_url: &str, target: &Path) -> Result<(), SourceError> {
    if let Some(parent) = target.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                tracing::error!(error = ?e, path = %parent.display(), "Failed to create clone root");
                SourceError::CloneFailed {
                    repo_url: repo_url.to_string(),
                    reason: e.to_string(),
                }
            })?;
        }
    }

    tracing::info!(repo_url, path = %target.display(), "Cloning repository");
    let status = Command::new("git")
        .arg("clone")
        .arg(repo_url)
        .arg(target)
        .status();

    match status {
        Ok(s) if s.success() => {
            tracing::info!(repo_url, path = %target.display(), "Successfully cloned git repository");
            Ok(())
        }
        Ok(s) => {
            tracing::error!(repo_url, path = %target.display(), "Git exited with non-zero code: {}", s);
            Err(SourceError::CloneFailed {
                repo_url: repo_url.to_string(),
                reason: format!("git exited with {s}"),
            })
        }
        Err(e) => {
            tracing::error!(error = ?e, repo_url, "Failed to launch git process");
            Err(SourceError::CloneFailed {
                repo_url: repo_url.to_string(),
                reason: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn clone_target_uses_last_segment_without_git_suffix() {
        let root = Path::new("/work");
        assert_eq!(
            clone_target("https://github.com/acme/widget.git", root),
            PathBuf::from("/work/widget")
        );
        assert_eq!(
            clone_target("git@github.com:acme/widget.git", root),
            PathBuf::from("/work/widget")
        );
        assert_eq!(
            clone_target("https://github.com/acme/widget/", root),
            PathBuf::from("/work/widget")
        );
    }

    #[test]
    fn git_source_without_root_is_rejected() {
        let source = RepoSource::Git {
            repo_url: "https://github.com/acme/widget".into(),
            root: None,
        };
        assert!(matches!(source.resolve(), Err(SourceError::MissingRoot)));
    }

    #[test]
    fn existing_clone_is_reused() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join("widget")).unwrap();
        let source = RepoSource::Git {
            repo_url: "https://example.invalid/acme/widget.git".into(),
            root: Some(tmp.path().to_path_buf()),
        };
        let resolved = source.resolve().unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("widget"));
    }

    #[test]
    fn local_source_must_be_a_directory() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            resolve_local(&file),
            Err(SourceError::InvalidLocalPath(_))
        ));
        assert!(resolve_local(tmp.path()).unwrap().is_absolute());
    }
}
