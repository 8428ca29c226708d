//! Pre-order walk of a repository that produces one summary per directory.
//!
//! For every directory the walk summarises each eligible file, then folds those
//! file summaries into a single directory summary. Directories that end up with
//! no file summaries are skipped without a backend call. Entries are visited in
//! name order so the resulting structure text is deterministic.

use std::fmt;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::{Pacing, SystemPrompts};
use crate::contract::Backend;
use crate::extract::{extract, Extracted};
use crate::ignore::IgnoreRules;
use crate::progress::Progress;
use crate::summarize::{DirectoryAggregator, FileSummaries, FileSummarizer};

/// Absolute directory path → summary, in visitation order.
pub type DirectorySummaries = IndexMap<PathBuf, String>;

/// Result of walking a repository.
#[derive(Debug, Default)]
pub struct RepositoryScan {
    pub directories: DirectorySummaries,
    /// Files with a recorded entry, placeholders included.
    pub files_summarized: usize,
    /// Files whose summary is a placeholder because reading or the backend failed.
    pub files_failed: usize,
    /// Eligible files that produced no content.
    pub files_skipped: usize,
}

impl RepositoryScan {
    /// `<directory>: <summary>`, one line per recorded directory.
    pub fn structure_text(&self) -> String {
        self.directories
            .iter()
            .map(|(dir, summary)| format!("{}: {summary}", dir.display()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The walk could not list a directory. Aborts the whole run.
#[derive(Debug)]
pub enum ScanError {
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Io { path, source } => {
                write!(f, "error while walking {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::Io { source, .. } => Some(source),
        }
    }
}

pub struct Scanner<'a, B: Backend + ?Sized> {
    rules: &'a IgnoreRules,
    files: FileSummarizer<'a, B>,
    directories: DirectoryAggregator<'a, B>,
    pacing: Pacing,
    show_progress: bool,
}

impl<'a, B: Backend + ?Sized> Scanner<'a, B> {
    pub fn new(
        backend: &'a B,
        rules: &'a IgnoreRules,
        prompts: &SystemPrompts,
        pacing: Pacing,
        show_progress: bool,
    ) -> Self {
        Self {
            rules,
            files: FileSummarizer::new(backend, prompts.file.clone()),
            directories: DirectoryAggregator::new(backend, prompts.directory.clone()),
            pacing,
            show_progress,
        }
    }

    /// Walk `root` and summarise every directory that has eligible content.
    pub async fn scan(&self, root: &Path) -> Result<RepositoryScan, ScanError> {
        let mut scan = RepositoryScan::default();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let listing = list_dir(&dir)?;
            info!(dir = %dir.display(), files = listing.files.len(), "Scanning directory");

            let summaries = self.summarize_files(&dir, &listing.files, &mut scan).await;
            if summaries.is_empty() {
                debug!(dir = %dir.display(), "No file summaries, skipping directory");
            } else {
                let summary = self.summarize_directory(&dir, &summaries).await;
                scan.directories.insert(dir.clone(), summary);
            }

            // Reversed so the first subdirectory is popped next (pre-order).
            for entry in listing.dirs.iter().rev() {
                let sub = dir.join(&entry.os_name);
                if self.rules.is_ignored_dir(&entry.name) {
                    debug!(dir = %sub.display(), "Pruned ignored directory");
                    continue;
                }
                pending.push(sub);
            }
        }

        info!(
            directories = scan.directories.len(),
            files = scan.files_summarized,
            failed = scan.files_failed,
            skipped = scan.files_skipped,
            "Repository scan complete"
        );
        Ok(scan)
    }

    async fn summarize_files(
        &self,
        dir: &Path,
        entries: &[Entry],
        scan: &mut RepositoryScan,
    ) -> FileSummaries {
        let mut summaries = FileSummaries::new();
        let eligible: Vec<&Entry> = entries
            .iter()
            .filter(|entry| !self.rules.is_ignored_file(&entry.name))
            .collect();
        let progress =
            Progress::counter("Reading files", eligible.len() as u64, self.show_progress);

        for entry in eligible {
            let name = &entry.name;
            let path = dir.join(&entry.os_name);
            progress.set_message(format!("Processing {name}"));

            let summary = match extract(&path) {
                Extracted::Skip => {
                    scan.files_skipped += 1;
                    progress.inc();
                    continue;
                }
                Extracted::Unreadable(e) => {
                    scan.files_failed += 1;
                    format!("File could not be read: {e}")
                }
                Extracted::Content(content) => match self.files.summarize(name, &content).await {
                    Ok(summary) => summary,
                    Err(e) => {
                        warn!(error = %e, file = %path.display(), "Error getting file summary");
                        scan.files_failed += 1;
                        tokio::time::sleep(self.pacing.after_error).await;
                        format!("Error processing file: {e}")
                    }
                },
            };
            summaries.insert(name.clone(), summary);
            scan.files_summarized += 1;
            progress.inc();

            tokio::time::sleep(self.pacing.after_file).await;
        }
        summaries
    }

    async fn summarize_directory(&self, dir: &Path, summaries: &FileSummaries) -> String {
        let result = {
            let _progress = Progress::start("Processing directory", self.show_progress);
            self.directories.aggregate(summaries).await
        };
        match result {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, dir = %dir.display(), "Error getting directory summary");
                tokio::time::sleep(self.pacing.after_error).await;
                format!("Error processing directory: {e}")
            }
        }
    }
}

/// A directory entry. `os_name` addresses the file on disk; `name` is the
/// lossy UTF-8 rendering used for ignore rules and prompts.
struct Entry {
    os_name: OsString,
    name: String,
}

struct Listing {
    dirs: Vec<Entry>,
    files: Vec<Entry>,
}

/// Split a directory's entries into subdirectories and files, both sorted by name.
/// Symlinks to directories are not followed.
fn list_dir(dir: &Path) -> Result<Listing, ScanError> {
    let io_err = |source: io::Error| ScanError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let file_type = entry.file_type().map_err(io_err)?;
        let os_name = entry.file_name();
        let name = os_name.to_string_lossy().into_owned();
        if file_type.is_dir() {
            dirs.push(Entry { os_name, name });
        } else if entry.path().is_file() {
            files.push(Entry { os_name, name });
        }
    }
    dirs.sort_by(|a, b| a.os_name.cmp(&b.os_name));
    files.sort_by(|a, b| a.os_name.cmp(&b.os_name));
    Ok(Listing { dirs, files })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_text_has_one_line_per_directory_in_order() {
        let mut scan = RepositoryScan::default();
        scan.directories
            .insert(PathBuf::from("/repo"), "root".to_string());
        scan.directories
            .insert(PathBuf::from("/repo/src"), "sources".to_string());
        assert_eq!(scan.structure_text(), "/repo: root\n/repo/src: sources");
    }

    #[test]
    fn list_dir_reports_missing_directory() {
        let err = list_dir(Path::new("/definitely/not/here")).err().unwrap();
        assert!(err.to_string().contains("/definitely/not/here"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_keep_their_on_disk_path() {
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempfile::tempdir().unwrap();
        let raw = std::ffi::OsStr::from_bytes(b"caf\xe9.py");
        fs::write(tmp.path().join(raw), "print(1)").unwrap();
        fs::create_dir(tmp.path().join(std::ffi::OsStr::from_bytes(b"d\xfcr"))).unwrap();

        let listing = list_dir(tmp.path()).unwrap();
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].name, "caf\u{FFFD}.py");
        assert!(tmp.path().join(&listing.files[0].os_name).is_file());
        assert!(!tmp.path().join(&listing.files[0].name).exists());
        assert!(tmp.path().join(&listing.dirs[0].os_name).is_dir());
    }
}
