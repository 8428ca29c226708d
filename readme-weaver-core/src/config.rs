//! Settings for one README generation run.
//!
//! The CLI builds a [`GenerateConfig`] from its YAML file and flags; tests build
//! one directly and switch [`Pacing`] off.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::ignore::IgnoreRules;
use crate::prompts::{DIRECTORY_SYSTEM_PROMPT, FILE_SYSTEM_PROMPT, README_SYSTEM_PROMPT};
use crate::retry::RetryPolicy;

/// Courtesy delays between backend calls. None of them affect correctness.
#[derive(Debug, Clone, PartialEq)]
pub struct Pacing {
    /// After every processed file.
    pub after_file: Duration,
    /// After a summariser or aggregator call failed.
    pub after_error: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            after_file: Duration::from_millis(100),
            after_error: Duration::from_secs(2),
        }
    }
}

impl Pacing {
    /// No delays at all; used by tests.
    pub fn none() -> Self {
        Self {
            after_file: Duration::ZERO,
            after_error: Duration::ZERO,
        }
    }
}

/// System instructions for the three model roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompts {
    pub file: String,
    pub directory: String,
    pub readme: String,
}

impl Default for SystemPrompts {
    fn default() -> Self {
        Self {
            file: FILE_SYSTEM_PROMPT.to_string(),
            directory: DIRECTORY_SYSTEM_PROMPT.to_string(),
            readme: README_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Everything a README run needs besides the backend and the console.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Absolute path of the repository to document.
    pub repo_dir: PathBuf,
    pub ignore: IgnoreRules,
    /// Pre-supplied project description; when `None` the operator is asked.
    pub description: Option<String>,
    pub prompts: SystemPrompts,
    pub pacing: Pacing,
    /// Applied to the initial draft and to every revision.
    pub retry: RetryPolicy,
    /// Draw progress indicators while waiting on the backend.
    pub show_progress: bool,
}

impl GenerateConfig {
    pub fn new(repo_dir: impl Into<PathBuf>, ignore: IgnoreRules) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            ignore,
            description: None,
            prompts: SystemPrompts::default(),
            pacing: Pacing::default(),
            retry: RetryPolicy::default(),
            show_progress: false,
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            repo_dir = %self.repo_dir.display(),
            description_given = self.description.is_some(),
            retries = self.retry.max_retries,
            show_progress = self.show_progress,
            "Loaded GenerateConfig"
        );
        debug!(?self, "GenerateConfig loaded (full debug)");
    }
}
