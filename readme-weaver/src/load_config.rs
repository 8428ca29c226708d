/// `load_config` module: reads the optional YAML config file and adapts it into the
/// typed settings the core pipeline consumes.
///
/// Every section of the file is optional, and so is the file itself. Missing keys
/// fall back to the defaults below. Secrets never live in this file; the API key
/// comes from the environment (see [`crate::gemini`]).
///
/// ```yaml
/// backend:
///   base_url: https://generativelanguage.googleapis.com/v1beta
///   file_model: gemini-1.5-flash
///   directory_model: gemini-1.5-flash
///   readme_model: gemini-1.5-pro
/// ignore:
///   directories: ignored_dir.csv
///   files: ignored_files.csv
///   extensions: ignored_exts.csv
/// pacing:
///   file_delay_ms: 100
///   error_delay_ms: 2000
///   retry_delay_ms: 2000
/// prompts:
///   readme_system_prompt: readme-sys-prpt.txt
/// ```
///
/// # Errors
/// Failures use `anyhow::Error` with the offending path in the message and are
/// surfaced at the CLI boundary.
use anyhow::{Context, Result};
use readme_weaver_core::config::{Pacing, SystemPrompts};
use readme_weaver_core::ignore::IgnoreRules;
use readme_weaver_core::retry::RetryPolicy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_SUMMARY_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_README_MODEL: &str = "gemini-1.5-pro";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    pub backend: BackendSection,
    pub ignore: IgnoreSection,
    pub pacing: PacingSection,
    pub prompts: PromptsSection,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendSection {
    pub base_url: String,
    pub file_model: String,
    pub directory_model: String,
    pub readme_model: String,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            file_model: DEFAULT_SUMMARY_MODEL.to_string(),
            directory_model: DEFAULT_SUMMARY_MODEL.to_string(),
            readme_model: DEFAULT_README_MODEL.to_string(),
        }
    }
}

/// Paths of the three ignore lists, relative to the working directory unless absolute.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct IgnoreSection {
    pub directories: PathBuf,
    pub files: PathBuf,
    pub extensions: PathBuf,
}

impl Default for IgnoreSection {
    fn default() -> Self {
        Self {
            directories: PathBuf::from("ignored_dir.csv"),
            files: PathBuf::from("ignored_files.csv"),
            extensions: PathBuf::from("ignored_exts.csv"),
        }
    }
}

impl IgnoreSection {
    pub fn load(&self) -> IgnoreRules {
        IgnoreRules::load(&self.directories, &self.files, &self.extensions)
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PacingSection {
    pub file_delay_ms: u64,
    pub error_delay_ms: u64,
    pub retry_delay_ms: u64,
}

impl Default for PacingSection {
    fn default() -> Self {
        Self {
            file_delay_ms: 100,
            error_delay_ms: 2000,
            retry_delay_ms: 2000,
        }
    }
}

impl PacingSection {
    pub fn pacing(&self) -> Pacing {
        Pacing {
            after_file: Duration::from_millis(self.file_delay_ms),
            after_error: Duration::from_millis(self.error_delay_ms),
        }
    }

    pub fn retry(&self) -> RetryPolicy {
        RetryPolicy::once(Duration::from_millis(self.retry_delay_ms))
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PromptsSection {
    /// File whose contents replace the built-in README system instruction.
    pub readme_system_prompt: Option<PathBuf>,
}

impl PromptsSection {
    pub fn system_prompts(&self) -> Result<SystemPrompts> {
        let mut prompts = SystemPrompts::default();
        if let Some(path) = &self.readme_system_prompt {
            prompts.readme = fs::read_to_string(path).with_context(|| {
                error!(path = %path.display(), "Failed to read README system prompt");
                format!("Failed to read README system prompt {}", path.display())
            })?;
            info!(path = %path.display(), "Using README system prompt from file");
        }
        Ok(prompts)
    }
}

/// Loads a static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {}: {e}",
                path_ref.display()
            ));
        }
    };

    // An empty document is a valid "all defaults" config.
    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(CliConfig::default());
    }

    match serde_yaml::from_str::<CliConfig>(&config_content) {
        Ok(config) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(config)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}
