use serial_test::serial;
use std::fs::write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{tempdir, NamedTempFile};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

use readme_weaver::load_config::{load_config, CliConfig, DEFAULT_BASE_URL, DEFAULT_README_MODEL};
use readme_weaver_core::prompts::README_SYSTEM_PROMPT;

#[test]
fn full_config_is_loaded() {
    let config_yaml = r#"
backend:
  base_url: https://proxy.internal/v1beta
  file_model: flash-small
  directory_model: flash-large
  readme_model: pro
ignore:
  directories: lists/dirs.csv
  files: lists/files.csv
  extensions: lists/exts.csv
pacing:
  file_delay_ms: 0
  error_delay_ms: 50
  retry_delay_ms: 10
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.backend.base_url, "https://proxy.internal/v1beta");
    assert_eq!(config.backend.directory_model, "flash-large");
    assert_eq!(config.ignore.extensions, PathBuf::from("lists/exts.csv"));
    assert_eq!(config.pacing.pacing().after_file, Duration::ZERO);
    assert_eq!(config.pacing.pacing().after_error, Duration::from_millis(50));
    assert_eq!(config.pacing.retry().next_delay(0), Some(Duration::from_millis(10)));
    assert_eq!(config.pacing.retry().next_delay(1), None);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "backend:\n  readme_model: custom\n").unwrap();

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.backend.readme_model, "custom");
    assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.ignore.directories, PathBuf::from("ignored_dir.csv"));
    assert_eq!(config.pacing.retry().next_delay(0), Some(Duration::from_secs(2)));
}

#[test]
fn empty_file_is_all_defaults() {
    let config_file = NamedTempFile::new().expect("temp file");
    let config = load_config(config_file.path()).expect("Config should load");
    assert_eq!(config, CliConfig::default());
    assert_eq!(config.backend.readme_model, DEFAULT_README_MODEL);
}

#[test]
fn missing_file_is_an_error() {
    let err = load_config("/no/such/config.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn readme_prompt_can_be_overridden_from_a_file() {
    let dir = tempdir().unwrap();
    let prompt_path = dir.path().join("readme-sys-prpt.txt");
    write(&prompt_path, "Write a terse README.").unwrap();

    let config_file = NamedTempFile::new().expect("temp file");
    write(
        config_file.path(),
        format!("prompts:\n  readme_system_prompt: {}\n", prompt_path.display()),
    )
    .unwrap();

    let config = load_config(config_file.path()).unwrap();
    let prompts = config.prompts.system_prompts().unwrap();
    assert_eq!(prompts.readme, "Write a terse README.");

    let defaults = CliConfig::default().prompts.system_prompts().unwrap();
    assert_eq!(defaults.readme, README_SYSTEM_PROMPT);
}

#[test]
fn ignore_lists_are_read_relative_to_given_paths() {
    let dir = tempdir().unwrap();
    write(dir.path().join("dirs.csv"), ".git\nnode_modules\n").unwrap();
    write(dir.path().join("exts.csv"), ".png,.jpg").unwrap();

    let config_file = NamedTempFile::new().expect("temp file");
    write(
        config_file.path(),
        format!(
            "ignore:\n  directories: {0}/dirs.csv\n  files: {0}/missing.csv\n  extensions: {0}/exts.csv\n",
            dir.path().display()
        ),
    )
    .unwrap();

    let rules = load_config(config_file.path()).unwrap().ignore.load();
    assert!(rules.is_ignored_dir("node_modules"));
    assert!(rules.is_ignored_file("photo.jpg"));
    assert!(rules.is_ignored_file("LICENSE"));
    assert!(!rules.is_ignored_file("main.rs"));
}

/// Collects the debug rendering of every event.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{event:?}"));
    }
}

#[tokio::test]
#[serial]
async fn run_emits_trace_initialised_before_failing_on_bad_path() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = Registry::default().with(EventCollector {
        events: events.clone(),
    });
    let _guard = tracing::subscriber::set_default(subscriber);

    let cli = readme_weaver::Cli {
        git: None,
        root: None,
        local: Some(PathBuf::from("/definitely/not/a/dir")),
        config: None,
        description: None,
    };
    let err = readme_weaver::run(cli).await.unwrap_err();
    assert!(err.to_string().contains("not a valid directory"));

    let events = events.lock().unwrap();
    assert!(events.iter().any(|e| e.contains("trace_initialised")));
}
