///
/// This module implements the CLI interface for readme-weaver: argument parsing,
/// repository resolution, and wiring the Gemini backend into the core pipeline.
///
/// All business logic (scan, synthesis, revision loop) lives in [`readme-weaver-core`].
/// This module is strictly CLI glue.
///
/// ## How To Use
/// - Command-line users: `readme-weaver --local <path>` or
///   `readme-weaver --git <url> --root <dir>`, see `--help`.
/// - Programmatic use: call [`run`] with a constructed [`Cli`].
///
/// [`readme-weaver-core`]: ../../readme-weaver-core/
use crate::gemini::GeminiClient;
use crate::load_config::{load_config, CliConfig};
use anyhow::{anyhow, Result};
use clap::{ArgGroup, Parser};
use readme_weaver_core::config::GenerateConfig;
use readme_weaver_core::download::{RepoSource, SourceError};
use readme_weaver_core::operator::Console;
use readme_weaver_core::pipeline::generate_readme;
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

/// Generate a README for a repository and refine it interactively.
#[derive(Parser, Debug)]
#[clap(
    name = "readme-weaver",
    version,
    about = "Summarise a repository with a generative model and iterate on its README"
)]
#[clap(group(ArgGroup::new("source").required(true).args(["git", "local"])))]
pub struct Cli {
    /// Git repository URL to clone
    #[clap(long)]
    pub git: Option<String>,

    /// Directory to clone into (required with --git)
    #[clap(long)]
    pub root: Option<PathBuf>,

    /// Local repository directory
    #[clap(long)]
    pub local: Option<PathBuf>,

    /// Optional YAML config file
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Project description; skips the interactive question
    #[clap(long)]
    pub description: Option<String>,
}

impl Cli {
    pub fn source(&self) -> Result<RepoSource> {
        match (&self.git, &self.local) {
            (Some(repo_url), None) => Ok(RepoSource::Git {
                repo_url: repo_url.clone(),
                root: self.root.clone(),
            }),
            (None, Some(path)) => Ok(RepoSource::Local { path: path.clone() }),
            _ => Err(anyhow!("Specify exactly one of --git or --local")),
        }
    }
}

/// Async CLI entrypoint for integration tests and main().
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => CliConfig::default(),
    };
    let mut console = Console::stdio();

    let repo_dir = resolve_source(&cli.source()?, &mut console)?;
    tracing::info!(repo_dir = %repo_dir.display(), "Repository resolved");

    let prompts = config.prompts.system_prompts()?;
    let backend = GeminiClient::new_from_env(&config.backend, &prompts)
        .map_err(|e| anyhow!("Failed to construct Gemini client: {e}"))?;

    let mut generate = GenerateConfig::new(repo_dir, config.ignore.load());
    generate.description = cli.description.clone();
    generate.prompts = prompts;
    generate.pacing = config.pacing.pacing();
    generate.retry = config.pacing.retry();
    generate.show_progress = std::io::stderr().is_terminal();

    match generate_readme(&generate, &backend, &mut console).await {
        Ok(report) => {
            tracing::info!(
                readme = %report.readme_path.display(),
                promoted = report.promoted,
                versions = report.versions,
                directories = report.directories.len(),
                outcome = ?report.outcome,
                "README generation complete"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "README generation failed");
            Err(e.into())
        }
    }
}

/// Resolve the repository directory, offering to retry a failed clone.
pub fn resolve_source<R: BufRead, W: Write>(
    source: &RepoSource,
    console: &mut Console<R, W>,
) -> Result<PathBuf> {
    loop {
        match source.resolve() {
            Ok(dir) => return Ok(dir),
            Err(e @ SourceError::CloneFailed { .. }) => {
                console.say(&format!("Error: {e}"))?;
                if !console.confirm_retry()? {
                    return Err(e.into());
                }
                tracing::info!("Retrying clone");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Cursor;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn git_and_local_are_mutually_exclusive_and_one_is_required() {
        assert!(Cli::try_parse_from(["readme-weaver", "--git", "u", "--local", "."]).is_err());
        assert!(Cli::try_parse_from(["readme-weaver"]).is_err());

        let cli = Cli::try_parse_from(["readme-weaver", "--local", "/tmp/repo"]).unwrap();
        assert_eq!(
            cli.source().unwrap(),
            RepoSource::Local {
                path: PathBuf::from("/tmp/repo")
            }
        );
    }

    #[test]
    fn git_source_carries_root() {
        let cli = Cli::try_parse_from([
            "readme-weaver",
            "--git",
            "https://github.com/acme/widget.git",
            "--root",
            "/work",
            "--description",
            "A widget",
        ])
        .unwrap();
        assert_eq!(cli.description.as_deref(), Some("A widget"));
        assert_eq!(
            cli.source().unwrap(),
            RepoSource::Git {
                repo_url: "https://github.com/acme/widget.git".into(),
                root: Some(PathBuf::from("/work")),
            }
        );
    }

    #[test]
    fn declined_clone_retry_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let source = RepoSource::Git {
            repo_url: "/definitely/not/a/repo".into(),
            root: Some(root.path().join("clones")),
        };
        let mut console = Console::new(Cursor::new(b"n\n".to_vec()), Vec::new());

        let err = resolve_source(&source, &mut console).unwrap_err();
        assert!(err.to_string().contains("Failed to clone"));

        let out = String::from_utf8(console.into_writer()).unwrap();
        assert!(out.contains("Do you want to retry? (y/n): "));
    }
}
