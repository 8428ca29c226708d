//! End-to-end README run: scan the repository, draft a README, let the operator
//! revise it, and promote the accepted draft.
//!
//! # Flow
//! 1. Read the existing `README.md` (missing or unreadable counts as empty).
//! 2. Take the project description from [`GenerateConfig::description`] or ask
//!    the operator for one.
//! 3. Walk the repository with [`Scanner`] and build the structure text.
//! 4. Ask the [`DocumentSynthesizer`] for an initial draft. Failures are retried
//!    according to [`GenerateConfig::retry`]; once retries run out the run fails
//!    and nothing is written.
//! 5. Revision loop: persist draft N as `README_v<N>.md`, ask for a review, and
//!    on rejection feed the operator's remarks back into the synthesizer. A
//!    revision that keeps failing ends the loop with the last good draft.
//! 6. Promote the final draft to `README.md` and delete the earlier drafts.
//!
//! # Errors
//! Only the scan, the initial draft and operator I/O are fatal. Version-file
//! write failures are logged and the loop carries on; promotion then falls
//! back to writing the draft text directly. A failed promotion is reported to
//! the operator and leaves the last `README_v<N>.md` in place, and the run
//! still succeeds with [`ReadmeReport::promoted`] set to false.

use std::fmt;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::config::GenerateConfig;
use crate::contract::{Backend, BackendError};
use crate::operator::{Console, ConsoleError, Review};
use crate::progress::Progress;
use crate::retry::RetryPolicy;
use crate::synthesize::{DocumentSynthesizer, ReadmeRequest};
use crate::traverse::{DirectorySummaries, ScanError, Scanner};
use crate::versions::ReadmeVersions;

/// How the revision loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The operator accepted the last draft.
    Accepted,
    /// A revision failed even after retrying; the last good draft was kept.
    RevisionFailed,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct ReadmeReport {
    /// `README.md`, or the last draft when promotion failed.
    pub readme_path: PathBuf,
    /// Whether the final draft made it to `README.md`.
    pub promoted: bool,
    /// Number of drafts shown to the operator.
    pub versions: u32,
    pub directories: DirectorySummaries,
    pub outcome: LoopOutcome,
}

#[derive(Debug)]
pub enum PipelineError {
    Scan(ScanError),
    /// The initial draft could not be produced.
    Synthesis(BackendError),
    Console(ConsoleError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Scan(e) => write!(f, "repository scan failed: {e}"),
            PipelineError::Synthesis(e) => write!(f, "failed to generate README: {e}"),
            PipelineError::Console(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Scan(e) => Some(e),
            PipelineError::Synthesis(e) => Some(&**e),
            PipelineError::Console(e) => Some(e),
        }
    }
}

impl From<ScanError> for PipelineError {
    fn from(e: ScanError) -> Self {
        PipelineError::Scan(e)
    }
}

impl From<ConsoleError> for PipelineError {
    fn from(e: ConsoleError) -> Self {
        PipelineError::Console(e)
    }
}

/// Run the whole README workflow for `config.repo_dir`.
pub async fn generate_readme<B, R, W>(
    config: &GenerateConfig,
    backend: &B,
    console: &mut Console<R, W>,
) -> Result<ReadmeReport, PipelineError>
where
    B: Backend + ?Sized,
    R: BufRead,
    W: Write,
{
    config.trace_loaded();
    let versions = ReadmeVersions::new(&config.repo_dir);

    let existing_readme = read_existing_readme(&versions);
    let description = match &config.description {
        Some(description) => description.clone(),
        None => console.project_description()?,
    };

    let scanner = Scanner::new(
        backend,
        &config.ignore,
        &config.prompts,
        config.pacing.clone(),
        config.show_progress,
    );
    let scan = scanner.scan(&config.repo_dir).await?;
    let structure = scan.structure_text();

    let mut synthesizer = DocumentSynthesizer::new(backend, config.prompts.readme.clone());
    let request = ReadmeRequest {
        description: &description,
        existing_readme: &existing_readme,
        structure: &structure,
    };
    let mut draft = match draft_with_retry(
        &mut synthesizer,
        Step::Generate(&request),
        &config.retry,
        config.show_progress,
    )
    .await
    {
        Ok(draft) => draft,
        Err(e) => {
            error!(error = %e, "Error generating README");
            return Err(PipelineError::Synthesis(e));
        }
    };

    let mut version: u32 = 1;
    let outcome = loop {
        let path = match versions.write(version, &draft) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, version, "Error saving README draft");
                versions.version_path(version)
            }
        };

        if console.review(version, &path)? == Review::Accept {
            info!(version, "README accepted");
            break LoopOutcome::Accepted;
        }

        let feedback = console.feedback()?;
        match draft_with_retry(
            &mut synthesizer,
            Step::Revise(&feedback),
            &config.retry,
            config.show_progress,
        )
        .await
        {
            Ok(revised) => {
                versions.discard(version);
                version += 1;
                draft = revised;
            }
            Err(e) => {
                error!(error = %e, version, "Revision failed, keeping the last draft");
                console.say("Failed to revise README. Keeping the last version.")?;
                break LoopOutcome::RevisionFailed;
            }
        }
    };

    let (readme_path, promoted) = match versions.promote(version, &draft) {
        Ok(path) => {
            console.say(&format!("Final README saved as {}", path.display()))?;
            (path, true)
        }
        Err(e) => {
            error!(error = %e, version, "Error saving final README");
            console.say(&format!("Error saving final README: {e}"))?;
            (versions.version_path(version), false)
        }
    };
    versions.clean_up(version);

    Ok(ReadmeReport {
        readme_path,
        promoted,
        versions: version,
        directories: scan.directories,
        outcome,
    })
}

fn read_existing_readme(versions: &ReadmeVersions) -> String {
    let path = versions.canonical_path();
    match fs::read_to_string(&path) {
        Ok(content) => {
            info!(path = %path.display(), bytes = content.len(), "Read existing README");
            content
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No existing README found");
            String::new()
        }
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Could not read existing README, ignoring it");
            String::new()
        }
    }
}

enum Step<'r> {
    Generate(&'r ReadmeRequest<'r>),
    Revise(&'r str),
}

/// Ask the synthesizer for a draft, retrying per `policy`. Returns the last error
/// once the policy gives up.
async fn draft_with_retry<B: Backend + ?Sized>(
    synthesizer: &mut DocumentSynthesizer<'_, B>,
    step: Step<'_>,
    policy: &RetryPolicy,
    show_progress: bool,
) -> Result<String, BackendError> {
    let mut attempt = 0;
    loop {
        let result = {
            let _progress = Progress::start("Generating README", show_progress);
            match &step {
                Step::Generate(request) => synthesizer.generate(request).await,
                Step::Revise(feedback) => synthesizer.revise(feedback).await,
            }
        };
        match result {
            Ok(draft) => return Ok(draft),
            Err(e) => match policy.next_delay(attempt) {
                Some(delay) => {
                    warn!(error = %e, attempt, ?delay, "README request failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return Err(e),
            },
        }
    }
}
