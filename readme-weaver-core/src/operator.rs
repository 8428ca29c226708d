//! Line-oriented conversation with the person running the tool.
//!
//! [`Console`] is generic over its reader and writer so the whole interactive
//! flow can be driven from in-memory buffers in tests.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// The operator's verdict on a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Review {
    Accept,
    Reject,
}

/// Failure talking to the operator.
#[derive(Debug)]
pub struct ConsoleError(io::Error);

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "console I/O failed: {}", self.0)
    }
}

impl std::error::Error for ConsoleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<io::Error> for ConsoleError {
    fn from(e: io::Error) -> Self {
        ConsoleError(e)
    }
}

pub struct Console<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    /// Console bound to the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Offer to collect a one-line description of the project. Empty when declined.
    pub fn project_description(&mut self) -> Result<String, ConsoleError> {
        let wants = self.ask("Do you wish to describe your codebase in brief? (y/n): ")?;
        if !is_yes(wants.as_deref()) {
            return Ok(String::new());
        }
        writeln!(self.writer, "Please provide a brief description of your codebase")?;
        writeln!(self.writer, "Please mention the licence as well if possible")?;
        Ok(self.ask("-> ")?.unwrap_or_default())
    }

    /// Tell the operator where draft `version` is and ask whether to keep it.
    ///
    /// End of input counts as acceptance so a closed stdin cannot loop forever.
    pub fn review(&mut self, version: u32, draft: &Path) -> Result<Review, ConsoleError> {
        let name = draft
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| draft.display().to_string());
        writeln!(self.writer, "\nREADME version {version} has been saved as {name}")?;
        writeln!(self.writer, "Please review the file and provide feedback.")?;

        match self.ask("\nAre you satisfied with this README? (yes/no): ")? {
            None => Ok(Review::Accept),
            Some(answer) if is_yes(Some(answer.as_str())) => Ok(Review::Accept),
            Some(_) => Ok(Review::Reject),
        }
    }

    /// Collect one line of free-text feedback.
    pub fn feedback(&mut self) -> Result<String, ConsoleError> {
        writeln!(self.writer, "\nPlease provide feedback or suggestions for improvement:")?;
        Ok(self.ask("")?.unwrap_or_default())
    }

    /// Ask whether a failed clone should be attempted again.
    pub fn confirm_retry(&mut self) -> Result<bool, ConsoleError> {
        let answer = self.ask("Do you want to retry? (y/n): ")?;
        Ok(is_yes(answer.as_deref()))
    }

    /// Print an informational line.
    pub fn say(&mut self, message: &str) -> Result<(), ConsoleError> {
        writeln!(self.writer, "{message}")?;
        Ok(())
    }

    /// Show `prompt`, read one line. `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>, ConsoleError> {
        write!(self.writer, "{prompt}")?;
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn is_yes(answer: Option<&str>) -> bool {
    matches!(
        answer.map(str::to_ascii_lowercase).as_deref(),
        Some("y") | Some("yes")
    )
}
