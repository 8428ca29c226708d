//! One-shot summarisers: a file's content to a description, a directory's file
//! descriptions to a directory description.
//!
//! Both make exactly one backend call per invocation and pass backend errors
//! through untouched; recovery is the traversal's job.

use indexmap::IndexMap;
use tracing::debug;

use crate::contract::{Backend, BackendError, Turn};

/// File name → description for one directory, in the order the files were summarised.
pub type FileSummaries = IndexMap<String, String>;

/// Describes a single file.
pub struct FileSummarizer<'a, B: Backend + ?Sized> {
    backend: &'a B,
    system_instruction: String,
}

impl<'a, B: Backend + ?Sized> FileSummarizer<'a, B> {
    pub fn new(backend: &'a B, system_instruction: impl Into<String>) -> Self {
        Self {
            backend,
            system_instruction: system_instruction.into(),
        }
    }

    /// Ask the backend to describe `content`, prefixed with the file's display name.
    pub async fn summarize(&self, file_name: &str, content: &str) -> Result<String, BackendError> {
        let prompt = file_prompt(file_name, content);
        debug!(file = file_name, prompt_len = prompt.len(), "Requesting file summary");
        self.backend
            .complete(&self.system_instruction, &[Turn::user(prompt)])
            .await
    }
}

/// Folds the file descriptions of one directory into one description.
pub struct DirectoryAggregator<'a, B: Backend + ?Sized> {
    backend: &'a B,
    system_instruction: String,
}

impl<'a, B: Backend + ?Sized> DirectoryAggregator<'a, B> {
    pub fn new(backend: &'a B, system_instruction: impl Into<String>) -> Self {
        Self {
            backend,
            system_instruction: system_instruction.into(),
        }
    }

    pub async fn aggregate(&self, summaries: &FileSummaries) -> Result<String, BackendError> {
        let prompt = directory_prompt(summaries);
        debug!(files = summaries.len(), "Requesting directory summary");
        self.backend
            .complete(&self.system_instruction, &[Turn::user(prompt)])
            .await
    }
}

/// The file prompt is the display name immediately followed by the content.
pub fn file_prompt(file_name: &str, content: &str) -> String {
    format!("{file_name}{content}")
}

/// `<file name>: <summary>`, one line per file.
pub fn directory_prompt(summaries: &FileSummaries) -> String {
    summaries
        .iter()
        .map(|(name, summary)| format!("{name}: {summary}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{MockBackend, Role};

    #[tokio::test]
    async fn file_summary_is_one_user_turn_with_name_and_content() {
        let mut backend = MockBackend::new();
        backend
            .expect_complete()
            .withf(|system, turns| {
                system == "describe"
                    && turns.len() == 1
                    && turns[0].role == Role::User
                    && turns[0].text == "a.pyprint(1)"
            })
            .times(1)
            .returning(|_, _| Ok("prints one".to_string()));

        let summarizer = FileSummarizer::new(&backend, "describe");
        let summary = summarizer.summarize("a.py", "print(1)").await.unwrap();
        assert_eq!(summary, "prints one");
    }

    #[tokio::test]
    async fn backend_errors_pass_through_unchanged() {
        let mut backend = MockBackend::new();
        backend
            .expect_complete()
            .times(1)
            .returning(|_, _| Err("quota exhausted".into()));

        let aggregator = DirectoryAggregator::new(&backend, "stitch");
        let mut summaries = FileSummaries::new();
        summaries.insert("a.py".into(), "prints one".into());
        let err = aggregator.aggregate(&summaries).await.unwrap_err();
        assert_eq!(err.to_string(), "quota exhausted");
    }

    #[test]
    fn directory_prompt_keeps_insertion_order() {
        let mut summaries = FileSummaries::new();
        summaries.insert("z.rs".into(), "last letter".into());
        summaries.insert("a.rs".into(), "first letter".into());
        assert_eq!(
            directory_prompt(&summaries),
            "z.rs: last letter\na.rs: first letter"
        );
    }
}
