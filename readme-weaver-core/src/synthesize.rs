//! README synthesis as a conversation with the backend.
//!
//! [`DocumentSynthesizer`] owns a [`Transcript`]. Every successful call sends the
//! transcript plus one new user turn and then appends both that turn and the
//! model's reply, so a revision is always interpreted against everything said
//! before it. A failed call leaves the transcript untouched, which makes a
//! retry send exactly the same conversation again.

use tracing::{debug, info};

use crate::contract::{Backend, BackendError, Turn};

/// Append-only record of the conversation with the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing turns, e.g. a fixed history injected by a test.
    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Inputs of the first README draft.
#[derive(Debug, Clone, Default)]
pub struct ReadmeRequest<'a> {
    /// Free text from the operator, may be empty.
    pub description: &'a str,
    /// The README that already exists in the repository, may be empty.
    pub existing_readme: &'a str,
    /// One `<directory>: <summary>` line per summarised directory.
    pub structure: &'a str,
}

/// Stateful README writer.
pub struct DocumentSynthesizer<'a, B: Backend + ?Sized> {
    backend: &'a B,
    system_instruction: String,
    transcript: Transcript,
}

impl<'a, B: Backend + ?Sized> DocumentSynthesizer<'a, B> {
    pub fn new(backend: &'a B, system_instruction: impl Into<String>) -> Self {
        Self::with_transcript(backend, system_instruction, Transcript::new())
    }

    pub fn with_transcript(
        backend: &'a B,
        system_instruction: impl Into<String>,
        transcript: Transcript,
    ) -> Self {
        Self {
            backend,
            system_instruction: system_instruction.into(),
            transcript,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Produce the initial draft from the aggregated repository structure.
    pub async fn generate(&mut self, request: &ReadmeRequest<'_>) -> Result<String, BackendError> {
        info!(
            description_len = request.description.len(),
            existing_len = request.existing_readme.len(),
            structure_len = request.structure.len(),
            "Generating initial README"
        );
        self.send(initial_prompt(request)).await
    }

    /// Produce a complete replacement README that takes `feedback` into account.
    pub async fn revise(&mut self, feedback: &str) -> Result<String, BackendError> {
        info!(history = self.transcript.len(), "Revising README with feedback");
        self.send(revision_prompt(feedback)).await
    }

    async fn send(&mut self, prompt: String) -> Result<String, BackendError> {
        let mut turns = self.transcript.turns().to_vec();
        turns.push(Turn::user(prompt));

        let reply = self
            .backend
            .complete(&self.system_instruction, &turns)
            .await?;

        // Only a successful exchange becomes part of the history.
        if let Some(prompt_turn) = turns.pop() {
            self.transcript.push(prompt_turn);
        }
        self.transcript.push(Turn::model(reply.clone()));
        debug!(history = self.transcript.len(), "Transcript extended");
        Ok(reply)
    }
}

pub fn initial_prompt(request: &ReadmeRequest<'_>) -> String {
    format!(
        "Generate a README for a GitHub repository with the following description and structure:\n\n\
         Description: {}\n\n\
         Existing README: {}\n\n\
         Structure: {}",
        request.description, request.existing_readme, request.structure
    )
}

pub fn revision_prompt(feedback: &str) -> String {
    format!("Based on the following feedback, please improve the README:\n{feedback}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{MockBackend, Role};

    #[test]
    fn initial_prompt_orders_description_existing_and_structure() {
        let prompt = initial_prompt(&ReadmeRequest {
            description: "A tool",
            existing_readme: "# Old",
            structure: "/repo: root files",
        });
        assert_eq!(
            prompt,
            "Generate a README for a GitHub repository with the following description and structure:\n\n\
             Description: A tool\n\nExisting README: # Old\n\nStructure: /repo: root files"
        );
    }

    #[tokio::test]
    async fn revise_sends_injected_history_then_feedback() {
        let history = vec![Turn::user("first prompt"), Turn::model("# Draft 1")];
        let expected_history = history.clone();

        let mut backend = MockBackend::new();
        backend
            .expect_complete()
            .withf(move |system, turns| {
                system == "readme"
                    && turns.len() == 3
                    && turns[..2] == expected_history[..]
                    && turns[2]
                        == Turn::user(
                            "Based on the following feedback, please improve the README:\nadd install steps",
                        )
            })
            .times(1)
            .returning(|_, _| Ok("# Draft 2".to_string()));

        let mut synth =
            DocumentSynthesizer::with_transcript(&backend, "readme", Transcript::from_turns(history));
        let draft = synth.revise("add install steps").await.unwrap();

        assert_eq!(draft, "# Draft 2");
        assert_eq!(synth.transcript().len(), 4);
        assert_eq!(synth.transcript().turns()[3].role, Role::Model);
    }

    #[tokio::test]
    async fn failed_call_leaves_transcript_untouched() {
        let mut backend = MockBackend::new();
        backend
            .expect_complete()
            .times(1)
            .returning(|_, _| Err("unavailable".into()));
        backend
            .expect_complete()
            .withf(|_, turns| turns.len() == 1)
            .times(1)
            .returning(|_, _| Ok("# Draft".to_string()));

        let mut synth = DocumentSynthesizer::new(&backend, "readme");
        let request = ReadmeRequest::default();
        assert!(synth.generate(&request).await.is_err());
        assert!(synth.transcript().is_empty());

        assert_eq!(synth.generate(&request).await.unwrap(), "# Draft");
        assert_eq!(synth.transcript().len(), 2);
    }
}
