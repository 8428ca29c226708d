//! # contract: the generative backend seam
//!
//! Everything in the pipeline that talks to a language model goes through the
//! [`Backend`] trait defined here. The trait is small: a system
//! instruction plus an ordered list of turns in, one completion out.
//!
//! - One-shot callers (file summaries, directory summaries) send a single user turn.
//! - The document synthesizer sends its whole transcript followed by the new prompt.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so `MockBackend` is available to unit
//!   tests and, through the default `test-export-mocks` feature, to integration tests.
//!
//! ## Adding New Backends
//! - Implement [`Backend`] for your client and map every transport or API failure
//!   into a [`BackendError`]. Callers never inspect the error, they only log it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Error type for backend calls (boxed, like every other async seam in this crate).
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Who produced a turn of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One message in a conversation with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// A generative-text backend: maps a system instruction and a conversation to a completion.
///
/// Implementations must not retry internally; retry policy lives in the driver.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Complete the conversation `turns` under `system_instruction`.
    ///
    /// The last turn is always a [`Role::User`] turn.
    async fn complete(
        &self,
        system_instruction: &str,
        turns: &[Turn],
    ) -> Result<String, BackendError>;
}
