//! # Gemini backend
//!
//! [`GeminiClient`] implements the core [`Backend`] trait against the Gemini
//! `generateContent` REST endpoint.
//!
//! - The API key is read from `GOOGLE_API_KEY` (a `.env` file is honoured).
//! - Each model role gets its own model: the client picks the model by the system
//!   instruction it is called with, falling back to the default model.
//! - No retries happen here; the pipeline owns the retry policy.

use async_trait::async_trait;
use readme_weaver_core::config::SystemPrompts;
use readme_weaver_core::contract::{Backend, BackendError, Role, Turn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

use crate::load_config::BackendSection;

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    default_model: String,
    /// System instruction → model.
    models: HashMap<String, String>,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_model: default_model.into(),
            models: HashMap::new(),
        }
    }

    /// Route calls made with `system_instruction` to `model`.
    pub fn with_model_for(
        mut self,
        system_instruction: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        self.models.insert(system_instruction.into(), model.into());
        self
    }

    /// Build a client for the three roles from config and the environment.
    pub fn new_from_env(
        backend: &BackendSection,
        prompts: &SystemPrompts,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();
        let api_key = match env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => key,
            Ok(_) | Err(_) => {
                tracing::error!(var = API_KEY_VAR, "API key missing in environment");
                return Err(format!("{API_KEY_VAR} is not set; add it to the environment or a .env file").into());
            }
        };
        tracing::info!(
            base_url = backend.base_url.as_str(),
            file_model = backend.file_model.as_str(),
            directory_model = backend.directory_model.as_str(),
            readme_model = backend.readme_model.as_str(),
            "Initialized GeminiClient from environment"
        );
        Ok(
            Self::new(api_key, backend.base_url.clone(), backend.readme_model.clone())
                .with_model_for(prompts.file.clone(), backend.file_model.clone())
                .with_model_for(prompts.directory.clone(), backend.directory_model.clone())
                .with_model_for(prompts.readme.clone(), backend.readme_model.clone()),
        )
    }

    pub fn model_for(&self, system_instruction: &str) -> &str {
        self.models
            .get(system_instruction)
            .map(String::as_str)
            .unwrap_or(self.default_model.as_str())
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl Backend for GeminiClient {
    async fn complete(
        &self,
        system_instruction: &str,
        turns: &[Turn],
    ) -> Result<String, BackendError> {
        let model = self.model_for(system_instruction);
        let request = build_request(system_instruction, turns);
        tracing::debug!(model, turns = turns.len(), "Sending generateContent request");

        let response = self
            .http
            .post(self.generate_url(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, model, "Network error calling Gemini");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            tracing::error!(model, %status, message = message.as_str(), "Gemini returned an error");
            return Err(message.into());
        }

        let body: GeminiResponse = response.json().await?;
        response_text(body).ok_or_else(|| {
            tracing::warn!(model, "Gemini response contained no text");
            "Gemini response contained no text".into()
        })
    }
}

fn build_request(system_instruction: &str, turns: &[Turn]) -> GeminiRequest {
    GeminiRequest {
        contents: turns
            .iter()
            .map(|turn| GeminiContent {
                role: match turn.role {
                    Role::User => "user".to_string(),
                    Role::Model => "model".to_string(),
                },
                parts: vec![GeminiPart {
                    text: turn.text.clone(),
                }],
            })
            .collect(),
        system_instruction: (!system_instruction.is_empty()).then(|| GeminiSystemInstruction {
            parts: vec![GeminiPart {
                text: system_instruction.to_string(),
            }],
        }),
    }
}

/// Concatenated text parts of the first candidate.
fn response_text(response: GeminiResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().map(|p| p.text).collect();
    (!text.is_empty()).then_some(text)
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<GeminiErrorResponse>(body) {
        Ok(parsed) => format!("Gemini API error ({status}): {}", parsed.error.message),
        Err(_) => format!("Gemini API error ({status}): {body}"),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
