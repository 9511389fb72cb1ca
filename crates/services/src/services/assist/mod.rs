//! Text-generation assist: turns a free-form prompt into board, column and
//! task suggestions.
//!
//! A [`TextGenerator`] produces the raw reply. [`AssistService`] templates
//! the prompt, then interprets the reply as JSON, falling back to line
//! heuristics and finally to canned suggestions. Upstream rate limiting
//! degrades to canned output instead of failing.

use std::sync::Arc;

use async_trait::async_trait;
use db::validation::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use ts_rs::TS;

use super::config::AssistConfig;

pub mod client;
pub mod fallback;
pub mod parse;
pub mod prompt;

pub use client::OpenAiClient;

/// Longest prompt accepted from a client, in characters.
pub const MAX_PROMPT_LENGTH: usize = 4000;

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("AI assistant is not configured")]
    NotConfigured,
    #[error("AI service rate limit exceeded")]
    RateLimited,
    #[error("AI service rejected the API key")]
    Unauthorized,
    #[error("AI service denied access")]
    Forbidden,
    #[error("AI service error ({status}): {message}")]
    Upstream { status: u16, message: String },
    #[error("AI service returned an empty reply")]
    EmptyReply,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl AssistError {
    /// Classify a non-success upstream status.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            429 => AssistError::RateLimited,
            401 => AssistError::Unauthorized,
            403 => AssistError::Forbidden,
            _ => AssistError::Upstream {
                status,
                message: body.chars().take(200).collect(),
            },
        }
    }
}

/// Produces a completion for a system instruction and a user message.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AssistError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum GenerateKind {
    BoardName,
    BoardWithTasks,
    Tasks,
    Text,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct GenerateRequest {
    #[serde(rename = "type")]
    pub kind: GenerateKind,
    #[serde(default)]
    pub prompt: String,
    /// Caller-supplied JSON (e.g. the current board) passed through to the
    /// model.
    #[serde(default)]
    #[ts(type = "unknown")]
    pub context: Option<Value>,
}

impl GenerateRequest {
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(ValidationErrors::single("prompt", "Prompt is required"));
        }
        if prompt.chars().count() > MAX_PROMPT_LENGTH {
            return Err(ValidationErrors::single(
                "prompt",
                format!("Prompt must be at most {MAX_PROMPT_LENGTH} characters"),
            ));
        }
        Ok(Self { prompt, ..self })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct BoardSuggestion {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct TaskSuggestion {
    pub title: String,
    pub description: String,
    pub story_points: Option<i64>,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suggestion {
    Board {
        name: String,
        description: String,
    },
    BoardWithTasks {
        board: BoardSuggestion,
        columns: Vec<String>,
        tasks: Vec<TaskSuggestion>,
    },
    TaskList {
        tasks: Vec<TaskSuggestion>,
    },
    PlainText {
        text: String,
    },
}

/// Where a suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    /// Structured reply from the model.
    Model,
    /// Model reply that only parsed line by line.
    Heuristic,
    /// Built-in suggestion picked by prompt keywords.
    Canned,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct GenerateResponse {
    pub source: SuggestionSource,
    pub suggestion: Suggestion,
}

#[derive(Clone)]
pub struct AssistService {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl AssistService {
    /// Build from configuration; without an API key the service stays
    /// unconfigured and every call fails with [`AssistError::NotConfigured`].
    pub fn new(config: &AssistConfig) -> Result<Self, AssistError> {
        match &config.api_key {
            Some(api_key) => {
                let client = OpenAiClient::new(config, api_key.clone())?;
                Ok(Self::with_generator(Arc::new(client)))
            }
            None => {
                debug!("No AI API key configured, assist disabled");
                Ok(Self::disabled())
            }
        }
    }

    pub fn with_generator(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    pub fn disabled() -> Self {
        Self { generator: None }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, AssistError> {
        let generator = self.generator.as_ref().ok_or(AssistError::NotConfigured)?;

        let system = prompt::system_instruction(request.kind);
        let user = prompt::user_message(&request.prompt, request.context.as_ref());

        match generator.complete(system, &user).await {
            Ok(reply) => Ok(parse::interpret(request.kind, &reply, &request.prompt)),
            Err(AssistError::RateLimited) => {
                warn!(kind = ?request.kind, "AI service rate limited, returning canned suggestion");
                Ok(GenerateResponse {
                    source: SuggestionSource::Canned,
                    suggestion: fallback::canned(request.kind, &request.prompt),
                })
            }
            Err(e) => Err(e),
        }
    }
}
