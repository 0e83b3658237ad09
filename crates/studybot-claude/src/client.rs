//! Anthropic messages API client.
//!
//! This module provides a client for the Anthropic messages API, carrying
//! the rolling conversation history plus a system instruction string and
//! returning the generated text.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use studybot_context::ConversationTurn;

/// Environment variable for the Anthropic API key.
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Environment variable overriding the model id.
pub const CLAUDE_MODEL_ENV: &str = "CLAUDE_MODEL";

/// Anthropic messages endpoint.
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default model id.
pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";

/// Maximum tokens to generate per reply.
const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Timeout for model calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur calling the model.
#[derive(Debug, Error)]
pub enum ClaudeError {
    /// API key not provided.
    #[error("Anthropic API key not set. Set ANTHROPIC_API_KEY environment variable.")]
    MissingKey,

    /// The request timed out.
    #[error("model request timed out")]
    Timeout,

    /// The request failed (connection, non-success status).
    #[error("model request failed: {0}")]
    RequestFailed(String),

    /// The response body was missing expected fields.
    #[error("failed to parse model response: {0}")]
    ParseError(String),
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ClaudeError>;

/// Anthropic messages API client.
#[derive(Clone)]
pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    /// Create a new client with the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create a client from environment variables.
    ///
    /// Uses `ANTHROPIC_API_KEY`, and `CLAUDE_MODEL` to override the model.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(ANTHROPIC_API_KEY_ENV).map_err(|_| ClaudeError::MissingKey)?;
        let model =
            std::env::var(CLAUDE_MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        })
    }

    /// The model id this client sends.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a message with its conversation history and system instructions.
    ///
    /// Returns the model's generated text on success.
    pub async fn send(
        &self,
        message: &str,
        history: &[ConversationTurn],
        system: &str,
    ) -> Result<String> {
        let mut messages: Vec<ApiMessage> = history.iter().map(ApiMessage::from_turn).collect();
        messages.push(ApiMessage {
            role: "user".to_string(),
            content: message.to_string(),
        });

        let request = MessagesRequest {
            model: self.model.clone(),
            messages,
            system: system.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        };

        trace!("Sending model request: {:?}", request);

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClaudeError::Timeout
                } else {
                    ClaudeError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClaudeError::RequestFailed(format!(
                "Anthropic API error {}: {}",
                status, text
            )));
        }

        let response: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ClaudeError::ParseError(e.to_string()))?;

        let text = response
            .text()
            .ok_or_else(|| ClaudeError::ParseError("no text content in response".to_string()))?
            .to_string();

        debug!(chars = text.len(), "Model response received");
        Ok(text)
    }
}

/// A message in the API request.
#[derive(Debug, Clone, Serialize)]
struct ApiMessage {
    /// Role of the message sender ("user" or "assistant").
    role: String,

    /// Text content of the message.
    content: String,
}

impl ApiMessage {
    fn from_turn(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }
    }
}

/// Messages API request body.
#[derive(Debug, Clone, Serialize)]
struct MessagesRequest {
    /// Model identifier.
    model: String,

    /// Conversation messages, oldest first.
    messages: Vec<ApiMessage>,

    /// System-level instruction string.
    system: String,

    /// Maximum tokens to generate.
    max_tokens: u32,
}

/// Messages API response body.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    /// Generated content blocks.
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl MessagesResponse {
    /// The first text block's content, if any.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .map(|b| b.text.as_str())
    }
}

/// A content block in the response.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    /// Block type (always "text" for plain completions).
    #[serde(rename = "type")]
    pub block_type: String,

    /// Generated text.
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use studybot_context::ConversationTurn;

    #[test]
    fn test_request_serialization() {
        let history = vec![
            ConversationTurn::user("What is DevSecOps?"),
            ConversationTurn::assistant("A practice merging security into DevOps."),
        ];
        let mut messages: Vec<ApiMessage> = history.iter().map(ApiMessage::from_turn).collect();
        messages.push(ApiMessage {
            role: "user".to_string(),
            content: "Tell me more".to_string(),
        });

        let request = MessagesRequest {
            model: DEFAULT_MODEL.to_string(),
            messages,
            system: "You are helpful.".to_string(),
            max_tokens: 1000,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("claude-3-opus"));
        assert!(json.contains(r#""role":"assistant""#));
        assert!(json.contains("Tell me more"));
        assert!(json.contains(r#""max_tokens":1000"#));
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "id": "msg-123",
            "content": [{"type": "text", "text": "Here is an answer."}],
            "model": "claude-3-opus-20240229",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;

        let response: MessagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), Some("Here is an answer."));
    }

    #[test]
    fn test_response_without_text_block() {
        let response: MessagesResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert_eq!(response.text(), None);
    }

    #[test]
    fn test_from_env_missing_key() {
        if std::env::var(ANTHROPIC_API_KEY_ENV).is_err() {
            assert!(matches!(
                ClaudeClient::from_env(),
                Err(ClaudeError::MissingKey)
            ));
        }
    }
}
