//! OpenAI-compatible chat-completions client

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ChatClient, ChatRequest};
use crate::error::ComparisonError;

/// Client for `{base_url}/chat/completions`.
///
/// One attempt per call: no retry, no backoff and no client-side timeout.
pub struct OpenAiClient {
    http: reqwest::Client,
    chat_url: String,
    api_key: SecretString,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: SecretString) -> Self {
        Self {
            http,
            chat_url: chat_url(base_url),
            api_key,
        }
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }
}

fn chat_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

// Leaving out id, created, usage and everything else the comparison ignores
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, ComparisonError> {
        let body = ChatCompletionRequest {
            model: request.model,
            messages: [ChatMessage {
                role: "user",
                content: request.prompt,
            }],
            max_tokens: request.max_tokens,
        };

        debug!(
            "POST {} model={} max_tokens={} prompt_chars={}",
            self.chat_url,
            request.model,
            request.max_tokens,
            request.prompt.chars().count()
        );

        let res = self
            .http
            .post(&self.chat_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let raw_response = res.text().await?;

        if !status.is_success() {
            warn!("Chat completion failed with status {}", status);
            return Err(handle_error_response(status, &raw_response));
        }

        let response: ChatCompletionResponse =
            serde_json::from_str(&raw_response).map_err(|e| {
                ComparisonError::RemoteCall(format!("Error parsing JSON response: {}", e))
            })?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            ComparisonError::RemoteCall("Chat completion returned no choices".into())
        })?;

        choice.message.content.ok_or_else(|| {
            ComparisonError::RemoteCall("Chat completion returned no message content".into())
        })
    }
}

/// Turn a non-success response into a remote-call error, preferring the
/// provider's own `error.message`.
fn handle_error_response(status: reqwest::StatusCode, raw_response: &str) -> ComparisonError {
    let detail = serde_json::from_str::<ErrorEnvelope>(raw_response)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| raw_response.trim().to_string());

    ComparisonError::RemoteCall(format!("Error code: {} - {}", status.as_u16(), detail))
}
