//! LLM Client — the single point of entry for all Claude API calls in JobTalk.
//!
//! ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
//! Roadmap generation, node enrichment and mentor chat all go through `LlmBackend`.
//!
//! Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls in JobTalk.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 8192;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Prompt has no user or assistant segments")]
    EmptyPrompt,
}

/// Speaker of a prompt segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged piece of a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSegment {
    pub role: Role,
    pub content: String,
}

impl PromptSegment {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Text-completion seam. `AppState` carries an `Arc<dyn LlmBackend>` so the
/// pipelines can be driven by a scripted backend in tests.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Sends the segments as one conversation and returns the raw text reply.
    async fn complete(&self, segments: &[PromptSegment]) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    system: String,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Splits role-tagged segments into the Messages API shape: system segments are
/// joined into the top-level `system` field, the rest become `messages` in order.
fn to_request(segments: &[PromptSegment]) -> Result<AnthropicRequest<'_>, LlmError> {
    let system = segments
        .iter()
        .filter(|s| s.role == Role::System)
        .map(|s| s.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let messages: Vec<AnthropicMessage<'_>> = segments
        .iter()
        .filter_map(|s| match s.role {
            Role::System => None,
            Role::User => Some(AnthropicMessage {
                role: "user",
                content: &s.content,
            }),
            Role::Assistant => Some(AnthropicMessage {
                role: "assistant",
                content: &s.content,
            }),
        })
        .collect();

    if messages.is_empty() {
        return Err(LlmError::EmptyPrompt);
    }

    Ok(AnthropicRequest {
        model: MODEL,
        max_tokens: MAX_TOKENS,
        system,
        messages,
    })
}

/// The single LLM client used by all services in JobTalk.
/// Wraps the Anthropic Messages API with transport-level retry.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
        })
    }

    /// Makes a raw call to the Claude API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, segments: &[PromptSegment]) -> Result<LlmResponse, LlmError> {
        let request_body = to_request(segments)?;

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = retry_delay(attempt);
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl LlmBackend for LlmClient {
    async fn complete(&self, segments: &[PromptSegment]) -> Result<String, LlmError> {
        let response = self.call(segments).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Backoff before retry `attempt` (1-based): 1s, 2s, 4s, ...
/// With `MAX_RETRIES` attempts only the first `MAX_RETRIES - 1` delays are used.
fn retry_delay(attempt: u32) -> std::time::Duration {
    std::time::Duration::from_millis(1000 * (1 << (attempt - 1)))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n[{\"id\": 1}]\n```";
        assert_eq!(strip_json_fences(input), "[{\"id\": 1}]");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n[{\"id\": 1}]\n```";
        assert_eq!(strip_json_fences(input), "[{\"id\": 1}]");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "  INVALID_ROADMAP \n";
        assert_eq!(strip_json_fences(input), "INVALID_ROADMAP");
    }

    #[test]
    fn test_to_request_splits_system_from_messages() {
        let segments = vec![
            PromptSegment::system("You are a mentor."),
            PromptSegment::system("Answer in Korean."),
            PromptSegment::user("hi"),
            PromptSegment {
                role: Role::Assistant,
                content: "hello".to_string(),
            },
            PromptSegment::user("what next?"),
        ];
        let request = to_request(&segments).unwrap();
        assert_eq!(request.system, "You are a mentor.\n\nAnswer in Korean.");
        let roles: Vec<&str> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["user", "assistant", "user"]);
        assert_eq!(request.messages[2].content, "what next?");
    }

    #[test]
    fn test_to_request_rejects_system_only_prompt() {
        let segments = vec![PromptSegment::system("only rules")];
        assert!(matches!(to_request(&segments), Err(LlmError::EmptyPrompt)));
    }

    #[test]
    fn test_request_omits_empty_system() {
        let segments = vec![PromptSegment::user("hi")];
        let json = serde_json::to_value(to_request(&segments).unwrap()).unwrap();
        assert!(json.get("system").is_none());
        assert_eq!(json["model"], MODEL);
    }

    #[test]
    fn test_retry_delays_double_and_stop_at_budget() {
        let delays: Vec<u64> = (1..MAX_RETRIES)
            .map(|attempt| retry_delay(attempt).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000]);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
