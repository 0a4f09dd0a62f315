//! Chat backend abstraction and the OpenAI-compatible implementation.
//!
//! The orchestrator treats text generation as an opaque blocking call:
//! a (system prompt, user prompt) pair goes in, text comes out.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;

use crate::error::MeetingError;

/// Opaque text-generation collaborator.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Generate a completion for one (system, user) prompt pair.
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String, MeetingError>;
}

/// Connection settings for an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// API base URL.
    pub api_base: String,
    /// API key for authentication.
    pub api_key: String,
}

impl BackendConfig {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
        }
    }
}

/// OpenAI-compatible chat backend with retry and response sanitization.
pub struct OpenAiBackend {
    config: BackendConfig,
}

impl OpenAiBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String, MeetingError> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                MeetingError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        let config = OpenAIConfig::new()
            .with_api_key(&self.config.api_key)
            .with_api_base(&self.config.api_base);

        let client = Client::with_config(config).with_http_client(http_client);

        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: system_prompt.to_string().into(),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: user_prompt.to_string().into(),
                name: None,
            }),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .max_completion_tokens(max_tokens)
            .messages(messages)
            .build()?;

        // Exponential backoff: 1s, 2s, 4s. Empty responses are retried the
        // same way as transport failures.
        let max_retries = 3;
        let mut last_error = None;

        for attempt in 0..max_retries {
            if attempt > 0 {
                let delay = std::time::Duration::from_secs(1 << attempt);
                tokio::time::sleep(delay).await;
            }

            match client.chat().create(request.clone()).await {
                Ok(response) => {
                    let content = response
                        .choices
                        .first()
                        .and_then(|c| c.message.content.clone())
                        .unwrap_or_default();

                    let sanitized = sanitize_response(&content);
                    if sanitized.trim().len() > 10 {
                        return Ok(sanitized);
                    }
                }
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.map(MeetingError::from).unwrap_or_else(|| {
            MeetingError::Configuration(format!(
                "Model returned an empty response after {max_retries} attempts"
            ))
        }))
    }
}

/// Strip reasoning tags, markdown emphasis, and stray whitespace from a
/// model response so it reads (and speaks) like a plain statement.
pub fn sanitize_response(response: &str) -> String {
    let tags_to_strip = [
        "thinking",
        "think",
        "reflection",
        "reasoning",
        "internal",
        "analysis",
        "scratchpad",
        "plan",
    ];

    let mut result = response.to_string();

    for tag in &tags_to_strip {
        let pattern = format!(r"(?is)<{tag}[^>]*>.*?</{tag}>");
        if let Ok(re) = regex::Regex::new(&pattern) {
            result = re.replace_all(&result, "").to_string();
        }
    }

    // Orphaned opening/closing tags left behind after stripping
    if let Ok(orphan_re) = regex::Regex::new(r"</?[\w]+[^>]*>") {
        result = orphan_re.replace_all(&result, "").to_string();
    }

    result = result.replace('*', "");

    if let Ok(ws_re) = regex::Regex::new(r"\s+") {
        result = ws_re.replace_all(&result, " ").to_string();
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_thinking_tags() {
        let input = "<thinking>Let me weigh the tradeoffs...</thinking>We should partner.";
        assert_eq!(sanitize_response(input), "We should partner.");
    }

    #[test]
    fn sanitize_strips_multiline_tags() {
        let input = "<reflection>\nseveral\nlines\n</reflection>The budget holds.";
        assert_eq!(sanitize_response(input), "The budget holds.");
    }

    #[test]
    fn sanitize_leaves_plain_text_alone() {
        let input = "No tags here, just a position statement.";
        assert_eq!(sanitize_response(input), input);
    }

    #[test]
    fn sanitize_removes_orphan_tags_and_emphasis() {
        let input = "Start <inner>nested</inner> and *emphasis* end";
        let output = sanitize_response(input);
        assert!(!output.contains('<'));
        assert!(!output.contains('*'));
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        let input = "Too   much\n\n\nspace.";
        assert_eq!(sanitize_response(input), "Too much space.");
    }
}
