//! Text-generation providers behind a single seam.
//!
//! The agent talks to a [`TextGenerator`], never to a concrete backend. The
//! real implementation is a thin pass-through to an OpenAI-compatible chat
//! completions endpoint; the mock implementation returns a canned reply in
//! the same five-field layout the review prompt asks for.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default timeout for provider requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("provider reply carried no content")]
    EmptyReply,
}

/// A text-completion backend: one prompt in, raw freeform text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Pass-through client for OpenAI-compatible chat completions endpoints.
pub struct HttpTextGenerator {
    endpoint: String,
    model: String,
    api_key: String,
    http: reqwest::Client,
}

impl HttpTextGenerator {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            http,
        })
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let payload = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status()));
        }

        let reply: ChatResponse = response.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyReply)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

/// Generator that returns a fixed reply without any network traffic.
#[derive(Debug, Clone)]
pub struct MockTextGenerator {
    reply: String,
}

impl MockTextGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        Ok(self.reply.clone())
    }
}

/// The canned review the mock provider serves, in the exact layout the
/// review prompt requests.
pub fn canned_review(source_title: &str) -> String {
    format!(
        "Suggested Title: 改进: {source_title}\n\
         Readability Score: 85\n\
         Sentiment: positive\n\
         Content Improvement Suggestions:\n\
         - 考虑添加更多实际案例\n\
         - 建议增加图表说明\n\
         - 可以补充相关参考资料\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_generator_returns_its_reply() {
        let generator = MockTextGenerator::new("fixed reply");
        let reply = generator.generate("whatever prompt").await.unwrap();
        assert_eq!(reply, "fixed reply");
    }

    #[test]
    fn canned_review_carries_all_five_fields() {
        let reply = canned_review("旧标题");
        assert!(reply.contains("Suggested Title: 改进: 旧标题"));
        assert!(reply.contains("Readability Score: 85"));
        assert!(reply.contains("Sentiment: positive"));
        assert!(reply.contains("Content Improvement Suggestions:"));
        assert!(reply.lines().filter(|l| l.trim_start().starts_with('-')).count() == 3);
    }

    #[test]
    fn chat_response_deserializes_the_reply_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Suggested Title: X"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Suggested Title: X");
    }
}
