use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{ChatBackend, DEFAULT_MAX_TOKENS, Provider};
use crate::error::{Error, Result};

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";
const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

#[derive(Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Backend for the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicBackend {
    api_key: Option<String>,
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl AnthropicBackend {
    /// Creates a backend for `model` with an explicit API key.
    ///
    /// A missing key is reported when the first message is sent.
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            api_key,
            client: super::http_client()?,
            base_url: DEFAULT_API_URL.to_string(),
            model: model.into(),
        })
    }

    /// Creates a backend whose API key comes from `ANTHROPIC_API_KEY`.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        Self::new(model, super::env_key(API_KEY_VAR))
    }

    /// Points the backend at a different API root.  The URL must end in `/`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::authentication(format!(
                "API key not provided and {API_KEY_VAR} environment variable not set"
            ))
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|_| Error::authentication("API key contains invalid characters"))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_API_VERSION),
        );
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl ChatBackend for AnthropicBackend {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, text: &str) -> Result<String> {
        let headers = self.headers()?;
        let request = MessageRequest {
            model: &self.model,
            max_tokens: DEFAULT_MAX_TOKENS,
            messages: [UserMessage {
                role: "user",
                content: text,
            }],
        };

        let response = self
            .client
            .post(format!("{}messages", self.base_url))
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(super::request_error)?;

        if !response.status().is_success() {
            return Err(super::error_from_response(response).await);
        }

        let message = response.json::<MessageResponse>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(message
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_joins_text_blocks() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/messages")
            .match_header("x-api-key", "sk-test")
            .match_header("anthropic-version", ANTHROPIC_API_VERSION)
            .match_body(mockito::Matcher::JsonString(
                r#"{"model":"claude-test","max_tokens":4096,
                    "messages":[{"role":"user","content":"hello"}]}"#
                    .to_string(),
            ))
            .with_status(200)
            .with_body(
                r#"{"id":"msg_1","content":[
                    {"type":"text","text":"Hi "},
                    {"type":"tool_use","id":"t","name":"n","input":{}},
                    {"type":"text","text":"there"}]}"#,
            )
            .create_async()
            .await;

        let backend = AnthropicBackend::new("claude-test", Some("sk-test".to_string()))
            .unwrap()
            .with_base_url(format!("{}/", server.url()));
        assert_eq!(backend.send("hello").await.unwrap(), "Hi there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_key_fails_at_send() {
        let backend = AnthropicBackend::new("claude-test", None).unwrap();
        assert_eq!(backend.provider(), Provider::Anthropic);
        let err = backend.send("hello").await.unwrap_err();
        assert!(err.is_authentication());
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn api_errors_are_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/messages")
            .with_status(401)
            .with_body(r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#)
            .create_async()
            .await;

        let backend = AnthropicBackend::new("claude-test", Some("bad".to_string()))
            .unwrap()
            .with_base_url(format!("{}/", server.url()));
        let err = backend.send("hello").await.unwrap_err();
        assert!(err.is_authentication());
        assert!(err.to_string().contains("invalid x-api-key"));
    }
}
