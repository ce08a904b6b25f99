use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{ChatBackend, Provider};
use crate::error::{Error, Result};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/";
const XAI_API_URL: &str = "https://api.x.ai/v1/";
const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
const XAI_KEY_VAR: &str = "XAI_API_KEY";

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Backend for OpenAI-compatible chat completion APIs.
///
/// Serves both `openai` and `xai`, which differ only in their API root and
/// the environment variable holding the key.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    provider: Provider,
    key_var: &'static str,
    api_key: Option<String>,
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiBackend {
    fn build(
        provider: Provider,
        key_var: &'static str,
        base_url: &str,
        model: String,
        api_key: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            provider,
            key_var,
            api_key,
            client: super::http_client()?,
            base_url: base_url.to_string(),
            model,
        })
    }

    /// Creates an OpenAI backend with an explicit API key.
    pub fn openai(model: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        Self::build(
            Provider::OpenAi,
            OPENAI_KEY_VAR,
            OPENAI_API_URL,
            model.into(),
            api_key,
        )
    }

    /// Creates an xAI backend with an explicit API key.
    pub fn xai(model: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        Self::build(Provider::Xai, XAI_KEY_VAR, XAI_API_URL, model.into(), api_key)
    }

    /// Creates an OpenAI backend keyed from `OPENAI_API_KEY`.
    pub fn openai_from_env(model: impl Into<String>) -> Result<Self> {
        Self::openai(model, super::env_key(OPENAI_KEY_VAR))
    }

    /// Creates an xAI backend keyed from `XAI_API_KEY`.
    pub fn xai_from_env(model: impl Into<String>) -> Result<Self> {
        Self::xai(model, super::env_key(XAI_KEY_VAR))
    }

    /// Points the backend at a different API root.  The URL must end in `/`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::authentication(format!(
                "API key not provided and {} environment variable not set",
                self.key_var
            ))
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| Error::authentication("API key contains invalid characters"))?,
        );
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl ChatBackend for OpenAiBackend {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, text: &str) -> Result<String> {
        let headers = self.headers()?;
        let request = CompletionRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: text,
            }],
        };

        let response = self
            .client
            .post(format!("{}chat/completions", self.base_url))
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(super::request_error)?;

        if !response.status().is_success() {
            return Err(super::error_from_response(response).await);
        }

        let completion = response.json::<CompletionResponse>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| Error::serialization("Response contained no choices", None))
    }
}
