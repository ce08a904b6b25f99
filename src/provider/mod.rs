//! Chat backends.
//!
//! A [`ChatBackend`] turns one line of user text into one response.  The
//! shell only ever sees the trait, so tests drive it with stubs while the
//! binary wires in one of the HTTP backends below via [`connect`].

use std::fmt;
use std::str::FromStr;

use reqwest::Response;
use serde::Deserialize;

use crate::error::{Error, Result};

mod anthropic;
mod ollama;
mod openai;

pub use anthropic::AnthropicBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

/// Maximum tokens requested per response where a backend requires a limit.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// The supported model providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Provider {
    /// xAI, through its OpenAI-compatible API.
    Xai,
    /// OpenAI chat completions.
    #[default]
    OpenAi,
    /// The Anthropic Messages API.
    Anthropic,
    /// A local Ollama server.
    Ollama,
}

impl Provider {
    /// Every supported provider, in the order they are listed to users.
    pub const ALL: [Provider; 4] = [
        Provider::Xai,
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Ollama,
    ];

    /// The identifier accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Xai => "xai",
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Ollama => "ollama",
        }
    }

    /// The model used when none is given.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Xai => "grok-beta",
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-sonnet-20241022",
            Provider::Ollama => "llama3.2",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    /// Identifiers are matched exactly; anything else is unsupported.
    fn from_str(s: &str) -> Result<Self> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::unsupported_provider(s))
    }
}

/// A configured chat backend.
///
/// Implementations are configured once at construction with a provider and
/// model and are immutable afterwards.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// The provider this backend talks to.
    fn provider(&self) -> Provider;

    /// The model requests are sent to.
    fn model(&self) -> &str;

    /// Sends one user message and returns the model's reply.
    async fn send(&self, text: &str) -> Result<String>;
}

#[async_trait::async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for Box<T> {
    fn provider(&self) -> Provider {
        (**self).provider()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    async fn send(&self, text: &str) -> Result<String> {
        (**self).send(text).await
    }
}

/// Builds the HTTP backend for `provider`, reading credentials and hosts from
/// the environment.
pub fn connect(provider: Provider, model: &str) -> Result<Box<dyn ChatBackend>> {
    let backend: Box<dyn ChatBackend> = match provider {
        Provider::Anthropic => Box::new(AnthropicBackend::from_env(model)?),
        Provider::OpenAi => Box::new(OpenAiBackend::openai_from_env(model)?),
        Provider::Xai => Box::new(OpenAiBackend::xai_from_env(model)?),
        Provider::Ollama => Box::new(OllamaBackend::from_env(model)?),
    };
    tracing::debug!(%provider, model, "chat backend configured");
    Ok(backend)
}

pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder().build().map_err(|e| {
        Error::http_client(
            format!("Failed to build HTTP client: {}", e),
            Some(Box::new(e)),
        )
    })
}

pub(crate) fn env_key(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|key| !key.trim().is_empty())
}

/// Maps a transport failure to an [`Error`].
pub(crate) fn request_error(e: reqwest::Error) -> Error {
    if e.is_connect() {
        Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
    } else {
        Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
    }
}

/// Converts a non-success response into an [`Error`].
///
/// Understands both the `{"error": {"type", "message"}}` bodies used by the
/// hosted APIs and the `{"error": "..."}` bodies used by Ollama.
pub(crate) async fn error_from_response(response: Response) -> Error {
    let status_code = response.status().as_u16();
    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.parse::<u64>().ok());

    #[derive(Deserialize)]
    struct ErrorResponse {
        error: Option<ErrorBody>,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorBody {
        Detail {
            #[serde(rename = "type")]
            error_type: Option<String>,
            message: Option<String>,
        },
        Message(String),
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            return Error::http_client(
                format!("Failed to read error response: {}", e),
                Some(Box::new(e)),
            );
        }
    };

    let (error_type, message) = match serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|r| r.error)
    {
        Some(ErrorBody::Detail {
            error_type,
            message,
        }) => (error_type, message.unwrap_or_else(|| body.clone())),
        Some(ErrorBody::Message(message)) => (None, message),
        None => (None, body.clone()),
    };

    match status_code {
        401 | 403 => Error::authentication(message),
        429 => Error::rate_limit(message, retry_after),
        _ => Error::api(status_code, error_type, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_provider_parses() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
    }

    #[test]
    fn unknown_providers_are_unsupported() {
        for name in ["gemini", "", "OpenAI", " openai", "anthropic "] {
            let err = name.parse::<Provider>().unwrap_err();
            assert!(err.is_unsupported_provider(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn default_provider_is_openai() {
        assert_eq!(Provider::default(), Provider::OpenAi);
        assert_eq!(Provider::default().default_model(), "gpt-4o-mini");
    }

    #[tokio::test]
    async fn error_bodies_are_decoded() {
        let mut server = mockito::Server::new_async().await;
        let detail = server
            .mock("GET", "/detail")
            .with_status(400)
            .with_body(r#"{"error":{"type":"invalid_request_error","message":"bad model"}}"#)
            .create_async()
            .await;
        let plain = server
            .mock("GET", "/plain")
            .with_status(404)
            .with_body(r#"{"error":"model 'nope' not found"}"#)
            .create_async()
            .await;
        let limited = server
            .mock("GET", "/limited")
            .with_status(429)
            .with_header("retry-after", "7")
            .with_body("slow down")
            .create_async()
            .await;

        let client = http_client().unwrap();
        let get = |path: &str| client.get(format!("{}{}", server.url(), path)).send();

        let err = error_from_response(get("/detail").await.unwrap()).await;
        assert_eq!(
            err.to_string(),
            "invalid_request_error: bad model (status 400)"
        );

        let err = error_from_response(get("/plain").await.unwrap()).await;
        assert_eq!(err.status_code(), Some(404));
        assert!(err.to_string().contains("model 'nope' not found"));

        let err = error_from_response(get("/limited").await.unwrap()).await;
        assert!(matches!(
            err,
            Error::RateLimit {
                retry_after: Some(7),
                ..
            }
        ));

        detail.assert_async().await;
        plain.assert_async().await;
        limited.assert_async().await;
    }
}
