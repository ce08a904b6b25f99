use serde::{Deserialize, Serialize};

use super::{ChatBackend, Provider};
use crate::error::{Error, Result};

const DEFAULT_HOST: &str = "http://localhost:11434";
const HOST_VAR: &str = "OLLAMA_HOST";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

/// Backend for a local Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: reqwest::Client,
    host: String,
    model: String,
}

impl OllamaBackend {
    /// Creates a backend talking to the Ollama server at `host`.
    pub fn new(model: impl Into<String>, host: impl Into<String>) -> Result<Self> {
        let host = host.into();
        Ok(Self {
            client: super::http_client()?,
            host: host.trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Creates a backend for `OLLAMA_HOST`, or the default local server.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let host = super::env_key(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_string());
        Self::new(model, host)
    }

    /// The server this backend talks to.
    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait::async_trait]
impl ChatBackend for OllamaBackend {
    fn provider(&self) -> Provider {
        Provider::Ollama
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, text: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: text,
            }],
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.host))
            .json(&request)
            .send()
            .await
            .map_err(super::request_error)?;

        if !response.status().is_success() {
            return Err(super::error_from_response(response).await);
        }

        let reply = response.json::<ChatResponse>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })?;
        Ok(reply.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_disables_streaming() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(mockito::Matcher::JsonString(
                r#"{"model":"llama-test","stream":false,
                    "messages":[{"role":"user","content":"hello"}]}"#
                    .to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"model":"llama-test","message":{"role":"assistant","content":"hey"},"done":true}"#)
            .create_async()
            .await;

        let backend = OllamaBackend::new("llama-test", format!("{}/", server.url())).unwrap();
        assert_eq!(backend.host(), server.url());
        assert_eq!(backend.send("hello").await.unwrap(), "hey");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unknown_model_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(404)
            .with_body(r#"{"error":"model \"llama-test\" not found, try pulling it first"}"#)
            .create_async()
            .await;

        let backend = OllamaBackend::new("llama-test", server.url()).unwrap();
        let err = backend.send("hello").await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert!(err.to_string().contains("try pulling it first"));
    }
}
