//! Standard OpenAI Provider
//!
//! Direct HTTP client for the OpenAI REST API. Uses reqwest instead of
//! third-party wrapper crates for stability and full API control.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use super::{Embedder, Generator, ProviderError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Wire shape of an embeddings response. Shared with the Azure provider,
/// which serves the same format under deployment-scoped URLs.
#[derive(Debug, Deserialize)]
pub(super) struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct EmbeddingData {
    pub embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatMessage {
    pub content: String,
}

pub(super) fn build_http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// OpenAI-hosted embedding and chat completion client.
#[derive(Clone)]
pub struct OpenAiProvider {
    http: Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    embedding_model: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        chat_model: String,
        embedding_model: String,
    ) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            http: build_http_client(),
            base_url,
            api_key,
            chat_model,
            embedding_model,
        }
    }
}

#[async_trait]
impl Embedder for OpenAiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let body = json!({
            "model": self.embedding_model,
            "input": text,
        });

        debug!(model = %self.embedding_model, chars = text.len(), "Embedding request");
        let resp = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::EmbeddingFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "Embedding HTTP error");
            return Err(ProviderError::EmbeddingFailed(format!("{}: {}", status, text)));
        }

        let parsed: EmbeddingResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::EmbeddingFailed(e.to_string()))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::EmbeddingFailed("empty embedding response".to_string()))
    }
}

#[async_trait]
impl Generator for OpenAiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.chat_model,
            "temperature": 0,
            "messages": [{ "role": "user", "content": prompt }],
        });

        debug!(model = %self.chat_model, chars = prompt.len(), "Generation request");
        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::GenerationFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "Generation HTTP error");
            return Err(ProviderError::GenerationFailed(format!("{}: {}", status, text)));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::GenerationFailed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::GenerationFailed("empty completion response".to_string()))
    }
}
