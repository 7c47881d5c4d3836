//! Azure OpenAI Provider
//!
//! Enterprise-hosted variant of the OpenAI API. Requests go to
//! deployment-scoped URLs with an `api-version` query parameter and an
//! `api-key` header; response bodies match the standard wire format.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error};

use super::openai::{build_http_client, ChatCompletionResponse, EmbeddingResponse};
use super::{Embedder, Generator, ProviderError};

/// Azure-hosted embedding and chat completion client.
#[derive(Clone)]
pub struct AzureProvider {
    http: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    chat_deployment: String,
    embedding_deployment: String,
}

impl AzureProvider {
    pub fn new(
        endpoint: String,
        api_key: String,
        api_version: String,
        chat_deployment: String,
        embedding_deployment: String,
    ) -> Self {
        Self {
            http: build_http_client(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            api_version,
            chat_deployment,
            embedding_deployment,
        }
    }

    fn deployment_url(&self, deployment: &str, operation: &str) -> String {
        format!(
            "{}/openai/deployments/{}/{}?api-version={}",
            self.endpoint, deployment, operation, self.api_version
        )
    }
}

#[async_trait]
impl Embedder for AzureProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let body = json!({ "input": text });

        debug!(deployment = %self.embedding_deployment, chars = text.len(), "Embedding request");
        let resp = self
            .http
            .post(self.deployment_url(&self.embedding_deployment, "embeddings"))
            .header("api-key", &self.api_key)
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
impl Generator for AzureProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "temperature": 0,
            "messages": [{ "role": "user", "content": prompt }],
        });

        debug!(deployment = %self.chat_deployment, chars = prompt.len(), "Generation request");
        let resp = self
            .http
            .post(self.deployment_url(&self.chat_deployment, "chat/completions"))
            .header("api-key", &self.api_key)
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
