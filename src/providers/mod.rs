//! Embedding and Generation Capabilities
//!
//! The RAG core consumes two capability interfaces: an [`Embedder`] mapping
//! text to a fixed-dimension vector and a [`Generator`] producing an answer
//! from a composed prompt. Concrete providers (standard OpenAI or an
//! Azure-hosted endpoint) are selected once at configuration time; nothing
//! past construction branches on provider identity.

pub mod azure;
pub mod hashing;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{ProviderKind, ProviderSettings};

pub use azure::AzureProvider;
pub use hashing::HashEmbedder;
pub use openai::OpenAiProvider;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Embedding request failed: {0}")]
    EmbeddingFailed(String),
    #[error("Generation request failed: {0}")]
    GenerationFailed(String),
    #[error("Provider configuration error: {0}")]
    Configuration(String),
}

/// Maps text to a fixed-dimension vector. The dimension is fixed for the
/// lifetime of one index; ingestion and query paths must share the same
/// embedder for distances to be comparable.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// Produces a natural-language answer from a composed prompt. Stateless per
/// call.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Build the embedder and generator pair from provider settings.
///
/// Both capabilities are backed by the same provider instance so ingestion
/// and query embeddings always agree on dimension.
pub fn from_settings(
    settings: &ProviderSettings,
) -> Result<(Arc<dyn Embedder>, Arc<dyn Generator>), ProviderError> {
    match settings.kind() {
        ProviderKind::OpenAi => {
            let provider = Arc::new(OpenAiProvider::new(
                settings.api_key.clone(),
                settings.api_base.clone(),
                settings.chat_deployment.clone(),
                settings.embedding_deployment.clone(),
            ));
            Ok((provider.clone(), provider))
        }
        ProviderKind::Azure => {
            let endpoint = settings.api_base.clone().ok_or_else(|| {
                ProviderError::Configuration("Azure provider requires an API base URL".to_string())
            })?;
            let api_version = settings.api_version.clone().ok_or_else(|| {
                ProviderError::Configuration(
                    "Azure provider requires OPENAI_API_VERSION".to_string(),
                )
            })?;
            let provider = Arc::new(AzureProvider::new(
                endpoint,
                settings.api_key.clone(),
                api_version,
                settings.chat_deployment.clone(),
                settings.embedding_deployment.clone(),
            ));
            Ok((provider.clone(), provider))
        }
    }
}
