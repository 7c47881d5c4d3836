//! Feature-Hash Embedder
//!
//! Deterministic offline embedder using the hashing trick: each token is
//! hashed to a fixed bucket and the resulting term-frequency vector is
//! L2-normalized, so no vocabulary map is needed. The same text always
//! produces the same vector regardless of what other documents exist.
//!
//! Used by the test suite in place of network-backed embedders.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use super::{Embedder, ProviderError};

/// Default dimensionality of the hashed vectors.
pub const DEFAULT_DIM: usize = 256;

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dim: DEFAULT_DIM }
    }
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn hash_token(&self, token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dim
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        let mut tf = vec![0.0f32; self.dim];
        for token in &tokens {
            tf[self.hash_token(token)] += 1.0;
        }

        let norm: f32 = tf.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut tf {
                *x /= norm;
            }
        }

        tf
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        Ok(self.embed_sync(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_dimension() {
        let embedder = HashEmbedder::default();
        let embedding = embedder.embed("Hello world this is a test").await.unwrap();
        assert_eq!(embedding.len(), DEFAULT_DIM);
    }

    #[tokio::test]
    async fn test_embedding_stability() {
        let embedder = HashEmbedder::default();
        let first = embedder.embed("The quick brown fox").await.unwrap();

        // Unrelated texts in between must not affect the result
        let _ = embedder.embed("completely different words zebra giraffe").await.unwrap();
        let second = embedder.embed("The quick brown fox").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_normalized() {
        let embedder = HashEmbedder::default();
        let embedding = embedder.embed("refund policy for orders").await.unwrap();
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::default();
        let embedding = embedder.embed("   ").await.unwrap();
        assert!(embedding.iter().all(|x| *x == 0.0));
    }
}
