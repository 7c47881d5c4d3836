//! Vector Index
//!
//! Append-only nearest-neighbor store over (embedding, passage) entries with
//! metadata-level tenant filtering and synchronous whole-index persistence.
//! Search is brute-force cosine similarity, which is plenty for per-tenant
//! manual collections.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::documents::chunker::Passage;
use crate::providers::{Embedder, ProviderError};

/// Filename of the serialized index inside the data directory.
const INDEX_FILE: &str = "index.json";

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// A stored passage with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub passage: Passage,
    pub embedding: Vec<f32>,
}

/// On-disk shape of the whole index.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedIndex {
    dimension: Option<usize>,
    entries: Vec<IndexEntry>,
}

pub struct VectorIndex {
    embedder: Arc<dyn Embedder>,
    entries: Vec<IndexEntry>,
    /// Fixed by the first embedding added; all later entries must match.
    dimension: Option<usize>,
}

impl VectorIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
            dimension: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embed and store passages. Re-adding the same passages accumulates
    /// duplicate entries; avoiding re-ingestion is the caller's concern.
    ///
    /// All passages are embedded before any entry is appended, so a failed
    /// call leaves the in-memory index unchanged.
    pub async fn add_passages(&mut self, passages: Vec<Passage>) -> Result<usize, IndexError> {
        let mut pending = Vec::with_capacity(passages.len());
        let mut dimension = self.dimension;

        for passage in passages {
            let embedding = self.embedder.embed(&passage.text).await?;
            match dimension {
                None => dimension = Some(embedding.len()),
                Some(expected) if expected != embedding.len() => {
                    return Err(IndexError::DimensionMismatch {
                        expected,
                        actual: embedding.len(),
                    });
                }
                Some(_) => {}
            }
            pending.push(IndexEntry { passage, embedding });
        }

        let count = pending.len();
        self.dimension = dimension;
        self.entries.extend(pending);
        debug!(added = count, total = self.entries.len(), "Added passages to index");
        Ok(count)
    }

    /// Embed the query and return up to `k` nearest passages, nearest first.
    ///
    /// When `tenant_filter` is given, results are restricted to passages
    /// whose tenant tag matches exactly; fewer than `k` matches returns all
    /// that match. Ties keep insertion order (the sort is stable).
    pub async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        tenant_filter: Option<&str>,
    ) -> Result<Vec<Passage>, IndexError> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let mut scored: Vec<(f32, &Passage)> = self
            .entries
            .iter()
            .filter(|entry| tenant_filter.is_none_or(|t| entry.passage.tenant == t))
            .map(|entry| {
                (
                    cosine_similarity(&query_embedding, &entry.embedding),
                    &entry.passage,
                )
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        debug!(
            k = k,
            filter = tenant_filter.unwrap_or("<none>"),
            results = scored.len(),
            "Similarity search"
        );
        Ok(scored.into_iter().map(|(_, p)| p.clone()).collect())
    }

    /// Write the whole index to `dir` synchronously. The file is replaced
    /// atomically (tmp sibling + rename) so a crash mid-write cannot corrupt
    /// the previous index.
    pub fn persist(&self, dir: &Path) -> Result<(), IndexError> {
        fs::create_dir_all(dir)?;

        let persisted = PersistedIndex {
            dimension: self.dimension,
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string(&persisted)?;

        let path = dir.join(INDEX_FILE);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, &path)?;

        info!(entries = self.entries.len(), path = ?path, "Persisted vector index");
        Ok(())
    }

    /// Load a previously persisted index from `dir`. A missing or corrupt
    /// file yields `None` (logged, never fatal); the caller starts with no
    /// index, exactly as on first run.
    pub fn load(dir: &Path, embedder: Arc<dyn Embedder>) -> Option<Self> {
        let path = dir.join(INDEX_FILE);
        if !path.exists() {
            return None;
        }

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to read persisted index; starting empty");
                return None;
            }
        };

        match serde_json::from_str::<PersistedIndex>(&content) {
            Ok(persisted) => {
                info!(entries = persisted.entries.len(), path = ?path, "Loaded vector index");
                Some(Self {
                    embedder,
                    entries: persisted.entries,
                    dimension: persisted.dimension,
                })
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "Corrupt persisted index; starting empty");
                None
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}

/// Cosine similarity between two vectors; 0.0 for mismatched or empty input.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::HashEmbedder;
    use std::collections::BTreeSet;
    use ulid::Ulid;

    fn passage(text: &str, tenant: &str) -> Passage {
        Passage {
            id: Ulid::new().to_string(),
            text: text.to_string(),
            tenant: tenant.to_string(),
            source_file: "manual.txt".to_string(),
        }
    }

    fn test_index() -> VectorIndex {
        VectorIndex::new(Arc::new(HashEmbedder::default()))
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[1.0, 0.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 0.001);
        assert!((cosine_similarity(&a, &[-1.0, 0.0, 0.0]) + 1.0).abs() < 0.001);
        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_tenant_isolation() {
        let mut index = test_index();
        index
            .add_passages(vec![passage("Refunds are processed within 5-7 days.", "Food Delivery")])
            .await
            .unwrap();

        let other = index
            .similarity_search("refund policy", 4, Some("Travel Booking"))
            .await
            .unwrap();
        assert!(other.is_empty());

        let own = index
            .similarity_search("refund policy", 4, Some("Food Delivery"))
            .await
            .unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].tenant, "Food Delivery");
    }

    #[tokio::test]
    async fn test_unfiltered_search_spans_tenants() {
        let mut index = test_index();
        index
            .add_passages(vec![
                passage("Refunds take 5-7 days for delivered orders.", "Food Delivery"),
                passage("Refunds are issued as travel credit.", "Travel Booking"),
            ])
            .await
            .unwrap();

        let results = index.similarity_search("refund", 10, None).await.unwrap();
        let tenants: BTreeSet<&str> = results.iter().map(|p| p.tenant.as_str()).collect();
        assert_eq!(results.len(), 2);
        assert_eq!(tenants.len(), 2);
    }

    #[tokio::test]
    async fn test_fewer_matches_than_k() {
        let mut index = test_index();
        index
            .add_passages(vec![passage("single passage", "E-Commerce")])
            .await
            .unwrap();

        let results = index.similarity_search("anything", 4, Some("E-Commerce")).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_k_truncation_and_ordering() {
        let mut index = test_index();
        index
            .add_passages(vec![
                passage("refund refund refund", "A"),
                passage("shipping address change", "A"),
                passage("refund policy details", "A"),
            ])
            .await
            .unwrap();

        let results = index.similarity_search("refund", 2, Some("A")).await.unwrap();
        assert_eq!(results.len(), 2);
        // Both results should be the refund-related passages
        assert!(results.iter().all(|p| p.text.contains("refund")));
    }

    #[tokio::test]
    async fn test_duplicates_accumulate() {
        let mut index = test_index();
        let p = passage("same text", "A");
        index.add_passages(vec![p.clone()]).await.unwrap();
        index.add_passages(vec![p]).await.unwrap();
        assert_eq!(index.len(), 2);
    }

    #[tokio::test]
    async fn test_persist_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(HashEmbedder::default());

        let mut index = VectorIndex::new(embedder.clone());
        index
            .add_passages(vec![
                passage("first passage", "Food Delivery"),
                passage("second passage", "Travel Booking"),
            ])
            .await
            .unwrap();
        index.persist(dir.path()).unwrap();

        let loaded = VectorIndex::load(dir.path(), embedder).unwrap();
        assert_eq!(loaded.len(), index.len());

        let original: BTreeSet<(String, String)> = index
            .entries()
            .iter()
            .map(|e| (e.passage.id.clone(), format!("{:?}", e.embedding)))
            .collect();
        let restored: BTreeSet<(String, String)> = loaded
            .entries()
            .iter()
            .map(|e| (e.passage.id.clone(), format!("{:?}", e.embedding)))
            .collect();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_load_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        assert!(VectorIndex::load(dir.path(), Arc::new(HashEmbedder::default())).is_none());
    }

    #[test]
    fn test_load_corrupt_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(INDEX_FILE), "{ not valid json").unwrap();
        assert!(VectorIndex::load(dir.path(), Arc::new(HashEmbedder::default())).is_none());
    }
}
