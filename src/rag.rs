//! RAG Orchestrator
//!
//! Wires the loader, chunker, index, prompt composer, and generator into the
//! two end-to-end flows: ingesting a manual for one application and answering
//! a scoped question. The index lives behind an async RwLock so concurrent
//! queries share read access while ingestion takes exclusive write access.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::documents::{chunk_segments, load_document, LoaderError};
use crate::index::{IndexError, VectorIndex};
use crate::prompt::{compose, format_context, QueryScope};
use crate::providers::{Embedder, Generator, ProviderError};

/// Answer returned when no index exists yet. The generator is never invoked
/// in that case.
pub const NO_DOCUMENTS_MESSAGE: &str = "No documents have been uploaded yet.";

#[derive(Error, Debug)]
pub enum RagError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("Application name cannot be empty")]
    EmptyTenant,
}

pub struct RagService {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    index: RwLock<Option<VectorIndex>>,
    index_dir: PathBuf,
}

impl RagService {
    /// Build the service, reloading any index persisted under `index_dir`.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        index_dir: PathBuf,
    ) -> Self {
        let index = VectorIndex::load(&index_dir, embedder.clone());
        Self {
            embedder,
            generator,
            index: RwLock::new(index),
            index_dir,
        }
    }

    /// Ingest one manual for one application: load, chunk, embed, index,
    /// persist. Returns the number of passages added.
    ///
    /// A document with no extractable text is a no-op success; the index is
    /// neither created nor touched.
    pub async fn ingest(&self, path: &Path, tenant: &str) -> Result<usize, RagError> {
        let tenant = tenant.trim();
        if tenant.is_empty() {
            return Err(RagError::EmptyTenant);
        }

        let segments = load_document(path)?;
        let passages = chunk_segments(&segments, tenant);
        if passages.is_empty() {
            info!(path = ?path, tenant = %tenant, "Document has no extractable text; nothing indexed");
            return Ok(0);
        }

        let mut guard = self.index.write().await;
        let index = guard.get_or_insert_with(|| VectorIndex::new(self.embedder.clone()));
        let count = index.add_passages(passages).await?;
        index.persist(&self.index_dir)?;

        info!(path = ?path, tenant = %tenant, passages = count, "Ingested manual");
        Ok(count)
    }

    /// Answer a question under the given scope.
    ///
    /// Before any index exists, every scope gets [`NO_DOCUMENTS_MESSAGE`]
    /// without a generator call. Once an index exists the full pipeline runs
    /// even when retrieval comes back empty, so the model can still handle
    /// greetings and decline unanswerable questions.
    pub async fn query(&self, question: &str, scope: &QueryScope) -> Result<String, RagError> {
        let (k, tenant_filter) = scope.retrieval();

        let passages = {
            let guard = self.index.read().await;
            match guard.as_ref() {
                None => return Ok(NO_DOCUMENTS_MESSAGE.to_string()),
                Some(index) => index.similarity_search(question, k, tenant_filter).await?,
            }
        };

        info!(scope = ?scope, retrieved = passages.len(), "Answering question");
        let context = format_context(&passages);
        let prompt = compose(scope, question, &context);
        Ok(self.generator.generate(&prompt).await?)
    }

    /// Number of passages currently indexed.
    pub async fn indexed_passages(&self) -> usize {
        self.index.read().await.as_ref().map_or(0, |i| i.len())
    }
}
