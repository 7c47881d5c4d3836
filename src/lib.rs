// Manualbot Library
// Exports the RAG core for use by the CLI binary

pub mod config;
pub mod documents;
pub mod index;
pub mod prompt;
pub mod providers;
pub mod rag;
pub mod registry;

// Re-export commonly used types for CLI
pub use config::{ConfigError, DataPaths, ProviderKind, ProviderSettings};
pub use documents::{
    chunk_segments, load_document, DocumentFormat, LoaderError, Passage, RawSegment,
    CHUNK_OVERLAP, CHUNK_SIZE,
};
pub use index::{IndexError, VectorIndex};
pub use prompt::{QueryScope, COMPARISON_SCOPE, COMPARISON_TOP_K, SINGLE_TENANT_TOP_K};
pub use providers::{
    from_settings, AzureProvider, Embedder, Generator, HashEmbedder, OpenAiProvider,
    ProviderError,
};
pub use rag::{RagError, RagService, NO_DOCUMENTS_MESSAGE};
pub use registry::{RegistryError, Tenant, TenantRegistry};
