//! Manual Ingestion Module
//!
//! Handles loading uploaded reference manuals and splitting them into
//! tenant-tagged passages ready for embedding.

pub mod chunker;
pub mod loader;

// Re-export key public types
pub use chunker::{chunk_segments, Passage, CHUNK_OVERLAP, CHUNK_SIZE};
pub use loader::{load_document, DocumentFormat, LoaderError, RawSegment};
