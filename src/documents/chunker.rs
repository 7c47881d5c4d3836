//! Passage Chunking
//!
//! Splits loaded document segments into bounded, overlapping passages
//! suitable for embedding. Windows are fixed-size with overlap so that
//! spans straddling a split point remain retrievable from at least one
//! passage.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::loader::RawSegment;

/// Target passage size in characters.
pub const CHUNK_SIZE: usize = 1000;

/// Characters of overlap between consecutive passages.
pub const CHUNK_OVERLAP: usize = 200;

/// A tenant-tagged chunk of source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passage {
    pub id: String,
    pub text: String,
    /// Tenant (application) this passage belongs to. Always non-empty.
    pub tenant: String,
    /// Basename of the originating file.
    pub source_file: String,
}

/// Tag every segment with the tenant and split it into overlapping passages,
/// preserving original order. An empty document yields zero passages.
pub fn chunk_segments(segments: &[RawSegment], tenant: &str) -> Vec<Passage> {
    let mut passages = Vec::new();

    for segment in segments {
        for text in sliding_window(&segment.text) {
            passages.push(Passage {
                id: Ulid::new().to_string(),
                text,
                tenant: tenant.to_string(),
                source_file: segment.source_file.clone(),
            });
        }
    }

    passages
}

/// Split text into windows of `CHUNK_SIZE` bytes with `CHUNK_OVERLAP` bytes
/// of overlap. Window edges are snapped down to char boundaries so multi-byte
/// text never splits mid-character; the non-overlapping parts of consecutive
/// windows concatenate back to the original text.
fn sliding_window(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    if text.len() <= CHUNK_SIZE {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let end = floor_char_boundary(text, start + CHUNK_SIZE);
        chunks.push(text[start..end].to_string());

        if end == text.len() {
            break;
        }
        start = floor_char_boundary(text, end - CHUNK_OVERLAP);
    }

    chunks
}

/// Largest char boundary at or below `index`.
fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut index = index;
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str) -> RawSegment {
        RawSegment {
            text: text.to_string(),
            source_file: "manual.txt".to_string(),
        }
    }

    #[test]
    fn test_empty_document_yields_no_passages() {
        assert!(chunk_segments(&[segment("")], "Food Delivery").is_empty());
        assert!(chunk_segments(&[segment("   \n  ")], "Food Delivery").is_empty());
        assert!(chunk_segments(&[], "Food Delivery").is_empty());
    }

    #[test]
    fn test_short_document_single_passage() {
        let passages =
            chunk_segments(&[segment("Refunds are processed within 5-7 days.")], "Food Delivery");

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].text, "Refunds are processed within 5-7 days.");
        assert_eq!(passages[0].tenant, "Food Delivery");
        assert_eq!(passages[0].source_file, "manual.txt");
    }

    #[test]
    fn test_windows_respect_size_and_overlap() {
        let text = "abcdefghij".repeat(300); // 3000 chars, ASCII
        let chunks = sliding_window(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= CHUNK_SIZE);
        }

        // Each chunk starts with the last CHUNK_OVERLAP chars of its predecessor
        for pair in chunks.windows(2) {
            let tail = &pair[0][pair[0].len() - CHUNK_OVERLAP..];
            assert!(pair[1].starts_with(tail));
        }
    }

    #[test]
    fn test_reconstruction_from_non_overlapping_parts() {
        let text = "0123456789".repeat(457); // not a multiple of the window size
        let chunks = sliding_window(&text);

        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.push_str(&chunk[CHUNK_OVERLAP..]);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_multibyte_text_never_splits_mid_char() {
        let text = "é".repeat(2000); // 4000 bytes of two-byte chars
        let chunks = sliding_window(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().all(|c| c == 'é'));
        }
    }

    #[test]
    fn test_order_preserved_across_segments() {
        let segments = vec![segment("first part"), segment("second part")];
        let passages = chunk_segments(&segments, "E-Commerce");

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].text, "first part");
        assert_eq!(passages[1].text, "second part");
        assert!(passages.iter().all(|p| p.tenant == "E-Commerce"));
    }
}
