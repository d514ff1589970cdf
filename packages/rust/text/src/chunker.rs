//! Size-balanced chunking of semantic blocks.
//!
//! Blocks are never split: a chunk is one or more whole blocks joined by a
//! blank line. Raw chunks are then merged in fixed-size batches until the
//! count fits the caller's ceiling.

use tracing::debug;

use crate::normalize::{non_whitespace_len, word_count};

/// A chunk at or above this word count is closed before the next block.
pub const TARGET_MIN_WORDS: usize = 140;

/// A block that would push the chunk past this word count starts a new chunk.
pub const TARGET_MAX_WORDS: usize = 280;

/// Chunks with this many non-whitespace characters or fewer are dropped.
pub const MIN_CHUNK_CHARS: usize = 80;

const JOINER: &str = "\n\n";

/// Pack blocks into at most `max_chunks` chunks.
///
/// The result can be empty when every chunk falls under [`MIN_CHUNK_CHARS`];
/// callers treat that as a fatal lack of content.
pub fn chunk_blocks(blocks: &[&str], max_chunks: usize) -> Vec<String> {
    let raw = pack_blocks(blocks);
    let raw_count = raw.len();
    let reduced = reduce_to_ceiling(raw, max_chunks);

    let chunks: Vec<String> = reduced
        .into_iter()
        .filter(|chunk| non_whitespace_len(chunk) > MIN_CHUNK_CHARS)
        .collect();

    debug!(
        blocks = blocks.len(),
        raw_chunks = raw_count,
        chunks = chunks.len(),
        max_chunks,
        "chunking complete"
    );

    chunks
}

/// Greedy accumulation of whole blocks into raw chunks.
fn pack_blocks(blocks: &[&str]) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_words = 0;

    for block in blocks {
        let block_words = word_count(block);

        let overflow = current_words + block_words > TARGET_MAX_WORDS;
        let full = current_words >= TARGET_MIN_WORDS;
        if !current.is_empty() && (overflow || full) {
            chunks.push(current.join(JOINER));
            current.clear();
            current_words = 0;
        }

        current.push(block);
        current_words += block_words;
    }

    if !current.is_empty() {
        chunks.push(current.join(JOINER));
    }

    chunks
}

/// Merge consecutive raw chunks in batches of `ceil(raw / max)`.
fn reduce_to_ceiling(raw: Vec<String>, max_chunks: usize) -> Vec<String> {
    let max_chunks = max_chunks.max(1);
    if raw.len() <= max_chunks {
        return raw;
    }

    let ratio = raw.len().div_ceil(max_chunks);
    raw.chunks(ratio)
        .map(|batch| batch.join(JOINER))
        .take(max_chunks)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A block of `words` words, each 6 characters long.
    fn block(words: usize, tag: char) -> String {
        (0..words)
            .map(|i| format!("{tag}w{i:04}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn small_blocks_share_one_chunk() {
        let a = block(30, 'a');
        let b = block(30, 'b');
        let chunks = chunk_blocks(&[a.as_str(), b.as_str()], 24);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], format!("{a}\n\n{b}"));
    }

    #[test]
    fn chunk_closes_when_over_max_words() {
        let a = block(200, 'a');
        let b = block(100, 'b');
        let chunks = chunk_blocks(&[a.as_str(), b.as_str()], 24);
        assert_eq!(chunks, vec![a, b]);
    }

    #[test]
    fn chunk_closes_once_min_words_reached() {
        let a = block(140, 'a');
        let b = block(20, 'b');
        let chunks = chunk_blocks(&[a.as_str(), b.as_str()], 24);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn oversized_block_is_never_split() {
        let a = block(500, 'a');
        let chunks = chunk_blocks(&[a.as_str()], 24);
        assert_eq!(chunks, vec![a]);
    }

    #[test]
    fn ceiling_merges_batches_in_order() {
        let blocks: Vec<String> = (0..10).map(|i| block(150, char::from(b'a' + i))).collect();
        let refs: Vec<&str> = blocks.iter().map(String::as_str).collect();

        let chunks = chunk_blocks(&refs, 4);
        // ratio = ceil(10 / 4) = 3 -> batches of 3, 3, 3, 1
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0], refs[0..3].join("\n\n"));
        assert_eq!(chunks[3], refs[9]);
    }

    #[test]
    fn ceiling_never_exceeded() {
        let blocks: Vec<String> = (0..37).map(|_| block(150, 'x')).collect();
        let refs: Vec<&str> = blocks.iter().map(String::as_str).collect();
        for max in 1..=40 {
            let chunks = chunk_blocks(&refs, max);
            assert!(chunks.len() <= max, "max={max} got {}", chunks.len());
            // No content dropped by the batch bound.
            let total: usize = chunks.iter().map(|c| word_count(c)).sum();
            assert_eq!(total, 37 * 150);
        }
    }

    #[test]
    fn short_chunks_are_filtered() {
        let tiny = "Well under eighty visible characters, so it cannot stand alone.";
        assert!(chunk_blocks(&[tiny], 24).is_empty());
    }

    #[test]
    fn no_blocks_no_chunks() {
        assert!(chunk_blocks(&[], 24).is_empty());
    }
}
