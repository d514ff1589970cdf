//! Text analysis for the skill-pack compiler.
//!
//! Normalizes extracted document text, splits it into semantic blocks,
//! packs blocks into size-balanced chunks, and extracts per-chunk keywords,
//! steps and conditional clauses. All functions are pure; the token filters
//! and patterns come from an injected [`Lexicon`].

pub mod chunker;
pub mod extract;
pub mod keywords;
pub mod language;
pub mod lexicon;
pub mod normalize;

pub use chunker::chunk_blocks;
pub use extract::{MAX_CONDITIONS, MAX_STEPS, extract_conditions, extract_steps};
pub use keywords::{MAX_KEYWORDS, extract_keywords, rank_keywords, tokenize};
pub use language::{detect_language, resolve_language};
pub use lexicon::{Lexicon, LexiconTables};
pub use normalize::{non_whitespace_len, normalize, split_blocks, word_count};
