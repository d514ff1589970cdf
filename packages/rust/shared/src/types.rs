//! Core domain types for compiled skill packs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SkillPackError;

/// Version string written to `skills/routes.json`.
pub const ROUTES_VERSION: &str = "1.0";

// ---------------------------------------------------------------------------
// LanguageMode
// ---------------------------------------------------------------------------

/// Tokenization language mode.
///
/// `Auto` is both the caller's "detect for me" setting and the detector's
/// answer for spans with no CJK ideographs and no Latin letters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    #[default]
    Auto,
    Zh,
    En,
}

impl LanguageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Zh => "zh",
            Self::En => "en",
        }
    }
}

impl fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageMode {
    type Err = SkillPackError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "zh" => Ok(Self::Zh),
            "en" => Ok(Self::En),
            other => Err(SkillPackError::validation(format!(
                "unknown language mode '{other}': expected auto, zh or en"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Source documents
// ---------------------------------------------------------------------------

/// One extracted source document handed to the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Display name (usually the input file name).
    pub name: String,
    /// Extracted text, raw or already normalized.
    pub text: String,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SkillItem / DependencyEdge / CompiledPack
// ---------------------------------------------------------------------------

/// One atomic knowledge unit derived from a chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillItem {
    /// Sequential, 1-based, zero-padded identifier (`001`, `002`, ...).
    pub id: String,
    /// First line of the chunk with markup stripped, at most 42 characters.
    pub title: String,
    /// Title ellipsized past 24 characters.
    pub trigger: String,
    /// The chunk's full text.
    pub content: String,
    /// Up to 12 distinct tokens, most frequent first.
    pub keywords: Vec<String>,
    /// Up to 8 extracted procedural steps in document order.
    pub steps: Vec<String>,
    /// Up to 8 distinct conditional clauses.
    pub conditions: Vec<String>,
    /// Routing heuristic in `0..=100`.
    pub base_score: u8,
}

/// A directed, weighted keyword-overlap link between two items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
    /// Jaccard similarity of the two keyword sets, rounded to 2 decimals.
    pub weight: f64,
}

/// The full result of one compile. Built once, rendered, then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPack {
    /// Sanitized skill name (slug).
    pub name: String,
    pub items: Vec<SkillItem>,
    pub edges: Vec<DependencyEdge>,
    /// Resolved pack-level language mode.
    pub language: LanguageMode,
    /// Score cutoff supplied by the caller. Recorded as metadata only.
    pub min_score: u8,
    /// Number of source documents that went into the pack.
    pub source_count: usize,
    /// Normalized source text (for the reference excerpt).
    pub source_text: String,
}

// ---------------------------------------------------------------------------
// routes.json schema
// ---------------------------------------------------------------------------

/// Root structure for `skills/routes.json`, consumed by routing tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesDocument {
    pub version: String,
    pub min_score: u8,
    pub skills: Vec<RouteSkill>,
    pub dependencies: Vec<DependencyEdge>,
}

/// A single skill entry in `routes.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSkill {
    pub id: String,
    pub title: String,
    pub trigger: String,
    pub base_score: u8,
    pub keywords: Vec<String>,
}

impl From<&CompiledPack> for RoutesDocument {
    fn from(pack: &CompiledPack) -> Self {
        Self {
            version: ROUTES_VERSION.to_string(),
            min_score: pack.min_score,
            skills: pack
                .items
                .iter()
                .map(|item| RouteSkill {
                    id: item.id.clone(),
                    title: item.title.clone(),
                    trigger: item.trigger.clone(),
                    base_score: item.base_score,
                    keywords: item.keywords.clone(),
                })
                .collect(),
            dependencies: pack.edges.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Name sanitization
// ---------------------------------------------------------------------------

/// Turn an arbitrary skill name into a filesystem/URL-safe slug.
///
/// Lower-cases, keeps ASCII alphanumerics and CJK ideographs, collapses every
/// other run into a single `-`, and strips leading/trailing hyphens. The
/// result may be empty; callers treat that as [`SkillPackError::InvalidName`].
pub fn sanitize_name(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_dash = false;

    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || is_cjk_ideograph(c) {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// CJK Unified Ideographs (basic block plus extension A).
pub fn is_cjk_ideograph(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fff}' | '\u{3400}'..='\u{4dbf}')
}
