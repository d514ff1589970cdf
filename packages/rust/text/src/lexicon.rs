//! Token filters and extraction pattern tables.
//!
//! The tables are plain data ([`LexiconTables`]) compiled once into a
//! [`Lexicon`] and handed to the tokenizer and extractors, so a locale can
//! be extended from config without touching pipeline code.

use std::collections::HashSet;

use regex::Regex;
use skillpack_shared::{LexiconConfig, Result, SkillPackError};

const EN_STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "are", "was", "were", "will", "have",
    "has", "had", "not", "but", "you", "your", "can", "all", "any", "into", "onto", "then",
    "than", "they", "them", "their", "there", "what", "when", "where", "which", "who", "why",
    "how", "also", "been", "being", "its", "our", "out", "about", "over", "under", "such",
    "each", "may", "might", "should", "would", "could", "must", "shall", "use", "using", "used",
    "more", "most", "other", "some", "these", "those", "only", "very", "just", "via", "per",
    "etc", "does", "did", "doing", "here", "same", "both", "between", "after", "before", "while",
    "unless", "else", "otherwise", "because", "within", "without", "upon", "page", "section",
];

const ZH_STOPWORDS: &[&str] = &[
    "我们", "你们", "他们", "以及", "进行", "可以", "这个", "那个", "一个", "没有", "因为",
    "所以", "但是", "如果", "然后", "或者", "并且", "而且", "已经", "通过", "对于", "需要",
    "相关", "包括", "其中", "以下", "以上", "如下", "就是", "还是", "这些", "那些", "什么",
    "怎么", "时候", "其他", "应该", "是否", "不是", "可能", "之后", "之前",
];

/// Line patterns; capture group 1 holds the step text.
const STEP_PATTERNS: &[&str] = &[
    r"^\s*(?:\d{1,3}(?:[.)]\s+|[、．]\s*)|[-*•]\s+)(.+)$",
    r"(?i)^\s*(?:step\s*\d+|第\s*[0-9一二三四五六七八九十百]+\s*步)\s*[:：.、)\-]?\s*(.+)$",
];

/// Clause patterns, applied in order to the whole chunk text.
const CONDITION_PATTERNS: &[&str] = &[
    r"(?i)\bif\b[^.;!?\n。；！？]*?\bthen\b[^.;!?\n。；！？]*",
    r"(?i)\bif\b[^.;!?\n。；！？]+",
    r"(?i)\bwhen\b[^.;!?\n。；！？]+",
    r"(?i)\bunless\b[^.;!?\n。；！？]+",
    r"(?i)\belse\b[^.;!?\n。；！？]+",
    r"如果[^.;!?\n。；！？]+",
    r"(?:倘若|若)[^.;!?\n。；！？]+",
    r"当[^.;!?\n。；！？]+时[^.;!?\n。；！？]*",
    r"否则[^.;!?\n。；！？]+",
    r"例外[^.;!?\n。；！？]+",
];

/// Raw, uncompiled tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconTables {
    pub en_stopwords: Vec<String>,
    pub zh_stopwords: Vec<String>,
    pub step_patterns: Vec<String>,
    pub condition_patterns: Vec<String>,
}

impl Default for LexiconTables {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| (*s).to_string()).collect();
        Self {
            en_stopwords: owned(EN_STOPWORDS),
            zh_stopwords: owned(ZH_STOPWORDS),
            step_patterns: owned(STEP_PATTERNS),
            condition_patterns: owned(CONDITION_PATTERNS),
        }
    }
}

impl LexiconTables {
    /// Append user-configured entries to these tables.
    pub fn with_extras(mut self, extras: &LexiconConfig) -> Self {
        self.en_stopwords.extend(extras.extra_en_stopwords.iter().cloned());
        self.zh_stopwords.extend(extras.extra_zh_stopwords.iter().cloned());
        self.step_patterns.extend(extras.extra_step_patterns.iter().cloned());
        self.condition_patterns
            .extend(extras.extra_condition_patterns.iter().cloned());
        self
    }
}

/// Compiled, immutable tables shared by every chunk of a compile.
#[derive(Debug, Clone)]
pub struct Lexicon {
    en_stopwords: HashSet<String>,
    zh_stopwords: HashSet<String>,
    step_patterns: Vec<Regex>,
    condition_patterns: Vec<Regex>,
}

impl Lexicon {
    /// Compile tables, rejecting invalid regexes and capture-less step patterns.
    pub fn from_tables(tables: &LexiconTables) -> Result<Self> {
        let step_patterns = compile_all(&tables.step_patterns)?;
        if let Some(re) = step_patterns.iter().find(|re| re.captures_len() < 2) {
            return Err(SkillPackError::config(format!(
                "step pattern '{}' needs a capture group for the step text",
                re.as_str()
            )));
        }

        Ok(Self {
            en_stopwords: lowercase_set(&tables.en_stopwords),
            zh_stopwords: lowercase_set(&tables.zh_stopwords),
            step_patterns,
            condition_patterns: compile_all(&tables.condition_patterns)?,
        })
    }

    /// Built-in tables extended with the `[lexicon]` config section.
    pub fn from_config(extras: &LexiconConfig) -> Result<Self> {
        Self::from_tables(&LexiconTables::default().with_extras(extras))
    }

    /// Built-in tables only.
    pub fn builtin() -> Self {
        Self::from_tables(&LexiconTables::default()).expect("valid builtin lexicon")
    }

    pub fn is_en_stopword(&self, token: &str) -> bool {
        self.en_stopwords.contains(token)
    }

    pub fn is_zh_stopword(&self, token: &str) -> bool {
        self.zh_stopwords.contains(token)
    }

    /// Membership in the combined set used by `auto` tokenization.
    pub fn is_stopword(&self, token: &str) -> bool {
        self.is_en_stopword(token) || self.is_zh_stopword(token)
    }

    pub fn step_patterns(&self) -> &[Regex] {
        &self.step_patterns
    }

    pub fn condition_patterns(&self) -> &[Regex] {
        &self.condition_patterns
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p)
                .map_err(|e| SkillPackError::config(format!("invalid pattern '{p}': {e}")))
        })
        .collect()
}

fn lowercase_set(words: &[String]) -> HashSet<String> {
    words.iter().map(|w| w.trim().to_lowercase()).collect()
}
