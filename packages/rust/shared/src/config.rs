//! Application configuration for the skill-pack compiler.
//!
//! User config lives at `~/.skillpack/skillpack.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillPackError};
use crate::types::LanguageMode;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "skillpack.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".skillpack";

// ---------------------------------------------------------------------------
// Config structs (matching skillpack.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Compile defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Output retention policy.
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Additions to the built-in token filters and extraction patterns.
    #[serde(default)]
    pub lexicon: LexiconConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Root of the output store.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Language mode: auto, zh or en.
    #[serde(default)]
    pub language: LanguageMode,

    /// Upper bound on generated skills per pack.
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,

    /// Score cutoff recorded in the pack (advisory).
    #[serde(default = "default_min_score")]
    pub min_score: u8,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            language: LanguageMode::Auto,
            max_chunks: default_max_chunks(),
            min_score: default_min_score(),
        }
    }
}

fn default_output_dir() -> String {
    "skill-packs".into()
}
fn default_max_chunks() -> usize {
    24
}
fn default_min_score() -> u8 {
    55
}

/// `[retention]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Published packs older than this are removed by `sweep`.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
        }
    }
}

fn default_ttl_hours() -> u64 {
    24
}

/// `[lexicon]` section. Entries are appended to the built-in tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconConfig {
    #[serde(default)]
    pub extra_en_stopwords: Vec<String>,

    #[serde(default)]
    pub extra_zh_stopwords: Vec<String>,

    /// Regexes with one capture group holding the step text.
    #[serde(default)]
    pub extra_step_patterns: Vec<String>,

    /// Regexes whose whole match is a conditional clause.
    #[serde(default)]
    pub extra_condition_patterns: Vec<String>,
}

// ---------------------------------------------------------------------------
// Compile config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Per-invocation compile configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileConfig {
    /// Requested language mode.
    pub language: LanguageMode,
    /// Chunk ceiling (must be positive).
    pub max_chunks: usize,
    /// Score cutoff, metadata only.
    pub min_score: u8,
    /// Unsanitized skill name as supplied by the caller.
    pub skill_name: String,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CompileConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            language: config.defaults.language,
            max_chunks: config.defaults.max_chunks,
            min_score: config.defaults.min_score,
            skill_name: String::new(),
        }
    }
}

impl CompileConfig {
    /// Reject option values the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.max_chunks == 0 {
            return Err(SkillPackError::validation(
                "max_chunks must be a positive integer",
            ));
        }
        if self.min_score > 100 {
            return Err(SkillPackError::validation(format!(
                "min_score {} is outside 0..=100",
                self.min_score
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.skillpack/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SkillPackError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.skillpack/skillpack.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SkillPackError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SkillPackError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SkillPackError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| SkillPackError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SkillPackError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
