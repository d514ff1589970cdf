//! Shared types, error model, and configuration for the skill-pack compiler.
//!
//! This crate is the foundation depended on by all other skillpack crates.
//! It provides:
//! - [`SkillPackError`]: the unified error type
//! - Domain types ([`SkillItem`], [`DependencyEdge`], [`CompiledPack`], [`RoutesDocument`])
//! - Configuration ([`AppConfig`], [`CompileConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CompileConfig, DefaultsConfig, LexiconConfig, RetentionConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, SkillPackError};
pub use types::{
    CompiledPack, DependencyEdge, LanguageMode, ROUTES_VERSION, RouteSkill, RoutesDocument,
    SkillItem, SourceDocument, is_cjk_ideograph, sanitize_name,
};
