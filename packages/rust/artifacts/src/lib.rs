//! Skill-pack artifact rendering and output sinks.
//!
//! [`render_pack`] turns a compiled pack into an in-memory [`Manifest`];
//! [`FolderSink`] and [`ZipSink`] write that same manifest to disk, and
//! [`verify_parity`] checks the two outputs agree byte for byte.

pub mod render;
pub mod sink;

pub use render::{
    ArtifactMeta, EXCERPT_MD, GRAPH_MD, INDEX_MD, Manifest, ManifestEntry, README_MD,
    ROUTES_JSON, SKILL_MD, SOURCE_EXCERPT_CHARS, item_path, render_pack,
};
pub use sink::{ArtifactSink, FolderSink, ZipSink, read_zip_entries, verify_parity};
