//! Manifest rendering: a compiled pack to relative-path -> content entries.
//!
//! The manifest is rendered once and handed to every sink, so the folder
//! and the zip can only ever receive the same bytes.

use std::fmt::Write as _;

use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use skillpack_shared::{CompiledPack, Result, RoutesDocument, SkillItem, SkillPackError};

/// Characters of normalized source kept in `references/source_excerpt.md`.
pub const SOURCE_EXCERPT_CHARS: usize = 120_000;

pub const SKILL_MD: &str = "SKILL.md";
pub const README_MD: &str = "README.md";
pub const INDEX_MD: &str = "skills/index.md";
pub const GRAPH_MD: &str = "skills/dependency-graph.md";
pub const ROUTES_JSON: &str = "skills/routes.json";
pub const EXCERPT_MD: &str = "references/source_excerpt.md";

/// Metadata for a single rendered artifact file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ArtifactMeta {
    pub path: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// One relative path and its textual content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub path: String,
    pub content: String,
}

impl ManifestEntry {
    fn new(path: impl Into<String>, content: String) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }

    /// Hex SHA-256 of the entry's bytes.
    pub fn sha256(&self) -> String {
        sha256_hex(self.content.as_bytes())
    }

    pub fn meta(&self) -> ArtifactMeta {
        ArtifactMeta {
            path: self.path.clone(),
            sha256: self.sha256(),
            size_bytes: self.content.len(),
        }
    }
}

/// The ordered set of files making up a rendered pack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn get(&self, path: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn metas(&self) -> Vec<ArtifactMeta> {
        self.entries.iter().map(ManifestEntry::meta).collect()
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Render every file of the pack, in a fixed order.
#[instrument(skip_all, fields(name = %pack.name, items = pack.items.len()))]
pub fn render_pack(pack: &CompiledPack) -> Result<Manifest> {
    let mut entries = vec![
        ManifestEntry::new(SKILL_MD, render_skill_md(pack)),
        ManifestEntry::new(README_MD, render_readme(pack)),
        ManifestEntry::new(INDEX_MD, render_index(pack)),
        ManifestEntry::new(GRAPH_MD, render_graph(pack)),
        ManifestEntry::new(ROUTES_JSON, render_routes(pack)?),
    ];

    for item in &pack.items {
        entries.push(ManifestEntry::new(item_path(item), render_item(item)));
    }

    entries.push(ManifestEntry::new(EXCERPT_MD, render_excerpt(&pack.source_text)));

    debug!(files = entries.len(), "manifest rendered");
    Ok(Manifest { entries })
}

/// Relative path of an item's page.
pub fn item_path(item: &SkillItem) -> String {
    format!("skills/{}.md", item.id)
}

// ---------------------------------------------------------------------------
// Pack-level files
// ---------------------------------------------------------------------------

fn render_skill_md(pack: &CompiledPack) -> String {
    let count = pack.items.len();
    format!(
        "---\n\
         name: {name}\n\
         description: Skill pack with {count} generated skills compiled from {sources} source document(s).\n\
         ---\n\n\
         # {name}\n\n\
         This pack contains {count} generated skills.\n\n\
         ## How to use\n\n\
         1. Read `{INDEX_MD}` to pick candidate skills by title and trigger.\n\
         2. Use `{ROUTES_JSON}` for machine routing by keywords and base score.\n\
         3. Follow `{GRAPH_MD}` to load related skills together.\n\n\
         ## Files\n\n\
         - `{INDEX_MD}`: skill table\n\
         - `{ROUTES_JSON}`: routing data\n\
         - `{GRAPH_MD}`: dependency graph\n\
         - `{EXCERPT_MD}`: normalized source excerpt\n",
        name = pack.name,
        sources = pack.source_count,
    )
}

fn render_readme(pack: &CompiledPack) -> String {
    let mut out = format!(
        "# {name}\n\n\
         Skill pack compiled from extracted document text.\n\n\
         - Language mode: {language}\n\
         - Input files: {sources}\n\
         - Skills: {skills}\n\
         - Dependencies: {edges}\n\n\
         ## Files\n\n\
         - `{SKILL_MD}`\n\
         - `{README_MD}`\n\
         - `{INDEX_MD}`\n\
         - `{GRAPH_MD}`\n\
         - `{ROUTES_JSON}`\n",
        name = pack.name,
        language = pack.language,
        sources = pack.source_count,
        skills = pack.items.len(),
        edges = pack.edges.len(),
    );
    for item in &pack.items {
        let _ = writeln!(out, "- `{}`", item_path(item));
    }
    let _ = writeln!(out, "- `{EXCERPT_MD}`");
    out
}

fn render_index(pack: &CompiledPack) -> String {
    let mut out = format!(
        "# Skill Index\n\n\
         Minimum score: {min_score} (advisory, rows are not filtered)\n\n\
         | ID | Title | Trigger | Base score |\n\
         |----|-------|---------|------------|\n",
        min_score = pack.min_score,
    );
    for item in &pack.items {
        let _ = writeln!(
            out,
            "| [{id}]({id}.md) | {title} | {trigger} | {score} |",
            id = item.id,
            title = escape_cell(&item.title),
            trigger = escape_cell(&item.trigger),
            score = item.base_score,
        );
    }
    out
}

fn render_graph(pack: &CompiledPack) -> String {
    let mut out = String::from("# Dependency Graph\n\n```mermaid\ngraph TD\n");
    for item in &pack.items {
        let _ = writeln!(
            out,
            "  S{id}[\"{id}: {title}\"]",
            id = item.id,
            title = escape_label(&item.title),
        );
    }
    for edge in &pack.edges {
        let _ = writeln!(
            out,
            "  S{from} -->|{weight:.2}| S{to}",
            from = edge.from,
            to = edge.to,
            weight = edge.weight,
        );
    }
    out.push_str(
        "```\n\n\
         ## Usage notes\n\n\
         - An edge links two skills whose keyword sets overlap (Jaccard similarity of at least 0.22).\n\
         - Similarity is symmetric, so every related pair appears in both directions with the same weight.\n\
         - When a task matches one skill, consider loading its neighbours as supporting context.\n",
    );
    out
}

fn render_routes(pack: &CompiledPack) -> Result<String> {
    let routes = RoutesDocument::from(pack);
    let json = serde_json::to_string_pretty(&routes).map_err(|e| {
        SkillPackError::serialization(ROUTES_JSON, format!("JSON serialization failed: {e}"))
    })?;
    Ok(format!("{json}\n"))
}

fn render_excerpt(source_text: &str) -> String {
    let excerpt: String = source_text.chars().take(SOURCE_EXCERPT_CHARS).collect();
    format!("# Source Excerpt\n\n{excerpt}\n")
}

// ---------------------------------------------------------------------------
// Per-item page
// ---------------------------------------------------------------------------

fn render_item(item: &SkillItem) -> String {
    let mut out = format!(
        "# {title}\n\n\
         - ID: {id}\n\
         - Base score: {score}\n\n\
         ## Trigger\n\n\
         Use this skill when the task involves: {trigger}\n\n\
         ## Keywords\n\n",
        title = item.title,
        id = item.id,
        score = item.base_score,
        trigger = item.trigger,
    );

    if item.keywords.is_empty() {
        out.push_str("- (none)\n");
    } else {
        let list: Vec<String> = item.keywords.iter().map(|k| format!("`{k}`")).collect();
        let _ = writeln!(out, "{}", list.join(", "));
    }

    out.push_str(
        "\n## Procedure\n\n\
         1. Confirm the task matches the trigger and keywords above.\n\
         2. Apply the extracted steps in order, checking each condition before acting.\n\
         3. Fall back to the source content below for exact wording and details.\n\n\
         ## Extracted Steps\n\n",
    );
    if item.steps.is_empty() {
        out.push_str("- No explicit steps detected.\n");
    } else {
        for (n, step) in item.steps.iter().enumerate() {
            let _ = writeln!(out, "{}. {step}", n + 1);
        }
    }

    out.push_str("\n## Conditions\n\n");
    if item.conditions.is_empty() {
        out.push_str("- No explicit conditions detected.\n");
    } else {
        for condition in &item.conditions {
            let _ = writeln!(out, "- {condition}");
        }
    }

    let _ = write!(out, "\n## Source Content\n\n{}\n", item.content);
    out
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn escape_label(text: &str) -> String {
    text.replace('"', "'")
}
