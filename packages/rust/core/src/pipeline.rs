//! End-to-end `compile` pipeline: sources → pack → manifest → folder + zip.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument};

use skillpack_artifacts::{
    ArtifactMeta, ArtifactSink, FolderSink, ZipSink, render_pack, verify_parity,
};
use skillpack_shared::{CompileConfig, LanguageMode, Result, SourceDocument};
use skillpack_storage::OutputStore;
use skillpack_text::Lexicon;

use crate::compiler::compile_with;

/// Result of the `build_pack` pipeline.
#[derive(Debug)]
pub struct BuildPackResult {
    /// Sanitized pack name.
    pub name: String,
    /// Published pack directory.
    pub folder: PathBuf,
    /// Published zip archive.
    pub zip: PathBuf,
    pub item_count: usize,
    pub edge_count: usize,
    /// Pack-level language.
    pub language: LanguageMode,
    /// Checksums of every file written, in manifest order.
    pub artifacts: Vec<ArtifactMeta>,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each skill item is built.
    fn chunk_compiled(&self, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildPackResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn chunk_compiled(&self, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildPackResult) {}
}

/// Run the full `compile` pipeline.
///
/// 1. Compile sources into a pack
/// 2. Render the manifest
/// 3. Lock the name and allocate a staging area
/// 4. Write folder and zip from the same manifest, then verify parity
/// 5. Publish into the output store
///
/// Nothing under the store's published names changes unless every step
/// succeeds.
#[instrument(skip_all, fields(name = %config.skill_name, sources = sources.len()))]
pub fn build_pack(
    config: &CompileConfig,
    sources: &[SourceDocument],
    lexicon: &Lexicon,
    store: &OutputStore,
    progress: &dyn ProgressReporter,
) -> Result<BuildPackResult> {
    let start = Instant::now();

    // --- Phase 1: Compile ---
    progress.phase("Compiling skills");
    let pack = compile_with(sources, config, lexicon, |current, total| {
        progress.chunk_compiled(current, total)
    })?;

    // --- Phase 2: Render ---
    progress.phase("Rendering artifacts");
    let manifest = render_pack(&pack)?;

    // --- Phase 3: Write into staging ---
    progress.phase("Writing skill pack");
    let lock = store.lock(&pack.name)?;
    let staging = store.stage()?;

    FolderSink::new(staging.folder_path()).write(&manifest)?;
    ZipSink::new(staging.zip_path()).write(&manifest)?;
    verify_parity(&manifest, &staging.folder_path(), &staging.zip_path())?;

    // --- Phase 4: Publish ---
    progress.phase("Publishing");
    let published = store.publish(&lock, staging)?;
    drop(lock);

    let result = BuildPackResult {
        name: pack.name,
        folder: published.folder,
        zip: published.zip,
        item_count: pack.items.len(),
        edge_count: pack.edges.len(),
        language: pack.language,
        artifacts: manifest.metas(),
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        name = %result.name,
        items = result.item_count,
        files = result.artifacts.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "compile pipeline complete"
    );

    Ok(result)
}
