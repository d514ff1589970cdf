//! Input intake: turn CLI paths into [`SourceDocument`]s.
//!
//! `.pdf` files go through `pdf-extract`; anything else is read as UTF-8
//! text. Each file is extracted on tokio's blocking pool.

use std::path::{Path, PathBuf};

use skillpack_shared::{Result, SkillPackError, SourceDocument};
use tracing::{debug, instrument};

/// Extract every input, preserving argument order.
#[instrument(skip_all, fields(inputs = paths.len()))]
pub(crate) async fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceDocument>> {
    for path in paths {
        if !path.is_file() {
            return Err(SkillPackError::InputNotFound {
                input: path.display().to_string(),
            });
        }
    }

    let handles: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| tokio::task::spawn_blocking(move || extract_one(&path)))
        .collect();

    let mut sources = Vec::with_capacity(handles.len());
    for (handle, path) in handles.into_iter().zip(paths) {
        let doc = handle.await.map_err(|e| SkillPackError::Extraction {
            input: path.display().to_string(),
            message: format!("extraction task failed: {e}"),
        })??;
        sources.push(doc);
    }
    Ok(sources)
}

fn extract_one(path: &Path) -> Result<SourceDocument> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    let text = if is_pdf {
        pdf_extract::extract_text(path).map_err(|e| SkillPackError::Extraction {
            input: path.display().to_string(),
            message: e.to_string(),
        })?
    } else {
        let bytes = std::fs::read(path).map_err(|e| SkillPackError::io(path, e))?;
        String::from_utf8(bytes).map_err(|e| SkillPackError::Extraction {
            input: path.display().to_string(),
            message: format!("not valid UTF-8: {e}"),
        })?
    };

    debug!(source = %name, chars = text.chars().count(), pdf = is_pdf, "source extracted");
    Ok(SourceDocument::new(name, text))
}
