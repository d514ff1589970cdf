//! Artifact sinks: write one [`Manifest`] to a folder or a zip archive.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use skillpack_shared::{Result, SkillPackError};

use crate::render::{Manifest, sha256_hex};

/// A destination for a rendered manifest.
pub trait ArtifactSink {
    /// Write every manifest entry. On success the destination holds
    /// exactly the manifest's bytes.
    fn write(&self, manifest: &Manifest) -> Result<()>;

    /// Where this sink writes to.
    fn location(&self) -> &Path;
}

/// Writes each entry as a file under a directory.
#[derive(Debug, Clone)]
pub struct FolderSink {
    dir: PathBuf,
}

impl FolderSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for FolderSink {
    #[instrument(skip_all, fields(dir = %self.dir.display()))]
    fn write(&self, manifest: &Manifest) -> Result<()> {
        for entry in manifest.entries() {
            let target = self.dir.join(&entry.path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
            }

            let file_name = target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let temp = target.with_file_name(format!(".{file_name}.tmp"));

            std::fs::write(&temp, &entry.content).map_err(|e| write_error(&temp, e))?;
            std::fs::rename(&temp, &target).map_err(|e| write_error(&target, e))?;

            debug!(file = %entry.path, size = entry.content.len(), "wrote artifact");
        }

        info!(count = manifest.len(), "folder artifacts written");
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.dir
    }
}

/// Writes every entry into a single deflate-compressed zip archive.
///
/// Entry timestamps are fixed at 1980-01-01 so identical manifests give
/// byte-identical archives.
#[derive(Debug, Clone)]
pub struct ZipSink {
    path: PathBuf,
}

impl ZipSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn entry_options() -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(0o644)
    }
}

impl ArtifactSink for ZipSink {
    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn write(&self, manifest: &Manifest) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
        }

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        let file = File::create(&temp).map_err(|e| write_error(&temp, e))?;
        let mut zip = ZipWriter::new(file);

        for entry in manifest.entries() {
            zip.start_file(entry.path.as_str(), Self::entry_options())
                .map_err(|e| zip_error(&temp, e))?;
            zip.write_all(entry.content.as_bytes())
                .map_err(|e| write_error(&temp, e))?;
        }
        zip.finish().map_err(|e| zip_error(&temp, e))?;

        std::fs::rename(&temp, &self.path).map_err(|e| write_error(&self.path, e))?;

        info!(count = manifest.len(), "zip archive written");
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// Read every file entry of a zip archive as `path -> content`.
pub fn read_zip_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    let file = File::open(path).map_err(|e| write_error(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| zip_error(path, e))?;

    let mut entries = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| zip_error(path, e))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .map_err(|e| write_error(path, e))?;
        entries.insert(name, content);
    }
    Ok(entries)
}

/// Check that a folder and a zip both hold exactly the manifest's entries,
/// comparing SHA-256 digests per relative path.
///
/// Fails with a `Serialization` error naming the first mismatching path.
#[instrument(skip_all, fields(dir = %dir.display(), zip = %zip_path.display()))]
pub fn verify_parity(manifest: &Manifest, dir: &Path, zip_path: &Path) -> Result<()> {
    let zipped = read_zip_entries(zip_path)?;
    if zipped.len() != manifest.len() {
        return Err(SkillPackError::serialization(
            zip_path,
            format!(
                "archive holds {} entries, manifest has {}",
                zipped.len(),
                manifest.len()
            ),
        ));
    }

    for entry in manifest.entries() {
        let on_disk = dir.join(&entry.path);
        let expected = entry.sha256();
        let folder_bytes = std::fs::read(&on_disk).map_err(|e| write_error(&on_disk, e))?;
        if sha256_hex(&folder_bytes) != expected {
            return Err(SkillPackError::serialization(
                on_disk,
                "folder content differs from manifest",
            ));
        }

        match zipped.get(&entry.path) {
            Some(content) if sha256_hex(content.as_bytes()) == expected => {}
            Some(_) => {
                return Err(SkillPackError::serialization(
                    zip_path,
                    format!("archive entry {} differs from manifest", entry.path),
                ));
            }
            None => {
                return Err(SkillPackError::serialization(
                    zip_path,
                    format!("archive is missing {}", entry.path),
                ));
            }
        }
    }

    debug!(entries = manifest.len(), "folder and archive match");
    Ok(())
}

fn write_error(path: &Path, e: std::io::Error) -> SkillPackError {
    SkillPackError::serialization(path, e.to_string())
}

fn zip_error(path: &Path, e: zip::result::ZipError) -> SkillPackError {
    SkillPackError::serialization(path, format!("zip: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_pack;
    use skillpack_shared::{CompiledPack, LanguageMode, SkillItem};

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sp-sink-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn manifest() -> Manifest {
        let pack = CompiledPack {
            name: "pump-notes".into(),
            items: vec![SkillItem {
                id: "001".into(),
                title: "Pump notes".into(),
                trigger: "Pump notes".into(),
                content: "Pump notes\nCheck the seal weekly.".into(),
                keywords: vec!["pump".into(), "seal".into()],
                steps: vec![],
                conditions: vec![],
                base_score: 58,
            }],
            edges: vec![],
            language: LanguageMode::En,
            min_score: 55,
            source_count: 1,
            source_text: "Pump notes\nCheck the seal weekly.".into(),
        };
        render_pack(&pack).unwrap()
    }

    #[test]
    fn folder_sink_writes_every_entry() {
        let tmp = temp_dir();
        let manifest = manifest();
        let sink = FolderSink::new(tmp.join("pump-notes"));
        sink.write(&manifest).unwrap();

        for entry in manifest.entries() {
            let written = std::fs::read_to_string(sink.location().join(&entry.path)).unwrap();
            assert_eq!(written, entry.content);
        }
        assert!(!sink.location().join("skills/.001.md.tmp").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn zip_sink_matches_folder() {
        let tmp = temp_dir();
        let manifest = manifest();
        let dir = tmp.join("pump-notes");
        let zip_path = tmp.join("pump-notes.zip");

        FolderSink::new(&dir).write(&manifest).unwrap();
        ZipSink::new(&zip_path).write(&manifest).unwrap();

        verify_parity(&manifest, &dir, &zip_path).unwrap();
        let entries = read_zip_entries(&zip_path).unwrap();
        assert!(entries.contains_key("skills/routes.json"));
        assert!(!tmp.join("pump-notes.zip.tmp").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn zip_output_is_reproducible() {
        let tmp = temp_dir();
        let manifest = manifest();
        let a = tmp.join("a.zip");
        let b = tmp.join("b.zip");
        ZipSink::new(&a).write(&manifest).unwrap();
        ZipSink::new(&b).write(&manifest).unwrap();

        assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parity_detects_tampered_folder() {
        let tmp = temp_dir();
        let manifest = manifest();
        let dir = tmp.join("pump-notes");
        let zip_path = tmp.join("pump-notes.zip");
        FolderSink::new(&dir).write(&manifest).unwrap();
        ZipSink::new(&zip_path).write(&manifest).unwrap();

        std::fs::write(dir.join("SKILL.md"), "tampered").unwrap();
        let err = verify_parity(&manifest, &dir, &zip_path).unwrap_err();
        assert!(matches!(err, SkillPackError::Serialization { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unwritable_target_is_serialization_error() {
        let tmp = temp_dir();
        let blocker = tmp.join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let err = FolderSink::new(blocker.join("pack"))
            .write(&manifest())
            .unwrap_err();
        assert!(matches!(err, SkillPackError::Serialization { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
