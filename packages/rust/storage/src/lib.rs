//! Filesystem output store for published skill packs.
//!
//! The [`OutputStore`] owns a root directory shared by every compile:
//!
//! ```text
//! <root>/<name>/            published folder
//! <root>/<name>.zip         published archive
//! <root>/.locks/<name>.lock per-name compile lock
//! <root>/.staging/<uuid>/   per-request scratch space
//! ```
//!
//! **Access rules:**
//! - Writers build inside a [`StagingArea`] and only touch `<root>/<name>*`
//!   through [`OutputStore::publish`] while holding the name's [`NameLock`].
//! - The retention sweep takes the same lock, so an in-flight compile is
//!   never swept.
//!
//! Name locks are OS advisory locks (via `fs2`) on `<root>/.locks/<name>.lock`.
//! The file itself may outlive its holder; only the lock on it matters, and
//! the OS drops that when the holding process exits.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use skillpack_shared::{Result, SkillPackError, sanitize_name};

const LOCKS_DIR: &str = ".locks";
const STAGING_DIR: &str = ".staging";
const STAGED_FOLDER: &str = "pack";
const STAGED_ZIP: &str = "pack.zip";

/// Handle on the shared output namespace.
#[derive(Debug, Clone)]
pub struct OutputStore {
    root: PathBuf,
    ttl: Duration,
}

/// Exclusive claim on one pack name. Released when dropped.
#[derive(Debug)]
pub struct NameLock {
    name: String,
    file: File,
}

impl NameLock {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for NameLock {
    fn drop(&mut self) {
        // The lock file stays on disk for the next holder.
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(name = %self.name, error = %e, "failed to release lock");
        }
    }
}

/// Private scratch directory for one compile. Removed when dropped.
#[derive(Debug)]
pub struct StagingArea {
    id: Uuid,
    dir: PathBuf,
}

impl StagingArea {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Where the folder sink should write.
    pub fn folder_path(&self) -> PathBuf {
        self.dir.join(STAGED_FOLDER)
    }

    /// Where the zip sink should write.
    pub fn zip_path(&self) -> PathBuf {
        self.dir.join(STAGED_ZIP)
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if self.dir.exists() {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }
}

/// Final locations of a published pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPack {
    pub folder: PathBuf,
    pub zip: PathBuf,
}

/// A pack found in the store by [`OutputStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackEntry {
    pub name: String,
    pub folder: PathBuf,
    pub zip: Option<PathBuf>,
    pub modified: DateTime<Utc>,
}

/// Outcome of a retention sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed_packs: Vec<String>,
    pub removed_staging: usize,
    pub skipped_locked: Vec<String>,
}

impl OutputStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>, ttl: Duration) -> Result<Self> {
        let root = root.into();
        for dir in [root.clone(), root.join(LOCKS_DIR), root.join(STAGING_DIR)] {
            std::fs::create_dir_all(&dir).map_err(|e| SkillPackError::io(&dir, e))?;
        }
        debug!(root = %root.display(), ttl_secs = ttl.as_secs(), "output store opened");
        Ok(Self { root, ttl })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn folder_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn zip_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.zip"))
    }

    fn lock_path(&self, name: &str) -> PathBuf {
        self.root.join(LOCKS_DIR).join(format!("{name}.lock"))
    }

    /// Claim `name` for the duration of a compile.
    ///
    /// Fails with [`SkillPackError::OutputLocked`] while another compile or
    /// sweep holds the name.
    pub fn lock(&self, name: &str) -> Result<NameLock> {
        if name.is_empty() || sanitize_name(name) != name {
            return Err(SkillPackError::InvalidName { name: name.into() });
        }

        let path = self.lock_path(name);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| SkillPackError::io(&path, e))?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if is_contended(&e) => {
                debug!(%name, "lock held elsewhere");
                return Err(SkillPackError::OutputLocked { name: name.into() });
            }
            Err(e) => return Err(SkillPackError::io(&path, e)),
        }

        // Holder info is informational only.
        if let Err(e) = write_holder(&file) {
            debug!(%name, error = %e, "could not record lock holder");
        }

        debug!(%name, "lock acquired");
        Ok(NameLock {
            name: name.into(),
            file,
        })
    }

    /// Allocate a fresh staging area.
    pub fn stage(&self) -> Result<StagingArea> {
        let id = Uuid::now_v7();
        let dir = self.root.join(STAGING_DIR).join(id.to_string());
        std::fs::create_dir_all(&dir).map_err(|e| SkillPackError::io(&dir, e))?;
        Ok(StagingArea { id, dir })
    }

    /// Move a fully written staging area into place under the locked name.
    ///
    /// The old zip goes first and the new zip lands last, so a zip at
    /// `<root>/<name>.zip` always sits next to a complete folder.
    #[instrument(skip_all, fields(name = %lock.name()))]
    pub fn publish(&self, lock: &NameLock, staging: StagingArea) -> Result<PublishedPack> {
        let folder = self.folder_path(lock.name());
        let zip = self.zip_path(lock.name());

        if zip.exists() {
            std::fs::remove_file(&zip).map_err(|e| SkillPackError::io(&zip, e))?;
        }
        if folder.exists() {
            std::fs::remove_dir_all(&folder).map_err(|e| SkillPackError::io(&folder, e))?;
        }

        let staged_folder = staging.folder_path();
        std::fs::rename(&staged_folder, &folder).map_err(|e| SkillPackError::io(&folder, e))?;
        let staged_zip = staging.zip_path();
        std::fs::rename(&staged_zip, &zip).map_err(|e| SkillPackError::io(&zip, e))?;

        info!(folder = %folder.display(), zip = %zip.display(), "pack published");
        Ok(PublishedPack { folder, zip })
    }

    /// Published packs, sorted by name.
    pub fn list(&self) -> Result<Vec<PackEntry>> {
        let mut packs = Vec::new();
        for name in self.published_names()? {
            let folder = self.folder_path(&name);
            if !folder.is_dir() {
                continue;
            }
            let zip = self.zip_path(&name);
            packs.push(PackEntry {
                modified: modified_at(&folder)?,
                zip: zip.is_file().then_some(zip),
                folder,
                name,
            });
        }
        Ok(packs)
    }

    /// Remove packs and staging areas older than the TTL.
    ///
    /// Names whose lock is held are skipped.
    #[instrument(skip_all, fields(root = %self.root.display()))]
    pub fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let mut report = SweepReport::default();

        for name in self.published_names()? {
            let folder = self.folder_path(&name);
            let zip = self.zip_path(&name);
            if !self.is_expired(&folder, now)? || !self.is_expired(&zip, now)? {
                continue;
            }

            let _lock = match self.lock(&name) {
                Ok(lock) => lock,
                Err(SkillPackError::OutputLocked { .. }) => {
                    debug!(%name, "pack in use, not sweeping");
                    report.skipped_locked.push(name);
                    continue;
                }
                Err(e) => return Err(e),
            };

            if zip.exists() {
                std::fs::remove_file(&zip).map_err(|e| SkillPackError::io(&zip, e))?;
            }
            if folder.exists() {
                std::fs::remove_dir_all(&folder).map_err(|e| SkillPackError::io(&folder, e))?;
            }
            report.removed_packs.push(name);
        }

        let staging_root = self.root.join(STAGING_DIR);
        for entry in read_dir(&staging_root)? {
            let path = entry.path();
            if self.is_expired(&path, now)? {
                std::fs::remove_dir_all(&path).map_err(|e| SkillPackError::io(&path, e))?;
                report.removed_staging += 1;
            }
        }

        info!(
            removed = report.removed_packs.len(),
            staging = report.removed_staging,
            skipped = report.skipped_locked.len(),
            "sweep complete"
        );
        Ok(report)
    }

    /// A missing path counts as expired.
    fn is_expired(&self, path: &Path, now: DateTime<Utc>) -> Result<bool> {
        if !path.exists() {
            return Ok(true);
        }
        Ok(age(now, modified_at(path)?) > self.ttl)
    }

    /// Names with a published folder or zip, sorted and deduplicated.
    ///
    /// Entries that are not valid pack names were not written by a compile
    /// and are left alone.
    fn published_names(&self) -> Result<Vec<String>> {
        let mut names = std::collections::BTreeSet::new();
        for entry in read_dir(&self.root)? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if file_name.starts_with('.') || file_name.ends_with(".tmp") {
                continue;
            }
            let name = if entry.path().is_dir() {
                file_name
            } else if let Some(stem) = file_name.strip_suffix(".zip") {
                stem.to_string()
            } else {
                continue;
            };
            if name.is_empty() || sanitize_name(&name) != name {
                debug!(entry = %name, "ignoring foreign entry in output root");
                continue;
            }
            names.insert(name);
        }
        Ok(names.into_iter().collect())
    }
}

fn is_contended(e: &std::io::Error) -> bool {
    e.kind() == std::io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

fn write_holder(mut file: &File) -> std::io::Result<()> {
    file.set_len(0)?;
    writeln!(file, "pid={}", std::process::id())?;
    writeln!(file, "acquired={}", Utc::now().to_rfc3339())?;
    Ok(())
}

fn read_dir(dir: &Path) -> Result<Vec<std::fs::DirEntry>> {
    std::fs::read_dir(dir)
        .and_then(|entries| entries.collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| SkillPackError::io(dir, e))
}

fn modified_at(path: &Path) -> Result<DateTime<Utc>> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| SkillPackError::io(path, e))?;
    Ok(DateTime::<Utc>::from(modified))
}

fn age(now: DateTime<Utc>, then: DateTime<Utc>) -> Duration {
    (now - then).to_std().unwrap_or_default()
}
