// ShotSync Project Store
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Loading, backing up, and rewriting project documents. The target file
// is never truncated in place: new content goes to a sibling temp file that
// is renamed over the original.

use crate::config::with_suffix;
use crate::error::{ReconcileError, ReconcileResult};
use crate::project::ProjectDocument;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const TMP_SUFFIX: &str = ".shotsync.tmp";

/// A project document together with the exact bytes it was parsed from.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    pub path: PathBuf,
    pub raw: Vec<u8>,
    pub document: ProjectDocument,
}

pub fn load_project(path: &Path) -> ReconcileResult<LoadedProject> {
    if !path.exists() {
        return Err(ReconcileError::ProjectNotFound(path.to_path_buf()));
    }

    let raw = fs::read(path).map_err(|e| ReconcileError::io(path, e))?;
    let document = ProjectDocument::parse_slice(&raw)?;

    info!("[STORE] 📂 Loaded {:?} ({} bytes)", path, raw.len());
    Ok(LoadedProject {
        path: path.to_path_buf(),
        raw,
        document,
    })
}

/// Hex SHA-256 of `bytes`.
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn digest_file(path: &Path) -> ReconcileResult<String> {
    let bytes = fs::read(path).map_err(|e| ReconcileError::io(path, e))?;
    Ok(digest(&bytes))
}

/// Copy the pre-mutation bytes next to the project file and confirm the copy
/// hashes the same as the original.
pub fn write_backup(project_path: &Path, raw: &[u8], suffix: &str) -> ReconcileResult<PathBuf> {
    let backup = with_suffix(project_path, suffix);
    fs::write(&backup, raw).map_err(|e| ReconcileError::io(&backup, e))?;

    let expected = digest(raw);
    let actual = digest_file(&backup)?;
    if expected != actual {
        warn!("[BACKUP] ❌ Backup digest mismatch for {:?}", backup);
        return Err(ReconcileError::BackupMismatch {
            backup,
            expected,
            actual,
        });
    }

    info!("[BACKUP] 💾 Backup written: {:?}", backup);
    Ok(backup)
}

/// Write `bytes` to `path` through a sibling temp file and a rename.
pub fn atomic_write_bytes(path: &Path, bytes: &[u8]) -> ReconcileResult<()> {
    let tmp = with_suffix(path, TMP_SUFFIX);
    {
        let file = File::create(&tmp).map_err(|e| ReconcileError::io(&tmp, e))?;
        let mut writer = BufWriter::new(file);
        let written = write_synced(&mut writer, bytes);
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(ReconcileError::io(&tmp, e));
        }
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(ReconcileError::io(path, e));
    }
    Ok(())
}

fn write_synced(writer: &mut BufWriter<File>, bytes: &[u8]) -> std::io::Result<()> {
    writer.write_all(bytes)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

pub fn save_document(path: &Path, document: &ProjectDocument) -> ReconcileResult<()> {
    let json = document.to_pretty_string()?;
    atomic_write_bytes(path, json.as_bytes())?;
    info!("[STORE] ✅ Rewrote {:?}", path);
    Ok(())
}

/// Put the backup taken under `suffix` back in place of the project file.
pub fn restore_backup(project_path: &Path, suffix: &str) -> ReconcileResult<PathBuf> {
    let backup = with_suffix(project_path, suffix);
    if !backup.exists() {
        return Err(ReconcileError::BackupNotFound(backup));
    }

    let raw = fs::read(&backup).map_err(|e| ReconcileError::io(&backup, e))?;
    atomic_write_bytes(project_path, &raw)?;

    info!("[BACKUP] ♻️ Restored {:?} from {:?}", project_path, backup);
    Ok(backup)
}
