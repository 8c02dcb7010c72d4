// ShotSync Configuration
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Everything the reconciler used to hard-code lives here and is passed
// explicitly into each operation.

use crate::error::{ReconcileError, ReconcileResult};
use std::path::{Path, PathBuf};

pub const DEFAULT_PROJECT_FILE: &str = "project.json";
pub const DEFAULT_SHOTS_PER_SCENE: usize = 3;
pub const DEDUP_BACKUP_SUFFIX: &str = ".backup_before_clean";
pub const REMAP_BACKUP_SUFFIX: &str = ".backup";
pub const DEFAULT_PENDING_STATUS: &str = "未生成";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// File name of the project document inside a project directory.
    pub project_file: String,
    /// Voice segments grouped into one scene during a remap.
    pub shots_per_scene: usize,
    /// Sibling suffix for the copy taken before video deduplication.
    pub dedup_backup_suffix: String,
    /// Sibling suffix for the copy taken before a mapping rebuild.
    pub remap_backup_suffix: String,
    /// Status label written into freshly rebuilt shot-image mappings.
    pub pending_status: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            project_file: DEFAULT_PROJECT_FILE.to_string(),
            shots_per_scene: DEFAULT_SHOTS_PER_SCENE,
            dedup_backup_suffix: DEDUP_BACKUP_SUFFIX.to_string(),
            remap_backup_suffix: REMAP_BACKUP_SUFFIX.to_string(),
            pending_status: DEFAULT_PENDING_STATUS.to_string(),
        }
    }
}

impl ReconcileConfig {
    /// Defaults overridden by `SHOTSYNC_*` environment variables.
    pub fn from_env() -> ReconcileResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> ReconcileResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("SHOTSYNC_SHOTS_PER_SCENE") {
            config.shots_per_scene = raw.trim().parse().map_err(|_| {
                ReconcileError::InvalidConfig(format!(
                    "SHOTSYNC_SHOTS_PER_SCENE must be a positive integer, got '{}'",
                    raw
                ))
            })?;
        }
        if let Some(name) = lookup("SHOTSYNC_PROJECT_FILE") {
            config.project_file = name;
        }
        if let Some(status) = lookup("SHOTSYNC_PENDING_STATUS") {
            config.pending_status = status;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ReconcileResult<()> {
        if self.shots_per_scene == 0 {
            return Err(ReconcileError::InvalidConfig(
                "shots_per_scene must be at least 1".to_string(),
            ));
        }
        if self.project_file.trim().is_empty() {
            return Err(ReconcileError::InvalidConfig(
                "project_file must not be empty".to_string(),
            ));
        }
        if self.dedup_backup_suffix.is_empty() || self.remap_backup_suffix.is_empty() {
            return Err(ReconcileError::InvalidConfig(
                "backup suffixes must not be empty".to_string(),
            ));
        }
        if self.dedup_backup_suffix == self.remap_backup_suffix {
            return Err(ReconcileError::InvalidConfig(
                "dedup and remap backups need distinct suffixes".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the project document inside `project_dir`.
    pub fn project_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.project_file)
    }
}

/// Sibling of `path` with `suffix` appended to the full file name.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}", file_name, suffix))
}
