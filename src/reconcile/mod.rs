// ShotSync Reconciler
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// File-level drivers. Each run loads the project document, transforms it in
// memory, takes a verified backup of the untouched bytes, and only then
// replaces the target. Nothing is written when the transform fails.

pub mod dedup;
pub mod diagnose;
pub mod voice_mapping;

use crate::config::ReconcileConfig;
use crate::error::{ReconcileError, ReconcileResult};
use crate::project::store::{self, load_project};
use crate::shot_ids::{ShotIdIndex, ShotIdentity};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use dedup::{dedupe_document, DedupReport};
use diagnose::{MismatchAnalysis, ValidationReport};
use voice_mapping::{rebuild_shot_image_mappings, rebuild_timestamp, RemapReport};

/// Which pre-mutation backup to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    Dedupe,
    Remap,
}

impl BackupKind {
    pub fn suffix<'a>(&self, config: &'a ReconcileConfig) -> &'a str {
        match self {
            BackupKind::Dedupe => &config.dedup_backup_suffix,
            BackupKind::Remap => &config.remap_backup_suffix,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DedupOutcome {
    pub project_path: PathBuf,
    /// `None` on a dry run.
    pub backup_path: Option<PathBuf>,
    pub report: DedupReport,
}

#[derive(Debug, Clone)]
pub struct RemapOutcome {
    pub project_path: PathBuf,
    pub backup_path: Option<PathBuf>,
    pub report: RemapReport,
}

/// Drop stale and orphaned video records from the project in `project_dir`.
pub fn run_dedupe(
    project_dir: &Path,
    config: &ReconcileConfig,
    dry_run: bool,
) -> ReconcileResult<DedupOutcome> {
    config.validate()?;
    let project_path = config.project_path(project_dir);
    let mut loaded = load_project(&project_path)?;

    let report = dedupe_document(&mut loaded.document)?;

    if dry_run {
        info!("[DEDUP] Dry run, {:?} left untouched", project_path);
        return Ok(DedupOutcome {
            project_path,
            backup_path: None,
            report,
        });
    }

    let backup = store::write_backup(&project_path, &loaded.raw, &config.dedup_backup_suffix)?;
    store::save_document(&project_path, &loaded.document)?;

    Ok(DedupOutcome {
        project_path,
        backup_path: Some(backup),
        report,
    })
}

/// Rebuild the shot-image mapping table of the project in `project_dir`
/// from its voice segments.
///
/// Parity between segments and mappings is checked twice: on the rebuilt
/// document before anything is written, and on the file as re-read after
/// the write. A failure of the second check is returned as
/// [`ReconcileError::ParityMismatch`] with the new file already in place.
pub fn run_remap(
    project_dir: &Path,
    config: &ReconcileConfig,
    dry_run: bool,
) -> ReconcileResult<RemapOutcome> {
    run_remap_at(project_dir, config, dry_run, &rebuild_timestamp())
}

/// [`run_remap`] with an explicit rebuild timestamp.
pub fn run_remap_at(
    project_dir: &Path,
    config: &ReconcileConfig,
    dry_run: bool,
    rebuilt_at: &str,
) -> ReconcileResult<RemapOutcome> {
    config.validate()?;
    let project_path = config.project_path(project_dir);
    let mut loaded = load_project(&project_path)?;

    let report = rebuild_shot_image_mappings(&mut loaded.document, config, rebuilt_at)?;
    if !report.parity_ok() {
        return Err(ReconcileError::ParityMismatch {
            segments: report.segment_count,
            mappings: report.mapping_count,
        });
    }

    if dry_run {
        info!("[REMAP] Dry run, {:?} left untouched", project_path);
        return Ok(RemapOutcome {
            project_path,
            backup_path: None,
            report,
        });
    }

    let backup = store::write_backup(&project_path, &loaded.raw, &config.remap_backup_suffix)?;
    store::save_document(&project_path, &loaded.document)?;

    let written = load_project(&project_path)?.document;
    let segments = written.voice_segments()?.len();
    let mappings = written.shot_image_mapping_count();
    if segments != mappings {
        error!(
            "[REMAP] ❌ Written file has {} voice segments but {} mappings",
            segments, mappings
        );
        return Err(ReconcileError::ParityMismatch { segments, mappings });
    }

    Ok(RemapOutcome {
        project_path,
        backup_path: Some(backup),
        report,
    })
}

pub fn run_analyze(project_dir: &Path, config: &ReconcileConfig) -> ReconcileResult<MismatchAnalysis> {
    let loaded = load_project(&config.project_path(project_dir))?;
    diagnose::analyze(&loaded.document)
}

pub fn run_validate(project_dir: &Path, config: &ReconcileConfig) -> ReconcileResult<ValidationReport> {
    let loaded = load_project(&config.project_path(project_dir))?;
    diagnose::validate(&loaded.document)
}

/// Look a shot up by any of its identifier forms.
pub fn run_resolve(
    project_dir: &Path,
    config: &ReconcileConfig,
    id: &str,
) -> ReconcileResult<Option<ShotIdentity>> {
    config.validate()?;
    let loaded = load_project(&config.project_path(project_dir))?;
    let count = loaded.document.voice_segments()?.len();
    let index = ShotIdIndex::positional(count, config.shots_per_scene);
    Ok(index.resolve(id).cloned())
}

/// Copy a backup back over the project file. Returns the backup used.
pub fn run_restore(
    project_dir: &Path,
    config: &ReconcileConfig,
    kind: BackupKind,
) -> ReconcileResult<PathBuf> {
    let project_path = config.project_path(project_dir);
    store::restore_backup(&project_path, kind.suffix(config))
}
