// ShotSync Project Scanner
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Walks an output root for project documents and summarises which ones
// carry duplicate videos or an out-of-sync mapping table.

use crate::error::{ReconcileError, ReconcileResult};
use crate::project::store::load_project;
use crate::reconcile::dedup::{video_stats, VideoStats};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub path: PathBuf,
    /// `None` when the document has no video section.
    pub videos: Option<VideoStats>,
    /// `None` when the document has no voice section.
    pub voice_segments: Option<usize>,
    pub mappings: usize,
}

impl ProjectSummary {
    pub fn parity_ok(&self) -> bool {
        self.voice_segments
            .map(|count| count == self.mappings)
            .unwrap_or(true)
    }

    pub fn needs_attention(&self) -> bool {
        let dirty_videos = self.videos.map(|v| v.has_problems()).unwrap_or(false);
        dirty_videos || !self.parity_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEntry {
    Project(ProjectSummary),
    Unreadable { path: PathBuf, reason: String },
}

impl ScanEntry {
    pub fn path(&self) -> &Path {
        match self {
            ScanEntry::Project(summary) => &summary.path,
            ScanEntry::Unreadable { path, .. } => path,
        }
    }
}

pub fn summarize_project(path: &Path) -> ReconcileResult<ProjectSummary> {
    let loaded = load_project(path)?;
    let document = &loaded.document;
    Ok(ProjectSummary {
        path: path.to_path_buf(),
        videos: document.videos().ok().map(|v| video_stats(v)),
        voice_segments: document.voice_segments().ok().map(Vec::len),
        mappings: document.shot_image_mapping_count(),
    })
}

/// Find every file called `project_file` under `root`, at most `max_depth`
/// levels down, in file-name order.
pub fn scan_projects(
    root: &Path,
    project_file: &str,
    max_depth: usize,
) -> ReconcileResult<Vec<ScanEntry>> {
    if !root.is_dir() {
        return Err(ReconcileError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "output root is not a directory"),
        ));
    }

    info!("[SCAN] Scanning {:?} (depth {})", root, max_depth);
    let mut entries = Vec::new();

    for entry in WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("[SCAN] Skipping unreadable path: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.file_name() != project_file {
            continue;
        }

        let path = entry.into_path();
        match summarize_project(&path) {
            Ok(summary) => entries.push(ScanEntry::Project(summary)),
            Err(e) => {
                warn!("[SCAN] ⚠️ {:?}: {}", path, e);
                entries.push(ScanEntry::Unreadable {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!("[SCAN] Found {} project files", entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_project(root: &Path, name: &str, body: &str) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("project.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_scan_finds_and_classifies_projects() {
        let root = TempDir::new().unwrap();
        write_project(
            root.path(),
            "a_clean",
            r#"{"video_generation": {"videos": [{"shot_id": "A"}]},
                "voice_generation": {"voice_segments": [{}]},
                "shot_image_mappings": {"scene_1_shot_1": {}}}"#,
        );
        write_project(
            root.path(),
            "b_dirty",
            r#"{"video_generation": {"videos": [{"shot_id": "A"}, {"shot_id": "A"}]}}"#,
        );
        write_project(root.path(), "c_broken", "{not json");
        fs::write(root.path().join("notes.json"), "{}").unwrap();

        let entries = scan_projects(root.path(), "project.json", 3).unwrap();
        assert_eq!(entries.len(), 3);

        match &entries[0] {
            ScanEntry::Project(summary) => assert!(!summary.needs_attention()),
            other => panic!("unexpected entry {:?}", other),
        }
        match &entries[1] {
            ScanEntry::Project(summary) => {
                assert!(summary.needs_attention());
                assert_eq!(summary.voice_segments, None);
            }
            other => panic!("unexpected entry {:?}", other),
        }
        assert!(matches!(entries[2], ScanEntry::Unreadable { .. }));
    }

    #[test]
    fn test_scan_respects_depth() {
        let root = TempDir::new().unwrap();
        write_project(&root.path().join("deep/er"), "nested", "{}");
        let entries = scan_projects(root.path(), "project.json", 2).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_scan_missing_root() {
        let root = TempDir::new().unwrap();
        assert!(scan_projects(&root.path().join("absent"), "project.json", 3).is_err());
    }
}
