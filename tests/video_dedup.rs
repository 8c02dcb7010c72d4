use serde_json::{json, Value};
use shotsync_core::project::store::load_project;
use shotsync_core::reconcile::{run_dedupe, run_restore, BackupKind};
use shotsync_core::{ReconcileConfig, ReconcileError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_project(dir: &Path, value: &Value) -> String {
    let raw = serde_json::to_string_pretty(value).unwrap();
    fs::write(dir.join("project.json"), &raw).unwrap();
    raw
}

fn sample_project() -> Value {
    json!({
        "project_name": "小猫吃饭",
        "video_generation": {
            "settings": {"engine": "cogvideox"},
            "videos": [
                {"shot_id": "shot_1", "video_path": "v/a1.mp4", "created_time": "2025-07-08T10:00:00"},
                {"shot_id": "shot_1", "video_path": "v/a2.mp4", "created_time": "2025-07-08T12:00:00"},
                {"shot_id": "shot_2", "video_path": "v/b1.mp4", "created_time": "2025-07-08T11:00:00"},
                {"shot_id": "shot_1", "video_path": "v/a3.mp4", "created_time": "2025-07-08T11:00:00"},
                {"shot_id": "shot_3", "video_path": "v/c1.mp4", "created_time": "2025-07-08T09:00:00"},
                {"shot_id": "", "video_path": "v/orphan.mp4", "created_time": "2025-07-09T00:00:00"}
            ]
        }
    })
}

fn video_paths(dir: &Path) -> Vec<String> {
    let loaded = load_project(&dir.join("project.json")).unwrap();
    loaded
        .document
        .videos()
        .unwrap()
        .iter()
        .map(|v| v["video_path"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_dedupe_keeps_latest_and_sorts() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), &sample_project());

    let outcome = run_dedupe(dir.path(), &ReconcileConfig::default(), false).unwrap();

    assert_eq!(outcome.report.original_count, 6);
    assert_eq!(outcome.report.retained_count, 3);
    assert_eq!(outcome.report.removed_duplicates, 2);
    assert_eq!(outcome.report.orphaned_count, 1);
    assert_eq!(video_paths(dir.path()), vec!["v/a2.mp4", "v/b1.mp4", "v/c1.mp4"]);
}

#[test]
fn test_backup_holds_pre_run_content() {
    let dir = TempDir::new().unwrap();
    let original = write_project(dir.path(), &sample_project());

    let outcome = run_dedupe(dir.path(), &ReconcileConfig::default(), false).unwrap();

    let backup = outcome.backup_path.unwrap();
    assert_eq!(backup, dir.path().join("project.json.backup_before_clean"));
    assert_eq!(fs::read_to_string(&backup).unwrap(), original);
}

#[test]
fn test_unrelated_content_survives() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), &sample_project());
    run_dedupe(dir.path(), &ReconcileConfig::default(), false).unwrap();

    let text = fs::read_to_string(dir.path().join("project.json")).unwrap();
    assert!(text.contains("\"project_name\": \"小猫吃饭\""), "non-ASCII must stay unescaped");
    assert!(text.find("project_name").unwrap() < text.find("video_generation").unwrap());
    assert!(text.contains("\"engine\": \"cogvideox\""));
}

#[test]
fn test_second_run_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), &sample_project());
    let config = ReconcileConfig::default();

    run_dedupe(dir.path(), &config, false).unwrap();
    let after_first = fs::read_to_string(dir.path().join("project.json")).unwrap();

    let second = run_dedupe(dir.path(), &config, false).unwrap();
    let after_second = fs::read_to_string(dir.path().join("project.json")).unwrap();

    assert!(!second.report.changed());
    assert_eq!(after_first, after_second);
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let original = write_project(dir.path(), &sample_project());

    let outcome = run_dedupe(dir.path(), &ReconcileConfig::default(), true).unwrap();

    assert_eq!(outcome.report.retained_count, 3);
    assert!(outcome.backup_path.is_none());
    assert!(!dir.path().join("project.json.backup_before_clean").exists());
    assert_eq!(fs::read_to_string(dir.path().join("project.json")).unwrap(), original);
}

#[test]
fn test_missing_project_file() {
    let dir = TempDir::new().unwrap();
    let result = run_dedupe(dir.path(), &ReconcileConfig::default(), false);
    assert!(matches!(result, Err(ReconcileError::ProjectNotFound(_))));
}

#[test]
fn test_missing_video_section_mutates_nothing() {
    let dir = TempDir::new().unwrap();
    let original = write_project(dir.path(), &json!({"project_name": "x"}));

    let result = run_dedupe(dir.path(), &ReconcileConfig::default(), false);

    assert!(matches!(result, Err(ReconcileError::MissingSection(_))));
    assert!(!dir.path().join("project.json.backup_before_clean").exists());
    assert_eq!(fs::read_to_string(dir.path().join("project.json")).unwrap(), original);
}

#[test]
fn test_restore_undoes_dedupe() {
    let dir = TempDir::new().unwrap();
    let original = write_project(dir.path(), &sample_project());
    let config = ReconcileConfig::default();

    run_dedupe(dir.path(), &config, false).unwrap();
    run_restore(dir.path(), &config, BackupKind::Dedupe).unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("project.json")).unwrap(), original);
}
