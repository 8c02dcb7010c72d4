// ShotSync Video Dedup
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Regenerating a shot appends another video record with the same shot id.
// Only the newest record per shot is kept; records with no shot id are
// orphans and are dropped.

use crate::error::ReconcileResult;
use crate::project::{ProjectDocument, VideoRecord};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Path and timestamp of one video record, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub video_path: Option<String>,
    pub created_time: String,
}

impl RecordSummary {
    fn of(record: &Value) -> Self {
        let view = VideoRecord(record);
        Self {
            video_path: view.video_path().map(str::to_string),
            created_time: view.created_time().to_string(),
        }
    }
}

/// A shot that had more than one video record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub shot_id: String,
    pub kept: RecordSummary,
    pub dropped: Vec<RecordSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupReport {
    pub original_count: usize,
    pub orphaned_count: usize,
    pub retained_count: usize,
    pub removed_duplicates: usize,
    pub groups: Vec<DuplicateGroup>,
}

impl DedupReport {
    pub fn unique_shots(&self) -> usize {
        self.retained_count
    }

    pub fn changed(&self) -> bool {
        self.orphaned_count > 0 || self.removed_duplicates > 0
    }
}

/// Keep the newest record per shot id and order the survivors by shot id.
///
/// Within a shot, records are compared by `created_time` as plain strings;
/// equal timestamps keep their original relative order, so the earliest of
/// them in the input wins.
pub fn dedupe_videos(videos: Vec<Value>) -> (Vec<Value>, DedupReport) {
    let mut report = DedupReport {
        original_count: videos.len(),
        ..Default::default()
    };

    let mut groups: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for video in videos {
        let shot_id = VideoRecord(&video).shot_id().map(str::to_string);
        match shot_id {
            Some(key) => groups.entry(key).or_default().push(video),
            None => report.orphaned_count += 1,
        }
    }

    let mut retained = Vec::with_capacity(groups.len());
    for (shot_id, mut records) in groups {
        if records.len() > 1 {
            records.sort_by(|a, b| {
                VideoRecord(b)
                    .created_time()
                    .cmp(VideoRecord(a).created_time())
            });

            let dropped: Vec<RecordSummary> = records[1..].iter().map(RecordSummary::of).collect();
            report.removed_duplicates += dropped.len();
            report.groups.push(DuplicateGroup {
                shot_id,
                kept: RecordSummary::of(&records[0]),
                dropped,
            });
        }

        if let Some(latest) = records.into_iter().next() {
            retained.push(latest);
        }
    }

    report.retained_count = retained.len();
    (retained, report)
}

/// Deduplicate the document's video section in place.
pub fn dedupe_document(document: &mut ProjectDocument) -> ReconcileResult<DedupReport> {
    let videos = document.videos_mut()?;
    let (retained, report) = dedupe_videos(std::mem::take(videos));
    *videos = retained;

    for group in &report.groups {
        debug!(
            "[DEDUP] Shot {}: keeping {:?}, dropping {}",
            group.shot_id,
            group.kept.video_path,
            group.dropped.len()
        );
    }
    info!(
        "[DEDUP] {} records -> {} shots ({} duplicates, {} orphans)",
        report.original_count, report.retained_count, report.removed_duplicates, report.orphaned_count
    );

    Ok(report)
}

/// Duplicate statistics without touching the records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoStats {
    pub records: usize,
    pub distinct_shots: usize,
    pub duplicated_shots: usize,
    pub duplicate_records: usize,
    pub orphaned: usize,
}

impl VideoStats {
    pub fn has_problems(&self) -> bool {
        self.duplicate_records > 0 || self.orphaned > 0
    }
}

pub fn video_stats(videos: &[Value]) -> VideoStats {
    let mut per_shot: BTreeMap<&str, usize> = BTreeMap::new();
    let mut orphaned = 0;

    for video in videos {
        match VideoRecord(video).shot_id() {
            Some(shot_id) => *per_shot.entry(shot_id).or_default() += 1,
            None => orphaned += 1,
        }
    }

    VideoStats {
        records: videos.len(),
        distinct_shots: per_shot.len(),
        duplicated_shots: per_shot.values().filter(|n| **n > 1).count(),
        duplicate_records: per_shot.values().map(|n| n - 1).sum(),
        orphaned,
    }
}
