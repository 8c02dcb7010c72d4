// ShotSync Diagnostics
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Read-only checks: what is out of sync before a remap, and whether a
// remapped document is consistent afterwards.

use crate::error::ReconcileResult;
use crate::project::{ProjectDocument, VoiceSegment};
use crate::reconcile::dedup::{video_stats, VideoStats};
use crate::shot_ids::{normalize_scene_id, TEXT_SEGMENT_PREFIX};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdFormatIssue {
    pub index: usize,
    pub scene_id: String,
    pub shot_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MismatchAnalysis {
    pub voice_segment_count: usize,
    pub mapping_count: usize,
    pub voice_ids: Vec<String>,
    pub missing_in_images: Vec<String>,
    pub missing_in_voice: Vec<String>,
    /// Segments already carrying `text_segment_` ids, which never match a
    /// mapping key directly.
    pub id_format_issues: Vec<IdFormatIssue>,
    /// `None` when the document has no video section.
    pub videos: Option<VideoStats>,
}

impl MismatchAnalysis {
    pub fn needs_remap(&self) -> bool {
        self.voice_segment_count != self.mapping_count
    }
}

pub fn analyze(document: &ProjectDocument) -> ReconcileResult<MismatchAnalysis> {
    let segments = document.voice_segments()?;
    let mapping_keys: BTreeSet<&str> = document
        .shot_image_mappings()
        .map(|m| m.keys().map(String::as_str).collect())
        .unwrap_or_default();

    let voice_ids: Vec<String> = segments
        .iter()
        .map(|s| VoiceSegment(s).composite_id())
        .collect();
    let voice_set: BTreeSet<&str> = voice_ids.iter().map(String::as_str).collect();

    let id_format_issues = segments
        .iter()
        .enumerate()
        .filter_map(|(index, s)| {
            let segment = VoiceSegment(s);
            segment
                .shot_id()
                .starts_with(TEXT_SEGMENT_PREFIX)
                .then(|| IdFormatIssue {
                    index,
                    scene_id: segment.scene_id().to_string(),
                    shot_id: segment.shot_id().to_string(),
                })
        })
        .collect();

    let missing_in_images: Vec<String> = voice_set
        .difference(&mapping_keys)
        .map(|s| s.to_string())
        .collect();
    let missing_in_voice: Vec<String> = mapping_keys
        .difference(&voice_set)
        .map(|s| s.to_string())
        .collect();

    Ok(MismatchAnalysis {
        voice_segment_count: segments.len(),
        mapping_count: mapping_keys.len(),
        missing_in_images,
        missing_in_voice,
        voice_ids,
        id_format_issues,
        videos: document.videos().ok().map(|v| video_stats(v)),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub voice_segment_count: usize,
    pub mapping_count: usize,
    pub all_voice_have_images: bool,
    pub id_format_correct: bool,
    pub missing_mappings: Vec<String>,
}

impl ValidationReport {
    pub fn parity_ok(&self) -> bool {
        self.voice_segment_count == self.mapping_count
    }

    pub fn is_valid(&self) -> bool {
        self.all_voice_have_images && self.id_format_correct && self.parity_ok()
    }
}

/// Check every segment has the mapping its scene position implies and
/// carries a `text_segment_` id.
pub fn validate(document: &ProjectDocument) -> ReconcileResult<ValidationReport> {
    let segments = document.voice_segments()?;
    let mappings = document.shot_image_mappings();

    let mut report = ValidationReport {
        voice_segment_count: segments.len(),
        mapping_count: document.shot_image_mapping_count(),
        all_voice_have_images: true,
        id_format_correct: true,
        missing_mappings: Vec::new(),
    };

    let mut position_in_scene: HashMap<String, usize> = HashMap::new();
    for s in segments {
        let segment = VoiceSegment(s);
        let scene_id = normalize_scene_id(segment.scene_id());
        let position = position_in_scene.entry(scene_id.clone()).or_default();
        *position += 1;

        let expected = format!("{}_shot_{}", scene_id, position);
        if !mappings.map(|m| m.contains_key(&expected)).unwrap_or(false) {
            report.all_voice_have_images = false;
            report.missing_mappings.push(expected);
        }

        if !segment.shot_id().starts_with(TEXT_SEGMENT_PREFIX) {
            report.id_format_correct = false;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconcileConfig;
    use crate::reconcile::voice_mapping::rebuild_shot_image_mappings;
    use serde_json::json;

    fn mismatched_document() -> ProjectDocument {
        ProjectDocument::from_value(json!({
            "voice_generation": {"voice_segments": [
                {"scene_id": "scene_1", "shot_id": "shot_1"},
                {"scene_id": "scene_1", "shot_id": "shot_2"},
                {"scene_id": "scene_1", "shot_id": "text_segment_003"}
            ]},
            "shot_image_mappings": {
                "scene_1_shot_1": {},
                "scene_2_shot_1": {}
            },
            "video_generation": {"videos": [
                {"shot_id": "A"}, {"shot_id": "A"}
            ]}
        }))
        .unwrap()
    }

    #[test]
    fn test_analyze_reports_both_sides() {
        let analysis = analyze(&mismatched_document()).unwrap();

        assert_eq!(analysis.voice_segment_count, 3);
        assert_eq!(analysis.mapping_count, 2);
        assert!(analysis.needs_remap());
        assert_eq!(
            analysis.missing_in_images,
            vec!["scene_1_shot_2", "scene_1_text_segment_003"]
        );
        assert_eq!(analysis.missing_in_voice, vec!["scene_2_shot_1"]);
        assert_eq!(analysis.id_format_issues.len(), 1);
        assert_eq!(analysis.id_format_issues[0].index, 2);
        assert_eq!(analysis.videos.unwrap().duplicate_records, 1);
    }

    #[test]
    fn test_validate_before_and_after_remap() {
        let mut doc = mismatched_document();
        let before = validate(&doc).unwrap();
        assert!(!before.is_valid());
        assert!(!before.id_format_correct);
        assert_eq!(before.missing_mappings, vec!["scene_1_shot_2", "scene_1_shot_3"]);

        rebuild_shot_image_mappings(&mut doc, &ReconcileConfig::default(), "t").unwrap();
        let after = validate(&doc).unwrap();
        assert!(after.is_valid(), "{:?}", after);
    }

    #[test]
    fn test_validate_after_remap_with_custom_scene_size() {
        let segments: Vec<_> = (0..11).map(|_| json!({})).collect();
        let mut doc =
            ProjectDocument::from_value(json!({"voice_generation": {"voice_segments": segments}}))
                .unwrap();
        let config = ReconcileConfig {
            shots_per_scene: 5,
            ..Default::default()
        };
        rebuild_shot_image_mappings(&mut doc, &config, "t").unwrap();
        assert!(validate(&doc).unwrap().is_valid());
    }
}
