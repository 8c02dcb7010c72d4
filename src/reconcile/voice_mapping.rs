// ShotSync Voice → Image Remap
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Rebuilds the shot-image mapping table from the ordered voice segments.
// The old table is discarded, not merged: scene and shot numbers come from
// segment position alone.

use crate::config::ReconcileConfig;
use crate::error::{ReconcileError, ReconcileResult};
use crate::project::{mapping_has_images, ProjectDocument, ShotImageMapping};
use crate::shot_ids::{ShotIdIndex, ShotIdentity};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

const VOICE_SEGMENTS_SECTION: &str = "voice_generation.voice_segments";

#[derive(Debug, Clone, Default)]
pub struct RemapReport {
    pub segment_count: usize,
    pub scene_count: usize,
    pub previous_mapping_count: usize,
    /// Entries of the old table that referenced generated images.
    pub discarded_with_images: usize,
    pub mapping_count: usize,
    pub index: ShotIdIndex,
}

impl RemapReport {
    pub fn parity_ok(&self) -> bool {
        self.segment_count == self.mapping_count
    }
}

/// Local time in the same shape the pipeline writes elsewhere.
pub fn rebuild_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

fn fresh_mapping(identity: &ShotIdentity, status: &str, rebuilt_at: &str) -> ShotImageMapping {
    let key = identity.key;
    ShotImageMapping {
        scene_id: key.scene_id(),
        shot_id: key.shot_id(),
        scene_name: format!("场景{}", key.scene),
        shot_name: format!("镜头{}", key.shot),
        sequence: key.sequence(),
        main_image_path: String::new(),
        image_path: String::new(),
        generated_images: Vec::new(),
        current_image_index: 0,
        status: status.to_string(),
        updated_time: rebuilt_at.to_string(),
    }
}

/// Renumber every voice segment by position and replace the mapping table
/// with one pending entry per segment.
pub fn rebuild_shot_image_mappings(
    document: &mut ProjectDocument,
    config: &ReconcileConfig,
    rebuilt_at: &str,
) -> ReconcileResult<RemapReport> {
    config.validate()?;

    let segment_count = {
        let segments = document.voice_segments()?;
        if let Some(index) = segments.iter().position(|s| !s.is_object()) {
            return Err(ReconcileError::MalformedRecord {
                section: VOICE_SEGMENTS_SECTION,
                index,
                reason: "voice segment is not an object".to_string(),
            });
        }
        segments.len()
    };

    let (previous_mapping_count, discarded_with_images) = document
        .shot_image_mappings()
        .map(|old| (old.len(), old.values().filter(|e| mapping_has_images(e)).count()))
        .unwrap_or((0, 0));

    let index = ShotIdIndex::positional(segment_count, config.shots_per_scene);

    let segments = document.voice_segments_mut()?;
    for (segment, identity) in segments.iter_mut().zip(index.iter()) {
        if let Some(fields) = segment.as_object_mut() {
            fields.insert("scene_id".to_string(), Value::String(identity.key.scene_id()));
            fields.insert(
                "shot_id".to_string(),
                Value::String(identity.text_segment_id.clone()),
            );
        }
        debug!(
            "[REMAP] Shot {}: {} -> {}",
            identity.global_index,
            identity.text_segment_id,
            identity.unified_key()
        );
    }

    let mut mappings = Map::new();
    for identity in index.iter() {
        let entry = fresh_mapping(identity, &config.pending_status, rebuilt_at);
        mappings.insert(identity.unified_key(), serde_json::to_value(entry)?);
    }
    let mapping_count = mappings.len();
    document.set_shot_image_mappings(mappings);

    if discarded_with_images > 0 {
        warn!(
            "[REMAP] ⚠️ Discarded {} mapping entries that referenced generated images",
            discarded_with_images
        );
    }
    info!(
        "[REMAP] {} voice segments -> {} mappings across {} scenes",
        segment_count,
        mapping_count,
        index.scene_count()
    );

    Ok(RemapReport {
        segment_count,
        scene_count: index.scene_count(),
        previous_mapping_count,
        discarded_with_images,
        mapping_count,
        index,
    })
}
