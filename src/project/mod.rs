// ShotSync Project Document
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// The project document is kept as raw JSON so that every section the
// reconciler does not own survives a rewrite untouched, key order included.
// Typed views exist only for the records the reconciler actually reads.

pub mod store;

use crate::error::{ReconcileError, ReconcileResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const VIDEO_SECTION: &str = "video_generation";
pub const VIDEOS_KEY: &str = "videos";
pub const VOICE_SECTION: &str = "voice_generation";
pub const VOICE_SEGMENTS_KEY: &str = "voice_segments";
pub const MAPPINGS_KEY: &str = "shot_image_mappings";

const VIDEOS_LABEL: &str = "video_generation.videos";
const VOICE_SEGMENTS_LABEL: &str = "voice_generation.voice_segments";

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDocument {
    root: Map<String, Value>,
}

impl ProjectDocument {
    pub fn from_value(value: Value) -> ReconcileResult<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(ReconcileError::MissingSection("<root object>")),
        }
    }

    pub fn parse(json: &str) -> ReconcileResult<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    pub fn parse_slice(bytes: &[u8]) -> ReconcileResult<Self> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// Two-space indented JSON with non-ASCII left unescaped.
    pub fn to_pretty_string(&self) -> ReconcileResult<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    pub fn videos(&self) -> ReconcileResult<&Vec<Value>> {
        self.root
            .get(VIDEO_SECTION)
            .and_then(|section| section.get(VIDEOS_KEY))
            .and_then(Value::as_array)
            .ok_or(ReconcileError::MissingSection(VIDEOS_LABEL))
    }

    pub fn videos_mut(&mut self) -> ReconcileResult<&mut Vec<Value>> {
        self.root
            .get_mut(VIDEO_SECTION)
            .and_then(|section| section.get_mut(VIDEOS_KEY))
            .and_then(Value::as_array_mut)
            .ok_or(ReconcileError::MissingSection(VIDEOS_LABEL))
    }

    pub fn voice_segments(&self) -> ReconcileResult<&Vec<Value>> {
        self.root
            .get(VOICE_SECTION)
            .and_then(|section| section.get(VOICE_SEGMENTS_KEY))
            .and_then(Value::as_array)
            .ok_or(ReconcileError::MissingSection(VOICE_SEGMENTS_LABEL))
    }

    pub fn voice_segments_mut(&mut self) -> ReconcileResult<&mut Vec<Value>> {
        self.root
            .get_mut(VOICE_SECTION)
            .and_then(|section| section.get_mut(VOICE_SEGMENTS_KEY))
            .and_then(Value::as_array_mut)
            .ok_or(ReconcileError::MissingSection(VOICE_SEGMENTS_LABEL))
    }

    /// The mapping table, if the document has one. A missing table reads as
    /// empty everywhere it is consumed.
    pub fn shot_image_mappings(&self) -> Option<&Map<String, Value>> {
        self.root.get(MAPPINGS_KEY).and_then(Value::as_object)
    }

    pub fn shot_image_mapping_count(&self) -> usize {
        self.shot_image_mappings().map(Map::len).unwrap_or(0)
    }

    pub fn set_shot_image_mappings(&mut self, mappings: Map<String, Value>) {
        self.root
            .insert(MAPPINGS_KEY.to_string(), Value::Object(mappings));
    }
}

/// Read-only view over one raw video record.
#[derive(Debug, Clone, Copy)]
pub struct VideoRecord<'a>(pub &'a Value);

impl<'a> VideoRecord<'a> {
    /// The shot this video belongs to. Empty or non-string ids read as `None`.
    pub fn shot_id(&self) -> Option<&'a str> {
        self.0
            .get("shot_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Creation timestamp, empty when absent so it sorts oldest.
    pub fn created_time(&self) -> &'a str {
        self.0
            .get("created_time")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn video_path(&self) -> Option<&'a str> {
        self.0.get("video_path").and_then(Value::as_str)
    }
}

/// Read-only view over one raw voice segment.
#[derive(Debug, Clone, Copy)]
pub struct VoiceSegment<'a>(pub &'a Value);

impl<'a> VoiceSegment<'a> {
    pub fn scene_id(&self) -> &'a str {
        self.0.get("scene_id").and_then(Value::as_str).unwrap_or("")
    }

    pub fn shot_id(&self) -> &'a str {
        self.0.get("shot_id").and_then(Value::as_str).unwrap_or("")
    }

    /// `{scene_id}_{shot_id}` as the image side would look it up.
    pub fn composite_id(&self) -> String {
        format!("{}_{}", self.scene_id(), self.shot_id())
    }
}

/// One entry of the shot-image mapping table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotImageMapping {
    pub scene_id: String,
    pub shot_id: String,
    pub scene_name: String,
    pub shot_name: String,
    pub sequence: String,
    #[serde(default)]
    pub main_image_path: String,
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub generated_images: Vec<String>,
    #[serde(default)]
    pub current_image_index: usize,
    pub status: String,
    pub updated_time: String,
}

/// Whether a raw mapping entry references any generated image.
pub fn mapping_has_images(entry: &Value) -> bool {
    let non_empty = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    };
    let has_generated = entry
        .get("generated_images")
        .and_then(Value::as_array)
        .map(|images| !images.is_empty())
        .unwrap_or(false);

    has_generated || non_empty("main_image_path") || non_empty("image_path")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_video_section() {
        let doc = ProjectDocument::parse(r#"{"project_name": "x"}"#).unwrap();
        assert!(matches!(
            doc.videos(),
            Err(ReconcileError::MissingSection("video_generation.videos"))
        ));
    }

    #[test]
    fn test_non_object_root_rejected() {
        assert!(ProjectDocument::parse("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_key_order_and_unicode_survive() {
        let raw = "{\n  \"zeta\": 1,\n  \"alpha\": \"小猫吃饭\"\n}";
        let doc = ProjectDocument::parse(raw).unwrap();
        assert_eq!(doc.to_pretty_string().unwrap(), raw);
    }

    #[test]
    fn test_video_record_view() {
        let record = json!({"shot_id": "", "created_time": "2025-01-01"});
        assert_eq!(VideoRecord(&record).shot_id(), None);

        let numeric = json!({"shot_id": 7});
        assert_eq!(VideoRecord(&numeric).shot_id(), None);
        assert_eq!(VideoRecord(&numeric).created_time(), "");
    }

    #[test]
    fn test_mapping_has_images() {
        assert!(!mapping_has_images(&json!({"generated_images": [], "image_path": ""})));
        assert!(mapping_has_images(&json!({"generated_images": ["a.png"]})));
        assert!(mapping_has_images(&json!({"main_image_path": "a.png"})));
    }
}
