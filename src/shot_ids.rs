// ShotSync Shot Identifiers
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// The pipeline names the same shot three ways: a unified key
// (`scene_2_shot_1`), a text-segment id (`text_segment_004`) and a bare
// 1-based global index. Scenes are derived purely from position.

use std::fmt;

pub const TEXT_SEGMENT_PREFIX: &str = "text_segment_";
const SCENE_PREFIX: &str = "scene_";
const SHOT_INFIX: &str = "_shot_";
const SHOT_LABEL_PREFIX: &str = "镜头";

/// Composite scene+shot key, both numbers 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShotKey {
    pub scene: usize,
    pub shot: usize,
}

impl ShotKey {
    /// Key for the segment at zero-based `index` when every scene holds
    /// `shots_per_scene` segments.
    pub fn from_position(index: usize, shots_per_scene: usize) -> Self {
        let per_scene = shots_per_scene.max(1);
        Self {
            scene: index / per_scene + 1,
            shot: index % per_scene + 1,
        }
    }

    pub fn scene_id(&self) -> String {
        format!("{}{}", SCENE_PREFIX, self.scene)
    }

    pub fn shot_id(&self) -> String {
        format!("shot_{}", self.shot)
    }

    pub fn sequence(&self) -> String {
        format!("{}-{}", self.scene, self.shot)
    }

    /// Parse `scene_N_shot_M`.
    pub fn parse(raw: &str) -> Option<Self> {
        let rest = raw.trim().strip_prefix(SCENE_PREFIX)?;
        let (scene, shot) = rest.split_once(SHOT_INFIX)?;
        let scene: usize = parse_positive(scene)?;
        let shot: usize = parse_positive(shot)?;
        Some(Self { scene, shot })
    }
}

impl fmt::Display for ShotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", SCENE_PREFIX, self.scene, SHOT_INFIX, self.shot)
    }
}

/// `text_segment_NNN` for a 1-based global index.
pub fn text_segment_id(global_index: usize) -> String {
    format!("{}{:03}", TEXT_SEGMENT_PREFIX, global_index)
}

pub fn parse_text_segment_id(raw: &str) -> Option<usize> {
    parse_positive(raw.trim().strip_prefix(TEXT_SEGMENT_PREFIX)?)
}

/// Bring a free-form scene id into `scene_N` form. Falls back to the first
/// run of digits, then to `scene_1`.
pub fn normalize_scene_id(raw: &str) -> String {
    format!("{}{}", SCENE_PREFIX, scene_number(raw))
}

pub fn scene_number(raw: &str) -> usize {
    let raw = raw.trim();
    if let Some(n) = raw.strip_prefix(SCENE_PREFIX).and_then(parse_positive) {
        return n;
    }
    first_digit_run(raw)
        .and_then(parse_positive)
        .unwrap_or(1)
}

fn first_digit_run(raw: &str) -> Option<&str> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let tail = &raw[start..];
    let end = tail
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(tail.len());
    Some(&tail[..end])
}

fn parse_positive(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok().filter(|n| *n > 0)
}

/// Every name one shot goes by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotIdentity {
    pub global_index: usize,
    pub key: ShotKey,
    pub text_segment_id: String,
}

impl ShotIdentity {
    pub fn unified_key(&self) -> String {
        self.key.to_string()
    }
}

/// Conversion table between the identifier formats for a run of voice
/// segments laid out positionally.
#[derive(Debug, Clone, Default)]
pub struct ShotIdIndex {
    identities: Vec<ShotIdentity>,
}

impl ShotIdIndex {
    pub fn positional(segment_count: usize, shots_per_scene: usize) -> Self {
        let identities = (0..segment_count)
            .map(|i| ShotIdentity {
                global_index: i + 1,
                key: ShotKey::from_position(i, shots_per_scene),
                text_segment_id: text_segment_id(i + 1),
            })
            .collect();
        Self { identities }
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShotIdentity> {
        self.identities.iter()
    }

    /// Number of distinct scenes covered by the index.
    pub fn scene_count(&self) -> usize {
        self.identities.last().map(|id| id.key.scene).unwrap_or(0)
    }

    /// Look a shot up by any of its names: `text_segment_NNN`,
    /// `scene_N_shot_M`, `镜头N` or a bare global index.
    pub fn resolve(&self, raw: &str) -> Option<&ShotIdentity> {
        let raw = raw.trim();

        if let Some(key) = ShotKey::parse(raw) {
            return self.identities.iter().find(|id| id.key == key);
        }

        let global_index = parse_text_segment_id(raw)
            .or_else(|| raw.strip_prefix(SHOT_LABEL_PREFIX).and_then(parse_positive))
            .or_else(|| parse_positive(raw))?;

        self.identities.get(global_index - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_layout() {
        assert_eq!(ShotKey::from_position(0, 3), ShotKey { scene: 1, shot: 1 });
        assert_eq!(ShotKey::from_position(2, 3), ShotKey { scene: 1, shot: 3 });
        assert_eq!(ShotKey::from_position(3, 3), ShotKey { scene: 2, shot: 1 });
        assert_eq!(ShotKey::from_position(34, 3), ShotKey { scene: 12, shot: 2 });
        assert_eq!(ShotKey::from_position(9, 4), ShotKey { scene: 3, shot: 2 });
    }

    #[test]
    fn test_key_display_and_parse() {
        let key = ShotKey { scene: 12, shot: 2 };
        assert_eq!(key.to_string(), "scene_12_shot_2");
        assert_eq!(ShotKey::parse("scene_12_shot_2"), Some(key));
        assert_eq!(key.sequence(), "12-2");
        assert_eq!(ShotKey::parse("scene_0_shot_1"), None);
        assert_eq!(ShotKey::parse("scene_1_shot_x"), None);
        assert_eq!(ShotKey::parse("shot_1"), None);
    }

    #[test]
    fn test_text_segment_ids() {
        assert_eq!(text_segment_id(1), "text_segment_001");
        assert_eq!(text_segment_id(1234), "text_segment_1234");
        assert_eq!(parse_text_segment_id("text_segment_035"), Some(35));
        assert_eq!(parse_text_segment_id("text_segment_"), None);
    }

    #[test]
    fn test_normalize_scene_id() {
        assert_eq!(normalize_scene_id("scene_4"), "scene_4");
        assert_eq!(normalize_scene_id("场景7"), "scene_7");
        assert_eq!(normalize_scene_id("Scene 12 (night)"), "scene_12");
        assert_eq!(normalize_scene_id(""), "scene_1");
        assert_eq!(normalize_scene_id("intro"), "scene_1");
    }

    #[test]
    fn test_index_resolves_every_format() {
        let index = ShotIdIndex::positional(35, 3);
        assert_eq!(index.len(), 35);
        assert_eq!(index.scene_count(), 12);

        let by_segment = index.resolve("text_segment_005").unwrap();
        assert_eq!(by_segment.unified_key(), "scene_2_shot_2");

        let by_key = index.resolve("scene_2_shot_2").unwrap();
        assert_eq!(by_key.text_segment_id, "text_segment_005");

        assert_eq!(index.resolve("镜头5").unwrap().global_index, 5);
        assert_eq!(index.resolve("5").unwrap().global_index, 5);
    }

    #[test]
    fn test_index_rejects_out_of_range() {
        let index = ShotIdIndex::positional(4, 3);
        assert!(index.resolve("text_segment_005").is_none());
        assert!(index.resolve("scene_2_shot_2").is_none());
        assert!(index.resolve("0").is_none());
        assert!(index.resolve("nonsense").is_none());
    }
}
