//! Core data model for map generation: node inputs, distance buckets,
//! signal buckets, positioned nodes, and user preferences.
//!
//! Wire format is camelCase JSON throughout (`mapId`, `observationText`,
//! `basis.facebookSignals`, …) so a serialized [`GeneratedMap`] can be handed
//! directly to a rendering client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Distance buckets
// =============================================================================

/// Qualitative distance of a node from the center.
///
/// The `Ord` derive (near < mid < far) exists for layout-radius purposes only;
/// no other semantic comparison should be built on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceBucket {
    Near,
    Mid,
    Far,
}

impl DistanceBucket {
    /// Fixed display color for this bucket (hex RGB).
    pub fn color(self) -> &'static str {
        match self {
            Self::Near => "#FF6B6B",
            Self::Mid => "#4ECDC4",
            Self::Far => "#95A5A6",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Near => "near",
            Self::Mid => "mid",
            Self::Far => "far",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "near" => Some(Self::Near),
            "mid" => Some(Self::Mid),
            "far" => Some(Self::Far),
            _ => None,
        }
    }
}

// =============================================================================
// Signal buckets
// =============================================================================

/// Coarse level for a single engagement metric. Raw counts never appear
/// anywhere in the model; this vocabulary is as precise as it gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

/// Coarse level for overall activity volume. Distinct from [`Level`] because
/// the wire vocabulary differs (`moderate`, not `medium`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeLevel {
    Low,
    Moderate,
    High,
}

/// Bucketed engagement signals for one user.
///
/// Produced by [`crate::signals::bucketize`] from raw counts, or substituted
/// wholesale by [`SignalBucket::default`] when no social-data connection
/// exists. The default is documented fallback behavior, not an incidental
/// zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalBucket {
    pub activity_volume: VolumeLevel,
    pub reaction_count: Level,
    pub comment_count: Level,
    pub post_count: Level,
}

impl Default for SignalBucket {
    /// The documented no-connection fallback: moderate volume, medium counts.
    fn default() -> Self {
        Self {
            activity_volume: VolumeLevel::Moderate,
            reaction_count: Level::Medium,
            comment_count: Level::Medium,
            post_count: Level::Medium,
        }
    }
}

// =============================================================================
// Node inputs
// =============================================================================

/// Caller-supplied description of one relationship node. Immutable once
/// submitted to a generation call; `id` must be unique within one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInput {
    pub id: String,
    /// Default display string.
    pub label: String,
    /// User override for `label`, preserved across regenerations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
    /// Explicit distance hint. Authoritative when present: signals and
    /// randomness never override it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_hint: Option<DistanceBucket>,
}

impl NodeInput {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            custom_label: None,
            user_hint: None,
        }
    }
}

/// Default label set substituted when a generation call receives no nodes.
pub const DEFAULT_LABELS: [&str; 4] = ["家族", "友達", "職場", "最近よく見かける人"];

// =============================================================================
// Generated maps
// =============================================================================

/// Pixel position plus the distance bucket it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub distance: DistanceBucket,
}

/// One placed, colored, captioned node of a generated map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
    pub position: Position,
    /// Hex RGB string, fixed per distance bucket.
    pub color: String,
    pub observation_text: String,
}

/// Which data sources contributed to a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapBasis {
    /// True iff bucketed social signals were available for this generation.
    pub facebook_signals: bool,
    /// True iff at least one input node carried an explicit distance hint.
    pub user_hints: bool,
    /// True iff positional jitter was applied.
    pub random_jitter: bool,
}

/// One complete generated map. Immutable after creation: refreshing produces
/// a brand-new map with a fresh `map_id`, never an in-place mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMap {
    pub map_id: String,
    pub generated_at: DateTime<Utc>,
    /// Node order equals input order; angular placement depends on it.
    pub nodes: Vec<PositionedNode>,
    pub basis: MapBasis,
}

// =============================================================================
// Preferences
// =============================================================================

/// How often a cached map should be refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateFrequency {
    Startup,
    Daily,
    Manual,
}

/// Rendering emphasis chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    Minimal,
    LabelEmphasis,
}

/// Node-count caps offered to users.
pub const ALLOWED_MAX_NODES: [u8; 3] = [6, 9, 12];

/// Per-user preferences governing map generation and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Node-count cap; one of [`ALLOWED_MAX_NODES`].
    pub max_nodes: u8,
    pub update_frequency: UpdateFrequency,
    pub display_mode: DisplayMode,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            max_nodes: 12,
            update_frequency: UpdateFrequency::Daily,
            display_mode: DisplayMode::Minimal,
        }
    }
}

/// Partial preference update. `None` fields keep their stored value;
/// merge is last-write-wins per field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_frequency: Option<UpdateFrequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<DisplayMode>,
}

impl UserPreferences {
    /// Apply a patch field-by-field, returning the merged record.
    pub fn merged(self, patch: PreferencePatch) -> Self {
        Self {
            max_nodes: patch.max_nodes.unwrap_or(self.max_nodes),
            update_frequency: patch.update_frequency.unwrap_or(self.update_frequency),
            display_mode: patch.display_mode.unwrap_or(self.display_mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_bucket_round_trips_through_str() {
        for bucket in [DistanceBucket::Near, DistanceBucket::Mid, DistanceBucket::Far] {
            assert_eq!(DistanceBucket::from_str(bucket.as_str()), Some(bucket));
        }
        assert_eq!(DistanceBucket::from_str("close"), None);
    }

    #[test]
    fn generated_map_serializes_camel_case() {
        let map = GeneratedMap {
            map_id: "m-1".to_string(),
            generated_at: Utc::now(),
            nodes: vec![PositionedNode {
                id: "n-0".to_string(),
                label: "家族".to_string(),
                custom_label: None,
                position: Position {
                    x: 200,
                    y: 140,
                    distance: DistanceBucket::Near,
                },
                color: DistanceBucket::Near.color().to_string(),
                observation_text: "距離が近い。".to_string(),
            }],
            basis: MapBasis {
                facebook_signals: false,
                user_hints: false,
                random_jitter: false,
            },
        };

        let json = serde_json::to_value(&map).unwrap();
        assert!(json.get("mapId").is_some());
        assert!(json.get("generatedAt").is_some());
        assert_eq!(json["basis"]["facebookSignals"], false);
        let node = &json["nodes"][0];
        assert_eq!(node["position"]["distance"], "near");
        assert_eq!(node["color"], "#FF6B6B");
        assert!(node.get("customLabel").is_none());
        assert!(node.get("observationText").is_some());
    }

    #[test]
    fn preference_merge_is_per_field() {
        let base = UserPreferences::default();
        let merged = base.merged(PreferencePatch {
            max_nodes: Some(6),
            ..Default::default()
        });
        assert_eq!(merged.max_nodes, 6);
        assert_eq!(merged.update_frequency, UpdateFrequency::Daily);
        assert_eq!(merged.display_mode, DisplayMode::Minimal);
    }
}
