//! Signal bucketizer: raw engagement counts → coarse ordinal levels.
//!
//! Exact numbers must never leave this module; downstream code only ever
//! sees the bucketed [`SignalBucket`].

use serde::{Deserialize, Serialize};

use crate::types::{Level, SignalBucket, VolumeLevel};

/// Raw engagement counts over the fetch window. Internal to the signal
/// pipeline; never serialized into any map output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounts {
    pub reactions: u64,
    pub comments: u64,
    pub posts: u64,
}

/// Activity-volume cut points over the summed total.
const VOLUME_CUTS: (u64, u64) = (10, 50);
/// Per-metric low/high cut points.
const REACTION_CUTS: (u64, u64) = (5, 20);
const COMMENT_CUTS: (u64, u64) = (3, 10);
const POST_CUTS: (u64, u64) = (2, 10);

/// Map raw counts into a [`SignalBucket`].
///
/// Pure and total: zero counts land in the lowest buckets, there is no
/// failure case. Callers with no counts at all should use
/// [`SignalBucket::default`] instead.
pub fn bucketize(counts: &EngagementCounts) -> SignalBucket {
    let total = counts.reactions + counts.comments + counts.posts;
    SignalBucket {
        activity_volume: volume_level(total, VOLUME_CUTS),
        reaction_count: level(counts.reactions, REACTION_CUTS),
        comment_count: level(counts.comments, COMMENT_CUTS),
        post_count: level(counts.posts, POST_CUTS),
    }
}

fn level(value: u64, (low, high): (u64, u64)) -> Level {
    if value < low {
        Level::Low
    } else if value < high {
        Level::Medium
    } else {
        Level::High
    }
}

fn volume_level(value: u64, (low, high): (u64, u64)) -> VolumeLevel {
    if value < low {
        VolumeLevel::Low
    } else if value < high {
        VolumeLevel::Moderate
    } else {
        VolumeLevel::High
    }
}
