#![forbid(unsafe_code)]

//! # koromap
//!
//! Relationship-map generation engine. Turns a small list of labeled nodes
//! into a radial map: each node gets a qualitative distance (near/mid/far)
//! from the center, a position on a fixed 400×400 canvas, a per-bucket
//! color, and a short generated observation caption.
//!
//! Distance comes from, in priority order: an explicit user hint, a mild
//! signal-weighted random draw (when bucketed engagement signals exist), or
//! a pure random fallback. Raw engagement numbers never enter the model —
//! only coarse buckets do.
//!
//! Generated maps are cached locally in a single slot with a 24-hour
//! freshness window; user-entered labels and hints persist independently of
//! that window.

pub mod assembler;
pub mod cache;
pub mod distance;
pub mod gateway;
pub mod layout;
pub mod observation;
pub mod signals;
pub mod store;
pub mod types;

pub use assembler::{generate_map, GenerateOptions, MapError};
pub use cache::{CacheError, MapCache, SqliteMapStore, FRESHNESS_WINDOW};
pub use gateway::{GraphApiClient, NullSignalSource, SignalSource};
pub use signals::{bucketize, EngagementCounts};
pub use store::{PreferenceStore, SqlitePreferenceStore, StoreError};
pub use types::{
    DistanceBucket, GeneratedMap, MapBasis, NodeInput, PositionedNode, PreferencePatch,
    SignalBucket, UserPreferences, DEFAULT_LABELS,
};
