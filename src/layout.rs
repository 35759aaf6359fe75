//! Radial scatter layout: distance bucket + node index → canvas coordinates.
//!
//! Nodes sit on one of three fixed-radius circles around the canvas center,
//! spaced evenly by input index (index 0 at 12 o'clock). Spacing is by index
//! only, not by bucket, so nodes of different distances may share an angle.

use std::f64::consts::PI;

use rand::Rng;

use crate::types::DistanceBucket;

/// Logical canvas is a fixed square; consumers scale to their viewport.
pub const CANVAS_SIZE: i32 = 400;
pub const CENTER_X: f64 = 200.0;
pub const CENTER_Y: f64 = 200.0;

/// Fixed ring radius per distance bucket.
pub fn radius(distance: DistanceBucket) -> f64 {
    match distance {
        DistanceBucket::Near => 60.0,
        DistanceBucket::Mid => 120.0,
        DistanceBucket::Far => 170.0,
    }
}

/// Maximum positional jitter on each axis, in pixels.
const JITTER_RANGE_PX: f64 = 8.0;

/// Compute the integer pixel position for one node.
///
/// `total_nodes` must be ≥ 1; passing 0 is a programmer error, not a
/// recoverable condition. When `jitter_enabled` is false the RNG is not
/// consumed and the point lies exactly on the bucket's ring (±1 px rounding).
pub fn place<R: Rng>(
    distance: DistanceBucket,
    index: usize,
    total_nodes: usize,
    jitter_enabled: bool,
    rng: &mut R,
) -> (i32, i32) {
    debug_assert!(total_nodes >= 1, "layout requires at least one node");

    let angle_step = 2.0 * PI / total_nodes as f64;
    let angle = index as f64 * angle_step - PI / 2.0;

    let r = radius(distance);
    let mut x = CENTER_X + r * angle.cos();
    let mut y = CENTER_Y + r * angle.sin();

    if jitter_enabled {
        x += rng.gen_range(-JITTER_RANGE_PX..=JITTER_RANGE_PX);
        y += rng.gen_range(-JITTER_RANGE_PX..=JITTER_RANGE_PX);
    }

    (x.round() as i32, y.round() as i32)
}
