//! Distance resolution: decide each node's qualitative distance bucket.
//!
//! Two deliberately separate policies:
//!
//! - [`resolve_weighted`] — used when a [`SignalBucket`] is available
//!   (including the documented default bucket). Signals nudge the draw
//!   toward near or far but never determine placement outright.
//! - [`resolve_unassisted`] — pure thirds over a fresh draw, used only when
//!   the caller has no distinguishing signal source at all.
//!
//! In both policies an explicit user hint is authoritative and returned
//! unchanged before any randomness is consumed.

use rand::Rng;

use crate::types::{DistanceBucket, SignalBucket, VolumeLevel};

/// Combined-score thresholds for the signal-weighted policy.
const WEIGHTED_NEAR_BELOW: f64 = 0.35;
const WEIGHTED_MID_BELOW: f64 = 0.70;

/// Thirds thresholds for the unassisted fallback policy.
const UNASSISTED_NEAR_BELOW: f64 = 0.33;
const UNASSISTED_MID_BELOW: f64 = 0.66;

/// Scalar bias derived from activity volume. Lower weight pulls the combined
/// score down, i.e. toward `near`.
fn activity_weight(volume: VolumeLevel) -> f64 {
    match volume {
        VolumeLevel::High => 0.3,
        VolumeLevel::Moderate => 0.5,
        VolumeLevel::Low => 0.7,
    }
}

/// Resolve a distance using bucketed signals plus one uniform draw.
pub fn resolve_weighted<R: Rng>(
    hint: Option<DistanceBucket>,
    signals: &SignalBucket,
    rng: &mut R,
) -> DistanceBucket {
    if let Some(hint) = hint {
        return hint;
    }

    let weight = activity_weight(signals.activity_volume);
    let combined = (rng.gen::<f64>() + weight) / 2.0;

    if combined < WEIGHTED_NEAR_BELOW {
        DistanceBucket::Near
    } else if combined < WEIGHTED_MID_BELOW {
        DistanceBucket::Mid
    } else {
        DistanceBucket::Far
    }
}

/// Resolve a distance with no signals: one fresh draw, fixed thirds.
pub fn resolve_unassisted<R: Rng>(hint: Option<DistanceBucket>, rng: &mut R) -> DistanceBucket {
    if let Some(hint) = hint {
        return hint;
    }

    let draw = rng.gen::<f64>();
    if draw < UNASSISTED_NEAR_BELOW {
        DistanceBucket::Near
    } else if draw < UNASSISTED_MID_BELOW {
        DistanceBucket::Mid
    } else {
        DistanceBucket::Far
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::types::Level;

    fn bucket_with_volume(volume: VolumeLevel) -> SignalBucket {
        SignalBucket {
            activity_volume: volume,
            reaction_count: Level::Medium,
            comment_count: Level::Medium,
            post_count: Level::Medium,
        }
    }

    #[test]
    fn hint_wins_over_signals_and_randomness() {
        let high = bucket_with_volume(VolumeLevel::High);
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(
                resolve_weighted(Some(DistanceBucket::Far), &high, &mut rng),
                DistanceBucket::Far
            );
            assert_eq!(
                resolve_unassisted(Some(DistanceBucket::Near), &mut rng),
                DistanceBucket::Near
            );
        }
    }

    #[test]
    fn hint_consumes_no_randomness() {
        let signals = SignalBucket::default();
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let _ = resolve_weighted(Some(DistanceBucket::Mid), &signals, &mut a);
        assert_eq!(a.gen::<f64>(), b.gen::<f64>());
    }

    #[test]
    fn low_activity_can_never_be_near() {
        // With weight 0.7 the combined score is at least 0.35, so the
        // weighted policy never lands in the near band for low-volume users.
        let low = bucket_with_volume(VolumeLevel::Low);
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_ne!(
                resolve_weighted(None, &low, &mut rng),
                DistanceBucket::Near
            );
        }
    }

    #[test]
    fn high_activity_can_never_be_far() {
        // Weight 0.3 caps the combined score below 0.65 < 0.70.
        let high = bucket_with_volume(VolumeLevel::High);
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_ne!(
                resolve_weighted(None, &high, &mut rng),
                DistanceBucket::Far
            );
        }
    }

    #[test]
    fn unassisted_reaches_all_buckets() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            seen.insert(resolve_unassisted(None, &mut rng));
        }
        assert_eq!(seen.len(), 3);
    }
}
