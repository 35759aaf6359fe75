//! Map assembly: one generation pass over a node list.
//!
//! Orchestrates distance resolution, radial placement, and caption
//! generation per node, then stamps the result with a fresh map id and
//! timestamp. Assembly either fully succeeds or fails the empty-input
//! guard; there is no partial output.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{
    GeneratedMap, MapBasis, NodeInput, Position, PositionedNode, SignalBucket, DEFAULT_LABELS,
};
use crate::{distance, layout, observation};

#[derive(Debug, Error)]
pub enum MapError {
    /// Empty effective node list. Unreachable while [`DEFAULT_LABELS`] is
    /// non-empty and `max_nodes` ≥ 1, but guarded rather than assumed.
    #[error("no nodes to place after applying defaults")]
    EmptyNodeList,
}

/// Options for one generation pass.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Node-count cap; inputs beyond it are silently dropped (front slice).
    pub max_nodes: usize,
    /// Apply positional jitter to every node.
    pub jitter_enabled: bool,
    /// Fixed RNG seed for reproducible output. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_nodes: 12,
            jitter_enabled: true,
            rng_seed: None,
        }
    }
}

/// Synthetic inputs substituted when the caller supplies no nodes.
fn default_inputs() -> Vec<NodeInput> {
    DEFAULT_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| NodeInput::new(format!("node-{i}"), *label))
        .collect()
}

/// Generate one complete map.
///
/// `signals` selects the distance policy: `Some` uses the signal-weighted
/// policy (pass [`SignalBucket::default`] when the upstream fetch failed),
/// `None` uses the unassisted thirds policy. `has_connection` is recorded
/// in the output basis and does not affect placement directly.
pub fn generate_map(
    inputs: &[NodeInput],
    options: &GenerateOptions,
    signals: Option<&SignalBucket>,
    has_connection: bool,
) -> Result<GeneratedMap, MapError> {
    let defaults;
    let effective: &[NodeInput] = if inputs.is_empty() {
        defaults = default_inputs();
        &defaults
    } else {
        inputs
    };

    let kept = &effective[..effective.len().min(options.max_nodes)];
    if kept.is_empty() {
        return Err(MapError::EmptyNodeList);
    }

    let mut rng = match options.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let total = kept.len();
    let nodes = kept
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let resolved = match signals {
                Some(bucket) => distance::resolve_weighted(input.user_hint, bucket, &mut rng),
                None => distance::resolve_unassisted(input.user_hint, &mut rng),
            };
            let (x, y) = layout::place(resolved, index, total, options.jitter_enabled, &mut rng);
            PositionedNode {
                id: input.id.clone(),
                label: input.label.clone(),
                custom_label: input.custom_label.clone(),
                position: Position {
                    x,
                    y,
                    distance: resolved,
                },
                color: resolved.color().to_string(),
                observation_text: observation::generate(resolved, &mut rng),
            }
        })
        .collect();

    Ok(GeneratedMap {
        map_id: Uuid::new_v4().to_string(),
        generated_at: Utc::now(),
        nodes,
        basis: MapBasis {
            facebook_signals: has_connection,
            user_hints: kept.iter().any(|n| n.user_hint.is_some()),
            random_jitter: options.jitter_enabled,
        },
    })
}
