//! Auto-arrange: the deterministic vertical restack pass.
//!
//! Resolves overlaps after a manual move or drop by re-stacking entities
//! top-to-bottom in their current `y` order. Vertical-only on purpose:
//! `x` is never touched and horizontal collisions are ignored.
//!
//! This is a pure function over a snapshot — it is invoked explicitly (on
//! drop, or from a user action) and the caller commits the returned list
//! to the geometry store as one batch.

use crate::model::Entity;
use std::cmp::Ordering;

/// Restack active entities vertically with `gap` pixels between them.
///
/// Entities are stable-sorted by current `y` (ties keep insertion order),
/// then assigned `y` positions from a running cursor that advances by
/// `height + gap`. Zero-height entities still consume the gap so they never
/// visually collapse into a neighbor. Inactive entities pass through
/// untouched. Returns a full replacement list in the original list order.
#[must_use]
pub fn arrange(entities: &[Entity], gap: f32) -> Vec<Entity> {
    let mut out: Vec<Entity> = entities.to_vec();

    let mut order: Vec<usize> = out
        .iter()
        .enumerate()
        .filter(|(_, e)| e.active)
        .map(|(i, _)| i)
        .collect();

    // sort_by is stable: equal y keeps insertion order, which makes the
    // pass reproducible for any input.
    order.sort_by(|&a, &b| {
        out[a]
            .position
            .y
            .partial_cmp(&out[b].position.y)
            .unwrap_or(Ordering::Equal)
    });

    let mut cursor = 0.0f32;
    for &i in &order {
        out[i].position.y = cursor;
        cursor += out[i].size.height + gap;
    }

    out
}
