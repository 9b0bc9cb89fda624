//! Hit testing: point → entity lookup.
//!
//! Finds the topmost active entity under a canvas position so raw pointer
//! coordinates can be translated into the drag state machine's hit input.

use wc_core::id::EntityId;
use wc_core::model::{Bounds, Point};
use wc_core::store::GeometryStore;

/// A resolved hit: the entity and its current top-left, which the drag
/// state machine needs to anchor the pointer offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub id: EntityId,
    pub origin: Point,
    pub bounds: Bounds,
}

/// Find the topmost active entity at (px, py).
/// Returns `None` if nothing is hit (canvas background).
///
/// Paint order is ascending z-index with later insertion on top, so the
/// winner is the maximum (z_index, slot) among containing entities.
pub fn hit_test(store: &GeometryStore, px: f32, py: f32) -> Option<Hit> {
    let mut best: Option<(i32, usize)> = None;
    let mut hit = None;

    for (slot, e) in store.all().iter().enumerate() {
        if !e.active {
            continue;
        }
        let bounds = e.bounds();
        if !bounds.contains(px, py) {
            continue;
        }
        let key = (e.z_index, slot);
        if best.is_none_or(|b| key > b) {
            best = Some(key);
            hit = Some(Hit {
                id: e.id,
                origin: e.position,
                bounds,
            });
        }
    }

    hit
}
