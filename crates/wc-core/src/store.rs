//! The geometry store: the authoritative in-memory table of entity
//! position, size, and stacking order during an editing session.
//!
//! Mutation is synchronous and total — every interaction step reads the
//! latest committed state. The auto-arrange pass and the emitter only read
//! snapshots; replacement data is committed back here by the single
//! interaction thread that owns the store.

use crate::id::EntityId;
use crate::model::Entity;
use std::collections::{HashMap, HashSet};

/// Insertion-ordered entity table with an id → slot index.
#[derive(Debug, Default)]
pub struct GeometryStore {
    /// Entities in insertion order (the tie-break order for arrange/hit).
    entities: Vec<Entity>,

    /// Index from EntityId → slot for fast lookup.
    index: HashMap<EntityId, usize>,

    /// Monotonic counter backing `allocate_id`. Never decremented, so ids
    /// are never reused within a session, even after removals.
    serial: u64,

    /// Ids that have been removed this session and must not come back.
    retired: HashSet<EntityId>,
}

impl GeometryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from freshly parsed entities.
    #[must_use]
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        let mut store = Self::new();
        store.rebuild(entities);
        store
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&slot| &self.entities[slot])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index
            .get(&id)
            .copied()
            .map(|slot| &mut self.entities[slot])
    }

    /// All entities in insertion order, including inactive ones.
    pub fn all(&self) -> &[Entity] {
        &self.entities
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.active)
    }

    /// Insert a new entity or replace the existing one with the same id.
    pub fn upsert(&mut self, entity: Entity) {
        match self.index.get(&entity.id) {
            Some(&slot) => self.entities[slot] = entity,
            None => {
                self.index.insert(entity.id, self.entities.len());
                self.entities.push(entity);
            }
        }
    }

    /// Remove an entity permanently for the session. Other entities keep
    /// their positions — removal never triggers an implicit arrange.
    /// Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.index.get(&id).copied()?;
        let removed = self.entities.remove(slot);
        self.retired.insert(id);
        self.rebuild_index();
        Some(removed)
    }

    /// Set z-order by list position: the first id paints at the back.
    /// Unknown ids are skipped.
    pub fn reorder(&mut self, ids: &[EntityId]) {
        for (z, id) in ids.iter().enumerate() {
            if let Some(e) = self.get_mut(*id) {
                e.z_index = z as i32;
            }
        }
    }

    /// Commit a replacement batch in one step (the arrange pass returns a
    /// full list; applying it all at once keeps model and view in lockstep).
    /// Entries whose id is unknown are ignored.
    pub fn commit(&mut self, batch: Vec<Entity>) {
        for entity in batch {
            if let Some(&slot) = self.index.get(&entity.id) {
                self.entities[slot] = entity;
            }
        }
    }

    /// Tear down and recreate the table for a newly parsed fragment.
    /// The previous session's entities, retirements, and serial are
    /// discarded — a rebuild starts a fresh id space.
    pub fn rebuild(&mut self, entities: Vec<Entity>) {
        self.entities = entities;
        self.retired.clear();
        self.serial = self.entities.len() as u64;
        self.rebuild_index();
    }

    /// Allocate a session-unique `prefix_<n>` id. Skips ids already present
    /// and ids retired by removal, so an id is never reused.
    pub fn allocate_id(&mut self, prefix: &str) -> EntityId {
        loop {
            let candidate = EntityId::derived(prefix, self.serial);
            self.serial += 1;
            if !self.index.contains_key(&candidate) && !self.retired.contains(&candidate) {
                return candidate;
            }
        }
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (slot, entity) in self.entities.iter().enumerate() {
            self.index.insert(entity.id, slot);
        }
    }

    // ─── Z-order operations ──────────────────────────────────────────────

    /// Current paint order: ascending z-index, insertion order on ties.
    fn paint_order(&self) -> Vec<EntityId> {
        let mut order: Vec<(i32, usize, EntityId)> = self
            .entities
            .iter()
            .enumerate()
            .map(|(slot, e)| (e.z_index, slot, e.id))
            .collect();
        order.sort_by_key(|&(z, slot, _)| (z, slot));
        order.into_iter().map(|(_, _, id)| id).collect()
    }

    /// Move an entity one step toward the back. Returns true if the
    /// z-order changed.
    pub fn send_backward(&mut self, id: EntityId) -> bool {
        let order = self.paint_order();
        let pos = match order.iter().position(|&e| e == id) {
            Some(p) => p,
            None => return false,
        };
        if pos == 0 {
            return false; // already at back
        }
        let mut order = order;
        order.swap(pos, pos - 1);
        self.reorder(&order);
        true
    }

    /// Move an entity one step toward the front. Returns true if the
    /// z-order changed.
    pub fn bring_forward(&mut self, id: EntityId) -> bool {
        let order = self.paint_order();
        let pos = match order.iter().position(|&e| e == id) {
            Some(p) => p,
            None => return false,
        };
        if pos + 1 >= order.len() {
            return false; // already at front
        }
        let mut order = order;
        order.swap(pos, pos + 1);
        self.reorder(&order);
        true
    }

    /// Move an entity to the very back of the paint order.
    pub fn send_to_back(&mut self, id: EntityId) -> bool {
        let order = self.paint_order();
        let pos = match order.iter().position(|&e| e == id) {
            Some(p) => p,
            None => return false,
        };
        if pos == 0 {
            return false;
        }
        let mut order = order;
        let moved = order.remove(pos);
        order.insert(0, moved);
        self.reorder(&order);
        true
    }

    /// Move an entity to the very front of the paint order.
    pub fn bring_to_front(&mut self, id: EntityId) -> bool {
        let order = self.paint_order();
        let pos = match order.iter().position(|&e| e == id) {
            Some(p) => p,
            None => return false,
        };
        if pos + 1 == order.len() {
            return false;
        }
        let mut order = order;
        let moved = order.remove(pos);
        order.push(moved);
        self.reorder(&order);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityOrigin, Markup, Point, Size};

    fn entity(name: &str, y: f32, z: i32) -> Entity {
        let mut e = Entity::new(
            EntityId::intern(name),
            Markup::from("<span>x</span>"),
            EntityOrigin::Generated,
        );
        e.position = Point::new(0.0, y);
        e.size = Size::new(100.0, 40.0);
        e.z_index = z;
        e
    }

    #[test]
    fn upsert_get_remove() {
        let mut store = GeometryStore::new();
        store.upsert(entity("a", 0.0, 0));
        store.upsert(entity("b", 60.0, 1));
        assert_eq!(store.len(), 2);

        let a = EntityId::intern("a");
        assert!(store.get(a).is_some());

        // Replacing keeps the slot count stable
        store.upsert(entity("a", 99.0, 0));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(a).unwrap().position.y, 99.0);

        assert!(store.remove(a).is_some());
        assert!(store.get(a).is_none());
        // Removing again is a no-op
        assert!(store.remove(a).is_none());
    }

    #[test]
    fn removal_does_not_shift_survivors() {
        let mut store = GeometryStore::new();
        store.upsert(entity("a", 0.0, 0));
        store.upsert(entity("b", 60.0, 1));
        store.upsert(entity("c", 120.0, 2));

        store.remove(EntityId::intern("b"));

        let c = store.get(EntityId::intern("c")).unwrap();
        assert_eq!(c.position.y, 120.0, "removal must not move other entities");
    }

    #[test]
    fn allocated_ids_are_never_reused() {
        let mut store = GeometryStore::new();
        let first = store.allocate_id("added");
        let mut e = entity("ignored", 0.0, 0);
        e.id = first;
        store.upsert(e);
        store.remove(first);

        // Every subsequent allocation must dodge the retired id
        for _ in 0..8 {
            assert_ne!(store.allocate_id("added"), first);
        }
    }

    #[test]
    fn allocate_skips_parsed_ids() {
        let mut store = GeometryStore::new();
        store.upsert(entity("added_0", 0.0, 0));
        let id = store.allocate_id("added");
        assert_ne!(id.as_str(), "added_0");
    }

    #[test]
    fn reorder_sets_z_by_list_position() {
        let mut store = GeometryStore::new();
        store.upsert(entity("a", 0.0, 5));
        store.upsert(entity("b", 0.0, 9));
        store.reorder(&[EntityId::intern("b"), EntityId::intern("a")]);
        assert_eq!(store.get(EntityId::intern("b")).unwrap().z_index, 0);
        assert_eq!(store.get(EntityId::intern("a")).unwrap().z_index, 1);
    }

    #[test]
    fn z_order_quartet() {
        let mut store = GeometryStore::new();
        store.upsert(entity("a", 0.0, 0));
        store.upsert(entity("b", 0.0, 1));
        store.upsert(entity("c", 0.0, 2));
        let a = EntityId::intern("a");
        let c = EntityId::intern("c");

        assert!(!store.send_backward(a), "already at back");
        assert!(!store.bring_forward(c), "already at front");

        assert!(store.bring_forward(a));
        let z_of = |store: &GeometryStore, id| store.get(id).unwrap().z_index;
        assert!(z_of(&store, a) > z_of(&store, EntityId::intern("b")));

        assert!(store.send_to_back(c));
        assert!(
            store.all().iter().all(|e| e.id == c || e.z_index > z_of(&store, c)),
            "c should paint below everything"
        );

        assert!(store.bring_to_front(EntityId::intern("b")));
        let b_z = z_of(&store, EntityId::intern("b"));
        assert!(store.all().iter().all(|e| e.id == EntityId::intern("b") || e.z_index < b_z));
    }

    #[test]
    fn commit_replaces_as_one_batch() {
        let mut store = GeometryStore::new();
        store.upsert(entity("a", 50.0, 0));
        store.upsert(entity("b", 10.0, 1));

        let mut batch: Vec<Entity> = store.all().to_vec();
        for e in &mut batch {
            e.position.y += 100.0;
        }
        store.commit(batch);

        assert_eq!(store.get(EntityId::intern("a")).unwrap().position.y, 150.0);
        assert_eq!(store.get(EntityId::intern("b")).unwrap().position.y, 110.0);
    }

    #[test]
    fn rebuild_discards_previous_session() {
        let mut store = GeometryStore::new();
        store.upsert(entity("old", 0.0, 0));
        store.remove(EntityId::intern("old"));

        store.rebuild(vec![entity("fresh", 0.0, 0)]);
        assert_eq!(store.len(), 1);
        assert!(store.get(EntityId::intern("fresh")).is_some());
        assert!(store.get(EntityId::intern("old")).is_none());
    }
}
