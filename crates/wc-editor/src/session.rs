//! The editor session: the single-threaded owner of an editing lifecycle.
//!
//! Wires the geometry store, the drag state machine, the arrange pass, and
//! the emitter together. All mutation happens synchronously inside the
//! pointer/key entry points — there is no background work, no speculative
//! state, and at most one drag session at a time.

use crate::drag::{CanvasMutation, DragController, DragPhase};
use crate::hit::hit_test;
use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use wc_core::arrange::arrange;
use wc_core::emitter::emit_fragment;
use wc_core::id::EntityId;
use wc_core::model::{
    ADDED_Z_BASE, ARRANGE_GAP, CanvasMeta, Entity, EntityOrigin, Markup, PaletteItem, Point, Size,
};
use wc_core::parser::{ParseConfig, parse_fragment};
use wc_core::store::GeometryStore;

/// An interactive editing session over one parsed fragment.
pub struct EditorSession {
    store: GeometryStore,
    /// Non-entity remainder of the source fragment, re-emitted verbatim.
    background: String,
    meta: CanvasMeta,
    config: ParseConfig,
    /// Gap used by the arrange pass.
    gap: f32,
    /// At most one entity is selected at any time.
    selected: Option<EntityId>,
    drag: DragController,
}

impl EditorSession {
    /// Start a session from a generated fragment. Never fails: malformed
    /// input yields a session with zero entities and the whole fragment as
    /// static background.
    #[must_use]
    pub fn from_fragment(
        html: &str,
        palette: &[PaletteItem],
        meta: CanvasMeta,
        config: ParseConfig,
    ) -> Self {
        let mut session = Self {
            store: GeometryStore::new(),
            background: String::new(),
            meta,
            config,
            gap: ARRANGE_GAP,
            selected: None,
            drag: DragController::new(),
        };
        session.load_fragment(html, palette);
        session
    }

    /// Replace the document with a newly generated fragment. The previous
    /// store is discarded, not merged; an in-flight drag is cancelled
    /// before the rebuild so it cannot point at dead entities.
    pub fn load_fragment(&mut self, html: &str, palette: &[PaletteItem]) {
        self.drag.cancel();
        self.selected = None;

        let parsed = parse_fragment(html, palette, &self.config);
        log::debug!(
            "loaded fragment: {} entities, {} background bytes",
            parsed.entities.len(),
            parsed.background.len()
        );
        self.store.rebuild(parsed.entities);
        self.background = parsed.background;
    }

    // ─── Pointer entry points ────────────────────────────────────────────

    pub fn pointer_down(&mut self, x: f32, y: f32, modifiers: Modifiers) {
        let hit = hit_test(&self.store, x, y);
        let mutations = self
            .drag
            .handle(&InputEvent::PointerDown { x, y, modifiers }, hit.as_ref());
        self.apply_all(mutations);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, modifiers: Modifiers) {
        let mutations = self
            .drag
            .handle(&InputEvent::PointerMove { x, y, modifiers }, None);
        self.apply_all(mutations);
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        let mutations = self.drag.handle(&InputEvent::PointerUp { x, y }, None);
        self.apply_all(mutations);
    }

    pub fn pointer_leave(&mut self) {
        let mutations = self.drag.handle(&InputEvent::PointerLeave, None);
        self.apply_all(mutations);
    }

    // ─── Keyboard entry point ────────────────────────────────────────────

    pub fn key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return;
        };
        match action {
            ShortcutAction::Delete => {
                self.delete_selected();
            }
            ShortcutAction::Deselect => self.selected = None,
            ShortcutAction::AutoArrange => self.auto_arrange(),
            ShortcutAction::Nudge { dx, dy } => {
                if let Some(id) = self.selected
                    && let Some(e) = self.store.get_mut(id)
                {
                    e.position = Point::new(e.position.x + dx, e.position.y + dy).clamped();
                }
            }
            ShortcutAction::SendBackward => {
                if let Some(id) = self.selected {
                    self.store.send_backward(id);
                }
            }
            ShortcutAction::BringForward => {
                if let Some(id) = self.selected {
                    self.store.bring_forward(id);
                }
            }
            ShortcutAction::SendToBack => {
                if let Some(id) = self.selected {
                    self.store.send_to_back(id);
                }
            }
            ShortcutAction::BringToFront => {
                if let Some(id) = self.selected {
                    self.store.bring_to_front(id);
                }
            }
        }
    }

    // ─── Mutation application ────────────────────────────────────────────

    fn apply_all(&mut self, mutations: Vec<CanvasMutation>) {
        for mutation in mutations {
            self.apply(mutation);
        }
    }

    /// Apply one mutation. This is the hot path during a drag — moves are
    /// written straight into the store so model and view never diverge.
    fn apply(&mut self, mutation: CanvasMutation) {
        match mutation {
            CanvasMutation::Select { id } => self.selected = Some(id),
            CanvasMutation::ClearSelection => self.selected = None,
            CanvasMutation::MoveEntity { id, x, y } => {
                if let Some(e) = self.store.get_mut(id) {
                    e.position = Point::new(x, y);
                }
            }
            CanvasMutation::CommitDrop { .. } => self.auto_arrange(),
        }
    }

    // ─── Document operations ─────────────────────────────────────────────

    /// Run the arrange pass over the current snapshot and commit the
    /// replacement list in one batch.
    pub fn auto_arrange(&mut self) {
        let next = arrange(self.store.all(), self.gap);
        self.store.commit(next);
    }

    /// Permanently remove an entity. No implicit arrange — restacking
    /// after a delete is a separate, explicit action. Unknown ids are a
    /// no-op.
    pub fn remove(&mut self, id: EntityId) -> bool {
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.store.remove(id).is_some()
    }

    /// Remove the selected entity, if any.
    pub fn delete_selected(&mut self) -> bool {
        match self.selected.take() {
            Some(id) => self.store.remove(id).is_some(),
            None => false,
        }
    }

    /// Insert a component from the palette. With no drop position the
    /// entity stacks below everything currently on the canvas. The new
    /// entity becomes the selection.
    pub fn add_palette_item(&mut self, item: &PaletteItem, at: Option<Point>) -> EntityId {
        let id = if item.id.is_empty() || self.store.get(EntityId::intern(&item.id)).is_some() {
            self.store.allocate_id("added")
        } else {
            EntityId::intern(&item.id)
        };

        let position = at.or(item.position).unwrap_or_else(|| {
            let bottom = self
                .store
                .iter_active()
                .map(|e| e.position.y + e.size.height)
                .fold(0.0f32, f32::max);
            Point::new(0.0, if self.store.is_empty() { 0.0 } else { bottom + self.gap })
        });

        let mut entity = Entity::new(id, Markup::new(item.html.clone()), EntityOrigin::Added);
        entity.position = position.clamped();
        entity.size = Size::new(
            item.width
                .filter(|w| *w > 0.0)
                .unwrap_or(self.config.fallback_size.width),
            item.height
                .filter(|h| *h > 0.0)
                .unwrap_or(self.config.fallback_size.height),
        );
        entity.z_index = ADDED_Z_BASE + self.store.len() as i32;
        self.store.upsert(entity);
        self.selected = Some(id);
        id
    }

    /// Serialize the current arrangement for the preview renderer or an
    /// export collaborator.
    #[must_use]
    pub fn emit(&self) -> String {
        emit_fragment(self.store.all(), &self.background, &self.meta, &self.config)
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn store(&self) -> &GeometryStore {
        &self.store
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn drag_phase(&self) -> DragPhase {
        self.drag.phase()
    }

    pub fn canvas(&self) -> CanvasMeta {
        self.meta
    }
}
