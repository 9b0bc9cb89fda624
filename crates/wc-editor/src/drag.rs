//! The pointer interaction state machine.
//!
//! `Idle → Armed → Dragging → Idle`. A pointer-down on an entity arms a
//! drag session; the first move starts dragging; release or leaving the
//! canvas commits the position at the last known coordinates (there is no
//! rollback). Transitions are pure over the event + hit inputs and emit
//! `CanvasMutation` values that the session applies to the geometry store,
//! so the machine can be driven by tests without a live pointer device.

use crate::hit::Hit;
use crate::input::InputEvent;
use wc_core::id::EntityId;
use wc_core::model::Point;

/// A mutation produced by the state machine for the session to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasMutation {
    /// Mark an entity selected (at most one at a time).
    Select { id: EntityId },
    /// Clear the selection (canvas background clicked).
    ClearSelection,
    /// Move an entity to an absolute, already-clamped position. Applied
    /// live during the drag so model and view never diverge.
    MoveEntity { id: EntityId, x: f32, y: f32 },
    /// A drag finished — the session runs the auto-arrange pass.
    CommitDrop { id: EntityId },
}

/// Ephemeral per-drag state. Exists only between pointer-down and release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub entity: EntityId,
    /// Pointer position minus the entity's top-left at pointer-down.
    pub pointer_offset: (f32, f32),
    /// Where the entity started, kept for diagnostics.
    pub origin_start: Point,
}

/// Observable machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    /// Pointer is down on an entity but has not moved yet.
    Armed,
    Dragging,
}

/// The drag state machine. One session at a time, enforced structurally:
/// a pointer-down while a session exists is ignored until release.
#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
    dragging: bool,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        match (&self.session, self.dragging) {
            (None, _) => DragPhase::Idle,
            (Some(_), false) => DragPhase::Armed,
            (Some(_), true) => DragPhase::Dragging,
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Abort the current session without committing a drop. Used when a
    /// re-parse arrives mid-drag: the store is about to be rebuilt, so the
    /// session must not outlive the entities it points at.
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            log::debug!("drag session cancelled");
        }
        self.dragging = false;
    }

    /// Feed one input event, returning mutations for the session to apply.
    /// `hit` is the hit-test result for pointer-down events.
    pub fn handle(&mut self, event: &InputEvent, hit: Option<&Hit>) -> Vec<CanvasMutation> {
        match event {
            InputEvent::PointerDown { x, y, .. } => {
                // One session at a time: a second press mid-drag is ignored.
                if self.session.is_some() {
                    return vec![];
                }
                match hit {
                    Some(hit) => {
                        self.session = Some(DragSession {
                            entity: hit.id,
                            pointer_offset: (x - hit.origin.x, y - hit.origin.y),
                            origin_start: hit.origin,
                        });
                        self.dragging = false;
                        vec![CanvasMutation::Select { id: hit.id }]
                    }
                    None => vec![CanvasMutation::ClearSelection],
                }
            }
            InputEvent::PointerMove { x, y, .. } => {
                let Some(session) = &self.session else {
                    // Moving with no session is a no-op, not an error.
                    return vec![];
                };
                self.dragging = true;
                let (ox, oy) = session.pointer_offset;
                let target = Point::new(x - ox, y - oy).clamped();
                vec![CanvasMutation::MoveEntity {
                    id: session.entity,
                    x: target.x,
                    y: target.y,
                }]
            }
            InputEvent::PointerUp { .. } => self.finish(),
            // Leaving the canvas commits at the last known coordinates —
            // cancel-as-commit, not rollback.
            InputEvent::PointerLeave => self.finish(),
            InputEvent::Key { .. } => vec![],
        }
    }

    /// End the session. A drag signals the arrange pass; a plain click
    /// (no movement) just keeps the selection.
    fn finish(&mut self) -> Vec<CanvasMutation> {
        let Some(session) = self.session.take() else {
            return vec![];
        };
        let was_dragging = self.dragging;
        self.dragging = false;
        if was_dragging {
            vec![CanvasMutation::CommitDrop {
                id: session.entity,
            }]
        } else {
            vec![]
        }
    }
}
