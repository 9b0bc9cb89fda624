//! Input abstraction layer.
//!
//! Normalizes host pointer and keyboard events into a unified `InputEvent`
//! enum consumed by the drag state machine, so the same engine can be
//! driven by a live UI or by tests without a pointer device.

/// A normalized input event from the host.
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start).
    PointerDown {
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },

    /// Pointer moved while the host canvas has capture.
    PointerMove {
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },

    /// Pointer released.
    PointerUp { x: f32, y: f32 },

    /// Pointer left the canvas. Ends a drag at the last known coordinates.
    PointerLeave,

    /// Keyboard event, resolved via `ShortcutMap`.
    Key {
        key: String,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    },
}

impl InputEvent {
    /// Extract position if this is a positioned pointer event.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y } => Some((*x, *y)),
            _ => None,
        }
    }
}

/// Modifier keys held during a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        alt: false,
        ctrl: false,
        meta: false,
    };
}
