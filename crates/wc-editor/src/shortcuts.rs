//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! here so every host binds the same keys.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShortcutAction {
    /// Delete the selected entity.
    Delete,
    /// Clear the selection.
    Deselect,
    /// Run the auto-arrange pass.
    AutoArrange,
    /// Move the selected entity by a pixel step.
    Nudge { dx: f32, dy: f32 },

    // ── Z-order ──
    SendBackward,
    BringForward,
    SendToBack,
    BringToFront,
}

/// Resolves key events into shortcut actions.
///
/// Platform-aware modifier detection: on macOS `meta` is ⌘, elsewhere
/// `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"Delete"`, `"["`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return match key {
                "[" => Some(ShortcutAction::SendToBack),
                "]" => Some(ShortcutAction::BringToFront),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "[" => Some(ShortcutAction::SendBackward),
                "]" => Some(ShortcutAction::BringForward),
                _ => None,
            };
        }

        // Shift widens the nudge step.
        let step = if shift { 10.0 } else { 1.0 };

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            "r" | "R" => Some(ShortcutAction::AutoArrange),
            "ArrowLeft" => Some(ShortcutAction::Nudge { dx: -step, dy: 0.0 }),
            "ArrowRight" => Some(ShortcutAction::Nudge { dx: step, dy: 0.0 }),
            "ArrowUp" => Some(ShortcutAction::Nudge { dx: 0.0, dy: -step }),
            "ArrowDown" => Some(ShortcutAction::Nudge { dx: 0.0, dy: step }),
            _ => None,
        }
    }
}
