pub mod drag;
pub mod hit;
pub mod input;
pub mod session;
pub mod shortcuts;

pub use drag::{CanvasMutation, DragController, DragPhase, DragSession};
pub use hit::{Hit, hit_test};
pub use input::{InputEvent, Modifiers};
pub use session::EditorSession;
pub use shortcuts::{ShortcutAction, ShortcutMap};
