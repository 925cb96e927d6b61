pub mod controller;
pub mod input;
pub mod shortcuts;

pub use controller::{InteractionController, Outcome};
pub use input::{CanvasEvent, Modifiers, NoteIntent, PointerTarget};
pub use shortcuts::{ShortcutAction, ShortcutMap};
