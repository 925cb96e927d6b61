pub mod decorate;
pub mod hit;
pub mod theme;

pub use decorate::{Decorations, EdgeDecoration, NoteDecoration, RippleDot, resolve};
pub use hit::{Hit, handle_anchor, handle_near, hit_test};
pub use theme::{CanvasTheme, Color};
