pub mod config;
pub mod grid;
pub mod id;
pub mod interaction;
pub mod model;
pub mod store;
pub mod viewport;

pub use config::{CanvasConfig, GridConfig};
pub use grid::{snap_to_grid, to_canvas_space, to_screen_space};
pub use id::{EdgeId, NoteId};
pub use interaction::{InteractionState, Ripple};
pub use model::*;
pub use store::{GraphMutation, GraphStore};
pub use viewport::{Viewport, ViewportTracker};

// Re-export geometry types so downstream crates agree on one version
pub use kurbo::{Point, Rect, Size, Vec2};
