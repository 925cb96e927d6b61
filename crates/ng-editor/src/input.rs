//! Canvas event vocabulary.
//!
//! Everything the host's rendering engine reports (raw pointer stream,
//! engine callbacks, keys, and note-component intents) is normalized into a
//! single `CanvasEvent` consumed by `InteractionController::dispatch`.
//! Pointer coordinates are screen space relative to the canvas element;
//! node positions reported by the engine are already canvas space.

use ng_core::{ConnectionAnchor, EdgeId, NoteId, Point, Vec2};
use ng_render::Hit;

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }
}

/// What an engine callback fired on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty canvas.
    Pane,
    Note(NoteId),
    Handle(ConnectionAnchor),
    Edge(EdgeId),
}

impl From<Hit> for PointerTarget {
    fn from(hit: Hit) -> Self {
        match hit {
            Hit::Note(id) => Self::Note(id),
            Hit::Handle(anchor) => Self::Handle(anchor),
        }
    }
}

/// Requests raised by a note's own UI (text input, pencil, ×).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteIntent {
    /// Text input changed.
    ContentChanged(String),
    /// Commit the current content, if any.
    CommitEdit,
    /// Leave edit mode: commit non-empty content, discard an empty note.
    CancelEdit,
    /// Pencil action on a committed note.
    BeginEdit,
    /// Text input lost focus.
    Blur,
    /// × action.
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    // ── Raw pointer stream (hit-tested by the controller) ──
    PointerDown { point: Point },
    PointerMove { point: Point },
    PointerUp { point: Point },

    // ── Engine callbacks ──
    DoubleClick {
        target: PointerTarget,
        point: Point,
        /// Host clock, used to time the spawn ripple.
        time_ms: f64,
    },
    Click { target: PointerTarget },
    NodeDragStart { id: NoteId },
    /// `position` is canvas space.
    NodeDrag { id: NoteId, position: Point },
    NodeDragStop { id: NoteId },
    ConnectStart { anchor: ConnectionAnchor },
    /// Gesture ended; anything not yet completed is aborted.
    ConnectEnd,
    ConnectionComplete {
        from: ConnectionAnchor,
        to: ConnectionAnchor,
    },
    ViewportChange { pan: Vec2, zoom: f64 },

    // ── Keyboard ──
    Key {
        /// Note whose text input has focus, or `None` for the canvas.
        focus: Option<NoteId>,
        key: String,
        modifiers: Modifiers,
    },

    // ── Note components ──
    Note { id: NoteId, intent: NoteIntent },
}

impl CanvasEvent {
    pub fn key(focus: Option<NoteId>, key: &str) -> Self {
        Self::Key {
            focus,
            key: key.to_owned(),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn note(id: NoteId, intent: NoteIntent) -> Self {
        Self::Note { id, intent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ng_core::Handle;

    #[test]
    fn hit_converts_to_target() {
        let id = NoteId::intern("input_hit");
        assert_eq!(PointerTarget::from(Hit::Note(id)), PointerTarget::Note(id));
        let anchor = ConnectionAnchor::new(id, Handle::Top);
        assert_eq!(
            PointerTarget::from(Hit::Handle(anchor)),
            PointerTarget::Handle(anchor)
        );
    }
}
