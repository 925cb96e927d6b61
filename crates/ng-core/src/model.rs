//! Note graph data model.
//!
//! Notes are the vertices: a canvas-space position plus an opaque text
//! payload. Connections are directed edges anchored at one of four handles
//! on each note's border. Right and bottom handles emit connections; top and
//! left handles receive them.

use crate::id::{EdgeId, NoteId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Handles ─────────────────────────────────────────────────────────────

/// One of the four attachment points on a note's border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Top,
    Right,
    Bottom,
    Left,
}

/// Whether a handle emits or receives connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleRole {
    Source,
    Target,
}

impl Handle {
    pub const ALL: [Handle; 4] = [Handle::Top, Handle::Right, Handle::Bottom, Handle::Left];

    pub fn role(self) -> HandleRole {
        match self {
            Handle::Right | Handle::Bottom => HandleRole::Source,
            Handle::Top | Handle::Left => HandleRole::Target,
        }
    }

    pub fn is_source(self) -> bool {
        self.role() == HandleRole::Source
    }

    pub fn is_target(self) -> bool {
        self.role() == HandleRole::Target
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Handle::Top => "top",
            Handle::Right => "right",
            Handle::Bottom => "bottom",
            Handle::Left => "left",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "top" => Some(Handle::Top),
            "right" => Some(Handle::Right),
            "bottom" => Some(Handle::Bottom),
            "left" => Some(Handle::Left),
            _ => None,
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A specific handle on a specific note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionAnchor {
    pub note: NoteId,
    pub handle: Handle,
}

impl ConnectionAnchor {
    pub fn new(note: NoteId, handle: Handle) -> Self {
        Self { note, handle }
    }
}

// ─── Notes ───────────────────────────────────────────────────────────────

/// A note on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Canvas-space anchor (top-left corner). Never screen space.
    pub position: Point,
    /// Opaque text payload.
    pub content: String,
    /// Accepting text input. Blocks drag and connection while set.
    pub editing: bool,
    /// Set for the duration of a drag gesture only.
    pub dragging: bool,
}

impl Note {
    /// A freshly spawned note: in edit mode, not dragging.
    pub fn new(id: NoteId, position: Point, content: impl Into<String>) -> Self {
        Self {
            id,
            position,
            content: content.into(),
            editing: true,
            dragging: false,
        }
    }

    /// Content is empty once surrounding whitespace is ignored.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Partial update merged into a note by `GraphStore::update_node`.
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePatch {
    pub content: Option<String>,
    pub position: Option<Point>,
    pub editing: Option<bool>,
    pub dragging: Option<bool>,
}

impl NotePatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn editing(editing: bool) -> Self {
        Self {
            editing: Some(editing),
            ..Self::default()
        }
    }

    pub fn dragging(dragging: bool) -> Self {
        Self {
            dragging: Some(dragging),
            ..Self::default()
        }
    }

    /// Merge into `note`. Returns `true` if any field actually changed.
    pub fn apply_to(&self, note: &mut Note) -> bool {
        let mut changed = false;
        if let Some(content) = &self.content
            && note.content != *content
        {
            note.content.clone_from(content);
            changed = true;
        }
        if let Some(position) = self.position
            && note.position != position
        {
            note.position = position;
            changed = true;
        }
        if let Some(editing) = self.editing
            && note.editing != editing
        {
            note.editing = editing;
            changed = true;
        }
        if let Some(dragging) = self.dragging
            && note.dragging != dragging
        {
            note.dragging = dragging;
            changed = true;
        }
        changed
    }
}

// ─── Connections ─────────────────────────────────────────────────────────

/// A directed connection from a source handle to a target handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: EdgeId,
    pub source: NoteId,
    pub source_handle: Handle,
    pub target: NoteId,
    pub target_handle: Handle,
    pub selected: bool,
}

impl Connection {
    pub fn new(id: EdgeId, from: ConnectionAnchor, to: ConnectionAnchor) -> Self {
        Self {
            id,
            source: from.note,
            source_handle: from.handle,
            target: to.note,
            target_handle: to.handle,
            selected: false,
        }
    }

    pub fn source_anchor(&self) -> ConnectionAnchor {
        ConnectionAnchor::new(self.source, self.source_handle)
    }

    pub fn target_anchor(&self) -> ConnectionAnchor {
        ConnectionAnchor::new(self.target, self.target_handle)
    }

    /// Touches `note` at either end.
    pub fn touches(&self, note: NoteId) -> bool {
        self.source == note || self.target == note
    }

    /// Same endpoints and handles as `from → to`.
    pub fn joins(&self, from: ConnectionAnchor, to: ConnectionAnchor) -> bool {
        self.source_anchor() == from && self.target_anchor() == to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_polarity() {
        assert!(Handle::Right.is_source());
        assert!(Handle::Bottom.is_source());
        assert!(Handle::Top.is_target());
        assert!(Handle::Left.is_target());
    }

    #[test]
    fn handle_names_roundtrip() {
        for handle in Handle::ALL {
            assert_eq!(Handle::parse(handle.as_str()), Some(handle));
        }
        assert_eq!(Handle::parse("middle"), None);
        assert_eq!(serde_json::to_string(&Handle::Left).unwrap(), "\"left\"");
    }

    #[test]
    fn new_note_starts_editing() {
        let note = Note::new(NoteId::intern("n"), Point::new(1.0, 1.0), "");
        assert!(note.editing);
        assert!(!note.dragging);
        assert!(note.is_blank());
    }

    #[test]
    fn whitespace_only_content_is_blank() {
        let mut note = Note::new(NoteId::intern("ws"), Point::ZERO, "  \n\t");
        assert!(note.is_blank());
        note.content = " hi ".to_string();
        assert!(!note.is_blank());
    }

    #[test]
    fn patch_merges_only_set_fields() {
        let mut note = Note::new(NoteId::intern("p"), Point::ZERO, "keep");
        let patch = NotePatch {
            position: Some(Point::new(5.0, 6.0)),
            editing: Some(false),
            ..NotePatch::default()
        };
        assert!(patch.apply_to(&mut note));
        assert_eq!(note.content, "keep");
        assert_eq!(note.position, Point::new(5.0, 6.0));
        assert!(!note.editing);

        // Re-applying is not a change
        assert!(!patch.apply_to(&mut note));
    }
}
