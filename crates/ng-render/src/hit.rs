//! Hit testing: canvas point → note body or connection handle.
//!
//! Note sizes are measured by the rendering engine and reported back; the
//! store only knows positions. Notes are tested front-to-back (last inserted
//! is topmost).

use ng_core::{ConnectionAnchor, GraphStore, Handle, NoteId, Point, Rect, Size};
use std::collections::HashMap;

/// What sits under a canvas point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Note(NoteId),
    Handle(ConnectionAnchor),
}

/// Canvas-space bounds of a note from its anchor and measured size.
pub fn note_bounds(position: Point, size: Size) -> Rect {
    Rect::from_origin_size(position, size)
}

/// Centre of a handle, `offset` units outside the midpoint of its side.
pub fn handle_anchor(bounds: Rect, handle: Handle, offset: f64) -> Point {
    let c = bounds.center();
    match handle {
        Handle::Top => Point::new(c.x, bounds.y0 - offset),
        Handle::Right => Point::new(bounds.x1 + offset, c.y),
        Handle::Bottom => Point::new(c.x, bounds.y1 + offset),
        Handle::Left => Point::new(bounds.x0 - offset, c.y),
    }
}

/// The handle whose side the pointer hovers, if any.
///
/// The pointer must be outside the note, no farther than `padding` from the
/// side, and within `padding` of the side's midpoint along it.
pub fn handle_near(bounds: Rect, pointer: Point, padding: f64) -> Option<Handle> {
    let c = bounds.center();
    let near_x = (pointer.x - c.x).abs() < padding;
    let near_y = (pointer.y - c.y).abs() < padding;

    if pointer.y < bounds.y0 && bounds.y0 - pointer.y <= padding && near_x {
        Some(Handle::Top)
    } else if pointer.x > bounds.x1 && pointer.x - bounds.x1 <= padding && near_y {
        Some(Handle::Right)
    } else if pointer.y > bounds.y1 && pointer.y - bounds.y1 <= padding && near_x {
        Some(Handle::Bottom)
    } else if pointer.x < bounds.x0 && bounds.x0 - pointer.x <= padding && near_y {
        Some(Handle::Left)
    } else {
        None
    }
}

/// Find the topmost note body or handle at `point`.
///
/// Bodies win over handles of notes beneath them. Editing notes expose no
/// handles. Notes without a measured size are skipped.
pub fn hit_test(
    store: &GraphStore,
    sizes: &HashMap<NoteId, Size>,
    point: Point,
    padding: f64,
) -> Option<Hit> {
    let notes: Vec<_> = store.notes().collect();

    // Bodies first, topmost first
    for note in notes.iter().rev() {
        if let Some(size) = sizes.get(&note.id)
            && note_bounds(note.position, *size).contains(point)
        {
            return Some(Hit::Note(note.id));
        }
    }

    for note in notes.iter().rev() {
        if note.editing {
            continue;
        }
        if let Some(size) = sizes.get(&note.id)
            && let Some(handle) = handle_near(note_bounds(note.position, *size), point, padding)
        {
            return Some(Hit::Handle(ConnectionAnchor::new(note.id, handle)));
        }
    }

    None
}
