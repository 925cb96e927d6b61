//! Transient interaction state.
//!
//! Nothing here is part of the graph. The controller writes it while a
//! gesture is in flight and the decoration resolver reads it. Each field is
//! cleared when its gesture completes or is cancelled.

use crate::id::NoteId;
use crate::model::ConnectionAnchor;
use kurbo::Point;

/// Spawn feedback drawn around a freshly created note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    /// Snapped spawn point, canvas space.
    pub origin: Point,
    pub started_ms: f64,
    pub ttl_ms: f64,
}

impl Ripple {
    pub fn is_live(&self, now_ms: f64) -> bool {
        now_ms - self.started_ms < self.ttl_ms
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionState {
    /// Handle a connection gesture started from.
    pub connecting_from: Option<ConnectionAnchor>,
    /// Handle under the pointer.
    pub hovered_handle: Option<ConnectionAnchor>,
    /// Note body under the pointer.
    pub hovered_note: Option<NoteId>,
    /// Note being dragged.
    pub dragging_note: Option<NoteId>,
    pub ripple: Option<Ripple>,
}

impl InteractionState {
    pub fn is_connecting(&self) -> bool {
        self.connecting_from.is_some()
    }

    /// Pointer is over `note` or one of its handles.
    pub fn is_hovering(&self, note: NoteId) -> bool {
        self.hovered_note == Some(note) || self.hovered_handle.is_some_and(|a| a.note == note)
    }

    /// Drop the ripple once its time-to-live has passed. Returns `true` if
    /// it was cleared.
    pub fn expire_ripple(&mut self, now_ms: f64) -> bool {
        match self.ripple {
            Some(ripple) if !ripple.is_live(now_ms) => {
                self.ripple = None;
                true
            }
            _ => false,
        }
    }

    /// Clear every reference to `note`, e.g. after it was removed.
    /// Returns `true` if anything was cleared.
    pub fn forget_note(&mut self, note: NoteId) -> bool {
        let before = self.clone();
        if self.connecting_from.is_some_and(|a| a.note == note) {
            log::debug!("connection from {note} aborted: note removed");
            self.connecting_from = None;
        }
        if self.hovered_handle.is_some_and(|a| a.note == note) {
            self.hovered_handle = None;
        }
        if self.hovered_note == Some(note) {
            self.hovered_note = None;
        }
        if self.dragging_note == Some(note) {
            self.dragging_note = None;
        }
        *self != before
    }
}
