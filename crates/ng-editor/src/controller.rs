//! Interaction controller: canvas events → graph mutations.
//!
//! The controller owns the graph store, the viewport tracker and the
//! transient interaction state. Every event goes through `dispatch`, which
//! turns it into a batch of `GraphMutation`s applied in order. Handlers never
//! touch the store directly, so every graph change is a replayable value.
//!
//! Per-note lifecycle: `Editing → Idle` (commit), `Idle → Editing` (pencil),
//! and orthogonally `Idle ⇄ Dragging`. Per gesture: `NoConnection →
//! Connecting(anchor) → NoConnection`. A pointer-up anywhere always ends a
//! connection gesture and any drag whose stop event got lost.

use crate::input::{CanvasEvent, NoteIntent, PointerTarget};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use ng_core::{
    CanvasConfig, ConnectionAnchor, EdgeId, GraphMutation, GraphStore, InteractionState,
    NoteId, NotePatch, Point, Ripple, Size, Viewport, ViewportTracker, snap_to_grid,
    to_canvas_space,
};
use ng_render::hit::note_bounds;
use ng_render::{CanvasTheme, Decorations, Hit, handle_anchor, hit_test};
use std::collections::HashMap;

/// What a dispatched event changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Notes or connections changed; the host should re-read node/edge arrays.
    pub graph_changed: bool,
    /// Decorations changed.
    pub visual_changed: bool,
}

impl Outcome {
    pub const NONE: Self = Self {
        graph_changed: false,
        visual_changed: false,
    };

    fn visual(changed: bool) -> Self {
        Self {
            graph_changed: false,
            visual_changed: changed,
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            graph_changed: self.graph_changed || other.graph_changed,
            visual_changed: self.visual_changed || other.visual_changed,
        }
    }
}

pub struct InteractionController {
    store: GraphStore,
    viewport: ViewportTracker,
    state: InteractionState,
    config: CanvasConfig,
    /// Note sizes measured by the rendering engine, for hit testing.
    sizes: HashMap<NoteId, Size>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl InteractionController {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            store: GraphStore::new(),
            viewport: ViewportTracker::new(),
            state: InteractionState::default(),
            config,
            sizes: HashMap::new(),
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Record a note's rendered size. Ignored for unknown notes or
    /// non-finite sizes.
    pub fn set_note_size(&mut self, id: NoteId, size: Size) -> bool {
        if !self.store.contains_note(id) {
            log::trace!("size for unknown note {id} ignored");
            return false;
        }
        if !size.is_finite() || size.width < 0.0 || size.height < 0.0 {
            log::warn!("invalid size {size:?} for {id} ignored");
            return false;
        }
        self.sizes.insert(id, size) != Some(size)
    }

    /// Expire the spawn ripple. Returns `true` if decorations changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.state.expire_ripple(now_ms)
    }

    /// Decorations for the current frame.
    pub fn decorations(&self, theme: &CanvasTheme, now_ms: f64) -> Decorations {
        ng_render::resolve(
            &self.store,
            &self.state,
            self.viewport.viewport(),
            &self.config,
            theme,
            now_ms,
        )
    }

    /// Hit-test a screen point against notes and their handles.
    pub fn hit(&self, screen: Point) -> Option<Hit> {
        let canvas = to_canvas_space(screen, self.viewport.viewport())?;
        hit_test(
            &self.store,
            &self.sizes,
            canvas,
            self.config.handle_hover_padding,
        )
    }

    /// Canvas-space centre of a handle, once its note has a measured size.
    pub fn handle_position(&self, anchor: ConnectionAnchor) -> Option<Point> {
        let note = self.store.note(anchor.note)?;
        let size = self.sizes.get(&anchor.note)?;
        Some(handle_anchor(
            note_bounds(note.position, *size),
            anchor.handle,
            self.config.handle_offset,
        ))
    }

    // ─── Dispatch ────────────────────────────────────────────────────────

    pub fn dispatch(&mut self, event: &CanvasEvent) -> Outcome {
        match event {
            CanvasEvent::PointerDown { point } => self.on_pointer_down(*point),
            CanvasEvent::PointerMove { point } => self.on_pointer_move(*point),
            CanvasEvent::PointerUp { point } => self.on_pointer_up(*point),
            CanvasEvent::DoubleClick {
                target,
                point,
                time_ms,
            } => self.on_double_click(*target, *point, *time_ms),
            CanvasEvent::Click { target } => self.on_click(*target),
            CanvasEvent::NodeDragStart { id } => self.on_drag_start(*id),
            CanvasEvent::NodeDrag { id, position } => self.on_drag(*id, *position),
            CanvasEvent::NodeDragStop { id } => self.on_drag_stop(*id),
            CanvasEvent::ConnectStart { anchor } => Outcome::visual(self.begin_connection(*anchor)),
            CanvasEvent::ConnectEnd => Outcome::visual(self.abort_connection()),
            CanvasEvent::ConnectionComplete { from, to } => self.on_connection_complete(*from, *to),
            CanvasEvent::ViewportChange { pan, zoom } => {
                Outcome::visual(self.viewport.update(*pan, *zoom))
            }
            CanvasEvent::Key {
                focus,
                key,
                modifiers,
            } => match ShortcutMap::resolve(key, *modifiers, focus.is_some()) {
                Some(action) => self.on_shortcut(*focus, action),
                None => Outcome::NONE,
            },
            CanvasEvent::Note { id, intent } => self.on_note_intent(*id, intent),
        }
    }

    /// Apply a mutation batch and drop transient state of removed notes.
    fn apply(&mut self, mutations: Vec<GraphMutation>) -> Outcome {
        let mut visual = false;
        for m in &mutations {
            if let GraphMutation::RemoveNote { id } = m {
                visual |= self.state.forget_note(*id);
                self.sizes.remove(id);
            }
        }
        let changed = self.store.apply_all(mutations);
        Outcome {
            graph_changed: changed,
            visual_changed: changed || visual,
        }
    }

    // ─── Pointer stream ──────────────────────────────────────────────────

    fn on_pointer_down(&mut self, point: Point) -> Outcome {
        if !point.is_finite() {
            log::warn!("pointer-down at non-finite {point:?} skipped");
            return Outcome::NONE;
        }
        let hit = self.hit(point);
        let inside = match hit {
            Some(Hit::Note(id)) => Some(id),
            _ => None,
        };

        let mut mutations = Vec::new();
        for id in self.store.editing_notes() {
            if Some(id) != inside {
                mutations.extend(self.leave_edit(id));
            }
        }
        let outcome = self.apply(mutations);

        let started = match hit {
            Some(Hit::Handle(anchor)) => self.begin_connection(anchor),
            _ => false,
        };
        outcome.merge(Outcome::visual(started))
    }

    fn on_pointer_move(&mut self, point: Point) -> Outcome {
        if !point.is_finite() {
            log::warn!("pointer-move at non-finite {point:?} skipped");
            return Outcome::NONE;
        }
        let (note, handle) = match self.hit(point) {
            Some(Hit::Note(id)) => (Some(id), None),
            Some(Hit::Handle(anchor)) => (None, Some(anchor)),
            None => (None, None),
        };
        let changed = self.state.hovered_note != note || self.state.hovered_handle != handle;
        self.state.hovered_note = note;
        self.state.hovered_handle = handle;
        Outcome::visual(changed)
    }

    fn on_pointer_up(&mut self, point: Point) -> Outcome {
        let mut outcome = Outcome::NONE;

        if let Some(from) = self.state.connecting_from {
            let end = if point.is_finite() {
                match self.hit(point) {
                    Some(Hit::Handle(anchor)) => Some(anchor),
                    _ => None,
                }
            } else {
                log::warn!("pointer-up at non-finite {point:?}; connection aborted");
                None
            };
            outcome = match end {
                Some(to) => self.complete_connection(from, to),
                None => Outcome::visual(self.abort_connection()),
            };
        }

        // Recover a drag whose stop event never arrived
        if let Some(id) = self.state.dragging_note {
            log::debug!("pointer-up ended dangling drag of {id}");
            outcome = outcome.merge(self.on_drag_stop(id));
        }
        outcome
    }

    // ─── Engine callbacks ────────────────────────────────────────────────

    fn on_double_click(&mut self, target: PointerTarget, point: Point, time_ms: f64) -> Outcome {
        if target != PointerTarget::Pane {
            log::trace!("double-click on {target:?} ignored");
            return Outcome::NONE;
        }
        let spawn = to_canvas_space(point, self.viewport.viewport())
            .and_then(|p| snap_to_grid(p, self.config.grid));
        let Some(position) = spawn else {
            log::warn!("double-click at {point:?} skipped: cannot map to canvas");
            return Outcome::NONE;
        };

        let id = NoteId::fresh();
        log::debug!("spawn {id} at {position:?}");
        let outcome = self.apply(vec![GraphMutation::AddNote {
            id,
            position,
            content: String::new(),
        }]);
        if time_ms.is_finite() {
            self.state.ripple = Some(Ripple {
                origin: position,
                started_ms: time_ms,
                ttl_ms: self.config.ripple_ttl_ms,
            });
        }
        outcome
    }

    fn on_click(&mut self, target: PointerTarget) -> Outcome {
        match target {
            PointerTarget::Edge(id) => self.apply(vec![GraphMutation::ToggleEdgeSelection { id }]),
            PointerTarget::Pane => self.apply(vec![GraphMutation::ClearSelection]),
            PointerTarget::Note(_) | PointerTarget::Handle(_) => Outcome::NONE,
        }
    }

    fn on_drag_start(&mut self, id: NoteId) -> Outcome {
        match self.store.note(id) {
            None => {
                log::trace!("drag start on missing {id}");
                return Outcome::NONE;
            }
            Some(note) if note.editing => {
                log::debug!("drag of {id} refused: editing");
                return Outcome::NONE;
            }
            Some(_) => {}
        }
        self.state.dragging_note = Some(id);
        self.apply(vec![GraphMutation::UpdateNote {
            id,
            patch: NotePatch::dragging(true),
        }])
        .merge(Outcome::visual(true))
    }

    fn on_drag(&mut self, id: NoteId, position: Point) -> Outcome {
        if !position.is_finite() {
            log::warn!("drag of {id} to non-finite {position:?} skipped");
            return Outcome::NONE;
        }
        if self.store.note(id).is_none_or(|n| n.editing) {
            return Outcome::NONE;
        }
        self.apply(vec![GraphMutation::UpdateNote {
            id,
            patch: NotePatch::position(position),
        }])
    }

    fn on_drag_stop(&mut self, id: NoteId) -> Outcome {
        let was_tracked = self.state.dragging_note == Some(id);
        if was_tracked {
            self.state.dragging_note = None;
        }
        self.apply(vec![GraphMutation::UpdateNote {
            id,
            patch: NotePatch::dragging(false),
        }])
        .merge(Outcome::visual(was_tracked))
    }

    // ─── Connections ─────────────────────────────────────────────────────

    fn begin_connection(&mut self, anchor: ConnectionAnchor) -> bool {
        match self.store.note(anchor.note) {
            Some(note) if !note.editing => {
                log::debug!("connecting from {}.{}", anchor.note, anchor.handle);
                self.state.connecting_from = Some(anchor);
                true
            }
            Some(_) => {
                log::debug!("connection from editing {} refused", anchor.note);
                false
            }
            None => {
                log::trace!("connection from missing {}", anchor.note);
                false
            }
        }
    }

    fn abort_connection(&mut self) -> bool {
        self.state.connecting_from.take().is_some()
    }

    /// Engine-side completion. Honored only for the gesture in progress, so
    /// a release already handled by pointer-up cannot add a second edge.
    fn on_connection_complete(&mut self, from: ConnectionAnchor, to: ConnectionAnchor) -> Outcome {
        match self.state.connecting_from {
            Some(origin) if origin == from || origin == to => self.complete_connection(from, to),
            Some(origin) => {
                log::debug!(
                    "completion {}.{} → {}.{} does not match gesture from {}.{}",
                    from.note,
                    from.handle,
                    to.note,
                    to.handle,
                    origin.note,
                    origin.handle
                );
                Outcome::NONE
            }
            None => {
                log::trace!("completion with no gesture in progress ignored");
                Outcome::NONE
            }
        }
    }

    fn complete_connection(&mut self, start: ConnectionAnchor, end: ConnectionAnchor) -> Outcome {
        let cleared = Outcome::visual(self.abort_connection());
        let Some((from, to)) = self
            .store
            .resolve_connection(start, end, self.config.dedupe_edges)
        else {
            log::debug!(
                "connection {}.{} → {}.{} refused",
                start.note,
                start.handle,
                end.note,
                end.handle
            );
            return cleared;
        };
        let id = EdgeId::fresh();
        self.apply(vec![GraphMutation::AddEdge { id, from, to }])
            .merge(cleared)
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    /// Leave edit mode: keep non-empty content, discard an empty note unless
    /// connections still hang off it.
    fn leave_edit(&self, id: NoteId) -> Vec<GraphMutation> {
        let Some(note) = self.store.note(id) else {
            return Vec::new();
        };
        if !note.editing || note.dragging {
            return Vec::new();
        }
        if note.is_blank() && self.store.is_isolated(id) {
            log::debug!("discarding empty {id}");
            vec![GraphMutation::RemoveNote { id }]
        } else {
            vec![GraphMutation::UpdateNote {
                id,
                patch: NotePatch::editing(false),
            }]
        }
    }

    /// Commit non-empty content; empty content stays in edit mode.
    fn commit_edit(&self, id: NoteId) -> Vec<GraphMutation> {
        match self.store.note(id) {
            Some(note) if note.editing && !note.is_blank() => vec![GraphMutation::UpdateNote {
                id,
                patch: NotePatch::editing(false),
            }],
            _ => Vec::new(),
        }
    }

    fn on_shortcut(&mut self, focus: Option<NoteId>, action: ShortcutAction) -> Outcome {
        if let Some(id) = focus
            && self.store.note(id).is_some_and(|n| n.dragging)
        {
            log::trace!("{action:?} on dragging {id} ignored");
            return Outcome::NONE;
        }
        let mutations = match (action, focus) {
            (ShortcutAction::Commit, Some(id)) => self.commit_edit(id),
            (ShortcutAction::Cancel, Some(id)) => self.leave_edit(id),
            (ShortcutAction::DeleteSelection, _) => self
                .store
                .selected_edges()
                .into_iter()
                .map(|id| GraphMutation::RemoveEdge { id })
                .collect(),
            (ShortcutAction::Deselect, _) => vec![GraphMutation::ClearSelection],
            _ => Vec::new(),
        };
        self.apply(mutations)
    }

    fn on_note_intent(&mut self, id: NoteId, intent: &NoteIntent) -> Outcome {
        let Some(note) = self.store.note(id) else {
            log::trace!("{intent:?} on missing {id}");
            return Outcome::NONE;
        };
        let mutations = match intent {
            NoteIntent::ContentChanged(text) if note.editing => vec![GraphMutation::UpdateNote {
                id,
                patch: NotePatch::content(text.clone()),
            }],
            NoteIntent::ContentChanged(_) => {
                log::debug!("content change on committed {id} ignored");
                Vec::new()
            }
            NoteIntent::CommitEdit | NoteIntent::Blur => self.commit_edit(id),
            NoteIntent::CancelEdit => self.leave_edit(id),
            NoteIntent::BeginEdit if !note.editing && !note.dragging => {
                if self.state.connecting_from.is_some_and(|a| a.note == id) {
                    self.state.connecting_from = None;
                }
                vec![GraphMutation::UpdateNote {
                    id,
                    patch: NotePatch::editing(true),
                }]
            }
            NoteIntent::BeginEdit => Vec::new(),
            NoteIntent::Remove => vec![GraphMutation::RemoveNote { id }],
        };
        self.apply(mutations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use ng_core::{Handle, Vec2};
    use pretty_assertions::assert_eq;

    fn spawn(ctl: &mut InteractionController, x: f64, y: f64, text: &str) -> NoteId {
        ctl.dispatch(&CanvasEvent::DoubleClick {
            target: PointerTarget::Pane,
            point: Point::new(x, y),
            time_ms: 0.0,
        });
        let id = ctl.store().notes().last().map(|n| n.id).unwrap();
        if !text.is_empty() {
            ctl.dispatch(&CanvasEvent::note(id, NoteIntent::ContentChanged(text.into())));
            ctl.dispatch(&CanvasEvent::note(id, NoteIntent::CommitEdit));
        }
        id
    }

    #[test]
    fn double_click_on_note_spawns_nothing() {
        let mut ctl = InteractionController::default();
        let a = spawn(&mut ctl, 100.0, 100.0, "a");
        let out = ctl.dispatch(&CanvasEvent::DoubleClick {
            target: PointerTarget::Note(a),
            point: Point::new(100.0, 100.0),
            time_ms: 0.0,
        });
        assert_eq!(out, Outcome::NONE);
        assert_eq!(ctl.store().note_count(), 1);
    }

    #[test]
    fn spawn_respects_pan_and_zoom() {
        let mut ctl = InteractionController::default();
        ctl.dispatch(&CanvasEvent::ViewportChange {
            pan: Vec2::new(50.0, 50.0),
            zoom: 2.0,
        });
        let id = spawn(&mut ctl, 250.0, 250.0, "");
        // (250 - 50) / 2 = 100 → 97
        assert_eq!(ctl.store().note(id).map(|n| n.position), Some(Point::new(97.0, 97.0)));
    }

    #[test]
    fn enter_with_empty_content_stays_editing() {
        let mut ctl = InteractionController::default();
        let id = spawn(&mut ctl, 0.0, 0.0, "");
        ctl.dispatch(&CanvasEvent::note(id, NoteIntent::ContentChanged("   ".into())));
        ctl.dispatch(&CanvasEvent::key(Some(id), "Enter"));
        assert_eq!(ctl.store().note(id).map(|n| n.editing), Some(true));
    }

    #[test]
    fn shift_enter_does_not_commit() {
        let mut ctl = InteractionController::default();
        let id = spawn(&mut ctl, 0.0, 0.0, "");
        ctl.dispatch(&CanvasEvent::note(id, NoteIntent::ContentChanged("line".into())));
        ctl.dispatch(&CanvasEvent::Key {
            focus: Some(id),
            key: "Enter".into(),
            modifiers: Modifiers::shift(),
        });
        assert_eq!(ctl.store().note(id).map(|n| n.editing), Some(true));
    }

    #[test]
    fn blur_commits_but_never_removes() {
        let mut ctl = InteractionController::default();
        let empty = spawn(&mut ctl, 0.0, 0.0, "");
        ctl.dispatch(&CanvasEvent::note(empty, NoteIntent::Blur));
        assert_eq!(ctl.store().note(empty).map(|n| n.editing), Some(true));

        ctl.dispatch(&CanvasEvent::note(empty, NoteIntent::ContentChanged("x".into())));
        ctl.dispatch(&CanvasEvent::note(empty, NoteIntent::Blur));
        assert_eq!(ctl.store().note(empty).map(|n| n.editing), Some(false));
    }

    #[test]
    fn begin_edit_reopens_committed_note() {
        let mut ctl = InteractionController::default();
        let id = spawn(&mut ctl, 0.0, 0.0, "hello");
        ctl.dispatch(&CanvasEvent::note(id, NoteIntent::BeginEdit));
        let note = ctl.store().note(id).unwrap();
        assert!(note.editing);
        assert_eq!(note.content, "hello");
    }

    #[test]
    fn content_ignored_outside_edit_mode() {
        let mut ctl = InteractionController::default();
        let id = spawn(&mut ctl, 0.0, 0.0, "kept");
        let out = ctl.dispatch(&CanvasEvent::note(id, NoteIntent::ContentChanged("lost".into())));
        assert!(!out.graph_changed);
        assert_eq!(ctl.store().note(id).map(|n| n.content.as_str()), Some("kept"));
    }

    #[test]
    fn editing_note_cannot_drag_or_connect() {
        let mut ctl = InteractionController::default();
        let id = spawn(&mut ctl, 0.0, 0.0, "");
        ctl.dispatch(&CanvasEvent::NodeDragStart { id });
        assert_eq!(ctl.state().dragging_note, None);
        ctl.dispatch(&CanvasEvent::ConnectStart {
            anchor: ConnectionAnchor::new(id, Handle::Right),
        });
        assert!(!ctl.state().is_connecting());
    }

    #[test]
    fn keys_ignored_while_dragging() {
        let mut ctl = InteractionController::default();
        let id = spawn(&mut ctl, 0.0, 0.0, "a");
        ctl.dispatch(&CanvasEvent::NodeDragStart { id });
        // Stale focus from before the drag
        let out = ctl.dispatch(&CanvasEvent::key(Some(id), "Escape"));
        assert_eq!(out, Outcome::NONE);
        assert_eq!(ctl.store().note(id).map(|n| n.dragging), Some(true));
    }

    #[test]
    fn non_finite_drag_is_skipped() {
        let mut ctl = InteractionController::default();
        let id = spawn(&mut ctl, 0.0, 0.0, "a");
        let before = ctl.store().note(id).map(|n| n.position);
        ctl.dispatch(&CanvasEvent::NodeDragStart { id });
        ctl.dispatch(&CanvasEvent::NodeDrag {
            id,
            position: Point::new(f64::NAN, 0.0),
        });
        assert_eq!(ctl.store().note(id).map(|n| n.position), before);
    }

    #[test]
    fn invalid_viewport_is_kept_out() {
        let mut ctl = InteractionController::default();
        let out = ctl.dispatch(&CanvasEvent::ViewportChange {
            pan: Vec2::ZERO,
            zoom: 0.0,
        });
        assert_eq!(out, Outcome::NONE);
        assert_eq!(ctl.viewport(), Viewport::default());
    }

    #[test]
    fn tick_expires_ripple() {
        let mut ctl = InteractionController::default();
        ctl.dispatch(&CanvasEvent::DoubleClick {
            target: PointerTarget::Pane,
            point: Point::new(10.0, 10.0),
            time_ms: 1_000.0,
        });
        assert!(ctl.state().ripple.is_some());
        assert!(!ctl.tick(1_200.0));
        assert!(ctl.tick(1_500.0));
        assert!(ctl.state().ripple.is_none());
    }

    #[test]
    fn handle_position_needs_a_size() {
        let mut ctl = InteractionController::default();
        let id = spawn(&mut ctl, 100.0, 100.0, "a");
        let right = ConnectionAnchor::new(id, Handle::Right);
        assert_eq!(ctl.handle_position(right), None);

        ctl.set_note_size(id, Size::new(200.0, 80.0));
        // (97 + 200 + 24, 97 + 40)
        assert_eq!(ctl.handle_position(right), Some(Point::new(321.0, 137.0)));
    }

    #[test]
    fn note_size_only_for_known_notes() {
        let mut ctl = InteractionController::default();
        let id = spawn(&mut ctl, 0.0, 0.0, "a");
        assert!(ctl.set_note_size(id, Size::new(200.0, 80.0)));
        assert!(!ctl.set_note_size(id, Size::new(200.0, 80.0)));
        assert!(!ctl.set_note_size(NoteId::intern("ghost_note"), Size::new(1.0, 1.0)));
        assert!(!ctl.set_note_size(id, Size::new(f64::INFINITY, 1.0)));
    }
}
