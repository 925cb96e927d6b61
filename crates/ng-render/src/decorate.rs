//! Store + interaction state → per-frame decorations.
//!
//! The rendering engine owns drawing. This module only decides how each note,
//! handle and connection should look right now (scale, shadow, handle glow,
//! stroke) and where the spawn ripple dots go. Everything is recomputed from
//! scratch on each call; no state is kept between frames.

use crate::theme::{CanvasTheme, Color};
use ng_core::grid::cell_offset;
use ng_core::{
    CanvasConfig, Connection, ConnectionAnchor, EdgeId, GraphStore, Handle, HandleRole,
    InteractionState, Note, NoteId, Point, Ripple, Viewport, to_screen_space,
};
use serde::Serialize;
use smallvec::SmallVec;

const DRAG_SCALE: f64 = 1.05;
const HOVER_SCALE: f64 = 1.02;
const DRAG_SHADOW: f64 = 16.0;
const HOVER_SHADOW: f64 = 8.0;
const REST_SHADOW: f64 = 4.0;
/// Opacity of editing notes while a connection is being drawn. They cannot
/// take part, so they fade back.
const UNAVAILABLE_OPACITY: f64 = 0.5;

const EDGE_WIDTH: f64 = 2.0;
const SELECTED_EDGE_WIDTH: f64 = 3.0;
const EDGE_DASH: [f64; 2] = [5.0, 5.0];

/// Ripple dots cover grid offsets `-RIPPLE_REACH..RIPPLE_REACH` (exclusive) on
/// each axis, clipped to a disc of radius `RIPPLE_REACH` cells.
const RIPPLE_REACH: i32 = 3;
const RIPPLE_STAGGER_SECS: f64 = 0.05;

// ─── Output types ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoteAnimation {
    None,
    Jitter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Cursor {
    Grab,
    Grabbing,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleDecoration {
    pub handle: Handle,
    pub role: HandleRole,
    pub visible: bool,
    /// Pointer is over this handle.
    pub highlighted: bool,
    /// Releasing here would complete the in-progress connection.
    pub accepts: bool,
    pub fill: Color,
    pub border: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDecoration {
    pub id: NoteId,
    pub opacity: f64,
    pub scale: f64,
    pub shadow_offset: f64,
    pub shadow_color: Color,
    pub animation: NoteAnimation,
    pub cursor: Cursor,
    pub handles: SmallVec<[HandleDecoration; 4]>,
    /// Edit (pencil) and delete (×) actions.
    pub show_actions: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeAnimation {
    FlowDash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeMarker {
    ArrowClosed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDecoration {
    pub id: EdgeId,
    pub stroke: Color,
    pub stroke_width: f64,
    pub dash: [f64; 2],
    pub animation: EdgeAnimation,
    /// Blurred underlay color.
    pub glow: Color,
    pub marker_end: EdgeMarker,
    pub selected: bool,
}

/// Style of the line that follows the pointer while connecting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionLineStyle {
    pub from: ConnectionAnchor,
    pub stroke: Color,
    pub stroke_width: f64,
    pub dash: [f64; 2],
    pub animation: EdgeAnimation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RippleDot {
    /// Screen space.
    pub center: Point,
    pub radius: f64,
    pub delay_secs: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decorations {
    pub notes: Vec<NoteDecoration>,
    pub edges: Vec<EdgeDecoration>,
    pub connection_line: Option<ConnectionLineStyle>,
    pub ripple: Vec<RippleDot>,
    /// Color of the background dot grid.
    pub grid_dot: Color,
}

// ─── Resolver ────────────────────────────────────────────────────────────

/// Resolve decorations for every note and connection, in store order.
pub fn resolve(
    store: &GraphStore,
    state: &InteractionState,
    viewport: Viewport,
    config: &CanvasConfig,
    theme: &CanvasTheme,
    now_ms: f64,
) -> Decorations {
    let notes = store
        .notes()
        .map(|note| decorate_note(store, note, state, config, theme))
        .collect();
    let edges = store
        .connections()
        .map(|conn| decorate_edge(conn, theme))
        .collect();

    let connection_line = state.connecting_from.map(|from| ConnectionLineStyle {
        from,
        stroke: theme.accent,
        stroke_width: EDGE_WIDTH,
        dash: EDGE_DASH,
        animation: EdgeAnimation::FlowDash,
    });

    let ripple = state
        .ripple
        .filter(|r| r.is_live(now_ms))
        .map(|r| ripple_dots(&r, viewport, config, theme))
        .unwrap_or_default();

    Decorations {
        notes,
        edges,
        connection_line,
        ripple,
        grid_dot: theme.grid_dot,
    }
}

fn decorate_note(
    store: &GraphStore,
    note: &Note,
    state: &InteractionState,
    config: &CanvasConfig,
    theme: &CanvasTheme,
) -> NoteDecoration {
    let dragging = note.dragging || state.dragging_note == Some(note.id);
    let hovered = state.is_hovering(note.id);

    let (scale, shadow_offset, shadow_color) = if dragging {
        (DRAG_SCALE, DRAG_SHADOW, theme.shadow_accent)
    } else if hovered && !note.editing {
        (HOVER_SCALE, HOVER_SHADOW, theme.shadow_ink)
    } else {
        (1.0, REST_SHADOW, theme.shadow_ink)
    };

    let cursor = if note.editing {
        Cursor::Text
    } else if dragging {
        Cursor::Grabbing
    } else {
        Cursor::Grab
    };

    let opacity = if state.is_connecting() && note.editing {
        UNAVAILABLE_OPACITY
    } else {
        1.0
    };

    let handles = Handle::ALL
        .iter()
        .map(|&handle| decorate_handle(store, note, handle, hovered, state, config, theme))
        .collect();

    NoteDecoration {
        id: note.id,
        opacity,
        scale,
        shadow_offset,
        shadow_color,
        animation: if dragging {
            NoteAnimation::Jitter
        } else {
            NoteAnimation::None
        },
        cursor,
        handles,
        show_actions: hovered && !note.editing && !dragging && !state.is_connecting(),
    }
}

fn decorate_handle(
    store: &GraphStore,
    note: &Note,
    handle: Handle,
    note_hovered: bool,
    state: &InteractionState,
    config: &CanvasConfig,
    theme: &CanvasTheme,
) -> HandleDecoration {
    let anchor = ConnectionAnchor::new(note.id, handle);
    let is_origin = state.connecting_from == Some(anchor);
    let highlighted = state.hovered_handle == Some(anchor);

    // While connecting, the origin note shows only the handle in use
    let visible = !note.editing
        && if state.connecting_from.is_some_and(|from| from.note == note.id) {
            is_origin
        } else {
            note_hovered
        };

    let accepts = match state.connecting_from {
        Some(from) if highlighted => store
            .resolve_connection(from, anchor, config.dedupe_edges)
            .is_some(),
        _ => false,
    };

    let fill = if is_origin || accepts || (highlighted && !state.is_connecting()) {
        theme.accent
    } else if highlighted {
        theme.refused
    } else {
        theme.handle_fill
    };
    let border = if is_origin || highlighted {
        fill
    } else {
        theme.handle_border
    };

    HandleDecoration {
        handle,
        role: handle.role(),
        visible,
        highlighted,
        accepts,
        fill,
        border,
    }
}

fn decorate_edge(conn: &Connection, theme: &CanvasTheme) -> EdgeDecoration {
    EdgeDecoration {
        id: conn.id,
        stroke: if conn.selected {
            theme.selected
        } else {
            theme.accent
        },
        stroke_width: if conn.selected {
            SELECTED_EDGE_WIDTH
        } else {
            EDGE_WIDTH
        },
        dash: EDGE_DASH,
        animation: EdgeAnimation::FlowDash,
        glow: theme.accent_glow,
        marker_end: EdgeMarker::ArrowClosed,
        selected: conn.selected,
    }
}

/// Dots around the spawn point, staggered outward by distance.
pub fn ripple_dots(
    ripple: &Ripple,
    viewport: Viewport,
    config: &CanvasConfig,
    theme: &CanvasTheme,
) -> Vec<RippleDot> {
    let reach = f64::from(RIPPLE_REACH);
    let mut dots = Vec::new();
    for dy in -RIPPLE_REACH..RIPPLE_REACH {
        for dx in -RIPPLE_REACH..RIPPLE_REACH {
            let distance = f64::from(dx).hypot(f64::from(dy));
            if distance > reach {
                continue;
            }
            let canvas = ripple.origin + cell_offset(dx, dy, config.grid);
            let Some(center) = to_screen_space(canvas, viewport) else {
                log::warn!("ripple at {:?} skipped: invalid viewport", ripple.origin);
                return Vec::new();
            };
            dots.push(RippleDot {
                center,
                radius: viewport.zoom,
                delay_secs: distance * RIPPLE_STAGGER_SECS,
                color: theme.accent,
            });
        }
    }
    dots
}
