//! Grid coordinate mapping: screen ↔ canvas space, and snapping to the dot
//! grid.
//!
//! All functions are pure. They are only defined for finite input; anything
//! else yields `None` so the caller can drop the gesture.

use crate::config::GridConfig;
use crate::viewport::Viewport;
use kurbo::{Point, Vec2};

/// Map a screen point (relative to the canvas element) into canvas space by
/// inverting pan and zoom: `(screen - pan) / zoom`.
pub fn to_canvas_space(screen: Point, viewport: Viewport) -> Option<Point> {
    if !screen.is_finite() || !viewport.is_valid() {
        return None;
    }
    let v = (screen.to_vec2() - viewport.pan) / viewport.zoom;
    Some(v.to_point())
}

/// Map a canvas point to screen space: `canvas * zoom + pan`.
pub fn to_screen_space(canvas: Point, viewport: Viewport) -> Option<Point> {
    if !canvas.is_finite() || !viewport.is_valid() {
        return None;
    }
    Some((canvas.to_vec2() * viewport.zoom + viewport.pan).to_point())
}

/// Snap a canvas point to the centre of the nearest grid dot:
/// `round((p - offset) / cell) * cell + offset` per axis.
///
/// Rounding is half-up so a point exactly between two dots goes to the
/// larger one. A coordinate whose snapped value is not finite, or does not
/// snap to itself, is kept as it is, so the result is finite and stable
/// under a second snap for all finite input.
pub fn snap_to_grid(point: Point, grid: GridConfig) -> Option<Point> {
    let cell = grid.cell_size;
    if !point.is_finite() || !cell.is_finite() || cell <= 0.0 || !grid.dot_offset.is_finite() {
        return None;
    }
    let lattice = |v: f64| round_half_up((v - grid.dot_offset) / cell) * cell + grid.dot_offset;
    let snap = |v: f64| {
        let s = lattice(v);
        if s.is_finite() && lattice(s) == s {
            s
        } else {
            log::trace!("{v} is off the representable lattice; left unsnapped");
            v
        }
    };
    Some(Point::new(snap(point.x), snap(point.y)))
}

/// Offset of grid cell `(dx, dy)` from a dot, in canvas units.
pub fn cell_offset(dx: i32, dy: i32, grid: GridConfig) -> Vec2 {
    Vec2::new(f64::from(dx) * grid.cell_size, f64::from(dy) * grid.cell_size)
}

fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}
