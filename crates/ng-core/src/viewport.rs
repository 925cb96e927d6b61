//! Viewport tracking.
//!
//! The rendering engine owns pan and zoom; it reports every change and we
//! keep the latest accepted value for coordinate mapping.

use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Pan offset (screen units) and zoom factor applied to canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub pan: Vec2,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(pan: Vec2, zoom: f64) -> Self {
        Self { pan, zoom }
    }

    /// Finite pan and a finite, strictly positive zoom.
    pub fn is_valid(&self) -> bool {
        self.pan.is_finite() && self.zoom.is_finite() && self.zoom > 0.0
    }
}

/// Holds the last valid viewport reported by the rendering engine.
/// Read-only for everything except the controller's viewport-change route.
#[derive(Debug, Clone, Default)]
pub struct ViewportTracker {
    current: Viewport,
}

impl ViewportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pan/zoom frame. Returns `true` if the stored value changed.
    /// Non-finite values or a non-positive zoom are dropped and the previous
    /// viewport stays in effect.
    pub fn update(&mut self, pan: Vec2, zoom: f64) -> bool {
        let next = Viewport::new(pan, zoom);
        if !next.is_valid() {
            log::warn!("ignoring malformed viewport pan={pan:?} zoom={zoom}");
            return false;
        }
        if next == self.current {
            return false;
        }
        self.current = next;
        true
    }

    pub fn viewport(&self) -> Viewport {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_latest_frame() {
        let mut tracker = ViewportTracker::new();
        assert!(tracker.update(Vec2::new(10.0, -4.0), 1.5));
        assert!(tracker.update(Vec2::new(12.0, -4.0), 1.5));
        assert_eq!(tracker.viewport(), Viewport::new(Vec2::new(12.0, -4.0), 1.5));
    }

    #[test]
    fn identical_frame_is_not_a_change() {
        let mut tracker = ViewportTracker::new();
        assert!(!tracker.update(Vec2::ZERO, 1.0));
    }

    #[test]
    fn rejects_malformed_frames() {
        let mut tracker = ViewportTracker::new();
        tracker.update(Vec2::new(5.0, 5.0), 2.0);

        assert!(!tracker.update(Vec2::new(f64::NAN, 0.0), 1.0));
        assert!(!tracker.update(Vec2::ZERO, 0.0));
        assert!(!tracker.update(Vec2::ZERO, -1.0));
        assert!(!tracker.update(Vec2::ZERO, f64::INFINITY));

        assert_eq!(tracker.viewport(), Viewport::new(Vec2::new(5.0, 5.0), 2.0));
    }
}
