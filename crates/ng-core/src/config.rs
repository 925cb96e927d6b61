//! Canvas configuration.
//!
//! Every field has a default matching the stock whiteboard, so hosts only
//! send the values they want to override:
//!
//! ```json
//! { "grid": { "cell_size": 32 }, "dedupe_edges": true }
//! ```

use serde::Deserialize;

// ─── Grid ─────────────────────────────────────────────────────────────────

/// The snap grid new notes are aligned to.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Distance between two grid dots, in canvas units. Default: **24**.
    pub cell_size: f64,

    /// Offset of a dot centre from the cell origin. The dot pattern draws
    /// its circles at `(r, r)` with `r = 1`, so spawn points land on
    /// `k * cell_size + 1`. Default: **1**.
    pub dot_offset: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 24.0,
            dot_offset: 1.0,
        }
    }
}

// ─── Canvas ───────────────────────────────────────────────────────────────

/// Configuration consumed by the interaction controller and the decoration
/// resolver.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub grid: GridConfig,

    /// How long the spawn ripple stays visible. Default: **500 ms**.
    pub ripple_ttl_ms: f64,

    /// Width of the band beyond a note's border in which the pointer hovers
    /// the nearest handle. Default: **60**.
    pub handle_hover_padding: f64,

    /// Distance of a handle's centre from the note border. Default: **24**.
    pub handle_offset: f64,

    /// Reject a connection that exactly repeats an existing one (same
    /// endpoints and handles). Default: **false**, parallel edges are kept.
    pub dedupe_edges: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            ripple_ttl_ms: 500.0,
            handle_hover_padding: 60.0,
            handle_offset: 24.0,
            dedupe_edges: false,
        }
    }
}

impl CanvasConfig {
    /// Parse a (possibly partial) JSON configuration.
    ///
    /// # Errors
    /// Returns the deserializer message for malformed JSON or for a grid
    /// whose cell size is not a positive finite number.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self = serde_json::from_str(json).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        let cell = self.grid.cell_size;
        if !cell.is_finite() || cell <= 0.0 {
            return Err(format!("grid.cell_size must be positive, got {cell}"));
        }
        if !self.grid.dot_offset.is_finite() {
            return Err("grid.dot_offset must be finite".to_string());
        }
        if !self.ripple_ttl_ms.is_finite() || self.ripple_ttl_ms < 0.0 {
            return Err(format!(
                "ripple_ttl_ms must be non-negative, got {}",
                self.ripple_ttl_ms
            ));
        }
        Ok(())
    }
}
