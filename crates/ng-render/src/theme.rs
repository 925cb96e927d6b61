//! Decoration colors.
//!
//! The rendering engine styles notes itself; the colors here are the ones
//! whose choice depends on interaction state (edge highlight, handle glow,
//! ripple tint, drag shadow) plus the background grid dots.

use serde::{Serialize, Serializer};

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from 8-bit channels.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let to8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (to8(self.r), to8(self.g), to8(self.b), to8(self.a));
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

// ─── Theme ───────────────────────────────────────────────────────────────

/// Theme-dependent decoration colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTheme {
    /// Connection stroke, handle hover fill, ripple peak.
    pub accent: Color,
    /// Blurred underlay drawn beneath connections.
    pub accent_glow: Color,
    /// Stroke of a selected connection.
    pub selected: Color,
    /// Hovered handle that would refuse the in-progress connection.
    pub refused: Color,
    pub handle_fill: Color,
    pub handle_border: Color,
    pub grid_dot: Color,
    pub shadow_ink: Color,
    pub shadow_accent: Color,
}

const TERMINAL_GREEN: Color = Color::rgb8(0x0E, 0xF9, 0x28);

impl CanvasTheme {
    /// Terminal theme: black canvas, phosphor-green accents.
    pub fn dark() -> Self {
        Self {
            accent: TERMINAL_GREEN,
            accent_glow: TERMINAL_GREEN.with_alpha(0.2),
            selected: Color::rgb8(0xFF, 0xFF, 0xFF),
            refused: Color::rgb8(0xFF, 0x00, 0x00),
            handle_fill: TERMINAL_GREEN,
            handle_border: Color::rgb8(0x0E, 0xF9, 0x28).with_alpha(0.6),
            grid_dot: Color::rgb8(0xAB, 0xAB, 0xAB).with_alpha(0.4),
            shadow_ink: Color::rgb8(0x00, 0x00, 0x00),
            shadow_accent: Color::rgb8(0x05, 0xFD, 0x11),
        }
    }

    /// Light theme: paper canvas, darker green so strokes stay legible.
    pub fn light() -> Self {
        let green = Color::rgb8(0x0A, 0x9A, 0x1C);
        Self {
            accent: green,
            accent_glow: green.with_alpha(0.15),
            selected: Color::rgb8(0x1C, 0x1C, 0x1E),
            refused: Color::rgb8(0xD7, 0x00, 0x15),
            handle_fill: green,
            handle_border: Color::rgb8(0x86, 0x86, 0x8B),
            grid_dot: Color::rgb8(0x86, 0x86, 0x8B).with_alpha(0.3),
            shadow_ink: Color::rgb8(0x1C, 0x1C, 0x1E),
            shadow_accent: green,
        }
    }
}

impl Default for CanvasTheme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_colors_emit_six_digits() {
        assert_eq!(Color::rgb8(0x0E, 0xF9, 0x28).to_hex(), "#0EF928");
        assert_eq!(Color::rgba(2.0, -1.0, 0.0, 1.0).to_hex(), "#FF0000");
    }

    #[test]
    fn translucent_colors_emit_alpha() {
        assert_eq!(TERMINAL_GREEN.with_alpha(0.2).to_hex(), "#0EF92833");
        assert_eq!(CanvasTheme::dark().accent.to_hex(), "#0EF928");
    }
}
