//! Core types for the rasterizer

use serde::{Serialize, Deserialize};
use super::lighting::Light;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Apply shading (multiply by intensity 0.0-1.0)
    pub fn shade(self, intensity: f32) -> Self {
        let i = intensity.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * i) as u8,
            g: (self.g as f32 * i) as u8,
            b: (self.b as f32 * i) as u8,
            a: self.a,
        }
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// How surviving primitives are handed to the canvas
#[derive(Debug, Clone, Copy)]
pub enum DrawMode<'a> {
    /// Filled polygon, one flat-shaded color per primitive
    Flat(&'a [Light]),
    /// Filled polygon in the raw mesh color
    Unlit,
    /// Closed line loop in the raw mesh color, no shading
    Wireframe,
}

/// Counters for one draw pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    pub back_faces: usize,
    pub outside_frustum: usize,
    /// Primitives whose buffers hold no valid projection this frame
    pub unprojected: usize,
}
