//! Flat-shaded software rasterizer
//!
//! Pipeline per frame:
//! - Project primitives to clip space, then to pixels via perspective divide
//! - Painter's algorithm (farthest average W first), no z-buffer
//! - Backface and averaged frustum rejection, no polygon splitting
//! - One flat color per primitive from ambient, point and directional lights

mod camera;
mod lighting;
mod math;
mod primitive;
mod render;
mod shading;
mod types;

pub use camera::*;
pub use lighting::*;
pub use math::*;
pub use primitive::*;
pub use render::*;
pub use shading::*;
pub use types::*;

/// Default framebuffer size
pub const WIDTH: usize = 800;
pub const HEIGHT: usize = 800;
