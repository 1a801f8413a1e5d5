//! Strawberry: flat-shaded software 3D rasterizer
//!
//! - Homogeneous projection with a cached view-projection matrix
//! - Painter's algorithm with backface and averaged frustum rejection
//! - Per-primitive shading from ambient, point and directional lights
//! - Wavefront OBJ models, RON configuration

pub mod config;
pub mod input;
pub mod logging;
pub mod rasterizer;
pub mod world;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
