//! Flat (per-primitive) shading

use super::lighting::Light;
use super::primitive::Primitive;
use super::types::Color;

/// Summed light intensity for a primitive, in 0.0-1.0
///
/// Ambient lights add their ambience; every other light adds the cosine
/// between the average normal and the direction to the light, ignoring
/// lights behind the surface.
pub fn flat_intensity(primitive: &Primitive, lights: &[Light]) -> f32 {
    let normal = primitive.average_normal();
    let total = lights.iter().fold(0.0_f32, |total, light| match light {
        Light::Ambient { ambience } => total + *ambience,
        _ => match light.vector_to_primitive(primitive) {
            Some(to_light) => total + normal.dot(to_light).max(0.0),
            None => total,
        },
    });
    total.min(1.0)
}

/// One color for the whole polygon
pub fn flat_shade(color: Color, primitive: &Primitive, lights: &[Light]) -> Color {
    color.shade(flat_intensity(primitive, lights))
}
