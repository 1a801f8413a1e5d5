//! Light sources

use serde::{Serialize, Deserialize};
use super::math::Vec3;
use super::primitive::Primitive;
use super::types::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Light {
    /// Constant term added to every primitive
    Ambient { ambience: f32 },
    Point {
        position: Vec3,
        #[serde(default = "white")]
        color: Color,
    },
    /// `direction` is the way the light travels, kept unit length
    Directional {
        direction: Vec3,
        #[serde(default = "white")]
        color: Color,
    },
}

fn white() -> Color {
    Color::WHITE
}

impl Light {
    pub fn ambient(ambience: f32) -> Self {
        Light::Ambient { ambience }
    }

    pub fn point(position: Vec3) -> Self {
        Light::Point { position, color: Color::WHITE }
    }

    pub fn directional(direction: Vec3) -> Self {
        Light::Directional { direction: direction.normalize(), color: Color::WHITE }
    }

    /// Unit vector from the primitive toward the light. Ambient lights have none.
    pub fn vector_to_primitive(&self, primitive: &Primitive) -> Option<Vec3> {
        match self {
            Light::Ambient { .. } => None,
            Light::Point { position, .. } => Some((*position - primitive.center()).normalize()),
            Light::Directional { direction, .. } => Some(-*direction),
        }
    }

    pub fn translate(&mut self, t: Vec3) {
        if let Light::Point { position, .. } = self {
            *position = *position + t;
        }
    }

    /// Re-normalize directions after deserialization
    pub(crate) fn normalized(self) -> Self {
        match self {
            Light::Directional { direction, color } => {
                Light::Directional { direction: direction.normalize(), color }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_at_origin() -> Primitive {
        Primitive::new(
            &[Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 3.0)],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_point_light_vector() {
        let p = triangle_at_origin();
        let light = Light::point(Vec3::new(0.0, 5.0, 1.0));
        let v = light.vector_to_primitive(&p).unwrap();
        assert!((v - Vec3::UP).len() < 0.0001);
    }

    #[test]
    fn test_directional_light_is_negated_and_normalized() {
        let p = triangle_at_origin();
        let light = Light::directional(Vec3::new(0.0, -4.0, 0.0));
        assert_eq!(light.vector_to_primitive(&p), Some(Vec3::UP));
    }

    #[test]
    fn test_ambient_has_no_vector() {
        assert_eq!(Light::ambient(0.2).vector_to_primitive(&triangle_at_origin()), None);
    }

    #[test]
    fn test_translate_only_moves_point_lights() {
        let t = Vec3::new(1.0, 2.0, 3.0);
        let mut point = Light::point(Vec3::ZERO);
        point.translate(t);
        assert_eq!(point, Light::point(t));

        let mut dir = Light::directional(Vec3::UP);
        dir.translate(t);
        assert_eq!(dir, Light::directional(Vec3::UP));
    }
}
