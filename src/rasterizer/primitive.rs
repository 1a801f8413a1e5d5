//! Planar polygons and meshes
//!
//! A `Primitive` owns its vertices plus two per-frame scratch buffers
//! (clip space and screen space) that are sized once at construction and
//! overwritten by every projection pass.

use super::math::{Mat4, Vec2, Vec3, Vec4};
use super::types::Color;

/// Reasons a primitive cannot be built
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    TooFewVertices(usize),
    NormalCountMismatch { vertices: usize, normals: usize },
    /// The first three vertices don't span a plane, so no face normal exists
    DegenerateFace,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::TooFewVertices(n) => {
                write!(f, "primitive needs at least 3 vertices, got {}", n)
            }
            GeometryError::NormalCountMismatch { vertices, normals } => {
                write!(f, "{} normals supplied for {} vertices", normals, vertices)
            }
            GeometryError::DegenerateFace => {
                write!(f, "first three vertices are coincident or collinear")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

const DEGENERATE_EPSILON: f32 = 1e-6;

/// One planar polygon
#[derive(Debug, Clone)]
pub struct Primitive {
    local_vertices: Vec<Vec4>,
    vertices: Vec<Vec4>,
    normals: Vec<Vec3>,
    average_normal: Vec3,
    center: Vec3,
    clip_buffer: Vec<Vec4>,
    screen_buffer: Vec<Vec2>,
    projected: bool,
}

impl Primitive {
    /// Build a polygon from its corners. With `normals == None` every vertex
    /// gets the face normal of the first three corners.
    pub fn new(vertices: &[Vec3], normals: Option<&[Vec3]>) -> Result<Self, GeometryError> {
        let count = vertices.len();
        if count < 3 {
            return Err(GeometryError::TooFewVertices(count));
        }

        let normals = match normals {
            Some(n) if n.len() != count => {
                return Err(GeometryError::NormalCountMismatch { vertices: count, normals: n.len() });
            }
            Some(n) => n.to_vec(),
            None => vec![face_normal(vertices[0], vertices[1], vertices[2])?; count],
        };

        let local_vertices: Vec<Vec4> = vertices.iter().map(|&v| Vec4::point(v)).collect();
        let inv = 1.0 / count as f32;
        let center = vertices.iter().fold(Vec3::ZERO, |acc, &v| acc + v) * inv;
        let average_normal = normals.iter().fold(Vec3::ZERO, |acc, &n| acc + n) * inv;

        Ok(Self {
            vertices: local_vertices.clone(),
            local_vertices,
            normals,
            average_normal,
            center,
            clip_buffer: vec![Vec4::default(); count],
            screen_buffer: vec![Vec2::default(); count],
            projected: false,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.local_vertices.len()
    }

    /// Vertices as first constructed
    pub fn local_vertices(&self) -> &[Vec4] {
        &self.local_vertices
    }

    /// Current vertices after translate/rotate
    pub fn vertices(&self) -> &[Vec4] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Mean of the construction-time normals. Not rotated by `rotate`.
    pub fn average_normal(&self) -> Vec3 {
        self.average_normal
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Moving a primitive invalidates its last projection
    pub fn translate(&mut self, t: Vec3) {
        for v in &mut self.vertices {
            v.x += t.x;
            v.y += t.y;
            v.z += t.z;
        }
        self.center = self.center + t;
        self.projected = false;
    }

    /// Rotate about `pivot`. `average_normal` keeps its construction value,
    /// so flat shading of a rotated primitive uses the original orientation.
    pub fn rotate(&mut self, rotation: &Mat4, pivot: Vec3) {
        let m = Mat4::translation(pivot) * *rotation * Mat4::translation(-pivot);
        for v in &mut self.vertices {
            *v = m.transform(*v);
        }
        self.center = m.transform(Vec4::point(self.center)).xyz();
        self.projected = false;
    }

    /// Clip-space coordinates from the last projection pass
    pub fn clip_buffer(&self) -> &[Vec4] {
        &self.clip_buffer
    }

    /// Pixel coordinates from the last projection pass
    pub fn screen_buffer(&self) -> &[Vec2] {
        &self.screen_buffer
    }

    /// True when the buffers hold a complete projection for this frame
    pub fn is_projected(&self) -> bool {
        self.projected
    }

    /// Split borrow used by the projection pass: (world vertices, clip, screen)
    pub(crate) fn frame_buffers_mut(&mut self) -> (&[Vec4], &mut [Vec4], &mut [Vec2]) {
        (&self.vertices, &mut self.clip_buffer, &mut self.screen_buffer)
    }

    pub(crate) fn set_projected(&mut self, projected: bool) {
        self.projected = projected;
    }

    pub fn average_w(&self) -> f32 {
        self.clip_average(|v| v.w)
    }

    pub fn average_clip_x(&self) -> f32 {
        self.clip_average(|v| v.x)
    }

    pub fn average_clip_y(&self) -> f32 {
        self.clip_average(|v| v.y)
    }

    pub fn average_clip_z(&self) -> f32 {
        self.clip_average(|v| v.z)
    }

    fn clip_average(&self, component: impl Fn(&Vec4) -> f32) -> f32 {
        self.clip_buffer.iter().map(component).sum::<f32>() / self.clip_buffer.len() as f32
    }
}

/// Normal from the winding of three corners: (p2 - p1) x (p3 - p2), unit length
fn face_normal(p1: Vec3, p2: Vec3, p3: Vec3) -> Result<Vec3, GeometryError> {
    let e1 = p2 - p1;
    let e2 = p3 - p2;
    if e1.len() < DEGENERATE_EPSILON || e2.len() < DEGENERATE_EPSILON {
        return Err(GeometryError::DegenerateFace);
    }
    let n = e1.normalize().cross(e2.normalize());
    if n.len() < DEGENERATE_EPSILON {
        return Err(GeometryError::DegenerateFace);
    }
    Ok(n.normalize())
}

/// Fixed collection of primitives drawn with one base color
#[derive(Debug, Clone)]
pub struct Mesh {
    primitives: Vec<Primitive>,
    pub color: Color,
    /// Carried for instancing; the pipeline doesn't apply it
    pub model: Option<Mat4>,
}

impl Mesh {
    pub fn new(primitives: Vec<Primitive>, color: Color) -> Self {
        Self { primitives, color, model: None }
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn primitives_mut(&mut self) -> &mut [Primitive] {
        &mut self.primitives
    }

    pub fn translate(&mut self, t: Vec3) {
        for p in &mut self.primitives {
            p.translate(t);
        }
    }

    pub fn rotate(&mut self, rotation: &Mat4, pivot: Vec3) {
        for p in &mut self.primitives {
            p.rotate(rotation, pivot);
        }
    }
}
