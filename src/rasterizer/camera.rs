//! Camera basis, view and projection matrices

use serde::{Serialize, Deserialize};
use super::math::{Mat4, Vec3};

/// Near-plane rectangle: width and height at distance `z_distance`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub z_distance: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, z_distance: f32) -> Self {
        Self { width, height, z_distance }
    }
}

/// Invalid camera construction parameters
#[derive(Debug, Clone, PartialEq)]
pub enum CameraError {
    InvalidViewport { width: f32, height: f32 },
    InvalidPlanes { near: f32, far: f32 },
    ZeroForward,
}

impl std::fmt::Display for CameraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraError::InvalidViewport { width, height } => {
                write!(f, "viewport must be positive, got {}x{}", width, height)
            }
            CameraError::InvalidPlanes { near, far } => {
                write!(f, "need 0 < near < far, got near {} far {}", near, far)
            }
            CameraError::ZeroForward => write!(f, "forward vector has zero length"),
        }
    }
}

impl std::error::Error for CameraError {}

/// Orientation triple derived from forward and world-up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

/// Camera state
///
/// The basis is rebuilt from raw cross products every time it is needed and
/// is never re-orthonormalized, so long runs of yaw/pitch/roll drift.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    viewport: Viewport,
    far: f32,
    forward: Vec3,
    world_up: Vec3,
}

impl Camera {
    pub fn new(
        position: Vec3,
        viewport: Viewport,
        far: f32,
        forward: Vec3,
        world_up: Vec3,
    ) -> Result<Self, CameraError> {
        if !(viewport.width > 0.0 && viewport.height > 0.0) {
            return Err(CameraError::InvalidViewport { width: viewport.width, height: viewport.height });
        }
        let near = viewport.z_distance;
        if !(near > 0.0 && far > near) {
            return Err(CameraError::InvalidPlanes { near, far });
        }
        if forward.len() == 0.0 {
            return Err(CameraError::ZeroForward);
        }
        Ok(Self { position, viewport, far, forward, world_up })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn near(&self) -> f32 {
        self.viewport.z_distance
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    pub fn translate(&mut self, t: Vec3) {
        self.position = self.position + t;
    }

    /// Turn `forward` about world Y
    pub fn yaw(&mut self, angle: f32) {
        self.forward = Mat4::rotation_y(angle).transform_dir(self.forward);
    }

    /// Turn `forward` about world X
    pub fn pitch(&mut self, angle: f32) {
        self.forward = Mat4::rotation_x(angle).transform_dir(self.forward);
    }

    /// Replaces `world_up` with `forward` rotated about Z.
    ///
    /// This does not rotate `world_up` itself; the resulting basis
    /// degenerates when the new up is parallel to forward.
    pub fn roll(&mut self, angle: f32) {
        self.world_up = Mat4::rotation_z(angle).transform_dir(self.forward);
    }

    pub fn basis(&self) -> Basis {
        let right = self.world_up.cross(self.forward);
        let up = self.forward.cross(right);
        Basis { right, up, forward: self.forward }
    }

    pub fn view_matrix(&self) -> Mat4 {
        let Basis { right, up, forward } = self.basis();
        let p = self.position;
        Mat4::from_rows([
            [right.x, right.y, right.z, -right.dot(p)],
            [up.x, up.y, up.z, -up.dot(p)],
            [forward.x, forward.y, forward.z, -forward.dot(p)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Perspective matrix; clip w comes out as view z / near
    pub fn projection_matrix(&self) -> Mat4 {
        let (vw, vh) = (self.viewport.width, self.viewport.height);
        let (f, n) = (self.far, self.near());
        Mat4::from_rows([
            [2.0 / vw, 0.0, 0.0, 0.0],
            [0.0, 2.0 / vh, 0.0, 0.0],
            [0.0, 0.0, (f + n) / (n * (f - n)), 2.0 * f / (n - f)],
            [0.0, 0.0, 1.0 / n, 0.0],
        ])
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
