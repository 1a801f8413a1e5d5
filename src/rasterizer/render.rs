//! Core rendering functions
//! Projection, painter's ordering, culling and flat polygon drawing

use super::camera::Camera;
use super::math::{Mat4, Vec2, Vec3};
use super::primitive::{Mesh, Primitive};
use super::shading::flat_shade;
use super::types::{Color, DrawMode, FrameStats};

/// Clip W below this is treated as a singular perspective divide
pub const W_EPSILON: f32 = 1e-5;

/// Drawing collaborator: the only operations the pipeline needs
pub trait Canvas {
    /// Fill the whole surface
    fn fill(&mut self, color: Color);
    /// Filled closed polygon
    fn draw_polygon(&mut self, points: &[Vec2], color: Color);
    /// Closed outline
    fn draw_line_loop(&mut self, points: &[Vec2], color: Color);
}

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u8>, // RGBA, 4 bytes per pixel
    pub width: usize,
    pub height: usize,
    crossings: Vec<f32>, // scanline scratch, reused across polygons
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            width,
            height,
            crossings: Vec::new(),
        }
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            let p = &self.pixels[idx..idx + 4];
            Some(Color { r: p[0], g: p[1], b: p[2], a: p[3] })
        } else {
            None
        }
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm.
    /// Endpoints may lie anywhere; the segment is clipped to the surface first.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let a = Vec2::new(x0 as f32, y0 as f32);
        let b = Vec2::new(x1 as f32, y1 as f32);
        self.draw_segment(a, b, color);
    }

    fn draw_segment(&mut self, a: Vec2, b: Vec2, color: Color) {
        let Some((a, b)) = self.clip_segment(a, b) else {
            return;
        };
        let (x0, y0) = (a.x.round() as i32, a.y.round() as i32);
        let (x1, y1) = (b.x.round() as i32, b.y.round() as i32);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
                self.set_pixel(x as usize, y as usize, color);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Liang-Barsky clip against the pixel rectangle. `None` when the segment
    /// misses the surface or an endpoint isn't finite.
    fn clip_segment(&self, a: Vec2, b: Vec2) -> Option<(Vec2, Vec2)> {
        if !a.is_finite() || !b.is_finite() || self.width == 0 || self.height == 0 {
            return None;
        }
        let (max_x, max_y) = ((self.width - 1) as f32, (self.height - 1) as f32);
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let (mut t0, mut t1) = (0.0_f32, 1.0_f32);

        for (p, q) in [(-dx, a.x), (dx, max_x - a.x), (-dy, a.y), (dy, max_y - a.y)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }

        // interpolate from the nearer endpoint to keep precision on long segments
        let at = |t: f32| {
            let p = if t <= 0.5 {
                Vec2::new(a.x + dx * t, a.y + dy * t)
            } else {
                Vec2::new(b.x - dx * (1.0 - t), b.y - dy * (1.0 - t))
            };
            Vec2::new(p.x.clamp(0.0, max_x), p.y.clamp(0.0, max_y))
        };
        Some((at(t0), at(t1)))
    }

    /// Even-odd scanline fill, sampling at pixel centers
    pub fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 3 || !points.iter().all(|p| p.is_finite()) {
            return;
        }

        let (min_y, max_y) = points
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        let y_start = min_y.floor().max(0.0) as usize;
        let y_end = (max_y.ceil().max(0.0) as usize).min(self.height);

        let mut crossings = std::mem::take(&mut self.crossings);
        for y in y_start..y_end {
            let sy = y as f32 + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a.y <= sy && b.y > sy) || (b.y <= sy && a.y > sy) {
                    crossings.push(a.x + (sy - a.y) / (b.y - a.y) * (b.x - a.x));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));

            for span in crossings.chunks_exact(2) {
                let x_start = (span[0] - 0.5).ceil().max(0.0) as usize;
                let x_end = ((span[1] - 0.5).ceil().max(0.0) as usize).min(self.width);
                for x in x_start..x_end {
                    self.set_pixel(x, y, color);
                }
            }
        }
        self.crossings = crossings;
    }

    /// Write the pixels out as an RGBA PNG
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), image::ImageError> {
        let buffer = image::RgbaImage::from_raw(self.width as u32, self.height as u32, self.pixels.clone())
            .ok_or_else(|| {
                image::ImageError::Parameter(image::error::ParameterError::from_kind(
                    image::error::ParameterErrorKind::DimensionMismatch,
                ))
            })?;
        buffer.save(path)
    }
}

impl Canvas for Framebuffer {
    fn fill(&mut self, color: Color) {
        self.clear(color);
    }

    fn draw_polygon(&mut self, points: &[Vec2], color: Color) {
        self.fill_polygon(points, color);
    }

    fn draw_line_loop(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 2 || !points.iter().all(|p| p.is_finite()) {
            return;
        }
        for (i, &a) in points.iter().enumerate() {
            self.draw_segment(a, points[(i + 1) % points.len()], color);
        }
    }
}

/// A primitive couldn't be taken through the perspective divide this frame
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionError {
    NearZeroW { vertex: usize, w: f32 },
}

impl std::fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionError::NearZeroW { vertex, w } => {
                write!(f, "vertex {} has clip w {} (perspective divide skipped)", vertex, w)
            }
        }
    }
}

impl std::error::Error for ProjectionError {}

/// Which camera basis vector a move follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisAxis {
    Right,
    Up,
    Forward,
}

/// Camera control, produced by input bindings
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    /// Translate along a (non-normalized) basis vector scaled by `amount`
    Move { axis: BasisAxis, amount: f32 },
    Yaw(f32),
    Pitch(f32),
    Roll(f32),
}

/// Per-frame pipeline driver
pub struct Renderer {
    camera: Camera,
    width: usize,
    height: usize,
    screen_matrix: Mat4,
    view_projection: Mat4,
    draw_order: Vec<(usize, f32)>,
}

impl Renderer {
    /// `width` and `height` are the drawing surface size in pixels
    pub fn new(camera: Camera, width: usize, height: usize) -> Self {
        let (w, h) = (width as f32, height as f32);
        let scale = w.min(h) * 0.5;
        let screen_matrix = Mat4::from_rows([
            [scale, 0.0, 0.0, w / 2.0],
            [0.0, -scale, 0.0, h / 2.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let view_projection = camera.view_projection_matrix();
        Self {
            camera,
            width,
            height,
            screen_matrix,
            view_projection,
            draw_order: Vec::new(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Cached product, refreshed after every camera mutation
    pub fn view_projection_matrix(&self) -> &Mat4 {
        &self.view_projection
    }

    fn refresh_view_projection(&mut self) {
        self.view_projection = self.camera.view_projection_matrix();
    }

    pub fn translate_camera(&mut self, t: Vec3) {
        self.camera.translate(t);
        self.refresh_view_projection();
    }

    pub fn camera_yaw(&mut self, angle: f32) {
        self.camera.yaw(angle);
        self.refresh_view_projection();
    }

    pub fn camera_pitch(&mut self, angle: f32) {
        self.camera.pitch(angle);
        self.refresh_view_projection();
    }

    pub fn camera_roll(&mut self, angle: f32) {
        self.camera.roll(angle);
        self.refresh_view_projection();
    }

    pub fn apply(&mut self, command: CameraCommand) {
        match command {
            CameraCommand::Move { axis, amount } => {
                let basis = self.camera.basis();
                let dir = match axis {
                    BasisAxis::Right => basis.right,
                    BasisAxis::Up => basis.up,
                    BasisAxis::Forward => basis.forward,
                };
                self.translate_camera(dir * amount);
            }
            CameraCommand::Yaw(a) => self.camera_yaw(a),
            CameraCommand::Pitch(a) => self.camera_pitch(a),
            CameraCommand::Roll(a) => self.camera_roll(a),
        }
    }

    pub fn clear<C: Canvas>(&self, canvas: &mut C, color: Color) {
        canvas.fill(color);
    }

    /// Fill the primitive's clip and screen buffers for this frame.
    ///
    /// If any vertex lands at |w| < `W_EPSILON` the divide is skipped and the
    /// primitive stays unprojected until the next successful pass.
    pub fn project_primitive(&self, primitive: &mut Primitive) -> Result<(), ProjectionError> {
        let vp = &self.view_projection;
        let screen = &self.screen_matrix;
        let (world, clip, out) = primitive.frame_buffers_mut();

        let mut singular = None;
        for (i, v) in world.iter().enumerate() {
            let c = vp.transform(*v);
            clip[i] = c;
            if c.w.abs() < W_EPSILON {
                singular.get_or_insert(ProjectionError::NearZeroW { vertex: i, w: c.w });
                continue;
            }
            let s = screen.transform(c);
            out[i] = Vec2::new(s.x / c.w, s.y / c.w);
        }

        primitive.set_projected(singular.is_none());
        match singular {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Project every primitive; returns how many were skipped
    pub fn project_mesh(&self, mesh: &mut Mesh) -> usize {
        let mut skipped = 0;
        for (i, prim) in mesh.primitives_mut().iter_mut().enumerate() {
            if let Err(e) = self.project_primitive(prim) {
                log::debug!("primitive {}: {}", i, e);
                skipped += 1;
            }
        }
        if skipped > 0 {
            log::warn!("{} primitives skipped at the camera plane", skipped);
        }
        skipped
    }

    /// Face points away from the camera position
    pub fn is_back_face(&self, primitive: &Primitive) -> bool {
        let to_camera = self.camera.position - primitive.center();
        primitive.average_normal().dot(to_camera) <= 0.0
    }

    /// Frustum test on averaged clip coordinates; requires a projected primitive
    pub fn clip_test_flat(primitive: &Primitive) -> bool {
        let w = primitive.average_w();
        let inside = |c: f32| -w < c && c < w;
        inside(primitive.average_clip_z()) && inside(primitive.average_clip_x()) && inside(primitive.average_clip_y())
    }

    /// Painter's order: (primitive index, average W), farthest first. Ties
    /// keep mesh order.
    pub fn sort_by_depth(&mut self, mesh: &Mesh) -> &[(usize, f32)] {
        self.draw_order.clear();
        self.draw_order
            .extend(mesh.primitives().iter().enumerate().map(|(i, p)| (i, p.average_w())));
        self.draw_order.sort_by(|a, b| b.1.total_cmp(&a.1));
        &self.draw_order
    }

    /// Painter's algorithm over one projected mesh
    pub fn draw_mesh<C: Canvas>(&mut self, canvas: &mut C, mesh: &Mesh, mode: DrawMode<'_>) -> FrameStats {
        let mut stats = FrameStats::default();
        self.sort_by_depth(mesh);
        let draw_order = std::mem::take(&mut self.draw_order);

        for &(idx, _) in &draw_order {
            let prim = &mesh.primitives()[idx];
            if !prim.is_projected() {
                stats.unprojected += 1;
                continue;
            }
            if self.is_back_face(prim) {
                stats.back_faces += 1;
                continue;
            }
            if !Self::clip_test_flat(prim) {
                stats.outside_frustum += 1;
                continue;
            }
            Self::draw_primitive_flat(canvas, prim, mesh.color, mode);
            stats.drawn += 1;
        }

        self.draw_order = draw_order;
        log::trace!("{:?}", stats);
        stats
    }

    fn draw_primitive_flat<C: Canvas>(canvas: &mut C, primitive: &Primitive, color: Color, mode: DrawMode<'_>) {
        let points = primitive.screen_buffer();
        match mode {
            DrawMode::Wireframe => canvas.draw_line_loop(points, color),
            DrawMode::Unlit => canvas.draw_polygon(points, color),
            DrawMode::Flat(lights) => canvas.draw_polygon(points, flat_shade(color, primitive, lights)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::camera::Viewport;
    use crate::rasterizer::lighting::Light;
    use crate::rasterizer::math::Vec4;

    #[derive(Default)]
    struct Recorder {
        fills: Vec<Color>,
        polygons: Vec<(Vec<Vec2>, Color)>,
        loops: usize,
    }

    impl Canvas for Recorder {
        fn fill(&mut self, color: Color) {
            self.fills.push(color);
        }

        fn draw_polygon(&mut self, points: &[Vec2], color: Color) {
            self.polygons.push((points.to_vec(), color));
        }

        fn draw_line_loop(&mut self, _points: &[Vec2], _color: Color) {
            self.loops += 1;
        }
    }

    fn renderer() -> Renderer {
        let camera = Camera::new(
            Vec3::new(0.0, 0.0, -10.0),
            Viewport::new(2.0, 2.0, 1.0),
            100.0,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::UP,
        )
        .unwrap();
        Renderer::new(camera, 800, 600)
    }

    fn tri(a: Vec3, b: Vec3, c: Vec3) -> Primitive {
        Primitive::new(&[a, b, c], None).unwrap()
    }

    // Unit triangle at the origin wound so its normal faces -Z (toward the camera)
    fn facing_camera() -> Primitive {
        tri(Vec3::ZERO, Vec3::UP, Vec3::new(1.0, 0.0, 0.0))
    }

    fn facing_away() -> Primitive {
        tri(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::UP)
    }

    fn with_clip(mut p: Primitive, clip: Vec4) -> Primitive {
        let (_, buf, _) = p.frame_buffers_mut();
        for c in buf.iter_mut() {
            *c = clip;
        }
        p.set_projected(true);
        p
    }

    #[test]
    fn test_unit_triangle_lands_on_screen() {
        let r = renderer();
        let mut p = facing_away();
        r.project_primitive(&mut p).unwrap();
        assert!(p.is_projected());

        let n = p.vertex_count() as f32;
        let avg_x = p.screen_buffer().iter().map(|s| s.x).sum::<f32>() / n;
        let avg_y = p.screen_buffer().iter().map(|s| s.y).sum::<f32>() / n;
        assert!(avg_x >= 0.0 && avg_x < 800.0);
        assert!(avg_y >= 0.0 && avg_y < 600.0);
        assert!(p.screen_buffer().iter().all(|s| s.is_finite()));

        // origin maps to the surface center
        assert!((p.screen_buffer()[0].x - 400.0).abs() < 0.001);
        assert!((p.screen_buffer()[0].y - 300.0).abs() < 0.001);
        // +X goes right, +Y goes up (smaller pixel row)
        assert!(p.screen_buffer()[1].x > 400.0);
        assert!(p.screen_buffer()[2].y < 300.0);
        assert!((p.average_w() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_back_face_detection() {
        let r = renderer();
        assert!(!r.is_back_face(&facing_camera()));
        assert!(r.is_back_face(&facing_away()));
    }

    #[test]
    fn test_clip_test_on_averages() {
        let p = facing_camera();
        assert!(!Renderer::clip_test_flat(&with_clip(p.clone(), Vec4::new(0.0, 0.0, 15.0, 10.0))));
        assert!(Renderer::clip_test_flat(&with_clip(p.clone(), Vec4::new(0.0, 0.0, 5.0, 10.0))));
        assert!(!Renderer::clip_test_flat(&with_clip(p.clone(), Vec4::new(-10.0, 0.0, 5.0, 10.0))));
        assert!(!Renderer::clip_test_flat(&with_clip(p, Vec4::new(0.0, 11.0, 5.0, 10.0))));
    }

    #[test]
    fn test_painter_order_farthest_first() {
        let mut r = renderer();
        let mesh = Mesh::new(
            vec![
                with_clip(facing_camera(), Vec4::new(0.0, 0.0, 0.0, 5.0)),
                with_clip(facing_camera(), Vec4::new(0.0, 0.0, 0.0, 1.0)),
                with_clip(facing_camera(), Vec4::new(0.0, 0.0, 0.0, 3.0)),
            ],
            Color::WHITE,
        );
        let order: Vec<usize> = r.sort_by_depth(&mesh).iter().map(|&(i, _)| i).collect();
        assert_eq!(order, vec![0, 2, 1]);
    }

    #[test]
    fn test_painter_order_is_stable_on_ties() {
        let mut r = renderer();
        let clip = Vec4::new(0.0, 0.0, 0.0, 2.0);
        let mesh = Mesh::new(
            vec![
                with_clip(facing_camera(), clip),
                with_clip(facing_camera(), Vec4::new(0.0, 0.0, 0.0, 4.0)),
                with_clip(facing_camera(), clip),
                with_clip(facing_camera(), clip),
            ],
            Color::WHITE,
        );
        let order: Vec<usize> = r.sort_by_depth(&mesh).iter().map(|&(i, _)| i).collect();
        assert_eq!(order, vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_draw_mesh_culls_and_shades() {
        let mut r = renderer();
        let outside = tri(Vec3::new(50.0, 0.0, 0.0), Vec3::new(50.0, 1.0, 0.0), Vec3::new(51.0, 0.0, 0.0));
        let mut mesh = Mesh::new(vec![facing_camera(), facing_away(), outside], Color::new(200, 100, 50));
        assert_eq!(r.project_mesh(&mut mesh), 0);

        let lights = [Light::ambient(0.5)];
        let mut canvas = Recorder::default();
        r.clear(&mut canvas, Color::BLACK);
        let stats = r.draw_mesh(&mut canvas, &mesh, DrawMode::Flat(&lights));

        assert_eq!(canvas.fills, vec![Color::BLACK]);
        assert_eq!(stats, FrameStats { drawn: 1, back_faces: 1, outside_frustum: 1, unprojected: 0 });
        assert_eq!(canvas.polygons.len(), 1);
        assert_eq!(canvas.polygons[0].0.len(), 3);
        assert_eq!(canvas.polygons[0].1, Color::new(100, 50, 25));
    }

    #[test]
    fn test_wireframe_and_unlit_bypass_shading() {
        let mut r = renderer();
        let mut mesh = Mesh::new(vec![facing_camera()], Color::new(10, 20, 30));
        r.project_mesh(&mut mesh);

        let mut canvas = Recorder::default();
        r.draw_mesh(&mut canvas, &mesh, DrawMode::Wireframe);
        assert_eq!(canvas.loops, 1);
        assert!(canvas.polygons.is_empty());

        r.draw_mesh(&mut canvas, &mesh, DrawMode::Unlit);
        assert_eq!(canvas.polygons[0].1, Color::new(10, 20, 30));
    }

    #[test]
    fn test_near_zero_w_is_skipped_not_divided() {
        let mut r = renderer();
        // in the camera's own z plane: view z = 0, so clip w = 0
        let on_camera_plane = tri(
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::new(0.0, 1.0, -10.0),
            Vec3::new(1.0, 0.0, -10.0),
        );
        let mut mesh = Mesh::new(vec![on_camera_plane, facing_camera()], Color::WHITE);

        let err = r.project_primitive(&mut mesh.primitives_mut()[0]).unwrap_err();
        assert!(matches!(err, ProjectionError::NearZeroW { vertex: 0, .. }));
        assert_eq!(r.project_mesh(&mut mesh), 1);
        assert!(!mesh.primitives()[0].is_projected());

        let mut canvas = Recorder::default();
        let stats = r.draw_mesh(&mut canvas, &mesh, DrawMode::Unlit);
        assert_eq!(stats.unprojected, 1);
        assert_eq!(stats.drawn, 1);
        assert!(canvas.polygons.iter().all(|(pts, _)| pts.iter().all(|p| p.is_finite())));
    }

    #[test]
    fn test_camera_mutation_refreshes_cached_matrix() {
        let mut r = renderer();
        let before = *r.view_projection_matrix();
        r.translate_camera(Vec3::new(0.0, 0.0, 2.0));
        assert_ne!(*r.view_projection_matrix(), before);
        assert_eq!(*r.view_projection_matrix(), r.camera().view_projection_matrix());

        r.camera_yaw(0.1);
        assert_eq!(*r.view_projection_matrix(), r.camera().view_projection_matrix());
        r.camera_pitch(-0.1);
        assert_eq!(*r.view_projection_matrix(), r.camera().view_projection_matrix());
    }

    #[test]
    fn test_move_command_follows_basis() {
        let mut r = renderer();
        r.apply(CameraCommand::Move { axis: BasisAxis::Forward, amount: 8.0 });
        assert!((r.camera().position - Vec3::new(0.0, 0.0, -2.0)).len() < 0.0001);
        r.apply(CameraCommand::Move { axis: BasisAxis::Right, amount: -8.0 });
        assert!((r.camera().position - Vec3::new(-8.0, 0.0, -2.0)).len() < 0.0001);
        r.apply(CameraCommand::Move { axis: BasisAxis::Up, amount: 1.0 });
        assert!((r.camera().position - Vec3::new(-8.0, 1.0, -2.0)).len() < 0.0001);
        assert_eq!(*r.view_projection_matrix(), r.camera().view_projection_matrix());
    }

    #[test]
    fn test_fill_polygon_covers_pixel_centers() {
        let mut fb = Framebuffer::new(8, 8);
        fb.clear(Color::BLACK);
        let square = [Vec2::new(2.0, 2.0), Vec2::new(6.0, 2.0), Vec2::new(6.0, 6.0), Vec2::new(2.0, 6.0)];
        fb.fill_polygon(&square, Color::WHITE);
        assert_eq!(fb.get_pixel(2, 2), Some(Color::WHITE));
        assert_eq!(fb.get_pixel(5, 5), Some(Color::WHITE));
        assert_eq!(fb.get_pixel(6, 6), Some(Color::BLACK));
        assert_eq!(fb.get_pixel(1, 3), Some(Color::BLACK));
        assert_eq!(fb.get_pixel(8, 0), None);
    }

    #[test]
    fn test_fill_polygon_ignores_non_finite_points() {
        let mut fb = Framebuffer::new(4, 4);
        fb.clear(Color::BLACK);
        let bad = [Vec2::new(0.0, 0.0), Vec2::new(f32::NAN, 3.0), Vec2::new(3.0, 3.0)];
        fb.fill_polygon(&bad, Color::WHITE);
        assert!(fb.pixels.chunks_exact(4).all(|p| p == &Color::BLACK.to_bytes()[..]));
    }

    #[test]
    fn test_line_loop_closes_outline() {
        let mut fb = Framebuffer::new(8, 8);
        let tri = [Vec2::new(1.0, 1.0), Vec2::new(6.0, 1.0), Vec2::new(1.0, 6.0)];
        fb.draw_line_loop(&tri, Color::WHITE);
        assert_eq!(fb.get_pixel(3, 1), Some(Color::WHITE));
        assert_eq!(fb.get_pixel(1, 4), Some(Color::WHITE));
        // interior stays empty
        assert_eq!(fb.get_pixel(2, 2), Some(Color::default()));
    }

    #[test]
    fn test_line_loop_clips_far_endpoints() {
        let mut fb = Framebuffer::new(8, 8);
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(3e9, 0.0), Vec2::new(0.0, 3.0)];
        fb.draw_line_loop(&pts, Color::WHITE);
        assert_eq!(fb.get_pixel(0, 0), Some(Color::WHITE));
        assert_eq!(fb.get_pixel(7, 0), Some(Color::WHITE));
        assert_eq!(fb.get_pixel(0, 3), Some(Color::WHITE));
        assert_eq!(fb.get_pixel(4, 4), Some(Color::default()));

        // entirely off the surface
        fb.clear(Color::BLACK);
        fb.draw_line(-5_000_000, -10, i32::MAX, -10, Color::WHITE);
        fb.draw_line(-1_000_000, -1_000_000, 1_000_000, 1_000_000, Color::WHITE);
        assert_eq!(fb.get_pixel(0, 0), Some(Color::WHITE));
        assert_eq!(fb.get_pixel(7, 7), Some(Color::WHITE));
        assert_eq!(fb.get_pixel(3, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_wireframe_primitive_straddling_camera_plane() {
        let mut r = renderer();
        let near_camera = Vec3::new(1000.0, 0.0, -9.9999);
        let a = Vec3::new(-500.0, 10.0, 80.0);
        let b = Vec3::new(-500.0, -10.0, 80.0);
        let mut mesh = Mesh::new(vec![tri(near_camera, a, b), tri(near_camera, b, a)], Color::WHITE);
        assert_eq!(r.project_mesh(&mut mesh), 0);
        assert!(mesh.primitives()[0].screen_buffer()[0].x.abs() > 1e8);

        let mut fb = Framebuffer::new(800, 600);
        let stats = r.draw_mesh(&mut fb, &mesh, DrawMode::Wireframe);
        assert_eq!(stats.drawn, 1);
        assert_eq!(stats.back_faces, 1);
        assert!(fb.pixels.chunks_exact(4).any(|p| p == &Color::WHITE.to_bytes()[..]));
    }

    #[test]
    fn test_moved_mesh_needs_reprojection() {
        let mut r = renderer();
        let mut mesh = Mesh::new(vec![facing_camera()], Color::WHITE);
        r.project_mesh(&mut mesh);
        mesh.translate(Vec3::new(0.0, 0.0, 5.0));

        let mut canvas = Recorder::default();
        let stats = r.draw_mesh(&mut canvas, &mesh, DrawMode::Unlit);
        assert_eq!(stats.unprojected, 1);
        assert!(canvas.polygons.is_empty());

        r.project_mesh(&mut mesh);
        assert_eq!(r.draw_mesh(&mut canvas, &mesh, DrawMode::Unlit).drawn, 1);
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut fb = Framebuffer::new(5, 3);
        fb.clear(Color::new(1, 2, 3));
        fb.save_png(&path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (5, 3));
        assert_eq!(img.get_pixel(4, 2).0, [1, 2, 3, 255]);
    }
}
