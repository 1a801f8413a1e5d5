//! Renderer configuration
//!
//! Uses RON (Rusty Object Notation) for human-readable config files.
//! Every section has defaults, so a partial file (or none) is valid.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::rasterizer::{Camera, CameraError, Color, Light, Vec3, Viewport, HEIGHT, WIDTH};

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub render: RenderConfig,
    pub camera: CameraConfig,
    pub mesh: MeshConfig,
    pub lights: Vec<Light>,
    pub controls: ControlsConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            camera: CameraConfig::default(),
            mesh: MeshConfig::default(),
            lights: vec![Light::point(Vec3::new(0.0, 0.0, 25.0)), Light::ambient(0.2)],
            controls: ControlsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Framebuffer size in pixels
    pub width: usize,
    pub height: usize,
    pub clear_color: Color,
    pub wireframe: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            clear_color: Color::BLACK,
            wireframe: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub viewport: Viewport,
    pub far: f32,
    pub forward: Vec3,
    pub world_up: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            viewport: Viewport::new(2.0, 2.0, 2.0),
            far: 600.0,
            forward: Vec3::new(0.0, 0.0, 1.0),
            world_up: Vec3::UP,
        }
    }
}

impl CameraConfig {
    pub fn build(&self) -> Result<Camera, CameraError> {
        Camera::new(self.position, self.viewport, self.far, self.forward, self.world_up)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub color: Color,
    /// World-space placement applied once after loading
    pub offset: Vec3,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            offset: Vec3::new(0.0, 0.0, 50.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// World units per frame while a move key is held
    pub move_speed: f32,
    /// Degrees of yaw/pitch per pixel of mouse motion
    pub mouse_sensitivity: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            move_speed: 8.0,
            mouse_sensitivity: 0.1,
        }
    }
}

fn finish(mut config: RendererConfig) -> RendererConfig {
    config.lights = config.lights.into_iter().map(Light::normalized).collect();
    config
}

/// Load config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RendererConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load config from a RON string
pub fn load_config_from_str(s: &str) -> Result<RendererConfig, ConfigError> {
    let config: RendererConfig = ron::from_str(s)?;
    Ok(finish(config))
}

/// Save config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &RendererConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}
