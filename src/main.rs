//! Strawberry viewer
//!
//! Usage:
//!   strawberry <model.obj> [--config view.ron] [--debug] [--wireframe] [--snapshot out.png]
//!
//! Controls: WASD move, R/F up/down, hold right mouse to look, Escape quits.

use std::env;
use std::path::PathBuf;

use macroquad::prelude::{
    clear_background, draw_texture_ex, next_frame, screen_height, screen_width, vec2, Conf,
    DrawTextureParams, FilterMode, Texture2D, BLACK, WHITE,
};
use strawberry::config::{load_config, ConfigError, RendererConfig};
use strawberry::input::InputPoller;
use strawberry::logging::{init_logging, shutdown_logging, LoggingConfig};
use strawberry::rasterizer::{CameraError, DrawMode, Framebuffer, Renderer, HEIGHT, WIDTH};
use strawberry::world::{load_obj, ObjError};
use strawberry::VERSION;

#[derive(Debug)]
enum AppError {
    Usage(String),
    InvalidSize { width: usize, height: usize },
    Config(ConfigError),
    Camera(CameraError),
    Model(ObjError),
    Snapshot(image::ImageError),
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<CameraError> for AppError {
    fn from(e: CameraError) -> Self {
        AppError::Camera(e)
    }
}

impl From<ObjError> for AppError {
    fn from(e: ObjError) -> Self {
        AppError::Model(e)
    }
}

impl From<image::ImageError> for AppError {
    fn from(e: image::ImageError) -> Self {
        AppError::Snapshot(e)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Usage(msg) => write!(f, "{}", msg),
            AppError::InvalidSize { width, height } => {
                write!(f, "framebuffer size {}x{} is out of range", width, height)
            }
            AppError::Config(e) => write!(f, "config: {}", e),
            AppError::Camera(e) => write!(f, "camera: {}", e),
            AppError::Model(e) => write!(f, "model: {}", e),
            AppError::Snapshot(e) => write!(f, "snapshot: {}", e),
        }
    }
}

const USAGE: &str =
    "usage: strawberry <model.obj> [--config view.ron] [--debug] [--wireframe] [--snapshot out.png]";

struct Options {
    model: PathBuf,
    config: Option<PathBuf>,
    wireframe: bool,
    snapshot: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Options, AppError> {
    let mut model = None;
    let mut config = None;
    let mut wireframe = false;
    let mut snapshot = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                config = Some(flag_value(args, i)?);
                i += 2;
            }
            "--snapshot" => {
                snapshot = Some(flag_value(args, i)?);
                i += 2;
            }
            "--wireframe" => {
                wireframe = true;
                i += 1;
            }
            "--debug" | "-debug" | "debug" => i += 1,
            arg if arg.starts_with('-') => {
                return Err(AppError::Usage(format!("unknown option '{}'\n{}", arg, USAGE)));
            }
            arg => {
                model = Some(PathBuf::from(arg));
                i += 1;
            }
        }
    }

    let model = model.ok_or_else(|| AppError::Usage(USAGE.to_string()))?;
    Ok(Options { model, config, wireframe, snapshot })
}

/// Path following the flag at `i`
fn flag_value(args: &[String], i: usize) -> Result<PathBuf, AppError> {
    args.get(i + 1)
        .map(PathBuf::from)
        .ok_or_else(|| AppError::Usage(format!("{} needs a value\n{}", args[i], USAGE)))
}

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Strawberry v{}", VERSION),
        window_width: WIDTH as i32,
        window_height: HEIGHT as i32,
        window_resizable: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let args: Vec<String> = env::args().collect();
    let debug = args.iter().skip(1).any(|a| matches!(a.as_str(), "--debug" | "-debug" | "debug"));
    init_logging(if debug { LoggingConfig::debug() } else { LoggingConfig::default() });

    let result = match parse_args(&args) {
        Ok(options) => run(options).await,
        Err(e) => Err(e),
    };
    let failed = result.is_err();
    if let Err(e) = result {
        log::error!("{}", e);
    }

    shutdown_logging();
    if failed {
        std::process::exit(1);
    }
}

async fn run(options: Options) -> Result<(), AppError> {
    let config = match &options.config {
        Some(path) => load_config(path)?,
        None => RendererConfig::default(),
    };

    let (width, height) = (config.render.width, config.render.height);
    let max = u16::MAX as usize;
    if width == 0 || height == 0 || width > max || height > max {
        return Err(AppError::InvalidSize { width, height });
    }

    let camera = config.camera.build()?;
    let mut mesh = load_obj(&options.model)?;
    mesh.color = config.mesh.color;
    mesh.translate(config.mesh.offset);

    let mut fb = Framebuffer::new(width, height);
    let mut renderer = Renderer::new(camera, width, height);
    let mut poller = InputPoller::new();
    let wireframe = options.wireframe || config.render.wireframe;

    let texture = Texture2D::from_rgba8(width as u16, height as u16, &fb.pixels);
    texture.set_filter(FilterMode::Nearest);

    log::info!(
        "Strawberry v{}: {}x{}, {} lights, {}",
        VERSION,
        width,
        height,
        config.lights.len(),
        if wireframe { "wireframe" } else { "flat shaded" }
    );

    loop {
        renderer.clear(&mut fb, config.render.clear_color);
        renderer.project_mesh(&mut mesh);
        let mode = if wireframe { DrawMode::Wireframe } else { DrawMode::Flat(&config.lights) };
        renderer.draw_mesh(&mut fb, &mesh, mode);

        if let Some(path) = &options.snapshot {
            fb.save_png(path)?;
            log::info!("wrote {}", path.display());
            return Ok(());
        }

        texture.update_from_bytes(width as u32, height as u32, &fb.pixels);
        present(&texture, width as f32, height as f32);

        let frame = poller.poll();
        if frame.quit {
            return Ok(());
        }
        for command in frame.camera_commands(&config.controls) {
            renderer.apply(command);
        }

        next_frame().await;
    }
}

/// Draw the framebuffer texture letterboxed into the window
fn present(texture: &Texture2D, fb_w: f32, fb_h: f32) {
    clear_background(BLACK);

    let (sw, sh) = (screen_width(), screen_height());
    let scale = (sw / fb_w).min(sh / fb_h);
    let (draw_w, draw_h) = (fb_w * scale, fb_h * scale);

    draw_texture_ex(
        texture,
        (sw - draw_w) * 0.5,
        (sh - draw_h) * 0.5,
        WHITE,
        DrawTextureParams {
            dest_size: Some(vec2(draw_w, draw_h)),
            ..Default::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("strawberry").chain(list.iter().copied()).map(String::from).collect()
    }

    #[test]
    fn test_parse_args_reads_flags() {
        let o = parse_args(&args(&["cube.obj", "--wireframe", "--config", "view.ron", "--debug"])).unwrap();
        assert_eq!(o.model, PathBuf::from("cube.obj"));
        assert_eq!(o.config, Some(PathBuf::from("view.ron")));
        assert!(o.wireframe);
        assert!(o.snapshot.is_none());
    }

    #[test]
    fn test_trailing_flag_reports_missing_value() {
        for flag in ["--config", "--snapshot"] {
            match parse_args(&args(&["cube.obj", flag])) {
                Err(AppError::Usage(msg)) => assert!(msg.starts_with(&format!("{} needs a value", flag))),
                Err(other) => panic!("unexpected error {}", other),
                Ok(_) => panic!("{} without a value was accepted", flag),
            }
        }
    }

    #[test]
    fn test_missing_model_is_usage_error() {
        assert!(matches!(parse_args(&args(&["--wireframe"])), Err(AppError::Usage(_))));
        assert!(matches!(parse_args(&args(&["cube.obj", "--bogus"])), Err(AppError::Usage(_))));
    }
}
