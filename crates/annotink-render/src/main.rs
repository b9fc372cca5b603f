//! Headless export of the seeded annotation scene.
//!
//! Usage: `annotink-export [background-path] [output-path]`
//!
//! `ANNOTINK_CONFIG` may point at a JSON editor config.

use annotink_core::{Editor, EditorConfig};
use annotink_render::{BitmapCache, RasterRenderer, RenderContext, RenderSurface, write_png};
use std::process::ExitCode;

const DEFAULT_OUTPUT: &str = "stage.png";

fn load_config() -> EditorConfig {
    let Ok(path) = std::env::var("ANNOTINK_CONFIG") else {
        return EditorConfig::default();
    };
    match std::fs::read_to_string(&path) {
        Ok(json) => match EditorConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path, e);
                EditorConfig::default()
            }
        },
        Err(e) => {
            log::warn!("Could not read config {}: {}", path, e);
            EditorConfig::default()
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting AnnotInk export");

    let mut args = std::env::args().skip(1);
    let background = args.next();
    let output = args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let mut config = load_config();
    if let Some(path) = &background {
        config.background.url = path.clone();
    }
    let mut editor = Editor::with_initial_scene(config);

    let mut bitmaps = BitmapCache::new();
    if let Some(path) = &background {
        match bitmaps.load_file(path) {
            Ok((width, height)) => {
                editor.bitmap_ready(path, width, height);
            }
            Err(e) => {
                // An unloaded background just renders nothing.
                log::error!("Failed to load background {}: {}", path, e);
                editor.bitmap_failed(path);
            }
        }
    }

    let scene = editor.scene();
    let mut renderer = RasterRenderer::new();
    renderer.build_scene(&RenderContext::new(&scene).with_bitmaps(&bitmaps));

    match write_png(&renderer, &output) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Export failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
