//! AnnotInk Render Library
//!
//! Rendering surface abstraction, a CPU raster implementation, background
//! bitmap decoding and PNG export for AnnotInk scenes.

pub mod bitmap;
pub mod export;
mod raster;
mod renderer;

pub use bitmap::{Bitmap, BitmapCache};
pub use export::{encode_png, snapshot_data_uri, to_data_uri, write_png};
pub use raster::RasterRenderer;
pub use renderer::{PixelBuffer, RenderContext, RenderError, RenderResult, RenderSurface};
