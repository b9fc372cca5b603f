//! Rendering surface abstraction.

use crate::bitmap::BitmapCache;
use annotink_core::Scene;
use peniko::Color;
use thiserror::Error;

/// Rendering and export errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Nothing rendered yet, or the stage has no area")]
    EmptySurface,
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Byte offset of pixel (x, y) in a row-major RGBA8 buffer.
///
/// Computed in `usize` so large frames do not overflow `u32`.
pub(crate) fn pixel_index(width: u32, x: u32, y: u32) -> usize {
    (y as usize * width as usize + x as usize) * 4
}

/// RGBA8 pixels of a rendered frame, row-major, unpremultiplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub rgba_data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PixelBuffer {
    /// Pixel at (x, y), or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = pixel_index(self.width, x, y);
        let px = self.rgba_data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The composed scene to draw.
    pub scene: &'a Scene,
    /// Decoded background bitmaps.
    pub bitmaps: Option<&'a BitmapCache>,
    /// Device pixel ratio.
    pub scale_factor: f64,
    /// Stage clear color.
    pub background_color: Color,
    /// Selection outline and handle color.
    pub selection_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            bitmaps: None,
            scale_factor: 1.0,
            background_color: Color::from_rgba8(255, 255, 255, 255),
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
        }
    }

    /// Set the bitmap cache used for the background.
    pub fn with_bitmaps(mut self, bitmaps: &'a BitmapCache) -> Self {
        self.bitmaps = Some(bitmaps);
        self
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the selection color.
    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }
}

/// Trait for rendering surfaces.
///
/// A surface draws composed scenes and can snapshot the last frame for
/// export.
pub trait RenderSurface {
    /// Draw a frame.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Pixels of the last frame.
    fn snapshot(&self) -> RenderResult<PixelBuffer>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_bounds() {
        let buffer = PixelBuffer {
            rgba_data: vec![1, 2, 3, 4, 5, 6, 7, 8],
            width: 2,
            height: 1,
        };
        assert_eq!(buffer.pixel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(buffer.pixel(2, 0), None);
        assert_eq!(buffer.pixel(0, 1), None);
    }

    #[test]
    fn test_pixel_index_past_u32() {
        // 40000 x 40000 x 4 bytes does not fit in u32.
        let i = pixel_index(40_000, 39_999, 39_999);
        assert_eq!(i, 6_399_999_996);

        let buffer = PixelBuffer {
            rgba_data: Vec::new(),
            width: 40_000,
            height: 40_000,
        };
        assert_eq!(buffer.pixel(39_999, 39_999), None);
    }
}
