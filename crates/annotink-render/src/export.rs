//! Scene export to PNG.

use crate::renderer::{PixelBuffer, RenderError, RenderResult, RenderSurface};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::path::Path;

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(buffer: &PixelBuffer) -> RenderResult<Vec<u8>> {
    if buffer.width == 0 || buffer.height == 0 {
        return Err(RenderError::EmptySurface);
    }
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, buffer.width, buffer.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&buffer.rgba_data)?;
    }
    Ok(png_data)
}

/// PNG bytes as a `data:` URI.
pub fn to_data_uri(png_data: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png_data))
}

/// Snapshot a surface and return the frame as a PNG data URI.
///
/// With [`RasterRenderer`](crate::RasterRenderer) the frame carries no
/// label text; glyphs are not rasterised.
pub fn snapshot_data_uri(surface: &impl RenderSurface) -> RenderResult<String> {
    let png_data = encode_png(&surface.snapshot()?)?;
    Ok(to_data_uri(&png_data))
}

/// Snapshot a surface and write the frame to a PNG file.
///
/// Returns the number of bytes written. Label text is missing from
/// frames produced by [`RasterRenderer`](crate::RasterRenderer).
pub fn write_png(surface: &impl RenderSurface, path: impl AsRef<Path>) -> RenderResult<usize> {
    let png_data = encode_png(&surface.snapshot()?)?;
    std::fs::write(path.as_ref(), &png_data)?;
    log::info!("PNG export complete: {} bytes to {}", png_data.len(), path.as_ref().display());
    Ok(png_data.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_signature() {
        let buffer = PixelBuffer {
            rgba_data: vec![0, 0, 0, 255],
            width: 1,
            height: 1,
        };
        let png_data = encode_png(&buffer).unwrap();
        assert_eq!(&png_data[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_empty_buffer_rejected() {
        let buffer = PixelBuffer {
            rgba_data: Vec::new(),
            width: 0,
            height: 0,
        };
        assert!(matches!(encode_png(&buffer), Err(RenderError::EmptySurface)));
    }

    #[test]
    fn test_short_buffer_is_encode_error() {
        let buffer = PixelBuffer {
            rgba_data: vec![0, 0, 0],
            width: 1,
            height: 1,
        };
        assert!(matches!(encode_png(&buffer), Err(RenderError::Encode(_))));
    }

    #[test]
    fn test_write_png_file() {
        use crate::raster::RasterRenderer;
        use crate::renderer::RenderContext;
        use annotink_core::{Editor, EditorConfig};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stage.png");
        let scene = Editor::with_initial_scene(EditorConfig::default()).scene();
        let mut renderer = RasterRenderer::new();
        renderer.build_scene(&RenderContext::new(&scene));

        let written = write_png(&renderer, &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap().len(), written);
        let uri = snapshot_data_uri(&renderer).unwrap();
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_data_uri_prefix() {
        let uri = to_data_uri(&[1, 2, 3]);
        assert_eq!(uri, "data:image/png;base64,AQID");
    }
}
