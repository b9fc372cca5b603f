//! Background bitmap loading.

use crate::renderer::{RenderResult, pixel_index};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// A decoded RGBA8 bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Bitmap {
    /// Decode PNG, JPEG or WebP bytes.
    pub fn decode(bytes: &[u8]) -> RenderResult<Self> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            rgba: rgba.into_vec(),
        })
    }

    /// Pixel at (x, y), clamped to the edges.
    pub fn sample(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        let i = pixel_index(self.width, x, y);
        match self.rgba.get(i..i + 4) {
            Some(px) => [px[0], px[1], px[2], px[3]],
            None => [0, 0, 0, 0],
        }
    }
}

/// Decoded bitmaps keyed by the url they were requested with.
#[derive(Debug, Clone, Default)]
pub struct BitmapCache {
    bitmaps: HashMap<String, Arc<Bitmap>>,
}

impl BitmapCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and store bytes fetched for `url`; returns the dimensions.
    pub fn insert_bytes(&mut self, url: &str, bytes: &[u8]) -> RenderResult<(u32, u32)> {
        let bitmap = Bitmap::decode(bytes)?;
        let size = (bitmap.width, bitmap.height);
        log::debug!("Decoded {} ({}x{})", url, size.0, size.1);
        self.bitmaps.insert(url.to_string(), Arc::new(bitmap));
        Ok(size)
    }

    /// Read and decode a file, keyed by its path.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> RenderResult<(u32, u32)> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        self.insert_bytes(&path.to_string_lossy(), &bytes)
    }

    pub fn get(&self, url: &str) -> Option<&Bitmap> {
        self.bitmaps.get(url).map(|b| b.as_ref())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.bitmaps.contains_key(url)
    }
}
