//! CPU raster implementation of the rendering surface.

use crate::bitmap::Bitmap;
use crate::renderer::{PixelBuffer, RenderContext, RenderError, RenderResult, RenderSurface, pixel_index};
use annotink_core::{Circle, Handle, Rectangle, RenderItem, Shape};
use kurbo::{Affine, Point, Rect};
use peniko::Color;

/// Side length of a drawn resize handle.
const HANDLE_SIZE: f64 = 8.0;
/// Width of the selection outline.
const SELECTION_WIDTH: f64 = 2.0;
/// Gap between a selected shape and its outline.
const SELECTION_PADDING: f64 = 4.0;

fn rgba(color: Color) -> [u8; 4] {
    let c = color.to_rgba8();
    [c.r, c.g, c.b, c.a]
}

/// Source-over blend of unpremultiplied RGBA8.
fn blend(dst: &mut [u8], src: [u8; 4]) {
    let sa = src[3] as f64 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for i in 0..3 {
        let s = src[i] as f64 / 255.0;
        let d = dst[i] as f64 / 255.0;
        let c = (s * sa + d * da * (1.0 - sa)) / out_a;
        dst[i] = (c * 255.0).round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

/// Software rasterizer used for export and headless rendering.
///
/// Pixels are sampled at their centers; no anti-aliasing. Scene geometry
/// goes through the stage transform, then the device scale.
///
/// Label glyphs are not drawn since there is no font stack. Labels only
/// show up through their selection outline.
#[derive(Debug, Clone, Default)]
pub struct RasterRenderer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    /// Layer coordinates to device pixels.
    device: Affine,
    /// Device pixels to layer coordinates.
    inverse: Affine,
}

impl RasterRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear(&mut self, width: u32, height: u32, color: [u8; 4]) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        let count = width as usize * height as usize;
        self.pixels.reserve(count * 4);
        for _ in 0..count {
            self.pixels.extend_from_slice(&color);
        }
    }

    /// Pixel range covering a rectangle in layer coordinates.
    fn pixel_span(&self, rect: Rect) -> (u32, u32, u32, u32) {
        let rect = self.device.transform_rect_bbox(rect);
        let clamp_x = |v: f64| v.floor().clamp(0.0, self.width as f64) as u32;
        let clamp_y = |v: f64| v.floor().clamp(0.0, self.height as f64) as u32;
        (
            clamp_x(rect.x0),
            clamp_y(rect.y0),
            (clamp_x(rect.x1) + 1).min(self.width),
            (clamp_y(rect.y1) + 1).min(self.height),
        )
    }

    /// Layer position of a pixel center.
    fn pixel_center(&self, x: u32, y: u32) -> Point {
        self.inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5)
    }

    /// Paint every pixel inside `area` whose center passes `inside`.
    fn fill_where(&mut self, area: Rect, color: [u8; 4], inside: impl Fn(Point) -> bool) {
        let (x0, y0, x1, y1) = self.pixel_span(area);
        for y in y0..y1 {
            for x in x0..x1 {
                if inside(self.pixel_center(x, y)) {
                    let i = pixel_index(self.width, x, y);
                    blend(&mut self.pixels[i..i + 4], color);
                }
            }
        }
    }

    /// Paint the ring between `outer` and `inner`.
    fn stroke_rect(&mut self, outer: Rect, inner: Rect, color: [u8; 4]) {
        self.fill_where(outer, color, |p| outer.contains(p) && !inner.contains(p));
    }

    fn draw_background(&mut self, bitmap: &Bitmap, destination: Rect) {
        let dest = destination.abs();
        if dest.area() <= 0.0 {
            return;
        }
        let (x0, y0, x1, y1) = self.pixel_span(dest);
        for y in y0..y1 {
            for x in x0..x1 {
                let p = self.pixel_center(x, y);
                if !dest.contains(p) {
                    continue;
                }
                // Nearest neighbour.
                let u = ((p.x - dest.x0) / dest.width() * bitmap.width as f64) as u32;
                let v = ((p.y - dest.y0) / dest.height() * bitmap.height as f64) as u32;
                let i = pixel_index(self.width, x, y);
                blend(&mut self.pixels[i..i + 4], bitmap.sample(u, v));
            }
        }
    }

    fn draw_rectangle(&mut self, rect: &Rectangle) {
        let bounds = rect.as_rect();
        let half = rect.stroke_width / 2.0;
        if half <= 0.0 {
            return;
        }
        self.stroke_rect(bounds.inflate(half, half), bounds.inflate(-half, -half), rgba(rect.stroke.into()));
    }

    fn draw_circle(&mut self, circle: &Circle) {
        let area = Rect::from_center_size(circle.center, (circle.radius * 2.0, circle.radius * 2.0));
        let (center, radius) = (circle.center, circle.radius);
        self.fill_where(area, rgba(circle.fill.into()), |p| p.distance(center) <= radius);
    }

    fn draw_selection(&mut self, item: &RenderItem, color: [u8; 4]) {
        let pad = match &item.shape {
            Shape::Rectangle(r) => r.stroke_width / 2.0 + SELECTION_PADDING,
            _ => SELECTION_PADDING,
        };
        let inner = item.shape.bounds().inflate(pad, pad);
        let outer = inner.inflate(SELECTION_WIDTH, SELECTION_WIDTH);
        self.stroke_rect(outer, inner, color);
    }

    fn draw_handle(&mut self, handle: &Handle, color: [u8; 4]) {
        let area = Rect::from_center_size(handle.position, (HANDLE_SIZE, HANDLE_SIZE));
        self.fill_where(area, color, |p| area.contains(p));
    }
}

impl RenderSurface for RasterRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        let scene = ctx.scene;
        let scale_factor = if ctx.scale_factor > 0.0 { ctx.scale_factor } else { 1.0 };
        self.device = Affine::scale(scale_factor) * scene.stage.transform();
        self.inverse = self.device.inverse();
        let width = (scene.size.width * scale_factor).ceil().max(0.0) as u32;
        let height = (scene.size.height * scale_factor).ceil().max(0.0) as u32;
        self.clear(width, height, rgba(self.background_color(ctx)));

        if let Some(background) = &scene.background {
            match ctx.bitmaps.and_then(|cache| cache.get(&background.url)) {
                Some(bitmap) => self.draw_background(bitmap, background.destination),
                None => log::debug!("Bitmap {} not in cache, skipped", background.url),
            }
        }

        let selection = rgba(ctx.selection_color);
        for item in &scene.items {
            match &item.shape {
                Shape::Rectangle(rect) => self.draw_rectangle(rect),
                Shape::Circle(circle) => self.draw_circle(circle),
                // No glyph rendering.
                Shape::Text(_) => {}
            }
            if item.selected {
                self.draw_selection(item, selection);
            }
        }
        for handle in &scene.handles {
            self.draw_handle(handle, selection);
        }
    }

    fn snapshot(&self) -> RenderResult<PixelBuffer> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptySurface);
        }
        Ok(PixelBuffer {
            rgba_data: self.pixels.clone(),
            width: self.width,
            height: self.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::BitmapCache;
    use crate::export::encode_png;
    use annotink_core::{Editor, EditorConfig, ShapeKey, StageTransform};
    use kurbo::Vec2;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [59, 130, 246, 255];

    fn render(editor: &Editor) -> PixelBuffer {
        let scene = editor.scene();
        let mut renderer = RasterRenderer::new();
        renderer.build_scene(&RenderContext::new(&scene));
        renderer.snapshot().unwrap()
    }

    #[test]
    fn test_snapshot_before_render() {
        assert!(matches!(RasterRenderer::new().snapshot(), Err(RenderError::EmptySurface)));
    }

    #[test]
    fn test_initial_scene() {
        let editor = Editor::with_initial_scene(EditorConfig::default());
        let frame = render(&editor);
        assert_eq!((frame.width, frame.height), (800, 800));

        // rect1 left edge, rect1 interior, circle1 center.
        assert_eq!(frame.pixel(90, 100), Some(RED));
        assert_eq!(frame.pixel(140, 140), Some(WHITE));
        assert_eq!(frame.pixel(250, 120), Some(RED));
        assert_eq!(frame.pixel(600, 600), Some(WHITE));
    }

    #[test]
    fn test_selection_outline() {
        let mut editor = Editor::with_initial_scene(EditorConfig::default());
        editor.select(ShapeKey::rectangle("rect1"));
        let frame = render(&editor);
        // rect1 spans 90..190 with a 2.5 half stroke; outline sits 4 px further out.
        assert_eq!(frame.pixel(82, 110), Some(BLUE));
        // Bottom-right handle.
        assert_eq!(frame.pixel(190, 160), Some(BLUE));
    }

    #[test]
    fn test_background_bitmap() {
        let mut config = EditorConfig::default();
        config.background.url = "floor.png".to_string();
        config.background.destination = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut editor = Editor::new(config);

        let green = PixelBuffer {
            rgba_data: vec![0, 255, 0, 255],
            width: 1,
            height: 1,
        };
        let mut cache = BitmapCache::new();
        let (w, h) = cache.insert_bytes("floor.png", &encode_png(&green).unwrap()).unwrap();
        editor.bitmap_ready("floor.png", w, h);

        let scene = editor.scene();
        let mut renderer = RasterRenderer::new();
        renderer.build_scene(&RenderContext::new(&scene).with_bitmaps(&cache));
        let frame = renderer.snapshot().unwrap();
        assert_eq!(frame.pixel(50, 50), Some([0, 255, 0, 255]));
        assert_eq!(frame.pixel(150, 150), Some(WHITE));
    }

    #[test]
    fn test_stage_offset_moves_shapes() {
        let mut editor = Editor::with_initial_scene(EditorConfig::default());
        editor.set_stage(StageTransform::new(Vec2::new(100.0, 0.0), 1.0));
        editor.select(ShapeKey::rectangle("rect1"));
        let frame = render(&editor);
        // rect1's left edge moves from x=90 to x=190.
        assert_eq!(frame.pixel(90, 100), Some(WHITE));
        assert_eq!(frame.pixel(190, 100), Some(RED));
        // circle1 center moves to x=350.
        assert_eq!(frame.pixel(350, 120), Some(RED));
        // Bottom-right handle at layer (190, 160).
        assert_eq!(frame.pixel(290, 160), Some(BLUE));
    }

    #[test]
    fn test_stage_scale_with_device_scale() {
        let mut editor = Editor::with_initial_scene(EditorConfig::default());
        editor.set_stage(StageTransform::new(Vec2::ZERO, 0.5));
        let scene = editor.scene();
        let mut renderer = RasterRenderer::new();
        renderer.build_scene(&RenderContext::new(&scene).with_scale_factor(2.0));
        let frame = renderer.snapshot().unwrap();
        // Stage 0.5 and device 2.0 cancel out.
        assert_eq!((frame.width, frame.height), (1600, 1600));
        assert_eq!(frame.pixel(90, 100), Some(RED));
        assert_eq!(frame.pixel(250, 120), Some(RED));
    }

    #[test]
    fn test_labels_draw_no_glyphs() {
        let mut store = annotink_core::ShapeStore::new();
        store
            .add(annotink_core::TextLabel::new("text1", Point::new(10.0, 10.0), "卧室").into())
            .unwrap();
        let editor = Editor::with_store(EditorConfig::default(), store);
        let frame = render(&editor);
        assert!(frame.rgba_data.chunks(4).all(|px| px == WHITE));
    }

    #[test]
    fn test_blend_half_alpha() {
        let mut dst = WHITE;
        blend(&mut dst, [0, 0, 0, 128]);
        assert_eq!(dst[3], 255);
        assert!(dst[0] > 120 && dst[0] < 130);
    }
}
