//! Text label shape.

use super::{SerializableColor, ShapeKind, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Horizontal alignment inside the wrap width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Font style options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
}

/// A word-wrapped text label that can be edited through an overlay control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub(crate) id: String,
    /// Position (top-left corner of the text box).
    pub position: Point,
    /// The text content. May be empty.
    pub text: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Wrap width.
    pub width: f64,
    /// Text color.
    pub fill: SerializableColor,
    /// Whether the overlay editor for this label is shown.
    #[serde(default)]
    pub edit_visible: bool,
    /// Alignment inside the wrap width.
    #[serde(default)]
    pub align: TextAlign,
    /// Font style.
    #[serde(default)]
    pub font_style: FontStyle,
}

impl TextLabel {
    /// Default font size before scaling.
    pub const DEFAULT_FONT_SIZE: f64 = 15.0;

    /// Default wrap width before scaling.
    pub const DEFAULT_WIDTH: f64 = 100.0;

    /// Average glyph advance as a fraction of the font size.
    const CHAR_WIDTH_FACTOR: f64 = 0.55;

    /// Line height as a multiple of the font size.
    const LINE_HEIGHT: f64 = 1.2;

    /// Create a new blue, left-aligned label.
    pub fn new(id: impl Into<String>, position: Point, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position,
            text: text.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
            width: Self::DEFAULT_WIDTH,
            fill: SerializableColor::blue(),
            edit_visible: false,
            align: TextAlign::default(),
            font_style: FontStyle::default(),
        }
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Set the wrap width.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width.max(0.0);
        self
    }

    /// Set the text color.
    pub fn with_fill(mut self, fill: SerializableColor) -> Self {
        self.fill = fill;
        self
    }

    /// Approximate number of wrapped lines.
    fn approximate_line_count(&self) -> usize {
        let char_width = (self.font_size * Self::CHAR_WIDTH_FACTOR).max(f64::EPSILON);
        let per_line = ((self.width / char_width).floor() as usize).max(1);
        self.text
            .split('\n')
            .map(|line| line.chars().count().div_ceil(per_line).max(1))
            .sum()
    }

    /// Approximate height from the wrapped line count.
    fn approximate_height(&self) -> f64 {
        self.approximate_line_count() as f64 * self.font_size * Self::LINE_HEIGHT
    }
}

impl ShapeTrait for TextLabel {
    const KIND: ShapeKind = ShapeKind::Text;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.approximate_height(),
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_creation() {
        let label = TextLabel::new("text1", Point::new(125.0, 100.0), "卧室");
        assert_eq!(label.text, "卧室");
        assert!(!label.edit_visible);
        assert_eq!(label.align, TextAlign::Left);
        assert!((label.font_size - TextLabel::DEFAULT_FONT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_text_has_one_line() {
        let label = TextLabel::new("t", Point::new(0.0, 0.0), "");
        let bounds = label.bounds();
        assert!((bounds.height() - TextLabel::DEFAULT_FONT_SIZE * 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_long_text_wraps() {
        let short = TextLabel::new("t", Point::new(0.0, 0.0), "Hi");
        let long = TextLabel::new("t", Point::new(0.0, 0.0), "a fairly long label that has to wrap");
        assert!(long.bounds().height() > short.bounds().height());
        assert!((long.bounds().width() - short.bounds().width()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let label = TextLabel::new("t", Point::new(100.0, 100.0), "Hello");
        assert!(label.hit_test(Point::new(150.0, 105.0), 0.0));
        assert!(!label.hit_test(Point::new(0.0, 0.0), 0.0));
    }
}
