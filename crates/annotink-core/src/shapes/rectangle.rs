//! Rectangle shape.

use super::{SerializableColor, ShapeKind, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An outlined rectangle annotation.
///
/// `width` and `height` may be negative for rectangles drawn up or left
/// of their anchor; `bounds()` normalises them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: String,
    /// Top-left corner position (the draft anchor for drawn rectangles).
    pub position: Point,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
    /// Outline color.
    pub stroke: SerializableColor,
    /// Outline width.
    pub stroke_width: f64,
}

impl Rectangle {
    /// Default outline width before scaling.
    pub const DEFAULT_STROKE_WIDTH: f64 = 5.0;

    /// Create a new rectangle with a red outline.
    pub fn new(id: impl Into<String>, position: Point, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            position,
            width,
            height,
            stroke: SerializableColor::red(),
            stroke_width: Self::DEFAULT_STROKE_WIDTH,
        }
    }

    /// Set the outline.
    pub fn with_stroke(mut self, stroke: SerializableColor, stroke_width: f64) -> Self {
        self.stroke = stroke;
        self.stroke_width = stroke_width.max(0.0);
        self
    }

    /// Get the rectangle as a normalised kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
        .abs()
    }

    /// Copy with negative extents folded into the position.
    pub fn normalized(&self) -> Self {
        let rect = self.as_rect();
        Self {
            position: Point::new(rect.x0, rect.y0),
            width: rect.width(),
            height: rect.height(),
            ..self.clone()
        }
    }
}

impl ShapeTrait for Rectangle {
    const KIND: ShapeKind = ShapeKind::Rectangle;

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
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        // The fill is transparent but still listens for pointer events.
        let pad = tolerance + self.stroke_width / 2.0;
        self.as_rect().inflate(pad, pad).contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_creation() {
        let rect = Rectangle::new("rect1", Point::new(10.0, 20.0), 100.0, 50.0);
        assert_eq!(rect.id(), "rect1");
        assert!((rect.position.x - 10.0).abs() < f64::EPSILON);
        assert!((rect.position.y - 20.0).abs() < f64::EPSILON);
        assert!((rect.width - 100.0).abs() < f64::EPSILON);
        assert!((rect.height - 50.0).abs() < f64::EPSILON);
        assert_eq!(rect.stroke, SerializableColor::red());
    }

    #[test]
    fn test_negative_extent_bounds() {
        let rect = Rectangle::new("r", Point::new(50.0, 50.0), -40.0, -30.0);
        let bounds = rect.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 50.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalized() {
        let rect = Rectangle::new("r", Point::new(50.0, 50.0), -40.0, -40.0).normalized();
        assert!((rect.position.x - 10.0).abs() < f64::EPSILON);
        assert!((rect.position.y - 10.0).abs() < f64::EPSILON);
        assert!((rect.width - 40.0).abs() < f64::EPSILON);
        assert!((rect.height - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let rect = Rectangle::new("r", Point::new(0.0, 0.0), 100.0, 100.0).with_stroke(SerializableColor::red(), 0.0);
        assert!(rect.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(!rect.hit_test(Point::new(150.0, 50.0), 0.0));
        assert!(rect.hit_test(Point::new(105.0, 50.0), 10.0)); // Within tolerance
    }
}
