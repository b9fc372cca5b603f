//! Shape definitions for the annotation canvas.

mod circle;
mod rectangle;
mod text;

pub use circle::Circle;
pub use rectangle::Rectangle;
pub use text::{FontStyle, TextAlign, TextLabel};

use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn red() -> Self {
        Self::new(255, 0, 0, 255)
    }

    pub fn green() -> Self {
        Self::new(0, 128, 0, 255)
    }

    pub fn blue() -> Self {
        Self::new(0, 0, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// The variant a shape belongs to. Each variant has its own id namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Text,
}

impl ShapeKind {
    /// Prefix used when generating ids for this variant.
    pub fn id_prefix(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rect",
            ShapeKind::Circle => "circle",
            ShapeKind::Text => "text",
        }
    }
}

/// Composite key identifying a shape across all variant collections.
///
/// Ids are only unique within a variant, so selection and mutation
/// always carry the variant alongside the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeKey {
    pub kind: ShapeKind,
    pub id: String,
}

impl ShapeKey {
    pub fn new(kind: ShapeKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn rectangle(id: impl Into<String>) -> Self {
        Self::new(ShapeKind::Rectangle, id)
    }

    pub fn circle(id: impl Into<String>) -> Self {
        Self::new(ShapeKind::Circle, id)
    }

    pub fn text(id: impl Into<String>) -> Self {
        Self::new(ShapeKind::Text, id)
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}", self.kind, self.id)
    }
}

/// Common behavior of every shape variant.
pub trait ShapeTrait {
    /// Variant of this shape.
    const KIND: ShapeKind;

    /// Id, unique within the variant's collection.
    fn id(&self) -> &str;

    /// Replace the id (used when the store assigns one on commit).
    fn set_id(&mut self, id: String);

    /// Anchor position: top-left for rectangles and labels, center for circles.
    fn position(&self) -> Point;

    /// Move the anchor position.
    fn set_position(&mut self, position: Point);

    /// Axis-aligned bounding box, normalised for negative extents.
    fn bounds(&self) -> Rect;

    /// Check if a point (in canvas coordinates) hits this shape.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Composite key of this shape.
    fn key(&self) -> ShapeKey {
        ShapeKey::new(Self::KIND, self.id())
    }
}

/// Enum wrapper over every shape variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rectangle(Rectangle),
    Circle(Circle),
    Text(TextLabel),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Text(_) => ShapeKind::Text,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Shape::Rectangle(s) => s.id(),
            Shape::Circle(s) => s.id(),
            Shape::Text(s) => s.id(),
        }
    }

    pub fn key(&self) -> ShapeKey {
        ShapeKey::new(self.kind(), self.id())
    }

    pub fn position(&self) -> Point {
        match self {
            Shape::Rectangle(s) => s.position(),
            Shape::Circle(s) => s.position(),
            Shape::Text(s) => s.position(),
        }
    }

    pub fn set_position(&mut self, position: Point) {
        match self {
            Shape::Rectangle(s) => s.set_position(position),
            Shape::Circle(s) => s.set_position(position),
            Shape::Text(s) => s.set_position(position),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rectangle(s) => s.bounds(),
            Shape::Circle(s) => s.bounds(),
            Shape::Text(s) => s.bounds(),
        }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Shape::Rectangle(s) => s.hit_test(point, tolerance),
            Shape::Circle(s) => s.hit_test(point, tolerance),
            Shape::Text(s) => s.hit_test(point, tolerance),
        }
    }

    pub fn as_rectangle(&self) -> Option<&Rectangle> {
        match self {
            Shape::Rectangle(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_circle(&self) -> Option<&Circle> {
        match self {
            Shape::Circle(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextLabel> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl From<Rectangle> for Shape {
    fn from(rect: Rectangle) -> Self {
        Shape::Rectangle(rect)
    }
}

impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Shape::Circle(circle)
    }
}

impl From<TextLabel> for Shape {
    fn from(label: TextLabel) -> Self {
        Shape::Text(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_carries_variant() {
        let rect = Rectangle::new("a", Point::new(0.0, 0.0), 10.0, 10.0);
        let circle = Circle::new("a", Point::new(0.0, 0.0), 5.0);
        assert_ne!(rect.key(), circle.key());
        assert_eq!(Shape::from(rect).key(), ShapeKey::rectangle("a"));
    }

    #[test]
    fn test_color_roundtrip_through_peniko() {
        let color: Color = SerializableColor::red().into();
        assert_eq!(SerializableColor::from(color), SerializableColor::red());
    }
}
