//! Circle shape.

use super::{SerializableColor, ShapeKind, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A filled circle marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: String,
    /// Center point.
    pub center: Point,
    /// Radius, never negative.
    pub radius: f64,
    /// Fill color.
    pub fill: SerializableColor,
}

impl Circle {
    /// Create a new red circle.
    pub fn new(id: impl Into<String>, center: Point, radius: f64) -> Self {
        Self {
            id: id.into(),
            center,
            radius: radius.max(0.0),
            fill: SerializableColor::red(),
        }
    }

    /// Set the fill color.
    pub fn with_fill(mut self, fill: SerializableColor) -> Self {
        self.fill = fill;
        self
    }
}

impl ShapeTrait for Circle {
    const KIND: ShapeKind = ShapeKind::Circle;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn position(&self) -> Point {
        self.center
    }

    fn set_position(&mut self, position: Point) {
        self.center = position;
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.center.distance(point) <= self.radius + tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_is_clamped() {
        let circle = Circle::new("c", Point::new(0.0, 0.0), -3.0);
        assert!(circle.radius.abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let circle = Circle::new("c", Point::new(100.0, 100.0), 20.0);
        assert!(circle.hit_test(Point::new(110.0, 100.0), 0.0));
        assert!(!circle.hit_test(Point::new(125.0, 100.0), 0.0));
        assert!(circle.hit_test(Point::new(125.0, 100.0), 5.0));
    }

    #[test]
    fn test_bounds() {
        let circle = Circle::new("c", Point::new(100.0, 50.0), 20.0);
        let bounds = circle.bounds();
        assert!((bounds.x0 - 80.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }
}
