//! Stage/layer transform for resolving absolute positions.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Transform from layer-local coordinates to absolute stage coordinates.
///
/// Shapes are stored in layer coordinates. Anything placed outside the
/// canvas, like the text edit overlay, needs the absolute position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageTransform {
    /// Layer offset in stage pixels.
    pub offset: Vec2,
    /// Layer scale.
    pub scale: f64,
}

impl Default for StageTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl StageTransform {
    pub fn new(offset: Vec2, scale: f64) -> Self {
        Self { offset, scale }
    }

    /// Affine mapping layer coordinates to stage coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Affine mapping stage coordinates back to layer coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset)
    }

    /// Absolute position of a layer-local point.
    pub fn to_absolute(&self, local: Point) -> Point {
        self.transform() * local
    }

    /// Layer-local position of an absolute point.
    pub fn to_local(&self, absolute: Point) -> Point {
        self.inverse_transform() * absolute
    }

    /// Shift the layer by a delta in stage pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let stage = StageTransform::default();
        let p = Point::new(100.0, 200.0);
        assert_eq!(stage.to_absolute(p), p);
    }

    #[test]
    fn test_offset_and_scale() {
        let stage = StageTransform::new(Vec2::new(50.0, 100.0), 2.0);
        let abs = stage.to_absolute(Point::new(10.0, 20.0));
        assert!((abs.x - 70.0).abs() < f64::EPSILON);
        assert!((abs.y - 140.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut stage = StageTransform::new(Vec2::new(30.0, -20.0), 1.5);
        stage.pan(Vec2::new(5.0, 5.0));
        let original = Point::new(123.0, 456.0);
        let back = stage.to_local(stage.to_absolute(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }
}
