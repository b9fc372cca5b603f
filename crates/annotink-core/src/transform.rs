//! Converts visual resize transforms back into rectangle geometry.
//!
//! A transformer resizes a node by changing its scale, not its width or
//! height. The store only keeps width and height, so once a resize ends
//! the scale is folded into the geometry and reset to 1. Geometry stays
//! the single source of truth and repeated resizes do not compound.

use crate::shapes::{Rectangle, Shape};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Minimum width a reconciled rectangle may have.
pub const MIN_COMMITTED_WIDTH: f64 = 5.0;

/// Visual state of a rendered node after an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    /// Node position.
    pub position: Point,
    /// Horizontal scale applied by the transformer.
    pub scale_x: f64,
    /// Vertical scale applied by the transformer.
    pub scale_y: f64,
}

impl NodeTransform {
    pub fn new(position: Point, scale_x: f64, scale_y: f64) -> Self {
        Self {
            position,
            scale_x,
            scale_y,
        }
    }

    /// A node at `position` with unit scale.
    pub fn at(position: Point) -> Self {
        Self::new(position, 1.0, 1.0)
    }

    /// Reset both scale factors to 1.
    pub fn reset_scale(&mut self) {
        self.scale_x = 1.0;
        self.scale_y = 1.0;
    }

    pub fn is_unit_scale(&self) -> bool {
        (self.scale_x - 1.0).abs() < f64::EPSILON && (self.scale_y - 1.0).abs() < f64::EPSILON
    }
}

/// Folds transformer output into persisted geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformReconciler {
    /// Floor applied to the reconciled width. Height has no floor beyond zero.
    pub min_width: f64,
}

impl Default for TransformReconciler {
    fn default() -> Self {
        Self::new(MIN_COMMITTED_WIDTH)
    }
}

impl TransformReconciler {
    pub fn new(min_width: f64) -> Self {
        Self { min_width }
    }

    /// Produce the rectangle a resize ended on and reset the node's scale.
    pub fn reconcile(&self, rect: &Rectangle, node: &mut NodeTransform) -> Rectangle {
        let width = (rect.width * node.scale_x).max(self.min_width);
        let height = (rect.height * node.scale_y).max(0.0);
        node.reset_scale();

        Rectangle {
            position: node.position,
            width,
            height,
            ..rect.clone()
        }
    }

    /// Produce the shape a drag ended on. Only the anchor moves.
    pub fn reconcile_drag(&self, shape: &Shape, position: Point) -> Shape {
        let mut shape = shape.clone();
        shape.set_position(position);
        shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, ShapeTrait};

    #[test]
    fn test_width_floor() {
        let rect = Rectangle::new("rect1", Point::new(0.0, 0.0), 100.0, 100.0);
        let mut node = NodeTransform::new(Point::new(0.0, 0.0), 0.01, 1.0);
        let result = TransformReconciler::default().reconcile(&rect, &mut node);
        assert!((result.width - 5.0).abs() < f64::EPSILON);

        // Above the floor the product is kept as is.
        let mut node = NodeTransform::new(Point::new(0.0, 0.0), 0.1, 1.0);
        let result = TransformReconciler::default().reconcile(&rect, &mut node);
        assert!((result.width - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_height_has_no_floor_above_zero() {
        let rect = Rectangle::new("rect1", Point::new(0.0, 0.0), 100.0, 100.0);
        let mut node = NodeTransform::new(Point::new(0.0, 0.0), 1.0, 0.01);
        let result = TransformReconciler::default().reconcile(&rect, &mut node);
        assert!((result.height - 1.0).abs() < 1e-9);

        let mut node = NodeTransform::new(Point::new(0.0, 0.0), 1.0, -2.0);
        let result = TransformReconciler::default().reconcile(&rect, &mut node);
        assert!(result.height.abs() < f64::EPSILON);
    }

    #[test]
    fn test_position_and_scale_reset() {
        let rect = Rectangle::new("rect1", Point::new(0.0, 0.0), 100.0, 40.0);
        let mut node = NodeTransform::new(Point::new(12.0, 34.0), 2.0, 1.5);
        let result = TransformReconciler::default().reconcile(&rect, &mut node);
        assert!((result.position.x - 12.0).abs() < f64::EPSILON);
        assert!((result.position.y - 34.0).abs() < f64::EPSILON);
        assert!((result.width - 200.0).abs() < f64::EPSILON);
        assert!((result.height - 60.0).abs() < f64::EPSILON);
        assert!(node.is_unit_scale());
        assert_eq!(result.id(), "rect1");
    }

    #[test]
    fn test_repeated_resizes_do_not_compound() {
        let reconciler = TransformReconciler::default();
        let rect = Rectangle::new("rect1", Point::new(0.0, 0.0), 100.0, 100.0);
        let mut node = NodeTransform::new(Point::new(0.0, 0.0), 2.0, 2.0);
        let once = reconciler.reconcile(&rect, &mut node);
        // The node keeps unit scale, so a plain move leaves size alone.
        let twice = reconciler.reconcile(&once, &mut node);
        assert!((twice.width - 200.0).abs() < f64::EPSILON);
        assert!((twice.height - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reconcile_drag_moves_circle_center() {
        let circle: Shape = Circle::new("circle1", Point::new(10.0, 10.0), 5.0).into();
        let moved = TransformReconciler::default().reconcile_drag(&circle, Point::new(40.0, 50.0));
        let moved = moved.as_circle().unwrap();
        assert!((moved.center.x - 40.0).abs() < f64::EPSILON);
        assert!((moved.radius - 5.0).abs() < f64::EPSILON);
    }
}
