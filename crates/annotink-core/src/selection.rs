//! Single selection and resize handle system.

use crate::shapes::{Rectangle, ShapeKey};
use crate::transform::NodeTransform;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest box a live resize may shrink to, in either dimension.
pub const MIN_RESIZE_BOX: f64 = 5.0;
/// Handle hit tolerance in canvas pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 10.0;

/// Tracks the one selected shape, if any.
///
/// The key is a back-reference only: it is not validated against the
/// store, and deleting the shape does not clear it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionController {
    current: Option<ShapeKey>,
}

impl SelectionController {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a shape, superseding any previous selection.
    pub fn select(&mut self, key: ShapeKey) {
        if self.current.as_ref() != Some(&key) {
            log::debug!("Selected {}", key);
        }
        self.current = Some(key);
    }

    /// Drop the selection.
    pub fn clear(&mut self) {
        if let Some(key) = self.current.take() {
            log::debug!("Cleared selection of {}", key);
        }
    }

    /// The selected key, possibly stale.
    pub fn current(&self) -> Option<&ShapeKey> {
        self.current.as_ref()
    }

    /// Check if a shape is the selected one.
    pub fn is_selected(&self, key: &ShapeKey) -> bool {
        self.current.as_ref() == Some(key)
    }
}

/// Live drag-time floor for resize boxes.
///
/// A candidate box narrower or shorter than `min` is rejected and the
/// previous box is kept.
pub fn constrain_resize_box(old_box: Rect, new_box: Rect, min: f64) -> Rect {
    if new_box.width() < min || new_box.height() < min {
        old_box
    } else {
        new_box
    }
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A resize handle with its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    /// Which corner this handle drags.
    pub corner: Corner,
}

impl Handle {
    /// Create a new handle.
    pub fn new(position: Point, corner: Corner) -> Self {
        Self { position, corner }
    }

    /// Check if a point hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.position.distance_squared(point) <= tolerance * tolerance
    }
}

/// Corner handles for a selected rectangle.
pub fn handles(rect: &Rectangle) -> [Handle; 4] {
    let bounds = rect.as_rect();
    [
        Handle::new(Point::new(bounds.x0, bounds.y0), Corner::TopLeft),
        Handle::new(Point::new(bounds.x1, bounds.y0), Corner::TopRight),
        Handle::new(Point::new(bounds.x0, bounds.y1), Corner::BottomLeft),
        Handle::new(Point::new(bounds.x1, bounds.y1), Corner::BottomRight),
    ]
}

/// Find which handle (if any) is hit at the given point.
pub fn hit_test_handles(rect: &Rectangle, point: Point, tolerance: f64) -> Option<Corner> {
    handles(rect)
        .into_iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| h.corner)
}

/// Move one corner of a box by `delta`, keeping the opposite corner fixed.
fn drag_corner(bounds: Rect, corner: Corner, delta: Vec2) -> Rect {
    let (x0, y0, x1, y1) = match corner {
        Corner::TopLeft => (bounds.x0 + delta.x, bounds.y0 + delta.y, bounds.x1, bounds.y1),
        Corner::TopRight => (bounds.x0, bounds.y0 + delta.y, bounds.x1 + delta.x, bounds.y1),
        Corner::BottomLeft => (bounds.x0 + delta.x, bounds.y0, bounds.x1, bounds.y1 + delta.y),
        Corner::BottomRight => (bounds.x0, bounds.y0, bounds.x1 + delta.x, bounds.y1 + delta.y),
    };
    Rect::new(x0, y0, x1, y1).abs()
}

/// A corner-handle resize in progress on one rectangle.
///
/// Mirrors a scale-based transformer: the rectangle's geometry is left
/// untouched while dragging and the result is reported as a position
/// plus scale factors, ready for reconciliation.
#[derive(Debug, Clone)]
pub struct ResizeGesture {
    /// The rectangle being resized.
    pub key: ShapeKey,
    /// Corner being dragged.
    pub corner: Corner,
    /// Pointer position when the drag started.
    pub start_point: Point,
    /// Box when the drag started.
    pub original_box: Rect,
    /// Last accepted box.
    pub current_box: Rect,
    /// Live floor applied to each candidate box.
    min_box: f64,
}

impl ResizeGesture {
    /// Begin resizing `rect` from `corner`.
    pub fn begin(key: ShapeKey, rect: &Rectangle, corner: Corner, start_point: Point, min_box: f64) -> Self {
        let original_box = rect.as_rect();
        Self {
            key,
            corner,
            start_point,
            original_box,
            current_box: original_box,
            min_box,
        }
    }

    /// Feed a pointer position; returns the box now shown.
    pub fn update(&mut self, point: Point) -> Rect {
        let candidate = drag_corner(self.original_box, self.corner, point - self.start_point);
        self.current_box = constrain_resize_box(self.current_box, candidate, self.min_box);
        self.current_box
    }

    /// Finish the drag, reporting the visual transform of the node.
    pub fn end(self) -> NodeTransform {
        let width = self.original_box.width();
        let height = self.original_box.height();
        let scale_x = if width > 0.0 { self.current_box.width() / width } else { 1.0 };
        let scale_y = if height > 0.0 { self.current_box.height() / height } else { 1.0 };
        NodeTransform::new(Point::new(self.current_box.x0, self.current_box.y0), scale_x, scale_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeTrait;

    #[test]
    fn test_selecting_b_supersedes_a() {
        let mut selection = SelectionController::new();
        selection.select(ShapeKey::rectangle("rect1"));
        selection.select(ShapeKey::rectangle("rect2"));
        assert!(selection.is_selected(&ShapeKey::rectangle("rect2")));
        assert!(!selection.is_selected(&ShapeKey::rectangle("rect1")));
        assert_eq!(selection.current(), Some(&ShapeKey::rectangle("rect2")));
    }

    #[test]
    fn test_clear() {
        let mut selection = SelectionController::new();
        selection.select(ShapeKey::circle("circle1"));
        selection.clear();
        assert_eq!(selection.current(), None);
    }

    #[test]
    fn test_variant_is_part_of_selection() {
        let mut selection = SelectionController::new();
        selection.select(ShapeKey::rectangle("a"));
        assert!(!selection.is_selected(&ShapeKey::circle("a")));
    }

    #[test]
    fn test_constrain_rejects_small_boxes() {
        let old = Rect::new(0.0, 0.0, 50.0, 50.0);
        let tiny = Rect::new(0.0, 0.0, 4.0, 80.0);
        assert_eq!(constrain_resize_box(old, tiny, MIN_RESIZE_BOX), old);
        let flat = Rect::new(0.0, 0.0, 80.0, 4.9);
        assert_eq!(constrain_resize_box(old, flat, MIN_RESIZE_BOX), old);
        let ok = Rect::new(0.0, 0.0, 5.0, 5.0);
        assert_eq!(constrain_resize_box(old, ok, MIN_RESIZE_BOX), ok);
    }

    #[test]
    fn test_rectangle_handles() {
        let rect = Rectangle::new("r", Point::new(0.0, 0.0), 100.0, 50.0);
        let hs = handles(&rect);
        assert_eq!(hs[0].corner, Corner::TopLeft);
        assert!((hs[3].position.x - 100.0).abs() < f64::EPSILON);
        assert!((hs[3].position.y - 50.0).abs() < f64::EPSILON);
        assert_eq!(hit_test_handles(&rect, Point::new(98.0, 52.0), HANDLE_HIT_TOLERANCE), Some(Corner::BottomRight));
        assert_eq!(hit_test_handles(&rect, Point::new(50.0, 25.0), HANDLE_HIT_TOLERANCE), None);
    }

    #[test]
    fn test_resize_gesture_reports_scale() {
        let rect = Rectangle::new("rect1", Point::new(0.0, 0.0), 100.0, 100.0);
        let mut gesture = ResizeGesture::begin(rect.key(), &rect, Corner::BottomRight, Point::new(100.0, 100.0), MIN_RESIZE_BOX);
        gesture.update(Point::new(150.0, 50.0));
        let node = gesture.end();
        assert!((node.scale_x - 1.5).abs() < 1e-9);
        assert!((node.scale_y - 0.5).abs() < 1e-9);
        assert!(node.position.x.abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_gesture_keeps_last_valid_box() {
        let rect = Rectangle::new("rect1", Point::new(0.0, 0.0), 100.0, 100.0);
        let mut gesture = ResizeGesture::begin(rect.key(), &rect, Corner::BottomRight, Point::new(100.0, 100.0), MIN_RESIZE_BOX);
        let accepted = gesture.update(Point::new(20.0, 20.0));
        assert!((accepted.width() - 20.0).abs() < 1e-9);
        // Shrinking below the floor keeps the previous box.
        let kept = gesture.update(Point::new(2.0, 60.0));
        assert_eq!(kept, accepted);
    }

    #[test]
    fn test_top_left_resize_moves_position() {
        let rect = Rectangle::new("rect1", Point::new(10.0, 10.0), 100.0, 100.0);
        let mut gesture = ResizeGesture::begin(rect.key(), &rect, Corner::TopLeft, Point::new(10.0, 10.0), MIN_RESIZE_BOX);
        gesture.update(Point::new(30.0, 40.0));
        let node = gesture.end();
        assert!((node.position.x - 30.0).abs() < 1e-9);
        assert!((node.position.y - 40.0).abs() < 1e-9);
        assert!((node.scale_x - 0.8).abs() < 1e-9);
        assert!((node.scale_y - 0.7).abs() < 1e-9);
    }
}
