//! Raster background the annotations are drawn over.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Load state of the background bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadStatus {
    /// Requested, not yet decoded. May stay here forever.
    #[default]
    Pending,
    /// Decoded bitmap available.
    Ready { width: u32, height: u32 },
    /// The loader gave up.
    Failed,
}

/// Background image slot.
///
/// The editor never loads the bitmap itself; an external loader reports
/// completion and until then nothing is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub url: String,
    /// Where the bitmap is drawn, in layer coordinates.
    pub destination: Rect,
    pub status: LoadStatus,
}

impl BackgroundImage {
    pub fn new(url: impl Into<String>, destination: Rect) -> Self {
        Self {
            url: url.into(),
            destination,
            status: LoadStatus::Pending,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status, LoadStatus::Ready { .. })
    }

    /// Record a decoded bitmap. Ignored for any other url.
    pub fn mark_ready(&mut self, url: &str, width: u32, height: u32) -> bool {
        if url != self.url {
            return false;
        }
        self.status = LoadStatus::Ready { width, height };
        true
    }

    /// Record a failed load. Ignored for any other url.
    pub fn mark_failed(&mut self, url: &str) -> bool {
        if url != self.url {
            return false;
        }
        self.status = LoadStatus::Failed;
        true
    }

    /// Move the destination after a drag, keeping its size.
    pub fn move_to(&mut self, position: Point) {
        self.destination = Rect::from_origin_size(position, self.destination.size());
    }

    /// Hit test against the destination rectangle.
    pub fn hit_test(&self, point: Point) -> bool {
        self.is_ready() && self.destination.contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_until_loaded() {
        let mut bg = BackgroundImage::new("floor.png", Rect::new(0.0, 0.0, 500.0, 500.0));
        assert!(!bg.is_ready());
        assert!(!bg.hit_test(Point::new(10.0, 10.0)));

        assert!(!bg.mark_ready("other.png", 10, 10));
        assert!(!bg.is_ready());

        assert!(bg.mark_ready("floor.png", 1024, 768));
        assert_eq!(bg.status, LoadStatus::Ready { width: 1024, height: 768 });
        assert!(bg.hit_test(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_failed_renders_nothing() {
        let mut bg = BackgroundImage::new("floor.png", Rect::new(0.0, 0.0, 500.0, 500.0));
        assert!(bg.mark_failed("floor.png"));
        assert!(!bg.is_ready());
    }

    #[test]
    fn test_move_keeps_size() {
        let mut bg = BackgroundImage::new("floor.png", Rect::new(0.0, 0.0, 250.0, 250.0));
        bg.move_to(Point::new(30.0, 40.0));
        assert!((bg.destination.x0 - 30.0).abs() < f64::EPSILON);
        assert!((bg.destination.y1 - 290.0).abs() < f64::EPSILON);
        assert!((bg.destination.width() - 250.0).abs() < f64::EPSILON);
    }
}
