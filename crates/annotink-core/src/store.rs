//! Authoritative shape storage.
//!
//! Every variant lives in its own ordered collection. Collections are
//! copy-on-write: a snapshot taken before a mutation keeps observing the
//! old sequence, so a render pass never sees a half-applied change.

use crate::shapes::{Circle, Rectangle, SerializableColor, Shape, ShapeKey, ShapeKind, ShapeTrait, TextLabel};
use kurbo::Point;
use std::sync::Arc;
use thiserror::Error;

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Shape not found: {0}")]
    NotFound(ShapeKey),
    #[error("Shape id already in use: {0}")]
    DuplicateId(ShapeKey),
    #[error("Expected a {expected:?} shape, got {found:?}")]
    KindMismatch { expected: ShapeKind, found: ShapeKind },
    #[error("No text label at index {0}")]
    LabelIndex(usize),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Ordered, copy-on-write collection of one shape variant.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Arc<Vec<T>>,
    /// Next numeric suffix handed out by `next_id`. Never decreases.
    next_serial: u64,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            next_serial: 1,
        }
    }
}

impl<T: ShapeTrait + Clone> Collection<T> {
    /// Cheap snapshot of the current sequence.
    pub fn snapshot(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.items)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|s| s.id() == id)
    }

    pub fn get_at(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|s| s.id() == id)
    }

    /// The id the next generated shape of this variant will receive.
    pub fn next_id(&self) -> String {
        format!("{}{}", T::KIND.id_prefix(), self.next_serial)
    }

    /// Keep the counter ahead of any explicit `<prefix><n>` id.
    fn reserve(&mut self, id: &str) {
        let serial = id
            .strip_prefix(T::KIND.id_prefix())
            .and_then(|suffix| suffix.parse::<u64>().ok());
        if let Some(n) = serial {
            self.next_serial = self.next_serial.max(n + 1);
        }
    }

    /// Append a shape. An empty id is replaced by a generated one.
    pub fn add(&mut self, mut shape: T) -> StoreResult<ShapeKey> {
        if shape.id().is_empty() {
            shape.set_id(self.next_id());
        }
        if self.get(shape.id()).is_some() {
            return Err(StoreError::DuplicateId(shape.key()));
        }
        self.reserve(shape.id());
        let key = shape.key();
        Arc::make_mut(&mut self.items).push(shape);
        Ok(key)
    }

    /// Replace the shape with `id`, keeping its slot and its id.
    pub fn replace(&mut self, id: &str, mut shape: T) -> StoreResult<()> {
        let index = self
            .index_of(id)
            .ok_or_else(|| StoreError::NotFound(ShapeKey::new(T::KIND, id)))?;
        shape.set_id(id.to_string());
        Arc::make_mut(&mut self.items)[index] = shape;
        Ok(())
    }

    /// Replace the shape at a positional index, keeping its id.
    pub fn replace_at(&mut self, index: usize, mut shape: T) -> Option<()> {
        let id = self.items.get(index)?.id().to_string();
        shape.set_id(id);
        Arc::make_mut(&mut self.items)[index] = shape;
        Some(())
    }

    /// Remove the shape with `id`.
    pub fn remove(&mut self, id: &str) -> StoreResult<T> {
        let index = self
            .index_of(id)
            .ok_or_else(|| StoreError::NotFound(ShapeKey::new(T::KIND, id)))?;
        Ok(Arc::make_mut(&mut self.items).remove(index))
    }

    /// Rewrite every shape in one pass, producing a single new sequence.
    pub fn update_all(&mut self, mut f: impl FnMut(usize, &mut T)) {
        let items = Arc::make_mut(&mut self.items);
        for (index, shape) in items.iter_mut().enumerate() {
            f(index, shape);
        }
    }
}

/// Owns every persisted shape of the scene.
#[derive(Debug, Clone, Default)]
pub struct ShapeStore {
    rectangles: Collection<Rectangle>,
    circles: Collection<Circle>,
    labels: Collection<TextLabel>,
}

impl ShapeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The seeded scene: two outlined rectangles, a marker circle and a room label.
    pub fn initial(scale: f64) -> Self {
        let mut store = Self::new();
        let seed: [Shape; 4] = [
            Rectangle::new("rect1", Point::new(90.0 * scale, 60.0 * scale), 100.0 * scale, 100.0 * scale)
                .with_stroke(SerializableColor::red(), 5.0 * scale)
                .into(),
            Rectangle::new("rect2", Point::new(210.0 * scale, 60.0 * scale), 100.0 * scale, 100.0 * scale)
                .with_stroke(SerializableColor::green(), 5.0 * scale)
                .into(),
            Circle::new("circle1", Point::new(250.0 * scale, 120.0 * scale), 20.0 * scale).into(),
            TextLabel::new("text1", Point::new(125.0 * scale, 100.0 * scale), "卧室")
                .with_font_size(15.0 * scale)
                .with_width(100.0 * scale)
                .into(),
        ];
        for shape in seed {
            // Ids above are distinct, so this cannot collide.
            if let Err(e) = store.add(shape) {
                log::warn!("Skipping seed shape: {}", e);
            }
        }
        store
    }

    pub fn rectangles(&self) -> &Collection<Rectangle> {
        &self.rectangles
    }

    pub fn circles(&self) -> &Collection<Circle> {
        &self.circles
    }

    pub fn labels(&self) -> &Collection<TextLabel> {
        &self.labels
    }

    /// Next generated id for a variant.
    pub fn next_id(&self, kind: ShapeKind) -> String {
        match kind {
            ShapeKind::Rectangle => self.rectangles.next_id(),
            ShapeKind::Circle => self.circles.next_id(),
            ShapeKind::Text => self.labels.next_id(),
        }
    }

    /// Add a shape to its variant's collection.
    pub fn add(&mut self, shape: Shape) -> StoreResult<ShapeKey> {
        match shape {
            Shape::Rectangle(r) => self.rectangles.add(r),
            Shape::Circle(c) => self.circles.add(c),
            Shape::Text(t) => self.labels.add(t),
        }
    }

    /// Replace the shape identified by `key`.
    pub fn replace(&mut self, key: &ShapeKey, shape: Shape) -> StoreResult<()> {
        if shape.kind() != key.kind {
            return Err(StoreError::KindMismatch {
                expected: key.kind,
                found: shape.kind(),
            });
        }
        match shape {
            Shape::Rectangle(r) => self.rectangles.replace(&key.id, r),
            Shape::Circle(c) => self.circles.replace(&key.id, c),
            Shape::Text(t) => self.labels.replace(&key.id, t),
        }
    }

    /// Remove the shape identified by `key`.
    pub fn remove(&mut self, key: &ShapeKey) -> StoreResult<Shape> {
        match key.kind {
            ShapeKind::Rectangle => self.rectangles.remove(&key.id).map(Shape::from),
            ShapeKind::Circle => self.circles.remove(&key.id).map(Shape::from),
            ShapeKind::Text => self.labels.remove(&key.id).map(Shape::from),
        }
    }

    /// Look up a shape by key.
    pub fn get(&self, key: &ShapeKey) -> Option<Shape> {
        match key.kind {
            ShapeKind::Rectangle => self.rectangles.get(&key.id).cloned().map(Shape::from),
            ShapeKind::Circle => self.circles.get(&key.id).cloned().map(Shape::from),
            ShapeKind::Text => self.labels.get(&key.id).cloned().map(Shape::from),
        }
    }

    pub fn contains(&self, key: &ShapeKey) -> bool {
        match key.kind {
            ShapeKind::Rectangle => self.rectangles.get(&key.id).is_some(),
            ShapeKind::Circle => self.circles.get(&key.id).is_some(),
            ShapeKind::Text => self.labels.get(&key.id).is_some(),
        }
    }

    /// Label at a positional index.
    pub fn label_at(&self, index: usize) -> Option<&TextLabel> {
        self.labels.get_at(index)
    }

    /// Replace the label at a positional index.
    pub fn replace_label_at(&mut self, index: usize, label: TextLabel) -> StoreResult<()> {
        self.labels
            .replace_at(index, label)
            .ok_or(StoreError::LabelIndex(index))
    }

    /// Rewrite every label in one copy-on-write pass.
    pub fn update_labels(&mut self, f: impl FnMut(usize, &mut TextLabel)) {
        self.labels.update_all(f);
    }

    /// All shapes in paint order (back to front): rectangles, circles, labels.
    pub fn list(&self) -> Vec<Shape> {
        self.rectangles
            .as_slice()
            .iter()
            .cloned()
            .map(Shape::from)
            .chain(self.circles.as_slice().iter().cloned().map(Shape::from))
            .chain(self.labels.as_slice().iter().cloned().map(Shape::from))
            .collect()
    }

    /// Front-most shape under a point.
    pub fn shape_at(&self, point: Point, tolerance: f64) -> Option<ShapeKey> {
        let label = self.labels.as_slice().iter().rev().find(|s| s.hit_test(point, tolerance));
        if let Some(label) = label {
            return Some(label.key());
        }
        let circle = self.circles.as_slice().iter().rev().find(|s| s.hit_test(point, tolerance));
        if let Some(circle) = circle {
            return Some(circle.key());
        }
        self.rectangles
            .as_slice()
            .iter()
            .rev()
            .find(|s| s.hit_test(point, tolerance))
            .map(|s| s.key())
    }

    pub fn len(&self) -> usize {
        self.rectangles.len() + self.circles.len() + self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
