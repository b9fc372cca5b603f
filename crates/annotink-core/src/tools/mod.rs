//! Freehand rectangle drawing.
//!
//! A pointer press on empty canvas starts a draft, moves stretch it and
//! the release commits it to the store. The draft is never stored while
//! the gesture runs; it only joins the render list.

use crate::config::DraftStyle;
use crate::shapes::{Rectangle, ShapeKey, ShapeKind, ShapeTrait};
use crate::store::{ShapeStore, StoreResult};
use kurbo::Point;

/// State of the rectangle gesture.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    /// No draft exists.
    #[default]
    Idle,
    /// A draft is being stretched from `anchor`.
    Drafting {
        /// Where the press landed.
        anchor: Point,
        /// Latest pointer position.
        current: Point,
        /// Preview shape, merged into the render list.
        draft: Rectangle,
    },
}

/// What a pointer press did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressOutcome {
    /// A new draft was started.
    Started,
    /// The press landed on an existing shape; it should be selected instead.
    OnShape(ShapeKey),
    /// A draft is already running; the press was ignored.
    Ignored,
}

/// Drives press, drag and release into new rectangles.
#[derive(Debug, Clone, Default)]
pub struct RectangleTool {
    state: GestureState,
    /// Outline applied to drafts.
    pub style: DraftStyle,
    /// Fold negative extents into the position on commit.
    pub normalize: bool,
}

impl RectangleTool {
    /// Create an idle tool.
    pub fn new(style: DraftStyle, normalize: bool) -> Self {
        Self {
            state: GestureState::Idle,
            style,
            normalize,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Check if a draft is in progress.
    pub fn is_drafting(&self) -> bool {
        matches!(self.state, GestureState::Drafting { .. })
    }

    /// The draft being drawn, if any.
    pub fn draft(&self) -> Option<&Rectangle> {
        match &self.state {
            GestureState::Drafting { draft, .. } => Some(draft),
            GestureState::Idle => None,
        }
    }

    /// Handle a pointer press. `hit` is the shape under the pointer.
    pub fn press(&mut self, point: Point, hit: Option<ShapeKey>, store: &ShapeStore) -> PressOutcome {
        if self.is_drafting() {
            return PressOutcome::Ignored;
        }
        if let Some(key) = hit {
            return PressOutcome::OnShape(key);
        }

        let draft = Rectangle::new(store.next_id(ShapeKind::Rectangle), point, 0.0, 0.0)
            .with_stroke(self.style.stroke, self.style.stroke_width);
        log::debug!("Draft {} started at ({}, {})", draft.id(), point.x, point.y);
        self.state = GestureState::Drafting {
            anchor: point,
            current: point,
            draft,
        };
        PressOutcome::Started
    }

    /// Handle a pointer move. Returns true if a draft was updated.
    pub fn drag(&mut self, point: Point) -> bool {
        if let GestureState::Drafting { anchor, current, draft } = &mut self.state {
            *current = point;
            // Sign is kept: a negative extent means up/left of the anchor.
            draft.width = point.x - anchor.x;
            draft.height = point.y - anchor.y;
            true
        } else {
            false
        }
    }

    /// Handle a pointer release, committing the draft.
    ///
    /// Returns the committed key, or `None` when idle or when the
    /// pointer never moved away from the anchor.
    pub fn release(&mut self, point: Point, store: &mut ShapeStore) -> StoreResult<Option<ShapeKey>> {
        self.drag(point);
        let GestureState::Drafting { draft, .. } = std::mem::take(&mut self.state) else {
            return Ok(None);
        };

        if draft.width == 0.0 && draft.height == 0.0 {
            log::debug!("Draft released without extent, nothing committed");
            return Ok(None);
        }

        let mut rect = if self.normalize { draft.normalized() } else { draft };
        rect.set_id(store.next_id(ShapeKind::Rectangle));
        let key = store.add(rect.into())?;
        log::debug!("Committed {}", key);
        Ok(Some(key))
    }
}
