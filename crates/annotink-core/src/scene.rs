//! Scene composition for the rendering surface.
//!
//! Merges persisted shapes with the in-progress draft into one ordered
//! list and stamps each entry with its selection flag.

use crate::background::BackgroundImage;
use crate::overlay::OverlayView;
use crate::selection::{Handle, handles};
use crate::shapes::{Rectangle, Shape, ShapeKey, ShapeTrait};
use crate::stage::StageTransform;
use crate::store::ShapeStore;
use crate::transform::NodeTransform;
use kurbo::{Point, Size};

/// One shape as the surface should draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub shape: Shape,
    /// Draw the selection affordance.
    pub selected: bool,
    /// Uncommitted rectangle from a running gesture.
    pub draft: bool,
}

/// Everything the surface needs for one frame, back to front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub size: Size,
    /// Layer transform; item geometry is in layer coordinates.
    pub stage: StageTransform,
    /// Present only once the bitmap is loaded.
    pub background: Option<BackgroundImage>,
    pub items: Vec<RenderItem>,
    /// Resize handles of the selected rectangle.
    pub handles: Vec<Handle>,
    /// Off-canvas text controls, one per label.
    pub overlays: Vec<OverlayView>,
}

impl Scene {
    /// The selected item, if the selection still refers to a shape.
    pub fn selected(&self) -> Option<&RenderItem> {
        self.items.iter().find(|item| item.selected)
    }
}

/// Callbacks the surface reports for individual rendered nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeEvent {
    /// A node was clicked or tapped.
    Select { key: ShapeKey },
    /// A node drag finished at `position`.
    DragEnd { key: ShapeKey, position: Point },
    /// A transformer resize finished with the node's visual state.
    TransformEnd { key: ShapeKey, node: NodeTransform },
    /// A node was double-clicked or double-tapped.
    DoubleClick { key: ShapeKey },
    /// The background drag finished at `position`.
    BackgroundDragEnd { position: Point },
}

/// Builds a [`Scene`] from the editor's state sources.
pub struct SceneComposer<'a> {
    store: &'a ShapeStore,
    draft: Option<&'a Rectangle>,
    selection: Option<&'a ShapeKey>,
    background: Option<&'a BackgroundImage>,
    overlays: Vec<OverlayView>,
    size: Size,
    stage: StageTransform,
}

impl<'a> SceneComposer<'a> {
    pub fn new(store: &'a ShapeStore) -> Self {
        Self {
            store,
            draft: None,
            selection: None,
            background: None,
            overlays: Vec::new(),
            size: Size::ZERO,
            stage: StageTransform::default(),
        }
    }

    pub fn with_draft(mut self, draft: Option<&'a Rectangle>) -> Self {
        self.draft = draft;
        self
    }

    pub fn with_selection(mut self, selection: Option<&'a ShapeKey>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_background(mut self, background: &'a BackgroundImage) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_overlays(mut self, overlays: Vec<OverlayView>) -> Self {
        self.overlays = overlays;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_stage(mut self, stage: StageTransform) -> Self {
        self.stage = stage;
        self
    }

    fn item(&self, shape: Shape) -> RenderItem {
        let selected = self.selection.is_some_and(|key| *key == shape.key());
        RenderItem {
            shape,
            selected,
            draft: false,
        }
    }

    /// Compose the frame: rectangles, the draft, circles, then labels.
    pub fn compose(self) -> Scene {
        let rects = self.store.rectangles().snapshot();
        let circles = self.store.circles().snapshot();
        let labels = self.store.labels().snapshot();

        let mut items = Vec::with_capacity(rects.len() + circles.len() + labels.len() + 1);
        items.extend(rects.iter().cloned().map(|r| self.item(r.into())));
        if let Some(draft) = self.draft {
            items.push(RenderItem {
                shape: draft.clone().into(),
                selected: false,
                draft: true,
            });
        }
        items.extend(circles.iter().cloned().map(|c| self.item(c.into())));
        items.extend(labels.iter().cloned().map(|t| self.item(t.into())));

        let handles = self
            .selection
            .and_then(|key| rects.iter().find(|r| r.key() == *key))
            .map(|rect| handles(rect).to_vec())
            .unwrap_or_default();

        Scene {
            size: self.size,
            stage: self.stage,
            background: self.background.filter(|bg| bg.is_ready()).cloned(),
            items,
            handles,
            overlays: self.overlays,
        }
    }
}
