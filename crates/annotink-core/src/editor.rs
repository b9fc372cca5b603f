//! Editor facade.
//!
//! Owns every state source (shape store, selection, rectangle gesture,
//! text overlay, background) and routes surface events into them. All
//! handlers run synchronously to completion; nothing here blocks.

use crate::background::BackgroundImage;
use crate::config::{EditorConfig, ViewportScale};
use crate::input::{ClickDetector, Key, PointerEvent};
use crate::overlay::{OverlayView, TextEditOverlay};
use crate::scene::{Scene, SceneComposer, ShapeEvent};
use crate::selection::{HANDLE_HIT_TOLERANCE, ResizeGesture, SelectionController, hit_test_handles};
use crate::shapes::{Circle, Rectangle, SerializableColor, Shape, ShapeKey, ShapeKind};
use crate::stage::StageTransform;
use crate::store::{ShapeStore, StoreError, StoreResult};
use crate::tools::{PressOutcome, RectangleTool};
use crate::transform::{NodeTransform, TransformReconciler};
use kurbo::{Point, Size};

/// Scale a clicked circle pulses to.
pub const PULSE_SCALE: f64 = 1.5;

/// Something the surface should do after an event was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEffect {
    /// State changed; compose and draw a new scene.
    Redraw,
    /// Animate the node briefly to `scale` and back.
    Pulse { key: ShapeKey, scale: f64 },
    /// Reset the node's visual transform to this one.
    SyncNode { key: ShapeKey, node: NodeTransform },
}

/// Interactive annotation editor.
#[derive(Debug, Clone)]
pub struct Editor {
    config: EditorConfig,
    store: ShapeStore,
    selection: SelectionController,
    tool: RectangleTool,
    reconciler: TransformReconciler,
    overlay: TextEditOverlay,
    stage: StageTransform,
    background: BackgroundImage,
    resize: Option<ResizeGesture>,
    clicks: ClickDetector,
}

impl Editor {
    /// Create an editor with an empty scene.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_store(config, ShapeStore::new())
    }

    /// Create an editor with the seeded scene at the configured scale.
    pub fn with_initial_scene(config: EditorConfig) -> Self {
        let store = ShapeStore::initial(config.scale);
        Self::with_store(config, store)
    }

    /// Create an editor over an existing store.
    pub fn with_store(config: EditorConfig, store: ShapeStore) -> Self {
        let tool = RectangleTool::new(config.scaled_draft_style(), config.normalize_drafts);
        let reconciler = TransformReconciler::new(config.min_committed_width);
        let overlay = TextEditOverlay::new(config.confirm_policy, config.confirm_key.clone());
        let background = BackgroundImage::new(config.background.url.clone(), config.scaled_background_destination());
        Self {
            config,
            store,
            selection: SelectionController::new(),
            tool,
            reconciler,
            overlay,
            stage: StageTransform::default(),
            background,
            resize: None,
            clicks: ClickDetector::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    pub fn selection(&self) -> Option<&ShapeKey> {
        self.selection.current()
    }

    pub fn tool(&self) -> &RectangleTool {
        &self.tool
    }

    pub fn overlay(&self) -> &TextEditOverlay {
        &self.overlay
    }

    pub fn background(&self) -> &BackgroundImage {
        &self.background
    }

    pub fn stage(&self) -> &StageTransform {
        &self.stage
    }

    /// Set the transform of the layer holding the shapes.
    pub fn set_stage(&mut self, stage: StageTransform) {
        self.stage = stage;
    }

    /// Select a shape. The key need not exist.
    pub fn select(&mut self, key: ShapeKey) {
        self.selection.select(key);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Recompute the scale after the viewport was resized.
    ///
    /// Existing geometry is kept; new shapes and drafts use the new scale.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        let scale = ViewportScale::from_viewport(width, height);
        self.config.scale = scale;
        self.config.stage_size = Size::new(height * scale, height * scale);
        self.tool.style = self.config.scaled_draft_style();
        log::debug!("Viewport {}x{}, scale {}", width, height, scale);
    }

    /// Add the toolbar rectangle.
    pub fn add_rectangle(&mut self) -> StoreResult<ShapeKey> {
        let s = self.config.scale;
        let rect = Rectangle::new(
            self.store.next_id(ShapeKind::Rectangle),
            Point::new(10.0 * s, 200.0 * s),
            100.0 * s,
            100.0 * s,
        )
        .with_stroke(SerializableColor::red(), Rectangle::DEFAULT_STROKE_WIDTH);
        let key = self.store.add(rect.into())?;
        log::info!("Added {}", key);
        Ok(key)
    }

    /// Add the toolbar circle.
    pub fn add_circle(&mut self) -> StoreResult<ShapeKey> {
        let s = self.config.scale;
        let circle = Circle::new(self.store.next_id(ShapeKind::Circle), Point::new(100.0 * s, 100.0 * s), 20.0 * s)
            .with_fill(SerializableColor::red());
        let key = self.store.add(circle.into())?;
        log::info!("Added {}", key);
        Ok(key)
    }

    /// Handle a stage-level pointer event.
    ///
    /// Positions are stage-relative and mapped into layer coordinates
    /// before any hit test.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<EditorEffect> {
        let position = self.stage.to_local(event.position());
        match event {
            PointerEvent::Down { .. } => self.pointer_down(position),
            PointerEvent::Move { .. } => self.pointer_move(position),
            PointerEvent::Up { .. } => self.pointer_up(position),
            PointerEvent::Click { .. } => match self.store.shape_at(position, self.config.hit_tolerance) {
                Some(key) => self.handle_shape_event(ShapeEvent::Select { key }),
                None => {
                    // Clicks on the background or empty stage deselect.
                    self.selection.clear();
                    vec![EditorEffect::Redraw]
                }
            },
            PointerEvent::DoubleClick { .. } => match self.store.shape_at(position, self.config.hit_tolerance) {
                Some(key) => self.handle_shape_event(ShapeEvent::DoubleClick { key }),
                None => Vec::new(),
            },
        }
    }

    /// Handle a raw press, move or release from a surface that does not
    /// report clicks itself.
    ///
    /// Click and double-click events are synthesised from the timing and
    /// dispatched after the raw event.
    pub fn handle_raw_pointer(&mut self, event: PointerEvent, time_ms: u64) -> Vec<EditorEffect> {
        let mut effects = Vec::new();
        for event in self.clicks.feed(event, time_ms) {
            effects.extend(self.handle_pointer(event));
        }
        effects
    }

    fn pointer_down(&mut self, position: Point) -> Vec<EditorEffect> {
        if self.tool.is_drafting() {
            return Vec::new();
        }
        if let Some(gesture) = self.begin_resize(position) {
            log::debug!("Resizing {} from {:?}", gesture.key, gesture.corner);
            self.resize = Some(gesture);
            return Vec::new();
        }

        let hit = self.store.shape_at(position, self.config.hit_tolerance);
        match self.tool.press(position, hit, &self.store) {
            PressOutcome::Started => {
                self.selection.clear();
                vec![EditorEffect::Redraw]
            }
            PressOutcome::OnShape(key) => {
                // Circles answer clicks with a pulse, not selection.
                if key.kind != ShapeKind::Circle {
                    self.selection.select(key);
                }
                vec![EditorEffect::Redraw]
            }
            PressOutcome::Ignored => Vec::new(),
        }
    }

    fn begin_resize(&self, position: Point) -> Option<ResizeGesture> {
        let key = self.selection.current()?;
        if key.kind != ShapeKind::Rectangle {
            return None;
        }
        let rect = self.store.rectangles().get(&key.id)?;
        let corner = hit_test_handles(rect, position, HANDLE_HIT_TOLERANCE)?;
        Some(ResizeGesture::begin(
            key.clone(),
            rect,
            corner,
            position,
            self.config.min_resize_box,
        ))
    }

    fn pointer_move(&mut self, position: Point) -> Vec<EditorEffect> {
        if let Some(gesture) = self.resize.as_mut() {
            gesture.update(position);
            return vec![EditorEffect::Redraw];
        }
        if self.tool.drag(position) {
            vec![EditorEffect::Redraw]
        } else {
            Vec::new()
        }
    }

    fn pointer_up(&mut self, position: Point) -> Vec<EditorEffect> {
        if let Some(mut gesture) = self.resize.take() {
            gesture.update(position);
            let key = gesture.key.clone();
            let Some(rect) = self.store.rectangles().get(&key.id) else {
                log::warn!("Resize ended on missing rectangle {}", key);
                return vec![EditorEffect::Redraw];
            };
            // The gesture measures the normalised box, so reconcile against it too.
            let rect = rect.normalized();
            return self.end_transform(key, &rect, gesture.end());
        }
        if !self.tool.is_drafting() {
            return Vec::new();
        }
        match self.tool.release(position, &mut self.store) {
            Ok(Some(key)) => log::info!("Drew {}", key),
            Ok(None) => {}
            Err(e) => log::warn!("Draft not committed: {}", e),
        }
        vec![EditorEffect::Redraw]
    }

    /// Handle a callback reported for a rendered node.
    pub fn handle_shape_event(&mut self, event: ShapeEvent) -> Vec<EditorEffect> {
        match event {
            ShapeEvent::Select { key } if key.kind == ShapeKind::Circle => {
                vec![EditorEffect::Pulse { key, scale: PULSE_SCALE }]
            }
            ShapeEvent::Select { key } => {
                self.selection.select(key);
                vec![EditorEffect::Redraw]
            }
            ShapeEvent::DragEnd { key, position } => {
                let Some(shape) = self.store.get(&key) else {
                    log::warn!("Drag ended on missing shape {}", key);
                    return Vec::new();
                };
                let moved = self.reconciler.reconcile_drag(&shape, position);
                self.commit(&key, moved);
                vec![EditorEffect::Redraw]
            }
            ShapeEvent::TransformEnd { key, node } => {
                let Some(rect) = self.store.rectangles().get(&key.id).filter(|_| key.kind == ShapeKind::Rectangle) else {
                    log::warn!("Transform ended on missing rectangle {}", key);
                    return Vec::new();
                };
                let rect = rect.clone();
                self.end_transform(key, &rect, node)
            }
            ShapeEvent::DoubleClick { key } => self.double_click(key),
            ShapeEvent::BackgroundDragEnd { position } => {
                self.background.move_to(position);
                vec![EditorEffect::Redraw]
            }
        }
    }

    fn end_transform(&mut self, key: ShapeKey, rect: &Rectangle, mut node: NodeTransform) -> Vec<EditorEffect> {
        let resized = self.reconciler.reconcile(rect, &mut node);
        log::debug!("Reconciled {} to {}x{}", key, resized.width, resized.height);
        self.commit(&key, resized.into());
        vec![EditorEffect::SyncNode { key, node }, EditorEffect::Redraw]
    }

    fn double_click(&mut self, key: ShapeKey) -> Vec<EditorEffect> {
        match key.kind {
            ShapeKind::Rectangle => {
                // Deletes the selected rectangle, which is not necessarily the one hit.
                let Some(selected) = self.selection.current().filter(|k| k.kind == ShapeKind::Rectangle).cloned()
                else {
                    return Vec::new();
                };
                match self.store.remove(&selected) {
                    Ok(_) => {
                        log::info!("Deleted {}", selected);
                        vec![EditorEffect::Redraw]
                    }
                    Err(e) => {
                        log::warn!("Nothing deleted: {}", e);
                        Vec::new()
                    }
                }
            }
            ShapeKind::Text => {
                let Some(index) = self.store.labels().index_of(&key.id) else {
                    log::warn!("Double-click on missing label {}", key);
                    return Vec::new();
                };
                if self.open_editor(index) {
                    vec![EditorEffect::Redraw]
                } else {
                    Vec::new()
                }
            }
            ShapeKind::Circle => Vec::new(),
        }
    }

    fn commit(&mut self, key: &ShapeKey, shape: Shape) {
        match self.store.replace(key, shape) {
            Ok(()) => {}
            Err(e @ StoreError::NotFound(_)) => log::warn!("Stale reference ignored: {}", e),
            Err(e) => log::warn!("Commit rejected: {}", e),
        }
    }

    /// Toggle the edit overlay of the label at `index`.
    pub fn open_editor(&mut self, index: usize) -> bool {
        self.overlay.open_editor(&mut self.store, index, &self.stage)
    }

    /// Live text update from the overlay control.
    pub fn edit_text(&mut self, index: usize, value: &str) -> bool {
        self.overlay.update_value(&mut self.store, index, value)
    }

    /// Close the overlay of the label at `index`.
    pub fn confirm_text(&mut self, index: usize) -> bool {
        self.overlay.confirm_and_close(&mut self.store, index)
    }

    /// Key typed into the overlay control of the label at `index`.
    pub fn handle_key(&mut self, index: usize, key: Key) -> Vec<EditorEffect> {
        if self.overlay.handle_key(&mut self.store, index, &key) {
            vec![EditorEffect::Redraw]
        } else {
            Vec::new()
        }
    }

    /// A background bitmap finished decoding.
    pub fn bitmap_ready(&mut self, url: &str, width: u32, height: u32) -> bool {
        let ready = self.background.mark_ready(url, width, height);
        if !ready {
            log::warn!("Bitmap {} does not match the background", url);
        }
        ready
    }

    /// A background bitmap could not be loaded.
    pub fn bitmap_failed(&mut self, url: &str) -> bool {
        self.background.mark_failed(url)
    }

    /// Overlay state for every label.
    pub fn overlays(&self) -> Vec<OverlayView> {
        self.overlay.views(&self.store, &self.stage)
    }

    /// Compose the current frame.
    pub fn scene(&self) -> Scene {
        let mut scene = SceneComposer::new(&self.store)
            .with_draft(self.tool.draft())
            .with_selection(self.selection.current())
            .with_background(&self.background)
            .with_overlays(self.overlays())
            .with_size(self.config.stage_size)
            .with_stage(self.stage)
            .compose();

        // A running resize shows the live box in place of the stored one.
        if let Some(gesture) = &self.resize {
            for item in &mut scene.items {
                if !item.draft && item.shape.key() == gesture.key {
                    if let Shape::Rectangle(rect) = &mut item.shape {
                        let b = gesture.current_box;
                        rect.position = Point::new(b.x0, b.y0);
                        rect.width = b.width();
                        rect.height = b.height();
                    }
                }
            }
        }
        scene
    }
}
