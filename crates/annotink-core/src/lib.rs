//! AnnotInk Core Library
//!
//! Shape interaction and editing state for a 2-D annotation editor drawn
//! over a raster background. Platform-agnostic: a rendering surface feeds
//! pointer and keyboard events in and draws the composed [`Scene`].

pub mod background;
pub mod config;
pub mod editor;
pub mod input;
pub mod overlay;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod stage;
pub mod store;
pub mod tools;
pub mod transform;

pub use background::{BackgroundImage, LoadStatus};
pub use config::{ConfigError, ConfirmPolicy, DraftStyle, EditorConfig, ViewportScale};
pub use editor::{Editor, EditorEffect};
pub use input::{ClickDetector, Key, PointerEvent};
pub use overlay::{OverlayView, TextEditOverlay, TextEditSession};
pub use scene::{RenderItem, Scene, SceneComposer, ShapeEvent};
pub use selection::{Corner, Handle, ResizeGesture, SelectionController, constrain_resize_box};
pub use shapes::{Circle, Rectangle, SerializableColor, Shape, ShapeKey, ShapeKind, ShapeTrait, TextLabel};
pub use stage::StageTransform;
pub use store::{ShapeStore, StoreError, StoreResult};
pub use tools::{GestureState, RectangleTool};
pub use transform::{NodeTransform, TransformReconciler};
