//! Editor configuration.

use crate::input::Key;
use crate::selection::MIN_RESIZE_BOX;
use crate::shapes::SerializableColor;
use crate::transform::MIN_COMMITTED_WIDTH;
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Viewport width above which no downscaling is applied.
pub const WIDE_VIEWPORT: f64 = 1080.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Scale factor applied to the seeded scene and toolbar shapes.
pub struct ViewportScale;

impl ViewportScale {
    /// Wide viewports draw at 1:1, narrow ones scale by their aspect ratio.
    pub fn from_viewport(width: f64, height: f64) -> f64 {
        if width > WIDE_VIEWPORT || height <= 0.0 {
            1.0
        } else {
            width / height
        }
    }
}

/// Outline used for rectangles drawn by pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DraftStyle {
    pub stroke: SerializableColor,
    pub stroke_width: f64,
}

impl Default for DraftStyle {
    fn default() -> Self {
        Self {
            stroke: SerializableColor::red(),
            stroke_width: 5.0,
        }
    }
}

/// What confirming a label edit does to the other labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfirmPolicy {
    /// Only the confirmed label's editor closes.
    #[default]
    CloseEditedOnly,
    /// The confirmed label's editor closes and every other label's editor opens.
    ReopenSiblings,
}

/// Background image descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundConfig {
    /// Where the bitmap is fetched from.
    pub url: String,
    /// Destination rectangle before scaling.
    pub destination: Rect,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            destination: Rect::new(0.0, 0.0, 500.0, 500.0),
        }
    }
}

/// Editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Explicit scale for seeded and toolbar-created geometry.
    pub scale: f64,
    /// Live resize floor, in either dimension.
    pub min_resize_box: f64,
    /// Width floor applied when a resize is reconciled.
    pub min_committed_width: f64,
    /// Outline for drawn rectangles (stroke width before scaling).
    pub draft_style: DraftStyle,
    /// Fold negative draft extents into the position on commit.
    pub normalize_drafts: bool,
    /// Key that confirms a label edit.
    pub confirm_key: Key,
    /// Effect of confirming on sibling labels.
    pub confirm_policy: ConfirmPolicy,
    /// Stage size in pixels.
    pub stage_size: Size,
    /// Hit-test tolerance for pointer presses.
    pub hit_tolerance: f64,
    /// Background image.
    pub background: BackgroundConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            min_resize_box: MIN_RESIZE_BOX,
            min_committed_width: MIN_COMMITTED_WIDTH,
            draft_style: DraftStyle::default(),
            normalize_drafts: false,
            confirm_key: Key::Enter,
            confirm_policy: ConfirmPolicy::default(),
            stage_size: Size::new(800.0, 800.0),
            hit_tolerance: 0.0,
            background: BackgroundConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Config for a viewport; the stage is a square of the scaled viewport height.
    pub fn for_viewport(width: f64, height: f64) -> Self {
        let scale = ViewportScale::from_viewport(width, height);
        Self {
            scale,
            stage_size: Size::new(height * scale, height * scale),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the editor cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "scale",
                reason: format!("must be positive, got {}", self.scale),
            });
        }
        if self.min_resize_box < 0.0 || self.min_committed_width < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "min_resize_box",
                reason: "size floors cannot be negative".to_string(),
            });
        }
        if self.draft_style.stroke_width < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "draft_style",
                reason: "stroke width cannot be negative".to_string(),
            });
        }
        Ok(())
    }

    /// Draft outline with the scale applied.
    pub fn scaled_draft_style(&self) -> DraftStyle {
        DraftStyle {
            stroke: self.draft_style.stroke,
            stroke_width: self.draft_style.stroke_width * self.scale,
        }
    }

    /// Background destination with the scale applied.
    pub fn scaled_background_destination(&self) -> Rect {
        let d = self.background.destination;
        Rect::new(d.x0 * self.scale, d.y0 * self.scale, d.x1 * self.scale, d.y1 * self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_scale() {
        assert!((ViewportScale::from_viewport(1920.0, 1080.0) - 1.0).abs() < f64::EPSILON);
        assert!((ViewportScale::from_viewport(400.0, 800.0) - 0.5).abs() < f64::EPSILON);
        assert!((ViewportScale::from_viewport(1080.0, 540.0) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_for_viewport() {
        let config = EditorConfig::for_viewport(400.0, 800.0);
        assert!((config.scale - 0.5).abs() < f64::EPSILON);
        assert!((config.stage_size.width - 400.0).abs() < f64::EPSILON);
        assert!((config.scaled_draft_style().stroke_width - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = EditorConfig::from_json(r#"{ "scale": 2.0, "confirm_policy": "ReopenSiblings" }"#).unwrap();
        assert!((config.scale - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.confirm_policy, ConfirmPolicy::ReopenSiblings);
        assert_eq!(config.confirm_key, Key::Enter);
        assert!((config.min_resize_box - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EditorConfig::for_viewport(400.0, 800.0);
        let json = config.to_json().unwrap();
        assert_eq!(EditorConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            EditorConfig::from_json(r#"{ "scale": 0.0 }"#),
            Err(ConfigError::InvalidValue { field: "scale", .. })
        ));
        assert!(matches!(EditorConfig::from_json("not json"), Err(ConfigError::Json(_))));
    }
}
