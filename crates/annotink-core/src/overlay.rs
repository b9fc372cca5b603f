//! Text edit overlay synchronisation.
//!
//! Labels are painted on the canvas but edited through an off-canvas text
//! control. This module keeps each control's visibility, position and
//! value in step with its label and writes edits back into the store.

use crate::config::ConfirmPolicy;
use crate::input::Key;
use crate::stage::StageTransform;
use crate::store::ShapeStore;
use kurbo::Point;

/// The label most recently opened for editing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextEditSession {
    /// Positional index of the label.
    pub index: usize,
    /// Absolute stage position of the label when it was opened.
    pub anchor: Point,
}

/// What the off-canvas control for one label must show.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub index: usize,
    pub visible: bool,
    /// Absolute stage position.
    pub position: Point,
    pub value: String,
}

/// Keeps edit controls in step with text labels.
#[derive(Debug, Clone, Default)]
pub struct TextEditOverlay {
    session: Option<TextEditSession>,
    /// Effect of confirming on sibling labels.
    pub policy: ConfirmPolicy,
    /// Key that confirms an edit.
    pub confirm_key: Key,
}

impl TextEditOverlay {
    pub fn new(policy: ConfirmPolicy, confirm_key: Key) -> Self {
        Self {
            session: None,
            policy,
            confirm_key,
        }
    }

    /// Current session, possibly referring to a label that no longer exists.
    pub fn session(&self) -> Option<&TextEditSession> {
        self.session.as_ref()
    }

    /// Toggle the editor of the label at `index` and record its anchor.
    ///
    /// Other labels are left as they are; several editors may be open.
    /// Returns false if there is no label at `index`.
    pub fn open_editor(&mut self, store: &mut ShapeStore, index: usize, stage: &StageTransform) -> bool {
        let Some(label) = store.label_at(index) else {
            log::warn!("Ignoring edit request for missing label {}", index);
            return false;
        };
        let mut label = label.clone();
        label.edit_visible = !label.edit_visible;
        let anchor = stage.to_absolute(label.position);
        let visible = label.edit_visible;

        if store.replace_label_at(index, label).is_err() {
            return false;
        }
        if visible {
            self.session = Some(TextEditSession { index, anchor });
        } else if self.session.is_some_and(|s| s.index == index) {
            self.session = None;
        }
        log::debug!("Label {} editor {}", index, if visible { "opened" } else { "closed" });
        true
    }

    /// Write the control's value into the label immediately.
    pub fn update_value(&mut self, store: &mut ShapeStore, index: usize, value: &str) -> bool {
        let Some(label) = store.label_at(index) else {
            log::warn!("Ignoring text update for missing label {}", index);
            return false;
        };
        let mut label = label.clone();
        label.text = value.to_string();
        store.replace_label_at(index, label).is_ok()
    }

    /// Close the editor of the label at `index`.
    pub fn confirm_and_close(&mut self, store: &mut ShapeStore, index: usize) -> bool {
        if store.label_at(index).is_none() {
            log::warn!("Ignoring confirm for missing label {}", index);
            return false;
        }
        match self.policy {
            ConfirmPolicy::CloseEditedOnly => {
                store.update_labels(|i, label| {
                    if i == index {
                        label.edit_visible = false;
                    }
                });
            }
            ConfirmPolicy::ReopenSiblings => {
                store.update_labels(|i, label| label.edit_visible = i != index);
            }
        }
        if self.session.is_some_and(|s| s.index == index) {
            self.session = None;
        }
        log::debug!("Label {} edit confirmed", index);
        true
    }

    /// Handle a key typed into the control of the label at `index`.
    ///
    /// Returns true if the key confirmed the edit.
    pub fn handle_key(&mut self, store: &mut ShapeStore, index: usize, key: &Key) -> bool {
        if *key == self.confirm_key {
            self.confirm_and_close(store, index)
        } else {
            false
        }
    }

    /// One view per label, in label order.
    pub fn views(&self, store: &ShapeStore, stage: &StageTransform) -> Vec<OverlayView> {
        store
            .labels()
            .as_slice()
            .iter()
            .enumerate()
            .map(|(index, label)| {
                let position = match self.session {
                    Some(session) if session.index == index => session.anchor,
                    _ => stage.to_absolute(label.position),
                };
                OverlayView {
                    index,
                    visible: label.edit_visible,
                    position,
                    value: label.text.clone(),
                }
            })
            .collect()
    }
}
