//! Document Surface
//!
//! The editing capability the engine drives. A host supplies an
//! implementation backed by its rich-text widget; [`crate::TextBuffer`] is
//! the in-memory one.

use marginalia_core::{EventSubscription, Rgba};
use serde::{Deserialize, Serialize};

use crate::range::TextRange;

/// Who caused a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeSource {
    /// Direct user input
    User,
    /// Programmatic change issued by the engine
    Api,
    /// Programmatic change that should not be reacted to
    Silent,
}

/// Formatting reported for a range
///
/// A value is only reported when the whole range agrees on it: a range that
/// is partly bold reports `bold == false`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Format {
    pub bold: bool,
    pub background: Option<Rgba>,
}

/// Formatting patch; `None` fields are left untouched
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub bold: Option<bool>,
    pub background: Option<Rgba>,
}

impl Attributes {
    pub fn bold(value: bool) -> Self {
        Self {
            bold: Some(value),
            background: None,
        }
    }

    pub fn background(color: Rgba) -> Self {
        Self {
            bold: None,
            background: Some(color),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bold.is_none() && self.background.is_none()
    }
}

/// Screen-space geometry of a range
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// What a text-change notification changed
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Insert { index: usize, text: String },
    Delete { range: TextRange },
    Format { range: TextRange, attributes: Attributes },
}

/// Notifications emitted by a surface, in the order the edits happened
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    SelectionChanged {
        range: Option<TextRange>,
        old_range: Option<TextRange>,
        source: ChangeSource,
    },
    TextChanged {
        change: Change,
        source: ChangeSource,
    },
}

/// Capabilities the engine needs from a rich-text document
pub trait DocumentSurface {
    /// Text under a range, clamped to the document
    fn text(&self, range: TextRange) -> String;

    /// Document length in characters
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Active selection, `None` when the document is unfocused
    fn selection(&self) -> Option<TextRange>;

    fn set_selection(&mut self, range: TextRange, source: ChangeSource);

    fn bounds(&self, range: TextRange) -> Bounds;

    fn format_at(&self, range: TextRange) -> Format;

    fn format_text(&mut self, range: TextRange, attributes: &Attributes, source: ChangeSource);

    /// Apply attributes to the active selection; carets are left alone
    fn format(&mut self, attributes: &Attributes, source: ChangeSource) {
        if let Some(range) = self.selection().filter(|range| !range.is_caret()) {
            self.format_text(range, attributes, source);
        }
    }

    /// Register for selection and text notifications
    fn subscribe(&self) -> EventSubscription<SurfaceEvent>;

    /// Step back in the surface history; false when there is nothing to undo
    fn undo(&mut self) -> bool;

    /// Step forward in the surface history; false when there is nothing to redo
    fn redo(&mut self) -> bool;
}
