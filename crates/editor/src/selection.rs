//! Selection Tracking
//!
//! Turns selection-change notifications into the state the floating
//! toolbar renders from: the selected text, whether it is bold, and where
//! the toolbar should sit.

use marginalia_core::config::ToolbarConfig;
use serde::Serialize;
use tracing::trace;

use crate::range::TextRange;
use crate::surface::DocumentSurface;

/// Screen position of the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AnchorPosition {
    pub top: f64,
    pub left: f64,
}

/// Published selection state
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SelectionState {
    pub range: TextRange,
    pub text: String,
    pub is_bold: bool,
    pub anchor: AnchorPosition,
    /// Whether the toolbar should be shown
    pub visible: bool,
}

impl SelectionState {
    /// The state published for a collapsed or missing selection
    pub fn hidden() -> Self {
        Self::default()
    }
}

/// Tracks the current selection of a document surface
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    state: SelectionState,
    offset_top: f64,
    scroll_left: f64,
}

impl SelectionTracker {
    pub fn new(config: &ToolbarConfig) -> Self {
        Self {
            state: SelectionState::hidden(),
            offset_top: config.offset_top,
            scroll_left: 0.0,
        }
    }

    /// Current published state
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Range of a visible selection
    pub fn active_range(&self) -> Option<TextRange> {
        self.state.visible.then_some(self.state.range)
    }

    /// Horizontal scroll of the host page, added to the toolbar's left edge
    pub fn set_scroll_left(&mut self, scroll_left: f64) {
        self.scroll_left = scroll_left;
    }

    /// Recompute the state for a selection change
    pub fn handle<S: DocumentSurface + ?Sized>(&mut self, surface: &S, range: Option<TextRange>) -> &SelectionState {
        self.state = match range.filter(|range| !range.is_caret()) {
            Some(range) => {
                let bounds = surface.bounds(range);
                SelectionState {
                    range,
                    text: surface.text(range),
                    is_bold: surface.format_at(range).bold,
                    anchor: AnchorPosition {
                        top: bounds.top + self.offset_top,
                        left: bounds.left + self.scroll_left,
                    },
                    visible: true,
                }
            }
            None => SelectionState::hidden(),
        };

        trace!("Selection state: {:?}", self.state);
        &self.state
    }

    /// Recompute the state for the surface's current selection
    pub fn refresh<S: DocumentSurface + ?Sized>(&mut self, surface: &S) -> &SelectionState {
        let range = surface.selection();
        self.handle(surface, range)
    }
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new(&ToolbarConfig::default())
    }
}
