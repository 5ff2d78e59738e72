//! Text Buffer
//!
//! In-memory document surface using a rope for the text, one [`Format`]
//! per character for inline formatting, and an undo history that covers
//! both text and formatting edits.

use marginalia_core::config::{AppConfig, MetricsConfig};
use marginalia_core::{EventBus, EventSubscription};
use ropey::Rope;
use tracing::debug;

use crate::range::TextRange;
use crate::surface::{Attributes, Bounds, Change, ChangeSource, DocumentSurface, Format, SurfaceEvent};

/// Edit operation for undo/redo
#[derive(Debug, Clone)]
pub enum EditOperation {
    Insert {
        position: usize,
        text: String,
        formats: Vec<Format>,
    },
    Delete {
        position: usize,
        text: String,
        formats: Vec<Format>,
    },
    Format {
        position: usize,
        before: Vec<Format>,
        after: Vec<Format>,
    },
}

impl EditOperation {
    /// Get the inverse operation for undo
    pub fn inverse(&self) -> Self {
        match self {
            EditOperation::Insert { position, text, formats } => EditOperation::Delete {
                position: *position,
                text: text.clone(),
                formats: formats.clone(),
            },
            EditOperation::Delete { position, text, formats } => EditOperation::Insert {
                position: *position,
                text: text.clone(),
                formats: formats.clone(),
            },
            EditOperation::Format { position, before, after } => EditOperation::Format {
                position: *position,
                before: after.clone(),
                after: before.clone(),
            },
        }
    }
}

/// Text position (line, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Rope-backed document with inline formatting
pub struct TextBuffer {
    /// The rope containing the text
    rope: Rope,
    /// Formatting of each character, parallel to the rope
    formats: Vec<Format>,
    /// Undo stack
    undo_stack: Vec<EditOperation>,
    /// Redo stack
    redo_stack: Vec<EditOperation>,
    /// Maximum undo history size
    max_undo_history: usize,
    /// Current selection
    selection: Option<TextRange>,
    /// Monospace geometry for bounds
    metrics: MetricsConfig,
    /// Selection and text notifications
    events: EventBus<SurfaceEvent>,
}

impl TextBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self::from_str("")
    }

    /// Create a buffer from a string
    pub fn from_str(text: &str) -> Self {
        Self::with_config(text, &AppConfig::default())
    }

    /// Create a buffer from a string using configured history and geometry
    pub fn with_config(text: &str, config: &AppConfig) -> Self {
        let rope = Rope::from_str(text);
        let formats = vec![Format::default(); rope.len_chars()];
        Self {
            rope,
            formats,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_history: config.history.max_undo,
            selection: None,
            metrics: config.metrics.clone(),
            events: EventBus::new(),
        }
    }

    /// Get the full text content
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    /// Get the total character count
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Formatting of a single character
    pub fn char_format(&self, char_idx: usize) -> Option<Format> {
        self.formats.get(char_idx).copied()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Convert a char index to a position
    pub fn char_to_position(&self, char_idx: usize) -> Position {
        let char_idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        Position {
            line,
            column: char_idx - line_start,
        }
    }

    /// Insert plain text at a char index
    pub fn insert(&mut self, char_idx: usize, text: &str, source: ChangeSource) {
        if text.is_empty() {
            return;
        }
        let position = char_idx.min(self.rope.len_chars());
        let formats = vec![Format::default(); text.chars().count()];

        let op = EditOperation::Insert {
            position,
            text: text.to_string(),
            formats,
        };
        self.apply_operation(&op, source);
        self.push_undo(op);
    }

    /// Delete the characters under a range
    pub fn delete(&mut self, range: TextRange, source: ChangeSource) {
        let range = range.clamp_to(self.rope.len_chars());
        if range.is_caret() {
            return;
        }

        let op = EditOperation::Delete {
            position: range.index,
            text: self.rope.slice(range.as_char_range()).to_string(),
            formats: self.formats[range.as_char_range()].to_vec(),
        };
        self.apply_operation(&op, source);
        self.push_undo(op);
    }

    /// Replace the characters under a range with plain text
    pub fn replace(&mut self, range: TextRange, text: &str, source: ChangeSource) {
        self.delete(range, source);
        self.insert(range.index, text, source);
    }

    /// Get selected text
    pub fn selected_text(&self) -> Option<String> {
        self.selection.map(|range| self.text(range))
    }

    /// Clear the selection, as when the document loses focus
    pub fn blur(&mut self, source: ChangeSource) {
        self.change_selection(None, source);
    }

    /// Find every occurrence of a query, as character ranges
    pub fn find(&self, query: &str) -> Vec<TextRange> {
        if query.is_empty() {
            return Vec::new();
        }
        let text = self.rope.to_string();
        let query_chars = query.chars().count();

        text.match_indices(query)
            .map(|(byte_idx, _)| TextRange::new(text[..byte_idx].chars().count(), query_chars))
            .collect()
    }

    /// Push an operation to the undo stack
    fn push_undo(&mut self, op: EditOperation) {
        self.undo_stack.push(op);
        self.redo_stack.clear();

        // Trim undo history if needed
        if self.undo_stack.len() > self.max_undo_history {
            self.undo_stack.remove(0);
        }
    }

    /// Apply an edit operation without recording it
    fn apply_operation(&mut self, op: &EditOperation, source: ChangeSource) {
        let change = match op {
            EditOperation::Insert { position, text, formats } => {
                let pos = (*position).min(self.rope.len_chars());
                self.rope.insert(pos, text);
                self.formats.splice(pos..pos, formats.iter().copied());
                Change::Insert {
                    index: pos,
                    text: text.clone(),
                }
            }
            EditOperation::Delete { position, text, .. } => {
                let range = TextRange::new(*position, text.chars().count()).clamp_to(self.rope.len_chars());
                self.rope.remove(range.as_char_range());
                self.formats.drain(range.as_char_range());
                Change::Delete { range }
            }
            EditOperation::Format { position, after, .. } => {
                let range = TextRange::new(*position, after.len()).clamp_to(self.rope.len_chars());
                self.formats[range.as_char_range()].copy_from_slice(&after[..range.length]);
                Change::Format {
                    range,
                    attributes: Attributes::default(),
                }
            }
        };

        debug!("Applied {:?}", change);
        self.events.emit(SurfaceEvent::TextChanged { change, source });
        self.clamp_selection(source);
    }

    /// Keep the selection inside the document after text shrinks
    fn clamp_selection(&mut self, source: ChangeSource) {
        if let Some(range) = self.selection {
            let clamped = range.clamp_to(self.rope.len_chars());
            if clamped != range {
                self.change_selection(Some(clamped), source);
            }
        }
    }

    fn change_selection(&mut self, range: Option<TextRange>, source: ChangeSource) {
        let old_range = self.selection;
        self.selection = range;
        self.events.emit(SurfaceEvent::SelectionChanged {
            range,
            old_range,
            source,
        });
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSurface for TextBuffer {
    fn text(&self, range: TextRange) -> String {
        let range = range.clamp_to(self.rope.len_chars());
        self.rope.slice(range.as_char_range()).to_string()
    }

    fn len(&self) -> usize {
        self.rope.len_chars()
    }

    fn selection(&self) -> Option<TextRange> {
        self.selection
    }

    fn set_selection(&mut self, range: TextRange, source: ChangeSource) {
        let range = range.clamp_to(self.rope.len_chars());
        self.change_selection(Some(range), source);
    }

    fn bounds(&self, range: TextRange) -> Bounds {
        let range = range.clamp_to(self.rope.len_chars());
        let start = self.char_to_position(range.index);
        let end = self.char_to_position(range.end());
        let top = start.line as f64 * self.metrics.line_height;
        let height = (end.line - start.line + 1) as f64 * self.metrics.line_height;

        if start.line == end.line {
            Bounds {
                top,
                left: start.column as f64 * self.metrics.char_width,
                width: (end.column - start.column) as f64 * self.metrics.char_width,
                height,
            }
        } else {
            // Multi-line ranges report the union of their line boxes
            let widest = (start.line..=end.line)
                .map(|line| self.rope.line(line).len_chars())
                .max()
                .unwrap_or(0);
            Bounds {
                top,
                left: 0.0,
                width: widest as f64 * self.metrics.char_width,
                height,
            }
        }
    }

    fn format_at(&self, range: TextRange) -> Format {
        let range = range.clamp_to(self.rope.len_chars());
        let formats = if range.is_caret() {
            // A caret takes the format of the character before it
            let idx = range.index.saturating_sub(1);
            match self.formats.get(idx) {
                Some(format) => std::slice::from_ref(format),
                None => return Format::default(),
            }
        } else {
            &self.formats[range.as_char_range()]
        };

        let first = formats[0];
        Format {
            bold: formats.iter().all(|f| f.bold),
            background: first
                .background
                .filter(|bg| formats.iter().all(|f| f.background == Some(*bg))),
        }
    }

    fn format_text(&mut self, range: TextRange, attributes: &Attributes, source: ChangeSource) {
        let range = range.clamp_to(self.rope.len_chars());
        if range.is_caret() || attributes.is_empty() {
            return;
        }

        let before = self.formats[range.as_char_range()].to_vec();
        let after: Vec<Format> = before
            .iter()
            .map(|format| Format {
                bold: attributes.bold.unwrap_or(format.bold),
                background: attributes.background.or(format.background),
            })
            .collect();

        self.formats[range.as_char_range()].copy_from_slice(&after);
        self.push_undo(EditOperation::Format {
            position: range.index,
            before,
            after,
        });

        debug!("Formatted {} with {:?}", range, attributes);
        self.events.emit(SurfaceEvent::TextChanged {
            change: Change::Format {
                range,
                attributes: *attributes,
            },
            source,
        });
    }

    fn subscribe(&self) -> EventSubscription<SurfaceEvent> {
        self.events.subscribe()
    }

    fn undo(&mut self) -> bool {
        if let Some(op) = self.undo_stack.pop() {
            self.apply_operation(&op.inverse(), ChangeSource::User);
            self.redo_stack.push(op);
            true
        } else {
            false
        }
    }

    fn redo(&mut self) -> bool {
        if let Some(op) = self.redo_stack.pop() {
            self.apply_operation(&op, ChangeSource::User);
            self.undo_stack.push(op);
            true
        } else {
            false
        }
    }
}
