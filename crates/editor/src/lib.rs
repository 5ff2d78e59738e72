//! Marginalia Editor
//!
//! Annotation anchoring over a rich-text document:
//! - Selection tracking for the floating toolbar
//! - Bold and heat-map background formatting
//! - Comments anchored to text ranges, pruned when their text disappears
//! - A rope-based in-memory document surface

pub mod buffer;
pub mod commands;
pub mod comments;
pub mod format;
pub mod range;
pub mod selection;
pub mod surface;
pub mod toolbar;

pub use buffer::TextBuffer;
pub use commands::{Command, CommandOutcome};
pub use comments::{Comment, CommentStore, CommentUid, CommitOutcome, Draft, DraftKind};
pub use format::FormatCommand;
pub use range::TextRange;
pub use selection::{SelectionState, SelectionTracker};
pub use surface::{Attributes, ChangeSource, DocumentSurface, Format, SurfaceEvent};
pub use toolbar::{EngineEvent, ToolbarController};
