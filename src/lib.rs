//! Marginalia - annotation anchoring for rich-text documents
//!
//! Tracks text selections, applies inline formatting, and keeps comments
//! bound to the document ranges they were written on.
//!
//! ## Architecture
//!
//! - `marginalia-core`: errors, configuration, event bus and colors
//! - `marginalia-editor`: ranges, the document surface trait and its
//!   in-memory implementation, selection tracking, formatting, the comment
//!   store and the toolbar controller
//! - this crate: scripted session replay and the command-line entry point

#![warn(clippy::all)]

pub mod session;

// Re-export main components for library usage
pub use marginalia_core as core;
pub use marginalia_editor as editor;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "Marginalia";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::session::{Session, SessionReport, Step};
    pub use marginalia_core::{AppConfig, EngineError};
    pub use marginalia_editor::{
        Command, CommentStore, CommentUid, DocumentSurface, TextBuffer, TextRange, ToolbarController,
    };
}
