//! Marginalia Core - Shared types
//!
//! This crate provides the pieces every Marginalia component leans on:
//! the error type, engine configuration, the ordered event bus and colors.

pub mod color;
pub mod config;
pub mod error;
pub mod events;

pub use color::Rgba;
pub use config::AppConfig;
pub use error::{EngineError, Result};
pub use events::{EventBus, EventSubscription};

/// Marginalia version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "Marginalia";
