//! Formatting Operations
//!
//! Pure computations of the inline format commands the toolbar issues:
//! bold toggling, the rate heat gradient and the comment marker.

use marginalia_core::config::HighlightConfig;
use marginalia_core::{EngineError, Result, Rgba};

use crate::range::TextRange;
use crate::surface::{Attributes, ChangeSource, DocumentSurface};

/// Lowest accepted rate
pub const MIN_RATE: i32 = 0;
/// Highest accepted rate
pub const MAX_RATE: i32 = 100;

/// A single formatting write against a range
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormatCommand {
    Bold { range: TextRange, value: bool },
    Background { range: TextRange, color: Rgba },
}

impl FormatCommand {
    pub fn range(&self) -> TextRange {
        match self {
            FormatCommand::Bold { range, .. } | FormatCommand::Background { range, .. } => *range,
        }
    }

    pub fn attributes(&self) -> Attributes {
        match self {
            FormatCommand::Bold { value, .. } => Attributes::bold(*value),
            FormatCommand::Background { color, .. } => Attributes::background(*color),
        }
    }

    /// Issue the command as one `format_text` call
    pub fn apply<S: DocumentSurface + ?Sized>(&self, surface: &mut S, source: ChangeSource) {
        surface.format_text(self.range(), &self.attributes(), source);
    }
}

/// Compute the command that flips the bold state of the current selection
pub fn toggle_bold<S: DocumentSurface + ?Sized>(surface: &S, current: Option<TextRange>) -> Result<FormatCommand> {
    let range = active_range(current)?;
    let bold = surface.format_at(range).bold;
    Ok(FormatCommand::Bold { range, value: !bold })
}

/// Map a 0-100 rate onto a red to green heat color
pub fn rate_to_background(rate: i32, alpha: f64) -> Result<Rgba> {
    if !(MIN_RATE..=MAX_RATE).contains(&rate) {
        return Err(EngineError::InvalidInput(format!(
            "rate must be within {}..={}, got {}",
            MIN_RATE, MAX_RATE, rate
        )));
    }
    let green = f64::from(rate) * 255.0 / 100.0;
    Ok(Rgba::new(255.0 - green, green, 0.0, alpha))
}

/// Heat background over the selection captured when the rate changed
pub fn rate_command(rate: i32, current: Option<TextRange>, config: &HighlightConfig) -> Result<FormatCommand> {
    let color = rate_to_background(rate, config.heat_alpha)?;
    let range = active_range(current)?;
    Ok(FormatCommand::Background { range, color })
}

/// Marker background for commented text
pub fn highlight_for_comment(range: TextRange, config: &HighlightConfig) -> FormatCommand {
    FormatCommand::Background {
        range,
        color: config.comment_color,
    }
}

fn active_range(current: Option<TextRange>) -> Result<TextRange> {
    current
        .filter(|range| !range.is_caret())
        .ok_or(EngineError::NoActiveSelection)
}
