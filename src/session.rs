//! Scripted sessions
//!
//! Replays a TOML description of user activity against an in-memory
//! document and reports the resulting comment state.
//!
//! ```toml
//! text = "The quick fox"
//!
//! [[steps]]
//! select = { index = 4, length = 5 }
//!
//! [[steps]]
//! command = "add_comment"
//!
//! [[steps]]
//! command = { commit_comment = "check this" }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use marginalia_core::{AppConfig, EngineError};
use marginalia_editor::{
    ChangeSource, Command, Comment, DocumentSurface, Draft, SelectionState, TextBuffer, TextRange,
    ToolbarController,
};

/// One thing the user does
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Select a range (a zero length collapses the selection)
    Select(TextRange),
    /// Select the first occurrence of some text
    SelectText(String),
    Insert { at: usize, text: String },
    Delete(TextRange),
    Command(Command),
}

/// A document and the steps to replay on it
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub text: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A step the engine refused
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepFailure {
    pub step: usize,
    pub error: String,
}

/// State after a session has been replayed
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub text: String,
    pub selection: SelectionState,
    pub comments: Vec<Comment>,
    pub draft: Option<Draft>,
    pub failures: Vec<StepFailure>,
}

impl Session {
    pub fn from_toml_str(contents: &str) -> marginalia_core::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a session file
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read session {:?}", path))?;
        Self::from_toml_str(&contents).with_context(|| format!("Invalid session {:?}", path))
    }

    /// Replay every step; refused steps are recorded and skipped
    pub fn run(&self, config: &AppConfig) -> SessionReport {
        let buffer = TextBuffer::with_config(&self.text, config);
        let mut controller = ToolbarController::new(buffer, config);
        let mut failures = Vec::new();

        info!("Replaying {} step(s)", self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            debug!("Step {}: {:?}", index, step);
            if let Err(err) = apply_step(&mut controller, step) {
                warn!("Step {} failed: {}", index, err);
                failures.push(StepFailure {
                    step: index,
                    error: err.to_string(),
                });
            }
        }

        SessionReport {
            text: controller.surface().contents(),
            selection: controller.selection().clone(),
            comments: controller.comments(),
            draft: controller.store().draft().cloned(),
            failures,
        }
    }
}

fn apply_step(controller: &mut ToolbarController<TextBuffer>, step: &Step) -> marginalia_core::Result<()> {
    match step {
        Step::Select(range) => {
            controller
                .surface_mut()
                .set_selection(*range, ChangeSource::User);
        }
        Step::SelectText(query) => {
            let range = controller
                .surface()
                .find(query)
                .into_iter()
                .next()
                .ok_or_else(|| EngineError::NotFound(format!("Text {:?}", query)))?;
            controller
                .surface_mut()
                .set_selection(range, ChangeSource::User);
        }
        Step::Insert { at, text } => {
            controller
                .surface_mut()
                .insert(*at, text, ChangeSource::User);
        }
        Step::Delete(range) => {
            controller
                .surface_mut()
                .delete(*range, ChangeSource::User);
        }
        Step::Command(command) => {
            if let Some(message) = controller.execute(command.clone())?.message() {
                debug!("{}", message);
            }
        }
    }
    controller.process_events();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginalia_editor::CommentUid;

    const QUICK_FOX: &str = r#"
        text = "The quick fox"

        [[steps]]
        select = { index = 4, length = 5 }

        [[steps]]
        command = "add_comment"

        [[steps]]
        command = { commit_comment = "check this" }
    "#;

    #[test]
    fn test_parse_steps() {
        let session = Session::from_toml_str(QUICK_FOX).unwrap();
        assert_eq!(session.text, "The quick fox");
        assert_eq!(session.steps.len(), 3);
        assert_eq!(session.steps[0], Step::Select(TextRange::new(4, 5)));
        assert_eq!(session.steps[1], Step::Command(Command::AddComment));
    }

    #[test]
    fn test_quick_fox_session() {
        let session = Session::from_toml_str(QUICK_FOX).unwrap();
        let report = session.run(&AppConfig::default());

        assert!(report.failures.is_empty());
        assert_eq!(report.comments.len(), 1);
        assert_eq!(report.comments[0].uid, CommentUid::from("4:5:quick"));
        assert_eq!(report.comments[0].anchor_text, "quick");
        assert_eq!(report.comments[0].body, "check this");
        assert_eq!(report.comments[0].range, TextRange::new(4, 5));
    }

    #[test]
    fn test_deleting_anchor_prunes_comment() {
        let mut session = Session::from_toml_str(QUICK_FOX).unwrap();
        session.steps.push(Step::Delete(TextRange::new(4, 9)));
        let report = session.run(&AppConfig::default());

        assert_eq!(report.text, "The ");
        assert!(report.comments.is_empty());
        assert!(!report.selection.visible);
    }

    #[test]
    fn test_failures_are_recorded() {
        let session = Session::from_toml_str(
            r#"
            text = "The quick fox"

            [[steps]]
            command = "add_comment"

            [[steps]]
            select_text = "fox"

            [[steps]]
            command = { set_rate = 101 }

            [[steps]]
            command = { set_rate = 100 }

            [[steps]]
            select_text = "wolf"
            "#,
        )
        .unwrap();
        let report = session.run(&AppConfig::default());

        let failed: Vec<usize> = report.failures.iter().map(|f| f.step).collect();
        assert_eq!(failed, vec![0, 2, 4]);
        assert_eq!(report.selection.text, "fox");
        assert!(report.comments.is_empty());
    }

    #[test]
    fn test_report_serializes() {
        let session = Session::from_toml_str(QUICK_FOX).unwrap();
        let report = session.run(&AppConfig::default());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["comments"][0]["body"], "check this");
        assert_eq!(json["comments"][0]["range"]["index"], 4);
        assert_eq!(json["selection"]["visible"], true);
    }
}
