//! Toolbar Commands
//!
//! The closed set of UI intents the toolbar controller understands.

use serde::{Deserialize, Serialize};

use crate::comments::{CommentUid, CommitOutcome};

/// Toolbar command type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    // History, forwarded to the document surface
    Undo,
    Redo,

    // Inline formatting of the current selection
    ToggleBold,
    ToggleRatePanel,
    SetRate(i32),

    // Comment drafts
    AddComment,
    EditComment(CommentUid),
    SetDraftBody(String),
    CommitComment(String),
    CancelComment,

    // Committed comments
    DeleteComment(CommentUid),
    SelectComment(CommentUid),
}

impl Command {
    /// Whether the command can change the bold state or visibility of the selection
    pub fn affects_selection(&self) -> bool {
        matches!(
            self,
            Command::Undo | Command::Redo | Command::ToggleBold | Command::SelectComment(_)
        )
    }
}

/// Command execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Done,
    /// Undo or redo found nothing to replay
    HistoryEmpty,
    Committed(CommitOutcome),
    /// Whether a comment was actually removed
    Deleted(bool),
    /// New state of the rate panel
    RatePanel(bool),
}

impl CommandOutcome {
    pub fn message(&self) -> Option<String> {
        match self {
            CommandOutcome::Done => None,
            CommandOutcome::HistoryEmpty => Some("Nothing to replay".to_string()),
            CommandOutcome::Committed(CommitOutcome::Inserted(uid)) => Some(format!("Added comment {}", uid)),
            CommandOutcome::Committed(CommitOutcome::Updated(uid)) => Some(format!("Updated comment {}", uid)),
            CommandOutcome::Committed(CommitOutcome::Discarded) => Some("Discarded empty comment".to_string()),
            CommandOutcome::Deleted(true) => Some("Comment deleted".to_string()),
            CommandOutcome::Deleted(false) => None,
            CommandOutcome::RatePanel(open) => Some(format!("Rate panel {}", if *open { "open" } else { "closed" })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Step {
        command: Command,
    }

    #[test]
    fn test_commands_deserialize_from_toml() {
        let step: Step = toml::from_str(r#"command = "add_comment""#).unwrap();
        assert_eq!(step.command, Command::AddComment);

        let step: Step = toml::from_str(r#"command = { set_rate = 40 }"#).unwrap();
        assert_eq!(step.command, Command::SetRate(40));

        let step: Step = toml::from_str(r#"command = { delete_comment = "4:5:quick" }"#).unwrap();
        assert_eq!(step.command, Command::DeleteComment(CommentUid::from("4:5:quick")));
    }

    #[test]
    fn test_affects_selection() {
        assert!(Command::ToggleBold.affects_selection());
        assert!(!Command::SetRate(3).affects_selection());
    }

    #[test]
    fn test_message() {
        assert_eq!(CommandOutcome::Done.message(), None);
        assert_eq!(
            CommandOutcome::Committed(CommitOutcome::Inserted(CommentUid::from("0:3:The"))).message(),
            Some("Added comment 0:3:The".to_string())
        );
    }
}
