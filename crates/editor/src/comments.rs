//! Comment Store
//!
//! Owns the comments anchored to document ranges and the single draft slot.
//!
//! A comment moves through `Draft -> Confirmed -> (Edited -> Confirmed)*`
//! and ends either by explicit deletion or by [`CommentStore::reconcile`]
//! finding its anchored text blank. Uids of removed comments are retired and
//! never handed out again.
//!
//! Ranges are not re-anchored when text shifts elsewhere in the document;
//! reconcile only prunes comments whose text is gone.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use marginalia_core::config::HighlightConfig;
use marginalia_core::{EngineError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::format::highlight_for_comment;
use crate::range::TextRange;
use crate::surface::{ChangeSource, DocumentSurface};

/// Stable comment identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentUid(String);

impl CommentUid {
    /// Identity of a comment created on `text` at `index`
    pub fn derive(index: usize, text: &str, length: usize) -> Self {
        Self(format!("{}:{}:{}", index, length, text))
    }

    fn revision(&self, revision: u32) -> Self {
        Self(format!("{}#{}", self.0, revision))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommentUid {
    fn from(uid: &str) -> Self {
        Self(uid.to_string())
    }
}

/// A confirmed comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub uid: CommentUid,
    /// Text under the range when the comment was created
    pub anchor_text: String,
    pub range: TextRange,
    pub body: String,
}

/// Whether a draft creates a comment or edits one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftKind {
    New,
    Edit,
}

/// The comment being written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub uid: CommentUid,
    pub anchor_text: String,
    pub body: String,
    pub range: TextRange,
    pub kind: DraftKind,
}

/// Result of committing a draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Inserted(CommentUid),
    Updated(CommentUid),
    /// Blank body; nothing was stored
    Discarded,
}

/// Comments anchored to a document, in insertion order
#[derive(Debug, Clone)]
pub struct CommentStore {
    comments: IndexMap<CommentUid, Comment>,
    draft: Option<Draft>,
    retired: HashSet<CommentUid>,
    highlight: HighlightConfig,
}

impl CommentStore {
    pub fn new(highlight: HighlightConfig) -> Self {
        Self {
            comments: IndexMap::new(),
            draft: None,
            retired: HashSet::new(),
            highlight,
        }
    }

    /// Confirmed comments in insertion order
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.comments.values()
    }

    /// Owned copy of the confirmed comments
    pub fn snapshot(&self) -> Vec<Comment> {
        self.comments.values().cloned().collect()
    }

    pub fn get(&self, uid: &CommentUid) -> Option<&Comment> {
        self.comments.get(uid)
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Whether a uid belonged to a comment that has been removed
    pub fn is_retired(&self, uid: &CommentUid) -> bool {
        self.retired.contains(uid)
    }

    /// Open a draft on a fresh selection and mark the text
    pub fn begin_add<S: DocumentSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        range: TextRange,
        text: &str,
    ) -> Result<&Draft> {
        if range.is_caret() {
            return Err(EngineError::EmptySelection);
        }

        highlight_for_comment(range, &self.highlight).apply(surface, ChangeSource::Api);

        let uid = self.fresh_uid(CommentUid::derive(range.index, text, range.length));
        debug!("Opening comment draft {} on {}", uid, range);

        Ok(self.draft.insert(Draft {
            uid,
            anchor_text: text.to_string(),
            body: String::new(),
            range,
            kind: DraftKind::New,
        }))
    }

    /// Open a draft pre-filled from an existing comment
    pub fn begin_edit(&mut self, uid: &CommentUid) -> Result<&Draft> {
        let comment = self.comments.get(uid).ok_or_else(|| not_found(uid))?;

        debug!("Editing comment {}", uid);
        let draft = Draft {
            uid: comment.uid.clone(),
            anchor_text: comment.anchor_text.clone(),
            body: comment.body.clone(),
            range: comment.range,
            kind: DraftKind::Edit,
        };
        Ok(self.draft.insert(draft))
    }

    /// Replace the body of the open draft
    pub fn set_draft_body(&mut self, body: &str) -> Result<()> {
        let draft = self.draft.as_mut().ok_or(EngineError::NoDraft)?;
        draft.body = body.to_string();
        Ok(())
    }

    /// Confirm the open draft with `body`
    ///
    /// A blank body discards the draft. A draft whose uid is already stored
    /// updates that comment's body instead of adding a second one.
    pub fn commit(&mut self, body: &str) -> Result<CommitOutcome> {
        let draft = self.draft.take().ok_or(EngineError::NoDraft)?;

        if body.trim().is_empty() {
            debug!("Discarding blank draft {}", draft.uid);
            return Ok(CommitOutcome::Discarded);
        }

        if let Some(existing) = self.comments.get_mut(&draft.uid) {
            existing.body = body.to_string();
            debug!("Updated comment {}", draft.uid);
            return Ok(CommitOutcome::Updated(draft.uid));
        }

        let uid = draft.uid.clone();
        self.comments.insert(
            uid.clone(),
            Comment {
                uid: draft.uid,
                anchor_text: draft.anchor_text,
                range: draft.range,
                body: body.to_string(),
            },
        );
        info!("Added comment {}", uid);
        Ok(CommitOutcome::Inserted(uid))
    }

    /// Drop the open draft
    ///
    /// Any marker background applied by [`CommentStore::begin_add`] stays on
    /// the document.
    pub fn cancel(&mut self) -> Option<Draft> {
        let draft = self.draft.take();
        if let Some(draft) = &draft {
            debug!("Cancelled draft {}", draft.uid);
        }
        draft
    }

    /// Remove a comment; unknown uids are ignored
    pub fn delete(&mut self, uid: &CommentUid) -> bool {
        match self.comments.shift_remove(uid) {
            Some(comment) => {
                self.retire(comment.uid);
                info!("Deleted comment {}", uid);
                true
            }
            None => false,
        }
    }

    /// Point a comment at a different range
    pub fn relocate(&mut self, uid: &CommentUid, range: TextRange) -> Result<()> {
        let comment = self.comments.get_mut(uid).ok_or_else(|| not_found(uid))?;
        if range.is_caret() {
            return Err(EngineError::EmptySelection);
        }
        debug!("Relocating comment {} from {} to {}", uid, comment.range, range);
        comment.range = range;
        Ok(())
    }

    /// Remove every comment whose anchored text is now blank
    pub fn reconcile<S: DocumentSurface + ?Sized>(&mut self, surface: &S) -> Vec<CommentUid> {
        let blank: Vec<CommentUid> = self
            .comments
            .values()
            .filter(|comment| surface.text(comment.range).trim().is_empty())
            .map(|comment| comment.uid.clone())
            .collect();

        for uid in &blank {
            self.comments.shift_remove(uid);
            self.retire(uid.clone());
        }

        if !blank.is_empty() {
            info!("Reconcile pruned {} comment(s)", blank.len());
        }
        blank
    }

    /// Select a comment's range and refresh its marker
    pub fn select_and_highlight<S: DocumentSurface + ?Sized>(
        &self,
        surface: &mut S,
        uid: &CommentUid,
    ) -> Result<()> {
        let comment = self.comments.get(uid).ok_or_else(|| not_found(uid))?;

        surface.set_selection(comment.range, ChangeSource::Api);
        highlight_for_comment(comment.range, &self.highlight).apply(surface, ChangeSource::Api);
        Ok(())
    }

    /// Retire a uid and close any draft still bound to it
    fn retire(&mut self, uid: CommentUid) {
        if self.draft.as_ref().is_some_and(|draft| draft.uid == uid) {
            debug!("Closing draft of removed comment {}", uid);
            self.draft = None;
        }
        self.retired.insert(uid);
    }

    fn fresh_uid(&self, base: CommentUid) -> CommentUid {
        if !self.retired.contains(&base) {
            return base;
        }
        let mut revision = 2;
        loop {
            let candidate = base.revision(revision);
            if !self.retired.contains(&candidate) {
                return candidate;
            }
            revision += 1;
        }
    }
}

impl Default for CommentStore {
    fn default() -> Self {
        Self::new(HighlightConfig::default())
    }
}

fn not_found(uid: &CommentUid) -> EngineError {
    EngineError::NotFound(format!("Comment {}", uid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;
    use marginalia_core::Rgba;

    fn quick_fox() -> (TextBuffer, CommentStore) {
        (TextBuffer::from_str("The quick fox"), CommentStore::default())
    }

    fn add(store: &mut CommentStore, buffer: &mut TextBuffer, range: TextRange, body: &str) -> CommentUid {
        let text = buffer.text(range);
        store.begin_add(buffer, range, &text).unwrap();
        match store.commit(body).unwrap() {
            CommitOutcome::Inserted(uid) => uid,
            other => panic!("expected insert, got {:?}", other),
        }
    }

    #[test]
    fn test_begin_add_rejects_caret() {
        let (mut buffer, mut store) = quick_fox();
        add(&mut store, &mut buffer, TextRange::new(0, 3), "first");
        let before = store.snapshot();

        for index in [0, 4, 13] {
            let result = store.begin_add(&mut buffer, TextRange::caret(index), "");
            assert!(matches!(result, Err(EngineError::EmptySelection)));
        }
        assert_eq!(store.snapshot(), before);
        assert!(store.draft().is_none());
    }

    #[test]
    fn test_add_round_trip() {
        let (mut buffer, mut store) = quick_fox();
        let range = TextRange::new(4, 5);

        let draft = store.begin_add(&mut buffer, range, "hello").unwrap();
        assert_eq!(draft.body, "");
        assert_eq!(draft.kind, DraftKind::New);
        assert!(store.is_empty());

        let outcome = store.commit("note").unwrap();
        assert!(matches!(outcome, CommitOutcome::Inserted(_)));

        let comments = store.snapshot();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].anchor_text, "hello");
        assert_eq!(comments[0].body, "note");
        assert_eq!(comments[0].range, range);
        assert!(store.draft().is_none());
    }

    #[test]
    fn test_uid_is_deterministic() {
        assert_eq!(CommentUid::derive(4, "quick", 5), CommentUid::from("4:5:quick"));
        assert_ne!(CommentUid::derive(1, "2x", 3), CommentUid::derive(12, "x", 3));
    }

    #[test]
    fn test_begin_add_highlights() {
        let (mut buffer, mut store) = quick_fox();
        store.begin_add(&mut buffer, TextRange::new(4, 5), "quick").unwrap();

        assert_eq!(
            buffer.format_at(TextRange::new(4, 5)).background,
            Some(Rgba::new(255.0, 255.0, 0.0, 0.4))
        );
    }

    #[test]
    fn test_edit_commit_is_idempotent() {
        let (mut buffer, mut store) = quick_fox();
        let uid = add(&mut store, &mut buffer, TextRange::new(4, 5), "note");

        for _ in 0..2 {
            let draft = store.begin_edit(&uid).unwrap();
            assert_eq!(draft.body, "note");
            assert_eq!(draft.kind, DraftKind::Edit);
            assert_eq!(store.commit("note").unwrap(), CommitOutcome::Updated(uid.clone()));
        }

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&uid).unwrap().body, "note");
    }

    #[test]
    fn test_edit_changes_body() {
        let (mut buffer, mut store) = quick_fox();
        let uid = add(&mut store, &mut buffer, TextRange::new(4, 5), "note");

        store.begin_edit(&uid).unwrap();
        store.set_draft_body("typing...").unwrap();
        assert_eq!(store.draft().unwrap().body, "typing...");
        store.commit("revised").unwrap();

        assert_eq!(store.get(&uid).unwrap().body, "revised");
        assert_eq!(store.get(&uid).unwrap().anchor_text, "quick");
    }

    #[test]
    fn test_re_adding_same_selection_merges() {
        let (mut buffer, mut store) = quick_fox();
        let uid = add(&mut store, &mut buffer, TextRange::new(4, 5), "note");

        store.begin_add(&mut buffer, TextRange::new(4, 5), "quick").unwrap();
        assert_eq!(store.commit("merged").unwrap(), CommitOutcome::Updated(uid.clone()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&uid).unwrap().body, "merged");
    }

    #[test]
    fn test_begin_edit_unknown() {
        let mut store = CommentStore::default();
        assert!(matches!(
            store.begin_edit(&CommentUid::from("nope")),
            Err(EngineError::NotFound(_))
        ));
        assert!(store.draft().is_none());
    }

    #[test]
    fn test_blank_commit_discards() {
        let (mut buffer, mut store) = quick_fox();
        store.begin_add(&mut buffer, TextRange::new(4, 5), "quick").unwrap();

        assert_eq!(store.commit("   \n").unwrap(), CommitOutcome::Discarded);
        assert!(store.is_empty());
        assert!(store.draft().is_none());
        assert!(matches!(store.commit("late"), Err(EngineError::NoDraft)));
        assert!(matches!(store.set_draft_body("late"), Err(EngineError::NoDraft)));
    }

    #[test]
    fn test_blank_edit_keeps_comment() {
        let (mut buffer, mut store) = quick_fox();
        let uid = add(&mut store, &mut buffer, TextRange::new(4, 5), "note");

        store.begin_edit(&uid).unwrap();
        assert_eq!(store.commit("").unwrap(), CommitOutcome::Discarded);
        assert_eq!(store.get(&uid).unwrap().body, "note");
    }

    #[test]
    fn test_cancel_keeps_highlight() {
        let (mut buffer, mut store) = quick_fox();
        store.begin_add(&mut buffer, TextRange::new(4, 5), "quick").unwrap();

        assert!(store.cancel().is_some());
        assert!(store.cancel().is_none());
        assert!(store.is_empty());
        assert!(buffer.format_at(TextRange::new(4, 5)).background.is_some());
    }

    #[test]
    fn test_new_draft_replaces_open_one() {
        let (mut buffer, mut store) = quick_fox();
        let uid = add(&mut store, &mut buffer, TextRange::new(0, 3), "note");

        store.begin_add(&mut buffer, TextRange::new(4, 5), "quick").unwrap();
        store.begin_edit(&uid).unwrap();
        assert_eq!(store.draft().unwrap().uid, uid);

        store.commit("edited").unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete() {
        let (mut buffer, mut store) = quick_fox();
        let first = add(&mut store, &mut buffer, TextRange::new(0, 3), "one");
        let second = add(&mut store, &mut buffer, TextRange::new(4, 5), "two");

        assert!(!store.delete(&CommentUid::from("missing")));
        assert_eq!(store.len(), 2);

        assert!(store.delete(&first));
        assert_eq!(store.len(), 1);
        assert!(store.get(&first).is_none());
        assert!(store.is_retired(&first));
        assert!(!store.delete(&first));

        let remaining: Vec<&CommentUid> = store.comments().map(|c| &c.uid).collect();
        assert_eq!(remaining, vec![&second]);
    }

    #[test]
    fn test_deleted_uid_is_not_reused() {
        let (mut buffer, mut store) = quick_fox();
        let uid = add(&mut store, &mut buffer, TextRange::new(4, 5), "one");
        store.delete(&uid);

        let again = add(&mut store, &mut buffer, TextRange::new(4, 5), "two");
        assert_ne!(again, uid);
        assert_eq!(again, CommentUid::from("4:5:quick#2"));
        assert!(store.get(&uid).is_none());
    }

    #[test]
    fn test_delete_closes_edit_draft() {
        let (mut buffer, mut store) = quick_fox();
        let uid = add(&mut store, &mut buffer, TextRange::new(4, 5), "one");

        store.begin_edit(&uid).unwrap();
        store.delete(&uid);
        assert!(store.draft().is_none());
        assert!(matches!(store.commit("resurrect"), Err(EngineError::NoDraft)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_insertion_order() {
        let (mut buffer, mut store) = quick_fox();
        add(&mut store, &mut buffer, TextRange::new(10, 3), "c");
        add(&mut store, &mut buffer, TextRange::new(0, 3), "a");
        add(&mut store, &mut buffer, TextRange::new(4, 5), "b");

        let bodies: Vec<&str> = store.comments().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_reconcile_prunes_blank_text() {
        let (mut buffer, mut store) = quick_fox();
        let quick = add(&mut store, &mut buffer, TextRange::new(4, 5), "check this");

        buffer.replace(TextRange::new(4, 5), "     ", ChangeSource::User);
        let removed = store.reconcile(&buffer);

        assert_eq!(removed, vec![quick.clone()]);
        assert!(store.is_empty());
        assert!(store.is_retired(&quick));
    }

    #[test]
    fn test_reconcile_keeps_changed_text() {
        let (mut buffer, mut store) = quick_fox();
        let uid = add(&mut store, &mut buffer, TextRange::new(4, 5), "check this");

        buffer.replace(TextRange::new(4, 5), "slow!", ChangeSource::User);
        assert!(store.reconcile(&buffer).is_empty());
        assert_eq!(store.get(&uid).unwrap().anchor_text, "quick");
    }

    #[test]
    fn test_reconcile_does_not_reanchor() {
        let (mut buffer, mut store) = quick_fox();
        let uid = add(&mut store, &mut buffer, TextRange::new(4, 5), "check this");

        // " fox" slides under the stored range, so the comment survives
        buffer.delete(TextRange::new(4, 5), ChangeSource::User);
        assert!(store.reconcile(&buffer).is_empty());
        assert_eq!(store.get(&uid).unwrap().range, TextRange::new(4, 5));
        assert_eq!(buffer.text(TextRange::new(4, 5)), " fox");
    }

    #[test]
    fn test_reconcile_closes_draft_of_pruned_comment() {
        let (mut buffer, mut store) = quick_fox();
        let uid = add(&mut store, &mut buffer, TextRange::new(10, 3), "tail");

        store.begin_edit(&uid).unwrap();
        buffer.delete(TextRange::new(9, 4), ChangeSource::User);
        store.reconcile(&buffer);

        assert!(store.draft().is_none());
    }

    #[test]
    fn test_select_and_highlight() {
        let (mut buffer, mut store) = quick_fox();
        let uid = add(&mut store, &mut buffer, TextRange::new(4, 5), "note");
        buffer.undo();
        assert!(buffer.format_at(TextRange::new(4, 5)).background.is_none());

        store.select_and_highlight(&mut buffer, &uid).unwrap();
        store.select_and_highlight(&mut buffer, &uid).unwrap();
        assert_eq!(buffer.selection(), Some(TextRange::new(4, 5)));
        assert!(buffer.format_at(TextRange::new(4, 5)).background.is_some());

        assert!(matches!(
            store.select_and_highlight(&mut buffer, &CommentUid::from("gone")),
            Err(EngineError::NotFound(_))
        ));
    }

    #[test]
    fn test_relocate() {
        let (mut buffer, mut store) = quick_fox();
        let uid = add(&mut store, &mut buffer, TextRange::new(4, 5), "note");

        assert!(matches!(
            store.relocate(&uid, TextRange::caret(2)),
            Err(EngineError::EmptySelection)
        ));
        assert_eq!(store.get(&uid).unwrap().range, TextRange::new(4, 5));

        store.relocate(&uid, TextRange::new(10, 3)).unwrap();
        assert_eq!(store.get(&uid).unwrap().range, TextRange::new(10, 3));
        assert_eq!(store.get(&uid).unwrap().uid, uid);
    }
}
