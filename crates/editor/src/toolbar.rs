//! Toolbar Controller
//!
//! Owns a document surface together with the selection tracker and the
//! comment store, and maps toolbar commands onto them. Surface
//! notifications are drained in delivery order: selection changes feed the
//! tracker, text changes trigger a reconcile pass.

use marginalia_core::config::{AppConfig, HighlightConfig};
use marginalia_core::{EngineError, EventBus, EventSubscription, Result};
use tracing::{debug, warn};

use crate::commands::{Command, CommandOutcome};
use crate::comments::{Comment, CommentStore, Draft};
use crate::format::{rate_command, toggle_bold};
use crate::selection::{SelectionState, SelectionTracker};
use crate::surface::{ChangeSource, DocumentSurface, SurfaceEvent};

/// What the UI should re-render
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    SelectionChanged(SelectionState),
    CommentsChanged(Vec<Comment>),
    DraftChanged(Option<Draft>),
    RatePanelToggled(bool),
}

/// Orchestrates selection tracking, formatting and comments over a surface
pub struct ToolbarController<S: DocumentSurface> {
    surface: S,
    surface_events: EventSubscription<SurfaceEvent>,
    tracker: SelectionTracker,
    store: CommentStore,
    highlight: HighlightConfig,
    rate_panel_open: bool,
    engine_events: EventBus<EngineEvent>,
}

impl<S: DocumentSurface> ToolbarController<S> {
    pub fn new(surface: S, config: &AppConfig) -> Self {
        let surface_events = surface.subscribe();
        let mut tracker = SelectionTracker::new(&config.toolbar);
        tracker.refresh(&surface);

        Self {
            surface,
            surface_events,
            tracker,
            store: CommentStore::new(config.highlight.clone()),
            highlight: config.highlight.clone(),
            rate_panel_open: false,
            engine_events: EventBus::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for host edits; call [`ToolbarController::process_events`] afterwards
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn selection(&self) -> &SelectionState {
        self.tracker.state()
    }

    pub fn store(&self) -> &CommentStore {
        &self.store
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.store.snapshot()
    }

    pub fn rate_panel_open(&self) -> bool {
        self.rate_panel_open
    }

    /// Register for re-render notifications
    pub fn subscribe(&self) -> EventSubscription<EngineEvent> {
        self.engine_events.subscribe()
    }

    pub fn set_scroll_left(&mut self, scroll_left: f64) {
        self.tracker.set_scroll_left(scroll_left);
    }

    /// Handle every pending surface notification, one at a time
    pub fn process_events(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.surface_events.try_recv() {
            processed += 1;
            match event {
                SurfaceEvent::SelectionChanged { range, .. } => {
                    self.tracker.handle(&self.surface, range);
                    self.publish_selection();
                }
                SurfaceEvent::TextChanged { .. } => {
                    let had_draft = self.store.draft().is_some();
                    let removed = self.store.reconcile(&self.surface);
                    if !removed.is_empty() {
                        self.publish_comments();
                        if had_draft && self.store.draft().is_none() {
                            self.publish_draft();
                        }
                    }
                }
            }
        }
        processed
    }

    /// Run a toolbar command
    pub fn execute(&mut self, command: Command) -> Result<CommandOutcome> {
        self.process_events();
        debug!("Executing {:?}", command);

        let refresh = command.affects_selection();
        let result = self.dispatch(command);
        self.process_events();

        if refresh && result.is_ok() {
            self.tracker.refresh(&self.surface);
            self.publish_selection();
        }
        if let Err(err) = &result {
            warn!("Command rejected: {}", err);
        }
        result
    }

    fn dispatch(&mut self, command: Command) -> Result<CommandOutcome> {
        match command {
            Command::Undo => Ok(history_outcome(self.surface.undo())),
            Command::Redo => Ok(history_outcome(self.surface.redo())),

            Command::ToggleBold => {
                toggle_bold(&self.surface, self.tracker.active_range())?
                    .apply(&mut self.surface, ChangeSource::User);
                Ok(CommandOutcome::Done)
            }

            Command::ToggleRatePanel => {
                self.rate_panel_open = !self.rate_panel_open;
                self.engine_events
                    .emit(EngineEvent::RatePanelToggled(self.rate_panel_open));
                Ok(CommandOutcome::RatePanel(self.rate_panel_open))
            }

            Command::SetRate(rate) => {
                rate_command(rate, self.tracker.active_range(), &self.highlight)?
                    .apply(&mut self.surface, ChangeSource::User);
                Ok(CommandOutcome::Done)
            }

            Command::AddComment => {
                let range = self
                    .surface
                    .selection()
                    .ok_or(EngineError::EmptySelection)?;
                let text = self.surface.text(range);
                self.store.begin_add(&mut self.surface, range, &text)?;
                self.publish_draft();
                Ok(CommandOutcome::Done)
            }

            Command::EditComment(uid) => {
                self.store.begin_edit(&uid)?;
                self.publish_draft();
                Ok(CommandOutcome::Done)
            }

            Command::SetDraftBody(body) => {
                self.store.set_draft_body(&body)?;
                self.publish_draft();
                Ok(CommandOutcome::Done)
            }

            Command::CommitComment(body) => {
                let outcome = self.store.commit(&body)?;
                self.publish_draft();
                self.publish_comments();
                Ok(CommandOutcome::Committed(outcome))
            }

            Command::CancelComment => {
                if self.store.cancel().is_some() {
                    self.publish_draft();
                }
                Ok(CommandOutcome::Done)
            }

            Command::DeleteComment(uid) => {
                let had_draft = self.store.draft().is_some();
                let deleted = self.store.delete(&uid);
                if deleted {
                    self.publish_comments();
                    if had_draft && self.store.draft().is_none() {
                        self.publish_draft();
                    }
                }
                Ok(CommandOutcome::Deleted(deleted))
            }

            Command::SelectComment(uid) => {
                self.store.select_and_highlight(&mut self.surface, &uid)?;
                Ok(CommandOutcome::Done)
            }
        }
    }

    fn publish_selection(&self) {
        self.engine_events
            .emit(EngineEvent::SelectionChanged(self.tracker.state().clone()));
    }

    fn publish_comments(&self) {
        self.engine_events
            .emit(EngineEvent::CommentsChanged(self.store.snapshot()));
    }

    fn publish_draft(&self) {
        self.engine_events
            .emit(EngineEvent::DraftChanged(self.store.draft().cloned()));
    }
}

fn history_outcome(replayed: bool) -> CommandOutcome {
    if replayed {
        CommandOutcome::Done
    } else {
        CommandOutcome::HistoryEmpty
    }
}
