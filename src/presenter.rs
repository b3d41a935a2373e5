//! The presenter: named user intents dispatched onto the store.
//!
//! Each handler validates its precondition, applies at most one store
//! mutation, then signals the subscribed renderer. Out-of-range input is
//! a no-op, never an error. The presenter also owns the one in-flight
//! save and the section cursor; everything else lives in the store.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::model::{
    GapDraft, Resource, ResourceGap, SkillLevel, SummaryMetrics, ValidationOutcome,
};
use crate::notify::{NotificationSink, Notice};
use crate::persist::{PersistenceBackend, SaveHandle, SaveOutcome};
use crate::store::{AlignmentStore, ResourceFilter};

/// Section titles, in navigation order.
pub const SECTION_TITLES: &[&str] = &["Overview", "Alignment", "Gaps"];

/// Called after every state change so the renderer knows to redraw.
pub type RenderSignal = Box<dyn FnMut()>;

/// What an edit-toggle request resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditToggle {
    Entered,
    Exited,
    /// The session is dirty; the surface must run a confirmation step and
    /// complete via [`Presenter::confirm_discard`].
    ConfirmationRequired,
    /// A save is in flight; editing is disabled until it resolves.
    Ignored,
}

/// What a save request resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStart {
    Started,
    /// Errors were recorded for inline display. No notification: inline
    /// errors are not duplicated as toasts.
    ValidationFailed,
    /// At most one save runs at a time.
    AlreadySaving,
}

/// Everything a renderer needs, recomputed fresh on every call. The data
/// volume is tens of records; nothing here is cached.
#[derive(Debug)]
pub struct ViewState {
    pub section: usize,
    pub section_count: usize,
    pub progress_percent: u8,
    pub edit_mode: bool,
    pub dirty: bool,
    pub saving: bool,
    pub filter: ResourceFilter,
    pub resources: Vec<Resource>,
    pub active: Vec<Resource>,
    pub terminated: Vec<Resource>,
    pub unique_lobs: Vec<String>,
    pub gaps: Vec<ResourceGap>,
    pub metrics: SummaryMetrics,
    pub validation_errors: BTreeMap<String, String>,
}

pub struct Presenter {
    store: AlignmentStore,
    backend: Arc<dyn PersistenceBackend>,
    operator: String,
    save_timeout: Duration,
    section: usize,
    in_flight: Option<SaveHandle>,
    subscriber: Option<RenderSignal>,
}

impl Presenter {
    pub fn new(
        store: AlignmentStore,
        backend: Arc<dyn PersistenceBackend>,
        operator: impl Into<String>,
        save_timeout: Duration,
    ) -> Self {
        Self {
            store,
            backend,
            operator: operator.into(),
            save_timeout,
            section: 0,
            in_flight: None,
            subscriber: None,
        }
    }

    // ── Subscription ──

    /// Registers the single render subscriber. A renderer registers on
    /// mount and unregisters on teardown; with no subscriber, handlers
    /// still complete, they just signal nobody.
    pub fn subscribe(&mut self, signal: RenderSignal) {
        self.subscriber = Some(signal);
    }

    pub fn unsubscribe(&mut self) {
        self.subscriber = None;
    }

    fn signal(&mut self) {
        if let Some(signal) = &mut self.subscriber {
            signal();
        }
    }

    // ── Navigation ──

    pub fn section(&self) -> usize {
        self.section
    }

    /// Advances one section; at the last section this is a no-op.
    pub fn next_section(&mut self) {
        if self.section + 1 < SECTION_TITLES.len() {
            self.section += 1;
        }
        self.signal();
    }

    /// Backs up one section; at the first section this is a no-op.
    pub fn previous_section(&mut self) {
        if self.section > 0 {
            self.section -= 1;
        }
        self.signal();
    }

    /// Free jump to any section. Out-of-range indexes are ignored.
    pub fn go_to_section(&mut self, index: usize) {
        if index < SECTION_TITLES.len() {
            self.section = index;
        }
        self.signal();
    }

    // ── Edit session ──

    pub fn edit_toggle(&mut self) -> EditToggle {
        if self.is_saving() {
            return EditToggle::Ignored;
        }
        if self.store.is_edit_mode() && self.store.has_unsaved_changes() {
            // Discarding real edits needs an explicit yes first.
            return EditToggle::ConfirmationRequired;
        }

        let entering = !self.store.is_edit_mode();
        self.store.set_edit_mode(entering);
        self.signal();
        if entering {
            EditToggle::Entered
        } else {
            EditToggle::Exited
        }
    }

    /// Completes the confirmation step started by a dirty edit-toggle.
    /// Declining leaves every flag and field value untouched.
    pub fn confirm_discard(&mut self, confirmed: bool) {
        if confirmed {
            self.store.set_edit_mode(false);
        }
        self.signal();
    }

    // ── Save ──

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Starts the asynchronous save. Validation runs first; on failure
    /// the errors are recorded for inline display and nothing is shipped.
    /// On success a snapshot goes to the backend on a worker thread and
    /// the commit waits for [`Self::poll_save`].
    pub fn save(&mut self) -> SaveStart {
        if self.is_saving() {
            return SaveStart::AlreadySaving;
        }
        if !self.store.validate_all().is_valid() {
            // Records the errors and leaves the session open.
            let _ = self.store.save_changes();
            self.signal();
            return SaveStart::ValidationFailed;
        }

        let snapshot = self.store.snapshot(&self.operator);
        self.in_flight = Some(SaveHandle::spawn(
            Arc::clone(&self.backend),
            snapshot,
            self.save_timeout,
        ));
        self.signal();
        SaveStart::Started
    }

    /// Checks the in-flight save. On success the store commits (metrics
    /// recompute, edit mode ends). On failure or timeout the session
    /// stays open with every edit intact and a retryable notice goes to
    /// the sink.
    pub fn poll_save(&mut self, notices: &mut dyn NotificationSink) -> Option<SaveOutcome> {
        let outcome = self.in_flight.as_mut()?.try_outcome()?;
        self.in_flight = None;

        match &outcome {
            SaveOutcome::Success => {
                self.store.save_changes();
                notices.notify(Notice::success("Resource alignment saved"));
            }
            SaveOutcome::Failure(reason) => {
                notices.notify(Notice::error(format!(
                    "Save failed: {reason}. Your edits are kept; retry when ready."
                )));
            }
        }
        self.signal();
        Some(outcome)
    }

    /// Abandons the in-flight save, if any. The session stays open.
    pub fn cancel_save(&mut self, notices: &mut dyn NotificationSink) {
        if let Some(handle) = self.in_flight.take() {
            handle.cancel();
            notices.notify(Notice::info("Save cancelled. Your edits are kept."));
            self.signal();
        }
    }

    // ── Filters ──

    pub fn search_changed(&mut self, query: &str) {
        self.store.set_search(query);
        self.signal();
    }

    pub fn skill_filter_changed(&mut self, skill_level: Option<SkillLevel>) {
        self.store.set_skill_filter(skill_level);
        self.signal();
    }

    pub fn lob_filter_changed(&mut self, lob: Option<String>) {
        self.store.set_lob_filter(lob);
        self.signal();
    }

    // ── Record edits ──

    /// Applies the operator's literal input, then validates it and
    /// merges or clears the field error. Mutate first so the input never
    /// appears to reject a keystroke; invalidity shows up as an inline
    /// message next to the still-displayed value.
    pub fn allocation_changed(&mut self, id: &str, allocation: i32) {
        if self.is_saving() {
            return;
        }
        self.store.update_allocation(id, allocation);
        let outcome = self.store.validate_allocation(id, allocation);
        self.store.apply_allocation_validation(id, &outcome);
        self.signal();
    }

    pub fn termination_toggled(&mut self, id: &str) {
        if self.is_saving() {
            return;
        }
        self.store.toggle_termination(id);
        self.signal();
    }

    pub fn gap_added(&mut self, draft: &GapDraft) -> ValidationOutcome {
        if self.is_saving() {
            return ValidationOutcome::default();
        }
        let outcome = self.store.add_gap(draft);
        self.signal();
        outcome
    }

    /// Rolls every mutation back to the directory seed. Full-cancel:
    /// unlike the discard transition, this reverts data as well as flags.
    pub fn reset(&mut self) {
        if self.is_saving() {
            return;
        }
        self.store.reset();
        self.signal();
    }

    /// Advances the selected gap one step through its workflow cycle.
    pub fn gap_status_cycled(&mut self, id: &str) {
        if self.is_saving() {
            return;
        }
        let Some(gap) = self.store.gaps().into_iter().find(|g| g.id == id) else {
            return;
        };
        self.store.update_gap_status(id, gap.status.next());
        self.signal();
    }

    // ── Derived reads ──

    pub fn current_state(&self) -> ViewState {
        let filter = self.store.filter();
        ViewState {
            section: self.section,
            section_count: SECTION_TITLES.len(),
            progress_percent: u8::try_from((self.section + 1) * 100 / SECTION_TITLES.len())
                .unwrap_or(100),
            edit_mode: self.store.is_edit_mode(),
            dirty: self.store.has_unsaved_changes(),
            saving: self.is_saving(),
            resources: self.store.filtered_resources(&filter),
            filter,
            active: self.store.active_resources(),
            terminated: self.store.terminated_resources(),
            unique_lobs: self.store.unique_lobs(),
            gaps: self.store.gaps(),
            metrics: self.store.metrics(),
            validation_errors: self.store.validation_errors(),
        }
    }
}
