//! # Record Page
//!
//! One trips or expenses page: the list, the edit modal and export, all
//! gated by what the current session may do.
//!
//! The page keeps a snapshot of the session and a subscription to session
//! changes. `sync_session` applies pending changes; a sign-out clears the
//! loaded records and closes any open form, so nothing from the previous
//! identity survives on screen.

use log::{info, warn};
use shared::{EntityKind, ExportPayload, FieldValue, Record, SearchCriteria, Session};

use crate::backend::domain::export_service::ExportService;
use crate::backend::domain::form_controller::{FormController, FormMode, FormSubmission};
use crate::backend::domain::list_controller::{DeleteOutcome, ListController, PendingDelete, SearchOutcome};
use crate::backend::domain::permissions::{Action, ActionPolicy};
use crate::backend::domain::record_service::RecordService;
use crate::backend::domain::session_service::{SessionEvent, SessionService, SessionSubscription};
use crate::backend::error::DashboardError;
use crate::backend::storage::{KeyValueStore, RecordStorage};

pub struct RecordPage<S: RecordStorage, K: KeyValueStore> {
    kind: EntityKind,
    sessions: SessionService<K>,
    session: Session,
    subscription: SessionSubscription,
    records: RecordService<S>,
    export: ExportService,
    list: ListController,
    form: FormController,
}

impl<S: RecordStorage, K: KeyValueStore> RecordPage<S, K> {
    pub fn new(
        kind: EntityKind,
        sessions: &SessionService<K>,
        records: RecordService<S>,
        export: ExportService,
        page_size: usize,
    ) -> Self {
        Self {
            kind,
            sessions: sessions.clone(),
            session: sessions.get_session(),
            subscription: sessions.subscribe(),
            records,
            export,
            list: ListController::new(kind, page_size),
            form: FormController::new(kind),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn list(&self) -> &ListController {
        &self.list
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    /// Buttons the page shows for the current session
    pub fn allowed_actions(&self) -> Vec<Action> {
        ActionPolicy::allowed_actions(&self.session)
    }

    /// Re-read the persisted session, as on mount
    pub fn reload_session(&mut self) -> &Session {
        self.session = self.sessions.get_session();
        &self.session
    }

    /// Apply the latest session change, if there is one
    pub fn sync_session(&mut self) -> Option<SessionEvent> {
        let event = self.subscription.poll()?;
        match &event {
            SessionEvent::Restored(session) | SessionEvent::SignedIn(session) => {
                self.session = session.clone();
            }
            SessionEvent::SignedOut => {
                info!("🔄 PAGE: {} page reset after sign-out", self.kind);
                self.session = Session::default();
                self.list.reset();
                self.form.close();
            }
        }
        Some(event)
    }

    fn ensure(&self, action: Action) -> Result<(), DashboardError> {
        if ActionPolicy::allows(&self.session, action) {
            return Ok(());
        }

        let who = if self.session.is_authenticated {
            format!("the {} role", self.session.role)
        } else {
            "signed-out users".to_string()
        };
        warn!("🚫 PAGE: {} refused for {}", action, who);
        Err(DashboardError::Forbidden {
            action: action.to_string(),
            who,
        })
    }

    pub async fn search(&mut self, criteria: SearchCriteria) -> Result<SearchOutcome, DashboardError> {
        self.ensure(Action::Search)?;
        Ok(self.list.search(&self.records, criteria).await)
    }

    pub fn next_page(&mut self) -> bool {
        self.list.next_page()
    }

    pub fn previous_page(&mut self) -> bool {
        self.list.previous_page()
    }

    /// Move to the page holding `id`, so it can be edited or deleted
    pub fn show_record(&mut self, id: &str) -> bool {
        self.list.show_record(id)
    }

    pub fn open_create(&mut self) -> Result<(), DashboardError> {
        self.ensure(Action::Create)?;
        self.form.open(None);
        Ok(())
    }

    /// Open the edit modal for a record on the displayed page
    pub fn open_edit(&mut self, id: &str) -> Result<(), DashboardError> {
        self.ensure(Action::Edit)?;
        let record: Record = self
            .list
            .edit_target(id)
            .cloned()
            .ok_or_else(|| DashboardError::NotFound {
                collection: self.kind.collection().to_string(),
                id: id.to_string(),
            })?;
        self.form.open(Some(&record));
        Ok(())
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<FieldValue>) {
        self.form.set_field(key, value);
    }

    pub fn close_form(&mut self) {
        self.form.close();
    }

    /// Save the open form, then refresh the list.
    ///
    /// A created record is brought into view when the current search still
    /// matches it. A `NotFound` failure also refreshes, since the list is
    /// known to be behind.
    pub async fn submit(&mut self) -> Result<FormSubmission, DashboardError> {
        let action = match self.form.mode() {
            FormMode::Edit { .. } => Action::Edit,
            FormMode::Create | FormMode::Closed => Action::Create,
        };
        self.ensure(action)?;

        match self.form.submit(&self.records).await {
            Ok(submission) => {
                self.list.refresh(&self.records).await;
                if let FormSubmission::Created { id } = &submission {
                    self.list.show_record(id);
                }
                Ok(submission)
            }
            Err(e) => {
                if e.should_refresh() {
                    self.list.refresh(&self.records).await;
                }
                Err(e)
            }
        }
    }

    pub fn request_delete(&self, id: &str) -> Result<PendingDelete, DashboardError> {
        self.ensure(Action::Delete)?;
        self.list.request_delete(id)
    }

    pub async fn confirm_delete(&mut self, pending: PendingDelete) -> Result<DeleteOutcome, DashboardError> {
        self.ensure(Action::Delete)?;
        self.list.confirm_delete(&self.records, pending).await
    }

    /// CSV of everything the current search loaded, not just the visible page
    pub fn export(&self) -> Result<ExportPayload, DashboardError> {
        self.ensure(Action::Export)?;
        self.export.export_records(self.kind, self.list.records())
    }
}
