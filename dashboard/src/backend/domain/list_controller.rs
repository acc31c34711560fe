//! # List Controller
//!
//! Owns the last-fetched snapshot of one record collection and the paging
//! window over it.
//!
//! ## State machine
//!
//! ```text
//! Idle ──search──▶ Loading ──ok──▶ Loaded
//!                     │
//!                     └──err──▶ Failed
//! ```
//!
//! A search can start from any state. Success replaces the snapshot and goes
//! back to page 1; failure records the message and leaves the previous
//! snapshot alone. Paging never refetches and only works while `Loaded`.
//!
//! ## Stale responses
//!
//! Every fetch takes a `SearchTicket`. Only the ticket of the most recent
//! fetch is accepted by `complete_search`; anything older is dropped with
//! `SearchOutcome::Stale`, so a slow response can never overwrite a newer one.

use log::{debug, info, warn};
use shared::{EntityKind, PageWindow, Record, SearchCriteria};

use crate::backend::domain::record_service::RecordService;
use crate::backend::error::DashboardError;
use crate::backend::storage::RecordStorage;

/// Informational text shown when a fetch comes back empty
pub const EMPTY_RESULT_MESSAGE: &str = "No records found for the specified date range.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Identifies one fetch issued by a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    keep_page: bool,
}

/// What happened when a fetch completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Loaded { count: usize },
    /// The fetch worked but matched nothing
    Empty,
    Failed(String),
    /// A newer fetch was issued; the response was discarded
    Stale,
}

impl SearchOutcome {
    /// Notification text for the outcome, if it warrants one
    pub fn notification(&self) -> Option<&str> {
        match self {
            SearchOutcome::Empty => Some(EMPTY_RESULT_MESSAGE),
            SearchOutcome::Failed(message) => Some(message),
            SearchOutcome::Loaded { .. } | SearchOutcome::Stale => None,
        }
    }
}

/// Confirmation token for a delete.
///
/// Only `ListController::request_delete` hands these out, and
/// `confirm_delete` consumes one, so a delete cannot happen without the
/// confirmation step in between.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingDelete {
    id: String,
    kind: EntityKind,
}

impl PendingDelete {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Prompt to show before confirming
    pub fn prompt(&self) -> String {
        format!(
            "Are you sure you want to delete this {}?",
            self.kind.display_name().to_lowercase()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Someone else removed it first; the list was refreshed anyway
    AlreadyRemoved,
}

pub struct ListController {
    kind: EntityKind,
    state: ListState,
    records: Vec<Record>,
    window: PageWindow,
    criteria: SearchCriteria,
    generation: u64,
}

impl ListController {
    pub fn new(kind: EntityKind, page_size: usize) -> Self {
        Self {
            kind,
            state: ListState::Idle,
            records: Vec::new(),
            window: PageWindow::new(page_size),
            criteria: SearchCriteria::default(),
            generation: 0,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    /// The whole loaded snapshot
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn current_page(&self) -> usize {
        self.window.current_page()
    }

    pub fn total_pages(&self) -> usize {
        self.window.total_pages(self.records.len())
    }

    /// Records on the displayed page
    pub fn current_page_records(&self) -> &[Record] {
        &self.records[self.window.slice_range(self.records.len())]
    }

    /// `Page X of Y`; an empty snapshot reads as page 1 of 1
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.window.current_page(), self.total_pages().max(1))
    }

    /// Start a new search. Any fetch still in flight becomes stale.
    pub fn begin_search(&mut self, criteria: SearchCriteria) -> SearchTicket {
        self.criteria = criteria;
        self.issue_ticket(false)
    }

    /// Start a refetch with the current criteria, keeping the page
    pub fn begin_refresh(&mut self) -> SearchTicket {
        self.issue_ticket(true)
    }

    fn issue_ticket(&mut self, keep_page: bool) -> SearchTicket {
        self.generation += 1;
        self.state = ListState::Loading;
        SearchTicket {
            generation: self.generation,
            keep_page,
        }
    }

    /// Apply the response of a fetch
    pub fn complete_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<Vec<Record>, DashboardError>,
    ) -> SearchOutcome {
        if ticket.generation != self.generation {
            debug!(
                "🕰️ LIST: discarding stale {} response (ticket {}, current {})",
                self.kind.collection(),
                ticket.generation,
                self.generation
            );
            return SearchOutcome::Stale;
        }

        match result {
            Ok(records) => {
                let count = records.len();
                self.records = records;
                if ticket.keep_page {
                    self.window.clamp(count);
                } else {
                    self.window.rewind();
                }
                self.state = ListState::Loaded;
                info!(
                    "📋 LIST: {} {} loaded, {}",
                    count,
                    self.kind.collection(),
                    self.page_label()
                );
                if count == 0 {
                    SearchOutcome::Empty
                } else {
                    SearchOutcome::Loaded { count }
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!("⚠️ LIST: {} fetch failed: {}", self.kind.collection(), message);
                self.state = ListState::Failed(message.clone());
                SearchOutcome::Failed(message)
            }
        }
    }

    /// Search and apply the result in one step
    pub async fn search<S: RecordStorage>(
        &mut self,
        service: &RecordService<S>,
        criteria: SearchCriteria,
    ) -> SearchOutcome {
        let ticket = self.begin_search(criteria);
        let result = service.list_filtered(self.kind, &self.criteria).await;
        self.complete_search(ticket, result)
    }

    /// Refetch the full set after a write, staying on the current page when
    /// it still exists
    pub async fn refresh<S: RecordStorage>(&mut self, service: &RecordService<S>) -> SearchOutcome {
        let ticket = self.begin_refresh();
        let result = service.list_filtered(self.kind, &self.criteria).await;
        self.complete_search(ticket, result)
    }

    /// Advance one page; false when not loaded or already on the last page
    pub fn next_page(&mut self) -> bool {
        self.state == ListState::Loaded && self.window.next(self.records.len())
    }

    /// Go back one page; false when not loaded or already on the first page
    pub fn previous_page(&mut self) -> bool {
        self.state == ListState::Loaded && self.window.previous()
    }

    /// Jump to the page holding `id`; false when it is not loaded
    pub fn show_record(&mut self, id: &str) -> bool {
        match self.records.iter().position(|record| record.id == id) {
            Some(index) => {
                self.window.show_index(index);
                true
            }
            None => false,
        }
    }

    /// A record on the displayed page, for the edit form
    pub fn edit_target(&self, id: &str) -> Option<&Record> {
        self.current_page_records().iter().find(|record| record.id == id)
    }

    /// First step of a delete: the record must be on the displayed page
    pub fn request_delete(&self, id: &str) -> Result<PendingDelete, DashboardError> {
        match self.edit_target(id) {
            Some(record) => Ok(PendingDelete {
                id: record.id.clone(),
                kind: self.kind,
            }),
            None => Err(DashboardError::NotFound {
                collection: self.kind.collection().to_string(),
                id: id.to_string(),
            }),
        }
    }

    /// Second step of a delete: remove upstream, then refresh.
    ///
    /// A failed remove leaves the snapshot untouched. A failed refresh puts
    /// the controller in `Failed` but still reports the delete.
    pub async fn confirm_delete<S: RecordStorage>(
        &mut self,
        service: &RecordService<S>,
        pending: PendingDelete,
    ) -> Result<DeleteOutcome, DashboardError> {
        let removed = service.remove(pending.kind, &pending.id).await?;
        self.refresh(service).await;
        Ok(if removed {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::AlreadyRemoved
        })
    }

    /// Drop the snapshot and go back to `Idle`. In-flight fetches go stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = ListState::Idle;
        self.records.clear();
        self.criteria = SearchCriteria::default();
        self.window.rewind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::test_utils::{trip_fields, FailingStorage};
    use crate::backend::storage::MemoryRecordStorage;
    use shared::{Fields, DEFAULT_PAGE_SIZE};
    use std::sync::Arc;

    fn loaded_records(count: usize) -> Vec<Record> {
        (0..count)
            .map(|index| Record::new(format!("r{:02}", index), Fields::new()))
            .collect()
    }

    fn loaded_controller(count: usize) -> ListController {
        let mut controller = ListController::new(EntityKind::Trip, DEFAULT_PAGE_SIZE);
        let ticket = controller.begin_search(SearchCriteria::default());
        controller.complete_search(ticket, Ok(loaded_records(count)));
        controller
    }

    async fn seeded_service(count: usize) -> RecordService<MemoryRecordStorage> {
        let service = RecordService::new(Arc::new(MemoryRecordStorage::new()));
        for day in 1..=count {
            service
                .add(EntityKind::Trip, trip_fields(&format!("2024-08-{:02}", day), "Juma"))
                .await
                .unwrap();
        }
        service
    }

    #[test]
    fn test_starts_idle() {
        let controller = ListController::new(EntityKind::Trip, DEFAULT_PAGE_SIZE);
        assert_eq!(controller.state(), &ListState::Idle);
        assert!(controller.current_page_records().is_empty());
        assert_eq!(controller.page_label(), "Page 1 of 1");
    }

    #[test]
    fn test_twelve_records_paginate_into_three_pages() {
        let mut controller = loaded_controller(12);
        assert_eq!(controller.total_pages(), 3);
        assert_eq!(controller.current_page(), 1);

        assert!(controller.next_page());
        assert!(controller.next_page());
        assert_eq!(controller.current_page(), 3);
        assert!(!controller.next_page());
        assert_eq!(controller.current_page(), 3);
        assert_eq!(controller.current_page_records().len(), 2);
        assert_eq!(controller.page_label(), "Page 3 of 3");
    }

    #[test]
    fn test_paging_across_page_sizes() {
        for page_size in [1, 2, 4, 5, 9] {
            for count in [0, 1, page_size, page_size + 1, page_size * 2, page_size * 2 + 1] {
                let mut controller = ListController::new(EntityKind::Trip, page_size);
                let ticket = controller.begin_search(SearchCriteria::default());
                controller.complete_search(ticket, Ok(loaded_records(count)));

                let expected_pages = (count + page_size - 1) / page_size;
                assert_eq!(controller.total_pages(), expected_pages, "size {} count {}", page_size, count);

                while controller.next_page() {}
                assert_eq!(controller.current_page(), expected_pages.max(1));

                let remaining = count.saturating_sub(page_size);
                let ticket = controller.begin_refresh();
                controller.complete_search(ticket, Ok(loaded_records(remaining)));
                assert!(controller.current_page() >= 1);
                assert!(controller.current_page() <= controller.total_pages().max(1));
                assert!(controller.current_page_records().len() <= page_size);
                if remaining > 0 {
                    assert!(!controller.current_page_records().is_empty());
                }
            }
        }
    }

    #[test]
    fn test_previous_on_first_page_is_noop() {
        let mut controller = loaded_controller(7);
        assert!(!controller.previous_page());
        assert_eq!(controller.current_page(), 1);
    }

    #[test]
    fn test_paging_disabled_unless_loaded() {
        let mut controller = ListController::new(EntityKind::Trip, DEFAULT_PAGE_SIZE);
        let ticket = controller.begin_search(SearchCriteria::default());
        controller.complete_search(ticket, Ok(loaded_records(12)));
        controller.begin_refresh();
        assert_eq!(controller.state(), &ListState::Loading);
        assert!(!controller.next_page());
        assert_eq!(controller.current_page(), 1);
    }

    #[test]
    fn test_new_search_resets_page() {
        let mut controller = loaded_controller(12);
        controller.next_page();
        controller.next_page();

        let ticket = controller.begin_search(SearchCriteria::between("2024-08-01", ""));
        controller.complete_search(ticket, Ok(loaded_records(12)));
        assert_eq!(controller.current_page(), 1);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut controller = ListController::new(EntityKind::Trip, DEFAULT_PAGE_SIZE);
        let first = controller.begin_search(SearchCriteria::between("2024-01-01", ""));
        let second = controller.begin_search(SearchCriteria::between("2024-06-01", ""));

        assert_eq!(
            controller.complete_search(second, Ok(loaded_records(2))),
            SearchOutcome::Loaded { count: 2 }
        );
        assert_eq!(
            controller.complete_search(first, Ok(loaded_records(9))),
            SearchOutcome::Stale
        );
        assert_eq!(controller.records().len(), 2);
        assert_eq!(controller.state(), &ListState::Loaded);
    }

    #[test]
    fn test_failure_keeps_previous_snapshot() {
        let mut controller = loaded_controller(6);
        let ticket = controller.begin_search(SearchCriteria::default());
        let outcome = controller.complete_search(
            ticket,
            Err(DashboardError::Repository("Error fetching trips: offline".to_string())),
        );

        assert_eq!(outcome.notification(), Some("Error fetching trips: offline"));
        assert_eq!(
            controller.state(),
            &ListState::Failed("Error fetching trips: offline".to_string())
        );
        assert_eq!(controller.records().len(), 6);
    }

    #[test]
    fn test_empty_result_is_informational() {
        let mut controller = loaded_controller(3);
        let ticket = controller.begin_search(SearchCriteria::between("2030-01-01", ""));
        let outcome = controller.complete_search(ticket, Ok(Vec::new()));

        assert_eq!(outcome, SearchOutcome::Empty);
        assert_eq!(outcome.notification(), Some(EMPTY_RESULT_MESSAGE));
        assert_eq!(controller.state(), &ListState::Loaded);
        assert_eq!(controller.total_pages(), 0);
        assert_eq!(controller.page_label(), "Page 1 of 1");
    }

    #[test]
    fn test_show_record_jumps_to_its_page() {
        let mut controller = loaded_controller(12);
        assert!(controller.show_record("r07"));
        assert_eq!(controller.current_page(), 2);
        assert!(!controller.show_record("missing"));
        assert_eq!(controller.current_page(), 2);
    }

    #[test]
    fn test_delete_requires_record_on_displayed_page() {
        let controller = loaded_controller(12);
        assert_eq!(controller.request_delete("r01").unwrap().id(), "r01");
        assert!(matches!(
            controller.request_delete("r11"),
            Err(DashboardError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_through_service() {
        let service = seeded_service(12).await;
        let mut controller = ListController::new(EntityKind::Trip, DEFAULT_PAGE_SIZE);

        let outcome = controller
            .search(&service, SearchCriteria::between("2024-08-03", "2024-08-10"))
            .await;
        assert_eq!(outcome, SearchOutcome::Loaded { count: 8 });
        assert_eq!(controller.total_pages(), 2);
    }

    #[tokio::test]
    async fn test_deleting_last_record_on_last_page_shifts_back() {
        let service = seeded_service(11).await;
        let mut controller = ListController::new(EntityKind::Trip, DEFAULT_PAGE_SIZE);
        controller.search(&service, SearchCriteria::default()).await;
        controller.next_page();
        controller.next_page();
        assert_eq!(controller.current_page(), 3);
        assert_eq!(controller.current_page_records().len(), 1);

        let id = controller.current_page_records()[0].id.clone();
        let pending = controller.request_delete(&id).unwrap();
        let outcome = controller.confirm_delete(&service, pending).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(controller.records().len(), 10);
        assert_eq!(controller.current_page(), 2);
        assert_eq!(controller.page_label(), "Page 2 of 2");
    }

    #[tokio::test]
    async fn test_removing_already_removed_record_keeps_state_consistent() {
        let service = seeded_service(6).await;
        let mut controller = ListController::new(EntityKind::Trip, DEFAULT_PAGE_SIZE);
        controller.search(&service, SearchCriteria::default()).await;

        let id = controller.current_page_records()[0].id.clone();
        let pending = controller.request_delete(&id).unwrap();
        // Removed by someone else before the confirmation lands
        assert!(service.remove(EntityKind::Trip, &id).await.unwrap());

        let outcome = controller.confirm_delete(&service, pending).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::AlreadyRemoved);
        assert_eq!(controller.state(), &ListState::Loaded);
        assert_eq!(controller.records().len(), 5);
        assert!(controller.records().iter().all(|record| record.id != id));
    }

    #[tokio::test]
    async fn test_refresh_failure_preserves_data() {
        let storage = Arc::new(FailingStorage::healthy("backend unavailable"));
        let service = RecordService::new(Arc::clone(&storage));
        service.add(EntityKind::Trip, trip_fields("2024-08-01", "Juma")).await.unwrap();

        let mut controller = ListController::new(EntityKind::Trip, DEFAULT_PAGE_SIZE);
        controller.search(&service, SearchCriteria::default()).await;

        storage.set_failing(true);
        let outcome = controller.refresh(&service).await;
        assert_eq!(
            outcome,
            SearchOutcome::Failed("Error fetching trips: backend unavailable".to_string())
        );
        assert_eq!(controller.records().len(), 1);
        assert!(!controller.next_page());
    }

    #[tokio::test]
    async fn test_failed_remove_leaves_snapshot() {
        let storage = Arc::new(FailingStorage::healthy("write rejected"));
        let service = RecordService::new(Arc::clone(&storage));
        service.add(EntityKind::Trip, trip_fields("2024-08-01", "Juma")).await.unwrap();

        let mut controller = ListController::new(EntityKind::Trip, DEFAULT_PAGE_SIZE);
        controller.search(&service, SearchCriteria::default()).await;
        let id = controller.records()[0].id.clone();
        let pending = controller.request_delete(&id).unwrap();

        storage.set_failing(true);
        assert!(matches!(
            controller.confirm_delete(&service, pending).await,
            Err(DashboardError::Repository(_))
        ));
        assert_eq!(controller.state(), &ListState::Loaded);
        assert_eq!(controller.records().len(), 1);
    }

    #[test]
    fn test_reset_discards_in_flight_fetch() {
        let mut controller = loaded_controller(4);
        let ticket = controller.begin_refresh();
        controller.reset();

        assert_eq!(controller.complete_search(ticket, Ok(loaded_records(4))), SearchOutcome::Stale);
        assert_eq!(controller.state(), &ListState::Idle);
        assert!(controller.records().is_empty());
    }
}
