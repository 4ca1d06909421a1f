//! Pagination, sort and filter state for the event list.

use std::collections::HashSet;

use shared::{
    domain::{EventId, SortField, SortIndicator, SortOrder},
    protocol::{page_count, parse_calendar_date, EventPage, ListEventsQuery},
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub page: u32,
    pub page_size: u32,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub filter_title: String,
    pub filter_start_date: String,
    pub filter_end_date: String,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
            filter_title: String::new(),
            filter_start_date: String::new(),
            filter_end_date: String::new(),
        }
    }
}

impl QueryState {
    /// Builds the wire query. Blank filters are left out; so are date bounds
    /// that do not parse, which the backend would otherwise reject.
    pub fn to_query(&self) -> ListEventsQuery {
        let title = self.filter_title.trim();
        ListEventsQuery {
            page: self.page,
            limit: self.page_size,
            sort_by: self.sort_field,
            order: self.sort_order,
            filter_name: (!title.is_empty()).then(|| title.to_string()),
            filter_start_date: parse_filter_date("start", &self.filter_start_date),
            filter_end_date: parse_filter_date("end", &self.filter_end_date),
        }
    }

    /// Date bounds that were filled in but do not read as dates, and so are
    /// left out of [`QueryState::to_query`].
    pub fn unreadable_date_filters(&self) -> Vec<&'static str> {
        [("start", &self.filter_start_date), ("end", &self.filter_end_date)]
            .into_iter()
            .filter(|(_, raw)| !raw.trim().is_empty() && parse_calendar_date(raw).is_none())
            .map(|(bound, _)| bound)
            .collect()
    }
}

fn parse_filter_date(bound: &str, raw: &str) -> Option<chrono::NaiveDate> {
    if raw.trim().is_empty() {
        return None;
    }
    let parsed = parse_calendar_date(raw);
    if parsed.is_none() {
        tracing::warn!(bound, value = raw, "ignoring unparseable date filter");
    }
    parsed
}

/// A List request stamped with the order it was issued in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub query: ListEventsQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was issued after this one; the result was dropped.
    Stale,
    /// The current page no longer exists; the page was clamped and this
    /// follow-up fetch must be dispatched.
    Refetch(FetchRequest),
}

pub struct QueryController {
    state: QueryState,
    results: EventPage,
    loading: bool,
    last_issued_seq: u64,
    deleting: HashSet<EventId>,
}

impl Default for QueryController {
    fn default() -> Self {
        Self::new(QueryState::default())
    }
}

impl QueryController {
    pub fn new(mut state: QueryState) -> Self {
        state.page = state.page.max(1);
        state.page_size = state.page_size.max(1);
        Self {
            state,
            results: EventPage::default(),
            loading: false,
            last_issued_seq: 0,
            deleting: HashSet::new(),
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn results(&self) -> &EventPage {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_deleting(&self, id: EventId) -> bool {
        self.deleting.contains(&id)
    }

    pub fn total_pages(&self) -> u32 {
        page_count(self.results.total, self.state.page_size)
    }

    pub fn can_go_previous(&self) -> bool {
        self.state.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.state.page < self.total_pages()
    }

    pub fn sort_indicator(&self, field: SortField) -> SortIndicator {
        SortIndicator::derive(self.state.sort_field, self.state.sort_order, field)
    }

    /// Moves to page `page`; out-of-range pages leave everything untouched.
    pub fn set_page(&mut self, page: u32) -> Option<FetchRequest> {
        if page < 1 || page > self.total_pages() {
            tracing::debug!(page, total_pages = self.total_pages(), "page out of range");
            return None;
        }
        self.state.page = page;
        Some(self.fetch())
    }

    /// Re-sorting keeps the current page.
    pub fn set_sort(&mut self, field: SortField) -> FetchRequest {
        if self.state.sort_field == field {
            self.state.sort_order = self.state.sort_order.flipped();
        } else {
            self.state.sort_field = field;
            self.state.sort_order = SortOrder::Asc;
        }
        self.fetch()
    }

    /// Stores filter values without fetching; `None` clears a filter.
    pub fn set_filter(&mut self, title: Option<&str>, start_date: Option<&str>, end_date: Option<&str>) {
        self.state.filter_title = title.unwrap_or_default().to_string();
        self.state.filter_start_date = start_date.unwrap_or_default().to_string();
        self.state.filter_end_date = end_date.unwrap_or_default().to_string();
    }

    /// Applies the stored filters, starting again from the first page.
    pub fn apply_filter(&mut self) -> FetchRequest {
        self.state.page = 1;
        self.fetch()
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Option<FetchRequest> {
        if page_size == 0 || page_size == self.state.page_size {
            return None;
        }
        self.state.page_size = page_size;
        self.state.page = 1;
        Some(self.fetch())
    }

    pub fn fetch(&mut self) -> FetchRequest {
        self.last_issued_seq += 1;
        self.loading = true;
        FetchRequest {
            seq: self.last_issued_seq,
            query: self.state.to_query(),
        }
    }

    pub fn on_fetch_succeeded(&mut self, seq: u64, page: EventPage) -> FetchOutcome {
        if seq != self.last_issued_seq {
            tracing::warn!(seq, latest = self.last_issued_seq, "dropping stale list result");
            return FetchOutcome::Stale;
        }
        self.loading = false;

        let last_page = page_count(page.total, self.state.page_size).max(1);
        self.results = page;
        if self.state.page > last_page {
            tracing::info!(page = self.state.page, last_page, "current page vanished; clamping");
            self.state.page = last_page;
            return FetchOutcome::Refetch(self.fetch());
        }
        FetchOutcome::Applied
    }

    /// Returns whether the failure belongs to the latest fetch and should be
    /// reported. Prior results stay on screen either way.
    pub fn on_fetch_failed(&mut self, seq: u64) -> bool {
        if seq != self.last_issued_seq {
            tracing::warn!(seq, latest = self.last_issued_seq, "dropping stale list failure");
            return false;
        }
        self.loading = false;
        true
    }

    /// Marks `id` as being deleted. Returns `None` while a delete of the same
    /// record is already outstanding.
    pub fn delete(&mut self, id: EventId) -> Option<EventId> {
        self.deleting.insert(id).then_some(id)
    }

    /// Drops the row locally and refetches. When the row was the last one on
    /// the final page the page moves back first.
    pub fn on_delete_succeeded(&mut self, id: EventId) -> FetchRequest {
        self.deleting.remove(&id);
        let before = self.results.events.len();
        self.results.events.retain(|event| event.id != id);
        if self.results.events.len() < before {
            self.results.total = self.results.total.saturating_sub(1);
        }

        let last_page = page_count(self.results.total, self.state.page_size).max(1);
        if self.state.page > last_page {
            self.state.page = last_page;
        }
        self.fetch()
    }

    pub fn on_delete_failed(&mut self, id: EventId) {
        self.deleting.remove(&id);
    }
}
