use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use shared::{
    domain::{EventId, SortField, SortOrder},
    protocol::{parse_calendar_date, Event, EventDraft, EventPage, ListEventsQuery},
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{EventOperation, EventsApi, ImageUpload, RequestError};

/// Events backend held entirely in process memory.
///
/// Follows the same list semantics as the REST backend: case-insensitive
/// title substring filter, inclusive date bounds, 1-based pages. Images sent
/// on update are appended to the ones already stored.
pub struct InMemoryEventsApi {
    inner: Mutex<InMemoryState>,
}

struct InMemoryState {
    next_id: i64,
    events: Vec<Event>,
}

impl Default for InMemoryEventsApi {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventsApi {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(InMemoryState {
                next_id: 1,
                events: Vec::new(),
            }),
        }
    }

    /// A backend pre-populated with a handful of events, for demo runs.
    pub fn with_sample_events() -> Self {
        let samples = [
            ("Product Launch", "Kickoff for the spring release", (2024, 3, 4), (2024, 3, 4), 120),
            ("Team Offsite", "Two days of planning in the mountains", (2024, 4, 10), (2024, 4, 11), 35),
            ("Hackathon", "Build anything in 48 hours", (2024, 5, 17), (2024, 5, 19), 80),
            ("Board Meeting", "Quarterly review", (2024, 6, 3), (2024, 6, 3), 9),
            ("Summer Party", "Food, music and the annual awards", (2024, 7, 26), (2024, 7, 26), 200),
            ("Security Training", "Mandatory phishing awareness session", (2024, 9, 2), (2024, 9, 2), 60),
            ("Customer Summit", "Talks and workshops with key accounts", (2024, 10, 14), (2024, 10, 16), 450),
            ("Holiday Dinner", "End of year celebration", (2024, 12, 13), (2024, 12, 13), 150),
            ("Design Sprint", "Prototype the onboarding flow", (2025, 1, 20), (2025, 1, 24), 12),
            ("All Hands", "Company update and Q&A", (2025, 2, 7), (2025, 2, 7), 320),
            ("Charity Run", "5k around the park", (2025, 4, 12), (2025, 4, 12), 75),
        ];

        let mut events = Vec::with_capacity(samples.len());
        for (index, (title, description, start, end, guests)) in samples.into_iter().enumerate() {
            let (Some(start_date), Some(end_date)) = (
                NaiveDate::from_ymd_opt(start.0, start.1, start.2),
                NaiveDate::from_ymd_opt(end.0, end.1, end.2),
            ) else {
                continue;
            };
            let id = index as i64 + 1;
            events.push(Event {
                id: EventId(id),
                title: title.to_string(),
                description: description.to_string(),
                start_date,
                end_date,
                total_guests: guests,
                images: vec![format!("memory://events/{id}/cover.png")],
            });
        }

        Self {
            inner: Mutex::new(InMemoryState {
                next_id: events.len() as i64 + 1,
                events,
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn parse_draft_dates(
    operation: EventOperation,
    draft: &EventDraft,
) -> Result<(NaiveDate, NaiveDate), RequestError> {
    match (
        parse_calendar_date(&draft.start_date),
        parse_calendar_date(&draft.end_date),
    ) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(RequestError::Status {
            operation,
            status: StatusCode::BAD_REQUEST,
        }),
    }
}

fn image_reference(id: EventId, image: &ImageUpload) -> String {
    format!("memory://events/{}/{}", id.0, image.file_name)
}

fn compare_events(field: SortField, a: &Event, b: &Event) -> Ordering {
    let primary = match field {
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::StartDate => a.start_date.cmp(&b.start_date),
        SortField::EndDate => a.end_date.cmp(&b.end_date),
    };
    primary.then_with(|| a.id.0.cmp(&b.id.0))
}

#[async_trait]
impl EventsApi for InMemoryEventsApi {
    async fn list_events(&self, query: &ListEventsQuery) -> Result<EventPage, RequestError> {
        let guard = self.inner.lock().await;
        let mut matching: Vec<&Event> = guard
            .events
            .iter()
            .filter(|event| query.matches(event))
            .collect();
        matching.sort_by(|a, b| {
            let ordering = compare_events(query.sort_by, a, b);
            match query.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matching.len() as u64;
        let limit = query.limit.max(1) as usize;
        let skip = (query.page.max(1) as usize - 1).saturating_mul(limit);
        let events = matching
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect();
        debug!(page = query.page, total, "memory: list");
        Ok(EventPage { events, total })
    }

    async fn create_event(
        &self,
        draft: &EventDraft,
        images: Vec<ImageUpload>,
    ) -> Result<Event, RequestError> {
        let (start_date, end_date) = parse_draft_dates(EventOperation::Create, draft)?;
        let mut guard = self.inner.lock().await;
        let id = EventId(guard.next_id);
        guard.next_id += 1;
        let event = Event {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            start_date,
            end_date,
            total_guests: draft.total_guests,
            images: images.iter().map(|image| image_reference(id, image)).collect(),
        };
        guard.events.push(event.clone());
        debug!(event_id = id.0, "memory: created");
        Ok(event)
    }

    async fn update_event(
        &self,
        id: EventId,
        draft: &EventDraft,
        images: Vec<ImageUpload>,
    ) -> Result<Event, RequestError> {
        let operation = EventOperation::Update;
        let (start_date, end_date) = parse_draft_dates(operation, draft)?;
        let mut guard = self.inner.lock().await;
        let event = guard
            .events
            .iter_mut()
            .find(|event| event.id == id)
            .ok_or(RequestError::NotFound { operation, id })?;
        event.title = draft.title.trim().to_string();
        event.description = draft.description.trim().to_string();
        event.start_date = start_date;
        event.end_date = end_date;
        event.total_guests = draft.total_guests;
        event
            .images
            .extend(images.iter().map(|image| image_reference(id, image)));
        Ok(event.clone())
    }

    async fn delete_event(&self, id: EventId) -> Result<(), RequestError> {
        let mut guard = self.inner.lock().await;
        let before = guard.events.len();
        guard.events.retain(|event| event.id != id);
        if guard.events.len() == before {
            return Err(RequestError::NotFound {
                operation: EventOperation::Delete,
                id,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod tests;
