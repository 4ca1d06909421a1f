use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{EventId, SortField, SortOrder};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    #[serde(alias = "name")]
    pub title: String,
    pub description: String,
    #[serde(with = "calendar_date")]
    pub start_date: NaiveDate,
    #[serde(with = "calendar_date")]
    pub end_date: NaiveDate,
    pub total_guests: i64,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Mutable fields of an event as entered by the user.
///
/// Dates are kept as typed text so that an in-progress edit survives
/// untouched until validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub total_guests: i64,
}

impl EventDraft {
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            start_date: event.start_date.format(DATE_FORMAT).to_string(),
            end_date: event.end_date.format(DATE_FORMAT).to_string(),
            total_guests: event.total_guests,
        }
    }

    /// Multipart text fields in wire order. Readable dates are sent as
    /// `YYYY-MM-DD` whatever form they were typed in.
    pub fn form_fields(&self) -> [(&'static str, String); 5] {
        [
            ("title", self.title.trim().to_string()),
            ("description", self.description.trim().to_string()),
            ("startDate", canonical_date(&self.start_date)),
            ("endDate", canonical_date(&self.end_date)),
            ("totalGuests", self.total_guests.to_string()),
        ]
    }
}

fn canonical_date(raw: &str) -> String {
    parse_calendar_date(raw)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(timestamp) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_end_date: Option<NaiveDate>,
}

impl Default for ListEventsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_by: SortField::default(),
            order: SortOrder::default(),
            filter_name: None,
            filter_start_date: None,
            filter_end_date: None,
        }
    }
}

impl ListEventsQuery {
    /// Whether `event` passes the title substring and date-bound filters.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(needle) = &self.filter_name {
            if !event
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if let Some(from) = self.filter_start_date {
            if event.start_date < from {
                return false;
            }
        }
        if let Some(to) = self.filter_end_date {
            if event.end_date > to {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPage {
    #[serde(alias = "rows")]
    pub events: Vec<Event>,
    #[serde(alias = "count")]
    pub total: u64,
}

/// Number of pages needed to show `total` records, `page_size` at a time.
pub fn page_count(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp and keeps the calendar date.
pub mod calendar_date {
    use chrono::NaiveDate;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use super::{parse_calendar_date, DATE_FORMAT};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_calendar_date(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid calendar date '{raw}'")))
    }
}
