use std::{fmt, path::PathBuf};

use reqwest::StatusCode;
use shared::domain::EventId;
use thiserror::Error;

/// The four backend operations of the events contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventOperation {
    List,
    Create,
    Update,
    Delete,
}

impl EventOperation {
    /// Generic user-facing failure text; backend error bodies are not parsed.
    pub fn failure_message(self) -> &'static str {
        match self {
            EventOperation::List => "Failed to fetch events",
            EventOperation::Create => "Failed to create event",
            EventOperation::Update => "Failed to update event",
            EventOperation::Delete => "Failed to delete event",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EventOperation::List => "list_events",
            EventOperation::Create => "create_event",
            EventOperation::Update => "update_event",
            EventOperation::Delete => "delete_event",
        }
    }
}

impl fmt::Display for EventOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{}: {source}", .operation.failure_message())]
    Transport {
        operation: EventOperation,
        #[source]
        source: reqwest::Error,
    },
    #[error("{}: server responded with {status}", .operation.failure_message())]
    Status {
        operation: EventOperation,
        status: StatusCode,
    },
    #[error("{}: malformed response body: {source}", .operation.failure_message())]
    Decode {
        operation: EventOperation,
        #[source]
        source: reqwest::Error,
    },
    #[error("{}: event {id} not found", .operation.failure_message())]
    NotFound {
        operation: EventOperation,
        id: EventId,
    },
    #[error("could not read image '{}': {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid backend URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl RequestError {
    pub fn operation(&self) -> Option<EventOperation> {
        match self {
            RequestError::Transport { operation, .. }
            | RequestError::Status { operation, .. }
            | RequestError::Decode { operation, .. }
            | RequestError::NotFound { operation, .. } => Some(*operation),
            RequestError::ImageRead { .. } | RequestError::InvalidBaseUrl { .. } => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            RequestError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_leads_with_generic_operation_message() {
        let err = RequestError::Status {
            operation: EventOperation::Create,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert!(err.to_string().starts_with("Failed to create event"));
        assert_eq!(err.operation(), Some(EventOperation::Create));
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn not_found_reports_404_status() {
        let err = RequestError::NotFound {
            operation: EventOperation::Delete,
            id: EventId(9),
        };
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.to_string(), "Failed to delete event: event 9 not found");
    }
}
