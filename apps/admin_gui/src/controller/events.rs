//! UI/backend events and error modeling for the admin GUI controller.

use client_core::RequestError;
use shared::{
    domain::EventId,
    protocol::{Event, EventPage},
};

pub enum UiEvent {
    Info(String),
    EventsLoaded {
        seq: u64,
        page: EventPage,
    },
    EventsLoadFailed {
        seq: u64,
        error: UiError,
    },
    EventSaved {
        session: u64,
        event: Event,
    },
    EventSaveFailed {
        session: u64,
        error: UiError,
    },
    EventDeleted {
        id: EventId,
    },
    EventDeleteFailed {
        id: EventId,
        error: UiError,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    NotFound,
    Server,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    ListEvents,
    SaveEvent,
    DeleteEvent,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("404") || message_lower.contains("not found") {
            UiErrorCategory::NotFound
        } else if message_lower.contains("400")
            || message_lower.contains("422")
            || message_lower.contains("invalid")
            || message_lower.contains("required")
            || message_lower.contains("could not read image")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("dns")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("500")
            || message_lower.contains("502")
            || message_lower.contains("503")
            || message_lower.contains("malformed response")
        {
            UiErrorCategory::Server
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_request_error(context: UiErrorContext, err: &RequestError) -> Self {
        let category = match err {
            RequestError::Transport { .. } => UiErrorCategory::Transport,
            RequestError::Decode { .. } => UiErrorCategory::Server,
            RequestError::NotFound { .. } => UiErrorCategory::NotFound,
            RequestError::ImageRead { .. } | RequestError::InvalidBaseUrl { .. } => {
                UiErrorCategory::Validation
            }
            RequestError::Status { status, .. } if status.as_u16() == 404 => {
                UiErrorCategory::NotFound
            }
            RequestError::Status { status, .. } if status.is_client_error() => {
                UiErrorCategory::Validation
            }
            RequestError::Status { status, .. } if status.is_server_error() => {
                UiErrorCategory::Server
            }
            RequestError::Status { .. } => UiErrorCategory::Unknown,
        };

        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Short text for the status banner.
    pub fn banner_text(&self) -> String {
        let hint = match self.category {
            UiErrorCategory::Transport => "Backend unreachable; check the API URL and network.",
            UiErrorCategory::NotFound => "The event no longer exists; the list will refresh.",
            UiErrorCategory::Validation => "The backend rejected the submitted data.",
            UiErrorCategory::Server => "The backend failed to process the request.",
            UiErrorCategory::Unknown => "",
        };
        if hint.is_empty() {
            self.message.clone()
        } else {
            format!("{} {hint}", self.message)
        }
    }
}
