//! Backend commands queued from UI to backend worker.

use shared::{
    domain::EventId,
    protocol::{EventDraft, ListEventsQuery},
};

use crate::controller::{
    form::PendingImage,
    page::SaveRequest,
    query::FetchRequest,
};

#[derive(Debug, Clone)]
pub enum BackendCommand {
    ListEvents {
        seq: u64,
        query: ListEventsQuery,
    },
    CreateEvent {
        session: u64,
        draft: EventDraft,
        images: Vec<PendingImage>,
    },
    UpdateEvent {
        session: u64,
        id: EventId,
        draft: EventDraft,
        images: Vec<PendingImage>,
    },
    DeleteEvent {
        id: EventId,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::ListEvents { .. } => "list_events",
            BackendCommand::CreateEvent { .. } => "create_event",
            BackendCommand::UpdateEvent { .. } => "update_event",
            BackendCommand::DeleteEvent { .. } => "delete_event",
        }
    }
}

impl From<FetchRequest> for BackendCommand {
    fn from(request: FetchRequest) -> Self {
        BackendCommand::ListEvents {
            seq: request.seq,
            query: request.query,
        }
    }
}

impl From<SaveRequest> for BackendCommand {
    fn from(request: SaveRequest) -> Self {
        match request {
            SaveRequest::Create {
                session,
                draft,
                images,
            } => BackendCommand::CreateEvent {
                session,
                draft,
                images,
            },
            SaveRequest::Update {
                session,
                id,
                draft,
                images,
            } => BackendCommand::UpdateEvent {
                session,
                id,
                draft,
                images,
            },
        }
    }
}
