use std::path::Path;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use shared::{
    domain::EventId,
    protocol::{Event, EventDraft, EventPage, ListEventsQuery},
};
use tracing::{debug, info, warn};
use url::Url;

pub mod error;
mod memory;

pub use error::{EventOperation, RequestError};
pub use memory::InMemoryEventsApi;

const DEFAULT_IMAGE_MIME: &str = "application/octet-stream";

/// An image file read into memory, ready to be sent as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_guess::from_path(&file_name)
            .first_raw()
            .unwrap_or(DEFAULT_IMAGE_MIME)
            .to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    pub async fn load(path: &Path) -> Result<Self, RequestError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| RequestError::ImageRead {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image.bin")
            .to_string();
        Ok(Self::new(file_name, bytes))
    }
}

/// Request contract of the events backend.
#[async_trait]
pub trait EventsApi: Send + Sync {
    async fn list_events(&self, query: &ListEventsQuery) -> Result<EventPage, RequestError>;
    async fn create_event(
        &self,
        draft: &EventDraft,
        images: Vec<ImageUpload>,
    ) -> Result<Event, RequestError>;
    async fn update_event(
        &self,
        id: EventId,
        draft: &EventDraft,
        images: Vec<ImageUpload>,
    ) -> Result<Event, RequestError>;
    async fn delete_event(&self, id: EventId) -> Result<(), RequestError>;
}

pub struct HttpEventsClient {
    http: Client,
    base_url: Url,
}

impl HttpEventsClient {
    pub fn new(base_url: &str) -> Result<Self, RequestError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, RequestError> {
        let trimmed = base_url.trim();
        let base_url = Url::parse(trimmed).map_err(|err| RequestError::InvalidBaseUrl {
            url: trimmed.to_string(),
            reason: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(RequestError::InvalidBaseUrl {
                url: trimmed.to_string(),
                reason: "expected an http(s) URL".to_string(),
            });
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn build_form(
        operation: EventOperation,
        draft: &EventDraft,
        images: Vec<ImageUpload>,
    ) -> Result<Form, RequestError> {
        let mut form = Form::new();
        for (name, value) in draft.form_fields() {
            form = form.text(name, value);
        }
        for image in images {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.mime_type)
                .map_err(|source| RequestError::Transport { operation, source })?;
            form = form.part("images", part);
        }
        Ok(form)
    }

    async fn send_form(
        &self,
        operation: EventOperation,
        request: reqwest::RequestBuilder,
        draft: &EventDraft,
        images: Vec<ImageUpload>,
    ) -> Result<Event, RequestError> {
        let form = Self::build_form(operation, draft, images)?;
        let response = request
            .multipart(form)
            .send()
            .await
            .map_err(|source| RequestError::Transport { operation, source })?;
        let response = ensure_success(operation, response)?;
        response
            .json::<Event>()
            .await
            .map_err(|source| RequestError::Decode { operation, source })
    }
}

fn ensure_success(operation: EventOperation, response: Response) -> Result<Response, RequestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    warn!(operation = operation.name(), %status, "events backend rejected request");
    Err(RequestError::Status { operation, status })
}

#[async_trait]
impl EventsApi for HttpEventsClient {
    async fn list_events(&self, query: &ListEventsQuery) -> Result<EventPage, RequestError> {
        let operation = EventOperation::List;
        debug!(
            page = query.page,
            limit = query.limit,
            sort_by = query.sort_by.as_query_value(),
            order = query.order.as_query_value(),
            "events: list"
        );
        let response = self
            .http
            .get(self.endpoint(&["events"]))
            .query(query)
            .send()
            .await
            .map_err(|source| RequestError::Transport { operation, source })?;
        let response = ensure_success(operation, response)?;
        response
            .json::<EventPage>()
            .await
            .map_err(|source| RequestError::Decode { operation, source })
    }

    async fn create_event(
        &self,
        draft: &EventDraft,
        images: Vec<ImageUpload>,
    ) -> Result<Event, RequestError> {
        info!(image_count = images.len(), "events: create");
        let request = self.http.post(self.endpoint(&["events"]));
        self.send_form(EventOperation::Create, request, draft, images)
            .await
    }

    async fn update_event(
        &self,
        id: EventId,
        draft: &EventDraft,
        images: Vec<ImageUpload>,
    ) -> Result<Event, RequestError> {
        info!(event_id = id.0, image_count = images.len(), "events: update");
        let request = self
            .http
            .put(self.endpoint(&["events", &id.0.to_string()]));
        self.send_form(EventOperation::Update, request, draft, images)
            .await
    }

    async fn delete_event(&self, id: EventId) -> Result<(), RequestError> {
        let operation = EventOperation::Delete;
        info!(event_id = id.0, "events: delete");
        let response = self
            .http
            .delete(self.endpoint(&["events", &id.0.to_string()]))
            .send()
            .await
            .map_err(|source| RequestError::Transport { operation, source })?;
        ensure_success(operation, response)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
