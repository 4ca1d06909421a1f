//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{EventsApi, ImageUpload, RequestError};
use crossbeam_channel::{Receiver, Sender};
use futures::future::try_join_all;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiErrorContext, UiEvent},
    form::PendingImage,
};

/// Starts the backend worker thread. It owns a tokio runtime and serves
/// commands until every `cmd_rx` sender is dropped.
pub fn launch(
    api: Arc<dyn EventsApi>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        emit(&ui_tx, UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                emit(
                    &ui_tx,
                    UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: failed to build runtime: {err}"),
                    )),
                );
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            emit(&ui_tx, UiEvent::Info("Backend worker ready".to_string()));
            let mut tasks = tokio::task::JoinSet::new();
            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend received command");
                tasks.spawn(run_command(Arc::clone(&api), cmd, ui_tx.clone()));
                while tasks.try_join_next().is_some() {}
            }
            while tasks.join_next().await.is_some() {}
            tracing::info!("backend command queue closed; worker exiting");
        });
    })
}

async fn run_command(api: Arc<dyn EventsApi>, cmd: BackendCommand, ui_tx: Sender<UiEvent>) {
    let event = match cmd {
        BackendCommand::ListEvents { seq, query } => {
            tracing::info!(seq, page = query.page, limit = query.limit, "listing events");
            match api.list_events(&query).await {
                Ok(page) => UiEvent::EventsLoaded { seq, page },
                Err(err) => {
                    tracing::error!(seq, error = %err, "list events failed");
                    UiEvent::EventsLoadFailed {
                        seq,
                        error: UiError::from_request_error(UiErrorContext::ListEvents, &err),
                    }
                }
            }
        }
        BackendCommand::CreateEvent {
            session,
            draft,
            images,
        } => {
            tracing::info!(session, images = images.len(), "creating event");
            let result = match load_images(&images).await {
                Ok(uploads) => api.create_event(&draft, uploads).await,
                Err(err) => Err(err),
            };
            save_outcome(session, result)
        }
        BackendCommand::UpdateEvent {
            session,
            id,
            draft,
            images,
        } => {
            tracing::info!(session, event_id = %id, images = images.len(), "updating event");
            let result = match load_images(&images).await {
                Ok(uploads) => api.update_event(id, &draft, uploads).await,
                Err(err) => Err(err),
            };
            save_outcome(session, result)
        }
        BackendCommand::DeleteEvent { id } => {
            tracing::info!(event_id = %id, "deleting event");
            match api.delete_event(id).await {
                Ok(()) => UiEvent::EventDeleted { id },
                Err(err) => {
                    tracing::error!(event_id = %id, error = %err, "delete event failed");
                    UiEvent::EventDeleteFailed {
                        id,
                        error: UiError::from_request_error(UiErrorContext::DeleteEvent, &err),
                    }
                }
            }
        }
    };
    emit(&ui_tx, event);
}

async fn load_images(images: &[PendingImage]) -> Result<Vec<ImageUpload>, RequestError> {
    try_join_all(images.iter().map(|image| ImageUpload::load(&image.path))).await
}

fn save_outcome(
    session: u64,
    result: Result<shared::protocol::Event, RequestError>,
) -> UiEvent {
    match result {
        Ok(event) => UiEvent::EventSaved { session, event },
        Err(err) => {
            tracing::error!(session, error = %err, "save event failed");
            UiEvent::EventSaveFailed {
                session,
                error: UiError::from_request_error(UiErrorContext::SaveEvent, &err),
            }
        }
    }
}

fn emit(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if let Err(err) = ui_tx.try_send(event) {
        tracing::warn!("dropping backend->ui event: {err}");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use client_core::InMemoryEventsApi;
    use crossbeam_channel::bounded;
    use shared::{
        domain::EventId,
        protocol::{EventDraft, ListEventsQuery},
    };

    use super::*;
    use crate::controller::events::UiErrorCategory;

    const WAIT: Duration = Duration::from_secs(5);

    struct Harness {
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        worker: thread::JoinHandle<()>,
    }

    impl Harness {
        fn start(api: Arc<dyn EventsApi>) -> Self {
            let (cmd_tx, cmd_rx) = bounded(16);
            let (ui_tx, ui_rx) = bounded(64);
            let worker = launch(api, cmd_rx, ui_tx);
            Self {
                cmd_tx,
                ui_rx,
                worker,
            }
        }

        fn send(&self, cmd: BackendCommand) {
            self.cmd_tx.send(cmd).expect("worker alive");
        }

        /// Next event that is not an informational status line.
        fn next(&self) -> UiEvent {
            loop {
                match self.ui_rx.recv_timeout(WAIT).expect("backend event") {
                    UiEvent::Info(_) => continue,
                    event => return event,
                }
            }
        }

        fn shutdown(self) {
            drop(self.cmd_tx);
            self.worker.join().expect("worker thread");
        }
    }

    fn draft() -> EventDraft {
        EventDraft {
            title: "Launch".into(),
            description: "Kickoff".into(),
            start_date: "2024-01-01".into(),
            end_date: "2024-01-02".into(),
            total_guests: 5,
        }
    }

    #[test]
    fn create_then_list_round_trips_through_worker() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cover.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).expect("write image");

        let harness = Harness::start(Arc::new(InMemoryEventsApi::new()));
        harness.send(BackendCommand::CreateEvent {
            session: 4,
            draft: draft(),
            images: vec![PendingImage::new(path)],
        });
        match harness.next() {
            UiEvent::EventSaved { session, event } => {
                assert_eq!(session, 4);
                assert_eq!(event.title, "Launch");
            }
            _ => panic!("expected saved event"),
        }

        harness.send(BackendCommand::ListEvents {
            seq: 1,
            query: ListEventsQuery::default(),
        });
        match harness.next() {
            UiEvent::EventsLoaded { seq, page } => {
                assert_eq!(seq, 1);
                assert_eq!(page.total, 1);
                assert_eq!(page.events[0].total_guests, 5);
                assert_eq!(page.events[0].images.len(), 1);
            }
            _ => panic!("expected loaded page"),
        }
        harness.shutdown();
    }

    #[test]
    fn unreadable_image_fails_save_without_reaching_backend() {
        let api = Arc::new(InMemoryEventsApi::new());
        let harness = Harness::start(api.clone());
        harness.send(BackendCommand::CreateEvent {
            session: 1,
            draft: draft(),
            images: vec![PendingImage::new("/definitely/missing/cover.png".into())],
        });

        match harness.next() {
            UiEvent::EventSaveFailed { session, error } => {
                assert_eq!(session, 1);
                assert_eq!(error.context(), UiErrorContext::SaveEvent);
                assert_eq!(error.category(), UiErrorCategory::Validation);
            }
            _ => panic!("expected save failure"),
        }
        harness.shutdown();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        assert!(runtime.block_on(api.is_empty()));
    }

    #[test]
    fn deleting_missing_event_reports_not_found() {
        let harness = Harness::start(Arc::new(InMemoryEventsApi::new()));
        harness.send(BackendCommand::DeleteEvent { id: EventId(42) });

        match harness.next() {
            UiEvent::EventDeleteFailed { id, error } => {
                assert_eq!(id, EventId(42));
                assert_eq!(error.category(), UiErrorCategory::NotFound);
                assert!(error.message().starts_with("Failed to delete event"));
            }
            _ => panic!("expected delete failure"),
        }
        harness.shutdown();
    }
}
