//! Form visibility and save routing for the events page.

use shared::{
    domain::EventId,
    protocol::{Event, EventDraft},
};

use super::{
    events::UiError,
    form::{PendingImage, RecordForm, SaveIntent},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Closed,
    CreatingNew,
    EditingExisting(Event),
}

impl FormMode {
    pub fn is_open(&self) -> bool {
        !matches!(self, FormMode::Closed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveRequest {
    Create {
        session: u64,
        draft: EventDraft,
        images: Vec<PendingImage>,
    },
    Update {
        session: u64,
        id: EventId,
        draft: EventDraft,
        images: Vec<PendingImage>,
    },
}

impl SaveRequest {
    pub fn session(&self) -> u64 {
        match self {
            SaveRequest::Create { session, .. } | SaveRequest::Update { session, .. } => *session,
        }
    }
}

/// What the page must do after a save result has been folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorEffect {
    RefreshList,
    ReportFailure,
    Ignore,
}

/// Owns the form state machine. Every open starts a new session so that
/// results of an abandoned save can be told apart from the live one.
pub struct PageCoordinator {
    mode: FormMode,
    form: RecordForm,
    session: u64,
    saving: bool,
    save_error: Option<UiError>,
}

impl Default for PageCoordinator {
    fn default() -> Self {
        Self {
            mode: FormMode::Closed,
            form: RecordForm::default(),
            session: 0,
            saving: false,
            save_error: None,
        }
    }
}

impl PageCoordinator {
    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn form(&self) -> &RecordForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RecordForm {
        &mut self.form
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn save_error(&self) -> Option<&UiError> {
        self.save_error.as_ref()
    }

    pub fn open_create(&mut self) -> bool {
        self.open(FormMode::CreatingNew)
    }

    pub fn open_edit(&mut self, record: Event) -> bool {
        self.open(FormMode::EditingExisting(record))
    }

    fn open(&mut self, mode: FormMode) -> bool {
        if self.mode.is_open() {
            tracing::debug!(?mode, "form already open; ignoring");
            return false;
        }
        let record = match &mode {
            FormMode::EditingExisting(event) => Some(event),
            _ => None,
        };
        self.form.initialize(record);
        self.session += 1;
        self.saving = false;
        self.save_error = None;
        tracing::debug!(session = self.session, event_id = ?record.map(|e| e.id), "form opened");
        self.mode = mode;
        true
    }

    pub fn cancel(&mut self) {
        if !self.mode.is_open() {
            return;
        }
        tracing::debug!(session = self.session, "form cancelled");
        self.close();
    }

    fn close(&mut self) {
        self.mode = FormMode::Closed;
        self.session += 1;
        self.saving = false;
        self.save_error = None;
    }

    /// Validates the form and, when it passes, turns it into a request.
    pub fn submit(&mut self) -> Option<SaveRequest> {
        if !self.mode.is_open() || self.saving {
            return None;
        }
        let intent = self.form.submit().ok()?;
        self.on_save_intent(intent)
    }

    /// The selected record decides between Update and Create.
    pub fn on_save_intent(&mut self, intent: SaveIntent) -> Option<SaveRequest> {
        let session = self.session;
        let SaveIntent { buffer, images } = intent;
        let request = match &self.mode {
            FormMode::Closed => return None,
            FormMode::EditingExisting(record) => SaveRequest::Update {
                session,
                id: record.id,
                draft: buffer.draft,
                images,
            },
            FormMode::CreatingNew => SaveRequest::Create {
                session,
                draft: buffer.draft,
                images,
            },
        };
        self.saving = true;
        self.save_error = None;
        Some(request)
    }

    pub fn on_save_succeeded(&mut self, session: u64, event: &Event) -> CoordinatorEffect {
        if session == self.session {
            tracing::info!(session, event_id = %event.id, "event saved");
            self.close();
        } else {
            tracing::warn!(session, current = self.session, event_id = %event.id, "save finished for a closed form");
        }
        CoordinatorEffect::RefreshList
    }

    /// The buffer is left exactly as entered so the user can retry.
    pub fn on_save_failed(&mut self, session: u64, error: &UiError) -> CoordinatorEffect {
        if session != self.session {
            tracing::warn!(session, current = self.session, "dropping save failure for a closed form");
            return CoordinatorEffect::Ignore;
        }
        self.saving = false;
        self.save_error = Some(error.clone());
        CoordinatorEffect::ReportFailure
    }
}
