//! Edit buffer and local validation for the create/edit form.

use std::path::PathBuf;

use shared::{
    domain::EventId,
    error::ValidationError,
    protocol::{Event, EventDraft},
    validation::{validate_draft, Violation},
};

/// A file picked for upload, read from disk only when the save runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub path: PathBuf,
    pub file_name: String,
}

impl PendingImage {
    pub fn new(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Self { path, file_name }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Title(String),
    Description(String),
    StartDate(String),
    EndDate(String),
    TotalGuests(i64),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    pub id: Option<EventId>,
    pub draft: EventDraft,
    pub stored_images: Vec<String>,
}

impl EditBuffer {
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: Some(event.id),
            draft: EventDraft::from_event(event),
            stored_images: event.images.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveIntent {
    pub buffer: EditBuffer,
    pub images: Vec<PendingImage>,
}

#[derive(Debug, Default)]
pub struct RecordForm {
    buffer: EditBuffer,
    pending_images: Vec<PendingImage>,
    violations: Vec<Violation>,
}

impl RecordForm {
    pub fn initialize(&mut self, record: Option<&Event>) {
        self.buffer = record.map(EditBuffer::from_event).unwrap_or_default();
        self.pending_images.clear();
        self.violations.clear();
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn pending_images(&self) -> &[PendingImage] {
        &self.pending_images
    }

    /// Violations found by the last `submit`.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn set_field(&mut self, update: FieldUpdate) {
        let draft = &mut self.buffer.draft;
        match update {
            FieldUpdate::Title(value) => draft.title = value,
            FieldUpdate::Description(value) => draft.description = value,
            FieldUpdate::StartDate(value) => draft.start_date = value,
            FieldUpdate::EndDate(value) => draft.end_date = value,
            FieldUpdate::TotalGuests(value) => draft.total_guests = value,
        }
    }

    pub fn set_images(&mut self, images: Vec<PendingImage>) {
        self.pending_images = images;
    }

    pub fn validate(&self) -> Vec<Violation> {
        validate_draft(
            &self.buffer.draft,
            self.pending_images.len(),
            self.buffer.stored_images.len(),
        )
    }

    pub fn submit(&mut self) -> Result<SaveIntent, ValidationError> {
        self.violations = self.validate();
        if !self.violations.is_empty() {
            tracing::debug!(
                violations = self.violations.len(),
                event_id = ?self.buffer.id,
                "form submission rejected locally"
            );
            return Err(ValidationError::new(self.violations.clone()));
        }
        Ok(SaveIntent {
            buffer: self.buffer.clone(),
            images: self.pending_images.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn filled_form() -> RecordForm {
        let mut form = RecordForm::default();
        form.initialize(None);
        form.set_field(FieldUpdate::Title("Launch".into()));
        form.set_field(FieldUpdate::Description("Kickoff".into()));
        form.set_field(FieldUpdate::StartDate("2024-01-01".into()));
        form.set_field(FieldUpdate::EndDate("2024-01-02".into()));
        form.set_field(FieldUpdate::TotalGuests(5));
        form.set_images(vec![PendingImage::new(PathBuf::from("/tmp/cover.png"))]);
        form
    }

    fn stored_event() -> Event {
        Event {
            id: EventId(7),
            title: "Meetup".into(),
            description: "Monthly".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            total_guests: 40,
            images: vec!["uploads/meetup.png".into()],
        }
    }

    #[test]
    fn empty_form_reports_every_violation_in_order() {
        let mut form = RecordForm::default();
        form.initialize(None);
        assert_eq!(
            form.validate(),
            vec![
                Violation::TitleRequired,
                Violation::DescriptionRequired,
                Violation::StartDateRequired,
                Violation::EndDateRequired,
                Violation::GuestsNotPositive,
                Violation::ImageRequired,
            ]
        );
    }

    #[test]
    fn end_before_start_blocks_submit() {
        let mut form = filled_form();
        form.set_field(FieldUpdate::StartDate("2024-05-10".into()));
        form.set_field(FieldUpdate::EndDate("2024-05-01".into()));

        let err = form.submit().expect_err("dates out of order");
        assert_eq!(err.violations, vec![Violation::EndBeforeStart]);
        assert_eq!(form.violations(), [Violation::EndBeforeStart]);
    }

    #[test]
    fn validate_does_not_mutate() {
        let form = filled_form();
        let before = form.buffer().clone();
        assert_eq!(form.validate(), form.validate());
        assert_eq!(form.buffer(), &before);
        assert!(form.violations().is_empty());
    }

    #[test]
    fn whitespace_counts_as_missing() {
        let mut form = filled_form();
        form.set_field(FieldUpdate::Title("   ".into()));
        form.set_field(FieldUpdate::Description("\t".into()));
        assert_eq!(
            form.validate(),
            vec![Violation::TitleRequired, Violation::DescriptionRequired]
        );
    }

    #[test]
    fn valid_form_emits_intent_with_buffer_and_images() {
        let mut form = filled_form();
        let intent = form.submit().expect("valid");
        assert_eq!(intent.buffer.id, None);
        assert_eq!(intent.buffer.draft.title, "Launch");
        assert_eq!(intent.buffer.draft.total_guests, 5);
        assert_eq!(intent.images.len(), 1);
        assert_eq!(intent.images[0].file_name, "cover.png");
    }

    #[test]
    fn editing_record_with_stored_images_needs_no_new_upload() {
        let mut form = RecordForm::default();
        form.initialize(Some(&stored_event()));
        assert_eq!(form.buffer().draft.start_date, "2024-03-01");
        assert!(form.validate().is_empty());

        let intent = form.submit().expect("stored image satisfies requirement");
        assert_eq!(intent.buffer.id, Some(EventId(7)));
        assert!(intent.images.is_empty());
    }

    #[test]
    fn set_images_replaces_selection() {
        let mut form = filled_form();
        form.set_images(vec![
            PendingImage::new(PathBuf::from("a.png")),
            PendingImage::new(PathBuf::from("b.png")),
        ]);
        assert_eq!(form.pending_images().len(), 2);
        form.set_images(Vec::new());
        assert_eq!(form.validate(), vec![Violation::ImageRequired]);
    }

    #[test]
    fn initialize_discards_previous_state() {
        let mut form = filled_form();
        let _ = form.submit();
        form.initialize(None);
        assert_eq!(form.buffer(), &EditBuffer::default());
        assert!(form.pending_images().is_empty());
        assert!(form.violations().is_empty());
    }
}
