use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{EventId, SortField, SortOrder},
    protocol::{Event, DATE_FORMAT},
};

use crate::backend_bridge::commands::BackendCommand;
use crate::config::StartupConfig;
use crate::controller::{
    events::{UiError, UiErrorCategory, UiErrorContext, UiEvent},
    form::{FieldUpdate, PendingImage},
    orchestration::dispatch_backend_command,
    page::{CoordinatorEffect, FormMode, PageCoordinator, SaveRequest},
    query::{FetchOutcome, FetchRequest, QueryController, QueryState},
};

pub const SETTINGS_STORAGE_KEY: &str = "event_admin.list_settings";
const PAGE_SIZE_CHOICES: [u32; 3] = [10, 25, 50];
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];
const DESCRIPTION_PREVIEW_CHARS: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

impl StatusBanner {
    fn from_error(err: &UiError) -> Self {
        let severity = match err.category() {
            UiErrorCategory::NotFound | UiErrorCategory::Validation => StatusBannerSeverity::Warning,
            _ => StatusBannerSeverity::Error,
        };
        Self {
            severity,
            message: format!("{}: {}", err_label(err.category()), err.banner_text()),
        }
    }
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Connection",
        UiErrorCategory::Validation => "Rejected",
        UiErrorCategory::NotFound => "Not found",
        UiErrorCategory::Server => "Server",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

/// List preferences restored across launches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedListSettings {
    pub page_size: u32,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl Default for PersistedListSettings {
    fn default() -> Self {
        let state = QueryState::default();
        Self {
            page_size: state.page_size,
            sort_field: state.sort_field,
            sort_order: state.sort_order,
        }
    }
}

impl PersistedListSettings {
    fn from_state(state: &QueryState) -> Self {
        Self {
            page_size: state.page_size,
            sort_field: state.sort_field,
            sort_order: state.sort_order,
        }
    }
}

fn initial_query_state(
    startup: &StartupConfig,
    persisted: Option<PersistedListSettings>,
) -> QueryState {
    let mut state = QueryState {
        page_size: startup.page_size,
        ..QueryState::default()
    };
    if let Some(settings) = persisted {
        if settings.page_size > 0 {
            state.page_size = settings.page_size;
        }
        state.sort_field = settings.sort_field;
        state.sort_order = settings.sort_order;
    }
    state
}

fn page_label(page: u32, total_pages: u32) -> String {
    format!("Page {page} of {}", total_pages.max(1))
}

/// First line of the description, cut to fit a grid cell.
fn description_preview(description: &str) -> String {
    let line = description.lines().next().unwrap_or_default().trim();
    let multi_line = description.trim().lines().nth(1).is_some();
    if line.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        let cut: String = line.chars().take(DESCRIPTION_PREVIEW_CHARS - 1).collect();
        format!("{}…", cut.trim_end())
    } else if multi_line {
        format!("{line}…")
    } else {
        line.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowButtons {
    edit: bool,
    delete: bool,
}

/// Row actions stay locked while the form window is open.
fn row_buttons(form_open: bool, deleting: bool) -> RowButtons {
    RowButtons {
        edit: !form_open,
        delete: !form_open && !deleting,
    }
}

fn unreadable_filter_warning(bounds: &[&str]) -> Option<String> {
    let labels: Vec<&str> = bounds
        .iter()
        .map(|bound| match *bound {
            "start" => "From",
            _ => "To",
        })
        .collect();
    (!labels.is_empty()).then(|| {
        format!(
            "Ignoring unreadable date filter ({}); expected YYYY-MM-DD",
            labels.join(", ")
        )
    })
}

#[derive(Default)]
struct FilterInputs {
    title: String,
    start_date: String,
    end_date: String,
}

enum RowAction {
    Edit(Event),
    Delete(EventId),
}

pub struct EventAdminApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    query: QueryController,
    page: PageCoordinator,
    filters: FilterInputs,
    backend_label: String,
    status: String,
    status_banner: Option<StatusBanner>,
}

impl EventAdminApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: &StartupConfig,
        persisted: Option<PersistedListSettings>,
    ) -> Self {
        let backend_label = if startup.demo {
            "in-memory demo backend".to_string()
        } else {
            startup.api_url.clone()
        };
        let mut app = Self {
            cmd_tx,
            ui_rx,
            query: QueryController::new(initial_query_state(startup, persisted)),
            page: PageCoordinator::default(),
            filters: FilterInputs::default(),
            backend_label,
            status: "Starting".to_string(),
            status_banner: None,
        };
        let first = app.query.fetch();
        app.dispatch_fetch(first);
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) -> bool {
        let queued = dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
        if !queued {
            self.status_banner = Some(StatusBanner::from_error(&UiError::from_message(
                UiErrorContext::General,
                self.status.clone(),
            )));
        }
        queued
    }

    fn dispatch_fetch(&mut self, request: FetchRequest) {
        let seq = request.seq;
        if !self.dispatch(request.into()) {
            self.query.on_fetch_failed(seq);
        }
    }

    fn dispatch_save(&mut self, request: SaveRequest) {
        let session = request.session();
        if !self.dispatch(request.into()) {
            let err = UiError::from_message(UiErrorContext::SaveEvent, self.status.clone());
            self.page.on_save_failed(session, &err);
        }
    }

    fn dispatch_delete(&mut self, id: EventId) {
        let Some(id) = self.query.delete(id) else {
            return;
        };
        if !self.dispatch(BackendCommand::DeleteEvent { id }) {
            self.query.on_delete_failed(id);
        }
    }

    fn report(&mut self, err: &UiError) {
        self.status = err.message().to_string();
        self.status_banner = Some(StatusBanner::from_error(err));
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::EventsLoaded { seq, page } => {
                    let shown = page.events.len();
                    let total = page.total;
                    match self.query.on_fetch_succeeded(seq, page) {
                        FetchOutcome::Applied => {
                            self.status = format!("Showing {shown} of {total} events");
                        }
                        FetchOutcome::Stale => {}
                        FetchOutcome::Refetch(request) => self.dispatch_fetch(request),
                    }
                }
                UiEvent::EventsLoadFailed { seq, error } => {
                    if self.query.on_fetch_failed(seq) {
                        self.report(&error);
                    }
                }
                UiEvent::EventSaved { session, event } => {
                    if self.page.on_save_succeeded(session, &event) == CoordinatorEffect::RefreshList {
                        self.status = format!("Saved \"{}\"", event.title);
                        let request = self.query.fetch();
                        self.dispatch_fetch(request);
                    }
                }
                UiEvent::EventSaveFailed { session, error } => {
                    if self.page.on_save_failed(session, &error) == CoordinatorEffect::ReportFailure {
                        self.report(&error);
                    }
                }
                UiEvent::EventDeleted { id } => {
                    self.status = format!("Deleted event {id}");
                    let request = self.query.on_delete_succeeded(id);
                    self.dispatch_fetch(request);
                }
                UiEvent::EventDeleteFailed { id, error } => {
                    self.report(&error);
                    if error.category() == UiErrorCategory::NotFound {
                        // Already gone on the backend: drop the row like a delete.
                        let request = self.query.on_delete_succeeded(id);
                        self.dispatch_fetch(request);
                    } else {
                        self.query.on_delete_failed(id);
                    }
                }
                UiEvent::Error(err) => {
                    tracing::error!(context = ?err.context(), "{}", err.message());
                    self.report(&err);
                }
            }
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Error => (
                    egui::Color32::from_rgb(111, 53, 53),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
                ),
                StatusBannerSeverity::Warning => (
                    egui::Color32::from_rgb(104, 84, 40),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(170, 140, 70)),
                ),
            };

            egui::Frame::NONE
                .fill(fill)
                .stroke(stroke)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
            ui.add_space(6.0);
        }
    }

    fn show_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Events");
            ui.label(egui::RichText::new(&self.backend_label).weak());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(!self.page.mode().is_open(), egui::Button::new("New event"))
                    .clicked()
                {
                    self.page.open_create();
                }
            });
        });
    }

    fn show_filter_bar(&mut self, ui: &mut egui::Ui) {
        let mut apply = false;
        let mut clear = false;
        ui.horizontal_wrapped(|ui| {
            let mut submitted = false;
            ui.label("Title");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.filters.title)
                    .id_salt("filter_title")
                    .hint_text("contains…")
                    .desired_width(180.0),
            );
            submitted |= response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            ui.label("From");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.filters.start_date)
                    .id_salt("filter_start_date")
                    .hint_text("YYYY-MM-DD")
                    .desired_width(100.0),
            );
            submitted |= response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            ui.label("To");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.filters.end_date)
                    .id_salt("filter_end_date")
                    .hint_text("YYYY-MM-DD")
                    .desired_width(100.0),
            );
            submitted |= response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            apply = ui.button("Apply").clicked() || submitted;
            clear = ui.button("Clear").clicked();
        });

        if clear {
            self.filters = FilterInputs::default();
            self.apply_filters();
        } else if apply {
            self.apply_filters();
        }
    }

    fn apply_filters(&mut self) {
        self.query.set_filter(
            Some(&self.filters.title),
            Some(&self.filters.start_date),
            Some(&self.filters.end_date),
        );
        if let Some(message) = unreadable_filter_warning(&self.query.state().unreadable_date_filters()) {
            self.status = message.clone();
            self.status_banner = Some(StatusBanner {
                severity: StatusBannerSeverity::Warning,
                message,
            });
        }
        let request = self.query.apply_filter();
        self.dispatch_fetch(request);
    }

    fn sort_header(&self, ui: &mut egui::Ui, field: SortField) -> bool {
        let glyph = self.query.sort_indicator(field).glyph();
        let label = if glyph.is_empty() {
            field.label().to_string()
        } else {
            format!("{} {glyph}", field.label())
        };
        ui.add(egui::Button::new(egui::RichText::new(label).strong()).frame(false))
            .on_hover_text("Sort by this column")
            .clicked()
    }

    fn show_table(&mut self, ui: &mut egui::Ui) {
        let mut sort_by = None;
        let mut action = None;
        let form_open = self.page.mode().is_open();

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .max_height((ui.available_height() - 40.0).max(120.0))
            .show(ui, |ui| {
                egui::Grid::new("events_table")
                    .striped(true)
                    .num_columns(7)
                    .spacing([16.0, 6.0])
                    .show(ui, |ui| {
                        for field in SortField::ALL {
                            if self.sort_header(ui, field) {
                                sort_by = Some(field);
                            }
                        }
                        ui.strong("Description");
                        ui.strong("Guests");
                        ui.strong("Images");
                        ui.strong("");
                        ui.end_row();

                        for event in &self.query.results().events {
                            ui.label(&event.title);
                            ui.label(event.start_date.format(DATE_FORMAT).to_string());
                            ui.label(event.end_date.format(DATE_FORMAT).to_string());
                            ui.label(description_preview(&event.description))
                                .on_hover_text(&event.description);
                            ui.label(event.total_guests.to_string());
                            ui.label(event.images.len().to_string());
                            let buttons = row_buttons(form_open, self.query.is_deleting(event.id));
                            ui.horizontal(|ui| {
                                if ui.add_enabled(buttons.edit, egui::Button::new("Edit")).clicked() {
                                    action = Some(RowAction::Edit(event.clone()));
                                }
                                if ui
                                    .add_enabled(buttons.delete, egui::Button::new("Delete"))
                                    .clicked()
                                {
                                    action = Some(RowAction::Delete(event.id));
                                }
                            });
                            ui.end_row();
                        }
                    });

                if self.query.results().events.is_empty() && !self.query.is_loading() {
                    ui.add_space(12.0);
                    ui.label(egui::RichText::new("No events match the current filters.").weak());
                }
            });

        if let Some(field) = sort_by {
            let request = self.query.set_sort(field);
            self.dispatch_fetch(request);
        }
        match action {
            Some(RowAction::Edit(event)) => {
                self.page.open_edit(event);
            }
            Some(RowAction::Delete(id)) if !form_open => self.dispatch_delete(id),
            Some(RowAction::Delete(_)) => {}
            None => {}
        }
    }

    fn show_pagination(&mut self, ui: &mut egui::Ui) {
        let mut target_page = None;
        let mut page_size = self.query.state().page_size;

        ui.horizontal(|ui| {
            let page = self.query.state().page;
            if ui
                .add_enabled(self.query.can_go_previous(), egui::Button::new("Previous"))
                .clicked()
            {
                target_page = Some(page.saturating_sub(1));
            }
            ui.label(page_label(page, self.query.total_pages()));
            if ui
                .add_enabled(self.query.can_go_next(), egui::Button::new("Next"))
                .clicked()
            {
                target_page = Some(page + 1);
            }

            ui.separator();
            ui.label("Rows");
            egui::ComboBox::from_id_salt("page_size")
                .selected_text(page_size.to_string())
                .show_ui(ui, |ui| {
                    for choice in PAGE_SIZE_CHOICES {
                        ui.selectable_value(&mut page_size, choice, choice.to_string());
                    }
                });

            if self.query.is_loading() {
                ui.spinner();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(egui::RichText::new(&self.status).weak());
            });
        });

        if let Some(page) = target_page {
            if let Some(request) = self.query.set_page(page) {
                self.dispatch_fetch(request);
            }
        }
        if let Some(request) = self.query.set_page_size(page_size) {
            self.dispatch_fetch(request);
        }
    }

    fn show_form_window(&mut self, ctx: &egui::Context) {
        let title = match self.page.mode() {
            FormMode::Closed => return,
            FormMode::CreatingNew => "New event".to_string(),
            FormMode::EditingExisting(event) => format!("Edit \"{}\"", event.title),
        };

        let mut open = true;
        let mut submit = false;
        let mut cancel = false;
        let saving = self.page.is_saving();

        let buffer = self.page.form().buffer().clone();
        let mut draft = buffer.draft;
        let mut updates = Vec::new();
        let mut picked_images = None;

        egui::Window::new(title)
            .id(egui::Id::new("event_form_window"))
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                egui::Grid::new("event_form_fields")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Title");
                        if ui.text_edit_singleline(&mut draft.title).changed() {
                            updates.push(FieldUpdate::Title(draft.title.clone()));
                        }
                        ui.end_row();

                        ui.label("Description");
                        if ui
                            .add(egui::TextEdit::multiline(&mut draft.description).desired_rows(3))
                            .changed()
                        {
                            updates.push(FieldUpdate::Description(draft.description.clone()));
                        }
                        ui.end_row();

                        ui.label("Start date");
                        if ui
                            .add(egui::TextEdit::singleline(&mut draft.start_date).hint_text("YYYY-MM-DD"))
                            .changed()
                        {
                            updates.push(FieldUpdate::StartDate(draft.start_date.clone()));
                        }
                        ui.end_row();

                        ui.label("End date");
                        if ui
                            .add(egui::TextEdit::singleline(&mut draft.end_date).hint_text("YYYY-MM-DD"))
                            .changed()
                        {
                            updates.push(FieldUpdate::EndDate(draft.end_date.clone()));
                        }
                        ui.end_row();

                        ui.label("Total guests");
                        if ui
                            .add(egui::DragValue::new(&mut draft.total_guests).range(0..=1_000_000))
                            .changed()
                        {
                            updates.push(FieldUpdate::TotalGuests(draft.total_guests));
                        }
                        ui.end_row();

                        ui.label("Images");
                        ui.vertical(|ui| {
                            if !buffer.stored_images.is_empty() {
                                ui.label(
                                    egui::RichText::new(format!(
                                        "{} stored image(s); new ones are added alongside",
                                        buffer.stored_images.len()
                                    ))
                                    .weak(),
                                );
                            }
                            for image in self.page.form().pending_images() {
                                ui.label(&image.file_name);
                            }
                            if ui.button("Choose images…").clicked() {
                                picked_images = rfd::FileDialog::new()
                                    .add_filter("Images", &IMAGE_EXTENSIONS)
                                    .pick_files();
                            }
                        });
                        ui.end_row();
                    });

                let violations = self.page.form().violations();
                if !violations.is_empty() {
                    ui.add_space(6.0);
                    for violation in violations {
                        ui.colored_label(egui::Color32::from_rgb(220, 110, 110), violation.message());
                    }
                }
                if let Some(err) = self.page.save_error() {
                    ui.add_space(6.0);
                    ui.colored_label(egui::Color32::from_rgb(220, 110, 110), err.banner_text());
                }

                ui.separator();
                ui.horizontal(|ui| {
                    submit = ui.add_enabled(!saving, egui::Button::new("Save")).clicked();
                    cancel = ui.button("Cancel").clicked();
                    if saving {
                        ui.spinner();
                    }
                });
            });

        let form = self.page.form_mut();
        for update in updates {
            form.set_field(update);
        }
        if let Some(paths) = picked_images {
            form.set_images(paths.into_iter().map(PendingImage::new).collect());
        }

        if cancel || !open {
            self.page.cancel();
        } else if submit {
            if let Some(request) = self.page.submit() {
                self.dispatch_save(request);
            }
        }
    }
}

impl eframe::App for EventAdminApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_toolbar(ui);
            ui.add_space(4.0);
            self.show_status_banner(ui);
            self.show_filter_bar(ui);
            ui.separator();
            self.show_table(ui);
            ui.separator();
            self.show_pagination(ui);
        });
        self.show_form_window(ctx);

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedListSettings::from_state(self.query.state());
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}
