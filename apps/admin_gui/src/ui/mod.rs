//! UI layer for the event admin: list page, filter bar, and create/edit form window.

pub mod app;

pub use app::{EventAdminApp, PersistedListSettings, SETTINGS_STORAGE_KEY};
