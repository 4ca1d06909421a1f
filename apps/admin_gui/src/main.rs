use std::sync::Arc;

mod backend_bridge;
mod config;
mod controller;
mod ui;

use anyhow::Context;
use clap::Parser;
use client_core::{EventsApi, HttpEventsClient, InMemoryEventsApi};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{EventAdminApp, PersistedListSettings, SETTINGS_STORAGE_KEY};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let startup = config::resolve_startup_config(config::Args::parse())?;
    let api: Arc<dyn EventsApi> = if startup.demo {
        tracing::info!("using in-memory demo backend");
        Arc::new(InMemoryEventsApi::with_sample_events())
    } else {
        tracing::info!(api_url = %startup.api_url, "using HTTP events backend");
        Arc::new(
            HttpEventsClient::new(&startup.api_url)
                .with_context(|| format!("cannot use backend URL '{}'", startup.api_url))?,
        )
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let _worker = backend_bridge::runtime::launch(api, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Event Admin")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([760.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Event Admin",
        options,
        Box::new(move |cc| {
            let persisted = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedListSettings>(&text).ok())
            });
            Ok(Box::new(EventAdminApp::new(cmd_tx, ui_rx, &startup, persisted)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("event admin window failed: {err}"))
}
