use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const API_URL_ENV: &str = "EVENT_ADMIN_API_URL";
pub const PAGE_SIZE_ENV: &str = "EVENT_ADMIN_PAGE_SIZE";

#[derive(Parser, Debug, Default)]
#[command(name = "event-admin", about = "Desktop admin for the events backend")]
pub struct Args {
    /// Base URL of the events backend.
    #[arg(long)]
    pub api_url: Option<String>,
    /// Rows per page for the event list.
    #[arg(long)]
    pub page_size: Option<u32>,
    /// TOML config file; defaults to `<config dir>/event_admin/config.toml`.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Run against a seeded in-memory backend instead of HTTP.
    #[arg(long)]
    pub demo: bool,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    pub api_url: String,
    pub page_size: u32,
    pub demo: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            demo: false,
        }
    }
}

pub fn resolve_startup_config(args: Args) -> anyhow::Result<StartupConfig> {
    let file = match &args.config {
        Some(path) => Some(load_file_config(path)?),
        None => match default_config_path() {
            Some(path) if path.exists() => Some(load_file_config(&path)?),
            _ => None,
        },
    };
    resolve_with(args, |name| std::env::var(name).ok(), file)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("event_admin").join("config.toml"))
}

fn load_file_config(path: &Path) -> anyhow::Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

/// Flags win over the environment, which wins over the file.
pub fn resolve_with(
    args: Args,
    env: impl Fn(&str) -> Option<String>,
    file: Option<FileConfig>,
) -> anyhow::Result<StartupConfig> {
    let file = file.unwrap_or_default();
    let env_value = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    let api_url = args
        .api_url
        .or_else(|| env_value(API_URL_ENV))
        .or(file.api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let env_page_size = env_value(PAGE_SIZE_ENV)
        .map(|raw| {
            raw.trim()
                .parse::<u32>()
                .with_context(|| format!("{PAGE_SIZE_ENV} must be a positive integer, got '{raw}'"))
        })
        .transpose()?;
    let page_size = args
        .page_size
        .or(env_page_size)
        .or(file.page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE);
    anyhow::ensure!(page_size > 0, "page size must be greater than zero");

    Ok(StartupConfig {
        api_url: api_url.trim().to_string(),
        page_size,
        demo: args.demo,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = resolve_with(Args::default(), env_of(&[]), None).unwrap();
        assert_eq!(cfg, StartupConfig::default());
    }

    #[test]
    fn flags_beat_env_and_env_beats_file() {
        let file = FileConfig {
            api_url: Some("http://file:1".into()),
            page_size: Some(50),
        };
        let env = env_of(&[(API_URL_ENV, "http://env:2"), (PAGE_SIZE_ENV, "25")]);

        let cfg = resolve_with(Args::default(), &env, Some(file)).unwrap();
        assert_eq!(cfg.api_url, "http://env:2");
        assert_eq!(cfg.page_size, 25);

        let args = Args {
            api_url: Some("http://flag:3".into()),
            page_size: Some(10),
            ..Args::default()
        };
        let cfg = resolve_with(args, &env, None).unwrap();
        assert_eq!(cfg.api_url, "http://flag:3");
        assert_eq!(cfg.page_size, 10);
    }

    #[test]
    fn file_fills_gaps_and_blank_env_is_ignored() {
        let file = FileConfig {
            api_url: Some("http://file:1".into()),
            page_size: None,
        };
        let cfg = resolve_with(Args::default(), env_of(&[(API_URL_ENV, "  ")]), Some(file)).unwrap();
        assert_eq!(cfg.api_url, "http://file:1");
        assert_eq!(cfg.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn rejects_bad_page_sizes() {
        assert!(resolve_with(Args::default(), env_of(&[(PAGE_SIZE_ENV, "lots")]), None).is_err());
        let args = Args {
            page_size: Some(0),
            ..Args::default()
        };
        assert!(resolve_with(args, env_of(&[]), None).is_err());
    }

    #[test]
    fn reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_url = \"http://events.internal:8080\"\npage_size = 25\n").unwrap();

        let file = load_file_config(&path).unwrap();
        assert_eq!(file.page_size, Some(25));
        assert_eq!(file.api_url.as_deref(), Some("http://events.internal:8080"));

        let cfg = resolve_with(
            Args {
                demo: true,
                ..Args::default()
            },
            env_of(&[]),
            Some(file),
        )
        .unwrap();
        assert_eq!(cfg.api_url, "http://events.internal:8080");
        assert_eq!(cfg.page_size, 25);
        assert!(cfg.demo);
    }

    #[test]
    fn missing_explicit_config_file_is_an_error() {
        let args = Args {
            config: Some(PathBuf::from("/nonexistent/event_admin.toml")),
            ..Args::default()
        };
        assert!(resolve_startup_config(args).is_err());
    }
}
