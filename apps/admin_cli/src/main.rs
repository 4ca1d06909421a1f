use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{EventsApi, HttpEventsClient, ImageUpload};
use futures::future::try_join_all;
use shared::{
    domain::{EventId, SortField, SortOrder},
    error::ValidationError,
    protocol::{parse_calendar_date, page_count, Event, EventDraft, ListEventsQuery, DATE_FORMAT},
    validation::validate_draft,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "event-admin-cli", about = "Script the events backend from a terminal")]
struct Cli {
    #[arg(long, env = "EVENT_ADMIN_API_URL", default_value = "http://127.0.0.1:3000")]
    api_url: String,
    /// Print raw JSON instead of a table.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value = "title", value_parser = parse_sort_field)]
        sort_by: SortField,
        #[arg(long, default_value = "asc", value_parser = parse_sort_order)]
        order: SortOrder,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_date)]
        from: Option<chrono::NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        to: Option<chrono::NaiveDate>,
    },
    Create {
        #[command(flatten)]
        fields: EventFields,
    },
    Update {
        id: i64,
        #[command(flatten)]
        fields: EventFields,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct EventFields {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    start_date: String,
    #[arg(long)]
    end_date: String,
    #[arg(long)]
    guests: i64,
    /// Image file to upload; repeat for several.
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

impl EventFields {
    fn draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            total_guests: self.guests,
        }
    }
}

fn parse_sort_field(raw: &str) -> Result<SortField, String> {
    SortField::from_query_value(raw).ok_or_else(|| format!("unknown sort field '{raw}'"))
}

fn parse_sort_order(raw: &str) -> Result<SortOrder, String> {
    SortOrder::from_query_value(raw).ok_or_else(|| format!("unknown sort order '{raw}'"))
}

fn parse_date(raw: &str) -> Result<chrono::NaiveDate, String> {
    parse_calendar_date(raw).ok_or_else(|| format!("expected YYYY-MM-DD, got '{raw}'"))
}

async fn load_images(paths: &[PathBuf]) -> Result<Vec<ImageUpload>> {
    Ok(try_join_all(paths.iter().map(|path| ImageUpload::load(path))).await?)
}

fn check_draft(draft: &EventDraft, images: usize, stored_images: usize) -> Result<()> {
    let violations = validate_draft(draft, images, stored_images);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(violations).into())
    }
}

fn print_events(events: &[Event]) {
    println!(
        "{:>6}  {:<32}  {:<10}  {:<10}  {:>6}  {:>6}",
        "ID", "TITLE", "START", "END", "GUESTS", "IMAGES"
    );
    for event in events {
        println!(
            "{:>6}  {:<32}  {:<10}  {:<10}  {:>6}  {:>6}",
            event.id.0,
            event.title,
            event.start_date.format(DATE_FORMAT),
            event.end_date.format(DATE_FORMAT),
            event.total_guests,
            event.images.len()
        );
    }
}

fn print_event(event: &Event, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(event)?);
    } else {
        print_events(std::slice::from_ref(event));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let client = HttpEventsClient::new(&cli.api_url)
        .with_context(|| format!("cannot use backend URL '{}'", cli.api_url))?;

    match cli.command {
        Command::List {
            page,
            limit,
            sort_by,
            order,
            title,
            from,
            to,
        } => {
            let query = ListEventsQuery {
                page,
                limit,
                sort_by,
                order,
                filter_name: title.filter(|t| !t.trim().is_empty()),
                filter_start_date: from,
                filter_end_date: to,
            };
            let result = client.list_events(&query).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_events(&result.events);
                println!(
                    "page {} of {} ({} events)",
                    page,
                    page_count(result.total, limit).max(1),
                    result.total
                );
            }
        }
        Command::Create { fields } => {
            let draft = fields.draft();
            check_draft(&draft, fields.images.len(), 0)?;
            let images = load_images(&fields.images).await?;
            let created = client.create_event(&draft, images).await?;
            tracing::info!(event_id = %created.id, "created event");
            print_event(&created, cli.json)?;
        }
        Command::Update { id, fields } => {
            let draft = fields.draft();
            // The record on the server keeps its stored images.
            check_draft(&draft, fields.images.len(), 1)?;
            let images = load_images(&fields.images).await?;
            let updated = client.update_event(EventId(id), &draft, images).await?;
            tracing::info!(event_id = %updated.id, "updated event");
            print_event(&updated, cli.json)?;
        }
        Command::Delete { id } => {
            client.delete_event(EventId(id)).await?;
            println!("deleted event {id}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_arguments() {
        let cli = Cli::try_parse_from([
            "event-admin-cli",
            "--api-url",
            "http://localhost:9000",
            "list",
            "--sort-by",
            "startDate",
            "--order",
            "desc",
            "--from",
            "2024-01-01",
        ])
        .unwrap();
        assert_eq!(cli.api_url, "http://localhost:9000");
        match cli.command {
            Command::List {
                sort_by,
                order,
                from,
                page,
                ..
            } => {
                assert_eq!(sort_by, SortField::StartDate);
                assert_eq!(order, SortOrder::Desc);
                assert_eq!(from, chrono::NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(page, 1);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_sort_field() {
        assert!(Cli::try_parse_from(["event-admin-cli", "list", "--sort-by", "guests"]).is_err());
    }

    #[test]
    fn create_collects_repeated_images() {
        let cli = Cli::try_parse_from([
            "event-admin-cli",
            "create",
            "--title",
            "Launch",
            "--description",
            "Kickoff",
            "--start-date",
            "2024-01-01",
            "--end-date",
            "2024-01-02",
            "--guests",
            "5",
            "--image",
            "a.png",
            "--image",
            "b.png",
        ])
        .unwrap();
        let Command::Create { fields } = cli.command else {
            panic!("expected create");
        };
        assert_eq!(fields.images.len(), 2);
        assert!(check_draft(&fields.draft(), fields.images.len(), 0).is_ok());
    }

    #[test]
    fn create_without_images_fails_locally() {
        let draft = EventDraft {
            title: "Launch".into(),
            description: "Kickoff".into(),
            start_date: "2024-01-01".into(),
            end_date: "2024-01-02".into(),
            total_guests: 5,
        };
        let err = check_draft(&draft, 0, 0).unwrap_err();
        assert!(err.to_string().contains("At least one image"));
        assert!(check_draft(&draft, 0, 1).is_ok());
    }
}
