mod args;
mod browse;
mod console;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    config::{load_settings_from, ClientSettings, DEFAULT_SETTINGS_FILE},
    form::{validate_draft, FormMode},
    notify::{BroadcastNotificationSink, NotificationSink},
    orchestrator::{FetchOrchestrator, OrchestratorHandle},
    query::Pagination,
    service::PersonService,
    sort::SortClause,
    transport::HttpPersonClient,
};
use futures::future::join_all;
use shared::{
    domain::{Country, EyeColor, HairColor, Person, PersonDraft, PersonId},
    protocol::CountByLocationQuery,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    args::{collect_filters, parse_filter, parse_sort, FilterExpr},
    console::{render_accepted, render_person, ConsoleNotificationSink},
};

#[derive(Parser, Debug)]
#[command(name = "person-browser", about = "Browse and edit the person collection")]
struct Cli {
    /// Settings file; missing files are ignored.
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    #[arg(long, global = true)]
    persons_api_url: Option<String>,
    #[arg(long, global = true)]
    demography_api_url: Option<String>,
    #[arg(long, global = true)]
    page_size: Option<u32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// FIELD=VALUE, FIELD>VALUE or FIELD<VALUE; repeatable.
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<FilterExpr>,
    /// FIELD or FIELD:asc|desc; repeatable, first is primary.
    #[arg(long = "sort", value_parser = parse_sort)]
    sort: Vec<SortClause>,
    /// Zero-based page index.
    #[arg(long, default_value_t = 0)]
    page: u32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of persons.
    List {
        #[command(flatten)]
        query: QueryArgs,
        /// Show persons from a JSON file instead of the server.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Page, sort and filter interactively.
    Browse {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Create a person from a JSON draft.
    Create { file: PathBuf },
    /// Replace a person with a JSON draft.
    Update { id: i64, file: PathBuf },
    Delete { id: i64 },
    AverageWeight,
    CountByLocation {
        #[arg(long)]
        x: Option<f64>,
        #[arg(long)]
        y: Option<i32>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Persons taller than MIN_HEIGHT.
    ByHeight { min_height: f64 },
    /// Count persons with a hair color; every color when omitted.
    HairColor { color: Option<HairColor> },
    /// Percentage of NATIONALITY with EYE_COLOR.
    EyeColorShare {
        nationality: Country,
        eye_color: EyeColor,
    },
}

impl Cli {
    fn settings(&self) -> Result<ClientSettings> {
        let mut settings = load_settings_from(&self.config, |key| std::env::var(key).ok())
            .context("failed to load client settings")?;
        if let Some(url) = &self.persons_api_url {
            settings.persons_api_url = url.clone();
        }
        if let Some(url) = &self.demography_api_url {
            settings.demography_api_url = url.clone();
        }
        if let Some(size) = self.page_size {
            settings.page_size = size;
        }
        settings.validate().context("invalid command-line settings")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;
    info!(
        persons_api_url = %settings.persons_api_url,
        demography_api_url = %settings.demography_api_url,
        page_size = settings.page_size,
        "settings loaded"
    );

    let client = Arc::new(HttpPersonClient::new(&settings));
    let sink: Arc<dyn NotificationSink> = Arc::new(ConsoleNotificationSink);
    let service = PersonService::new(client.clone(), sink.clone());

    match cli.command {
        Command::List { query, input } => list(&settings, client, sink, query, input).await?,
        Command::Browse { query } => {
            let notices = Arc::new(BroadcastNotificationSink::default());
            let (orchestrator, handle) =
                build_orchestrator(&settings, client.clone(), notices.clone(), &query)?;
            let store = orchestrator.store();
            let rx = notices.subscribe();
            let task = orchestrator.spawn();
            let service =
                PersonService::new(client, notices).with_refresh(Arc::new(handle.clone()));
            browse::run(handle, store, service, rx).await?;
            task.await?;
        }
        Command::Create { file } => {
            let draft = read_draft(&file).await?;
            service.create(&draft).await?;
        }
        Command::Update { id, file } => {
            let draft = read_draft(&file).await?;
            service.update(PersonId(id), &draft).await?;
        }
        Command::Delete { id } => service.delete(PersonId(id)).await?,
        Command::AverageWeight => {
            println!("{:.2}", service.average_weight().await?);
        }
        Command::CountByLocation { x, y, name } => {
            let query = CountByLocationQuery { x, y, name };
            println!("{}", service.count_by_location(&query).await?);
        }
        Command::ByHeight { min_height } => {
            for person in service.persons_by_min_height(min_height).await? {
                print!("{}", render_person(FormMode::Read, &person));
            }
        }
        Command::HairColor { color: Some(color) } => {
            println!("{color}: {}", service.count_by_hair_color(color).await?);
        }
        Command::HairColor { color: None } => {
            let counts = join_all(
                HairColor::ALL
                    .iter()
                    .map(|&color| service.count_by_hair_color(color)),
            )
            .await;
            for (color, count) in HairColor::ALL.iter().zip(counts) {
                println!("{color}: {}", count?);
            }
        }
        Command::EyeColorShare {
            nationality,
            eye_color,
        } => {
            let share = service
                .nationality_eye_color_percentage(nationality, eye_color)
                .await?;
            println!("{share:.2}%");
        }
    }

    Ok(())
}

fn build_orchestrator(
    settings: &ClientSettings,
    client: Arc<HttpPersonClient>,
    sink: Arc<dyn NotificationSink>,
    query: &QueryArgs,
) -> Result<(FetchOrchestrator<HttpPersonClient>, OrchestratorHandle)> {
    let pagination = Pagination::new(query.page, settings.page_size)?;
    let filters = collect_filters(&query.filters).map_err(|msg| anyhow!(msg))?;
    let (orchestrator, handle) = FetchOrchestrator::new(client, sink, pagination);
    Ok((
        orchestrator.with_filters(filters).with_sort(query.sort.clone()),
        handle,
    ))
}

async fn list(
    settings: &ClientSettings,
    client: Arc<HttpPersonClient>,
    sink: Arc<dyn NotificationSink>,
    query: QueryArgs,
    input: Option<PathBuf>,
) -> Result<()> {
    let (mut orchestrator, handle) = build_orchestrator(settings, client, sink, &query)?;
    let from_file = input.is_some();
    if let Some(path) = input {
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let persons: Vec<Person> = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a JSON array of persons", path.display()))?;
        orchestrator = orchestrator.with_input_data(persons);
    }

    let store = orchestrator.store();
    let mut pages = store.subscribe();
    let task = orchestrator.spawn();

    if !from_file {
        loop {
            pages.changed().await?;
            if !pages.borrow_and_update().loading {
                break;
            }
        }
    }
    let table = render_accepted(&store.snapshot());

    drop(handle);
    task.await?;
    let table = table.ok_or_else(|| anyhow!("no page of persons could be loaded"))?;
    print!("{table}");
    Ok(())
}

async fn read_draft(path: &Path) -> Result<PersonDraft> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let draft: PersonDraft = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid person draft", path.display()))?;
    validate_draft(&draft)?;
    Ok(draft)
}
