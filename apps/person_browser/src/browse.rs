//! Interactive browsing: one command per stdin line drives the list orchestrator.

use anyhow::Result;
use client_core::{
    filters::FilterMap,
    form::FormMode,
    notify::Notification,
    orchestrator::OrchestratorHandle,
    service::PersonService,
    store::{ResultSnapshot, ResultStore},
};
use shared::domain::{Person, PersonId};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{
    args::{collect_filters, parse_filter},
    console::{page_count, print_notification, render_person, PageRenderer},
};

pub const HELP: &str = "\
commands:
  next | prev | page N | size N
  sort COLUMN          toggle sort on one column (replaces other clauses)
  msort COLUMN         toggle COLUMN within a multi-column sort
  filter EXPR...       e.g. filter height>170 name=Ivan
  clear                drop all filters
  refresh
  show ID              details of a person on the current page
  delete ID
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Prev,
    /// 1-based, as typed.
    Page(u32),
    Size(u32),
    Sort { column: String, multi: bool },
    Filter(FilterMap),
    ClearFilters,
    Refresh,
    Show(PersonId),
    Delete(PersonId),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<BrowseCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".into());
    };
    let rest: Vec<&str> = words.collect();
    let single = |what: &str| match rest.as_slice() {
        [arg] => Ok(arg.to_string()),
        _ => Err(format!("{verb} expects exactly one {what}")),
    };
    let number = |what: &str| -> Result<u32, String> {
        single(what)?
            .parse()
            .map_err(|_| format!("{verb}: {what} must be a non-negative integer"))
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "next" | "n" => BrowseCommand::Next,
        "prev" | "p" => BrowseCommand::Prev,
        "page" => match number("page number")? {
            0 => return Err("pages start at 1".into()),
            n => BrowseCommand::Page(n),
        },
        "size" => match number("page size")? {
            0 => return Err("page size must be positive".into()),
            n => BrowseCommand::Size(n),
        },
        "sort" => BrowseCommand::Sort {
            column: single("column")?,
            multi: false,
        },
        "msort" => BrowseCommand::Sort {
            column: single("column")?,
            multi: true,
        },
        "filter" => {
            if rest.is_empty() {
                return Err("filter expects at least one expression".into());
            }
            let exprs = rest
                .iter()
                .map(|raw| parse_filter(raw))
                .collect::<Result<Vec<_>, _>>()?;
            BrowseCommand::Filter(collect_filters(&exprs)?)
        }
        "clear" => BrowseCommand::ClearFilters,
        "refresh" | "r" => BrowseCommand::Refresh,
        "show" => BrowseCommand::Show(PersonId(number("person id")?.into())),
        "delete" => BrowseCommand::Delete(PersonId(number("person id")?.into())),
        "help" | "?" => BrowseCommand::Help,
        "quit" | "exit" | "q" => BrowseCommand::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(command)
}

/// Prints the table every time a new page is accepted, interleaved with notifications.
fn spawn_renderer(
    mut pages: watch::Receiver<ResultSnapshot<Person>>,
    mut notices: broadcast::Receiver<Notification>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut renderer = PageRenderer::default();
        loop {
            tokio::select! {
                changed = pages.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = pages.borrow_and_update().clone();
                    if let Some(table) = renderer.on_update(&snapshot) {
                        println!("{table}");
                    }
                }
                notice = notices.recv() => match notice {
                    Ok(n) => print_notification(&n.message, n.severity),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "notifications dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    })
}

pub async fn run(
    handle: OrchestratorHandle,
    store: ResultStore<Person>,
    service: PersonService,
    notices: broadcast::Receiver<Notification>,
) -> Result<()> {
    let renderer = spawn_renderer(store.subscribe(), notices);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(msg) => {
                eprintln!("{msg}");
                continue;
            }
        };
        debug!(?command, "browse command");

        let pagination = handle.descriptor().pagination;
        match command {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => println!("{HELP}"),
            BrowseCommand::Next => {
                let pages = page_count(store.snapshot().total(), pagination.page_size());
                if u64::from(pagination.page()) + 1 < pages {
                    handle.set_page(pagination.page() + 1)?;
                } else {
                    eprintln!("already on the last page");
                }
            }
            BrowseCommand::Prev => {
                if pagination.page() > 0 {
                    handle.set_page(pagination.page() - 1)?;
                } else {
                    eprintln!("already on the first page");
                }
            }
            BrowseCommand::Page(n) => handle.set_page(n - 1)?,
            BrowseCommand::Size(n) => handle.set_page_size(n)?,
            BrowseCommand::Sort { column, multi } => handle.toggle_sort(column, multi)?,
            BrowseCommand::Filter(filters) => handle.set_filters(filters)?,
            BrowseCommand::ClearFilters => handle.set_filters(FilterMap::new())?,
            BrowseCommand::Refresh => handle.request_refresh()?,
            BrowseCommand::Show(id) => {
                let snapshot = store.snapshot();
                match snapshot.data().iter().find(|p| p.id == id) {
                    Some(person) => print!("{}", render_person(FormMode::Read, person)),
                    None => eprintln!("person {id} is not on the current page"),
                }
            }
            BrowseCommand::Delete(id) => {
                // The service has already reported the outcome.
                let _ = service.delete(id).await;
            }
        }
    }

    drop(service);
    renderer.abort();
    Ok(())
}

#[cfg(test)]
#[path = "tests/browse_tests.rs"]
mod tests;
