//! Turns filter, sort, pagination and refresh signals into one current list fetch.
//!
//! A single task owns the query state and handles signals and fetch completions
//! one at a time. Every issued fetch gets a generation number. Issuing a new
//! fetch aborts the previous one, and any completion whose generation is not
//! the latest is dropped without touching the store. The server is never told
//! about an abandoned request.

use std::sync::Arc;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    error::ClientError,
    filters::FilterMap,
    notify::{NotificationSink, Severity},
    query::{Pagination, QueryComposer, QueryDescriptor, QueryError},
    sort::{sort_meta, SortClause, SortMeta},
    store::{ResultPage, ResultStore},
    transport::PageSource,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySignal {
    SetFilters(FilterMap),
    ToggleSort { column: String, multi: bool },
    SetSort(Vec<SortClause>),
    SetPage(u32),
    SetPageSize(u32),
    SetPagination(Pagination),
    /// The collection changed elsewhere (e.g. after a mutation).
    Refresh,
}

impl QuerySignal {
    fn name(&self) -> &'static str {
        match self {
            Self::SetFilters(_) => "set_filters",
            Self::ToggleSort { .. } => "toggle_sort",
            Self::SetSort(_) => "set_sort",
            Self::SetPage(_) => "set_page",
            Self::SetPageSize(_) => "set_page_size",
            Self::SetPagination(_) => "set_pagination",
            Self::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("query orchestrator is no longer running")]
pub struct OrchestratorClosed;

/// Anything that can be told the collection changed.
pub trait RefreshListener: Send + Sync {
    fn refresh(&self);
}

/// Cheap, cloneable sender side used by presentation.
pub struct OrchestratorHandle {
    signals: mpsc::UnboundedSender<QuerySignal>,
    descriptor: watch::Receiver<QueryDescriptor>,
}

impl Clone for OrchestratorHandle {
    fn clone(&self) -> Self {
        Self {
            signals: self.signals.clone(),
            descriptor: self.descriptor.clone(),
        }
    }
}

impl OrchestratorHandle {
    pub fn send(&self, signal: QuerySignal) -> Result<(), OrchestratorClosed> {
        self.signals.send(signal).map_err(|_| OrchestratorClosed)
    }

    pub fn set_filters(&self, filters: FilterMap) -> Result<(), OrchestratorClosed> {
        self.send(QuerySignal::SetFilters(filters))
    }

    pub fn toggle_sort(&self, column: impl Into<String>, multi: bool) -> Result<(), OrchestratorClosed> {
        self.send(QuerySignal::ToggleSort {
            column: column.into(),
            multi,
        })
    }

    pub fn set_sort(&self, clauses: Vec<SortClause>) -> Result<(), OrchestratorClosed> {
        self.send(QuerySignal::SetSort(clauses))
    }

    pub fn set_pagination(&self, pagination: Pagination) -> Result<(), OrchestratorClosed> {
        self.send(QuerySignal::SetPagination(pagination))
    }

    pub fn set_page(&self, page: u32) -> Result<(), OrchestratorClosed> {
        self.send(QuerySignal::SetPage(page))
    }

    pub fn set_page_size(&self, page_size: u32) -> Result<(), OrchestratorClosed> {
        self.send(QuerySignal::SetPageSize(page_size))
    }

    pub fn request_refresh(&self) -> Result<(), OrchestratorClosed> {
        self.send(QuerySignal::Refresh)
    }

    /// Latest composed descriptor, for rendering the current sort and page.
    pub fn descriptor(&self) -> QueryDescriptor {
        self.descriptor.borrow().clone()
    }

    pub fn sort_meta(&self, column: &str) -> SortMeta {
        sort_meta(&self.descriptor.borrow().sort, column)
    }
}

impl RefreshListener for OrchestratorHandle {
    fn refresh(&self) {
        if self.request_refresh().is_err() {
            debug!("refresh requested after orchestrator shut down");
        }
    }
}

struct Completion<T> {
    generation: u64,
    result: Result<ResultPage<T>, ClientError>,
}

struct InFlight {
    generation: u64,
    descriptor: QueryDescriptor,
    task: JoinHandle<()>,
}

pub struct FetchOrchestrator<S: PageSource> {
    source: Arc<S>,
    sink: Arc<dyn NotificationSink>,
    store: ResultStore<S::Item>,
    composer: QueryComposer,
    input_data: bool,
    generation: u64,
    in_flight: Option<InFlight>,
    signals: mpsc::UnboundedReceiver<QuerySignal>,
    completions_tx: mpsc::UnboundedSender<Completion<S::Item>>,
    completions_rx: mpsc::UnboundedReceiver<Completion<S::Item>>,
    descriptor_tx: watch::Sender<QueryDescriptor>,
}

impl<S: PageSource> FetchOrchestrator<S> {
    pub fn new(
        source: Arc<S>,
        sink: Arc<dyn NotificationSink>,
        pagination: Pagination,
    ) -> (Self, OrchestratorHandle) {
        let composer = QueryComposer::new(pagination);
        let (signals_tx, signals) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (descriptor_tx, descriptor_rx) = watch::channel(composer.descriptor());

        let orchestrator = Self {
            source,
            sink,
            store: ResultStore::new(),
            composer,
            input_data: false,
            generation: 0,
            in_flight: None,
            signals,
            completions_tx,
            completions_rx,
            descriptor_tx,
        };
        let handle = OrchestratorHandle {
            signals: signals_tx,
            descriptor: descriptor_rx,
        };
        (orchestrator, handle)
    }

    /// Filters used by the first fetch.
    pub fn with_filters(mut self, filters: FilterMap) -> Self {
        let pagination = self.composer.pagination();
        self.composer.set_filters(filters);
        let descriptor = self.composer.set_pagination(pagination);
        self.descriptor_tx.send_replace(descriptor);
        self
    }

    /// Sort used by the first fetch.
    pub fn with_sort(mut self, clauses: Vec<SortClause>) -> Self {
        let pagination = self.composer.pagination();
        self.composer.set_sort(clauses);
        let descriptor = self.composer.set_pagination(pagination);
        self.descriptor_tx.send_replace(descriptor);
        self
    }

    /// Shows a pre-fetched list instead of querying the source. Takes effect immediately.
    pub fn with_input_data(mut self, items: Vec<S::Item>) -> Self {
        self.input_data = true;
        self.store
            .publish(ResultPage::from_static(items), self.composer.descriptor());
        self
    }

    pub fn store(&self) -> ResultStore<S::Item> {
        self.store.clone()
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs until every [`OrchestratorHandle`] is dropped. The first fetch is issued at start.
    pub async fn run(mut self) {
        if self.input_data {
            while let Some(signal) = self.signals.recv().await {
                debug!(signal = signal.name(), "ignoring signal for static input data");
            }
            return;
        }

        let initial = self.composer.descriptor();
        self.issue(initial);

        loop {
            tokio::select! {
                biased;
                Some(completion) = self.completions_rx.recv() => self.settle(completion),
                signal = self.signals.recv() => match signal {
                    Some(signal) => self.apply(signal),
                    None => break,
                },
            }
        }

        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
        }
        debug!("query orchestrator stopped");
    }

    fn apply(&mut self, signal: QuerySignal) {
        let name = signal.name();
        let descriptor = match signal {
            QuerySignal::SetFilters(filters) => self.composer.set_filters(filters),
            QuerySignal::ToggleSort { column, multi } => self.composer.toggle_sort(&column, multi),
            QuerySignal::SetSort(clauses) => self.composer.set_sort(clauses),
            QuerySignal::Refresh => self.composer.refresh(),
            QuerySignal::SetPage(page) => self.composer.set_page(page),
            QuerySignal::SetPagination(pagination) => self.composer.set_pagination(pagination),
            QuerySignal::SetPageSize(page_size) => match self.composer.set_page_size(page_size) {
                Ok(descriptor) => descriptor,
                Err(QueryError::ZeroPageSize) => {
                    warn!(page_size, "ignoring invalid page size");
                    return;
                }
            },
        };
        debug!(signal = name, "query inputs changed");
        self.issue(descriptor);
    }

    fn issue(&mut self, descriptor: QueryDescriptor) {
        self.generation += 1;
        let generation = self.generation;

        if let Some(previous) = self.in_flight.take() {
            debug!(
                superseded = previous.generation,
                generation, "abandoning in-flight fetch"
            );
            previous.task.abort();
        }

        self.descriptor_tx.send_replace(descriptor.clone());
        self.store.set_loading(true);
        info!(
            generation,
            page = descriptor.pagination.page(),
            size = descriptor.pagination.page_size(),
            filters = descriptor.filters.len(),
            sort = descriptor.sort.len(),
            "fetching page"
        );

        let source = Arc::clone(&self.source);
        let completions = self.completions_tx.clone();
        let query = descriptor.clone();
        let task = tokio::spawn(async move {
            let result = source.fetch_page(&query).await;
            let _ = completions.send(Completion { generation, result });
        });
        self.in_flight = Some(InFlight {
            generation,
            descriptor,
            task,
        });
    }

    fn settle(&mut self, completion: Completion<S::Item>) {
        let in_flight = match self.in_flight.take() {
            Some(f) if f.generation == completion.generation => f,
            other => {
                self.in_flight = other;
                debug!(
                    generation = completion.generation,
                    current = self.generation,
                    "dropping response for superseded query"
                );
                return;
            }
        };

        match completion.result {
            Ok(page) => {
                debug!(
                    generation = completion.generation,
                    rows = page.data.len(),
                    total = page.total,
                    "page accepted"
                );
                self.store.publish(page, in_flight.descriptor);
            }
            Err(err) => {
                warn!(
                    generation = completion.generation,
                    category = ?err.category(),
                    "list fetch failed: {err}"
                );
                self.sink.notify(err.user_message(), Severity::Error);
                self.store.set_loading(false);
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
