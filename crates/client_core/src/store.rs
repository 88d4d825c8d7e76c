//! Latest accepted page plus loading flag, observable by presentation.

use std::sync::Arc;

use tokio::sync::watch;

use crate::query::QueryDescriptor;

#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage<T> {
    pub data: Vec<T>,
    /// Size of the whole filtered set on the server, independent of `data.len()`.
    pub total: u64,
}

impl<T> ResultPage<T> {
    pub fn new(data: Vec<T>, total: u64) -> Self {
        Self { data, total }
    }

    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
        }
    }

    /// A pre-fetched list shown as a single page.
    pub fn from_static(data: Vec<T>) -> Self {
        let total = data.len() as u64;
        Self { data, total }
    }
}

impl<T> Default for ResultPage<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// What readers see: a page and the loading flag, always updated together.
#[derive(Debug)]
pub struct ResultSnapshot<T> {
    pub page: Arc<ResultPage<T>>,
    pub loading: bool,
    /// Query the current page answers; `None` until a page has been accepted.
    pub query: Option<Arc<QueryDescriptor>>,
}

impl<T> Clone for ResultSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            page: Arc::clone(&self.page),
            loading: self.loading,
            query: self.query.clone(),
        }
    }
}

impl<T> ResultSnapshot<T> {
    pub fn data(&self) -> &[T] {
        &self.page.data
    }

    pub fn total(&self) -> u64 {
        self.page.total
    }

    /// True when `other` shows the very same accepted page, not just equal rows.
    pub fn same_page(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.page, &other.page)
    }
}

pub struct ResultStore<T> {
    tx: Arc<watch::Sender<ResultSnapshot<T>>>,
}

impl<T> Clone for ResultStore<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> Default for ResultStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResultStore<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ResultSnapshot {
            page: Arc::new(ResultPage::empty()),
            loading: false,
            query: None,
        });
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultSnapshot<T>> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ResultSnapshot<T> {
        self.tx.borrow().clone()
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.tx.send_if_modified(|snapshot| {
            let changed = snapshot.loading != loading;
            snapshot.loading = loading;
            changed
        });
    }

    /// Replaces the page, records the query it answers and clears loading in one update.
    pub(crate) fn publish(&self, page: ResultPage<T>, query: QueryDescriptor) {
        let page = Arc::new(page);
        let query = Arc::new(query);
        self.tx.send_modify(|snapshot| {
            snapshot.page = page;
            snapshot.loading = false;
            snapshot.query = Some(query);
        });
    }
}
