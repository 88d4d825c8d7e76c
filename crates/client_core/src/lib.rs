//! Client core for browsing the person collection: query state, the list fetch
//! loop, HTTP access and user-facing reporting.

pub mod config;
pub mod error;
pub mod filters;
pub mod form;
pub mod notify;
pub mod orchestrator;
pub mod query;
pub mod service;
pub mod sort;
pub mod store;
pub mod transport;

pub use config::{load_settings_from, ClientSettings};
pub use error::{ClientError, ErrorCategory, Operation};
pub use notify::{NotificationSink, Severity};
pub use orchestrator::{FetchOrchestrator, OrchestratorHandle, QuerySignal, RefreshListener};
pub use query::{Pagination, QueryDescriptor};
pub use service::PersonService;
pub use store::{ResultPage, ResultStore};
pub use transport::{HttpPersonClient, PageSource, PersonApi};
