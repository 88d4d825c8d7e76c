use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{sync::oneshot, time::timeout};

use super::*;
use crate::{error::Operation, sort::SortDirection, store::ResultSnapshot};

type Reply = oneshot::Sender<Result<ResultPage<u32>, ClientError>>;

/// Hands every request to the test, which answers whenever it likes.
struct ScriptedSource {
    calls: mpsc::UnboundedSender<(QueryDescriptor, Reply)>,
}

impl ScriptedSource {
    fn new() -> (Self, mpsc::UnboundedReceiver<(QueryDescriptor, Reply)>) {
        let (calls, rx) = mpsc::unbounded_channel();
        (Self { calls }, rx)
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    type Item = u32;

    async fn fetch_page(&self, query: &QueryDescriptor) -> Result<ResultPage<u32>, ClientError> {
        let (tx, rx) = oneshot::channel();
        self.calls
            .send((query.clone(), tx))
            .expect("test still listening");
        rx.await
            .unwrap_or_else(|_| Err(ClientError::transport(Operation::ListPersons, "script dropped")))
    }
}

#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl PageSource for CountingSource {
    type Item = u32;

    async fn fetch_page(&self, _query: &QueryDescriptor) -> Result<ResultPage<u32>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ResultPage::empty())
    }
}

#[derive(Default)]
struct RecordingSink {
    seen: Mutex<Vec<(String, Severity)>>,
}

impl RecordingSink {
    fn seen(&self) -> Vec<(String, Severity)> {
        self.seen.lock().expect("sink lock").clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, message: &str, severity: Severity) {
        self.seen
            .lock()
            .expect("sink lock")
            .push((message.to_string(), severity));
    }
}

async fn next_call(
    calls: &mut mpsc::UnboundedReceiver<(QueryDescriptor, Reply)>,
) -> (QueryDescriptor, Reply) {
    timeout(Duration::from_secs(5), calls.recv())
        .await
        .expect("timed out waiting for fetch")
        .expect("source dropped")
}

async fn settled(rx: &mut watch::Receiver<ResultSnapshot<u32>>) -> ResultSnapshot<u32> {
    timeout(Duration::from_secs(5), rx.wait_for(|s| !s.loading))
        .await
        .expect("timed out waiting for store")
        .expect("store alive")
        .clone()
}

fn start(
    pagination: Pagination,
) -> (
    OrchestratorHandle,
    ResultStore<u32>,
    mpsc::UnboundedReceiver<(QueryDescriptor, Reply)>,
    Arc<RecordingSink>,
) {
    let (source, calls) = ScriptedSource::new();
    let sink = Arc::new(RecordingSink::default());
    let (orchestrator, handle) = FetchOrchestrator::new(Arc::new(source), sink.clone(), pagination);
    let store = orchestrator.store();
    orchestrator.spawn();
    (handle, store, calls, sink)
}

#[tokio::test]
async fn initial_fetch_toggles_loading_around_the_request() {
    let (_handle, store, mut calls, _sink) = start(Pagination::default());
    let mut rx = store.subscribe();

    let (query, reply) = next_call(&mut calls).await;
    assert_eq!(query, QueryDescriptor::default());
    assert!(store.snapshot().loading);

    reply.send(Ok(ResultPage::new(vec![1, 2, 3], 57))).expect("reply");
    let snapshot = settled(&mut rx).await;
    assert_eq!(snapshot.data(), &[1, 2, 3]);
    assert_eq!(snapshot.total(), 57);
}

#[tokio::test]
async fn newest_query_wins_when_answers_arrive_out_of_order() {
    let (handle, store, mut calls, sink) = start(Pagination::default());
    let mut rx = store.subscribe();

    let (_, first) = next_call(&mut calls).await;
    handle.set_page(1).expect("send");
    let (second_query, second) = next_call(&mut calls).await;
    assert_eq!(second_query.pagination.page(), 1);

    // The first request was abandoned; answering it must not reach the store.
    let _ = first.send(Ok(ResultPage::new(vec![100], 1)));
    assert!(store.snapshot().loading);

    second.send(Ok(ResultPage::new(vec![11, 12], 20))).expect("reply");
    let snapshot = settled(&mut rx).await;
    assert_eq!(snapshot.data(), &[11, 12]);
    assert_eq!(snapshot.total(), 20);
    assert!(sink.seen().is_empty());
}

#[tokio::test]
async fn stale_generation_is_ignored_by_settle() {
    let (source, _calls) = ScriptedSource::new();
    let sink = Arc::new(RecordingSink::default());
    let (mut orchestrator, _handle) =
        FetchOrchestrator::new(Arc::new(source), sink.clone(), Pagination::default());
    let store = orchestrator.store();

    orchestrator.issue(QueryDescriptor::default());
    let stale = orchestrator.generation;
    orchestrator.apply(QuerySignal::SetPage(2));
    let current = orchestrator.generation;
    assert!(current > stale);

    orchestrator.settle(Completion {
        generation: stale,
        result: Ok(ResultPage::new(vec![1], 1)),
    });
    orchestrator.settle(Completion {
        generation: stale,
        result: Err(ClientError::status(Operation::ListPersons, 500, "late")),
    });
    assert!(store.snapshot().loading);
    assert!(store.snapshot().data().is_empty());
    assert!(sink.seen().is_empty());

    orchestrator.settle(Completion {
        generation: current,
        result: Ok(ResultPage::new(vec![7, 8], 30)),
    });
    let snapshot = store.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(snapshot.data(), &[7, 8]);
    assert_eq!(snapshot.total(), 30);
}

#[tokio::test]
async fn late_answer_for_older_query_does_not_replace_newer_page() {
    let (source, _calls) = ScriptedSource::new();
    let sink = Arc::new(RecordingSink::default());
    let (mut orchestrator, _handle) =
        FetchOrchestrator::new(Arc::new(source), sink.clone(), Pagination::default());
    let store = orchestrator.store();

    orchestrator.issue(QueryDescriptor::default());
    let older = orchestrator.generation;
    orchestrator.apply(QuerySignal::SetPage(4));
    let newer = orchestrator.generation;

    orchestrator.settle(Completion {
        generation: newer,
        result: Ok(ResultPage::new(vec![40, 41], 50)),
    });
    orchestrator.settle(Completion {
        generation: older,
        result: Ok(ResultPage::new(vec![1, 2], 50)),
    });
    orchestrator.settle(Completion {
        generation: older,
        result: Err(ClientError::status(Operation::ListPersons, 500, "late")),
    });

    let snapshot = store.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(snapshot.data(), &[40, 41]);
    let query = snapshot.query.expect("accepted query");
    assert_eq!(query.pagination.page(), 4);
    assert!(sink.seen().is_empty());
}

#[tokio::test]
async fn filter_and_sort_changes_go_back_to_the_first_page() {
    let (handle, _store, mut calls, _sink) = start(Pagination::new(0, 5).expect("pagination"));
    let _ = next_call(&mut calls).await;

    handle.set_page(3).expect("send");
    let (query, _) = next_call(&mut calls).await;
    assert_eq!(query.pagination.page(), 3);

    handle.toggle_sort("name", false).expect("send");
    let (query, _) = next_call(&mut calls).await;
    assert_eq!(query.pagination.page(), 0);
    assert_eq!(query.pagination.page_size(), 5);
    assert_eq!(query.sort, vec![SortClause::asc("name")]);
    assert_eq!(handle.sort_meta("name").direction, Some(SortDirection::Asc));
    assert_eq!(handle.sort_meta("name").index, Some(1));

    handle.set_page(2).expect("send");
    let _ = next_call(&mut calls).await;
    let mut filters = FilterMap::new();
    filters.insert("name".into(), "Ivan".into());
    handle.set_filters(filters.clone()).expect("send");
    let (query, _) = next_call(&mut calls).await;
    assert_eq!(query.pagination.page(), 0);
    assert_eq!(query.filters, filters);
    assert_eq!(handle.descriptor(), query);
}

#[tokio::test]
async fn zero_page_size_issues_no_fetch() {
    let (handle, _store, mut calls, _sink) = start(Pagination::default());
    let _ = next_call(&mut calls).await;

    handle.set_page_size(0).expect("send");
    handle.set_page_size(20).expect("send");
    let (query, _) = next_call(&mut calls).await;
    assert_eq!(query.pagination.page_size(), 20);
}

#[tokio::test]
async fn failed_fetch_keeps_previous_page_and_notifies_once() {
    let (handle, store, mut calls, sink) = start(Pagination::default());
    let mut rx = store.subscribe();

    let (_, reply) = next_call(&mut calls).await;
    reply.send(Ok(ResultPage::new(vec![1, 2], 2))).expect("reply");
    settled(&mut rx).await;

    handle.request_refresh().expect("send");
    let (_, reply) = next_call(&mut calls).await;
    assert!(store.snapshot().loading);
    reply
        .send(Err(ClientError::status(Operation::ListPersons, 500, "boom")))
        .expect("reply");

    let snapshot = settled(&mut rx).await;
    assert_eq!(snapshot.data(), &[1, 2]);
    assert_eq!(snapshot.total(), 2);
    assert_eq!(snapshot.query.as_deref(), Some(&QueryDescriptor::default()));
    assert_eq!(
        sink.seen(),
        vec![("Internal server error".to_string(), Severity::Error)]
    );
}

#[tokio::test]
async fn input_data_is_shown_without_fetching() {
    let source = Arc::new(CountingSource::default());
    let (orchestrator, handle) = FetchOrchestrator::new(
        source.clone(),
        Arc::new(RecordingSink::default()),
        Pagination::default(),
    );
    let orchestrator = orchestrator.with_input_data(vec![5, 4, 3, 2, 1]);
    let store = orchestrator.store();

    let snapshot = store.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(snapshot.total(), 5);

    let task = orchestrator.spawn();
    handle.set_page(3).expect("send");
    handle.toggle_sort("height", true).expect("send");
    handle.request_refresh().expect("send");
    drop(handle);
    timeout(Duration::from_secs(5), task)
        .await
        .expect("orchestrator stops")
        .expect("task");

    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.snapshot().data(), &[5, 4, 3, 2, 1]);
    assert!(!store.snapshot().loading);
}

#[tokio::test]
async fn handle_reports_closed_orchestrator() {
    let (source, _calls) = ScriptedSource::new();
    let (orchestrator, handle) = FetchOrchestrator::new(
        Arc::new(source),
        Arc::new(RecordingSink::default()),
        Pagination::default(),
    );
    drop(orchestrator);
    assert_eq!(handle.set_page(1), Err(OrchestratorClosed));
}

#[tokio::test]
async fn first_fetch_uses_preset_filters_sort_and_page() {
    let (source, mut calls) = ScriptedSource::new();
    let mut filters = FilterMap::new();
    filters.insert("weight[lt]".into(), "90".into());
    let (orchestrator, handle) = FetchOrchestrator::new(
        Arc::new(source),
        Arc::new(RecordingSink::default()),
        Pagination::new(2, 15).expect("pagination"),
    );
    let orchestrator = orchestrator
        .with_filters(filters.clone())
        .with_sort(vec![SortClause::desc("locationName")]);
    assert_eq!(handle.sort_meta("locationName").index, Some(1));
    orchestrator.spawn();

    let (query, _reply) = next_call(&mut calls).await;
    assert_eq!(query.filters, filters);
    assert_eq!(query.sort, vec![SortClause::desc("location.name")]);
    assert_eq!(query.pagination.page(), 2);
    assert_eq!(query.pagination.page_size(), 15);
}
