//! In-memory source and sink used by the engine tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use prom2influx_core::{QueryResponse, QueryResult, WriteBatch};
use prom2influx_influxdb::{SinkError, WriteSink};
use prom2influx_prometheus::{QueryRange, QuerySource, SourceError};
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub(crate) enum Behavior {
    Respond(QueryResult),
    Fail,
    UnknownShape,
    /// Never answers; only cancellation or a timeout ends the query.
    Block,
}

pub(crate) struct MockSource {
    default: Behavior,
    per_metric: HashMap<String, Behavior>,
    flags: HashMap<String, String>,
    gate: Option<Arc<Semaphore>>,
    queries: Mutex<Vec<(String, QueryRange)>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl MockSource {
    pub(crate) fn new(default: Behavior) -> Self {
        Self {
            default,
            per_metric: HashMap::new(),
            flags: HashMap::new(),
            gate: None,
            queries: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub(crate) fn responding(result: QueryResult) -> Self {
        Self::new(Behavior::Respond(result))
    }

    pub(crate) fn with(mut self, metric: &str, behavior: Behavior) -> Self {
        self.per_metric.insert(metric.to_owned(), behavior);
        self
    }

    pub(crate) fn with_flag(mut self, key: &str, value: &str) -> Self {
        self.flags.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Every query waits for one permit of `gate` before answering.
    pub(crate) fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn queries(&self) -> Vec<(String, QueryRange)> {
        self.queries.lock().unwrap().clone()
    }

    pub(crate) fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub(crate) fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuerySource for MockSource {
    async fn flags(&self) -> Result<HashMap<String, String>, SourceError> {
        Ok(self.flags.clone())
    }

    async fn query_range(&self, query: &str, range: QueryRange) -> Result<QueryResponse, SourceError> {
        self.queries.lock().unwrap().push((query.to_owned(), range));
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let behavior = self.per_metric.get(query).unwrap_or(&self.default).clone();
        let result = match behavior {
            Behavior::Respond(result) => Ok(QueryResponse::from(result)),
            Behavior::Fail => Err(SourceError::Api {
                error_type: "bad_data".to_owned(),
                message: format!("cannot evaluate {query:?}"),
            }),
            Behavior::UnknownShape => Err(SourceError::UnknownResultType("histogram".to_owned())),
            Behavior::Block => std::future::pending().await,
        };
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[derive(Default)]
pub(crate) struct MockSink {
    fail_first: u32,
    always_fail: bool,
    attempts: AtomicU32,
    written: Mutex<Vec<WriteBatch>>,
}

impl MockSink {
    pub(crate) fn failing_first(n: u32) -> Self {
        Self { fail_first: n, ..Self::default() }
    }

    pub(crate) fn always_failing() -> Self {
        Self { always_fail: true, ..Self::default() }
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn written(&self) -> Vec<WriteBatch> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl WriteSink for MockSink {
    async fn write(&self, batch: &WriteBatch) -> Result<(), SinkError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.always_fail || attempt <= self.fail_first {
            return Err(SinkError::HttpStatus { code: 503, message: "unavailable".to_owned() });
        }
        self.written.lock().unwrap().push(batch.clone());
        Ok(())
    }
}
