//! Test doubles shared by the resolver integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracker::{
    CreateResult, CreateSpec, LogLevel, Logger, MemorySink, QueryResult, QuerySpec, RallyConfig,
    Record, RequestOptions, ResultSet, Transport, TransportError,
};

/// One transport invocation, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query(QuerySpec),
    Create(CreateSpec),
}

type QueryHandler = Box<dyn Fn(&QuerySpec) -> Result<QueryResult, TransportError> + Send + Sync>;
type CreateHandler = Box<dyn Fn(&CreateSpec) -> Result<CreateResult, TransportError> + Send + Sync>;

/// Records every call and answers with scripted handlers.
///
/// Unscripted queries return no results; unscripted creates return no object.
pub struct MockTransport {
    calls: Mutex<Vec<Call>>,
    on_query: QueryHandler,
    on_create: CreateHandler,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            on_query: Box::new(|_| Ok(QueryResult::default())),
            on_create: Box::new(|_| Ok(CreateResult::default())),
        }
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_query(
        mut self,
        handler: impl Fn(&QuerySpec) -> Result<QueryResult, TransportError> + Send + Sync + 'static,
    ) -> Self {
        self.on_query = Box::new(handler);
        self
    }

    pub fn on_create(
        mut self,
        handler: impl Fn(&CreateSpec) -> Result<CreateResult, TransportError> + Send + Sync + 'static,
    ) -> Self {
        self.on_create = Box::new(handler);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<QuerySpec> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Query(q) => Some(q),
                Call::Create(_) => None,
            })
            .collect()
    }

    pub fn creates(&self) -> Vec<CreateSpec> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(c) => Some(c),
                Call::Query(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn query(&self, spec: &QuerySpec) -> Result<QueryResult, TransportError> {
        self.calls.lock().unwrap().push(Call::Query(spec.clone()));
        (self.on_query)(spec)
    }

    async fn create(&self, spec: &CreateSpec) -> Result<CreateResult, TransportError> {
        self.calls.lock().unwrap().push(Call::Create(spec.clone()));
        (self.on_create)(spec)
    }
}

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => Record::from_map(map),
        other => panic!("record must be a JSON object, got {other}"),
    }
}

pub fn results(records: Vec<Value>) -> QueryResult {
    QueryResult {
        results: records.into_iter().map(record).collect::<ResultSet>(),
    }
}

pub fn created(object_id: u64) -> CreateResult {
    CreateResult {
        object: Some(record(json!({ "ObjectID": object_id }))),
    }
}

pub fn attributes(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("attributes must be a JSON object, got {other}"),
    }
}

pub fn config() -> RallyConfig {
    RallyConfig {
        server: None,
        workspace: Some("1001".into()),
        project: Some("2002".into()),
        test_folder: Some("TF42".into()),
        api_key: Some("_secret".into()),
        user: Some("qa@example.com".into()),
        request_options: Some(RequestOptions::default()),
        log_level: None,
    }
}

/// A debug-level logger and the sink it writes to.
pub fn memory_logger() -> (Logger, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (Logger::new(LogLevel::Debug, sink.clone()), sink)
}
