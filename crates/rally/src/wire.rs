//! WSAPI request layout and response envelopes.
//!
//! Pure functions only: everything here is testable without a server.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracker::{CreateSpec, Pagination, QuerySpec, QueryTarget, Record, Scope, TransportError};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Path of a query relative to the WSAPI root.
pub(crate) fn query_path(spec: &QuerySpec) -> String {
    match &spec.target {
        QueryTarget::ByFilter { object_type, .. } => format!("/{object_type}"),
        QueryTarget::ByReference(path) => path.as_str().to_owned(),
    }
}

/// Query-string parameters for the page starting at `start`.
pub(crate) fn query_params(spec: &QuerySpec, start: u32) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(6);
    if let QueryTarget::ByFilter { filter, .. } = &spec.target {
        params.push(("query", filter.to_string()));
    }
    params.push(("fetch", spec.fetch.to_param()));
    params.push(("start", start.to_string()));
    params.push(("pagesize", spec.pagination.page_size.to_string()));
    push_scope(&mut params, spec.scope.as_ref());
    params
}

/// Path of a create relative to the WSAPI root.
pub(crate) fn create_path(spec: &CreateSpec) -> String {
    format!("/{}/create", spec.object_type)
}

pub(crate) fn create_params(spec: &CreateSpec) -> Vec<(&'static str, String)> {
    let mut params = vec![("fetch", spec.fetch.to_param())];
    push_scope(&mut params, spec.scope.as_ref());
    params
}

/// `{ "<type>": { ...attributes } }`.
pub(crate) fn create_body(spec: &CreateSpec) -> Value {
    let mut body = Map::new();
    body.insert(
        spec.object_type.to_string(),
        Value::Object(spec.attributes.clone()),
    );
    Value::Object(body)
}

fn push_scope(params: &mut Vec<(&'static str, String)>, scope: Option<&Scope>) {
    let Some(scope) = scope else {
        return;
    };
    if let Some(workspace) = &scope.workspace {
        params.push(("workspace", workspace.clone()));
    }
    if let Some(project) = &scope.project {
        params.push(("project", project.clone()));
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Start index of the page after one that began at `start` and returned
/// `page_len` rows, or `None` when paging is done.
pub(crate) fn next_start(
    pagination: &Pagination,
    start: u32,
    page_len: usize,
    collected: usize,
    total: Option<u64>,
) -> Option<u32> {
    if page_len == 0 || page_len < pagination.page_size as usize {
        return None;
    }
    if !pagination.limit.admits_more(collected) {
        return None;
    }
    let next = start.checked_add(u32::try_from(page_len).ok()?)?;
    match total {
        Some(total) if u64::from(next) > total => None,
        _ => Some(next),
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    #[serde(rename = "QueryResult")]
    query_result: QueryPage,
}

/// One page of a `QueryResult`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct QueryPage {
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub total_result_count: Option<u64>,
    #[serde(default)]
    pub results: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct CreateEnvelope {
    #[serde(rename = "CreateResult")]
    create_result: CreatePage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CreatePage {
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub object: Option<Record>,
}

#[derive(Debug, Deserialize)]
struct OperationEnvelope {
    #[serde(rename = "OperationResult")]
    operation_result: OperationResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OperationResult {
    #[serde(default)]
    errors: Vec<String>,
}

fn malformed(e: serde_json::Error) -> TransportError {
    TransportError::Malformed {
        message: e.to_string(),
    }
}

fn reported(errors: Vec<String>) -> Result<(), TransportError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TransportError::Service { errors })
    }
}

/// Decodes a `QueryResult` page, failing on envelope-reported errors.
pub(crate) fn parse_query_page(body: &str) -> Result<QueryPage, TransportError> {
    let mut page = serde_json::from_str::<QueryEnvelope>(body)
        .map_err(malformed)?
        .query_result;
    reported(std::mem::take(&mut page.errors))?;
    Ok(page)
}

/// Decodes a `CreateResult`, failing on envelope-reported errors.
pub(crate) fn parse_create_result(body: &str) -> Result<CreatePage, TransportError> {
    let mut page = serde_json::from_str::<CreateEnvelope>(body)
        .map_err(malformed)?
        .create_result;
    reported(std::mem::take(&mut page.errors))?;
    Ok(page)
}

/// Best-effort message for a non-success response body.
///
/// Prefers the errors of any WSAPI envelope; falls back to the raw body.
pub(crate) fn error_message(body: &str) -> String {
    let errors = serde_json::from_str::<QueryEnvelope>(body)
        .map(|e| e.query_result.errors)
        .or_else(|_| serde_json::from_str::<CreateEnvelope>(body).map(|e| e.create_result.errors))
        .or_else(|_| {
            serde_json::from_str::<OperationEnvelope>(body).map(|e| e.operation_result.errors)
        })
        .unwrap_or_default();
    if errors.is_empty() {
        body.trim().to_owned()
    } else {
        errors.join("; ")
    }
}
