//! Value types exchanged between the query builder, the resolver and the
//! transport.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types
//! carry structure: a [`QuerySpec`] is either a filtered lookup over a type
//! or a walk of a reference path, and the two are kept apart by
//! [`QueryTarget`]. All of them are transient per-call values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ObjectId;

/// Field holding an object's display name.
pub const FIELD_NAME: &str = "Name";
/// Field holding an object's tracker-assigned identifier.
pub const FIELD_OBJECT_ID: &str = "ObjectID";
/// Field holding a user's e-mail address.
pub const FIELD_EMAIL_ADDRESS: &str = "EmailAddress";

/// Largest page size the remote service accepts.
pub const MAX_PAGE_SIZE: u32 = 200;

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Workspace and/or project restriction, already rendered to reference paths.
///
/// A `Scope` always has at least one side set; "unscoped" is expressed as
/// `Option<Scope>::None` on the query, never as an empty `Scope`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// `/workspace/{id}` when workspace-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    /// `/project/{id}` when project-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Upper bound on the total number of rows fetched across all pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limit {
    /// Stop once this many rows have been collected.
    Bounded(u32),
    /// Keep paging until the remote result set is exhausted.
    Unbounded,
}

impl Limit {
    /// Returns `true` if `collected` rows still leave room for more.
    pub fn admits_more(self, collected: usize) -> bool {
        match self {
            Limit::Bounded(max) => collected < max as usize,
            Limit::Unbounded => true,
        }
    }

    /// Returns the bound, if any.
    pub fn as_option(self) -> Option<u32> {
        match self {
            Limit::Bounded(max) => Some(max),
            Limit::Unbounded => None,
        }
    }
}

/// Paging parameters handed to the transport.
///
/// `start` is 1-based, matching the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub start: u32,
    pub page_size: u32,
    pub limit: Limit,
}

impl Pagination {
    /// Exactly one page of exactly one row.
    pub const SINGLE_ROW: Pagination = Pagination {
        start: 1,
        page_size: 1,
        limit: Limit::Bounded(1),
    };

    /// Full-size pages until the result set is exhausted.
    pub const FULL_LISTING: Pagination = Pagination {
        start: 1,
        page_size: MAX_PAGE_SIZE,
        limit: Limit::Unbounded,
    };
}

// ---------------------------------------------------------------------------
// Fetch fields
// ---------------------------------------------------------------------------

/// Ordered list of attribute names the remote service should return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FetchFields(Vec<String>);

impl FetchFields {
    /// Creates a field list from any sequence of names.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    /// Returns the field names in request order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Renders the list as the comma-separated `fetch` parameter.
    pub fn to_param(&self) -> String {
        self.0.join(",")
    }
}

impl Default for FetchFields {
    /// `[Name, ObjectID]`.
    fn default() -> Self {
        Self::new([FIELD_NAME, FIELD_OBJECT_ID])
    }
}

// ---------------------------------------------------------------------------
// Query targets
// ---------------------------------------------------------------------------

/// An equality predicate `field = value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    /// Builds `field = value`.
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Filter {
    /// Renders the remote query syntax, e.g. `(Name = "My Folder")`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let escaped = self.value.replace('\\', "\\\\").replace('"', "\\\"");
        write!(f, "({} = \"{}\")", self.field, escaped)
    }
}

/// A direct reference path relative to the service root,
/// e.g. `/testfolder/T1/TestCases`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferencePath(String);

impl ReferencePath {
    /// Builds `/{parent_type}/{parent_id}/{relation}`.
    pub fn child_collection(
        parent_type: impl std::fmt::Display,
        parent_id: impl std::fmt::Display,
        relation: impl std::fmt::Display,
    ) -> Self {
        Self(format!("/{parent_type}/{parent_id}/{relation}"))
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReferencePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a query selects from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryTarget {
    /// All objects of `object_type` matching `filter`.
    ByFilter {
        object_type: crate::ObjectType,
        filter: Filter,
    },
    /// The collection found at a reference path.
    ByReference(ReferencePath),
}

// ---------------------------------------------------------------------------
// Specs
// ---------------------------------------------------------------------------

/// A normalized query ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub target: QueryTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    pub fetch: FetchFields,
    pub pagination: Pagination,
}

/// A create request ready for the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSpec {
    pub object_type: crate::ObjectType,
    pub attributes: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    pub fetch: FetchFields,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One result record: field name → value, as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Wraps a JSON object.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Returns the raw value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the record's `ObjectID`, if present and well-formed.
    pub fn object_id(&self) -> Option<ObjectId> {
        self.get(FIELD_OBJECT_ID).and_then(ObjectId::from_json)
    }

    /// Returns the record's `Name`, if it is a string.
    pub fn name(&self) -> Option<&str> {
        self.get(FIELD_NAME).and_then(Value::as_str)
    }

    /// Returns the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the record, returning the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Ordered sequence of zero or more records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet(Vec<Record>);

impl ResultSet {
    /// Wraps a list of records, preserving order.
    pub fn new(records: Vec<Record>) -> Self {
        Self(records)
    }

    /// Returns the first record, the only one a by-name lookup looks at.
    pub fn first(&self) -> Option<&Record> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.0.iter()
    }

    /// Appends another page of records.
    pub fn extend(&mut self, page: impl IntoIterator<Item = Record>) {
        self.0.extend(page);
    }

    /// Drops everything past the first `len` records.
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    pub fn into_vec(self) -> Vec<Record> {
        self.0
    }
}

impl IntoIterator for ResultSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Record> for ResultSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Transport answer to a query: `{ "Results": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "Results", default)]
    pub results: ResultSet,
}

/// Transport answer to a create: `{ "Object": {...} }`.
///
/// `object` is `None` when the service accepted the request but returned no
/// object envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateResult {
    #[serde(rename = "Object", default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Record>,
}
