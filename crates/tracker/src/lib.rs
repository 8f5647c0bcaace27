//! Work-item tracker domain for busybee-rally.
//!
//! This crate contains every domain concept shared by the resolver and the
//! transport adapters: newtype identifiers, query/create specs, result
//! records, the pure query builder, the [`Transport`] port, the injected
//! [`Logger`] capability and the connection configuration.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies. It
//! defines *what* a lookup or create looks like; adapter crates define *how*
//! it reaches the remote service.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ObjectId`, `ObjectType`, `WorkspaceId`, etc.) |
//! | [`types`] | Specs, pagination, records and result sets |
//! | [`query`] | Pure query/create spec builders |
//! | [`transport`] | The async [`Transport`] port |
//! | [`logging`] | Threshold-gated [`Logger`] and its sinks |
//! | [`config`] | [`RallyConfig`] and required-key validation |
//! | [`errors`] | [`TransportError`] and [`ResolverError`] |

pub mod config;
pub mod errors;
pub mod identifiers;
pub mod logging;
pub mod query;
pub mod transport;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{RallyConfig, RequestOptions, DEFAULT_SERVER, REQUIRED_KEYS};
pub use errors::{ResolverError, TransportError};
pub use identifiers::{ObjectId, ObjectType, ProjectId, TestFolderId, WorkspaceId};
pub use logging::{
    LogLevel, LogSink, Logger, MemorySink, TracingSink, UnknownLogLevel, LOG_LEVEL_ENV, LOG_TARGET,
};
pub use query::{
    apply_scope, build_child_listing_query, build_create_spec, build_lookup_query,
    build_user_lookup_query, name_attributes, scope_for, Scoped,
};
pub use transport::Transport;
pub use types::{
    CreateResult, CreateSpec, FetchFields, Filter, Limit, Pagination, QueryResult, QuerySpec,
    QueryTarget, Record, ReferencePath, ResultSet, Scope, FIELD_EMAIL_ADDRESS, FIELD_NAME,
    FIELD_OBJECT_ID, MAX_PAGE_SIZE,
};
