//! The transport port.
//!
//! The resolver never talks HTTP itself. It hands fully-built specs to a
//! [`Transport`] and interprets what comes back. Adapters (the `rally` crate,
//! test doubles) implement this trait; nothing here knows about wire formats,
//! authentication, or timeouts.

use async_trait::async_trait;

use crate::{CreateResult, CreateSpec, QueryResult, QuerySpec, TransportError};

/// Executes query and create specs against the remote tracker.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Runs a query, following pages until `spec.pagination.limit` rows have
    /// been collected or the remote result set is exhausted.
    async fn query(&self, spec: &QuerySpec) -> Result<QueryResult, TransportError>;

    /// Creates one object and returns the service's envelope.
    async fn create(&self, spec: &CreateSpec) -> Result<CreateResult, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn query(&self, spec: &QuerySpec) -> Result<QueryResult, TransportError> {
        (**self).query(spec).await
    }

    async fn create(&self, spec: &CreateSpec) -> Result<CreateResult, TransportError> {
        (**self).create(spec).await
    }
}
