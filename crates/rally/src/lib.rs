//! Rally WSAPI transport adapter.
//!
//! Implements the [`tracker::Transport`] port against Rally's web services
//! API (v2.0) with [`reqwest`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL layout, query-string encoding, authentication
//! headers, the `QueryResult`/`CreateResult` envelopes and auto-pagination
//! all live here. The [`tracker`] and `resolver` crates see only
//! [`tracker::Transport`].
//!
//! ## Pagination
//!
//! A query is fetched page by page, `page_size` rows at a time, until the
//! query's limit is reached, a short page comes back, or the service's
//! `TotalResultCount` is exhausted. Rows past the limit are dropped.

mod client;
mod wire;

pub use client::{RallyClient, API_KEY_HEADER, WSAPI_PATH};
