//! Name resolution and find-or-create for busybee-rally.
//!
//! [`Resolver`] sequences calls between the pure query builder in the
//! [`tracker`] crate and a [`tracker::Transport`] adapter. It owns the only
//! real decisions in the system: when to skip the remote call, which result
//! counts as "the" match, and when a lookup escalates to a create.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** No wire formats and no HTTP. Everything remote
//! goes through the injected transport; everything logged goes through the
//! injected [`tracker::Logger`].
//!
//! ## Concurrency
//!
//! Each operation is at most two sequential round-trips (lookup, then an
//! optional create). The resolver holds no mutable state, so calls for
//! different names never interfere. Two concurrent [`Resolver::find_or_create`]
//! calls for the *same* name can both miss and both create; serialising them
//! is the caller's responsibility.

mod resolver;

pub use resolver::{ConfiguredScope, Resolver, TEST_CASES_RELATION};
