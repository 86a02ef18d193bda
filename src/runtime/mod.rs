//! Ownership of the live stores.
//!
//! This module keeps exactly one live store per shape, either in the
//! process-wide runtime or in a scoped runtime pushed for the current thread.

mod context;

pub use context::StoreRuntime;
