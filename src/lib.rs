//! # Wizard Store
//!
//! An observable, canonical-shape state store for parameter-configuration
//! wizards.
//!
//! Every screen of a wizard reads and writes the same in-progress selections.
//! This crate keeps those selections in one live record per [`Shape`]:
//!
//! - `SharedState<S>` - the live record, cheap to clone and pass around
//! - `Shape` - declares the canonical contents (core fields and defaults)
//! - `reset()` - restores the canonical contents exactly, deleting every
//!   field the shape doesn't define
//!
//! ## Reactivity
//!
//! Subscribers register per field (or for the whole record) and are notified
//! of every assignment and removal, including the ones made by `reset()`.
//!
//! ```
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//! use wizard_store::runtime::StoreRuntime;
//! use wizard_store::shapes::Training;
//!
//! StoreRuntime::scope(|| {
//!     let store = wizard_store::store::<Training>();
//!     let resets = Arc::new(AtomicUsize::new(0));
//!     let resets_clone = resets.clone();
//!     let _sub = store.subscribe("skill", move |_| {
//!         resets_clone.fetch_add(1, Ordering::SeqCst);
//!     });
//!
//!     store.set("selectedLandmark", 4);
//!     wizard_store::reset_store::<Training>();
//!
//!     assert!(store.get("selectedLandmark").is_none());
//!     assert_eq!(resets.load(Ordering::SeqCst), 1);
//! });
//! ```

pub mod error;
pub mod notify;
pub mod runtime;
pub mod shapes;
pub mod store;

// Re-export main types for convenience
pub use error::StoreError;
pub use notify::{Change, Subscription};
pub use runtime::StoreRuntime;
pub use store::{Record, Shape, SharedState};

/// The live store for shape `S` in the current runtime.
pub fn store<S: Shape>() -> SharedState<S> {
    StoreRuntime::current().store::<S>()
}

/// Reset the live store for shape `S` to its canonical shape.
pub fn reset_store<S: Shape>() {
    store::<S>().reset();
}
