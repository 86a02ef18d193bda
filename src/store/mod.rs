//! The canonical-shape store.
//!
//! A [`SharedState`] holds one [`Record`] whose canonical contents are defined
//! by a [`Shape`]. Any field can be read or written at any time; `reset`
//! restores the canonical contents exactly.

mod record;
mod shape;
mod store;

pub use record::Record;
pub use shape::Shape;
pub use store::SharedState;
