//! Change notification for store fields.
//!
//! Subscribers register against a field key (or the whole record) and receive
//! a [`Change`] for every assignment or removal of that field.

mod change;
mod dispatcher;
mod notifier;

pub use change::Change;
pub(crate) use dispatcher::Dispatcher;
pub use notifier::{Notifier, Subscription};
