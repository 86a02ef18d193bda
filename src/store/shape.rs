use super::Record;
use serde::de::DeserializeOwned;

/// The canonical shape of a store.
///
/// A shape names the store, produces the record a fresh or reset store holds,
/// and declares a typed view the live record can be read into. The keys of
/// [`Shape::initial_shape`] are the core fields; every other key is optional.
pub trait Shape: Send + Sync + 'static {
    /// Name used in logs and errors.
    const NAME: &'static str;

    /// Typed snapshot of the record.
    type View: DeserializeOwned;

    /// Build the canonical record: every core field at its default and no
    /// optional fields. Must be pure; it is called on every reset.
    fn initial_shape() -> Record;

    /// Returns `true` if `key` is a core field of this shape.
    fn is_core(key: &str) -> bool {
        Self::initial_shape().contains_key(key)
    }
}
