use thiserror::Error;

/// Errors returned by the typed and removal operations of a store.
///
/// Plain reads, writes and `reset` never fail.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Core fields are part of the canonical shape and can only be reassigned.
    #[error("field `{key}` is a core field of `{shape}` and cannot be removed")]
    CoreField { shape: &'static str, key: String },

    /// A stored value could not be decoded into the requested type.
    #[error("field `{key}` does not hold the requested type: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be converted into a record value.
    #[error("value for field `{key}` could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The record could not be decoded into the shape's typed view.
    #[error("record does not match the `{shape}` view: {source}")]
    View {
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
