use serde_json::Value;

/// A single field mutation delivered to subscribers of that field.
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    /// The field was written. `previous` is `None` when the write created it.
    Assigned {
        key: String,
        previous: Option<Value>,
        value: Value,
    },
    /// The field was deleted from the record.
    Removed { key: String, previous: Value },
}

impl Change {
    pub fn key(&self) -> &str {
        match self {
            Change::Assigned { key, .. } | Change::Removed { key, .. } => key,
        }
    }

    /// Value after the change, `None` if the field is now absent.
    pub fn current(&self) -> Option<&Value> {
        match self {
            Change::Assigned { value, .. } => Some(value),
            Change::Removed { .. } => None,
        }
    }

    pub fn previous(&self) -> Option<&Value> {
        match self {
            Change::Assigned { previous, .. } => previous.as_ref(),
            Change::Removed { previous, .. } => Some(previous),
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, Change::Removed { .. })
    }
}
