use super::{Record, Shape};
use crate::error::{Result, StoreError};
use crate::notify::{Change, Dispatcher, Subscription};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A shared, observable record with a canonical shape.
///
/// Handles are cheap to clone and all clones refer to the same live record,
/// so a single instance can be passed to every consumer explicitly.
///
/// Each mutation runs as one step under the write lock. Subscribers are
/// called after the lock is released, so they may read and write the store,
/// and they observe mutations in the order those were applied, also when
/// handles are shared across threads. A write made from inside a callback is
/// delivered once the current callback round finishes; a write that races
/// with another thread's delivery may return before its own subscribers ran.
pub struct SharedState<S: Shape> {
    state: Arc<RwLock<Record>>,
    dispatcher: Dispatcher,
    _shape: PhantomData<fn() -> S>,
}

impl<S: Shape> SharedState<S> {
    /// Create a store seeded with `S::initial_shape()`.
    pub fn new() -> Self {
        let initial = S::initial_shape();
        tracing::debug!(shape = S::NAME, fields = initial.len(), "store created");

        Self {
            state: Arc::new(RwLock::new(initial)),
            dispatcher: Dispatcher::new(),
            _shape: PhantomData,
        }
    }

    /// Get a clone of a field's value, `None` if the field is absent.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read_lock().get(key).cloned()
    }

    /// Get a field decoded into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .map(|value| {
                serde_json::from_value(value).map_err(|source| StoreError::Decode {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read_lock().contains_key(key)
    }

    /// Assign a field, creating it if it is absent.
    ///
    /// Subscribers are notified even when the value is unchanged.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();

        {
            let mut state = self.write_lock();
            let previous = state.insert(key.clone(), value.clone());
            tracing::trace!(shape = S::NAME, key = key.as_str(), "field set");
            let change = Change::Assigned {
                key,
                previous,
                value,
            };
            self.dispatcher.enqueue(vec![change], state.clone());
        }

        self.dispatcher.drain();
    }

    /// Assign a field from any serializable value.
    pub fn set_as<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) -> Result<()> {
        let key = key.into();
        let value = serde_json::to_value(value).map_err(|source| StoreError::Encode {
            key: key.clone(),
            source,
        })?;
        self.set(key, value);
        Ok(())
    }

    /// Replace a field with the result of `f` applied to its current value.
    ///
    /// `f` runs without any lock held and may read the store through any
    /// handle. The result is only committed if the field still holds the
    /// value `f` saw; otherwise `f` runs again with the newer value.
    pub fn update<F>(&self, key: impl Into<String>, mut f: F)
    where
        F: FnMut(Option<&Value>) -> Value,
    {
        let key = key.into();

        loop {
            let seen = self.get(&key);
            let value = f(seen.as_ref());

            let mut state = self.write_lock();
            if state.get(&key) != seen.as_ref() {
                tracing::trace!(shape = S::NAME, key = key.as_str(), "update raced, retrying");
                continue;
            }

            let previous = state.insert(key.clone(), value.clone());
            tracing::trace!(shape = S::NAME, key = key.as_str(), "field updated");
            let change = Change::Assigned {
                key,
                previous,
                value,
            };
            self.dispatcher.enqueue(vec![change], state.clone());
            break;
        }

        self.dispatcher.drain();
    }

    /// Delete an optional field, returning its previous value.
    ///
    /// Removing an absent field is a no-op and notifies nobody. Core fields
    /// can't be removed.
    pub fn remove(&self, key: &str) -> Result<Option<Value>> {
        if S::is_core(key) {
            return Err(StoreError::CoreField {
                shape: S::NAME,
                key: key.to_string(),
            });
        }

        let previous = {
            let mut state = self.write_lock();
            let Some(previous) = state.remove(key) else {
                return Ok(None);
            };
            tracing::trace!(shape = S::NAME, key, "field removed");
            let change = Change::Removed {
                key: key.to_string(),
                previous: previous.clone(),
            };
            self.dispatcher.enqueue(vec![change], state.clone());
            previous
        };

        self.dispatcher.drain();
        Ok(Some(previous))
    }

    /// Get a clone of the whole record.
    pub fn snapshot(&self) -> Record {
        self.read_lock().clone()
    }

    /// Read the record without cloning.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Record) -> R,
    {
        f(&self.read_lock())
    }

    /// Decode the record into the shape's typed view.
    pub fn view(&self) -> Result<S::View> {
        let json = self.read_lock().to_json();
        serde_json::from_value(json).map_err(|source| StoreError::View {
            shape: S::NAME,
            source,
        })
    }

    /// Returns `true` while the record equals its canonical shape.
    pub fn is_canonical(&self) -> bool {
        *self.read_lock() == S::initial_shape()
    }

    /// Restore the canonical shape.
    ///
    /// Every field present in the canonical shape is reassigned its default,
    /// whether or not it changed, and every other field is deleted. One
    /// change per field present before the reset is delivered to that
    /// field's subscribers, and whole-record subscribers are called once.
    pub fn reset(&self) {
        let target = S::initial_shape();

        {
            let mut state = self.write_lock();
            let keys: Vec<String> = state.keys().map(str::to_owned).collect();
            let mut changes = Vec::with_capacity(keys.len());

            for key in keys {
                match target.get(&key) {
                    Some(value) => {
                        let previous = state.insert(key.clone(), value.clone());
                        changes.push(Change::Assigned {
                            key,
                            previous,
                            value: value.clone(),
                        });
                    }
                    None => {
                        if let Some(previous) = state.remove(&key) {
                            changes.push(Change::Removed { key, previous });
                        }
                    }
                }
            }

            // Core fields are never removed, but keep the key-set guarantee
            // unconditional.
            for (key, value) in &target {
                if !state.contains_key(key) {
                    state.insert(key.clone(), value.clone());
                    changes.push(Change::Assigned {
                        key: key.clone(),
                        previous: None,
                        value: value.clone(),
                    });
                }
            }

            let removed = changes.iter().filter(|c| c.is_removal()).count();
            tracing::debug!(
                shape = S::NAME,
                assigned = changes.len() - removed,
                removed,
                "store reset"
            );
            self.dispatcher.enqueue(changes, state.clone());
        }

        self.dispatcher.drain();
    }

    /// Subscribe to changes of one field.
    pub fn subscribe<F>(&self, key: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        self.dispatcher.notifier().subscribe(key, callback)
    }

    /// Subscribe to the whole record.
    ///
    /// The callback receives the record as it was right after each mutating
    /// operation.
    pub fn subscribe_all<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Record) + Send + Sync + 'static,
    {
        self.dispatcher.notifier().subscribe_all(callback)
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, Record> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Record> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: Shape> Default for SharedState<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Shape> Clone for SharedState<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            dispatcher: self.dispatcher.clone(),
            _shape: PhantomData,
        }
    }
}

impl<S: Shape> fmt::Debug for SharedState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedState")
            .field("shape", &S::NAME)
            .field("record", &*self.read_lock())
            .finish()
    }
}
