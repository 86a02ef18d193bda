use super::Change;
use crate::store::Record;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type FieldCallback = Arc<dyn Fn(&Change) + Send + Sync>;
type RecordCallback = Arc<dyn Fn(&Record) + Send + Sync>;

/// Subscription bookkeeping.
struct NotifierContext {
    next_id: usize,
    // Map from field key to the subscriber IDs watching it
    dependencies: HashMap<String, BTreeSet<usize>>,
    // Map from subscriber ID to the field it watches
    subscriber_keys: HashMap<usize, String>,
    field_subscribers: HashMap<usize, FieldCallback>,
    record_subscribers: BTreeMap<usize, RecordCallback>,
}

impl NotifierContext {
    fn new() -> Self {
        Self {
            next_id: 0,
            dependencies: HashMap::new(),
            subscriber_keys: HashMap::new(),
            field_subscribers: HashMap::new(),
            record_subscribers: BTreeMap::new(),
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Shared notifier state, referenced weakly by [`Subscription`] guards.
pub(crate) struct NotifierInner {
    context: Mutex<NotifierContext>,
}

impl NotifierInner {
    fn lock(&self) -> MutexGuard<'_, NotifierContext> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove_subscriber(&self, id: usize) {
        let mut ctx = self.lock();
        ctx.record_subscribers.remove(&id);
        ctx.field_subscribers.remove(&id);

        if let Some(key) = ctx.subscriber_keys.remove(&id) {
            if let Some(ids) = ctx.dependencies.get_mut(&key) {
                ids.remove(&id);
                if ids.is_empty() {
                    ctx.dependencies.remove(&key);
                }
            }
        }
    }
}

/// Field-level publish/subscribe registry.
///
/// Callbacks are collected under the lock and invoked after it is released,
/// so a callback may subscribe, unsubscribe or trigger further notifications.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                context: Mutex::new(NotifierContext::new()),
            }),
        }
    }

    /// Watch a single field. The callback receives every change to `key`.
    pub fn subscribe<F>(&self, key: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        let key = key.into();
        let mut ctx = self.inner.lock();
        let id = ctx.next_id();

        ctx.dependencies.entry(key.clone()).or_default().insert(id);
        ctx.subscriber_keys.insert(id, key);
        ctx.field_subscribers.insert(id, Arc::new(callback));

        self.guard(id)
    }

    /// Watch the whole record. The callback runs once per mutating operation.
    pub fn subscribe_all<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Record) + Send + Sync + 'static,
    {
        let mut ctx = self.inner.lock();
        let id = ctx.next_id();
        ctx.record_subscribers.insert(id, Arc::new(callback));

        self.guard(id)
    }

    /// Deliver `change` to everything subscribed to its field.
    pub fn notify(&self, change: &Change) {
        let callbacks = {
            let ctx = self.inner.lock();
            ctx.dependencies
                .get(change.key())
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| ctx.field_subscribers.get(id).cloned())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };

        tracing::trace!(
            key = change.key(),
            subscribers = callbacks.len(),
            "dispatching field change"
        );
        for callback in callbacks {
            callback(change);
        }
    }

    /// Deliver the post-mutation record to whole-record subscribers.
    pub fn notify_record(&self, record: &Record) {
        let callbacks = {
            let ctx = self.inner.lock();
            ctx.record_subscribers.values().cloned().collect::<Vec<_>>()
        };

        for callback in callbacks {
            callback(record);
        }
    }

    /// Number of live subscriptions on `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.inner
            .lock()
            .dependencies
            .get(key)
            .map_or(0, BTreeSet::len)
    }

    fn guard(&self, id: usize) -> Subscription {
        Subscription {
            id,
            notifier: Arc::downgrade(&self.inner),
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for a subscription. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: usize,
    notifier: Weak<NotifierInner>,
}

impl Subscription {
    /// Keep the subscription alive for as long as its notifier lives.
    pub fn detach(self) {
        std::mem::forget(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(notifier) = self.notifier.upgrade() {
            notifier.remove_subscriber(self.id);
        }
    }
}
