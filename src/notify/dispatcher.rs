use super::{Change, Notifier};
use crate::store::Record;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The changes made by one mutation and the record right after it.
struct Batch {
    changes: Vec<Change>,
    snapshot: Record,
}

#[derive(Default)]
struct Queue {
    pending: VecDeque<Batch>,
    draining: bool,
}

/// Delivers mutation batches to a [`Notifier`] in the order they were made.
///
/// Batches are enqueued while the mutation still holds the record's write
/// lock, so queue order is mutation order. Only one thread drains at a time;
/// a drain requested while another is running (including one from inside a
/// callback) leaves its batch to the running drain.
#[derive(Clone)]
pub(crate) struct Dispatcher {
    notifier: Notifier,
    queue: Arc<Mutex<Queue>>,
}

impl Dispatcher {
    pub(crate) fn new() -> Self {
        Self {
            notifier: Notifier::new(),
            queue: Arc::new(Mutex::new(Queue::default())),
        }
    }

    pub(crate) fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub(crate) fn enqueue(&self, changes: Vec<Change>, snapshot: Record) {
        self.lock().pending.push_back(Batch { changes, snapshot });
    }

    /// Deliver every pending batch, unless another drain is already running.
    pub(crate) fn drain(&self) {
        {
            let mut queue = self.lock();
            if queue.draining {
                return;
            }
            queue.draining = true;
        }
        let _guard = DrainGuard { dispatcher: self };

        loop {
            let batch = {
                let mut queue = self.lock();
                match queue.pending.pop_front() {
                    Some(batch) => batch,
                    None => {
                        queue.draining = false;
                        return;
                    }
                }
            };

            for change in &batch.changes {
                self.notifier.notify(change);
            }
            self.notifier.notify_record(&batch.snapshot);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the drain flag if a callback panics mid-drain.
struct DrainGuard<'a> {
    dispatcher: &'a Dispatcher,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.dispatcher.lock().draining = false;
        }
    }
}
