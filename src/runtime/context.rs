use crate::store::{Shape, SharedState};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Registry holding the live store of each shape.
///
/// A runtime owns at most one [`SharedState`] per [`Shape`], created the first
/// time it is requested and kept until the runtime is dropped. The global
/// runtime lives for the whole process; scoped runtimes give tests an
/// isolated set of stores.
///
/// # Examples
///
/// ```
/// use wizard_store::runtime::StoreRuntime;
/// use wizard_store::shapes::Assessment;
///
/// StoreRuntime::scope(|| {
///     let store = wizard_store::store::<Assessment>();
///     store.set("selectedLandmark", 4);
///     assert!(!store.is_canonical());
/// });
/// // The scoped stores are dropped here; the global store is untouched.
/// ```
pub struct StoreRuntime {
    stores: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

// Thread-local stack for scoped runtimes
thread_local! {
    static RUNTIME_STACK: RefCell<Vec<Arc<StoreRuntime>>> = const { RefCell::new(Vec::new()) };
}

impl StoreRuntime {
    /// Create a new, empty runtime.
    pub fn new() -> Arc<Self> {
        Arc::new(StoreRuntime {
            stores: Mutex::new(HashMap::new()),
        })
    }

    /// Run a function with a fresh isolated runtime as the current one.
    pub fn scope<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        Self::with_runtime(Self::new(), f)
    }

    /// The process-wide runtime used when no scoped runtime is active.
    pub fn global() -> Arc<Self> {
        static RUNTIME: OnceLock<Arc<StoreRuntime>> = OnceLock::new();
        Arc::clone(RUNTIME.get_or_init(Self::new))
    }

    /// The innermost scoped runtime on this thread, or the global one.
    pub fn current() -> Arc<Self> {
        RUNTIME_STACK.with(|stack| stack.borrow().last().cloned().unwrap_or_else(Self::global))
    }

    /// Run a function with `runtime` as the current runtime on this thread.
    pub fn with_runtime<F, R>(runtime: Arc<Self>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        RUNTIME_STACK.with(|stack| {
            stack.borrow_mut().push(runtime);
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

        RUNTIME_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });

        match result {
            Ok(r) => r,
            Err(e) => std::panic::resume_unwind(e),
        }
    }

    /// The live store for shape `S`, created on first access.
    pub fn store<S: Shape>(&self) -> SharedState<S> {
        let mut stores = self.lock();
        let id = TypeId::of::<S>();

        if let Some(store) = stores
            .get(&id)
            .and_then(|store| store.downcast_ref::<SharedState<S>>())
        {
            return store.clone();
        }

        let store = SharedState::<S>::new();
        stores.insert(id, Box::new(store.clone()));
        store
    }

    /// Returns `true` if the store for `S` has been created.
    pub fn contains<S: Shape>(&self) -> bool {
        self.lock().contains_key(&TypeId::of::<S>())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TypeId, Box<dyn Any + Send + Sync>>> {
        self.stores.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
