//! Explicit single-instance registry.
//!
//! A [`Registry`] holds at most one shared instance per type. It replaces a
//! process-wide static singleton: callers own the registry, so two registries
//! never see each other's instances and tests can start from an empty one.

use std::any::{type_name, Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

type Instance = Arc<dyn Any + Send + Sync>;
type Slot = Arc<OnceLock<Instance>>;

/// Holds at most one instance of each type, created on first request.
///
/// # Examples
///
/// ```
/// use nlib::Registry;
///
/// struct Settings {
///     retries: u32,
/// }
///
/// let registry = Registry::new();
/// let first = registry.get_or_init(|| Settings { retries: 3 });
/// let second = registry.get_or_init(|| Settings { retries: 99 });
///
/// assert_eq!(second.retries, 3);
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// ```
#[derive(Default)]
pub struct Registry {
    slots: RwLock<BTreeMap<TypeId, Slot>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(BTreeMap::new()),
        }
    }

    /// Returns the instance of `T`, creating it with `init` if none exists.
    ///
    /// `init` runs at most once per type, even when several threads ask for
    /// the same type concurrently, as long as the type is not removed in the
    /// meantime. Initializers may use the registry to
    /// fetch instances of other types.
    ///
    /// The returned instance is always the one the registry holds when the
    /// call returns. If [`insert`](Self::insert) registers a `T` while `init`
    /// is running, the inserted instance wins and is returned. If the type is
    /// [`remove`](Self::remove)d or the registry is [`clear`](Self::clear)ed
    /// while `init` is running, the created instance is registered again.
    pub fn get_or_init<T, F>(&self, init: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let slot = self.slot::<T>();
        let mut created = false;
        let instance = slot
            .get_or_init(|| {
                created = true;
                Arc::new(init()) as Instance
            })
            .clone();

        let instance = self.publish(TypeId::of::<T>(), &slot, instance);
        if created {
            tracing::debug!(type_name = type_name::<T>(), "created instance");
        }
        downcast(instance)
    }

    /// Returns the instance of `T`, if one has been created or inserted.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let slots = self.slots.read();
        let instance = slots.get(&TypeId::of::<T>())?.get()?.clone();
        Some(downcast(instance))
    }

    /// Returns true if an instance of `T` is present.
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.slots
            .read()
            .get(&TypeId::of::<T>())
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Registers `value` as the instance of `T`, returning the one it replaced.
    pub fn insert<T: Any + Send + Sync>(&self, value: T) -> Option<Arc<T>> {
        let slot = Slot::new(OnceLock::from(Arc::new(value) as Instance));

        let previous = self.slots.write().insert(TypeId::of::<T>(), slot);
        let previous = previous.and_then(|slot| slot.get().cloned());
        if previous.is_some() {
            tracing::debug!(type_name = type_name::<T>(), "replaced instance");
        } else {
            tracing::debug!(type_name = type_name::<T>(), "inserted instance");
        }
        previous.map(downcast)
    }

    /// Removes and returns the instance of `T`.
    pub fn remove<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let slot = self.slots.write().remove(&TypeId::of::<T>())?;
        slot.get().cloned().map(downcast)
    }

    /// Number of types with an instance.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    /// Returns true if no instances are present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every instance held by the registry.
    ///
    /// Callers holding an `Arc` keep their instance alive.
    pub fn clear(&self) {
        self.slots.write().clear();
    }

    /// Resolves `instance`, taken from `slot`, against the slot the map holds now.
    ///
    /// `slot` may have been detached by `insert`, `remove` or `clear` while it
    /// was being initialized.
    fn publish(&self, id: TypeId, slot: &Slot, instance: Instance) -> Instance {
        let attached = |current: Option<&Slot>| current.is_some_and(|c| Arc::ptr_eq(c, slot));
        if attached(self.slots.read().get(&id)) {
            return instance;
        }

        let mut slots = self.slots.write();
        if attached(slots.get(&id)) {
            return instance;
        }
        if let Some(existing) = slots.get(&id).and_then(|current| current.get()) {
            return Arc::clone(existing);
        }
        // Absent, or an empty slot another caller is still initializing.
        slots.insert(id, Arc::clone(slot));
        instance
    }

    fn slot<T: Any>(&self) -> Slot {
        let id = TypeId::of::<T>();
        if let Some(slot) = self.slots.read().get(&id) {
            return Arc::clone(slot);
        }
        Arc::clone(self.slots.write().entry(id).or_default())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.len())
            .finish()
    }
}

fn downcast<T: Any + Send + Sync>(instance: Instance) -> Arc<T> {
    match instance.downcast::<T>() {
        Ok(value) => value,
        Err(_) => unreachable!("registry slot for {} holds another type", type_name::<T>()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;

    #[derive(Debug, PartialEq)]
    struct Config {
        name: &'static str,
    }

    #[derive(Debug, PartialEq)]
    struct Counter(u32);

    #[test]
    fn new_registry_is_empty() {
        let registry = Registry::new();

        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.get::<Config>().is_none());
    }

    #[test]
    fn get_or_init_creates_once() {
        let registry = Registry::new();
        let calls = AtomicUsize::new(0);

        let a = registry.get_or_init(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            Config { name: "a" }
        });
        let b = registry.get_or_init(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            Config { name: "b" }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.name, "a");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn instances_are_per_type() {
        let registry = Registry::new();
        registry.get_or_init(|| Config { name: "cfg" });
        registry.get_or_init(|| Counter(7));

        assert_eq!(registry.len(), 2);
        assert_eq!(*registry.get::<Counter>().unwrap(), Counter(7));
        assert_eq!(registry.get::<Config>().unwrap().name, "cfg");
    }

    #[test]
    fn registries_are_isolated() {
        let first = Registry::new();
        let second = Registry::new();

        first.get_or_init(|| Counter(1));

        assert!(first.contains::<Counter>());
        assert!(!second.contains::<Counter>());
    }

    #[test]
    fn insert_replaces_and_returns_previous() {
        let registry = Registry::new();

        assert!(registry.insert(Counter(1)).is_none());
        let previous = registry.insert(Counter(2)).expect("should replace");

        assert_eq!(*previous, Counter(1));
        assert_eq!(*registry.get::<Counter>().unwrap(), Counter(2));
    }

    #[test]
    fn remove_returns_instance() {
        let registry = Registry::new();
        registry.insert(Counter(5));

        let removed = registry.remove::<Counter>().expect("should be present");

        assert_eq!(*removed, Counter(5));
        assert!(!registry.contains::<Counter>());
        assert!(registry.remove::<Counter>().is_none());
    }

    #[test]
    fn clear_drops_registry_references() {
        let registry = Registry::new();
        let held = registry.get_or_init(|| Counter(3));

        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(*held, Counter(3));
        assert_eq!(Arc::strong_count(&held), 1);
    }

    #[test]
    fn initializer_may_use_registry() {
        let registry = Registry::new();

        let config = registry.get_or_init(|| {
            let counter = registry.get_or_init(|| Counter(10));
            Config {
                name: if counter.0 == 10 { "ten" } else { "other" },
            }
        });

        assert_eq!(config.name, "ten");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn concurrent_get_or_init_runs_initializer_once() {
        let registry = Registry::new();
        let calls = AtomicUsize::new(0);

        let instances: Vec<Arc<Counter>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        registry.get_or_init(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Counter(42)
                        })
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn insert_during_initialization_wins() {
        let registry = Registry::new();

        let returned = registry.get_or_init(|| {
            registry.insert(Counter(1));
            Counter(2)
        });

        let stored = registry.get::<Counter>().expect("should be present");
        assert_eq!(*returned, Counter(1));
        assert!(Arc::ptr_eq(&returned, &stored));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_during_initialization_keeps_created_instance() {
        let registry = Registry::new();

        let returned = registry.get_or_init(|| {
            assert!(registry.remove::<Counter>().is_none());
            Counter(3)
        });

        let stored = registry.get::<Counter>().expect("should be present");
        assert!(Arc::ptr_eq(&returned, &stored));
    }

    #[test]
    fn clear_during_initialization_keeps_created_instance() {
        let registry = Registry::new();
        registry.insert(Config { name: "cfg" });

        let returned = registry.get_or_init(|| {
            registry.clear();
            Counter(4)
        });

        assert!(Arc::ptr_eq(&returned, &registry.get::<Counter>().unwrap()));
        assert!(!registry.contains::<Config>());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn insert_racing_get_or_init_from_another_thread() {
        let registry = Registry::new();
        let registry = &registry;
        let (started_tx, started_rx) = mpsc::channel();
        let (inserted_tx, inserted_rx) = mpsc::channel();

        std::thread::scope(|scope| {
            let getter = scope.spawn(move || {
                registry.get_or_init(move || {
                    started_tx.send(()).unwrap();
                    inserted_rx.recv().unwrap();
                    Counter(2)
                })
            });

            started_rx.recv().unwrap();
            assert!(registry.insert(Counter(1)).is_none());
            inserted_tx.send(()).unwrap();

            let returned = getter.join().unwrap();
            let stored = registry.get::<Counter>().expect("should be present");
            assert_eq!(*returned, Counter(1));
            assert!(Arc::ptr_eq(&returned, &stored));
        });
    }

    #[test]
    fn registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
