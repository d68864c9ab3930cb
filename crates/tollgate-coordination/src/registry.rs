//! Name → primitive registries.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// A primitive that can be torn down when removed from its registry.
pub trait Closable {
    /// Close wake sources and cancel pending timers. Current waiters must
    /// observe successful completion, not an error.
    fn close(&self);
}

/// Per-kind mapping from name to live primitive.
///
/// Lookup is the hot path and takes the read lock; create and delete take
/// the write lock. The registry lock is the outermost in the lock order:
/// nothing here runs while a primitive's own lock is held, and `close` is
/// invoked after the map lock is released.
#[derive(Debug)]
pub struct Registry<P> {
    entries: RwLock<HashMap<String, Arc<P>>>,
}

impl<P: Closable> Registry<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch `name`, constructing it with `make` on first reference.
    /// Returns the primitive and whether this call created it.
    pub fn get_or_create(&self, name: &str, make: impl FnOnce() -> Arc<P>) -> (Arc<P>, bool) {
        if let Some(existing) = self.entries.read().get(name) {
            return (existing.clone(), false);
        }

        let mut entries = self.entries.write();
        // another creator may have won between the two locks
        if let Some(existing) = entries.get(name) {
            return (existing.clone(), false);
        }
        let created = make();
        entries.insert(name.to_string(), created.clone());
        (created, true)
    }

    /// Look up `name` without creating it.
    pub fn get(&self, name: &str) -> Option<Arc<P>> {
        self.entries.read().get(name).cloned()
    }

    /// Remove `name`, waking its waiters. Returns false if absent.
    pub fn delete(&self, name: &str) -> bool {
        let removed = self.entries.write().remove(name);
        match removed {
            Some(primitive) => {
                primitive.close();
                true
            }
            None => false,
        }
    }
}

impl<P: Closable> Default for Registry<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Dummy {
        closed: AtomicUsize,
    }

    impl Dummy {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                closed: AtomicUsize::new(0),
            })
        }
    }

    impl Closable for Dummy {
        fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let registry = Registry::new();
        let (first, created) = registry.get_or_create("a", Dummy::new);
        assert!(created);
        let (second, created) = registry.get_or_create("a", Dummy::new);
        assert!(!created);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn delete_closes_and_removes() {
        let registry = Registry::new();
        let (entry, _) = registry.get_or_create("a", Dummy::new);

        assert!(registry.delete("a"));
        assert_eq!(entry.closed.load(Ordering::SeqCst), 1);
        assert!(registry.get("a").is_none());
        assert!(!registry.delete("a"));
    }

    #[test]
    fn delete_then_create_yields_a_fresh_instance() {
        let registry = Registry::new();
        let (first, _) = registry.get_or_create("a", Dummy::new);
        registry.delete("a");
        let (second, created) = registry.get_or_create("a", Dummy::new);
        assert!(created);
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
