//! Observer registry with individually removable listeners.
//!
//! Warning and timeout listeners are registered by independent parts of the
//! application (toast layer, gateway wiring, tests). Each registration
//! returns an [`ObserverHandle`] that removes exactly that listener, so a
//! component unmounting cannot leak its callback or tear down anyone else's.

use std::sync::Arc;

/// Ordered list of observers, each addressable by the id it was added under.
pub struct ObserverRegistry<F: ?Sized> {
    entries: Vec<(u64, Arc<F>)>,
    next_id: u64,
}

impl<F: ?Sized> Default for ObserverRegistry<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<F: ?Sized> ObserverRegistry<F> {
    /// Register an observer and return its id.
    pub fn add(&mut self, observer: Arc<F>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    /// Remove the observer registered under `id`. Returns whether anything
    /// was removed; removing twice is harmless.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        before != self.entries.len()
    }

    /// Clone the current observers, in registration order.
    ///
    /// Callers invoke the clones outside any lock so an observer can safely
    /// call back into the owning manager.
    pub fn snapshot(&self) -> Vec<Arc<F>> {
        self.entries.iter().map(|(_, f)| Arc::clone(f)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Disposer for a registered observer.
///
/// Calling [`dispose`](Self::dispose) removes the listener; dropping the
/// handle without disposing leaves it registered. Disposal after the owning
/// manager is gone is a no-op.
#[must_use = "dropping the handle keeps the observer registered; call dispose() to remove it"]
pub struct ObserverHandle {
    remove: Option<Box<dyn FnOnce() + Send>>,
}

impl ObserverHandle {
    pub(crate) fn new(remove: impl FnOnce() + Send + 'static) -> Self {
        Self {
            remove: Some(Box::new(remove)),
        }
    }

    /// Remove the observer this handle was returned for.
    pub fn dispose(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl std::fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverHandle")
            .field("disposed", &self.remove.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Callback = dyn Fn() + Send + Sync;

    #[test]
    fn test_add_and_snapshot_order() {
        let mut registry: ObserverRegistry<Callback> = ObserverRegistry::default();
        registry.add(Arc::new(|| {}));
        registry.add(Arc::new(|| {}));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn test_remove_only_targets_one_entry() {
        let mut registry: ObserverRegistry<Callback> = ObserverRegistry::default();
        let first = registry.add(Arc::new(|| {}));
        let second = registry.add(Arc::new(|| {}));

        assert!(registry.remove(first));
        assert_eq!(registry.len(), 1);

        // Removing again is a no-op.
        assert!(!registry.remove(first));
        assert!(registry.remove(second));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_handle_dispose_runs_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let count = Arc::new(AtomicUsize::new(0));
        let count_in_handle = Arc::clone(&count);
        let handle = ObserverHandle::new(move || {
            count_in_handle.fetch_add(1, Ordering::SeqCst);
        });

        handle.dispose();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropping_handle_keeps_observer() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let count = Arc::new(AtomicUsize::new(0));
        let count_in_handle = Arc::clone(&count);
        let handle = ObserverHandle::new(move || {
            count_in_handle.fetch_add(1, Ordering::SeqCst);
        });

        drop(handle);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
