#![forbid(unsafe_code)]

//! Host-owned observable fields.
//!
//! The host owns a handful of values the editor core reads or writes: the
//! serialized text, the comment prefix, the comment mode, and the panel
//! theme. A [`HostField`] wraps such a value and lets interested parties
//! register observers explicitly instead of wrapping the host's own change
//! handlers.
//!
//! # How it works
//!
//! 1. The host creates a field and keeps a clone (clones share state)
//! 2. The editor calls [`HostField::subscribe`] and keeps the returned
//!    [`SubscriptionHandle`]
//! 3. Every [`HostField::set`] stores the value, then notifies observers in
//!    registration order with a snapshot of the value and no lock held
//! 4. Dropping (or [`SubscriptionHandle::cancel`]ing) the handle removes the
//!    observer
//!
//! Observers may read the field they observe, and may subscribe or cancel
//! from inside a notification; both take effect for the next `set`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

/// A unique identifier for a subscription within one field.
pub type SubId = u64;

type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Shared<T> {
    value: RwLock<T>,
    observers: Mutex<Vec<(SubId, Observer<T>)>>,
    next_id: AtomicU64,
}

/// A value owned by the host, shared by cloning, observable by subscription.
pub struct HostField<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for HostField<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Default + Send + Sync + 'static> Default for HostField<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + Send + Sync + 'static> HostField<T> {
    /// Create a field holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            shared: Arc::new(Shared {
                value: RwLock::new(value),
                observers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Read the value through a closure without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self.shared.value.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    /// Replace the value and notify every observer.
    pub fn set(&self, value: T) {
        self.store(value);
        self.notify();
    }

    /// Replace the value without notifying observers.
    ///
    /// Writers that hold a lock their observers may take (the buffer mirror
    /// under the editor lock) store first and call [`notify`](Self::notify)
    /// once the lock is released.
    pub fn store(&self, value: T) {
        match self.shared.value.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    /// Notify observers with the current value.
    pub fn notify(&self) {
        let observers: Vec<Observer<T>> = match self.shared.observers.lock() {
            Ok(guard) => guard.iter().map(|(_, obs)| Arc::clone(obs)).collect(),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .map(|(_, obs)| Arc::clone(obs))
                .collect(),
        };
        if observers.is_empty() {
            return;
        }
        tracing::trace!(observers = observers.len(), "host field changed");
        let value = self.get();
        for observer in observers {
            observer(&value);
        }
    }

    /// Register an observer called after every [`set`](Self::set).
    ///
    /// The observer stays registered until the returned handle is dropped
    /// or cancelled.
    #[must_use = "dropping the handle unsubscribes immediately"]
    pub fn subscribe(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionHandle {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let observer: Observer<T> = Arc::new(observer);
        match self.shared.observers.lock() {
            Ok(mut guard) => guard.push((id, observer)),
            Err(poisoned) => poisoned.into_inner().push((id, observer)),
        }
        let weak: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        SubscriptionHandle {
            id,
            cancel: Some(Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    let mut guard = match shared.observers.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    guard.retain(|(sub_id, _)| *sub_id != id);
                }
            })),
        }
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.shared.observers.lock().map(|g| g.len()).unwrap_or(0)
    }

    /// Clone the current value out.
    #[must_use]
    pub fn get(&self) -> T {
        self.with(T::clone)
    }
}

impl<T: Clone + fmt::Debug + Send + Sync + 'static> fmt::Debug for HostField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|value| {
            f.debug_struct("HostField")
                .field("value", value)
                .field("observers", &self.observer_count())
                .finish()
        })
    }
}

/// Registration handle returned by [`HostField::subscribe`].
///
/// Dropping the handle removes the observer.
pub struct SubscriptionHandle {
    id: SubId,
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl SubscriptionHandle {
    /// The subscription id within its field.
    #[must_use]
    pub fn id(&self) -> SubId {
        self.id
    }

    /// Remove the observer now.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .finish()
    }
}
