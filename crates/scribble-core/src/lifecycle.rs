#![forbid(unsafe_code)]

//! Instance liveness.
//!
//! An editor instance can be torn down while a remote call or a module
//! fetch is still running. Work started on behalf of the instance holds a
//! clone of its [`Liveness`] and checks it before applying a result; once
//! the instance is disposed, late results are dropped instead of touching
//! state that no longer has an owner.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "is this instance still mounted" flag. Clones share state.
#[derive(Clone)]
pub struct Liveness {
    alive: Arc<AtomicBool>,
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    /// A live flag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Whether the owner is still live.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Mark the owner as torn down. Returns `true` the first time.
    pub fn dispose(&self) -> bool {
        self.alive.swap(false, Ordering::AcqRel)
    }

    /// Pass `value` through while live; drop it (and log) after disposal.
    pub fn admit<T>(&self, what: &'static str, value: T) -> Option<T> {
        if self.is_alive() {
            Some(value)
        } else {
            tracing::debug!(what, "discarding result that arrived after teardown");
            None
        }
    }
}

impl fmt::Debug for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Liveness")
            .field("alive", &self.is_alive())
            .finish()
    }
}
