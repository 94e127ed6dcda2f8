//! Rich module loading and backend selection.
//!
//! # Lifecycle
//!
//! A [`ModuleCache`] resolves at most once:
//!
//! 1. The first [`ModuleCache::get_or_load`] call spawns a worker that runs
//!    the source's `fetch` and waits up to the configured timeout
//! 2. Callers arriving while that is in flight block on the same
//!    initialization and receive the same result
//! 3. Every later call returns the stored result; a failure is never retried
//!
//! [`BackendLoader::select`] turns the cached result into a backend. A
//! failed load is logged at `warn` and produces the fallback backend; it is
//! never surfaced as an error.

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use crate::backend::{BackendInit, EditorBackend, FallbackBackend, RichBackend};
use crate::module::{ModuleSource, RichModule};

/// Why the rich module could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The source could not produce the module (network, missing asset).
    Unavailable(String),
    /// The fetch did not finish in time.
    Timeout(Duration),
    /// The module was fetched but cannot drive the rich backend.
    Incompatible(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "rich module unavailable: {msg}"),
            Self::Timeout(after) => write!(f, "rich module load timed out after {after:?}"),
            Self::Incompatible(msg) => write!(f, "rich module incompatible: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Single-initialization cache for the rich module.
///
/// Share one cache (behind an `Arc`) across every editor in a process so the
/// module is fetched once.
pub struct ModuleCache {
    source: Arc<dyn ModuleSource>,
    timeout: Duration,
    cell: OnceLock<Result<Arc<RichModule>, LoadError>>,
}

impl fmt::Debug for ModuleCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCache")
            .field("source", &self.source.name())
            .field("timeout", &self.timeout)
            .field("resolved", &self.cell.get().map(Result::is_ok))
            .finish()
    }
}

impl ModuleCache {
    /// Cache that fetches from `source`, giving up after `timeout`.
    #[must_use]
    pub fn new(source: Arc<dyn ModuleSource>, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            cell: OnceLock::new(),
        }
    }

    /// Convenience for `Arc::new(ModuleCache::new(..))`.
    #[must_use]
    pub fn shared(source: Arc<dyn ModuleSource>, timeout: Duration) -> Arc<Self> {
        Arc::new(Self::new(source, timeout))
    }

    /// Name of the underlying source.
    #[must_use]
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Whether a result (success or failure) is stored.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The stored result, loading it first if this is the first call.
    pub fn get_or_load(&self) -> Result<Arc<RichModule>, LoadError> {
        self.cell.get_or_init(|| self.load()).clone()
    }

    fn load(&self) -> Result<Arc<RichModule>, LoadError> {
        tracing::debug!(source = self.source.name(), timeout = ?self.timeout, "fetching rich module");
        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.source);
        let spawned = thread::Builder::new()
            .name("scribble-module-fetch".into())
            .spawn(move || {
                let _ = tx.send(source.fetch());
            });
        if let Err(err) = spawned {
            return Err(LoadError::Unavailable(format!("cannot start fetch: {err}")));
        }

        let module = match rx.recv_timeout(self.timeout) {
            Ok(result) => result?,
            Err(RecvTimeoutError::Timeout) => return Err(LoadError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(LoadError::Unavailable("fetch worker exited".into()));
            }
        };
        module.check_compatible()?;
        Ok(Arc::new(module))
    }
}

/// Chooses and constructs the backend for one editor.
#[derive(Debug, Clone)]
pub struct BackendLoader {
    cache: Arc<ModuleCache>,
}

impl BackendLoader {
    /// Loader drawing from `cache`.
    #[must_use]
    pub fn new(cache: Arc<ModuleCache>) -> Self {
        Self { cache }
    }

    /// The cache this loader consults.
    #[must_use]
    pub fn cache(&self) -> &Arc<ModuleCache> {
        &self.cache
    }

    /// Build the rich backend if the module loads, else the fallback.
    ///
    /// Never fails: a load failure is logged and degrades to the fallback.
    pub fn select(&self, init: BackendInit) -> Box<dyn EditorBackend> {
        let backend: Box<dyn EditorBackend> = match self.cache.get_or_load() {
            Ok(module) => Box::new(RichBackend::new(module, init)),
            Err(err) => {
                tracing::warn!(
                    source = self.cache.source_name(),
                    error = %err,
                    "rich editor unavailable, using fallback"
                );
                Box::new(FallbackBackend::new(init))
            }
        };
        tracing::debug!(kind = backend.kind().as_str(), "editor backend selected");
        backend
    }
}
