#![forbid(unsafe_code)]

//! Scribble Runtime
//!
//! This crate mounts an editor: it loads the optional rich module, picks a
//! backend, mirrors the buffer into the host, and keeps comment marks and
//! colors in step with the host's controls and the preset store.
//!
//! # Key Components
//!
//! - [`EditorBackend`] - the capability interface, with [`RichBackend`] and
//!   [`FallbackBackend`]
//! - [`ModuleCache`] - loads the rich module once per process
//! - [`BackendLoader`] - turns the load result into a backend, degrading to
//!   the fallback on any failure
//! - [`BufferMirror`] - writes every buffer change into the host text field
//! - [`EditorSession`] - one mounted editor: theme reconfiguration, preset
//!   load, disposal
//! - [`SessionConfig`] - timeouts, history depth, and control defaults
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use scribble_core::KeyEvent;
//! use scribble_presets::{LocalTransport, PresetClient, PresetRegistry, PresetService, ServiceConfig};
//! use scribble_runtime::{
//!     BackendLoader, EditorSession, HostControls, ModuleCache, SessionConfig,
//!     module::BundledSource,
//! };
//!
//! let cache = ModuleCache::shared(Arc::new(BundledSource), Duration::from_secs(1));
//! let service = PresetService::new(PresetRegistry::in_memory(), &ServiceConfig::default());
//! let presets = PresetClient::new(Arc::new(LocalTransport::new(Arc::new(service))));
//! let controls = HostControls::new("a\nb", "# ", "loose");
//!
//! let mut session = EditorSession::mount(
//!     controls.clone(),
//!     &BackendLoader::new(cache),
//!     presets,
//!     SessionConfig::default(),
//! );
//! session.handle_key(&KeyEvent::chord('/'));
//! assert_eq!(controls.text.get(), "a\n# b");
//! ```

pub mod backend;
pub mod config;
pub mod loader;
pub mod mirror;
pub mod module;
pub mod session;

pub use backend::{BackendInit, BackendKind, EditorBackend, FallbackBackend, RichBackend};
pub use config::SessionConfig;
pub use loader::{BackendLoader, LoadError, ModuleCache};
pub use mirror::BufferMirror;
pub use module::{ModuleCapabilities, ModuleSource, ModuleVersion, RichModule};
pub use session::{EditorSession, HostControls, resolve_policy};
