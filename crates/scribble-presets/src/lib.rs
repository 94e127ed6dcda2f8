#![forbid(unsafe_code)]

//! Named presets: a document's text plus its theme, stored server-side and
//! mirrored by each editor.
//!
//! - [`protocol`] - wire types, routes, name escaping
//! - [`storage`] - [`PresetStorage`] with memory and JSON file backends
//! - [`registry`] - [`PresetRegistry`], validation and list mutation
//! - [`service`] - [`PresetService`], the request router
//! - [`transport`] - [`PresetTransport`] and the in-process [`LocalTransport`]
//! - [`http`] - [`PresetHttpServer`] and [`HttpTransport`], the protocol over HTTP
//! - [`client`] - [`PresetClient`], the editor-side synchronizer
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use scribble_presets::{
//!     LocalTransport, PresetClient, PresetRegistry, PresetService, ServiceConfig,
//! };
//! use scribble_style::Theme;
//!
//! let service = PresetService::new(PresetRegistry::in_memory(), &ServiceConfig::default());
//! let transport = Arc::new(LocalTransport::new(Arc::new(service)));
//! let mut client = PresetClient::new(transport);
//!
//! client.save("draft", "// todo\nship it", &Theme::DEFAULT).unwrap();
//! client.save("draft", "shipped", &Theme::DEFAULT).unwrap();
//! assert_eq!(client.presets().len(), 1);
//! assert_eq!(client.find("draft").unwrap().text, "shipped");
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod protocol;
pub mod registry;
pub mod service;
pub mod storage;
pub mod transport;

pub use client::PresetClient;
pub use error::{PresetError, PresetResult, StoreError, StoreResult};
pub use http::{HttpTransport, PresetHttpServer, ServerHandle};
pub use protocol::{DEFAULT_MOUNT, Method, Preset, PresetList, Request, Response, SaveRequest};
pub use registry::{MAX_TEXT_BYTES, PresetRegistry, validate_name};
pub use service::{PresetService, ServiceConfig};
pub use storage::{FilePresetStorage, MemoryPresetStorage, PresetStorage};
pub use transport::{LocalTransport, PresetTransport};
