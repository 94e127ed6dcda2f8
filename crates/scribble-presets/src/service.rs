//! Request router for the preset endpoints.
//!
//! [`PresetService::handle`] maps a [`Request`] to the registry and always
//! produces a [`Response`]; nothing here panics or propagates an error to the
//! host.
//!
//! | Outcome | Status |
//! |---------|--------|
//! | Success | 200 with `{ "presets": [...] }` |
//! | Invalid name, oversized text, malformed body | 400 |
//! | Unknown path | 404 |
//! | Known path, wrong method | 405 |
//! | Storage failure | 500 |

use crate::error::StoreError;
use crate::protocol::{DEFAULT_MOUNT, Method, Request, Response, SaveRequest, decode_name, presets_path};
use crate::registry::PresetRegistry;

/// Router configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Path prefix the preset routes hang off.
    pub mount: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            mount: DEFAULT_MOUNT.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Use `mount` as the route prefix.
    #[must_use]
    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = mount.into();
        self
    }
}

enum Route<'a> {
    Collection,
    Item(&'a str),
}

/// The preset endpoints over one registry.
#[derive(Debug)]
pub struct PresetService {
    registry: PresetRegistry,
    collection: String,
}

impl PresetService {
    /// Serve `registry` under `config.mount`.
    #[must_use]
    pub fn new(registry: PresetRegistry, config: &ServiceConfig) -> Self {
        Self {
            registry,
            collection: presets_path(&config.mount),
        }
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &PresetRegistry {
        &self.registry
    }

    /// Handle one request.
    pub fn handle(&self, request: &Request) -> Response {
        let path = request
            .path
            .split_once('?')
            .map_or(request.path.as_str(), |(p, _)| p);
        let response = match (self.route(path), request.method) {
            (Some(Route::Collection), Method::Get) => self.list(),
            (Some(Route::Collection), Method::Post) => self.save(request.body.as_deref()),
            (Some(Route::Item(segment)), Method::Delete) => self.delete(segment),
            (Some(_), _) => Response::error(405, "method not allowed"),
            (None, _) => Response::error(404, "not found"),
        };
        tracing::debug!(
            method = request.method.as_str(),
            path,
            status = response.status,
            "preset request"
        );
        response
    }

    fn route<'a>(&self, path: &'a str) -> Option<Route<'a>> {
        let rest = path.strip_prefix(self.collection.as_str())?;
        if rest.is_empty() || rest == "/" {
            return Some(Route::Collection);
        }
        let segment = rest.strip_prefix('/')?;
        (!segment.is_empty() && !segment.contains('/')).then_some(Route::Item(segment))
    }

    fn list(&self) -> Response {
        match self.registry.list() {
            Ok(list) => Response::json(200, &list),
            Err(e) => store_failure(&e),
        }
    }

    fn save(&self, body: Option<&str>) -> Response {
        let parsed: SaveRequest = match serde_json::from_str(body.unwrap_or("")) {
            Ok(req) => req,
            Err(e) => {
                tracing::debug!(error = %e, "rejecting malformed save body");
                return Response::error(400, "invalid JSON body");
            }
        };
        match self
            .registry
            .upsert(&parsed.name, &parsed.text, parsed.theme)
        {
            Ok(list) => Response::json(200, &list),
            Err(e) => store_failure(&e),
        }
    }

    fn delete(&self, segment: &str) -> Response {
        let Some(name) = decode_name(segment) else {
            return Response::error(400, "invalid preset name");
        };
        match self.registry.delete(&name) {
            Ok(list) => Response::json(200, &list),
            Err(e) => store_failure(&e),
        }
    }
}

fn store_failure(err: &StoreError) -> Response {
    if err.is_validation() {
        Response::error(400, &err.to_string())
    } else {
        tracing::warn!(error = %err, "preset storage failure");
        Response::error(500, &err.to_string())
    }
}
