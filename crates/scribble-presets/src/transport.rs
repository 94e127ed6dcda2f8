//! How the client reaches the preset service.
//!
//! The client speaks [`Request`]/[`Response`] and never cares what carries
//! them. [`LocalTransport`] hands requests straight to an in-process
//! [`PresetService`]; [`HttpTransport`](crate::http::HttpTransport) reaches
//! one served over HTTP.

use std::sync::Arc;

use crate::error::PresetResult;
use crate::protocol::{Request, Response};
use crate::service::PresetService;

/// Carries one request to the service and returns its response.
///
/// Errors mean no response was received ([`PresetError::Transport`]);
/// non-2xx responses are returned as `Ok`.
///
/// [`PresetError::Transport`]: crate::error::PresetError::Transport
pub trait PresetTransport: Send + Sync {
    /// Send `request` and wait for the response.
    fn send(&self, request: Request) -> PresetResult<Response>;
}

impl<T: PresetTransport + ?Sized> PresetTransport for Arc<T> {
    fn send(&self, request: Request) -> PresetResult<Response> {
        (**self).send(request)
    }
}

/// In-process transport over a shared service.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    service: Arc<PresetService>,
}

impl LocalTransport {
    /// Transport that calls `service` directly.
    #[must_use]
    pub fn new(service: Arc<PresetService>) -> Self {
        Self { service }
    }

    /// The service behind this transport.
    #[must_use]
    pub fn service(&self) -> &Arc<PresetService> {
        &self.service
    }
}

impl PresetTransport for LocalTransport {
    fn send(&self, request: Request) -> PresetResult<Response> {
        Ok(self.service.handle(&request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DEFAULT_MOUNT;
    use crate::registry::PresetRegistry;
    use crate::service::ServiceConfig;

    #[test]
    fn local_transport_reaches_service() {
        let service = Arc::new(PresetService::new(
            PresetRegistry::in_memory(),
            &ServiceConfig::default(),
        ));
        let transport = LocalTransport::new(Arc::clone(&service));
        let resp = transport.send(Request::list(DEFAULT_MOUNT)).unwrap();
        assert!(resp.is_success());

        let shared: Arc<dyn PresetTransport> = Arc::new(transport);
        assert!(shared.send(Request::list(DEFAULT_MOUNT)).unwrap().is_success());
    }
}
