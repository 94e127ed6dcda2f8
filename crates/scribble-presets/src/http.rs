//! The preset protocol over HTTP.
//!
//! [`PresetHttpServer`] serves a [`PresetService`] on a socket, one request
//! at a time, on a background thread. [`HttpTransport`] is the matching
//! client side: a [`PresetTransport`] that sends each [`Request`] as an HTTP
//! call against a base URL such as `http://127.0.0.1:8188`.

use std::io::{self, Read};
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tiny_http::{Header, Server};

use crate::error::{PresetError, PresetResult};
use crate::protocol::{Method, Request, Response};
use crate::service::PresetService;
use crate::transport::PresetTransport;

/// Default per-request timeout of [`HttpTransport`].
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// A bound, not yet running, HTTP front for a [`PresetService`].
pub struct PresetHttpServer {
    server: Arc<Server>,
    service: Arc<PresetService>,
    addr: SocketAddr,
}

impl std::fmt::Debug for PresetHttpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresetHttpServer")
            .field("addr", &self.addr)
            .finish()
    }
}

impl PresetHttpServer {
    /// Bind `addr`. Port 0 picks a free port; see [`local_addr`](Self::local_addr).
    pub fn bind(addr: impl ToSocketAddrs, service: Arc<PresetService>) -> io::Result<Self> {
        let server = Server::http(addr).map_err(io::Error::other)?;
        let Some(addr) = server.server_addr().to_ip() else {
            return Err(io::Error::other("preset server is not on an IP socket"));
        };
        tracing::info!(%addr, "preset server listening");
        Ok(Self {
            server: Arc::new(server),
            service,
            addr,
        })
    }

    /// The bound address.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://{addr}`, usable as an [`HttpTransport`] base.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve on the current thread until the socket fails.
    pub fn run(&self) {
        while let Ok(request) = self.server.recv() {
            respond(&self.service, request);
        }
        tracing::debug!(addr = %self.addr, "preset server stopped");
    }

    /// Serve on a background thread. The returned handle stops it.
    pub fn spawn(self) -> io::Result<ServerHandle> {
        let server = Arc::clone(&self.server);
        let addr = self.addr;
        let thread = thread::Builder::new()
            .name("scribble-preset-http".into())
            .spawn(move || self.run())?;
        Ok(ServerHandle {
            server,
            addr,
            thread: Some(thread),
        })
    }
}

/// A running [`PresetHttpServer`]. Dropping it stops the server.
pub struct ServerHandle {
    server: Arc<Server>,
    addr: SocketAddr,
    thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerHandle")
            .field("addr", &self.addr)
            .field("running", &self.thread.is_some())
            .finish()
    }
}

impl ServerHandle {
    /// The bound address.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://{addr}`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop accepting requests and wait for the serving thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.server.unblock();
        if thread.join().is_err() {
            tracing::warn!(addr = %self.addr, "preset server thread panicked");
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn protocol_method(method: &tiny_http::Method) -> Option<Method> {
    match method {
        tiny_http::Method::Get => Some(Method::Get),
        tiny_http::Method::Post => Some(Method::Post),
        tiny_http::Method::Delete => Some(Method::Delete),
        _ => None,
    }
}

fn respond(service: &PresetService, mut request: tiny_http::Request) {
    let response = match protocol_method(request.method()) {
        None => Response::error(405, "method not allowed"),
        Some(method) => {
            let mut body = String::new();
            match request.as_reader().read_to_string(&mut body) {
                Ok(_) => service.handle(&Request {
                    method,
                    path: request.url().to_string(),
                    body: (!body.is_empty()).then_some(body),
                }),
                Err(e) => {
                    tracing::debug!(error = %e, "unreadable request body");
                    Response::error(400, "invalid request body")
                }
            }
        }
    };

    let mut reply =
        tiny_http::Response::from_string(response.body).with_status_code(response.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        reply = reply.with_header(header);
    }
    if let Err(e) = request.respond(reply) {
        tracing::debug!(error = %e, "client went away before the response");
    }
}

/// [`PresetTransport`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Transport against `base_url` with [`DEFAULT_HTTP_TIMEOUT`].
    pub fn new(base_url: impl Into<String>) -> PresetResult<Self> {
        Self::with_timeout(base_url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Transport against `base_url` giving up on each call after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> PresetResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PresetError::Transport(format!("cannot build HTTP client: {e}")))?;
        let base = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base, client })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base
    }
}

impl PresetTransport for HttpTransport {
    fn send(&self, request: Request) -> PresetResult<Response> {
        let url = format!("{}{}", self.base, request.path);
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };
        let builder = match request.body {
            Some(body) => builder.header(CONTENT_TYPE, "application/json").body(body),
            None => builder,
        };
        let response = builder
            .send()
            .map_err(|e| PresetError::Transport(format!("{} {url}: {e}", request.method.as_str())))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| PresetError::Transport(format!("reading response from {url}: {e}")))?;
        Ok(Response { status, body })
    }
}
