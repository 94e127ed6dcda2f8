//! Client-side preset synchronizer.
//!
//! [`PresetClient`] keeps a cached copy of the server's list. Every call that
//! reaches the server replaces the cache with the list in the response, so
//! the cache always reflects the most recently completed call. Failures
//! leave the cache untouched.
//!
//! Names are trimmed, and saves and deletes with an empty name are skipped
//! before any request is made. Once the owning editor is disposed no request
//! is sent, and results that land after disposal are dropped. Both report
//! [`PresetError::Disposed`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use scribble_core::Liveness;
use scribble_style::Theme;

use crate::error::{PresetError, PresetResult};
use crate::protocol::{DEFAULT_MOUNT, ErrorBody, Preset, PresetList, Request, Response, SaveRequest};
use crate::transport::PresetTransport;

/// Cached view of the remote preset list.
pub struct PresetClient {
    transport: Arc<dyn PresetTransport>,
    mount: String,
    presets: Vec<Preset>,
    loaded: Option<String>,
    liveness: Liveness,
}

impl std::fmt::Debug for PresetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresetClient")
            .field("mount", &self.mount)
            .field("presets", &self.presets.len())
            .field("loaded", &self.loaded)
            .field("liveness", &self.liveness)
            .finish()
    }
}

impl PresetClient {
    /// Client over `transport` using the default mount.
    #[must_use]
    pub fn new(transport: Arc<dyn PresetTransport>) -> Self {
        Self {
            transport,
            mount: DEFAULT_MOUNT.to_string(),
            presets: Vec::new(),
            loaded: None,
            liveness: Liveness::new(),
        }
    }

    /// Use `mount` as the route prefix.
    #[must_use]
    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = mount.into();
        self
    }

    /// Tie results to an editor's lifetime.
    #[must_use]
    pub fn with_liveness(mut self, liveness: Liveness) -> Self {
        self.liveness = liveness;
        self
    }

    /// The liveness flag results are checked against.
    #[must_use]
    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }

    /// Cached list in server order.
    #[must_use]
    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    /// Cached preset called `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Cached presets whose name contains `query`, ignoring case. An empty
    /// query matches everything.
    #[must_use]
    pub fn filtered(&self, query: &str) -> Vec<&Preset> {
        let query = query.to_lowercase();
        self.presets
            .iter()
            .filter(|p| query.is_empty() || p.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Name of the preset last saved or loaded, if it still exists.
    #[must_use]
    pub fn loaded_preset(&self) -> Option<&str> {
        self.loaded.as_deref()
    }

    /// Record that `name` was loaded into the editor.
    pub fn mark_loaded(&mut self, name: &str) {
        self.loaded = Some(name.to_string());
    }

    /// Fetch the full list and replace the cache.
    pub fn list(&mut self) -> PresetResult<&[Preset]> {
        let list = self.fetch()?;
        self.replace(list);
        Ok(&self.presets)
    }

    /// Upsert `name` with `text` and `theme`.
    ///
    /// `name` is trimmed; an empty name is skipped without a request and
    /// returns `Ok(false)`.
    pub fn save(&mut self, name: &str, text: &str, theme: &Theme) -> PresetResult<bool> {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("save skipped: empty preset name");
            return Ok(false);
        }
        let body = SaveRequest {
            name: name.to_string(),
            text: text.to_string(),
            theme: theme.to_wire(),
        };
        let request = Request::save(&self.mount, &body)
            .map_err(|e| PresetError::Decode(format!("failed to encode save body: {e}")))?;
        let list = decode_list(&self.call(request)?)?;
        self.replace(list);
        self.loaded = Some(name.to_string());
        Ok(true)
    }

    /// Delete `name`.
    ///
    /// `name` is trimmed; an empty name is skipped without a request and
    /// returns `Ok(false)`.
    pub fn delete(&mut self, name: &str) -> PresetResult<bool> {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("delete skipped: empty preset name");
            return Ok(false);
        }
        let list = decode_list(&self.call(Request::delete(&self.mount, name))?)?;
        self.replace(list);
        if self.loaded.as_deref() == Some(name) {
            self.loaded = None;
        }
        Ok(true)
    }

    /// Fetch the list and render it as pretty JSON, in the same shape as the
    /// `GET` body. The cache is not touched.
    pub fn export_json(&self) -> PresetResult<String> {
        let response = self.call(Request::list(&self.mount))?;
        let value: serde_json::Value = serde_json::from_str(&response.body)
            .map_err(|e| PresetError::Decode(e.to_string()))?;
        serde_json::to_string_pretty(&value).map_err(|e| PresetError::Decode(e.to_string()))
    }

    /// Write [`export_json`](Self::export_json) to `dir/file_name`.
    pub fn export_to(&self, dir: &Path, file_name: &str) -> PresetResult<PathBuf> {
        let json = self.export_json()?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        std::fs::write(&path, json)?;
        tracing::debug!(path = %path.display(), "exported presets");
        Ok(path)
    }

    fn fetch(&self) -> PresetResult<PresetList> {
        decode_list(&self.call(Request::list(&self.mount))?)
    }

    fn replace(&mut self, list: PresetList) {
        self.presets = list.presets;
        if let Some(name) = &self.loaded
            && !self.presets.iter().any(|p| &p.name == name)
        {
            self.loaded = None;
        }
    }

    fn call(&self, request: Request) -> PresetResult<Response> {
        let method = request.method.as_str();
        if !self.liveness.is_alive() {
            tracing::debug!(method, path = %request.path, "request not sent: editor disposed");
            return Err(PresetError::Disposed);
        }
        let response = self.transport.send(request).map_err(|e| {
            tracing::warn!(method, error = %e, "preset request failed");
            e
        });
        let response = self
            .liveness
            .admit("preset response", response)
            .ok_or(PresetError::Disposed)??;

        if response.is_success() {
            return Ok(response);
        }
        let message = ErrorBody::parse_lenient(&response.body)
            .error
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| response.status.to_string());
        tracing::warn!(method, status = response.status, message = %message, "preset request rejected");
        Err(PresetError::Remote {
            status: response.status,
            message,
        })
    }
}

fn decode_list(response: &Response) -> PresetResult<PresetList> {
    serde_json::from_str(&response.body).map_err(|e| PresetError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays canned responses and records requests.
    struct Scripted {
        responses: Mutex<Vec<PresetResult<Response>>>,
        seen: Mutex<Vec<Request>>,
    }

    impl Scripted {
        fn new(responses: Vec<PresetResult<Response>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<Request> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl PresetTransport for Scripted {
        fn send(&self, request: Request) -> PresetResult<Response> {
            self.seen.lock().unwrap().push(request);
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn ok(body: &str) -> PresetResult<Response> {
        Ok(Response {
            status: 200,
            body: body.into(),
        })
    }

    fn status(code: u16, body: &str) -> PresetResult<Response> {
        Ok(Response {
            status: code,
            body: body.into(),
        })
    }

    #[test]
    fn empty_names_make_no_request() {
        let transport = Scripted::new(vec![]);
        let mut client = PresetClient::new(transport.clone());
        assert!(!client.save("   ", "x", &Theme::DEFAULT).unwrap());
        assert!(!client.delete("").unwrap());
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn save_trims_name_and_replaces_cache() {
        let transport = Scripted::new(vec![ok(r#"{"presets":[{"name":"a","text":"t"}]}"#)]);
        let mut client = PresetClient::new(transport.clone());
        assert!(client.save("  a ", "t", &Theme::DEFAULT).unwrap());
        assert_eq!(client.presets().len(), 1);
        assert_eq!(client.loaded_preset(), Some("a"));

        let sent = &transport.requests()[0];
        let body: SaveRequest = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body.name, "a");
        assert_eq!(body.theme.bg.as_deref(), Some("#0f111a"));
    }

    #[test]
    fn error_message_prefers_body_error() {
        let transport = Scripted::new(vec![
            status(400, r#"{"error":"invalid preset name"}"#),
            status(500, "<html>boom</html>"),
            status(404, r#"{"error":""}"#),
        ]);
        let mut client = PresetClient::new(transport);
        let err = client.list().unwrap_err();
        assert_eq!(err.to_string(), "invalid preset name");
        let err = client.list().unwrap_err();
        assert!(matches!(err, PresetError::Remote { status: 500, ref message } if message == "500"));
        assert_eq!(client.list().unwrap_err().to_string(), "404");
    }

    #[test]
    fn failure_leaves_cache_untouched() {
        let transport = Scripted::new(vec![
            ok(r#"{"presets":[{"name":"keep"}]}"#),
            Err(PresetError::Transport("offline".into())),
            status(500, "{}"),
        ]);
        let mut client = PresetClient::new(transport);
        client.list().unwrap();
        assert!(client.list().is_err());
        assert!(client.delete("keep").is_err());
        assert_eq!(client.presets()[0].name, "keep");
    }

    #[test]
    fn missing_presets_key_is_empty_list() {
        let transport = Scripted::new(vec![ok(r#"{"presets":[{"name":"x"}]}"#), ok("{}")]);
        let mut client = PresetClient::new(transport);
        client.list().unwrap();
        assert!(client.list().unwrap().is_empty());
    }

    #[test]
    fn delete_clears_loaded_marker() {
        let transport = Scripted::new(vec![
            ok(r#"{"presets":[{"name":"a"},{"name":"b"}]}"#),
            ok(r#"{"presets":[{"name":"b"}]}"#),
        ]);
        let mut client = PresetClient::new(transport.clone());
        client.list().unwrap();
        client.mark_loaded("a");
        client.delete("a").unwrap();
        assert_eq!(client.loaded_preset(), None);
        assert_eq!(transport.requests()[1].path, "/scribblepad/presets/a");
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let transport = Scripted::new(vec![ok(
            r#"{"presets":[{"name":"Morning"},{"name":"evening"},{"name":"noon"}]}"#,
        )]);
        let mut client = PresetClient::new(transport);
        client.list().unwrap();
        let names = |q: &str| -> Vec<String> {
            client.filtered(q).iter().map(|p| p.name.clone()).collect()
        };
        assert_eq!(names("NING"), ["Morning", "evening"]);
        assert_eq!(names(""), ["Morning", "evening", "noon"]);
        assert!(names("zzz").is_empty());
    }

    #[test]
    fn delete_trims_name() {
        let transport = Scripted::new(vec![ok(r#"{"presets":[]}"#)]);
        let mut client = PresetClient::new(transport.clone());
        client.mark_loaded("a");
        assert!(client.delete("  a ").unwrap());
        assert_eq!(transport.requests()[0].path, "/scribblepad/presets/a");
        assert_eq!(client.loaded_preset(), None);
    }

    #[test]
    fn disposed_client_sends_nothing() {
        let transport = Scripted::new(vec![ok(r#"{"presets":[{"name":"late"}]}"#)]);
        let liveness = Liveness::new();
        let mut client = PresetClient::new(transport.clone()).with_liveness(liveness.clone());
        liveness.dispose();
        assert!(matches!(client.list(), Err(PresetError::Disposed)));
        assert!(matches!(
            client.save("x", "t", &Theme::DEFAULT),
            Err(PresetError::Disposed)
        ));
        assert!(matches!(client.delete("x"), Err(PresetError::Disposed)));
        assert!(transport.requests().is_empty());
        assert!(client.presets().is_empty());
    }

    /// Disposes the editor while the request is in flight.
    struct DisposeDuringSend(Liveness);

    impl PresetTransport for DisposeDuringSend {
        fn send(&self, _request: Request) -> PresetResult<Response> {
            self.0.dispose();
            ok(r#"{"presets":[{"name":"late"}]}"#)
        }
    }

    #[test]
    fn result_landing_after_dispose_is_dropped() {
        let liveness = Liveness::new();
        let transport = Arc::new(DisposeDuringSend(liveness.clone()));
        let mut client = PresetClient::new(transport).with_liveness(liveness);
        assert!(matches!(client.list(), Err(PresetError::Disposed)));
        assert!(client.presets().is_empty());
    }

    #[test]
    fn export_is_pretty_get_body() {
        let body = r#"{"presets":[{"name":"a","text":"x"}]}"#;
        let transport = Scripted::new(vec![ok(body), ok(body)]);
        let client = PresetClient::new(transport);
        let json = client.export_json().unwrap();
        assert!(json.contains('\n'));
        let round: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(round, serde_json::from_str::<serde_json::Value>(body).unwrap());

        let dir = tempfile::tempdir().unwrap();
        let path = client.export_to(dir.path(), "out.json").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), json);
    }
}
