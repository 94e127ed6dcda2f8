//! Wire protocol shared by the preset client and service.
//!
//! | Request | Body | Response |
//! |---------|------|----------|
//! | `GET {mount}/presets` | none | `{ "presets": [Preset] }` |
//! | `POST {mount}/presets` | `{ name, text, theme }` | `{ "presets": [Preset] }` |
//! | `DELETE {mount}/presets/{name}` | none | `{ "presets": [Preset] }` |
//!
//! Failures carry `{ "error": "..." }`. The name in a DELETE path is
//! percent-encoded with the same reserved set as JavaScript's
//! `encodeURIComponent`.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use scribble_style::{Theme, ThemeWire};
use serde::{Deserialize, Deserializer, Serialize};

/// Characters left as-is in a path segment.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Default route prefix.
pub const DEFAULT_MOUNT: &str = "/scribblepad";

/// A named text + theme snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Unique name.
    pub name: String,
    /// Document text. `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    /// Theme as stored; read leniently.
    #[serde(default, deserialize_with = "lenient_theme")]
    pub theme: ThemeWire,
    /// Last write time (RFC 3339, UTC). Set by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Preset {
    /// A preset without a timestamp.
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>, theme: ThemeWire) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            theme,
            updated_at: None,
        }
    }

    /// The stored theme with invalid or missing slots replaced by defaults.
    #[must_use]
    pub fn resolved_theme(&self) -> Theme {
        Theme::from_wire(&self.theme)
    }
}

/// Body of every successful response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetList {
    /// Full, authoritative list in insertion order.
    #[serde(default)]
    pub presets: Vec<Preset>,
}

/// Body of `POST /presets`. Missing fields default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRequest {
    /// Preset name.
    #[serde(default)]
    pub name: String,
    /// Document text. `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    /// Theme to store. `null` or a non-object reads as the empty theme.
    #[serde(default, deserialize_with = "lenient_theme")]
    pub theme: ThemeWire,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_theme<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ThemeWire, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeTheme {
        Object(ThemeWire),
        Other(serde::de::IgnoredAny),
    }

    Ok(match MaybeTheme::deserialize(deserializer)? {
        MaybeTheme::Object(theme) => theme,
        MaybeTheme::Other(_) => ThemeWire::default(),
    })
}

/// Body of a failure response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Parse a failure body; anything unparseable is an empty body.
    #[must_use]
    pub fn parse_lenient(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

/// Request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// A protocol request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Method.
    pub method: Method,
    /// Absolute path, already percent-encoded.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<String>,
}

impl Request {
    /// `GET {mount}/presets`
    #[must_use]
    pub fn list(mount: &str) -> Self {
        Self {
            method: Method::Get,
            path: presets_path(mount),
            body: None,
        }
    }

    /// `POST {mount}/presets`
    pub fn save(mount: &str, body: &SaveRequest) -> serde_json::Result<Self> {
        Ok(Self {
            method: Method::Post,
            path: presets_path(mount),
            body: Some(serde_json::to_string(body)?),
        })
    }

    /// `DELETE {mount}/presets/{name}`
    #[must_use]
    pub fn delete(mount: &str, name: &str) -> Self {
        Self {
            method: Method::Delete,
            path: preset_path(mount, name),
            body: None,
        }
    }
}

/// A protocol response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status.
    pub status: u16,
    /// JSON body.
    pub body: String,
}

impl Response {
    /// Serialize `body` with `status`.
    #[must_use]
    pub fn json<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self { status, body },
            Err(e) => Self::error(500, &format!("failed to encode response: {e}")),
        }
    }

    /// `{ "error": message }` with `status`.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        let body = ErrorBody {
            error: Some(message.to_string()),
        };
        Self {
            status,
            body: serde_json::to_string(&body).unwrap_or_else(|_| String::from("{}")),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// `{mount}/presets`
#[must_use]
pub fn presets_path(mount: &str) -> String {
    format!("{}/presets", mount.trim_end_matches('/'))
}

/// `{mount}/presets/{escaped name}`
#[must_use]
pub fn preset_path(mount: &str, name: &str) -> String {
    format!("{}/{}", presets_path(mount), encode_name(name))
}

/// Percent-encode a name for use as a path segment.
#[must_use]
pub fn encode_name(name: &str) -> String {
    utf8_percent_encode(name, COMPONENT).to_string()
}

/// Decode a path segment back to a name. `None` if it is not UTF-8.
#[must_use]
pub fn decode_name(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|name| name.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_escape_like_encode_uri_component() {
        assert_eq!(encode_name("my preset"), "my%20preset");
        assert_eq!(encode_name("a/b?c#d"), "a%2Fb%3Fc%23d");
        assert_eq!(encode_name("it's-(ok)_~*!."), "it's-(ok)_~*!.");
        assert_eq!(encode_name("日本"), "%E6%97%A5%E6%9C%AC");
    }

    #[test]
    fn decode_reverses_encode() {
        for name in ["plain", "with space", "a/b", "日本語", "100%"] {
            assert_eq!(decode_name(&encode_name(name)).as_deref(), Some(name));
        }
        assert_eq!(decode_name("%FF"), None);
    }

    #[test]
    fn paths_use_mount() {
        assert_eq!(presets_path("/scribblepad"), "/scribblepad/presets");
        assert_eq!(presets_path("/api/"), "/api/presets");
        assert_eq!(preset_path("", "x y"), "/presets/x%20y");
    }

    #[test]
    fn lenient_error_body() {
        assert_eq!(
            ErrorBody::parse_lenient(r#"{"error":"nope"}"#).error.as_deref(),
            Some("nope")
        );
        assert_eq!(ErrorBody::parse_lenient("<html>"), ErrorBody::default());
        assert_eq!(ErrorBody::parse_lenient(r#"{"other":1}"#), ErrorBody::default());
    }

    #[test]
    fn list_tolerates_missing_presets_key() {
        let list: PresetList = serde_json::from_str("{}").unwrap();
        assert!(list.presets.is_empty());
    }

    #[test]
    fn save_request_defaults() {
        let req: SaveRequest = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(req.text, "");
        assert!(req.theme.is_empty());
    }

    #[test]
    fn null_and_odd_theme_read_as_empty() {
        for raw in ["null", "\"dark\"", "7", "[]"] {
            let body = format!(r#"{{"name":"x","text":null,"theme":{raw}}}"#);
            let req: SaveRequest = serde_json::from_str(&body).unwrap();
            assert_eq!(req.text, "", "{raw}");
            assert!(req.theme.is_empty(), "{raw}");
            let preset: Preset = serde_json::from_str(&body).unwrap();
            assert_eq!(preset.resolved_theme(), Theme::DEFAULT);
        }
    }

    #[test]
    fn preset_theme_resolves_leniently() {
        let preset: Preset = serde_json::from_str(
            r##"{"name":"p","text":"t","theme":{"bg":"#ffffff","fg":"oops"}}"##,
        )
        .unwrap();
        let theme = preset.resolved_theme();
        assert_eq!(theme.background.to_hex(), "#ffffff");
        assert_eq!(theme, Theme::DEFAULT.with_background(theme.background));
    }

    #[test]
    fn error_response_body() {
        let resp = Response::error(400, "invalid preset name");
        assert!(!resp.is_success());
        assert_eq!(resp.body, r#"{"error":"invalid preset name"}"#);
        assert!(Response::json(200, &PresetList::default()).is_success());
    }
}
