//! Session configuration.
//!
//! Defaults can be overridden from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SCRIBBLE_LOAD_TIMEOUT_MS` | [`SessionConfig::load_timeout`] |
//! | `SCRIBBLE_HISTORY` | [`SessionConfig::max_history`] |
//!
//! Unparseable values are ignored with a warning.

use std::time::Duration;

use scribble_text::{CommentMode, DEFAULT_PREFIX, TokenMode};

/// Environment override for the rich-module load timeout, in milliseconds.
pub const LOAD_TIMEOUT_ENV: &str = "SCRIBBLE_LOAD_TIMEOUT_MS";
/// Environment override for the undo depth.
pub const HISTORY_ENV: &str = "SCRIBBLE_HISTORY";

/// Default export file name.
pub const DEFAULT_EXPORT_FILE: &str = "scribble-presets.json";

/// Configuration for one editor session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long to wait for the rich module before falling back.
    pub load_timeout: Duration,
    /// Undo depth for the rich backend.
    pub max_history: usize,
    /// File name used by preset export.
    pub export_file_name: String,
    /// Prefix used when the host's prefix control is empty.
    pub default_prefix: String,
    /// Mode used when the host's mode control is empty.
    pub default_mode: CommentMode,
    /// How the clean summary counts tokens.
    pub token_mode: TokenMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(10),
            max_history: 1000,
            export_file_name: DEFAULT_EXPORT_FILE.to_string(),
            default_prefix: DEFAULT_PREFIX.to_string(),
            default_mode: CommentMode::Loose,
            token_mode: TokenMode::Light,
        }
    }
}

impl SessionConfig {
    /// Set the rich-module load timeout.
    #[must_use]
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Set the undo depth.
    #[must_use]
    pub fn with_max_history(mut self, max: usize) -> Self {
        self.max_history = max;
        self
    }

    /// Set the export file name.
    #[must_use]
    pub fn with_export_file_name(mut self, name: impl Into<String>) -> Self {
        self.export_file_name = name.into();
        self
    }

    /// Set the fallback comment prefix.
    #[must_use]
    pub fn with_default_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.default_prefix = prefix.into();
        self
    }

    /// Set the fallback comment mode.
    #[must_use]
    pub fn with_default_mode(mut self, mode: CommentMode) -> Self {
        self.default_mode = mode;
        self
    }

    /// Set the token counting mode.
    #[must_use]
    pub fn with_token_mode(mut self, mode: TokenMode) -> Self {
        self.token_mode = mode;
        self
    }

    /// Apply `SCRIBBLE_*` environment overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        let timeout = std::env::var(LOAD_TIMEOUT_ENV).ok();
        let history = std::env::var(HISTORY_ENV).ok();
        self.with_overrides(timeout.as_deref(), history.as_deref())
    }

    /// Apply overrides from raw values (as read from the environment).
    #[must_use]
    pub fn with_overrides(mut self, load_timeout_ms: Option<&str>, history: Option<&str>) -> Self {
        if let Some(raw) = load_timeout_ms {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.load_timeout = Duration::from_millis(ms),
                Err(_) => tracing::warn!(var = LOAD_TIMEOUT_ENV, value = raw, "ignoring invalid override"),
            }
        }
        if let Some(raw) = history {
            match raw.trim().parse::<usize>() {
                Ok(n) => self.max_history = n,
                Err(_) => tracing::warn!(var = HISTORY_ENV, value = raw, "ignoring invalid override"),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.load_timeout, Duration::from_secs(10));
        assert_eq!(config.max_history, 1000);
        assert_eq!(config.export_file_name, "scribble-presets.json");
        assert_eq!(config.default_prefix, "//");
        assert_eq!(config.default_mode, CommentMode::Loose);
        assert_eq!(config.token_mode, TokenMode::Light);
    }

    #[test]
    fn builders() {
        let config = SessionConfig::default()
            .with_load_timeout(Duration::from_millis(5))
            .with_max_history(3)
            .with_default_prefix("#")
            .with_default_mode(CommentMode::Strict)
            .with_export_file_name("out.json")
            .with_token_mode(TokenMode::Exact);
        assert_eq!(config.load_timeout, Duration::from_millis(5));
        assert_eq!(config.max_history, 3);
        assert_eq!(config.default_prefix, "#");
        assert_eq!(config.default_mode, CommentMode::Strict);
        assert_eq!(config.export_file_name, "out.json");
        assert_eq!(config.token_mode, TokenMode::Exact);
    }

    #[test]
    fn overrides_parse_or_ignore() {
        let config = SessionConfig::default().with_overrides(Some("250"), Some("7"));
        assert_eq!(config.load_timeout, Duration::from_millis(250));
        assert_eq!(config.max_history, 7);

        let config = SessionConfig::default().with_overrides(Some("soon"), Some("-1"));
        assert_eq!(config, SessionConfig::default());
    }
}
