//! One mounted editor instance.
//!
//! An [`EditorSession`] ties a backend to the host's controls and to the
//! preset synchronizer:
//!
//! - the host text field seeds the buffer and then only receives writes
//! - prefix and mode changes re-mark comment lines
//! - theme changes repaint in place (the theme reconfigurator)
//! - preset load pushes a preset's text and theme through the same paths
//!
//! Observers are registered through [`HostField::subscribe`] and released
//! on [`EditorSession::dispose`] (or drop). After disposal, mutating calls
//! are ignored and preset results are discarded.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use scribble_core::{HostField, KeyEvent, Liveness, SubscriptionHandle};
use scribble_presets::{Preset, PresetClient, PresetError, PresetResult};
use scribble_style::{Rgb, StyleScope, Theme};
use scribble_text::{
    CleanSummary, CommentMode, CommentPolicy, Selection, ToggleAction, TokenMode,
};

use crate::backend::{BackendInit, BackendKind, EditorBackend};
use crate::config::SessionConfig;
use crate::loader::BackendLoader;
use crate::mirror::BufferMirror;

type SharedBackend = Arc<Mutex<Box<dyn EditorBackend>>>;

/// The host-owned values an editor reads and writes.
///
/// Clones share state with the host's copies. Observers the host hangs on
/// `text` run after the editor has released its buffer, so they may write
/// any other control.
#[derive(Debug, Clone, Default)]
pub struct HostControls {
    /// Serialized document text. Written on every buffer change.
    pub text: HostField<String>,
    /// Comment prefix control. Empty means the configured default.
    pub prefix: HostField<String>,
    /// Comment mode control (`"strict"` or `"loose"`). Empty means the
    /// configured default.
    pub mode: HostField<String>,
    /// Panel colors.
    pub theme: HostField<Theme>,
}

impl HostControls {
    /// Controls holding `text`, `prefix`, and `mode`, with the default theme.
    #[must_use]
    pub fn new(text: impl Into<String>, prefix: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            text: HostField::new(text.into()),
            prefix: HostField::new(prefix.into()),
            mode: HostField::new(mode.into()),
            theme: HostField::new(Theme::DEFAULT),
        }
    }
}

/// Resolve the effective comment policy from raw control values.
#[must_use]
pub fn resolve_policy(prefix: &str, mode: &str, config: &SessionConfig) -> CommentPolicy {
    let mode = if mode.trim().is_empty() {
        config.default_mode
    } else {
        CommentMode::from_host(mode)
    };
    CommentPolicy::from_host(prefix, mode.as_str(), &config.default_prefix)
}

fn lock(backend: &SharedBackend) -> MutexGuard<'_, Box<dyn EditorBackend>> {
    match backend.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("editor backend lock poisoned, continuing");
            poisoned.into_inner()
        }
    }
}

/// A mounted editor.
pub struct EditorSession {
    backend: SharedBackend,
    kind: BackendKind,
    mirror: BufferMirror,
    controls: HostControls,
    presets: PresetClient,
    liveness: Liveness,
    config: SessionConfig,
    subscriptions: Vec<SubscriptionHandle>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("kind", &self.kind)
            .field("alive", &self.liveness.is_alive())
            .field("subscriptions", &self.subscriptions.len())
            .field("presets", &self.presets)
            .finish()
    }
}

impl EditorSession {
    /// Mount an editor over `controls`.
    ///
    /// The backend is chosen by `loader` (rich if the module loads, else the
    /// fallback; never an error). The preset list is fetched once; a failure
    /// there is logged and leaves the list empty.
    pub fn mount(
        controls: HostControls,
        loader: &BackendLoader,
        presets: PresetClient,
        config: SessionConfig,
    ) -> Self {
        let liveness = Liveness::new();
        let policy = resolve_policy(&controls.prefix.get(), &controls.mode.get(), &config);
        let scope = StyleScope::from_theme(&controls.theme.get());
        let mirror = BufferMirror::new(controls.text.clone());
        let init = BackendInit {
            mirror: mirror.clone(),
            policy,
            scope,
            max_history: config.max_history,
        };
        let backend = loader.select(init);
        let kind = backend.kind();
        let backend: SharedBackend = Arc::new(Mutex::new(backend));

        let mut session = Self {
            backend,
            kind,
            mirror,
            presets: presets.with_liveness(liveness.clone()),
            liveness,
            config,
            subscriptions: Vec::new(),
            controls,
        };
        session.subscribe_controls();
        session.reconfigure_theme(&session.controls.theme.get());
        session.refresh_comments();
        session.publish_text();

        if let Err(err) = session.presets.list() {
            tracing::warn!(error = %err, "initial preset list failed");
        }
        tracing::debug!(kind = kind.as_str(), "editor mounted");
        session
    }

    fn subscribe_controls(&mut self) {
        for field in [self.controls.prefix.clone(), self.controls.mode.clone()] {
            let backend = Arc::clone(&self.backend);
            let prefix = self.controls.prefix.clone();
            let mode = self.controls.mode.clone();
            let config = self.config.clone();
            let liveness = self.liveness.clone();
            self.subscriptions.push(field.subscribe(move |_: &String| {
                if !liveness.is_alive() {
                    return;
                }
                let policy = resolve_policy(&prefix.get(), &mode.get(), &config);
                tracing::debug!(prefix = policy.prefix(), mode = %policy.mode(), "comment policy changed");
                lock(&backend).refresh_comments(&policy);
            }));
        }

        let backend = Arc::clone(&self.backend);
        let liveness = self.liveness.clone();
        self.subscriptions
            .push(self.controls.theme.subscribe(move |theme: &Theme| {
                if liveness.is_alive() {
                    lock(&backend).apply_theme(StyleScope::from_theme(theme));
                }
            }));
    }

    fn reconfigure_theme(&self, theme: &Theme) {
        lock(&self.backend).apply_theme(StyleScope::from_theme(theme));
    }

    /// Notify host text observers. Call only with the backend unlocked.
    fn publish_text(&self) {
        self.mirror.publish();
    }

    fn ensure_alive(&self, what: &'static str) -> bool {
        let alive = self.liveness.is_alive();
        if !alive {
            tracing::debug!(what, "ignoring call on disposed editor");
        }
        alive
    }

    /// Which backend is live.
    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    /// The host controls this session observes.
    #[must_use]
    pub fn controls(&self) -> &HostControls {
        &self.controls
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current buffer content.
    #[must_use]
    pub fn text(&self) -> String {
        lock(&self.backend).text().to_string()
    }

    /// Replace the buffer. The host text field is updated before returning.
    pub fn set_text(&mut self, text: &str) {
        if self.ensure_alive("set_text") {
            lock(&self.backend).set_text(text);
            self.publish_text();
        }
    }

    /// Forward a key event to the backend.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        let handled = self.ensure_alive("handle_key") && lock(&self.backend).handle_key(event);
        self.publish_text();
        handled
    }

    /// Toggle comments over the current selection(s).
    pub fn toggle_comments(&mut self) -> Option<ToggleAction> {
        if !self.ensure_alive("toggle_comments") {
            return None;
        }
        let action = lock(&self.backend).toggle_comment_selection();
        self.publish_text();
        action
    }

    /// Replace all selections with `selection`.
    pub fn set_selection(&mut self, selection: Selection) {
        lock(&self.backend).set_selection(selection);
    }

    /// Current selections.
    #[must_use]
    pub fn selections(&self) -> Vec<Selection> {
        lock(&self.backend).selections()
    }

    /// Whether the backend has an undo step.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        lock(&self.backend).can_undo()
    }

    /// The policy the controls currently resolve to.
    #[must_use]
    pub fn policy(&self) -> CommentPolicy {
        resolve_policy(
            &self.controls.prefix.get(),
            &self.controls.mode.get(),
            &self.config,
        )
    }

    /// Re-mark comment lines under the current policy.
    pub fn refresh_comments(&mut self) {
        let policy = self.policy();
        lock(&self.backend).refresh_comments(&policy);
    }

    /// Indices of lines marked as comments.
    #[must_use]
    pub fn commented_lines(&self) -> Vec<usize> {
        lock(&self.backend).commented_lines().to_vec()
    }

    /// Effective color of every line.
    #[must_use]
    pub fn line_colors(&self) -> Vec<Rgb> {
        lock(&self.backend).line_colors()
    }

    /// The active theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.controls.theme.get()
    }

    /// Colors currently painted.
    #[must_use]
    pub fn style(&self) -> StyleScope {
        *lock(&self.backend).style()
    }

    /// Set the theme and repaint in place.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.ensure_alive("set_theme") {
            self.controls.theme.set(theme);
        }
    }

    /// Restore the default theme, repaint, and re-mark comment lines.
    pub fn reset_theme(&mut self) {
        if !self.ensure_alive("reset_theme") {
            return;
        }
        self.controls.theme.set(Theme::DEFAULT);
        self.refresh_comments();
        tracing::debug!("theme reset to defaults");
    }

    /// Comment-stripped text with size estimates, counted per the
    /// configured token mode.
    #[must_use]
    pub fn clean_summary(&self) -> CleanSummary {
        self.clean_summary_with(self.config.token_mode)
    }

    /// Comment-stripped text with tokens counted per `mode`.
    #[must_use]
    pub fn clean_summary_with(&self, mode: TokenMode) -> CleanSummary {
        let policy = self.policy();
        CleanSummary::compute(&self.text(), &policy, mode)
    }

    /// Cached preset list.
    #[must_use]
    pub fn presets(&self) -> &[Preset] {
        self.presets.presets()
    }

    /// Cached presets whose name contains `query`, ignoring case.
    #[must_use]
    pub fn filtered_presets(&self, query: &str) -> Vec<&Preset> {
        self.presets.filtered(query)
    }

    /// Name of the preset last saved or loaded.
    #[must_use]
    pub fn loaded_preset(&self) -> Option<&str> {
        self.presets.loaded_preset()
    }

    /// Re-fetch the preset list.
    pub fn refresh_presets(&mut self) -> PresetResult<&[Preset]> {
        if !self.ensure_alive("refresh_presets") {
            return Err(PresetError::Disposed);
        }
        self.presets.list()
    }

    /// Save the current text and theme as `name`. An empty name is skipped
    /// and returns `Ok(false)`.
    pub fn save_preset(&mut self, name: &str) -> PresetResult<bool> {
        if !self.ensure_alive("save_preset") {
            return Err(PresetError::Disposed);
        }
        let text = self.text();
        let theme = self.theme();
        self.presets.save(name, &text, &theme)
    }

    /// Delete the preset `name`. An empty name is skipped and returns
    /// `Ok(false)`.
    pub fn delete_preset(&mut self, name: &str) -> PresetResult<bool> {
        if !self.ensure_alive("delete_preset") {
            return Err(PresetError::Disposed);
        }
        self.presets.delete(name)
    }

    /// Copy a cached preset's text and theme into the editor.
    ///
    /// Theme colors the preset cannot express fall back to the defaults.
    pub fn load_preset(&mut self, name: &str) -> PresetResult<()> {
        if !self.ensure_alive("load_preset") {
            return Err(PresetError::Disposed);
        }
        let (text, theme) = match self.presets.find(name) {
            Some(preset) => (preset.text.clone(), preset.resolved_theme()),
            None => return Err(PresetError::UnknownPreset(name.to_string())),
        };
        lock(&self.backend).set_text(&text);
        self.publish_text();
        self.controls.theme.set(theme);
        self.refresh_comments();
        self.presets.mark_loaded(name);
        tracing::debug!(name, bytes = text.len(), "preset loaded");
        Ok(())
    }

    /// Export the remote preset list as JSON into `dir`.
    pub fn export_presets(&self, dir: &Path) -> PresetResult<PathBuf> {
        self.presets.export_to(dir, &self.config.export_file_name)
    }

    /// Whether the session is still mounted.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Tear down: release control observers and discard later results.
    pub fn dispose(&mut self) {
        if self.liveness.dispose() {
            let released = self.subscriptions.len();
            self.subscriptions.clear();
            tracing::debug!(released, "editor disposed");
        }
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.dispose();
    }
}
