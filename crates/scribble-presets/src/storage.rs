//! Storage backends for the preset list.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      PresetRegistry                          │
//! │   - validation, upsert/delete, timestamps                    │
//! │   - one read-modify-write at a time                          │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      PresetStorage                           │
//! │   - MemoryPresetStorage: in-memory (tests, ephemeral hosts)  │
//! │   - FilePresetStorage: JSON file, atomic write-rename        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing file | First run | Empty list |
//! | Unparseable file | Hand edit, partial write by another tool | Empty list, logged |
//! | `presets` not a list | Wrong shape | Empty list, logged |
//! | Malformed entry | Entry lacks a string `name` | Entry skipped, logged |
//! | `StoreError::Io` | Read or write failure | Returned to caller |

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Serialize;

use crate::error::{StoreError, StoreResult};
use crate::protocol::Preset;

/// File name used inside the presets directory.
pub const PRESETS_FILE: &str = "presets.json";

/// Environment variable naming the presets directory.
pub const PRESETS_DIR_ENV: &str = "SCRIBBLE_PRESETS_DIR";

/// Pluggable preset persistence.
///
/// `load` must tolerate corrupt data (returning what it can); `save` must
/// replace the stored list atomically.
pub trait PresetStorage: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Load the full list in insertion order.
    fn load(&self) -> StoreResult<Vec<Preset>>;

    /// Replace the full list.
    fn save(&self, presets: &[Preset]) -> StoreResult<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory storage.
#[derive(Default)]
pub struct MemoryPresetStorage {
    presets: RwLock<Vec<Preset>>,
}

impl MemoryPresetStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage seeded with `presets`.
    #[must_use]
    pub fn with_presets(presets: Vec<Preset>) -> Self {
        Self {
            presets: RwLock::new(presets),
        }
    }
}

impl PresetStorage for MemoryPresetStorage {
    fn name(&self) -> &str {
        "MemoryPresetStorage"
    }

    fn load(&self) -> StoreResult<Vec<Preset>> {
        let guard = self
            .presets
            .read()
            .map_err(|_| StoreError::Corruption("memory storage lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save(&self, presets: &[Preset]) -> StoreResult<()> {
        let mut guard = self
            .presets
            .write()
            .map_err(|_| StoreError::Corruption("memory storage lock poisoned".into()))?;
        *guard = presets.to_vec();
        Ok(())
    }
}

impl fmt::Debug for MemoryPresetStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.presets.read().map(|p| p.len()).unwrap_or(0);
        f.debug_struct("MemoryPresetStorage")
            .field("presets", &count)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PresetFile<'a> {
    presets: &'a [Preset],
}

/// JSON file storage.
///
/// # File Format
///
/// ```json
/// {
///   "presets": [
///     {
///       "name": "draft",
///       "text": "// notes\nhello",
///       "theme": { "bg": "#0f111a", "fg": "#c0caf5", "comment": "#565f89" },
///       "updated_at": "2025-01-01T00:00:00Z"
///     }
///   ]
/// }
/// ```
///
/// Writes go to `{path}.tmp`, are flushed and synced, then renamed over
/// `{path}`.
pub struct FilePresetStorage {
    path: PathBuf,
}

impl FilePresetStorage {
    /// Storage at `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Storage at the location resolved from the environment.
    #[must_use]
    pub fn default_location() -> Self {
        let presets_dir = std::env::var(PRESETS_DIR_ENV).ok();
        let data_home = std::env::var("XDG_DATA_HOME").ok();
        let home = std::env::var("HOME").ok();
        Self::new(Self::location_from(
            presets_dir.as_deref(),
            data_home.as_deref(),
            home.as_deref(),
        ))
    }

    /// Resolve the presets file from explicit environment values.
    ///
    /// Order: `SCRIBBLE_PRESETS_DIR`, `$XDG_DATA_HOME/scribble`,
    /// `$HOME/.local/share/scribble`, then the current directory. Empty
    /// values count as unset.
    #[must_use]
    pub fn location_from(
        presets_dir: Option<&str>,
        xdg_data_home: Option<&str>,
        home: Option<&str>,
    ) -> PathBuf {
        let set = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(PathBuf::from);
        let dir = set(presets_dir)
            .or_else(|| set(xdg_data_home).map(|d| d.join("scribble")))
            .or_else(|| set(home).map(|h| h.join(".local").join("share").join("scribble")))
            .unwrap_or_else(|| PathBuf::from("."));
        dir.join(PRESETS_FILE)
    }

    /// Path of the presets file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        tmp
    }

    fn decode(&self, raw: &str) -> Vec<Preset> {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "preset file is not valid JSON, treating as empty"
                );
                return Vec::new();
            }
        };
        let Some(entries) = value.get("presets").and_then(|p| p.as_array()) else {
            tracing::warn!(
                path = %self.path.display(),
                "preset file has no presets list, treating as empty"
            );
            return Vec::new();
        };
        entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| {
                serde_json::from_value::<Preset>(entry.clone())
                    .map_err(|e| {
                        tracing::warn!(index = idx, error = %e, "skipping malformed preset entry");
                    })
                    .ok()
            })
            .collect()
    }
}

impl PresetStorage for FilePresetStorage {
    fn name(&self) -> &str {
        "FilePresetStorage"
    }

    fn load(&self) -> StoreResult<Vec<Preset>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                tracing::warn!(path = %self.path.display(), "preset file is not UTF-8, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let presets = self.decode(&raw);
        tracing::debug!(path = %self.path.display(), count = presets.len(), "loaded presets");
        Ok(presets)
    }

    fn save(&self, presets: &[Preset]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.temp_path();
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &PresetFile { presets }).map_err(|e| {
                StoreError::Serialization(format!("failed to serialize presets: {e}"))
            })?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            count = presets.len(),
            "saved presets"
        );
        Ok(())
    }
}

impl fmt::Debug for FilePresetStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePresetStorage")
            .field("path", &self.path)
            .finish()
    }
}
