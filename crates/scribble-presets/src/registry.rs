//! Server-side preset registry: validation and list mutation over a
//! [`PresetStorage`].
//!
//! Every mutating call reloads the list from storage, applies the change,
//! writes it back, and returns the full list. Calls are serialized so two
//! concurrent upserts cannot drop each other's writes.

use std::fmt;
use std::sync::Mutex;

use scribble_style::ThemeWire;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{StoreError, StoreResult};
use crate::protocol::{Preset, PresetList};
use crate::storage::{FilePresetStorage, MemoryPresetStorage, PresetStorage};

/// Maximum preset text size in UTF-8 bytes.
pub const MAX_TEXT_BYTES: usize = 100 * 1024;

/// Maximum name length in characters.
pub const MAX_NAME_CHARS: usize = 64;

/// Check a preset name: 1 to 64 characters, no `/` or `\`, no `..`.
pub fn validate_name(name: &str) -> StoreResult<()> {
    let chars = name.chars().count();
    let ok = (1..=MAX_NAME_CHARS).contains(&chars)
        && !name.contains(['/', '\\'])
        && !name.contains("..");
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

/// Check preset text size.
pub fn validate_text(text: &str) -> StoreResult<()> {
    if text.len() > MAX_TEXT_BYTES {
        return Err(StoreError::TextTooLarge {
            len: text.len(),
            limit: MAX_TEXT_BYTES,
        });
    }
    Ok(())
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// The authoritative preset list.
pub struct PresetRegistry {
    storage: Box<dyn PresetStorage>,
    write_lock: Mutex<()>,
}

impl PresetRegistry {
    /// Registry over `storage`.
    #[must_use]
    pub fn new(storage: Box<dyn PresetStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Registry over in-memory storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryPresetStorage::new()))
    }

    /// Registry over a JSON file.
    #[must_use]
    pub fn with_file(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(Box::new(FilePresetStorage::new(path)))
    }

    /// Storage backend name.
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.storage.name()
    }

    /// Current list.
    pub fn list(&self) -> StoreResult<PresetList> {
        Ok(PresetList {
            presets: self.storage.load()?,
        })
    }

    /// Insert or overwrite the preset called `name`.
    ///
    /// A new name is appended; an existing one keeps its position.
    pub fn upsert(&self, name: &str, text: &str, theme: ThemeWire) -> StoreResult<PresetList> {
        validate_name(name)?;
        validate_text(text)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut presets = self.storage.load()?;
        let entry = Preset {
            name: name.to_string(),
            text: text.to_string(),
            theme,
            updated_at: Some(now_rfc3339()),
        };
        match presets.iter_mut().find(|p| p.name == name) {
            Some(existing) => *existing = entry,
            None => presets.push(entry),
        }
        self.storage.save(&presets)?;
        tracing::debug!(name, count = presets.len(), "preset saved");
        Ok(PresetList { presets })
    }

    /// Remove the preset called `name`. Removing an absent name changes
    /// nothing and still returns the list.
    pub fn delete(&self, name: &str) -> StoreResult<PresetList> {
        validate_name(name)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut presets = self.storage.load()?;
        let before = presets.len();
        presets.retain(|p| p.name != name);
        if presets.len() == before {
            tracing::debug!(name, "delete of absent preset ignored");
        } else {
            self.storage.save(&presets)?;
            tracing::debug!(name, count = presets.len(), "preset deleted");
        }
        Ok(PresetList { presets })
    }
}

impl fmt::Debug for PresetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresetRegistry")
            .field("backend", &self.storage.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &PresetList) -> Vec<&str> {
        list.presets.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("draft").is_ok());
        assert!(validate_name("日本語の名前").is_ok());
        assert!(validate_name(&"x".repeat(64)).is_ok());
        assert!(validate_name(&"é".repeat(64)).is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name(&"x".repeat(65)).is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\\b").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a..b").is_err());
        assert!(validate_name("a.b").is_ok());
    }

    #[test]
    fn text_limit() {
        assert!(validate_text(&"x".repeat(MAX_TEXT_BYTES)).is_ok());
        let err = validate_text(&"x".repeat(MAX_TEXT_BYTES + 1)).unwrap_err();
        assert!(matches!(err, StoreError::TextTooLarge { len, .. } if len == MAX_TEXT_BYTES + 1));
    }

    #[test]
    fn upsert_twice_keeps_one_entry_with_latest_content() {
        let reg = PresetRegistry::in_memory();
        reg.upsert("foo", "first", ThemeWire::default()).unwrap();
        reg.upsert("bar", "other", ThemeWire::default()).unwrap();
        let theme = ThemeWire {
            bg: Some("#ffffff".into()),
            ..ThemeWire::default()
        };
        let list = reg.upsert("foo", "second", theme.clone()).unwrap();

        assert_eq!(names(&list), ["foo", "bar"]);
        assert_eq!(list.presets[0].text, "second");
        assert_eq!(list.presets[0].theme, theme);
        assert_eq!(reg.list().unwrap(), list);
    }

    #[test]
    fn upsert_stamps_rfc3339_time() {
        let reg = PresetRegistry::in_memory();
        let list = reg.upsert("t", "", ThemeWire::default()).unwrap();
        let stamp = list.presets[0].updated_at.as_deref().unwrap();
        assert!(OffsetDateTime::parse(stamp, &Rfc3339).is_ok());
    }

    #[test]
    fn upsert_rejects_invalid_input_without_writing() {
        let reg = PresetRegistry::in_memory();
        assert!(reg.upsert("../etc", "x", ThemeWire::default()).is_err());
        assert!(
            reg.upsert("big", &"x".repeat(MAX_TEXT_BYTES + 1), ThemeWire::default())
                .is_err()
        );
        assert!(reg.list().unwrap().presets.is_empty());
    }

    #[test]
    fn delete_removes_and_absent_is_noop() {
        let reg = PresetRegistry::in_memory();
        reg.upsert("a", "", ThemeWire::default()).unwrap();
        reg.upsert("b", "", ThemeWire::default()).unwrap();

        let list = reg.delete("a").unwrap();
        assert_eq!(names(&list), ["b"]);

        let unchanged = reg.delete("missing").unwrap();
        assert_eq!(unchanged, list);
    }

    #[test]
    fn delete_validates_name() {
        let reg = PresetRegistry::in_memory();
        assert!(matches!(reg.delete("a/b"), Err(StoreError::InvalidName(_))));
    }
}
