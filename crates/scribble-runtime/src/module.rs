//! The optional rich editing module.
//!
//! The rich backend is built on a module the host fetches at runtime. The
//! fetch can fail outright, hang, or hand back a build that does not fit
//! (wrong major version, missing decoration support). [`ModuleSource`]
//! abstracts the fetch; [`RichModule::check_compatible`] decides fit.

use std::fmt;

use bitflags::bitflags;

use crate::loader::LoadError;

/// Major version the rich backend is written against.
pub const REQUIRED_MAJOR: u16 = 6;

bitflags! {
    /// Features a rich module build offers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModuleCapabilities: u8 {
        /// Per-line decorations (comment coloring). Required.
        const DECORATIONS     = 0b0001;
        /// Undo/redo history.
        const HISTORY         = 0b0010;
        /// More than one selection at a time.
        const MULTI_SELECTION = 0b0100;
    }
}

/// Semantic version of a module build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleVersion {
    /// Major.
    pub major: u16,
    /// Minor.
    pub minor: u16,
    /// Patch.
    pub patch: u16,
}

impl ModuleVersion {
    /// `major.minor.patch`
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A fetched rich module build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichModule {
    /// Where it came from, for logs.
    pub origin: String,
    /// Build version.
    pub version: ModuleVersion,
    /// What the build supports.
    pub capabilities: ModuleCapabilities,
}

impl RichModule {
    /// The module compiled into this crate: every capability, current major.
    #[must_use]
    pub fn bundled() -> Self {
        Self {
            origin: "bundled".to_string(),
            version: ModuleVersion::new(REQUIRED_MAJOR, 28, 1),
            capabilities: ModuleCapabilities::all(),
        }
    }

    /// Reject builds the rich backend cannot drive.
    pub fn check_compatible(&self) -> Result<(), LoadError> {
        if self.version.major != REQUIRED_MAJOR {
            return Err(LoadError::Incompatible(format!(
                "{} is version {}, need major {REQUIRED_MAJOR}",
                self.origin, self.version
            )));
        }
        if !self.capabilities.contains(ModuleCapabilities::DECORATIONS) {
            return Err(LoadError::Incompatible(format!(
                "{} lacks line decorations",
                self.origin
            )));
        }
        Ok(())
    }

    /// Whether the build offers `caps`.
    #[must_use]
    pub fn supports(&self, caps: ModuleCapabilities) -> bool {
        self.capabilities.contains(caps)
    }
}

/// Something that can produce the rich module.
///
/// `fetch` may block; the loader runs it on a worker thread and stops
/// waiting after the configured timeout.
pub trait ModuleSource: Send + Sync {
    /// Name for logs.
    fn name(&self) -> &str;

    /// Produce the module or explain why not.
    fn fetch(&self) -> Result<RichModule, LoadError>;
}

/// Always yields [`RichModule::bundled`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSource;

impl ModuleSource for BundledSource {
    fn name(&self) -> &str {
        "bundled"
    }

    fn fetch(&self) -> Result<RichModule, LoadError> {
        Ok(RichModule::bundled())
    }
}

/// Always fails; hosts without the rich module use this to force the
/// fallback backend.
#[derive(Debug, Clone, Default)]
pub struct UnavailableSource {
    reason: String,
}

impl UnavailableSource {
    /// Fail with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl ModuleSource for UnavailableSource {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn fetch(&self) -> Result<RichModule, LoadError> {
        Err(LoadError::Unavailable(self.reason.clone()))
    }
}

/// Adapts a closure into a [`ModuleSource`].
pub struct FnSource<F> {
    name: String,
    fetch: F,
}

impl<F> FnSource<F>
where
    F: Fn() -> Result<RichModule, LoadError> + Send + Sync,
{
    /// Source called `name` that runs `fetch`.
    pub fn new(name: impl Into<String>, fetch: F) -> Self {
        Self {
            name: name.into(),
            fetch,
        }
    }
}

impl<F> ModuleSource for FnSource<F>
where
    F: Fn() -> Result<RichModule, LoadError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<RichModule, LoadError> {
        (self.fetch)()
    }
}

impl<F> fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSource").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_is_compatible() {
        let module = RichModule::bundled();
        assert!(module.check_compatible().is_ok());
        assert!(module.supports(ModuleCapabilities::HISTORY | ModuleCapabilities::MULTI_SELECTION));
    }

    #[test]
    fn wrong_major_is_incompatible() {
        let module = RichModule {
            version: ModuleVersion::new(5, 9, 0),
            ..RichModule::bundled()
        };
        let err = module.check_compatible().unwrap_err();
        assert!(matches!(err, LoadError::Incompatible(ref msg) if msg.contains("5.9.0")));
    }

    #[test]
    fn missing_decorations_is_incompatible() {
        let module = RichModule {
            capabilities: ModuleCapabilities::HISTORY,
            ..RichModule::bundled()
        };
        assert!(matches!(
            module.check_compatible(),
            Err(LoadError::Incompatible(_))
        ));
    }

    #[test]
    fn sources() {
        assert!(BundledSource.fetch().is_ok());
        let down = UnavailableSource::new("offline");
        assert_eq!(down.fetch(), Err(LoadError::Unavailable("offline".into())));
        let custom = FnSource::new("custom", || Ok(RichModule::bundled()));
        assert_eq!(custom.name(), "custom");
        assert!(custom.fetch().is_ok());
    }
}
