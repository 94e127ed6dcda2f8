//! One-way mirror from the live buffer to the host's text value.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use scribble_core::HostField;

/// Writes the buffer's full text into the host's serialized text field.
///
/// The field is read once, to seed the buffer at construction. After that
/// the mirror only writes; nothing the host stores there flows back into
/// the buffer.
///
/// Writing happens in two steps. [`write`](Self::write) stores the text
/// while the backend is still locked; [`publish`](Self::publish) notifies
/// host observers and is called by the session after the lock is dropped,
/// so an observer may freely write the other controls. Clones share the
/// pending flag.
#[derive(Debug, Clone, Default)]
pub struct BufferMirror {
    field: HostField<String>,
    pending: Arc<AtomicBool>,
}

impl BufferMirror {
    /// Mirror into `field`.
    #[must_use]
    pub fn new(field: HostField<String>) -> Self {
        Self {
            field,
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The text the host already held, used to seed a new buffer.
    #[must_use]
    pub fn seed(&self) -> String {
        self.field.get()
    }

    /// Store `text` in the host field without notifying observers.
    pub fn write(&self, text: &str) {
        let unchanged = self.field.with(|current| current == text);
        if unchanged {
            return;
        }
        tracing::trace!(bytes = text.len(), "mirroring buffer");
        self.field.store(text.to_string());
        self.pending.store(true, Ordering::Release);
    }

    /// Notify host observers if a write is pending. Returns whether it did.
    pub fn publish(&self) -> bool {
        if !self.pending.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.field.notify();
        true
    }

    /// The host field written to.
    #[must_use]
    pub fn field(&self) -> &HostField<String> {
        &self.field
    }
}
