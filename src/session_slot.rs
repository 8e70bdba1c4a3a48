//! Single-slot model session cache
//!
//! Exactly one live session exists at a time: installing a session for a new
//! model identity discards the previous one immediately, and there is no
//! pooling or background eviction. The slot is an explicit resource object
//! owned by the orchestrator (behind a `Mutex` to hold the single-writer
//! invariant under threads) with an explicit invalidate operation.

use crate::error::{InpaintError, Result};
use crate::inference::InferenceBackend;
use crate::models::ModelIdentity;

struct SessionEntry {
    identity: ModelIdentity,
    backend: Box<dyn InferenceBackend>,
}

/// The single mutable session slot
#[derive(Default)]
pub struct SessionSlot {
    entry: Option<SessionEntry>,
}

impl SessionSlot {
    /// Create an empty slot
    #[must_use]
    pub fn new() -> Self {
        Self { entry: None }
    }

    /// Identity of the cached session, if any
    #[must_use]
    pub fn cached_identity(&self) -> Option<&ModelIdentity> {
        self.entry.as_ref().map(|e| &e.identity)
    }

    /// Whether a ready session for this identity is cached
    #[must_use]
    pub fn is_warm(&self, identity: &ModelIdentity) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|e| e.identity == *identity && e.backend.is_initialized())
    }

    /// Install a session, discarding whatever was cached before
    pub fn install(&mut self, identity: ModelIdentity, backend: Box<dyn InferenceBackend>) {
        if let Some(previous) = &self.entry {
            log::debug!(
                "Replacing cached session {} with {}",
                previous.identity,
                identity
            );
        }
        self.entry = Some(SessionEntry { identity, backend });
    }

    /// Drop the cached session immediately
    pub fn invalidate(&mut self) {
        if let Some(entry) = self.entry.take() {
            log::debug!("Invalidated cached session {}", entry.identity);
        }
    }

    /// Mutable access to the cached backend
    ///
    /// # Errors
    /// - [`InpaintError::RuntimeUnavailable`] when no session is cached
    pub fn backend_mut(&mut self) -> Result<&mut Box<dyn InferenceBackend>> {
        self.entry
            .as_mut()
            .map(|e| &mut e.backend)
            .ok_or_else(|| InpaintError::runtime_unavailable("No model session loaded"))
    }
}
