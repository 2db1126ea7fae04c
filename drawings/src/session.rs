//! Editor session: an open drawing paired with its storage.
//!
//! DESIGN
//! ======
//! The session owns the [`DrawingStore`] and a shared [`DrawingGateway`].
//! Storage calls never mutate the store until they succeed, so a failed save,
//! open or delete leaves the editor exactly as it was.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use plan::{DrawingId, DrawingStore};
use time::OffsetDateTime;
use tracing::{error, info};

use crate::gateway::{DrawingGateway, DrawingSummary, GatewayError};

pub struct EditorSession {
    store: DrawingStore,
    gateway: Arc<dyn DrawingGateway>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession").field("store", &self.store).finish_non_exhaustive()
    }
}

/// Name given to a drawing saved without one, e.g. `Drawing 2024-03-09 14:05`.
#[must_use]
pub fn default_drawing_name(at: OffsetDateTime) -> String {
    format!(
        "Drawing {:04}-{:02}-{:02} {:02}:{:02}",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute()
    )
}

impl EditorSession {
    /// A session on a fresh unsaved drawing.
    #[must_use]
    pub fn new(gateway: Arc<dyn DrawingGateway>) -> Self {
        Self { store: DrawingStore::new(), gateway }
    }

    #[must_use]
    pub fn store(&self) -> &DrawingStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DrawingStore {
        &mut self.store
    }

    /// Persist the open drawing: create on first save, update afterwards.
    ///
    /// A blank name is replaced with [`default_drawing_name`].
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the store is left untouched.
    pub async fn save(&mut self) -> Result<DrawingId, GatewayError> {
        let mut record = self.store.to_record();
        if record.name.trim().is_empty() {
            record.name = default_drawing_name(OffsetDateTime::now_utc());
        }

        let result = match self.store.drawing().id {
            Some(id) => self.gateway.update(id, &record).await,
            None => self.gateway.create(&record).await,
        };
        let stored = result.inspect_err(|e| {
            error!(error = %e, code = e.error_code(), "failed to save drawing");
        })?;

        self.store.set_name(record.name);
        self.store.mark_saved(stored.id);
        info!(drawing_id = %stored.id, "drawing saved");
        Ok(stored.id)
    }

    /// Replace the open drawing with a stored one. History is reseeded.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the store is left untouched.
    pub async fn open(&mut self, id: DrawingId) -> Result<(), GatewayError> {
        let stored = self.gateway.get(id).await.inspect_err(|e| {
            error!(drawing_id = %id, error = %e, "failed to load drawing");
        })?;
        self.store.load_record(stored.record, Some(stored.id));
        info!(drawing_id = %id, "drawing opened");
        Ok(())
    }

    /// Summaries of every stored drawing, newest first.
    ///
    /// # Errors
    ///
    /// Returns the gateway error.
    pub async fn list(&self) -> Result<Vec<DrawingSummary>, GatewayError> {
        self.gateway.list().await.inspect_err(|e| {
            error!(error = %e, "failed to list drawings");
        })
    }

    /// Delete a stored drawing. If it is the open one, the next save creates
    /// a new record.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the store is left untouched.
    pub async fn delete(&mut self, id: DrawingId) -> Result<(), GatewayError> {
        self.gateway.delete(id).await.inspect_err(|e| {
            error!(drawing_id = %id, error = %e, "failed to delete drawing");
        })?;
        if self.store.drawing().id == Some(id) {
            self.store.forget_saved_identity();
        }
        info!(drawing_id = %id, "drawing deleted");
        Ok(())
    }

    /// Start a new unsaved drawing, keeping the current settings.
    pub fn new_drawing(&mut self) {
        self.store.clear_drawing();
    }
}
