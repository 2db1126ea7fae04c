//! Persistence gateway: the storage contract for drawings.
//!
//! DESIGN
//! ======
//! The editor core never talks to storage directly. It hands a
//! [`DrawingRecord`] to a [`DrawingGateway`] and gets back a [`StoredDrawing`]
//! carrying the server-assigned id and timestamps. Implementations exist for
//! Postgres and for an in-process map.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use std::time::{SystemTime, UNIX_EPOCH};

use plan::{DrawingId, DrawingRecord, RecordError};
use serde::Serialize;

use crate::config::ConfigError;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("drawing not found: {0}")]
    NotFound(DrawingId),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GatewayError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_DRAWING_NOT_FOUND",
            Self::Database(_) => "E_DATABASE",
            Self::Record(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}

/// A drawing as held by storage.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDrawing {
    pub id: DrawingId,
    pub record: DrawingRecord,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub updated_at: i64,
}

/// One line of a drawing listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingSummary {
    pub id: DrawingId,
    pub name: String,
    pub total_sqm: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&StoredDrawing> for DrawingSummary {
    fn from(stored: &StoredDrawing) -> Self {
        Self {
            id: stored.id,
            name: stored.record.name.clone(),
            total_sqm: stored.record.total_sqm,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

// =============================================================================
// GATEWAY TRAIT
// =============================================================================

/// Storage for drawing documents.
#[async_trait::async_trait]
pub trait DrawingGateway: Send + Sync {
    /// Store a new drawing and assign it an id.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the backend rejects the write.
    async fn create(&self, record: &DrawingRecord) -> Result<StoredDrawing, GatewayError>;

    /// Overwrite an existing drawing. `created_at` is kept.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] for an unknown id.
    async fn update(&self, id: DrawingId, record: &DrawingRecord) -> Result<StoredDrawing, GatewayError>;

    /// Summaries of every drawing, newest-created first.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the backend cannot be read.
    async fn list(&self) -> Result<Vec<DrawingSummary>, GatewayError>;

    /// Fetch one drawing.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] for an unknown id.
    async fn get(&self, id: DrawingId) -> Result<StoredDrawing, GatewayError>;

    /// Remove one drawing.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] for an unknown id.
    async fn delete(&self, id: DrawingId) -> Result<(), GatewayError>;
}

pub(crate) fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}
