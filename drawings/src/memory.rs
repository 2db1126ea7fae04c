//! In-process drawing storage.
//!
//! Rows live in a `tokio::sync::RwLock` map. A creation counter breaks ties
//! between drawings created within the same millisecond so listing order
//! stays newest first.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::collections::HashMap;

use plan::{DrawingId, DrawingRecord};
use tokio::sync::RwLock;
use tracing::{debug, error};
use uuid::Uuid;

use crate::gateway::{DrawingGateway, DrawingSummary, GatewayError, StoredDrawing, now_ms};

#[derive(Debug, Default)]
struct Inner {
    rows: HashMap<DrawingId, (u64, StoredDrawing)>,
    next_seq: u64,
}

#[derive(Debug, Default)]
pub struct MemoryDrawingGateway {
    inner: RwLock<Inner>,
}

impl MemoryDrawingGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DrawingGateway for MemoryDrawingGateway {
    async fn create(&self, record: &DrawingRecord) -> Result<StoredDrawing, GatewayError> {
        let now = now_ms();
        let stored = StoredDrawing { id: Uuid::new_v4(), record: record.clone(), created_at: now, updated_at: now };

        let mut inner = self.inner.write().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.rows.insert(stored.id, (seq, stored.clone()));
        debug!(drawing_id = %stored.id, "drawing created");
        Ok(stored)
    }

    async fn update(&self, id: DrawingId, record: &DrawingRecord) -> Result<StoredDrawing, GatewayError> {
        let mut inner = self.inner.write().await;
        let Some((_, stored)) = inner.rows.get_mut(&id) else {
            error!(drawing_id = %id, "update failed: drawing not found");
            return Err(GatewayError::NotFound(id));
        };
        stored.record = record.clone();
        stored.updated_at = now_ms().max(stored.created_at);
        debug!(drawing_id = %id, "drawing updated");
        Ok(stored.clone())
    }

    async fn list(&self) -> Result<Vec<DrawingSummary>, GatewayError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<&(u64, StoredDrawing)> = inner.rows.values().collect();
        rows.sort_by(|(a_seq, a), (b_seq, b)| b.created_at.cmp(&a.created_at).then(b_seq.cmp(a_seq)));
        Ok(rows.into_iter().map(|(_, stored)| DrawingSummary::from(stored)).collect())
    }

    async fn get(&self, id: DrawingId) -> Result<StoredDrawing, GatewayError> {
        let inner = self.inner.read().await;
        inner.rows.get(&id).map(|(_, stored)| stored.clone()).ok_or_else(|| {
            error!(drawing_id = %id, "get failed: drawing not found");
            GatewayError::NotFound(id)
        })
    }

    async fn delete(&self, id: DrawingId) -> Result<(), GatewayError> {
        let mut inner = self.inner.write().await;
        if inner.rows.remove(&id).is_none() {
            error!(drawing_id = %id, "delete failed: drawing not found");
            return Err(GatewayError::NotFound(id));
        }
        debug!(drawing_id = %id, "drawing deleted");
        Ok(())
    }
}
