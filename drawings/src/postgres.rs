//! Postgres drawing storage.
//!
//! Each drawing is one row in `drawings`. Settings, floors and the background
//! image are JSONB columns; the legacy `elements` column is kept so old
//! single-floor rows still load. Rows are reassembled into a JSON object and
//! decoded through [`DrawingRecord::from_value`], which accepts both shapes.

#[cfg(test)]
#[path = "postgres_test.rs"]
mod postgres_test;

use plan::{DrawingId, DrawingRecord, FloorId};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::gateway::{DrawingGateway, DrawingSummary, GatewayError, StoredDrawing, now_ms};

type DrawingRow = (
    Uuid,
    String,
    serde_json::Value,
    Option<serde_json::Value>,
    Option<serde_json::Value>,
    Option<String>,
    Option<serde_json::Value>,
    f64,
    i64,
    i64,
);

/// Newest first; `seq` orders rows created within the same millisecond.
const LIST_SQL: &str =
    "SELECT id, name, total_sqm, created_at, updated_at FROM drawings ORDER BY created_at DESC, seq DESC";

#[derive(Debug, Clone)]
pub struct PgDrawingGateway {
    pool: PgPool,
}

impl PgDrawingGateway {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url` and run migrations.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Database`] if the connection or migrations fail.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, GatewayError> {
        let pool = crate::db::init_pool(database_url, max_connections).await.map_err(|e| {
            error!(error = %e, "drawing database unavailable");
            GatewayError::Database(e)
        })?;
        info!(max_connections, "drawing database ready");
        Ok(Self::new(pool))
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn decode_row(row: DrawingRow) -> Result<StoredDrawing, GatewayError> {
    let (id, name, settings, floors, elements, current_floor_id, background_image, total_sqm, created_at, updated_at) =
        row;
    let value = serde_json::json!({
        "name": name,
        "settings": settings,
        "floors": floors,
        "elements": elements,
        "current_floor_id": current_floor_id,
        "background_image": background_image,
        "total_sqm": total_sqm,
    });
    let record = DrawingRecord::from_value(value).map_err(|e| {
        error!(drawing_id = %id, error = %e, "stored drawing is malformed");
        GatewayError::Record(e)
    })?;
    Ok(StoredDrawing { id, record, created_at, updated_at })
}

fn log_db_error(op: &'static str, id: Option<DrawingId>) -> impl FnOnce(sqlx::Error) -> GatewayError {
    move |e| {
        error!(op, drawing_id = ?id, error = %e, "drawing storage call failed");
        GatewayError::Database(e)
    }
}

#[async_trait::async_trait]
impl DrawingGateway for PgDrawingGateway {
    async fn create(&self, record: &DrawingRecord) -> Result<StoredDrawing, GatewayError> {
        let id = Uuid::new_v4();
        let now = now_ms();
        sqlx::query(
            "INSERT INTO drawings (id, name, settings, floors, elements, current_floor_id, background_image, \
             total_sqm, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)",
        )
        .bind(id)
        .bind(&record.name)
        .bind(Json(&record.settings))
        .bind(record.floors.as_ref().map(Json))
        .bind(record.elements.as_ref().map(Json))
        .bind(record.current_floor_id.as_ref().map(FloorId::as_str))
        .bind(record.background_image.as_ref().map(Json))
        .bind(record.total_sqm)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(log_db_error("create", None))?;

        debug!(drawing_id = %id, "drawing created");
        Ok(StoredDrawing { id, record: record.clone(), created_at: now, updated_at: now })
    }

    async fn update(&self, id: DrawingId, record: &DrawingRecord) -> Result<StoredDrawing, GatewayError> {
        let now = now_ms();
        let row = sqlx::query_as::<_, (i64, i64)>(
            "UPDATE drawings SET name = $2, settings = $3, floors = $4, elements = $5, current_floor_id = $6, \
             background_image = $7, total_sqm = $8, updated_at = GREATEST($9, created_at) \
             WHERE id = $1 RETURNING created_at, updated_at",
        )
        .bind(id)
        .bind(&record.name)
        .bind(Json(&record.settings))
        .bind(record.floors.as_ref().map(Json))
        .bind(record.elements.as_ref().map(Json))
        .bind(record.current_floor_id.as_ref().map(FloorId::as_str))
        .bind(record.background_image.as_ref().map(Json))
        .bind(record.total_sqm)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_db_error("update", Some(id)))?;

        let Some((created_at, updated_at)) = row else {
            error!(drawing_id = %id, "update failed: drawing not found");
            return Err(GatewayError::NotFound(id));
        };
        debug!(drawing_id = %id, "drawing updated");
        Ok(StoredDrawing { id, record: record.clone(), created_at, updated_at })
    }

    async fn list(&self) -> Result<Vec<DrawingSummary>, GatewayError> {
        let rows = sqlx::query_as::<_, (Uuid, String, f64, i64, i64)>(LIST_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(log_db_error("list", None))?;

        Ok(rows
            .into_iter()
            .map(|(id, name, total_sqm, created_at, updated_at)| DrawingSummary {
                id,
                name,
                total_sqm,
                created_at,
                updated_at,
            })
            .collect())
    }

    async fn get(&self, id: DrawingId) -> Result<StoredDrawing, GatewayError> {
        let row = sqlx::query_as::<_, DrawingRow>(
            "SELECT id, name, settings, floors, elements, current_floor_id, background_image, total_sqm, \
             created_at, updated_at FROM drawings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_db_error("get", Some(id)))?;

        let Some(row) = row else {
            error!(drawing_id = %id, "get failed: drawing not found");
            return Err(GatewayError::NotFound(id));
        };
        decode_row(row)
    }

    async fn delete(&self, id: DrawingId) -> Result<(), GatewayError> {
        let result = sqlx::query("DELETE FROM drawings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(log_db_error("delete", Some(id)))?;

        if result.rows_affected() == 0 {
            error!(drawing_id = %id, "delete failed: drawing not found");
            return Err(GatewayError::NotFound(id));
        }
        debug!(drawing_id = %id, "drawing deleted");
        Ok(())
    }
}
