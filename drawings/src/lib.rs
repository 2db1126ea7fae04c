//! Drawing persistence: the storage gateway and the editor session.
//!
//! | Module     | Role                                                  |
//! |------------|-------------------------------------------------------|
//! | `config`   | backend selection and pool sizing from the environment |
//! | `gateway`  | `DrawingGateway` trait, stored/summary types, errors   |
//! | `memory`   | in-process gateway                                     |
//! | `postgres` | sqlx gateway over the `drawings` table                 |
//! | `session`  | `EditorSession`: a `DrawingStore` bound to a gateway   |


pub mod config;
pub mod db;
pub mod gateway;
pub mod memory;
pub mod postgres;
pub mod session;

use std::sync::Arc;

pub use config::{Backend, ConfigError, GatewayConfig};
pub use gateway::{DrawingGateway, DrawingSummary, GatewayError, StoredDrawing};
pub use memory::MemoryDrawingGateway;
pub use postgres::PgDrawingGateway;
pub use session::EditorSession;

/// Build the gateway `config` asks for.
///
/// # Errors
///
/// Returns [`GatewayError::Config`] when Postgres has no URL and
/// [`GatewayError::Database`] if the pool cannot be opened.
pub async fn connect(config: &GatewayConfig) -> Result<Arc<dyn DrawingGateway>, GatewayError> {
    match (config.backend, config.database_url.as_deref()) {
        (Backend::Memory, _) => Ok(Arc::new(MemoryDrawingGateway::new())),
        (Backend::Postgres, Some(url)) => Ok(Arc::new(PgDrawingGateway::connect(url, config.max_connections).await?)),
        (Backend::Postgres, None) => Err(ConfigError::MissingDatabaseUrl.into()),
    }
}
