use std::io::{self, Read};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use drawings::{Backend, ConfigError, DrawingGateway, EditorSession, GatewayConfig, GatewayError};
use plan::{Drawing, DrawingRecord, RecordError, SettingsPatch};
use serde_json::{Value, json};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("record error: {0}")]
    Record(#[from] RecordError),
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "floorplan", about = "Inspect and manage stored floor-plan drawings")]
struct Cli {
    #[arg(long, env = "DRAWINGS_BACKEND", default_value = "postgres")]
    backend: Backend,

    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored drawings, newest first.
    List,
    /// Print floors, areas and the cost estimate of a drawing.
    Show { id: Uuid },
    /// Print the stored record of a drawing as JSON.
    Export { id: Uuid },
    /// Store a drawing record read from a file.
    Import {
        #[arg(default_value = "-", help = "Input file path, or - for stdin")]
        input: String,

        #[arg(long, help = "Override the drawing name")]
        name: Option<String>,
    },
    /// Delete a stored drawing.
    Delete { id: Uuid },
    /// Change the scale of a drawing and recompute every room area.
    Rescale {
        id: Uuid,

        #[arg(long, help = "Real-world meters per grid cell")]
        grid_unit: f64,

        #[arg(long, help = "Pixels per grid cell")]
        grid_size: Option<f64>,
    },
}

impl Cli {
    fn gateway_config(&self) -> Result<GatewayConfig, ConfigError> {
        let database_url = self.database_url.clone().filter(|url| !url.trim().is_empty());
        if self.backend == Backend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        Ok(GatewayConfig { backend: self.backend, database_url, max_connections: self.max_connections.max(1) })
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "ignoring unreadable .env");
        }
    }

    let cli = Cli::parse();
    let config = cli.gateway_config()?;
    let gateway = drawings::connect(&config).await?;

    match cli.command {
        Command::List => run_list(gateway).await,
        Command::Show { id } => run_show(gateway, id).await,
        Command::Export { id } => run_export(gateway, id).await,
        Command::Import { input, name } => run_import(gateway, &input, name).await,
        Command::Delete { id } => run_delete(gateway, id).await,
        Command::Rescale { id, grid_unit, grid_size } => run_rescale(gateway, id, grid_unit, grid_size).await,
    }
}

async fn run_list(gateway: Arc<dyn DrawingGateway>) -> Result<(), CliError> {
    let session = EditorSession::new(gateway);
    let summaries = session.list().await?;
    print_json(&serde_json::to_value(summaries)?)
}

async fn run_show(gateway: Arc<dyn DrawingGateway>, id: Uuid) -> Result<(), CliError> {
    let stored = gateway.get(id).await?;
    let drawing = Drawing::from_record(stored.record, Some(stored.id));
    print_json(&drawing_report(&drawing))
}

async fn run_export(gateway: Arc<dyn DrawingGateway>, id: Uuid) -> Result<(), CliError> {
    let stored = gateway.get(id).await?;
    print_json(&stored.record.to_value()?)
}

async fn run_import(gateway: Arc<dyn DrawingGateway>, input: &str, name: Option<String>) -> Result<(), CliError> {
    let text = read_input(input)?;
    let record = DrawingRecord::from_json(&text)?;
    if record.is_legacy() {
        info!("importing legacy single-floor record");
    }

    let mut drawing = Drawing::from_record(record, None);
    if let Some(name) = name {
        drawing.name = name;
    }

    let mut session = EditorSession::new(gateway);
    session.store_mut().load_drawing(drawing);
    let id = session.save().await?;
    print_json(&json!({ "id": id, "name": session.store().drawing().name }))
}

async fn run_delete(gateway: Arc<dyn DrawingGateway>, id: Uuid) -> Result<(), CliError> {
    let mut session = EditorSession::new(gateway);
    session.delete(id).await?;
    print_json(&json!({ "deleted": id }))
}

async fn run_rescale(
    gateway: Arc<dyn DrawingGateway>,
    id: Uuid,
    grid_unit: f64,
    grid_size: Option<f64>,
) -> Result<(), CliError> {
    let mut session = EditorSession::new(gateway);
    session.open(id).await?;

    let before = session.store().total_building_sqm();
    let patch = SettingsPatch { grid_unit: Some(grid_unit), grid_size, ..SettingsPatch::default() };
    session.store_mut().update_settings(&patch);
    if (session.store().settings().grid_unit - grid_unit).abs() > f64::EPSILON {
        warn!(grid_unit, "grid unit rejected; drawing keeps its previous scale");
    }
    session.save().await?;

    print_json(&json!({
        "id": id,
        "before_sqm": before,
        "after_sqm": session.store().total_building_sqm(),
        "settings": session.store().settings(),
    }))
}

fn drawing_report(drawing: &Drawing) -> Value {
    let floors: Vec<Value> = drawing
        .floors()
        .iter()
        .map(|floor| {
            let current = &floor.id == drawing.current_floor_id();
            json!({
                "id": floor.id,
                "name": floor.name,
                "elements": floor.elements.len(),
                "sqm": floor.sqm(),
                "current": current,
            })
        })
        .collect();

    json!({
        "id": drawing.id,
        "name": drawing.name,
        "scale": drawing.settings.scale,
        "meters_per_pixel": drawing.meters_per_pixel(),
        "floors": floors,
        "total_sqm": drawing.total_building_sqm(),
        "max_sqm": drawing.settings.max_sqm,
        "exceeds_max_sqm": drawing.exceeds_max_sqm(),
        "total_price": drawing.total_price(),
    })
}

fn read_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
