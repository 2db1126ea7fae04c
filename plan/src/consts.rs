//! Shared numeric constants for the plan crate.

// ── History ─────────────────────────────────────────────────────

/// Maximum number of snapshots kept in a floor's undo log.
pub const HISTORY_LIMIT: usize = 50;

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 5.0;

// ── Settings defaults ───────────────────────────────────────────

/// Pixels per grid square.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Meters per grid square.
pub const DEFAULT_GRID_UNIT: f64 = 1.0;

/// Display label for the drawing scale.
pub const DEFAULT_SCALE: &str = "1:100";

/// Soft budget ceiling for the whole building, in square meters.
pub const DEFAULT_MAX_SQM: f64 = 200.0;

/// Cost per square meter (SEK).
pub const DEFAULT_PRICE_PER_SQM: f64 = 25_000.0;

/// Outer wall stroke width in pixels.
pub const DEFAULT_WALL_THICKNESS: f64 = 2.0;

/// Inner wall stroke width in pixels.
pub const DEFAULT_INNER_WALL_THICKNESS: f64 = 1.0;

// ── Background image ────────────────────────────────────────────

/// Opacity given to a freshly placed background image.
pub const DEFAULT_BACKGROUND_OPACITY: f64 = 0.5;
