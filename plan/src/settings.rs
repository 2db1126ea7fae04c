//! Drawing settings: grid scale, budget, pricing, and wall stroke widths.
//!
//! `Settings` is the authoritative value stored with a drawing. Edits go
//! through `SettingsPatch`, which enumerates every recognised field so that a
//! malformed patch cannot sneak arbitrary keys into the document.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::{
    DEFAULT_GRID_SIZE, DEFAULT_GRID_UNIT, DEFAULT_INNER_WALL_THICKNESS, DEFAULT_MAX_SQM, DEFAULT_PRICE_PER_SQM,
    DEFAULT_SCALE, DEFAULT_WALL_THICKNESS,
};

/// Per-drawing settings. Missing and `null` fields decode to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SettingsWire")]
pub struct Settings {
    /// Pixels per grid square.
    pub grid_size: f64,
    /// Real-world length (meters) per grid square.
    pub grid_unit: f64,
    /// Free-text scale label, e.g. `"1:100"`.
    pub scale: String,
    /// Soft ceiling for the total building area.
    pub max_sqm: f64,
    /// Price per square meter.
    pub price_per_sqm: f64,
    /// Outer wall stroke width in pixels.
    pub wall_thickness: f64,
    /// Inner wall stroke width in pixels.
    pub inner_wall_thickness: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            grid_unit: DEFAULT_GRID_UNIT,
            scale: DEFAULT_SCALE.to_owned(),
            max_sqm: DEFAULT_MAX_SQM,
            price_per_sqm: DEFAULT_PRICE_PER_SQM,
            wall_thickness: DEFAULT_WALL_THICKNESS,
            inner_wall_thickness: DEFAULT_INNER_WALL_THICKNESS,
        }
    }
}

/// Decoding shape of [`Settings`]: every field optional and nullable.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SettingsWire {
    grid_size: Option<f64>,
    grid_unit: Option<f64>,
    scale: Option<String>,
    max_sqm: Option<f64>,
    price_per_sqm: Option<f64>,
    wall_thickness: Option<f64>,
    inner_wall_thickness: Option<f64>,
}

impl From<SettingsWire> for Settings {
    fn from(wire: SettingsWire) -> Self {
        let defaults = Self::default();
        Self {
            grid_size: wire.grid_size.unwrap_or(defaults.grid_size),
            grid_unit: wire.grid_unit.unwrap_or(defaults.grid_unit),
            scale: wire.scale.unwrap_or(defaults.scale),
            max_sqm: wire.max_sqm.unwrap_or(defaults.max_sqm),
            price_per_sqm: wire.price_per_sqm.unwrap_or(defaults.price_per_sqm),
            wall_thickness: wire.wall_thickness.unwrap_or(defaults.wall_thickness),
            inner_wall_thickness: wire.inner_wall_thickness.unwrap_or(defaults.inner_wall_thickness),
        }
    }
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn is_non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

impl Settings {
    /// Conversion factor from canvas pixels to meters.
    #[must_use]
    pub fn meters_per_pixel(&self) -> f64 {
        self.grid_unit / self.grid_size
    }

    /// Replace out-of-range values with defaults.
    ///
    /// Stored drawings may carry zeros or garbage for fields that must be
    /// strictly positive; those fall back to the default value.
    #[must_use]
    pub fn with_fallbacks(mut self) -> Self {
        let defaults = Self::default();
        if !is_positive(self.grid_size) {
            self.grid_size = defaults.grid_size;
        }
        if !is_positive(self.grid_unit) {
            self.grid_unit = defaults.grid_unit;
        }
        if self.scale.trim().is_empty() {
            self.scale = defaults.scale;
        }
        if !is_positive(self.max_sqm) {
            self.max_sqm = defaults.max_sqm;
        }
        if !is_non_negative(self.price_per_sqm) {
            self.price_per_sqm = defaults.price_per_sqm;
        }
        if !is_positive(self.wall_thickness) {
            self.wall_thickness = defaults.wall_thickness;
        }
        if !is_positive(self.inner_wall_thickness) {
            self.inner_wall_thickness = defaults.inner_wall_thickness;
        }
        self
    }

    /// Merge a patch into these settings.
    ///
    /// Values outside their valid range are skipped with a warning. Returns
    /// `true` when the pixel-to-meter scale changed, which invalidates every
    /// cached polygon area.
    #[allow(clippy::float_cmp)]
    pub fn apply(&mut self, patch: &SettingsPatch) -> bool {
        let before = (self.grid_size, self.grid_unit);

        if let Some(v) = patch.grid_size {
            set_checked(&mut self.grid_size, v, is_positive, "gridSize");
        }
        if let Some(v) = patch.grid_unit {
            set_checked(&mut self.grid_unit, v, is_positive, "gridUnit");
        }
        if let Some(ref v) = patch.scale {
            if v.trim().is_empty() {
                warn!(field = "scale", "ignoring blank setting");
            } else {
                self.scale.clone_from(v);
            }
        }
        if let Some(v) = patch.max_sqm {
            set_checked(&mut self.max_sqm, v, is_positive, "maxSqm");
        }
        if let Some(v) = patch.price_per_sqm {
            set_checked(&mut self.price_per_sqm, v, is_non_negative, "pricePerSqm");
        }
        if let Some(v) = patch.wall_thickness {
            set_checked(&mut self.wall_thickness, v, is_positive, "wallThickness");
        }
        if let Some(v) = patch.inner_wall_thickness {
            set_checked(&mut self.inner_wall_thickness, v, is_positive, "innerWallThickness");
        }

        before != (self.grid_size, self.grid_unit)
    }
}

fn set_checked(slot: &mut f64, value: f64, valid: fn(f64) -> bool, field: &'static str) {
    if valid(value) {
        *slot = value;
    } else {
        warn!(field, value, "ignoring out-of-range setting");
    }
}

/// Sparse update for [`Settings`]. Only present fields are applied.
///
/// Unknown keys are rejected when decoding from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_unit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sqm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_sqm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wall_thickness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_wall_thickness: Option<f64>,
}
