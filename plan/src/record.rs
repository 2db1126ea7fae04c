//! Storage record: the serialized shape of a drawing.
//!
//! `Drawing::to_record` produces the current shape (`floors` plus
//! `current_floor_id`). `Drawing::from_record` also accepts the legacy
//! single-floor shape, where elements sit in a top-level `elements` array; those
//! are migrated into one floor named "Floor 1".

#[cfg(test)]
#[path = "record_test.rs"]
mod record_test;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::doc::{BackgroundImage, Drawing, DrawingId, Element, Floor, FloorId};
use crate::settings::Settings;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("malformed drawing record: {0}")]
    Decode(serde_json::Error),
    #[error("failed to encode drawing record: {0}")]
    Encode(serde_json::Error),
}

impl RecordError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "E_RECORD_DECODE",
            Self::Encode(_) => "E_RECORD_ENCODE",
        }
    }
}

/// Decode `null` as the type's default, matching a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A drawing as written to and read from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub settings: Settings,
    /// Current shape: every floor with its elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floors: Option<Vec<Floor>>,
    /// Legacy shape: the elements of a single-floor drawing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<Element>>,
    #[serde(default, alias = "currentFloorId", skip_serializing_if = "Option::is_none")]
    pub current_floor_id: Option<FloorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<BackgroundImage>,
    /// Building area at save time; informational, recomputed on load.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_sqm: f64,
}

impl DrawingRecord {
    /// Decode a record from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Decode`] when the value does not match either shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, RecordError> {
        serde_json::from_value(value).map_err(RecordError::Decode)
    }

    /// Decode a record from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Decode`] on malformed JSON or shape mismatch.
    pub fn from_json(text: &str) -> Result<Self, RecordError> {
        serde_json::from_str(text).map_err(RecordError::Decode)
    }

    /// Encode this record as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Encode`] if a value cannot be represented in JSON.
    pub fn to_value(&self) -> Result<serde_json::Value, RecordError> {
        serde_json::to_value(self).map_err(RecordError::Encode)
    }

    /// Whether this record uses the legacy single-floor shape.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.floors.as_ref().is_none_or(Vec::is_empty)
    }
}

impl Drawing {
    /// Serialize into the current record shape.
    #[must_use]
    pub fn to_record(&self) -> DrawingRecord {
        DrawingRecord {
            name: self.name.clone(),
            settings: self.settings.clone(),
            floors: Some(self.floors().to_vec()),
            elements: None,
            current_floor_id: Some(self.current_floor_id().clone()),
            background_image: self.background.is_set().then(|| self.background.clone()),
            total_sqm: self.total_building_sqm(),
        }
    }

    /// Rebuild a drawing from a stored record.
    ///
    /// Settings that are missing or out of range fall back to their defaults.
    /// A legacy record becomes a single floor named "Floor 1".
    #[must_use]
    pub fn from_record(record: DrawingRecord, id: Option<DrawingId>) -> Self {
        let legacy = record.is_legacy();
        let settings = record.settings.with_fallbacks();
        let background = record.background_image.unwrap_or_default();

        let (floors, current) = if legacy {
            let mut floor = Floor::new("Floor 1");
            floor.elements = record.elements.unwrap_or_default();
            debug!(elements = floor.elements.len(), "migrating legacy single-floor record");
            (vec![floor], None)
        } else {
            (record.floors.unwrap_or_default(), record.current_floor_id)
        };

        Self::from_parts(id, record.name, settings, floors, current, background)
    }
}
