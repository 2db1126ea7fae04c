//! Document model: drawing elements, floors, the shared background image, and
//! the multi-floor `Drawing` that owns them.
//!
//! A `Drawing` always has at least one floor and a current floor that resolves
//! to one of them. Floors own their elements exclusively; the background image
//! is a single record shared by every floor. Floor and element ids are opaque
//! strings (fresh ones are UUIDs); stored drawings written by older clients may
//! carry numeric ids, which decode to their decimal string form.
//!
//! Polygon-family elements carry a cached `area` in real-world square units.
//! It is derived from the points and the settings scale and is refreshed by
//! [`Drawing::recalculate_all_areas`] whenever the scale changes.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::consts::DEFAULT_BACKGROUND_OPACITY;
use crate::geometry;
use crate::record::null_as_default;
use crate::settings::Settings;

/// Identifier assigned to a drawing by the storage backend.
pub type DrawingId = Uuid;

// =============================================================================
// IDS
// =============================================================================

/// Wire form accepted for ids: strings, or numbers from older clients.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl From<LooseId> for String {
    fn from(raw: LooseId) -> Self {
        match raw {
            LooseId::Text(s) => s,
            LooseId::Signed(n) => n.to_string(),
            LooseId::Unsigned(n) => n.to_string(),
            LooseId::Float(n) => n.to_string(),
        }
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh random id.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                LooseId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

string_id! {
    /// Unique identifier of a floor within its drawing.
    FloorId
}

string_id! {
    /// Unique identifier of an element within its floor.
    ElementId
}

// =============================================================================
// ELEMENTS
// =============================================================================

/// A wall segment drawn with the line tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Wall {
    /// Inner walls are stroked with `inner_wall_thickness` instead of `wall_thickness`.
    pub inner: bool,
}

/// A door or window placed along a wall.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Opening {
    /// Clockwise rotation in degrees.
    pub rotation: f64,
    /// Mirror the swing (doors) or sash (windows) across the wall.
    pub flipped: bool,
}

/// An enclosed room outline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Room {
    /// Cached enclosed area in square meters.
    #[serde(deserialize_with = "null_as_default")]
    pub area: f64,
    /// Optional room name shown inside the outline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Kind-specific payload of an element, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementKind {
    /// Wall segment.
    Line(Wall),
    /// Door opening.
    Door(Opening),
    /// Window opening.
    Window(Opening),
    /// Free polygon with an area.
    Polygon(Room),
    /// Room outline drawn with the room tool.
    RoomPolygon(Room),
}

/// A single drawn primitive on a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique within the owning floor.
    pub id: ElementId,
    /// Flat `[x0, y0, x1, y1, ...]` coordinates in pixel space.
    #[serde(default, deserialize_with = "null_as_default")]
    pub points: Vec<f64>,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Create an element with a fresh id.
    #[must_use]
    pub fn new(kind: ElementKind, points: Vec<f64>) -> Self {
        Self { id: ElementId::generate(), points, kind }
    }

    /// An outer wall segment.
    #[must_use]
    pub fn wall(points: Vec<f64>) -> Self {
        Self::new(ElementKind::Line(Wall::default()), points)
    }

    /// A door with no rotation.
    #[must_use]
    pub fn door(points: Vec<f64>) -> Self {
        Self::new(ElementKind::Door(Opening::default()), points)
    }

    /// A window with no rotation.
    #[must_use]
    pub fn window(points: Vec<f64>) -> Self {
        Self::new(ElementKind::Window(Opening::default()), points)
    }

    /// A room outline whose area is computed at the given scale.
    #[must_use]
    pub fn room(points: Vec<f64>, meters_per_pixel: f64) -> Self {
        let area = geometry::compute_area(&points, meters_per_pixel);
        Self::new(ElementKind::RoomPolygon(Room { area, label: None }), points)
    }

    /// Whether this element is a polygon carrying an area.
    #[must_use]
    pub fn is_polygon_family(&self) -> bool {
        matches!(self.kind, ElementKind::Polygon(_) | ElementKind::RoomPolygon(_))
    }

    /// Cached area for polygon-family elements.
    #[must_use]
    pub fn area(&self) -> Option<f64> {
        match &self.kind {
            ElementKind::Polygon(room) | ElementKind::RoomPolygon(room) => Some(room.area),
            _ => None,
        }
    }

    /// Recompute the cached area from the points. Non-polygons are untouched.
    pub fn recalculate_area(&mut self, meters_per_pixel: f64) {
        if let ElementKind::Polygon(room) | ElementKind::RoomPolygon(room) = &mut self.kind {
            room.area = geometry::compute_area(&self.points, meters_per_pixel);
        }
    }

    /// Wire name of this element's kind.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Line(_) => "line",
            ElementKind::Door(_) => "door",
            ElementKind::Window(_) => "window",
            ElementKind::Polygon(_) => "polygon",
            ElementKind::RoomPolygon(_) => "room-polygon",
        }
    }
}

/// Sparse update for an element. Only present fields are applied; fields that
/// do not belong to the element's kind are ignored.
///
/// The area is never recomputed here. A patch that moves polygon points should
/// also carry the new area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flipped: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ElementPatch {
    /// Merge this patch into an element.
    pub fn apply_to(&self, element: &mut Element) {
        if let Some(ref points) = self.points {
            element.points.clone_from(points);
        }
        match &mut element.kind {
            ElementKind::Line(wall) => {
                if let Some(inner) = self.inner {
                    wall.inner = inner;
                }
            }
            ElementKind::Door(opening) | ElementKind::Window(opening) => {
                if let Some(rotation) = self.rotation {
                    opening.rotation = rotation;
                }
                if let Some(flipped) = self.flipped {
                    opening.flipped = flipped;
                }
            }
            ElementKind::Polygon(room) | ElementKind::RoomPolygon(room) => {
                if let Some(area) = self.area {
                    room.area = area;
                }
                if let Some(ref label) = self.label {
                    room.label = Some(label.clone());
                }
            }
        }
    }
}

// =============================================================================
// FLOORS
// =============================================================================

/// One level of the building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub name: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Floor {
    /// An empty floor with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: FloorId::generate(), name: name.into(), elements: Vec::new() }
    }

    /// Look up an element by id.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|el| &el.id == id)
    }

    /// Sum of cached areas over polygon-family elements.
    #[must_use]
    pub fn sqm(&self) -> f64 {
        self.elements.iter().filter_map(Element::area).sum()
    }

    /// Give any element whose id repeats an earlier one a fresh id.
    ///
    /// Returns the number of ids replaced.
    pub fn dedupe_element_ids(&mut self) -> usize {
        let mut seen = HashSet::new();
        let mut replaced = 0;
        for el in &mut self.elements {
            if !seen.insert(el.id.clone()) {
                el.id = ElementId::generate();
                seen.insert(el.id.clone());
                replaced += 1;
            }
        }
        replaced
    }
}

// =============================================================================
// BACKGROUND IMAGE
// =============================================================================

/// Raster underlay traced over while drawing. Shared by every floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackgroundImage {
    /// Encoded image (`data:` URL). `None` when no image is placed.
    pub data_url: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Locked images ignore drag/resize in the editor.
    pub locked: bool,
}

impl Default for BackgroundImage {
    fn default() -> Self {
        Self {
            data_url: None,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            opacity: DEFAULT_BACKGROUND_OPACITY,
            locked: false,
        }
    }
}

impl BackgroundImage {
    /// Whether an image is placed.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.data_url.is_some()
    }
}

/// Sparse update for the background image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BackgroundPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl BackgroundPatch {
    /// Merge this patch into a background record. Opacity is clamped to `[0, 1]`.
    pub fn apply_to(&self, bg: &mut BackgroundImage) {
        if let Some(ref url) = self.data_url {
            bg.data_url = Some(url.clone());
        }
        if let Some(x) = self.x {
            bg.x = x;
        }
        if let Some(y) = self.y {
            bg.y = y;
        }
        if let Some(w) = self.width {
            bg.width = w;
        }
        if let Some(h) = self.height {
            bg.height = h;
        }
        if let Some(o) = self.opacity {
            if o.is_nan() {
                warn!("ignoring NaN background opacity");
            } else {
                bg.opacity = o.clamp(0.0, 1.0);
            }
        }
        if let Some(locked) = self.locked {
            bg.locked = locked;
        }
    }
}

// =============================================================================
// DRAWING
// =============================================================================

/// A multi-floor drawing.
///
/// Floors are private so the "at least one floor" and "current floor exists"
/// invariants hold after every operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    /// Storage id; `None` until the drawing is first saved.
    pub id: Option<DrawingId>,
    pub name: String,
    pub settings: Settings,
    pub background: BackgroundImage,
    floors: Vec<Floor>,
    current_floor_id: FloorId,
}

impl Default for Drawing {
    fn default() -> Self {
        Self::new()
    }
}

fn default_floor_name(index: usize) -> String {
    format!("Floor {index}")
}

impl Drawing {
    /// An unsaved drawing with default settings and one empty floor.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// An unsaved drawing with one empty floor and the given settings.
    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        let floor = Floor::new(default_floor_name(1));
        Self {
            id: None,
            name: String::new(),
            settings,
            background: BackgroundImage::default(),
            current_floor_id: floor.id.clone(),
            floors: vec![floor],
        }
    }

    /// Assemble a drawing from loose parts, repairing broken invariants.
    ///
    /// An empty floor list gets a default floor. A current floor id that does
    /// not resolve falls back to the first floor. Repeated floor or element
    /// ids are replaced with fresh ones.
    #[must_use]
    pub fn from_parts(
        id: Option<DrawingId>,
        name: String,
        settings: Settings,
        mut floors: Vec<Floor>,
        current_floor_id: Option<FloorId>,
        background: BackgroundImage,
    ) -> Self {
        if floors.is_empty() {
            floors.push(Floor::new(default_floor_name(1)));
        }

        let mut seen = HashSet::new();
        for floor in &mut floors {
            if !seen.insert(floor.id.clone()) {
                warn!(floor_id = %floor.id, "duplicate floor id; assigning a fresh one");
                floor.id = FloorId::generate();
                seen.insert(floor.id.clone());
            }
            let replaced = floor.dedupe_element_ids();
            if replaced > 0 {
                warn!(floor_id = %floor.id, replaced, "duplicate element ids; assigned fresh ones");
            }
        }

        let current_floor_id = match current_floor_id {
            Some(id) if floors.iter().any(|f| f.id == id) => id,
            other => {
                if let Some(missing) = other {
                    warn!(floor_id = %missing, "current floor not found; using first floor");
                }
                floors[0].id.clone()
            }
        };

        Self { id, name, settings, background, floors, current_floor_id }
    }

    // --- Floor registry ---

    /// All floors in order.
    #[must_use]
    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    /// Look up a floor by id.
    #[must_use]
    pub fn floor(&self, id: &FloorId) -> Option<&Floor> {
        self.floors.iter().find(|f| &f.id == id)
    }

    fn floor_mut(&mut self, id: &FloorId) -> Option<&mut Floor> {
        self.floors.iter_mut().find(|f| &f.id == id)
    }

    /// Id of the floor being edited.
    #[must_use]
    pub fn current_floor_id(&self) -> &FloorId {
        &self.current_floor_id
    }

    /// The floor being edited.
    #[must_use]
    pub fn current_floor(&self) -> &Floor {
        self.floor(&self.current_floor_id).unwrap_or(&self.floors[0])
    }

    pub(crate) fn current_floor_mut(&mut self) -> &mut Floor {
        let index = self
            .floors
            .iter()
            .position(|f| f.id == self.current_floor_id)
            .unwrap_or(0);
        &mut self.floors[index]
    }

    /// Append an empty floor named `Floor N` and make it current.
    pub fn add_floor(&mut self) -> FloorId {
        let floor = Floor::new(default_floor_name(self.floors.len() + 1));
        let id = floor.id.clone();
        self.floors.push(floor);
        self.current_floor_id = id.clone();
        debug!(floor_id = %id, count = self.floors.len(), "floor added");
        id
    }

    /// Copy a floor (with fresh element ids) to the end and make it current.
    ///
    /// Returns `None` when the source floor does not exist.
    pub fn duplicate_floor(&mut self, source: &FloorId) -> Option<FloorId> {
        let original = self.floor(source)?;
        let mut copy = Floor::new(format!("{} (Copy)", original.name));
        copy.elements = original
            .elements
            .iter()
            .map(|el| Element { id: ElementId::generate(), ..el.clone() })
            .collect();

        let id = copy.id.clone();
        self.floors.push(copy);
        self.current_floor_id = id.clone();
        debug!(source = %source, floor_id = %id, "floor duplicated");
        Some(id)
    }

    /// Remove a floor. The last remaining floor is never removed.
    ///
    /// If the removed floor was current, the first floor becomes current.
    /// Returns `true` when a floor was removed.
    pub fn delete_floor(&mut self, id: &FloorId) -> bool {
        if self.floors.len() <= 1 {
            return false;
        }
        let Some(index) = self.floors.iter().position(|f| &f.id == id) else {
            return false;
        };
        self.floors.remove(index);
        if &self.current_floor_id == id {
            self.current_floor_id = self.floors[0].id.clone();
        }
        debug!(floor_id = %id, count = self.floors.len(), "floor deleted");
        true
    }

    /// Make the given floor current. Returns `false` for unknown ids.
    pub fn set_current_floor(&mut self, id: &FloorId) -> bool {
        if self.floor(id).is_none() {
            return false;
        }
        self.current_floor_id = id.clone();
        true
    }

    /// Rename a floor. Returns `false` for unknown ids.
    pub fn rename_floor(&mut self, id: &FloorId, name: impl Into<String>) -> bool {
        let Some(floor) = self.floor_mut(id) else {
            return false;
        };
        floor.name = name.into();
        true
    }

    // --- Derived state ---

    /// Conversion factor from canvas pixels to meters.
    #[must_use]
    pub fn meters_per_pixel(&self) -> f64 {
        self.settings.meters_per_pixel()
    }

    /// Overwrite the cached area of every polygon on every floor.
    pub fn recalculate_all_areas(&mut self) {
        let mpp = self.meters_per_pixel();
        for floor in &mut self.floors {
            for el in &mut floor.elements {
                el.recalculate_area(mpp);
            }
        }
        debug!(meters_per_pixel = mpp, "polygon areas recalculated");
    }

    /// Area of one floor, or `None` for unknown ids.
    #[must_use]
    pub fn floor_sqm(&self, id: &FloorId) -> Option<f64> {
        self.floor(id).map(Floor::sqm)
    }

    /// Area of the current floor.
    #[must_use]
    pub fn current_floor_sqm(&self) -> f64 {
        self.current_floor().sqm()
    }

    /// Area of every floor combined.
    #[must_use]
    pub fn total_building_sqm(&self) -> f64 {
        self.floors.iter().map(Floor::sqm).sum()
    }

    /// Estimated cost of the whole building.
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.total_building_sqm() * self.settings.price_per_sqm
    }

    /// Whether the building is over the area budget.
    #[must_use]
    pub fn exceeds_max_sqm(&self) -> bool {
        self.total_building_sqm() > self.settings.max_sqm
    }
}
