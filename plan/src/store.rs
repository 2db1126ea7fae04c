//! The drawing store: every edit the editor can make, with undo/redo.
//!
//! `DrawingStore` owns the document, the per-floor history log, tool and
//! selection state, and the camera. Structural edits to the current floor
//! (add/update/remove element) commit a history snapshot. Everything else,
//! including scale-driven area recalculation, bypasses the log.
//!
//! Invalid requests (unknown ids, undo past the start, deleting the last
//! floor) are silent no-ops. Methods report whether anything changed so the
//! host can skip redraws.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use tracing::{debug, warn};

use crate::camera::Camera;
use crate::doc::{
    BackgroundImage, BackgroundPatch, Drawing, DrawingId, Element, ElementId, ElementPatch, Floor, FloorId,
};
use crate::history::History;
use crate::input::{Tool, UiState};
use crate::record::DrawingRecord;
use crate::settings::{Settings, SettingsPatch};

/// Editor state for one open drawing.
#[derive(Debug, Clone, Default)]
pub struct DrawingStore {
    drawing: Drawing,
    history: History,
    ui: UiState,
    camera: Camera,
}

impl DrawingStore {
    /// A store holding a fresh unsaved drawing with an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store opened on an existing drawing.
    #[must_use]
    pub fn with_drawing(drawing: Drawing) -> Self {
        let mut store = Self::new();
        store.load_drawing(drawing);
        store
    }

    // --- Loading and saving ---

    /// Replace the open drawing. History is reseeded with the current floor.
    pub fn load_drawing(&mut self, drawing: Drawing) {
        self.drawing = drawing;
        self.ui.selected_id = None;
        self.reseed_history();
        debug!(
            drawing_id = ?self.drawing.id,
            floors = self.drawing.floors().len(),
            "drawing loaded"
        );
    }

    /// Replace the open drawing with one decoded from a storage record.
    pub fn load_record(&mut self, record: DrawingRecord, id: Option<DrawingId>) {
        self.load_drawing(Drawing::from_record(record, id));
    }

    /// Serialize the open drawing.
    #[must_use]
    pub fn to_record(&self) -> DrawingRecord {
        self.drawing.to_record()
    }

    /// Record the storage id after a successful save.
    pub fn mark_saved(&mut self, id: DrawingId) {
        self.drawing.id = Some(id);
    }

    /// Drop the storage id so the next save creates a new record.
    pub fn forget_saved_identity(&mut self) {
        self.drawing.id = None;
    }

    /// Rename the drawing.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.drawing.name = name.into();
    }

    /// Start over: one empty floor, empty history, no saved identity.
    ///
    /// Settings are kept.
    pub fn clear_drawing(&mut self) {
        let settings = self.drawing.settings.clone();
        self.drawing = Drawing::with_settings(settings);
        self.history.clear();
        self.ui.selected_id = None;
        debug!("drawing cleared");
    }

    // --- Queries ---

    #[must_use]
    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.drawing.settings
    }

    #[must_use]
    pub fn floors(&self) -> &[Floor] {
        self.drawing.floors()
    }

    #[must_use]
    pub fn current_floor(&self) -> &Floor {
        self.drawing.current_floor()
    }

    /// Elements of the current floor, in draw order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.drawing.current_floor().elements
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool
    }

    #[must_use]
    pub fn selected_element_id(&self) -> Option<&ElementId> {
        self.ui.selected_id.as_ref()
    }

    /// The selected element on the current floor, if any.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.ui.selected_id.as_ref().and_then(|id| self.current_floor().element(id))
    }

    // --- Derived aggregates ---

    #[must_use]
    pub fn meters_per_pixel(&self) -> f64 {
        self.drawing.meters_per_pixel()
    }

    #[must_use]
    pub fn current_floor_sqm(&self) -> f64 {
        self.drawing.current_floor_sqm()
    }

    #[must_use]
    pub fn total_building_sqm(&self) -> f64 {
        self.drawing.total_building_sqm()
    }

    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.drawing.total_price()
    }

    #[must_use]
    pub fn exceeds_max_sqm(&self) -> bool {
        self.drawing.exceeds_max_sqm()
    }

    // --- Element mutations ---

    /// Append an element to the current floor and commit a snapshot.
    ///
    /// An element whose id already exists on the floor is given a fresh id.
    /// Returns the id the element was stored under.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        if self.current_floor().element(&element.id).is_some() {
            warn!(element_id = %element.id, "element id already on floor; assigning a fresh one");
            element.id = ElementId::generate();
        }
        let id = element.id.clone();
        self.drawing.current_floor_mut().elements.push(element);
        self.commit();
        id
    }

    /// Remove an element from the current floor and commit a snapshot.
    ///
    /// Returns `false` (without committing) when the id is unknown.
    pub fn remove_element(&mut self, id: &ElementId) -> bool {
        let elements = &mut self.drawing.current_floor_mut().elements;
        let before = elements.len();
        elements.retain(|el| &el.id != id);
        if elements.len() == before {
            return false;
        }
        if self.ui.selected_id.as_ref() == Some(id) {
            self.ui.selected_id = None;
        }
        self.commit();
        true
    }

    /// Merge a patch into an element on the current floor and commit a snapshot.
    ///
    /// Cached areas are not recomputed; see [`ElementPatch`]. Returns `false`
    /// (without committing) when the id is unknown.
    pub fn update_element(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        let Some(element) = self.drawing.current_floor_mut().elements.iter_mut().find(|el| &el.id == id) else {
            return false;
        };
        patch.apply_to(element);
        self.commit();
        true
    }

    // --- Tool and selection ---

    /// Change the active tool. Any tool other than `Select` clears the selection.
    pub fn set_tool(&mut self, tool: Tool) {
        self.ui.tool = tool;
        if tool != Tool::Select {
            self.ui.selected_id = None;
        }
    }

    /// Select an element on the current floor. Unknown ids are ignored.
    pub fn select_element(&mut self, id: &ElementId) -> bool {
        if self.current_floor().element(id).is_none() {
            return false;
        }
        self.ui.selected_id = Some(id.clone());
        true
    }

    pub fn clear_selection(&mut self) {
        self.ui.selected_id = None;
    }

    // --- Settings ---

    /// Merge a settings patch. A change of scale recalculates every area.
    pub fn update_settings(&mut self, patch: &SettingsPatch) {
        if self.drawing.settings.apply(patch) {
            self.recalculate_all_areas();
        }
    }

    /// Refresh every cached polygon area from the current scale.
    ///
    /// This is a derived-state correction and does not commit a snapshot.
    pub fn recalculate_all_areas(&mut self) {
        self.drawing.recalculate_all_areas();
    }

    // --- Viewport ---

    /// Set the zoom factor, clamped to `[0.1, 5]`.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.camera.set_zoom(zoom);
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.camera.set_pan(x, y);
    }

    // --- Background image ---

    /// Replace the background image. Opacity is clamped to `[0, 1]`.
    pub fn set_background_image(&mut self, mut image: BackgroundImage) {
        if image.opacity.is_nan() {
            image.opacity = BackgroundImage::default().opacity;
        }
        image.opacity = image.opacity.clamp(0.0, 1.0);
        self.drawing.background = image;
    }

    pub fn update_background_image(&mut self, patch: &BackgroundPatch) {
        patch.apply_to(&mut self.drawing.background);
    }

    pub fn clear_background_image(&mut self) {
        self.drawing.background = BackgroundImage::default();
    }

    // --- Floors ---

    /// Add an empty floor and switch to it. History starts empty.
    pub fn add_floor(&mut self) -> FloorId {
        let id = self.drawing.add_floor();
        self.ui.selected_id = None;
        self.history.clear();
        id
    }

    /// Duplicate a floor and switch to the copy. History is seeded with the copy.
    pub fn duplicate_floor(&mut self, id: &FloorId) -> Option<FloorId> {
        let copy = self.drawing.duplicate_floor(id)?;
        self.ui.selected_id = None;
        self.reseed_history();
        Some(copy)
    }

    /// Delete a floor. The last floor is never deleted.
    ///
    /// Deleting the current floor switches to the first floor and reseeds history.
    pub fn delete_floor(&mut self, id: &FloorId) -> bool {
        let was_current = self.drawing.current_floor_id() == id;
        if !self.drawing.delete_floor(id) {
            return false;
        }
        if was_current {
            self.ui.selected_id = None;
            self.reseed_history();
        }
        true
    }

    /// Switch the current floor. Selection is cleared and history reseeded.
    pub fn set_current_floor(&mut self, id: &FloorId) -> bool {
        if !self.drawing.set_current_floor(id) {
            return false;
        }
        self.ui.selected_id = None;
        self.reseed_history();
        true
    }

    pub fn rename_floor(&mut self, id: &FloorId, name: impl Into<String>) -> bool {
        self.drawing.rename_floor(id, name)
    }

    // --- History ---

    /// Restore the previous snapshot of the current floor.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    /// Re-apply the next snapshot of the current floor.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn commit(&mut self) {
        self.history.commit(&self.drawing.current_floor().elements);
    }

    fn reseed_history(&mut self) {
        self.history.reseed(&self.drawing.current_floor().elements);
    }

    fn restore(&mut self, snapshot: Vec<Element>) {
        self.drawing.current_floor_mut().elements = snapshot;
        let stale = self.ui.selected_id.as_ref().is_some_and(|id| self.current_floor().element(id).is_none());
        if stale {
            self.ui.selected_id = None;
        }
    }
}
