#![allow(clippy::float_cmp)]

use super::*;
use crate::consts::HISTORY_LIMIT;
use crate::doc::{ElementKind, Room};
use crate::geometry::compute_area;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

// =============================================================
// Helpers
// =============================================================

/// `side` x `side` px square at the origin.
fn square(side: f64) -> Vec<f64> {
    vec![0.0, 0.0, side, 0.0, side, side, 0.0, side]
}

fn room(store: &DrawingStore, side: f64) -> Element {
    Element::room(square(side), store.meters_per_pixel())
}

/// Store whose history has been seeded, as after opening a drawing.
fn opened_store() -> DrawingStore {
    DrawingStore::with_drawing(Drawing::new())
}

fn element_ids(store: &DrawingStore) -> Vec<ElementId> {
    store.elements().iter().map(|e| e.id.clone()).collect()
}

fn assert_areas_consistent(store: &DrawingStore) {
    let mpp = store.meters_per_pixel();
    for floor in store.floors() {
        for el in &floor.elements {
            if let Some(area) = el.area() {
                assert!(approx_eq(area, compute_area(&el.points, mpp)), "stale area on {}", el.id);
            }
        }
    }
}

// =============================================================
// Fresh store
// =============================================================

#[test]
fn new_store_has_one_floor_and_empty_history() {
    let store = DrawingStore::new();
    assert_eq!(store.floors().len(), 1);
    assert!(store.history().is_empty());
    assert!(!store.can_undo());
    assert!(!store.can_redo());
}

#[test]
fn undo_on_empty_history_is_noop() {
    let mut store = DrawingStore::new();
    assert!(!store.undo());
    assert!(!store.redo());
    assert!(store.elements().is_empty());
}

// =============================================================
// Add / undo / redo
// =============================================================

#[test]
fn add_then_undo_restores_previous_elements() {
    let mut store = opened_store();
    let before = store.elements().to_vec();
    store.add_element(Element::wall(vec![0.0, 0.0, 40.0, 0.0]));
    let after = store.elements().to_vec();

    assert!(store.can_undo());
    assert!(store.undo());
    assert_eq!(store.elements(), before.as_slice());

    assert!(store.can_redo());
    assert!(store.redo());
    assert_eq!(store.elements(), after.as_slice());
}

#[test]
fn first_add_on_fresh_store_is_not_undoable() {
    let mut store = DrawingStore::new();
    store.add_element(Element::wall(Vec::new()));
    assert!(!store.can_undo());
    assert!(!store.undo());
    assert_eq!(store.elements().len(), 1);
}

#[test]
fn add_element_with_duplicate_id_gets_fresh_id() {
    let mut store = opened_store();
    let first = store.add_element(Element::wall(Vec::new()));
    let mut dup = Element::door(Vec::new());
    dup.id = first.clone();
    let second = store.add_element(dup);
    assert_ne!(first, second);
    assert_eq!(store.elements().len(), 2);
}

#[test]
fn new_edit_after_undo_discards_redo() {
    let mut store = opened_store();
    store.add_element(Element::wall(Vec::new()));
    store.add_element(Element::door(Vec::new()));
    store.undo();
    assert!(store.can_redo());
    store.add_element(Element::window(Vec::new()));
    assert!(!store.can_redo());
    let kinds: Vec<&str> = store.elements().iter().map(Element::type_name).collect();
    assert_eq!(kinds, vec!["line", "window"]);
}

#[test]
fn undo_restores_independent_copy() {
    let mut store = opened_store();
    let id = store.add_element(room(&store, 10.0));
    store.update_element(&id, &ElementPatch { points: Some(square(20.0)), ..Default::default() });
    store.undo();
    assert_eq!(store.elements()[0].points, square(10.0));
    store.redo();
    assert_eq!(store.elements()[0].points, square(20.0));
    store.undo();
    assert_eq!(store.elements()[0].points, square(10.0));
}

#[test]
fn history_is_capped_at_limit() {
    let mut store = opened_store();
    for _ in 0..(HISTORY_LIMIT + 10) {
        store.add_element(Element::wall(Vec::new()));
    }
    assert_eq!(store.history().len(), HISTORY_LIMIT);
    assert!(store.can_undo());
    assert!(!store.can_redo());

    let mut undone = 0;
    while store.undo() {
        undone += 1;
    }
    assert_eq!(undone, HISTORY_LIMIT - 1);
    // Oldest surviving snapshot holds 11 walls.
    assert_eq!(store.elements().len(), 11);
    assert!(store.can_redo());
}

// =============================================================
// Remove / update
// =============================================================

#[test]
fn remove_element_commits_snapshot() {
    let mut store = opened_store();
    let id = store.add_element(Element::wall(Vec::new()));
    assert!(store.remove_element(&id));
    assert!(store.elements().is_empty());
    store.undo();
    assert_eq!(element_ids(&store), vec![id]);
}

#[test]
fn remove_unknown_element_is_noop() {
    let mut store = opened_store();
    store.add_element(Element::wall(Vec::new()));
    let len = store.history().len();
    assert!(!store.remove_element(&ElementId::from("missing")));
    assert_eq!(store.history().len(), len);
}

#[test]
fn remove_selected_element_clears_selection() {
    let mut store = opened_store();
    store.set_tool(Tool::Select);
    let id = store.add_element(Element::wall(Vec::new()));
    store.select_element(&id);
    store.remove_element(&id);
    assert!(store.selected_element_id().is_none());
}

#[test]
fn update_element_merges_and_commits() {
    let mut store = opened_store();
    let id = store.add_element(Element::door(Vec::new()));
    assert!(store.update_element(&id, &ElementPatch { rotation: Some(90.0), ..Default::default() }));
    assert_eq!(store.history().len(), 3);
    store.undo();
    assert_eq!(store.elements()[0].kind, ElementKind::Door(crate::doc::Opening::default()));
}

#[test]
fn update_unknown_element_is_noop() {
    let mut store = opened_store();
    let len = store.history().len();
    assert!(!store.update_element(&ElementId::from("nope"), &ElementPatch::default()));
    assert_eq!(store.history().len(), len);
}

#[test]
fn update_points_does_not_recompute_area() {
    let mut store = opened_store();
    let id = store.add_element(room(&store, 20.0));
    let area = store.elements()[0].area();
    store.update_element(&id, &ElementPatch { points: Some(square(40.0)), ..Default::default() });
    assert_eq!(store.elements()[0].area(), area);
}

// =============================================================
// Tool and selection
// =============================================================

#[test]
fn select_known_element() {
    let mut store = opened_store();
    store.set_tool(Tool::Select);
    let id = store.add_element(Element::wall(Vec::new()));
    assert!(store.select_element(&id));
    assert_eq!(store.selected_element().map(|e| &e.id), Some(&id));
}

#[test]
fn select_unknown_element_is_ignored() {
    let mut store = opened_store();
    assert!(!store.select_element(&ElementId::from("ghost")));
    assert!(store.selected_element_id().is_none());
}

#[test]
fn selection_does_not_touch_history() {
    let mut store = opened_store();
    let id = store.add_element(Element::wall(Vec::new()));
    let len = store.history().len();
    store.select_element(&id);
    store.clear_selection();
    assert_eq!(store.history().len(), len);
}

#[test]
fn drawing_tool_clears_selection() {
    let mut store = opened_store();
    store.set_tool(Tool::Select);
    let id = store.add_element(Element::wall(Vec::new()));
    store.select_element(&id);
    store.set_tool(Tool::Room);
    assert!(store.selected_element_id().is_none());
    assert_eq!(store.tool(), Tool::Room);
}

#[test]
fn select_tool_keeps_selection() {
    let mut store = opened_store();
    let id = store.add_element(Element::wall(Vec::new()));
    store.select_element(&id);
    store.set_tool(Tool::Select);
    assert_eq!(store.selected_element_id(), Some(&id));
}

#[test]
fn undo_removing_selected_element_clears_selection() {
    let mut store = opened_store();
    let id = store.add_element(Element::wall(Vec::new()));
    store.select_element(&id);
    store.undo();
    assert!(store.selected_element_id().is_none());
}

// =============================================================
// Settings and areas
// =============================================================

#[test]
fn grid_unit_change_recomputes_areas_on_every_floor() {
    let mut store = opened_store();
    store.add_element(room(&store, 40.0));
    store.add_element(Element::wall(square(40.0)));
    store.add_floor();
    store.add_element(room(&store, 100.0));

    store.update_settings(&SettingsPatch { grid_unit: Some(2.0), ..Default::default() });

    assert_areas_consistent(&store);
    // 40 px and 100 px squares at 2/20 m/px.
    assert!(approx_eq(store.total_building_sqm(), 16.0 + 100.0));
}

#[test]
fn grid_size_change_also_recomputes_areas() {
    let mut store = opened_store();
    store.add_element(room(&store, 40.0));
    store.update_settings(&SettingsPatch { grid_size: Some(40.0), ..Default::default() });
    assert_areas_consistent(&store);
    assert!(approx_eq(store.current_floor_sqm(), 1.0));
}

#[test]
fn unrelated_setting_leaves_areas_alone() {
    let mut store = opened_store();
    store.add_element(Element::new(ElementKind::Polygon(Room { area: 99.0, label: None }), square(10.0)));
    store.update_settings(&SettingsPatch { price_per_sqm: Some(1.0), ..Default::default() });
    assert_eq!(store.elements()[0].area(), Some(99.0));
    assert_eq!(store.total_price(), 99.0);
}

#[test]
fn scale_change_is_not_an_undo_step() {
    let mut store = opened_store();
    store.add_element(room(&store, 40.0));
    let len = store.history().len();
    store.update_settings(&SettingsPatch { grid_unit: Some(3.0), ..Default::default() });
    assert_eq!(store.history().len(), len);

    // Undo lands on the snapshot taken before the scale change, stale area included.
    assert_eq!(store.history().len(), 2);
    store.add_element(Element::wall(Vec::new()));
    store.undo();
    // 40 px square at the original 1/20 m/px.
    assert!(approx_eq(store.elements()[0].area().unwrap_or_default(), 4.0));
    store.recalculate_all_areas();
    assert_areas_consistent(&store);
}

#[test]
fn exceeds_max_sqm_tracks_budget() {
    let mut store = opened_store();
    // 300 px square at 1/20 m/px = 225 m², over the 200 m² default.
    store.add_element(room(&store, 300.0));
    assert!(store.exceeds_max_sqm());
    store.update_settings(&SettingsPatch { max_sqm: Some(300.0), ..Default::default() });
    assert!(!store.exceeds_max_sqm());
}

#[test]
fn total_building_equals_sum_of_floor_areas() {
    let mut store = opened_store();
    store.add_element(room(&store, 20.0));
    store.add_floor();
    store.add_element(room(&store, 60.0));
    store.add_element(room(&store, 80.0));
    let sum: f64 = store
        .floors()
        .iter()
        .map(|f| store.drawing().floor_sqm(&f.id).unwrap_or_default())
        .sum();
    assert!(approx_eq(store.total_building_sqm(), sum));
}

// =============================================================
// Viewport
// =============================================================

#[test]
fn zoom_is_clamped() {
    let mut store = DrawingStore::new();
    store.set_zoom(0.0);
    assert_eq!(store.camera().zoom(), 0.1);
    store.set_zoom(10.0);
    assert_eq!(store.camera().zoom(), 5.0);
}

#[test]
fn pan_is_stored() {
    let mut store = DrawingStore::new();
    store.set_pan(-300.0, 42.0);
    assert_eq!(store.camera().pan_x, -300.0);
    assert_eq!(store.camera().pan_y, 42.0);
}

// =============================================================
// Floors
// =============================================================

#[test]
fn add_floor_starts_with_empty_history() {
    let mut store = opened_store();
    store.add_element(Element::wall(Vec::new()));
    store.add_floor();
    assert_eq!(store.history().index(), None);
    assert!(!store.can_undo());
    assert!(store.elements().is_empty());
    assert_eq!(store.current_floor().name, "Floor 2");
}

#[test]
fn duplicate_floor_seeds_history() {
    let mut store = opened_store();
    store.add_element(Element::wall(Vec::new()));
    let source = store.current_floor().id.clone();
    let copy = store.duplicate_floor(&source).unwrap();
    assert_eq!(store.current_floor().id, copy);
    assert_eq!(store.history().len(), 1);
    assert_eq!(store.history().index(), Some(0));
    assert_eq!(store.elements().len(), 1);
}

#[test]
fn duplicate_unknown_floor_is_noop() {
    let mut store = opened_store();
    assert!(store.duplicate_floor(&FloorId::from("nope")).is_none());
    assert_eq!(store.floors().len(), 1);
}

#[test]
fn delete_only_floor_is_noop() {
    let mut store = opened_store();
    let id = store.current_floor().id.clone();
    assert!(!store.delete_floor(&id));
    assert_eq!(store.floors().len(), 1);
}

#[test]
fn delete_current_floor_reseeds_from_first() {
    let mut store = opened_store();
    store.add_element(Element::wall(Vec::new()));
    let first = store.current_floor().id.clone();
    let second = store.add_floor();
    store.add_element(Element::door(Vec::new()));

    assert!(store.delete_floor(&second));
    assert_eq!(store.current_floor().id, first);
    assert_eq!(store.history().len(), 1);
    assert!(!store.can_undo());
    assert_eq!(store.elements().len(), 1);
}

#[test]
fn delete_other_floor_keeps_history() {
    let mut store = opened_store();
    let first = store.current_floor().id.clone();
    store.add_floor();
    store.add_element(Element::wall(Vec::new()));
    store.add_element(Element::wall(Vec::new()));
    assert!(store.delete_floor(&first));
    assert!(store.can_undo());
}

#[test]
fn floors_never_drop_below_one() {
    let mut store = opened_store();
    for _ in 0..3 {
        store.add_floor();
    }
    let ids: Vec<FloorId> = store.floors().iter().map(|f| f.id.clone()).collect();
    for id in &ids {
        store.delete_floor(id);
    }
    assert_eq!(store.floors().len(), 1);
    assert_eq!(store.current_floor().id, store.floors()[0].id);
}

#[test]
fn switching_floors_resets_history_and_selection() {
    let mut store = opened_store();
    let first = store.current_floor().id.clone();
    let wall = store.add_element(Element::wall(Vec::new()));
    store.add_element(Element::wall(Vec::new()));
    store.select_element(&wall);

    let second = store.add_floor();
    store.add_element(Element::door(Vec::new()));

    assert!(store.set_current_floor(&first));
    assert!(store.selected_element_id().is_none());
    assert_eq!(store.history().len(), 1);
    assert!(!store.can_undo());
    assert_eq!(store.elements().len(), 2);

    // Coming back does not bring the old log back either.
    assert!(store.set_current_floor(&second));
    assert!(!store.can_undo());
}

#[test]
fn switching_to_unknown_floor_is_noop() {
    let mut store = opened_store();
    store.add_element(Element::wall(Vec::new()));
    store.add_element(Element::wall(Vec::new()));
    assert!(!store.set_current_floor(&FloorId::from("nope")));
    assert!(store.can_undo());
}

#[test]
fn rename_floor_does_not_commit() {
    let mut store = opened_store();
    let id = store.current_floor().id.clone();
    let len = store.history().len();
    assert!(store.rename_floor(&id, "Basement"));
    assert_eq!(store.current_floor().name, "Basement");
    assert_eq!(store.history().len(), len);
}

// =============================================================
// Clear and load
// =============================================================

#[test]
fn clear_drawing_resets_document() {
    let mut store = opened_store();
    store.set_name("Villa");
    store.mark_saved(uuid::Uuid::new_v4());
    store.update_settings(&SettingsPatch { price_per_sqm: Some(1.0), ..Default::default() });
    store.add_element(Element::wall(Vec::new()));
    store.add_floor();
    store.update_background_image(&BackgroundPatch { data_url: Some("data:,".into()), ..Default::default() });

    store.clear_drawing();

    assert_eq!(store.floors().len(), 1);
    assert!(store.elements().is_empty());
    assert!(store.drawing().id.is_none());
    assert!(store.drawing().name.is_empty());
    assert!(!store.drawing().background.is_set());
    assert!(store.history().is_empty());
    assert!(!store.can_undo());
    assert_eq!(store.settings().price_per_sqm, 1.0);
}

#[test]
fn load_drawing_seeds_single_snapshot() {
    let mut drawing = Drawing::new();
    drawing.current_floor_mut().elements.push(Element::wall(Vec::new()));
    let mut store = opened_store();
    store.add_element(Element::door(Vec::new()));
    store.load_drawing(drawing);
    assert_eq!(store.history().len(), 1);
    assert!(!store.can_undo());
    assert!(!store.can_redo());
    assert_eq!(store.elements().len(), 1);
}

#[test]
fn load_record_roundtrip() {
    let mut store = opened_store();
    store.add_element(room(&store, 40.0));
    store.add_floor();
    store.add_element(Element::window(vec![0.0, 0.0, 20.0, 0.0]));
    let record = store.to_record();

    let mut other = DrawingStore::new();
    other.load_record(record, None);
    assert_eq!(other.drawing(), store.drawing());
    assert!(!other.can_undo());
}

#[test]
fn forget_saved_identity_clears_id() {
    let mut store = opened_store();
    store.mark_saved(uuid::Uuid::new_v4());
    store.forget_saved_identity();
    assert!(store.drawing().id.is_none());
}

// =============================================================
// Background image
// =============================================================

#[test]
fn background_never_touches_history() {
    let mut store = opened_store();
    let len = store.history().len();
    store.set_background_image(BackgroundImage {
        data_url: Some("data:,".into()),
        width: 100.0,
        height: 50.0,
        ..BackgroundImage::default()
    });
    store.update_background_image(&BackgroundPatch { opacity: Some(0.8), ..Default::default() });
    store.clear_background_image();
    assert_eq!(store.history().len(), len);
}

#[test]
fn background_is_shared_across_floors() {
    let mut store = opened_store();
    store.update_background_image(&BackgroundPatch { data_url: Some("data:,".into()), ..Default::default() });
    store.add_floor();
    assert!(store.drawing().background.is_set());
}

#[test]
fn set_background_clamps_opacity() {
    let mut store = opened_store();
    store.set_background_image(BackgroundImage { opacity: 7.0, ..BackgroundImage::default() });
    assert_eq!(store.drawing().background.opacity, 1.0);
}

#[test]
fn clear_background_resets_record() {
    let mut store = opened_store();
    store.update_background_image(&BackgroundPatch {
        data_url: Some("data:,".into()),
        locked: Some(true),
        ..Default::default()
    });
    store.clear_background_image();
    assert_eq!(store.drawing().background, BackgroundImage::default());
}
