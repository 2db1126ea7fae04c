//! Drawing state engine for the floor-plan editor.
//!
//! This crate owns everything the editor knows about a drawing: the
//! multi-floor document, per-floor undo/redo, polygon-area geometry, and the
//! settings that turn pixels into square meters and square meters into a price.
//! Rendering and pointer handling live in the host; persistence lives in the
//! `drawings` crate, which stores the [`record::DrawingRecord`] produced here.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | [`store::DrawingStore`], the mutation API with undo/redo |
//! | [`doc`] | Elements, floors, background image, and the [`doc::Drawing`] registry |
//! | [`history`] | Per-floor snapshot log |
//! | [`geometry`] | Shoelace area, grid snapping, lengths |
//! | [`settings`] | Grid scale, budget and pricing settings plus their patch type |
//! | [`record`] | Storage record encoding, including legacy migration |
//! | [`camera`] | Pan/zoom state and coordinate conversions |
//! | [`input`] | Active tool and selection |
//! | [`consts`] | Shared constants (history cap, zoom limits, defaults) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod geometry;
pub mod history;
pub mod input;
pub mod record;
pub mod settings;
pub mod store;

pub use doc::{Drawing, DrawingId, Element, ElementId, ElementKind, Floor, FloorId};
pub use record::{DrawingRecord, RecordError};
pub use settings::{Settings, SettingsPatch};
pub use store::DrawingStore;
