//! Editor tool and selection state.
//!
//! Pointer gestures are handled by the host; this module only tracks which
//! tool is active and which element (if any) is selected.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::doc::ElementId;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Pick and edit existing elements.
    Select,
    /// Draw wall segments (default).
    #[default]
    Line,
    /// Place a door.
    Door,
    /// Place a window.
    Window,
    /// Outline a room polygon.
    Room,
}

impl Tool {
    /// Whether this tool creates new elements.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        !matches!(self, Self::Select)
    }
}

/// Persistent UI state visible to the host.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// The id of the currently selected element, if any.
    pub selected_id: Option<ElementId>,
}
