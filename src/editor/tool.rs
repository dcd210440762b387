use serde::{Deserialize, Serialize};

use crate::geometry::{DisplayPoint, DisplayRect};
use crate::models::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    View,
    Add,
    Remove,
}

/// An in-progress rectangle drag, in display pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub start: DisplayPoint,
    pub current: DisplayPoint,
}

impl Drag {
    pub fn rect(&self) -> DisplayRect {
        DisplayRect::from_corners(self.start, self.current)
    }
}

/// Active tool together with the state only that tool can have.
///
/// A drag only exists while the add tool is active.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ToolState {
    #[default]
    View,
    Add {
        drag: Option<Drag>,
    },
    Remove,
}

impl ToolState {
    pub fn for_tool(tool: Tool) -> Self {
        match tool {
            Tool::View => ToolState::View,
            Tool::Add => ToolState::Add { drag: None },
            Tool::Remove => ToolState::Remove,
        }
    }

    pub fn tool(&self) -> Tool {
        match self {
            ToolState::View => Tool::View,
            ToolState::Add { .. } => Tool::Add,
            ToolState::Remove => Tool::Remove,
        }
    }

    pub fn drag(&self) -> Option<&Drag> {
        match self {
            ToolState::Add { drag } => drag.as_ref(),
            _ => None,
        }
    }
}

/// Pointer input in display pixels relative to the rendered image
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(DisplayPoint),
    Move(DisplayPoint),
    Up(DisplayPoint),
    /// Pointer left the image area
    Leave,
    Click(DisplayPoint),
}

/// What a pointer event did to the editor
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Ignored,
    DragStarted,
    DragUpdated,
    Added(ElementId),
    /// Drag finished below the minimum size; nothing was created
    Discarded,
    DragCancelled,
    Removed(ElementId),
}

impl EventOutcome {
    /// Whether the event was consumed by an element and must not reach anything beneath it
    pub fn stops_propagation(&self) -> bool {
        matches!(self, EventOutcome::Removed(_))
    }
}
