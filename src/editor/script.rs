//! Replayable edit scripts: a JSON list of editor commands applied in order.
//!
//! ```json
//! [
//!   { "op": "tool", "tool": "add" },
//!   { "op": "select_class", "class": "window" },
//!   { "op": "down", "x": 10, "y": 10 },
//!   { "op": "move", "x": 40, "y": 30 },
//!   { "op": "up", "x": 40, "y": 30 },
//!   { "op": "toggle", "class": "door" }
//! ]
//! ```
use std::path::Path;

use anyhow::Context;
use log::{debug, warn};
use serde::Deserialize;

use super::{Editor, EventOutcome, PointerEvent, Tool};
use crate::geometry::{DisplayPoint, Viewport};
use crate::models::ElementId;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    Tool { tool: Tool },
    SelectClass {
        #[serde(rename = "class")]
        class_label: String,
    },
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { x: f32, y: f32 },
    Leave,
    Click { x: f32, y: f32 },
    Hover { x: f32, y: f32 },
    Unhover,
    Toggle {
        #[serde(rename = "class")]
        class_label: String,
    },
    Remove { id: ElementId },
    Viewport { width: f32, height: f32 },
}

/// Tally of what a replay changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub added: Vec<ElementId>,
    pub removed: Vec<ElementId>,
    pub discarded: usize,
    pub cancelled: usize,
    pub toggled: usize,
}

#[derive(Debug, Clone, Default)]
pub struct EditScript {
    pub commands: Vec<EditCommand>,
}

impl EditScript {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read edit script {:?}", path))?;
        Self::from_json(&content).with_context(|| format!("Invalid edit script {:?}", path))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let commands: Vec<EditCommand> = serde_json::from_str(content)?;
        Ok(Self { commands })
    }

    pub fn apply(&self, editor: &mut Editor) -> ScriptSummary {
        let mut summary = ScriptSummary::default();
        for (i, command) in self.commands.iter().enumerate() {
            debug!("Edit {}: {:?}", i, command);
            let outcome = match command {
                EditCommand::Tool { tool } => {
                    editor.set_tool(*tool);
                    None
                }
                EditCommand::SelectClass { class_label } => {
                    editor.set_selected_class_for_add(class_label.clone());
                    None
                }
                EditCommand::Down { x, y } => {
                    Some(editor.handle_pointer(PointerEvent::Down(DisplayPoint::new(*x, *y))))
                }
                EditCommand::Move { x, y } => {
                    Some(editor.handle_pointer(PointerEvent::Move(DisplayPoint::new(*x, *y))))
                }
                EditCommand::Up { x, y } => {
                    Some(editor.handle_pointer(PointerEvent::Up(DisplayPoint::new(*x, *y))))
                }
                EditCommand::Leave => Some(editor.handle_pointer(PointerEvent::Leave)),
                EditCommand::Click { x, y } => {
                    Some(editor.handle_pointer(PointerEvent::Click(DisplayPoint::new(*x, *y))))
                }
                EditCommand::Hover { x, y } => {
                    editor.hover(Some(DisplayPoint::new(*x, *y)));
                    None
                }
                EditCommand::Unhover => {
                    editor.hover(None);
                    None
                }
                EditCommand::Toggle { class_label } => {
                    editor.toggle_class_visibility(class_label);
                    summary.toggled += 1;
                    None
                }
                EditCommand::Remove { id } => {
                    if editor.remove_element(id) {
                        summary.removed.push(id.clone());
                    }
                    None
                }
                EditCommand::Viewport { width, height } => {
                    match Viewport::new(*width, *height) {
                        Some(viewport) => editor.set_viewport(viewport),
                        None => warn!("Edit {}: ignoring invalid viewport {}x{}", i, width, height),
                    }
                    None
                }
            };

            match outcome {
                Some(EventOutcome::Added(id)) => summary.added.push(id),
                Some(EventOutcome::Removed(id)) => summary.removed.push(id),
                Some(EventOutcome::Discarded) => summary.discarded += 1,
                Some(EventOutcome::DragCancelled) => summary.cancelled += 1,
                _ => {}
            }
        }
        summary
    }
}
