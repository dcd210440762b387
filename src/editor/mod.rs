//! Interactive editing: tool selection, drag-to-add, click-to-remove, hover.
//!
//! Every mutation is a synchronous `&mut self` call, so a drag transaction
//! (`down -> move* -> up`) cannot interleave with any other scene change.

pub mod hit;
pub mod script;
mod tool;

use log::{debug, info};

use crate::config::EditorConfig;
use crate::export::source::SourceImage;
use crate::geometry::{DisplayPoint, Viewport};
use crate::models::ElementId;
use crate::render::RenderFrame;
use crate::scene::Scene;

pub use tool::{Drag, EventOutcome, PointerEvent, Tool, ToolState};

/// Class assigned to drawn boxes until the user picks one
pub const FALLBACK_ADD_CLASS: &str = "door";

/// Editing session for one image: the scene plus everything the view needs
#[derive(Debug)]
pub struct Editor {
    scene: Scene,
    source: SourceImage,
    tool: ToolState,
    selected_class: String,
    hovered: Option<ElementId>,
    viewport: Viewport,
    config: EditorConfig,
}

impl Editor {
    /// The scene's minimum drag size is taken from `config`
    pub fn new(scene: Scene, source: SourceImage, viewport: Viewport, config: EditorConfig) -> Self {
        let scene = scene.with_min_box_size(config.min_box_size);
        let selected_class = scene
            .layers(&config.palette)
            .legend()
            .first()
            .map(|(label, _)| label.clone())
            .unwrap_or_else(|| FALLBACK_ADD_CLASS.to_string());
        Self {
            scene,
            source,
            tool: ToolState::default(),
            selected_class,
            hovered: None,
            viewport,
            config,
        }
    }

    /// Replace the scene and image, e.g. when a new image is loaded.
    /// Tool and class selection survive; transient pointer state does not.
    pub fn load(&mut self, scene: Scene, source: SourceImage) {
        info!("Loading new scene with {} elements", scene.len());
        self.scene = scene.with_min_box_size(self.config.min_box_size);
        self.source = source;
        self.hovered = None;
        self.tool = ToolState::for_tool(self.tool.tool());
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tool_state(&self) -> &ToolState {
        &self.tool
    }

    pub fn tool(&self) -> Tool {
        self.tool.tool()
    }

    pub fn selected_class(&self) -> &str {
        &self.selected_class
    }

    pub fn hovered(&self) -> Option<&ElementId> {
        self.hovered.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Switching tools abandons any drag in progress
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool.tool() != tool {
            debug!("Tool {:?} -> {:?}", self.tool.tool(), tool);
            self.tool = ToolState::for_tool(tool);
        }
    }

    pub fn set_selected_class_for_add(&mut self, class_label: impl Into<String>) {
        self.selected_class = class_label.into();
    }

    /// Resizing the rendered image invalidates drag coordinates, so the drag is cancelled
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let ToolState::Add { drag } = &mut self.tool {
            *drag = None;
        }
    }

    pub fn toggle_class_visibility(&mut self, class_label: &str) -> bool {
        let hidden = self.scene.toggle_class_visibility(class_label);
        if hidden {
            let hovered_hidden = self
                .hovered
                .as_ref()
                .and_then(|id| self.scene.get(id))
                .map(|e| e.class_label == class_label)
                .unwrap_or(false);
            if hovered_hidden {
                self.hovered = None;
            }
        }
        hidden
    }

    pub fn remove_element(&mut self, id: &ElementId) -> bool {
        let removed = self.scene.remove_element(id);
        if removed && self.hovered.as_ref() == Some(id) {
            self.hovered = None;
        }
        removed
    }

    /// Track the pointer for highlighting; `None` when it leaves the image
    pub fn hover(&mut self, point: Option<DisplayPoint>) {
        self.hovered = point.and_then(|p| hit::hit_test(&self.scene, self.viewport, p));
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> EventOutcome {
        let viewport = self.viewport;
        match &mut self.tool {
            ToolState::Add { drag } => match event {
                PointerEvent::Down(p) => {
                    if !viewport.contains(p) {
                        return EventOutcome::Ignored;
                    }
                    *drag = Some(Drag { start: p, current: p });
                    EventOutcome::DragStarted
                }
                PointerEvent::Move(p) => match drag {
                    Some(d) => {
                        d.current = viewport.clamp(p);
                        EventOutcome::DragUpdated
                    }
                    None => EventOutcome::Ignored,
                },
                PointerEvent::Up(p) => {
                    let Some(mut finished) = drag.take() else {
                        return EventOutcome::Ignored;
                    };
                    finished.current = viewport.clamp(p);
                    match self
                        .scene
                        .add_element(&self.selected_class, finished.rect(), viewport)
                    {
                        Some(id) => EventOutcome::Added(id),
                        None => EventOutcome::Discarded,
                    }
                }
                PointerEvent::Leave => match drag.take() {
                    Some(_) => {
                        debug!("Drag cancelled: pointer left the image");
                        EventOutcome::DragCancelled
                    }
                    None => EventOutcome::Ignored,
                },
                PointerEvent::Click(_) => EventOutcome::Ignored,
            },
            ToolState::Remove => match event {
                PointerEvent::Click(p) => match hit::hit_test(&self.scene, viewport, p) {
                    Some(id) => {
                        self.scene.remove_element(&id);
                        if self.hovered.as_ref() == Some(&id) {
                            self.hovered = None;
                        }
                        EventOutcome::Removed(id)
                    }
                    None => EventOutcome::Ignored,
                },
                _ => EventOutcome::Ignored,
            },
            ToolState::View => EventOutcome::Ignored,
        }
    }

    /// Current render output, chrome included
    pub fn frame(&self) -> RenderFrame {
        RenderFrame::build(
            &self.scene,
            &self.tool,
            self.hovered.as_ref(),
            &self.selected_class,
            self.viewport,
            &self.config.palette,
        )
    }
}
