//! The render frame: what a view draws over the image, and what the export
//! compositor rasterizes once the editor-only chrome is stripped.

use serde::Serialize;

use crate::editor::ToolState;
use crate::geometry::{PercentRect, Viewport};
use crate::models::{Color, ElementId};
use crate::scene::{ClassSummary, Scene};

/// Extra styling applied to an element under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    None,
    /// Hovered with the view tool
    Hover,
    /// Hovered with the remove tool; a click would delete it
    RemoveTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayItem {
    pub id: ElementId,
    pub class_label: String,
    pub confidence: f32,
    pub color: Color,
    /// Stacking position; higher is drawn later
    pub z_index: usize,
    /// Insertion position, used to stagger entrance animations
    pub stagger_index: usize,
    pub rect: PercentRect,
    pub emphasis: Emphasis,
}

impl OverlayItem {
    /// Colour to draw with, taking emphasis into account
    pub fn display_color(&self) -> Color {
        match self.emphasis {
            Emphasis::None => self.color,
            Emphasis::Hover => self.color.lighten(0.3),
            Emphasis::RemoveTarget => REMOVE_TARGET_COLOR,
        }
    }

    pub fn label_text(&self) -> String {
        format!("{} {:.2}", self.class_label, self.confidence)
    }
}

pub const REMOVE_TARGET_COLOR: Color = Color::new(239, 68, 68);

/// Editor-only decorations, never exported
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChromeItem {
    DragPreview { rect: PercentRect, color: Color },
    Tooltip { id: ElementId, text: String, anchor: PercentRect },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub class_label: String,
    pub color: Color,
    pub count: usize,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    /// Visible, placeable elements in stacking order
    pub items: Vec<OverlayItem>,
    pub chrome: Vec<ChromeItem>,
    /// Every class in the scene, hidden ones included, so they can be toggled back
    pub legend: Vec<LegendEntry>,
    pub summary: Vec<ClassSummary>,
}

impl RenderFrame {
    pub fn build(
        scene: &Scene,
        tool: &ToolState,
        hovered: Option<&ElementId>,
        selected_class: &str,
        viewport: Viewport,
        palette: &[Color],
    ) -> Self {
        let layers = scene.layers(palette);
        let meta = scene.image_meta();
        let elements = scene.elements();

        let mut items = Vec::new();
        let mut chrome = Vec::new();

        for (z_index, &idx) in layers.order().iter().enumerate() {
            let element = &elements[idx];
            if !scene.is_visible(&element.class_label) {
                continue;
            }
            // Elements that cannot be placed are skipped, not fatal
            let Some(rect) = element.bbox.to_percent(meta) else {
                continue;
            };
            let color = layers
                .color_of(&element.class_label)
                .unwrap_or(crate::config::DEFAULT_PALETTE[0]);

            let is_hovered = hovered == Some(&element.id);
            let emphasis = match tool {
                ToolState::View if is_hovered => Emphasis::Hover,
                ToolState::Remove if is_hovered => Emphasis::RemoveTarget,
                _ => Emphasis::None,
            };

            let item = OverlayItem {
                id: element.id.clone(),
                class_label: element.class_label.clone(),
                confidence: element.confidence,
                color,
                z_index,
                stagger_index: idx,
                rect,
                emphasis,
            };
            if emphasis == Emphasis::Hover {
                chrome.push(ChromeItem::Tooltip {
                    id: item.id.clone(),
                    text: format!("{} ({:.0}%)", item.class_label, item.confidence * 100.0),
                    anchor: rect,
                });
            }
            items.push(item);
        }

        if let ToolState::Add { drag: Some(drag) } = tool {
            let r = drag.rect();
            chrome.push(ChromeItem::DragPreview {
                rect: PercentRect {
                    left: r.x / viewport.width * 100.0,
                    top: r.y / viewport.height * 100.0,
                    width: r.width / viewport.width * 100.0,
                    height: r.height / viewport.height * 100.0,
                },
                color: layers
                    .color_of(selected_class)
                    .unwrap_or(crate::config::DEFAULT_PALETTE[0]),
            });
        }

        let legend = layers
            .legend()
            .iter()
            .map(|(label, color)| LegendEntry {
                class_label: label.clone(),
                color: *color,
                count: elements.iter().filter(|e| &e.class_label == label).count(),
                hidden: !scene.is_visible(label),
            })
            .collect();

        Self {
            items,
            chrome,
            legend,
            summary: scene.summarize(),
        }
    }

    /// The frame as exported: chrome dropped, emphasis cleared
    pub fn without_chrome(&self) -> Self {
        let items = self
            .items
            .iter()
            .cloned()
            .map(|mut item| {
                item.emphasis = Emphasis::None;
                item
            })
            .collect();
        Self {
            items,
            chrome: Vec::new(),
            legend: self.legend.clone(),
            summary: self.summary.clone(),
        }
    }

    pub fn item(&self, id: &ElementId) -> Option<&OverlayItem> {
        self.items.iter().find(|item| &item.id == id)
    }
}
