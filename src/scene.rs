use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::debug;
use serde::Serialize;

use crate::config::DEFAULT_MIN_BOX_SIZE;
use crate::geometry::{BoxEncoding, DisplayRect, StoredBox, Viewport};
use crate::layers::{LayerAssignment, render_order};
use crate::models::{Color, Detection, ElementId, ImageMeta, Origin};

/// The editable set of elements for one image
#[derive(Debug, Clone)]
pub struct Scene {
    elements: Vec<Detection>,
    hidden_classes: BTreeSet<String>,
    encoding: BoxEncoding,
    image: Option<ImageMeta>,
    min_box_size: f32,
}

/// Per-class entry of [`Scene::summarize`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSummary {
    pub class_label: String,
    pub count: usize,
    /// Position of the class's first element in render order
    pub first_render_index: usize,
}

impl Scene {
    pub fn new(encoding: BoxEncoding, image: Option<ImageMeta>) -> Self {
        Self {
            elements: Vec::new(),
            hidden_classes: BTreeSet::new(),
            encoding,
            image,
            min_box_size: DEFAULT_MIN_BOX_SIZE,
        }
    }

    /// Seed a scene with model output.
    ///
    /// Elements whose encoding differs from the scene's are dropped, and
    /// colliding ids are replaced with index-derived ones.
    pub fn with_elements(
        encoding: BoxEncoding,
        image: Option<ImageMeta>,
        elements: Vec<Detection>,
    ) -> Self {
        let mut scene = Self::new(encoding, image);
        let mut seen = HashSet::new();
        for (index, mut element) in elements.into_iter().enumerate() {
            if element.bbox.encoding() != encoding {
                debug!("Dropping element {} with foreign encoding", element.id);
                continue;
            }
            if !seen.insert(element.id.clone()) {
                let mut replacement = ElementId::from_index(index);
                let mut suffix = 1;
                while seen.contains(&replacement) {
                    replacement = ElementId::from(format!("det-{}-{}", index, suffix));
                    suffix += 1;
                }
                debug!("Duplicate id {} re-derived as {}", element.id, replacement);
                seen.insert(replacement.clone());
                element.id = replacement;
            }
            scene.elements.push(element);
        }
        scene
    }

    pub fn with_min_box_size(mut self, min_box_size: f32) -> Self {
        self.min_box_size = min_box_size;
        self
    }

    pub fn elements(&self) -> &[Detection] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: &ElementId) -> Option<&Detection> {
        self.elements.iter().find(|e| &e.id == id)
    }

    pub fn encoding(&self) -> BoxEncoding {
        self.encoding
    }

    pub fn image_meta(&self) -> Option<ImageMeta> {
        self.image
    }

    pub fn min_box_size(&self) -> f32 {
        self.min_box_size
    }

    pub fn hidden_classes(&self) -> &BTreeSet<String> {
        &self.hidden_classes
    }

    pub fn is_visible(&self, class_label: &str) -> bool {
        !self.hidden_classes.contains(class_label)
    }

    /// Add a hand-drawn element from a rectangle on the rendered image.
    ///
    /// Returns `None` without touching the scene when the rectangle is below the
    /// minimum size, or when it cannot be expressed in the scene's encoding.
    pub fn add_element(
        &mut self,
        class_label: &str,
        rect: DisplayRect,
        viewport: Viewport,
    ) -> Option<ElementId> {
        if !rect.meets_minimum(self.min_box_size) {
            debug!(
                "Discarding {:.1}x{:.1} box, below minimum {}",
                rect.width, rect.height, self.min_box_size
            );
            return None;
        }
        let bbox = StoredBox::from_display(rect, viewport, self.encoding, self.image)?;
        let element = Detection::manual(class_label, bbox);
        let id = element.id.clone();
        debug!("Added {} '{}'", id, class_label);
        self.elements.push(element);
        Some(id)
    }

    /// Returns whether an element was removed
    pub fn remove_element(&mut self, id: &ElementId) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| &e.id != id);
        let removed = self.elements.len() != before;
        if removed {
            debug!("Removed {}", id);
        }
        removed
    }

    /// Flip a class's visibility. Returns true when the class is now hidden.
    ///
    /// A class with no elements that is not already hidden is left alone.
    pub fn toggle_class_visibility(&mut self, class_label: &str) -> bool {
        if self.hidden_classes.remove(class_label) {
            false
        } else if !self.elements.iter().any(|e| e.class_label == class_label) {
            debug!("Ignoring toggle of unknown class '{}'", class_label);
            false
        } else {
            self.hidden_classes.insert(class_label.to_string());
            true
        }
    }

    pub fn layers(&self, palette: &[Color]) -> LayerAssignment {
        LayerAssignment::compute(&self.elements, palette)
    }

    /// Count per visible class, ordered by first appearance in render order
    pub fn summarize(&self) -> Vec<ClassSummary> {
        let mut summaries: Vec<ClassSummary> = Vec::new();
        for (position, idx) in render_order(&self.elements).into_iter().enumerate() {
            let label = &self.elements[idx].class_label;
            if !self.is_visible(label) {
                continue;
            }
            match summaries.iter_mut().find(|s| &s.class_label == label) {
                Some(summary) => summary.count += 1,
                None => summaries.push(ClassSummary {
                    class_label: label.clone(),
                    count: 1,
                    first_render_index: position,
                }),
            }
        }
        summaries
    }

    /// JSON-friendly summary of the visible elements
    pub fn report(&self) -> DetectionReport {
        let mut class_summary = BTreeMap::new();
        let mut detections = Vec::new();

        for element in self.elements.iter().filter(|e| self.is_visible(&e.class_label)) {
            *class_summary.entry(element.class_label.clone()).or_insert(0) += 1;
            let bbox = element.bbox.to_pixels(self.image).map(|p| {
                [p.x.round(), p.y.round(), p.width.round(), p.height.round()]
            });
            detections.push(ReportEntry {
                id: element.id.clone(),
                class_label: element.class_label.clone(),
                bbox,
                confidence: (element.confidence * 100.0).round() / 100.0,
                source: element.origin,
            });
        }

        DetectionReport {
            total_detections: detections.len(),
            classes_found: class_summary.len(),
            class_summary,
            detections,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub total_detections: usize,
    pub classes_found: usize,
    pub class_summary: BTreeMap<String, usize>,
    pub detections: Vec<ReportEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub id: ElementId,
    #[serde(rename = "class")]
    pub class_label: String,
    /// `[x_min, y_min, width, height]` in source pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f32; 4]>,
    pub confidence: f32,
    pub source: Origin,
}

impl DetectionReport {
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
