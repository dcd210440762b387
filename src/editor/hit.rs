//! Pointer hit testing against stored boxes, independent of any drawing surface.

use crate::geometry::{DisplayPoint, Viewport};
use crate::layers::render_order;
use crate::models::ElementId;
use crate::scene::Scene;

/// Topmost visible element whose rectangle contains `point`.
///
/// Elements drawn later (smaller ones) win over those beneath them.
pub fn hit_test(scene: &Scene, viewport: Viewport, point: DisplayPoint) -> Option<ElementId> {
    hits_at(scene, viewport, point).into_iter().next()
}

/// All visible elements under `point`, topmost first
pub fn hits_at(scene: &Scene, viewport: Viewport, point: DisplayPoint) -> Vec<ElementId> {
    let elements = scene.elements();
    let meta = scene.image_meta();
    render_order(elements)
        .into_iter()
        .rev()
        .map(|idx| &elements[idx])
        .filter(|e| scene.is_visible(&e.class_label))
        .filter(|e| {
            e.bbox
                .to_percent(meta)
                .map(|p| p.to_display(viewport).contains(point))
                .unwrap_or(false)
        })
        .map(|e| e.id.clone())
        .collect()
}
