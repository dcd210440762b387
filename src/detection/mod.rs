//! Turning the detection service's payload into a scene.

pub mod payload;

use log::{debug, info, warn};

use crate::geometry::{BoxEncoding, CenterSizeBox, CornerBox, StoredBox};
use crate::models::{Detection, ElementId, ImageMeta, Origin};
use crate::scene::Scene;

pub use payload::{PredictionPayload, RawPrediction};

/// How the scene's box encoding is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingPolicy {
    /// Lock onto the encoding of the first well-formed prediction
    #[default]
    Auto,
    Fixed(BoxEncoding),
}

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub encoding: EncodingPolicy,
    /// Predictions below this confidence are left out of the scene
    pub min_confidence: f32,
    pub min_box_size: f32,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            encoding: EncodingPolicy::Auto,
            min_confidence: 0.0,
            min_box_size: crate::config::DEFAULT_MIN_BOX_SIZE,
        }
    }
}

/// Seed a scene from a payload. Never fails: bad entries are skipped.
pub fn build_scene(payload: &PredictionPayload, options: &IngestOptions) -> Scene {
    let image = payload.image_meta();
    if image.is_none() {
        debug!("Payload carries no usable image dimensions");
    }

    // Only predictions above the confidence threshold take part in encoding selection
    let candidates: Vec<(usize, &RawPrediction, StoredBox, f32)> = payload
        .predictions
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let Some(bbox) = raw.to_box() else {
                warn!("Skipping prediction {}: no usable box", index);
                return None;
            };
            let confidence = raw.confidence.unwrap_or(1.0);
            if !confidence.is_finite() || confidence < options.min_confidence {
                debug!("Skipping prediction {}: confidence {:.2}", index, confidence);
                return None;
            }
            Some((index, raw, bbox, confidence))
        })
        .collect();

    let encoding = match options.encoding {
        EncodingPolicy::Fixed(encoding) => encoding,
        EncodingPolicy::Auto => candidates
            .first()
            .map(|(_, _, bbox, _)| bbox.encoding())
            .unwrap_or(if image.is_some() {
                BoxEncoding::CenterSize
            } else {
                BoxEncoding::Corner
            }),
    };

    let mut elements = Vec::new();
    for (index, raw, bbox, confidence) in candidates {
        if bbox.encoding() != encoding {
            warn!(
                "Skipping prediction {}: encoded as {:?}, scene uses {:?}",
                index,
                bbox.encoding(),
                encoding
            );
            continue;
        }
        let id = raw
            .detection_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(ElementId::from)
            .unwrap_or_else(|| ElementId::from_index(index));
        elements.push(Detection {
            id,
            class_label: raw.class_label.clone(),
            bbox,
            confidence: confidence.clamp(0.0, 1.0),
            origin: Origin::Model,
        });
    }

    info!(
        "Scene seeded with {} of {} predictions ({:?})",
        elements.len(),
        payload.predictions.len(),
        encoding
    );

    Scene::with_elements(encoding, image, elements).with_min_box_size(options.min_box_size)
}

impl RawPrediction {
    /// Corner form wins when both forms are present
    pub fn to_box(&self) -> Option<StoredBox> {
        if let Some(values) = self.box_2d {
            if values.iter().all(|v| v.is_finite()) {
                return Some(StoredBox::Corner(CornerBox::from_wire(values)));
            }
            return None;
        }
        let (x, y, width, height) = (self.x?, self.y?, self.width?, self.height?);
        if [x, y, width, height].iter().all(|v| v.is_finite()) {
            Some(StoredBox::CenterSize(CenterSizeBox {
                x,
                y,
                width: width.abs(),
                height: height.abs(),
            }))
        } else {
            None
        }
    }
}

impl PredictionPayload {
    pub fn image_meta(&self) -> Option<ImageMeta> {
        let image = self.image.as_ref()?;
        ImageMeta::new(image.width? as f32, image.height? as f32)
    }
}
