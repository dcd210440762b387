//! Wire format of the detection service.
//!
//! ```json
//! {
//!   "predictions": [
//!     { "class": "door", "x": 100, "y": 50, "width": 40, "height": 20, "confidence": 0.9 }
//!   ],
//!   "image": { "width": 800, "height": 600 }
//! }
//! ```
//!
//! A prediction may instead carry `box_2d: [ymin, xmin, ymax, xmax]` normalized
//! to 0..=1000. A bare JSON array is read as a prediction list without image
//! dimensions.
use std::path::Path;

use anyhow::Context;
use log::warn;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct PredictionPayload {
    pub predictions: Vec<RawPrediction>,
    pub image: Option<ImageInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPrediction {
    #[serde(rename = "class", alias = "label")]
    pub class_label: String,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub box_2d: Option<[f32; 4]>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default, alias = "id")]
    pub detection_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageInfo {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl PredictionPayload {
    /// Read a payload file. Only I/O problems are errors; bad content yields an empty payload.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read predictions file {:?}", path))?;
        Ok(Self::from_json(&content))
    }

    /// Parse leniently: malformed entries are skipped, malformed documents give an empty payload
    pub fn from_json(content: &str) -> Self {
        match serde_json::from_str::<Value>(content) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                warn!("Predictions are not valid JSON ({}); starting with an empty scene", e);
                Self::default()
            }
        }
    }

    pub fn from_value(value: Value) -> Self {
        let (predictions, image) = match value {
            Value::Array(items) => (items, None),
            Value::Object(mut map) => {
                let predictions = match map.remove("predictions") {
                    Some(Value::Array(items)) => items,
                    Some(_) => {
                        warn!("'predictions' is not a list; ignoring it");
                        Vec::new()
                    }
                    None => Vec::new(),
                };
                let image = map.remove("image").and_then(|v| {
                    serde_json::from_value::<ImageInfo>(v)
                        .map_err(|e| warn!("Ignoring malformed image metadata: {}", e))
                        .ok()
                });
                (predictions, image)
            }
            _ => {
                warn!("Predictions document is neither an object nor a list");
                (Vec::new(), None)
            }
        };

        let predictions = predictions
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                serde_json::from_value::<RawPrediction>(item)
                    .map_err(|e| warn!("Skipping malformed prediction {}: {}", index, e))
                    .ok()
            })
            .collect();

        Self { predictions, image }
    }
}
