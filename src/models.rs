use std::fmt;

use image::{Rgb, Rgba};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::StoredBox;

/// Identifier of one element, unique within a scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Id derived from the element's position in the detection list
    pub fn from_index(index: usize) -> Self {
        Self(format!("det-{}", index))
    }

    /// Fresh id for an element drawn by the user
    pub fn generate() -> Self {
        Self(format!("manual-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an element came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Model,
    Manual,
}

/// One detected or user-added object
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub id: ElementId,
    pub class_label: String,
    pub bbox: StoredBox,
    pub confidence: f32,
    pub origin: Origin,
}

impl Detection {
    /// Element drawn by hand; always fully trusted
    pub fn manual(class_label: impl Into<String>, bbox: StoredBox) -> Self {
        Self {
            id: ElementId::generate(),
            class_label: class_label.into(),
            bbox,
            confidence: 1.0,
            origin: Origin::Manual,
        }
    }
}

/// Pixel dimensions of the source image, as reported next to the predictions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMeta {
    pub width: f32,
    pub height: f32,
}

impl ImageMeta {
    /// Returns None unless both dimensions are finite and positive
    pub fn new(width: f32, height: f32) -> Option<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if valid(width) && valid(height) {
            Some(Self { width, height })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn rgb(self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }

    pub fn rgba(self, alpha: u8) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, alpha])
    }

    /// Mix towards white; used for hover emphasis
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let mix = |c: u8| (c as f32 + (255.0 - c as f32) * amount).round() as u8;
        Self::new(mix(self.r), mix(self.g), mix(self.b))
    }

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Color {
    fn from(value: [u8; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<Color> for [u8; 3] {
    fn from(color: Color) -> Self {
        [color.r, color.g, color.b]
    }
}
