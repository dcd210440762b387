use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::models::Color;

// Fallback values, also used by `EditorConfig::default()`
pub const DEFAULT_MIN_BOX_SIZE: f32 = 10.0; // Display pixels, both axes
pub const DEFAULT_SUPERSAMPLE: u32 = 2;
pub const DEFAULT_DECODE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_STROKE_WIDTH: u32 = 3;
pub const DEFAULT_FILL_ALPHA: f32 = 0.15;
pub const DEFAULT_LABEL_FONT_SIZE: f32 = 16.0;
pub const DEFAULT_BACKGROUND: Color = Color::new(255, 255, 255);

/// Class colours, handed out in order of first appearance
pub const DEFAULT_PALETTE: [Color; 8] = [
    Color::new(99, 102, 241),  // Indigo
    Color::new(236, 72, 153),  // Pink
    Color::new(34, 197, 94),   // Green
    Color::new(251, 146, 60),  // Orange
    Color::new(168, 85, 247),  // Purple
    Color::new(14, 165, 233),  // Sky blue
    Color::new(234, 179, 8),   // Yellow
    Color::new(239, 68, 68),   // Red
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub min_box_size: f32,
    pub supersample: u32,
    pub decode_timeout_ms: u64,
    pub stroke_width: u32,
    pub fill_alpha: f32,
    pub label_font_size: f32,
    pub background: Color,
    pub palette: Vec<Color>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_box_size: DEFAULT_MIN_BOX_SIZE,
            supersample: DEFAULT_SUPERSAMPLE,
            decode_timeout_ms: DEFAULT_DECODE_TIMEOUT_MS,
            stroke_width: DEFAULT_STROKE_WIDTH,
            fill_alpha: DEFAULT_FILL_ALPHA,
            label_font_size: DEFAULT_LABEL_FONT_SIZE,
            background: DEFAULT_BACKGROUND,
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl EditorConfig {
    /// Load from a JSON file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.palette.is_empty() {
            anyhow::bail!("Palette must contain at least one colour");
        }
        if self.supersample == 0 {
            anyhow::bail!("Supersample factor must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.fill_alpha) {
            anyhow::bail!("fill_alpha must be within 0..=1, got {}", self.fill_alpha);
        }
        Ok(())
    }

    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms)
    }
}
