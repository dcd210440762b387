//! Flattening the visible scene into a standalone raster image.

pub mod source;
pub mod steps;

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ab_glyph::FontArc;
use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, RgbaImage, imageops::FilterType};
use log::{debug, info, warn};

use crate::config::EditorConfig;
use crate::editor::Editor;
use source::PreparedSource;
use steps::{BackgroundStep, CompositeInput, CompositeStep, LabelStep, OverlayStep, SourceImageStep};

/// How the exported file is named
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportNaming {
    Fixed(String),
    /// `<source stem>_detections.png`
    #[default]
    FromSource,
    /// `floorplan_<UTC timestamp>.png`
    Timestamped,
}

const FALLBACK_STEM: &str = "floorplan";

impl ExportNaming {
    pub fn filename(&self, source_name: Option<&str>) -> Result<String> {
        match self {
            ExportNaming::Fixed(name) => Ok(name.clone()),
            ExportNaming::FromSource => Ok(format!(
                "{}_detections.png",
                source_name.unwrap_or(FALLBACK_STEM)
            )),
            ExportNaming::Timestamped => {
                let format = time::format_description::parse("[year][month][day]_[hour][minute][second]")?;
                let stamp = time::OffsetDateTime::now_utc().format(&format)?;
                Ok(format!("{}_{}.png", FALLBACK_STEM, stamp))
            }
        }
    }
}

/// The finished export: an encoded PNG and its file name
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// False when the source image could not be decoded in time
    pub complete: bool,
}

impl ExportArtifact {
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("Failed to write export {:?}", path))?;
        Ok(path)
    }

    pub fn decode(&self) -> Result<DynamicImage> {
        image::load_from_memory_with_format(&self.bytes, ImageFormat::Png)
            .map_err(|e| anyhow::anyhow!("Failed to decode export: {}", e))
    }
}

/// Debug dump configuration for compositor runs
#[derive(Clone, Debug)]
pub struct DebugConfig {
    pub output_dir: PathBuf,
}

/// Composable export pipeline
pub struct Compositor {
    steps: Vec<Arc<dyn CompositeStep>>,
    supersample: u32,
    decode_timeout: Duration,
    naming: ExportNaming,
    debug: Option<DebugConfig>,
}

impl Compositor {
    /// Empty compositor; add steps with [`Compositor::add_step`]
    pub fn new(supersample: u32, decode_timeout: Duration) -> Self {
        Self {
            steps: Vec::new(),
            supersample: supersample.max(1),
            decode_timeout,
            naming: ExportNaming::default(),
            debug: None,
        }
    }

    /// Background, source image, overlay boxes and labels
    pub fn standard(config: &EditorConfig, font: Option<FontArc>) -> Self {
        Self::new(config.supersample, config.decode_timeout())
            .add_step(Arc::new(BackgroundStep {
                color: config.background,
            }))
            .add_step(Arc::new(SourceImageStep {
                filter: FilterType::Triangle,
            }))
            .add_step(Arc::new(OverlayStep {
                stroke_width: config.stroke_width,
                fill_alpha: config.fill_alpha,
            }))
            .add_step(Arc::new(LabelStep {
                font,
                font_size: config.label_font_size,
            }))
    }

    pub fn add_step(mut self, step: Arc<dyn CompositeStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_naming(mut self, naming: ExportNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Dump each step's canvas into `output_dir`, which must be empty or absent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }
        self.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Rasterize the editor's visible scene.
    ///
    /// Takes the editor by shared reference: a failed export cannot touch the scene.
    pub async fn export(&self, editor: &Editor) -> Result<ExportArtifact> {
        let frame = editor.frame().without_chrome();
        let viewport = editor.viewport();

        // Step 1: readable, self-contained image data
        let prepared = editor
            .source()
            .prepare()
            .context("Export aborted: source image unavailable")?;

        // Step 2: decoded and paint-ready, bounded in time
        let base = match prepared {
            PreparedSource::Decoded(image) => Some(image),
            PreparedSource::Bytes(bytes) => {
                match tokio::time::timeout(self.decode_timeout, source::decode(bytes)).await {
                    Ok(decoded) => Some(Arc::new(decoded?)),
                    Err(_) => {
                        warn!(
                            "Source image not ready after {:?}; exporting overlays only",
                            self.decode_timeout
                        );
                        None
                    }
                }
            }
        };

        // Step 3: rasterize at the supersampling factor
        let scale = self.supersample as f32;
        let width = ((viewport.width * scale).round() as u32).max(1);
        let height = ((viewport.height * scale).round() as u32).max(1);
        let mut canvas = RgbaImage::new(width, height);
        let input = CompositeInput {
            frame: &frame,
            base: base.as_deref(),
            viewport,
            scale,
        };

        for (idx, step) in self.steps.iter().enumerate() {
            debug!("Composite step: {}", step.name());
            step.apply(&mut canvas, &input)
                .with_context(|| format!("Composite step '{}' failed", step.name()))?;
            self.save_debug_output(idx, step.name(), &canvas)?;
        }

        // Step 4: encode; the scene is left as it was
        let flattened = DynamicImage::ImageRgba8(canvas).to_rgb8();
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(flattened)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| anyhow::anyhow!("Failed to encode export: {}", e))?;

        let filename = self.naming.filename(editor.source().name())?;
        info!(
            "Exported {} ({}x{}, {} overlays)",
            filename,
            width,
            height,
            frame.items.len()
        );

        Ok(ExportArtifact {
            filename,
            bytes,
            width,
            height,
            complete: base.is_some(),
        })
    }

    fn save_debug_output(&self, idx: usize, step_name: &str, canvas: &RgbaImage) -> Result<()> {
        let Some(debug_config) = &self.debug else {
            return Ok(());
        };
        let filename = format!(
            "{:02}_{}.png",
            idx + 1,
            step_name.to_lowercase().replace(' ', "_")
        );
        let path = debug_config.output_dir.join(&filename);
        canvas
            .save(&path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
        debug!("Debug: saved {}", filename);
        Ok(())
    }
}
