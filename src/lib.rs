pub mod config;
pub mod detection;
pub mod editor;
pub mod export;
pub mod geometry;
pub mod layers;
pub mod models;
pub mod render;
pub mod scene;

pub use config::EditorConfig;
pub use detection::{EncodingPolicy, IngestOptions, PredictionPayload, build_scene};
pub use editor::{Editor, EventOutcome, PointerEvent, Tool, ToolState};
pub use export::{Compositor, ExportArtifact, ExportNaming};
pub use export::source::{ImageHandle, SourceImage};
pub use geometry::{BoxEncoding, DisplayPoint, DisplayRect, PercentRect, StoredBox, Viewport};
pub use models::{Color, Detection, ElementId, ImageMeta, Origin};
pub use render::RenderFrame;
pub use scene::{ClassSummary, DetectionReport, Scene};
