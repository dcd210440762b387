mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from planmark for tests
pub use planmark::{
    BoxEncoding, Compositor, DisplayPoint, Editor, EditorConfig, ElementId, EncodingPolicy,
    EventOutcome, IngestOptions, PointerEvent, PredictionPayload, Scene, SourceImage, Tool,
    Viewport, build_scene,
};
