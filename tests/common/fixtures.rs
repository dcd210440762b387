use image::{DynamicImage, ImageBuffer, Rgb};
use planmark::export::source::encode_png;
use planmark::{
    BoxEncoding, Editor, EditorConfig, IngestOptions, PredictionPayload, Scene, SourceImage,
    Viewport, build_scene,
};
use tempfile::NamedTempFile;

/// Grey used for every generated test image
pub const TEST_GREY: [u8; 3] = [128, 128, 128];

/// Center-size payload on an 800x600 image.
///
/// Pixel rectangles: room (100,100)-(700,500), door (80,40)-(120,60),
/// window (720,540)-(760,580).
pub const SAMPLE_PAYLOAD: &str = r#"{
    "predictions": [
        { "class": "room", "x": 400, "y": 300, "width": 600, "height": 400, "confidence": 0.97 },
        { "class": "door", "x": 100, "y": 50, "width": 40, "height": 20, "confidence": 0.9 },
        { "class": "window", "x": 740, "y": 560, "width": 40, "height": 40, "confidence": 0.456 }
    ],
    "image": { "width": 800, "height": 600 }
}"#;

/// Corner-form payload without image dimensions
pub const CORNER_PAYLOAD: &str = r#"[
    { "label": "room", "box_2d": [100, 100, 900, 900], "confidence": 0.8 },
    { "label": "toilet", "box_2d": [200, 200, 300, 300], "confidence": 0.7 }
]"#;

/// Creates a solid grey PNG and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image(width: u32, height: u32) -> NamedTempFile {
    let img = ImageBuffer::from_fn(width, height, |_, _| Rgb(TEST_GREY));
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

pub fn grey_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |_, _| Rgb(TEST_GREY)))
}

/// Durable in-memory source named `plan`
pub fn test_source() -> SourceImage {
    let bytes = encode_png(&grey_image(80, 60)).expect("Failed to encode test image");
    SourceImage::from_bytes(bytes).with_name("plan")
}

pub fn viewport(width: f32, height: f32) -> Viewport {
    Viewport::new(width, height).expect("Invalid test viewport")
}

pub fn scene_from(json: &str) -> Scene {
    build_scene(&PredictionPayload::from_json(json), &IngestOptions::default())
}

pub fn sample_scene() -> Scene {
    scene_from(SAMPLE_PAYLOAD)
}

/// Empty corner-encoded scene; no image metadata needed to place boxes
pub fn empty_corner_scene() -> Scene {
    Scene::new(BoxEncoding::Corner, None)
}

/// Editor over `scene` at 400x300 display pixels with default settings
pub fn make_editor(scene: Scene) -> Editor {
    Editor::new(scene, test_source(), viewport(400.0, 300.0), EditorConfig::default())
}
