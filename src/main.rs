use clap::{Parser, ValueEnum};
use log::{LevelFilter, info};
use std::path::PathBuf;

use planmark::editor::script::EditScript;
use planmark::export::steps::load_font;
use planmark::{
    BoxEncoding, Compositor, Editor, EditorConfig, EncodingPolicy, ExportNaming, IngestOptions,
    PredictionPayload, SourceImage, Viewport, build_scene,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    /// Use whatever the first prediction uses
    Auto,
    /// x/y center plus width/height in source pixels
    CenterSize,
    /// box_2d corners normalized to 0-1000
    Corner,
}

impl From<EncodingArg> for EncodingPolicy {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Auto => EncodingPolicy::Auto,
            EncodingArg::CenterSize => EncodingPolicy::Fixed(BoxEncoding::CenterSize),
            EncodingArg::Corner => EncodingPolicy::Fixed(BoxEncoding::Corner),
        }
    }
}

#[derive(Parser)]
#[command(name = "planmark")]
#[command(about = "Review floor-plan detections, apply edits and export an annotated image")]
struct Cli {
    /// Path to the floor-plan image
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Detection service response (JSON)
    #[arg(short, long, value_name = "JSON")]
    predictions: PathBuf,

    /// Box encoding used by the predictions
    #[arg(long, value_enum, default_value = "auto")]
    encoding: EncodingArg,

    /// Drop predictions below this confidence (0-1)
    #[arg(long, default_value_t = 0.0)]
    min_confidence: f32,

    /// Edit script to replay before exporting
    #[arg(long, value_name = "JSON")]
    edits: Option<PathBuf>,

    /// Hide a class from the export (repeatable)
    #[arg(long = "hide", value_name = "CLASS")]
    hidden: Vec<String>,

    /// Output directory for the image and report
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    out: PathBuf,

    /// Fixed filename for the exported image
    #[arg(long)]
    name: Option<String>,

    /// Editor configuration (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// TrueType font for box labels (labels are only drawn with a font)
    #[arg(long, value_name = "TTF")]
    font: Option<PathBuf>,

    /// Width of the rendered image in display pixels (defaults to the image width)
    #[arg(long)]
    display_width: Option<f32>,

    /// Save each composite step to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    // Image is held as bytes from here on
    let source = SourceImage::from_file(&args.image_path)?;
    let (img_w, img_h) = image::image_dimensions(&args.image_path)
        .map_err(|e| anyhow::anyhow!("Failed to read image dimensions: {}", e))?;
    info!("Loaded image {:?} ({}x{})", args.image_path, img_w, img_h);

    let display_w = args.display_width.unwrap_or(img_w as f32);
    let display_h = display_w * img_h as f32 / img_w as f32;
    let viewport = Viewport::new(display_w, display_h)
        .ok_or_else(|| anyhow::anyhow!("Invalid display size {}x{}", display_w, display_h))?;

    let payload = PredictionPayload::from_file(&args.predictions)?;
    let options = IngestOptions {
        encoding: args.encoding.into(),
        min_confidence: args.min_confidence,
        min_box_size: config.min_box_size,
    };
    let scene = build_scene(&payload, &options);

    let font = args.font.as_deref().map(load_font).transpose()?;
    let mut editor = Editor::new(scene, source, viewport, config.clone());

    if let Some(path) = &args.edits {
        let script = EditScript::from_file(path)?;
        let summary = script.apply(&mut editor);
        info!(
            "Applied {} edits: {} added, {} removed, {} discarded, {} cancelled",
            script.commands.len(),
            summary.added.len(),
            summary.removed.len(),
            summary.discarded,
            summary.cancelled
        );
    }

    for class_label in &args.hidden {
        if editor.scene().is_visible(class_label) {
            editor.toggle_class_visibility(class_label);
        }
    }

    let naming = match args.name {
        Some(name) => ExportNaming::Fixed(name),
        None => ExportNaming::FromSource,
    };
    let mut compositor = Compositor::standard(&config, font).with_naming(naming);
    if let Some(debug_dir) = args.debug_out {
        compositor = compositor.with_debug(debug_dir)?;
    }

    let artifact = compositor.export(&editor).await?;
    let image_path = artifact.save_to(&args.out)?;

    let report = editor.scene().report();
    let stem = editor.source().name().unwrap_or("floorplan");
    let report_path = args.out.join(format!("{}.json", stem));
    std::fs::write(&report_path, report.to_json()?)?;

    println!("\n=== Floor Plan Detections ===");
    println!("Total detections: {}", report.total_detections);
    println!("Classes found: {}", report.classes_found);
    for summary in editor.scene().summarize() {
        println!("  {}: {}", summary.class_label, summary.count);
    }
    if !editor.scene().hidden_classes().is_empty() {
        let hidden: Vec<&str> = editor.scene().hidden_classes().iter().map(String::as_str).collect();
        println!("Hidden: {}", hidden.join(", "));
    }
    if !artifact.complete {
        println!("Warning: source image was not ready; export contains overlays only");
    }
    println!("\nImage:  {}", image_path.display());
    println!("Report: {}", report_path.display());

    Ok(())
}
