use ab_glyph::{FontArc, PxScale};
use anyhow::Result;
use image::{DynamicImage, Pixel, RgbaImage, imageops};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::geometry::{PercentRect, Viewport};
use crate::models::Color;
use crate::render::RenderFrame;

/// Everything a step may read while drawing onto the export canvas
pub struct CompositeInput<'a> {
    /// Frame with editor chrome already removed
    pub frame: &'a RenderFrame,
    /// Decoded source image; `None` when decoding timed out
    pub base: Option<&'a DynamicImage>,
    pub viewport: Viewport,
    /// Canvas pixels per display pixel
    pub scale: f32,
}

/// One layer of the export composite
pub trait CompositeStep: Send + Sync {
    fn apply(&self, canvas: &mut RgbaImage, input: &CompositeInput<'_>) -> Result<()>;

    /// Human-readable name (used for logging and debug dumps)
    fn name(&self) -> &str;
}

/// Canvas-pixel rectangle for a percent rect, clipped to the canvas.
/// `None` if nothing of it is left.
fn canvas_rect(rect: &PercentRect, canvas: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let (cw, ch) = (canvas.width() as f32, canvas.height() as f32);
    let x0 = (rect.left / 100.0 * cw).round().clamp(0.0, cw);
    let y0 = (rect.top / 100.0 * ch).round().clamp(0.0, ch);
    let x1 = ((rect.left + rect.width) / 100.0 * cw).round().clamp(0.0, cw);
    let y1 = ((rect.top + rect.height) / 100.0 * ch).round().clamp(0.0, ch);
    if x1 - x0 < 1.0 || y1 - y0 < 1.0 {
        return None;
    }
    Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

fn blend_rect(canvas: &mut RgbaImage, (x, y, w, h): (u32, u32, u32, u32), color: Color, alpha: u8) {
    let paint = color.rgba(alpha);
    for py in y..(y + h).min(canvas.height()) {
        for px in x..(x + w).min(canvas.width()) {
            canvas.get_pixel_mut(px, py).blend(&paint);
        }
    }
}

/// Fill the canvas with an opaque colour
pub struct BackgroundStep {
    pub color: Color,
}

impl CompositeStep for BackgroundStep {
    fn apply(&self, canvas: &mut RgbaImage, _input: &CompositeInput<'_>) -> Result<()> {
        let fill = self.color.rgba(255);
        for pixel in canvas.pixels_mut() {
            *pixel = fill;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Background"
    }
}

/// Draw the source image scaled to the canvas
pub struct SourceImageStep {
    pub filter: imageops::FilterType,
}

impl CompositeStep for SourceImageStep {
    fn apply(&self, canvas: &mut RgbaImage, input: &CompositeInput<'_>) -> Result<()> {
        let Some(base) = input.base else {
            return Ok(());
        };
        let (w, h) = canvas.dimensions();
        let scaled = imageops::resize(&base.to_rgba8(), w, h, self.filter);
        imageops::overlay(canvas, &scaled, 0, 0);
        Ok(())
    }

    fn name(&self) -> &str {
        "Source Image"
    }
}

/// Translucent fill plus solid outline for every visible element
pub struct OverlayStep {
    pub stroke_width: u32,
    pub fill_alpha: f32,
}

impl CompositeStep for OverlayStep {
    fn apply(&self, canvas: &mut RgbaImage, input: &CompositeInput<'_>) -> Result<()> {
        let stroke = ((self.stroke_width as f32 * input.scale).round() as u32).max(1);
        let alpha = (self.fill_alpha * 255.0).round() as u8;

        for item in &input.frame.items {
            let Some(area) = canvas_rect(&item.rect, canvas) else {
                continue;
            };
            let color = item.display_color();
            if alpha > 0 {
                blend_rect(canvas, area, color, alpha);
            }

            // Nested outlines, inset one pixel at a time
            let (x, y, w, h) = area;
            let outline = color.rgba(255);
            for t in 0..stroke.min(w / 2).min(h / 2).max(1) {
                let rw = w.saturating_sub(2 * t).max(1);
                let rh = h.saturating_sub(2 * t).max(1);
                let rect = Rect::at((x + t) as i32, (y + t) as i32).of_size(rw, rh);
                draw_hollow_rect_mut(canvas, rect, outline);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Overlays"
    }
}

/// Class-coloured banner above each box with `"<class> <confidence>"` text.
/// Draws nothing without a font.
pub struct LabelStep {
    pub font: Option<FontArc>,
    pub font_size: f32,
}

impl LabelStep {
    const PADDING: f32 = 5.0;
}

impl CompositeStep for LabelStep {
    fn apply(&self, canvas: &mut RgbaImage, input: &CompositeInput<'_>) -> Result<()> {
        let Some(font) = &self.font else {
            return Ok(());
        };
        let scale = PxScale::from(self.font_size * input.scale);
        let padding = (Self::PADDING * input.scale).round() as u32;

        for item in &input.frame.items {
            let Some((x, y, _, _)) = canvas_rect(&item.rect, canvas) else {
                continue;
            };
            let text = item.label_text();
            let (text_w, text_h) = text_size(scale, font, &text);
            let banner_w = (text_w + 2 * padding).min(canvas.width().saturating_sub(x));
            let banner_h = text_h + 2 * padding;
            if banner_w == 0 || banner_h > canvas.height() {
                continue;
            }
            // Above the box when there is room, otherwise just inside its top edge
            let banner_y = if y >= banner_h {
                y - banner_h
            } else {
                y.min(canvas.height() - banner_h)
            };

            blend_rect(canvas, (x, banner_y, banner_w, banner_h), item.color, 255);
            draw_text_mut(
                canvas,
                image::Rgba([255, 255, 255, 255]),
                (x + padding) as i32,
                (banner_y + padding) as i32,
                scale,
                font,
                &text,
            );
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Labels"
    }
}

pub fn load_font(path: &std::path::Path) -> Result<FontArc> {
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("Failed to read font {:?}: {}", path, e))?;
    FontArc::try_from_vec(bytes).map_err(|e| anyhow::anyhow!("Invalid font {:?}: {}", path, e))
}
