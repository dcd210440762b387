//! Conversions between the detector's reporting spaces and the editor's
//! display space.
//!
//! Three spaces are involved:
//! - storage: either center+size in source pixels or corners normalized to
//!   `0..=1000`, as delivered by the detection service
//! - percent: a rectangle expressed as percentages of the rendered image
//! - display: on-screen pixels relative to the rendered image's top-left corner

use serde::{Deserialize, Serialize};

use crate::models::ImageMeta;

/// Full extent of the normalized corner encoding
pub const CORNER_SCALE: f32 = 1000.0;

/// How boxes are encoded within one scene. Never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxEncoding {
    /// `(x, y)` center plus `width`/`height`, in source-image pixels
    CenterSize,
    /// `[ymin, xmin, ymax, xmax]` normalized to `0..=1000`
    Corner,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterSizeBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerBox {
    pub ymin: f32,
    pub xmin: f32,
    pub ymax: f32,
    pub xmax: f32,
}

impl CornerBox {
    /// Build from the wire order `[ymin, xmin, ymax, xmax]`, swapping inverted edges
    pub fn from_wire(values: [f32; 4]) -> Self {
        let [y0, x0, y1, x1] = values;
        Self {
            ymin: y0.min(y1),
            xmin: x0.min(x1),
            ymax: y0.max(y1),
            xmax: x0.max(x1),
        }
    }

    pub fn to_wire(&self) -> [f32; 4] {
        [self.ymin, self.xmin, self.ymax, self.xmax]
    }
}

/// Geometry of an element in its scene's storage encoding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoredBox {
    CenterSize(CenterSizeBox),
    Corner(CornerBox),
}

impl StoredBox {
    pub fn encoding(&self) -> BoxEncoding {
        match self {
            StoredBox::CenterSize(_) => BoxEncoding::CenterSize,
            StoredBox::Corner(_) => BoxEncoding::Corner,
        }
    }

    /// Area in the box's own storage space. Comparable between boxes of one scene.
    pub fn area(&self) -> f32 {
        match self {
            StoredBox::CenterSize(b) => b.width.max(0.0) * b.height.max(0.0),
            StoredBox::Corner(b) => (b.xmax - b.xmin).max(0.0) * (b.ymax - b.ymin).max(0.0),
        }
    }

    /// Place the box on the rendered image as percentages.
    ///
    /// Center-size boxes cannot be placed without image dimensions; they yield `None`.
    pub fn to_percent(&self, meta: Option<ImageMeta>) -> Option<PercentRect> {
        match self {
            StoredBox::CenterSize(b) => {
                let meta = meta?;
                Some(PercentRect {
                    left: (b.x - b.width / 2.0) / meta.width * 100.0,
                    top: (b.y - b.height / 2.0) / meta.height * 100.0,
                    width: b.width / meta.width * 100.0,
                    height: b.height / meta.height * 100.0,
                })
            }
            StoredBox::Corner(b) => Some(PercentRect {
                left: b.xmin / 10.0,
                top: b.ymin / 10.0,
                width: (b.xmax - b.xmin) / 10.0,
                height: (b.ymax - b.ymin) / 10.0,
            }),
        }
    }

    /// Inverse of [`StoredBox::to_percent`] followed by [`PercentRect::to_display`]:
    /// scale a rectangle drawn on the rendered image into storage space.
    pub fn from_display(
        rect: DisplayRect,
        viewport: Viewport,
        encoding: BoxEncoding,
        meta: Option<ImageMeta>,
    ) -> Option<Self> {
        match encoding {
            BoxEncoding::CenterSize => {
                let meta = meta?;
                let scale_x = meta.width / viewport.width;
                let scale_y = meta.height / viewport.height;
                let width = rect.width * scale_x;
                let height = rect.height * scale_y;
                Some(StoredBox::CenterSize(CenterSizeBox {
                    x: rect.x * scale_x + width / 2.0,
                    y: rect.y * scale_y + height / 2.0,
                    width,
                    height,
                }))
            }
            BoxEncoding::Corner => Some(StoredBox::Corner(CornerBox {
                xmin: rect.x / viewport.width * CORNER_SCALE,
                ymin: rect.y / viewport.height * CORNER_SCALE,
                xmax: (rect.x + rect.width) / viewport.width * CORNER_SCALE,
                ymax: (rect.y + rect.height) / viewport.height * CORNER_SCALE,
            })),
        }
    }

    /// Top-left based rectangle in source pixels, when the image size is known
    pub fn to_pixels(&self, meta: Option<ImageMeta>) -> Option<PixelRect> {
        let meta = meta?;
        let p = self.to_percent(Some(meta))?;
        Some(PixelRect {
            x: p.left / 100.0 * meta.width,
            y: p.top / 100.0 * meta.height,
            width: p.width / 100.0 * meta.width,
            height: p.height / 100.0 * meta.height,
        })
    }
}

/// `[x_min, y_min, width, height]` in source-image pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Rectangle as percentages of the rendered image
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PercentRect {
    pub fn to_display(&self, viewport: Viewport) -> DisplayRect {
        DisplayRect {
            x: self.left / 100.0 * viewport.width,
            y: self.top / 100.0 * viewport.height,
            width: self.width / 100.0 * viewport.width,
            height: self.height / 100.0 * viewport.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPoint {
    pub x: f32,
    pub y: f32,
}

impl DisplayPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Rectangle in display pixels, relative to the rendered image
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    /// Normalized rectangle spanned by two drag corners
    pub fn from_corners(a: DisplayPoint, b: DisplayPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Edges are inclusive
    pub fn contains(&self, point: DisplayPoint) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn meets_minimum(&self, min_size: f32) -> bool {
        self.width >= min_size && self.height >= min_size
    }
}

/// Size of the rendered image element, in display pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Option<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if valid(width) && valid(height) {
            Some(Self { width, height })
        } else {
            None
        }
    }

    pub fn contains(&self, point: DisplayPoint) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }

    pub fn clamp(&self, point: DisplayPoint) -> DisplayPoint {
        DisplayPoint {
            x: point.x.clamp(0.0, self.width),
            y: point.y.clamp(0.0, self.height),
        }
    }
}
