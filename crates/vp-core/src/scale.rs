//! Display ↔ natural image coordinate bookkeeping.
//!
//! Annotations are drawn in display (canvas) pixels. Export needs the scale
//! from the displayed image to its natural resolution, plus the offset of the
//! image inside the canvas.

use crate::model::{CanonicalGeometry, Point, PointGeometry};
use serde::{Deserialize, Serialize};

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_usable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Resolved scale factors for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScaleInfo {
    pub display_width: f64,
    pub display_height: f64,
    pub natural_width: f64,
    pub natural_height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ScaleInfo {
    /// The values used before the image has loaded.
    fn default() -> Self {
        Self {
            display_width: 800.0,
            display_height: 600.0,
            natural_width: 800.0,
            natural_height: 600.0,
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl ScaleInfo {
    /// Compute scale factors. Falls back to the default when either size is
    /// missing or degenerate (image not loaded yet).
    pub fn resolve(display: Option<Size>, natural: Option<Size>, offset: Point) -> Self {
        let (Some(display), Some(natural)) = (display, natural) else {
            return Self::default();
        };
        if !display.is_usable() || !natural.is_usable() {
            log::debug!("image size unusable ({display:?} / {natural:?}), using default scale");
            return Self::default();
        }
        Self {
            display_width: display.width,
            display_height: display.height,
            natural_width: natural.width,
            natural_height: natural.height,
            scale_x: natural.width / display.width,
            scale_y: natural.height / display.height,
            offset_x: offset.x,
            offset_y: offset.y,
        }
    }

    /// Display (canvas) point → natural image pixel.
    pub fn to_natural(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset_x) * self.scale_x,
            (p.y - self.offset_y) * self.scale_y,
        )
    }

    /// Natural image pixel → display (canvas) point.
    pub fn to_display(&self, p: Point) -> Point {
        let sx = if self.scale_x == 0.0 { 1.0 } else { self.scale_x };
        let sy = if self.scale_y == 0.0 { 1.0 } else { self.scale_y };
        Point::new(p.x / sx + self.offset_x, p.y / sy + self.offset_y)
    }

    /// Geometry expressed in natural image pixels, for export.
    pub fn natural_geometry(&self, geometry: &CanonicalGeometry) -> CanonicalGeometry {
        match geometry {
            CanonicalGeometry::Box([x1, y1, x2, y2]) => {
                let a = self.to_natural(Point::new(*x1, *y1));
                let b = self.to_natural(Point::new(*x2, *y2));
                CanonicalGeometry::Box([a.x, a.y, b.x, b.y])
            }
            CanonicalGeometry::Points(pg) => CanonicalGeometry::Points(PointGeometry {
                points: pg.points.iter().map(|p| self.to_natural(*p)).collect(),
                stroke_width: pg.stroke_width.map(|w| w * (self.scale_x + self.scale_y) / 2.0),
                feather: pg.feather,
                // Descriptor stays in display space; points are authoritative.
                path: None,
            }),
        }
    }
}
