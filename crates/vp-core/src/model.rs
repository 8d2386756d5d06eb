//! Core annotation data model.
//!
//! An annotation is one user-drawn region over the source image plus the
//! editing intent attached to it. Geometry is always held in its canonical
//! form: box-shaped annotations carry `[x1, y1, x2, y2]`, point-list shapes
//! carry an ordered list of points. See `geometry` for how legacy encodings
//! are folded into this shape.

use crate::id::AnnotationId;
use serde::{Deserialize, Serialize, Serializer};
use smallvec::SmallVec;

/// Prompt phrases attached to an annotation or to the global intent.
pub type PromptList = SmallVec<[String; 4]>;

// ─── Points ──────────────────────────────────────────────────────────────

/// A 2D point in display (canvas) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

// ─── Shape type ──────────────────────────────────────────────────────────

/// The kind of region the drawing surface produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeType {
    #[default]
    Rectangle,
    Circle,
    Arrow,
    Polygon,
    BrushStroke,
}

impl ShapeType {
    pub const ALL: [ShapeType; 5] = [
        ShapeType::Rectangle,
        ShapeType::Circle,
        ShapeType::Arrow,
        ShapeType::Polygon,
        ShapeType::BrushStroke,
    ];

    /// Canonical persisted name.
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeType::Rectangle => "rectangle",
            ShapeType::Circle => "circle",
            ShapeType::Arrow => "arrow",
            ShapeType::Polygon => "polygon",
            ShapeType::BrushStroke => "brushStroke",
        }
    }

    /// Parse a shape name, accepting the aliases older documents used.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "rectangle" | "rect" | "box" => Some(ShapeType::Rectangle),
            "circle" | "ellipse" | "oval" => Some(ShapeType::Circle),
            "arrow" | "line" => Some(ShapeType::Arrow),
            "polygon" | "poly" => Some(ShapeType::Polygon),
            "brushstroke" | "brush_stroke" | "brush" | "freehand" | "stroke" => {
                Some(ShapeType::BrushStroke)
            }
            _ => None,
        }
    }

    /// Box-shaped annotations store a bounding box; the rest store points.
    pub fn is_box(self) -> bool {
        matches!(
            self,
            ShapeType::Rectangle | ShapeType::Circle | ShapeType::Arrow
        )
    }

    /// Adjective used in generated object descriptions.
    pub fn descriptor(self) -> &'static str {
        match self {
            ShapeType::Rectangle => "rectangular",
            ShapeType::Circle => "circular",
            ShapeType::Arrow => "arrow",
            ShapeType::Polygon => "polygonal",
            ShapeType::BrushStroke => "brush-stroked",
        }
    }
}

// ─── Palette ─────────────────────────────────────────────────────────────

/// The closed annotation palette. Each name maps to exactly one hex value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteColor {
    #[default]
    Red,
    Green,
    Yellow,
    Blue,
}

impl PaletteColor {
    pub const ALL: [PaletteColor; 4] = [
        PaletteColor::Red,
        PaletteColor::Green,
        PaletteColor::Yellow,
        PaletteColor::Blue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PaletteColor::Red => "red",
            PaletteColor::Green => "green",
            PaletteColor::Yellow => "yellow",
            PaletteColor::Blue => "blue",
        }
    }

    pub fn to_hex(self) -> &'static str {
        match self {
            PaletteColor::Red => "#f44336",
            PaletteColor::Green => "#4caf50",
            PaletteColor::Yellow => "#ffeb3b",
            PaletteColor::Blue => "#2196f3",
        }
    }

    /// Match a hex string (with or without `#`, any case) against the palette.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        Self::ALL
            .into_iter()
            .find(|c| c.to_hex()[1..].eq_ignore_ascii_case(hex))
    }

    /// Accept either a palette name or one of the palette hex values.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(trimmed))
            .or_else(|| Self::from_hex(trimmed))
    }
}

// ─── Style ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    #[default]
    Filled,
    Outline,
}

impl FillMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filled" | "fill" | "solid" => Some(FillMode::Filled),
            "outline" | "stroke" | "hollow" => Some(FillMode::Outline),
            _ => None,
        }
    }
}

pub const MIN_OPACITY: u8 = 10;
pub const MAX_OPACITY: u8 = 100;
pub const DEFAULT_OPACITY: u8 = 50;

/// Clamp an arbitrary opacity value into `[10, 100]`.
pub fn clamp_opacity(value: f64) -> u8 {
    if !value.is_finite() {
        return DEFAULT_OPACITY;
    }
    value.round().clamp(MIN_OPACITY as f64, MAX_OPACITY as f64) as u8
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Geometry of a point-list shape (polygon or brush stroke).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointGeometry {
    pub points: Vec<Point>,
    /// Brush width in display pixels (brush strokes only).
    pub stroke_width: Option<f64>,
    /// Edge softness (brush strokes only).
    pub feather: Option<f64>,
    /// Precomputed path descriptor, e.g. `M 10 10 L 20 20`.
    pub path: Option<String>,
}

/// The single internal geometry representation.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalGeometry {
    /// `[x1, y1, x2, y2]`: first corner, then the opposite one.
    Box([f64; 4]),
    Points(PointGeometry),
}

impl CanonicalGeometry {
    pub fn from_box(coordinates: [f64; 4]) -> Self {
        CanonicalGeometry::Box(coordinates)
    }

    /// First corner of a box (`start` in persisted form).
    pub fn start(&self) -> Option<Point> {
        match self {
            CanonicalGeometry::Box([x1, y1, _, _]) => Some(Point::new(*x1, *y1)),
            CanonicalGeometry::Points(_) => None,
        }
    }

    /// Opposite corner of a box (`end` in persisted form).
    pub fn end(&self) -> Option<Point> {
        match self {
            CanonicalGeometry::Box([_, _, x2, y2]) => Some(Point::new(*x2, *y2)),
            CanonicalGeometry::Points(_) => None,
        }
    }

    /// Axis-aligned bounds as `[min_x, min_y, max_x, max_y]`.
    /// `None` for an empty point list.
    pub fn bounds(&self) -> Option<[f64; 4]> {
        match self {
            CanonicalGeometry::Box([x1, y1, x2, y2]) => {
                Some([x1.min(*x2), y1.min(*y2), x1.max(*x2), y1.max(*y2)])
            }
            CanonicalGeometry::Points(pg) => {
                let first = pg.points.first()?;
                let init = [first.x, first.y, first.x, first.y];
                Some(pg.points.iter().fold(init, |[a, b, c, d], p| {
                    [a.min(p.x), b.min(p.y), c.max(p.x), d.max(p.y)]
                }))
            }
        }
    }

    /// Center of the bounds, used for position descriptions.
    pub fn center(&self) -> Option<Point> {
        self.bounds()
            .map(|[x1, y1, x2, y2]| Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0))
    }

    /// Shift every coordinate by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            CanonicalGeometry::Box(c) => {
                c[0] += dx;
                c[1] += dy;
                c[2] += dx;
                c[3] += dy;
            }
            CanonicalGeometry::Points(pg) => {
                for p in &mut pg.points {
                    *p = p.translated(dx, dy);
                }
                if let Some(path) = &pg.path {
                    match crate::path::translate_path(path, dx, dy) {
                        Some(moved) => pg.path = Some(moved),
                        None => log::warn!("path descriptor {path:?} not translatable, kept as-is"),
                    }
                }
            }
        }
    }
}

/// Persisted form of a geometry: the canonical fields plus the derived
/// `start`/`end` corners that position logic reads.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeometryRepr<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    coordinates: Option<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    points: Option<&'a [Point]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    feather: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
}

impl Serialize for CanonicalGeometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            CanonicalGeometry::Box(c) => GeometryRepr {
                coordinates: Some(*c),
                start: self.start(),
                end: self.end(),
                points: None,
                stroke_width: None,
                feather: None,
                path: None,
            },
            CanonicalGeometry::Points(pg) => GeometryRepr {
                coordinates: None,
                start: None,
                end: None,
                points: Some(&pg.points),
                stroke_width: pg.stroke_width,
                feather: pg.feather,
                path: pg.path.as_deref(),
            },
        };
        repr.serialize(serializer)
    }
}

// ─── Annotation ──────────────────────────────────────────────────────────

/// One user-drawn region plus its editing metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    /// Creation sequence number, used in labels and cross-references.
    pub number: u32,
    pub shape_type: ShapeType,
    pub geometry: CanonicalGeometry,
    pub color: PaletteColor,
    pub fill_mode: FillMode,
    pub opacity: u8,
    /// Key into the template catalog. `None` falls back to the global operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub constraint_prompts: PromptList,
    pub decorative_prompts: PromptList,
    pub selected: bool,
}

impl Annotation {
    /// Build an annotation with default style and no editing intent.
    pub fn new(
        id: AnnotationId,
        number: u32,
        shape_type: ShapeType,
        geometry: CanonicalGeometry,
        color: PaletteColor,
    ) -> Self {
        Self {
            id,
            number,
            shape_type,
            geometry,
            color,
            fill_mode: FillMode::default(),
            opacity: DEFAULT_OPACITY,
            operation_type: None,
            description: None,
            constraint_prompts: PromptList::new(),
            decorative_prompts: PromptList::new(),
            selected: false,
        }
    }

    /// The annotation's own operation, if set and non-blank.
    pub fn own_operation(&self) -> Option<&str> {
        self.operation_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The annotation's own free-text instruction, if set and non-blank.
    pub fn own_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Apply a partial update. Fields left `None` in the patch are untouched.
    pub fn apply(&mut self, patch: AnnotationPatch) {
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(fill_mode) = patch.fill_mode {
            self.fill_mode = fill_mode;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = clamp_opacity(opacity as f64);
        }
        if let Some(op) = patch.operation_type {
            self.operation_type = op;
        }
        if let Some(desc) = patch.description {
            self.description = desc;
        }
        if let Some(prompts) = patch.constraint_prompts {
            self.constraint_prompts = prompts;
        }
        if let Some(prompts) = patch.decorative_prompts {
            self.decorative_prompts = prompts;
        }
    }
}

/// Partial field update for `AnnotationStore::update`.
///
/// `operation_type` and `description` are doubly optional: the outer `None`
/// leaves the field alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct AnnotationPatch {
    pub color: Option<PaletteColor>,
    pub fill_mode: Option<FillMode>,
    pub opacity: Option<u8>,
    pub operation_type: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub constraint_prompts: Option<PromptList>,
    pub decorative_prompts: Option<PromptList>,
}

impl AnnotationPatch {
    pub fn color(color: PaletteColor) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    pub fn operation(op: impl Into<String>) -> Self {
        Self {
            operation_type: Some(Some(op.into())),
            ..Self::default()
        }
    }

    pub fn description(text: impl Into<String>) -> Self {
        Self {
            description: Some(Some(text.into())),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_aliases() {
        assert_eq!(ShapeType::parse("rect"), Some(ShapeType::Rectangle));
        assert_eq!(ShapeType::parse("Ellipse"), Some(ShapeType::Circle));
        assert_eq!(ShapeType::parse("brushStroke"), Some(ShapeType::BrushStroke));
        assert_eq!(ShapeType::parse("freehand"), Some(ShapeType::BrushStroke));
        assert_eq!(ShapeType::parse("hexagon"), None);
        for shape in ShapeType::ALL {
            assert_eq!(ShapeType::parse(shape.as_str()), Some(shape));
        }
    }

    #[test]
    fn palette_hex_is_one_to_one() {
        for color in PaletteColor::ALL {
            assert_eq!(PaletteColor::from_hex(color.to_hex()), Some(color));
            assert_eq!(PaletteColor::parse(color.name()), Some(color));
        }
        assert_eq!(PaletteColor::parse("#4CAF50"), Some(PaletteColor::Green));
        assert_eq!(PaletteColor::parse("magenta"), None);
    }

    #[test]
    fn opacity_is_clamped() {
        assert_eq!(clamp_opacity(0.0), 10);
        assert_eq!(clamp_opacity(250.0), 100);
        assert_eq!(clamp_opacity(42.4), 42);
        assert_eq!(clamp_opacity(f64::NAN), DEFAULT_OPACITY);
    }

    #[test]
    fn box_center_and_corners() {
        let g = CanonicalGeometry::from_box([200.0, 200.0, 300.0, 300.0]);
        assert_eq!(g.center(), Some(Point::new(250.0, 250.0)));
        assert_eq!(g.start(), Some(Point::new(200.0, 200.0)));
        assert_eq!(g.end(), Some(Point::new(300.0, 300.0)));
    }

    #[test]
    fn reversed_box_bounds_are_ordered() {
        let g = CanonicalGeometry::from_box([300.0, 50.0, 100.0, 10.0]);
        assert_eq!(g.bounds(), Some([100.0, 10.0, 300.0, 50.0]));
    }

    #[test]
    fn empty_points_have_no_center() {
        let g = CanonicalGeometry::Points(PointGeometry::default());
        assert_eq!(g.center(), None);
    }

    #[test]
    fn translate_points_and_path() {
        let mut g = CanonicalGeometry::Points(PointGeometry {
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 5.0)],
            stroke_width: Some(8.0),
            feather: None,
            path: Some("M 0 0 L 10 5".into()),
        });
        g.translate(20.0, 20.0);
        match g {
            CanonicalGeometry::Points(pg) => {
                assert_eq!(pg.points[1], Point::new(30.0, 25.0));
                assert_eq!(pg.path.as_deref(), Some("M 20 20 L 30 25"));
                assert_eq!(pg.stroke_width, Some(8.0));
            }
            CanonicalGeometry::Box(_) => panic!("expected points"),
        }
    }

    #[test]
    fn translate_keeps_unreadable_path() {
        let mut g = CanonicalGeometry::Points(PointGeometry {
            points: vec![Point::new(1.0, 1.0), Point::new(3.0, 3.0)],
            stroke_width: Some(4.0),
            feather: None,
            path: Some("m 1 1 l 2 2".into()),
        });
        g.translate(20.0, 20.0);
        match g {
            CanonicalGeometry::Points(pg) => {
                assert_eq!(pg.points[0], Point::new(21.0, 21.0));
                assert_eq!(pg.path.as_deref(), Some("m 1 1 l 2 2"));
            }
            CanonicalGeometry::Box(_) => panic!("expected points"),
        }
    }

    #[test]
    fn box_serializes_with_derived_corners() {
        let g = CanonicalGeometry::from_box([10.0, 20.0, 110.0, 120.0]);
        let v = serde_json::to_value(&g).unwrap();
        assert_eq!(v["coordinates"][2], 110.0);
        assert_eq!(v["start"]["x"], 10.0);
        assert_eq!(v["end"]["y"], 120.0);
        assert!(v.get("points").is_none());
    }

    #[test]
    fn patch_clears_operation() {
        let mut a = Annotation::new(
            AnnotationId::intern("a"),
            1,
            ShapeType::Rectangle,
            CanonicalGeometry::from_box([0.0, 0.0, 1.0, 1.0]),
            PaletteColor::Red,
        );
        a.apply(AnnotationPatch::operation("change_color"));
        assert_eq!(a.own_operation(), Some("change_color"));
        a.apply(AnnotationPatch {
            operation_type: Some(None),
            opacity: Some(5),
            ..AnnotationPatch::default()
        });
        assert_eq!(a.operation_type, None);
        assert_eq!(a.opacity, MIN_OPACITY);
    }
}
