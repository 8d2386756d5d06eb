//! Geometry normalizer: folds every historical annotation encoding into
//! `CanonicalGeometry`.
//!
//! Box-shaped annotations are detected by an ordered list of detectors,
//! first match wins:
//!
//! | # | Encoding | Example |
//! |---|----------|---------|
//! | 1 | canonical | `{"geometry": {"coordinates": [x1, y1, x2, y2]}}` |
//! | 2 | bare coordinates | `{"coordinates": [x1, y1, x2, y2]}` |
//! | 3 | corner points | `{"start": {"x", "y"}, "end": {"x", "y"}}` |
//! | 4 | origin + size | `{"x", "y", "width", "height"}` |
//! | 5 | bbox | `{"bbox": [x1, y1, x2, y2]}` |
//! | 6 | point bounds | `{"points": [...]}` on a box shape |
//! | 7 | scan | any numeric array of length ≥ 4 in any field |
//! | 8 | default | `[100, 100, 200, 200]` |
//!
//! Point-list shapes take `geometry.points` / `points`, then a path
//! descriptor, then the box chain above turned into four corners.
//!
//! Normalizing a normalized record is the identity.

use crate::model::{CanonicalGeometry, PaletteColor, Point, PointGeometry, ShapeType};
use crate::path::{parse_path, path_points};
use serde_json::{Map, Value};

/// Box substituted when nothing usable is found.
pub const DEFAULT_BOX: [f64; 4] = [100.0, 100.0, 200.0, 200.0];

/// Record keys that carry geometry in one encoding or another. They are
/// folded into `geometry` and dropped from a normalized record.
const LEGACY_GEOMETRY_KEYS: &[&str] = &[
    "coordinates",
    "start",
    "end",
    "x",
    "y",
    "width",
    "height",
    "bbox",
    "points",
    "path",
    "pathData",
    "strokeWidth",
    "stroke_width",
    "feather",
];

/// Keys a record may use to name its shape, in lookup order.
const SHAPE_KEYS: &[&str] = &["shapeType", "shape_type", "type", "shape"];

/// Which encoding the geometry was recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometrySource {
    Canonical,
    Coordinates,
    StartEnd,
    OriginSize,
    BBox,
    PointBounds,
    Scanned,
    Points,
    PathDescriptor,
    Default,
}

impl GeometrySource {
    /// `true` when the geometry was guessed rather than read.
    pub fn is_fallback(self) -> bool {
        matches!(self, GeometrySource::Scanned | GeometrySource::Default)
    }
}

/// Result of normalizing one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub geometry: CanonicalGeometry,
    pub source: GeometrySource,
}

type BoxDetector = fn(&Map<String, Value>) -> Option<[f64; 4]>;

const BOX_DETECTORS: &[(GeometrySource, BoxDetector)] = &[
    (GeometrySource::Canonical, detect_canonical),
    (GeometrySource::Coordinates, detect_coordinates),
    (GeometrySource::StartEnd, detect_start_end),
    (GeometrySource::OriginSize, detect_origin_size),
    (GeometrySource::BBox, detect_bbox),
    (GeometrySource::PointBounds, detect_point_bounds),
    (GeometrySource::Scanned, detect_any_numeric_array),
];

// ─── Public API ───────────────────────────────────────────────────────────

/// Read the shape type of a record, accepting legacy keys and aliases.
/// Defaults to `Rectangle`.
pub fn shape_of(record: &Value) -> ShapeType {
    let Some(map) = record.as_object() else {
        return ShapeType::default();
    };
    for key in SHAPE_KEYS {
        if let Some(name) = map.get(*key).and_then(Value::as_str) {
            if let Some(shape) = ShapeType::parse(name) {
                return shape;
            }
            log::warn!("unknown shape type {name:?}, treating as rectangle");
            return ShapeType::default();
        }
    }
    ShapeType::default()
}

/// Normalize the geometry of an annotation-like record for a given shape.
pub fn normalize_geometry(shape: ShapeType, record: &Value) -> Normalized {
    let empty = Map::new();
    let map = record.as_object().unwrap_or(&empty);

    let normalized = if shape.is_box() {
        normalize_box(map)
    } else {
        normalize_points(shape, map)
    };

    if normalized.source.is_fallback() {
        log::warn!(
            "{} geometry not recognized, using {:?} fallback",
            shape.as_str(),
            normalized.source
        );
    }
    normalized
}

/// Normalize a whole record: the returned object carries `shapeType` and a
/// canonical `geometry`, with every legacy geometry key removed. All other
/// fields are kept as-is.
pub fn normalize_record(record: &Value) -> Value {
    let shape = shape_of(record);
    let normalized = normalize_geometry(shape, record);

    let mut out = record.as_object().cloned().unwrap_or_default();
    for key in LEGACY_GEOMETRY_KEYS.iter().chain(SHAPE_KEYS) {
        out.remove(*key);
    }
    out.insert("shapeType".into(), Value::from(shape.as_str()));
    out.insert(
        "geometry".into(),
        serde_json::to_value(&normalized.geometry).unwrap_or(Value::Null),
    );
    if let Some(color) = out.get("color").and_then(Value::as_str)
        && let Some(parsed) = PaletteColor::parse(color)
    {
        out.insert("color".into(), Value::from(parsed.name()));
    }
    Value::Object(out)
}

// ─── Box shapes ──────────────────────────────────────────────────────────

fn normalize_box(map: &Map<String, Value>) -> Normalized {
    for (source, detect) in BOX_DETECTORS {
        if let Some(coordinates) = detect(map) {
            return Normalized {
                geometry: CanonicalGeometry::Box(coordinates),
                source: *source,
            };
        }
    }
    Normalized {
        geometry: CanonicalGeometry::Box(DEFAULT_BOX),
        source: GeometrySource::Default,
    }
}

fn detect_canonical(map: &Map<String, Value>) -> Option<[f64; 4]> {
    let geometry = map.get("geometry")?.as_object()?;
    box_array(geometry.get("coordinates")?)
}

fn detect_coordinates(map: &Map<String, Value>) -> Option<[f64; 4]> {
    box_array(map.get("coordinates")?)
}

fn detect_start_end(map: &Map<String, Value>) -> Option<[f64; 4]> {
    let geometry = map.get("geometry").and_then(Value::as_object);
    let lookup = |key: &str| {
        map.get(key)
            .or_else(|| geometry.and_then(|g| g.get(key)))
            .and_then(point_value)
    };
    let start = lookup("start")?;
    let end = lookup("end")?;
    Some([start.x, start.y, end.x, end.y])
}

fn detect_origin_size(map: &Map<String, Value>) -> Option<[f64; 4]> {
    let x = map.get("x").and_then(number)?;
    let y = map.get("y").and_then(number)?;
    let w = map.get("width").and_then(number)?;
    let h = map.get("height").and_then(number)?;
    Some([x, y, x + w, y + h])
}

fn detect_bbox(map: &Map<String, Value>) -> Option<[f64; 4]> {
    box_array(map.get("bbox")?)
}

fn detect_point_bounds(map: &Map<String, Value>) -> Option<[f64; 4]> {
    let points = find_points(map)?;
    CanonicalGeometry::Points(PointGeometry {
        points,
        ..PointGeometry::default()
    })
    .bounds()
}

/// Best-effort: the first numeric array of length ≥ 4 anywhere in the
/// record's top level, then inside a `geometry` object.
fn detect_any_numeric_array(map: &Map<String, Value>) -> Option<[f64; 4]> {
    let nested = map
        .get("geometry")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|g| g.values());
    map.values().chain(nested).find_map(box_array)
}

// ─── Point-list shapes ───────────────────────────────────────────────────

fn normalize_points(shape: ShapeType, map: &Map<String, Value>) -> Normalized {
    let geometry = map.get("geometry").and_then(Value::as_object);
    let field = |key: &str| {
        geometry
            .and_then(|g| g.get(key))
            .or_else(|| map.get(key))
    };

    let brush = shape == ShapeType::BrushStroke;
    let stroke_width = if brush {
        field("strokeWidth")
            .or_else(|| field("stroke_width"))
            .and_then(number)
    } else {
        None
    };
    let feather = if brush {
        field("feather").and_then(number)
    } else {
        None
    };
    let path = if brush {
        field("path")
            .or_else(|| field("pathData"))
            .and_then(Value::as_str)
            .map(str::to_string)
    } else {
        None
    };

    let nested_points = geometry.and_then(|g| g.get("points")).and_then(point_list);
    let (points, source) = if let Some(points) = nested_points {
        (points, GeometrySource::Canonical)
    } else if let Some(points) = map.get("points").and_then(point_list) {
        (points, GeometrySource::Points)
    } else if let Some(points) = field("path")
        .or_else(|| field("pathData"))
        .and_then(Value::as_str)
        .and_then(points_from_descriptor)
    {
        (points, GeometrySource::PathDescriptor)
    } else {
        let boxed = normalize_box(map);
        let corners = match boxed.geometry {
            CanonicalGeometry::Box([x1, y1, x2, y2]) => vec![
                Point::new(x1, y1),
                Point::new(x2, y1),
                Point::new(x2, y2),
                Point::new(x1, y2),
            ],
            CanonicalGeometry::Points(pg) => pg.points,
        };
        (corners, boxed.source)
    };

    Normalized {
        geometry: CanonicalGeometry::Points(PointGeometry {
            points,
            stroke_width,
            feather,
            path,
        }),
        source,
    }
}

/// Points from `geometry.points`, else top-level `points`. An empty or
/// unreadable list counts as absent.
fn find_points(map: &Map<String, Value>) -> Option<Vec<Point>> {
    map.get("geometry")
        .and_then(Value::as_object)
        .and_then(|g| g.get("points"))
        .and_then(point_list)
        .or_else(|| map.get("points").and_then(point_list))
}

fn points_from_descriptor(descriptor: &str) -> Option<Vec<Point>> {
    match parse_path(descriptor) {
        Ok(cmds) => {
            let points = path_points(&cmds);
            (!points.is_empty()).then_some(points)
        }
        Err(e) => {
            log::warn!("ignoring unreadable path descriptor: {e}");
            None
        }
    }
}

// ─── Lenient value readers ───────────────────────────────────────────────

/// A finite number, or a string holding one.
pub fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// The first four entries of an array, if all four are numbers.
fn box_array(value: &Value) -> Option<[f64; 4]> {
    let items = value.as_array()?;
    if items.len() < 4 {
        return None;
    }
    Some([
        number(&items[0])?,
        number(&items[1])?,
        number(&items[2])?,
        number(&items[3])?,
    ])
}

/// `{"x": .., "y": ..}` or `[x, y]`.
fn point_value(value: &Value) -> Option<Point> {
    match value {
        Value::Object(o) => Some(Point::new(number(o.get("x")?)?, number(o.get("y")?)?)),
        Value::Array(a) if a.len() >= 2 => Some(Point::new(number(&a[0])?, number(&a[1])?)),
        _ => None,
    }
}

/// A non-empty list of points. Unreadable entries are skipped.
fn point_list(value: &Value) -> Option<Vec<Point>> {
    let items = value.as_array()?;
    let points: Vec<Point> = items.iter().filter_map(point_value).collect();
    if points.len() < items.len() {
        log::warn!(
            "dropped {} unreadable point(s)",
            items.len() - points.len()
        );
    }
    (!points.is_empty()).then_some(points)
}
