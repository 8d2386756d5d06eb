//! Brush path descriptors: `M x y L x y Q cx cy x y C … Z`.
//!
//! Built on `winnow` 0.7. Only absolute commands are accepted; a relative
//! (lowercase) command is a parse error and callers fall back to other
//! geometry sources.

use crate::model::Point;
use winnow::ascii::float;
use winnow::combinator::{alt, preceded, repeat};
use winnow::prelude::*;
use winnow::token::take_while;

/// A single path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),         // control, end
    CubicTo(Point, Point, Point), // c1, c2, end
    Close,
}

/// Parse a path descriptor into commands.
pub fn parse_path(input: &str) -> Result<Vec<PathCmd>, String> {
    let mut rest = input;
    let mut cmds = Vec::new();

    skip_separators(&mut rest);
    while !rest.is_empty() {
        let group = parse_command
            .parse_next(&mut rest)
            .map_err(|e| format!("Path parse error: {e}"))?;
        cmds.extend(group);
        skip_separators(&mut rest);
    }

    Ok(cmds)
}

/// Emit commands back into descriptor text.
pub fn emit_path(cmds: &[PathCmd]) -> String {
    let mut parts = Vec::with_capacity(cmds.len());
    for cmd in cmds {
        parts.push(match cmd {
            PathCmd::MoveTo(p) => format!("M {} {}", p.x, p.y),
            PathCmd::LineTo(p) => format!("L {} {}", p.x, p.y),
            PathCmd::QuadTo(c, p) => format!("Q {} {} {} {}", c.x, c.y, p.x, p.y),
            PathCmd::CubicTo(c1, c2, p) => {
                format!("C {} {} {} {} {} {}", c1.x, c1.y, c2.x, c2.y, p.x, p.y)
            }
            PathCmd::Close => "Z".to_string(),
        });
    }
    parts.join(" ")
}

/// On-curve points of a path, in order. Control points are skipped.
pub fn path_points(cmds: &[PathCmd]) -> Vec<Point> {
    cmds.iter()
        .filter_map(|cmd| match cmd {
            PathCmd::MoveTo(p)
            | PathCmd::LineTo(p)
            | PathCmd::QuadTo(_, p)
            | PathCmd::CubicTo(_, _, p) => Some(*p),
            PathCmd::Close => None,
        })
        .collect()
}

/// Translate every coordinate of a descriptor. `None` when it does not parse.
pub fn translate_path(descriptor: &str, dx: f64, dy: f64) -> Option<String> {
    let cmds = parse_path(descriptor).ok()?;
    let moved: Vec<PathCmd> = cmds
        .into_iter()
        .map(|cmd| match cmd {
            PathCmd::MoveTo(p) => PathCmd::MoveTo(p.translated(dx, dy)),
            PathCmd::LineTo(p) => PathCmd::LineTo(p.translated(dx, dy)),
            PathCmd::QuadTo(c, p) => PathCmd::QuadTo(c.translated(dx, dy), p.translated(dx, dy)),
            PathCmd::CubicTo(c1, c2, p) => PathCmd::CubicTo(
                c1.translated(dx, dy),
                c2.translated(dx, dy),
                p.translated(dx, dy),
            ),
            PathCmd::Close => PathCmd::Close,
        })
        .collect();
    Some(emit_path(&moved))
}

// ─── Low-level parsers ──────────────────────────────────────────────────

fn skip_separators(input: &mut &str) {
    *input = input.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
}

fn separator(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_whitespace() || c == ',')
        .void()
        .parse_next(input)
}

fn number(input: &mut &str) -> ModalResult<f64> {
    preceded(separator, float).parse_next(input)
}

fn point(input: &mut &str) -> ModalResult<Point> {
    (number, number)
        .map(|(x, y)| Point::new(x, y))
        .parse_next(input)
}

/// One command letter plus all of its coordinate groups. Repeated groups
/// after `M` are implicit line-tos, as in SVG.
fn parse_command(input: &mut &str) -> ModalResult<Vec<PathCmd>> {
    alt((
        preceded('M', repeat(1.., point)).map(|pts: Vec<Point>| {
            pts.into_iter()
                .enumerate()
                .map(|(i, p)| {
                    if i == 0 {
                        PathCmd::MoveTo(p)
                    } else {
                        PathCmd::LineTo(p)
                    }
                })
                .collect()
        }),
        preceded('L', repeat(1.., point))
            .map(|pts: Vec<Point>| pts.into_iter().map(PathCmd::LineTo).collect()),
        preceded('Q', repeat(1.., (point, point))).map(|groups: Vec<(Point, Point)>| {
            groups
                .into_iter()
                .map(|(c, p)| PathCmd::QuadTo(c, p))
                .collect()
        }),
        preceded('C', repeat(1.., (point, point, point))).map(
            |groups: Vec<(Point, Point, Point)>| {
                groups
                    .into_iter()
                    .map(|(c1, c2, p)| PathCmd::CubicTo(c1, c2, p))
                    .collect()
            },
        ),
        'Z'.value(vec![PathCmd::Close]),
    ))
    .parse_next(input)
}
