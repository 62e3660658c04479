//! Sparkline geometry.
//!
//! Maps a window of closes into a drawing space whose y axis grows downward,
//! then threads a monotone cubic curve through the points so the stroke never
//! overshoots between consecutive samples. Everything here is pure.

use std::fmt::Write as _;

use crate::model::quote_buffer::QuoteBuffer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64, padding: f64) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    /// y of the line the area is closed against.
    pub fn baseline(&self) -> f64 {
        self.height - self.padding
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo { c1: Point, c2: Point, to: Point },
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurveGeometry {
    pub points: Vec<Point>,
    pub line: Vec<PathCommand>,
    pub area: Vec<PathCommand>,
    pub min: f64,
    pub max: f64,
    pub trend_up: bool,
}

impl CurveGeometry {
    pub fn empty() -> Self {
        Self {
            points: Vec::new(),
            line: Vec::new(),
            area: Vec::new(),
            min: 0.0,
            max: 0.0,
            trend_up: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn line_path(&self) -> String {
        to_svg(&self.line)
    }

    pub fn area_path(&self) -> String {
        to_svg(&self.area)
    }

    /// Sample the line into a polyline, `steps` points per cubic segment.
    pub fn flatten(&self, steps: usize) -> Vec<Point> {
        flatten(&self.line, steps)
    }
}

pub fn build_for(buffer: &QuoteBuffer, dims: Dimensions) -> CurveGeometry {
    build(buffer.values(), dims)
}

pub fn build(values: &[f64], dims: Dimensions) -> CurveGeometry {
    if values.is_empty() {
        return CurveGeometry::empty();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let n = values.len();
    let span_x = dims.width - dims.padding * 2.0;
    let span_y = dims.height - dims.padding * 2.0;

    let x_at = |i: usize| {
        if n == 1 {
            dims.padding + span_x / 2.0
        } else {
            dims.padding + (i as f64 / (n - 1) as f64) * span_x
        }
    };
    let y_at = |v: f64| {
        if max == min {
            dims.height / 2.0
        } else {
            let norm = (v - min) / (max - min);
            dims.height - dims.padding - norm * span_y
        }
    };

    let points: Vec<Point> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| Point { x: x_at(i), y: y_at(v) })
        .collect();

    let line = monotone_path(&points);
    let mut area = line.clone();
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        let base = dims.baseline();
        area.push(PathCommand::LineTo(Point { x: last.x, y: base }));
        area.push(PathCommand::LineTo(Point { x: first.x, y: base }));
        area.push(PathCommand::Close);
    }

    let trend_up = match (values.len().checked_sub(2).map(|i| values[i]), values.last()) {
        (Some(prev), Some(&latest)) => latest >= prev,
        _ => true,
    };

    CurveGeometry {
        points,
        line,
        area,
        min,
        max,
        trend_up,
    }
}

fn sign(v: f64) -> f64 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Tangent at the middle point of three, limited so the curve stays monotone.
fn interior_tangent(p0: Point, p1: Point, p2: Point) -> f64 {
    let h0 = p1.x - p0.x;
    let h1 = p2.x - p1.x;
    let s0 = (p1.y - p0.y) / h0;
    let s1 = (p2.y - p1.y) / h1;
    let p = (s0 * h1 + s1 * h0) / (h0 + h1);
    let t = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
    if t.is_finite() {
        t
    } else {
        0.0
    }
}

/// One-sided tangent at an end point from the neighbouring tangent `t`.
fn end_tangent(from: Point, to: Point, t: f64) -> f64 {
    let h = to.x - from.x;
    if h != 0.0 {
        (3.0 * (to.y - from.y) / h - t) / 2.0
    } else {
        t
    }
}

fn monotone_tangents(points: &[Point]) -> Vec<f64> {
    let n = points.len();
    let mut t = vec![0.0; n];
    for i in 1..n - 1 {
        t[i] = interior_tangent(points[i - 1], points[i], points[i + 1]);
    }
    t[0] = end_tangent(points[0], points[1], t[1]);
    t[n - 1] = end_tangent(points[n - 2], points[n - 1], t[n - 2]);
    t
}

fn monotone_path(points: &[Point]) -> Vec<PathCommand> {
    let mut cmds = Vec::with_capacity(points.len() + 1);
    let Some(&first) = points.first() else {
        return cmds;
    };
    cmds.push(PathCommand::MoveTo(first));
    match points.len() {
        1 => return cmds,
        2 => {
            cmds.push(PathCommand::LineTo(points[1]));
            return cmds;
        }
        _ => {}
    }

    let tangents = monotone_tangents(points);
    for i in 0..points.len() - 1 {
        let (p0, p1) = (points[i], points[i + 1]);
        let dx = (p1.x - p0.x) / 3.0;
        cmds.push(PathCommand::CubicTo {
            c1: Point {
                x: p0.x + dx,
                y: p0.y + dx * tangents[i],
            },
            c2: Point {
                x: p1.x - dx,
                y: p1.y - dx * tangents[i + 1],
            },
            to: p1,
        });
    }
    cmds
}

pub fn to_svg(cmds: &[PathCommand]) -> String {
    let mut out = String::new();
    for cmd in cmds {
        let _ = match cmd {
            PathCommand::MoveTo(p) => write!(out, "M{:.2},{:.2}", p.x, p.y),
            PathCommand::LineTo(p) => write!(out, "L{:.2},{:.2}", p.x, p.y),
            PathCommand::CubicTo { c1, c2, to } => write!(
                out,
                "C{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
                c1.x, c1.y, c2.x, c2.y, to.x, to.y
            ),
            PathCommand::Close => write!(out, "Z"),
        };
    }
    out
}

pub fn flatten(cmds: &[PathCommand], steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    let mut out = Vec::new();
    let mut cursor: Option<Point> = None;
    for cmd in cmds {
        match *cmd {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => {
                out.push(p);
                cursor = Some(p);
            }
            PathCommand::CubicTo { c1, c2, to } => {
                let from = cursor.unwrap_or(c1);
                for s in 1..=steps {
                    let t = s as f64 / steps as f64;
                    out.push(cubic_at(from, c1, c2, to, t));
                }
                cursor = Some(to);
            }
            PathCommand::Close => {}
        }
    }
    out
}

fn cubic_at(p0: Point, c1: Point, c2: Point, p1: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    Point {
        x: a * p0.x + b * c1.x + c * c2.x + d * p1.x,
        y: a * p0.y + b * c1.y + c * c2.y + d * p1.y,
    }
}
