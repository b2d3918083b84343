use motif_core::Vector2;

use super::{direction_or, CurvePoint, Segment};
use crate::path::PathSink;

/// Samples used to build the arc-length lookup table
const LUT_SAMPLES: usize = 48;

type LengthTable = [f64; LUT_SAMPLES + 1];

/// Cumulative chord lengths at `LUT_SAMPLES` evenly spaced parameters
fn length_table(eval: impl Fn(f64) -> Vector2) -> LengthTable {
    let mut table = [0.0; LUT_SAMPLES + 1];
    let mut previous = eval(0.0);
    for i in 1..=LUT_SAMPLES {
        let point = eval(i as f64 / LUT_SAMPLES as f64);
        table[i] = table[i - 1] + (point - previous).magnitude();
        previous = point;
    }
    table
}

/// Curve parameter at the normalized arc length `t`
fn parameter_at(table: &[f64], t: f64) -> f64 {
    let total = table.last().copied().unwrap_or(0.0);
    let t = t.clamp(0.0, 1.0);
    if total <= 0.0 {
        return t;
    }
    let target = t * total;
    let index = table.partition_point(|length| *length < target);
    if index == 0 {
        return 0.0;
    }
    if index >= table.len() {
        return 1.0;
    }
    let (before, after) = (table[index - 1], table[index]);
    let span = after - before;
    let local = if span > 0.0 { (target - before) / span } else { 0.0 };
    (index as f64 - 1.0 + local) / LUT_SAMPLES as f64
}

// ============================================================================
// Cubic
// ============================================================================

/// Cubic Bezier `p0 → p3` with controls `p1`, `p2`
#[derive(Clone, Debug, PartialEq)]
pub struct CubicBezierSegment {
    points: [Vector2; 4],
    table: LengthTable,
}

impl CubicBezierSegment {
    pub fn new(p0: Vector2, p1: Vector2, p2: Vector2, p3: Vector2) -> Self {
        let points = [p0, p1, p2, p3];
        let table = length_table(|u| cubic_eval(&points, u));
        Self { points, table }
    }

    fn tangent(&self, u: f64) -> Vector2 {
        let [p0, p1, p2, p3] = self.points;
        let inv = 1.0 - u;
        let derivative =
            (p1 - p0) * (3.0 * inv * inv) + (p2 - p1) * (6.0 * inv * u) + (p3 - p2) * (3.0 * u * u);
        direction_or(derivative, direction_or(p3 - p0, Vector2::RIGHT))
    }

    /// Control points of the sub-curve between parameters `u0` and `u1`
    fn sub_curve(&self, u0: f64, u1: f64) -> [Vector2; 4] {
        let (head, _) = split_cubic(&self.points, u1);
        if u1 <= 0.0 {
            return [head[0]; 4];
        }
        let (_, tail) = split_cubic(&head, u0 / u1);
        tail
    }
}

fn cubic_eval(p: &[Vector2; 4], u: f64) -> Vector2 {
    let inv = 1.0 - u;
    p[0] * (inv * inv * inv) + p[1] * (3.0 * inv * inv * u) + p[2] * (3.0 * inv * u * u) + p[3] * (u * u * u)
}

/// de Casteljau split at `u`
fn split_cubic(p: &[Vector2; 4], u: f64) -> ([Vector2; 4], [Vector2; 4]) {
    let ab = p[0].lerp(p[1], u);
    let bc = p[1].lerp(p[2], u);
    let cd = p[2].lerp(p[3], u);
    let abc = ab.lerp(bc, u);
    let bcd = bc.lerp(cd, u);
    let mid = abc.lerp(bcd, u);
    ([p[0], ab, abc, mid], [mid, bcd, cd, p[3]])
}

impl Segment for CubicBezierSegment {
    fn points(&self) -> &[Vector2] {
        &self.points
    }

    fn arc_length(&self) -> f64 {
        self.table[LUT_SAMPLES]
    }

    fn point_at(&self, t: f64) -> CurvePoint {
        let u = parameter_at(&self.table, t);
        CurvePoint::new(cubic_eval(&self.points, u), self.tangent(u))
    }

    fn draw(&self, sink: &mut dyn PathSink, start: f64, end: f64, move_first: bool) -> (CurvePoint, CurvePoint) {
        let u0 = parameter_at(&self.table, start);
        let u1 = parameter_at(&self.table, end);
        let [p0, p1, p2, p3] = self.sub_curve(u0, u1);
        if move_first {
            sink.move_to(p0);
        }
        sink.cubic_to(p1, p2, p3);
        (
            CurvePoint::new(p0, self.tangent(u0)),
            CurvePoint::new(p3, self.tangent(u1)),
        )
    }
}

// ============================================================================
// Quadratic
// ============================================================================

/// Quadratic Bezier `p0 → p2` with control `p1`
#[derive(Clone, Debug, PartialEq)]
pub struct QuadBezierSegment {
    points: [Vector2; 3],
    table: LengthTable,
}

impl QuadBezierSegment {
    pub fn new(p0: Vector2, p1: Vector2, p2: Vector2) -> Self {
        let points = [p0, p1, p2];
        let table = length_table(|u| quad_eval(&points, u));
        Self { points, table }
    }

    fn tangent(&self, u: f64) -> Vector2 {
        let [p0, p1, p2] = self.points;
        let derivative = (p1 - p0) * (2.0 * (1.0 - u)) + (p2 - p1) * (2.0 * u);
        direction_or(derivative, direction_or(p2 - p0, Vector2::RIGHT))
    }

    fn sub_curve(&self, u0: f64, u1: f64) -> [Vector2; 3] {
        let (head, _) = split_quad(&self.points, u1);
        if u1 <= 0.0 {
            return [head[0]; 3];
        }
        let (_, tail) = split_quad(&head, u0 / u1);
        tail
    }
}

fn quad_eval(p: &[Vector2; 3], u: f64) -> Vector2 {
    let inv = 1.0 - u;
    p[0] * (inv * inv) + p[1] * (2.0 * inv * u) + p[2] * (u * u)
}

fn split_quad(p: &[Vector2; 3], u: f64) -> ([Vector2; 3], [Vector2; 3]) {
    let ab = p[0].lerp(p[1], u);
    let bc = p[1].lerp(p[2], u);
    let mid = ab.lerp(bc, u);
    ([p[0], ab, mid], [mid, bc, p[2]])
}

impl Segment for QuadBezierSegment {
    fn points(&self) -> &[Vector2] {
        &self.points
    }

    fn arc_length(&self) -> f64 {
        self.table[LUT_SAMPLES]
    }

    fn point_at(&self, t: f64) -> CurvePoint {
        let u = parameter_at(&self.table, t);
        CurvePoint::new(quad_eval(&self.points, u), self.tangent(u))
    }

    fn draw(&self, sink: &mut dyn PathSink, start: f64, end: f64, move_first: bool) -> (CurvePoint, CurvePoint) {
        let u0 = parameter_at(&self.table, start);
        let u1 = parameter_at(&self.table, end);
        let [p0, p1, p2] = self.sub_curve(u0, u1);
        if move_first {
            sink.move_to(p0);
        }
        sink.quad_to(p1, p2);
        (
            CurvePoint::new(p0, self.tangent(u0)),
            CurvePoint::new(p2, self.tangent(u1)),
        )
    }
}
