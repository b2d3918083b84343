use motif_core::{Vector2, EPSILON};
use tracing::trace;

use super::{CircleSegment, CubicBezierSegment, CurvePoint, KnotInfo, LineSegment, Segment};
use crate::path::PathSink;

/// An ordered chain of segments
#[derive(Debug)]
pub struct CurveProfile {
    pub segments: Vec<Box<dyn Segment>>,
    pub arc_length: f64,
    /// Sine of half the sharpest corner angle, `1` for a smooth curve
    pub min_sin: f64,
}

impl Default for CurveProfile {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            arc_length: 0.0,
            min_sin: 1.0,
        }
    }
}

/// Where a partially drawn profile begins and ends
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CurveDrawingInfo {
    pub start_point: Vector2,
    pub start_tangent: Vector2,
    pub end_point: Vector2,
    pub end_tangent: Vector2,
    /// Distance along the profile where drawing started
    pub start_offset: f64,
}

impl CurveProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: impl Segment + 'static) {
        self.arc_length += segment.arc_length();
        self.segments.push(Box::new(segment));
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sample at a distance along the profile, clamped to its length
    ///
    /// # Panics
    ///
    /// Panics if the profile has no segments.
    pub fn point_at_distance(&self, distance: f64) -> CurvePoint {
        assert!(!self.segments.is_empty(), "cannot sample an empty curve profile");

        let distance = distance.clamp(0.0, self.arc_length);
        let mut covered = 0.0;
        for segment in &self.segments {
            let length = segment.arc_length();
            if distance <= covered + length {
                let t = if length > 0.0 { (distance - covered) / length } else { 0.0 };
                return segment.point_at(t);
            }
            covered += length;
        }
        // rounding pushed us past the last segment
        self.segments[self.segments.len() - 1].point_at(1.0)
    }

    /// Sample at a fraction of the total length
    ///
    /// # Panics
    ///
    /// Panics if the profile has no segments.
    pub fn point_at_percentage(&self, percentage: f64) -> CurvePoint {
        self.point_at_distance(percentage * self.arc_length)
    }

    /// Draw the part of the profile between the fractions `start` and `end`
    pub fn draw(&self, sink: &mut dyn PathSink, start: f64, end: f64) -> CurveDrawingInfo {
        let start_distance = start.clamp(0.0, 1.0) * self.arc_length;
        let end_distance = end.clamp(0.0, 1.0) * self.arc_length;

        let mut first: Option<CurvePoint> = None;
        let mut last: Option<CurvePoint> = None;
        let mut covered = 0.0;
        for segment in &self.segments {
            let length = segment.arc_length();
            let segment_start = covered;
            covered += length;

            if covered < start_distance {
                continue;
            }
            if segment_start > end_distance || (segment_start == end_distance && first.is_some()) {
                break;
            }

            let (t0, t1) = if length > 0.0 {
                (
                    ((start_distance - segment_start) / length).clamp(0.0, 1.0),
                    ((end_distance - segment_start) / length).clamp(0.0, 1.0),
                )
            } else {
                (0.0, 1.0)
            };
            let (from, to) = segment.draw(sink, t0, t1, first.is_none());
            first.get_or_insert(from);
            last = Some(to);
        }

        match (first, last) {
            (Some(first), Some(last)) => CurveDrawingInfo {
                start_point: first.position,
                start_tangent: first.tangent,
                end_point: last.position,
                end_tangent: last.tangent,
                start_offset: start_distance,
            },
            _ => CurveDrawingInfo {
                start_offset: start_distance,
                ..Default::default()
            },
        }
    }
}

/// SVG path data for the whole profile, with a single leading `M`
pub fn profile_to_svg_path_data(profile: &CurveProfile) -> String {
    profile
        .segments
        .iter()
        .enumerate()
        .map(|(i, segment)| segment.to_svg_commands(0.0, 1.0, i == 0))
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Builders
// ============================================================================

/// Lines through `points` with corners rounded by circular arcs of up to
/// `radius`
///
/// The radius shrinks where neighbouring corners would overlap. A closed
/// polyline starts and ends halfway along its closing edge so every vertex
/// gets a rounded corner.
pub fn polyline_profile(points: &[Vector2], radius: f64, closed: bool) -> CurveProfile {
    let mut profile = CurveProfile::new();
    if points.len() < 2 {
        return profile;
    }

    let mut points = points.to_vec();
    if closed {
        let middle = points[0].lerp(points[points.len() - 1], 0.5);
        points.insert(0, middle);
        points.push(middle);
    }

    let last_index = points.len() - 1;
    let mut cursor = points[0];
    for i in 1..last_index {
        let corner = points[i];
        let to_start = points[i - 1] - corner;
        let to_end = points[i + 1] - corner;
        if to_start.magnitude() < EPSILON || to_end.magnitude() < EPSILON {
            trace!(index = i, "skipping degenerate polyline corner");
            profile.push(LineSegment::new(cursor, corner));
            cursor = corner;
            continue;
        }

        let start_dir = to_start.normalized();
        let end_dir = to_end.normalized();
        let between = start_dir.dot(end_dir).clamp(-1.0, 1.0).acos();
        let half_tan = (between / 2.0).tan();
        let half_sin = (between / 2.0).sin();

        // corners share an edge, so each may use half of it unless it is an end edge
        let start_share = if i == 1 { 1.0 } else { 0.5 };
        let end_share = if i + 1 == last_index { 1.0 } else { 0.5 };
        let safe_radius = radius
            .min(half_tan * to_start.magnitude() * start_share)
            .min(half_tan * to_end.magnitude() * end_share)
            .max(0.0);

        profile.min_sin = profile.min_sin.min(half_sin);

        if safe_radius <= EPSILON || half_tan <= EPSILON {
            profile.push(LineSegment::new(cursor, corner));
            cursor = corner;
            continue;
        }

        let tangent_offset = safe_radius / half_tan;
        let arc_start = corner + start_dir * tangent_offset;
        let arc_end = corner + end_dir * tangent_offset;
        let center = corner + (start_dir + end_dir).normalized() * (safe_radius / half_sin);

        profile.push(LineSegment::new(cursor, arc_start));
        let from = (arc_start - center).normalized();
        let to = (arc_end - center).normalized();
        profile.push(CircleSegment::new(center, safe_radius, from, to, from.cross(to) < 0.0));
        cursor = arc_end;
    }
    profile.push(LineSegment::new(cursor, points[last_index]));
    profile
}

/// Cubic Bezier spline through `knots`
pub fn spline_profile(knots: &[KnotInfo], closed: bool) -> CurveProfile {
    let mut profile = CurveProfile::new();
    if knots.len() < 2 {
        return profile;
    }

    let count = if closed { knots.len() } else { knots.len() - 1 };
    let mut previous_tangent: Option<Vector2> = None;
    for i in 0..count {
        let from = &knots[i];
        let to = &knots[(i + 1) % knots.len()];
        let segment = CubicBezierSegment::new(from.position, from.end_handle, to.start_handle, to.position);

        let outgoing = segment.point_at(0.0).tangent;
        if let Some(incoming) = previous_tangent {
            profile.min_sin = profile.min_sin.min(corner_sin(incoming, outgoing));
        }
        previous_tangent = Some(segment.point_at(1.0).tangent);
        profile.push(segment);
    }
    profile
}

/// Half-angle sine between the reversed incoming and the outgoing direction
fn corner_sin(incoming: Vector2, outgoing: Vector2) -> f64 {
    let between = (-incoming).dot(outgoing).clamp(-1.0, 1.0).acos();
    (between / 2.0).sin()
}
