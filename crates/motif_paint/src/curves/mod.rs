//! Curve segments and profiles
//!
//! A curve is an ordered list of [`Segment`]s. Every segment can be sampled
//! at an arc-length-normalized `t ∈ [0, 1]` and drawn partially, which is
//! what lets shapes animate their `start` and `end` along the outline.

mod bezier;
mod circle;
mod knot;
mod line;
mod profile;

use std::fmt;

use motif_core::Vector2;

use crate::path::PathSink;
use crate::path_data::PathDataBuilder;

pub use bezier::{CubicBezierSegment, QuadBezierSegment};
pub use circle::CircleSegment;
pub use knot::{auto_knots, KnotAutoHandles, KnotInfo};
pub use line::LineSegment;
pub use profile::{
    polyline_profile, profile_to_svg_path_data, spline_profile, CurveDrawingInfo, CurveProfile,
};

/// A sampled point on a curve
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CurvePoint {
    pub position: Vector2,
    /// Unit direction of travel
    pub tangent: Vector2,
    /// Tangent rotated by 90°, `(-tangent.y, tangent.x)`
    pub normal: Vector2,
}

impl CurvePoint {
    pub fn new(position: Vector2, tangent: Vector2) -> Self {
        Self {
            position,
            tangent,
            normal: tangent.perpendicular(),
        }
    }
}

/// One piece of a curve
pub trait Segment: fmt::Debug {
    /// Points spanning the segment's extent (control points or bounding corners)
    fn points(&self) -> &[Vector2];

    fn arc_length(&self) -> f64;

    /// Sample at the arc-length-normalized parameter `t`
    fn point_at(&self, t: f64) -> CurvePoint;

    /// Draw the part between `start` and `end` (both normalized) and return
    /// the curve points at either end. `move_first` starts a new subpath.
    fn draw(&self, sink: &mut dyn PathSink, start: f64, end: f64, move_first: bool) -> (CurvePoint, CurvePoint);

    /// SVG path data for the part between `start` and `end`
    fn to_svg_commands(&self, start: f64, end: f64, move_first: bool) -> String {
        let mut builder = PathDataBuilder::new();
        self.draw(&mut builder, start, end, move_first);
        builder.to_string()
    }
}

/// Unit direction of `vector`, or `fallback` when it has no length
pub(crate) fn direction_or(vector: Vector2, fallback: Vector2) -> Vector2 {
    if vector.magnitude() > motif_core::EPSILON {
        vector.normalized()
    } else {
        fallback
    }
}
