use std::f64::consts::PI;

use motif_core::Vector2;

use super::{CurvePoint, Segment};
use crate::path::PathSink;
use crate::path_data::PathDataBuilder;

/// Arcs sweeping less than this are drawn as straight lines
const MIN_ARC_ANGLE: f64 = 1e-4;

/// Circular arc from one radial direction to another
///
/// `from` and `to` are unit vectors pointing from the center to the arc's
/// end points. The arc covers the smaller angle between them, clockwise
/// (in y-down screen space) unless `counter` is set.
#[derive(Clone, Debug, PartialEq)]
pub struct CircleSegment {
    center: Vector2,
    radius: f64,
    from: Vector2,
    to: Vector2,
    counter: bool,
    angle: f64,
    length: f64,
    points: [Vector2; 2],
}

impl CircleSegment {
    pub fn new(center: Vector2, radius: f64, from: Vector2, to: Vector2, counter: bool) -> Self {
        let angle = from.dot(to).clamp(-1.0, 1.0).acos();
        let corner = Vector2::splat(radius);
        Self {
            center,
            radius,
            from,
            to,
            counter,
            angle,
            length: (angle * radius).abs(),
            points: [center - corner, center + corner],
        }
    }

    pub fn center(&self) -> Vector2 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Swept angle in radians
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn is_counter(&self) -> bool {
        self.counter
    }

    fn direction(&self) -> f64 {
        if self.counter {
            -1.0
        } else {
            1.0
        }
    }

    fn angle_at(&self, t: f64) -> f64 {
        self.from.radians() + t * self.angle * self.direction()
    }
}

impl Segment for CircleSegment {
    fn points(&self) -> &[Vector2] {
        &self.points
    }

    fn arc_length(&self) -> f64 {
        self.length
    }

    fn point_at(&self, t: f64) -> CurvePoint {
        let radial = Vector2::from_radians(self.angle_at(t));
        CurvePoint::new(
            self.center + radial * self.radius,
            radial.perpendicular() * self.direction(),
        )
    }

    fn draw(&self, sink: &mut dyn PathSink, start: f64, end: f64, move_first: bool) -> (CurvePoint, CurvePoint) {
        let from = self.point_at(start);
        let to = self.point_at(end);
        if move_first {
            sink.move_to(from.position);
        }
        if self.angle.abs() > MIN_ARC_ANGLE {
            sink.arc(
                self.center,
                self.radius,
                self.angle_at(start),
                self.angle_at(end),
                self.counter,
            );
        } else {
            sink.line_to(to.position);
        }
        (from, to)
    }

    fn to_svg_commands(&self, start: f64, end: f64, move_first: bool) -> String {
        let from = self.point_at(start).position;
        let to = self.point_at(end).position;

        let mut builder = PathDataBuilder::new();
        if move_first {
            PathSink::move_to(&mut builder, from);
        }
        if self.angle.abs() > MIN_ARC_ANGLE {
            let covered = (end - start) * self.angle.abs();
            PathSink::arc_to(
                &mut builder,
                Vector2::splat(self.radius),
                0.0,
                covered > PI,
                !self.counter,
                to,
            );
        } else {
            PathSink::line_to(&mut builder, to);
        }
        builder.to_string()
    }
}
