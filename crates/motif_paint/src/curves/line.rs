use motif_core::Vector2;

use super::{direction_or, CurvePoint, Segment};
use crate::path::PathSink;

/// Straight segment between two points
#[derive(Clone, Debug, PartialEq)]
pub struct LineSegment {
    points: [Vector2; 2],
    length: f64,
    tangent: Vector2,
}

impl LineSegment {
    pub fn new(from: Vector2, to: Vector2) -> Self {
        let vector = to - from;
        Self {
            points: [from, to],
            length: vector.magnitude(),
            tangent: direction_or(vector, Vector2::RIGHT),
        }
    }

    pub fn from(&self) -> Vector2 {
        self.points[0]
    }

    pub fn to(&self) -> Vector2 {
        self.points[1]
    }
}

impl Segment for LineSegment {
    fn points(&self) -> &[Vector2] {
        &self.points
    }

    fn arc_length(&self) -> f64 {
        self.length
    }

    fn point_at(&self, t: f64) -> CurvePoint {
        CurvePoint::new(self.from().lerp(self.to(), t), self.tangent)
    }

    fn draw(&self, sink: &mut dyn PathSink, start: f64, end: f64, move_first: bool) -> (CurvePoint, CurvePoint) {
        let from = self.point_at(start);
        let to = self.point_at(end);
        if move_first {
            sink.move_to(from.position);
        }
        sink.line_to(to.position);
        (from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_sampling() {
        let line = LineSegment::new(Vector2::ZERO, Vector2::new(10.0, 0.0));
        assert_eq!(line.arc_length(), 10.0);

        let mid = line.point_at(0.5);
        assert_eq!(mid.position, Vector2::new(5.0, 0.0));
        assert_eq!(mid.tangent, Vector2::RIGHT);
        assert_eq!(mid.normal, Vector2::new(0.0, 1.0));
    }

    #[test]
    fn test_line_svg() {
        let line = LineSegment::new(Vector2::ZERO, Vector2::new(10.0, 20.0));
        assert_eq!(line.to_svg_commands(0.0, 1.0, true), "M 0 0 L 10 20");
        assert_eq!(line.to_svg_commands(0.5, 1.0, false), "L 10 20");
        assert_eq!(line.to_svg_commands(0.0, 0.5, true), "M 0 0 L 5 10");
    }

    #[test]
    fn test_degenerate_line_has_tangent() {
        let line = LineSegment::new(Vector2::ONE, Vector2::ONE);
        assert_eq!(line.arc_length(), 0.0);
        assert_eq!(line.point_at(0.3).tangent, Vector2::RIGHT);
    }
}
