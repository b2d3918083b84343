//! Path sinks
//!
//! [`PathSink`] is the minimal set of path verbs shapes and curve segments
//! draw into. The canvas-style helpers ([`PathSink::ellipse`],
//! [`PathSink::arc`] and [`PathSink::arc_through`]) are written once on top
//! of the SVG verbs, so every sink produces the same geometry.

use std::f64::consts::{PI, TAU};

use motif_core::{Path, PathCommand, Vector2};

/// Angles closer than this to 0 or π make a tangent arc degenerate
const ANGLE_EPSILON: f64 = 1e-4;

/// Something that accepts path verbs
pub trait PathSink {
    /// Whether no verb has been written yet
    fn is_empty(&self) -> bool;

    /// End point of the last verb
    fn current_point(&self) -> Option<Vector2>;

    fn move_to(&mut self, point: Vector2);

    fn line_to(&mut self, point: Vector2);

    fn quad_to(&mut self, control: Vector2, end: Vector2);

    fn cubic_to(&mut self, control1: Vector2, control2: Vector2, end: Vector2);

    /// SVG elliptical arc. `rotation` is in degrees.
    fn arc_to(&mut self, radii: Vector2, rotation: f64, large_arc: bool, sweep: bool, end: Vector2);

    fn close(&mut self);

    /// Canvas-style ellipse between two angles (radians)
    ///
    /// Connects to the start of the arc with a line, or moves there when the
    /// sink is empty. Full turns are split into two half arcs since a single
    /// SVG arc cannot describe a closed ellipse.
    fn ellipse(
        &mut self,
        center: Vector2,
        radii: Vector2,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
        counterclockwise: bool,
    ) {
        let mut diff = end_angle - start_angle;
        if counterclockwise && diff > 0.0 {
            diff -= TAU;
        } else if !counterclockwise && diff < 0.0 {
            diff += TAU;
        }

        let point_at = |angle: f64| center + (Vector2::from_radians(angle) * radii).rotate_radians(rotation);
        let start = point_at(start_angle);
        let end = point_at(end_angle);

        if self.is_empty() {
            self.move_to(start);
        } else {
            self.line_to(start);
        }

        let sweep = !counterclockwise;
        let rotation_deg = rotation.to_degrees();
        if (diff.abs() - TAU).abs() < 1e-3 {
            let middle = point_at(start_angle + diff / 2.0);
            self.arc_to(radii, rotation_deg, false, sweep, middle);
            self.arc_to(radii, rotation_deg, false, sweep, end);
        } else {
            self.arc_to(radii, rotation_deg, diff.abs() > PI, sweep, end);
        }
    }

    /// Canvas-style circular arc between two angles (radians)
    fn arc(&mut self, center: Vector2, radius: f64, start_angle: f64, end_angle: f64, counterclockwise: bool) {
        self.ellipse(
            center,
            Vector2::splat(radius),
            0.0,
            start_angle,
            end_angle,
            counterclockwise,
        );
    }

    /// Canvas `arcTo`: a line from the current point towards `corner`, then
    /// an arc of `radius` tangent to both `current → corner` and
    /// `corner → end`.
    fn arc_through(&mut self, corner: Vector2, end: Vector2, radius: f64) {
        let Some(current) = self.current_point() else {
            self.move_to(corner);
            return;
        };

        let v1 = current - corner;
        let v2 = end - corner;
        if v1.magnitude() == 0.0 || v2.magnitude() == 0.0 {
            self.line_to(corner);
            return;
        }

        let v1n = v1.normalized();
        let v2n = v2.normalized();
        let angle = v1n.dot(v2n).clamp(-1.0, 1.0).acos();
        if angle.abs() < ANGLE_EPSILON || (angle - PI).abs() < ANGLE_EPSILON {
            self.line_to(corner);
            return;
        }

        let tangent_length = radius / (angle / 2.0).tan();
        let t1 = corner + v1n * tangent_length;
        let t2 = corner + v2n * tangent_length;
        self.line_to(t1);

        let bisector = (v1n + v2n).normalized();
        let center = corner + bisector * (radius / (angle / 2.0).sin());
        let start_angle = (t1 - center).radians();
        let end_angle = (t2 - center).radians();

        let counterclockwise = v1n.cross(v2n) > 0.0;
        let mut diff = end_angle - start_angle;
        if counterclockwise && diff > 0.0 {
            diff -= TAU;
        } else if !counterclockwise && diff < 0.0 {
            diff += TAU;
        }

        self.arc_to(
            Vector2::splat(radius),
            0.0,
            diff.abs() > PI,
            !counterclockwise,
            t2,
        );
    }
}

impl PathSink for Path {
    fn is_empty(&self) -> bool {
        Path::is_empty(self)
    }

    fn current_point(&self) -> Option<Vector2> {
        Path::current_point(self)
    }

    fn move_to(&mut self, point: Vector2) {
        self.push(PathCommand::MoveTo(point));
    }

    fn line_to(&mut self, point: Vector2) {
        self.push(PathCommand::LineTo(point));
    }

    fn quad_to(&mut self, control: Vector2, end: Vector2) {
        self.push(PathCommand::QuadTo { control, end });
    }

    fn cubic_to(&mut self, control1: Vector2, control2: Vector2, end: Vector2) {
        self.push(PathCommand::CubicTo {
            control1,
            control2,
            end,
        });
    }

    fn arc_to(&mut self, radii: Vector2, rotation: f64, large_arc: bool, sweep: bool, end: Vector2) {
        self.push(PathCommand::ArcTo {
            radii,
            rotation,
            large_arc,
            sweep,
            end,
        });
    }

    fn close(&mut self) {
        self.push(PathCommand::Close);
    }
}

/// Feed every command of `path` into `sink`
pub fn replay(path: &Path, sink: &mut dyn PathSink) {
    for command in path.commands() {
        match *command {
            PathCommand::MoveTo(point) => sink.move_to(point),
            PathCommand::LineTo(point) => sink.line_to(point),
            PathCommand::QuadTo { control, end } => sink.quad_to(control, end),
            PathCommand::CubicTo {
                control1,
                control2,
                end,
            } => sink.cubic_to(control1, control2, end),
            PathCommand::ArcTo {
                radii,
                rotation,
                large_arc,
                sweep,
                end,
            } => sink.arc_to(radii, rotation, large_arc, sweep, end),
            PathCommand::Close => sink.close(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arcs(path: &Path) -> Vec<PathCommand> {
        path.commands()
            .iter()
            .copied()
            .filter(|c| matches!(c, PathCommand::ArcTo { .. }))
            .collect()
    }

    #[test]
    fn test_full_circle_splits_in_two() {
        let mut path = Path::new();
        path.arc(Vector2::ZERO, 10.0, 0.0, TAU, false);

        assert!(matches!(path.commands()[0], PathCommand::MoveTo(p) if p.approx_eq(Vector2::new(10.0, 0.0), 1e-9)));
        let arcs = arcs(&path);
        assert_eq!(arcs.len(), 2);
        match arcs[0] {
            PathCommand::ArcTo { end, large_arc, sweep, .. } => {
                assert!(end.approx_eq(Vector2::new(-10.0, 0.0), 1e-9));
                assert!(!large_arc);
                assert!(sweep);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_partial_arc_flags() {
        let mut path = Path::new().move_to((0.0, 0.0));
        path.arc(Vector2::ZERO, 5.0, 0.0, PI * 1.5, false);
        assert!(matches!(path.commands()[1], PathCommand::LineTo(_)));
        match arcs(&path)[0] {
            PathCommand::ArcTo { large_arc, sweep, end, .. } => {
                assert!(large_arc);
                assert!(sweep);
                assert!(end.approx_eq(Vector2::new(0.0, -5.0), 1e-9));
            }
            _ => unreachable!(),
        }

        let mut ccw = Path::new();
        ccw.arc(Vector2::ZERO, 5.0, 0.0, PI / 2.0, true);
        match arcs(&ccw)[0] {
            PathCommand::ArcTo { large_arc, sweep, .. } => {
                // going the long way round
                assert!(large_arc);
                assert!(!sweep);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_arc_through_corner() {
        let mut path = Path::new().move_to((0.0, 0.0));
        path.arc_through(Vector2::new(10.0, 0.0), Vector2::new(10.0, 10.0), 2.0);

        assert!(matches!(path.commands()[1], PathCommand::LineTo(p) if p.approx_eq(Vector2::new(8.0, 0.0), 1e-9)));
        match path.commands()[2] {
            PathCommand::ArcTo { radii, end, sweep, large_arc, .. } => {
                assert_eq!(radii, Vector2::splat(2.0));
                assert!(end.approx_eq(Vector2::new(10.0, 2.0), 1e-9));
                assert!(sweep);
                assert!(!large_arc);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_arc_through_degenerate() {
        let mut empty = Path::new();
        empty.arc_through(Vector2::new(3.0, 4.0), Vector2::ZERO, 1.0);
        assert_eq!(empty.commands(), &[PathCommand::MoveTo(Vector2::new(3.0, 4.0))]);

        let mut straight = Path::new().move_to((0.0, 0.0));
        straight.arc_through(Vector2::new(5.0, 0.0), Vector2::new(10.0, 0.0), 1.0);
        assert_eq!(straight.commands()[1], PathCommand::LineTo(Vector2::new(5.0, 0.0)));
    }
}
