//! Shape outlines for scene nodes
//!
//! A node's [`Geometry`] together with its size and offset determines its
//! path. Everything is built around the node's local origin: the box of a
//! node with size `s` and offset `o` spans `from_size_centered(s)` moved by
//! `-o * s / 2`.

use std::f64::consts::TAU;

use motif_core::{Path, Rect, Vector2};
use motif_paint::{auto_knots, polyline_profile, rounded_rect, spline_profile, CornerRadius, PathSink};
use serde::{Deserialize, Serialize};

/// The kind of outline a node draws
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Geometry {
    /// A container without an outline of its own
    #[default]
    None,
    /// The node box with optionally rounded corners
    Rect {
        radius: CornerRadius,
        smooth_corners: bool,
        corner_sharpness: f64,
    },
    /// An ellipse inscribed in the node box; angles in degrees
    Circle {
        start_angle: f64,
        end_angle: f64,
        /// Partial circles are closed through the center
        closed: bool,
        counterclockwise: bool,
    },
    /// Straight segments with rounded corners, trimmed to `start..end`
    Polyline {
        points: Vec<Vector2>,
        radius: f64,
        closed: bool,
        start: f64,
        end: f64,
    },
    /// A smooth curve through `points`, trimmed to `start..end`
    Spline {
        points: Vec<Vector2>,
        smoothness: f64,
        closed: bool,
        start: f64,
        end: f64,
    },
}

impl Geometry {
    pub fn rect() -> Self {
        Geometry::Rect {
            radius: CornerRadius::ZERO,
            smooth_corners: false,
            corner_sharpness: 0.6,
        }
    }

    pub fn rounded_rect(radius: impl Into<CornerRadius>) -> Self {
        Geometry::Rect {
            radius: radius.into(),
            smooth_corners: false,
            corner_sharpness: 0.6,
        }
    }

    pub fn circle() -> Self {
        Geometry::Circle {
            start_angle: 0.0,
            end_angle: 360.0,
            closed: false,
            counterclockwise: false,
        }
    }

    pub fn polyline(points: impl Into<Vec<Vector2>>) -> Self {
        Geometry::Polyline {
            points: points.into(),
            radius: 0.0,
            closed: false,
            start: 0.0,
            end: 1.0,
        }
    }

    pub fn spline(points: impl Into<Vec<Vector2>>) -> Self {
        Geometry::Spline {
            points: points.into(),
            smoothness: 0.4,
            closed: false,
            start: 0.0,
            end: 1.0,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Geometry::None)
    }

    /// The same outline grown by `amount`: rounded rectangles also grow
    /// their corner radii so the overlay keeps its shape.
    pub fn grown(&self, amount: f64) -> Geometry {
        match self {
            Geometry::Rect {
                radius,
                smooth_corners,
                corner_sharpness,
            } => Geometry::Rect {
                radius: CornerRadius::new(
                    radius.top_left + amount,
                    radius.top_right + amount,
                    radius.bottom_right + amount,
                    radius.bottom_left + amount,
                ),
                smooth_corners: *smooth_corners,
                corner_sharpness: *corner_sharpness,
            },
            other => other.clone(),
        }
    }

    /// Trace the outline into `sink`
    pub fn build(&self, sink: &mut dyn PathSink, size: Vector2, offset: Vector2) {
        let bounds = node_box(size, offset);
        match self {
            Geometry::None => {}
            Geometry::Rect {
                radius,
                smooth_corners,
                corner_sharpness,
            } => rounded_rect(sink, &bounds, *radius, *smooth_corners, *corner_sharpness),
            Geometry::Circle {
                start_angle,
                end_angle,
                closed,
                counterclockwise,
            } => {
                let center = bounds.center();
                let radii = Vector2::new(bounds.width.abs(), bounds.height.abs()) / 2.0;
                let start = start_angle.to_radians();
                let end = end_angle.to_radians();
                let full = (end - start).abs() >= TAU;
                if *closed && !full {
                    sink.move_to(center);
                }
                sink.ellipse(center, radii, 0.0, start, end, *counterclockwise);
                if *closed || full {
                    sink.close();
                }
            }
            Geometry::Polyline {
                points,
                radius,
                closed,
                start,
                end,
            } => {
                if points.len() < 2 {
                    return;
                }
                let profile = polyline_profile(points, *radius, *closed);
                profile.draw(sink, *start, *end);
                if *closed && *start <= 0.0 && *end >= 1.0 {
                    sink.close();
                }
            }
            Geometry::Spline {
                points,
                smoothness,
                closed,
                start,
                end,
            } => {
                if points.len() < 2 {
                    return;
                }
                let knots = auto_knots(points, *smoothness, *closed);
                let profile = spline_profile(&knots, *closed);
                profile.draw(sink, *start, *end);
                if *closed && *start <= 0.0 && *end >= 1.0 {
                    sink.close();
                }
            }
        }
    }

    pub fn to_path(&self, size: Vector2, offset: Vector2) -> Path {
        let mut path = Path::new();
        self.build(&mut path, size, offset);
        path
    }
}

/// The node box in local coordinates
pub fn node_box(size: Vector2, offset: Vector2) -> Rect {
    let size = size.finite_or_zero();
    Rect::from_size_centered(size).translate((-offset * size / 2.0).finite_or_zero())
}
