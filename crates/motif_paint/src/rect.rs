//! Rounded rectangle outlines

use motif_core::{Rect, Vector2};
use serde::{Deserialize, Serialize};

use crate::path::PathSink;
use crate::path_data::PathDataBuilder;

/// Per-corner radii, clockwise from the top left
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CornerRadius {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_right: f64,
    pub bottom_left: f64,
}

impl CornerRadius {
    pub const ZERO: CornerRadius = CornerRadius::uniform(0.0);

    pub const fn uniform(radius: f64) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }

    pub const fn new(top_left: f64, top_right: f64, bottom_right: f64, bottom_left: f64) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.top_left == 0.0 && self.top_right == 0.0 && self.bottom_right == 0.0 && self.bottom_left == 0.0
    }

    /// Radii after shrinking corners that would overlap their neighbours
    pub fn fit(&self, rect: &Rect) -> CornerRadius {
        CornerRadius {
            top_left: adjust_radius(self.top_left, self.top_right, self.bottom_left, rect),
            top_right: adjust_radius(self.top_right, self.top_left, self.bottom_right, rect),
            bottom_right: adjust_radius(self.bottom_right, self.bottom_left, self.top_right, rect),
            bottom_left: adjust_radius(self.bottom_left, self.bottom_right, self.top_left, rect),
        }
    }

    pub fn lerp(&self, other: &CornerRadius, t: f64) -> CornerRadius {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        CornerRadius {
            top_left: mix(self.top_left, other.top_left),
            top_right: mix(self.top_right, other.top_right),
            bottom_right: mix(self.bottom_right, other.bottom_right),
            bottom_left: mix(self.bottom_left, other.bottom_left),
        }
    }
}

impl From<f64> for CornerRadius {
    fn from(radius: f64) -> Self {
        CornerRadius::uniform(radius)
    }
}

/// Shrink `radius` proportionally when it and its horizontal or vertical
/// neighbour don't fit along that edge
fn adjust_radius(radius: f64, horizontal: f64, vertical: f64, rect: &Rect) -> f64 {
    let radius = radius.max(0.0);
    let horizontal = horizontal.max(0.0);
    let vertical = vertical.max(0.0);
    let width = rect.width.abs();
    let height = rect.height.abs();

    let along_width = if radius + horizontal > width {
        width * (radius / (radius + horizontal))
    } else {
        radius
    };
    let along_height = if radius + vertical > height {
        height * (radius / (radius + vertical))
    } else {
        radius
    };
    along_width.min(along_height)
}

/// Trace a rectangle with rounded corners, clockwise from the top edge
///
/// Regular corners are quarter arcs. Smooth corners are cubic curves whose
/// handles are pulled towards the corner by `corner_sharpness` (`0` gives a
/// soft squircle-like bend, `1` a sharp corner).
pub fn rounded_rect(
    sink: &mut dyn PathSink,
    rect: &Rect,
    radius: CornerRadius,
    smooth_corners: bool,
    corner_sharpness: f64,
) {
    let r = radius.fit(rect);
    let (left, top, right, bottom) = (rect.left(), rect.top(), rect.right(), rect.bottom());
    let sharp = |r: f64| r - r * corner_sharpness;

    sink.move_to(Vector2::new(left + r.top_left, top));
    sink.line_to(Vector2::new(right - r.top_right, top));
    if smooth_corners {
        sink.cubic_to(
            Vector2::new(right - sharp(r.top_right), top),
            Vector2::new(right, top + sharp(r.top_right)),
            Vector2::new(right, top + r.top_right),
        );
    } else if r.top_right > 0.0 {
        sink.arc_to(
            Vector2::splat(r.top_right),
            0.0,
            false,
            true,
            Vector2::new(right, top + r.top_right),
        );
    }

    sink.line_to(Vector2::new(right, bottom - r.bottom_right));
    if smooth_corners {
        sink.cubic_to(
            Vector2::new(right, bottom - sharp(r.bottom_right)),
            Vector2::new(right - sharp(r.bottom_right), bottom),
            Vector2::new(right - r.bottom_right, bottom),
        );
    } else if r.bottom_right > 0.0 {
        sink.arc_to(
            Vector2::splat(r.bottom_right),
            0.0,
            false,
            true,
            Vector2::new(right - r.bottom_right, bottom),
        );
    }

    sink.line_to(Vector2::new(left + r.bottom_left, bottom));
    if smooth_corners {
        sink.cubic_to(
            Vector2::new(left + sharp(r.bottom_left), bottom),
            Vector2::new(left, bottom - sharp(r.bottom_left)),
            Vector2::new(left, bottom - r.bottom_left),
        );
    } else if r.bottom_left > 0.0 {
        sink.arc_to(
            Vector2::splat(r.bottom_left),
            0.0,
            false,
            true,
            Vector2::new(left, bottom - r.bottom_left),
        );
    }

    sink.line_to(Vector2::new(left, top + r.top_left));
    if smooth_corners {
        sink.cubic_to(
            Vector2::new(left, top + sharp(r.top_left)),
            Vector2::new(left + sharp(r.top_left), top),
            Vector2::new(left + r.top_left, top),
        );
    } else if r.top_left > 0.0 {
        sink.arc_to(
            Vector2::splat(r.top_left),
            0.0,
            false,
            true,
            Vector2::new(left + r.top_left, top),
        );
    }
    sink.close();
}

/// [`rounded_rect`] as SVG path data
pub fn rounded_rect_to_svg_path(
    rect: &Rect,
    radius: CornerRadius,
    smooth_corners: bool,
    corner_sharpness: f64,
) -> String {
    let mut builder = PathDataBuilder::new();
    rounded_rect(&mut builder, rect, radius, smooth_corners, corner_sharpness);
    builder.to_string()
}
