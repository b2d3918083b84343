//! Motif Paint
//!
//! Shape geometry for the Motif scene graph:
//!
//! - **Path sinks**: [`PathSink`] with canvas-style arc helpers, implemented
//!   for [`motif_core::Path`] and [`PathDataBuilder`]
//! - **Curves**: line, circular arc and Bezier segments sampled by arc
//!   length, chained into a [`CurveProfile`]
//! - **Rounded rectangles**: neighbour-aware corner radii, regular or smooth
//! - **Rough inputs**: [`RoughConfig`] and the [`RoughRenderer`] seam
//!
//! # Example
//!
//! ```rust
//! use motif_core::Vector2;
//! use motif_paint::{polyline_profile, profile_to_svg_path_data};
//!
//! let profile = polyline_profile(
//!     &[Vector2::ZERO, Vector2::new(100.0, 0.0), Vector2::new(100.0, 100.0)],
//!     0.0,
//!     false,
//! );
//! assert_eq!(profile.arc_length, 200.0);
//! assert_eq!(profile_to_svg_path_data(&profile), "M 0 0 L 100 0 L 100 100");
//! ```

pub mod curves;
pub mod path;
pub mod path_data;
pub mod rect;
pub mod rough;

pub use curves::{
    auto_knots, polyline_profile, profile_to_svg_path_data, spline_profile, CircleSegment,
    CubicBezierSegment, CurveDrawingInfo, CurvePoint, CurveProfile, KnotAutoHandles, KnotInfo,
    LineSegment, QuadBezierSegment, Segment,
};
pub use path::{replay, PathSink};
pub use path_data::PathDataBuilder;
pub use rect::{rounded_rect, rounded_rect_to_svg_path, CornerRadius};
pub use rough::{RoughConfig, RoughFillStyle, RoughOptions, RoughRenderer};
