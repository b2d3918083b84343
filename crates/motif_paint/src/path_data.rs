//! SVG path data strings
//!
//! [`PathDataBuilder`] records path verbs as SVG path data (`"M 0 0 L 10 0
//! Z"`). Rough renderers consume shapes in this form.

use std::fmt;

use motif_core::{Path, Vector2};

use crate::path::{replay, PathSink};

/// Fluent builder for SVG path data
///
/// Commands are separated by single spaces and numbers use Rust's shortest
/// round-trip formatting, so `100.0` is written as `100`.
///
/// ```rust
/// use motif_paint::PathDataBuilder;
///
/// let mut builder = PathDataBuilder::new();
/// builder.move_to((0.0, 0.0)).line_to((100.0, 100.0)).close_path();
/// assert_eq!(builder.to_string(), "M 0 0 L 100 100 Z");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathDataBuilder {
    commands: Vec<String>,
    current: Option<Vector2>,
    subpath_start: Option<Vector2>,
}

impl PathDataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// SVG path data for an existing [`Path`]
    pub fn from_path(path: &Path) -> Self {
        let mut builder = Self::new();
        replay(path, &mut builder);
        builder
    }

    pub fn move_to(&mut self, point: impl Into<Vector2>) -> &mut Self {
        PathSink::move_to(self, point.into());
        self
    }

    pub fn line_to(&mut self, point: impl Into<Vector2>) -> &mut Self {
        PathSink::line_to(self, point.into());
        self
    }

    pub fn bezier_curve_to(
        &mut self,
        control1: impl Into<Vector2>,
        control2: impl Into<Vector2>,
        end: impl Into<Vector2>,
    ) -> &mut Self {
        PathSink::cubic_to(self, control1.into(), control2.into(), end.into());
        self
    }

    pub fn quadratic_curve_to(&mut self, control: impl Into<Vector2>, end: impl Into<Vector2>) -> &mut Self {
        PathSink::quad_to(self, control.into(), end.into());
        self
    }

    /// Canvas-style ellipse, see [`PathSink::ellipse`]
    #[allow(clippy::too_many_arguments)]
    pub fn ellipse(
        &mut self,
        center: impl Into<Vector2>,
        radii: impl Into<Vector2>,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
        counterclockwise: bool,
    ) -> &mut Self {
        PathSink::ellipse(
            self,
            center.into(),
            radii.into(),
            rotation,
            start_angle,
            end_angle,
            counterclockwise,
        );
        self
    }

    pub fn arc(
        &mut self,
        center: impl Into<Vector2>,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        counterclockwise: bool,
    ) -> &mut Self {
        PathSink::arc(self, center.into(), radius, start_angle, end_angle, counterclockwise);
        self
    }

    /// Canvas `arcTo`, see [`PathSink::arc_through`]
    pub fn arc_to(&mut self, corner: impl Into<Vector2>, end: impl Into<Vector2>, radius: f64) -> &mut Self {
        PathSink::arc_through(self, corner.into(), end.into(), radius);
        self
    }

    pub fn close_path(&mut self) -> &mut Self {
        PathSink::close(self);
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.commands.clear();
        self.current = None;
        self.subpath_start = None;
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn push(&mut self, command: String, end: Option<Vector2>) {
        self.commands.push(command);
        if end.is_some() {
            self.current = end;
        }
    }
}

impl PathSink for PathDataBuilder {
    fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn current_point(&self) -> Option<Vector2> {
        self.current
    }

    fn move_to(&mut self, point: Vector2) {
        self.subpath_start = Some(point);
        self.push(format!("M {} {}", point.x, point.y), Some(point));
    }

    fn line_to(&mut self, point: Vector2) {
        self.push(format!("L {} {}", point.x, point.y), Some(point));
    }

    fn quad_to(&mut self, control: Vector2, end: Vector2) {
        self.push(
            format!("Q {} {} {} {}", control.x, control.y, end.x, end.y),
            Some(end),
        );
    }

    fn cubic_to(&mut self, control1: Vector2, control2: Vector2, end: Vector2) {
        self.push(
            format!(
                "C {} {} {} {} {} {}",
                control1.x, control1.y, control2.x, control2.y, end.x, end.y
            ),
            Some(end),
        );
    }

    fn arc_to(&mut self, radii: Vector2, rotation: f64, large_arc: bool, sweep: bool, end: Vector2) {
        self.push(
            format!(
                "A {} {} {} {} {} {} {}",
                radii.x,
                radii.y,
                rotation,
                u8::from(large_arc),
                u8::from(sweep),
                end.x,
                end.y
            ),
            Some(end),
        );
    }

    fn close(&mut self) {
        let start = self.subpath_start;
        self.push("Z".to_string(), start);
    }
}

impl fmt::Display for PathDataBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.commands.join(" "))
    }
}
