//! Drawing surface contract
//!
//! Scenes render through the [`DrawContext`] trait: a small immediate-mode
//! API with transform, clip and opacity stacks (standing in for canvas
//! save/restore) plus path fill and stroke. [`RecordingContext`] records the
//! calls as [`DrawCommand`]s, which is what tests and offline backends use.

use crate::color::Brush;
use crate::geometry::{Matrix, Rect, Vector2};

// ─────────────────────────────────────────────────────────────────────────────
// Stroke
// ─────────────────────────────────────────────────────────────────────────────

/// Line cap style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Line join style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Stroke configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    /// Line width
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    /// Miter limit (for Miter joins)
    pub miter_limit: f64,
    /// Dash pattern (empty for solid line)
    pub dash: Vec<f64>,
    pub dash_offset: f64,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 4.0,
            dash: Vec::new(),
            dash_offset: 0.0,
        }
    }
}

impl Stroke {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            ..Default::default()
        }
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    pub fn with_dash(mut self, pattern: Vec<f64>, offset: f64) -> Self {
        self.dash = pattern;
        self.dash_offset = offset;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Path
// ─────────────────────────────────────────────────────────────────────────────

/// Path command
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Vector2),
    LineTo(Vector2),
    QuadTo {
        control: Vector2,
        end: Vector2,
    },
    CubicTo {
        control1: Vector2,
        control2: Vector2,
        end: Vector2,
    },
    /// Elliptical arc with SVG semantics, `rotation` in degrees
    ArcTo {
        radii: Vector2,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        end: Vector2,
    },
    Close,
}

/// A vector path
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, point: impl Into<Vector2>) -> Self {
        self.commands.push(PathCommand::MoveTo(point.into()));
        self
    }

    pub fn line_to(mut self, point: impl Into<Vector2>) -> Self {
        self.commands.push(PathCommand::LineTo(point.into()));
        self
    }

    pub fn quad_to(mut self, control: impl Into<Vector2>, end: impl Into<Vector2>) -> Self {
        self.commands.push(PathCommand::QuadTo {
            control: control.into(),
            end: end.into(),
        });
        self
    }

    pub fn cubic_to(
        mut self,
        control1: impl Into<Vector2>,
        control2: impl Into<Vector2>,
        end: impl Into<Vector2>,
    ) -> Self {
        self.commands.push(PathCommand::CubicTo {
            control1: control1.into(),
            control2: control2.into(),
            end: end.into(),
        });
        self
    }

    pub fn close(mut self) -> Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// Axis-aligned rectangle
    pub fn rect(rect: Rect) -> Self {
        Path::new()
            .move_to((rect.left(), rect.top()))
            .line_to((rect.right(), rect.top()))
            .line_to((rect.right(), rect.bottom()))
            .line_to((rect.left(), rect.bottom()))
            .close()
    }

    /// Append a command in place
    pub fn push(&mut self, command: PathCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// End point of the last command, if any
    pub fn current_point(&self) -> Option<Vector2> {
        let mut start = None;
        let mut current = None;
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    start = Some(p);
                    current = Some(p);
                }
                PathCommand::LineTo(end)
                | PathCommand::QuadTo { end, .. }
                | PathCommand::CubicTo { end, .. }
                | PathCommand::ArcTo { end, .. } => current = Some(end),
                PathCommand::Close => current = start,
            }
        }
        current
    }

    /// Bounding box of the path. Curves contribute their control points;
    /// arcs contribute their end points and every axis extreme they sweep
    /// through.
    pub fn bounds(&self) -> Rect {
        let mut points: Vec<Vector2> = Vec::with_capacity(self.commands.len() * 2);
        let mut start = Vector2::ZERO;
        let mut current = Vector2::ZERO;
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    points.push(p);
                    start = p;
                    current = p;
                }
                PathCommand::LineTo(p) => {
                    points.push(p);
                    current = p;
                }
                PathCommand::QuadTo { control, end } => {
                    points.push(control);
                    points.push(end);
                    current = end;
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => {
                    points.push(control1);
                    points.push(control2);
                    points.push(end);
                    current = end;
                }
                PathCommand::ArcTo {
                    radii,
                    rotation,
                    large_arc,
                    sweep,
                    end,
                } => {
                    arc_extremes(current, radii, rotation, large_arc, sweep, end, &mut points);
                    points.push(end);
                    current = end;
                }
                PathCommand::Close => current = start,
            }
        }
        Rect::from_points(points)
    }
}

/// Push the points where an SVG arc from `from` to `end` reaches its
/// horizontal and vertical extremes.
///
/// Uses the endpoint-to-center conversion from the SVG implementation notes.
/// Degenerate arcs (zero radius or coincident ends) add nothing.
fn arc_extremes(
    from: Vector2,
    radii: Vector2,
    rotation: f64,
    large_arc: bool,
    sweep: bool,
    end: Vector2,
    points: &mut Vec<Vector2>,
) {
    use std::f64::consts::{PI, TAU};

    let (mut rx, mut ry) = (radii.x.abs(), radii.y.abs());
    if rx < 1e-12 || ry < 1e-12 || from.approx_eq(end, 1e-12) {
        return;
    }

    let (sin, cos) = rotation.to_radians().sin_cos();
    let half = (from - end) / 2.0;
    let x1 = cos * half.x + sin * half.y;
    let y1 = -sin * half.x + cos * half.y;

    // Radii too small to span the chord scale up uniformly
    let lambda = (x1 * x1) / (rx * rx) + (y1 * y1) / (ry * ry);
    if lambda > 1.0 {
        let factor = lambda.sqrt();
        rx *= factor;
        ry *= factor;
    }

    let numerator = rx * rx * ry * ry - rx * rx * y1 * y1 - ry * ry * x1 * x1;
    let denominator = rx * rx * y1 * y1 + ry * ry * x1 * x1;
    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let coefficient = sign * (numerator / denominator).max(0.0).sqrt();
    let cx1 = coefficient * rx * y1 / ry;
    let cy1 = -coefficient * ry * x1 / rx;

    let mid = (from + end) / 2.0;
    let center = Vector2::new(cos * cx1 - sin * cy1 + mid.x, sin * cx1 + cos * cy1 + mid.y);

    let theta1 = ((y1 - cy1) / ry).atan2((x1 - cx1) / rx);
    let theta2 = ((-y1 - cy1) / ry).atan2((-x1 - cx1) / rx);
    let mut delta = theta2 - theta1;
    if sweep && delta < 0.0 {
        delta += TAU;
    } else if !sweep && delta > 0.0 {
        delta -= TAU;
    }

    let point_at = |theta: f64| {
        let (s, c) = theta.sin_cos();
        center + Vector2::new(cos * rx * c - sin * ry * s, sin * rx * c + cos * ry * s)
    };
    let within = |theta: f64| {
        let offset = if delta >= 0.0 {
            (theta - theta1).rem_euclid(TAU)
        } else {
            (theta1 - theta).rem_euclid(TAU)
        };
        offset <= delta.abs()
    };

    let x_extreme = (-ry * sin).atan2(rx * cos);
    let y_extreme = (ry * cos).atan2(rx * sin);
    for theta in [x_extreme, x_extreme + PI, y_extreme, y_extreme + PI] {
        if within(theta) {
            points.push(point_at(theta));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Draw Context
// ─────────────────────────────────────────────────────────────────────────────

/// Immediate-mode 2D drawing surface
pub trait DrawContext {
    /// Compose `transform` onto the current transform
    fn push_transform(&mut self, transform: Matrix);

    fn pop_transform(&mut self);

    fn current_transform(&self) -> Matrix;

    /// Intersect the clip region with `path` (in the current transform)
    fn push_clip(&mut self, path: &Path);

    fn pop_clip(&mut self);

    /// Multiply the current opacity by `opacity`
    fn push_opacity(&mut self, opacity: f64);

    fn pop_opacity(&mut self);

    fn current_opacity(&self) -> f64;

    fn fill_path(&mut self, path: &Path, brush: &Brush);

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke, brush: &Brush);

    /// Size of the drawing surface in pixels
    fn viewport_size(&self) -> Vector2;
}

/// A recorded draw call
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    PushTransform(Matrix),
    PopTransform,
    PushClip(Path),
    PopClip,
    PushOpacity(f64),
    PopOpacity,
    FillPath {
        path: Path,
        brush: Brush,
        /// Accumulated transform at the time of the call
        transform: Matrix,
        /// Accumulated opacity at the time of the call
        opacity: f64,
    },
    StrokePath {
        path: Path,
        stroke: Stroke,
        brush: Brush,
        transform: Matrix,
        opacity: f64,
    },
}

/// A draw context that records commands for later execution
#[derive(Debug)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    transform_stack: Vec<Matrix>,
    opacity_stack: Vec<f64>,
    viewport: Vector2,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new(Vector2::ZERO)
    }
}

impl RecordingContext {
    pub fn new(viewport: Vector2) -> Self {
        Self {
            commands: Vec::new(),
            transform_stack: vec![Matrix::IDENTITY],
            opacity_stack: vec![1.0],
            viewport,
        }
    }

    /// Get the recorded commands
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Clear all recorded commands and reset the stacks
    pub fn clear(&mut self) {
        self.commands.clear();
        self.transform_stack = vec![Matrix::IDENTITY];
        self.opacity_stack = vec![1.0];
    }

    /// Only the fill and stroke commands, in order
    pub fn paint_commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| {
            matches!(c, DrawCommand::FillPath { .. } | DrawCommand::StrokePath { .. })
        })
    }
}

impl DrawContext for RecordingContext {
    fn push_transform(&mut self, transform: Matrix) {
        self.commands.push(DrawCommand::PushTransform(transform));
        let current = self.current_transform();
        self.transform_stack.push(current * transform);
    }

    fn pop_transform(&mut self) {
        self.commands.push(DrawCommand::PopTransform);
        if self.transform_stack.len() > 1 {
            self.transform_stack.pop();
        }
    }

    fn current_transform(&self) -> Matrix {
        self.transform_stack.last().copied().unwrap_or_default()
    }

    fn push_clip(&mut self, path: &Path) {
        self.commands.push(DrawCommand::PushClip(path.clone()));
    }

    fn pop_clip(&mut self) {
        self.commands.push(DrawCommand::PopClip);
    }

    fn push_opacity(&mut self, opacity: f64) {
        self.commands.push(DrawCommand::PushOpacity(opacity));
        let current = self.current_opacity();
        self.opacity_stack.push(current * opacity);
    }

    fn pop_opacity(&mut self) {
        self.commands.push(DrawCommand::PopOpacity);
        if self.opacity_stack.len() > 1 {
            self.opacity_stack.pop();
        }
    }

    fn current_opacity(&self) -> f64 {
        self.opacity_stack.last().copied().unwrap_or(1.0)
    }

    fn fill_path(&mut self, path: &Path, brush: &Brush) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            brush: brush.clone(),
            transform: self.current_transform(),
            opacity: self.current_opacity(),
        });
    }

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke, brush: &Brush) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            stroke: stroke.clone(),
            brush: brush.clone(),
            transform: self.current_transform(),
            opacity: self.current_opacity(),
        });
    }

    fn viewport_size(&self) -> Vector2 {
        self.viewport
    }
}
