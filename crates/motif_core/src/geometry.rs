//! 2D geometry primitives
//!
//! [`Vector2`] is used for points, sizes and directions alike. [`Matrix`] is a
//! 2D affine transform stored in the canvas order `[a, b, c, d, tx, ty]`:
//!
//! ```text
//! | a  c  tx |
//! | b  d  ty |
//! | 0  0  1  |
//! ```
//!
//! All angles taken by the public API are in degrees unless the method name
//! says otherwise.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Neg, Sub, SubAssign};

/// Smallest magnitude used when a geometric quantity ends up in a divisor.
pub const EPSILON: f64 = 1e-6;

/// Clamp the magnitude of `value` to at least `epsilon`, keeping its sign.
///
/// Zero and NaN clamp to `+epsilon`.
#[inline]
pub fn clamp_magnitude(value: f64, epsilon: f64) -> f64 {
    if value.abs() >= epsilon {
        value
    } else if value < 0.0 {
        -epsilon
    } else {
        epsilon
    }
}

/// Replace non-finite values with zero.
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Vector2
// ─────────────────────────────────────────────────────────────────────────────

/// An immutable pair of `f64` components
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };
    pub const ONE: Vector2 = Vector2 { x: 1.0, y: 1.0 };
    pub const LEFT: Vector2 = Vector2 { x: -1.0, y: 0.0 };
    pub const RIGHT: Vector2 = Vector2 { x: 1.0, y: 0.0 };
    pub const TOP: Vector2 = Vector2 { x: 0.0, y: -1.0 };
    pub const BOTTOM: Vector2 = Vector2 { x: 0.0, y: 1.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both components set to `value`
    #[inline]
    pub const fn splat(value: f64) -> Self {
        Self { x: value, y: value }
    }

    /// Unit vector pointing at `angle` radians
    pub fn from_radians(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    /// Unit vector pointing at `angle` degrees
    pub fn from_degrees(angle: f64) -> Self {
        Self::from_radians(angle.to_radians())
    }

    pub fn dot(self, other: Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product
    pub fn cross(self, other: Vector2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn squared_magnitude(self) -> f64 {
        self.dot(self)
    }

    pub fn magnitude(self) -> f64 {
        self.squared_magnitude().sqrt()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalized(self) -> Vector2 {
        let len = self.magnitude();
        if len > 0.0 && len.is_finite() {
            self / len
        } else {
            Vector2::ZERO
        }
    }

    pub fn scale(self, factor: f64) -> Vector2 {
        self * factor
    }

    /// Divide component-wise, clamping each divisor to at least `epsilon` in
    /// magnitude so the result is always finite.
    pub fn safe_div(self, divisor: Vector2, epsilon: f64) -> Vector2 {
        Vector2::new(
            self.x / clamp_magnitude(divisor.x, epsilon),
            self.y / clamp_magnitude(divisor.y, epsilon),
        )
    }

    /// Rotate around the origin by `angle` degrees
    pub fn rotate(self, angle: f64) -> Vector2 {
        self.rotate_radians(angle.to_radians())
    }

    pub fn rotate_radians(self, angle: f64) -> Vector2 {
        let (sin, cos) = angle.sin_cos();
        Vector2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Angle of the vector in radians, in `(-π, π]`
    pub fn radians(self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn degrees(self) -> f64 {
        self.radians().to_degrees()
    }

    /// The vector rotated by 90° counter-clockwise in a y-up system
    /// (clockwise on a y-down canvas).
    pub fn perpendicular(self) -> Vector2 {
        Vector2::new(-self.y, self.x)
    }

    pub fn flipped(self) -> Vector2 {
        -self
    }

    pub fn abs(self) -> Vector2 {
        Vector2::new(self.x.abs(), self.y.abs())
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Component-wise [`finite_or_zero`]
    pub fn finite_or_zero(self) -> Vector2 {
        Vector2::new(finite_or_zero(self.x), finite_or_zero(self.y))
    }

    pub fn lerp(self, to: Vector2, t: f64) -> Vector2 {
        Vector2::new(
            self.x + (to.x - self.x) * t,
            self.y + (to.y - self.y) * t,
        )
    }

    /// Transform as a point (translation applies)
    pub fn transform_as_point(self, matrix: &Matrix) -> Vector2 {
        matrix.transform_point(self)
    }

    /// Transform as a direction (translation ignored)
    pub fn transform(self, matrix: &Matrix) -> Vector2 {
        matrix.transform_vector(self)
    }

    /// Approximate equality with an absolute tolerance
    pub fn approx_eq(self, other: Vector2, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl Add for Vector2 {
    type Output = Vector2;
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        *self = *self + rhs;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Vector2) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;
    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

/// Component-wise multiplication
impl Mul<Vector2> for Vector2 {
    type Output = Vector2;
    fn mul(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Div<f64> for Vector2 {
    type Output = Vector2;
    fn div(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x / rhs, self.y / rhs)
    }
}

/// Component-wise division
impl Div<Vector2> for Vector2 {
    type Output = Vector2;
    fn div(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x / rhs.x, self.y / rhs.y)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;
    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl Index<usize> for Vector2 {
    type Output = f64;
    fn index(&self, index: usize) -> &f64 {
        match index {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Vector2 index out of range: {index}"),
        }
    }
}

impl IndexMut<usize> for Vector2 {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("Vector2 index out of range: {index}"),
        }
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Vector2::new(x, y)
    }
}

impl From<[f64; 2]> for Vector2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Vector2::new(x, y)
    }
}

impl From<f64> for Vector2 {
    fn from(value: f64) -> Self {
        Vector2::splat(value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Matrix
// ─────────────────────────────────────────────────────────────────────────────

/// 2D affine transform
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    /// `[a, b, c, d, tx, ty]`
    pub elements: [f64; 6],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        elements: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    pub const fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self {
            elements: [a, b, c, d, tx, ty],
        }
    }

    pub fn translation(offset: Vector2) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, offset.x, offset.y)
    }

    pub fn scale(factor: Vector2) -> Self {
        Self::new(factor.x, 0.0, 0.0, factor.y, 0.0, 0.0)
    }

    /// Rotation by `angle` degrees
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Skew by `angles` degrees along x then y
    pub fn skew(angles: Vector2) -> Self {
        Self::new(
            1.0,
            angles.y.to_radians().tan(),
            angles.x.to_radians().tan(),
            1.0,
            0.0,
            0.0,
        )
    }

    /// Compose a node transform: translate, rotate, scale, then skew.
    pub fn from_transform(position: Vector2, rotation: f64, scale: Vector2, skew: Vector2) -> Self {
        let mut matrix = Self::translation(position) * Self::rotation(rotation) * Self::scale(scale);
        if skew != Vector2::ZERO {
            matrix = matrix * Self::skew(Vector2::new(skew.x, 0.0)) * Self::skew(Vector2::new(0.0, skew.y));
        }
        matrix
    }

    #[inline]
    pub fn m11(&self) -> f64 {
        self.elements[0]
    }

    #[inline]
    pub fn m12(&self) -> f64 {
        self.elements[1]
    }

    #[inline]
    pub fn m21(&self) -> f64 {
        self.elements[2]
    }

    #[inline]
    pub fn m22(&self) -> f64 {
        self.elements[3]
    }

    /// Translation component
    pub fn offset(&self) -> Vector2 {
        Vector2::new(self.elements[4], self.elements[5])
    }

    /// Image of the local x basis vector
    pub fn x_axis(&self) -> Vector2 {
        Vector2::new(self.m11(), self.m12())
    }

    /// Image of the local y basis vector
    pub fn y_axis(&self) -> Vector2 {
        Vector2::new(self.m21(), self.m22())
    }

    pub fn determinant(&self) -> f64 {
        self.m11() * self.m22() - self.m12() * self.m21()
    }

    /// `self * other`: `other` is applied first.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        let [a1, b1, c1, d1, tx1, ty1] = self.elements;
        let [a2, b2, c2, d2, tx2, ty2] = other.elements;
        Matrix::new(
            a1 * a2 + c1 * b2,
            b1 * a2 + d1 * b2,
            a1 * c2 + c1 * d2,
            b1 * c2 + d1 * d2,
            a1 * tx2 + c1 * ty2 + tx1,
            b1 * tx2 + d1 * ty2 + ty1,
        )
    }

    /// Inverse transform, `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Matrix> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON || !det.is_finite() {
            return None;
        }
        Some(self.inverse_with_determinant(det))
    }

    /// Inverse transform that never produces non-finite values: the
    /// determinant magnitude is clamped to `epsilon`.
    pub fn inverse_clamped(&self, epsilon: f64) -> Matrix {
        let det = self.determinant();
        let det = if det.is_finite() {
            clamp_magnitude(det, epsilon)
        } else {
            epsilon
        };
        self.inverse_with_determinant(det)
    }

    fn inverse_with_determinant(&self, det: f64) -> Matrix {
        let [a, b, c, d, tx, ty] = self.elements;
        let inv = 1.0 / det;
        Matrix::new(
            d * inv,
            -b * inv,
            -c * inv,
            a * inv,
            (c * ty - d * tx) * inv,
            (b * tx - a * ty) * inv,
        )
    }

    pub fn transform_point(&self, point: Vector2) -> Vector2 {
        let [a, b, c, d, tx, ty] = self.elements;
        Vector2::new(a * point.x + c * point.y + tx, b * point.x + d * point.y + ty)
    }

    pub fn transform_vector(&self, vector: Vector2) -> Vector2 {
        let [a, b, c, d, _, _] = self.elements;
        Vector2::new(a * vector.x + c * vector.y, b * vector.x + d * vector.y)
    }

    /// Rotation of the x basis vector in degrees
    pub fn rotation_degrees(&self) -> f64 {
        self.m12().atan2(self.m11()).to_degrees()
    }

    /// Lengths of the transformed basis vectors
    pub fn scale_magnitudes(&self) -> Vector2 {
        Vector2::new(self.x_axis().magnitude(), self.y_axis().magnitude())
    }

    /// The same matrix with its translation removed
    pub fn without_translation(&self) -> Matrix {
        let [a, b, c, d, _, _] = self.elements;
        Matrix::new(a, b, c, d, 0.0, 0.0)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn approx_eq(&self, other: &Matrix, tolerance: f64) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl Mul for Matrix {
    type Output = Matrix;
    fn mul(self, rhs: Matrix) -> Matrix {
        self.multiply(&rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rect
// ─────────────────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of `size` centered on the origin
    pub fn from_size_centered(size: Vector2) -> Self {
        Self::new(-size.x / 2.0, -size.y / 2.0, size.x, size.y)
    }

    /// Smallest rectangle containing all `points`
    pub fn from_points(points: impl IntoIterator<Item = Vector2>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        let (mut min, mut max) = (first, first);
        for p in iter {
            min = Vector2::new(min.x.min(p.x), min.y.min(p.y));
            max = Vector2::new(max.x.max(p.x), max.y.max(p.y));
        }
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn position(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vector2 {
        Vector2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translate(&self, offset: Vector2) -> Rect {
        Rect::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Grow every edge outwards by `amount`
    pub fn expand(&self, amount: f64) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    pub fn contains(&self, point: Vector2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }
}
