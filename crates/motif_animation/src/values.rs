//! Animatable value types
//!
//! Provides the [`Interpolate`] trait and implementations for the value
//! types scene signals hold.

use motif_core::{Brush, Color, Gradient, GradientStop, Vector2};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Interpolate between `self` and `other` by factor `t`.
    ///
    /// `t` is usually in `0.0..=1.0` but may overshoot with easing functions
    /// such as [`crate::Easing::OutBack`].
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

// ============================================================================
// Scalars and vectors
// ============================================================================

impl Interpolate for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Interpolate for Vector2 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Vector2::lerp(*self, *other, t)
    }
}

// ============================================================================
// Color Implementation
// ============================================================================

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Color::lerp(self, other, t as f32)
    }
}

// ============================================================================
// Brushes
// ============================================================================

/// Discrete values switch halfway through
fn switch<T: Clone>(from: &T, to: &T, t: f64) -> T {
    if t < 0.5 {
        from.clone()
    } else {
        to.clone()
    }
}

fn lerp_stops(from: &[GradientStop], to: &[GradientStop], t: f64) -> Option<Vec<GradientStop>> {
    if from.len() != to.len() {
        return None;
    }
    Some(
        from.iter()
            .zip(to)
            .map(|(a, b)| GradientStop {
                offset: a.offset + (b.offset - a.offset) * t as f32,
                color: Color::lerp(&a.color, &b.color, t as f32),
            })
            .collect(),
    )
}

/// Solid brushes blend their colors. Linear gradients with the same number
/// of stops blend geometry and stops. Anything else switches at `t = 0.5`.
impl Interpolate for Brush {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        match (self, other) {
            (Brush::Solid(a), Brush::Solid(b)) => Brush::Solid(a.lerp(b, t)),
            (
                Brush::Gradient(Gradient::Linear {
                    start: s1,
                    end: e1,
                    stops: stops1,
                }),
                Brush::Gradient(Gradient::Linear {
                    start: s2,
                    end: e2,
                    stops: stops2,
                }),
            ) => match lerp_stops(stops1, stops2, t) {
                Some(stops) => Brush::Gradient(Gradient::Linear {
                    start: Vector2::lerp(*s1, *s2, t),
                    end: Vector2::lerp(*e1, *e2, t),
                    stops,
                }),
                None => switch(self, other, t),
            },
            _ => switch(self, other, t),
        }
    }
}

/// A missing brush fades from or to the transparent version of the other
/// side when that side is solid.
impl Interpolate for Option<Brush> {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        match (self, other) {
            (Some(a), Some(b)) => Some(a.lerp(b, t)),
            (None, Some(Brush::Solid(b))) => {
                Some(Brush::Solid(b.with_alpha(0.0).lerp(b, t)))
            }
            (Some(Brush::Solid(a)), None) => {
                if t >= 1.0 {
                    None
                } else {
                    Some(Brush::Solid(a.lerp(&a.with_alpha(0.0), t)))
                }
            }
            _ => switch(self, other, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_and_vector_lerp() {
        assert_eq!(Interpolate::lerp(&0.0f64, &10.0, 0.25), 2.5);
        assert_eq!(
            Interpolate::lerp(&Vector2::ZERO, &Vector2::new(10.0, -10.0), 0.5),
            Vector2::new(5.0, -5.0)
        );
    }

    #[test]
    fn test_solid_brush_lerp() {
        let from = Brush::Solid(Color::BLACK);
        let to = Brush::Solid(Color::WHITE);
        assert_eq!(from.lerp(&to, 0.5), Brush::Solid(Color::rgb(0.5, 0.5, 0.5)));
    }

    #[test]
    fn test_mismatched_brushes_switch() {
        let from = Brush::Solid(Color::RED);
        let to = Brush::Gradient(Gradient::linear(
            Vector2::ZERO,
            Vector2::ONE,
            Color::RED,
            Color::BLUE,
        ));
        assert_eq!(from.lerp(&to, 0.49), from);
        assert_eq!(from.lerp(&to, 0.5), to);
    }

    #[test]
    fn test_optional_brush_fades() {
        let none: Option<Brush> = None;
        let red = Some(Brush::Solid(Color::RED));
        let half = none.lerp(&red, 0.5).and_then(|b| b.as_solid()).unwrap();
        assert_eq!(half.a, 0.5);
        assert_eq!(red.lerp(&none, 1.0), None);
    }
}
