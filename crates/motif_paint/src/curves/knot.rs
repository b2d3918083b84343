use motif_core::Vector2;
use serde::{Deserialize, Serialize};

/// How much of each handle was derived automatically, `0` = manual, `1` = auto
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KnotAutoHandles {
    pub start: f64,
    pub end: f64,
}

/// A spline knot with absolute handle positions
///
/// `start_handle` shapes the curve arriving at the knot, `end_handle` the
/// curve leaving it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnotInfo {
    pub position: Vector2,
    pub start_handle: Vector2,
    pub end_handle: Vector2,
    pub auto: KnotAutoHandles,
}

impl KnotInfo {
    /// A sharp knot whose handles sit on the knot itself
    pub fn new(position: Vector2) -> Self {
        Self {
            position,
            start_handle: position,
            end_handle: position,
            auto: KnotAutoHandles::default(),
        }
    }

    /// A knot with mirrored handles, `handle` being the offset of the end handle
    pub fn mirrored(position: Vector2, handle: Vector2) -> Self {
        Self {
            position,
            start_handle: position - handle,
            end_handle: position + handle,
            auto: KnotAutoHandles::default(),
        }
    }
}

/// Knots with handles placed automatically along the neighbour direction
///
/// Each handle is as long as `smoothness` times the distance to the
/// neighbour it points at. Open ends use the knot itself as the missing
/// neighbour.
pub fn auto_knots(points: &[Vector2], smoothness: f64, closed: bool) -> Vec<KnotInfo> {
    let count = points.len();
    (0..count)
        .map(|i| {
            let position = points[i];
            let previous = if i > 0 {
                points[i - 1]
            } else if closed {
                points[count - 1]
            } else {
                position
            };
            let next = if i + 1 < count {
                points[i + 1]
            } else if closed {
                points[0]
            } else {
                position
            };

            let direction = (next - previous).normalized();
            KnotInfo {
                position,
                start_handle: position - direction * ((position - previous).magnitude() * smoothness),
                end_handle: position + direction * ((next - position).magnitude() * smoothness),
                auto: KnotAutoHandles { start: 1.0, end: 1.0 },
            }
        })
        .collect()
}
