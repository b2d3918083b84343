//! Layout origins
//!
//! An [`Origin`] names a point on a node's box, such as its top edge or
//! bottom-right corner. Reading it gives that point in the parent's
//! coordinates. Writing it moves the node so the point lands where asked,
//! leaving size, rotation and scale alone.

use std::rc::Rc;

use motif_core::{Matrix, ReactiveGraph, SignalError, SignalValue, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::SceneResult;
use crate::scene::{NodeId, Scene};
use crate::transform::{PositionProjection, Projection, Space};

/// A point on the node box
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    #[default]
    Middle,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Origin {
    /// Position on the box, each axis in `-1..=1` with y pointing down
    pub fn to_offset(self) -> Vector2 {
        match self {
            Origin::Middle => Vector2::ZERO,
            Origin::Top => Vector2::TOP,
            Origin::Bottom => Vector2::BOTTOM,
            Origin::Left => Vector2::LEFT,
            Origin::Right => Vector2::RIGHT,
            Origin::TopLeft => Vector2::new(-1.0, -1.0),
            Origin::TopRight => Vector2::new(1.0, -1.0),
            Origin::BottomLeft => Vector2::new(-1.0, 1.0),
            Origin::BottomRight => Vector2::new(1.0, 1.0),
        }
    }

    /// The point diagonally across the box
    pub fn opposite(self) -> Origin {
        match self {
            Origin::Middle => Origin::Middle,
            Origin::Top => Origin::Bottom,
            Origin::Bottom => Origin::Top,
            Origin::Left => Origin::Right,
            Origin::Right => Origin::Left,
            Origin::TopLeft => Origin::BottomRight,
            Origin::TopRight => Origin::BottomLeft,
            Origin::BottomLeft => Origin::TopRight,
            Origin::BottomRight => Origin::TopLeft,
        }
    }
}

/// Offset from the node's origin to `origin`, in local coordinates
fn local_delta(scene: &Scene, id: NodeId, graph: &ReactiveGraph, origin: Origin) -> SceneResult<Vector2> {
    let signals = scene.signals(id)?;
    let size = signals.size.get(graph)?;
    let offset = signals.offset.get(graph)?;
    Ok(((origin.to_offset() - offset) * size / 2.0).finite_or_zero())
}

/// Position that puts `origin` at `point`, using the node's current size,
/// offset and linear transform
fn solve_position(scene: &Scene, id: NodeId, graph: &ReactiveGraph, origin: Origin, point: Vector2) -> SceneResult<Vector2> {
    let delta = local_delta(scene, id, graph, origin)?;
    let linear: Matrix = scene.signals(id)?.linear(graph)?;
    Ok(point - delta.transform(&linear))
}

/// Reads and writes an [`Origin`] point. The stored value is in parent
/// space, so every other space reuses the position projection.
#[derive(Clone, Copy, Debug)]
pub struct OriginProjection(pub Origin);

impl Projection for OriginProjection {
    type Value = Vector2;

    fn read_local(self, scene: &Scene, id: NodeId) -> SceneResult<Vector2> {
        let graph = scene.graph();
        let delta = local_delta(scene, id, graph, self.0)?;
        let local_to_parent = graph.get(scene.signals(id)?.local_to_parent)?;
        Ok(delta.transform_as_point(&local_to_parent))
    }

    fn write_local(self, scene: &Scene, id: NodeId, value: SignalValue<Vector2>) -> SceneResult<()> {
        let origin = self.0;
        let position = match value {
            SignalValue::Value(point) => SignalValue::Value(solve_position(scene, id, scene.graph(), origin, point)?),
            SignalValue::Formula(formula) => {
                let scene_ref = Rc::downgrade(&scene.inner);
                SignalValue::formula(move |graph: &ReactiveGraph| {
                    let point = formula(graph)?;
                    let inner = scene_ref
                        .upgrade()
                        .ok_or_else(|| SignalError::evaluation("the scene was dropped"))?;
                    Ok(solve_position(&Scene { inner }, id, graph, origin, point)?)
                })
            }
        };
        PositionProjection.write_local(scene, id, position)
    }

    fn to_space(self, scene: &Scene, id: NodeId, space: Space, local: Vector2) -> SceneResult<Vector2> {
        PositionProjection.to_space(scene, id, space, local)
    }

    fn from_space(self, scene: &Scene, id: NodeId, space: Space, value: Vector2) -> SceneResult<Vector2> {
        PositionProjection.from_space(scene, id, space, value)
    }
}
