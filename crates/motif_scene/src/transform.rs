//! Coordinate-space aware transform signals
//!
//! Every node stores its position, scale and rotation in parent space. A
//! [`TransformSignal`] reads and writes those values through a [`Space`]:
//!
//! - [`Space::Local`]: the stored value
//! - [`Space::Absolute`]: scene (world) coordinates
//! - [`Space::View`]: relative to the active view node
//! - [`Space::Relative`]: relative to another node's absolute transform
//!
//! Each space is a [`Projection`] pair: `to_space` maps the stored value
//! out, `from_space` maps a value back in. Both read the live matrix
//! signals, so a value written in absolute space as a formula keeps
//! tracking the parent chain.
//!
//! ```rust
//! use motif_scene::{NodeProps, Scene};
//!
//! let scene = Scene::default();
//! let parent = scene.spawn(scene.root(), NodeProps::new().position((100.0, 100.0))).unwrap();
//! let child = scene.spawn(parent, NodeProps::new().position((50.0, 50.0))).unwrap();
//!
//! let child = scene.node(child);
//! assert_eq!(child.position().abs().get().unwrap().x, 150.0);
//!
//! child.position().relative_to(parent).set((10.0, 10.0)).unwrap();
//! assert_eq!(child.position().get().unwrap().x, 10.0);
//! ```

use std::rc::Rc;

use motif_animation::{AnimationResult, Interpolate, Tween, TweenTarget};
use motif_core::{Matrix, ReactiveGraph, Signal, SignalError, SignalValue, Vector2, EPSILON};

use crate::error::SceneResult;
use crate::handle::NodeRef;
use crate::scene::{NodeId, Scene};

/// The coordinate system a transform value is expressed in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Space {
    #[default]
    Local,
    Absolute,
    View,
    /// Relative to a node's absolute transform. `None` or a disposed node
    /// behaves like the scene origin.
    Relative(Option<NodeId>),
}

// =========================================================================
// PROJECTIONS
// =========================================================================

/// Maps one stored node value in and out of every [`Space`]
pub trait Projection: Copy + 'static {
    type Value: Interpolate + 'static;

    fn read_local(self, scene: &Scene, id: NodeId) -> SceneResult<Self::Value>;

    fn write_local(self, scene: &Scene, id: NodeId, value: SignalValue<Self::Value>) -> SceneResult<()>;

    /// Stored value → `space`
    fn to_space(self, scene: &Scene, id: NodeId, space: Space, local: Self::Value) -> SceneResult<Self::Value>;

    /// `space` → stored value
    fn from_space(self, scene: &Scene, id: NodeId, space: Space, value: Self::Value) -> SceneResult<Self::Value>;

    /// The signal behind one stored component, if components are stored
    /// separately
    fn local_component(self, _scene: &Scene, _id: NodeId, _index: usize) -> SceneResult<Option<Signal<f64>>> {
        Ok(None)
    }
}

fn parent_to_world(scene: &Scene, id: NodeId) -> SceneResult<Matrix> {
    let signals = scene.signals(id)?;
    Ok(scene.graph().get(signals.parent_to_world)?)
}

fn world_to_parent(scene: &Scene, id: NodeId) -> SceneResult<Matrix> {
    let signals = scene.signals(id)?;
    Ok(scene.graph().get(signals.world_to_parent)?)
}

pub(crate) fn absolute_position(scene: &Scene, node: Option<NodeId>) -> SceneResult<Vector2> {
    Ok(scene.world_matrix(node)?.offset())
}

pub(crate) fn absolute_scale(scene: &Scene, node: Option<NodeId>) -> SceneResult<Vector2> {
    Ok(scene.world_matrix(node)?.scale_magnitudes())
}

pub(crate) fn absolute_rotation(scene: &Scene, node: Option<NodeId>) -> SceneResult<f64> {
    Ok(scene.world_matrix(node)?.rotation_degrees())
}

/// Position of the node's origin
#[derive(Clone, Copy, Debug, Default)]
pub struct PositionProjection;

impl Projection for PositionProjection {
    type Value = Vector2;

    fn read_local(self, scene: &Scene, id: NodeId) -> SceneResult<Vector2> {
        Ok(scene.signals(id)?.position.get(scene.graph())?)
    }

    fn write_local(self, scene: &Scene, id: NodeId, value: SignalValue<Vector2>) -> SceneResult<()> {
        scene.signals(id)?.position.set(scene.graph(), value)?;
        Ok(())
    }

    fn to_space(self, scene: &Scene, id: NodeId, space: Space, local: Vector2) -> SceneResult<Vector2> {
        match space {
            Space::Local => Ok(local),
            Space::Absolute => Ok(local.transform_as_point(&parent_to_world(scene, id)?)),
            Space::View => {
                let world = self.to_space(scene, id, Space::Absolute, local)?;
                Ok(world.transform_as_point(&scene.world_to_view()?))
            }
            Space::Relative(node) => {
                let world = self.to_space(scene, id, Space::Absolute, local)?;
                Ok(world - absolute_position(scene, node)?)
            }
        }
    }

    fn from_space(self, scene: &Scene, id: NodeId, space: Space, value: Vector2) -> SceneResult<Vector2> {
        match space {
            Space::Local => Ok(value),
            Space::Absolute => Ok(value.transform_as_point(&world_to_parent(scene, id)?)),
            Space::View => {
                let world = value.transform_as_point(&scene.world_matrix(Some(scene.view()))?);
                self.from_space(scene, id, Space::Absolute, world)
            }
            Space::Relative(node) => {
                let world = absolute_position(scene, node)? + value;
                self.from_space(scene, id, Space::Absolute, world)
            }
        }
    }

    fn local_component(self, scene: &Scene, id: NodeId, index: usize) -> SceneResult<Option<Signal<f64>>> {
        Ok(scene.signals(id)?.position.components().get(index).copied())
    }
}

/// Scale factors along the node's own axes
#[derive(Clone, Copy, Debug, Default)]
pub struct ScaleProjection;

impl ScaleProjection {
    /// The node's linear transform with `scale` substituted
    fn linear(scene: &Scene, id: NodeId, scale: Vector2) -> SceneResult<Matrix> {
        let signals = scene.signals(id)?;
        let graph = scene.graph();
        Ok(Matrix::from_transform(
            Vector2::ZERO,
            graph.get(signals.rotation)?,
            scale,
            signals.skew.get(graph)?,
        ))
    }
}

impl Projection for ScaleProjection {
    type Value = Vector2;

    fn read_local(self, scene: &Scene, id: NodeId) -> SceneResult<Vector2> {
        Ok(scene.signals(id)?.scale.get(scene.graph())?)
    }

    fn write_local(self, scene: &Scene, id: NodeId, value: SignalValue<Vector2>) -> SceneResult<()> {
        scene.signals(id)?.scale.set(scene.graph(), value)?;
        Ok(())
    }

    fn to_space(self, scene: &Scene, id: NodeId, space: Space, local: Vector2) -> SceneResult<Vector2> {
        match space {
            Space::Local => Ok(local),
            Space::Absolute => {
                let world = parent_to_world(scene, id)? * Self::linear(scene, id, local)?;
                Ok(world.scale_magnitudes())
            }
            Space::View => {
                let view = scene.world_to_view()? * parent_to_world(scene, id)? * Self::linear(scene, id, local)?;
                Ok(view.scale_magnitudes())
            }
            Space::Relative(node) => {
                let world = self.to_space(scene, id, Space::Absolute, local)?;
                Ok(world.safe_div(absolute_scale(scene, node)?, EPSILON))
            }
        }
    }

    fn from_space(self, scene: &Scene, id: NodeId, space: Space, value: Vector2) -> SceneResult<Vector2> {
        match space {
            Space::Local => Ok(value),
            Space::Absolute => {
                let parent_scale = parent_to_world(scene, id)?.scale_magnitudes();
                Ok(value.safe_div(parent_scale, EPSILON))
            }
            Space::View => {
                let world = value * absolute_scale(scene, Some(scene.view()))?;
                self.from_space(scene, id, Space::Absolute, world)
            }
            Space::Relative(node) => {
                let world = value * absolute_scale(scene, node)?;
                self.from_space(scene, id, Space::Absolute, world)
            }
        }
    }

    fn local_component(self, scene: &Scene, id: NodeId, index: usize) -> SceneResult<Option<Signal<f64>>> {
        Ok(scene.signals(id)?.scale.components().get(index).copied())
    }
}

/// Rotation in degrees. Values outside the stored space are extracted with
/// `atan2` and land in `(-180, 180]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RotationProjection;

impl Projection for RotationProjection {
    type Value = f64;

    fn read_local(self, scene: &Scene, id: NodeId) -> SceneResult<f64> {
        let signals = scene.signals(id)?;
        Ok(scene.graph().get(signals.rotation)?)
    }

    fn write_local(self, scene: &Scene, id: NodeId, value: SignalValue<f64>) -> SceneResult<()> {
        let signals = scene.signals(id)?;
        scene.graph().set(signals.rotation, value)?;
        Ok(())
    }

    fn to_space(self, scene: &Scene, id: NodeId, space: Space, local: f64) -> SceneResult<f64> {
        match space {
            Space::Local => Ok(local),
            Space::Absolute => {
                let signals = scene.signals(id)?;
                let graph = scene.graph();
                let linear = Matrix::from_transform(
                    Vector2::ZERO,
                    local,
                    signals.scale.get(graph)?,
                    signals.skew.get(graph)?,
                );
                Ok((parent_to_world(scene, id)? * linear).rotation_degrees())
            }
            Space::View => {
                let world = self.to_space(scene, id, Space::Absolute, local)?;
                Ok(world - absolute_rotation(scene, Some(scene.view()))?)
            }
            Space::Relative(node) => {
                let world = self.to_space(scene, id, Space::Absolute, local)?;
                Ok(world - absolute_rotation(scene, node)?)
            }
        }
    }

    fn from_space(self, scene: &Scene, id: NodeId, space: Space, value: f64) -> SceneResult<f64> {
        match space {
            Space::Local => Ok(value),
            Space::Absolute => Ok(value - parent_to_world(scene, id)?.rotation_degrees()),
            Space::View => {
                let world = value + absolute_rotation(scene, Some(scene.view()))?;
                self.from_space(scene, id, Space::Absolute, world)
            }
            Space::Relative(node) => {
                let world = value + absolute_rotation(scene, node)?;
                self.from_space(scene, id, Space::Absolute, world)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Space-aware reads and writes
// ─────────────────────────────────────────────────────────────────────────────

fn read_in<P: Projection>(projection: P, scene: &Scene, id: NodeId, space: Space) -> SceneResult<P::Value> {
    let local = projection.read_local(scene, id)?;
    projection.to_space(scene, id, space, local)
}

fn write_in<P: Projection>(
    projection: P,
    scene: &Scene,
    id: NodeId,
    space: Space,
    value: SignalValue<P::Value>,
) -> SceneResult<()> {
    let local = match (space, value) {
        (Space::Local, value) => value,
        (space, SignalValue::Value(value)) => {
            SignalValue::Value(projection.from_space(scene, id, space, value)?)
        }
        (space, SignalValue::Formula(formula)) => {
            let scene_ref = Rc::downgrade(&scene.inner);
            SignalValue::formula(move |graph: &ReactiveGraph| {
                let value = formula(graph)?;
                let inner = scene_ref
                    .upgrade()
                    .ok_or_else(|| SignalError::evaluation("the scene was dropped"))?;
                Ok(projection.from_space(&Scene { inner }, id, space, value)?)
            })
        }
    };
    projection.write_local(scene, id, local)
}

fn write_component_in<P: Projection<Value = Vector2>>(
    projection: P,
    scene: &Scene,
    id: NodeId,
    space: Space,
    index: usize,
    value: SignalValue<f64>,
) -> SceneResult<()> {
    if space == Space::Local {
        if let Some(component) = projection.local_component(scene, id, index)? {
            scene.graph().set(component, value)?;
            return Ok(());
        }
    }
    let value = value.evaluate(scene.graph())?;
    let mut current = read_in(projection, scene, id, space)?;
    current[index] = value;
    write_in(projection, scene, id, space, SignalValue::Value(current))
}

// =========================================================================
// TRANSFORM SIGNAL
// =========================================================================

/// A node transform viewed through a [`Space`]
///
/// Accessors start in [`Space::Local`]; `abs()`, `view()` and
/// `relative_to()` return the same accessor in another space.
pub struct TransformSignal<'a, P> {
    node: NodeRef<'a>,
    projection: P,
    space: Space,
}

impl<P: Copy> Clone for TransformSignal<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Copy> Copy for TransformSignal<'_, P> {}

impl<'a, P: Projection> TransformSignal<'a, P> {
    pub(crate) fn new(node: NodeRef<'a>, projection: P) -> Self {
        Self {
            node,
            projection,
            space: Space::Local,
        }
    }

    pub fn space(&self) -> Space {
        self.space
    }

    pub fn in_space(mut self, space: Space) -> Self {
        self.space = space;
        self
    }

    pub fn local(self) -> Self {
        self.in_space(Space::Local)
    }

    pub fn abs(self) -> Self {
        self.in_space(Space::Absolute)
    }

    pub fn view(self) -> Self {
        self.in_space(Space::View)
    }

    /// Relative to `node`, resolved again on every access
    pub fn relative_to(self, node: impl Into<Option<NodeId>>) -> Self {
        self.in_space(Space::Relative(node.into()))
    }

    pub fn get(&self) -> SceneResult<P::Value> {
        read_in(self.projection, self.node.scene(), self.node.id(), self.space)
    }

    /// Write a value or formula in this space; returns the node for chaining
    ///
    /// Formulas stay lazy: the inverse projection runs every time the
    /// stored value is re-evaluated.
    pub fn set(&self, value: impl Into<SignalValue<P::Value>>) -> SceneResult<NodeRef<'a>> {
        write_in(
            self.projection,
            self.node.scene(),
            self.node.id(),
            self.space,
            value.into(),
        )?;
        Ok(self.node)
    }

    /// Tween towards `target`, interpolating in this space
    pub fn animate(&self, target: impl Into<P::Value>, duration: f64) -> SceneResult<Tween<P::Value>> {
        self.node.signals()?;
        let sink = ProjectionTarget {
            scene: self.node.scene().clone(),
            id: self.node.id(),
            projection: self.projection,
            space: self.space,
        };
        Ok(Tween::new(sink, target.into(), duration))
    }
}

impl<'a, P: Projection<Value = Vector2>> TransformSignal<'a, P> {
    pub fn x(&self) -> ComponentSignal<'a, P> {
        ComponentSignal {
            transform: *self,
            index: 0,
        }
    }

    pub fn y(&self) -> ComponentSignal<'a, P> {
        ComponentSignal {
            transform: *self,
            index: 1,
        }
    }
}

/// One axis of a vector [`TransformSignal`]
///
/// In local space the stored component signal is written directly, so a
/// formula bound to the other axis survives. In any other space the full
/// vector is read, one component replaced and the vector written back;
/// formulas are resolved at the time of the write.
pub struct ComponentSignal<'a, P> {
    transform: TransformSignal<'a, P>,
    index: usize,
}

impl<P: Copy> Clone for ComponentSignal<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Copy> Copy for ComponentSignal<'_, P> {}

impl<'a, P: Projection<Value = Vector2>> ComponentSignal<'a, P> {
    pub fn get(&self) -> SceneResult<f64> {
        Ok(self.transform.get()?[self.index])
    }

    pub fn set(&self, value: impl Into<SignalValue<f64>>) -> SceneResult<NodeRef<'a>> {
        let node = self.transform.node;
        write_component_in(
            self.transform.projection,
            node.scene(),
            node.id(),
            self.transform.space,
            self.index,
            value.into(),
        )?;
        Ok(node)
    }

    pub fn animate(&self, target: f64, duration: f64) -> SceneResult<Tween<f64>> {
        let node = self.transform.node;
        node.signals()?;
        let sink = ComponentTarget {
            scene: node.scene().clone(),
            id: node.id(),
            projection: self.transform.projection,
            space: self.transform.space,
            index: self.index,
        };
        Ok(Tween::new(sink, target, duration))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tween sinks
// ─────────────────────────────────────────────────────────────────────────────

struct ProjectionTarget<P> {
    scene: Scene,
    id: NodeId,
    projection: P,
    space: Space,
}

impl<P: Projection> TweenTarget<P::Value> for ProjectionTarget<P> {
    fn read(&mut self) -> AnimationResult<P::Value> {
        Ok(read_in(self.projection, &self.scene, self.id, self.space)?)
    }

    fn write(&mut self, value: P::Value) -> AnimationResult<()> {
        write_in(
            self.projection,
            &self.scene,
            self.id,
            self.space,
            SignalValue::Value(value),
        )?;
        Ok(())
    }
}

struct ComponentTarget<P> {
    scene: Scene,
    id: NodeId,
    projection: P,
    space: Space,
    index: usize,
}

impl<P: Projection<Value = Vector2>> TweenTarget<f64> for ComponentTarget<P> {
    fn read(&mut self) -> AnimationResult<f64> {
        Ok(read_in(self.projection, &self.scene, self.id, self.space)?[self.index])
    }

    fn write(&mut self, value: f64) -> AnimationResult<()> {
        write_component_in(
            self.projection,
            &self.scene,
            self.id,
            self.space,
            self.index,
            SignalValue::Value(value),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeProps;
    use motif_animation::{AnimationScheduler, Easing};

    const TOL: f64 = 1e-6;

    /// root → parent (moved, rotated, scaled) → child
    fn nested(scene: &Scene) -> (NodeId, NodeId) {
        let parent = scene
            .spawn(
                scene.root(),
                NodeProps::new().position((100.0, 50.0)).rotation(30.0).scale((2.0, 2.0)),
            )
            .unwrap();
        let child = scene
            .spawn(parent, NodeProps::new().position((10.0, -20.0)).rotation(15.0))
            .unwrap();
        (parent, child)
    }

    #[test]
    fn test_absolute_position_roundtrip() {
        let scene = Scene::default();
        let (_, child) = nested(&scene);
        let node = scene.node(child);

        let before = node.position().get().unwrap();
        let abs = node.position().abs().get().unwrap();
        node.position().abs().set(abs).unwrap();
        assert!(node.position().get().unwrap().approx_eq(before, TOL));
    }

    #[test]
    fn test_view_position_roundtrip() {
        let scene = Scene::default();
        let (parent, child) = nested(&scene);
        let camera = scene
            .spawn(scene.root(), NodeProps::new().position((-40.0, 25.0)).rotation(-60.0))
            .unwrap();
        scene.set_view(camera).unwrap();
        let node = scene.node(child);

        let before = node.position().get().unwrap();
        let in_view = node.position().view().get().unwrap();
        node.position().view().set(in_view).unwrap();
        assert!(node.position().get().unwrap().approx_eq(before, TOL));

        // The parent's view-space position matches the view matrix
        let expected = scene.node(parent).local_to_view().unwrap().offset();
        assert!(scene.node(parent).position().view().get().unwrap().approx_eq(expected, TOL));
    }

    #[test]
    fn test_absolute_position_matches_matrix() {
        let scene = Scene::default();
        let (_, child) = nested(&scene);
        let node = scene.node(child);
        let expected = node.local_to_world().unwrap().offset();
        assert!(node.position().abs().get().unwrap().approx_eq(expected, TOL));
    }

    #[test]
    fn test_relative_position() {
        let scene = Scene::default();
        let (parent, child) = nested(&scene);
        let node = scene.node(child);

        let relative = node.position().relative_to(parent).get().unwrap();
        let expected = node.position().abs().get().unwrap() - scene.node(parent).position().abs().get().unwrap();
        assert!(relative.approx_eq(expected, TOL));

        // None and disposed nodes behave like the scene origin
        let abs = node.position().abs().get().unwrap();
        assert!(node.position().relative_to(None).get().unwrap().approx_eq(abs, TOL));

        let gone = scene.create_node(NodeProps::new().position((5.0, 5.0)));
        scene.dispose(gone).unwrap();
        assert!(node.position().relative_to(gone).get().unwrap().approx_eq(abs, TOL));
    }

    #[test]
    fn test_abs_component_write() {
        let scene = Scene::default();
        let (_, child) = nested(&scene);
        let node = scene.node(child);

        let abs = node.position().abs().get().unwrap();
        node.position().abs().x().set(abs.x + 30.0).unwrap();

        let after = node.position().abs().get().unwrap();
        assert!((after.x - (abs.x + 30.0)).abs() < TOL);
        assert!((after.y - abs.y).abs() < TOL);
    }

    #[test]
    fn test_local_component_keeps_formula() {
        let scene = Scene::default();
        let driver = scene.node(scene.create_node(NodeProps::new()));
        let node = scene.node(scene.create_node(NodeProps::new()));

        let driver_x = scene.signals(driver.id()).unwrap().position.components()[0];
        node.position()
            .y()
            .set(SignalValue::formula(move |g: &ReactiveGraph| Ok(g.get(driver_x)? * 2.0)))
            .unwrap();
        node.position().x().set(7.0).unwrap();

        driver.position().x().set(4.0).unwrap();
        assert_eq!(node.position().get().unwrap(), Vector2::new(7.0, 8.0));
    }

    #[test]
    fn test_absolute_formula_tracks_parent() {
        let scene = Scene::default();
        let parent = scene.spawn(scene.root(), NodeProps::new().position((100.0, 0.0))).unwrap();
        let node = scene.node(scene.spawn(parent, NodeProps::new()).unwrap());

        node.position()
            .abs()
            .set(SignalValue::formula(|_: &ReactiveGraph| Ok(Vector2::new(10.0, 10.0))))
            .unwrap();
        assert!(node.position().get().unwrap().approx_eq(Vector2::new(-90.0, 10.0), TOL));

        scene.node(parent).position().set((50.0, 0.0)).unwrap();
        assert!(node.position().get().unwrap().approx_eq(Vector2::new(-40.0, 10.0), TOL));
        assert!(node.position().abs().get().unwrap().approx_eq(Vector2::new(10.0, 10.0), TOL));
    }

    #[test]
    fn test_scale_under_rotated_parent() {
        let scene = Scene::default();
        let parent = scene.spawn(scene.root(), NodeProps::new().rotation(90.0)).unwrap();
        let node = scene.node(scene.spawn(parent, NodeProps::new()).unwrap());
        assert!(node.scale().abs().get().unwrap().approx_eq(Vector2::ONE, TOL));
    }

    #[test]
    fn test_absolute_scale() {
        let scene = Scene::default();
        let parent = scene.spawn(scene.root(), NodeProps::new().scale((2.0, 4.0))).unwrap();
        let node = scene.node(scene.spawn(parent, NodeProps::new().scale((1.5, 0.5))).unwrap());

        assert!(node.scale().abs().get().unwrap().approx_eq(Vector2::new(3.0, 2.0), TOL));

        node.scale().abs().set((1.0, 1.0)).unwrap();
        assert!(node.scale().get().unwrap().approx_eq(Vector2::new(0.5, 0.25), TOL));

        let ratio = node.scale().relative_to(parent).get().unwrap();
        assert!(ratio.approx_eq(Vector2::new(0.5, 0.25), TOL));
    }

    #[test]
    fn test_zero_parent_scale_stays_finite() {
        let scene = Scene::default();
        let parent = scene.spawn(scene.root(), NodeProps::new().scale((0.0, 0.0))).unwrap();
        let node = scene.node(scene.spawn(parent, NodeProps::new()).unwrap());

        node.scale().abs().set((1.0, 1.0)).unwrap();
        assert!(node.scale().get().unwrap().is_finite());
        node.position().abs().set((5.0, 5.0)).unwrap();
        assert!(node.position().get().unwrap().is_finite());
    }

    #[test]
    fn test_absolute_rotation() {
        let scene = Scene::default();
        let parent = scene.spawn(scene.root(), NodeProps::new().rotation(30.0)).unwrap();
        let node = scene.node(scene.spawn(parent, NodeProps::new().rotation(45.0)).unwrap());

        assert!((node.rotation().abs().get().unwrap() - 75.0).abs() < TOL);

        node.rotation().abs().set(90.0).unwrap();
        assert!((node.rotation().get().unwrap() - 60.0).abs() < TOL);

        let relative = node.rotation().relative_to(parent).get().unwrap();
        assert!((relative - 60.0).abs() < TOL);
    }

    /// A camera turned 30 degrees and zoomed 2x, plus a node under a
    /// rotated, scaled parent
    fn behind_camera(scene: &Scene) -> (NodeId, NodeId) {
        let camera = scene
            .spawn(scene.root(), NodeProps::new().position((30.0, -10.0)).rotation(30.0).scale((2.0, 2.0)))
            .unwrap();
        scene.set_view(camera).unwrap();
        let parent = scene
            .spawn(scene.root(), NodeProps::new().position((-20.0, 40.0)).rotation(50.0).scale((3.0, 3.0)))
            .unwrap();
        let child = scene
            .spawn(parent, NodeProps::new().rotation(10.0).scale((1.5, 1.5)))
            .unwrap();
        (parent, child)
    }

    #[test]
    fn test_view_scale() {
        let scene = Scene::default();
        let (_, child) = behind_camera(&scene);
        let node = scene.node(child);

        // 3 * 1.5 in world, halved by the camera zoom
        assert!(node.scale().view().get().unwrap().approx_eq(Vector2::new(2.25, 2.25), TOL));

        let in_view = node.scale().view().get().unwrap();
        node.scale().view().set(in_view).unwrap();
        assert!(node.scale().get().unwrap().approx_eq(Vector2::new(1.5, 1.5), TOL));

        node.scale().view().set((1.0, 1.0)).unwrap();
        assert!(node.scale().get().unwrap().approx_eq(Vector2::splat(2.0 / 3.0), TOL));
    }

    #[test]
    fn test_view_scale_is_per_axis() {
        let scene = Scene::default();
        let camera = scene
            .spawn(scene.root(), NodeProps::new().rotation(30.0).scale((2.0, 2.0)))
            .unwrap();
        scene.set_view(camera).unwrap();
        let parent = scene
            .spawn(scene.root(), NodeProps::new().rotation(50.0).scale((3.0, 1.0)))
            .unwrap();
        let node = scene.node(scene.spawn(parent, NodeProps::new()).unwrap());

        assert!(node.scale().view().get().unwrap().approx_eq(Vector2::new(1.5, 0.5), TOL));
    }

    #[test]
    fn test_view_rotation() {
        let scene = Scene::default();
        let (_, child) = behind_camera(&scene);
        let node = scene.node(child);

        // 50 + 10 in world, minus the camera's 30
        assert!((node.rotation().view().get().unwrap() - 30.0).abs() < TOL);

        let in_view = node.rotation().view().get().unwrap();
        node.rotation().view().set(in_view).unwrap();
        assert!((node.rotation().get().unwrap() - 10.0).abs() < TOL);

        node.rotation().view().set(0.0).unwrap();
        assert!((node.rotation().get().unwrap() + 20.0).abs() < TOL);
        assert!(node.rotation().view().get().unwrap().abs() < TOL);
    }

    #[test]
    fn test_reads_are_stable() {
        let scene = Scene::default();
        let (_, child) = nested(&scene);
        let node = scene.node(child);
        let first = node.position().abs().get().unwrap();
        let second = node.position().abs().get().unwrap();
        assert_eq!(first.x.to_bits(), second.x.to_bits());
        assert_eq!(first.y.to_bits(), second.y.to_bits());
    }

    #[test]
    fn test_animate_in_absolute_space() {
        let scene = Scene::default();
        let parent = scene.spawn(scene.root(), NodeProps::new().position((100.0, 0.0))).unwrap();
        let node = scene.node(scene.spawn(parent, NodeProps::new()).unwrap());

        let mut scheduler = AnimationScheduler::new(10.0);
        scheduler.spawn(node.position().abs().animate((0.0, 0.0), 1.0).unwrap().easing(Easing::Linear));
        scheduler.tick().unwrap();
        scheduler.tick().unwrap();
        scheduler.tick().unwrap();
        assert!(node.position().abs().get().unwrap().approx_eq(Vector2::new(80.0, 0.0), TOL));

        scheduler.run_until_idle(100).unwrap();
        assert!(node.position().get().unwrap().approx_eq(Vector2::new(-100.0, 0.0), TOL));
    }

    #[test]
    fn test_animate_component() {
        let scene = Scene::default();
        let node = scene.node(scene.spawn(scene.root(), NodeProps::new().position((0.0, 5.0))).unwrap());

        let mut scheduler = AnimationScheduler::new(10.0);
        scheduler.spawn(node.position().abs().x().animate(10.0, 0.5).unwrap());
        scheduler.run_until_idle(100).unwrap();
        assert_eq!(node.position().get().unwrap(), Vector2::new(10.0, 5.0));
    }
}
