//! Node handles and property accessors
//!
//! [`NodeRef`] borrows a scene and names one node. Property accessors are
//! small `Copy` values that resolve the node's signals on every call, so a
//! handle to a disposed node reports [`SceneError::NodeNotFound`] instead of
//! touching freed signals.
//!
//! [`SceneError::NodeNotFound`]: crate::SceneError::NodeNotFound

use motif_animation::{CompoundTarget, Interpolate, Tween};
use motif_core::{
    Brush, CompoundSignal, LineCap, LineJoin, Matrix, Path, Rect, Signal, SignalValue, Vector2,
    EPSILON,
};
use motif_paint::RoughConfig;

use crate::error::SceneResult;
use crate::geometry::Geometry;
use crate::node::{NodeProps, NodeSignals};
use crate::origin::{Origin, OriginProjection};
use crate::scene::{NodeId, Scene};
use crate::transform::{PositionProjection, RotationProjection, ScaleProjection, TransformSignal};

/// A node in a scene
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    scene: &'a Scene,
    id: NodeId,
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NodeRef").field(&self.id).finish()
    }
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(scene: &'a Scene, id: NodeId) -> Self {
        Self { scene, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn exists(&self) -> bool {
        self.scene.contains(self.id)
    }

    pub(crate) fn signals(&self) -> SceneResult<NodeSignals> {
        self.scene.signals(self.id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Hierarchy
    // ─────────────────────────────────────────────────────────────────────

    pub fn parent(&self) -> SceneResult<Option<NodeId>> {
        self.scene.parent(self.id)
    }

    pub fn children(&self) -> SceneResult<Vec<NodeId>> {
        self.scene.children(self.id)
    }

    /// Append `child` to this node
    pub fn add(self, child: NodeId) -> SceneResult<Self> {
        self.scene.add_child(self.id, child)?;
        Ok(self)
    }

    /// Create a child node and return it
    pub fn spawn(&self, props: NodeProps) -> SceneResult<NodeRef<'a>> {
        let id = self.scene.spawn(self.id, props)?;
        Ok(NodeRef::new(self.scene, id))
    }

    pub fn remove(&self) -> SceneResult<()> {
        self.scene.remove(self.id)
    }

    pub fn dispose(&self) -> SceneResult<()> {
        self.scene.dispose(self.id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transforms
    // ─────────────────────────────────────────────────────────────────────

    pub fn position(&self) -> TransformSignal<'a, PositionProjection> {
        TransformSignal::new(*self, PositionProjection)
    }

    pub fn scale(&self) -> TransformSignal<'a, ScaleProjection> {
        TransformSignal::new(*self, ScaleProjection)
    }

    /// Rotation in degrees
    pub fn rotation(&self) -> TransformSignal<'a, RotationProjection> {
        TransformSignal::new(*self, RotationProjection)
    }

    /// A point on the node's box, in parent space
    pub fn origin(&self, origin: Origin) -> TransformSignal<'a, OriginProjection> {
        TransformSignal::new(*self, OriginProjection(origin))
    }

    pub fn middle(&self) -> TransformSignal<'a, OriginProjection> {
        self.origin(Origin::Middle)
    }

    pub fn top(&self) -> TransformSignal<'a, OriginProjection> {
        self.origin(Origin::Top)
    }

    pub fn bottom(&self) -> TransformSignal<'a, OriginProjection> {
        self.origin(Origin::Bottom)
    }

    pub fn left(&self) -> TransformSignal<'a, OriginProjection> {
        self.origin(Origin::Left)
    }

    pub fn right(&self) -> TransformSignal<'a, OriginProjection> {
        self.origin(Origin::Right)
    }

    pub fn top_left(&self) -> TransformSignal<'a, OriginProjection> {
        self.origin(Origin::TopLeft)
    }

    pub fn top_right(&self) -> TransformSignal<'a, OriginProjection> {
        self.origin(Origin::TopRight)
    }

    pub fn bottom_left(&self) -> TransformSignal<'a, OriginProjection> {
        self.origin(Origin::BottomLeft)
    }

    pub fn bottom_right(&self) -> TransformSignal<'a, OriginProjection> {
        self.origin(Origin::BottomRight)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Matrices
    // ─────────────────────────────────────────────────────────────────────

    fn matrix(&self, select: fn(&NodeSignals) -> Signal<Matrix>) -> SceneResult<Matrix> {
        let signals = self.signals()?;
        Ok(self.scene.graph().get(select(&signals))?)
    }

    pub fn local_to_parent(&self) -> SceneResult<Matrix> {
        self.matrix(|s| s.local_to_parent)
    }

    pub fn parent_to_local(&self) -> SceneResult<Matrix> {
        self.matrix(|s| s.parent_to_local)
    }

    pub fn parent_to_world(&self) -> SceneResult<Matrix> {
        self.matrix(|s| s.parent_to_world)
    }

    pub fn local_to_world(&self) -> SceneResult<Matrix> {
        self.matrix(|s| s.local_to_world)
    }

    pub fn world_to_local(&self) -> SceneResult<Matrix> {
        self.matrix(|s| s.world_to_local)
    }

    pub fn world_to_parent(&self) -> SceneResult<Matrix> {
        self.matrix(|s| s.world_to_parent)
    }

    /// Maps local coordinates into the active view
    pub fn local_to_view(&self) -> SceneResult<Matrix> {
        Ok(self.scene.world_to_view()? * self.local_to_world()?)
    }

    pub fn view_to_local(&self) -> SceneResult<Matrix> {
        Ok(self.local_to_view()?.inverse_clamped(EPSILON))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Properties
    // ─────────────────────────────────────────────────────────────────────

    pub fn skew(&self) -> VectorProperty<'a> {
        VectorProperty::new(*self, |s| s.skew.clone())
    }

    pub fn size(&self) -> VectorProperty<'a> {
        VectorProperty::new(*self, |s| s.size.clone())
    }

    /// Alignment of the box around the origin, each axis in `-1..=1`
    pub fn offset(&self) -> VectorProperty<'a> {
        VectorProperty::new(*self, |s| s.offset.clone())
    }

    /// Clamped to `0..=1`
    pub fn opacity(&self) -> Property<'a, f64> {
        Property::new(*self, |s| s.opacity)
    }

    pub fn fill(&self) -> Property<'a, Option<Brush>> {
        Property::new(*self, |s| s.fill)
    }

    pub fn stroke(&self) -> Property<'a, Option<Brush>> {
        Property::new(*self, |s| s.stroke)
    }

    pub fn stroke_first(&self) -> Property<'a, bool> {
        Property::new(*self, |s| s.stroke_first)
    }

    pub fn line_width(&self) -> Property<'a, f64> {
        Property::new(*self, |s| s.line_width)
    }

    pub fn line_join(&self) -> Property<'a, LineJoin> {
        Property::new(*self, |s| s.line_join)
    }

    pub fn line_cap(&self) -> Property<'a, LineCap> {
        Property::new(*self, |s| s.line_cap)
    }

    pub fn line_dash(&self) -> Property<'a, Vec<f64>> {
        Property::new(*self, |s| s.line_dash)
    }

    pub fn dash_offset(&self) -> Property<'a, f64> {
        Property::new(*self, |s| s.dash_offset)
    }

    pub fn clip(&self) -> Property<'a, bool> {
        Property::new(*self, |s| s.clip)
    }

    pub fn rough(&self) -> Property<'a, bool> {
        Property::new(*self, |s| s.rough)
    }

    pub fn rough_config(&self) -> Property<'a, RoughConfig> {
        Property::new(*self, |s| s.rough_config)
    }

    /// Strength of the highlight ripple, `0` when idle
    pub fn ripple_strength(&self) -> Property<'a, f64> {
        Property::new(*self, |s| s.ripple_strength)
    }

    pub fn geometry(&self) -> Property<'a, Geometry> {
        Property::new(*self, |s| s.geometry)
    }

    /// The outline in local coordinates
    pub fn path(&self) -> SceneResult<Path> {
        let signals = self.signals()?;
        Ok(self.scene.graph().get(signals.path)?)
    }

    /// The outline as SVG path data
    pub fn path_data(&self) -> SceneResult<String> {
        let signals = self.signals()?;
        Ok(self.scene.graph().get(signals.path_data)?)
    }

    /// Local bounds of the outline including half the stroke
    pub fn cache_bbox(&self) -> SceneResult<Rect> {
        let signals = self.signals()?;
        Ok(self.scene.graph().get(signals.cache_bbox)?)
    }
}

// =========================================================================
// SCALAR PROPERTIES
// =========================================================================

/// A single-signal node property
pub struct Property<'a, T> {
    node: NodeRef<'a>,
    select: fn(&NodeSignals) -> Signal<T>,
}

impl<T> Clone for Property<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Property<'_, T> {}

impl<'a, T: Clone + 'static> Property<'a, T> {
    fn new(node: NodeRef<'a>, select: fn(&NodeSignals) -> Signal<T>) -> Self {
        Self { node, select }
    }

    /// The underlying signal, for use inside formulas
    pub fn signal(&self) -> SceneResult<Signal<T>> {
        Ok((self.select)(&self.node.signals()?))
    }

    pub fn get(&self) -> SceneResult<T> {
        Ok(self.node.scene.graph().get(self.signal()?)?)
    }

    /// Write a value or formula; returns the node for chaining
    pub fn set(&self, value: impl Into<SignalValue<T>>) -> SceneResult<NodeRef<'a>> {
        self.node.scene.graph().set(self.signal()?, value)?;
        Ok(self.node)
    }
}

impl<T: Interpolate + 'static> Property<'_, T> {
    pub fn animate(&self, target: T, duration: f64) -> SceneResult<Tween<T>> {
        Ok(Tween::signal(
            self.node.scene.shared_graph(),
            self.signal()?,
            target,
            duration,
        ))
    }
}

// =========================================================================
// VECTOR PROPERTIES
// =========================================================================

/// A two-component node property such as `size`
#[derive(Clone, Copy)]
pub struct VectorProperty<'a> {
    node: NodeRef<'a>,
    select: fn(&NodeSignals) -> CompoundSignal<Vector2>,
}

impl<'a> VectorProperty<'a> {
    fn new(node: NodeRef<'a>, select: fn(&NodeSignals) -> CompoundSignal<Vector2>) -> Self {
        Self { node, select }
    }

    pub fn signal(&self) -> SceneResult<CompoundSignal<Vector2>> {
        Ok((self.select)(&self.node.signals()?))
    }

    pub fn get(&self) -> SceneResult<Vector2> {
        Ok(self.signal()?.get(self.node.scene.graph())?)
    }

    pub fn set(&self, value: impl Into<SignalValue<Vector2>>) -> SceneResult<NodeRef<'a>> {
        self.signal()?.set(self.node.scene.graph(), value)?;
        Ok(self.node)
    }

    pub fn animate(&self, target: impl Into<Vector2>, duration: f64) -> SceneResult<Tween<Vector2>> {
        let sink = CompoundTarget::new(self.node.scene.shared_graph(), self.signal()?);
        Ok(Tween::new(sink, target.into(), duration))
    }

    pub fn x(&self) -> ComponentProperty<'a> {
        ComponentProperty {
            vector: *self,
            index: 0,
        }
    }

    pub fn y(&self) -> ComponentProperty<'a> {
        ComponentProperty {
            vector: *self,
            index: 1,
        }
    }
}

/// One axis of a [`VectorProperty`]
#[derive(Clone, Copy)]
pub struct ComponentProperty<'a> {
    vector: VectorProperty<'a>,
    index: usize,
}

impl<'a> ComponentProperty<'a> {
    pub fn signal(&self) -> SceneResult<Signal<f64>> {
        Ok(self.vector.signal()?.components()[self.index])
    }

    pub fn get(&self) -> SceneResult<f64> {
        Ok(self.vector.node.scene.graph().get(self.signal()?)?)
    }

    pub fn set(&self, value: impl Into<SignalValue<f64>>) -> SceneResult<NodeRef<'a>> {
        self.vector.node.scene.graph().set(self.signal()?, value)?;
        Ok(self.vector.node)
    }

    pub fn animate(&self, target: f64, duration: f64) -> SceneResult<Tween<f64>> {
        Ok(Tween::signal(
            self.vector.node.scene.shared_graph(),
            self.signal()?,
            target,
            duration,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use motif_core::{Color, ReactiveGraph};

    #[test]
    fn test_property_chaining() {
        let scene = Scene::default();
        let node = scene.node(scene.spawn(scene.root(), NodeProps::new()).unwrap());

        node.opacity()
            .set(0.5)
            .unwrap()
            .fill()
            .set(Some(Brush::Solid(Color::RED)))
            .unwrap()
            .line_width()
            .set(2.0)
            .unwrap();

        assert_eq!(node.opacity().get().unwrap(), 0.5);
        assert_eq!(node.fill().get().unwrap(), Some(Brush::Solid(Color::RED)));
        assert_eq!(node.line_width().get().unwrap(), 2.0);
    }

    #[test]
    fn test_property_formula() {
        let scene = Scene::default();
        let a = scene.node(scene.spawn(scene.root(), NodeProps::rect((10.0, 10.0))).unwrap());
        let b = scene.node(scene.spawn(scene.root(), NodeProps::new()).unwrap());

        let width = a.size().x().signal().unwrap();
        b.size()
            .set(SignalValue::formula(move |g: &ReactiveGraph| {
                let w = g.get(width)?;
                Ok(Vector2::new(w * 2.0, w))
            }))
            .unwrap();
        assert_eq!(b.size().get().unwrap(), Vector2::new(20.0, 10.0));

        a.size().x().set(3.0).unwrap();
        assert_eq!(b.size().get().unwrap(), Vector2::new(6.0, 3.0));
    }

    #[test]
    fn test_component_write_keeps_other_axis() {
        let scene = Scene::default();
        let node = scene.node(scene.spawn(scene.root(), NodeProps::new().size((4.0, 8.0))).unwrap());
        node.size().y().set(1.0).unwrap();
        assert_eq!(node.size().get().unwrap(), Vector2::new(4.0, 1.0));
    }

    #[test]
    fn test_stale_handle_reports_missing_node() {
        let scene = Scene::default();
        let id = scene.spawn(scene.root(), NodeProps::new()).unwrap();
        let node = scene.node(id);
        node.dispose().unwrap();

        assert!(!node.exists());
        assert!(matches!(node.opacity().get(), Err(SceneError::NodeNotFound(missing)) if missing == id));
        assert!(matches!(node.size().set((1.0, 1.0)), Err(SceneError::NodeNotFound(_))));
        assert!(matches!(node.local_to_world(), Err(SceneError::NodeNotFound(_))));
    }

    #[test]
    fn test_local_to_view_follows_view() {
        let scene = Scene::default();
        let camera = scene.spawn(scene.root(), NodeProps::new().position((100.0, 0.0))).unwrap();
        let node = scene.node(scene.spawn(scene.root(), NodeProps::new().position((150.0, 20.0))).unwrap());

        let origin = node.local_to_view().unwrap().transform_point(Vector2::ZERO);
        assert_eq!(origin, Vector2::new(150.0, 20.0));

        scene.set_view(camera).unwrap();
        let origin = node.local_to_view().unwrap().transform_point(Vector2::ZERO);
        assert!(origin.approx_eq(Vector2::new(50.0, 20.0), 1e-9));

        let back = node.view_to_local().unwrap().transform_point(origin);
        assert!(back.approx_eq(Vector2::ZERO, 1e-9));
    }

    #[test]
    fn test_spawn_and_add() {
        let scene = Scene::default();
        let root = scene.node(scene.root());
        let child = root.spawn(NodeProps::new()).unwrap();
        let loose = scene.create_node(NodeProps::new());

        child.add(loose).unwrap();
        assert_eq!(child.children().unwrap(), vec![loose]);
        assert_eq!(child.parent().unwrap(), Some(scene.root()));
    }
}
