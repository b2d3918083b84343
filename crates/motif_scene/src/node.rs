//! Per-node signal storage
//!
//! Every property of a scene node is a signal in the scene's
//! [`ReactiveGraph`]. [`NodeSignals`] registers them all when the node is
//! created, including the computed matrices and the computed outline, so a
//! change anywhere up the parent chain invalidates exactly the dependents
//! that read it.

use std::rc::Weak;

use motif_core::{
    Brush, CompoundSignal, LineCap, LineJoin, Matrix, Path, ReactiveGraph, Rect, Signal,
    SignalId, SignalOptions, SignalValue, Vector2, EPSILON,
};
use motif_paint::{PathDataBuilder, RoughConfig};

use crate::geometry::Geometry;
use crate::scene::{NodeId, SceneInner};

// =========================================================================
// NODE PROPS
// =========================================================================

/// Initial property values for a new node
///
/// ```rust
/// use motif_core::{Brush, Color};
/// use motif_scene::{NodeProps, Scene};
///
/// let scene = Scene::default();
/// let id = scene.spawn(
///     scene.root(),
///     NodeProps::rect((100.0, 50.0))
///         .position((20.0, 0.0))
///         .fill(Brush::Solid(Color::RED)),
/// ).unwrap();
/// assert_eq!(scene.node(id).size().get().unwrap().x, 100.0);
/// ```
#[derive(Clone, Debug)]
pub struct NodeProps {
    pub position: SignalValue<Vector2>,
    pub rotation: SignalValue<f64>,
    pub scale: SignalValue<Vector2>,
    pub skew: SignalValue<Vector2>,
    pub size: SignalValue<Vector2>,
    pub offset: SignalValue<Vector2>,
    pub opacity: SignalValue<f64>,
    pub fill: SignalValue<Option<Brush>>,
    pub stroke: SignalValue<Option<Brush>>,
    pub stroke_first: SignalValue<bool>,
    pub line_width: SignalValue<f64>,
    pub line_join: SignalValue<LineJoin>,
    pub line_cap: SignalValue<LineCap>,
    pub line_dash: SignalValue<Vec<f64>>,
    pub dash_offset: SignalValue<f64>,
    pub clip: SignalValue<bool>,
    pub rough: SignalValue<bool>,
    /// Falls back to the scene config when unset
    pub rough_config: Option<SignalValue<RoughConfig>>,
    pub geometry: SignalValue<Geometry>,
}

impl Default for NodeProps {
    fn default() -> Self {
        Self {
            position: Vector2::ZERO.into(),
            rotation: 0.0.into(),
            scale: Vector2::ONE.into(),
            skew: Vector2::ZERO.into(),
            size: Vector2::ZERO.into(),
            offset: Vector2::ZERO.into(),
            opacity: 1.0.into(),
            fill: None.into(),
            stroke: None.into(),
            stroke_first: false.into(),
            line_width: 0.0.into(),
            line_join: LineJoin::Miter.into(),
            line_cap: LineCap::Butt.into(),
            line_dash: Vec::new().into(),
            dash_offset: 0.0.into(),
            clip: false.into(),
            rough: false.into(),
            rough_config: None,
            geometry: Geometry::None.into(),
        }
    }
}

impl NodeProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// A rectangle of the given size
    pub fn rect(size: impl Into<SignalValue<Vector2>>) -> Self {
        Self::new().size(size).geometry(Geometry::rect())
    }

    /// A circle (or ellipse) filling the given size
    pub fn circle(size: impl Into<SignalValue<Vector2>>) -> Self {
        Self::new().size(size).geometry(Geometry::circle())
    }

    pub fn polyline(points: impl Into<Vec<Vector2>>) -> Self {
        Self::new().geometry(Geometry::polyline(points))
    }

    pub fn spline(points: impl Into<Vec<Vector2>>) -> Self {
        Self::new().geometry(Geometry::spline(points))
    }

    pub fn position(mut self, value: impl Into<SignalValue<Vector2>>) -> Self {
        self.position = value.into();
        self
    }

    pub fn rotation(mut self, value: impl Into<SignalValue<f64>>) -> Self {
        self.rotation = value.into();
        self
    }

    pub fn scale(mut self, value: impl Into<SignalValue<Vector2>>) -> Self {
        self.scale = value.into();
        self
    }

    pub fn skew(mut self, value: impl Into<SignalValue<Vector2>>) -> Self {
        self.skew = value.into();
        self
    }

    pub fn size(mut self, value: impl Into<SignalValue<Vector2>>) -> Self {
        self.size = value.into();
        self
    }

    pub fn offset(mut self, value: impl Into<SignalValue<Vector2>>) -> Self {
        self.offset = value.into();
        self
    }

    pub fn opacity(mut self, value: impl Into<SignalValue<f64>>) -> Self {
        self.opacity = value.into();
        self
    }

    pub fn fill(mut self, brush: impl Into<Brush>) -> Self {
        self.fill = Some(brush.into()).into();
        self
    }

    pub fn stroke(mut self, brush: impl Into<Brush>) -> Self {
        self.stroke = Some(brush.into()).into();
        self
    }

    pub fn stroke_first(mut self, value: bool) -> Self {
        self.stroke_first = value.into();
        self
    }

    pub fn line_width(mut self, value: impl Into<SignalValue<f64>>) -> Self {
        self.line_width = value.into();
        self
    }

    pub fn line_join(mut self, value: LineJoin) -> Self {
        self.line_join = value.into();
        self
    }

    pub fn line_cap(mut self, value: LineCap) -> Self {
        self.line_cap = value.into();
        self
    }

    pub fn line_dash(mut self, pattern: Vec<f64>, offset: f64) -> Self {
        self.line_dash = pattern.into();
        self.dash_offset = offset.into();
        self
    }

    pub fn clip(mut self, value: bool) -> Self {
        self.clip = value.into();
        self
    }

    /// Draw with the hand-drawn style
    pub fn rough(mut self, config: RoughConfig) -> Self {
        self.rough = true.into();
        self.rough_config = Some(config.into());
        self
    }

    pub fn geometry(mut self, value: impl Into<SignalValue<Geometry>>) -> Self {
        self.geometry = value.into();
        self
    }
}

// =========================================================================
// NODE SIGNALS
// =========================================================================

/// Handles to every signal a node owns
#[derive(Clone, Debug)]
pub struct NodeSignals {
    // Transform
    pub position: CompoundSignal<Vector2>,
    pub rotation: Signal<f64>,
    pub scale: CompoundSignal<Vector2>,
    pub skew: CompoundSignal<Vector2>,
    pub size: CompoundSignal<Vector2>,
    pub offset: CompoundSignal<Vector2>,
    pub opacity: Signal<f64>,

    // Hierarchy
    pub parent: Signal<Option<NodeId>>,
    pub children: Signal<Vec<NodeId>>,

    // Matrices
    pub local_to_parent: Signal<Matrix>,
    pub parent_to_local: Signal<Matrix>,
    pub parent_to_world: Signal<Matrix>,
    pub local_to_world: Signal<Matrix>,
    pub world_to_local: Signal<Matrix>,
    pub world_to_parent: Signal<Matrix>,

    // Style
    pub fill: Signal<Option<Brush>>,
    pub stroke: Signal<Option<Brush>>,
    pub stroke_first: Signal<bool>,
    pub line_width: Signal<f64>,
    pub line_join: Signal<LineJoin>,
    pub line_cap: Signal<LineCap>,
    pub line_dash: Signal<Vec<f64>>,
    pub dash_offset: Signal<f64>,
    pub clip: Signal<bool>,
    pub rough: Signal<bool>,
    pub rough_config: Signal<RoughConfig>,
    pub ripple_strength: Signal<f64>,

    // Outline
    pub geometry: Signal<Geometry>,
    pub path: Signal<Path>,
    pub path_data: Signal<String>,
    pub cache_bbox: Signal<Rect>,
}

impl NodeSignals {
    /// Register the signals for a new, detached node
    pub(crate) fn new(
        graph: &ReactiveGraph,
        scene: Weak<SceneInner>,
        props: NodeProps,
        default_rough: &RoughConfig,
    ) -> Self {
        let position = CompoundSignal::new(graph, "position", props.position);
        let scale = CompoundSignal::new(graph, "scale", props.scale);
        let skew = CompoundSignal::new(graph, "skew", props.skew);
        let size = CompoundSignal::new(graph, "size", props.size);
        let offset = CompoundSignal::new(graph, "offset", props.offset);
        let rotation = graph.create_signal_with(props.rotation, SignalOptions::named("rotation"));
        let opacity = graph.create_signal_with(
            props.opacity,
            SignalOptions::named("opacity").parser(|value: f64| value.clamp(0.0, 1.0)),
        );

        let parent: Signal<Option<NodeId>> =
            graph.create_signal_with(SignalValue::Value(None), SignalOptions::named("parent"));
        let children: Signal<Vec<NodeId>> =
            graph.create_signal_with(SignalValue::Value(Vec::new()), SignalOptions::named("children"));

        let local_to_parent = graph.create_computed({
            let (position, scale, skew) = (position.clone(), scale.clone(), skew.clone());
            move |g: &ReactiveGraph| {
                Ok(Matrix::from_transform(
                    position.get(g)?,
                    g.get(rotation)?,
                    scale.get(g)?,
                    skew.get(g)?,
                ))
            }
        });
        let parent_to_local = graph.create_computed(move |g: &ReactiveGraph| {
            Ok(g.get(local_to_parent)?.inverse_clamped(EPSILON))
        });
        let parent_to_world = graph.create_computed(move |g: &ReactiveGraph| {
            let Some(parent) = g.get(parent)? else {
                return Ok(Matrix::IDENTITY);
            };
            let Some(scene) = scene.upgrade() else {
                return Ok(Matrix::IDENTITY);
            };
            let matrix = scene.nodes.borrow().get(parent).map(|node| node.local_to_world);
            match matrix {
                Some(matrix) => g.get(matrix),
                None => Ok(Matrix::IDENTITY),
            }
        });
        let local_to_world = graph.create_computed(move |g: &ReactiveGraph| {
            Ok(g.get(parent_to_world)? * g.get(local_to_parent)?)
        });
        let world_to_local = graph.create_computed(move |g: &ReactiveGraph| {
            Ok(g.get(local_to_world)?.inverse_clamped(EPSILON))
        });
        let world_to_parent = graph.create_computed(move |g: &ReactiveGraph| {
            Ok(g.get(parent_to_world)?.inverse_clamped(EPSILON))
        });

        let line_width = graph.create_signal_with(
            props.line_width,
            SignalOptions::named("line_width").parser(|value: f64| value.max(0.0)),
        );
        let geometry = graph.create_signal_with(props.geometry, SignalOptions::named("geometry"));
        let path = graph.create_computed({
            let (size, offset) = (size.clone(), offset.clone());
            move |g: &ReactiveGraph| Ok(g.get(geometry)?.to_path(size.get(g)?, offset.get(g)?))
        });
        let path_data = graph.create_computed(move |g: &ReactiveGraph| {
            Ok(PathDataBuilder::from_path(&g.get(path)?).to_string())
        });
        let cache_bbox = graph.create_computed({
            let (size, offset) = (size.clone(), offset.clone());
            move |g: &ReactiveGraph| {
                let path = g.get(path)?;
                let bounds = if path.is_empty() {
                    crate::geometry::node_box(size.get(g)?, offset.get(g)?)
                } else {
                    path.bounds()
                };
                Ok(bounds.expand(g.get(line_width)? / 2.0))
            }
        });

        Self {
            position,
            rotation,
            scale,
            skew,
            size,
            offset,
            opacity,
            parent,
            children,
            local_to_parent,
            parent_to_local,
            parent_to_world,
            local_to_world,
            world_to_local,
            world_to_parent,
            fill: graph.create_signal_with(props.fill, SignalOptions::named("fill")),
            stroke: graph.create_signal_with(props.stroke, SignalOptions::named("stroke")),
            stroke_first: graph
                .create_signal_with(props.stroke_first, SignalOptions::named("stroke_first")),
            line_width,
            line_join: graph.create_signal_with(props.line_join, SignalOptions::named("line_join")),
            line_cap: graph.create_signal_with(props.line_cap, SignalOptions::named("line_cap")),
            line_dash: graph.create_signal_with(props.line_dash, SignalOptions::named("line_dash")),
            dash_offset: graph
                .create_signal_with(props.dash_offset, SignalOptions::named("dash_offset")),
            clip: graph.create_signal_with(props.clip, SignalOptions::named("clip")),
            rough: graph.create_signal_with(props.rough, SignalOptions::named("rough")),
            rough_config: graph.create_signal_with(
                props
                    .rough_config
                    .unwrap_or_else(|| SignalValue::Value(default_rough.clone())),
                SignalOptions::named("rough_config"),
            ),
            ripple_strength: graph
                .create_signal_with(SignalValue::Value(0.0), SignalOptions::named("ripple_strength")),
            geometry,
            path,
            path_data,
            cache_bbox,
        }
    }

    /// Every signal this node registered, in creation order
    pub fn signal_ids(&self) -> Vec<SignalId> {
        let mut ids = Vec::with_capacity(48);
        for compound in [&self.position, &self.scale, &self.skew, &self.size, &self.offset] {
            ids.extend(compound.components().iter().map(|c| c.id()));
        }
        ids.extend([
            self.rotation.id(),
            self.opacity.id(),
            self.parent.id(),
            self.children.id(),
            self.local_to_parent.id(),
            self.parent_to_local.id(),
            self.parent_to_world.id(),
            self.local_to_world.id(),
            self.world_to_local.id(),
            self.world_to_parent.id(),
            self.fill.id(),
            self.stroke.id(),
            self.stroke_first.id(),
            self.line_width.id(),
            self.line_join.id(),
            self.line_cap.id(),
            self.line_dash.id(),
            self.dash_offset.id(),
            self.clip.id(),
            self.rough.id(),
            self.rough_config.id(),
            self.ripple_strength.id(),
            self.geometry.id(),
            self.path.id(),
            self.path_data.id(),
            self.cache_bbox.id(),
        ]);
        ids
    }

    /// Remove every signal from the graph
    pub(crate) fn dispose(&self, graph: &ReactiveGraph) {
        graph.batch(|graph| {
            for id in self.signal_ids() {
                graph.dispose_id(id);
            }
        });
    }

    /// The node's rotation, scale and skew without translation
    pub(crate) fn linear(&self, graph: &ReactiveGraph) -> motif_core::SignalResult<Matrix> {
        Ok(Matrix::from_transform(
            Vector2::ZERO,
            graph.get(self.rotation)?,
            self.scale.get(graph)?,
            self.skew.get(graph)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn detached(graph: &ReactiveGraph, props: NodeProps) -> NodeSignals {
        NodeSignals::new(graph, Weak::new(), props, &RoughConfig::default())
    }

    #[test]
    fn test_defaults() {
        let graph = ReactiveGraph::new();
        let node = detached(&graph, NodeProps::new());

        assert_eq!(node.position.get(&graph).unwrap(), Vector2::ZERO);
        assert_eq!(node.scale.get(&graph).unwrap(), Vector2::ONE);
        assert_eq!(graph.get(node.opacity).unwrap(), 1.0);
        assert_eq!(graph.get(node.parent).unwrap(), None);
        assert!(graph.get(node.local_to_world).unwrap().is_identity());
        assert!(graph.get(node.path).unwrap().is_empty());
    }

    #[test]
    fn test_local_matrix_follows_signals() {
        let graph = ReactiveGraph::new();
        let node = detached(&graph, NodeProps::new().position((10.0, 20.0)).rotation(90.0));

        let point = graph.get(node.local_to_parent).unwrap().transform_point(Vector2::new(1.0, 0.0));
        assert!(point.approx_eq(Vector2::new(10.0, 21.0), 1e-9));

        node.position.set(&graph, (0.0, 0.0)).unwrap();
        let point = graph.get(node.local_to_world).unwrap().transform_point(Vector2::new(1.0, 0.0));
        assert!(point.approx_eq(Vector2::new(0.0, 1.0), 1e-9));

        let back = graph.get(node.world_to_local).unwrap().transform_point(point);
        assert!(back.approx_eq(Vector2::new(1.0, 0.0), 1e-9));
    }

    #[test]
    fn test_parsers() {
        let graph = ReactiveGraph::new();
        let node = detached(&graph, NodeProps::new().opacity(3.0).line_width(-2.0));
        assert_eq!(graph.get(node.opacity).unwrap(), 1.0);
        assert_eq!(graph.get(node.line_width).unwrap(), 0.0);

        graph.set(node.opacity, -0.5).unwrap();
        assert_eq!(graph.get(node.opacity).unwrap(), 0.0);
    }

    #[test]
    fn test_path_tracks_size() {
        let graph = ReactiveGraph::new();
        let node = detached(&graph, NodeProps::rect((10.0, 10.0)).line_width(4.0));
        assert_eq!(graph.get(node.cache_bbox).unwrap(), Rect::new(-7.0, -7.0, 14.0, 14.0));
        assert_eq!(
            graph.get(node.path_data).unwrap(),
            "M -5 -5 L 5 -5 L 5 5 L -5 5 L -5 -5 Z"
        );

        node.size.set(&graph, (20.0, 10.0)).unwrap();
        assert_eq!(graph.get(node.cache_bbox).unwrap(), Rect::new(-12.0, -7.0, 24.0, 14.0));
    }

    #[test]
    fn test_empty_outline_bbox_uses_box() {
        let graph = ReactiveGraph::new();
        let node = detached(&graph, NodeProps::new().size((8.0, 4.0)));
        assert_eq!(graph.get(node.cache_bbox).unwrap(), Rect::new(-4.0, -2.0, 8.0, 4.0));
    }

    #[test]
    fn test_partial_circle_bbox_covers_arc() {
        let graph = ReactiveGraph::new();
        let node = detached(
            &graph,
            NodeProps::circle((20.0, 20.0)).geometry(Geometry::Circle {
                start_angle: 0.0,
                end_angle: 270.0,
                closed: false,
                counterclockwise: false,
            }),
        );

        let bbox = graph.get(node.cache_bbox).unwrap();
        assert!((bbox.left() + 10.0).abs() < 1e-9);
        assert!((bbox.top() + 10.0).abs() < 1e-9);
        assert!((bbox.right() - 10.0).abs() < 1e-9);
        assert!((bbox.bottom() - 10.0).abs() < 1e-9);

        // A quarter sweep stays in its quadrant
        graph
            .set(
                node.geometry,
                Geometry::Circle {
                    start_angle: 0.0,
                    end_angle: 90.0,
                    closed: false,
                    counterclockwise: false,
                },
            )
            .unwrap();
        let bbox = graph.get(node.cache_bbox).unwrap();
        assert!(bbox.left() > -1e-9 && bbox.top() > -1e-9);
        assert!((bbox.right() - 10.0).abs() < 1e-9);
        assert!((bbox.bottom() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_dispose_removes_everything() {
        let graph = Rc::new(ReactiveGraph::new());
        let before = graph.stats().signal_count;
        let node = detached(&graph, NodeProps::rect((10.0, 10.0)));
        let ids = node.signal_ids();
        assert_eq!(graph.stats().signal_count, before + ids.len());

        node.dispose(&graph);
        assert_eq!(graph.stats().signal_count, before);
        assert!(ids.iter().all(|id| !graph.contains(*id)));
    }
}
