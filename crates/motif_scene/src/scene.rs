//! The scene graph
//!
//! A [`Scene`] owns a [`ReactiveGraph`] and an arena of nodes keyed by
//! [`NodeId`]. Parent links are plain ids, checked against the arena on
//! every lookup, so a disposed parent simply reads as "no parent".
//!
//! The root node is the default view. Its size comes from the
//! [`SceneConfig`] and its origin is the center of the rendered surface.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use motif_core::{Matrix, ReactiveGraph, Signal, SignalOptions, SignalValue, EPSILON};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace, warn};

use crate::config::SceneConfig;
use crate::error::{SceneError, SceneResult};
use crate::handle::NodeRef;
use crate::node::{NodeProps, NodeSignals};

new_key_type! {
    /// Generation-checked handle to a scene node
    pub struct NodeId;
}

pub(crate) struct SceneInner {
    pub(crate) graph: Rc<ReactiveGraph>,
    pub(crate) nodes: RefCell<SlotMap<NodeId, NodeSignals>>,
    pub(crate) root: NodeId,
    pub(crate) view: Signal<NodeId>,
    pub(crate) config: SceneConfig,
}

/// Shared handle to a scene
///
/// Cloning is cheap and every clone refers to the same nodes.
#[derive(Clone)]
pub struct Scene {
    pub(crate) inner: Rc<SceneInner>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("root", &self.inner.root)
            .field("nodes", &self.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let inner = Rc::new_cyclic(|weak| {
            let graph = Rc::new(ReactiveGraph::new());
            let mut nodes = SlotMap::with_key();
            let root = nodes.insert(NodeSignals::new(
                &graph,
                weak.clone(),
                NodeProps::new().size(config.size()),
                &config.rough,
            ));
            let view = graph.create_signal_with(SignalValue::Value(root), SignalOptions::named("view"));
            SceneInner {
                graph,
                nodes: RefCell::new(nodes),
                root,
                view,
                config,
            }
        });
        debug!(root = ?inner.root, "created scene");
        Self { inner }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.inner.config
    }

    pub fn graph(&self) -> &ReactiveGraph {
        &self.inner.graph
    }

    /// The graph as a shared handle, for tween targets
    pub fn shared_graph(&self) -> Rc<ReactiveGraph> {
        self.inner.graph.clone()
    }

    pub fn root(&self) -> NodeId {
        self.inner.root
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.inner.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.inner.nodes.borrow().contains_key(id)
    }

    /// Handle for reading and writing a node's properties
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self, id)
    }

    pub(crate) fn signals(&self, id: NodeId) -> SceneResult<NodeSignals> {
        self.inner
            .nodes
            .borrow()
            .get(id)
            .cloned()
            .ok_or(SceneError::NodeNotFound(id))
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    /// Create a detached node
    pub fn create_node(&self, props: NodeProps) -> NodeId {
        let signals = NodeSignals::new(
            &self.inner.graph,
            Rc::downgrade(&self.inner),
            props,
            &self.inner.config.rough,
        );
        let id = self.inner.nodes.borrow_mut().insert(signals);
        trace!(?id, "created node");
        id
    }

    /// Create a node and append it to `parent`
    pub fn spawn(&self, parent: NodeId, props: NodeProps) -> SceneResult<NodeId> {
        if !self.contains(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let id = self.create_node(props);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Append `child` to `parent`, detaching it from its current parent
    pub fn add_child(&self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.insert_child(parent, usize::MAX, child)
    }

    /// Insert `child` among `parent`'s children. Indices past the end append.
    pub fn insert_child(&self, parent: NodeId, index: usize, child: NodeId) -> SceneResult<()> {
        let parent_signals = self.signals(parent)?;
        let child_signals = self.signals(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::HierarchyCycle { parent, child });
        }

        self.graph().batch(|graph| -> SceneResult<()> {
            self.detach(child, &child_signals)?;
            graph.update(parent_signals.children, |mut children| {
                let index = index.min(children.len());
                children.insert(index, child);
                children
            })?;
            graph.set(child_signals.parent, Some(parent))?;
            Ok(())
        })?;
        debug!(?parent, ?child, "attached node");
        Ok(())
    }

    /// Detach a node from its parent. The node stays alive.
    pub fn remove(&self, id: NodeId) -> SceneResult<()> {
        let signals = self.signals(id)?;
        self.graph().batch(|_| self.detach(id, &signals))?;
        debug!(?id, "detached node");
        Ok(())
    }

    /// Detach a node and free it together with all of its descendants
    ///
    /// The root cannot be disposed. If the active view is inside the subtree
    /// the root becomes the view again.
    pub fn dispose(&self, id: NodeId) -> SceneResult<()> {
        if id == self.root() {
            warn!("ignoring request to dispose the scene root");
            return Ok(());
        }
        let signals = self.signals(id)?;
        let graph = self.graph();
        graph.batch(|_| self.detach(id, &signals))?;

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(signals) = self.inner.nodes.borrow_mut().remove(current) else {
                continue;
            };
            stack.extend(graph.get_untracked(signals.children).unwrap_or_default());
            removed.push((current, signals));
        }

        let view = graph.get_untracked(self.inner.view)?;
        graph.batch(|graph| -> SceneResult<()> {
            if removed.iter().any(|(removed_id, _)| *removed_id == view) {
                graph.set(self.inner.view, self.root())?;
            }
            for (_, signals) in &removed {
                signals.dispose(graph);
            }
            Ok(())
        })?;
        debug!(?id, count = removed.len(), "disposed subtree");
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> SceneResult<Option<NodeId>> {
        let signals = self.signals(id)?;
        Ok(self.graph().get(signals.parent)?)
    }

    pub fn children(&self, id: NodeId) -> SceneResult<Vec<NodeId>> {
        let signals = self.signals(id)?;
        Ok(self.graph().get(signals.children)?)
    }

    /// Whether the node is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root() {
                return true;
            }
            current = self.parent_untracked(node);
        }
        false
    }

    fn parent_untracked(&self, id: NodeId) -> Option<NodeId> {
        let signal = self.inner.nodes.borrow().get(id).map(|node| node.parent)?;
        self.graph().get_untracked(signal).ok().flatten()
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_untracked(id);
        }
        false
    }

    /// Unlink `id` from its parent. Callers open the batch.
    fn detach(&self, id: NodeId, signals: &NodeSignals) -> SceneResult<()> {
        let graph = self.graph();
        let Some(parent) = graph.get_untracked(signals.parent)? else {
            return Ok(());
        };
        let parent_children = self.inner.nodes.borrow().get(parent).map(|node| node.children);
        if let Some(children) = parent_children {
            graph.update(children, |mut children| {
                children.retain(|&child| child != id);
                children
            })?;
        }
        graph.set(signals.parent, None::<NodeId>)?;
        Ok(())
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Make `id` the node that view-space coordinates are relative to
    pub fn set_view(&self, id: NodeId) -> SceneResult<()> {
        if !self.contains(id) {
            return Err(SceneError::NodeNotFound(id));
        }
        self.graph().set(self.inner.view, id)?;
        debug!(view = ?id, "changed active view");
        Ok(())
    }

    /// The active view. Falls back to the root if the view was disposed.
    pub fn view(&self) -> NodeId {
        match self.graph().get(self.inner.view) {
            Ok(id) if self.contains(id) => id,
            _ => self.root(),
        }
    }

    /// World matrix of a node, identity for `None` or a missing node
    pub(crate) fn world_matrix(&self, id: Option<NodeId>) -> SceneResult<Matrix> {
        let signal = id.and_then(|id| self.inner.nodes.borrow().get(id).map(|node| node.local_to_world));
        match signal {
            Some(signal) => Ok(self.graph().get(signal)?),
            None => Ok(Matrix::IDENTITY),
        }
    }

    /// Maps world coordinates into the active view
    pub(crate) fn world_to_view(&self) -> SceneResult<Matrix> {
        Ok(self.world_matrix(Some(self.view()))?.inverse_clamped(EPSILON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motif_core::Vector2;

    #[test]
    fn test_root_matches_config() {
        let scene = Scene::new(SceneConfig::preview());
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.view(), scene.root());
        assert_eq!(
            scene.node(scene.root()).size().get().unwrap(),
            Vector2::new(960.0, 540.0)
        );
        assert!(scene.is_attached(scene.root()));
    }

    #[test]
    fn test_spawn_and_children() {
        let scene = Scene::default();
        let a = scene.spawn(scene.root(), NodeProps::new()).unwrap();
        let b = scene.spawn(scene.root(), NodeProps::new()).unwrap();
        let c = scene.create_node(NodeProps::new());

        assert_eq!(scene.children(scene.root()).unwrap(), vec![a, b]);
        assert_eq!(scene.parent(a).unwrap(), Some(scene.root()));
        assert!(!scene.is_attached(c));

        scene.insert_child(scene.root(), 1, c).unwrap();
        assert_eq!(scene.children(scene.root()).unwrap(), vec![a, c, b]);
        assert!(scene.is_attached(c));
    }

    #[test]
    fn test_reparenting_moves_node() {
        let scene = Scene::default();
        let a = scene.spawn(scene.root(), NodeProps::new()).unwrap();
        let b = scene.spawn(scene.root(), NodeProps::new()).unwrap();

        scene.add_child(a, b).unwrap();
        assert_eq!(scene.children(scene.root()).unwrap(), vec![a]);
        assert_eq!(scene.children(a).unwrap(), vec![b]);
        assert_eq!(scene.parent(b).unwrap(), Some(a));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let scene = Scene::default();
        let a = scene.spawn(scene.root(), NodeProps::new()).unwrap();
        let b = scene.spawn(a, NodeProps::new()).unwrap();

        assert!(matches!(
            scene.add_child(b, a),
            Err(SceneError::HierarchyCycle { .. })
        ));
        assert!(matches!(
            scene.add_child(a, a),
            Err(SceneError::HierarchyCycle { .. })
        ));
        assert_eq!(scene.parent(a).unwrap(), Some(scene.root()));
    }

    #[test]
    fn test_remove_keeps_node() {
        let scene = Scene::default();
        let a = scene.spawn(scene.root(), NodeProps::new()).unwrap();
        scene.remove(a).unwrap();

        assert!(scene.contains(a));
        assert!(!scene.is_attached(a));
        assert!(scene.children(scene.root()).unwrap().is_empty());
    }

    #[test]
    fn test_dispose_frees_subtree() {
        let scene = Scene::default();
        let a = scene.spawn(scene.root(), NodeProps::new()).unwrap();
        let b = scene.spawn(a, NodeProps::new()).unwrap();
        let c = scene.spawn(b, NodeProps::new()).unwrap();
        let signals_before = scene.graph().stats().signal_count;

        scene.set_view(b).unwrap();
        scene.dispose(a).unwrap();

        assert!(!scene.contains(a) && !scene.contains(b) && !scene.contains(c));
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.view(), scene.root());
        assert!(scene.graph().stats().signal_count < signals_before);
        assert!(matches!(scene.parent(b), Err(SceneError::NodeNotFound(id)) if id == b));
    }

    #[test]
    fn test_root_is_not_disposed() {
        let scene = Scene::default();
        scene.dispose(scene.root()).unwrap();
        assert!(scene.contains(scene.root()));
    }

    #[test]
    fn test_set_view_requires_live_node() {
        let scene = Scene::default();
        let a = scene.create_node(NodeProps::new());
        scene.dispose(a).unwrap();
        assert!(matches!(scene.set_view(a), Err(SceneError::NodeNotFound(_))));
    }
}
