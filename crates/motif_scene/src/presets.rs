//! Ready-made node animations
//!
//! Each preset returns a [`BoxedTask`] for an
//! [`AnimationScheduler`](motif_animation::AnimationScheduler). Presets read
//! the node's state when they first run, not when they are created, so they
//! compose with [`sequence`] and [`delay`](motif_animation::delay).
//!
//! ```rust
//! use motif_animation::{sequence, AnimationScheduler, Easing};
//! use motif_scene::{presets, Direction, NodeProps, Scene};
//!
//! let scene = Scene::default();
//! let id = scene.spawn(scene.root(), NodeProps::rect((100.0, 100.0))).unwrap();
//!
//! let mut scheduler = AnimationScheduler::new(30.0);
//! scheduler.spawn(sequence(vec![
//!     presets::push_in(&scene, id, 0.5, Direction::Left, 100.0, Easing::InOutCubic),
//!     presets::fade_out(&scene, id, 0.5, Easing::Linear),
//! ]));
//! scheduler.run_until_idle(300).unwrap();
//!
//! assert_eq!(scene.node(id).opacity().get().unwrap(), 0.0);
//! ```

use motif_animation::{all, call, lazy, sequence, BoxedTask, CompoundTarget, Easing, Tween};
use motif_core::{CompoundSignal, Vector2};
use serde::{Deserialize, Serialize};

use crate::node::NodeSignals;
use crate::scene::{NodeId, Scene};

/// Side of a node an animation enters from or leaves towards
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Left,
    Right,
    Top,
    Bottom,
}

impl Direction {
    /// Unit vector pointing towards this side
    pub fn vector(self) -> Vector2 {
        match self {
            Direction::Left => Vector2::LEFT,
            Direction::Right => Vector2::RIGHT,
            Direction::Top => Vector2::TOP,
            Direction::Bottom => Vector2::BOTTOM,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// `scale` flattened along this direction's axis
    fn collapse(self, scale: Vector2) -> Vector2 {
        if self.is_horizontal() {
            Vector2::new(0.0, scale.y)
        } else {
            Vector2::new(scale.x, 0.0)
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn opacity_tween(scene: &Scene, signals: &NodeSignals, target: f64, duration: f64, easing: Easing) -> BoxedTask {
    Box::new(Tween::signal(scene.shared_graph(), signals.opacity, target, duration).easing(easing))
}

fn vector_tween(
    scene: &Scene,
    signal: &CompoundSignal<Vector2>,
    target: Vector2,
    duration: f64,
    easing: Easing,
) -> BoxedTask {
    let sink = CompoundTarget::new(scene.shared_graph(), signal.clone());
    Box::new(Tween::new(sink, target, duration).easing(easing))
}

/// Writes `value` into `signal` when reached
fn restore(scene: &Scene, signal: &CompoundSignal<Vector2>, value: Vector2) -> BoxedTask {
    let graph = scene.shared_graph();
    let signal = signal.clone();
    Box::new(call(move || {
        signal.set(&graph, value)?;
        Ok(())
    }))
}

// ============================================================================
// Presets
// ============================================================================

/// Pulse the ripple overlay from 0 to 1 and clear it
pub fn ripple(scene: &Scene, node: NodeId, duration: f64) -> BoxedTask {
    let scene = scene.clone();
    Box::new(lazy(move || {
        let signals = scene.signals(node)?;
        let graph = scene.shared_graph();
        graph.set(signals.ripple_strength, 0.0)?;
        let strength = signals.ripple_strength;
        Ok(Box::new(sequence(vec![
            Box::new(Tween::signal(graph.clone(), strength, 1.0, duration).easing(Easing::Linear)),
            Box::new(call(move || {
                graph.set(strength, 0.0)?;
                Ok(())
            })),
        ])) as BoxedTask)
    }))
}

/// Opacity 0 → 1
pub fn fade_in(scene: &Scene, node: NodeId, duration: f64, easing: Easing) -> BoxedTask {
    let scene = scene.clone();
    Box::new(lazy(move || {
        let signals = scene.signals(node)?;
        scene.graph().set(signals.opacity, 0.0)?;
        Ok(opacity_tween(&scene, &signals, 1.0, duration, easing))
    }))
}

/// Opacity 1 → 0
pub fn fade_out(scene: &Scene, node: NodeId, duration: f64, easing: Easing) -> BoxedTask {
    let scene = scene.clone();
    Box::new(lazy(move || {
        let signals = scene.signals(node)?;
        scene.graph().set(signals.opacity, 1.0)?;
        Ok(opacity_tween(&scene, &signals, 0.0, duration, easing))
    }))
}

/// Slide in from `distance` units towards `from` while fading in
pub fn push_in(
    scene: &Scene,
    node: NodeId,
    duration: f64,
    from: Direction,
    distance: f64,
    easing: Easing,
) -> BoxedTask {
    let scene = scene.clone();
    Box::new(lazy(move || {
        let signals = scene.signals(node)?;
        let graph = scene.graph();
        let start = signals.position.get(graph)?;
        signals.position.set(graph, start + from.vector() * distance)?;
        graph.set(signals.opacity, 0.0)?;
        Ok(Box::new(all(vec![
            vector_tween(&scene, &signals.position, start, duration, easing),
            opacity_tween(&scene, &signals, 1.0, duration, easing),
        ])) as BoxedTask)
    }))
}

/// Slide `distance` units towards `to` while fading out, then put the
/// node back where it started
pub fn push_out(
    scene: &Scene,
    node: NodeId,
    duration: f64,
    to: Direction,
    distance: f64,
    easing: Easing,
) -> BoxedTask {
    let scene = scene.clone();
    Box::new(lazy(move || {
        let signals = scene.signals(node)?;
        let start = signals.position.get(scene.graph())?;
        scene.graph().set(signals.opacity, 1.0)?;
        Ok(Box::new(sequence(vec![
            Box::new(all(vec![
                vector_tween(&scene, &signals.position, start + to.vector() * distance, duration, easing),
                opacity_tween(&scene, &signals, 0.0, duration, easing),
            ])),
            restore(&scene, &signals.position, start),
        ])) as BoxedTask)
    }))
}

/// Grow from `initial_scale` times the current scale while fading in
pub fn pop_in(scene: &Scene, node: NodeId, duration: f64, initial_scale: f64, easing: Easing) -> BoxedTask {
    let scene = scene.clone();
    Box::new(lazy(move || {
        let signals = scene.signals(node)?;
        let graph = scene.graph();
        let target = signals.scale.get(graph)?;
        signals.scale.set(graph, target * initial_scale)?;
        graph.set(signals.opacity, 0.0)?;
        Ok(Box::new(all(vec![
            vector_tween(&scene, &signals.scale, target, duration, easing),
            opacity_tween(&scene, &signals, 1.0, duration, easing),
        ])) as BoxedTask)
    }))
}

/// Shrink to `target_scale` times the current scale while fading out, then
/// restore the scale
pub fn pop_out(scene: &Scene, node: NodeId, duration: f64, target_scale: f64, easing: Easing) -> BoxedTask {
    let scene = scene.clone();
    Box::new(lazy(move || {
        let signals = scene.signals(node)?;
        let original = signals.scale.get(scene.graph())?;
        scene.graph().set(signals.opacity, 1.0)?;
        Ok(Box::new(sequence(vec![
            Box::new(all(vec![
                vector_tween(&scene, &signals.scale, original * target_scale, duration, easing),
                opacity_tween(&scene, &signals, 0.0, duration, easing),
            ])),
            restore(&scene, &signals.scale, original),
        ])) as BoxedTask)
    }))
}

/// Unfold from the `from` edge, like a curtain opening
pub fn squash_in(scene: &Scene, node: NodeId, duration: f64, from: Direction, easing: Easing) -> BoxedTask {
    let scene = scene.clone();
    Box::new(lazy(move || {
        let signals = scene.signals(node)?;
        let graph = scene.graph();
        let scale = signals.scale.get(graph)?;
        let position = signals.position.get(graph)?;
        let edge = from.vector() * signals.size.get(graph)? / 2.0;

        signals.scale.set(graph, from.collapse(scale))?;
        signals.position.set(graph, position + edge)?;
        Ok(Box::new(all(vec![
            vector_tween(&scene, &signals.scale, scale, duration, easing),
            vector_tween(&scene, &signals.position, position, duration, easing),
        ])) as BoxedTask)
    }))
}

/// Fold towards the `to` edge, like a curtain closing, then restore the
/// scale and position
pub fn squash_out(scene: &Scene, node: NodeId, duration: f64, to: Direction, easing: Easing) -> BoxedTask {
    let scene = scene.clone();
    Box::new(lazy(move || {
        let signals = scene.signals(node)?;
        let graph = scene.graph();
        let scale = signals.scale.get(graph)?;
        let position = signals.position.get(graph)?;
        let edge = to.vector() * signals.size.get(graph)? / 2.0;

        Ok(Box::new(sequence(vec![
            Box::new(all(vec![
                vector_tween(&scene, &signals.scale, to.collapse(scale), duration, easing),
                vector_tween(&scene, &signals.position, position + edge, duration, easing),
            ])),
            restore(&scene, &signals.scale, scale),
            restore(&scene, &signals.position, position),
        ])) as BoxedTask)
    }))
}

/// [`squash_in`] then [`squash_out`], each taking half of `duration`
pub fn squash_in_out(
    scene: &Scene,
    node: NodeId,
    duration: f64,
    from: Direction,
    to: Direction,
    easing: Easing,
) -> BoxedTask {
    let half = duration / 2.0;
    Box::new(sequence(vec![
        squash_in(scene, node, half, from, easing),
        squash_out(scene, node, half, to, easing),
    ]))
}
