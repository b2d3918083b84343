//! End-to-end scenarios across the scene, transform and animation layers
//!
//! Run with `RUST_LOG=motif_scene=debug` to see hierarchy and scheduler logs.

use std::cell::RefCell;
use std::rc::Rc;

use motif_animation::{AnimationScheduler, Easing};
use motif_core::{Color, RecordingContext, ReactiveGraph, SignalValue, Vector2};
use motif_scene::{presets, Direction, NodeId, NodeProps, Scene, SceneConfig};

const TOL: f64 = 1e-6;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// root → a (translated, rotated, scaled) → b (skewed) → c
fn chain(scene: &Scene) -> [NodeId; 3] {
    let a = scene
        .spawn(
            scene.root(),
            NodeProps::new().position((120.0, -40.0)).rotation(30.0).scale((2.0, 0.5)),
        )
        .unwrap();
    let b = scene
        .spawn(a, NodeProps::new().position((-15.0, 60.0)).rotation(-75.0).skew((10.0, 0.0)))
        .unwrap();
    let c = scene
        .spawn(b, NodeProps::rect((40.0, 20.0)).position((5.0, 5.0)).scale((1.5, 1.5)))
        .unwrap();
    [a, b, c]
}

#[test]
fn test_position_roundtrip_in_every_space() {
    init_tracing();
    let scene = Scene::default();
    let nodes = chain(&scene);
    scene.set_view(nodes[0]).unwrap();

    for id in nodes {
        let node = scene.node(id);
        let local = node.position().get().unwrap();

        let abs = node.position().abs().get().unwrap();
        node.position().abs().set(abs).unwrap();
        assert!(node.position().get().unwrap().approx_eq(local, TOL));

        let view = node.position().view().get().unwrap();
        node.position().view().set(view).unwrap();
        assert!(node.position().get().unwrap().approx_eq(local, TOL));
    }
}

#[test]
fn test_relative_is_difference_of_absolutes() {
    init_tracing();
    let scene = Scene::default();
    let [a, b, c] = chain(&scene);

    for (node, other) in [(c, b), (c, a), (b, a)] {
        let relative = scene.node(node).position().relative_to(other).get().unwrap();
        let expected = scene.node(node).position().abs().get().unwrap()
            - scene.node(other).position().abs().get().unwrap();
        assert!(relative.approx_eq(expected, TOL));
    }
}

#[test]
fn test_abs_x_write_keeps_abs_y() {
    init_tracing();
    let scene = Scene::default();
    let [_, _, c] = chain(&scene);
    let node = scene.node(c);

    let before = node.position().abs().get().unwrap();
    node.position().abs().x().set(-300.0).unwrap();
    let after = node.position().abs().get().unwrap();

    assert!((after.x + 300.0).abs() < TOL);
    assert!((after.y - before.y).abs() < TOL);
}

#[test]
fn test_relative_write_scenario() {
    init_tracing();
    let scene = Scene::default();
    let b = scene
        .spawn(scene.root(), NodeProps::new().position((100.0, 100.0)))
        .unwrap();
    let a = scene.node(scene.spawn(b, NodeProps::new().position((50.0, 50.0))).unwrap());

    assert_eq!(a.position().abs().get().unwrap(), Vector2::new(150.0, 150.0));

    a.position().relative_to(b).set((10.0, 10.0)).unwrap();
    assert_eq!(a.position().abs().get().unwrap(), Vector2::new(110.0, 110.0));
    assert_eq!(a.position().get().unwrap(), Vector2::new(10.0, 10.0));
}

#[test]
fn test_scale_under_rotated_parent() {
    init_tracing();
    let scene = Scene::default();
    let parent = scene.spawn(scene.root(), NodeProps::new().rotation(90.0)).unwrap();
    let child = scene.node(scene.spawn(parent, NodeProps::new()).unwrap());

    assert!(child.scale().abs().get().unwrap().approx_eq(Vector2::ONE, TOL));
}

#[test]
fn test_component_writes() {
    init_tracing();
    let scene = Scene::default();
    let node = scene.node(scene.create_node(NodeProps::new()));

    node.position().set((10.0, 20.0)).unwrap();
    assert_eq!(node.position().x().get().unwrap(), 10.0);
    assert_eq!(node.position().y().get().unwrap(), 20.0);

    node.position().x().set(99.0).unwrap();
    assert_eq!(node.position().get().unwrap(), Vector2::new(99.0, 20.0));
}

#[test]
fn test_reads_are_bit_identical() {
    init_tracing();
    let scene = Scene::default();
    let [a, b, c] = chain(&scene);
    scene.set_view(b).unwrap();

    for id in [a, b, c] {
        let node = scene.node(id);
        let first = node.position().view().get().unwrap();
        let second = node.position().view().get().unwrap();
        assert_eq!(first.x.to_bits(), second.x.to_bits());
        assert_eq!(first.y.to_bits(), second.y.to_bits());

        let first = node.rotation().abs().get().unwrap();
        assert_eq!(first.to_bits(), node.rotation().abs().get().unwrap().to_bits());
    }
}

#[test]
fn test_reparent_moves_world_position() {
    init_tracing();
    let scene = Scene::default();
    let left = scene.spawn(scene.root(), NodeProps::new().position((-100.0, 0.0))).unwrap();
    let right = scene.spawn(scene.root(), NodeProps::new().position((100.0, 0.0))).unwrap();
    let node = scene.node(scene.spawn(left, NodeProps::new().position((0.0, 10.0))).unwrap());

    assert_eq!(node.position().abs().get().unwrap(), Vector2::new(-100.0, 10.0));
    scene.add_child(right, node.id()).unwrap();
    assert_eq!(node.position().abs().get().unwrap(), Vector2::new(100.0, 10.0));
}

#[test]
fn test_effect_sees_parent_moves() {
    init_tracing();
    let scene = Scene::default();
    let parent = scene.spawn(scene.root(), NodeProps::new()).unwrap();
    let child = scene.spawn(parent, NodeProps::new().position((5.0, 0.0))).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let effect = {
        let observer = scene.clone();
        let seen = seen.clone();
        scene.graph().create_effect(move |_: &ReactiveGraph| {
            let abs = observer.node(child).position().abs().get()?;
            seen.borrow_mut().push(abs);
            Ok(())
        })
    };

    scene.node(parent).position().set((10.0, 10.0)).unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![Vector2::new(5.0, 0.0), Vector2::new(15.0, 10.0)]
    );
    scene.graph().dispose_effect(effect);
}

#[test]
fn test_formula_in_abs_space_follows_parent() {
    init_tracing();
    let scene = Scene::default();
    let parent = scene.spawn(scene.root(), NodeProps::new()).unwrap();
    let node = scene.node(scene.spawn(parent, NodeProps::new()).unwrap());
    let target = scene.graph().create_signal(Vector2::new(50.0, 0.0));

    node.position()
        .abs()
        .set(SignalValue::formula(move |g: &ReactiveGraph| g.get(target)))
        .unwrap();
    scene.node(parent).position().set((20.0, 0.0)).unwrap();
    assert_eq!(node.position().abs().get().unwrap(), Vector2::new(50.0, 0.0));
    assert_eq!(node.position().get().unwrap(), Vector2::new(30.0, 0.0));

    scene.graph().set(target, Vector2::new(0.0, 0.0)).unwrap();
    assert_eq!(node.position().get().unwrap(), Vector2::new(-20.0, 0.0));
}

// ============================================================================
// Animation
// ============================================================================

#[test]
fn test_tween_lands_on_target() {
    init_tracing();
    let scene = Scene::new(SceneConfig::preview());
    let node = scene.node(scene.spawn(scene.root(), NodeProps::new()).unwrap());

    let mut scheduler = AnimationScheduler::new(scene.config().fps);
    scheduler.spawn(node.position().animate((123.456, -7.89), 0.7).unwrap().easing(Easing::OutExpo));
    scheduler.run_until_idle(1000).unwrap();

    assert_eq!(node.position().get().unwrap(), Vector2::new(123.456, -7.89));
}

#[test]
fn test_cancel_keeps_last_value() {
    init_tracing();
    let scene = Scene::default();
    let node = scene.node(scene.spawn(scene.root(), NodeProps::new()).unwrap());

    let mut scheduler = AnimationScheduler::new(10.0);
    let task = scheduler.spawn(node.opacity().animate(0.0, 1.0).unwrap().easing(Easing::Linear));
    for _ in 0..4 {
        scheduler.tick().unwrap();
    }
    let before = node.opacity().get().unwrap();
    assert!(scheduler.cancel(task));
    scheduler.run_until_idle(100).unwrap();

    assert_eq!(node.opacity().get().unwrap(), before);
    assert!(before > 0.0 && before < 1.0);
}

#[test]
fn test_later_spawned_task_wins() {
    init_tracing();
    let scene = Scene::default();
    let id = scene.spawn(scene.root(), NodeProps::new()).unwrap();
    let rotation = scene.node(id).rotation();

    let mut scheduler = AnimationScheduler::new(10.0);
    scheduler.spawn(rotation.animate(100.0, 0.5).unwrap().easing(Easing::Linear));
    scheduler.spawn(rotation.animate(-100.0, 0.5).unwrap().easing(Easing::Linear));

    scheduler.tick().unwrap();
    scheduler.tick().unwrap();
    assert!(scene.node(id).rotation().get().unwrap() < 0.0);

    scheduler.run_until_idle(100).unwrap();
    assert_eq!(scene.node(id).rotation().get().unwrap(), -100.0);
}

#[test]
fn test_presets_then_render() {
    init_tracing();
    let scene = Scene::new(SceneConfig::preview().with_background(Color::WHITE));
    let card = scene
        .spawn(scene.root(), NodeProps::rect((200.0, 100.0)).fill(Color::RED))
        .unwrap();

    let mut scheduler = AnimationScheduler::new(scene.config().fps);
    scheduler.spawn(presets::squash_in_out(
        &scene,
        card,
        1.0,
        Direction::Left,
        Direction::Right,
        Easing::InOutCubic,
    ));
    scheduler.spawn(presets::fade_in(&scene, card, 0.5, Easing::Linear));
    scheduler.run_until_idle(1000).unwrap();

    let mut ctx = RecordingContext::new(scene.config().size());
    scene.render(&mut ctx).unwrap();
    assert_eq!(ctx.paint_commands().count(), 2);
}
