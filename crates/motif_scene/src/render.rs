//! Scene rendering
//!
//! Walks the node tree depth-first and replays it onto a [`DrawContext`].
//! The scene origin sits at the center of the surface. Every node pushes its
//! local transform and opacity, draws its shape, optionally clips its
//! children to that shape, draws the children and pops everything again.

use std::hash::{Hash, Hasher};

use motif_animation::Easing;
use motif_core::{Brush, DrawContext, Matrix, Path, Rect, Stroke, Vector2};
use motif_paint::{RoughOptions, RoughRenderer};
use rustc_hash::FxHasher;
use tracing::warn;

use crate::error::SceneResult;
use crate::node::NodeSignals;
use crate::scene::{NodeId, Scene};

/// Ripple overlay alpha at zero strength
const RIPPLE_ALPHA: f64 = 0.54;
/// How far the ripple outline grows at full strength
const RIPPLE_SPREAD: f64 = 50.0;

impl Scene {
    /// Draw the whole scene. Rough nodes fall back to regular fills and
    /// strokes.
    pub fn render(&self, ctx: &mut dyn DrawContext) -> SceneResult<()> {
        self.render_with(ctx, None)
    }

    /// Draw the whole scene, handing rough nodes to `rough`
    pub fn render_with(
        &self,
        ctx: &mut dyn DrawContext,
        mut rough: Option<&mut dyn RoughRenderer>,
    ) -> SceneResult<()> {
        ctx.push_transform(Matrix::translation(ctx.viewport_size() / 2.0));
        let result = self.render_root(ctx, &mut rough);
        ctx.pop_transform();
        result
    }

    fn render_root(
        &self,
        ctx: &mut dyn DrawContext,
        rough: &mut Option<&mut dyn RoughRenderer>,
    ) -> SceneResult<()> {
        if let Some(background) = self.config().background {
            let view = Path::rect(Rect::from_size_centered(self.config().size()));
            ctx.fill_path(&view, &Brush::from(background));
        }
        self.render_node(ctx, rough, self.root())
    }

    fn render_node(
        &self,
        ctx: &mut dyn DrawContext,
        rough: &mut Option<&mut dyn RoughRenderer>,
        id: NodeId,
    ) -> SceneResult<()> {
        let signals = self.signals(id)?;
        let graph = self.graph();

        let opacity = graph.get(signals.opacity)?;
        if opacity <= 0.0 {
            return Ok(());
        }

        ctx.push_transform(graph.get(signals.local_to_parent)?);
        ctx.push_opacity(opacity);
        let result = self.render_contents(ctx, rough, id, &signals);
        ctx.pop_opacity();
        ctx.pop_transform();
        result
    }

    fn render_contents(
        &self,
        ctx: &mut dyn DrawContext,
        rough: &mut Option<&mut dyn RoughRenderer>,
        id: NodeId,
        signals: &NodeSignals,
    ) -> SceneResult<()> {
        let graph = self.graph();
        self.draw_shape(ctx, rough, id, signals)?;

        let clip = graph.get(signals.clip)?;
        if clip {
            let path = graph.get(signals.path)?;
            ctx.push_clip(&path);
        }

        let mut result = Ok(());
        for child in graph.get(signals.children)? {
            result = self.render_node(ctx, rough, child);
            if result.is_err() {
                break;
            }
        }

        if clip {
            ctx.pop_clip();
        }
        result
    }

    fn draw_shape(
        &self,
        ctx: &mut dyn DrawContext,
        rough: &mut Option<&mut dyn RoughRenderer>,
        id: NodeId,
        signals: &NodeSignals,
    ) -> SceneResult<()> {
        let graph = self.graph();
        if graph.get(signals.geometry)?.is_none() {
            return Ok(());
        }

        if graph.get(signals.rough)? {
            match rough {
                Some(renderer) => return draw_rough(ctx, &mut **renderer, id, signals, self),
                None => warn!(?id, "rough node rendered without a rough renderer, drawing it plainly"),
            }
        }

        let path = graph.get(signals.path)?;
        let fill = graph.get(signals.fill)?;
        let line_width = graph.get(signals.line_width)?;
        let stroke = graph.get(signals.stroke)?.filter(|_| line_width > 0.0);

        draw_ripple(ctx, signals, self, fill.as_ref().or(stroke.as_ref()))?;

        let stroke = match stroke {
            Some(brush) => {
                let style = Stroke::new(line_width)
                    .with_cap(graph.get(signals.line_cap)?)
                    .with_join(graph.get(signals.line_join)?)
                    .with_dash(graph.get(signals.line_dash)?, graph.get(signals.dash_offset)?);
                Some((style, brush))
            }
            None => None,
        };

        let stroke_first = graph.get(signals.stroke_first)?;
        if stroke_first {
            if let Some((style, brush)) = &stroke {
                ctx.stroke_path(&path, style, brush);
            }
        }
        if let Some(brush) = &fill {
            ctx.fill_path(&path, brush);
        }
        if !stroke_first {
            if let Some((style, brush)) = &stroke {
                ctx.stroke_path(&path, style, brush);
            }
        }
        Ok(())
    }
}

/// Stable per-node seed for shapes without a configured one
fn node_seed(id: NodeId) -> u64 {
    let mut hasher = FxHasher::default();
    id.hash(&mut hasher);
    hasher.finish()
}

fn draw_rough(
    ctx: &mut dyn DrawContext,
    renderer: &mut dyn RoughRenderer,
    id: NodeId,
    signals: &NodeSignals,
    scene: &Scene,
) -> SceneResult<()> {
    let graph = scene.graph();
    let path_data = graph.get(signals.path_data)?;
    if path_data.is_empty() {
        return Ok(());
    }

    let config = graph.get(signals.rough_config)?;
    let seed = config.seed.unwrap_or_else(|| node_seed(id));
    let fill = graph.get(signals.fill)?;
    let stroke = graph.get(signals.stroke)?;
    let options = RoughOptions::new(
        config,
        seed,
        fill.as_ref(),
        stroke.as_ref(),
        graph.get(signals.line_width)?,
    );
    renderer.draw_path(ctx, &path_data, &options);
    Ok(())
}

fn draw_ripple(
    ctx: &mut dyn DrawContext,
    signals: &NodeSignals,
    scene: &Scene,
    brush: Option<&Brush>,
) -> SceneResult<()> {
    let graph = scene.graph();
    let strength = graph.get(signals.ripple_strength)?;
    let Some(brush) = brush else {
        return Ok(());
    };
    if strength <= 0.0 {
        return Ok(());
    }

    let spread = Easing::OutExpo.interpolate(0.0, RIPPLE_SPREAD, strength);
    let size = signals.size.get(graph)? + Vector2::from(spread);
    let offset = signals.offset.get(graph)?;
    let path = graph.get(signals.geometry)?.grown(spread).to_path(size, offset);

    ctx.push_opacity(RIPPLE_ALPHA * (1.0 - strength.min(1.0)));
    ctx.fill_path(&path, brush);
    ctx.pop_opacity();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::node::NodeProps;
    use motif_core::{Color, DrawCommand, RecordingContext};
    use motif_paint::RoughConfig;

    fn viewport() -> RecordingContext {
        RecordingContext::new(Vector2::new(200.0, 100.0))
    }

    fn fills(ctx: &RecordingContext) -> Vec<(Brush, Matrix, f64)> {
        ctx.commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillPath { brush, transform, opacity, .. } => {
                    Some((brush.clone(), *transform, *opacity))
                }
                _ => None,
            })
            .collect()
    }

    fn strokes(ctx: &RecordingContext) -> usize {
        ctx.commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokePath { .. }))
            .count()
    }

    #[derive(Default)]
    struct Sketcher {
        calls: Vec<(String, RoughOptions)>,
    }

    impl RoughRenderer for Sketcher {
        fn draw_path(&mut self, _ctx: &mut dyn DrawContext, path_data: &str, options: &RoughOptions) {
            self.calls.push((path_data.to_string(), options.clone()));
        }
    }

    #[test]
    fn test_empty_scene_draws_nothing() {
        let scene = Scene::default();
        let mut ctx = viewport();
        scene.render(&mut ctx).unwrap();
        assert_eq!(ctx.paint_commands().count(), 0);
        assert_eq!(ctx.current_transform(), Matrix::IDENTITY);
    }

    #[test]
    fn test_background_fills_view() {
        let scene = Scene::new(SceneConfig::preview().with_background(Color::BLACK));
        let mut ctx = viewport();
        scene.render(&mut ctx).unwrap();

        let fills = fills(&ctx);
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].0, Brush::from(Color::BLACK));
        assert_eq!(fills[0].1.offset(), Vector2::new(100.0, 50.0));
    }

    #[test]
    fn test_node_transform_and_order() {
        let scene = Scene::default();
        scene
            .spawn(
                scene.root(),
                NodeProps::rect((20.0, 20.0))
                    .position((10.0, 0.0))
                    .fill(Color::RED)
                    .stroke(Color::BLUE)
                    .line_width(2.0),
            )
            .unwrap();

        let mut ctx = viewport();
        scene.render(&mut ctx).unwrap();

        let paint: Vec<_> = ctx.paint_commands().collect();
        assert_eq!(paint.len(), 2);
        assert!(matches!(paint[0], DrawCommand::FillPath { .. }));
        assert!(matches!(paint[1], DrawCommand::StrokePath { .. }));
        assert_eq!(fills(&ctx)[0].1.offset(), Vector2::new(110.0, 50.0));
    }

    #[test]
    fn test_stroke_first() {
        let scene = Scene::default();
        scene
            .spawn(
                scene.root(),
                NodeProps::circle((20.0, 20.0))
                    .fill(Color::RED)
                    .stroke(Color::BLUE)
                    .line_width(2.0)
                    .stroke_first(true),
            )
            .unwrap();

        let mut ctx = viewport();
        scene.render(&mut ctx).unwrap();
        let paint: Vec<_> = ctx.paint_commands().collect();
        assert!(matches!(paint[0], DrawCommand::StrokePath { .. }));
        assert!(matches!(paint[1], DrawCommand::FillPath { .. }));
    }

    #[test]
    fn test_zero_line_width_skips_stroke() {
        let scene = Scene::default();
        scene
            .spawn(scene.root(), NodeProps::rect((20.0, 20.0)).stroke(Color::BLUE))
            .unwrap();

        let mut ctx = viewport();
        scene.render(&mut ctx).unwrap();
        assert_eq!(strokes(&ctx), 0);
    }

    #[test]
    fn test_transparent_subtree_is_skipped() {
        let scene = Scene::default();
        let parent = scene
            .spawn(scene.root(), NodeProps::rect((20.0, 20.0)).fill(Color::RED).opacity(0.0))
            .unwrap();
        scene
            .spawn(parent, NodeProps::rect((10.0, 10.0)).fill(Color::GREEN))
            .unwrap();

        let mut ctx = viewport();
        scene.render(&mut ctx).unwrap();
        assert_eq!(ctx.paint_commands().count(), 0);
    }

    #[test]
    fn test_opacity_multiplies_down() {
        let scene = Scene::default();
        let parent = scene.spawn(scene.root(), NodeProps::new().opacity(0.5)).unwrap();
        scene
            .spawn(parent, NodeProps::rect((10.0, 10.0)).fill(Color::GREEN).opacity(0.5))
            .unwrap();

        let mut ctx = viewport();
        scene.render(&mut ctx).unwrap();
        assert_eq!(fills(&ctx)[0].2, 0.25);
    }

    #[test]
    fn test_clip_wraps_children() {
        let scene = Scene::default();
        let parent = scene
            .spawn(scene.root(), NodeProps::rect((20.0, 20.0)).clip(true))
            .unwrap();
        scene
            .spawn(parent, NodeProps::rect((40.0, 40.0)).fill(Color::GREEN))
            .unwrap();

        let mut ctx = viewport();
        scene.render(&mut ctx).unwrap();

        let commands = ctx.commands();
        let push = commands
            .iter()
            .position(|c| matches!(c, DrawCommand::PushClip(_)))
            .unwrap();
        let fill = commands
            .iter()
            .position(|c| matches!(c, DrawCommand::FillPath { .. }))
            .unwrap();
        let pop = commands
            .iter()
            .position(|c| matches!(c, DrawCommand::PopClip))
            .unwrap();
        assert!(push < fill && fill < pop);
    }

    #[test]
    fn test_stacks_balance() {
        let scene = Scene::default();
        let parent = scene
            .spawn(scene.root(), NodeProps::rect((20.0, 20.0)).clip(true).fill(Color::RED))
            .unwrap();
        scene
            .spawn(parent, NodeProps::circle((10.0, 10.0)).fill(Color::GREEN))
            .unwrap();

        let mut ctx = viewport();
        scene.render(&mut ctx).unwrap();

        let count = |f: fn(&DrawCommand) -> bool| ctx.commands().iter().filter(|c| f(c)).count();
        assert_eq!(
            count(|c| matches!(c, DrawCommand::PushTransform(_))),
            count(|c| matches!(c, DrawCommand::PopTransform))
        );
        assert_eq!(
            count(|c| matches!(c, DrawCommand::PushOpacity(_))),
            count(|c| matches!(c, DrawCommand::PopOpacity))
        );
        assert_eq!(
            count(|c| matches!(c, DrawCommand::PushClip(_))),
            count(|c| matches!(c, DrawCommand::PopClip))
        );
    }

    #[test]
    fn test_rough_uses_renderer() {
        let scene = Scene::default();
        let id = scene
            .spawn(
                scene.root(),
                NodeProps::rect((10.0, 10.0))
                    .fill(Color::RED)
                    .rough(RoughConfig::default().with_seed(7)),
            )
            .unwrap();

        let mut ctx = viewport();
        let mut sketcher = Sketcher::default();
        scene.render_with(&mut ctx, Some(&mut sketcher)).unwrap();

        assert_eq!(ctx.paint_commands().count(), 0);
        assert_eq!(sketcher.calls.len(), 1);
        let (path_data, options) = &sketcher.calls[0];
        assert_eq!(path_data, &scene.node(id).path_data().unwrap());
        assert_eq!(options.seed, 7);
        assert_eq!(options.fill, Some(Color::RED));
    }

    #[test]
    fn test_rough_seed_is_stable() {
        let scene = Scene::default();
        scene
            .spawn(scene.root(), NodeProps::rect((10.0, 10.0)).rough(RoughConfig::default()))
            .unwrap();

        let mut first = Sketcher::default();
        let mut second = Sketcher::default();
        scene.render_with(&mut viewport(), Some(&mut first)).unwrap();
        scene.render_with(&mut viewport(), Some(&mut second)).unwrap();
        assert_eq!(first.calls[0].1.seed, second.calls[0].1.seed);
    }

    #[test]
    fn test_rough_without_renderer_falls_back() {
        let scene = Scene::default();
        scene
            .spawn(
                scene.root(),
                NodeProps::rect((10.0, 10.0)).fill(Color::RED).rough(RoughConfig::default()),
            )
            .unwrap();

        let mut ctx = viewport();
        scene.render(&mut ctx).unwrap();
        assert_eq!(fills(&ctx).len(), 1);
    }

    #[test]
    fn test_ripple_overlay() {
        let scene = Scene::default();
        let id = scene
            .spawn(scene.root(), NodeProps::rect((10.0, 10.0)).fill(Color::RED))
            .unwrap();
        scene.node(id).ripple_strength().set(0.5).unwrap();

        let mut ctx = viewport();
        scene.render(&mut ctx).unwrap();

        let fills = fills(&ctx);
        assert_eq!(fills.len(), 2);
        assert!((fills[0].2 - 0.27).abs() < 1e-9);
        assert_eq!(fills[1].2, 1.0);

        let bounds: Vec<Rect> = ctx
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillPath { path, .. } => Some(path.bounds()),
                _ => None,
            })
            .collect();
        assert!(bounds[0].width > bounds[1].width);
    }
}
