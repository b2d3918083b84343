//! Motif Scene
//!
//! The node graph that ties the Motif crates together:
//!
//! - **Scene**: a node arena with a root view node, hierarchy edits and an
//!   active view
//! - **Nodes**: every property is a reactive signal; world matrices are
//!   computed signals that follow reparenting on their own
//! - **Transform signals**: position, scale, rotation and box origins read
//!   and written in local, absolute, view or node-relative space
//! - **Rendering**: depth-first replay onto a [`motif_core::DrawContext`]
//! - **Presets**: ready-made enter and exit animations
//!
//! # Example
//!
//! ```rust
//! use motif_animation::AnimationScheduler;
//! use motif_core::{Color, RecordingContext, Vector2};
//! use motif_scene::{NodeProps, Scene, SceneConfig};
//!
//! let scene = Scene::new(SceneConfig::preview());
//! let card = scene
//!     .spawn(scene.root(), NodeProps::rect((200.0, 120.0)).position((100.0, 0.0)))
//!     .unwrap();
//! let dot = scene
//!     .spawn(card, NodeProps::circle((20.0, 20.0)).fill(Color::RED))
//!     .unwrap();
//!
//! // Move the dot to the scene origin without touching the card
//! scene.node(dot).position().abs().set((0.0, 0.0)).unwrap();
//! assert_eq!(scene.node(dot).position().get().unwrap(), Vector2::new(-100.0, 0.0));
//!
//! let mut scheduler = AnimationScheduler::new(scene.config().fps);
//! scheduler.spawn(scene.node(card).rotation().animate(90.0, 0.5).unwrap());
//! scheduler.run_until_idle(60).unwrap();
//!
//! let mut ctx = RecordingContext::new(scene.config().size());
//! scene.render(&mut ctx).unwrap();
//! assert_eq!(ctx.paint_commands().count(), 1);
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod handle;
pub mod node;
pub mod origin;
pub mod presets;
mod render;
pub mod scene;
pub mod transform;

pub use config::SceneConfig;
pub use error::{SceneError, SceneResult};
pub use geometry::{node_box, Geometry};
pub use handle::{ComponentProperty, NodeRef, Property, VectorProperty};
pub use node::{NodeProps, NodeSignals};
pub use origin::{Origin, OriginProjection};
pub use presets::Direction;
pub use scene::{NodeId, Scene};
pub use transform::{
    ComponentSignal, PositionProjection, Projection, RotationProjection, ScaleProjection, Space,
    TransformSignal,
};
