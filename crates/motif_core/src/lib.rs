//! Motif Core
//!
//! Foundational primitives for the Motif animation engine:
//!
//! - **Geometry**: [`Vector2`], affine [`Matrix`] and [`Rect`]
//! - **Reactive Signals**: lazily evaluated, cached, dependency-tracked cells
//! - **Compound Signals**: vector-valued signals with per-component access
//! - **Draw Context**: the immediate-mode surface scenes render onto
//!
//! # Example
//!
//! ```rust
//! use motif_core::{CompoundSignal, ReactiveGraph, Vector2};
//!
//! let graph = ReactiveGraph::new();
//! let position = CompoundSignal::<Vector2>::new(&graph, "position", Vector2::ZERO);
//! let x = position.component("x").unwrap();
//! let distance = graph.create_computed({
//!     let position = position.clone();
//!     move |g| Ok(position.get(g)?.magnitude())
//! });
//!
//! position.set(&graph, (3.0, 4.0)).unwrap();
//! assert_eq!(graph.get(distance).unwrap(), 5.0);
//!
//! graph.set(x, 0.0).unwrap();
//! assert_eq!(graph.get(distance).unwrap(), 4.0);
//! ```

pub mod color;
pub mod compound;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod reactive;

pub use color::{Brush, Color, Gradient, GradientStop, ParseColorError, Pattern, PatternRepetition};
pub use compound::{Compound, CompoundSignal};
pub use draw::{DrawCommand, DrawContext, LineCap, LineJoin, Path, PathCommand, RecordingContext, Stroke};
pub use error::{SignalError, SignalResult};
pub use geometry::{clamp_magnitude, finite_or_zero, Matrix, Rect, Vector2, EPSILON};
pub use reactive::{
    Effect, EffectId, Formula, Parser, ReactiveGraph, ReactiveStats, Signal, SignalId,
    SignalOptions, SignalValue, SubscriberId,
};
