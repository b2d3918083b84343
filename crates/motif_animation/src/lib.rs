//! Motif Animation
//!
//! Time-based animation on top of the reactive graph in `motif_core`:
//!
//! - **Easing**: timing curves that reshape linear progress
//! - **Interpolation**: the [`Interpolate`] trait for animatable values
//! - **Tasks**: [`Tween`] plus the `all` / `sequence` / `wait_for` / `call`
//!   / `lazy` combinators
//! - **Scheduler**: a fixed-step frame driver for spawned tasks
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use motif_animation::{sequence, wait_for, AnimationScheduler, Easing, Tween};
//! use motif_core::ReactiveGraph;
//!
//! let graph = Rc::new(ReactiveGraph::new());
//! let opacity = graph.create_signal(0.0);
//!
//! let mut scheduler = AnimationScheduler::new(30.0);
//! scheduler.spawn(sequence(vec![
//!     Box::new(wait_for(0.5)),
//!     Box::new(Tween::signal(graph.clone(), opacity, 1.0, 0.3).easing(Easing::OutCubic)),
//! ]));
//!
//! scheduler.run_until_idle(120).unwrap();
//! assert_eq!(graph.get(opacity).unwrap(), 1.0);
//! ```

pub mod easing;
pub mod error;
pub mod scheduler;
pub mod task;
pub mod values;

pub use easing::Easing;
pub use error::{AnimationError, AnimationResult};
pub use scheduler::{AnimationScheduler, TaskId};
pub use task::{
    all, call, delay, lazy, sequence, stagger, wait_for, All, BoxedTask, Call, CompoundTarget,
    InterpolationFn, Lazy, Sequence, SignalTarget, Task, TaskStatus, Tween, TweenTarget, Wait,
};
pub use values::Interpolate;
