//! Tick-driven animation tasks
//!
//! A [`Task`] is a resumable unit of animation. The scheduler calls
//! [`Task::step`] once per frame; returning [`TaskStatus::Pending`] suspends
//! the task until the next frame.
//!
//! [`Tween`] is the primitive: it samples progress from 0 to 1 across its
//! duration, reshapes it with an [`Easing`], interpolates between the start
//! value (captured on the first frame) and the target, and writes the result
//! once per frame. The final frame writes the target exactly.
//!
//! Combinators compose tasks the way animation scripts do: [`all`] runs
//! tasks in parallel, [`sequence`] one after another (a finished task hands
//! over to the next within the same frame), [`wait_for`] idles, [`call`]
//! runs a side effect and [`lazy`] defers building a task until it starts.

use std::rc::Rc;

use motif_core::{Compound, CompoundSignal, ReactiveGraph, Signal};

use crate::easing::Easing;
use crate::error::AnimationResult;
use crate::values::Interpolate;

/// Absorbs floating-point drift when accumulating frame durations.
const TIME_EPSILON: f64 = 1e-9;

/// Whether a task needs more frames
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Done,
}

/// A resumable animation step function
pub trait Task {
    /// Advance by one frame of `dt` seconds
    fn step(&mut self, dt: f64) -> AnimationResult<TaskStatus>;
}

pub type BoxedTask = Box<dyn Task>;

impl<T: Task + ?Sized> Task for Box<T> {
    fn step(&mut self, dt: f64) -> AnimationResult<TaskStatus> {
        (**self).step(dt)
    }
}

// ============================================================================
// Tween
// ============================================================================

/// `(from, to, progress) -> value`
pub type InterpolationFn<T> = Rc<dyn Fn(&T, &T, f64) -> T>;

/// Where a tween reads its start value and writes its frames
pub trait TweenTarget<T> {
    fn read(&mut self) -> AnimationResult<T>;
    fn write(&mut self, value: T) -> AnimationResult<()>;
}

/// Tween target for a plain signal
pub struct SignalTarget<T> {
    graph: Rc<ReactiveGraph>,
    signal: Signal<T>,
}

impl<T> SignalTarget<T> {
    pub fn new(graph: Rc<ReactiveGraph>, signal: Signal<T>) -> Self {
        Self { graph, signal }
    }
}

impl<T: Clone + 'static> TweenTarget<T> for SignalTarget<T> {
    fn read(&mut self) -> AnimationResult<T> {
        Ok(self.graph.get_untracked(self.signal)?)
    }

    fn write(&mut self, value: T) -> AnimationResult<()> {
        Ok(self.graph.set(self.signal, value)?)
    }
}

/// Tween target for a compound signal
pub struct CompoundTarget<T> {
    graph: Rc<ReactiveGraph>,
    signal: CompoundSignal<T>,
}

impl<T> CompoundTarget<T> {
    pub fn new(graph: Rc<ReactiveGraph>, signal: CompoundSignal<T>) -> Self {
        Self { graph, signal }
    }
}

impl<T: Compound> TweenTarget<T> for CompoundTarget<T> {
    fn read(&mut self) -> AnimationResult<T> {
        let graph = self.graph.clone();
        Ok(graph.untracked(|g| self.signal.get(g))?)
    }

    fn write(&mut self, value: T) -> AnimationResult<()> {
        Ok(self.signal.set(&self.graph, value)?)
    }
}

/// Animates a target value over time
pub struct Tween<T> {
    sink: Box<dyn TweenTarget<T>>,
    target: T,
    duration: f64,
    easing: Easing,
    interpolation: Option<InterpolationFn<T>>,
    start: Option<T>,
    elapsed: f64,
}

impl<T: Interpolate + 'static> Tween<T> {
    pub fn new(sink: impl TweenTarget<T> + 'static, target: T, duration: f64) -> Self {
        Self {
            sink: Box::new(sink),
            target,
            duration: duration.max(0.0),
            easing: Easing::default(),
            interpolation: None,
            start: None,
            elapsed: 0.0,
        }
    }

    /// Tween a plain signal
    pub fn signal(graph: Rc<ReactiveGraph>, signal: Signal<T>, target: T, duration: f64) -> Self {
        Self::new(SignalTarget::new(graph, signal), target, duration)
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Replace the value type's [`Interpolate::lerp`]
    pub fn interpolation(mut self, interpolation: impl Fn(&T, &T, f64) -> T + 'static) -> Self {
        self.interpolation = Some(Rc::new(interpolation));
        self
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Whether the start value has been captured
    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    fn sample(&self, start: &T, progress: f64) -> T {
        let eased = self.easing.apply(progress);
        match &self.interpolation {
            Some(interpolate) => interpolate(start, &self.target, eased),
            None => start.lerp(&self.target, eased),
        }
    }
}

impl<T: Interpolate + 'static> Task for Tween<T> {
    fn step(&mut self, dt: f64) -> AnimationResult<TaskStatus> {
        let start = match &self.start {
            Some(start) => start.clone(),
            None => {
                let start = self.sink.read()?;
                self.start = Some(start.clone());
                start
            }
        };

        if self.elapsed + TIME_EPSILON >= self.duration {
            self.sink.write(self.target.clone())?;
            return Ok(TaskStatus::Done);
        }

        let value = self.sample(&start, self.elapsed / self.duration);
        self.sink.write(value)?;
        self.elapsed += dt;
        Ok(TaskStatus::Pending)
    }
}

// ============================================================================
// Combinators
// ============================================================================

/// Runs every task each frame until all are done
pub struct All {
    tasks: Vec<Option<BoxedTask>>,
}

impl Task for All {
    fn step(&mut self, dt: f64) -> AnimationResult<TaskStatus> {
        for slot in &mut self.tasks {
            if let Some(task) = slot {
                if task.step(dt)? == TaskStatus::Done {
                    *slot = None;
                }
            }
        }
        if self.tasks.iter().all(Option::is_none) {
            Ok(TaskStatus::Done)
        } else {
            Ok(TaskStatus::Pending)
        }
    }
}

/// Runs tasks one after another
pub struct Sequence {
    tasks: Vec<BoxedTask>,
    current: usize,
}

impl Task for Sequence {
    fn step(&mut self, dt: f64) -> AnimationResult<TaskStatus> {
        while let Some(task) = self.tasks.get_mut(self.current) {
            match task.step(dt)? {
                TaskStatus::Pending => return Ok(TaskStatus::Pending),
                TaskStatus::Done => self.current += 1,
            }
        }
        Ok(TaskStatus::Done)
    }
}

/// Idles for a duration
pub struct Wait {
    duration: f64,
    elapsed: f64,
}

impl Task for Wait {
    fn step(&mut self, dt: f64) -> AnimationResult<TaskStatus> {
        if self.elapsed + TIME_EPSILON >= self.duration {
            return Ok(TaskStatus::Done);
        }
        self.elapsed += dt;
        Ok(TaskStatus::Pending)
    }
}

/// Runs a side effect once and finishes in the same frame
pub struct Call<F> {
    callback: Option<F>,
}

impl<F> Task for Call<F>
where
    F: FnOnce() -> AnimationResult<()>,
{
    fn step(&mut self, _dt: f64) -> AnimationResult<TaskStatus> {
        if let Some(callback) = self.callback.take() {
            callback()?;
        }
        Ok(TaskStatus::Done)
    }
}

/// Builds its inner task on the first frame
pub struct Lazy<F> {
    factory: Option<F>,
    task: Option<BoxedTask>,
}

impl<F> Task for Lazy<F>
where
    F: FnOnce() -> AnimationResult<BoxedTask>,
{
    fn step(&mut self, dt: f64) -> AnimationResult<TaskStatus> {
        if let Some(factory) = self.factory.take() {
            self.task = Some(factory()?);
        }
        match &mut self.task {
            Some(task) => task.step(dt),
            None => Ok(TaskStatus::Done),
        }
    }
}

/// Run tasks in parallel
pub fn all(tasks: Vec<BoxedTask>) -> All {
    All {
        tasks: tasks.into_iter().map(Some).collect(),
    }
}

/// Run tasks one after another
pub fn sequence(tasks: Vec<BoxedTask>) -> Sequence {
    Sequence { tasks, current: 0 }
}

/// Do nothing for `duration` seconds
pub fn wait_for(duration: f64) -> Wait {
    Wait {
        duration: duration.max(0.0),
        elapsed: 0.0,
    }
}

/// Run `callback` when the task is reached
pub fn call<F>(callback: F) -> Call<F>
where
    F: FnOnce() -> AnimationResult<()>,
{
    Call {
        callback: Some(callback),
    }
}

/// Build a task when it is first stepped, so it sees the state at that time
pub fn lazy<F>(factory: F) -> Lazy<F>
where
    F: FnOnce() -> AnimationResult<BoxedTask>,
{
    Lazy {
        factory: Some(factory),
        task: None,
    }
}

/// Start `task` after `duration` seconds
pub fn delay(duration: f64, task: impl Task + 'static) -> Sequence {
    sequence(vec![Box::new(wait_for(duration)), Box::new(task)])
}

/// Start each task `interval` seconds after the previous one
pub fn stagger(interval: f64, tasks: Vec<BoxedTask>) -> All {
    all(tasks
        .into_iter()
        .enumerate()
        .map(|(index, task)| Box::new(delay(interval * index as f64, task)) as BoxedTask)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    const DT: f64 = 0.25;

    fn run(task: &mut dyn Task, max: usize) -> usize {
        for frame in 1..=max {
            if task.step(DT).unwrap() == TaskStatus::Done {
                return frame;
            }
        }
        max
    }

    #[test]
    fn test_tween_samples_and_lands_exactly() {
        let graph = Rc::new(ReactiveGraph::new());
        let value = graph.create_signal(0.0);
        let mut tween = Tween::signal(graph.clone(), value, 10.0, 1.0).easing(Easing::Linear);

        let mut seen = Vec::new();
        loop {
            let status = tween.step(DT).unwrap();
            seen.push(graph.get(value).unwrap());
            if status == TaskStatus::Done {
                break;
            }
        }
        assert_eq!(seen, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
    }

    #[test]
    fn test_tween_captures_start_on_first_step() {
        let graph = Rc::new(ReactiveGraph::new());
        let value = graph.create_signal(0.0);
        let mut tween = Tween::signal(graph.clone(), value, 10.0, 1.0).easing(Easing::Linear);

        // value changed after the tween was created but before it started
        graph.set(value, 6.0).unwrap();
        assert!(!tween.is_started());
        tween.step(DT).unwrap();
        tween.step(DT).unwrap();
        assert_eq!(graph.get(value).unwrap(), 7.0);
    }

    #[test]
    fn test_zero_duration_tween() {
        let graph = Rc::new(ReactiveGraph::new());
        let value = graph.create_signal(1.0);
        let mut tween = Tween::signal(graph.clone(), value, 3.0, 0.0);
        assert_eq!(tween.step(DT).unwrap(), TaskStatus::Done);
        assert_eq!(graph.get(value).unwrap(), 3.0);
    }

    #[test]
    fn test_custom_interpolation() {
        let graph = Rc::new(ReactiveGraph::new());
        let value = graph.create_signal(0.0);
        let mut tween = Tween::signal(graph.clone(), value, 8.0, 1.0)
            .easing(Easing::Linear)
            .interpolation(|from: &f64, to: &f64, t| if t < 0.5 { *from } else { *to });
        tween.step(DT).unwrap();
        tween.step(DT).unwrap();
        assert_eq!(graph.get(value).unwrap(), 0.0);
        tween.step(DT).unwrap();
        assert_eq!(graph.get(value).unwrap(), 8.0);
    }

    #[test]
    fn test_sequence_hands_over_within_frame() {
        let graph = Rc::new(ReactiveGraph::new());
        let a = graph.create_signal(0.0);
        let b = graph.create_signal(0.0);
        let mut seq = sequence(vec![
            Box::new(Tween::signal(graph.clone(), a, 1.0, 0.5).easing(Easing::Linear)),
            Box::new(Tween::signal(graph.clone(), b, 1.0, 0.5).easing(Easing::Linear)),
        ]);

        // a: 0, 0.5, done(1) + b starts at 0 in the same frame
        seq.step(DT).unwrap();
        seq.step(DT).unwrap();
        seq.step(DT).unwrap();
        assert_eq!(graph.get(a).unwrap(), 1.0);
        assert_eq!(graph.get(b).unwrap(), 0.0);
        assert_eq!(run(&mut seq, 10), 2);
        assert_eq!(graph.get(b).unwrap(), 1.0);
    }

    #[test]
    fn test_all_waits_for_longest() {
        let graph = Rc::new(ReactiveGraph::new());
        let a = graph.create_signal(0.0);
        let b = graph.create_signal(0.0);
        let mut both = all(vec![
            Box::new(Tween::signal(graph.clone(), a, 1.0, 0.25)),
            Box::new(Tween::signal(graph.clone(), b, 1.0, 1.0)),
        ]);
        assert_eq!(run(&mut both, 20), 5);
        assert_eq!(graph.get(a).unwrap(), 1.0);
        assert_eq!(graph.get(b).unwrap(), 1.0);
    }

    #[test]
    fn test_call_wait_and_lazy() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let built = Rc::new(Cell::new(false));
        let (log_a, log_b, built_inner) = (log.clone(), log.clone(), built.clone());

        let mut task = sequence(vec![
            Box::new(call(move || {
                log_a.borrow_mut().push("start");
                Ok(())
            })),
            Box::new(wait_for(0.5)),
            Box::new(lazy(move || {
                built_inner.set(true);
                Ok(Box::new(call(move || {
                    log_b.borrow_mut().push("end");
                    Ok(())
                })) as BoxedTask)
            })),
        ]);

        task.step(DT).unwrap();
        assert_eq!(*log.borrow(), vec!["start"]);
        assert!(!built.get());
        assert_eq!(run(&mut task, 10), 2);
        assert!(built.get());
        assert_eq!(*log.borrow(), vec!["start", "end"]);
    }

    #[test]
    fn test_stagger_offsets_starts() {
        let graph = Rc::new(ReactiveGraph::new());
        let a = graph.create_signal(0.0);
        let b = graph.create_signal(0.0);
        let mut staggered = stagger(
            0.5,
            vec![
                Box::new(Tween::signal(graph.clone(), a, 1.0, 0.5).easing(Easing::Linear)),
                Box::new(Tween::signal(graph.clone(), b, 1.0, 0.5).easing(Easing::Linear)),
            ],
        );
        staggered.step(DT).unwrap();
        staggered.step(DT).unwrap();
        assert_eq!(graph.get(a).unwrap(), 0.5);
        assert_eq!(graph.get(b).unwrap(), 0.0);
        assert_eq!(run(&mut staggered, 10), 3);
        assert_eq!(graph.get(b).unwrap(), 1.0);
    }

    #[test]
    fn test_compound_target() {
        use motif_core::Vector2;

        let graph = Rc::new(ReactiveGraph::new());
        let position = CompoundSignal::<Vector2>::new(&graph, "position", Vector2::ZERO);
        let mut tween = Tween::new(
            CompoundTarget::new(graph.clone(), position.clone()),
            Vector2::new(4.0, 8.0),
            0.5,
        )
        .easing(Easing::Linear);

        tween.step(DT).unwrap();
        tween.step(DT).unwrap();
        assert_eq!(position.get(&graph).unwrap(), Vector2::new(2.0, 4.0));
        tween.step(DT).unwrap();
        assert_eq!(position.get(&graph).unwrap(), Vector2::new(4.0, 8.0));
    }
}
