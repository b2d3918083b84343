//! Animation scheduler
//!
//! Owns the running tasks and advances them one fixed-length frame at a time.
//! Tasks are stepped in the order they were spawned, so when two tasks write
//! the same signal in one frame the later-spawned task's value wins.
//!
//! Cancelling a task stops it where it is. Values it already wrote stay.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::error::{AnimationError, AnimationResult};
use crate::task::{BoxedTask, Task, TaskStatus};

const DEFAULT_FPS: f64 = 60.0;

new_key_type! {
    /// Handle to a spawned task
    pub struct TaskId;
}

/// Fixed-step driver for animation tasks
pub struct AnimationScheduler {
    tasks: SlotMap<TaskId, BoxedTask>,
    /// Spawn order, used for deterministic stepping
    order: Vec<TaskId>,
    fps: f64,
    frame_duration: f64,
    frame: u64,
    time: f64,
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

impl AnimationScheduler {
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            warn!("invalid frame rate {fps}, falling back to {DEFAULT_FPS}");
            DEFAULT_FPS
        };
        Self {
            tasks: SlotMap::with_key(),
            order: Vec::new(),
            fps,
            frame_duration: 1.0 / fps,
            frame: 0,
            time: 0.0,
        }
    }

    /// Start driving `task` from the next tick
    pub fn spawn(&mut self, task: impl Task + 'static) -> TaskId {
        let id = self.tasks.insert(Box::new(task));
        self.order.push(id);
        debug!(?id, "spawned animation task");
        id
    }

    /// Stop a task without reverting what it wrote. Returns false if the
    /// task had already finished.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if self.tasks.remove(id).is_none() {
            return false;
        }
        self.order.retain(|other| *other != id);
        debug!(?id, "cancelled animation task");
        true
    }

    pub fn is_running(&self, id: TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    /// Number of live tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn frame_duration(&self) -> f64 {
        self.frame_duration
    }

    /// Frames ticked so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Seconds elapsed across all ticks
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Advance every live task by one frame
    ///
    /// Returns how many tasks are still running. A task that fails is
    /// dropped and logged while the remaining tasks keep stepping; the first
    /// failure is returned once the frame completes.
    pub fn tick(&mut self) -> AnimationResult<usize> {
        let dt = self.frame_duration;
        let mut first_error: Option<AnimationError> = None;
        let mut finished: SmallVec<[TaskId; 4]> = SmallVec::new();

        for &id in &self.order {
            let Some(task) = self.tasks.get_mut(id) else {
                continue;
            };
            match task.step(dt) {
                Ok(TaskStatus::Pending) => {}
                Ok(TaskStatus::Done) => {
                    debug!(?id, frame = self.frame, "animation task finished");
                    finished.push(id);
                }
                Err(err) => {
                    warn!(?id, frame = self.frame, "animation task failed: {err}");
                    finished.push(id);
                    first_error.get_or_insert(err);
                }
            }
        }

        for id in finished {
            self.tasks.remove(id);
        }
        let tasks = &self.tasks;
        self.order.retain(|id| tasks.contains_key(*id));

        self.frame += 1;
        self.time += dt;

        match first_error {
            Some(err) => Err(err),
            None => Ok(self.tasks.len()),
        }
    }

    /// Tick until no task is left or `max_frames` frames have passed.
    /// Returns the number of frames ticked.
    pub fn run_until_idle(&mut self, max_frames: u64) -> AnimationResult<u64> {
        let mut frames = 0;
        while !self.is_idle() && frames < max_frames {
            self.tick()?;
            frames += 1;
        }
        if !self.is_idle() {
            debug!(remaining = self.len(), "frame limit reached with tasks running");
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::task::{call, sequence, wait_for, Tween};
    use motif_core::{ReactiveGraph, SignalError};
    use std::rc::Rc;

    #[test]
    fn test_invalid_fps_falls_back() {
        assert_eq!(AnimationScheduler::new(0.0).fps(), 60.0);
        assert_eq!(AnimationScheduler::new(-5.0).fps(), 60.0);
        assert_eq!(AnimationScheduler::new(30.0).frame_duration(), 1.0 / 30.0);
    }

    #[test]
    fn test_tween_runs_to_completion() {
        let graph = Rc::new(ReactiveGraph::new());
        let opacity = graph.create_signal(1.0);
        let mut scheduler = AnimationScheduler::new(4.0);
        let id = scheduler.spawn(Tween::signal(graph.clone(), opacity, 0.0, 1.0));

        assert!(scheduler.is_running(id));
        // n frames of sampling plus the final exact write
        assert_eq!(scheduler.run_until_idle(100).unwrap(), 5);
        assert!(!scheduler.is_running(id));
        assert_eq!(graph.get(opacity).unwrap(), 0.0);
        assert_eq!(scheduler.frame(), 5);
    }

    #[test]
    fn test_cancel_keeps_written_value() {
        let graph = Rc::new(ReactiveGraph::new());
        let x = graph.create_signal(0.0);
        let mut scheduler = AnimationScheduler::new(4.0);
        let id = scheduler.spawn(Tween::signal(graph.clone(), x, 100.0, 1.0).easing(Easing::Linear));

        scheduler.tick().unwrap();
        scheduler.tick().unwrap();
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert_eq!(graph.get(x).unwrap(), 25.0);

        scheduler.tick().unwrap();
        assert_eq!(graph.get(x).unwrap(), 25.0);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_later_spawn_wins_same_signal() {
        let graph = Rc::new(ReactiveGraph::new());
        let x = graph.create_signal(0.0);
        let mut scheduler = AnimationScheduler::new(4.0);
        scheduler.spawn(Tween::signal(graph.clone(), x, 10.0, 0.0));
        scheduler.spawn(Tween::signal(graph.clone(), x, 20.0, 0.0));

        scheduler.tick().unwrap();
        assert_eq!(graph.get(x).unwrap(), 20.0);
    }

    #[test]
    fn test_failed_task_does_not_stop_others() {
        let graph = Rc::new(ReactiveGraph::new());
        let x = graph.create_signal(0.0);
        let doomed = graph.create_signal(0.0);
        graph.dispose(doomed);

        let mut scheduler = AnimationScheduler::new(4.0);
        scheduler.spawn(Tween::signal(graph.clone(), doomed, 1.0, 1.0));
        scheduler.spawn(Tween::signal(graph.clone(), x, 1.0, 0.5));

        let err = scheduler.tick().unwrap_err();
        assert!(matches!(
            err,
            AnimationError::Signal(SignalError::Disposed(_))
        ));
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.run_until_idle(10).unwrap(), 2);
        assert_eq!(graph.get(x).unwrap(), 1.0);
    }

    #[test]
    fn test_frame_limit() {
        let mut scheduler = AnimationScheduler::new(10.0);
        scheduler.spawn(sequence(vec![
            Box::new(wait_for(10.0)),
            Box::new(call(|| Ok(()))),
        ]));
        assert_eq!(scheduler.run_until_idle(3).unwrap(), 3);
        assert_eq!(scheduler.len(), 1);
        assert!((scheduler.time() - 0.3).abs() < 1e-9);
    }
}
