//! Active task registry and per-frame advancement

use std::fmt::Debug;
use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

use super::property::Animatable;
use super::task::AnimationTask;

new_key_type! {
    /// Handle to a registered animation task
    pub struct TaskId;
}

/// Registry of in-flight animation tasks
///
/// A target's property is owned by at most one task: starting a task evicts
/// every active task on the same target whose property set overlaps, and the
/// evicted tasks' continuations are dropped unseen.
pub struct AnimationScheduler<T, K> {
    tasks: SlotMap<TaskId, AnimationTask<T, K>>,
    /// Registration order, used to keep completion order deterministic
    order: Vec<TaskId>,
}

impl<T, K> Default for AnimationScheduler<T, K> {
    fn default() -> Self {
        Self {
            tasks: SlotMap::with_key(),
            order: Vec::new(),
        }
    }
}

impl<T: Copy + PartialEq + Debug, K> AnimationScheduler<T, K> {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task, replacing any overlapping task on the same target
    pub fn start(&mut self, task: AnimationTask<T, K>) -> TaskId {
        let target = task.target();
        let properties = task.properties();

        let tasks = &self.tasks;
        let evicted: Vec<TaskId> = self
            .order
            .iter()
            .copied()
            .filter(|id| {
                tasks.get(*id).is_some_and(|existing| {
                    existing.target() == target && existing.properties().intersects(properties)
                })
            })
            .collect();
        for id in evicted {
            log::debug!("Replacing animation on {:?} ({:?})", target, properties);
            self.remove(id);
        }

        let id = self.tasks.insert(task);
        self.order.push(id);
        id
    }

    /// Drop a task without its continuation
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.remove(id).is_some()
    }

    /// Drop every task animating `target`; returns how many were dropped
    pub fn cancel_target(&mut self, target: T) -> usize {
        let doomed: Vec<TaskId> = self
            .order
            .iter()
            .copied()
            .filter(|id| self.tasks.get(*id).is_some_and(|task| task.target() == target))
            .collect();
        for id in &doomed {
            self.remove(*id);
        }
        doomed.len()
    }

    /// Drop every task without running continuations
    pub fn clear(&mut self) -> usize {
        let dropped = self.tasks.len();
        self.tasks.clear();
        self.order.clear();
        dropped
    }

    /// Whether any task animates `target`
    pub fn is_animating(&self, target: T) -> bool {
        self.tasks.values().any(|task| task.target() == target)
    }

    /// Whether the task is still registered
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    /// Look up a registered task
    pub fn get(&self, id: TaskId) -> Option<&AnimationTask<T, K>> {
        self.tasks.get(id)
    }

    /// Number of registered tasks
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is registered
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Advance every task by `dt`, write interpolated values into `world`
    /// and return the continuations of the tasks that completed, in
    /// registration order.
    ///
    /// Tasks registered after this call returns start from zero elapsed time
    /// on the next tick.
    pub fn tick<A: Animatable<T>>(&mut self, dt: Duration, world: &mut A) -> Vec<K> {
        let mut finished = Vec::new();
        let mut orphaned = Vec::new();

        for &id in &self.order {
            let Some(task) = self.tasks.get_mut(id) else {
                continue;
            };
            if !task.advance(dt) {
                continue;
            }
            if !task.resolve(&*world) {
                orphaned.push(id);
                continue;
            }
            task.apply(world);
            if task.is_complete() {
                finished.push(id);
            }
        }

        for id in orphaned {
            if let Some(task) = self.remove(id) {
                log::debug!("Dropping animation for vanished target {:?}", task.target());
            }
        }

        finished
            .into_iter()
            .filter_map(|id| self.remove(id))
            .filter_map(|mut task| task.take_continuation())
            .collect()
    }

    fn remove(&mut self, id: TaskId) -> Option<AnimationTask<T, K>> {
        let task = self.tasks.remove(id)?;
        self.order.retain(|existing| *existing != id);
        Some(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Easing, Property, TargetValue};
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Board {
        values: HashMap<(u8, Property), f32>,
    }

    impl Board {
        fn with(mut self, target: u8, property: Property, value: f32) -> Self {
            self.values.insert((target, property), value);
            self
        }

        fn value(&self, target: u8, property: Property) -> f32 {
            self.values[&(target, property)]
        }
    }

    impl Animatable<u8> for Board {
        fn read(&self, target: u8, property: Property) -> Option<f32> {
            self.values.get(&(target, property)).copied()
        }

        fn write(&mut self, target: u8, property: Property, value: f32) {
            self.values.insert((target, property), value);
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_linear_interpolation_midway() {
        let mut board = Board::default().with(1, Property::PositionX, 0.0);
        let mut scheduler: AnimationScheduler<u8, &str> = AnimationScheduler::new();
        scheduler.start(
            AnimationTask::new(1, ms(1000)).with_track(Property::PositionX, TargetValue::To(10.0)),
        );

        let done = scheduler.tick(ms(250), &mut board);
        assert!(done.is_empty());
        assert_relative_eq!(board.value(1, Property::PositionX), 2.5);

        scheduler.tick(ms(250), &mut board);
        assert_relative_eq!(board.value(1, Property::PositionX), 5.0);
    }

    #[test]
    fn test_easing_shapes_progress() {
        let mut board = Board::default().with(1, Property::PositionY, 0.0);
        let mut scheduler: AnimationScheduler<u8, ()> = AnimationScheduler::new();
        scheduler.start(
            AnimationTask::new(1, ms(100))
                .with_track(Property::PositionY, TargetValue::To(4.0))
                .with_easing(Easing::QuadraticOut),
        );

        scheduler.tick(ms(50), &mut board);
        assert_relative_eq!(board.value(1, Property::PositionY), 3.0);
    }

    #[test]
    fn test_continuation_returned_exactly_once() {
        let mut board = Board::default().with(1, Property::Yaw, 0.0);
        let mut scheduler = AnimationScheduler::new();
        let id = scheduler.start(
            AnimationTask::new(1, ms(100))
                .with_track(Property::Yaw, TargetValue::To(1.0))
                .then("turned"),
        );

        assert!(scheduler.tick(ms(60), &mut board).is_empty());
        assert_eq!(scheduler.tick(ms(60), &mut board), vec!["turned"]);
        assert!(!scheduler.contains(id));
        assert_eq!(board.value(1, Property::Yaw), 1.0);
        assert!(scheduler.tick(ms(60), &mut board).is_empty());
    }

    #[test]
    fn test_delay_holds_values() {
        let mut board = Board::default().with(1, Property::PositionX, 0.0);
        let mut scheduler: AnimationScheduler<u8, ()> = AnimationScheduler::new();
        scheduler.start(
            AnimationTask::new(1, ms(100))
                .with_track(Property::PositionX, TargetValue::To(10.0))
                .with_delay(ms(100)),
        );

        scheduler.tick(ms(50), &mut board);
        assert_eq!(board.value(1, Property::PositionX), 0.0);

        // 50ms of delay left, the other 50ms counts as progress
        scheduler.tick(ms(100), &mut board);
        assert_relative_eq!(board.value(1, Property::PositionX), 5.0);
    }

    #[test]
    fn test_offset_captured_after_delay() {
        let mut board = Board::default().with(1, Property::PositionY, 1.0);
        let mut scheduler: AnimationScheduler<u8, ()> = AnimationScheduler::new();
        scheduler.start(
            AnimationTask::new(1, ms(100))
                .with_track(Property::PositionY, TargetValue::By(2.0))
                .with_delay(ms(100)),
        );

        scheduler.tick(ms(50), &mut board);
        board.write(1, Property::PositionY, 5.0);
        scheduler.tick(ms(150), &mut board);
        assert_eq!(board.value(1, Property::PositionY), 7.0);
    }

    #[test]
    fn test_overlapping_task_replaced_without_continuation() {
        let mut board = Board::default()
            .with(1, Property::PositionX, 0.0)
            .with(1, Property::PositionY, 0.0)
            .with(1, Property::PositionZ, 0.0);
        let mut scheduler = AnimationScheduler::new();
        let first = scheduler.start(
            AnimationTask::new(1, ms(100))
                .with_position(crate::foundation::math::Vec3::new(1.0, 1.0, 1.0))
                .then("first"),
        );
        let second = scheduler.start(
            AnimationTask::new(1, ms(100))
                .with_track(Property::PositionY, TargetValue::To(-1.0))
                .then("second"),
        );

        assert!(!scheduler.contains(first));
        assert!(scheduler.contains(second));
        assert_eq!(scheduler.tick(ms(100), &mut board), vec!["second"]);
        assert_eq!(board.value(1, Property::PositionX), 0.0);
    }

    #[test]
    fn test_disjoint_properties_run_concurrently() {
        let mut board = Board::default()
            .with(1, Property::PositionX, 0.0)
            .with(1, Property::Yaw, 0.0)
            .with(2, Property::PositionX, 0.0);
        let mut scheduler = AnimationScheduler::new();
        scheduler.start(
            AnimationTask::new(1, ms(100))
                .with_track(Property::PositionX, TargetValue::To(1.0))
                .then("move"),
        );
        scheduler.start(
            AnimationTask::new(1, ms(100))
                .with_track(Property::Yaw, TargetValue::To(1.0))
                .then("turn"),
        );
        scheduler.start(
            AnimationTask::new(2, ms(100))
                .with_track(Property::PositionX, TargetValue::To(1.0))
                .then("other"),
        );

        assert_eq!(scheduler.active_count(), 3);
        assert_eq!(scheduler.tick(ms(100), &mut board), vec!["move", "turn", "other"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_vanished_target_dropped_silently() {
        let mut board = Board::default();
        let mut scheduler = AnimationScheduler::new();
        scheduler.start(
            AnimationTask::new(9, ms(100))
                .with_track(Property::PositionX, TargetValue::To(1.0))
                .then("never"),
        );

        assert!(scheduler.tick(ms(200), &mut board).is_empty());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_clear_and_cancel_drop_continuations() {
        let mut board = Board::default().with(1, Property::PositionX, 0.0);
        let mut scheduler = AnimationScheduler::new();
        let id = scheduler.start(
            AnimationTask::new(1, ms(100))
                .with_track(Property::PositionX, TargetValue::To(1.0))
                .then("a"),
        );
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));

        scheduler.start(
            AnimationTask::new(1, ms(100))
                .with_track(Property::PositionX, TargetValue::To(1.0))
                .then("b"),
        );
        assert_eq!(scheduler.cancel_target(1), 1);

        scheduler.start(
            AnimationTask::new(1, ms(100))
                .with_track(Property::PositionX, TargetValue::To(1.0))
                .then("c"),
        );
        assert_eq!(scheduler.clear(), 1);
        assert!(scheduler.tick(ms(100), &mut board).is_empty());
        assert_eq!(board.value(1, Property::PositionX), 0.0);
    }
}
