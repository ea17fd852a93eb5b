//! Periodic task scheduler
//!
//! Runs tasks (kinematic trackers, mostly) on their own cadence, decoupled
//! from the force-evaluation tick. The registry is shared through a cheap
//! cloneable handle; each tracker gets one at construction instead of
//! looking up a global queue by name.
//!
//! Tasks are held weakly. A task that is dropped without unregistering is
//! pruned on the next [`TickScheduler::run`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::ecs::PoseSource;

/// Identifier of a registered task
pub type TaskId = u64;

/// Something that wants to be called periodically.
pub trait Ticked {
    /// Called when the task's interval has elapsed.
    fn tick(&mut self, now: f32, poses: &dyn PoseSource);
}

struct Task {
    task: Weak<RefCell<dyn Ticked>>,
    interval: f32,
    /// `None` until the first run, which fires immediately
    next_due: Option<f32>,
}

#[derive(Default)]
struct Registry {
    tasks: FxHashMap<TaskId, Task>,
    next_id: TaskId,
}

/// Handle to a shared periodic-task registry.
#[derive(Clone, Default)]
pub struct TickScheduler {
    inner: Rc<RefCell<Registry>>,
}

impl TickScheduler {
    /// Create an empty scheduler
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh task id
    #[must_use]
    pub fn allocate_id(&self) -> TaskId {
        let mut registry = self.inner.borrow_mut();
        registry.next_id += 1;
        registry.next_id
    }

    /// Register a task to run every `interval` seconds.
    ///
    /// Registering an id that is already present replaces the task and
    /// interval but keeps its schedule.
    pub fn register(&self, id: TaskId, task: Weak<RefCell<dyn Ticked>>, interval: f32) {
        let mut registry = self.inner.borrow_mut();
        let interval = interval.max(0.0);
        match registry.tasks.get_mut(&id) {
            Some(existing) => {
                existing.task = task;
                existing.interval = interval;
            }
            None => {
                registry.tasks.insert(
                    id,
                    Task {
                        task,
                        interval,
                        next_due: None,
                    },
                );
            }
        }
    }

    /// Remove a task. Returns whether it was registered.
    ///
    /// Safe to call more than once and from `Drop` implementations.
    pub fn unregister(&self, id: TaskId) -> bool {
        match self.inner.try_borrow_mut() {
            Ok(mut registry) => registry.tasks.remove(&id).is_some(),
            Err(_) => {
                log::debug!("Scheduler busy, task {id} will be pruned on the next run");
                false
            }
        }
    }

    /// Check if a task is registered
    #[must_use]
    pub fn is_registered(&self, id: TaskId) -> bool {
        self.inner.borrow().tasks.contains_key(&id)
    }

    /// Number of registered tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Check if no task is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().tasks.is_empty()
    }

    /// Run every task whose interval has elapsed at `now`.
    ///
    /// Returns the number of tasks that fired. Tasks fire in id order.
    pub fn run(&self, now: f32, poses: &dyn PoseSource) -> usize {
        let mut due: SmallVec<[(TaskId, Rc<RefCell<dyn Ticked>>); 8]> = SmallVec::new();
        {
            let mut registry = self.inner.borrow_mut();
            registry.tasks.retain(|_, task| task.task.strong_count() > 0);

            for (&id, task) in &mut registry.tasks {
                let is_due = task.next_due.is_none_or(|next| now >= next);
                if !is_due {
                    continue;
                }
                if let Some(strong) = task.task.upgrade() {
                    task.next_due = Some(now + task.interval);
                    due.push((id, strong));
                }
            }
        }

        due.sort_by_key(|(id, _)| *id);
        for (_, task) in &due {
            task.borrow_mut().tick(now, poses);
        }
        due.len()
    }
}

impl std::fmt::Debug for TickScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickScheduler")
            .field("tasks", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;

    #[derive(Default)]
    struct Counter {
        ticks: Vec<f32>,
    }

    impl Ticked for Counter {
        fn tick(&mut self, now: f32, _poses: &dyn PoseSource) {
            self.ticks.push(now);
        }
    }

    fn counter() -> (Rc<RefCell<Counter>>, Weak<RefCell<dyn Ticked>>) {
        let strong = Rc::new(RefCell::new(Counter::default()));
        let as_dyn: Rc<RefCell<dyn Ticked>> = strong.clone();
        let weak = Rc::downgrade(&as_dyn);
        (strong, weak)
    }

    #[test]
    fn test_scheduler_respects_interval() {
        let scheduler = TickScheduler::new();
        let world = World::new();
        let (task, weak) = counter();
        let id = scheduler.allocate_id();
        scheduler.register(id, weak, 0.25);

        for step in 0..10 {
            scheduler.run(step as f32 * 0.1, &world);
        }

        // Fires at 0.0, 0.3, 0.6, 0.9
        assert_eq!(task.borrow().ticks.len(), 4);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let scheduler = TickScheduler::new();
        let (_task, weak) = counter();
        let id = scheduler.allocate_id();
        scheduler.register(id, weak, 0.1);

        assert!(scheduler.unregister(id));
        assert!(!scheduler.unregister(id));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_register_twice_keeps_one_entry() {
        let scheduler = TickScheduler::new();
        let (_task, weak) = counter();
        let id = scheduler.allocate_id();
        scheduler.register(id, weak.clone(), 0.1);
        scheduler.register(id, weak, 0.2);

        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_dropped_task_is_pruned() {
        let scheduler = TickScheduler::new();
        let world = World::new();
        let (task, weak) = counter();
        let id = scheduler.allocate_id();
        scheduler.register(id, weak, 0.1);

        drop(task);
        assert_eq!(scheduler.run(0.0, &world), 0);
        assert!(!scheduler.is_registered(id));
    }
}
