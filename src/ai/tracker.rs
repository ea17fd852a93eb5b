//! Kinematic tracking of arbitrary targets
//!
//! A [`KinematicTracker`] samples a target's pose on its own schedule and
//! derives velocity, acceleration and angular velocity by finite
//! differences. Each derived quantity also has an exponentially smoothed
//! variant with its own response rate: velocity reacts quickly, while
//! acceleration and angular velocity are damped harder since they amplify
//! sampling noise.
//!
//! # Lifecycle
//!
//! - Changing the target, or toggling `enabled`, resets every derived
//!   quantity and re-seeds position/rotation from the target.
//! - While enabled, the tracker is registered with its [`TickScheduler`].
//! - Dropping the tracker deregisters it.

use std::cell::RefCell;
use std::f32::consts::{PI, TAU};
use std::rc::Rc;

use glam::{Quat, Vec3};
use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::core::{TaskId, TickScheduler, Ticked};
use crate::ecs::PoseSource;

/// Response rate of the smoothed velocity (per second)
const VELOCITY_SMOOTHING: f32 = 10.0;
/// Response rate of the smoothed acceleration (per second)
const ACCELERATION_SMOOTHING: f32 = 3.0;
/// Response rate of the smoothed angular velocity (per second)
const ANGULAR_SMOOTHING: f32 = 3.0;

/// Default sampling interval in seconds
pub const DEFAULT_TRACKING_INTERVAL: f32 = 0.25;
/// Default speed below which a target is considered stationary
pub const DEFAULT_MOVING_TOLERANCE: f32 = 0.05;

// ============================================================================
// Sample
// ============================================================================

/// Latest kinematic estimate of a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicSample {
    /// Last sampled position
    pub position: Vec3,
    /// Last sampled rotation
    pub rotation: Quat,
    /// Raw velocity
    pub velocity: Vec3,
    /// Smoothed velocity
    pub velocity_smoothed: Vec3,
    /// Raw acceleration
    pub acceleration: Vec3,
    /// Smoothed acceleration
    pub acceleration_smoothed: Vec3,
    /// Raw angular velocity (axis scaled by radians per second)
    pub angular_velocity: Vec3,
    /// Smoothed angular velocity
    pub angular_velocity_smoothed: Vec3,
    /// Time of the last sample, `None` until the first sample after a reset
    pub last_update: Option<f32>,
}

impl Default for KinematicSample {
    fn default() -> Self {
        Self::seeded(Vec3::ZERO, Quat::IDENTITY)
    }
}

impl KinematicSample {
    fn seeded(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            velocity: Vec3::ZERO,
            velocity_smoothed: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            acceleration_smoothed: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            angular_velocity_smoothed: Vec3::ZERO,
            last_update: None,
        }
    }
}

/// Angular velocity that rotates `previous` into `current` over `dt`.
///
/// Degenerate rotations (zero axis, non-finite angle) yield zero. The angle
/// is wrapped into (-PI, PI] so a small negative turn is not reported as
/// almost a full positive revolution.
#[must_use]
pub fn angular_velocity_between(previous: Quat, current: Quat, dt: f32) -> Vec3 {
    let delta = previous.inverse() * current;
    let (axis, mut angle) = delta.to_axis_angle();

    if axis.length_squared() == 0.0 || !axis.is_finite() || !angle.is_finite() {
        return Vec3::ZERO;
    }
    if angle > PI {
        angle -= TAU;
    }

    let rate = angle / dt;
    if !rate.is_finite() {
        return Vec3::ZERO;
    }
    axis.normalize() * rate
}

// ============================================================================
// Tracker state shared with the scheduler
// ============================================================================

#[derive(Debug)]
struct TrackerCore {
    id: TaskId,
    target: Option<Entity>,
    enabled: bool,
    sample: KinematicSample,
    previous_position: Vec3,
    previous_rotation: Quat,
    previous_velocity: Vec3,
}

impl TrackerCore {
    fn reset(&mut self, poses: &dyn PoseSource) {
        let pose = self.target.and_then(|target| poses.pose(target));
        let (position, rotation) = pose.map_or((Vec3::ZERO, Quat::IDENTITY), |p| {
            (p.position, p.rotation)
        });

        self.sample = KinematicSample::seeded(position, rotation);
        self.previous_position = position;
        self.previous_rotation = rotation;
        self.previous_velocity = Vec3::ZERO;
    }

    fn sample(&mut self, now: f32, poses: &dyn PoseSource) {
        if !self.enabled {
            return;
        }
        let Some(target) = self.target else {
            log::error!("No target set on kinematic tracker {}", self.id);
            return;
        };
        let Some(pose) = poses.pose(target) else {
            log::error!("Tracker {} target {target:?} has no pose", self.id);
            return;
        };

        let Some(last_update) = self.sample.last_update else {
            // First sample after a reset only establishes the baseline
            self.sample.position = pose.position;
            self.sample.rotation = pose.rotation;
            self.previous_position = pose.position;
            self.previous_rotation = pose.rotation;
            self.sample.last_update = Some(now);
            return;
        };

        let dt = now - last_update;
        if dt <= 0.0 {
            log::debug!("Tracker {} sampled twice at t={now}, skipping", self.id);
            return;
        }

        let sample = &mut self.sample;
        sample.position = pose.position;
        sample.rotation = pose.rotation;

        sample.velocity = (sample.position - self.previous_position) / dt;
        sample.angular_velocity =
            angular_velocity_between(self.previous_rotation, sample.rotation, dt);
        sample.acceleration = (sample.velocity - self.previous_velocity) / dt;

        sample.velocity_smoothed = sample
            .velocity_smoothed
            .lerp(sample.velocity, (dt * VELOCITY_SMOOTHING).clamp(0.0, 1.0));
        sample.acceleration_smoothed = sample
            .acceleration_smoothed
            .lerp(sample.acceleration, (dt * ACCELERATION_SMOOTHING).clamp(0.0, 1.0));
        sample.angular_velocity_smoothed = sample
            .angular_velocity_smoothed
            .lerp(sample.angular_velocity, (dt * ANGULAR_SMOOTHING).clamp(0.0, 1.0));

        self.previous_position = sample.position;
        self.previous_rotation = sample.rotation;
        self.previous_velocity = sample.velocity;
        sample.last_update = Some(now);
    }
}

impl Ticked for TrackerCore {
    fn tick(&mut self, now: f32, poses: &dyn PoseSource) {
        self.sample(now, poses);
    }
}

// ============================================================================
// Tracker
// ============================================================================

/// Samples a target's pose periodically and estimates its motion.
pub struct KinematicTracker {
    core: Rc<RefCell<TrackerCore>>,
    scheduler: TickScheduler,
    interval: f32,
    sqr_moving_tolerance: f32,
}

impl KinematicTracker {
    /// Create a disabled tracker without target.
    ///
    /// `interval` is the sampling period in seconds.
    #[must_use]
    pub fn new(scheduler: &TickScheduler, interval: f32) -> Self {
        let core = TrackerCore {
            id: scheduler.allocate_id(),
            target: None,
            enabled: false,
            sample: KinematicSample::default(),
            previous_position: Vec3::ZERO,
            previous_rotation: Quat::IDENTITY,
            previous_velocity: Vec3::ZERO,
        };

        Self {
            core: Rc::new(RefCell::new(core)),
            scheduler: scheduler.clone(),
            interval: interval.max(0.0),
            sqr_moving_tolerance: DEFAULT_MOVING_TOLERANCE * DEFAULT_MOVING_TOLERANCE,
        }
    }

    /// Create a tracker following `target`, enabled iff a target is given.
    #[must_use]
    pub fn tracking(
        scheduler: &TickScheduler,
        target: Option<Entity>,
        interval: f32,
        poses: &dyn PoseSource,
    ) -> Self {
        let tracker = Self::new(scheduler, interval);
        tracker.set_target(target, poses);
        tracker.set_enabled(target.is_some(), poses);
        tracker
    }

    /// Scheduler id of this tracker
    #[must_use]
    pub fn task_id(&self) -> TaskId {
        self.core.borrow().id
    }

    /// Sampling interval in seconds
    #[must_use]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Currently tracked target
    #[must_use]
    pub fn target(&self) -> Option<Entity> {
        self.core.borrow().target
    }

    /// Change the tracked target. Always resets.
    pub fn set_target(&self, target: Option<Entity>, poses: &dyn PoseSource) {
        let mut core = self.core.borrow_mut();
        core.target = target;
        core.reset(poses);
    }

    /// Whether periodic sampling is active
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.core.borrow().enabled
    }

    /// Start or stop periodic sampling.
    ///
    /// Every transition resets the estimate; re-enabling starts from the
    /// target's current pose instead of resuming stale history.
    pub fn set_enabled(&self, enabled: bool, poses: &dyn PoseSource) {
        {
            let mut core = self.core.borrow_mut();
            if core.enabled == enabled {
                return;
            }
            core.enabled = enabled;
            core.reset(poses);
        }

        let id = self.task_id();
        if enabled {
            let core: Rc<RefCell<dyn Ticked>> = self.core.clone();
            self.scheduler.register(id, Rc::downgrade(&core), self.interval);
        } else {
            self.scheduler.unregister(id);
        }
    }

    /// Reset every derived quantity and re-seed from the target's pose.
    pub fn reset(&self, poses: &dyn PoseSource) {
        self.core.borrow_mut().reset(poses);
    }

    /// Take a sample now. Normally called by the scheduler.
    pub fn sample(&self, now: f32, poses: &dyn PoseSource) {
        self.core.borrow_mut().sample(now, poses);
    }

    /// Copy of the latest estimate
    #[must_use]
    pub fn snapshot(&self) -> KinematicSample {
        self.core.borrow().sample
    }

    /// Last sampled position
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.core.borrow().sample.position
    }

    /// Last sampled rotation
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.core.borrow().sample.rotation
    }

    /// Raw velocity
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.core.borrow().sample.velocity
    }

    /// Smoothed velocity
    #[must_use]
    pub fn velocity_smoothed(&self) -> Vec3 {
        self.core.borrow().sample.velocity_smoothed
    }

    /// Raw acceleration
    #[must_use]
    pub fn acceleration(&self) -> Vec3 {
        self.core.borrow().sample.acceleration
    }

    /// Smoothed acceleration
    #[must_use]
    pub fn acceleration_smoothed(&self) -> Vec3 {
        self.core.borrow().sample.acceleration_smoothed
    }

    /// Raw angular velocity
    #[must_use]
    pub fn angular_velocity(&self) -> Vec3 {
        self.core.borrow().sample.angular_velocity
    }

    /// Smoothed angular velocity
    #[must_use]
    pub fn angular_velocity_smoothed(&self) -> Vec3 {
        self.core.borrow().sample.angular_velocity_smoothed
    }

    /// Whether the target moves faster than the moving tolerance
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.velocity().length_squared() > self.sqr_moving_tolerance
    }

    /// Speed threshold for [`is_moving`](Self::is_moving)
    #[must_use]
    pub fn moving_tolerance(&self) -> f32 {
        self.sqr_moving_tolerance.sqrt()
    }

    /// Set the speed threshold for [`is_moving`](Self::is_moving)
    pub fn set_moving_tolerance(&mut self, tolerance: f32) {
        self.sqr_moving_tolerance = tolerance * tolerance;
    }
}

impl Drop for KinematicTracker {
    fn drop(&mut self) {
        if let Ok(core) = self.core.try_borrow() {
            self.scheduler.unregister(core.id);
        }
    }
}

impl std::fmt::Debug for KinematicTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("KinematicTracker")
            .field("id", &core.id)
            .field("target", &core.target)
            .field("enabled", &core.enabled)
            .field("interval", &self.interval)
            .field("sample", &core.sample)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Transform, World};

    const DT: f32 = 0.25;

    fn setup() -> (TickScheduler, World, Entity) {
        let scheduler = TickScheduler::new();
        let mut world = World::new();
        let target = world.spawn((Transform::from_position(Vec3::new(1.0, 0.0, 0.0)),));
        (scheduler, world, target)
    }

    #[test]
    fn test_constant_velocity_converges() {
        let (scheduler, mut world, target) = setup();
        let tracker = KinematicTracker::tracking(&scheduler, Some(target), DT, &world);
        let v = Vec3::new(2.0, 0.0, -1.0);

        for step in 0..8 {
            let now = step as f32 * DT;
            if step > 0 {
                world.translate(target, v * DT);
            }
            tracker.sample(now, &world);

            if step >= 1 {
                assert!((tracker.velocity() - v).length() < 1e-3, "step {step}");
            }
            if step >= 2 {
                assert!(tracker.acceleration().length() < 1e-3, "step {step}");
            }
        }

        assert!(tracker.is_moving());
        // Smoothed velocity catches up with lerp factor dt*10 clamped to 1
        assert!((tracker.velocity_smoothed() - v).length() < 1e-3);
    }

    #[test]
    fn test_first_sample_has_zero_derivatives() {
        let (scheduler, mut world, target) = setup();
        let tracker = KinematicTracker::tracking(&scheduler, Some(target), DT, &world);

        world.translate(target, Vec3::new(5.0, 0.0, 0.0));
        tracker.sample(1.0, &world);

        assert_eq!(tracker.velocity(), Vec3::ZERO);
        assert_eq!(tracker.acceleration(), Vec3::ZERO);
        assert!((tracker.position().x - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_smoothing_rates_differ() {
        let (scheduler, mut world, target) = setup();
        let tracker = KinematicTracker::tracking(&scheduler, Some(target), 0.05, &world);

        tracker.sample(0.0, &world);
        world.translate(target, Vec3::new(0.1, 0.0, 0.0));
        tracker.sample(0.05, &world);

        // velocity lerps by 0.5, acceleration by 0.15
        let sample = tracker.snapshot();
        assert!((sample.velocity.x - 2.0).abs() < 1e-4);
        assert!((sample.velocity_smoothed.x - 1.0).abs() < 1e-4);
        assert!((sample.acceleration.x - 40.0).abs() < 1e-2);
        assert!((sample.acceleration_smoothed.x - 6.0).abs() < 1e-2);
    }

    #[test]
    fn test_sampling_without_target_is_noop() {
        let (scheduler, mut world, target) = setup();
        let tracker = KinematicTracker::tracking(&scheduler, Some(target), DT, &world);

        tracker.sample(0.0, &world);
        world.translate(target, Vec3::new(0.5, 0.0, 0.0));
        tracker.sample(DT, &world);
        let tracked = tracker.snapshot();
        assert!((tracked.velocity.x - 2.0).abs() < 1e-4);

        // A vanished target keeps the last estimate
        let spare = world.spawn((Transform::new(),));
        let _ = world.despawn(target);
        tracker.sample(2.0 * DT, &world);
        assert_eq!(tracker.snapshot(), tracked);

        tracker.set_target(Some(spare), &world);
        tracker.sample(3.0 * DT, &world);
        tracker.set_target(None, &world);
        assert!(tracker.is_enabled());
        let cleared = tracker.snapshot();

        tracker.sample(4.0 * DT, &world);
        tracker.sample(5.0 * DT, &world);
        assert_eq!(tracker.snapshot(), cleared);
        assert_eq!(tracker.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_angular_velocity_about_y() {
        let (scheduler, mut world, target) = setup();
        let tracker = KinematicTracker::tracking(&scheduler, Some(target), DT, &world);

        tracker.sample(0.0, &world);
        if let Ok(mut transform) = world.get_mut::<Transform>(target) {
            transform.rotate_yaw(0.1);
        }
        tracker.sample(DT, &world);

        let omega = tracker.angular_velocity();
        assert!((omega - Vec3::new(0.0, 0.4, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_negative_turn_is_wrapped() {
        let omega = angular_velocity_between(Quat::IDENTITY, Quat::from_rotation_y(-0.2), 0.5);
        assert!((omega - Vec3::new(0.0, -0.4, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_degenerate_rotation_is_zero() {
        assert_eq!(
            angular_velocity_between(Quat::IDENTITY, Quat::IDENTITY, 0.25),
            Vec3::ZERO
        );
        let nan = Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0);
        assert_eq!(angular_velocity_between(Quat::IDENTITY, nan, 0.25), Vec3::ZERO);
    }

    #[test]
    fn test_enable_toggle_registers_and_resets() {
        let (scheduler, mut world, target) = setup();
        let tracker = KinematicTracker::tracking(&scheduler, Some(target), DT, &world);
        assert!(scheduler.is_registered(tracker.task_id()));

        tracker.sample(0.0, &world);
        world.translate(target, Vec3::X);
        tracker.sample(DT, &world);
        assert!(tracker.velocity().length() > 0.0);

        tracker.set_enabled(false, &world);
        assert!(!scheduler.is_registered(tracker.task_id()));
        assert_eq!(tracker.velocity(), Vec3::ZERO);

        world.translate(target, Vec3::X);
        tracker.set_enabled(true, &world);
        assert!((tracker.position().x - 3.0).abs() < 1e-6);
        assert_eq!(tracker.snapshot().last_update, None);
    }

    #[test]
    fn test_set_target_reseeds() {
        let (scheduler, mut world, target) = setup();
        let other = world.spawn((Transform::from_position(Vec3::new(0.0, 0.0, 9.0)),));
        let tracker = KinematicTracker::tracking(&scheduler, Some(target), DT, &world);

        tracker.set_target(Some(other), &world);
        assert_eq!(tracker.target(), Some(other));
        assert!((tracker.position().z - 9.0).abs() < 1e-6);
        assert_eq!(tracker.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_drop_unregisters() {
        let (scheduler, world, target) = setup();
        let tracker = KinematicTracker::tracking(&scheduler, Some(target), DT, &world);
        let id = tracker.task_id();

        drop(tracker);
        assert!(!scheduler.is_registered(id));
    }

    #[test]
    fn test_scheduler_drives_sampling() {
        let (scheduler, mut world, target) = setup();
        let tracker = KinematicTracker::tracking(&scheduler, Some(target), DT, &world);
        let v = Vec3::new(0.0, 0.0, 4.0);

        // Simulation runs at 0.05 s, tracker at 0.25 s
        for step in 0..=30 {
            let now = step as f32 * 0.05;
            if step > 0 {
                world.translate(target, v * 0.05);
            }
            scheduler.run(now, &world);
        }

        assert!((tracker.velocity() - v).length() < 0.05);
    }

    #[test]
    fn test_moving_tolerance_is_linear() {
        let scheduler = TickScheduler::new();
        let mut tracker = KinematicTracker::new(&scheduler, DT);

        assert!((tracker.moving_tolerance() - DEFAULT_MOVING_TOLERANCE).abs() < 1e-6);
        tracker.set_moving_tolerance(0.3);
        assert!((tracker.moving_tolerance() - 0.3).abs() < 1e-6);
        assert!(!tracker.is_moving());
    }
}
