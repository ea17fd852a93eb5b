//! Pursuit - steer toward where a moving quarry will be
//!
//! The intercept time is not solved for. Instead the relative geometry is
//! sorted into nine cases (quarry ahead/aside/behind, heading
//! parallel/perpendicular/anti-parallel) and the direct travel time is
//! scaled by a fixed factor per case.

use glam::Vec3;
use hecs::Entity;

use super::steering::{ArrivalReport, Steering, SteeringContext};
use super::tracker::KinematicTracker;
use crate::config::PursuitConfig;
use crate::core::TickScheduler;
use crate::ecs::PoseSource;

/// Cosine of 45 degrees, the boundary between the three heading classes
pub const HEADING_THRESHOLD: f32 = 0.707;

/// Time factors indexed by `[forwardness][parallelness]`, each as
/// `class + 1` (0 = behind/anti-parallel, 2 = ahead/parallel).
const TIME_FACTORS: [[f32; 3]; 3] = [
    // behind: anti-parallel, perpendicular, parallel
    [2.0, 2.0, 0.5],
    // aside
    [4.0, 0.8, 1.0],
    // ahead
    [0.85, 1.8, 4.0],
];

/// Classify `value` against `[lower, upper]`.
///
/// Returns -1 below `lower`, +1 above `upper`, 0 otherwise. Values exactly
/// on a boundary fall in the middle class.
#[must_use]
pub fn interval_comparison(value: f32, lower: f32, upper: f32) -> i8 {
    if value < lower {
        -1
    } else if value > upper {
        1
    } else {
        0
    }
}

/// Time factor for a (forwardness, parallelness) class pair, each in -1..=1
#[must_use]
pub fn time_factor(forwardness: i8, parallelness: i8) -> f32 {
    let row = (forwardness.clamp(-1, 1) + 1) as usize;
    let column = (parallelness.clamp(-1, 1) + 1) as usize;
    TIME_FACTORS[row][column]
}

/// Estimated time until the mover intercepts the quarry, capped at
/// `max_prediction_time`.
#[must_use]
pub fn estimated_intercept_time(
    distance: f32,
    speed: f32,
    forwardness: f32,
    parallelness: f32,
    max_prediction_time: f32,
) -> f32 {
    let f = interval_comparison(forwardness, -HEADING_THRESHOLD, HEADING_THRESHOLD);
    let p = interval_comparison(parallelness, -HEADING_THRESHOLD, HEADING_THRESHOLD);

    // Zero speed gives an infinite direct time, which the cap absorbs
    let direct_travel_time = distance / speed;
    (direct_travel_time * time_factor(f, p)).min(max_prediction_time)
}

/// Steers a vehicle to intercept a moving quarry
#[derive(Debug)]
pub struct Pursuit {
    quarry: Option<Entity>,
    tracker: KinematicTracker,
    /// Longest look-ahead used for the prediction
    pub max_prediction_time: f32,
    arrival: ArrivalReport,
}

impl Pursuit {
    /// Create a pursuit without quarry
    #[must_use]
    pub fn new(scheduler: &TickScheduler) -> Self {
        Self::from_config(scheduler, &PursuitConfig::default())
    }

    /// Create from configuration
    #[must_use]
    pub fn from_config(scheduler: &TickScheduler, config: &PursuitConfig) -> Self {
        let mut tracker = KinematicTracker::new(scheduler, config.tracking_interval);
        tracker.set_moving_tolerance(config.moving_tolerance);
        Self {
            quarry: None,
            tracker,
            max_prediction_time: config.max_prediction_time,
            arrival: ArrivalReport::default(),
        }
    }

    /// Set the maximum prediction time
    #[must_use]
    pub fn with_max_prediction_time(mut self, seconds: f32) -> Self {
        self.max_prediction_time = seconds;
        self
    }

    /// Speed below which the quarry is treated as stationary
    #[must_use]
    pub fn with_moving_tolerance(mut self, tolerance: f32) -> Self {
        self.tracker.set_moving_tolerance(tolerance);
        self
    }

    /// Current quarry
    #[must_use]
    pub fn quarry(&self) -> Option<Entity> {
        self.quarry
    }

    /// Change the quarry.
    ///
    /// Clears the arrival report and restarts tracking; tracking is only
    /// enabled while there is a quarry.
    pub fn set_quarry(&mut self, quarry: Option<Entity>, poses: &dyn PoseSource) {
        if self.quarry == quarry {
            return;
        }
        self.quarry = quarry;
        self.arrival.clear();
        self.tracker.set_target(quarry, poses);
        self.tracker.set_enabled(quarry.is_some(), poses);
    }

    /// Motion estimate of the quarry
    #[must_use]
    pub fn tracker(&self) -> &KinematicTracker {
        &self.tracker
    }

    /// Position the quarry is predicted to reach, if there is one to chase
    #[must_use]
    pub fn predicted_target(&self, ctx: &SteeringContext<'_>) -> Option<Vec3> {
        let quarry = ctx.poses.pose(self.quarry?)?;
        let vehicle = ctx.vehicle;

        let offset = quarry.position - vehicle.position();
        let distance = offset.length();
        if distance <= vehicle.arrival_radius() {
            return None;
        }

        let forward = vehicle.forward();
        // 1 parallel, 0 perpendicular, -1 anti-parallel
        let parallelness = forward.dot(quarry.forward());
        // 1 dead ahead, 0 to the side, -1 straight back
        let forwardness = forward.dot(offset / distance);

        let time = estimated_intercept_time(
            distance,
            vehicle.speed(),
            forwardness,
            parallelness,
            self.max_prediction_time,
        );
        Some(quarry.position + self.tracker.velocity() * time)
    }
}

impl Steering for Pursuit {
    fn name(&self) -> &'static str {
        "Pursuit"
    }

    fn calculate_force(&mut self, ctx: &mut SteeringContext<'_>) -> Vec3 {
        if self.quarry.is_none() {
            return Vec3::ZERO;
        }

        match self.predicted_target(ctx) {
            Some(target) => ctx.vehicle.seek(target, false, true),
            None => {
                if self.quarry.and_then(|q| ctx.poses.pose(q)).is_some() {
                    let name = self.name();
                    self.arrival.report(name, ctx);
                }
                Vec3::ZERO
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::VehicleState;
    use crate::core::EventQueue;
    use crate::ecs::{Transform, World};
    use glam::Quat;

    #[test]
    fn test_interval_comparison_boundaries() {
        assert_eq!(interval_comparison(0.707, -0.707, 0.707), 0);
        assert_eq!(interval_comparison(-0.707, -0.707, 0.707), 0);
        assert_eq!(interval_comparison(0.708, -0.707, 0.707), 1);
        assert_eq!(interval_comparison(-0.708, -0.707, 0.707), -1);
        assert_eq!(interval_comparison(0.0, -0.707, 0.707), 0);
    }

    #[test]
    fn test_time_factor_table() {
        let cases = [
            (1, 1, 4.0),
            (1, 0, 1.8),
            (1, -1, 0.85),
            (0, 1, 1.0),
            (0, 0, 0.8),
            (0, -1, 4.0),
            (-1, 1, 0.5),
            (-1, 0, 2.0),
            (-1, -1, 2.0),
        ];

        for (f, p, expected) in cases {
            assert!(
                (time_factor(f, p) - expected).abs() < f32::EPSILON,
                "forwardness {f}, parallelness {p}"
            );
        }
    }

    #[test]
    fn test_intercept_time_ahead_parallel() {
        // distance 10 at speed 5 -> direct time 2, factor 4 -> 8
        let time = estimated_intercept_time(10.0, 5.0, 1.0, 1.0, 100.0);
        assert!((time - 8.0).abs() < 1e-5);

        let capped = estimated_intercept_time(10.0, 5.0, 1.0, 1.0, 5.0);
        assert!((capped - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_intercept_time_zero_speed_is_capped() {
        let time = estimated_intercept_time(10.0, 0.0, 1.0, 1.0, 3.0);
        assert!((time - 3.0).abs() < 1e-5);
    }

    fn pursuit_setup(quarry_velocity: Vec3) -> (World, TickScheduler, Pursuit, Entity) {
        let mut world = World::new();
        let scheduler = TickScheduler::new();
        // Quarry 10 units ahead of the mover (-Z), facing the same way
        let quarry = world.spawn((Transform::from_position_rotation(
            Vec3::new(0.0, 0.0, -10.0),
            Quat::IDENTITY,
        ),));

        let mut pursuit = Pursuit::new(&scheduler).with_max_prediction_time(100.0);
        pursuit.set_quarry(Some(quarry), &world);

        pursuit.tracker().sample(0.0, &world);
        world.translate(quarry, quarry_velocity * 0.25);
        pursuit.tracker().sample(0.25, &world);

        (world, scheduler, pursuit, quarry)
    }

    #[test]
    fn test_pursuit_end_to_end() {
        let quarry_velocity = Vec3::new(1.0, 0.0, 0.0);
        let (world, _scheduler, mut pursuit, _quarry) = pursuit_setup(quarry_velocity);

        let vehicle = VehicleState::new(Vec3::ZERO)
            .with_velocity(Vec3::new(0.0, 0.0, -5.0))
            .with_forward(Vec3::NEG_Z);
        let mut events = EventQueue::new();
        let mut ctx = SteeringContext::new(&vehicle, &world, &mut events);

        let quarry_position = Vec3::new(0.25, 0.0, -10.0);
        // distance ~10 (quarry moved 0.25 sideways, still the ahead/parallel case)
        let distance = quarry_position.length();
        let expected = quarry_position + quarry_velocity * (distance / 5.0 * 4.0);

        let predicted = pursuit.predicted_target(&ctx);
        assert!(predicted.is_some_and(|p| (p - expected).length() < 1e-3));

        let force = pursuit.calculate_force(&mut ctx);
        let mut seek = expected - vehicle.position;
        seek.y = 0.0;
        assert!((force - seek).length() < 1e-3);
    }

    #[test]
    fn test_pursuit_caps_prediction() {
        let quarry_velocity = Vec3::new(1.0, 0.0, 0.0);
        let (world, _scheduler, mut pursuit, _quarry) = pursuit_setup(quarry_velocity);
        pursuit.max_prediction_time = 2.0;

        let vehicle = VehicleState::new(Vec3::ZERO)
            .with_velocity(Vec3::new(0.0, 0.0, -5.0))
            .with_forward(Vec3::NEG_Z);
        let mut events = EventQueue::new();
        let ctx = SteeringContext::new(&vehicle, &world, &mut events);

        let expected = Vec3::new(0.25, 0.0, -10.0) + quarry_velocity * 2.0;
        let predicted = pursuit.predicted_target(&ctx);
        assert!(predicted.is_some_and(|p| (p - expected).length() < 1e-3));
    }

    #[test]
    fn test_pursuit_within_arrival_radius_is_zero() {
        let mut world = World::new();
        let scheduler = TickScheduler::new();
        let quarry = world.spawn((Transform::from_position(Vec3::new(0.1, 0.0, 0.0)),));
        let mut pursuit = Pursuit::new(&scheduler);
        pursuit.set_quarry(Some(quarry), &world);

        let vehicle = VehicleState::new(Vec3::ZERO).with_arrival_radius(1.0);
        let mut events = EventQueue::new();
        {
            let mut ctx = SteeringContext::new(&vehicle, &world, &mut events);
            assert_eq!(pursuit.calculate_force(&mut ctx), Vec3::ZERO);
            assert_eq!(pursuit.calculate_force(&mut ctx), Vec3::ZERO);
        }

        events.swap();
        assert_eq!(events.len(), 1, "arrival reported once");
    }

    #[test]
    fn test_pursuit_without_quarry_is_zero() {
        let world = World::new();
        let mut pursuit = Pursuit::new(&TickScheduler::new());
        let vehicle = VehicleState::default();
        let mut events = EventQueue::new();
        let mut ctx = SteeringContext::new(&vehicle, &world, &mut events);

        assert_eq!(pursuit.calculate_force(&mut ctx), Vec3::ZERO);
    }

    #[test]
    fn test_set_quarry_toggles_tracking() {
        let mut world = World::new();
        let scheduler = TickScheduler::new();
        let quarry = world.spawn((Transform::new(),));
        let mut pursuit = Pursuit::new(&scheduler);

        pursuit.set_quarry(Some(quarry), &world);
        assert!(pursuit.tracker().is_enabled());
        assert_eq!(scheduler.len(), 1);

        pursuit.set_quarry(None, &world);
        assert!(!pursuit.tracker().is_enabled());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_moving_tolerance_reaches_tracker() {
        let scheduler = TickScheduler::new();
        let config = PursuitConfig {
            moving_tolerance: 0.3,
            ..Default::default()
        };
        let pursuit = Pursuit::from_config(&scheduler, &config);
        assert!((pursuit.tracker().moving_tolerance() - 0.3).abs() < 1e-6);

        let pursuit = Pursuit::new(&scheduler).with_moving_tolerance(0.02);
        assert!((pursuit.tracker().moving_tolerance() - 0.02).abs() < 1e-6);
    }
}
