//! Evasion - flee from where a menace is about to be

use glam::Vec3;
use hecs::Entity;

use super::steering::{Steering, SteeringContext};
use super::tracker::KinematicTracker;
use crate::config::EvasionConfig;
use crate::core::TickScheduler;
use crate::ecs::PoseSource;

/// Steers a vehicle away from the predicted position of a menace
#[derive(Debug)]
pub struct Evasion {
    menace: Option<Entity>,
    tracker: KinematicTracker,
    /// Longest look-ahead for the prediction, in seconds
    pub prediction_time: f32,
    /// Menaces further away than this are ignored
    pub safety_distance: Option<f32>,
}

impl Evasion {
    /// Create an evasion without menace
    #[must_use]
    pub fn new(scheduler: &TickScheduler) -> Self {
        Self::from_config(scheduler, &EvasionConfig::default())
    }

    /// Create from configuration
    #[must_use]
    pub fn from_config(scheduler: &TickScheduler, config: &EvasionConfig) -> Self {
        let mut tracker = KinematicTracker::new(scheduler, config.tracking_interval);
        tracker.set_moving_tolerance(config.moving_tolerance);
        Self {
            menace: None,
            tracker,
            prediction_time: config.prediction_time,
            safety_distance: config.safety_distance,
        }
    }

    /// Set the prediction horizon
    #[must_use]
    pub fn with_prediction_time(mut self, seconds: f32) -> Self {
        self.prediction_time = seconds;
        self
    }

    /// Only react to menaces within `distance`
    #[must_use]
    pub fn with_safety_distance(mut self, distance: f32) -> Self {
        self.safety_distance = Some(distance);
        self
    }

    /// Speed below which the menace is treated as stationary
    #[must_use]
    pub fn with_moving_tolerance(mut self, tolerance: f32) -> Self {
        self.tracker.set_moving_tolerance(tolerance);
        self
    }

    /// Current menace
    #[must_use]
    pub fn menace(&self) -> Option<Entity> {
        self.menace
    }

    /// Change the menace; tracking runs only while there is one
    pub fn set_menace(&mut self, menace: Option<Entity>, poses: &dyn PoseSource) {
        self.menace = menace;
        self.tracker.set_target(menace, poses);
        self.tracker.set_enabled(menace.is_some(), poses);
    }

    /// Motion estimate of the menace
    #[must_use]
    pub fn tracker(&self) -> &KinematicTracker {
        &self.tracker
    }
}

impl Steering for Evasion {
    fn name(&self) -> &'static str {
        "Evasion"
    }

    fn calculate_force(&mut self, ctx: &mut SteeringContext<'_>) -> Vec3 {
        let Some(menace) = self.menace.and_then(|m| ctx.poses.pose(m)) else {
            return Vec3::ZERO;
        };
        let vehicle = ctx.vehicle;

        let offset = menace.position - vehicle.position();
        if let Some(safety) = self.safety_distance {
            if offset.length_squared() > safety * safety {
                return Vec3::ZERO;
            }
        }
        let distance = offset.length();

        let velocity = self.tracker.velocity();
        let rough_time = if self.tracker.is_moving() {
            distance / velocity.length()
        } else {
            0.0
        };
        let prediction_time = rough_time.min(self.prediction_time);
        let target = menace.position + velocity * prediction_time;

        // Plain flee from the predicted position, no arrival shaping
        let desired_velocity = vehicle.position() - target;
        desired_velocity - vehicle.velocity()
    }
}
