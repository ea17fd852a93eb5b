//! Wander - random heading perturbation
//!
//! Two strategies share one behavior. The angle walk drifts a jitter angle
//! around the heading a little every tick. The target sphere jitters a point
//! on a sphere placed ahead of the vehicle.

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::random::{RandomSource, SmallRandom};
use super::steering::{Steering, SteeringContext};
use super::vehicle::Vehicle;
use crate::config::WanderConfig;

/// How [`Wander`] perturbs the heading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WanderStrategy {
    /// Random walk of an angle about the up axis
    AngleWalk {
        /// Length of the jitter
        radius: f32,
        /// Largest angle change per tick, in degrees
        angle_max: f32,
        /// Offset of the jitter along the heading
        distance: f32,
    },
    /// Jittered point on a sphere ahead of the vehicle
    TargetSphere {
        /// Largest per-axis displacement of the point per tick
        jitter: f32,
        /// Radius of the sphere
        sphere_radius: f32,
        /// Distance of the sphere center along the heading
        target_distance: f32,
    },
}

impl Default for WanderStrategy {
    fn default() -> Self {
        Self::AngleWalk {
            radius: 0.4,
            angle_max: 5.0,
            distance: 0.6,
        }
    }
}

/// Wandering steering behavior
pub struct Wander {
    strategy: WanderStrategy,
    random: Box<dyn RandomSource>,
    /// Current jitter angle in degrees
    angle: f32,
    /// Current point on the target sphere
    target: Vec3,
}

impl Wander {
    /// Angle-walk wander seeded from the OS
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&WanderConfig::default())
    }

    /// Create from configuration
    #[must_use]
    pub fn from_config(config: &WanderConfig) -> Self {
        let random = match config.seed {
            Some(seed) => SmallRandom::seeded(seed),
            None => SmallRandom::from_os(),
        };
        Self::with_random(config.strategy, Box::new(random))
    }

    /// Create with an explicit random source
    #[must_use]
    pub fn with_random(strategy: WanderStrategy, random: Box<dyn RandomSource>) -> Self {
        Self {
            strategy,
            random,
            angle: 0.0,
            target: Vec3::ZERO,
        }
    }

    /// Active strategy
    #[must_use]
    pub fn strategy(&self) -> WanderStrategy {
        self.strategy
    }

    /// Switch strategy; the walk state starts over
    pub fn set_strategy(&mut self, strategy: WanderStrategy) {
        self.strategy = strategy;
        self.angle = 0.0;
        self.target = Vec3::ZERO;
    }

    /// Current jitter angle in degrees
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Heading the jitter is applied to
    fn base_direction(vehicle: &dyn Vehicle) -> Vec3 {
        if vehicle.speed() == 0.0 {
            vehicle.forward().normalize_or_zero()
        } else {
            vehicle.normalized_velocity()
        }
    }

    fn angle_walk(
        &mut self,
        vehicle: &dyn Vehicle,
        radius: f32,
        angle_max: f32,
        distance: f32,
    ) -> Vec3 {
        self.angle += self.random.range(-angle_max, angle_max);

        let base = Self::base_direction(vehicle);
        let jitter = Quat::from_rotation_y(self.angle.to_radians()) * base * radius;
        base * distance + jitter
    }

    fn target_sphere(
        &mut self,
        vehicle: &dyn Vehicle,
        jitter: f32,
        sphere_radius: f32,
        target_distance: f32,
    ) -> Vec3 {
        let mut displacement = Vec3::new(
            self.random.range(-jitter, jitter),
            self.random.range(-jitter, jitter),
            self.random.range(-jitter, jitter),
        );
        if vehicle.is_planar() {
            displacement.y = 0.0;
        }

        let target = self.target + displacement;
        self.target = target
            .try_normalize()
            .unwrap_or_else(|| vehicle.forward().normalize_or_zero())
            * sphere_radius;

        let base = Self::base_direction(vehicle);
        (base * target_distance + self.target).clamp_length_max(1.0)
    }
}

impl Default for Wander {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Wander {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wander")
            .field("strategy", &self.strategy)
            .field("angle", &self.angle)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl Steering for Wander {
    fn name(&self) -> &'static str {
        "Wander"
    }

    fn calculate_force(&mut self, ctx: &mut SteeringContext<'_>) -> Vec3 {
        match self.strategy {
            WanderStrategy::AngleWalk {
                radius,
                angle_max,
                distance,
            } => self.angle_walk(ctx.vehicle, radius, angle_max, distance),
            WanderStrategy::TargetSphere {
                jitter,
                sphere_radius,
                target_distance,
            } => self.target_sphere(ctx.vehicle, jitter, sphere_radius, target_distance),
        }
    }
}
