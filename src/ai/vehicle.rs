//! Vehicle mobility context
//!
//! Behaviors never own the vehicle they steer. They read it through the
//! [`Vehicle`] trait, which also hosts the shared seek primitive.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Read-only view of a steered vehicle.
pub trait Vehicle {
    /// World position
    fn position(&self) -> Vec3;

    /// Current velocity
    fn velocity(&self) -> Vec3;

    /// Facing direction (unit length)
    fn forward(&self) -> Vec3;

    /// Maximum steering force
    fn max_force(&self) -> f32;

    /// Distance at which a seek target counts as reached
    fn arrival_radius(&self) -> f32;

    /// Whether the vehicle moves on the XZ plane only
    fn is_planar(&self) -> bool;

    /// Current speed
    fn speed(&self) -> f32 {
        self.velocity().length()
    }

    /// Velocity direction, or zero when stationary
    fn normalized_velocity(&self) -> Vec3 {
        self.velocity().normalize_or_zero()
    }

    /// Squared arrival radius
    fn squared_arrival_radius(&self) -> f32 {
        self.arrival_radius() * self.arrival_radius()
    }

    /// Where the vehicle will be in `time` seconds at its current velocity
    fn predict_future_position(&self, time: f32) -> Vec3 {
        self.position() + self.velocity() * time
    }

    /// Force that drives the vehicle toward `target`.
    ///
    /// With `consider_arrival_radius` the force is zero once the target is
    /// inside the arrival radius. With `consider_velocity` the current
    /// velocity is subtracted, which slows the vehicle as it closes in.
    fn seek(&self, target: Vec3, consider_velocity: bool, consider_arrival_radius: bool) -> Vec3 {
        seek_vector(self, target, consider_velocity, consider_arrival_radius)
    }
}

/// Seek implementation shared by every [`Vehicle`].
pub fn seek_vector<V: Vehicle + ?Sized>(
    vehicle: &V,
    target: Vec3,
    consider_velocity: bool,
    consider_arrival_radius: bool,
) -> Vec3 {
    let mut difference = target - vehicle.position();
    if vehicle.is_planar() {
        difference.y = 0.0;
    }

    if consider_arrival_radius && difference.length_squared() <= vehicle.squared_arrival_radius() {
        return Vec3::ZERO;
    }

    if consider_velocity {
        difference - vehicle.velocity()
    } else {
        difference
    }
}

/// Plain snapshot of a vehicle's state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleState {
    /// World position
    pub position: Vec3,
    /// Current velocity
    pub velocity: Vec3,
    /// Facing direction
    pub forward: Vec3,
    /// Maximum steering force
    pub max_force: f32,
    /// Maximum speed, used by hosts that integrate the snapshot
    pub max_speed: f32,
    /// Arrival radius
    pub arrival_radius: f32,
    /// Planar motion flag
    pub planar: bool,
}

impl VehicleState {
    /// Create a stationary vehicle facing -Z
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Set velocity
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set facing direction
    #[must_use]
    pub fn with_forward(mut self, forward: Vec3) -> Self {
        self.forward = forward.normalize_or_zero();
        self
    }

    /// Set maximum force
    #[must_use]
    pub fn with_max_force(mut self, max_force: f32) -> Self {
        self.max_force = max_force;
        self
    }

    /// Set arrival radius
    #[must_use]
    pub fn with_arrival_radius(mut self, arrival_radius: f32) -> Self {
        self.arrival_radius = arrival_radius.max(0.0);
        self
    }

    /// Set planar motion
    #[must_use]
    pub fn with_planar(mut self, planar: bool) -> Self {
        self.planar = planar;
        self
    }

    /// Integrate a steering force over `dt` (unit mass).
    ///
    /// The force is truncated to `max_force` and the resulting speed to
    /// `max_speed`. Facing follows velocity while moving.
    pub fn integrate(&mut self, force: Vec3, dt: f32) {
        let mut force = force.clamp_length_max(self.max_force);
        if self.planar {
            force.y = 0.0;
        }

        self.velocity = (self.velocity + force * dt).clamp_length_max(self.max_speed);
        self.position += self.velocity * dt;

        if let Some(direction) = self.velocity.try_normalize() {
            self.forward = direction;
        }
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            max_force: 10.0,
            max_speed: 5.0,
            arrival_radius: 0.25,
            planar: true,
        }
    }
}

impl Vehicle for VehicleState {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn forward(&self) -> Vec3 {
        self.forward
    }

    fn max_force(&self) -> f32 {
        self.max_force
    }

    fn arrival_radius(&self) -> f32 {
        self.arrival_radius
    }

    fn is_planar(&self) -> bool {
        self.planar
    }
}
