//! Tether - keep a vehicle within range of a point

use glam::Vec3;

use super::steering::{Steering, SteeringContext};
use crate::config::ContainmentConfig;

/// Pulls the vehicle back toward a center once it strays past the inner
/// radius. The pull grows linearly and reaches the full offset at the outer
/// radius; beyond it the pull keeps growing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tether {
    center: Vec3,
    inner_radius: f32,
    outer_radius: f32,
}

impl Tether {
    /// Create around `center` with default radii
    #[must_use]
    pub fn new(center: Vec3) -> Self {
        Self::from_config(&ContainmentConfig {
            center,
            ..Default::default()
        })
    }

    /// Create from configuration
    #[must_use]
    pub fn from_config(config: &ContainmentConfig) -> Self {
        let mut tether = Self {
            center: config.center,
            inner_radius: 0.0,
            outer_radius: 0.0,
        };
        tether.set_inner_radius(config.inner_radius);
        tether.set_outer_radius(config.outer_radius);
        tether
    }

    /// Set both radii
    #[must_use]
    pub fn with_radii(mut self, inner: f32, outer: f32) -> Self {
        self.set_inner_radius(inner);
        self.set_outer_radius(outer);
        self
    }

    /// Tether center
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Move the tether center
    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    /// Radius where the pull starts
    #[must_use]
    pub fn inner_radius(&self) -> f32 {
        self.inner_radius
    }

    /// Set the inner radius (negative values become zero)
    pub fn set_inner_radius(&mut self, radius: f32) {
        self.inner_radius = radius.max(0.0);
    }

    /// Radius of full pull
    #[must_use]
    pub fn outer_radius(&self) -> f32 {
        self.outer_radius
    }

    /// Set the outer radius (negative values become zero)
    pub fn set_outer_radius(&mut self, radius: f32) {
        self.outer_radius = radius.max(0.0);
    }

    /// Pull strength for a vehicle `distance` away from the center
    #[must_use]
    pub fn pull_percent(&self, distance: f32) -> f32 {
        if distance <= self.inner_radius {
            0.0
        } else if self.outer_radius == self.inner_radius {
            1.0
        } else {
            (distance - self.inner_radius) / (self.outer_radius - self.inner_radius)
        }
    }
}

impl Default for Tether {
    fn default() -> Self {
        Self::from_config(&ContainmentConfig::default())
    }
}

impl Steering for Tether {
    fn name(&self) -> &'static str {
        "Tether"
    }

    fn calculate_force(&mut self, ctx: &mut SteeringContext<'_>) -> Vec3 {
        let difference = self.center - ctx.vehicle.position();
        difference * self.pull_percent(difference.length())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::VehicleState;
    use crate::core::EventQueue;
    use crate::ecs::World;

    fn force(tether: &mut Tether, position: Vec3) -> Vec3 {
        let vehicle = VehicleState::new(position);
        let world = World::new();
        let mut events = EventQueue::new();
        let mut ctx = SteeringContext::new(&vehicle, &world, &mut events);
        tether.calculate_force(&mut ctx)
    }

    #[test]
    fn test_tether_defaults() {
        let tether = Tether::default();
        assert_eq!(tether.inner_radius(), 20.0);
        assert_eq!(tether.outer_radius(), 30.0);
    }

    #[test]
    fn test_inside_inner_radius_is_zero() {
        let mut tether = Tether::new(Vec3::ZERO).with_radii(2.0, 4.0);

        assert_eq!(force(&mut tether, Vec3::new(1.0, 0.0, 0.0)), Vec3::ZERO);
        assert_eq!(force(&mut tether, Vec3::new(2.0, 0.0, 0.0)), Vec3::ZERO);
    }

    #[test]
    fn test_pull_grows_to_outer_radius() {
        let mut tether = Tether::new(Vec3::ZERO).with_radii(2.0, 4.0);

        let halfway = force(&mut tether, Vec3::new(3.0, 0.0, 0.0));
        assert!((halfway - Vec3::new(-1.5, 0.0, 0.0)).length() < 1e-5);

        let outer = force(&mut tether, Vec3::new(0.0, 0.0, 4.0));
        assert!((outer - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
    }

    #[test]
    fn test_pull_is_not_clamped_beyond_outer() {
        let tether = Tether::new(Vec3::ZERO).with_radii(2.0, 4.0);
        assert!((tether.pull_percent(8.0) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_equal_radii_pull_fully() {
        let mut tether = Tether::new(Vec3::ZERO).with_radii(3.0, 3.0);

        assert_eq!(tether.pull_percent(3.0), 0.0);
        assert_eq!(tether.pull_percent(3.001), 1.0);
        assert_eq!(tether.pull_percent(9.0), 1.0);
        let pushed = force(&mut tether, Vec3::new(3.5, 0.0, 0.0));
        assert!((pushed - Vec3::new(-3.5, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_radii_clamped_independently() {
        let mut tether = Tether::new(Vec3::ZERO);
        tether.set_inner_radius(-5.0);
        tether.set_outer_radius(-1.0);

        assert_eq!(tether.inner_radius(), 0.0);
        assert_eq!(tether.outer_radius(), 0.0);
        // Any displacement now pulls fully
        assert!((tether.pull_percent(0.1) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_moved_center() {
        let mut tether = Tether::new(Vec3::ZERO).with_radii(0.0, 1.0);
        tether.set_center(Vec3::new(0.0, 0.0, 5.0));

        let pull = force(&mut tether, Vec3::new(0.0, 0.0, 4.0));
        assert!((pull - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }
}
