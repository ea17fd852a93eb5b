//! Seek toward a fixed point

use glam::Vec3;

use super::steering::{ArrivalReport, Steering, SteeringContext};
use crate::config::PointConfig;

/// Steers toward a fixed world position
#[derive(Debug, Clone, Copy)]
pub struct SteerForPoint {
    target: Vec3,
    /// Subtract the vehicle velocity while seeking
    pub consider_velocity: bool,
    /// Stop once inside the vehicle's arrival radius
    pub consider_arrival_radius: bool,
    arrival: ArrivalReport,
}

impl SteerForPoint {
    /// Seek `target` with default settings
    #[must_use]
    pub fn new(target: Vec3) -> Self {
        Self::from_config(&PointConfig {
            target,
            ..Default::default()
        })
    }

    /// Create from configuration
    #[must_use]
    pub fn from_config(config: &PointConfig) -> Self {
        Self {
            target: config.target,
            consider_velocity: config.consider_velocity,
            consider_arrival_radius: config.consider_arrival_radius,
            arrival: ArrivalReport::default(),
        }
    }

    /// Point being sought
    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Seek a new point; arrival will be reported again
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.arrival.clear();
    }

    /// Whether arrival at the current point was reported
    #[must_use]
    pub fn has_arrived(&self) -> bool {
        self.arrival.has_reported()
    }
}

impl Steering for SteerForPoint {
    fn name(&self) -> &'static str {
        "SteerForPoint"
    }

    fn calculate_force(&mut self, ctx: &mut SteeringContext<'_>) -> Vec3 {
        let force = ctx.vehicle.seek(
            self.target,
            self.consider_velocity,
            self.consider_arrival_radius,
        );
        if self.consider_arrival_radius && force == Vec3::ZERO {
            let name = self.name();
            self.arrival.report(name, ctx);
        }
        force
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::VehicleState;
    use crate::core::{EventQueue, SteeringEvent};
    use crate::ecs::World;

    #[test]
    fn test_point_seek() {
        let world = World::new();
        let mut events = EventQueue::new();
        let vehicle = VehicleState::new(Vec3::ZERO).with_velocity(Vec3::X);
        let mut ctx = SteeringContext::new(&vehicle, &world, &mut events);

        let mut point = SteerForPoint::new(Vec3::new(0.0, 0.0, 5.0));
        let force = point.calculate_force(&mut ctx);
        assert!((force - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);

        point.consider_velocity = true;
        let force = point.calculate_force(&mut ctx);
        assert!((force - Vec3::new(-1.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn test_arrival_reported_once_per_target() {
        let world = World::new();
        let mut events = EventQueue::new();
        let vehicle = VehicleState::new(Vec3::ZERO);
        let mut point = SteerForPoint::new(Vec3::new(0.1, 0.0, 0.0));

        {
            let mut ctx = SteeringContext::new(&vehicle, &world, &mut events);
            assert_eq!(point.calculate_force(&mut ctx), Vec3::ZERO);
            assert_eq!(point.calculate_force(&mut ctx), Vec3::ZERO);
        }
        assert!(point.has_arrived());
        events.swap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events.iter().next(),
            Some(SteeringEvent::Arrived {
                behavior: "SteerForPoint",
                ..
            })
        ));

        point.set_target(Vec3::new(0.0, 0.0, 0.1));
        assert!(!point.has_arrived());
        {
            let mut ctx = SteeringContext::new(&vehicle, &world, &mut events);
            point.calculate_force(&mut ctx);
        }
        events.swap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_exact_point_ignores_arrival_radius() {
        let world = World::new();
        let mut events = EventQueue::new();
        let vehicle = VehicleState::new(Vec3::ZERO).with_arrival_radius(1.0);
        let mut ctx = SteeringContext::new(&vehicle, &world, &mut events);

        let mut point = SteerForPoint::new(Vec3::new(0.5, 0.0, 0.0));
        point.consider_arrival_radius = false;
        assert!(point.calculate_force(&mut ctx).x > 0.0);
        assert!(!point.has_arrived());
    }
}
