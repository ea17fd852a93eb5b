//! Local avoidance against the edges of a navigable surface
//!
//! The whiskers cast three rays ahead of the vehicle every tick: one along
//! the predicted movement and two rotated left and right about Y. Rays that
//! hit a surface edge push the vehicle sideways along the edge. The spread
//! angle of the side rays widens while hits keep coming and collapses back
//! after a quiet cooldown.

use glam::{Quat, Vec3};

use super::steering::{Steering, SteeringContext};
use crate::config::WhiskerConfig;
use crate::core::SteeringEvent;

/// Result of a surface query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Hit position
    pub position: Vec3,
    /// Surface normal at the hit
    pub normal: Vec3,
    /// Whether anything was hit
    pub hit: bool,
}

impl SurfaceHit {
    /// A successful query
    #[must_use]
    pub fn at(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            normal,
            hit: true,
        }
    }

    /// An unsuccessful query
    #[must_use]
    pub fn miss() -> Self {
        Self {
            position: Vec3::ZERO,
            normal: Vec3::ZERO,
            hit: false,
        }
    }
}

/// Query contract of a navigation surface
pub trait NavigableSurface {
    /// Trace from `from` to `to`; a hit means the path leaves the surface
    fn raycast(&self, from: Vec3, to: Vec3) -> SurfaceHit;

    /// Closest surface point within `tolerance` of `point`
    fn sample_position(&self, point: Vec3, tolerance: f32) -> SurfaceHit;

    /// Closest surface edge to `point`
    fn find_closest_edge(&self, point: Vec3) -> SurfaceHit;
}

/// Part of `vector` perpendicular to the unit vector `unit`
#[must_use]
pub fn perpendicular(vector: Vec3, unit: Vec3) -> Vec3 {
    vector - unit * vector.dot(unit)
}

/// Hysteresis state of the whisker spread
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhiskerState {
    /// Spread angle in degrees
    pub angle: f32,
    /// Remaining quiet ticks before the spread collapses
    pub heat: u32,
}

impl WhiskerState {
    /// Start fully collapsed and cold
    #[must_use]
    pub fn new(min_angle: f32) -> Self {
        Self {
            angle: min_angle,
            heat: 0,
        }
    }

    /// Advance one tick
    pub fn update(&mut self, hit: bool, config: &WhiskerConfig) {
        if hit {
            self.heat = config.whisker_cooldown;
            self.angle += config.whisker_spread_speed;
        } else {
            self.heat = self.heat.saturating_sub(1);
            if self.heat == 0 {
                self.angle -= config.whisker_collapse_speed;
            }
        }
        self.angle = self
            .angle
            .clamp(config.min_whisker_angle, config.max_whisker_angle);
    }
}

/// Surface edge avoidance through three forward probes
#[derive(Debug, Clone)]
pub struct NavmeshWhiskers {
    config: WhiskerConfig,
    state: WhiskerState,
}

impl NavmeshWhiskers {
    /// Create with default tuning
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(WhiskerConfig::default())
    }

    /// Create from configuration
    #[must_use]
    pub fn from_config(mut config: WhiskerConfig) -> Self {
        if config.max_whisker_angle < config.min_whisker_angle {
            log::warn!(
                "Whisker angle range [{}, {}] is inverted, swapping",
                config.min_whisker_angle,
                config.max_whisker_angle
            );
            std::mem::swap(&mut config.min_whisker_angle, &mut config.max_whisker_angle);
        }
        Self {
            state: WhiskerState::new(config.min_whisker_angle),
            config,
        }
    }

    /// Enable or disable the off-surface check
    #[must_use]
    pub fn with_off_surface_checking(mut self, enabled: bool) -> Self {
        self.config.off_surface_checking = enabled;
        self
    }

    /// Tuning
    #[must_use]
    pub fn config(&self) -> &WhiskerConfig {
        &self.config
    }

    /// Spread state
    #[must_use]
    pub fn state(&self) -> WhiskerState {
        self.state
    }

    fn off_surface_force(
        &self,
        surface: &dyn NavigableSurface,
        ctx: &mut SteeringContext<'_>,
    ) -> Option<Vec3> {
        let probe = ctx.vehicle.position() + self.config.probe_position_offset;
        if surface.sample_position(probe, self.config.probe_radius).hit {
            return None;
        }

        let edge = surface.find_closest_edge(probe);
        if edge.hit {
            let push = (edge.position - probe).normalize_or_zero();
            return Some(push * ctx.vehicle.max_force() * self.config.avoidance_force_factor);
        }

        log::warn!("Vehicle at {probe} is off the surface with no edge in reach");
        ctx.events.push(SteeringEvent::OffSurface { probe });
        Some(Vec3::ZERO)
    }
}

impl Default for NavmeshWhiskers {
    fn default() -> Self {
        Self::new()
    }
}

impl Steering for NavmeshWhiskers {
    fn name(&self) -> &'static str {
        "NavmeshWhiskers"
    }

    fn is_post_process(&self) -> bool {
        true
    }

    fn calculate_force(&mut self, ctx: &mut SteeringContext<'_>) -> Vec3 {
        let Some(surface) = ctx.surface else {
            return Vec3::ZERO;
        };

        let vehicle = ctx.vehicle;
        let position = vehicle.position();
        let movement =
            vehicle.predict_future_position(self.config.min_time_to_collision) - position;

        if self.config.off_surface_checking {
            if let Some(force) = self.off_surface_force(surface, ctx) {
                return force;
            }
        }

        let angle = self.state.angle.to_radians();
        let whisker = movement * self.config.whisker_length_factor;
        // Positive rotation about Y turns left in a right-handed frame
        let right = Quat::from_rotation_y(-angle) * whisker;
        let left = Quat::from_rotation_y(angle) * whisker;

        let right_hit = surface.raycast(position, position + right);
        let left_hit = surface.raycast(position, position + left);
        let center_hit = surface.raycast(position, position + movement);

        let hit = [right_hit, left_hit, center_hit]
            .into_iter()
            .find(|hit| hit.hit);
        self.state.update(hit.is_some(), &self.config);

        let Some(hit) = hit else {
            return Vec3::ZERO;
        };

        let direction = movement.normalize_or_zero();
        let slide = perpendicular(hit.normal, direction).normalize_or_zero();
        slide * ctx.vehicle.max_force() * self.config.avoidance_force_factor + direction
    }
}
