//! Steering behavior interface
//!
//! Every behavior turns the current vehicle state into one independent
//! force contribution per tick. Weighting and summing the contributions is
//! left to the host.

use glam::Vec3;

use super::navmesh::NavigableSurface;
use super::vehicle::Vehicle;
use crate::core::{EventQueue, SteeringEvent};
use crate::ecs::PoseSource;

/// Everything a behavior may read (and report to) during one tick.
pub struct SteeringContext<'a> {
    /// The steered vehicle
    pub vehicle: &'a dyn Vehicle,
    /// Poses of tracked targets
    pub poses: &'a dyn PoseSource,
    /// Navigable surface, if the host has one
    pub surface: Option<&'a dyn NavigableSurface>,
    /// Event sink
    pub events: &'a mut EventQueue,
}

impl<'a> SteeringContext<'a> {
    /// Create a context without navigable surface
    pub fn new(
        vehicle: &'a dyn Vehicle,
        poses: &'a dyn PoseSource,
        events: &'a mut EventQueue,
    ) -> Self {
        Self {
            vehicle,
            poses,
            surface: None,
            events,
        }
    }

    /// Attach a navigable surface
    #[must_use]
    pub fn with_surface(mut self, surface: &'a dyn NavigableSurface) -> Self {
        self.surface = Some(surface);
        self
    }
}

/// A force contribution tagged with the behavior that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringOutput {
    /// Producing behavior
    pub behavior: &'static str,
    /// Force vector
    pub force: Vec3,
}

impl SteeringOutput {
    /// Check if the behavior asked for no steering this tick
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.force == Vec3::ZERO
    }
}

/// Trait for steering behaviors
pub trait Steering {
    /// Behavior name for logging and events
    fn name(&self) -> &'static str;

    /// Compute this tick's force
    fn calculate_force(&mut self, ctx: &mut SteeringContext<'_>) -> Vec3;

    /// Whether the host should apply this behavior after the others.
    ///
    /// Corrective behaviors such as surface avoidance want to see the
    /// vehicle's intended movement before adjusting it.
    fn is_post_process(&self) -> bool {
        false
    }

    /// Compute this tick's force, tagged with the behavior name
    fn evaluate(&mut self, ctx: &mut SteeringContext<'_>) -> SteeringOutput {
        SteeringOutput {
            behavior: self.name(),
            force: self.calculate_force(ctx),
        }
    }
}

/// Remembers whether arrival was already reported for the current target.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrivalReport {
    reported: bool,
}

impl ArrivalReport {
    /// Report arrival once; later calls are ignored until [`clear`](Self::clear)
    pub fn report(&mut self, behavior: &'static str, ctx: &mut SteeringContext<'_>) {
        if self.reported {
            return;
        }
        self.reported = true;
        log::debug!("{behavior} arrived at {}", ctx.vehicle.position());
        ctx.events.push(SteeringEvent::Arrived {
            behavior,
            position: ctx.vehicle.position(),
        });
    }

    /// Forget the arrival, e.g. after the target changed
    pub fn clear(&mut self) {
        self.reported = false;
    }

    /// Whether arrival was reported
    #[must_use]
    pub fn has_reported(&self) -> bool {
        self.reported
    }
}
