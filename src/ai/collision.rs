//! Collision seek - run into a target, then wait until it moves away
//!
//! Contacts come from the host's collision system through
//! [`CollisionSeek::register_contact`]. Once contact is latched the behavior
//! produces no force until the target has moved more than
//! `min_move_distance` away from where the contact happened.

use glam::Vec3;
use hecs::Entity;

use super::steering::{Steering, SteeringContext};
use crate::config::CollisionSeekConfig;
use crate::core::{EventQueue, SteeringEvent};
use crate::ecs::{Hierarchy, PoseSource};

/// Latch state of a collision seek
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollisionGate {
    /// Contact registered and not yet re-armed
    pub collided: bool,
    /// Target position recorded at contact
    pub position: Vec3,
}

impl CollisionGate {
    /// Latch at the target's `position`
    pub fn latch(&mut self, position: Vec3) {
        self.collided = true;
        self.position = position;
    }

    /// Forget any contact
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Seeks a target entity until touching it
#[derive(Debug, Clone)]
pub struct CollisionSeek {
    target: Option<Entity>,
    gate: CollisionGate,
    /// Subtract the vehicle velocity while seeking
    pub consider_velocity: bool,
    /// Count contacts with descendants of the target as contacts with it
    pub consider_sub_colliders: bool,
    /// Distance the target must move after contact to re-arm
    pub min_move_distance: f32,
}

impl CollisionSeek {
    /// Create without target
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&CollisionSeekConfig::default())
    }

    /// Create from configuration
    #[must_use]
    pub fn from_config(config: &CollisionSeekConfig) -> Self {
        Self {
            target: None,
            gate: CollisionGate::default(),
            consider_velocity: config.consider_velocity,
            consider_sub_colliders: config.consider_sub_colliders,
            min_move_distance: config.min_move_distance,
        }
    }

    /// Set the target
    #[must_use]
    pub fn with_target(mut self, target: Entity) -> Self {
        self.set_target(Some(target));
        self
    }

    /// Current target
    #[must_use]
    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    /// Change target and clear the latch
    pub fn set_target(&mut self, target: Option<Entity>) {
        self.target = target;
        self.gate.reset();
    }

    /// Latch state
    #[must_use]
    pub fn gate(&self) -> CollisionGate {
        self.gate
    }

    /// Whether the vehicle is resting against its target
    #[must_use]
    pub fn is_latched(&self) -> bool {
        self.gate.collided
    }

    /// Report a contact between the vehicle and `other`.
    ///
    /// Returns `true` when the contact latched the gate.
    pub fn register_contact(
        &mut self,
        other: Entity,
        hierarchy: &dyn Hierarchy,
        poses: &dyn PoseSource,
        events: &mut EventQueue,
    ) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        if self.gate.collided {
            return false;
        }

        let matches = other == target
            || (self.consider_sub_colliders && hierarchy.is_ancestor(target, other));
        if !matches {
            return false;
        }

        let Some(pose) = poses.pose(target) else {
            return false;
        };
        self.gate.latch(pose.position);
        log::debug!("Contact with {target:?} latched at {}", pose.position);
        events.push(SteeringEvent::ContactLatched {
            target,
            position: pose.position,
        });
        true
    }

    /// Re-arm once the target moved away from the recorded contact
    pub fn refresh(&mut self, poses: &dyn PoseSource, events: &mut EventQueue) {
        if !self.gate.collided {
            return;
        }
        let Some(target) = self.target else {
            return;
        };
        let Some(pose) = poses.pose(target) else {
            return;
        };

        if pose.position.distance(self.gate.position) > self.min_move_distance {
            self.gate.collided = false;
            events.push(SteeringEvent::ContactRearmed { target });
        }
    }
}

impl Default for CollisionSeek {
    fn default() -> Self {
        Self::new()
    }
}

impl Steering for CollisionSeek {
    fn name(&self) -> &'static str {
        "CollisionSeek"
    }

    fn calculate_force(&mut self, ctx: &mut SteeringContext<'_>) -> Vec3 {
        self.refresh(ctx.poses, ctx.events);
        if self.gate.collided {
            return Vec3::ZERO;
        }

        match self.target.and_then(|target| ctx.poses.pose(target)) {
            Some(pose) => ctx.vehicle.seek(pose.position, self.consider_velocity, false),
            None => Vec3::ZERO,
        }
    }
}
