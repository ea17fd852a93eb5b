//! Steering forces and kinematic tracking for autonomous vehicles
//!
//! This crate provides:
//! - Per-tick steering behaviors (pursuit, evasion, tether, wander, ...)
//! - Kinematic tracking of moving targets on its own sampling cadence
//! - Navigation surface avoidance through whisker probes
//! - RON/JSON steering profiles

pub mod ai;
pub mod config;
pub mod core;
pub mod ecs;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        CollisionSeek, Evasion, GridSurface, KinematicTracker, NavigableSurface, NavmeshWhiskers,
        Pursuit, SteerForPoint, Steering, SteeringContext, SteeringOutput, Tether, Vehicle,
        VehicleState, Wander, WanderStrategy,
    };
    pub use crate::config::{ConfigError, SteeringProfile};
    pub use crate::core::{EventQueue, SteeringEvent, TickScheduler, Time};
    pub use crate::ecs::{Hierarchy, Name, Pose, PoseSource, Transform, World};
    pub use glam::{Quat, Vec2, Vec3};
}
