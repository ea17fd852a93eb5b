//! Steering behaviors and kinematic tracking
//!
//! Each behavior turns the state of one vehicle into an independent force
//! contribution per tick. Combining contributions is left to the host.

mod collision;
mod evasion;
mod grid_surface;
mod navmesh;
mod point;
mod pursuit;
mod random;
mod steering;
mod tether;
mod tracker;
mod vehicle;
mod wander;

pub use collision::{CollisionGate, CollisionSeek};
pub use evasion::Evasion;
pub use grid_surface::GridSurface;
pub use navmesh::{NavigableSurface, NavmeshWhiskers, SurfaceHit, WhiskerState, perpendicular};
pub use point::SteerForPoint;
pub use pursuit::{
    HEADING_THRESHOLD, Pursuit, estimated_intercept_time, interval_comparison, time_factor,
};
pub use random::{RandomSource, SmallRandom};
pub use steering::{ArrivalReport, Steering, SteeringContext, SteeringOutput};
pub use tether::Tether;
pub use tracker::{
    DEFAULT_MOVING_TOLERANCE, DEFAULT_TRACKING_INTERVAL, KinematicSample, KinematicTracker,
    angular_velocity_between,
};
pub use vehicle::{Vehicle, VehicleState, seek_vector};
pub use wander::{Wander, WanderStrategy};
