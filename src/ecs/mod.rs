//! Entity Component System
//!
//! Tracked targets live in a hecs world; behaviors read them through
//! [`PoseSource`] and [`Hierarchy`].

mod components;
mod hierarchy;
mod world;

pub use components::{Name, Pose, Transform};
pub use hierarchy::{Children, Hierarchy, Parent};
pub use world::{PoseSource, World};
