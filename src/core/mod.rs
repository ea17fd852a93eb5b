//! Core runtime pieces
//!
//! Simulation clock, periodic task scheduler and the steering event queue

mod events;
mod scheduler;
mod time;

pub use events::{EventQueue, SteeringEvent};
pub use scheduler::{TaskId, TickScheduler, Ticked};
pub use time::Time;
