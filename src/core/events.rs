//! Steering event queue
//!
//! Behaviors report notable transitions (arrival, contact latching,
//! leaving the navigable surface) as events instead of calling back into
//! the host. The queue is double-buffered: events pushed during tick N are
//! readable during tick N+1.
//!
//! # Example
//!
//! ```ignore
//! queue.swap();
//! for event in queue.iter() {
//!     if let SteeringEvent::Arrived { behavior, .. } = event {
//!         log::info!("{behavior} arrived");
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec3;
use hecs::Entity;

// ============================================================================
// Event Types
// ============================================================================

/// Things that happened while computing steering forces.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SteeringEvent {
    /// A seeking behavior reached its target for the first time.
    Arrived {
        /// Name of the behavior that arrived
        behavior: &'static str,
        /// Vehicle position at arrival
        position: Vec3,
    },

    /// A collision-seek behavior registered contact with its target.
    ContactLatched {
        /// The target object
        target: Entity,
        /// Target position recorded at contact
        position: Vec3,
    },

    /// A latched collision-seek target moved far enough to be chased again.
    ContactRearmed {
        /// The target object
        target: Entity,
    },

    /// The vehicle is off the navigable surface with no edge in range.
    ///
    /// Steering cannot recover from this; the host has to reposition.
    OffSurface {
        /// Probe position that failed to sample the surface
        probe: Vec3,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered queue of [`SteeringEvent`]s.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<SteeringEvent>,
    /// Events from the previous tick, ready for processing
    processing: VecDeque<SteeringEvent>,
}

impl EventQueue {
    const DEFAULT_CAPACITY: usize = 16;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be processed next tick.
    #[inline]
    pub fn push(&mut self, event: SteeringEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues.
    ///
    /// Call once per tick, before behaviors run.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous tick.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &SteeringEvent> {
        self.processing.iter()
    }

    /// Drain all events from the previous tick.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = SteeringEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are any events to process.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Get the number of events ready for processing.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Get the number of events pending for next tick.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear all events (both pending and processing).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrived(position: Vec3) -> SteeringEvent {
        SteeringEvent::Arrived {
            behavior: "Point",
            position,
        }
    }

    #[test]
    fn test_event_queue_push_and_swap() {
        let mut queue = EventQueue::new();

        queue.push(arrived(Vec3::X));
        assert!(queue.is_empty(), "Events should not be visible before swap");

        queue.swap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next(), Some(&arrived(Vec3::X)));
    }

    #[test]
    fn test_event_queue_double_buffer_isolation() {
        let mut queue = EventQueue::new();

        queue.push(arrived(Vec3::X));
        queue.swap();
        queue.push(arrived(Vec3::Y));

        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events, vec![&arrived(Vec3::X)]);

        queue.swap();
        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events, vec![&arrived(Vec3::Y)]);
    }

    #[test]
    fn test_event_queue_drain_and_clear() {
        let mut queue = EventQueue::new();

        queue.push(SteeringEvent::OffSurface { probe: Vec3::ZERO });
        queue.push(arrived(Vec3::Z));
        queue.swap();

        assert_eq!(queue.drain().count(), 2);
        assert!(queue.is_empty());

        queue.push(arrived(Vec3::Z));
        queue.clear();
        assert_eq!(queue.pending_count(), 0);
    }
}
