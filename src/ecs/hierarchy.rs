//! Entity hierarchy components
//!
//! Parent-child relationships between entities. Collision-seek uses the
//! ancestor walk to treat hits on sub-colliders as hits on their owner.

use hecs::Entity;
use smallvec::SmallVec;

/// Parent component - indicates this entity has a parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

impl Parent {
    /// Create a new parent reference
    #[must_use]
    pub const fn new(entity: Entity) -> Self {
        Self(entity)
    }

    /// Get the parent entity
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.0
    }
}

/// Children component - tracks all children of this entity
#[derive(Debug, Clone, Default)]
pub struct Children(pub SmallVec<[Entity; 8]>);

impl Children {
    /// Create an empty children list
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Add a child
    pub fn add(&mut self, child: Entity) {
        if !self.0.contains(&child) {
            self.0.push(child);
        }
    }

    /// Remove a child
    pub fn remove(&mut self, child: Entity) -> bool {
        if let Some(pos) = self.0.iter().position(|&e| e == child) {
            self.0.remove(pos);
            true
        } else {
            false
        }
    }

    /// Get the number of children
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if this entity has children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read access to parent links.
pub trait Hierarchy {
    /// Parent of `entity`, if it has one
    fn parent(&self, entity: Entity) -> Option<Entity>;

    /// Check whether `ancestor` is a strict ancestor of `entity`.
    ///
    /// Walks at most `MAX_DEPTH` links so a malformed cycle cannot hang
    /// the caller.
    fn is_ancestor(&self, ancestor: Entity, entity: Entity) -> bool {
        const MAX_DEPTH: usize = 64;

        let mut current = self.parent(entity);
        for _ in 0..MAX_DEPTH {
            match current {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => current = self.parent(parent),
                None => return false,
            }
        }
        false
    }
}
