//! World wrapper around hecs

use hecs::Entity;

use super::components::{Pose, Transform};
use super::hierarchy::{Children, Hierarchy, Parent};

/// Read access to target poses.
///
/// Trackers and behaviors only ever see targets through this trait, so a
/// host can back it with its own scene graph instead of [`World`].
pub trait PoseSource {
    /// Current pose of `entity`, or `None` if it no longer exists
    fn pose(&self, entity: Entity) -> Option<Pose>;
}

/// World containing tracked targets and their hierarchy
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl World {
    /// Create a new empty world
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an entity with the given components
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Despawn an entity
    ///
    /// # Errors
    ///
    /// Returns an error if the entity does not exist
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Get a reference to a component
    ///
    /// # Errors
    ///
    /// Returns an error if the entity or component is missing
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Get a mutable reference to a component
    ///
    /// # Errors
    ///
    /// Returns an error if the entity or component is missing
    pub fn get_mut<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, T>, hecs::ComponentError> {
        self.inner.get::<&mut T>(entity)
    }

    /// Check if an entity exists
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Move an entity's transform by `delta`. Returns false if it has none.
    pub fn translate(&mut self, entity: Entity, delta: glam::Vec3) -> bool {
        match self.inner.get::<&mut Transform>(entity) {
            Ok(mut transform) => {
                transform.translate(delta);
                true
            }
            Err(_) => false,
        }
    }

    /// Attach `child` under `parent`, keeping both link components in sync.
    ///
    /// # Errors
    ///
    /// Returns an error if either entity does not exist
    pub fn set_parent(&mut self, child: Entity, parent: Entity) -> Result<(), hecs::NoSuchEntity> {
        if !self.inner.contains(parent) {
            return Err(hecs::NoSuchEntity);
        }

        if let Ok(old) = self.inner.get::<&Parent>(child).map(|p| p.entity()) {
            if let Ok(mut children) = self.inner.get::<&mut Children>(old) {
                children.remove(child);
            }
        }
        self.inner.insert_one(child, Parent::new(parent))?;

        let has_children = self.inner.get::<&Children>(parent).is_ok();
        if has_children {
            if let Ok(mut children) = self.inner.get::<&mut Children>(parent) {
                children.add(child);
            }
        } else {
            let mut children = Children::new();
            children.add(child);
            self.inner.insert_one(parent, children)?;
        }
        Ok(())
    }

    /// Get the number of entities
    #[must_use]
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseSource for World {
    fn pose(&self, entity: Entity) -> Option<Pose> {
        self.inner
            .get::<&Transform>(entity)
            .ok()
            .map(|transform| transform.pose())
    }
}

impl Hierarchy for World {
    fn parent(&self, entity: Entity) -> Option<Entity> {
        self.inner
            .get::<&Parent>(entity)
            .ok()
            .map(|parent| parent.entity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_pose_reads_transform() {
        let mut world = World::new();
        let entity = world.spawn((Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),));

        let pose = world.pose(entity).map(|p| p.position);
        assert_eq!(pose, Some(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_pose_missing_after_despawn() {
        let mut world = World::new();
        let entity = world.spawn((Transform::new(),));
        let _ = world.despawn(entity);

        assert!(world.pose(entity).is_none());
    }

    #[test]
    fn test_set_parent_links_both_sides() {
        let mut world = World::new();
        let parent = world.spawn((Transform::new(),));
        let child = world.spawn((Transform::new(),));

        assert!(world.set_parent(child, parent).is_ok());
        assert_eq!(world.parent(child), Some(parent));
        assert_eq!(world.get::<Children>(parent).map(|c| c.len()).ok(), Some(1));
    }

    #[test]
    fn test_reparent_removes_old_link() {
        let mut world = World::new();
        let first = world.spawn((Transform::new(),));
        let second = world.spawn((Transform::new(),));
        let child = world.spawn((Transform::new(),));

        assert!(world.set_parent(child, first).is_ok());
        assert!(world.set_parent(child, second).is_ok());

        assert_eq!(world.parent(child), Some(second));
        assert_eq!(world.get::<Children>(first).map(|c| c.len()).ok(), Some(0));
        assert!(world.is_ancestor(second, child));
    }

    #[test]
    fn test_translate_moves_transform() {
        let mut world = World::new();
        let entity = world.spawn((Transform::new(),));

        assert!(world.translate(entity, Vec3::X));
        assert_eq!(world.pose(entity).map(|p| p.position), Some(Vec3::X));
    }
}
