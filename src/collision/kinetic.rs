use crate::core::collidable::{same_entity, EntityHandle};

/// Moving entities, scanned in full every tick.
///
/// Duplicates are allowed; each registration is a separate member and is
/// processed separately during a tick.
#[derive(Default, Clone)]
pub struct KineticSet {
    members: Vec<EntityHandle>,
}

impl KineticSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entity: EntityHandle) -> bool {
        self.members.push(entity);
        true
    }

    /// Removes the earliest registration of `entity`.
    pub fn remove(&mut self, entity: &EntityHandle) -> bool {
        match self.members.iter().position(|m| same_entity(m, entity)) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, entity: &EntityHandle) -> bool {
        self.members.iter().any(|m| same_entity(m, entity))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntityHandle> {
        self.members.iter()
    }
}
