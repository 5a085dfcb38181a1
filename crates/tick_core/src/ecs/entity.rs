//! Entity id allocation and per-entity signatures.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::signature::Signature;

/// Maximum number of simultaneously live entities.
pub const MAX_ENTITIES: usize = 5000;

/// Opaque entity identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Entity(u32);

impl Entity {
    /// Wrap a raw id.
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// The raw id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Index into per-entity tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Hands out entity ids from a FIFO free list and tracks signatures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityManager {
    free: VecDeque<Entity>,
    signatures: Vec<Signature>,
    alive: Vec<bool>,
    living: usize,
}

impl EntityManager {
    /// Create a manager with every id free.
    #[must_use]
    pub fn new() -> Self {
        let free = (0..MAX_ENTITIES as u32).map(Entity).collect();
        Self {
            free,
            signatures: vec![Signature::new(); MAX_ENTITIES],
            alive: vec![false; MAX_ENTITIES],
            living: 0,
        }
    }

    /// Allocate the next free id.
    pub fn create(&mut self) -> Result<Entity> {
        if self.living >= MAX_ENTITIES {
            return Err(GameError::CapacityExceeded {
                resource: "entities",
                limit: MAX_ENTITIES,
            });
        }
        let entity = self.free.pop_front().ok_or(GameError::CapacityExceeded {
            resource: "entities",
            limit: MAX_ENTITIES,
        })?;
        self.alive[entity.index()] = true;
        self.living += 1;
        Ok(entity)
    }

    /// Return `entity` to the free list and clear its signature.
    ///
    /// Destroying an id that is not live only clears its signature.
    pub fn destroy(&mut self, entity: Entity) -> Result<()> {
        Self::check(entity)?;
        self.signatures[entity.index()].reset_all();
        if std::mem::take(&mut self.alive[entity.index()]) {
            self.free.push_back(entity);
            self.living -= 1;
        }
        Ok(())
    }

    /// Whether `entity` is currently allocated.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.index()).copied().unwrap_or(false)
    }

    /// Replace the signature of `entity`.
    pub fn set_signature(&mut self, entity: Entity, signature: Signature) -> Result<()> {
        Self::check(entity)?;
        self.signatures[entity.index()] = signature;
        Ok(())
    }

    /// Signature of `entity`.
    pub fn signature(&self, entity: Entity) -> Result<Signature> {
        Self::check(entity)?;
        Ok(self.signatures[entity.index()])
    }

    /// Number of live entities.
    #[must_use]
    pub const fn living_count(&self) -> usize {
        self.living
    }

    /// Live entities, ascending.
    pub fn iter_living(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|&(_, &alive)| alive)
            .map(|(index, _)| Entity(index as u32))
    }

    fn check(entity: Entity) -> Result<()> {
        if entity.index() >= MAX_ENTITIES {
            return Err(GameError::OutOfRange {
                what: "entity",
                index: u64::from(entity.0),
                limit: MAX_ENTITIES as u64,
            });
        }
        Ok(())
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let mut manager = EntityManager::new();
        assert_eq!(manager.create().unwrap(), Entity(0));
        assert_eq!(manager.create().unwrap(), Entity(1));
        assert_eq!(manager.living_count(), 2);
    }

    #[test]
    fn test_destroyed_ids_go_to_back_of_queue() {
        let mut manager = EntityManager::new();
        let first = manager.create().unwrap();
        manager.destroy(first).unwrap();
        // FIFO: the recycled id comes back only after the rest of the pool
        assert_eq!(manager.create().unwrap(), Entity(1));
        assert_eq!(manager.living_count(), 1);
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut manager = EntityManager::new();
        for _ in 0..MAX_ENTITIES {
            manager.create().unwrap();
        }
        assert!(matches!(
            manager.create(),
            Err(GameError::CapacityExceeded { limit, .. }) if limit == MAX_ENTITIES
        ));
    }

    #[test]
    fn test_out_of_range() {
        let mut manager = EntityManager::new();
        let bogus = Entity::from_raw(MAX_ENTITIES as u32);
        assert!(matches!(
            manager.destroy(bogus),
            Err(GameError::OutOfRange { .. })
        ));
        assert!(manager.signature(bogus).is_err());
    }

    #[test]
    fn test_destroy_clears_signature() {
        let mut manager = EntityManager::new();
        let entity = manager.create().unwrap();
        let mut signature = Signature::new();
        signature.set(3).unwrap();
        manager.set_signature(entity, signature).unwrap();
        manager.destroy(entity).unwrap();
        assert!(manager.signature(entity).unwrap().none());
        assert!(!manager.is_alive(entity));
    }

    #[test]
    fn test_double_destroy_does_not_duplicate_id() {
        let mut manager = EntityManager::new();
        let entity = manager.create().unwrap();
        manager.destroy(entity).unwrap();
        manager.destroy(entity).unwrap();
        assert_eq!(manager.living_count(), 0);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..MAX_ENTITIES {
            assert!(seen.insert(manager.create().unwrap()));
        }
        assert!(manager.create().is_err());
    }
}
