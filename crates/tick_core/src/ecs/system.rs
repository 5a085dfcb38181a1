//! System registration and signature-driven membership.

use std::collections::{BTreeSet, HashMap};

use crate::ecs::Entity;
use crate::error::{GameError, Result};
use crate::signature::Signature;

/// Maximum number of registered systems.
pub const MAX_SYSTEMS: usize = 64;

/// Handle returned by [`SystemRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(usize);

impl SystemId {
    /// Registration index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct SystemEntry {
    name: String,
    signature: Signature,
    members: BTreeSet<Entity>,
}

/// Tracks, for every system, the entities whose signature satisfies it.
#[derive(Debug, Default)]
pub struct SystemRegistry {
    entries: Vec<SystemEntry>,
    by_name: HashMap<String, SystemId>,
}

impl SystemRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system under a unique name.
    pub fn register(&mut self, name: &str, signature: Signature) -> Result<SystemId> {
        if self.by_name.contains_key(name) {
            return Err(GameError::DuplicateRegistration(format!("system {name}")));
        }
        if self.entries.len() >= MAX_SYSTEMS {
            return Err(GameError::CapacityExceeded {
                resource: "systems",
                limit: MAX_SYSTEMS,
            });
        }

        let id = SystemId(self.entries.len());
        self.entries.push(SystemEntry {
            name: name.to_string(),
            signature,
            members: BTreeSet::new(),
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Look a system up by name.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<SystemId> {
        self.by_name.get(name).copied()
    }

    /// Name of a system.
    #[must_use]
    pub fn name(&self, id: SystemId) -> Option<&str> {
        self.entries.get(id.0).map(|entry| entry.name.as_str())
    }

    /// Required signature of a system.
    #[must_use]
    pub fn signature(&self, id: SystemId) -> Option<Signature> {
        self.entries.get(id.0).map(|entry| entry.signature)
    }

    /// Re-evaluate `entity` against every system after its signature changed.
    pub fn entity_signature_changed(&mut self, entity: Entity, signature: Signature) {
        for entry in &mut self.entries {
            if signature.is_superset_of(&entry.signature) {
                entry.members.insert(entity);
            } else {
                entry.members.remove(&entity);
            }
        }
    }

    /// Drop `entity` from every system.
    pub fn entity_destroyed(&mut self, entity: Entity) {
        for entry in &mut self.entries {
            entry.members.remove(&entity);
        }
    }

    /// Members of a system in ascending entity order.
    pub fn members(&self, id: SystemId) -> Result<&BTreeSet<Entity>> {
        self.entries
            .get(id.0)
            .map(|entry| &entry.members)
            .ok_or(GameError::OutOfRange {
                what: "system",
                index: id.0 as u64,
                limit: self.entries.len() as u64,
            })
    }

    /// Number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No systems registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(bits: u64) -> Signature {
        Signature::from_bits(bits).unwrap()
    }

    #[test]
    fn test_membership_follows_signature() {
        let mut registry = SystemRegistry::new();
        let movers = registry.register("movement", sig(0b011)).unwrap();
        let fighters = registry.register("combat", sig(0b100)).unwrap();
        let entity = Entity::from_raw(4);

        registry.entity_signature_changed(entity, sig(0b001));
        assert!(registry.members(movers).unwrap().is_empty());

        registry.entity_signature_changed(entity, sig(0b111));
        assert!(registry.members(movers).unwrap().contains(&entity));
        assert!(registry.members(fighters).unwrap().contains(&entity));

        registry.entity_signature_changed(entity, sig(0b110));
        assert!(!registry.members(movers).unwrap().contains(&entity));
        assert!(registry.members(fighters).unwrap().contains(&entity));

        registry.entity_destroyed(entity);
        assert!(registry.members(fighters).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = SystemRegistry::new();
        registry.register("movement", sig(1)).unwrap();
        assert!(matches!(
            registry.register("movement", sig(2)),
            Err(GameError::DuplicateRegistration(_))
        ));
        assert_eq!(registry.id("movement"), Some(SystemId(0)));
    }

    #[test]
    fn test_capacity() {
        let mut registry = SystemRegistry::new();
        for i in 0..MAX_SYSTEMS {
            registry.register(&format!("system-{i}"), sig(0)).unwrap();
        }
        assert!(matches!(
            registry.register("one-too-many", sig(0)),
            Err(GameError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_members_are_sorted() {
        let mut registry = SystemRegistry::new();
        let id = registry.register("all", sig(0)).unwrap();
        for raw in [9, 2, 5] {
            registry.entity_signature_changed(Entity::from_raw(raw), sig(0));
        }
        let members: Vec<u32> = registry.members(id).unwrap().iter().map(|e| e.id()).collect();
        assert_eq!(members, vec![2, 5, 9]);
    }
}
