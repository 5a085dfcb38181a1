//! The [`World`] coordinator: entities, components and system membership
//! kept in step.

use crate::ecs::component::{Component, ComponentArray, ComponentRegistry, ComponentTypeId};
use crate::ecs::entity::{Entity, EntityManager};
use crate::ecs::system::{SystemId, SystemRegistry};
use crate::error::{GameError, Result};
use crate::signature::Signature;

/// A tuple of component types, used to build required signatures.
pub trait ComponentSet {
    /// Signature with one bit per member type.
    fn signature(registry: &ComponentRegistry) -> Result<Signature>;
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            fn signature(registry: &ComponentRegistry) -> Result<Signature> {
                let mut signature = Signature::new();
                $(signature.set(registry.component_id::<$name>()?.index())?;)+
                Ok(signature)
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);

/// Owns every entity and component and keeps signatures and system
/// memberships consistent with the components actually present.
#[derive(Debug, Default)]
pub struct World {
    entities: EntityManager,
    components: ComponentRegistry,
    systems: SystemRegistry,
}

impl World {
    /// Empty world with nothing registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Entities
    // ========================================================================

    /// Allocate an entity.
    pub fn create_entity(&mut self) -> Result<Entity> {
        self.entities.create()
    }

    /// Destroy `entity`, dropping all of its components and memberships.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<()> {
        self.entities.destroy(entity)?;
        self.components.entity_destroyed(entity);
        self.systems.entity_destroyed(entity);
        Ok(())
    }

    /// Whether `entity` is live.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of live entities.
    #[must_use]
    pub const fn living_entity_count(&self) -> usize {
        self.entities.living_count()
    }

    /// Live entities, ascending.
    #[must_use]
    pub fn living_entities(&self) -> Vec<Entity> {
        self.entities.iter_living().collect()
    }

    /// Current signature of `entity`.
    pub fn signature(&self, entity: Entity) -> Result<Signature> {
        self.entities.signature(entity)
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Register a component type. Must happen once per type, before use.
    pub fn register_component<T: Component>(&mut self) -> Result<ComponentTypeId> {
        self.components.register::<T>()
    }

    /// Dense id of a registered component type.
    pub fn component_type<T: Component>(&self) -> Result<ComponentTypeId> {
        self.components.component_id::<T>()
    }

    /// Signature requiring every type in `S`.
    pub fn signature_for<S: ComponentSet>(&self) -> Result<Signature> {
        S::signature(&self.components)
    }

    /// Attach a component. `entity` must be live.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Result<()> {
        self.ensure_alive(entity)?;
        let mut signature = self.entities.signature(entity)?;
        let type_id = self.components.component_id::<T>()?;
        self.components.array_mut::<T>()?.insert(entity, component)?;

        signature.set(type_id.index())?;
        self.entities.set_signature(entity, signature)?;
        self.systems.entity_signature_changed(entity, signature);
        Ok(())
    }

    /// Detach and return a component.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<T> {
        self.ensure_alive(entity)?;
        let mut signature = self.entities.signature(entity)?;
        let type_id = self.components.component_id::<T>()?;
        let removed = self.components.array_mut::<T>()?.remove(entity)?;

        signature.reset(type_id.index())?;
        self.entities.set_signature(entity, signature)?;
        self.systems.entity_signature_changed(entity, signature);
        Ok(removed)
    }

    fn ensure_alive(&self, entity: Entity) -> Result<()> {
        self.entities.signature(entity)?;
        if self.entities.is_alive(entity) {
            Ok(())
        } else {
            Err(GameError::InvalidState(format!("{entity} is not alive")))
        }
    }

    /// Component of `entity`.
    pub fn get_component<T: Component>(&self, entity: Entity) -> Result<&T> {
        self.components
            .array::<T>()?
            .get(entity)
            .ok_or_else(|| GameError::component_not_found::<T>(entity))
    }

    /// Mutable component of `entity`.
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T> {
        self.components
            .array_mut::<T>()?
            .get_mut(entity)
            .ok_or_else(|| GameError::component_not_found::<T>(entity))
    }

    /// Component of `entity`, or `None` when absent or unregistered.
    #[must_use]
    pub fn try_get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.components.array::<T>().ok()?.get(entity)
    }

    /// Copy of the component of `entity`, or `default` when absent.
    #[must_use]
    pub fn get_component_or<T: Component + Clone>(&self, entity: Entity, default: T) -> T {
        self.try_get_component::<T>(entity)
            .cloned()
            .unwrap_or(default)
    }

    /// Whether `entity` holds a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.components
            .array::<T>()
            .is_ok_and(|array| array.contains(entity))
    }

    /// Number of `T` components in existence.
    #[must_use]
    pub fn component_count<T: Component>(&self) -> usize {
        self.components.array::<T>().map_or(0, ComponentArray::len)
    }

    /// Entities holding a `T`, ascending.
    #[must_use]
    pub fn entities_with<T: Component>(&self) -> Vec<Entity> {
        let mut entities = self
            .components
            .array::<T>()
            .map(|array| array.entities().to_vec())
            .unwrap_or_default();
        entities.sort_unstable();
        entities
    }

    // ========================================================================
    // Systems
    // ========================================================================

    /// Register a system's required signature.
    pub fn register_system(&mut self, name: &str, signature: Signature) -> Result<SystemId> {
        self.systems.register(name, signature)
    }

    /// Members of a system, ascending. Returned by value so the caller may
    /// mutate the world while iterating.
    pub fn system_members(&self, id: SystemId) -> Result<Vec<Entity>> {
        Ok(self.systems.members(id)?.iter().copied().collect())
    }

    /// System registry, for inspection.
    #[must_use]
    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Position(i32);
    impl Component for Position {}

    #[derive(Debug, Clone, PartialEq)]
    struct Speed(i32);
    impl Component for Speed {}

    fn world() -> World {
        let mut world = World::new();
        world.register_component::<Position>().unwrap();
        world.register_component::<Speed>().unwrap();
        world
    }

    #[test]
    fn test_add_get_remove() {
        let mut world = world();
        let entity = world.create_entity().unwrap();

        world.add_component(entity, Position(3)).unwrap();
        assert_eq!(world.get_component::<Position>(entity).unwrap(), &Position(3));
        assert!(world.signature(entity).unwrap().contains(0));

        world.get_component_mut::<Position>(entity).unwrap().0 = 7;
        assert_eq!(world.remove_component::<Position>(entity).unwrap(), Position(7));
        assert!(world.signature(entity).unwrap().none());
        assert!(!world.has_component::<Position>(entity));
    }

    #[test]
    fn test_error_conditions() {
        let mut world = world();
        let entity = world.create_entity().unwrap();
        world.add_component(entity, Speed(1)).unwrap();

        assert!(matches!(
            world.add_component(entity, Speed(2)),
            Err(GameError::DuplicateComponent { .. })
        ));
        assert!(matches!(
            world.get_component::<Position>(entity),
            Err(GameError::ComponentNotFound { .. })
        ));
        assert!(matches!(
            world.remove_component::<Position>(entity),
            Err(GameError::ComponentNotFound { .. })
        ));
        assert!(matches!(
            world.register_component::<Speed>(),
            Err(GameError::DuplicateRegistration(_))
        ));
        // A failed add leaves the original intact
        assert_eq!(world.get_component::<Speed>(entity).unwrap(), &Speed(1));
    }

    #[test]
    fn test_optional_probes() {
        let mut world = world();
        let entity = world.create_entity().unwrap();
        assert!(world.try_get_component::<Speed>(entity).is_none());
        assert_eq!(world.get_component_or(entity, Speed(9)), Speed(9));

        world.add_component(entity, Speed(4)).unwrap();
        assert_eq!(world.get_component_or(entity, Speed(9)), Speed(4));
    }

    #[test]
    fn test_system_membership_tracks_components() {
        let mut world = world();
        let signature = world.signature_for::<(Position, Speed)>().unwrap();
        let system = world.register_system("movement", signature).unwrap();
        let entity = world.create_entity().unwrap();

        world.add_component(entity, Position(0)).unwrap();
        assert!(world.system_members(system).unwrap().is_empty());

        world.add_component(entity, Speed(1)).unwrap();
        assert_eq!(world.system_members(system).unwrap(), vec![entity]);

        world.remove_component::<Speed>(entity).unwrap();
        assert!(world.system_members(system).unwrap().is_empty());
    }

    #[test]
    fn test_destroy_then_recreate_is_clean() {
        let mut world = world();
        let signature = world.signature_for::<(Position,)>().unwrap();
        let system = world.register_system("positions", signature).unwrap();

        let entity = world.create_entity().unwrap();
        world.add_component(entity, Position(1)).unwrap();
        world.add_component(entity, Speed(1)).unwrap();
        world.destroy_entity(entity).unwrap();

        assert_eq!(world.component_count::<Position>(), 0);
        assert_eq!(world.component_count::<Speed>(), 0);
        assert!(world.system_members(system).unwrap().is_empty());
        assert_eq!(world.living_entity_count(), 0);
        assert!(world.signature(entity).unwrap().none());
    }

    #[test]
    fn test_dead_ids_take_no_components() {
        let mut world = world();
        let never_created = Entity::from_raw(0);
        assert!(matches!(
            world.add_component(never_created, Position(1)),
            Err(GameError::InvalidState(_))
        ));
        assert!(matches!(
            world.remove_component::<Position>(never_created),
            Err(GameError::InvalidState(_))
        ));
        assert!(matches!(
            world.add_component(Entity::from_raw(u32::MAX), Position(1)),
            Err(GameError::OutOfRange { .. })
        ));

        let entity = world.create_entity().unwrap();
        assert_eq!(entity, never_created);
        assert!(world.signature(entity).unwrap().none());
        assert!(!world.has_component::<Position>(entity));

        world.destroy_entity(entity).unwrap();
        assert!(world.add_component(entity, Speed(2)).is_err());
        assert_eq!(world.component_count::<Speed>(), 0);
    }

    #[test]
    fn test_entities_with_sorted() {
        let mut world = world();
        let a = world.create_entity().unwrap();
        let b = world.create_entity().unwrap();
        world.add_component(b, Speed(0)).unwrap();
        world.add_component(a, Speed(0)).unwrap();
        assert_eq!(world.entities_with::<Speed>(), vec![a, b]);
    }
}
