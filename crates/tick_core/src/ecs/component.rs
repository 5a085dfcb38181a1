//! Dense per-type component storage and the component type registry.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::Debug;

use crate::ecs::Entity;
use crate::error::{short_type_name, GameError, Result};
use crate::signature::MAX_COMPONENTS;

/// Marker for types that can be attached to entities.
pub trait Component: Any + Debug {}

/// Dense index of a registered component type; also its signature bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(u8);

impl ComponentTypeId {
    /// Signature bit for this type.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Densely packed components of one type.
///
/// Removal swaps the last element into the hole, so iteration order is
/// not stable across removals.
#[derive(Debug)]
pub struct ComponentArray<T> {
    data: Vec<T>,
    entity_to_index: HashMap<Entity, usize>,
    index_to_entity: Vec<Entity>,
}

impl<T: Component> ComponentArray<T> {
    /// Empty array.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            entity_to_index: HashMap::new(),
            index_to_entity: Vec::new(),
        }
    }

    /// Attach `component` to `entity`.
    pub fn insert(&mut self, entity: Entity, component: T) -> Result<()> {
        if self.entity_to_index.contains_key(&entity) {
            return Err(GameError::DuplicateComponent {
                entity,
                component: short_type_name::<T>(),
            });
        }
        self.entity_to_index.insert(entity, self.data.len());
        self.index_to_entity.push(entity);
        self.data.push(component);
        Ok(())
    }

    /// Detach and return the component held by `entity`.
    pub fn remove(&mut self, entity: Entity) -> Result<T> {
        let index = self
            .entity_to_index
            .remove(&entity)
            .ok_or_else(|| GameError::component_not_found::<T>(entity))?;

        let removed = self.data.swap_remove(index);
        self.index_to_entity.swap_remove(index);

        // The former last element now lives at `index`
        if let Some(&moved) = self.index_to_entity.get(index) {
            self.entity_to_index.insert(moved, index);
        }
        Ok(removed)
    }

    /// Component held by `entity`, if any.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.entity_to_index.get(&entity).map(|&i| &self.data[i])
    }

    /// Mutable component held by `entity`, if any.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self.entity_to_index.get(&entity) {
            Some(&i) => Some(&mut self.data[i]),
            None => None,
        }
    }

    /// Whether `entity` holds a component here.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.entity_to_index.contains_key(&entity)
    }

    /// Number of stored components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// No components stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Entities holding this component, in storage order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.index_to_entity
    }
}

impl<T: Component> Default for ComponentArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a [`ComponentArray`].
pub trait ComponentStorage: Debug {
    /// Drop whatever `entity` held here; absent is fine.
    fn entity_destroyed(&mut self, entity: Entity);
    /// Upcast for downcasting back to the concrete array.
    fn as_any(&self) -> &dyn Any;
    /// Mutable upcast.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ComponentStorage for ComponentArray<T> {
    fn entity_destroyed(&mut self, entity: Entity) {
        if self.contains(entity) {
            let _ = self.remove(entity);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Maps component types to their dense ids and owns their storage.
///
/// One registry lives inside each [`World`](crate::ecs::World); there is no
/// process-wide table.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    type_ids: HashMap<TypeId, ComponentTypeId>,
    names: Vec<&'static str>,
    arrays: Vec<Box<dyn ComponentStorage>>,
}

impl ComponentRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`, allocating its id and storage.
    pub fn register<T: Component>(&mut self) -> Result<ComponentTypeId> {
        let key = TypeId::of::<T>();
        if self.type_ids.contains_key(&key) {
            return Err(GameError::DuplicateRegistration(format!(
                "component {}",
                short_type_name::<T>()
            )));
        }
        if self.arrays.len() >= MAX_COMPONENTS {
            return Err(GameError::CapacityExceeded {
                resource: "component types",
                limit: MAX_COMPONENTS,
            });
        }

        let id = ComponentTypeId(self.arrays.len() as u8);
        self.type_ids.insert(key, id);
        self.names.push(short_type_name::<T>());
        self.arrays.push(Box::new(ComponentArray::<T>::new()));
        Ok(id)
    }

    /// Id of `T`.
    pub fn component_id<T: Component>(&self) -> Result<ComponentTypeId> {
        self.type_ids
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(GameError::UnregisteredComponent(short_type_name::<T>()))
    }

    /// Whether `T` has been registered.
    #[must_use]
    pub fn is_registered<T: Component>(&self) -> bool {
        self.type_ids.contains_key(&TypeId::of::<T>())
    }

    /// Name of a registered type.
    #[must_use]
    pub fn name(&self, id: ComponentTypeId) -> Option<&'static str> {
        self.names.get(id.index()).copied()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// No types registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Storage for `T`.
    pub fn array<T: Component>(&self) -> Result<&ComponentArray<T>> {
        let id = self.component_id::<T>()?;
        self.arrays[id.index()]
            .as_any()
            .downcast_ref::<ComponentArray<T>>()
            .ok_or(GameError::UnregisteredComponent(short_type_name::<T>()))
    }

    /// Mutable storage for `T`.
    pub fn array_mut<T: Component>(&mut self) -> Result<&mut ComponentArray<T>> {
        let id = self.component_id::<T>()?;
        self.arrays[id.index()]
            .as_any_mut()
            .downcast_mut::<ComponentArray<T>>()
            .ok_or(GameError::UnregisteredComponent(short_type_name::<T>()))
    }

    /// Strip `entity` from every array.
    pub fn entity_destroyed(&mut self, entity: Entity) {
        for array in &mut self.arrays {
            array.entity_destroyed(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Marker(u32);
    impl Component for Marker {}

    #[derive(Debug)]
    struct Other;
    impl Component for Other {}

    fn e(id: u32) -> Entity {
        Entity::from_raw(id)
    }

    #[test]
    fn test_insert_and_get() {
        let mut array = ComponentArray::new();
        array.insert(e(3), Marker(30)).unwrap();
        assert_eq!(array.get(e(3)), Some(&Marker(30)));
        assert_eq!(array.get(e(4)), None);
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut array = ComponentArray::new();
        array.insert(e(1), Marker(1)).unwrap();
        assert!(matches!(
            array.insert(e(1), Marker(2)),
            Err(GameError::DuplicateComponent { .. })
        ));
    }

    #[test]
    fn test_swap_remove_keeps_maps_consistent() {
        let mut array = ComponentArray::new();
        for id in 0..4 {
            array.insert(e(id), Marker(id * 10)).unwrap();
        }

        assert_eq!(array.remove(e(1)).unwrap(), Marker(10));
        assert_eq!(array.len(), 3);
        // The last element moved into the hole
        assert_eq!(array.entities(), &[e(0), e(3), e(2)]);
        for id in [0, 2, 3] {
            assert_eq!(array.get(e(id)), Some(&Marker(id * 10)));
        }

        array.remove(e(2)).unwrap();
        array.remove(e(0)).unwrap();
        assert_eq!(array.get(e(3)), Some(&Marker(30)));
        assert!(matches!(
            array.remove(e(0)),
            Err(GameError::ComponentNotFound { .. })
        ));
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = ComponentRegistry::new();
        let first = registry.register::<Marker>().unwrap();
        let second = registry.register::<Other>().unwrap();
        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(registry.name(first), Some("Marker"));
        assert!(matches!(
            registry.register::<Marker>(),
            Err(GameError::DuplicateRegistration(_))
        ));
    }

    #[test]
    fn test_component_id_through_mutable_registry() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Other>().unwrap();
        let id = registry.register::<Marker>().unwrap();
        assert_eq!(registry.component_id::<Marker>().unwrap(), id);

        let array = registry.array_mut::<Marker>().unwrap();
        array.insert(e(2), Marker(2)).unwrap();
        assert_eq!(registry.array::<Marker>().unwrap().get(e(2)), Some(&Marker(2)));
    }

    #[test]
    fn test_unregistered_lookup() {
        let registry = ComponentRegistry::new();
        assert!(matches!(
            registry.array::<Marker>(),
            Err(GameError::UnregisteredComponent("Marker"))
        ));
    }

    #[test]
    fn test_entity_destroyed_clears_all_arrays() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Marker>().unwrap();
        registry.register::<Other>().unwrap();
        registry.array_mut::<Marker>().unwrap().insert(e(5), Marker(5)).unwrap();
        registry.array_mut::<Other>().unwrap().insert(e(5), Other).unwrap();

        registry.entity_destroyed(e(5));
        assert!(registry.array::<Marker>().unwrap().is_empty());
        assert!(registry.array::<Other>().unwrap().is_empty());
    }
}
