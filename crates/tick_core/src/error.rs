//! Error types for the combat simulation.

use thiserror::Error;

use crate::components::EquipmentSlot;
use crate::data::ItemId;
use crate::ecs::Entity;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
///
/// Store and registry errors are programmer errors: they propagate out of
/// [`Engine::tick`](crate::engine::Engine::tick) rather than being swallowed.
/// Item and equipment errors come from player input and are logged by the
/// engine instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// A fixed-size pool (entities, component types, systems) is full.
    #[error("Capacity exceeded: {resource} limit is {limit}")]
    CapacityExceeded {
        /// What ran out.
        resource: &'static str,
        /// The configured maximum.
        limit: usize,
    },

    /// An id or index fell outside its valid space.
    #[error("{what} {index} is out of range (limit {limit})")]
    OutOfRange {
        /// What kind of value was out of range.
        what: &'static str,
        /// The offending value.
        index: u64,
        /// Exclusive upper bound.
        limit: u64,
    },

    /// A component type or system was registered twice.
    #[error("Duplicate registration: {0}")]
    DuplicateRegistration(String),

    /// The entity already holds a component of this type.
    #[error("{entity} already has a {component} component")]
    DuplicateComponent {
        /// Entity that was targeted.
        entity: Entity,
        /// Component type name.
        component: &'static str,
    },

    /// The entity does not hold a component of this type.
    #[error("{entity} has no {component} component")]
    ComponentNotFound {
        /// Entity that was targeted.
        entity: Entity,
        /// Component type name.
        component: &'static str,
    },

    /// A component type was used before being registered.
    #[error("Component type not registered: {0}")]
    UnregisteredComponent(&'static str),

    /// No catalog entry for this item.
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    /// The item exists but cannot be equipped.
    #[error("Item {0} is not equippable")]
    NotEquippable(ItemId),

    /// The wearer's levels are below the item's requirements.
    #[error("Requirements not met for item {0}")]
    RequirementsNotMet(ItemId),

    /// Not enough free inventory slots.
    #[error("Inventory full: need {needed} free slots, have {free}")]
    InventoryFull {
        /// Slots required.
        needed: usize,
        /// Slots available.
        free: usize,
    },

    /// The item entity is not held in the inventory.
    #[error("{item} is not in the inventory of {holder}")]
    ItemNotInInventory {
        /// Inventory owner.
        holder: Entity,
        /// Item entity.
        item: Entity,
    },

    /// Nothing is equipped in the slot.
    #[error("Equipment slot {0:?} is empty")]
    EmptyEquipmentSlot(EquipmentSlot),

    /// Data parsing error.
    #[error("Failed to parse {source_name}: {message}")]
    DataParseError {
        /// Name of the data source that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Invalid simulation state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

impl GameError {
    /// Shorthand for a missing component of type `T`.
    #[must_use]
    pub fn component_not_found<T: ?Sized>(entity: Entity) -> Self {
        Self::ComponentNotFound {
            entity,
            component: short_type_name::<T>(),
        }
    }
}

/// Last path segment of a type name, for readable error messages.
#[must_use]
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
