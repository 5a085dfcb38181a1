//! Entity/component store and system membership.
//!
//! - [`entity`] - id allocation and signatures
//! - [`component`] - dense per-type arrays and the type registry
//! - [`system`] - required signatures and member sets
//! - [`world`] - the coordinator tying the three together

pub mod component;
pub mod entity;
pub mod system;
pub mod world;

pub use component::{Component, ComponentArray, ComponentRegistry, ComponentTypeId};
pub use entity::{Entity, EntityManager, MAX_ENTITIES};
pub use system::{SystemId, SystemRegistry, MAX_SYSTEMS};
pub use world::{ComponentSet, World};
