//! Protection prayers.

use crate::components::{Prayer, PrayerKind};
use crate::ecs::{Entity, World};
use crate::error::Result;

/// Switch `kind` off if it is on, otherwise make it the only active prayer.
///
/// Prayer points are not drained.
pub fn toggle_prayer(world: &mut World, entity: Entity, kind: PrayerKind) -> Result<()> {
    world.get_component_mut::<Prayer>(entity)?.toggle(kind);
    Ok(())
}
