//! Attack cooldown decay.

use crate::components::OffensiveStats;
use crate::ecs::{Entity, World};
use crate::error::Result;
use crate::signature::Signature;

use super::{System, TickContext};

/// Counts every attacker's cooldown down toward zero, whether or not it is
/// currently attacking.
#[derive(Debug, Clone, Copy, Default)]
pub struct CooldownSystem;

impl System for CooldownSystem {
    fn name(&self) -> &'static str {
        "cooldown"
    }

    fn required_components(&self, world: &World) -> Result<Signature> {
        world.signature_for::<(OffensiveStats,)>()
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, entities: &[Entity]) -> Result<()> {
        for &entity in entities {
            let stats = ctx.world.get_component_mut::<OffensiveStats>(entity)?;
            stats.ticks_until_can_attack = stats.ticks_until_can_attack.saturating_sub(1);
        }
        Ok(())
    }
}
