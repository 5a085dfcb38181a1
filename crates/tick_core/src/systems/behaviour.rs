//! Aggressive NPC behaviour.

use crate::components::{AttackCommand, SimpleBehaviour};
use crate::ecs::{Entity, World};
use crate::error::Result;
use crate::signature::Signature;

use super::{System, TickContext};

/// Points every aggressive entity at the player, once.
#[derive(Debug, Clone, Copy, Default)]
pub struct BehaviourSystem;

impl System for BehaviourSystem {
    fn name(&self) -> &'static str {
        "behaviour"
    }

    fn required_components(&self, world: &World) -> Result<Signature> {
        world.signature_for::<(SimpleBehaviour,)>()
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, entities: &[Entity]) -> Result<()> {
        // Nothing to aggro on yet; try again next tick
        let Some(player) = ctx.player else {
            return Ok(());
        };

        for &entity in entities {
            if ctx.world.has_component::<AttackCommand>(entity) {
                ctx.world.remove_component::<AttackCommand>(entity)?;
            }
            ctx.world
                .add_component(entity, AttackCommand { target: player })?;
            ctx.world.remove_component::<SimpleBehaviour>(entity)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::test_support::Harness;

    #[test]
    fn test_targets_player_once() {
        let mut harness = Harness::open(4, 4);
        let player = harness.world.create_entity().unwrap();
        let npc = harness.world.create_entity().unwrap();
        harness.world.add_component(npc, SimpleBehaviour).unwrap();

        BehaviourSystem
            .tick(&mut harness.ctx(Some(player)), &[npc])
            .unwrap();

        assert_eq!(
            harness.world.get_component::<AttackCommand>(npc).unwrap(),
            &AttackCommand { target: player }
        );
        assert!(!harness.world.has_component::<SimpleBehaviour>(npc));
    }

    #[test]
    fn test_waits_for_a_player() {
        let mut harness = Harness::open(4, 4);
        let npc = harness.world.create_entity().unwrap();
        harness.world.add_component(npc, SimpleBehaviour).unwrap();

        BehaviourSystem.tick(&mut harness.ctx(None), &[npc]).unwrap();

        assert!(harness.world.has_component::<SimpleBehaviour>(npc));
        assert!(!harness.world.has_component::<AttackCommand>(npc));
    }
}
