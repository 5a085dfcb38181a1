//! Applies queued damage and ages hit splats.

use crate::components::{DamageReceiver, Health, HitSplat, HitSplats};
use crate::ecs::{Entity, World};
use crate::error::Result;
use crate::signature::Signature;

use super::{DamageApplied, System, TickContext};

/// Ticks a hit splat stays visible.
pub const HIT_SPLAT_TICKS: u32 = 2;

/// Consumes each entity's damage queue once per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct DamageReceiverSystem;

impl System for DamageReceiverSystem {
    fn name(&self) -> &'static str {
        "damage_receiver"
    }

    fn required_components(&self, world: &World) -> Result<Signature> {
        world.signature_for::<(Health, DamageReceiver, HitSplats)>()
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, entities: &[Entity]) -> Result<()> {
        for &entity in entities {
            let splats = ctx.world.get_component_mut::<HitSplats>(entity)?;
            for splat in &mut splats.splats {
                splat.ticks_left = splat.ticks_left.saturating_sub(1);
            }
            splats.splats.retain(|splat| splat.ticks_left > 0);

            let pending = std::mem::take(
                &mut ctx.world.get_component_mut::<DamageReceiver>(entity)?.pending,
            );
            if pending.is_empty() {
                continue;
            }

            let health = ctx.world.get_component_mut::<Health>(entity)?;
            let was_alive = !health.is_dead();
            for hit in &pending {
                health.current = health.current.saturating_sub(hit.amount);
            }
            let died = was_alive && health.is_dead();

            let splats = ctx.world.get_component_mut::<HitSplats>(entity)?;
            for hit in &pending {
                splats.splats.push(HitSplat {
                    damage: hit.amount,
                    ticks_left: HIT_SPLAT_TICKS,
                });
                ctx.events.damage.push(DamageApplied {
                    source: hit.source,
                    target: entity,
                    amount: hit.amount,
                });
            }

            if died {
                tracing::debug!(tick = ctx.tick, %entity, "Entity died");
                ctx.events.deaths.push(entity);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::DamageEvent;
    use crate::systems::test_support::Harness;

    fn target(harness: &mut Harness, health: u32) -> Entity {
        let entity = harness.world.create_entity().unwrap();
        harness.world.add_component(entity, Health::new(health)).unwrap();
        harness
            .world
            .add_component(entity, DamageReceiver::default())
            .unwrap();
        harness
            .world
            .add_component(entity, HitSplats::default())
            .unwrap();
        entity
    }

    fn hit(harness: &mut Harness, entity: Entity, amount: u32) {
        harness
            .world
            .get_component_mut::<DamageReceiver>(entity)
            .unwrap()
            .pending
            .push(DamageEvent {
                source: Entity::from_raw(99),
                amount,
            });
    }

    #[test]
    fn test_applies_and_clears_queue() {
        let mut harness = Harness::open(4, 4);
        let entity = target(&mut harness, 50);
        hit(&mut harness, entity, 12);
        hit(&mut harness, entity, 3);

        DamageReceiverSystem
            .tick(&mut harness.ctx(None), &[entity])
            .unwrap();

        assert_eq!(harness.world.get_component::<Health>(entity).unwrap().current, 35);
        assert!(harness
            .world
            .get_component::<DamageReceiver>(entity)
            .unwrap()
            .pending
            .is_empty());
        assert_eq!(harness.world.get_component::<HitSplats>(entity).unwrap().splats.len(), 2);
        assert_eq!(harness.events.damage.len(), 2);
        assert!(harness.events.deaths.is_empty());
    }

    #[test]
    fn test_health_floors_at_zero_and_reports_death_once() {
        let mut harness = Harness::open(4, 4);
        let entity = target(&mut harness, 10);
        hit(&mut harness, entity, 25);

        DamageReceiverSystem
            .tick(&mut harness.ctx(None), &[entity])
            .unwrap();
        assert_eq!(harness.world.get_component::<Health>(entity).unwrap().current, 0);
        assert_eq!(harness.events.deaths, vec![entity]);

        hit(&mut harness, entity, 5);
        DamageReceiverSystem
            .tick(&mut harness.ctx(None), &[entity])
            .unwrap();
        assert_eq!(harness.events.deaths.len(), 1);
    }

    #[test]
    fn test_hit_splats_expire() {
        let mut harness = Harness::open(4, 4);
        let entity = target(&mut harness, 50);
        hit(&mut harness, entity, 1);

        DamageReceiverSystem
            .tick(&mut harness.ctx(None), &[entity])
            .unwrap();
        DamageReceiverSystem
            .tick(&mut harness.ctx(None), &[entity])
            .unwrap();
        assert_eq!(harness.world.get_component::<HitSplats>(entity).unwrap().splats.len(), 1);

        DamageReceiverSystem
            .tick(&mut harness.ctx(None), &[entity])
            .unwrap();
        assert!(harness
            .world
            .get_component::<HitSplats>(entity)
            .unwrap()
            .splats
            .is_empty());
    }
}
