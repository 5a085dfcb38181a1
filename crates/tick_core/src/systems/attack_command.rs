//! The attack-command state machine.
//!
//! An entity holding an [`AttackCommand`] is either pursuing its target
//! (out of range or sight) or engaging it. Each tick it:
//!
//! 1. drops the command if the target is dead or gone,
//! 2. clears any queued walk,
//! 3. checks engageability from where it stands,
//! 4. if not engageable, steps toward the target immediately and, when its
//!    cooldown has already elapsed, checks again from the new position,
//! 5. attacks when engageable with the cooldown elapsed, then restarts the
//!    cooldown.

use crate::combat::{resolve_damage, AttackContext, AttackStyle};
use crate::components::{
    AttackCommand, DamageEvent, DamageReceiver, DefensiveStats, Health, HomingProjectile,
    Movement, OffensiveStats, Pathing, Prayer, Transform,
};
use crate::ecs::{Entity, World};
use crate::error::{GameError, Result};
use crate::line_of_sight::is_engageable;
use crate::signature::Signature;

use super::movement::move_now;
use super::{DamageApplied, System, TickContext};

/// Drives pursuit and firing for every entity with an attack command.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttackCommandSystem;

impl System for AttackCommandSystem {
    fn name(&self) -> &'static str {
        "attack_command"
    }

    fn required_components(&self, world: &World) -> Result<Signature> {
        world.signature_for::<(AttackCommand, Transform, Movement, OffensiveStats, Pathing)>()
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, entities: &[Entity]) -> Result<()> {
        for &entity in entities {
            let target = ctx.world.get_component::<AttackCommand>(entity)?.target;

            let target_alive = ctx
                .world
                .try_get_component::<Health>(target)
                .is_some_and(|health| !health.is_dead());
            let Some(target_transform) = ctx
                .world
                .try_get_component::<Transform>(target)
                .copied()
                .filter(|_| target_alive)
            else {
                ctx.world.remove_component::<AttackCommand>(entity)?;
                continue;
            };

            ctx.world.get_component_mut::<Movement>(entity)?.path.clear();

            let range = ctx.world.get_component::<OffensiveStats>(entity)?.attack_range;
            let transform = *ctx.world.get_component::<Transform>(entity)?;
            let mut engageable = is_engageable(&transform, &target_transform, range, ctx.map);

            if !engageable {
                let strategy = ctx.world.get_component::<Pathing>(entity)?.strategy;
                let path =
                    strategy.compute_path(&transform, &target_transform, ctx.map, ctx.occupancy);
                ctx.world.get_component_mut::<Movement>(entity)?.set_path(path);
                move_now(ctx.world, ctx.occupancy, entity)?;
                // The chase is re-planned every tick
                ctx.world.get_component_mut::<Movement>(entity)?.path.clear();

                if ctx
                    .world
                    .get_component::<OffensiveStats>(entity)?
                    .ticks_until_can_attack
                    > 0
                {
                    continue;
                }
                let moved = *ctx.world.get_component::<Transform>(entity)?;
                engageable = is_engageable(&moved, &target_transform, range, ctx.map);
            }

            let stats = ctx.world.get_component::<OffensiveStats>(entity)?;
            if engageable && stats.ticks_until_can_attack == 0 {
                create_attack(ctx, entity, target)?;
                let stats = ctx.world.get_component_mut::<OffensiveStats>(entity)?;
                stats.ticks_until_can_attack += stats.attack_cooldown;
            }
        }
        Ok(())
    }
}

/// Roll one attack from `attacker` on `target` and send it on its way.
///
/// Melee damage goes straight onto the target's receiver. Ranged and magic
/// damage is rolled now and carried by a new [`HomingProjectile`] that
/// starts at the attacker's centre.
pub fn create_attack(ctx: &mut TickContext<'_>, attacker: Entity, target: Entity) -> Result<()> {
    let offense = ctx.world.get_component::<OffensiveStats>(attacker)?;
    let defense = ctx.world.get_component::<DefensiveStats>(target)?;
    let style = offense.attack_style;
    let sub_type = style.sub_type();

    let damage = resolve_damage(
        ctx.rng,
        &AttackContext {
            offense,
            defense,
            attack_sub_type: sub_type,
            defence_sub_type: sub_type,
            defender_prayer: ctx.world.try_get_component::<Prayer>(target),
        },
    );

    match style {
        AttackStyle::Melee(_) => {
            ctx.world
                .get_component_mut::<DamageReceiver>(target)?
                .pending
                .push(DamageEvent {
                    source: attacker,
                    amount: damage,
                });
            ctx.events.melee_hits.push(DamageApplied {
                source: attacker,
                target,
                amount: damage,
            });
        }
        AttackStyle::Ranged { projectile_ticks } | AttackStyle::Magic { projectile_ticks } => {
            if projectile_ticks == 0 {
                return Err(GameError::InvalidState(format!(
                    "{attacker} fires projectiles with no flight time"
                )));
            }
            let start = ctx.world.get_component::<Transform>(attacker)?.centre();
            let projectile = ctx.world.create_entity()?;
            ctx.world.add_component(
                projectile,
                HomingProjectile {
                    source: attacker,
                    target,
                    ticks_until_impact: projectile_ticks,
                    damage,
                    position: start,
                    render_position: start,
                },
            )?;
            ctx.events.projectiles_fired.push(projectile);
        }
    }
    Ok(())
}
