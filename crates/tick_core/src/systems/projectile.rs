//! Homing projectile flight and impact.

use crate::components::{DamageEvent, DamageReceiver, HomingProjectile, Transform};
use crate::ecs::{Entity, World};
use crate::error::Result;
use crate::math::Fixed;
use crate::signature::Signature;

use super::{ProjectileImpact, System, TickContext, UpdateContext};

/// Moves projectiles a fraction of the remaining way each tick and delivers
/// the payload when the countdown runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectileSystem;

impl System for ProjectileSystem {
    fn name(&self) -> &'static str {
        "projectile"
    }

    fn required_components(&self, world: &World) -> Result<Signature> {
        world.signature_for::<(HomingProjectile,)>()
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, entities: &[Entity]) -> Result<()> {
        for &entity in entities {
            let projectile = *ctx.world.get_component::<HomingProjectile>(entity)?;
            let target = projectile.target;

            let Some(target_centre) = ctx
                .world
                .try_get_component::<Transform>(target)
                .map(Transform::centre)
            else {
                tracing::debug!(%entity, %target, "Projectile target gone");
                ctx.world.destroy_entity(entity)?;
                continue;
            };

            let remaining = Fixed::from_num(projectile.ticks_until_impact.max(1));
            let step = (target_centre - projectile.position).scale(Fixed::ONE / remaining);
            let ticks_until_impact = projectile.ticks_until_impact.saturating_sub(1);

            if ticks_until_impact > 0 {
                let flying = ctx.world.get_component_mut::<HomingProjectile>(entity)?;
                flying.position = projectile.position + step;
                flying.ticks_until_impact = ticks_until_impact;
                continue;
            }

            if let Ok(receiver) = ctx.world.get_component_mut::<DamageReceiver>(target) {
                receiver.pending.push(DamageEvent {
                    source: projectile.source,
                    amount: projectile.damage,
                });
                ctx.events.impacts.push(ProjectileImpact {
                    source: projectile.source,
                    target,
                    damage: projectile.damage,
                });
                tracing::debug!(
                    tick = ctx.tick,
                    %target,
                    damage = projectile.damage,
                    "Projectile impact"
                );
            }
            ctx.world.destroy_entity(entity)?;
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>, entities: &[Entity]) -> Result<()> {
        for &entity in entities {
            let projectile = *ctx.world.get_component::<HomingProjectile>(entity)?;
            let Some(target_centre) = ctx
                .world
                .try_get_component::<Transform>(projectile.target)
                .map(Transform::render_centre)
            else {
                continue;
            };

            let flight_ticks = Fixed::from_num(projectile.ticks_until_impact.saturating_sub(1).max(1));
            let ratio = (ctx.delta_ticks / flight_ticks).min(Fixed::ONE);
            let offset = target_centre - projectile.render_position;

            let flying = ctx.world.get_component_mut::<HomingProjectile>(entity)?;
            flying.render_position = projectile.render_position + offset.scale(ratio);
        }
        Ok(())
    }
}
