//! Run energy.

use crate::components::{Movement, Stamina};
use crate::ecs::{Entity, World};
use crate::error::Result;
use crate::signature::Signature;

use super::{System, TickContext};

/// Drains run energy while running along a path, regenerates otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaminaSystem;

impl System for StaminaSystem {
    fn name(&self) -> &'static str {
        "stamina"
    }

    fn required_components(&self, world: &World) -> Result<Signature> {
        world.signature_for::<(Stamina, Movement)>()
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, entities: &[Entity]) -> Result<()> {
        for &entity in entities {
            let moving = !ctx.world.get_component::<Movement>(entity)?.path.is_empty();
            let stamina = ctx.world.get_component_mut::<Stamina>(entity)?;

            if stamina.running && moving {
                stamina.current = stamina.current.saturating_sub(1);
                if stamina.current == 0 {
                    stamina.running = false;
                    let movement = ctx.world.get_component_mut::<Movement>(entity)?;
                    movement.current_speed = movement.base_speed;
                }
            } else {
                stamina.current = (stamina.current + stamina.regen_rate).min(stamina.max);
            }
        }
        Ok(())
    }
}

/// Flip run on or off. Returns whether the entity is now running.
///
/// Switching on with no energy left is refused and leaves run off.
pub fn toggle_run(world: &mut World, entity: Entity) -> Result<bool> {
    let stamina = world.get_component_mut::<Stamina>(entity)?;
    let running = if stamina.running {
        false
    } else if stamina.current == 0 {
        tracing::debug!(%entity, "Run refused: no energy");
        return Ok(false);
    } else {
        true
    };
    stamina.running = running;

    let movement = world.get_component_mut::<Movement>(entity)?;
    movement.current_speed = if running {
        movement.base_speed * 2
    } else {
        movement.base_speed
    };
    Ok(running)
}
