//! Path following and render interpolation.

use crate::components::{Movement, RenderStep, Transform, MAX_RENDER_STEPS};
use crate::ecs::{Entity, World};
use crate::error::Result;
use crate::math::Fixed;
use crate::signature::Signature;
use crate::tile_map::TileOccupancy;

use super::{System, TickContext, UpdateContext};

/// Walks queued paths on tick and eases render positions on update.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementSystem;

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn required_components(&self, world: &World) -> Result<Signature> {
        world.signature_for::<(Transform, Movement)>()
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>, entities: &[Entity]) -> Result<()> {
        for &entity in entities {
            move_now(ctx.world, ctx.occupancy, entity)?;
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>, entities: &[Entity]) -> Result<()> {
        for &entity in entities {
            let Some(step) = ctx
                .world
                .get_component::<Movement>(entity)?
                .render_queue
                .front()
                .copied()
            else {
                continue;
            };

            let ratio = if step.remaining_ticks > Fixed::ZERO {
                (ctx.delta_ticks / step.remaining_ticks).min(Fixed::ONE)
            } else {
                Fixed::ONE
            };

            let transform = ctx.world.get_component_mut::<Transform>(entity)?;
            let offset = step.target.to_vec() - transform.render_position;
            transform.render_position = transform.render_position + offset.scale(ratio);

            let movement = ctx.world.get_component_mut::<Movement>(entity)?;
            let remaining = (step.remaining_ticks - ctx.delta_ticks).max(Fixed::ZERO);
            if remaining == Fixed::ZERO {
                movement.render_queue.pop_front();
            } else if let Some(front) = movement.render_queue.front_mut() {
                front.remaining_ticks = remaining;
            }
        }
        Ok(())
    }
}

/// Take this tick's steps along the queued path right away.
///
/// Frees the old footprint, walks up to `current_speed` tiles, blocks the
/// new footprint and queues a render step. Does nothing when the path is
/// empty.
pub fn move_now(world: &mut World, occupancy: &mut TileOccupancy, entity: Entity) -> Result<()> {
    let movement = world.get_component_mut::<Movement>(entity)?;
    if movement.path.is_empty() {
        return Ok(());
    }

    let mut destination = None;
    for _ in 0..movement.current_speed {
        match movement.path.pop_front() {
            Some(tile) => destination = Some(tile),
            None => break,
        }
    }
    let Some(destination) = destination else {
        return Ok(());
    };

    if movement.render_queue.len() >= MAX_RENDER_STEPS {
        movement.render_queue.pop_front();
    }
    let remaining_ticks = movement.render_time_ticks;
    movement.render_queue.push_back(RenderStep {
        target: destination,
        remaining_ticks,
    });

    let transform = world.get_component_mut::<Transform>(entity)?;
    occupancy.unblock(&transform.all_tiles());
    transform.position = destination;
    occupancy.block(&transform.all_tiles());
    Ok(())
}
