//! End-to-end combat scenarios driven through the engine.

use tick_core::components::{
    DamageReceiver, DefensiveStats, Health, HitSplats, Inventory, ItemDetails, Movement,
    OffensiveStats, PrayerKind, Transform,
};
use tick_core::data::{ItemId, MonsterKind, PlayerTemplate, WaveConfig, WaveTable};
use tick_core::ecs::Entity;
use tick_core::engine::Engine;
use tick_core::instance::WaveInstance;
use tick_core::line_of_sight::{has_line_of_sight, is_engageable};
use tick_core::math::TilePos;
use tick_core::pathfinding::find_tile_path;
use tick_core::rng::FixedRandom;
use tick_core::tile_map::TileOccupancy;
use tick_test_utils::fixtures::{open_map, walled_map};

fn always_hit_engine(cols: u32, rows: u32) -> Engine {
    Engine::new(open_map(cols, rows), Box::new(FixedRandom::always_hit())).unwrap()
}

/// A target that never moves or fights back.
fn dummy(engine: &mut Engine, at: TilePos, health: u32) -> Entity {
    let world = engine.world_mut();
    let entity = world.create_entity().unwrap();
    world.add_component(entity, Transform::single(at)).unwrap();
    world.add_component(entity, Health::new(health)).unwrap();
    world.add_component(entity, DamageReceiver::default()).unwrap();
    world.add_component(entity, HitSplats::default()).unwrap();
    world.add_component(entity, DefensiveStats::default()).unwrap();
    entity
}

// =========================================================================
// Grid queries
// =========================================================================

#[test]
fn test_straight_path_on_open_grid() {
    let map = open_map(10, 10);
    let occupancy = TileOccupancy::for_map(&map);
    let path = find_tile_path(&map, &occupancy, TilePos::new(0, 0), TilePos::new(3, 0));
    assert_eq!(
        path,
        vec![TilePos::new(1, 0), TilePos::new(2, 0), TilePos::new(3, 0)]
    );
}

#[test]
fn test_path_does_not_cut_blocked_corner() {
    // Walls on both orthogonal neighbours of the diagonal (0,0) -> (1,1)
    let map = walled_map(4, 4, &[TilePos::new(1, 0), TilePos::new(0, 1)]);
    let occupancy = TileOccupancy::for_map(&map);
    let path = find_tile_path(&map, &occupancy, TilePos::new(0, 0), TilePos::new(1, 1));
    assert!(path.is_empty());
}

#[test]
fn test_engageable_adjacent_but_not_two_away() {
    let map = open_map(10, 10);
    let target = Transform::single(TilePos::new(5, 5));
    let adjacent = Transform::single(TilePos::new(4, 4));
    let two_away = Transform::single(TilePos::new(3, 5));

    assert!(is_engageable(&adjacent, &target, 1, &map));
    assert!(!is_engageable(&two_away, &target, 1, &map));
}

#[test]
fn test_line_of_sight_blocked_by_single_wall() {
    let open = open_map(10, 10);
    assert!(has_line_of_sight(TilePos::new(1, 1), TilePos::new(8, 1), &open));

    let walled = walled_map(10, 10, &[TilePos::new(4, 1)]);
    assert!(!has_line_of_sight(TilePos::new(1, 1), TilePos::new(8, 1), &walled));
}

// =========================================================================
// Projectiles
// =========================================================================

#[test]
fn test_projectile_lands_on_third_tick() {
    let mut engine = always_hit_engine(20, 10);
    let player = engine
        .spawn_player(TilePos::new(1, 1), &PlayerTemplate::default())
        .unwrap();
    let bow = engine.give_player_item(ItemId::TWISTED_BOW).unwrap();
    let target = dummy(&mut engine, TilePos::new(8, 1), 50);

    engine.input_mut().queue_equip(bow);
    engine.input_mut().queue_attack(target);

    let fired = engine.tick().unwrap();
    assert_eq!(fired.projectiles_fired.len(), 1);
    assert!(fired.impacts.is_empty());

    for _ in 0..2 {
        let events = engine.tick().unwrap();
        assert!(events.impacts.is_empty());
        assert!(engine
            .world()
            .get_component::<DamageReceiver>(target)
            .unwrap()
            .pending
            .is_empty());
    }

    let landed = engine.tick().unwrap();
    assert_eq!(landed.impacts.len(), 1);
    assert_eq!(landed.impacts[0].source, player);
    assert_eq!(landed.impacts[0].target, target);
    assert!(!engine.world().is_alive(fired.projectiles_fired[0]));

    // Twisted bow at 99 ranged: max hit 14
    engine.tick().unwrap();
    assert_eq!(
        engine.world().get_component::<Health>(target).unwrap().current,
        36
    );
}

#[test]
fn test_attack_period_matches_weapon_speed() {
    let mut engine = always_hit_engine(20, 10);
    engine
        .spawn_player(TilePos::new(1, 1), &PlayerTemplate::default())
        .unwrap();
    let bow = engine.give_player_item(ItemId::TWISTED_BOW).unwrap();
    let target = dummy(&mut engine, TilePos::new(8, 1), 500);
    engine.input_mut().queue_equip(bow);
    engine.input_mut().queue_attack(target);

    let mut fired_on = Vec::new();
    for tick in 0..14 {
        if !engine.tick().unwrap().projectiles_fired.is_empty() {
            fired_on.push(tick);
        }
    }
    assert_eq!(fired_on, vec![0, 6, 12]);
}

#[test]
fn test_player_walks_into_range_before_attacking() {
    let mut engine = always_hit_engine(30, 5);
    let player = engine
        .spawn_player(TilePos::new(0, 0), &PlayerTemplate {
            running: false,
            ..PlayerTemplate::default()
        })
        .unwrap();
    let target = dummy(&mut engine, TilePos::new(5, 0), 50);
    engine.world_mut().get_component_mut::<OffensiveStats>(player).unwrap().attack_range = 2;
    engine.input_mut().queue_attack(target);

    let first = engine.tick().unwrap();
    assert!(first.projectiles_fired.is_empty());
    assert_eq!(
        engine.world().get_component::<Transform>(player).unwrap().position,
        TilePos::new(1, 0)
    );

    let mut fired = false;
    for _ in 0..3 {
        fired |= !engine.tick().unwrap().projectiles_fired.is_empty();
    }
    assert!(fired);
    assert_eq!(
        engine.world().get_component::<Transform>(player).unwrap().position,
        TilePos::new(3, 0)
    );
}

// =========================================================================
// Items
// =========================================================================

#[test]
fn test_potion_heals_and_leaves_next_dose() {
    let mut engine = always_hit_engine(10, 10);
    let player = engine
        .spawn_player(TilePos::new(1, 1), &PlayerTemplate::default())
        .unwrap();
    let potion = engine.give_player_item(ItemId::HEALTH_POTION_4).unwrap();
    engine.world_mut().get_component_mut::<Health>(player).unwrap().current = 50;

    engine.input_mut().queue_consume(potion, 0);
    engine.tick().unwrap();

    assert_eq!(
        engine.world().get_component::<Health>(player).unwrap().current,
        70
    );
    assert_eq!(
        engine.world().get_component::<ItemDetails>(potion).unwrap().item,
        ItemId::HEALTH_POTION_3
    );
    let snapshot = engine.combat_snapshot().unwrap();
    assert_eq!(snapshot.find_item(ItemId::HEALTH_POTION_3).map(|(slot, _)| slot), Some(0));
}

#[test]
fn test_drinking_last_dose_leaves_vial() {
    let mut engine = always_hit_engine(10, 10);
    let player = engine
        .spawn_player(TilePos::new(1, 1), &PlayerTemplate::default())
        .unwrap();
    let potion = engine.give_player_item(ItemId::HEALTH_POTION_1).unwrap();

    engine.input_mut().queue_consume(potion, 0);
    engine.tick().unwrap();

    // Already at full health: clamped
    assert_eq!(
        engine.world().get_component::<Health>(player).unwrap().current,
        99
    );
    assert_eq!(
        engine.world().get_component::<ItemDetails>(potion).unwrap().item,
        ItemId::EMPTY_VIAL
    );
    assert_eq!(
        engine.world().get_component::<Inventory>(player).unwrap().slot_of(potion),
        Some(0)
    );
}

#[test]
fn test_protection_prayer_blocks_monster() {
    let mut engine = always_hit_engine(20, 20);
    let player = engine
        .spawn_player(TilePos::new(1, 1), &PlayerTemplate::default())
        .unwrap();
    engine.spawn_monster(MonsterKind::Bat, TilePos::new(4, 1)).unwrap();
    engine.input_mut().queue_prayer_toggle(PrayerKind::ProtectRange);

    for _ in 0..20 {
        engine.tick().unwrap();
    }
    assert_eq!(
        engine.world().get_component::<Health>(player).unwrap().current,
        99
    );
}

// =========================================================================
// Waves
// =========================================================================

#[test]
fn test_wave_spawns_clears_and_completes() {
    let mut engine = always_hit_engine(20, 20);
    engine
        .spawn_player(TilePos::new(1, 1), &PlayerTemplate::default())
        .unwrap();
    engine.set_instance(WaveInstance::new(WaveConfig {
        cooldown_ticks: 2,
        spawn_points: vec![TilePos::new(15, 15)],
        waves: vec![WaveTable {
            spawns: vec![(MonsterKind::Bat, 1)],
        }],
    })
    .unwrap());

    assert_eq!(engine.tick().unwrap().wave_started, None);
    assert_eq!(engine.tick().unwrap().wave_started, Some(1));
    assert_eq!(engine.npcs().len(), 1);
    let bat = engine.npcs()[0];
    assert_eq!(
        engine.world().get_component::<Transform>(bat).unwrap().position,
        TilePos::new(15, 15)
    );

    engine.world_mut().get_component_mut::<Health>(bat).unwrap().current = 0;
    let removal = engine.tick().unwrap();
    assert!(!removal.instance_complete);
    assert!(engine.npcs().is_empty());

    assert!(engine.tick().unwrap().instance_complete);
    assert!(engine.instance().unwrap().is_complete());
}

#[test]
fn test_killing_blow_reports_death() {
    let mut engine = always_hit_engine(20, 10);
    engine
        .spawn_player(TilePos::new(1, 1), &PlayerTemplate::default())
        .unwrap();
    let bow = engine.give_player_item(ItemId::TWISTED_BOW).unwrap();
    let target = dummy(&mut engine, TilePos::new(8, 1), 10);
    engine.input_mut().queue_equip(bow);
    engine.input_mut().queue_attack(target);

    let mut deaths = Vec::new();
    for _ in 0..6 {
        deaths.extend(engine.tick().unwrap().deaths);
    }
    assert_eq!(deaths, vec![target]);
    assert_eq!(
        engine.world().get_component::<Health>(target).unwrap().current,
        0
    );
}

#[test]
fn test_movement_render_position_eases() {
    let mut engine = always_hit_engine(10, 10);
    let player = engine
        .spawn_player(TilePos::new(0, 0), &PlayerTemplate {
            running: false,
            ..PlayerTemplate::default()
        })
        .unwrap();
    engine.input_mut().queue_movement(TilePos::new(3, 0));
    engine.tick().unwrap();
    assert!(!engine
        .world()
        .get_component::<Movement>(player)
        .unwrap()
        .render_queue
        .is_empty());

    engine.update(tick_core::math::Fixed::from_num(600)).unwrap();
    let transform = engine.world().get_component::<Transform>(player).unwrap();
    assert_eq!(transform.render_position, TilePos::new(1, 0).to_vec());
}
