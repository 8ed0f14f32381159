//! Scale ladder, proxies, transforms and configuration through the public API

use approx::assert_relative_eq;
use origin_engine::config::ConfigFormat;
use origin_engine::prelude::*;
use origin_engine::scene::proxy_lod::is_clipped;

#[test]
fn test_ladder_properties() {
    let ladder = ScaleLadder::with_levels(8000.0, 5).unwrap();

    assert_eq!(ladder.scale_factor(0), 1.0);
    for level in 0..ladder.last_level() {
        assert!(ladder.scale_factor(level + 1) > ladder.scale_factor(level));
        assert_eq!(ladder.far_clip(level), Some(ladder.near_clip(level + 1)));
    }
    assert_eq!(ladder.far_clip(ladder.last_level()), None);
}

#[test]
fn test_proxy_clip_at_origin_and_beyond_far() {
    let ladder = ScaleLadder::with_levels(1000.0, 3).unwrap();

    assert!(!is_clipped(&ladder, 0, DVec3::ZERO, 1.0));
    assert!(is_clipped(&ladder, 1, DVec3::ZERO, 1.0));
    assert!(is_clipped(&ladder, 0, DVec3::new(0.0, 5000.0, 0.0), 1.0));
    assert!(!is_clipped(&ladder, 1, DVec3::new(0.0, 5000.0, 0.0), 1.0));
}

#[test]
fn test_proxy_follows_object_across_levels() {
    let mut registry = ProxyRegistry::new();
    let rock = registry.register_prefab("rock");
    let mut world = World::new();
    let entity = world.create_entity("rock");
    world
        .add_component(entity, DoubleTransform::from_position(DVec3::new(10.0, 0.0, 0.0)))
        .unwrap();
    world
        .add_component(entity, SpatialObject::new(2.0).with_prefab(rock, 1.0))
        .unwrap();
    let origin = OriginManager::new(ScaleLadder::with_levels(1000.0, 3).unwrap());
    let selector = ProxySelector::new();

    selector.update_all(&mut world, &origin, &mut registry).unwrap();
    assert_eq!(registry.proxies_on_level(0).count(), 1);
    assert_eq!(registry.proxies_on_level(1).count(), 0);

    world.set_world_position(entity, DVec3::new(50_000.0, 0.0, 0.0)).unwrap();
    let update = selector.update_all(&mut world, &origin, &mut registry).unwrap();

    assert_eq!(update.created, 1);
    assert_eq!(update.destroyed, 1);
    assert_eq!(registry.proxies_on_level(0).count(), 0);
    let instances = registry.instances(1);
    assert_eq!(instances.len(), 1);
    assert_relative_eq!(instances[0].position[0], 50.0);
    assert_relative_eq!(instances[0].scale, 0.002);
}

#[test]
fn test_world_round_trip_through_chain() {
    let mut world = World::new();
    let mut parent = None;
    let mut leaf = None;
    for depth in 0..6 {
        let entity = match parent {
            Some(parent) => world.create_child(format!("node{depth}"), parent).unwrap(),
            None => world.create_entity("node0"),
        };
        world
            .add_component(
                entity,
                DoubleTransform::new(
                    DVec3::new(depth as f64 * 1.0e9, 3.0, -2.0),
                    DQuat::from_axis_angle(DVec3::new(1.0, 1.0, 0.0).normalized(), 17.0 * depth as f64),
                ),
            )
            .unwrap();
        parent = Some(entity);
        leaf = Some(entity);
    }
    let leaf = leaf.unwrap();
    let position = DVec3::new(4.0e12, -7.5e11, 3.0e11);
    let rotation = DQuat::from_axis_angle(DVec3::FORWARD, 33.0);

    world.set_world_position(leaf, position).unwrap();
    world.set_world_rotation(leaf, rotation).unwrap();

    assert_relative_eq!(world.world_position(leaf).unwrap(), position, max_relative = 1e-9);
    assert_relative_eq!(world.world_rotation(leaf).unwrap(), rotation, epsilon = 1e-9);
}

#[test]
fn test_config_file_round_trip() {
    let config = SimulationConfig::solar_system();
    let dir = std::env::temp_dir();

    for (name, format) in [("origin_engine_scene.toml", ConfigFormat::Toml), ("origin_engine_scene.ron", ConfigFormat::Ron)] {
        let path = dir.join(name);
        config.save_to_file(&path).unwrap();
        assert_eq!(ConfigFormat::from_path(&path).unwrap(), format);

        let loaded = SimulationConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
        let scene = SpaceScene::from_config(&loaded, ProxyRegistry::new()).unwrap();
        assert_eq!(scene.world().len(), config.scene.bodies.len());
    }
}

#[test]
fn test_unsupported_extension() {
    let path = std::env::temp_dir().join("origin_engine_scene.json");

    assert!(matches!(
        SimulationConfig::solar_system().save_to_file(&path),
        Err(ConfigError::UnsupportedFormat(_))
    ));
}
