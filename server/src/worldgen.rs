//! Random placement of static scenery at server start.
//!
//! The generated [`WorldConfig`] is the one immutable input to everything
//! else: the simulation reads it every tick and every client receives it
//! verbatim at connect. Passing the same seed reproduces the same world.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{BoundingBox, ObjectKind, Vec2, WorldConfig, WorldObject};
use std::f32::consts::PI;

const TREE_COUNT: usize = 50;
const HOUSE_COUNT: usize = 6;
const GRASS_COUNT: usize = 80;
const PLANT_COUNT: usize = 40;
const MUSHROOM_COUNT: usize = 25;

/// Scenery keeps this far from the world edge so bounding boxes never
/// straddle the wrap seam.
const EDGE_MARGIN: f32 = 10.0;
/// No collidable scenery inside this square around the spawn point. Wide
/// enough that even a rotated house corner cannot reach the origin.
const SPAWN_CLEARING: f32 = 12.0;

/// Builds the world: collidable trees and houses, decorative grass, plants
/// and mushrooms, scattered uniformly with a clearing at the origin.
pub fn generate(seed: Option<u64>) -> WorldConfig {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut world = WorldConfig::empty();

    for _ in 0..TREE_COUNT {
        let position = scatter(&mut rng, world.width, true);
        world.collidable_objects.push(WorldObject {
            kind: ObjectKind::Tree,
            x: position.x,
            z: position.z,
            rotation: rng.gen_range(0.0..PI),
            bbox: BoundingBox::centered(1.2, 1.2),
        });
    }

    for _ in 0..HOUSE_COUNT {
        let position = scatter(&mut rng, world.width, true);
        world.collidable_objects.push(WorldObject {
            kind: ObjectKind::House,
            x: position.x,
            z: position.z,
            rotation: rng.gen_range(0.0..PI),
            bbox: BoundingBox::centered(5.0, 4.0),
        });
    }

    let decoration = [
        (ObjectKind::Grass, GRASS_COUNT),
        (ObjectKind::Plant, PLANT_COUNT),
        (ObjectKind::Mushroom, MUSHROOM_COUNT),
    ];
    for (kind, count) in decoration {
        for _ in 0..count {
            let position = scatter(&mut rng, world.width, false);
            world.noncollidable_objects.push(WorldObject {
                kind,
                x: position.x,
                z: position.z,
                rotation: rng.gen_range(0.0..PI),
                bbox: BoundingBox::centered(0.5, 0.5),
            });
        }
    }

    world
}

/// Picks a uniform position inside the playable area. Collidable scenery is
/// re-rolled until it lands outside the spawn clearing.
fn scatter(rng: &mut StdRng, half_extent: f32, keep_spawn_clear: bool) -> Vec2 {
    let range = half_extent - EDGE_MARGIN;
    loop {
        let position = Vec2::new(
            rng.gen_range(-range..range),
            rng.gen_range(-range..range),
        );
        if keep_spawn_clear
            && position.x.abs() < SPAWN_CLEARING
            && position.z.abs() < SPAWN_CLEARING
        {
            continue;
        }
        return position;
    }
}
