//! Deterministic world setup shared by the benchmarks.

use packed_ecs::ecs::{Entity, World};
use rand::{SeedableRng, seq::index};
use rand_chacha::ChaCha8Rng;

use crate::components::{Enemy, Health, Position, Rotation, Transform, Velocity};

/// Seed for every random choice, so runs are comparable.
pub const SEED: u64 = 0x5eed_ec5;

/// A world of `count` entities, each with a position and velocity. Every fourth entity is also
/// an enemy with health.
pub fn moving_world(count: usize) -> (World, Vec<Entity>) {
    let mut world = World::new();
    let entities = (0..count)
        .map(|i| {
            let entity = world.create_entity();
            world
                .add_components(
                    entity,
                    (
                        Position {
                            x: i as f32,
                            ..Default::default()
                        },
                        Velocity {
                            x: 1.0,
                            ..Default::default()
                        },
                    ),
                )
                .expect("fresh entity");
            if i % 4 == 0 {
                world
                    .add_components(
                        entity,
                        (
                            Enemy,
                            Health {
                                current: 100.0,
                                max: 100.0,
                            },
                        ),
                    )
                    .expect("fresh entity");
            }
            entity
        })
        .collect();
    (world, entities)
}

/// A world of `count` entities each carrying four components.
pub fn wide_world(count: usize) -> World {
    let mut world = World::new();
    for _ in 0..count {
        let entity = world.create_entity();
        world
            .add_components(
                entity,
                (
                    Transform::default(),
                    Position::default(),
                    Rotation::default(),
                    Velocity::default(),
                ),
            )
            .expect("fresh entity");
    }
    world
}

/// Pick `amount` distinct entities, the same ones on every run.
pub fn pick(entities: &[Entity], amount: usize) -> Vec<Entity> {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    index::sample(&mut rng, entities.len(), amount.min(entities.len()))
        .into_iter()
        .map(|i| entities[i])
        .collect()
}
