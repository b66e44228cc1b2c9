// Island layout, spawn sampling and boat/island contact.

use rand::Rng;

use crate::domain::geometry::{contact, distance};
use crate::domain::state::{Island, Player};
use crate::domain::tuning::ArenaTuning;

/// Places a random number of non-overlapping islands.
///
/// Each island gets a bounded number of placement attempts; an island that cannot
/// be placed is skipped, so crowded layouts end up with fewer islands.
pub fn generate_islands<R: Rng>(rng: &mut R, arena: &ArenaTuning) -> Vec<Island> {
    let count = rng.gen_range(arena.island_count_min..=arena.island_count_max);
    let extent = arena.map_size * arena.island_spread;
    let mut islands: Vec<Island> = Vec::with_capacity(count as usize);

    for _ in 0..count {
        for _ in 0..arena.island_attempts {
            let candidate = Island {
                x: rng.gen_range(-extent..extent),
                z: rng.gen_range(-extent..extent),
                radius: rng.gen_range(arena.island_radius_min..arena.island_radius_max),
            };
            let clear = islands.iter().all(|i| {
                distance(candidate.x, candidate.z, i.x, i.z)
                    >= i.radius + candidate.radius + arena.island_separation
            });
            if clear {
                islands.push(candidate);
                break;
            }
        }
    }

    islands
}

/// Distance from a point to the nearest island shore; infinite without islands.
fn shore_clearance(islands: &[Island], x: f32, z: f32) -> f32 {
    islands
        .iter()
        .map(|i| distance(x, z, i.x, i.z) - i.radius)
        .fold(f32::INFINITY, f32::min)
}

/// Samples a point in open water at least `spawn_clearance` away from every shore.
///
/// After `spawn_attempts` misses the candidate with the most clearance is used.
pub fn sample_spawn<R: Rng>(rng: &mut R, islands: &[Island], arena: &ArenaTuning) -> (f32, f32) {
    let extent = arena.map_size * arena.spawn_spread;
    let mut best: Option<(f32, f32, f32)> = None;

    for _ in 0..arena.spawn_attempts {
        let x = rng.gen_range(-extent..extent);
        let z = rng.gen_range(-extent..extent);
        let clearance = shore_clearance(islands, x, z);
        if clearance >= arena.spawn_clearance {
            return (x, z);
        }
        if best.is_none_or(|(c, _, _)| clearance > c) {
            best = Some((clearance, x, z));
        }
    }

    best.map(|(_, x, z)| (x, z)).unwrap_or((0.0, 0.0))
}

/// Pushes a boat out of every island it overlaps and bounces it back.
///
/// Returns how many islands were touched; the caller applies the hull penalty.
pub fn collide_with_islands(
    p: &mut Player,
    islands: &[Island],
    boat_length: f32,
    arena: &ArenaTuning,
) -> u32 {
    let mut touched = 0;
    for island in islands {
        let min_distance = island.radius + boat_length / 2.0;
        let Some(c) = contact(p.x - island.x, p.z - island.z, min_distance) else {
            continue;
        };
        p.x = island.x + c.nx * min_distance;
        p.z = island.z + c.nz * min_distance;
        p.speed *= arena.island_bounce;
        touched += 1;
    }
    touched
}
