// --- File: evolution.rs ---
use crate::boid::{Boid, BoidGenome, Species};
use crate::channel::ChannelGenome;
use crate::config::SimulationConfig;
use crate::constants::VERTEX_COUNT;
use crate::error::SimulationError;
use crate::utils::RandomSource;

// Living boids of `species`, oldest first, leaving out every slot in `excluded`.
// Equal ages keep slot order.
pub fn gene_pool<'a>(
    slots: &'a [Option<Boid>],
    species: Species,
    excluded: &[usize],
) -> Vec<&'a Boid> {
    let mut pool: Vec<&Boid> = slots
        .iter()
        .enumerate()
        .filter(|(slot, _)| !excluded.contains(slot))
        .filter_map(|(_, boid)| boid.as_ref())
        .filter(|boid| boid.species() == species)
        .collect();
    pool.sort_by(|a, b| b.age().cmp(&a.age()));
    pool
}

/// Index into an age-sorted pool of `pool_len`: `(random · ∛n)³`, floored and clamped.
/// Favours the front of the pool, the oldest boids.
pub fn select_parent_index<R: RandomSource + ?Sized>(pool_len: usize, rng: &mut R) -> usize {
    debug_assert!(pool_len > 0);
    let root = rng.next_f64() * (pool_len as f64).cbrt();
    let cubed = root * root * root;
    (cubed as usize).min(pool_len.saturating_sub(1))
}

#[inline]
fn inherit<T, R: RandomSource + ?Sized>(rng: &mut R, first: T, second: T) -> T {
    if rng.next_f64() < 0.5 { first } else { second }
}

// Uniform crossover: every scalar gene and every vertex comes from one parent or the
// other on an independent coin flip. No mutation.
pub fn crossover<R: RandomSource + ?Sized>(
    first: &BoidGenome,
    second: &BoidGenome,
    rng: &mut R,
) -> BoidGenome {
    let direction_momentum = inherit(rng, first.direction_momentum, second.direction_momentum);
    let speed_inertia = inherit(rng, first.speed_inertia, second.speed_inertia);
    let mut channels = first.channels;
    for (child, (a, b)) in channels
        .iter_mut()
        .zip(first.channels.iter().zip(second.channels.iter()))
    {
        *child = crossover_channel(a, b, rng);
    }
    BoidGenome {
        direction_momentum,
        speed_inertia,
        channels,
    }
}

fn crossover_channel<R: RandomSource + ?Sized>(
    a: &ChannelGenome,
    b: &ChannelGenome,
    rng: &mut R,
) -> ChannelGenome {
    let relative_angle = inherit(rng, a.relative_angle, b.relative_angle);
    let reaction_weight = inherit(rng, a.reaction_weight, b.reaction_weight);
    let reaction_speed = inherit(rng, a.reaction_speed, b.reaction_speed);
    let vector_relative_angle = inherit(rng, a.vector_relative_angle, b.vector_relative_angle);
    let vector_reaction_weight = inherit(rng, a.vector_reaction_weight, b.vector_reaction_weight);
    let vector_reaction_speed = inherit(rng, a.vector_reaction_speed, b.vector_reaction_speed);
    let distance_importance = inherit(rng, a.distance_importance, b.distance_importance);
    let mut vertices = a.vertices;
    for i in 0..VERTEX_COUNT {
        vertices[i] = inherit(rng, a.vertices[i], b.vertices[i]);
    }
    ChannelGenome {
        vertices,
        reaction_speed,
        reaction_weight,
        distance_importance,
        relative_angle,
        vector_reaction_speed,
        vector_reaction_weight,
        vector_relative_angle,
    }
}

// Two parents are drawn independently and may be the same boid. The offspring keeps
// the slot's id and starts at a fresh random pose, exactly as at world creation.
pub fn breed<R: RandomSource + ?Sized>(
    slot: usize,
    species: Species,
    pool: &[&Boid],
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<Boid, SimulationError> {
    if pool.is_empty() {
        return Err(SimulationError::EmptyGenePool { species });
    }
    log::debug!(
        "Breeding {:?} for slot {}: pool of {}, ages {:?}",
        species,
        slot,
        pool.len(),
        pool.iter().map(|b| b.age()).collect::<Vec<_>>()
    );

    let first = pool[select_parent_index(pool.len(), rng)];
    let second = pool[select_parent_index(pool.len(), rng)];
    let genome = crossover(&first.genome(), &second.genome(), rng);
    Ok(Boid::born(slot, species, genome, config, rng))
}

// --- End of File: evolution.rs ---
