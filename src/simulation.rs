// --- File: simulation.rs ---
use crate::boid::{Boid, DeathCause, Species};
use crate::channel::Kinematics;
use crate::config::SimulationConfig;
use crate::constants::CHANNEL_COUNT;
use crate::error::SimulationError;
use crate::evolution::{breed, gene_pool};
use crate::polygon::VisionPolygon;
use crate::torus::{EdgeBuffer, World};
use glam::DVec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

pub type SimRng = StdRng;

// --- Per-Tick Notifications ---

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathEvent {
    pub slot: usize,
    pub species: Species,
    pub position: DVec2,
    pub cause: DeathCause,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub deaths: Vec<DeathEvent>,
    pub births: Vec<usize>,   // Slots refilled with offspring
    pub extinct: Vec<usize>,  // Slots left empty for good this tick
    pub prey_alive: usize,
    pub predators_alive: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationStats {
    pub ticks: u64,
    pub prey_deaths: u64,
    pub predator_deaths: u64,
    pub extinctions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoidView {
    pub slot: usize,
    pub species: Species,
    pub position: DVec2, // Where an empty slot's last occupant died
    pub heading: f64,
    pub speed: f64,
    pub age: u64,
    pub alive: bool,
}

// --- Simulation ---

pub struct Simulation {
    config: SimulationConfig,
    world: World,
    edges: EdgeBuffer,
    slots: Vec<Option<Boid>>,
    layout: Vec<Species>,   // Species each slot is bred for
    remains: Vec<DVec2>,    // Last known position per slot
    rng: SimRng,
    tick_count: u64,
    stats: PopulationStats,
    // Buffers reused every tick
    kinematics_buffer: Vec<Kinematics>,
    claims_buffer: Vec<(usize, usize)>, // (prey slot, predator slot)
}

impl Simulation {
    // Fresh world with `population_per_species` of each species, interleaved: even slots
    // hold prey, odd slots predators.
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self, SimulationError> {
        config.validate()?;
        let mut rng = SimRng::seed_from_u64(seed);
        let slot_count = config.population_per_species * 2;
        let mut slots = Vec::with_capacity(slot_count);
        for slot in 0..slot_count {
            let species = default_species(slot);
            slots.push(Some(Boid::spawn(slot, species, &config, &mut rng)));
        }
        log::info!(
            "Created {}x{} world with {} prey and {} predators (seed {})",
            config.world_width,
            config.world_height,
            config.population_per_species,
            config.population_per_species,
            seed
        );
        Ok(Self::assemble(config, slots, rng))
    }

    // World built from hand-placed boids. Each boid lands in the slot named by its id;
    // ids missing from `boids` leave their slot empty.
    pub fn from_boids(
        config: SimulationConfig,
        boids: Vec<Boid>,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let len = boids.iter().map(|b| b.id() + 1).max().unwrap_or(0);
        let mut slots: Vec<Option<Boid>> = vec![None; len];
        for boid in boids {
            let slot = boid.id();
            if slots[slot].is_some() {
                return Err(SimulationError::InvalidConfig(format!(
                    "two boids claim slot {slot}"
                )));
            }
            slots[slot] = Some(boid);
        }
        Ok(Self::assemble(config, slots, SimRng::seed_from_u64(seed)))
    }

    fn assemble(config: SimulationConfig, slots: Vec<Option<Boid>>, rng: SimRng) -> Self {
        let world = config.world();
        let layout = slots
            .iter()
            .enumerate()
            .map(|(slot, b)| b.as_ref().map_or(default_species(slot), Boid::species))
            .collect();
        let remains = slots
            .iter()
            .map(|b| b.as_ref().map_or(DVec2::ZERO, Boid::position))
            .collect();
        let capacity = slots.len();
        Self {
            edges: EdgeBuffer::new(&world),
            world,
            config,
            slots,
            layout,
            remains,
            rng,
            tick_count: 0,
            stats: PopulationStats::default(),
            kinematics_buffer: Vec::with_capacity(capacity),
            claims_buffer: Vec::new(),
        }
    }

    // --- Tick ---

    pub fn tick(&mut self) -> TickReport {
        self.tick_count += 1;
        self.perceive();
        self.resolve_feeding();
        self.steer_all();
        let report = self.finish_tick();
        log::trace!(
            "Tick {}: {} prey, {} predators, {} deaths",
            report.tick,
            report.prey_alive,
            report.predators_alive,
            report.deaths.len()
        );
        report
    }

    /// Ticks until `stop` is set, calling `on_tick` after each one. The flag is only read
    /// between ticks. Returns how many ticks ran.
    pub fn run_until<F>(&mut self, stop: &AtomicBool, mut on_tick: F) -> u64
    where
        F: FnMut(&TickReport, &Simulation),
    {
        let mut ran = 0;
        while !stop.load(Ordering::Relaxed) {
            let report = self.tick();
            ran += 1;
            on_tick(&report, self);
        }
        ran
    }

    // --- Perception ---

    fn perceive(&mut self) {
        let slots = &self.slots;
        let edges = &self.edges;
        let found: Vec<Option<[Vec<usize>; CHANNEL_COUNT]>> = if self.config.parallel_perception {
            (0..slots.len())
                .into_par_iter()
                .map(|observer| scan(slots, edges, observer))
                .collect()
        } else {
            (0..slots.len())
                .map(|observer| scan(slots, edges, observer))
                .collect()
        };

        for (entry, detections) in self.slots.iter_mut().zip(found) {
            let (Some(boid), Some(detections)) = (entry.as_mut(), detections) else {
                continue;
            };
            for (index, detected) in detections.into_iter().enumerate() {
                boid.channel_mut(index).set_detected(detected);
            }
        }
    }

    // --- Feeding ---

    fn resolve_feeding(&mut self) {
        let mouth = self.config.mouth_radius;
        self.claims_buffer.clear();
        for (slot, entry) in self.slots.iter().enumerate() {
            let Some(predator) = entry else { continue };
            if !predator.ready_to_feed() {
                continue;
            }
            for candidate in predator.feeding_candidates() {
                let Some(prey) = &self.slots[candidate] else { continue };
                let reachable = predator.mouth_reaches(prey.positions(), mouth);
                if prey.species() == Species::Prey && reachable {
                    self.claims_buffer.push((candidate, slot));
                }
            }
        }
        for &(prey, predator) in &self.claims_buffer {
            if let Some(boid) = self.slots[prey].as_mut() {
                boid.register_claim(predator);
            }
        }
    }

    // --- Movement ---

    fn steer_all(&mut self) {
        // Everyone steers against where the others stood before anyone moved.
        self.kinematics_buffer.clear();
        self.kinematics_buffer.extend(
            self.slots
                .iter()
                .map(|b| b.as_ref().map(Boid::kinematics).unwrap_or_default()),
        );
        for boid in self.slots.iter_mut().flatten() {
            boid.steer(&self.kinematics_buffer, &self.world);
        }
    }

    // --- Bookkeeping & Breeding ---

    fn finish_tick(&mut self) -> TickReport {
        let mut report = TickReport {
            tick: self.tick_count,
            ..TickReport::default()
        };

        // Aging, metabolism and digestion.
        for (slot, entry) in self.slots.iter_mut().enumerate() {
            let Some(boid) = entry.as_mut() else { continue };
            if let Some(cause) = boid.end_tick() {
                report.deaths.push(DeathEvent {
                    slot,
                    species: boid.species(),
                    position: boid.position(),
                    cause,
                });
            }
        }

        // Claims: the first predator to reach a prey eats it.
        let mut meals = Vec::new();
        for (slot, entry) in self.slots.iter_mut().enumerate() {
            let Some(boid) = entry.as_mut() else { continue };
            if let Some(&predator) = boid.take_claims().first() {
                report.deaths.push(DeathEvent {
                    slot,
                    species: boid.species(),
                    position: boid.position(),
                    cause: DeathCause::Eaten { predator },
                });
                meals.push(predator);
            }
        }
        for predator in meals {
            if report.deaths.iter().any(|d| d.slot == predator) {
                continue; // Starved this tick
            }
            if let Some(boid) = self.slots[predator].as_mut() {
                boid.feed(self.config.feeding_reward, self.config.digestion_cooldown);
            }
        }

        for death in &report.deaths {
            log::debug!(
                "{:?} in slot {} died at ({:.1}, {:.1}): {:?}",
                death.species,
                death.slot,
                death.position.x,
                death.position.y,
                death.cause
            );
            match death.species {
                Species::Prey => self.stats.prey_deaths += 1,
                Species::Predator => self.stats.predator_deaths += 1,
            }
            self.remains[death.slot] = death.position;
        }

        // Every offspring is bred from the survivors before any slot is overwritten.
        let dead: Vec<usize> = report.deaths.iter().map(|d| d.slot).collect();
        let mut offspring = Vec::with_capacity(dead.len());
        for &slot in &dead {
            let species = self.layout[slot];
            let pool = gene_pool(&self.slots, species, &dead);
            offspring.push((slot, breed(slot, species, &pool, &self.config, &mut self.rng)));
        }
        for (slot, result) in offspring {
            match result {
                Ok(child) => {
                    self.remains[slot] = child.position();
                    self.slots[slot] = Some(child);
                    report.births.push(slot);
                }
                Err(e) => {
                    log::warn!("{e}; slot {slot} stays empty");
                    self.slots[slot] = None;
                    self.stats.extinctions += 1;
                    report.extinct.push(slot);
                }
            }
        }

        let (prey_alive, predators_alive) = self.counts();
        report.prey_alive = prey_alive;
        report.predators_alive = predators_alive;
        self.stats.ticks = self.tick_count;
        report
    }

    // --- Queries ---

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn slots(&self) -> &[Option<Boid>] {
        &self.slots
    }

    pub fn boid(&self, slot: usize) -> Result<Option<&Boid>, SimulationError> {
        self.slots
            .get(slot)
            .map(Option::as_ref)
            .ok_or(SimulationError::SlotOutOfRange {
                slot,
                len: self.slots.len(),
            })
    }

    pub fn channel_polygon(&self, slot: usize, channel: usize) -> Option<&VisionPolygon> {
        self.slots.get(slot)?.as_ref()?.channel_polygon(channel)
    }

    pub fn view(&self) -> Vec<BoidView> {
        self.slots
            .iter()
            .enumerate()
            .map(|(slot, entry)| match entry {
                Some(boid) => BoidView {
                    slot,
                    species: boid.species(),
                    position: boid.position(),
                    heading: boid.heading(),
                    speed: boid.speed(),
                    age: boid.age(),
                    alive: true,
                },
                None => BoidView {
                    slot,
                    species: self.layout[slot],
                    position: self.remains[slot],
                    heading: 0.0,
                    speed: 0.0,
                    age: 0,
                    alive: false,
                },
            })
            .collect()
    }

    // Living (prey, predators).
    pub fn counts(&self) -> (usize, usize) {
        self.slots
            .iter()
            .flatten()
            .fold((0, 0), |(prey, predators), boid| match boid.species() {
                Species::Prey => (prey + 1, predators),
                Species::Predator => (prey, predators + 1),
            })
    }

    pub fn stats(&self) -> PopulationStats {
        self.stats
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

#[inline]
fn default_species(slot: usize) -> Species {
    if slot % 2 == 0 {
        Species::Prey
    } else {
        Species::Predator
    }
}

// Everything `observer` sees this tick, per channel. A target is listed at most once per
// channel however many of its mirrors fall inside.
fn scan(
    slots: &[Option<Boid>],
    edges: &EdgeBuffer,
    observer: usize,
) -> Option<[Vec<usize>; CHANNEL_COUNT]> {
    let boid = slots[observer].as_ref()?;
    let zones = edges.zones(boid.position());
    let mut found: [Vec<usize>; CHANNEL_COUNT] = Default::default();
    for (other, target) in slots.iter().enumerate() {
        if other == observer {
            continue;
        }
        let Some(target) = target else { continue };
        let positions = target.positions();
        for (index, channel) in boid.channels().iter().enumerate() {
            if Species::perceived_by(index) != target.species() {
                continue;
            }
            let polygon = channel.polygon();
            if zones.admitted().any(|p| polygon.contains(positions[p])) {
                found[index].push(other);
            }
        }
    }
    Some(found)
}

// --- End of File: simulation.rs ---
