use crate::angle::{bearing_of, normalize, unit};
use crate::channel::{ChannelGenome, Kinematics, PerceptionChannel};
use crate::config::SimulationConfig;
use crate::constants::*;
use crate::polygon::{Pose, VisionPolygon};
use crate::torus::World;
use crate::utils::RandomSource;
use glam::DVec2;
use std::f64::consts::{PI, TAU};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Species {
    Prey,
    Predator,
}

impl Species {
    #[inline]
    pub fn perceived_by(index: usize) -> Species {
        if PREY_CHANNELS.contains(&index) {
            Species::Prey
        } else {
            Species::Predator
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeciesState {
    Prey {
        // Predators that reached this prey this tick, in registration order.
        claims: Vec<usize>,
    },
    Predator {
        metabolism: u32,
        digestion_cooldown: u32,
    },
}

impl SpeciesState {
    pub fn prey() -> Self {
        SpeciesState::Prey { claims: Vec::new() }
    }

    pub fn predator(metabolism: u32) -> Self {
        SpeciesState::Predator {
            metabolism,
            digestion_cooldown: 0,
        }
    }

    pub fn species(&self) -> Species {
        match self {
            SpeciesState::Prey { .. } => Species::Prey,
            SpeciesState::Predator { .. } => Species::Predator,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeathCause {
    Eaten { predator: usize },
    Starved,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoidGenome {
    pub direction_momentum: f64,
    pub speed_inertia: f64,
    pub channels: [ChannelGenome; CHANNEL_COUNT],
}

impl BoidGenome {
    pub fn random<R: RandomSource + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Self {
        let channels: [ChannelGenome; CHANNEL_COUNT] =
            std::array::from_fn(|index| ChannelGenome::random(config.vision_radius(index), rng));
        let direction_momentum = rng.next_f64() / config.turning_speed;
        let speed_inertia = rng.next_f64();
        Self {
            direction_momentum,
            speed_inertia,
            channels,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesiredMotion {
    pub heading: f64,
    pub speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub vector: DVec2,
    pub weight: f64,
}

/// Rotates `current` towards `desired` along the shorter arc, by `momentum` of the gap.
///
/// An exact half-turn always resolves clockwise.
pub fn turn_towards(current: f64, desired: f64, momentum: f64) -> f64 {
    let difference = desired - current;
    let mut delta = difference.abs();
    if delta > PI {
        delta = TAU - delta;
    }
    delta *= momentum;
    let limit = if difference < 0.0 { -PI } else { PI };
    let turned = if difference < limit {
        current + delta
    } else {
        current - delta
    };
    normalize(turned)
}

#[derive(Debug, Clone)]
pub struct Boid {
    id: usize,
    state: SpeciesState,
    positions: [DVec2; POSITION_COUNT],
    heading: f64,
    speed: f64,
    direction_momentum: f64,
    speed_inertia: f64,
    age: u64,
    channels: [PerceptionChannel; CHANNEL_COUNT],
}

impl Boid {
    pub fn spawn<R: RandomSource + ?Sized>(
        id: usize,
        species: Species,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Self {
        let genome = BoidGenome::random(config, rng);
        Self::born(id, species, genome, config, rng)
    }

    pub fn born<R: RandomSource + ?Sized>(
        id: usize,
        species: Species,
        genome: BoidGenome,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Self {
        let world = config.world();
        let position = DVec2::new(
            rng.next_f64() * world.width,
            rng.next_f64() * world.height,
        );
        let heading = rng.next_f64() * TAU;
        let speed = rng.next_f64() * BIRTH_SPEED_SPREAD + MIN_BIRTH_SPEED;
        let state = match species {
            Species::Prey => SpeciesState::prey(),
            Species::Predator => {
                let spread = (rng.next_f64() * config.metabolism_spread as f64) as u32;
                SpeciesState::predator(config.metabolism_base + spread)
            }
        };
        Self::assemble(id, state, genome, Pose::new(position, heading), speed, &world)
    }

    pub fn assemble(
        id: usize,
        state: SpeciesState,
        genome: BoidGenome,
        pose: Pose,
        speed: f64,
        world: &World,
    ) -> Self {
        let pose = Pose::new(world.wrap(pose.position), normalize(pose.heading));
        Self {
            id,
            state,
            positions: world.mirrors(pose.position),
            heading: pose.heading,
            speed,
            direction_momentum: genome.direction_momentum,
            speed_inertia: genome.speed_inertia,
            age: 0,
            channels: genome.channels.map(|g| PerceptionChannel::new(g, pose)),
        }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn species(&self) -> Species {
        self.state.species()
    }

    #[inline]
    pub fn state(&self) -> &SpeciesState {
        &self.state
    }

    #[inline]
    pub fn position(&self) -> DVec2 {
        self.positions[0]
    }

    #[inline]
    pub fn positions(&self) -> &[DVec2; POSITION_COUNT] {
        &self.positions
    }

    #[inline]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[inline]
    pub fn age(&self) -> u64 {
        self.age
    }

    #[inline]
    pub fn direction_momentum(&self) -> f64 {
        self.direction_momentum
    }

    #[inline]
    pub fn speed_inertia(&self) -> f64 {
        self.speed_inertia
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        Pose::new(self.position(), self.heading)
    }

    pub fn kinematics(&self) -> Kinematics {
        Kinematics {
            position: self.position(),
            heading: self.heading,
            speed: self.speed,
        }
    }

    pub fn genome(&self) -> BoidGenome {
        BoidGenome {
            direction_momentum: self.direction_momentum,
            speed_inertia: self.speed_inertia,
            channels: self.channels.each_ref().map(|c| *c.genome()),
        }
    }

    #[inline]
    pub fn channels(&self) -> &[PerceptionChannel; CHANNEL_COUNT] {
        &self.channels
    }

    pub fn channel_polygon(&self, index: usize) -> Option<&VisionPolygon> {
        self.channels.get(index).map(PerceptionChannel::polygon)
    }

    pub(crate) fn channel_mut(&mut self, index: usize) -> &mut PerceptionChannel {
        &mut self.channels[index]
    }

    pub fn has_detections(&self) -> bool {
        self.channels.iter().any(PerceptionChannel::has_detections)
    }

    pub fn metabolism(&self) -> Option<u32> {
        match self.state {
            SpeciesState::Predator { metabolism, .. } => Some(metabolism),
            SpeciesState::Prey { .. } => None,
        }
    }

    pub fn digestion_cooldown(&self) -> Option<u32> {
        match self.state {
            SpeciesState::Predator {
                digestion_cooldown, ..
            } => Some(digestion_cooldown),
            SpeciesState::Prey { .. } => None,
        }
    }

    pub fn claims(&self) -> &[usize] {
        match &self.state {
            SpeciesState::Prey { claims } => claims,
            SpeciesState::Predator { .. } => &[],
        }
    }

    // --- Movement ---

    // Position and vector reactions of every channel that saw something, with weights
    // normalised over all of them so they sum to one.
    pub fn contributions(&self, neighbours: &[Kinematics]) -> Vec<Contribution> {
        let owner = self.position();
        let active: Vec<_> = self
            .channels
            .iter()
            .filter_map(|c| c.summarize(owner, neighbours).map(|s| (c.genome(), s)))
            .collect();
        let total_weight: f64 = active
            .iter()
            .map(|(g, _)| g.reaction_weight + g.vector_reaction_weight)
            .sum();
        if !total_weight.is_finite() || total_weight <= 0.0 {
            return Vec::new();
        }

        let mut contributions = Vec::with_capacity(active.len() * 2);
        for (genome, summary) in active {
            let toward = normalize(summary.bearing_to_group + genome.relative_angle);
            contributions.push(Contribution {
                vector: unit(toward) * genome.reaction_speed,
                weight: genome.reaction_weight / total_weight,
            });
            let along = normalize(summary.avg_heading + genome.vector_relative_angle);
            contributions.push(Contribution {
                vector: unit(along) * (summary.avg_speed * genome.vector_reaction_speed),
                weight: genome.vector_reaction_weight / total_weight,
            });
        }
        contributions
    }

    pub fn desired_motion(&self, neighbours: &[Kinematics]) -> Option<DesiredMotion> {
        if !self.has_detections() {
            return None;
        }
        let resultant = self
            .contributions(neighbours)
            .iter()
            .fold(DVec2::ZERO, |sum, c| sum + c.vector * c.weight)
            * self.speed_inertia;
        let speed = resultant.length();
        if speed == 0.0 || !speed.is_finite() {
            return Some(DesiredMotion {
                heading: self.heading,
                speed: 0.0,
            });
        }
        Some(DesiredMotion {
            heading: bearing_of(resultant),
            speed,
        })
    }

    // One movement step. With detections the boid turns part-way towards its desired
    // heading and adopts the desired speed; without, it carries straight on.
    pub fn steer(&mut self, neighbours: &[Kinematics], world: &World) {
        let (heading, speed) = match self.desired_motion(neighbours) {
            Some(desired) => (
                turn_towards(self.heading, desired.heading, self.direction_momentum),
                desired.speed,
            ),
            None => (self.heading, self.speed),
        };
        self.speed = speed;
        self.advance(unit(heading) * speed, heading, world);
    }

    pub fn advance(&mut self, displacement: DVec2, heading: f64, world: &World) {
        let previous = self.pose();
        let position = world.wrap(self.position() + displacement);
        self.heading = normalize(heading);
        self.positions = world.mirrors(position);
        let current = self.pose();
        for channel in &mut self.channels {
            channel.repose(previous, current);
        }
    }

    // --- Feeding ---

    pub fn ready_to_feed(&self) -> bool {
        matches!(
            self.state,
            SpeciesState::Predator {
                digestion_cooldown: 0,
                ..
            }
        ) && self.channels[PREY_CHANNELS]
            .iter()
            .any(PerceptionChannel::has_detections)
    }

    pub fn feeding_candidates(&self) -> Vec<usize> {
        let mut candidates = Vec::new();
        for channel in &self.channels[PREY_CHANNELS] {
            for &slot in channel.detected() {
                if !candidates.contains(&slot) {
                    candidates.push(slot);
                }
            }
        }
        candidates
    }

    pub fn mouth_reaches(&self, target: &[DVec2; POSITION_COUNT], mouth_radius: f64) -> bool {
        let mouth = self.position();
        target.iter().any(|p| p.distance(mouth) < mouth_radius)
    }

    pub fn register_claim(&mut self, predator: usize) {
        if let SpeciesState::Prey { claims } = &mut self.state {
            claims.push(predator);
        }
    }

    pub fn take_claims(&mut self) -> Vec<usize> {
        match &mut self.state {
            SpeciesState::Prey { claims } => std::mem::take(claims),
            SpeciesState::Predator { .. } => Vec::new(),
        }
    }

    pub fn feed(&mut self, reward: u32, cooldown: u32) {
        if let SpeciesState::Predator {
            metabolism,
            digestion_cooldown,
        } = &mut self.state
        {
            *metabolism = metabolism.saturating_add(reward);
            *digestion_cooldown = cooldown;
        }
    }

    // --- Bookkeeping ---

    // Clears this tick's detections and ages the boid by one tick. Returns a cause of
    // death when a predator's metabolism runs out.
    pub fn end_tick(&mut self) -> Option<DeathCause> {
        for channel in &mut self.channels {
            channel.clear();
        }
        self.age += 1;
        match &mut self.state {
            SpeciesState::Predator {
                metabolism,
                digestion_cooldown,
            } => {
                *metabolism = metabolism.saturating_sub(1);
                *digestion_cooldown = digestion_cooldown.saturating_sub(1);
                (*metabolism == 0).then_some(DeathCause::Starved)
            }
            SpeciesState::Prey { .. } => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::angle::arc_between;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::FRAC_PI_2;

    pub(crate) fn calm_genome(radius: f64) -> BoidGenome {
        BoidGenome {
            direction_momentum: 0.5,
            speed_inertia: 1.0,
            channels: [ChannelGenome::regular(radius); CHANNEL_COUNT],
        }
    }

    fn world() -> World {
        World::new(100.0, 100.0, 30.0)
    }

    fn boid_at(x: f64, y: f64, heading: f64, genome: BoidGenome) -> Boid {
        Boid::assemble(
            0,
            SpeciesState::prey(),
            genome,
            Pose::new(DVec2::new(x, y), heading),
            3.0,
            &world(),
        )
    }

    #[test]
    fn perceived_species_is_fixed_by_channel_index() {
        for i in 0..3 {
            assert_eq!(Species::perceived_by(i), Species::Prey);
            assert_eq!(Species::perceived_by(i + 3), Species::Predator);
        }
    }

    #[test]
    fn turn_takes_a_fraction_of_the_short_arc() {
        assert!((turn_towards(0.0, FRAC_PI_2, 0.5) - FRAC_PI_2 / 2.0).abs() < 1e-12);
        assert!((turn_towards(FRAC_PI_2, 0.0, 0.5) - FRAC_PI_2 / 2.0).abs() < 1e-12);
        // Crossing zero clockwise.
        assert!(arc_between(turn_towards(0.1, TAU - 0.1, 1.0), TAU - 0.1) < 1e-12);
        // Crossing zero anticlockwise.
        assert!(arc_between(turn_towards(TAU - 0.1, 0.1, 1.0), 0.1) < 1e-12);
        assert!(arc_between(turn_towards(TAU - 0.1, 0.1, 0.5), 0.0) < 1e-12);
    }

    #[test]
    fn exact_half_turn_resolves_the_same_way_every_time() {
        // Both directions subtract.
        assert!(arc_between(turn_towards(0.0, PI, 0.5), 3.0 * FRAC_PI_2) < 1e-12);
        assert!(arc_between(turn_towards(PI, 0.0, 0.5), FRAC_PI_2) < 1e-12);
    }

    #[test]
    fn turn_never_exceeds_momentum_times_pi() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..5_000 {
            let current = rng.next_f64() * TAU;
            let desired = rng.next_f64() * TAU;
            let momentum = rng.next_f64();
            let turned = turn_towards(current, desired, momentum);
            assert!((0.0..TAU).contains(&turned));
            assert!(arc_between(turned, current) <= momentum * PI + 1e-9);
            // Never turns away from the target.
            assert!(arc_between(turned, desired) <= arc_between(current, desired) + 1e-9);
        }
    }

    #[test]
    fn spawn_draws_within_birth_ranges() {
        let config = SimulationConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        for id in 0..50 {
            let predator = Boid::spawn(id, Species::Predator, &config, &mut rng);
            let metabolism = predator.metabolism().expect("predator");
            assert!((400..700).contains(&metabolism));
            assert_eq!(predator.digestion_cooldown(), Some(0));
            assert!(predator.direction_momentum() < 1.0 / config.turning_speed);
            assert!((0.0..1.0).contains(&predator.speed_inertia()));
            assert!((2.0..12.0).contains(&predator.speed()));
            let p = predator.position();
            assert!(p.x >= 0.0 && p.x < config.world_width);
            assert!(p.y >= 0.0 && p.y < config.world_height);
            assert_eq!(predator.age(), 0);
        }
    }

    #[test]
    fn blend_weights_sum_to_one() {
        let mut genome = calm_genome(20.0);
        genome.channels[1].reaction_weight = 0.7;
        genome.channels[4].vector_reaction_weight = 2.5;
        let mut boid = boid_at(50.0, 50.0, 0.0, genome);
        let neighbours = [
            Kinematics::default(),
            Kinematics {
                position: DVec2::new(55.0, 50.0),
                heading: 1.0,
                speed: 2.0,
            },
            Kinematics {
                position: DVec2::new(50.0, 45.0),
                heading: 2.0,
                speed: 5.0,
            },
        ];
        boid.channel_mut(1).add(1);
        boid.channel_mut(4).add(2);
        boid.channel_mut(4).add(1);

        let contributions = boid.contributions(&neighbours);
        assert_eq!(contributions.len(), 4);
        let total: f64 = contributions.iter().map(|c| c.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn lone_position_reaction_heads_for_the_group() {
        let mut genome = calm_genome(20.0);
        genome.direction_momentum = 1.0;
        let mut boid = boid_at(50.0, 50.0, 0.0, genome);
        let neighbours = [Kinematics {
            position: DVec2::new(50.0, 60.0),
            heading: 0.0,
            speed: 0.0,
        }];
        boid.channel_mut(0).add(0);

        let desired = boid.desired_motion(&neighbours).expect("detection");
        assert!(arc_between(desired.heading, FRAC_PI_2) < 1e-12);
        let weight = INITIAL_REACTION_WEIGHT
            / (INITIAL_REACTION_WEIGHT + INITIAL_VECTOR_REACTION_WEIGHT);
        assert!((desired.speed - weight).abs() < 1e-12);

        boid.steer(&neighbours, &world());
        assert!(arc_between(boid.heading(), FRAC_PI_2) < 1e-12);
        assert!((boid.position() - DVec2::new(50.0, 50.0 + weight)).length() < 1e-9);
        assert_eq!(boid.speed(), desired.speed);
    }

    #[test]
    fn zero_resultant_keeps_heading_and_stops() {
        let mut genome = calm_genome(20.0);
        genome.channels[0].reaction_speed = 0.0;
        let mut boid = boid_at(50.0, 50.0, 2.0, genome);
        let neighbours = [Kinematics {
            position: DVec2::new(52.0, 50.0),
            heading: 0.0,
            speed: 0.0,
        }];
        boid.channel_mut(0).add(0);
        let desired = boid.desired_motion(&neighbours).expect("detection");
        assert_eq!(desired.heading, 2.0);
        assert_eq!(desired.speed, 0.0);
    }

    #[test]
    fn empty_channels_carry_straight_on() {
        let mut boid = boid_at(10.0, 20.0, 0.75, calm_genome(10.0));
        assert!(boid.desired_motion(&[]).is_none());
        let expected = DVec2::new(10.0, 20.0) + DVec2::new(0.75f64.cos(), 0.75f64.sin()) * 3.0;
        boid.steer(&[], &world());
        assert_eq!(boid.heading(), 0.75);
        assert_eq!(boid.speed(), 3.0);
        assert!((boid.position() - expected).length() < 1e-12);
    }

    #[test]
    fn advancing_refreshes_mirrors_and_polygons() {
        let genome = calm_genome(15.0);
        let mut boid = boid_at(98.0, 50.0, 0.0, genome);
        boid.advance(DVec2::new(4.0, 1.0), 1.1, &world());

        let position = boid.position();
        assert!((position - DVec2::new(2.0, 51.0)).length() < 1e-9);
        assert_eq!(*boid.positions(), world().mirrors(position));

        for (channel, gene) in boid.channels().iter().zip(genome.channels.iter()) {
            let expected = gene.local_polygon().posed(boid.pose());
            for (a, b) in channel.polygon().vertices().iter().zip(expected.vertices()) {
                assert!(a.distance(*b) < 1e-9);
            }
        }
    }

    #[test]
    fn predator_starves_when_metabolism_runs_out() {
        let mut predator = Boid::assemble(
            1,
            SpeciesState::predator(2),
            calm_genome(10.0),
            Pose::new(DVec2::new(5.0, 5.0), 0.0),
            1.0,
            &world(),
        );
        assert_eq!(predator.end_tick(), None);
        assert_eq!(predator.metabolism(), Some(1));
        assert_eq!(predator.end_tick(), Some(DeathCause::Starved));
        assert_eq!(predator.age(), 2);
    }

    #[test]
    fn feeding_sets_cooldown_and_blocks_the_next_meal() {
        let mut predator = Boid::assemble(
            1,
            SpeciesState::predator(50),
            calm_genome(10.0),
            Pose::new(DVec2::new(5.0, 5.0), 0.0),
            1.0,
            &world(),
        );
        predator.channel_mut(2).add(7);
        assert!(predator.ready_to_feed());
        predator.feed(100, 10);
        assert_eq!(predator.metabolism(), Some(150));
        assert_eq!(predator.digestion_cooldown(), Some(10));
        assert!(!predator.ready_to_feed());

        predator.end_tick();
        assert_eq!(predator.digestion_cooldown(), Some(9));
        assert!(!predator.has_detections());
    }

    #[test]
    fn predator_ignores_predator_channels_when_feeding() {
        let mut predator = Boid::assemble(
            1,
            SpeciesState::predator(50),
            calm_genome(10.0),
            Pose::new(DVec2::new(5.0, 5.0), 0.0),
            1.0,
            &world(),
        );
        predator.channel_mut(4).add(3);
        assert!(!predator.ready_to_feed());
        predator.channel_mut(0).add(8);
        predator.channel_mut(1).add(8);
        predator.channel_mut(1).add(6);
        assert_eq!(predator.feeding_candidates(), vec![8, 6]);
    }

    #[test]
    fn claims_are_kept_in_registration_order() {
        let mut prey = boid_at(5.0, 5.0, 0.0, calm_genome(10.0));
        prey.register_claim(9);
        prey.register_claim(3);
        assert_eq!(prey.claims(), &[9, 3]);
        assert_eq!(prey.take_claims(), vec![9, 3]);
        assert!(prey.claims().is_empty());
    }

    #[test]
    fn mouth_reaches_across_the_edge() {
        let predator = Boid::assemble(
            1,
            SpeciesState::predator(50),
            calm_genome(10.0),
            Pose::new(DVec2::new(1.0, 50.0), 0.0),
            1.0,
            &world(),
        );
        let prey = boid_at(98.0, 50.0, 0.0, calm_genome(10.0));
        assert!(predator.mouth_reaches(prey.positions(), 5.0));
        assert!(!predator.mouth_reaches(prey.positions(), 2.5));
    }
}
