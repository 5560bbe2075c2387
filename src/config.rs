// --- File: config.rs ---
use crate::constants::*;
use crate::error::SimulationError;
use crate::torus::World;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub world_width: f64,
    pub world_height: f64,
    pub population_per_species: usize,
    // Upper bound of a boid's turning responsiveness is 1 / turning_speed.
    pub turning_speed: f64,
    // One radius per channel pair {0,3}, {1,4}, {2,5}.
    pub vision_radii: [f64; 3],
    pub mouth_radius: f64,
    pub feeding_reward: u32,
    pub digestion_cooldown: u32,
    pub metabolism_base: u32,
    pub metabolism_spread: u32,
    pub parallel_perception: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world_width: DEFAULT_WORLD_WIDTH,
            world_height: DEFAULT_WORLD_HEIGHT,
            population_per_species: DEFAULT_POPULATION_PER_SPECIES,
            turning_speed: DEFAULT_TURNING_SPEED,
            vision_radii: DEFAULT_VISION_RADII,
            mouth_radius: DEFAULT_MOUTH_RADIUS,
            feeding_reward: DEFAULT_FEEDING_REWARD,
            digestion_cooldown: DEFAULT_DIGESTION_COOLDOWN,
            metabolism_base: DEFAULT_METABOLISM_BASE,
            metabolism_spread: DEFAULT_METABOLISM_SPREAD,
            parallel_perception: false,
        }
    }
}

impl SimulationConfig {
    pub fn new(width: f64, height: f64, population_per_species: usize) -> Self {
        Self {
            world_width: width,
            world_height: height,
            population_per_species,
            ..Self::default()
        }
    }

    #[inline]
    pub fn vision_radius(&self, channel: usize) -> f64 {
        self.vision_radii[channel % self.vision_radii.len()]
    }

    pub fn max_vision_radius(&self) -> f64 {
        self.vision_radii.iter().copied().fold(0.0, f64::max)
    }

    pub fn world(&self) -> World {
        World::new(self.world_width, self.world_height, self.max_vision_radius())
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let extents = [self.world_width, self.world_height];
        if extents.iter().any(|e| !e.is_finite() || *e <= 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "world must have positive finite extents, got {}x{}",
                self.world_width, self.world_height
            )));
        }
        if extents.iter().any(|e| *e <= MAX_STEP_LENGTH) {
            return Err(SimulationError::InvalidConfig(format!(
                "world extents must exceed the longest step of {MAX_STEP_LENGTH}, got {}x{}",
                self.world_width, self.world_height
            )));
        }
        if let Some(bad) = self
            .vision_radii
            .iter()
            .find(|r| !r.is_finite() || **r <= 0.0)
        {
            return Err(SimulationError::InvalidConfig(format!(
                "vision radius must be positive, got {bad}"
            )));
        }
        if !self.turning_speed.is_finite() || self.turning_speed < 1.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "turning speed must be at least 1, got {}",
                self.turning_speed
            )));
        }
        if !self.mouth_radius.is_finite() || self.mouth_radius <= 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "mouth radius must be positive, got {}",
                self.mouth_radius
            )));
        }
        Ok(())
    }
}

// --- End of File: config.rs ---
