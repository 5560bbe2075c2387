// --- File: constants.rs ---
// --- Global Simulation Constants ---
pub const DEFAULT_WORLD_WIDTH: f64 = 800.0;
pub const DEFAULT_WORLD_HEIGHT: f64 = 600.0;
pub const DEFAULT_POPULATION_PER_SPECIES: usize = 30;
pub const DEFAULT_TURNING_SPEED: f64 = 3.0; // Momentum is drawn from [0, 1 / turning_speed)
pub const DEFAULT_VISION_RADII: [f64; 3] = [100.0, 200.0, 300.0]; // Channels {0,3}, {1,4}, {2,5}

// --- Boid Layout ---
pub const CHANNEL_COUNT: usize = 6;
pub const VERTEX_COUNT: usize = 8;
pub const POSITION_COUNT: usize = 9; // Canonical position plus its 8 torus mirrors
pub const PREY_CHANNELS: std::ops::Range<usize> = 0..3; // Channels that perceive prey
pub const PREDATOR_CHANNELS: std::ops::Range<usize> = 3..6; // Channels that perceive predators

// --- Birth Draws ---
pub const MIN_BIRTH_SPEED: f64 = 2.0;
pub const BIRTH_SPEED_SPREAD: f64 = 10.0;
pub const MAX_REACTION_SPEED: f64 = 10.0;
// No boid, newborn or steered, covers more ground than this in one tick.
pub const MAX_STEP_LENGTH: f64 = MIN_BIRTH_SPEED + BIRTH_SPEED_SPREAD;
pub const MAX_DISTANCE_IMPORTANCE: f64 = 2.0;
// Fixed at genome creation; crossover only ever shuffles these between parents.
pub const INITIAL_REACTION_WEIGHT: f64 = 0.1;
pub const INITIAL_VECTOR_REACTION_WEIGHT: f64 = 1.0;

// --- Predator Metabolism ---
pub const DEFAULT_METABOLISM_BASE: u32 = 400;
pub const DEFAULT_METABOLISM_SPREAD: u32 = 300;
pub const DEFAULT_MOUTH_RADIUS: f64 = 5.0;
pub const DEFAULT_FEEDING_REWARD: u32 = 100;
pub const DEFAULT_DIGESTION_COOLDOWN: u32 = 10;

// --- End of File: constants.rs ---
