//! Predator/prey boids on a wrap-around plane. Every boid looks through six evolved
//! polygonal vision channels, steers with heritable momentum, and on death is replaced by
//! an offspring bred from two age-biased parents of its own species.

pub mod angle;
pub mod boid;
pub mod channel;
pub mod config;
pub mod constants;
pub mod error;
pub mod evolution;
pub mod polygon;
pub mod simulation;
pub mod torus;
pub mod utils;

pub use angle::bearing;
pub use boid::{Boid, BoidGenome, DeathCause, Species, SpeciesState};
pub use channel::ChannelGenome;
pub use config::SimulationConfig;
pub use error::SimulationError;
pub use polygon::{Pose, VisionPolygon};
pub use simulation::{BoidView, DeathEvent, PopulationStats, Simulation, TickReport};
pub use torus::{EdgeBuffer, World};
pub use utils::RandomSource;
