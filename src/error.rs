use crate::boid::Species;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("no living {species:?} left to breed from")]
    EmptyGenePool { species: Species },
    #[error("slot {slot} is out of range for a population of {len}")]
    SlotOutOfRange { slot: usize, len: usize },
}
