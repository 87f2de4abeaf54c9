//! Error types for grain configuration and setup.
//!
//! Stepping itself never fails: out-of-domain grains are handled by
//! zeroing their drag. Everything here is caught before the first step.

use thiserror::Error;

use crate::grain::SpeciesId;

#[derive(Debug, Error)]
pub enum GrainError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("axis {axis} must have at least one cell")]
    InvalidCells { axis: usize },

    #[error("axis {axis} has invalid cell spacing {value}")]
    InvalidSpacing { axis: usize, value: f64 },

    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    #[error("rotation rate must be finite, got {0}")]
    InvalidRotationRate(f64),

    #[error("species {species:?} has invalid mass {value}")]
    InvalidMass { species: SpeciesId, value: f64 },

    #[error("species {species:?} has invalid drag parameter {value}")]
    InvalidStoppingTime { species: SpeciesId, value: f64 },

    #[error("unknown species {0:?}")]
    UnknownSpecies(SpeciesId),

    #[error("azimuthal advection substitution requires a three-dimensional grid")]
    FargoRequiresThreeDimensions,
}

pub type Result<T> = std::result::Result<T, GrainError>;
