//! Lagrangian dust grains coupled to a gas mesh.
//!
//! Grains feel gas drag and, optionally, the tidal, Coriolis and vertical
//! gravity terms of a local shearing sheet. Each step advances every grain
//! with one of three second-order schemes and can deposit the drag
//! reaction back onto the gas.
//!
//! # Examples
//!
//! ```
//! use grains::config::GrainConfig;
//! use grains::gas::{DragLaw, GasState, MeshGas};
//! use grains::grain::{Grain, Species};
//! use grains::grid::{Geometry, Grid};
//! use grains::integrator::IntegratorKind;
//! use grains::simulation::GrainSimulation;
//! use nalgebra::Vector3;
//!
//! let geometry = Geometry::new([8, 8, 1], [0.125, 0.125, 0.125], [0.0, 0.0, 0.0]).unwrap();
//! let mut grid = Grid::new(geometry, 0.01).unwrap();
//! let dust = grid.add_species(Species::new(1e-3, DragLaw::Fixed { stopping_time: 0.1 }));
//! grid.add_grain(Grain::new(Vector3::new(0.5, 0.5, 0.0), Vector3::new(0.2, 0.0, 0.0), dust))
//!     .unwrap();
//!
//! let gas = MeshGas::uniform(grid.layout(), GasState::new(1.0, Vector3::zeros(), 1.0));
//! let mut sim = GrainSimulation::new(GrainConfig::new(IntegratorKind::FullyImplicit), grid);
//! let report = sim.advance(&gas);
//!
//! assert_eq!(report.grains, 1);
//! assert!(sim.grid.grains[0].velocity.x < 0.2);
//! ```

pub mod config;
pub mod error;
pub mod feedback;
pub mod forces;
pub mod gas;
pub mod grain;
pub mod grid;
pub mod integrator;
pub mod simulation;
pub mod store;

#[cfg(test)]
mod config_test;

pub use config::{GrainConfig, RotatingFrame, SimulationConfig};
pub use error::{GrainError, Result};
pub use grain::{Grain, GrainStatus, Species, SpeciesId};
pub use grid::Grid;
pub use integrator::{IntegratorKind, StepReport};
pub use simulation::GrainSimulation;
