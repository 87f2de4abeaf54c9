//! Local grid: geometry, grain store, species table and feedback array.
//!
//! The grid is owned by the caller. The grain step only reads the geometry
//! and time state and mutates grains, species counts and the feedback
//! accumulator.

mod accumulator;
mod geometry;
mod layout;
mod stencil;


pub use accumulator::{FeedbackAccumulator, ShearImage};
pub use geometry::{Bounds, Geometry};
pub use layout::{CellLayout, GHOST_CELLS};
pub use stencil::Stencil;

use crate::error::{GrainError, Result};
use crate::grain::{Grain, Species, SpeciesId, SpeciesTable};
use crate::store::GrainStore;

/// Everything the grain step needs from the local subdomain
#[derive(Debug, Clone)]
pub struct Grid {
    pub geometry: Geometry,
    /// Current simulation time
    pub time: f64,
    /// Step size shared by every grain
    pub dt: f64,
    /// Id of this subdomain, used in log output
    pub domain_id: usize,
    pub grains: GrainStore,
    pub species: SpeciesTable,
    pub feedback: FeedbackAccumulator,
}

impl Grid {
    /// Creates an empty grid at `time = 0`
    ///
    /// # Examples
    ///
    /// ```
    /// use grains::grid::{Geometry, Grid};
    ///
    /// let geometry = Geometry::new([8, 8, 8], [0.1, 0.1, 0.1], [0.0, 0.0, 0.0]).unwrap();
    /// let grid = Grid::new(geometry, 0.01).unwrap();
    ///
    /// assert_eq!(grid.grain_count(), 0);
    /// assert!(Grid::new(grid.geometry.clone(), -1.0).is_err());
    /// ```
    pub fn new(geometry: Geometry, dt: f64) -> Result<Self> {
        check_time_step(dt)?;
        let feedback = FeedbackAccumulator::new(CellLayout::for_geometry(&geometry));
        Ok(Self {
            geometry,
            time: 0.0,
            dt,
            domain_id: 0,
            grains: GrainStore::new(),
            species: SpeciesTable::new(),
            feedback,
        })
    }

    pub fn with_domain_id(mut self, domain_id: usize) -> Self {
        self.domain_id = domain_id;
        self
    }

    /// Sets the step size for the next step
    pub fn set_time_step(&mut self, dt: f64) -> Result<()> {
        check_time_step(dt)?;
        self.dt = dt;
        Ok(())
    }

    pub fn add_species(&mut self, species: Species) -> SpeciesId {
        self.species.add(species)
    }

    /// Adds a grain and bumps its species count
    pub fn add_grain(&mut self, grain: Grain) -> Result<usize> {
        self.species.require(grain.species)?;
        self.species.increment(grain.species);
        Ok(self.grains.push(grain))
    }

    pub fn grain_count(&self) -> usize {
        self.grains.len()
    }

    /// Cell layout shared by gas sampling and feedback deposition
    pub fn layout(&self) -> CellLayout {
        *self.feedback.layout()
    }
}

fn check_time_step(dt: f64) -> Result<()> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(GrainError::InvalidTimeStep(dt))
    }
}
