//! Run configuration, loadable from YAML.
//!
//! A scenario file describes which integrator to use, which optional
//! physics is switched on, the local grid, the grain species and an
//! optional initial set of grains:
//!
//! ```yaml
//! integrator: semi_implicit   # explicit | semi_implicit | fully_implicit
//! feedback: true
//! rotating_frame:             # omit for a non-rotating run
//!   omega: 1.0
//!   fargo: false
//!   vertical_gravity: true
//! grid:
//!   cells: [32, 32, 1]
//!   spacing: [0.05, 0.05, 0.05]
//!   origin: [-0.8, -0.8, 0.0]
//!   time_step: 0.01
//! species:
//!   - mass: 0.01
//!     drag: { fixed: { stopping_time: 0.1 } }
//! grains:
//!   - position: [0.0, 0.1, 0.0]
//!     velocity: [0.0, 0.0, 0.0]
//!     species: 0
//! ```

use std::path::Path;

use nalgebra::Vector3;
use serde::Deserialize;

use crate::error::{GrainError, Result};
use crate::gas::DragLaw;
use crate::grain::{Grain, Species, SpeciesId};
use crate::grid::{Bounds, Geometry, Grid};
use crate::integrator::IntegratorKind;
use crate::simulation::GrainSimulation;

/// Local co-rotating shearing frame
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RotatingFrame {
    /// Rotation rate Ω
    pub omega: f64,
    /// Orbital advection is handled by the fluid solver (FARGO), which
    /// removes the background shear from the grain equations
    #[serde(default)]
    pub fargo: bool,
    /// Linear vertical gravity `-Ω² z`
    #[serde(default)]
    pub vertical_gravity: bool,
}

impl RotatingFrame {
    pub fn new(omega: f64) -> Self {
        Self {
            omega,
            fargo: false,
            vertical_gravity: false,
        }
    }

    pub fn with_fargo(mut self) -> Self {
        self.fargo = true;
        self
    }

    pub fn with_vertical_gravity(mut self) -> Self {
        self.vertical_gravity = true;
        self
    }
}

/// Physics switches for the grain step
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GrainConfig {
    #[serde(default)]
    pub integrator: IntegratorKind,
    /// Deposit the drag reaction onto the gas
    #[serde(default)]
    pub feedback: bool,
    #[serde(default)]
    pub rotating_frame: Option<RotatingFrame>,
}

impl Default for GrainConfig {
    fn default() -> Self {
        Self {
            integrator: IntegratorKind::default(),
            feedback: false,
            rotating_frame: None,
        }
    }
}

impl GrainConfig {
    pub fn new(integrator: IntegratorKind) -> Self {
        Self {
            integrator,
            ..Self::default()
        }
    }

    pub fn with_feedback(mut self) -> Self {
        self.feedback = true;
        self
    }

    pub fn with_rotating_frame(mut self, frame: RotatingFrame) -> Self {
        self.rotating_frame = Some(frame);
        self
    }

    /// Checks the switches against the grid they will run on
    pub fn validate(&self, geometry: &Geometry) -> Result<()> {
        if let Some(frame) = self.rotating_frame {
            if !frame.omega.is_finite() {
                return Err(GrainError::InvalidRotationRate(frame.omega));
            }
            if frame.fargo && !geometry.is_three_dimensional() {
                return Err(GrainError::FargoRequiresThreeDimensions);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoundsConfig {
    pub lower: [f64; 3],
    pub upper: [f64; 3],
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    pub cells: [usize; 3],
    pub spacing: [f64; 3],
    #[serde(default)]
    pub origin: [f64; 3],
    pub time_step: f64,
    #[serde(default)]
    pub domain_id: usize,
    /// Particle bounds, defaults to the active extent
    #[serde(default)]
    pub bounds: Option<BoundsConfig>,
}

impl GridConfig {
    pub fn geometry(&self) -> Result<Geometry> {
        let geometry = Geometry::new(self.cells, self.spacing, self.origin)?;
        Ok(match &self.bounds {
            Some(b) => geometry.with_bounds(Bounds::new(b.lower.into(), b.upper.into())),
            None => geometry,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesConfig {
    pub mass: f64,
    pub drag: DragLaw,
}

/// Initial state of one grain
#[derive(Debug, Clone, Deserialize)]
pub struct GrainSeed {
    pub position: [f64; 3],
    #[serde(default)]
    pub velocity: [f64; 3],
    pub species: usize,
}

/// Top-level scenario
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(flatten)]
    pub step: GrainConfig,
    pub grid: GridConfig,
    pub species: Vec<SpeciesConfig>,
    #[serde(default)]
    pub grains: Vec<GrainSeed>,
}

impl SimulationConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Checks everything that would otherwise be a precondition
    /// violation during stepping
    pub fn validate(&self) -> Result<()> {
        let geometry = self.grid.geometry()?;
        self.step.validate(&geometry)?;

        let dt = self.grid.time_step;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(GrainError::InvalidTimeStep(dt));
        }

        for (i, s) in self.species.iter().enumerate() {
            let species = SpeciesId(i);
            if !(s.mass.is_finite() && s.mass > 0.0) {
                return Err(GrainError::InvalidMass {
                    species,
                    value: s.mass,
                });
            }
            let p = s.drag.parameter();
            if !(p.is_finite() && p > 0.0) {
                return Err(GrainError::InvalidStoppingTime { species, value: p });
            }
        }

        if let Some(seed) = self.grains.iter().find(|g| g.species >= self.species.len()) {
            return Err(GrainError::UnknownSpecies(SpeciesId(seed.species)));
        }

        Ok(())
    }

    /// Validates the scenario and builds a ready-to-step simulation
    ///
    /// # Examples
    ///
    /// ```
    /// use grains::config::SimulationConfig;
    ///
    /// let yaml = r#"
    /// integrator: fully_implicit
    /// grid:
    ///   cells: [8, 8, 1]
    ///   spacing: [0.125, 0.125, 0.125]
    ///   time_step: 0.01
    /// species:
    ///   - mass: 1.0
    ///     drag: { fixed: { stopping_time: 0.5 } }
    /// grains:
    ///   - position: [0.5, 0.5, 0.0]
    ///     species: 0
    /// "#;
    ///
    /// let sim = SimulationConfig::from_yaml_str(yaml).unwrap().build().unwrap();
    /// assert_eq!(sim.grid.grain_count(), 1);
    /// ```
    pub fn build(&self) -> Result<GrainSimulation> {
        self.validate()?;

        let geometry = self.grid.geometry()?;
        let mut grid = Grid::new(geometry, self.grid.time_step)?.with_domain_id(self.grid.domain_id);

        for s in &self.species {
            grid.add_species(Species::new(s.mass, s.drag));
        }
        for seed in &self.grains {
            grid.add_grain(Grain::new(
                Vector3::from(seed.position),
                Vector3::from(seed.velocity),
                SpeciesId(seed.species),
            ))?;
        }

        Ok(GrainSimulation::new(self.step, grid))
    }
}
