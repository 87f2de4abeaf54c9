use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{GrainError, Result};
use crate::gas::DragLaw;

/// Index into the species table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeciesId(pub usize);

/// Where a grain stands with respect to the local domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrainStatus {
    /// Already handed to another domain, waiting to be compacted away
    Ghost,
    /// Normal grain owned by this domain
    Resident,
    /// Left the local bounds during the last step, waiting for exchange
    Crossing,
}

/// A single Lagrangian dust grain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grain {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub species: SpeciesId,
    pub status: GrainStatus,
    /// Azimuthal offset accumulated over the last step when orbital
    /// advection is handled by the fluid solver
    #[serde(default)]
    pub shift: f64,
}

impl Grain {
    /// Creates a resident grain
    ///
    /// # Examples
    ///
    /// ```
    /// use grains::grain::{Grain, GrainStatus, SpeciesId};
    /// use nalgebra::Vector3;
    ///
    /// let grain = Grain::new(Vector3::new(0.1, 0.0, 0.0), Vector3::zeros(), SpeciesId(0));
    /// assert_eq!(grain.status, GrainStatus::Resident);
    /// ```
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>, species: SpeciesId) -> Self {
        Self {
            position,
            velocity,
            species,
            status: GrainStatus::Resident,
            shift: 0.0,
        }
    }

    pub fn is_ghost(&self) -> bool {
        self.status == GrainStatus::Ghost
    }

    pub fn is_crossing(&self) -> bool {
        self.status == GrainStatus::Crossing
    }
}

/// Constant properties of a grain species plus its live count
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    /// Mass of one grain (code units)
    pub mass: f64,
    /// Number of grains of this species in the local store
    pub count: usize,
    /// Drag regime used by the default stopping-time model
    pub drag: DragLaw,
}

impl Species {
    pub fn new(mass: f64, drag: DragLaw) -> Self {
        Self {
            mass,
            count: 0,
            drag,
        }
    }
}

/// Per-species table, indexed by [`SpeciesId`]
#[derive(Debug, Clone, Default)]
pub struct SpeciesTable {
    species: Vec<Species>,
}

impl SpeciesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a species and returns its id
    pub fn add(&mut self, species: Species) -> SpeciesId {
        self.species.push(species);
        SpeciesId(self.species.len() - 1)
    }

    pub fn get(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(id.0)
    }

    /// Looks up a species, failing for ids that were never registered
    pub fn require(&self, id: SpeciesId) -> Result<&Species> {
        self.get(id).ok_or(GrainError::UnknownSpecies(id))
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpeciesId, &Species)> {
        self.species
            .iter()
            .enumerate()
            .map(|(i, s)| (SpeciesId(i), s))
    }

    /// Total number of grains over all species
    pub fn total_count(&self) -> usize {
        self.species.iter().map(|s| s.count).sum()
    }

    pub(crate) fn increment(&mut self, id: SpeciesId) {
        if let Some(species) = self.species.get_mut(id.0) {
            species.count += 1;
        }
    }

    pub(crate) fn decrement(&mut self, id: SpeciesId) {
        if let Some(species) = self.species.get_mut(id.0) {
            species.count = species.count.saturating_sub(1);
        }
    }
}

impl std::ops::Index<SpeciesId> for SpeciesTable {
    type Output = Species;

    fn index(&self, id: SpeciesId) -> &Species {
        &self.species[id.0]
    }
}
