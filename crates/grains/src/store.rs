//! Dense grain storage.
//!
//! Grains live in a flat vector with no ordering guarantee. Removal is
//! swap-with-last, so indices are only stable between compactions.

use log::debug;

use crate::grain::{Grain, GrainStatus, SpeciesTable};

#[derive(Debug, Clone, Default)]
pub struct GrainStore {
    grains: Vec<Grain>,
}

impl GrainStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            grains: Vec::with_capacity(capacity),
        }
    }

    /// Appends a grain and returns its current index
    ///
    /// Species counts are not touched here; use
    /// [`Grid::add_grain`](crate::grid::Grid::add_grain) to keep them in sync.
    pub fn push(&mut self, grain: Grain) -> usize {
        self.grains.push(grain);
        self.grains.len() - 1
    }

    pub fn len(&self) -> usize {
        self.grains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grains.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Grain> {
        self.grains.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Grain> {
        self.grains.get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Grain> {
        self.grains.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Grain> {
        self.grains.iter_mut()
    }

    pub fn as_slice(&self) -> &[Grain] {
        &self.grains
    }

    /// Removes every ghost grain
    ///
    /// Each ghost slot is overwritten by the last grain in the store and the
    /// store shrinks by one, so the scan re-examines the slot it just
    /// filled. The matching species count is decremented.
    ///
    /// # Returns
    ///
    /// Number of grains removed
    ///
    /// # Examples
    ///
    /// ```
    /// use grains::gas::DragLaw;
    /// use grains::grain::{Grain, GrainStatus, Species, SpeciesTable};
    /// use grains::store::GrainStore;
    /// use nalgebra::Vector3;
    ///
    /// let mut species = SpeciesTable::new();
    /// let dust = species.add(Species::new(1.0, DragLaw::Fixed { stopping_time: 1.0 }));
    ///
    /// let mut store = GrainStore::new();
    /// let mut ghost = Grain::new(Vector3::zeros(), Vector3::zeros(), dust);
    /// ghost.status = GrainStatus::Ghost;
    /// store.push(ghost);
    /// store.push(Grain::new(Vector3::zeros(), Vector3::zeros(), dust));
    ///
    /// assert_eq!(store.compact_ghosts(&mut species), 1);
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn compact_ghosts(&mut self, species: &mut SpeciesTable) -> usize {
        let mut removed = 0;
        let mut p = 0;
        while p < self.grains.len() {
            if self.grains[p].is_ghost() {
                let ghost = self.grains.swap_remove(p);
                species.decrement(ghost.species);
                removed += 1;
            } else {
                p += 1;
            }
        }

        if removed > 0 {
            debug!("compacted {} ghost grains, {} remain", removed, self.grains.len());
        }
        removed
    }

    /// Copies out every crossing grain for exchange and marks the
    /// originals as ghosts, to be removed by the next compaction
    pub fn handoff_crossing(&mut self) -> Vec<Grain> {
        self.grains
            .iter_mut()
            .filter(|g| g.is_crossing())
            .map(|g| {
                let outgoing = *g;
                g.status = GrainStatus::Ghost;
                outgoing
            })
            .collect()
    }

    /// Number of grains currently flagged as crossing
    pub fn crossing_count(&self) -> usize {
        self.grains.iter().filter(|g| g.is_crossing()).count()
    }
}

impl std::ops::Index<usize> for GrainStore {
    type Output = Grain;

    fn index(&self, idx: usize) -> &Grain {
        &self.grains[idx]
    }
}

impl std::ops::IndexMut<usize> for GrainStore {
    fn index_mut(&mut self, idx: usize) -> &mut Grain {
        &mut self.grains[idx]
    }
}
