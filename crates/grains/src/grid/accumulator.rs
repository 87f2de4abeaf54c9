//! Per-cell feedback force accumulator.
//!
//! Cleared at the start of each feedback pass, only ever added to while
//! grains deposit, and drained by the fluid solver afterwards.

use nalgebra::Vector3;

use super::{CellLayout, Geometry, Stencil};

/// Azimuthal offset between a shearing-periodic x1 boundary and its image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShearImage {
    /// Offset along x2 in cell units, in `[0, Nx2)`
    pub shift_cells: f64,
}

impl ShearImage {
    /// Offset at `time` for a sheet rotating at `omega`
    ///
    /// The two x1 boundaries slide past each other at `1.5 Ω Lx1`, wrapped
    /// over the x2 extent.
    pub fn at(time: f64, geometry: &Geometry, omega: f64) -> Self {
        let vshear = 1.5 * omega * geometry.length(0);
        let shift = (vshear * time).rem_euclid(geometry.length(1));
        Self {
            shift_cells: shift / geometry.spacing[1],
        }
    }
}

/// Feedback force density summed per cell
#[derive(Debug, Clone)]
pub struct FeedbackAccumulator {
    layout: CellLayout,
    force: Vec<Vector3<f64>>,
}

impl FeedbackAccumulator {
    pub fn new(layout: CellLayout) -> Self {
        Self {
            layout,
            force: vec![Vector3::zeros(); layout.len()],
        }
    }

    pub fn layout(&self) -> &CellLayout {
        &self.layout
    }

    pub fn clear(&mut self) {
        self.force.fill(Vector3::zeros());
    }

    /// Spreads `force` over the stencil cells
    ///
    /// Nothing is deposited unless every stencil cell is stored.
    ///
    /// # Returns
    ///
    /// Whether the deposit happened
    pub fn deposit(&mut self, stencil: &Stencil, force: &Vector3<f64>) -> bool {
        if !self.layout.covers(stencil) {
            return false;
        }
        for (cell, w) in stencil.cells() {
            if let Some(idx) = self.layout.index(cell) {
                self.force[idx] += force * w;
            }
        }
        true
    }

    /// Mirrors the part of a deposit that fell into x1 ghost cells onto
    /// the periodic image cells on the opposite side
    ///
    /// Inner ghosts map to the outer edge shifted by `+shift` along x2 and
    /// outer ghosts to the inner edge shifted by `-shift`; a fractional
    /// shift splits the contribution linearly between neighbouring cells.
    pub fn deposit_shear_image(&mut self, stencil: &Stencil, force: &Vector3<f64>, image: &ShearImage) {
        let [n1, n2, _] = self.layout.cells();
        let (n1, n2) = (n1 as isize, n2 as isize);

        for (cell, w) in stencil.cells() {
            let (i, j) = if cell[0] < 0 {
                (cell[0] + n1, cell[1] as f64 + image.shift_cells)
            } else if cell[0] >= n1 {
                (cell[0] - n1, cell[1] as f64 - image.shift_cells)
            } else {
                continue;
            };

            let j0 = j.floor();
            let frac = j - j0;
            let j0 = j0 as isize;

            for (jj, share) in [(j0, 1.0 - frac), (j0 + 1, frac)] {
                if share == 0.0 {
                    continue;
                }
                let target = [i, jj.rem_euclid(n2), cell[2]];
                if let Some(idx) = self.layout.index(target) {
                    self.force[idx] += force * (w * share);
                }
            }
        }
    }

    /// Accumulated force in one cell
    pub fn cell(&self, cell: [isize; 3]) -> Option<Vector3<f64>> {
        self.layout.index(cell).map(|idx| self.force[idx])
    }

    /// Sum over every stored cell, ghosts included
    pub fn total(&self) -> Vector3<f64> {
        self.force.iter().fold(Vector3::zeros(), |acc, f| acc + f)
    }

    /// Raw per-cell values in layout order
    pub fn as_slice(&self) -> &[Vector3<f64>] {
        &self.force
    }

    /// Hands the accumulated forces to the caller and resets the array
    pub fn drain(&mut self) -> Vec<Vector3<f64>> {
        std::mem::replace(&mut self.force, vec![Vector3::zeros(); self.layout.len()])
    }
}
