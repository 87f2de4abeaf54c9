//! Triangular-shaped-cloud interpolation stencil.
//!
//! The same stencil is used to read the gas at a grain and to deposit the
//! grain's feedback, which keeps the exchanged momentum consistent.

use nalgebra::Vector3;

use super::Geometry;

/// Separable 3x3x3 TSC weights anchored at `base`
///
/// Collapsed axes carry a single cell with unit weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stencil {
    base: [isize; 3],
    extent: [usize; 3],
    weights: [[f64; 3]; 3],
}

impl Stencil {
    /// Builds the stencil for a point
    ///
    /// Along each active axis with `s = (x - origin) / dx`, the grain sits
    /// in cell `i = floor(s)` at offset `d = s - i - 0.5` from its centre
    /// and spreads onto cells `i-1, i, i+1` with weights
    /// `½(½-d)²`, `¾-d²`, `½(½+d)²`.
    ///
    /// # Examples
    ///
    /// ```
    /// use grains::grid::{Geometry, Stencil};
    /// use nalgebra::Vector3;
    ///
    /// let geometry = Geometry::new([8, 8, 1], [1.0, 1.0, 1.0], [0.0, 0.0, 0.0]).unwrap();
    /// let stencil = Stencil::at(&geometry, &Vector3::new(3.5, 2.5, 0.0));
    ///
    /// let total: f64 = stencil.cells().map(|(_, w)| w).sum();
    /// assert!((total - 1.0).abs() < 1e-12);
    /// assert_eq!(stencil.base(), [2, 1, 0]);
    /// ```
    pub fn at(geometry: &Geometry, position: &Vector3<f64>) -> Self {
        let cell1 = geometry.inverse_spacing();
        let mut base = [0isize; 3];
        let mut extent = [1usize; 3];
        let mut weights = [[1.0, 0.0, 0.0]; 3];

        for a in 0..3 {
            if !geometry.is_active(a) {
                continue;
            }
            let s = (position[a] - geometry.origin[a]) * cell1[a];
            let i = s.floor();
            let d = s - i - 0.5;

            base[a] = i as isize - 1;
            extent[a] = 3;
            weights[a] = [
                0.5 * (0.5 - d) * (0.5 - d),
                0.75 - d * d,
                0.5 * (0.5 + d) * (0.5 + d),
            ];
        }

        Self {
            base,
            extent,
            weights,
        }
    }

    /// First cell of the stencil along each axis
    pub fn base(&self) -> [isize; 3] {
        self.base
    }

    /// One-dimensional weights along `axis`
    pub fn axis_weights(&self, axis: usize) -> &[f64] {
        &self.weights[axis][..self.extent[axis]]
    }

    /// Every covered cell with its weight
    pub fn cells(&self) -> impl Iterator<Item = ([isize; 3], f64)> + '_ {
        let [n1, n2, n3] = self.extent;
        (0..n3).flat_map(move |k| {
            (0..n2).flat_map(move |j| {
                (0..n1).map(move |i| {
                    let cell = [
                        self.base[0] + i as isize,
                        self.base[1] + j as isize,
                        self.base[2] + k as isize,
                    ];
                    let w = self.weights[0][i] * self.weights[1][j] * self.weights[2][k];
                    (cell, w)
                })
            })
        })
    }
}
