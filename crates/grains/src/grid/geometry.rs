use nalgebra::Vector3;

use super::GHOST_CELLS;
use crate::error::{GrainError, Result};

/// Local particle domain, lower-inclusive and upper-exclusive per axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: Vector3<f64>,
    pub upper: Vector3<f64>,
}

impl Bounds {
    pub fn new(lower: Vector3<f64>, upper: Vector3<f64>) -> Self {
        Self { lower, upper }
    }

    /// `lower <= x < upper` along `axis`
    pub fn contains(&self, axis: usize, x: f64) -> bool {
        x >= self.lower[axis] && x < self.upper[axis]
    }
}

/// Cell layout and extent of the local subdomain
///
/// An axis with a single cell is collapsed: grains never move along it
/// and interpolation ignores it.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Active cells per axis (Nx1, Nx2, Nx3)
    pub cells: [usize; 3],
    /// Cell width per axis
    pub spacing: [f64; 3],
    /// Lower edge of the first active cell
    pub origin: [f64; 3],
    /// Bounds used to decide whether a grain left the domain
    pub bounds: Bounds,
}

impl Geometry {
    /// Creates a geometry whose particle bounds match the active extent
    ///
    /// # Arguments
    ///
    /// * `cells` - Active cells per axis, at least one
    /// * `spacing` - Cell width per axis, positive and finite
    /// * `origin` - Lower edge of the active region
    ///
    /// # Examples
    ///
    /// ```
    /// use grains::grid::Geometry;
    ///
    /// let geometry = Geometry::new([16, 16, 1], [0.1, 0.1, 0.1], [0.0, 0.0, 0.0]).unwrap();
    /// assert!(geometry.is_active(0));
    /// assert!(!geometry.is_active(2));
    /// assert!(!geometry.is_three_dimensional());
    /// ```
    pub fn new(cells: [usize; 3], spacing: [f64; 3], origin: [f64; 3]) -> Result<Self> {
        for axis in 0..3 {
            if cells[axis] == 0 {
                return Err(GrainError::InvalidCells { axis });
            }
            if !(spacing[axis].is_finite() && spacing[axis] > 0.0) {
                return Err(GrainError::InvalidSpacing {
                    axis,
                    value: spacing[axis],
                });
            }
        }

        let lower = Vector3::from(origin);
        let upper = Vector3::from_fn(|a, _| origin[a] + cells[a] as f64 * spacing[a]);

        Ok(Self {
            cells,
            spacing,
            origin,
            bounds: Bounds::new(lower, upper),
        })
    }

    /// Replaces the particle bounds
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn is_active(&self, axis: usize) -> bool {
        self.cells[axis] > 1
    }

    pub fn active_axes(&self) -> [bool; 3] {
        [self.is_active(0), self.is_active(1), self.is_active(2)]
    }

    /// A grid with more than one cell along x3 is treated as a full 3-D
    /// shearing sheet; otherwise (x1, x2, x3) are read as (X, Z, Y)
    pub fn is_three_dimensional(&self) -> bool {
        self.is_active(2)
    }

    /// Axis holding the orbital (Y) direction of the shearing frame
    pub fn azimuthal_axis(&self) -> usize {
        if self.is_three_dimensional() { 1 } else { 2 }
    }

    /// Reciprocal spacing, zero along collapsed axes
    pub fn inverse_spacing(&self) -> Vector3<f64> {
        Vector3::from_fn(|a, _| {
            if self.is_active(a) {
                1.0 / self.spacing[a]
            } else {
                0.0
            }
        })
    }

    /// Centre of a cell given in signed layout coordinates
    pub fn cell_center(&self, cell: [isize; 3]) -> Vector3<f64> {
        Vector3::from_fn(|a, _| self.origin[a] + (cell[a] as f64 + 0.5) * self.spacing[a])
    }

    /// Nearest point whose stencil fits inside the stored ghost layers
    ///
    /// Active coordinates are clamped to the centres of the outermost
    /// cells a stencil may be centred on; collapsed axes are untouched.
    pub fn clamp_to_halo(&self, position: &Vector3<f64>) -> Vector3<f64> {
        let reach = GHOST_CELLS as f64 - 1.5;
        Vector3::from_fn(|a, _| {
            if !self.is_active(a) {
                return position[a];
            }
            let lo = self.origin[a] - reach * self.spacing[a];
            let hi = self.origin[a] + (self.cells[a] as f64 + reach) * self.spacing[a];
            position[a].clamp(lo, hi)
        })
    }

    /// Length of the active region along `axis`
    pub fn length(&self, axis: usize) -> f64 {
        self.cells[axis] as f64 * self.spacing[axis]
    }
}
