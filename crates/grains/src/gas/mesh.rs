use nalgebra::Vector3;

use super::{GasField, GasState, VelocityShift};
use crate::grid::{CellLayout, Stencil};

/// Cell-centred gas state on a [`CellLayout`]
///
/// Density and momentum are the fluid solver's conserved variables; the
/// velocity used for interpolation is cached by [`GasField::refresh`].
#[derive(Debug, Clone)]
pub struct MeshGas {
    layout: CellLayout,
    density: Vec<f64>,
    momentum: Vec<Vector3<f64>>,
    sound_speed: Vec<f64>,
    velocity: Vec<Vector3<f64>>,
    shift: VelocityShift,
}

impl MeshGas {
    /// Fills every stored cell, ghosts included, with the same state
    ///
    /// # Examples
    ///
    /// ```
    /// use grains::gas::{GasField, GasState, MeshGas};
    /// use grains::grid::{CellLayout, Geometry, Stencil};
    /// use nalgebra::Vector3;
    ///
    /// let geometry = Geometry::new([4, 4, 1], [1.0, 1.0, 1.0], [0.0, 0.0, 0.0]).unwrap();
    /// let state = GasState::new(2.0, Vector3::new(0.5, 0.0, 0.0), 1.0);
    /// let gas = MeshGas::uniform(CellLayout::for_geometry(&geometry), state);
    ///
    /// let sampled = gas.sample(&Stencil::at(&geometry, &Vector3::new(1.3, 2.7, 0.0))).unwrap();
    /// assert!((sampled.density - 2.0).abs() < 1e-12);
    /// ```
    pub fn uniform(layout: CellLayout, state: GasState) -> Self {
        let n = layout.len();
        Self {
            layout,
            density: vec![state.density; n],
            momentum: vec![state.velocity * state.density; n],
            sound_speed: vec![state.sound_speed; n],
            velocity: vec![state.velocity; n],
            shift: VelocityShift::None,
        }
    }

    /// Builds the mesh cell by cell from a function of the cell coordinates
    pub fn from_fn(layout: CellLayout, f: impl Fn([isize; 3]) -> GasState) -> Self {
        let mut gas = Self::uniform(layout, GasState::new(1.0, Vector3::zeros(), 1.0));
        for idx in 0..layout.len() {
            let state = f(layout.cell(idx));
            gas.density[idx] = state.density;
            gas.momentum[idx] = state.velocity * state.density;
            gas.sound_speed[idx] = state.sound_speed;
        }
        gas.refresh();
        gas
    }

    pub fn with_velocity_shift(mut self, shift: VelocityShift) -> Self {
        self.shift = shift;
        self
    }

    pub fn layout(&self) -> &CellLayout {
        &self.layout
    }

    /// Overwrites the conserved state of one cell
    ///
    /// The cached velocity is stale until the next refresh.
    ///
    /// # Returns
    ///
    /// `false` if the cell is not stored
    pub fn set_cell(&mut self, cell: [isize; 3], density: f64, momentum: Vector3<f64>) -> bool {
        match self.layout.index(cell) {
            Some(idx) => {
                self.density[idx] = density;
                self.momentum[idx] = momentum;
                true
            }
            None => false,
        }
    }

    pub fn set_sound_speed(&mut self, cell: [isize; 3], sound_speed: f64) -> bool {
        match self.layout.index(cell) {
            Some(idx) => {
                self.sound_speed[idx] = sound_speed;
                true
            }
            None => false,
        }
    }

    /// Applies a momentum change to every cell, e.g. drained feedback
    pub fn add_momentum(&mut self, delta: &[Vector3<f64>]) {
        for (m, d) in self.momentum.iter_mut().zip(delta) {
            *m += d;
        }
    }

    pub fn momentum(&self) -> &[Vector3<f64>] {
        &self.momentum
    }
}

impl GasField for MeshGas {
    fn sample(&self, stencil: &Stencil) -> Option<GasState> {
        let mut rho = 0.0;
        let mut u = Vector3::zeros();
        let mut cs = 0.0;

        for (cell, w) in stencil.cells() {
            let idx = self.layout.index(cell)?;
            rho += w * self.density[idx];
            u += self.velocity[idx] * w;
            cs += w * self.sound_speed[idx];
        }

        Some(GasState::new(rho, u, cs))
    }

    fn velocity_shift(&self, _position: &Vector3<f64>, velocity: Vector3<f64>) -> Vector3<f64> {
        self.shift.apply(velocity)
    }

    fn refresh(&mut self) {
        for ((v, m), rho) in self.velocity.iter_mut().zip(&self.momentum).zip(&self.density) {
            *v = if *rho > 0.0 { m / *rho } else { Vector3::zeros() };
        }
    }
}
