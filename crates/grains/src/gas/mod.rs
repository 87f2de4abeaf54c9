//! Gas-side collaborators of the grain step.
//!
//! The fluid solver owns the gas. The grain step only needs to read the
//! local gas state through a [`Stencil`] and to ask how fast a grain of a
//! given species relaxes toward it.

mod mesh;
mod stopping;


pub use mesh::MeshGas;
pub use stopping::{DragLaw, SpeciesDragLaw, StoppingTime};

use nalgebra::Vector3;

use crate::grid::Stencil;

/// Gas state interpolated at a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasState {
    pub density: f64,
    pub velocity: Vector3<f64>,
    pub sound_speed: f64,
}

impl GasState {
    pub fn new(density: f64, velocity: Vector3<f64>, sound_speed: f64) -> Self {
        Self {
            density,
            velocity,
            sound_speed,
        }
    }
}

/// Source of gas state for drag and feedback
pub trait GasField {
    /// Interpolates the gas over the stencil
    ///
    /// Returns `None` when the stencil reaches outside the region the
    /// field can interpolate.
    fn sample(&self, stencil: &Stencil) -> Option<GasState>;

    /// Systematic correction applied to the interpolated gas velocity
    fn velocity_shift(&self, _position: &Vector3<f64>, velocity: Vector3<f64>) -> Vector3<f64> {
        velocity
    }

    /// Rebuilds any cached per-cell quantities from the fluid state
    fn refresh(&mut self) {}
}

/// Constant gas velocity offset, e.g. the sub-Keplerian headwind caused
/// by a radial pressure gradient
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum VelocityShift {
    #[default]
    None,
    /// Gas lags by `speed` along `axis`
    Headwind { axis: usize, speed: f64 },
}

impl VelocityShift {
    pub fn apply(&self, mut velocity: Vector3<f64>) -> Vector3<f64> {
        if let VelocityShift::Headwind { axis, speed } = *self {
            velocity[axis] -= speed;
        }
        velocity
    }
}
