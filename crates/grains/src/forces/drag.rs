use std::cell::Cell;

use log::debug;
use nalgebra::Vector3;

use crate::gas::{GasField, StoppingTime};
use crate::grain::{SpeciesId, SpeciesTable};
use crate::grid::{Geometry, Stencil};

/// Drag acceleration together with the inverse stopping time it implies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub force: Vector3<f64>,
    pub inverse_stopping_time: f64,
}

impl Drag {
    /// No coupling to the gas
    pub fn zero() -> Self {
        Self {
            force: Vector3::zeros(),
            inverse_stopping_time: 0.0,
        }
    }
}

/// Gas drag evaluated against a gas field
///
/// Counts the evaluations that fell outside the interpolation region so
/// the step can report them once.
pub struct DragForce<'a, G, S> {
    geometry: &'a Geometry,
    species: &'a SpeciesTable,
    gas: &'a G,
    stopping: &'a S,
    out_of_domain: Cell<usize>,
}

impl<'a, G: GasField, S: StoppingTime> DragForce<'a, G, S> {
    pub fn new(geometry: &'a Geometry, species: &'a SpeciesTable, gas: &'a G, stopping: &'a S) -> Self {
        Self {
            geometry,
            species,
            gas,
            stopping,
            out_of_domain: Cell::new(0),
        }
    }

    /// Evaluations so far that could not interpolate the gas
    pub fn out_of_domain(&self) -> usize {
        self.out_of_domain.get()
    }

    /// Drag on a grain of `species` at the given phase-space point
    ///
    /// The force is `-(v - u) / t_s` with `u` the shifted gas velocity.
    /// A point the gas cannot be interpolated at feels no drag; such
    /// grains are about to leave the domain, so the evaluation is only
    /// counted.
    pub fn evaluate(&self, species: SpeciesId, position: &Vector3<f64>, velocity: &Vector3<f64>) -> Drag {
        let stencil = Stencil::at(self.geometry, position);
        let Some(gas) = self.gas.sample(&stencil) else {
            self.out_of_domain.set(self.out_of_domain.get() + 1);
            debug!(
                "grain at ({:.4}, {:.4}, {:.4}) is outside the interpolation region, drag set to zero",
                position.x, position.y, position.z
            );
            return Drag::zero();
        };

        let u = self.gas.velocity_shift(position, gas.velocity);
        let vd = velocity - u;

        let ts = self.stopping.stopping_time(
            &self.species[species],
            gas.density,
            gas.sound_speed,
            vd.norm(),
        );
        let ts1 = 1.0 / ts;

        Drag {
            force: -vd * ts1,
            inverse_stopping_time: ts1,
        }
    }
}
