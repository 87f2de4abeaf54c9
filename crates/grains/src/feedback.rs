//! Drag reaction of the grains on the gas.
//!
//! Both passes deposit the momentum the grains *gain* from drag, as a
//! force density per cell; the fluid solver applies it with the opposite
//! sign. The predictor runs before the fluid's half step and uses a
//! first-order estimate. The corrector runs inside the grain step and uses
//! the exact velocity change minus the part due to external forces.

use log::{debug, warn};
use nalgebra::Vector3;

use crate::forces::ExternalForce;
use crate::gas::{GasField, StoppingTime};
use crate::grain::Grain;
use crate::grid::{FeedbackAccumulator, Geometry, Grid, ShearImage, Stencil};

/// Predictor pass over every non-ghost grain
///
/// Refreshes the gas, clears the accumulator and deposits
/// `m (u - v) ½dt / max(t_s, dt)` for each grain. The floor on the stopping
/// time keeps stiff grains from dumping unbounded momentum into the
/// estimate.
///
/// # Returns
///
/// Number of grains that deposited
pub fn feedback_predictor<G, S>(grid: &mut Grid, gas: &mut G, stopping: &S) -> usize
where
    G: GasField,
    S: StoppingTime,
{
    gas.refresh();
    grid.feedback.clear();

    let dt = grid.dt;
    let mut deposited = 0;
    let mut skipped = 0;

    for grain in grid.grains.iter().filter(|g| !g.is_ghost()) {
        let stencil = Stencil::at(&grid.geometry, &grain.position);
        let Some(state) = gas.sample(&stencil) else {
            skipped += 1;
            continue;
        };

        let u = gas.velocity_shift(&grain.position, state.velocity);
        let vd = u - grain.velocity;

        let species = &grid.species[grain.species];
        let ts = stopping
            .stopping_time(species, state.density, state.sound_speed, vd.norm())
            .max(dt);
        let ts1h = 0.5 * dt / ts;

        let fb = vd * (species.mass * ts1h);
        if grid.feedback.deposit(&stencil, &fb) {
            deposited += 1;
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        warn!(
            "domain {}: {} grains outside the interpolation region skipped in feedback predictor",
            grid.domain_id, skipped
        );
    }
    deposited
}

/// Corrector deposit for one grain, applied right after it is stepped
#[derive(Debug, Clone, Copy)]
pub struct FeedbackCorrector<'a> {
    geometry: &'a Geometry,
    external: ExternalForce,
    dt: f64,
    shear_image: Option<ShearImage>,
}

impl<'a> FeedbackCorrector<'a> {
    /// `shear_image` is set for a 3-D shearing sheet whose x1 boundaries are
    /// shearing-periodic; deposits into x1 ghost cells are then mirrored
    pub fn new(
        geometry: &'a Geometry,
        external: ExternalForce,
        dt: f64,
        shear_image: Option<ShearImage>,
    ) -> Self {
        Self {
            geometry,
            external,
            dt,
            shear_image,
        }
    }

    /// Momentum a grain of mass `mass` gained from drag over the step
    ///
    /// The external force is evaluated at the step midpoint in phase space
    /// and removed from the total velocity change.
    pub fn drag_momentum(&self, mass: f64, before: &Grain, after: &Grain, dv: &Vector3<f64>) -> Vector3<f64> {
        let x = (before.position + after.position) * 0.5;
        let v = (before.velocity + after.velocity) * 0.5;
        let fext = self.external.evaluate(&x, &v);
        (dv - fext * self.dt) * mass
    }

    /// Deposits the drag momentum at the step midpoint
    ///
    /// A midpoint whose stencil reaches past the ghost layers is pulled back
    /// to the nearest point that fits, so the momentum the grain received
    /// always reaches the gas.
    ///
    /// # Returns
    ///
    /// Whether the deposit was made at the true midpoint
    pub fn deposit(
        &self,
        accumulator: &mut FeedbackAccumulator,
        mass: f64,
        before: &Grain,
        after: &Grain,
        dv: &Vector3<f64>,
    ) -> bool {
        let fb = self.drag_momentum(mass, before, after, dv);
        let midpoint = (before.position + after.position) * 0.5;

        let mut stencil = Stencil::at(self.geometry, &midpoint);
        let at_midpoint = accumulator.deposit(&stencil, &fb);
        if !at_midpoint {
            let clamped = self.geometry.clamp_to_halo(&midpoint);
            debug!(
                "feedback midpoint ({:.4}, {:.4}, {:.4}) beyond the ghost layers, deposited at ({:.4}, {:.4}, {:.4})",
                midpoint.x, midpoint.y, midpoint.z, clamped.x, clamped.y, clamped.z
            );
            stencil = Stencil::at(self.geometry, &clamped);
            accumulator.deposit(&stencil, &fb);
        }

        if let Some(image) = &self.shear_image {
            accumulator.deposit_shear_image(&stencil, &fb, image);
        }
        at_midpoint
    }
}
