//! Second-order grain integrators
//!
//! Three schemes advance every grain by one step of the shared time step.
//! They differ only in how the velocity change is obtained from two force
//! evaluations:
//!
//! - [`Explicit`]: midpoint rule, force re-evaluated at a predicted
//!   half-step position and velocity
//! - [`SemiImplicit`]: force at the half-step position, with the linear
//!   drag and Coriolis operator inverted analytically
//! - [`FullyImplicit`]: forces at the current and at a full-step predicted
//!   position, combined through an implicit 2x2 solve
//!
//! Everything after the velocity change is shared: the position update
//! `x' = x + ½dt (v + v')` on active axes, the feedback corrector and the
//! boundary check.

mod explicit;
mod fully_implicit;
mod semi_implicit;

#[cfg(test)]
mod integrator_test;

pub use explicit::Explicit;
pub use fully_implicit::{FullyImplicit, ImplicitMatrix};
pub use semi_implicit::SemiImplicit;

use log::{debug, info, warn};
use nalgebra::Vector3;
use serde::Deserialize;

use crate::config::{GrainConfig, RotatingFrame};
use crate::feedback::FeedbackCorrector;
use crate::forces::{DragForce, ExternalForce};
use crate::gas::{GasField, StoppingTime};
use crate::grain::{Grain, GrainStatus, SpeciesId, SpeciesTable};
use crate::grid::{Geometry, Grid, ShearImage};

/// Which scheme advances the grains, chosen once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    Explicit,
    #[default]
    SemiImplicit,
    FullyImplicit,
}

impl IntegratorKind {
    /// Advances every grain in `grid` by `grid.dt`
    ///
    /// The scheme is resolved here, outside the per-grain loop.
    pub fn integrate<G: GasField, S: StoppingTime>(
        self,
        grid: &mut Grid,
        config: &GrainConfig,
        gas: &G,
        stopping: &S,
    ) -> StepReport {
        match self {
            IntegratorKind::Explicit => integrate_with(&Explicit, grid, config, gas, stopping),
            IntegratorKind::SemiImplicit => {
                integrate_with(&SemiImplicit, grid, config, gas, stopping)
            }
            IntegratorKind::FullyImplicit => {
                integrate_with(&FullyImplicit, grid, config, gas, stopping)
            }
        }
    }
}

/// Outcome of one grain step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    /// Ghost grains compacted away before stepping
    pub ghosts_removed: usize,
    /// Grains stepped
    pub grains: usize,
    /// Grains that left the local bounds during this step
    pub crossing: usize,
    /// Drag evaluations that fell outside the interpolation region
    pub out_of_domain: usize,
}

/// Per-step state shared by every grain
pub struct StepContext<'a, G, S> {
    pub dt: f64,
    pub drag: DragForce<'a, G, S>,
    pub external: ExternalForce,
    active: [bool; 3],
    three_dimensional: bool,
}

impl<'a, G: GasField, S: StoppingTime> StepContext<'a, G, S> {
    pub fn new(
        dt: f64,
        geometry: &'a Geometry,
        species: &'a SpeciesTable,
        gas: &'a G,
        stopping: &'a S,
        frame: Option<RotatingFrame>,
    ) -> Self {
        Self {
            dt,
            drag: DragForce::new(geometry, species, gas, stopping),
            external: ExternalForce::new(frame, geometry),
            active: geometry.active_axes(),
            three_dimensional: geometry.is_three_dimensional(),
        }
    }

    pub fn rotation(&self) -> Option<&RotatingFrame> {
        self.external.frame()
    }

    pub fn is_three_dimensional(&self) -> bool {
        self.three_dimensional
    }

    /// Drag plus external force, with the drag's inverse stopping time
    pub fn total_force(
        &self,
        species: SpeciesId,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> (Vector3<f64>, f64) {
        let drag = self.drag.evaluate(species, position, velocity);
        let external = self.external.evaluate(position, velocity);
        (drag.force + external, drag.inverse_stopping_time)
    }

    /// Drift along active axes by `fraction * dt` at the current velocity
    ///
    /// In the 3-D shearing sheet the azimuthal coordinate also picks up
    /// the background shear advection, unless the fluid solver removes it.
    pub fn predict_position(&self, grain: &Grain, fraction: f64) -> Vector3<f64> {
        let h = fraction * self.dt;
        let mut x = grain.position;
        for a in 0..3 {
            if self.active[a] {
                x[a] += grain.velocity[a] * h;
            }
        }

        if let Some(frame) = self.rotation() {
            if self.three_dimensional && !frame.fargo {
                x.y -= 0.75 * grain.velocity.x * h * h;
            }
        }
        x
    }
}

/// A second-order grain integration scheme
pub trait GrainIntegrator {
    /// Velocity change of `grain` over one step
    fn velocity_increment<G: GasField, S: StoppingTime>(
        &self,
        ctx: &StepContext<'_, G, S>,
        grain: &Grain,
    ) -> Vector3<f64>;
}

/// Runs one full grain step with a fixed scheme
///
/// The prologue clears the feedback array (when feedback is on) and
/// compacts ghosts; then each grain gets its velocity change from the
/// scheme, is moved, deposits its drag reaction and is checked against the
/// local bounds.
pub fn integrate_with<I, G, S>(
    scheme: &I,
    grid: &mut Grid,
    config: &GrainConfig,
    gas: &G,
    stopping: &S,
) -> StepReport
where
    I: GrainIntegrator,
    G: GasField,
    S: StoppingTime,
{
    if config.feedback {
        grid.feedback.clear();
    }

    let ghosts_removed = grid.grains.compact_ghosts(&mut grid.species);

    let frame = config.rotating_frame;
    let fargo = frame.is_some_and(|f| f.fargo);
    let shear_image = match frame {
        Some(f) if grid.geometry.is_three_dimensional() && !f.fargo => {
            Some(ShearImage::at(grid.time, &grid.geometry, f.omega))
        }
        _ => None,
    };

    let Grid {
        geometry,
        dt,
        domain_id,
        grains,
        species,
        feedback,
        ..
    } = grid;
    let dt = *dt;
    let geometry = &*geometry;
    let species = &*species;

    let ctx = StepContext::new(dt, geometry, species, gas, stopping, frame);
    let corrector = FeedbackCorrector::new(geometry, ctx.external, dt, shear_image);
    let active = geometry.active_axes();
    // Orbital advection by the fluid solver wraps grains back in azimuth
    let exempt_axis = fargo.then(|| geometry.azimuthal_axis());

    let mut crossing = 0;
    for grain in grains.iter_mut() {
        let old = *grain;
        let dv = scheme.velocity_increment(&ctx, &old);

        let mut new = old;
        new.velocity = old.velocity + dv;
        for a in 0..3 {
            if active[a] {
                new.position[a] = old.position[a] + 0.5 * dt * (old.velocity[a] + new.velocity[a]);
            }
        }

        if let Some(f) = frame.filter(|f| f.fargo) {
            new.shift = -0.75 * f.omega * (old.position.x + new.position.x) * dt;
        }

        if config.feedback {
            corrector.deposit(feedback, species[old.species].mass, &old, &new, &dv);
        }

        let outside = (0..3)
            .filter(|&a| Some(a) != exempt_axis)
            .any(|a| !geometry.bounds.contains(a, new.position[a]));
        if outside {
            new.status = GrainStatus::Crossing;
            crossing += 1;
        }

        *grain = new;
    }

    let out_of_domain = ctx.drag.out_of_domain();
    if out_of_domain > 0 {
        warn!(
            "domain {}: {} drag evaluations outside the interpolation region, drag set to zero",
            domain_id, out_of_domain
        );
    }
    debug!("{} grains crossed the domain boundary", crossing);
    info!("domain {}: {} grains", domain_id, grains.len());

    StepReport {
        ghosts_removed,
        grains: grains.len(),
        crossing,
        out_of_domain,
    }
}
