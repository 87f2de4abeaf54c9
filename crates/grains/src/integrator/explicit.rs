use nalgebra::Vector3;

use super::{GrainIntegrator, StepContext};
use crate::gas::{GasField, StoppingTime};
use crate::grain::Grain;

/// Explicit midpoint scheme
///
/// The force at the current state predicts the half-step velocity; the
/// force at the predicted half-step state gives the full increment. Stable
/// only while `dt` stays below the stopping time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Explicit;

impl GrainIntegrator for Explicit {
    fn velocity_increment<G: GasField, S: StoppingTime>(
        &self,
        ctx: &StepContext<'_, G, S>,
        grain: &Grain,
    ) -> Vector3<f64> {
        let dt = ctx.dt;
        let half_position = ctx.predict_position(grain, 0.5);

        let (f0, _) = ctx.total_force(grain.species, &grain.position, &grain.velocity);
        let half_velocity = grain.velocity + f0 * (0.5 * dt);

        let (f, _) = ctx.total_force(grain.species, &half_position, &half_velocity);
        f * dt
    }
}
