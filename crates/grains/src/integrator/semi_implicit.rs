use nalgebra::Vector3;

use super::{GrainIntegrator, StepContext};
use crate::gas::{GasField, StoppingTime};
use crate::grain::Grain;

/// Semi-implicit midpoint scheme
///
/// The force is evaluated once, at the half-step position with the current
/// velocity. Drag and Coriolis terms are then treated implicitly by
/// inverting the 2x2 operator they form in the orbital plane, with
/// `b = dt/t_s + 2` and `oh = Ω dt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemiImplicit;

impl GrainIntegrator for SemiImplicit {
    fn velocity_increment<G: GasField, S: StoppingTime>(
        &self,
        ctx: &StepContext<'_, G, S>,
        grain: &Grain,
    ) -> Vector3<f64> {
        let dt = ctx.dt;
        let half_position = ctx.predict_position(grain, 0.5);
        let (ft, ts1) = ctx.total_force(grain.species, &half_position, &grain.velocity);

        let b = dt * ts1 + 2.0;

        let Some(frame) = ctx.rotation() else {
            return ft * (2.0 * dt / b);
        };

        let oh = frame.omega * dt;
        let b1 = if frame.fargo {
            1.0 / (b * b + oh * oh)
        } else {
            1.0 / (b * b + 4.0 * oh * oh)
        };
        let b2 = b * b1;

        if ctx.is_three_dimensional() {
            // FARGO weakens the azimuthal Coriolis term from -2Ωv1 to -Ωv1/2
            let coriolis = if frame.fargo { 1.0 } else { 4.0 };
            Vector3::new(
                2.0 * dt * b2 * ft.x + 4.0 * dt * oh * b1 * ft.y,
                2.0 * dt * b2 * ft.y - coriolis * dt * oh * b1 * ft.x,
                2.0 * dt * ft.z / b,
            )
        } else {
            Vector3::new(
                2.0 * dt * b2 * ft.x + 4.0 * dt * oh * b1 * ft.z,
                2.0 * dt * ft.y / b,
                2.0 * dt * b2 * ft.z - 4.0 * dt * oh * b1 * ft.x,
            )
        }
    }
}
