use nalgebra::{Matrix2, Vector2, Vector3};

use super::{GrainIntegrator, StepContext};
use crate::config::RotatingFrame;
use crate::gas::{GasField, StoppingTime};
use crate::grain::Grain;

/// Fully implicit scheme
///
/// Forces are evaluated at the current position and at a full-step
/// predicted position, both with the current velocity. Their inverse
/// stopping times enter an implicit update that stays stable for
/// arbitrarily stiff drag.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullyImplicit;

impl GrainIntegrator for FullyImplicit {
    fn velocity_increment<G: GasField, S: StoppingTime>(
        &self,
        ctx: &StepContext<'_, G, S>,
        grain: &Grain,
    ) -> Vector3<f64> {
        let dt = ctx.dt;
        let predicted = ctx.predict_position(grain, 1.0);

        let (fc, ts11) = ctx.total_force(grain.species, &grain.position, &grain.velocity);
        let (fp, ts12) = ctx.total_force(grain.species, &predicted, &grain.velocity);

        let b0 = 1.0 + dt * ts11;
        let mut ft = (fc + fp * b0) * 0.5;

        let frame = ctx.rotation();
        let m = ImplicitMatrix::new(dt, ts11, ts12, frame);

        let Some(frame) = frame else {
            return ft * (dt / m.d);
        };

        let oh = frame.omega * dt;
        if ctx.is_three_dimensional() {
            ft.x -= oh * fp.y;
            let coriolis = if frame.fargo { 0.25 } else { 1.0 };
            ft.y += coriolis * oh * fp.x;

            let dv = m.solve(Vector2::new(ft.x, ft.y));
            Vector3::new(dt * dv.x, dt * dv.y, dt * ft.z / m.d)
        } else {
            ft.x -= oh * fp.z;
            ft.z += oh * fp.x;

            let dv = m.solve(Vector2::new(ft.x, ft.z));
            Vector3::new(dt * dv.x, dt * ft.y / m.d, dt * dv.y)
        }
    }
}

/// Coefficients of the implicit operator `[[A, B], [C, A]]` acting on the
/// orbital-plane velocity change, plus the diagonal `D` of the decoupled
/// axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImplicitMatrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl ImplicitMatrix {
    /// Builds the operator for inverse stopping times `ts11` (current
    /// position) and `ts12` (predicted position)
    ///
    /// # Examples
    ///
    /// ```
    /// use grains::integrator::ImplicitMatrix;
    ///
    /// // Without rotation the operator is diagonal
    /// let m = ImplicitMatrix::new(0.1, 2.0, 2.0, None);
    /// assert_eq!(m.b, 0.0);
    /// assert!((m.a - m.d).abs() < 1e-15);
    /// assert!((m.d - 1.22).abs() < 1e-12);
    /// ```
    pub fn new(dt: f64, ts11: f64, ts12: f64, frame: Option<&RotatingFrame>) -> Self {
        let d = 1.0 + 0.5 * dt * (ts11 + ts12 + dt * ts11 * ts12);

        let Some(frame) = frame else {
            return Self {
                a: d,
                b: 0.0,
                c: 0.0,
                d,
            };
        };

        let oh = frame.omega * dt;
        let b = oh * (-2.0 - (ts11 + ts12) * dt);
        if frame.fargo {
            Self {
                a: d - 0.5 * oh * oh,
                b,
                c: -0.25 * b,
                d,
            }
        } else {
            Self {
                a: d - 2.0 * oh * oh,
                b,
                c: -b,
                d,
            }
        }
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.a - self.b * self.c
    }

    /// The orbital-plane block as a matrix
    pub fn matrix(&self) -> Matrix2<f64> {
        Matrix2::new(self.a, self.b, self.c, self.a)
    }

    /// Closed-form solution of `matrix() * x = rhs`
    pub fn solve(&self, rhs: Vector2<f64>) -> Vector2<f64> {
        let det1 = 1.0 / self.determinant();
        Vector2::new(
            det1 * (rhs.x * self.a - rhs.y * self.b),
            det1 * (-rhs.x * self.c + rhs.y * self.a),
        )
    }
}
