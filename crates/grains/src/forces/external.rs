use nalgebra::Vector3;

use crate::config::RotatingFrame;
use crate::grid::Geometry;

/// Non-drag forces: tidal and Coriolis terms of the local shearing frame,
/// plus optional linear vertical gravity
///
/// In 3-D the axes are (X, Y, Z) = (radial, azimuthal, vertical). A grid
/// collapsed along x3 is read as (X, Z, Y), so the azimuthal direction
/// moves to x3 and the vertical to x2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExternalForce {
    frame: Option<RotatingFrame>,
    three_dimensional: bool,
}

impl ExternalForce {
    pub fn new(frame: Option<RotatingFrame>, geometry: &Geometry) -> Self {
        Self {
            frame,
            three_dimensional: geometry.is_three_dimensional(),
        }
    }

    /// No external forces at all
    pub fn none() -> Self {
        Self {
            frame: None,
            three_dimensional: true,
        }
    }

    pub fn frame(&self) -> Option<&RotatingFrame> {
        self.frame.as_ref()
    }

    /// Acceleration at the given phase-space point
    ///
    /// # Examples
    ///
    /// ```
    /// use grains::config::RotatingFrame;
    /// use grains::forces::ExternalForce;
    /// use grains::grid::Geometry;
    /// use nalgebra::Vector3;
    ///
    /// let geometry = Geometry::new([8, 8, 8], [0.1, 0.1, 0.1], [0.0, 0.0, 0.0]).unwrap();
    /// let force = ExternalForce::new(Some(RotatingFrame::new(1.0)), &geometry);
    ///
    /// // Tidal term 3Ω²x pushes outward
    /// let f = force.evaluate(&Vector3::new(0.5, 0.0, 0.0), &Vector3::zeros());
    /// assert!((f.x - 1.5).abs() < 1e-12);
    /// ```
    pub fn evaluate(&self, position: &Vector3<f64>, velocity: &Vector3<f64>) -> Vector3<f64> {
        let mut ft = Vector3::zeros();
        let Some(frame) = self.frame else {
            return ft;
        };

        let omega = frame.omega;
        let omg2 = omega * omega;

        if self.three_dimensional {
            if frame.fargo {
                ft.x += 2.0 * velocity.y * omega;
                ft.y += -0.5 * velocity.x * omega;
            } else {
                ft.x += 3.0 * omg2 * position.x + 2.0 * velocity.y * omega;
                ft.y += -2.0 * velocity.x * omega;
            }
            if frame.vertical_gravity {
                ft.z += -omg2 * position.z;
            }
        } else {
            ft.x += 3.0 * omg2 * position.x + 2.0 * velocity.z * omega;
            ft.z += -2.0 * velocity.x * omega;
            if frame.vertical_gravity {
                ft.y += -omg2 * position.y;
            }
        }

        ft
    }
}
