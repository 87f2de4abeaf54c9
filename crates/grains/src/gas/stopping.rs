//! Stopping-time models.
//!
//! The stopping time is the e-folding time over which drag brings a grain
//! to the local gas velocity.

use serde::Deserialize;

use crate::grain::Species;

/// Drag regime of a species
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragLaw {
    /// Stopping time independent of the gas state
    Fixed { stopping_time: f64 },
    /// Epstein regime, parameterised by solid density times grain radius
    Epstein { radius_density: f64 },
}

impl DragLaw {
    /// Stopping time for this law
    ///
    /// The Epstein law includes the supersonic correction
    /// `1 / sqrt(1 + 9π/128 (Δv/cs)²)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use grains::gas::DragLaw;
    ///
    /// let law = DragLaw::Epstein { radius_density: 0.5 };
    /// let ts = law.stopping_time(1.0, 1.0, 0.0);
    /// assert!((ts - 0.5).abs() < 1e-12);
    /// ```
    pub fn stopping_time(&self, density: f64, sound_speed: f64, relative_speed: f64) -> f64 {
        match *self {
            DragLaw::Fixed { stopping_time } => stopping_time,
            DragLaw::Epstein { radius_density } => {
                let mach = relative_speed / sound_speed;
                let correction = (1.0 + 9.0 * std::f64::consts::PI / 128.0 * mach * mach).sqrt();
                radius_density / (density * sound_speed) / correction
            }
        }
    }

    /// The law's single parameter, used for validation
    pub fn parameter(&self) -> f64 {
        match *self {
            DragLaw::Fixed { stopping_time } => stopping_time,
            DragLaw::Epstein { radius_density } => radius_density,
        }
    }
}

/// Species-dependent drag physics
///
/// Implementations must return a positive, finite stopping time for any
/// in-domain gas state.
pub trait StoppingTime {
    fn stopping_time(
        &self,
        species: &Species,
        density: f64,
        sound_speed: f64,
        relative_speed: f64,
    ) -> f64;
}

/// Uses each species' own [`DragLaw`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeciesDragLaw;

impl StoppingTime for SpeciesDragLaw {
    fn stopping_time(
        &self,
        species: &Species,
        density: f64,
        sound_speed: f64,
        relative_speed: f64,
    ) -> f64 {
        species
            .drag
            .stopping_time(density, sound_speed, relative_speed)
    }
}
