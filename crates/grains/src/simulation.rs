//! Step driver for one local subdomain.
//!
//! A fluid step with grains proceeds as:
//! 1. [`GrainSimulation::predict_feedback`] before the fluid half step
//! 2. [`GrainSimulation::advance`] once the gas state is at the half step
//! 3. [`GrainSimulation::take_feedback`] to hand the corrector deposits
//!    to the fluid solver
//! 4. [`GrainSimulation::handoff_crossing`] for grains that left the domain
//!
//! Ghosts left behind by step 4 are compacted at the start of the next
//! advance.

use nalgebra::Vector3;

use crate::config::GrainConfig;
use crate::feedback::feedback_predictor;
use crate::gas::{GasField, SpeciesDragLaw, StoppingTime};
use crate::grain::Grain;
use crate::grid::Grid;
use crate::integrator::StepReport;

#[derive(Debug, Clone)]
pub struct GrainSimulation {
    pub config: GrainConfig,
    pub grid: Grid,
}

impl GrainSimulation {
    pub fn new(config: GrainConfig, grid: Grid) -> Self {
        Self { config, grid }
    }

    /// Predictor feedback pass with each species' own drag law
    ///
    /// Does nothing unless feedback is enabled.
    ///
    /// # Returns
    ///
    /// Number of grains that deposited
    pub fn predict_feedback<G: GasField>(&mut self, gas: &mut G) -> usize {
        self.predict_feedback_with(gas, &SpeciesDragLaw)
    }

    pub fn predict_feedback_with<G: GasField, S: StoppingTime>(&mut self, gas: &mut G, stopping: &S) -> usize {
        if !self.config.feedback {
            return 0;
        }
        feedback_predictor(&mut self.grid, gas, stopping)
    }

    /// Advances every grain by one step and moves the clock forward
    pub fn advance<G: GasField>(&mut self, gas: &G) -> StepReport {
        self.advance_with(gas, &SpeciesDragLaw)
    }

    /// Same as [`GrainSimulation::advance`] with a custom stopping-time model
    pub fn advance_with<G: GasField, S: StoppingTime>(&mut self, gas: &G, stopping: &S) -> StepReport {
        let report = self
            .config
            .integrator
            .integrate(&mut self.grid, &self.config, gas, stopping);
        self.grid.time += self.grid.dt;
        report
    }

    /// Grains flagged as crossing, for the boundary exchange
    pub fn handoff_crossing(&mut self) -> Vec<Grain> {
        self.grid.grains.handoff_crossing()
    }

    /// Accumulated feedback, leaving a zeroed array behind
    pub fn take_feedback(&mut self) -> Vec<Vector3<f64>> {
        self.grid.feedback.drain()
    }
}
