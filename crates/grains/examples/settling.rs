//! Dust settling in a local shearing sheet.
//!
//! A column of grains of two sizes starts above the midplane of a gas at
//! rest. Vertical gravity pulls them down while drag limits their speed,
//! so small grains settle slowly and large ones quickly.
//!
//! Run with: cargo run --example settling [scenario.yaml]

use grains::SimulationConfig;
use grains::gas::{GasState, MeshGas};
use nalgebra::Vector3;

const SCENARIO: &str = r#"
integrator: fully_implicit
feedback: true
rotating_frame:
  omega: 1.0
  vertical_gravity: true
grid:
  cells: [8, 8, 32]
  spacing: [0.25, 0.25, 0.0625]
  origin: [-1.0, -1.0, -1.0]
  time_step: 0.05
species:
  - mass: 0.001
    drag: { fixed: { stopping_time: 0.01 } }
  - mass: 0.001
    drag: { fixed: { stopping_time: 0.3 } }
grains:
  - position: [0.0, 0.0, 0.6]
    species: 0
  - position: [0.1, 0.0, 0.6]
    species: 1
  - position: [-0.1, 0.2, 0.4]
    species: 0
  - position: [0.2, -0.2, 0.4]
    species: 1
"#;

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(path),
        None => SimulationConfig::from_yaml_str(SCENARIO),
    };
    let mut sim = match config.and_then(|c| c.build()) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("invalid scenario: {err}");
            std::process::exit(1);
        }
    };

    let mut gas = MeshGas::uniform(sim.grid.layout(), GasState::new(1.0, Vector3::zeros(), 1.0));

    println!("Settling {} grains, dt = {}", sim.grid.grain_count(), sim.grid.dt);
    println!("{:>8} {:>10} {:>10} {:>8}", "time", "<z> small", "<z> large", "crossing");

    for step in 0..=200 {
        if step % 20 == 0 {
            let mean_z = |species: usize| {
                let zs: Vec<f64> = sim
                    .grid
                    .grains
                    .iter()
                    .filter(|g| g.species.0 == species)
                    .map(|g| g.position.z)
                    .collect();
                zs.iter().sum::<f64>() / zs.len().max(1) as f64
            };
            println!(
                "{:>8.2} {:>10.4} {:>10.4} {:>8}",
                sim.grid.time,
                mean_z(0),
                mean_z(1),
                sim.grid.grains.crossing_count()
            );
        }

        sim.predict_feedback(&mut gas);
        sim.advance(&gas);

        let reaction: Vec<Vector3<f64>> = sim.take_feedback().iter().map(|f| -f).collect();
        gas.add_momentum(&reaction);

        let leaving = sim.handoff_crossing();
        if !leaving.is_empty() {
            println!("  {} grains left the box", leaving.len());
        }
    }
}
