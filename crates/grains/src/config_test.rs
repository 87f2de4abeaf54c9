use approx::assert_relative_eq;
use nalgebra::Vector3;

use crate::config::{GrainConfig, RotatingFrame, SimulationConfig};
use crate::error::GrainError;
use crate::gas::DragLaw;
use crate::grain::SpeciesId;
use crate::integrator::IntegratorKind;

const SCENARIO: &str = r#"
integrator: semi_implicit
feedback: true
rotating_frame:
  omega: 1.0
  fargo: false
  vertical_gravity: true
grid:
  cells: [32, 32, 1]
  spacing: [0.05, 0.05, 0.05]
  origin: [-0.8, -0.8, 0.0]
  time_step: 0.01
  domain_id: 3
species:
  - mass: 0.01
    drag: { fixed: { stopping_time: 0.1 } }
  - mass: 0.02
    drag: { epstein: { radius_density: 0.5 } }
grains:
  - position: [0.0, 0.1, 0.0]
    velocity: [0.0, 0.0, 0.0]
    species: 0
  - position: [0.2, -0.1, 0.0]
    species: 1
"#;

const MINIMAL: &str = r#"
grid:
  cells: [8, 8, 8]
  spacing: [0.25, 0.25, 0.25]
  time_step: 0.1
species:
  - mass: 1.0
    drag: { fixed: { stopping_time: 1.0 } }
"#;

fn expect_err(yaml: &str) -> GrainError {
    SimulationConfig::from_yaml_str(yaml)
        .and_then(|config| config.build())
        .unwrap_err()
}

#[test]
fn test_full_scenario() {
    let config = SimulationConfig::from_yaml_str(SCENARIO).unwrap();

    assert_eq!(config.step.integrator, IntegratorKind::SemiImplicit);
    assert!(config.step.feedback);
    assert_eq!(
        config.step.rotating_frame,
        Some(RotatingFrame::new(1.0).with_vertical_gravity())
    );
    assert_eq!(config.species[1].drag, DragLaw::Epstein { radius_density: 0.5 });

    let sim = config.build().unwrap();
    assert_eq!(sim.grid.domain_id, 3);
    assert_eq!(sim.grid.grain_count(), 2);
    assert_eq!(sim.grid.species[SpeciesId(1)].count, 1);
    assert_eq!(sim.grid.grains[1].velocity, Vector3::zeros());
    assert_relative_eq!(sim.grid.geometry.bounds.upper.x, 0.8, epsilon = 1e-12);
}

#[test]
fn test_defaults() {
    let config = SimulationConfig::from_yaml_str(MINIMAL).unwrap();

    assert_eq!(config.step, GrainConfig::default());
    assert_eq!(config.step.integrator, IntegratorKind::SemiImplicit);
    assert_eq!(config.grid.origin, [0.0; 3]);
    assert!(config.grains.is_empty());
    assert_eq!(config.build().unwrap().grid.time, 0.0);
}

#[test]
fn test_integrator_names() {
    for (name, kind) in [
        ("explicit", IntegratorKind::Explicit),
        ("semi_implicit", IntegratorKind::SemiImplicit),
        ("fully_implicit", IntegratorKind::FullyImplicit),
    ] {
        let yaml = format!("integrator: {name}\n{MINIMAL}");
        assert_eq!(SimulationConfig::from_yaml_str(&yaml).unwrap().step.integrator, kind);
    }
}

#[test]
fn test_custom_bounds() {
    let yaml = MINIMAL.replace(
        "time_step: 0.1\n",
        "time_step: 0.1\n  bounds: { lower: [0.0, 0.0, 0.0], upper: [1.0, 2.0, 2.0] }\n",
    );
    let geometry = SimulationConfig::from_yaml_str(&yaml).unwrap().grid.geometry().unwrap();
    assert_eq!(geometry.bounds.lower, Vector3::zeros());
    assert_eq!(geometry.bounds.upper, Vector3::new(1.0, 2.0, 2.0));
}

#[test]
fn test_fargo_needs_three_dimensions() {
    let yaml = SCENARIO.replace("fargo: false", "fargo: true");
    assert!(matches!(expect_err(&yaml), GrainError::FargoRequiresThreeDimensions));

    let yaml = format!("rotating_frame: {{ omega: 1.0, fargo: true }}\n{MINIMAL}");
    assert!(SimulationConfig::from_yaml_str(&yaml).unwrap().build().is_ok());
}

#[test]
fn test_invalid_rotation_rate() {
    let yaml = format!("rotating_frame: {{ omega: .nan }}\n{MINIMAL}");
    assert!(matches!(expect_err(&yaml), GrainError::InvalidRotationRate(_)));
}

#[test]
fn test_invalid_time_step() {
    let yaml = MINIMAL.replace("time_step: 0.1", "time_step: -0.1");
    assert!(matches!(expect_err(&yaml), GrainError::InvalidTimeStep(_)));
}

#[test]
fn test_invalid_grid() {
    let yaml = MINIMAL.replace("cells: [8, 8, 8]", "cells: [8, 0, 8]");
    assert!(matches!(expect_err(&yaml), GrainError::InvalidCells { axis: 1 }));

    let yaml = MINIMAL.replace("spacing: [0.25, 0.25, 0.25]", "spacing: [0.25, 0.25, 0.0]");
    assert!(matches!(expect_err(&yaml), GrainError::InvalidSpacing { axis: 2, .. }));
}

#[test]
fn test_invalid_species() {
    let yaml = MINIMAL.replace("mass: 1.0", "mass: 0.0");
    assert!(matches!(
        expect_err(&yaml),
        GrainError::InvalidMass { species: SpeciesId(0), .. }
    ));

    let yaml = MINIMAL.replace("stopping_time: 1.0", "stopping_time: -2.0");
    assert!(matches!(
        expect_err(&yaml),
        GrainError::InvalidStoppingTime { species: SpeciesId(0), .. }
    ));
}

#[test]
fn test_unknown_species_in_seed() {
    let yaml = format!("{MINIMAL}grains:\n  - position: [0.1, 0.1, 0.1]\n    species: 4\n");
    assert!(matches!(expect_err(&yaml), GrainError::UnknownSpecies(SpeciesId(4))));
}

#[test]
fn test_malformed_yaml() {
    assert!(matches!(expect_err("grid: [1, 2"), GrainError::Yaml(_)));
    assert!(matches!(expect_err("integrator: leapfrog\n"), GrainError::Yaml(_)));
}

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("grains_config_test_{}.yaml", std::process::id()));
    std::fs::write(&path, SCENARIO).unwrap();

    let config = SimulationConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.species.len(), 2);

    let missing = SimulationConfig::load(path.with_extension("missing"));
    assert!(matches!(missing, Err(GrainError::Io(_))));
}
