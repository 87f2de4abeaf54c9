use approx::assert_relative_eq;
use nalgebra::Vector3;

use super::{ImplicitMatrix, IntegratorKind, StepReport};
use crate::config::{GrainConfig, RotatingFrame};
use crate::gas::{DragLaw, GasState, MeshGas, SpeciesDragLaw, StoppingTime};
use crate::grain::{Grain, GrainStatus, Species, SpeciesId};
use crate::grid::{Geometry, Grid};

const ALL_KINDS: [IntegratorKind; 3] = [
    IntegratorKind::Explicit,
    IntegratorKind::SemiImplicit,
    IntegratorKind::FullyImplicit,
];

/// Infinite stopping time: grains ignore the gas
struct Decoupled;

impl StoppingTime for Decoupled {
    fn stopping_time(&self, _species: &Species, _density: f64, _sound_speed: f64, _relative_speed: f64) -> f64 {
        f64::INFINITY
    }
}

/// Active axes span [-1, 1); a collapsed axis spans [0, 0.125)
fn make_grid(cells: [usize; 3], dt: f64) -> Grid {
    let spacing = cells.map(|n| if n > 1 { 2.0 / n as f64 } else { 0.125 });
    let origin = cells.map(|n| if n > 1 { -1.0 } else { 0.0 });
    let geometry = Geometry::new(cells, spacing, origin).unwrap();
    let mut grid = Grid::new(geometry, dt).unwrap();
    grid.add_species(Species::new(0.01, DragLaw::Fixed { stopping_time: 0.5 }));
    grid
}

fn make_gas(grid: &Grid, velocity: Vector3<f64>) -> MeshGas {
    MeshGas::uniform(grid.layout(), GasState::new(1.0, velocity, 1.0))
}

fn add(grid: &mut Grid, position: Vector3<f64>, velocity: Vector3<f64>) -> usize {
    grid.add_grain(Grain::new(position, velocity, SpeciesId(0))).unwrap()
}

fn step_decoupled(kind: IntegratorKind, grid: &mut Grid, config: &GrainConfig) -> StepReport {
    let gas = make_gas(grid, Vector3::zeros());
    kind.integrate(grid, config, &gas, &Decoupled)
}

#[test]
fn test_force_free_drift() {
    for kind in ALL_KINDS {
        let mut grid = make_grid([16, 16, 1], 0.1);
        add(&mut grid, Vector3::new(0.1, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));

        let report = step_decoupled(kind, &mut grid, &GrainConfig::new(kind));

        let grain = grid.grains[0];
        assert_relative_eq!(grain.position.x, 0.2, epsilon = 1e-12);
        assert_eq!(grain.velocity, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(grain.status, GrainStatus::Resident);
        assert_eq!(report, StepReport { ghosts_removed: 0, grains: 1, crossing: 0, out_of_domain: 0 });
    }
}

#[test]
fn test_collapsed_axis_does_not_move() {
    for kind in ALL_KINDS {
        let mut grid = make_grid([16, 16, 1], 0.1);
        add(&mut grid, Vector3::new(0.0, 0.0, 0.05), Vector3::new(0.5, 0.5, 3.0));

        step_decoupled(kind, &mut grid, &GrainConfig::new(kind));

        let grain = grid.grains[0];
        assert_eq!(grain.position.z, 0.05);
        assert_relative_eq!(grain.position.y, 0.05, epsilon = 1e-12);
    }
}

#[test]
fn test_upper_bound_is_outside() {
    for kind in ALL_KINDS {
        let mut grid = make_grid([16, 16, 1], 0.25);
        add(&mut grid, Vector3::new(0.5, 0.0, 0.0), Vector3::new(2.0, 0.0, 0.0));
        add(&mut grid, Vector3::new(0.5, 0.0, 0.0), Vector3::new(-2.0, 0.0, 0.0));

        let report = step_decoupled(kind, &mut grid, &GrainConfig::new(kind));

        assert_eq!(grid.grains[0].position.x, 1.0);
        assert_eq!(grid.grains[0].status, GrainStatus::Crossing);
        assert_eq!(grid.grains[1].position.x, 0.0);
        assert_eq!(grid.grains[1].status, GrainStatus::Resident);
        assert_eq!(report.crossing, 1);
    }
}

#[test]
fn test_lower_bound_is_inside() {
    let mut grid = make_grid([16, 16, 1], 0.25);
    add(&mut grid, Vector3::new(-0.5, 0.0, 0.0), Vector3::new(-2.0, 0.0, 0.0));
    add(&mut grid, Vector3::new(0.0, -0.5, 0.0), Vector3::new(0.0, -2.5, 0.0));

    let kind = IntegratorKind::SemiImplicit;
    step_decoupled(kind, &mut grid, &GrainConfig::new(kind));

    assert_eq!(grid.grains[0].position.x, -1.0);
    assert_eq!(grid.grains[0].status, GrainStatus::Resident);
    assert_eq!(grid.grains[1].status, GrainStatus::Crossing);
}

#[test]
fn test_crossing_is_never_reset() {
    let mut grid = make_grid([16, 16, 1], 0.1);
    let idx = add(&mut grid, Vector3::new(0.9, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0));
    grid.grains[idx].status = GrainStatus::Crossing;

    let kind = IntegratorKind::Explicit;
    let report = step_decoupled(kind, &mut grid, &GrainConfig::new(kind));

    assert_eq!(grid.grains[idx].status, GrainStatus::Crossing);
    assert_eq!(report.crossing, 0);
}

#[test]
fn test_ghosts_compacted_before_step() {
    let mut grid = make_grid([16, 16, 1], 0.1);
    let ghost = add(&mut grid, Vector3::zeros(), Vector3::zeros());
    add(&mut grid, Vector3::new(0.3, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    grid.grains[ghost].status = GrainStatus::Ghost;

    let kind = IntegratorKind::FullyImplicit;
    let report = step_decoupled(kind, &mut grid, &GrainConfig::new(kind));

    assert_eq!(report.ghosts_removed, 1);
    assert_eq!(report.grains, 1);
    assert_eq!(grid.species[SpeciesId(0)].count, 1);
    // The surviving grain moved into slot 0 and was stepped
    assert_relative_eq!(grid.grains[0].position.x, 0.4, epsilon = 1e-12);
}

#[test]
fn test_fargo_exempts_azimuthal_axis() {
    let fargo = GrainConfig::default().with_rotating_frame(RotatingFrame::new(0.0).with_fargo());
    let plain = GrainConfig::default().with_rotating_frame(RotatingFrame::new(0.0));

    for config in [fargo, plain] {
        let mut grid = make_grid([8, 8, 8], 0.25);
        add(&mut grid, Vector3::new(0.0, 0.9, 0.0), Vector3::new(0.0, 1.0, 0.0));
        add(&mut grid, Vector3::new(0.9, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));

        step_decoupled(config.integrator, &mut grid, &config);

        assert_relative_eq!(grid.grains[0].position.y, 1.15, epsilon = 1e-12);
        assert_eq!(grid.grains[0].is_crossing(), config == plain);
        assert!(grid.grains[1].is_crossing());
    }
}

#[test]
fn test_fargo_records_azimuthal_shift() {
    let config = GrainConfig::default().with_rotating_frame(RotatingFrame::new(1.0).with_fargo());
    let mut grid = make_grid([8, 8, 8], 0.1);
    add(&mut grid, Vector3::new(0.2, 0.0, 0.0), Vector3::zeros());

    step_decoupled(config.integrator, &mut grid, &config);

    // At rest there is no Coriolis force, so x1 stays put
    let grain = grid.grains[0];
    assert_relative_eq!(grain.position.x, 0.2, epsilon = 1e-12);
    assert_relative_eq!(grain.shift, -0.75 * 1.0 * 0.4 * 0.1, epsilon = 1e-12);
}

#[test]
fn test_no_shift_without_fargo() {
    let config = GrainConfig::default().with_rotating_frame(RotatingFrame::new(1.0));
    let mut grid = make_grid([8, 8, 8], 0.1);
    add(&mut grid, Vector3::new(0.2, 0.0, 0.0), Vector3::zeros());

    step_decoupled(config.integrator, &mut grid, &config);

    assert_eq!(grid.grains[0].shift, 0.0);
}

#[test]
fn test_half_step_position_under_every_feature_combination() {
    let frames = [
        None,
        Some(RotatingFrame::new(1.0)),
        Some(RotatingFrame::new(1.0).with_vertical_gravity()),
        Some(RotatingFrame::new(1.0).with_fargo()),
        Some(RotatingFrame::new(1.0).with_fargo().with_vertical_gravity()),
    ];

    for cells in [[8, 8, 8], [8, 8, 1]] {
        for kind in ALL_KINDS {
            for frame in frames {
                for feedback in [false, true] {
                    let mut config = GrainConfig::new(kind);
                    config.feedback = feedback;
                    config.rotating_frame = frame;

                    let mut grid = make_grid(cells, 0.02);
                    if config.validate(&grid.geometry).is_err() {
                        continue;
                    }

                    let z = if cells[2] > 1 { 0.15 } else { 0.0 };
                    let before = Grain::new(Vector3::new(0.1, -0.2, z), Vector3::new(0.3, -0.1, 0.2), SpeciesId(0));
                    grid.add_grain(before).unwrap();
                    let gas = make_gas(&grid, Vector3::new(0.05, 0.0, -0.02));

                    kind.integrate(&mut grid, &config, &gas, &SpeciesDragLaw);

                    let after = grid.grains[0];
                    for a in 0..3 {
                        let expected = if grid.geometry.is_active(a) {
                            before.position[a] + 0.5 * 0.02 * (before.velocity[a] + after.velocity[a])
                        } else {
                            before.position[a]
                        };
                        assert_relative_eq!(after.position[a], expected, epsilon = 1e-14);
                    }
                    assert_ne!(after.velocity, before.velocity);
                }
            }
        }
    }
}

#[test]
fn test_flat_sheet_vertical_axis_is_decoupled_from_rotation() {
    for kind in ALL_KINDS {
        let mut velocities = Vec::new();
        for frame in [None, Some(RotatingFrame::new(1.0))] {
            let mut config = GrainConfig::new(kind);
            config.rotating_frame = frame;

            let mut grid = make_grid([16, 16, 1], 0.01);
            add(&mut grid, Vector3::new(0.25, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
            let gas = make_gas(&grid, Vector3::zeros());

            kind.integrate(&mut grid, &config, &gas, &SpeciesDragLaw);
            velocities.push(grid.grains[0].velocity);
        }

        assert_relative_eq!(velocities[0].y, velocities[1].y, epsilon = 1e-14);
        // Rotation does act in the orbital plane
        assert!(velocities[1].x > 0.0);
        assert_eq!(velocities[0].x, 0.0);
    }
}

#[test]
fn test_flat_sheet_decoupled_axis_scalar_update() {
    let dt = 0.01;
    let frame = RotatingFrame::new(1.0);

    for kind in ALL_KINDS {
        let mut grid = make_grid([16, 16, 1], dt);
        add(&mut grid, Vector3::zeros(), Vector3::new(0.0, 1.0, 0.0));
        let gas = make_gas(&grid, Vector3::zeros());

        let config = GrainConfig::new(kind).with_rotating_frame(frame);
        kind.integrate(&mut grid, &config, &gas, &SpeciesDragLaw);

        // t_s = 0.5, so the drag is -2 v and no other force acts on x2
        let ts1 = 2.0;
        let expected = match kind {
            IntegratorKind::Explicit => dt * -ts1 * (1.0 - 0.5 * dt * ts1),
            IntegratorKind::SemiImplicit => 2.0 * dt * -ts1 / (dt * ts1 + 2.0),
            IntegratorKind::FullyImplicit => {
                let m = ImplicitMatrix::new(dt, ts1, ts1, Some(&frame));
                let f = 0.5 * (-ts1 + (1.0 + dt * ts1) * -ts1);
                dt * f / m.d
            }
        };

        let grain = grid.grains[0];
        assert_relative_eq!(grain.velocity.y - 1.0, expected, epsilon = 1e-14);
        assert_eq!(grain.velocity.x, 0.0);
        assert_eq!(grain.velocity.z, 0.0);
        assert_eq!(grain.position.x, 0.0);
    }
}

#[test]
fn test_out_of_domain_drag_is_counted() {
    let mut grid = make_grid([16, 16, 1], 0.01);
    add(&mut grid, Vector3::new(0.99, 0.0, 0.0), Vector3::new(30.0, 0.0, 0.0));
    add(&mut grid, Vector3::zeros(), Vector3::zeros());
    let gas = make_gas(&grid, Vector3::zeros());

    let kind = IntegratorKind::Explicit;
    let report = kind.integrate(&mut grid, &GrainConfig::new(kind), &gas, &SpeciesDragLaw);

    // Only the fast grain's half-step point is past the ghost layers
    assert_eq!(report.out_of_domain, 1);
    assert_eq!(report.crossing, 1);
}

#[test]
fn test_feedback_disabled_leaves_accumulator_alone() {
    let mut grid = make_grid([16, 16, 1], 0.01);
    add(&mut grid, Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0));
    let stencil = crate::grid::Stencil::at(&grid.geometry, &Vector3::new(0.5, 0.5, 0.0));
    grid.feedback.deposit(&stencil, &Vector3::new(7.0, 0.0, 0.0));

    let gas = make_gas(&grid, Vector3::zeros());
    let kind = IntegratorKind::SemiImplicit;
    kind.integrate(&mut grid, &GrainConfig::new(kind), &gas, &SpeciesDragLaw);

    assert_relative_eq!(grid.feedback.total().x, 7.0, epsilon = 1e-12);
}
