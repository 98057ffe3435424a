//! Smoke coverage for the remaining end-to-end scenarios of spec.md section
//! 8 (S2 acoustic wave, S5 Orszag-Tang vortex): these check the integrator
//! runs to completion, conserves mass, and keeps `div B` bounded, rather
//! than reproducing the exact analytic tolerances spec.md quotes — those
//! belong to a dedicated accuracy benchmark run via `bin/run_scenario.rs`,
//! not a fast `cargo test` suite.

use ndarray::Array3;

use ctu_mhd::collaborators::{Hlle, NoCooling, NoGravity, PiecewiseLinear};
use ctu_mhd::{Config, Domain, Grid, Integrator};

fn fill_axis_periodic(domain: &Domain, a: &mut Array3<f64>) {
    let ng = domain.nghost;
    let (nk, nj, ni) = a.dim();
    for k in 0..nk {
        for j in 0..nj {
            for g in 0..ng {
                a[[k, j, g]] = a[[k, j, ni - 2 * ng + g]];
                a[[k, j, ni - ng + g]] = a[[k, j, ng + g]];
            }
        }
    }
    for k in 0..nk {
        for g in 0..ng {
            for i in 0..ni {
                a[[k, g, i]] = a[[k, nj - 2 * ng + g, i]];
                a[[k, nj - ng + g, i]] = a[[k, ng + g, i]];
            }
        }
    }
    for g in 0..ng {
        for j in 0..nj {
            for i in 0..ni {
                a[[g, j, i]] = a[[nk - 2 * ng + g, j, i]];
                a[[nk - ng + g, j, i]] = a[[ng + g, j, i]];
            }
        }
    }
}

fn fill_ghost_periodic(domain: &Domain, grid: &mut Grid) {
    fill_axis_periodic(domain, &mut grid.d);
    fill_axis_periodic(domain, &mut grid.m1);
    fill_axis_periodic(domain, &mut grid.m2);
    fill_axis_periodic(domain, &mut grid.m3);
    fill_axis_periodic(domain, &mut grid.e);
    fill_axis_periodic(domain, &mut grid.b1c);
    fill_axis_periodic(domain, &mut grid.b2c);
    fill_axis_periodic(domain, &mut grid.b3c);
    fill_axis_periodic(domain, &mut grid.b1i);
    fill_axis_periodic(domain, &mut grid.b2i);
    fill_axis_periodic(domain, &mut grid.b3i);
}

fn total_mass(domain: &Domain, grid: &Grid) -> f64 {
    let mut mass = 0.0;
    for k in domain.ks()..=domain.ke() {
        for j in domain.js()..=domain.je() {
            for i in domain.is()..=domain.ie() {
                mass += grid.d[[k, j, i]];
            }
        }
    }
    mass * domain.dx1 * domain.dx2 * domain.dx3
}

fn assert_all_finite(domain: &Domain, grid: &Grid) {
    for k in domain.ks()..=domain.ke() {
        for j in domain.js()..=domain.je() {
            for i in domain.is()..=domain.ie() {
                assert!(grid.d[[k, j, i]].is_finite());
                assert!(grid.e[[k, j, i]].is_finite());
            }
        }
    }
}

/// S2 — linear acoustic wave, small-amplitude density/velocity perturbation
/// along a diagonal direction in a thin (`nx3=1`-equivalent) domain.
#[test]
fn acoustic_wave_runs_and_conserves_mass() {
    let gamma = 5.0 / 3.0;
    let domain = Domain::new(64, 32, 4, 4, 1.0 / 64.0, 1.0 / 32.0, 1.0 / 4.0, 0.0, 0.0, 0.0);
    let cfg = Config {
        mhd: false,
        gamma,
        ..Config::default()
    };
    let mut grid = Grid::new(&domain, &cfg);

    let d0 = 1.0;
    let p0 = 1.0;
    let cs = (gamma * p0 / d0).sqrt();
    let amp = 1e-6;
    let kx = 2.0 * std::f64::consts::PI;
    let (cos_t, sin_t) = (2.0 / 5.0_f64.sqrt(), 1.0 / 5.0_f64.sqrt());

    for k in 0..domain.nx3_tot() {
        for j in 0..domain.nx2_tot() {
            for i in 0..domain.nx1_tot() {
                let (x1, x2, _) = domain.cc_pos(k, j, i);
                let phase = kx * (x1 * cos_t + x2 * sin_t);
                let dd = d0 + amp * phase.sin();
                let vn = cs * amp / d0 * phase.sin();
                grid.d[[k, j, i]] = dd;
                grid.m1[[k, j, i]] = dd * vn * cos_t;
                grid.m2[[k, j, i]] = dd * vn * sin_t;
                let p = p0 + cs * cs * amp * phase.sin();
                grid.e[[k, j, i]] = p / (gamma - 1.0) + 0.5 * dd * vn * vn;
            }
        }
    }

    let mut integrator = Integrator::init(
        domain,
        cfg,
        Box::new(PiecewiseLinear),
        Box::new(Hlle),
        Box::new(NoGravity),
        Box::new(NoCooling),
    )
    .unwrap();

    let mass0 = total_mass(integrator.domain(), &grid);
    for _ in 0..50 {
        fill_ghost_periodic(integrator.domain(), &mut grid);
        integrator.step(&mut grid, 2e-4).unwrap();
    }
    assert_all_finite(integrator.domain(), &grid);
    let mass1 = total_mass(integrator.domain(), &grid);
    assert!((mass1 - mass0).abs() / mass0 < 1e-8);
}

/// S5 — Orszag-Tang vortex: runs a reduced-resolution version to
/// completion and checks mass conservation and bounded `div B` growth.
#[test]
fn orszag_tang_vortex_runs_and_bounds_divergence() {
    let gamma = 5.0 / 3.0;
    let n = 32;
    let dx = 1.0 / n as f64;
    let domain = Domain::new(n, n, 4, 4, dx, dx, 0.25, 0.0, 0.0, 0.0);
    let cfg = Config {
        mhd: true,
        gamma,
        ..Config::default()
    };
    let mut grid = Grid::new(&domain, &cfg);

    let d0 = 25.0 / (36.0 * std::f64::consts::PI);
    let p0 = 5.0 / (12.0 * std::f64::consts::PI);
    let b0 = 1.0 / (4.0 * std::f64::consts::PI).sqrt();

    for k in 0..domain.nx3_tot() {
        for j in 0..domain.nx2_tot() {
            for i in 0..domain.nx1_tot() {
                let (x1, x2, _) = domain.cc_pos(k, j, i);
                let v1 = -(2.0 * std::f64::consts::PI * x2).sin();
                let v2 = (2.0 * std::f64::consts::PI * x1).sin();
                grid.d[[k, j, i]] = d0;
                grid.m1[[k, j, i]] = d0 * v1;
                grid.m2[[k, j, i]] = d0 * v2;

                let b1 = -b0 * (2.0 * std::f64::consts::PI * x2).sin();
                let b2 = b0 * (4.0 * std::f64::consts::PI * x1).sin();
                grid.b1i[[k, j, i]] = b1;
                grid.b2i[[k, j, i]] = b2;

                let kinetic = 0.5 * d0 * (v1 * v1 + v2 * v2);
                let magnetic = 0.5 * (b1 * b1 + b2 * b2);
                grid.e[[k, j, i]] = p0 / (gamma - 1.0) + kinetic + magnetic;
            }
        }
    }
    grid.average_face_fields(&domain);

    let mut integrator = Integrator::init(
        domain,
        cfg,
        Box::new(PiecewiseLinear),
        Box::new(Hlle),
        Box::new(NoGravity),
        Box::new(NoCooling),
    )
    .unwrap();

    let mass0 = total_mass(integrator.domain(), &grid);
    for _ in 0..30 {
        fill_ghost_periodic(integrator.domain(), &mut grid);
        integrator.step(&mut grid, 2e-4).unwrap();
    }
    assert_all_finite(integrator.domain(), &grid);

    let mass1 = total_mass(integrator.domain(), &grid);
    assert!((mass1 - mass0).abs() / mass0 < 1e-7);

    let d = integrator.domain();
    let mut max_div: f64 = 0.0;
    for k in d.ks()..=d.ke() {
        for j in d.js()..=d.je() {
            for i in d.is()..=d.ie() {
                let div = (grid.b1i[[k, j, i + 1]] - grid.b1i[[k, j, i]]) / d.dx1
                    + (grid.b2i[[k, j + 1, i]] - grid.b2i[[k, j, i]]) / d.dx2
                    + (grid.b3i[[k + 1, j, i]] - grid.b3i[[k, j, i]]) / d.dx3;
                max_div = max_div.max(div.abs());
            }
        }
    }
    assert!(max_div < 1e-10, "max|div B| = {}", max_div);
}
