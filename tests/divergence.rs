//! Divergence-of-B preservation (spec.md section 8 / S4): a face-centered
//! field initialized from a corner-centered vector potential has exactly
//! zero discrete divergence, and the constrained-transport update keeps it
//! that way to roundoff for as many steps as the grid stays smooth.

use ndarray::Array3;

use ctu_mhd::collaborators::{Hlle, NoCooling, NoGravity, PiecewiseLinear};
use ctu_mhd::{Config, Domain, Grid, Integrator};

fn corner_pos(domain: &Domain, j: usize, i: usize) -> (f64, f64) {
    let x1 = domain.x1min + (i as f64 - domain.nghost as f64) * domain.dx1;
    let x2 = domain.x2min + (j as f64 - domain.nghost as f64) * domain.dx2;
    (x1, x2)
}

fn az(x1: f64, x2: f64, amplitude: f64) -> f64 {
    amplitude * (2.0 * std::f64::consts::PI * x1).cos() * (2.0 * std::f64::consts::PI * x2).sin()
}

/// Fills `grid.b1i`/`b2i` from a 2D corner-centered vector potential
/// `Az(x1,x2)` (so `b3i` stays zero), which makes the initial discrete
/// divergence exactly zero by construction.
fn init_divergence_free(domain: &Domain, grid: &mut Grid, amplitude: f64) {
    for k in 0..domain.nx3_tot() {
        for j in 0..domain.nx2_tot() - 1 {
            for i in 0..domain.nx1_tot() - 1 {
                let (x1_i, x2_j) = corner_pos(domain, j, i);
                let (_, x2_jp1) = corner_pos(domain, j + 1, i);
                let (x1_ip1, _) = corner_pos(domain, j, i + 1);

                grid.b1i[[k, j, i]] = (az(x1_i, x2_jp1, amplitude) - az(x1_i, x2_j, amplitude)) / domain.dx2;
                grid.b2i[[k, j, i]] = -(az(x1_ip1, x2_j, amplitude) - az(x1_i, x2_j, amplitude)) / domain.dx1;
            }
        }
    }
    grid.b3i.fill(0.0);
    grid.average_face_fields(domain);
}

fn max_divergence_b(domain: &Domain, grid: &Grid) -> f64 {
    let mut max_div: f64 = 0.0;
    for k in domain.ks()..=domain.ke() {
        for j in domain.js()..=domain.je() {
            for i in domain.is()..=domain.ie() {
                let div = (grid.b1i[[k, j, i + 1]] - grid.b1i[[k, j, i]]) / domain.dx1
                    + (grid.b2i[[k, j + 1, i]] - grid.b2i[[k, j, i]]) / domain.dx2
                    + (grid.b3i[[k + 1, j, i]] - grid.b3i[[k, j, i]]) / domain.dx3;
                max_div = max_div.max(div.abs());
            }
        }
    }
    max_div
}

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

#[test]
fn initial_field_is_divergence_free() {
    let domain = Domain::new(16, 16, 4, 4, 1.0 / 16.0, 1.0 / 16.0, 1.0 / 4.0, 0.0, 0.0, 0.0);
    let cfg = Config::default();
    let mut grid = Grid::new(&domain, &cfg);
    init_divergence_free(&domain, &mut grid, 0.1);
    fill_ghost_periodic(&domain, &mut grid);

    assert!(max_divergence_b(&domain, &grid) < 1e-12);
}

#[test]
fn ct_update_preserves_divergence_free_field() {
    let domain = Domain::new(16, 16, 4, 4, 1.0 / 16.0, 1.0 / 16.0, 1.0 / 4.0, 0.0, 0.0, 0.0);
    let cfg = Config::default();
    let mut grid = Grid::new(&domain, &cfg);
    grid.d.fill(1.0);
    grid.e.fill(2.5);
    grid.m1.fill(0.05);
    grid.m2.fill(-0.03);
    init_divergence_free(&domain, &mut grid, 0.05);

    let mut integrator = Integrator::init(
        domain,
        cfg,
        Box::new(PiecewiseLinear),
        Box::new(Hlle),
        Box::new(NoGravity),
        Box::new(NoCooling),
    )
    .unwrap();

    for _ in 0..20 {
        fill_ghost_periodic(integrator.domain(), &mut grid);
        integrator.step(&mut grid, 5e-4).unwrap();
    }

    let max_div = max_divergence_b(integrator.domain(), &grid);
    let b_max = grid
        .b1i
        .iter()
        .chain(grid.b2i.iter())
        .chain(grid.b3i.iter())
        .fold(0.0_f64, |m, &b| m.max(b.abs()));

    assert!(
        max_div * domain_dx(&integrator) / b_max < 1e-11,
        "max|div B| * dx / |B|_max = {}",
        max_div * domain_dx(&integrator) / b_max
    );
}

fn domain_dx(integrator: &Integrator) -> f64 {
    integrator.domain().dx1
}
