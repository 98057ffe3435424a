//! Corner electric field reconstruction (spec section 4.2): combines the
//! upwind face fluxes with cell-centered EMFs into the single-valued corner
//! EMF that drives the CT update.
//!
//! Each corner EMF is built from two pairs of "de" terms, one pair per
//! transverse axis, each upwound independently by the sign of the local mass
//! flux (Gardiner & Stone 2005's four-way upwind blend) rather than averaged
//! together — the two members of a pair read the cell-centered EMF on
//! opposite sides of the edge, so collapsing them loses the upwind bias the
//! scheme depends on.

use ndarray::Array3;

use crate::grid::{Domain, Grid};
use crate::scratch::ScratchSpace;

/// Cell-centered EMF `dir` = `(B x v)_dir / d`, evaluated from whichever
/// cell-centered state the caller passes in (spec section 3.1's resolution
/// of Open Question (c): the initial state feeds the half-step CT update,
/// the half-step predictor state feeds the full-step CT update).
#[allow(clippy::too_many_arguments)]
pub fn cell_centered_emf(
    d: &Array3<f64>,
    m1: &Array3<f64>,
    m2: &Array3<f64>,
    m3: &Array3<f64>,
    b1c: &Array3<f64>,
    b2c: &Array3<f64>,
    b3c: &Array3<f64>,
    domain: &Domain,
    emf1_cc: &mut Array3<f64>,
    emf2_cc: &mut Array3<f64>,
    emf3_cc: &mut Array3<f64>,
) {
    for k in domain.ks() - 2..=domain.ke() + 2 {
        for j in domain.js() - 2..=domain.je() + 2 {
            for i in domain.is() - 2..=domain.ie() + 2 {
                let dd = d[[k, j, i]];
                let (v1, v2, v3) = (m1[[k, j, i]] / dd, m2[[k, j, i]] / dd, m3[[k, j, i]] / dd);
                let (b1, b2, b3) = (b1c[[k, j, i]], b2c[[k, j, i]], b3c[[k, j, i]]);
                emf1_cc[[k, j, i]] = b2 * v3 - b3 * v2;
                emf2_cc[[k, j, i]] = b3 * v1 - b1 * v3;
                emf3_cc[[k, j, i]] = b1 * v2 - b2 * v1;
            }
        }
    }
}

/// Picks the upwind side of a `de` term by the sign of the mass flux that
/// gates it: positive favors `term_lo`, negative favors `term_hi`, zero
/// averages. Both `term_lo`/`term_hi` already have their cell-centered EMF
/// subtracted off by the caller.
fn upwind2(mass_flux: f64, term_lo: f64, term_hi: f64) -> f64 {
    if mass_flux > 0.0 {
        term_lo
    } else if mass_flux < 0.0 {
        term_hi
    } else {
        0.5 * (term_lo + term_hi)
    }
}

/// Reconstructs `emf1` at every corner `(k-1/2, j-1/2, i)`, per spec section
/// 4.2 and the reference `integrate_emf1_corner`. `x2Flux.By = -E1`,
/// `x3Flux.Bz = +E1`.
pub fn emf1_corner(grid: &Grid, domain: &Domain, scratch: &mut ScratchSpace) {
    let _ = grid;
    for k in domain.ks() - 1..=domain.ke() + 2 {
        for j in domain.js() - 1..=domain.je() + 2 {
            for i in domain.is() - 2..=domain.ie() + 2 {
                let x2f_km1 = scratch.x2_flux[[k - 1, j, i]];
                let x2f_k = scratch.x2_flux[[k, j, i]];
                let x3f_jm1 = scratch.x3_flux[[k, j - 1, i]];
                let x3f_j = scratch.x3_flux[[k, j, i]];

                let de1_l3 = upwind2(
                    x2f_km1.d,
                    x3f_jm1.bz - scratch.emf1_cc[[k - 1, j - 1, i]],
                    x3f_j.bz - scratch.emf1_cc[[k - 1, j, i]],
                );
                let de1_r3 = upwind2(
                    x2f_k.d,
                    x3f_jm1.bz - scratch.emf1_cc[[k, j - 1, i]],
                    x3f_j.bz - scratch.emf1_cc[[k, j, i]],
                );
                let de1_l2 = upwind2(
                    x3f_jm1.d,
                    -x2f_km1.by - scratch.emf1_cc[[k - 1, j - 1, i]],
                    -x2f_k.by - scratch.emf1_cc[[k, j - 1, i]],
                );
                let de1_r2 = upwind2(
                    x3f_j.d,
                    -x2f_km1.by - scratch.emf1_cc[[k - 1, j, i]],
                    -x2f_k.by - scratch.emf1_cc[[k, j, i]],
                );

                scratch.emf1[[k, j, i]] =
                    0.25 * (x3f_j.bz + x3f_jm1.bz - x2f_k.by - x2f_km1.by + de1_l2 + de1_r2 + de1_l3 + de1_r3);
            }
        }
    }
}

/// Reconstructs `emf2` at every corner `(k-1/2, j, i-1/2)`, cyclic successor
/// of [`emf1_corner`]. `x1Flux.Bz = +E2`, `x3Flux.By = -E2`.
pub fn emf2_corner(grid: &Grid, domain: &Domain, scratch: &mut ScratchSpace) {
    let _ = grid;
    for k in domain.ks() - 1..=domain.ke() + 2 {
        for j in domain.js() - 2..=domain.je() + 2 {
            for i in domain.is() - 1..=domain.ie() + 2 {
                let x1f_km1 = scratch.x1_flux[[k - 1, j, i]];
                let x1f_k = scratch.x1_flux[[k, j, i]];
                let x3f_im1 = scratch.x3_flux[[k, j, i - 1]];
                let x3f_i = scratch.x3_flux[[k, j, i]];

                let de2_l3 = upwind2(
                    x1f_km1.d,
                    -x3f_im1.by - scratch.emf2_cc[[k - 1, j, i - 1]],
                    -x3f_i.by - scratch.emf2_cc[[k - 1, j, i]],
                );
                let de2_r3 = upwind2(
                    x1f_k.d,
                    -x3f_im1.by - scratch.emf2_cc[[k, j, i - 1]],
                    -x3f_i.by - scratch.emf2_cc[[k, j, i]],
                );
                let de2_l1 = upwind2(
                    x3f_im1.d,
                    x1f_km1.bz - scratch.emf2_cc[[k - 1, j, i - 1]],
                    x1f_k.bz - scratch.emf2_cc[[k, j, i - 1]],
                );
                let de2_r1 = upwind2(
                    x3f_i.d,
                    x1f_km1.bz - scratch.emf2_cc[[k - 1, j, i]],
                    x1f_k.bz - scratch.emf2_cc[[k, j, i]],
                );

                scratch.emf2[[k, j, i]] =
                    0.25 * (x1f_k.bz + x1f_km1.bz - x3f_i.by - x3f_im1.by + de2_l1 + de2_r1 + de2_l3 + de2_r3);
            }
        }
    }
}

/// Reconstructs `emf3` at every corner `(k, j-1/2, i-1/2)`, cyclic successor
/// of [`emf2_corner`]. `x1Flux.By = -E3`, `x2Flux.Bz = +E3`.
pub fn emf3_corner(grid: &Grid, domain: &Domain, scratch: &mut ScratchSpace) {
    let _ = grid;
    for k in domain.ks() - 2..=domain.ke() + 2 {
        for j in domain.js() - 1..=domain.je() + 2 {
            for i in domain.is() - 1..=domain.ie() + 2 {
                let x1f_jm1 = scratch.x1_flux[[k, j - 1, i]];
                let x1f_j = scratch.x1_flux[[k, j, i]];
                let x2f_im1 = scratch.x2_flux[[k, j, i - 1]];
                let x2f_i = scratch.x2_flux[[k, j, i]];

                let de3_l2 = upwind2(
                    x1f_jm1.d,
                    x2f_im1.bz - scratch.emf3_cc[[k, j - 1, i - 1]],
                    x2f_i.bz - scratch.emf3_cc[[k, j - 1, i]],
                );
                let de3_r2 = upwind2(
                    x1f_j.d,
                    x2f_im1.bz - scratch.emf3_cc[[k, j, i - 1]],
                    x2f_i.bz - scratch.emf3_cc[[k, j, i]],
                );
                let de3_l1 = upwind2(
                    x2f_im1.d,
                    -x1f_jm1.by - scratch.emf3_cc[[k, j - 1, i - 1]],
                    -x1f_j.by - scratch.emf3_cc[[k, j, i - 1]],
                );
                let de3_r1 = upwind2(
                    x2f_i.d,
                    -x1f_jm1.by - scratch.emf3_cc[[k, j - 1, i]],
                    -x1f_j.by - scratch.emf3_cc[[k, j, i]],
                );

                scratch.emf3[[k, j, i]] =
                    0.25 * (x2f_im1.bz + x2f_i.bz - x1f_jm1.by - x1f_j.by + de3_l1 + de3_r1 + de3_l2 + de3_r2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn uniform_field_gives_uniform_cell_centered_emf() {
        let domain = Domain::new(4, 4, 4, 4, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let cfg = Config::default();
        let mut grid = Grid::new(&domain, &cfg);
        grid.d.fill(1.0);
        grid.m1.fill(0.0);
        grid.m2.fill(0.5);
        grid.m3.fill(0.0);
        grid.b1c.fill(1.0);
        let mut scratch = ScratchSpace::new(&domain);
        cell_centered_emf(
            &grid.d, &grid.m1, &grid.m2, &grid.m3, &grid.b1c, &grid.b2c, &grid.b3c, &domain,
            &mut scratch.emf1_cc, &mut scratch.emf2_cc, &mut scratch.emf3_cc,
        );
        let (k, j, i) = (domain.ks(), domain.js(), domain.is());
        // E3 = B1*v2 - B2*v1 = 1.0*0.5 - 0 = 0.5
        assert!((scratch.emf3_cc[[k, j, i]] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_fluxes_and_emf_give_zero_corner_emf() {
        let domain = Domain::new(4, 4, 4, 4, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let cfg = Config::default();
        let grid = Grid::new(&domain, &cfg);
        let mut scratch = ScratchSpace::new(&domain);
        emf1_corner(&grid, &domain, &mut scratch);
        emf2_corner(&grid, &domain, &mut scratch);
        emf3_corner(&grid, &domain, &mut scratch);
        let (k, j, i) = (domain.ks(), domain.js(), domain.is());
        assert_eq!(scratch.emf1[[k, j, i]], 0.0);
        assert_eq!(scratch.emf2[[k, j, i]], 0.0);
        assert_eq!(scratch.emf3[[k, j, i]], 0.0);
    }
}
