//! The final conservative update (spec section 4.8): applies the
//! divergence of the three final fluxes to every active cell, then
//! rebuilds the cell-centered field average from the just-updated
//! face-centered state. Must run last.

use crate::config::Config;
use crate::grid::{Domain, Grid};
use crate::scratch::ScratchSpace;

pub fn conservative_update(dt: f64, grid: &mut Grid, domain: &Domain, scratch: &ScratchSpace, cfg: &Config) {
    let dtodx1 = dt / domain.dx1;
    let dtodx2 = dt / domain.dx2;
    let dtodx3 = dt / domain.dx3;

    for k in domain.ks()..=domain.ke() {
        for j in domain.js()..=domain.je() {
            for i in domain.is()..=domain.ie() {
                let fx_lo = scratch.x1_flux[[k, j, i]];
                let fx_hi = scratch.x1_flux[[k, j, i + 1]];
                let fy_lo = scratch.x2_flux[[k, j, i]];
                let fy_hi = scratch.x2_flux[[k, j + 1, i]];
                let fz_lo = scratch.x3_flux[[k, j, i]];
                let fz_hi = scratch.x3_flux[[k + 1, j, i]];

                grid.d[[k, j, i]] -= dtodx1 * (fx_hi.d - fx_lo.d)
                    + dtodx2 * (fy_hi.d - fy_lo.d)
                    + dtodx3 * (fz_hi.d - fz_lo.d);

                // x1Flux carries (Mx,My,Mz) = (M1,M2,M3); x2Flux carries
                // (M2,M3,M1); x3Flux carries (M3,M1,M2) — undo each
                // direction's permutation before accumulating into the
                // global momentum components.
                let (fx1, fx2, fx3) = (fx_hi.mx - fx_lo.mx, fx_hi.my - fx_lo.my, fx_hi.mz - fx_lo.mz);
                let (fy2, fy3, fy1) = (fy_hi.mx - fy_lo.mx, fy_hi.my - fy_lo.my, fy_hi.mz - fy_lo.mz);
                let (fz3, fz1, fz2) = (fz_hi.mx - fz_lo.mx, fz_hi.my - fz_lo.my, fz_hi.mz - fz_lo.mz);

                grid.m1[[k, j, i]] -= dtodx1 * fx1 + dtodx2 * fy1 + dtodx3 * fz1;
                grid.m2[[k, j, i]] -= dtodx1 * fx2 + dtodx2 * fy2 + dtodx3 * fz2;
                grid.m3[[k, j, i]] -= dtodx1 * fx3 + dtodx2 * fy3 + dtodx3 * fz3;

                if !cfg.barotropic {
                    grid.e[[k, j, i]] -= dtodx1 * (fx_hi.e - fx_lo.e)
                        + dtodx2 * (fy_hi.e - fy_lo.e)
                        + dtodx3 * (fz_hi.e - fz_lo.e);
                }

                for n in 0..cfg.nscalars {
                    grid.s[n][[k, j, i]] -= dtodx1 * (fx_hi.s[n] - fx_lo.s[n])
                        + dtodx2 * (fy_hi.s[n] - fy_lo.s[n])
                        + dtodx3 * (fz_hi.s[n] - fz_lo.s[n]);
                }

                if cfg.self_gravity {
                    if let Some(mf) = grid.x1_mass_flux.as_mut() {
                        mf[[k, j, i]] = fx_lo.d;
                    }
                    if let Some(mf) = grid.x2_mass_flux.as_mut() {
                        mf[[k, j, i]] = fy_lo.d;
                    }
                    if let Some(mf) = grid.x3_mass_flux.as_mut() {
                        mf[[k, j, i]] = fz_lo.d;
                    }
                }
            }
        }
    }

    if cfg.mhd {
        grid.average_face_fields(domain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Cons1D;

    #[test]
    fn uniform_flux_leaves_density_unchanged() {
        let domain = Domain::new(4, 4, 4, 2, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let cfg = Config {
            mhd: false,
            ..Config::default()
        };
        let mut grid = Grid::new(&domain, &cfg);
        grid.d.fill(1.0);
        grid.e.fill(2.5);
        let mut scratch = ScratchSpace::new(&domain);
        let u = Cons1D {
            d: 0.5,
            mx: 0.0,
            my: 0.0,
            mz: 0.0,
            e: 1.0,
            by: 0.0,
            bz: 0.0,
            s: [0.0; crate::config::MAX_NSCALARS],
        };
        scratch.x1_flux.fill(u);
        scratch.x2_flux.fill(u);
        scratch.x3_flux.fill(u);
        conservative_update(0.1, &mut grid, &domain, &scratch, &cfg);
        let (k, j, i) = (domain.ks(), domain.js(), domain.is());
        assert!((grid.d[[k, j, i]] - 1.0).abs() < 1e-12);
    }
}
