//! The directional Riemann sweep (spec section 4.1, steps 1-3): for each of
//! the three sweep axes, reconstructs interface states from the
//! cell-centered conserved state, folds in half-step source terms, and
//! resolves the flux with the Riemann-solver collaborator.
//!
//! The three sweeps share one engine parameterized by [`Direction`]: the
//! index permutation is the only thing that differs between them, and
//! [`Direction::compose`]/[`Direction::permute`] isolate exactly that (spec
//! section 9, "permutation-heavy arithmetic"). Keeping one engine instead of
//! three near-duplicated functions means a fix to the reconstruction or
//! source-injection logic can't silently drift out of sync between axes.

use crate::collaborators::{CoolingFunction, Reconstruction, RiemannSolver, StaticGravityPotential};
use crate::config::Config;
use crate::direction::Direction;
use crate::grid::{Domain, Grid};
use crate::scratch::ScratchSpace;
use crate::state::{cons1d_to_prim1d, prim1d_to_cons1d, Cons1D};

/// Cell-centered face-parallel field component at face `a-1/2` of the pencil
/// `(t1, t2)` along `dir`, read straight from the grid's face-centered
/// arrays (`b1i`/`b2i`/`b3i`) so the Riemann solver sees the CT-consistent
/// field rather than a cell-centered average.
fn face_bx(dir: Direction, grid: &Grid, t1: usize, t2: usize, a: usize) -> f64 {
    let (k, j, i) = dir.compose(a, t1, t2);
    match dir {
        Direction::X1 => grid.b1i[[k, j, i]],
        Direction::X2 => grid.b2i[[k, j, i]],
        Direction::X3 => grid.b3i[[k, j, i]],
    }
}

fn load_pencil(dir: Direction, grid: &Grid, cfg: &Config, t1: usize, t2: usize, n: usize) -> Vec<Cons1D> {
    let mut pencil = vec![Cons1D::default(); n];
    for a in 0..n {
        let (k, j, i) = dir.compose(a, t1, t2);
        let (mx, my, mz) = dir.permute((grid.m1[[k, j, i]], grid.m2[[k, j, i]], grid.m3[[k, j, i]]));
        let (_bx, by, bz) = dir.permute((grid.b1c[[k, j, i]], grid.b2c[[k, j, i]], grid.b3c[[k, j, i]]));
        let mut u = Cons1D {
            d: grid.d[[k, j, i]],
            mx,
            my,
            mz,
            e: grid.e[[k, j, i]],
            by: if cfg.mhd { by } else { 0.0 },
            bz: if cfg.mhd { bz } else { 0.0 },
            s: [0.0; crate::config::MAX_NSCALARS],
        };
        for sc in 0..cfg.nscalars {
            u.s[sc] = grid.s[sc][[k, j, i]];
        }
        pencil[a] = u;
    }
    pencil
}

/// Runs one directional sweep, writing resolved fluxes into the scratch
/// flux array for `dir` and the half-step face field for `dir` (spec
/// section 4.1's `GET_FLUXES` plus the MHD `db1` half-step CT seed).
#[allow(clippy::too_many_arguments)]
pub fn run_sweep(
    dir: Direction,
    dt: f64,
    grid: &Grid,
    domain: &Domain,
    scratch: &mut ScratchSpace,
    cfg: &Config,
    recon: &dyn Reconstruction,
    riemann: &dyn RiemannSolver,
    gravity: &dyn StaticGravityPotential,
    cooling: &dyn CoolingFunction,
) -> crate::errors::Result<()> {
    let (nt1, nt2, na, dx) = match dir {
        Direction::X1 => (domain.nx3_tot(), domain.nx2_tot(), domain.nx1_tot(), domain.dx1),
        Direction::X2 => (domain.nx3_tot(), domain.nx1_tot(), domain.nx2_tot(), domain.dx2),
        Direction::X3 => (domain.nx2_tot(), domain.nx1_tot(), domain.nx3_tot(), domain.dx3),
    };
    let dtodx = dt / dx;

    for t1 in 1..nt1 - 1 {
        for t2 in 1..nt2 - 1 {
            let pencil = load_pencil(dir, grid, cfg, t1, t2, na);
            let w: Vec<_> = pencil
                .iter()
                .enumerate()
                .map(|(a, u)| cons1d_to_prim1d(u, face_bx(dir, grid, t1, t2, a), cfg))
                .collect();

            for a in 2..na - 1 {
                let bx = face_bx(dir, grid, t1, t2, a);
                let stencil = [w[a - 2], w[a - 1], w[a], w[a + 1]];
                let (mut wl, mut wr) = recon.reconstruct(&stencil, bx, dtodx, cfg);

                apply_half_step_sources(dir, grid, domain, dt, t1, t2, a, cfg, gravity, cooling, &w, &mut wl, &mut wr);

                let ul = prim1d_to_cons1d(&wl, bx, cfg);
                let ur = prim1d_to_cons1d(&wr, bx, cfg);
                let etah = scratch_etah(dir, scratch, t1, t2, a);
                let flux = riemann.solve(&ul, &ur, bx, etah, cfg);

                let (k, j, i) = dir.compose(a, t1, t2);
                match dir {
                    Direction::X1 => {
                        scratch.x1_flux[[k, j, i]] = flux;
                        scratch.x1_ul[[k, j, i]] = ul;
                        scratch.x1_ur[[k, j, i]] = ur;
                    }
                    Direction::X2 => {
                        scratch.x2_flux[[k, j, i]] = flux;
                        scratch.x2_ul[[k, j, i]] = ul;
                        scratch.x2_ur[[k, j, i]] = ur;
                    }
                    Direction::X3 => {
                        scratch.x3_flux[[k, j, i]] = flux;
                        scratch.x3_ul[[k, j, i]] = ul;
                        scratch.x3_ur[[k, j, i]] = ur;
                    }
                }
            }
        }
    }
    Ok(())
}

fn scratch_etah(dir: Direction, scratch: &ScratchSpace, t1: usize, t2: usize, a: usize) -> f64 {
    let (k, j, i) = dir.compose(a, t1, t2);
    match dir {
        Direction::X1 => scratch.eta1[[k, j, i]],
        Direction::X2 => scratch.eta2[[k, j, i]],
        Direction::X3 => scratch.eta3[[k, j, i]],
    }
}

/// The three face-centered divergence components `(db1, db2, db3)` at cell
/// `(k, j, i)`, from the face fields bracketing that cell along each axis.
/// Shared with [`crate::transverse`]'s "MHD source terms" (spec section
/// 4.4), which consume the identical divergence at the same, still-`t^n`
/// face fields (the half-step CT update writes into scratch, not
/// `grid.b1i`/`b2i`/`b3i`, so both call sites see the same values).
pub(crate) fn divb_components(grid: &Grid, domain: &Domain, k: usize, j: usize, i: usize) -> (f64, f64, f64) {
    let db1 = (grid.b1i[[k, j, i + 1]] - grid.b1i[[k, j, i]]) / domain.dx1;
    let db2 = (grid.b2i[[k, j + 1, i]] - grid.b2i[[k, j, i]]) / domain.dx2;
    let db3 = (grid.b3i[[k + 1, j, i]] - grid.b3i[[k, j, i]]) / domain.dx3;
    (db1, db2, db3)
}

/// `clamp_toward_zero(a, -db_t)` of spec section 4.1 step 4: picks the
/// smaller-magnitude of `a` and `-db_t` on the side matching the sign of
/// `a`, and zero otherwise.
fn clamp_toward_zero(a: f64, neg_db_t: f64) -> f64 {
    if a >= 0.0 {
        a.min(neg_db_t).max(0.0)
    } else {
        a.max(neg_db_t).min(0.0)
    }
}

/// The `(MHD_src_By, MHD_src_Bz)` pair of spec section 4.1 step 4 at cell
/// `(k, j, i)`, in the direction-local `By`/`Bz` ordering for `dir`.
fn mhd_half_step_source(dir: Direction, grid: &Grid, domain: &Domain, k: usize, j: usize, i: usize) -> (f64, f64) {
    let (db1, db2, db3) = divb_components(grid, domain, k, j, i);
    let d = grid.d[[k, j, i]];
    let (m1, m2, m3) = (grid.m1[[k, j, i]], grid.m2[[k, j, i]], grid.m3[[k, j, i]]);
    match dir {
        Direction::X1 => {
            let l2 = clamp_toward_zero(db1, -db2);
            let l3 = clamp_toward_zero(db1, -db3);
            (m2 / d * l2, m3 / d * l3)
        }
        Direction::X2 => {
            let l3 = clamp_toward_zero(db2, -db3);
            let l1 = clamp_toward_zero(db2, -db1);
            (m3 / d * l3, m1 / d * l1)
        }
        Direction::X3 => {
            let l1 = clamp_toward_zero(db3, -db1);
            let l2 = clamp_toward_zero(db3, -db2);
            (m1 / d * l1, m2 / d * l2)
        }
    }
}

/// Folds the half-step MHD-divergence, static-gravity, cooling and
/// shearing-box source terms into the reconstructed interface states (spec
/// section 4.1 steps 4-7, applied to `Wl`/`Wr` before the Riemann solve).
#[allow(clippy::too_many_arguments)]
fn apply_half_step_sources(
    dir: Direction,
    grid: &Grid,
    domain: &Domain,
    dt: f64,
    t1: usize,
    t2: usize,
    a: usize,
    cfg: &Config,
    gravity: &dyn StaticGravityPotential,
    cooling: &dyn CoolingFunction,
    w: &[crate::state::Prim1D],
    wl: &mut crate::state::Prim1D,
    wr: &mut crate::state::Prim1D,
) {
    let (k0, j0, i0) = dir.compose(a - 1, t1, t2);
    let (k1, j1, i1) = dir.compose(a, t1, t2);
    let half_dt = 0.5 * dt;

    if cfg.mhd {
        let (by_l, bz_l) = mhd_half_step_source(dir, grid, domain, k0, j0, i0);
        wl.by += half_dt * by_l;
        wl.bz += half_dt * bz_l;
        let (by_r, bz_r) = mhd_half_step_source(dir, grid, domain, k1, j1, i1);
        wr.by += half_dt * by_r;
        wr.bz += half_dt * bz_r;
    }

    // spec section 4.1 step 5: phicl/phifc/phicr at cell-left, face, and
    // cell-right along the sweep axis, not a single centered difference --
    // the left and right interface states see different potential jumps.
    let (xl1, xl2, xl3) = domain.cc_pos(k0, j0, i0);
    let (xr1, xr2, xr3) = domain.cc_pos(k1, j1, i1);
    let (xf1, xf2, xf3) = (0.5 * (xl1 + xr1), 0.5 * (xl2 + xr2), 0.5 * (xl3 + xr3));
    let phicl = gravity.potential(xl1, xl2, xl3);
    let phicr = gravity.potential(xr1, xr2, xr3);
    let phifc = gravity.potential(xf1, xf2, xf3);
    let dtodx = dt / dir.dx(domain.dx1, domain.dx2, domain.dx3);

    wl.vx -= dtodx * (phifc - phicl);
    wr.vx -= dtodx * (phicr - phifc);

    if cfg.self_gravity {
        if let Some(phi) = &grid.phi {
            let dphi = phi[[k1, j1, i1]] - phi[[k0, j0, i0]];
            let term = 0.5 * dtodx * dphi;
            wl.vx -= term;
            wr.vx -= term;
        }
    }

    if !cfg.barotropic {
        let coolf_l = cooling.cooling_rate(wl.d, wl.p, half_dt);
        let coolf_r = cooling.cooling_rate(wr.d, wr.p, half_dt);
        wl.p -= half_dt * (cfg.gamma - 1.0) * coolf_l;
        wr.p -= half_dt * (cfg.gamma - 1.0) * coolf_r;
    }

    if cfg.shearing_box {
        let wlm1 = &w[a - 1];
        let wa = &w[a];
        wl.vx += dt * cfg.omega * wlm1.vy;
        if cfg.fargo {
            wl.vy -= 0.25 * dt * cfg.omega * wlm1.vx;
        } else {
            wl.vy -= dt * cfg.omega * wlm1.vx;
        }
        wr.vx += dt * cfg.omega * wa.vy;
        if cfg.fargo {
            wr.vy -= 0.25 * dt * cfg.omega * wa.vx;
        } else {
            wr.vy -= dt * cfg.omega * wa.vx;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{Hlle, NoCooling, NoGravity, PiecewiseLinear};

    #[test]
    fn uniform_flow_produces_uniform_flux_along_x1() {
        let domain = Domain::new(4, 4, 4, 2, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let cfg = Config {
            mhd: false,
            ..Config::default()
        };
        let mut grid = Grid::new(&domain, &cfg);
        grid.d.fill(1.0);
        grid.m1.fill(0.3);
        grid.e.fill(3.0);
        let mut scratch = ScratchSpace::new(&domain);

        run_sweep(
            Direction::X1,
            0.01,
            &grid,
            &domain,
            &mut scratch,
            &cfg,
            &PiecewiseLinear,
            &Hlle,
            &NoGravity,
            &NoCooling,
        )
        .unwrap();

        let (k, j, i) = (domain.ks(), domain.js(), domain.is() + 1);
        let f = scratch.x1_flux[[k, j, i]];
        assert!((f.d - 0.3).abs() < 1e-8);
    }
}
