//! The half-step cell-centered predictor state (spec section 4.5, `dhalf`
//! and `phalf`): advances every active cell by half a flux divergence from
//! the first sweep, giving the second Riemann solve and the full-step CT
//! update a time-centered cell-centered state to work from.

use crate::collaborators::StaticGravityPotential;
use crate::config::Config;
use crate::direction::Direction;
use crate::grid::{Domain, Grid};
use crate::scratch::ScratchSpace;

fn flux_divergence(
    dir: Direction,
    scratch: &ScratchSpace,
    domain: &Domain,
    k: usize,
    j: usize,
    i: usize,
) -> (f64, f64, f64, f64, f64) {
    let (flux, k_hi, j_hi, i_hi, dx) = match dir {
        Direction::X1 => (&scratch.x1_flux, k, j, i + 1, domain.dx1),
        Direction::X2 => (&scratch.x2_flux, k, j + 1, i, domain.dx2),
        Direction::X3 => (&scratch.x3_flux, k + 1, j, i, domain.dx3),
    };
    let lo = flux[[k, j, i]];
    let hi = flux[[k_hi, j_hi, i_hi]];
    let inv_dx = 1.0 / dx;
    let (m1, m2, m3) = dir.unpermute((
        (hi.mx - lo.mx) * inv_dx,
        (hi.my - lo.my) * inv_dx,
        (hi.mz - lo.mz) * inv_dx,
    ));
    ((hi.d - lo.d) * inv_dx, m1, m2, m3, (hi.e - lo.e) * inv_dx)
}

/// Fills `scratch.dhalf`/`phalf`/`m{1,2,3}_half`/`e_half` from the initial
/// cell state and the first sweep's three fluxes, with static-gravity,
/// self-gravity and shearing-box Coriolis corrections to the half-step
/// momenta (spec section 4.5's resolution of how gravity feeds the
/// half-step predictor before the second Riemann solve).
pub fn compute_half_step_state(
    dt: f64,
    grid: &Grid,
    domain: &Domain,
    scratch: &mut ScratchSpace,
    cfg: &Config,
    gravity: &dyn StaticGravityPotential,
) {
    let half = 0.5 * dt;
    let q1 = 0.5 * dt / domain.dx1;
    let q2 = 0.5 * dt / domain.dx2;
    let q3 = 0.5 * dt / domain.dx3;
    for k in domain.ks() - 1..=domain.ke() + 1 {
        for j in domain.js() - 1..=domain.je() + 1 {
            for i in domain.is() - 1..=domain.ie() + 1 {
                let (dd1, m11, m21, m31, de1) = flux_divergence(Direction::X1, scratch, domain, k, j, i);
                let (dd2, m12, m22, m32, de2) = flux_divergence(Direction::X2, scratch, domain, k, j, i);
                let (dd3, m13, m23, m33, de3) = flux_divergence(Direction::X3, scratch, domain, k, j, i);

                let dhalf = grid.d[[k, j, i]] - half * (dd1 + dd2 + dd3);
                let mut m1h = grid.m1[[k, j, i]] - half * (m11 + m12 + m13);
                let mut m2h = grid.m2[[k, j, i]] - half * (m21 + m22 + m23);
                let mut m3h = grid.m3[[k, j, i]] - half * (m31 + m32 + m33);

                let dn = grid.d[[k, j, i]];
                let (x1, x2, x3) = domain.cc_pos(k, j, i);

                let phir = gravity.potential(x1 + 0.5 * domain.dx1, x2, x3);
                let phil = gravity.potential(x1 - 0.5 * domain.dx1, x2, x3);
                m1h -= q1 * (phir - phil) * dn;
                let phir = gravity.potential(x1, x2 + 0.5 * domain.dx2, x3);
                let phil = gravity.potential(x1, x2 - 0.5 * domain.dx2, x3);
                m2h -= q2 * (phir - phil) * dn;
                let phir = gravity.potential(x1, x2, x3 + 0.5 * domain.dx3);
                let phil = gravity.potential(x1, x2, x3 - 0.5 * domain.dx3);
                m3h -= q3 * (phir - phil) * dn;

                if cfg.self_gravity {
                    if let Some(phi) = &grid.phi {
                        let phir = 0.5 * (phi[[k, j, i]] + phi[[k, j, i + 1]]);
                        let phil = 0.5 * (phi[[k, j, i]] + phi[[k, j, i - 1]]);
                        m1h -= q1 * (phir - phil) * dn;
                        let phir = 0.5 * (phi[[k, j, i]] + phi[[k, j + 1, i]]);
                        let phil = 0.5 * (phi[[k, j, i]] + phi[[k, j - 1, i]]);
                        m2h -= q2 * (phir - phil) * dn;
                        let phir = 0.5 * (phi[[k, j, i]] + phi[[k + 1, j, i]]);
                        let phil = 0.5 * (phi[[k, j, i]] + phi[[k - 1, j, i]]);
                        m3h -= q3 * (phir - phil) * dn;
                    }
                }

                if cfg.shearing_box {
                    let m1n = grid.m1[[k, j, i]];
                    let m2n = grid.m2[[k, j, i]];
                    m1h += dt * cfg.omega * m2n;
                    if cfg.fargo {
                        m2h -= 0.25 * dt * cfg.omega * m1n;
                    } else {
                        m2h -= dt * cfg.omega * m1n;
                    }
                }

                scratch.dhalf[[k, j, i]] = dhalf;
                scratch.m1_half[[k, j, i]] = m1h;
                scratch.m2_half[[k, j, i]] = m2h;
                scratch.m3_half[[k, j, i]] = m3h;

                let magnetic = if cfg.mhd {
                    let bch1 = 0.5 * (scratch.b1_x1_face[[k, j, i]] + scratch.b1_x1_face[[k, j, i + 1]]);
                    let bch2 = 0.5 * (scratch.b2_x2_face[[k, j, i]] + scratch.b2_x2_face[[k, j + 1, i]]);
                    let bch3 = 0.5 * (scratch.b3_x3_face[[k, j, i]] + scratch.b3_x3_face[[k + 1, j, i]]);
                    scratch.bch1[[k, j, i]] = bch1;
                    scratch.bch2[[k, j, i]] = bch2;
                    scratch.bch3[[k, j, i]] = bch3;
                    0.5 * (bch1 * bch1 + bch2 * bch2 + bch3 * bch3)
                } else {
                    0.0
                };

                if !cfg.barotropic {
                    let eh = grid.e[[k, j, i]] - half * (de1 + de2 + de3);
                    scratch.e_half[[k, j, i]] = eh;

                    let kinetic = 0.5 * (m1h * m1h + m2h * m2h + m3h * m3h) / dhalf;
                    scratch.phalf[[k, j, i]] = (cfg.gamma - 1.0) * (eh - kinetic - magnetic);
                } else {
                    scratch.phalf[[k, j, i]] = cfg.iso_sound_speed * cfg.iso_sound_speed * dhalf;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Cons1D;

    #[test]
    fn uniform_state_and_flux_predicts_same_state() {
        let domain = Domain::new(4, 4, 4, 2, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let cfg = Config {
            mhd: false,
            ..Config::default()
        };
        let mut grid = Grid::new(&domain, &cfg);
        grid.d.fill(1.0);
        grid.m1.fill(0.2);
        grid.e.fill(2.5);
        let mut scratch = ScratchSpace::new(&domain);
        let u = Cons1D {
            d: 1.0,
            mx: 0.2,
            my: 0.0,
            mz: 0.0,
            e: 2.5 * 0.2 + 0.2 * 0.2,
            by: 0.0,
            bz: 0.0,
            s: [0.0; crate::config::MAX_NSCALARS],
        };
        scratch.x1_flux.fill(u);
        scratch.x2_flux.fill(u);
        scratch.x3_flux.fill(u);

        compute_half_step_state(0.01, &grid, &domain, &mut scratch, &cfg, &crate::collaborators::NoGravity);

        let (k, j, i) = (domain.ks(), domain.js(), domain.is());
        assert!((scratch.dhalf[[k, j, i]] - 1.0).abs() < 1e-12);
    }
}
