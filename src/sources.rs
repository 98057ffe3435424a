//! Full-step source terms (spec section 4.7): static gravity, self-gravity,
//! optically-thin cooling and the shearing-box rotating-frame terms, applied
//! directly to the cell-centered conserved state before the conservative
//! flux update (spec section 4.8) is taken.

use crate::collaborators::{CoolingFunction, StaticGravityPotential};
use crate::config::Config;
use crate::grid::{Domain, Grid};
use crate::scratch::ScratchSpace;

/// Applies static-gravity and cooling source terms to every active cell,
/// using the half-step predicted density `dhalf` for the momentum source
/// (spec section 4.7) and the reference's asymmetric flux-weighted form for
/// the energy source, which keeps the update exact for a time-independent
/// potential. Shearing-box terms are applied separately by
/// [`apply_shearing_box`] since they need the `!fargo` caller to decide
/// whether FARGO orbital advection has already absorbed the background
/// shear (out of scope here; only the non-FARGO closed form is provided).
pub fn apply_static_sources(
    dt: f64,
    grid: &mut Grid,
    domain: &Domain,
    scratch: &ScratchSpace,
    cfg: &Config,
    gravity: &dyn StaticGravityPotential,
    cooling: &dyn CoolingFunction,
) {
    let dtodx1 = dt / domain.dx1;
    let dtodx2 = dt / domain.dx2;
    let dtodx3 = dt / domain.dx3;

    for k in domain.ks()..=domain.ke() {
        for j in domain.js()..=domain.je() {
            for i in domain.is()..=domain.ie() {
                let (x1, x2, x3) = domain.cc_pos(k, j, i);
                let dh = scratch.dhalf[[k, j, i]];
                let phic = gravity.potential(x1, x2, x3);

                let phir = gravity.potential(x1 + 0.5 * domain.dx1, x2, x3);
                let phil = gravity.potential(x1 - 0.5 * domain.dx1, x2, x3);
                grid.m1[[k, j, i]] -= dtodx1 * (phir - phil) * dh;
                if !cfg.barotropic {
                    grid.e[[k, j, i]] -= dtodx1
                        * (scratch.x1_flux[[k, j, i]].d * (phic - phil)
                            + scratch.x1_flux[[k, j, i + 1]].d * (phir - phic));
                }

                let phir = gravity.potential(x1, x2 + 0.5 * domain.dx2, x3);
                let phil = gravity.potential(x1, x2 - 0.5 * domain.dx2, x3);
                grid.m2[[k, j, i]] -= dtodx2 * (phir - phil) * dh;
                if !cfg.barotropic {
                    grid.e[[k, j, i]] -= dtodx2
                        * (scratch.x2_flux[[k, j, i]].d * (phic - phil)
                            + scratch.x2_flux[[k, j + 1, i]].d * (phir - phic));
                }

                let phir = gravity.potential(x1, x2, x3 + 0.5 * domain.dx3);
                let phil = gravity.potential(x1, x2, x3 - 0.5 * domain.dx3);
                grid.m3[[k, j, i]] -= dtodx3 * (phir - phil) * dh;
                if !cfg.barotropic {
                    grid.e[[k, j, i]] -= dtodx3
                        * (scratch.x3_flux[[k, j, i]].d * (phic - phil)
                            + scratch.x3_flux[[k + 1, j, i]].d * (phir - phic));
                }
            }
        }
    }

    if !cfg.barotropic {
        for k in domain.ks()..=domain.ke() {
            for j in domain.js()..=domain.je() {
                for i in domain.is()..=domain.ie() {
                    let coolf = cooling.cooling_rate(scratch.dhalf[[k, j, i]], scratch.phalf[[k, j, i]], dt);
                    grid.e[[k, j, i]] -= dt * coolf;
                }
            }
        }
    }
}

/// Applies the self-gravity momentum/energy source terms (spec section 4.7)
/// as divergences of the gravitational Maxwell stress tensor built from
/// `grid.phi`, with Jean's swindle (`grav_mean_rho` subtracted from the
/// stress's isotropic term) to keep a periodic-box mean background stable.
/// The stress-tensor form, rather than a direct `rho*g` product, is what
/// keeps the discrete source term consistent with the flux-conservative
/// update when `phi` itself varies across the step.
pub fn apply_self_gravity(dt: f64, grid: &mut Grid, domain: &Domain, scratch: &ScratchSpace, cfg: &Config) {
    let phi = match &grid.phi {
        Some(p) => p.clone(),
        None => return,
    };
    let dx1i = 1.0 / domain.dx1;
    let dx2i = 1.0 / domain.dx2;
    let dx3i = 1.0 / domain.dx3;
    let dtodx1 = dt / domain.dx1;
    let dtodx2 = dt / domain.dx2;
    let dtodx3 = dt / domain.dx3;
    let four_pi_g = cfg.four_pi_g;
    let grav_mean_rho = cfg.grav_mean_rho;

    for k in domain.ks()..=domain.ke() {
        for j in domain.js()..=domain.je() {
            for i in domain.is()..=domain.ie() {
                let phic = phi[[k, j, i]];

                // d/dx1 terms.
                let phil = 0.5 * (phi[[k, j, i - 1]] + phi[[k, j, i]]);
                let phir = 0.5 * (phi[[k, j, i]] + phi[[k, j, i + 1]]);
                let gxl = (phi[[k, j, i - 1]] - phi[[k, j, i]]) * dx1i;
                let gxr = (phi[[k, j, i]] - phi[[k, j, i + 1]]) * dx1i;
                let gyl = 0.25
                    * ((phi[[k, j - 1, i - 1]] - phi[[k, j + 1, i - 1]]) + (phi[[k, j - 1, i]] - phi[[k, j + 1, i]]))
                    * dx2i;
                let gyr = 0.25
                    * ((phi[[k, j - 1, i]] - phi[[k, j + 1, i]]) + (phi[[k, j - 1, i + 1]] - phi[[k, j + 1, i + 1]]))
                    * dx2i;
                let gzl = 0.25
                    * ((phi[[k - 1, j, i - 1]] - phi[[k + 1, j, i - 1]]) + (phi[[k - 1, j, i]] - phi[[k + 1, j, i]]))
                    * dx3i;
                let gzr = 0.25
                    * ((phi[[k - 1, j, i]] - phi[[k + 1, j, i]]) + (phi[[k - 1, j, i + 1]] - phi[[k + 1, j, i + 1]]))
                    * dx3i;

                let flx_m1l = 0.5 * (gxl * gxl - gyl * gyl - gzl * gzl) / four_pi_g + grav_mean_rho * phil;
                let flx_m1r = 0.5 * (gxr * gxr - gyr * gyr - gzr * gzr) / four_pi_g + grav_mean_rho * phir;
                let flx_m2l = gxl * gyl / four_pi_g;
                let flx_m2r = gxr * gyr / four_pi_g;
                let flx_m3l = gxl * gzl / four_pi_g;
                let flx_m3r = gxr * gzr / four_pi_g;

                grid.m1[[k, j, i]] -= dtodx1 * (flx_m1r - flx_m1l);
                grid.m2[[k, j, i]] -= dtodx1 * (flx_m2r - flx_m2l);
                grid.m3[[k, j, i]] -= dtodx1 * (flx_m3r - flx_m3l);
                if !cfg.barotropic {
                    grid.e[[k, j, i]] -= dtodx1
                        * (scratch.x1_flux[[k, j, i]].d * (phic - phil)
                            + scratch.x1_flux[[k, j, i + 1]].d * (phir - phic));
                }

                // d/dx2 terms.
                let phil = 0.5 * (phi[[k, j - 1, i]] + phi[[k, j, i]]);
                let phir = 0.5 * (phi[[k, j, i]] + phi[[k, j + 1, i]]);
                let gxl = 0.25
                    * ((phi[[k, j - 1, i - 1]] - phi[[k, j - 1, i + 1]]) + (phi[[k, j, i - 1]] - phi[[k, j, i + 1]]))
                    * dx1i;
                let gxr = 0.25
                    * ((phi[[k, j, i - 1]] - phi[[k, j, i + 1]]) + (phi[[k, j + 1, i - 1]] - phi[[k, j + 1, i + 1]]))
                    * dx1i;
                let gyl = (phi[[k, j - 1, i]] - phi[[k, j, i]]) * dx2i;
                let gyr = (phi[[k, j, i]] - phi[[k, j + 1, i]]) * dx2i;
                let gzl = 0.25
                    * ((phi[[k - 1, j - 1, i]] - phi[[k + 1, j - 1, i]]) + (phi[[k - 1, j, i]] - phi[[k + 1, j, i]]))
                    * dx3i;
                let gzr = 0.25
                    * ((phi[[k - 1, j, i]] - phi[[k + 1, j, i]]) + (phi[[k - 1, j + 1, i]] - phi[[k + 1, j + 1, i]]))
                    * dx3i;

                let flx_m1l = gyl * gxl / four_pi_g;
                let flx_m1r = gyr * gxr / four_pi_g;
                let flx_m2l = 0.5 * (gyl * gyl - gxl * gxl - gzl * gzl) / four_pi_g + grav_mean_rho * phil;
                let flx_m2r = 0.5 * (gyr * gyr - gxr * gxr - gzr * gzr) / four_pi_g + grav_mean_rho * phir;
                let flx_m3l = gyl * gzl / four_pi_g;
                let flx_m3r = gyr * gzr / four_pi_g;

                grid.m1[[k, j, i]] -= dtodx2 * (flx_m1r - flx_m1l);
                grid.m2[[k, j, i]] -= dtodx2 * (flx_m2r - flx_m2l);
                grid.m3[[k, j, i]] -= dtodx2 * (flx_m3r - flx_m3l);
                if !cfg.barotropic {
                    grid.e[[k, j, i]] -= dtodx2
                        * (scratch.x2_flux[[k, j, i]].d * (phic - phil)
                            + scratch.x2_flux[[k, j + 1, i]].d * (phir - phic));
                }

                // d/dx3 terms.
                let phil = 0.5 * (phi[[k - 1, j, i]] + phi[[k, j, i]]);
                let phir = 0.5 * (phi[[k, j, i]] + phi[[k + 1, j, i]]);
                let gxl = 0.25
                    * ((phi[[k - 1, j, i - 1]] - phi[[k - 1, j, i + 1]]) + (phi[[k, j, i - 1]] - phi[[k, j, i + 1]]))
                    * dx1i;
                let gxr = 0.25
                    * ((phi[[k, j, i - 1]] - phi[[k, j, i + 1]]) + (phi[[k + 1, j, i - 1]] - phi[[k + 1, j, i + 1]]))
                    * dx1i;
                let gyl = 0.25
                    * ((phi[[k - 1, j - 1, i]] - phi[[k - 1, j + 1, i]]) + (phi[[k, j - 1, i]] - phi[[k, j + 1, i]]))
                    * dx2i;
                let gyr = 0.25
                    * ((phi[[k, j - 1, i]] - phi[[k, j + 1, i]]) + (phi[[k + 1, j - 1, i]] - phi[[k + 1, j + 1, i]]))
                    * dx2i;
                let gzl = (phi[[k - 1, j, i]] - phi[[k, j, i]]) * dx3i;
                let gzr = (phi[[k, j, i]] - phi[[k + 1, j, i]]) * dx3i;

                let flx_m1l = gzl * gxl / four_pi_g;
                let flx_m1r = gzr * gxr / four_pi_g;
                let flx_m2l = gzl * gyl / four_pi_g;
                let flx_m2r = gzr * gyr / four_pi_g;
                let flx_m3l = 0.5 * (gzl * gzl - gxl * gxl - gyl * gyl) / four_pi_g + grav_mean_rho * phil;
                let flx_m3r = 0.5 * (gzr * gzr - gxr * gxr - gyr * gyr) / four_pi_g + grav_mean_rho * phir;

                grid.m1[[k, j, i]] -= dtodx3 * (flx_m1r - flx_m1l);
                grid.m2[[k, j, i]] -= dtodx3 * (flx_m2r - flx_m2l);
                grid.m3[[k, j, i]] -= dtodx3 * (flx_m3r - flx_m3l);
                if !cfg.barotropic {
                    grid.e[[k, j, i]] -= dtodx3
                        * (scratch.x3_flux[[k, j, i]].d * (phic - phil)
                            + scratch.x3_flux[[k + 1, j, i]].d * (phir - phic));
                }
            }
        }
    }
}

/// Applies the shearing-box Coriolis update in closed (Crank-Nicholson)
/// form, plus the unconditional tidal correction to `M2` that the
/// reference implementation always applies outside of FARGO (spec section
/// 3.1's resolution of Open Question (b); preserved verbatim).
pub fn apply_shearing_box(dt: f64, grid: &mut Grid, domain: &Domain, scratch: &ScratchSpace, cfg: &Config) {
    if !cfg.shearing_box {
        return;
    }
    let om_dt = cfg.omega * dt;
    let fact = om_dt / (1.0 + 0.25 * om_dt * om_dt);

    for k in domain.ks()..=domain.ke() {
        for j in domain.js()..=domain.je() {
            for i in domain.is()..=domain.ie() {
                let m1e = grid.m1[[k, j, i]];
                let m2e = grid.m2[[k, j, i]];
                let d = grid.d[[k, j, i]];
                let (x1, _, _) = domain.cc_pos(k, j, i);
                let dm2e = if cfg.fargo {
                    m2e
                } else {
                    m2e + d * 1.5 * cfg.omega * x1
                };

                let m1n = m1e + (2.0 * dm2e - 0.5 * om_dt * m1e) * fact;
                let m2n = m2e - 0.5 * (m1e + om_dt * dm2e) * fact;

                grid.m1[[k, j, i]] = m1n;
                grid.m2[[k, j, i]] = m2n;

                if !cfg.fargo {
                    grid.m2[[k, j, i]] -= 0.75
                        * om_dt
                        * (scratch.x1_flux[[k, j, i]].d + scratch.x1_flux[[k, j, i + 1]].d);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{NoCooling, NoGravity};

    #[test]
    fn static_gravity_with_no_gravity_is_a_no_op() {
        let domain = Domain::new(4, 4, 4, 2, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let cfg = Config {
            mhd: false,
            ..Config::default()
        };
        let mut grid = Grid::new(&domain, &cfg);
        grid.d.fill(1.0);
        grid.e.fill(2.5);
        let scratch = ScratchSpace::new(&domain);
        apply_static_sources(0.1, &mut grid, &domain, &scratch, &cfg, &NoGravity, &NoCooling);
        let (k, j, i) = (domain.ks(), domain.js(), domain.is());
        assert_eq!(grid.m1[[k, j, i]], 0.0);
    }

    #[test]
    fn shearing_box_without_rotation_is_identity() {
        let domain = Domain::new(4, 4, 4, 2, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let mut cfg = Config::default();
        cfg.shearing_box = true;
        cfg.fargo = true;
        cfg.omega = 0.0;
        let mut grid = Grid::new(&domain, &cfg);
        grid.m1.fill(0.3);
        grid.m2.fill(-0.1);
        let scratch = ScratchSpace::new(&domain);
        apply_shearing_box(0.1, &mut grid, &domain, &scratch, &cfg);
        let (k, j, i) = (domain.ks(), domain.js(), domain.is());
        assert!((grid.m1[[k, j, i]] - 0.3).abs() < 1e-12);
        assert!((grid.m2[[k, j, i]] - (-0.1)).abs() < 1e-12);
    }
}
