//! The H-correction entropy fix (Sanders, Morano & Druguet 1998; spec
//! section 4.6): estimates a per-face dissipation strength from the jump in
//! characteristic speed across the face, then takes the maximum over the
//! faces surrounding a corner so shocks aligned with a grid direction don't
//! develop a carbuncle.

use crate::config::Config;
use crate::direction::Direction;
use crate::grid::Domain;
use crate::scratch::ScratchSpace;
use crate::state::cfast;

fn face_eta(dir: Direction, scratch: &ScratchSpace, cfg: &Config, k: usize, j: usize, i: usize) -> f64 {
    let (ul, ur, bx) = match dir {
        Direction::X1 => (scratch.x1_ul[[k, j, i]], scratch.x1_ur[[k, j, i]], scratch.b1_x1_face[[k, j, i]]),
        Direction::X2 => (scratch.x2_ul[[k, j, i]], scratch.x2_ur[[k, j, i]], scratch.b2_x2_face[[k, j, i]]),
        Direction::X3 => (scratch.x3_ul[[k, j, i]], scratch.x3_ur[[k, j, i]], scratch.b3_x3_face[[k, j, i]]),
    };
    let bx = if cfg.mhd { bx } else { 0.0 };
    let cl = cfast(&ul, bx, cfg);
    let cr = cfast(&ur, bx, cfg);
    let vl = ul.mx / ul.d;
    let vr = ur.mx / ur.d;
    0.5 * ((vr + cr) - (vl + cl)).abs()
}

/// Fills `scratch.eta1/2/3` from the per-axis interface-state jumps stored
/// by the first sweep.
pub fn compute_face_eta(domain: &Domain, scratch: &mut ScratchSpace, cfg: &Config) {
    for k in domain.ks() - 1..=domain.ke() + 1 {
        for j in domain.js() - 1..=domain.je() + 1 {
            for i in domain.is()..=domain.ie() + 1 {
                scratch.eta1[[k, j, i]] = face_eta(Direction::X1, scratch, cfg, k, j, i);
            }
        }
    }
    for k in domain.ks() - 1..=domain.ke() + 1 {
        for j in domain.js()..=domain.je() + 1 {
            for i in domain.is() - 1..=domain.ie() + 1 {
                scratch.eta2[[k, j, i]] = face_eta(Direction::X2, scratch, cfg, k, j, i);
            }
        }
    }
    for k in domain.ks()..=domain.ke() + 1 {
        for j in domain.js() - 1..=domain.je() + 1 {
            for i in domain.is() - 1..=domain.ie() + 1 {
                scratch.eta3[[k, j, i]] = face_eta(Direction::X3, scratch, cfg, k, j, i);
            }
        }
    }
}

/// The dissipation strength consumed by the second Riemann solve at a given
/// `dir` face: spec section 4.6's nine-value bracket (reference
/// `integrate_3d_ctu.c:1745-1814`). For an x1 face this is the current
/// `eta1` plus the four `eta2` values bracketing `j..j+1, i-1..i` and the
/// four `eta3` values bracketing `k..k+1, i-1..i`; the x2/x3 brackets are
/// the same pattern cycled `(i,j,k) -> (j,k,i) -> (k,i,j)`. Takes the three
/// eta fields directly (rather than `&ScratchSpace`) so a caller can
/// snapshot them before overwriting in place with the bracketed maximum.
pub fn etah_at(
    dir: Direction,
    eta1: &ndarray::Array3<f64>,
    eta2: &ndarray::Array3<f64>,
    eta3: &ndarray::Array3<f64>,
    k: usize,
    j: usize,
    i: usize,
) -> f64 {
    let mut m = match dir {
        Direction::X1 => eta1[[k, j, i]],
        Direction::X2 => eta2[[k, j, i]],
        Direction::X3 => eta3[[k, j, i]],
    };
    match dir {
        Direction::X1 => {
            for jj in j..=j + 1 {
                for ii in i.saturating_sub(1)..=i {
                    m = m.max(eta2[[k, jj, ii]]);
                }
            }
            for kk in k..=k + 1 {
                for ii in i.saturating_sub(1)..=i {
                    m = m.max(eta3[[kk, j, ii]]);
                }
            }
        }
        Direction::X2 => {
            for kk in k..=k + 1 {
                for jj in j.saturating_sub(1)..=j {
                    m = m.max(eta3[[kk, jj, i]]);
                }
            }
            for ii in i..=i + 1 {
                for jj in j.saturating_sub(1)..=j {
                    m = m.max(eta1[[k, jj, ii]]);
                }
            }
        }
        Direction::X3 => {
            for ii in i..=i + 1 {
                for kk in k.saturating_sub(1)..=k {
                    m = m.max(eta1[[kk, j, ii]]);
                }
            }
            for jj in j..=j + 1 {
                for kk in k.saturating_sub(1)..=k {
                    m = m.max(eta2[[kk, jj, i]]);
                }
            }
        }
    }
    m
}

/// Overwrites `scratch.eta1/2/3` in place with the nine-value bracketed
/// maximum, so later reads (by the second sweep) see the final `etah`
/// directly without needing a separate lookup.
pub fn broaden_to_etah(domain: &Domain, scratch: &mut ScratchSpace) {
    let eta1 = scratch.eta1.clone();
    let eta2 = scratch.eta2.clone();
    let eta3 = scratch.eta3.clone();

    for k in domain.ks() - 1..=domain.ke() + 1 {
        for j in domain.js() - 1..=domain.je() + 1 {
            for i in domain.is()..=domain.ie() + 1 {
                scratch.eta1[[k, j, i]] = etah_at(Direction::X1, &eta1, &eta2, &eta3, k, j, i);
            }
        }
    }
    for k in domain.ks() - 1..=domain.ke() + 1 {
        for j in domain.js()..=domain.je() + 1 {
            for i in domain.is() - 1..=domain.ie() + 1 {
                scratch.eta2[[k, j, i]] = etah_at(Direction::X2, &eta1, &eta2, &eta3, k, j, i);
            }
        }
    }
    for k in domain.ks()..=domain.ke() + 1 {
        for j in domain.js() - 1..=domain.je() + 1 {
            for i in domain.is() - 1..=domain.ie() + 1 {
                scratch.eta3[[k, j, i]] = etah_at(Direction::X3, &eta1, &eta2, &eta3, k, j, i);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Cons1D;

    #[test]
    fn identical_states_give_zero_eta() {
        let domain = Domain::new(4, 4, 4, 2, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let cfg = Config {
            mhd: false,
            ..Config::default()
        };
        let mut scratch = ScratchSpace::new(&domain);
        let u = Cons1D {
            d: 1.0,
            mx: 0.0,
            my: 0.0,
            mz: 0.0,
            e: 2.5,
            by: 0.0,
            bz: 0.0,
            s: [0.0; crate::config::MAX_NSCALARS],
        };
        scratch.x1_ul.fill(u);
        scratch.x1_ur.fill(u);
        scratch.x2_ul.fill(u);
        scratch.x2_ur.fill(u);
        scratch.x3_ul.fill(u);
        scratch.x3_ur.fill(u);
        compute_face_eta(&domain, &mut scratch, &cfg);
        broaden_to_etah(&domain, &mut scratch);
        let (k, j, i) = (domain.ks(), domain.js(), domain.is());
        assert_eq!(scratch.eta1[[k, j, i]], 0.0);
    }
}
