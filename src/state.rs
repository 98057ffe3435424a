//! The 1D transported state (`Cons1D`/`Prim1D`) and the per-cell conserved
//! state `Cons`, per spec section 3.
//!
//! `Cons1D`/`Prim1D` are small `Copy` structs (one per interface, produced
//! and consumed in tight loops) rather than heap-backed; passive scalars are
//! carried in a fixed-capacity array (see [`crate::config::MAX_NSCALARS`])
//! so the hot sweep loops never allocate or branch on scalar count beyond a
//! single `for n in 0..nscalars`.

use crate::config::{Config, MAX_NSCALARS};

/// Conserved 1D state along a sweep direction: `(d, Mx, My, Mz, E, By, Bz, s)`.
/// `Bx` (the field component parallel to the sweep) is carried alongside,
/// not inside this struct, matching the reference `Cons1D`/`Bxi` split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cons1D {
    pub d: f64,
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
    pub e: f64,
    pub by: f64,
    pub bz: f64,
    pub s: [f64; MAX_NSCALARS],
}

/// Primitive 1D state along a sweep direction: `(d, Vx, Vy, Vz, P, By, Bz, r)`.
/// `r[n] = s[n] / d` is the mass concentration of passive scalar `n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prim1D {
    pub d: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub p: f64,
    pub by: f64,
    pub bz: f64,
    pub r: [f64; MAX_NSCALARS],
}

impl Default for Cons1D {
    fn default() -> Cons1D {
        Cons1D {
            d: 0.0,
            mx: 0.0,
            my: 0.0,
            mz: 0.0,
            e: 0.0,
            by: 0.0,
            bz: 0.0,
            s: [0.0; MAX_NSCALARS],
        }
    }
}

impl Default for Prim1D {
    fn default() -> Prim1D {
        Prim1D {
            d: 0.0,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            p: 0.0,
            by: 0.0,
            bz: 0.0,
            r: [0.0; MAX_NSCALARS],
        }
    }
}

/// Converts a conserved 1D state to primitive form. `bx` is the field
/// component parallel to the sweep (zero/unused when `!cfg.mhd`).
pub fn cons1d_to_prim1d(u: &Cons1D, bx: f64, cfg: &Config) -> Prim1D {
    let mut w = Prim1D::default();
    w.d = u.d;
    w.vx = u.mx / u.d;
    w.vy = u.my / u.d;
    w.vz = u.mz / u.d;
    w.by = u.by;
    w.bz = u.bz;

    if !cfg.barotropic {
        let kinetic = 0.5 * (u.mx * u.mx + u.my * u.my + u.mz * u.mz) / u.d;
        let magnetic = if cfg.mhd {
            0.5 * (bx * bx + u.by * u.by + u.bz * u.bz)
        } else {
            0.0
        };
        w.p = (cfg.gamma - 1.0) * (u.e - kinetic - magnetic);
    } else {
        w.p = cfg.iso_sound_speed * cfg.iso_sound_speed * u.d;
    }

    for n in 0..cfg.nscalars {
        w.r[n] = u.s[n] / u.d;
    }
    w
}

/// Converts a primitive 1D state back to conserved form.
pub fn prim1d_to_cons1d(w: &Prim1D, bx: f64, cfg: &Config) -> Cons1D {
    let mut u = Cons1D::default();
    u.d = w.d;
    u.mx = w.d * w.vx;
    u.my = w.d * w.vy;
    u.mz = w.d * w.vz;
    u.by = w.by;
    u.bz = w.bz;

    if !cfg.barotropic {
        let kinetic = 0.5 * w.d * (w.vx * w.vx + w.vy * w.vy + w.vz * w.vz);
        let magnetic = if cfg.mhd {
            0.5 * (bx * bx + w.by * w.by + w.bz * w.bz)
        } else {
            0.0
        };
        u.e = w.p / (cfg.gamma - 1.0) + kinetic + magnetic;
    }

    for n in 0..cfg.nscalars {
        u.s[n] = w.r[n] * w.d;
    }
    u
}

/// Fast magnetosonic speed of a conserved state, used by the H-correction
/// (spec section 4.6). `bx` is the field component parallel to the sweep.
pub fn cfast(u: &Cons1D, bx: f64, cfg: &Config) -> f64 {
    let w = cons1d_to_prim1d(u, bx, cfg);
    let asq = if cfg.barotropic {
        cfg.iso_sound_speed * cfg.iso_sound_speed
    } else {
        cfg.gamma * w.p / w.d
    };
    if !cfg.mhd {
        return asq.sqrt();
    }
    let bsq = (bx * bx + u.by * u.by + u.bz * u.bz) / w.d;
    let term = asq + bsq;
    let disc = (term * term - 4.0 * asq * bx * bx / w.d).max(0.0);
    (0.5 * (term + disc.sqrt())).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hydro_cfg() -> Config {
        Config {
            mhd: false,
            ..Config::default()
        }
    }

    #[test]
    fn cons_prim_round_trip_hydro() {
        let cfg = hydro_cfg();
        let w = Prim1D {
            d: 1.2,
            vx: 0.3,
            vy: -0.1,
            vz: 0.05,
            p: 0.8,
            by: 0.0,
            bz: 0.0,
            r: [0.0; MAX_NSCALARS],
        };
        let u = prim1d_to_cons1d(&w, 0.0, &cfg);
        let w2 = cons1d_to_prim1d(&u, 0.0, &cfg);
        assert!((w.d - w2.d).abs() < 1e-12);
        assert!((w.vx - w2.vx).abs() < 1e-12);
        assert!((w.vy - w2.vy).abs() < 1e-12);
        assert!((w.vz - w2.vz).abs() < 1e-12);
        assert!((w.p - w2.p).abs() < 1e-12);
    }

    #[test]
    fn cons_prim_round_trip_mhd_with_scalars() {
        let mut cfg = Config::default();
        cfg.nscalars = 2;
        let mut w = Prim1D {
            d: 1.0,
            vx: 0.1,
            vy: 0.2,
            vz: 0.3,
            p: 1.0,
            by: 0.5,
            bz: -0.2,
            r: [0.0; MAX_NSCALARS],
        };
        w.r[0] = 0.5;
        w.r[1] = 2.0;
        let u = prim1d_to_cons1d(&w, 0.3, &cfg);
        let w2 = cons1d_to_prim1d(&u, 0.3, &cfg);
        assert!((w.p - w2.p).abs() < 1e-10);
        assert!((w.r[0] - w2.r[0]).abs() < 1e-12);
        assert!((w.r[1] - w2.r[1]).abs() < 1e-12);
    }

    #[test]
    fn cfast_reduces_to_sound_speed_without_field() {
        let cfg = hydro_cfg();
        let w = Prim1D {
            d: 1.0,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            p: 1.0,
            by: 0.0,
            bz: 0.0,
            r: [0.0; MAX_NSCALARS],
        };
        let u = prim1d_to_cons1d(&w, 0.0, &cfg);
        let cs = cfast(&u, 0.0, &cfg);
        let expected = (cfg.gamma * w.p / w.d).sqrt();
        assert!((cs - expected).abs() < 1e-12);
    }
}
