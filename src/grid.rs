//! The domain description and the grid state it indexes, per spec section 2.
//!
//! `Domain` is the fixed geometry of a uniform, ghost-padded box. `Grid`
//! owns the struct-of-arrays conserved state plus the face-centered field
//! components `b1i`/`b2i`/`b3i` that live one-half cell off the cell centers
//! (the actual CT-evolved degrees of freedom; `b1c`/`b2c`/`b3c` are their
//! cell averages, recomputed at the end of every step per spec section 4.8).

use ndarray::Array3;

use crate::config::{Config, MAX_NSCALARS};

/// Fixed geometry of a uniform, ghost-padded 3D box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub nx1: usize,
    pub nx2: usize,
    pub nx3: usize,
    pub nghost: usize,
    pub dx1: f64,
    pub dx2: f64,
    pub dx3: f64,
    pub x1min: f64,
    pub x2min: f64,
    pub x3min: f64,
}

impl Domain {
    pub fn new(
        nx1: usize,
        nx2: usize,
        nx3: usize,
        nghost: usize,
        dx1: f64,
        dx2: f64,
        dx3: f64,
        x1min: f64,
        x2min: f64,
        x3min: f64,
    ) -> Domain {
        Domain {
            nx1,
            nx2,
            nx3,
            nghost,
            dx1,
            dx2,
            dx3,
            x1min,
            x2min,
            x3min,
        }
    }

    /// Total array extent along each axis, ghost cells included.
    pub fn nx1_tot(&self) -> usize {
        self.nx1 + 2 * self.nghost
    }
    pub fn nx2_tot(&self) -> usize {
        self.nx2 + 2 * self.nghost
    }
    pub fn nx3_tot(&self) -> usize {
        self.nx3 + 2 * self.nghost
    }

    /// First and last active-cell indices along x1.
    pub fn is(&self) -> usize {
        self.nghost
    }
    pub fn ie(&self) -> usize {
        self.nghost + self.nx1 - 1
    }
    pub fn js(&self) -> usize {
        self.nghost
    }
    pub fn je(&self) -> usize {
        self.nghost + self.nx2 - 1
    }
    pub fn ks(&self) -> usize {
        self.nghost
    }
    pub fn ke(&self) -> usize {
        self.nghost + self.nx3 - 1
    }

    /// Cell-center coordinates of index `(k, j, i)`.
    pub fn cc_pos(&self, k: usize, j: usize, i: usize) -> (f64, f64, f64) {
        let x1 = self.x1min + (i as f64 - self.nghost as f64 + 0.5) * self.dx1;
        let x2 = self.x2min + (j as f64 - self.nghost as f64 + 0.5) * self.dx2;
        let x3 = self.x3min + (k as f64 - self.nghost as f64 + 0.5) * self.dx3;
        (x1, x2, x3)
    }
}

/// Struct-of-arrays conserved grid state, ghost cells included.
pub struct Grid {
    pub d: Array3<f64>,
    pub m1: Array3<f64>,
    pub m2: Array3<f64>,
    pub m3: Array3<f64>,
    /// Total energy density. Unused (left at zero) when `barotropic`.
    pub e: Array3<f64>,
    /// Cell-centered field averages, recomputed from face fields every step.
    pub b1c: Array3<f64>,
    pub b2c: Array3<f64>,
    pub b3c: Array3<f64>,
    /// Face-centered field components, the actual CT-evolved state.
    /// `b1i[k][j][i]` lives at `(x1_{i-1/2}, x2_j, x3_k)`, and likewise
    /// cyclically for `b2i`/`b3i`.
    pub b1i: Array3<f64>,
    pub b2i: Array3<f64>,
    pub b3i: Array3<f64>,
    /// Passive scalar densities, one array per active scalar slot.
    pub s: Vec<Array3<f64>>,
    /// External static/self-gravity potential, sampled at cell centers.
    pub phi: Option<Array3<f64>>,
    /// Mass fluxes persisted from the final sweep of the previous step, for
    /// an external Poisson/self-gravity solve (spec section 4.9).
    pub x1_mass_flux: Option<Array3<f64>>,
    pub x2_mass_flux: Option<Array3<f64>>,
    pub x3_mass_flux: Option<Array3<f64>>,
    pub t: f64,
}

impl Grid {
    pub fn new(domain: &Domain, cfg: &Config) -> Grid {
        let shape = (domain.nx3_tot(), domain.nx2_tot(), domain.nx1_tot());
        let zeros = || Array3::zeros(shape);
        let nscalars = cfg.nscalars.min(MAX_NSCALARS);
        Grid {
            d: zeros(),
            m1: zeros(),
            m2: zeros(),
            m3: zeros(),
            e: zeros(),
            b1c: zeros(),
            b2c: zeros(),
            b3c: zeros(),
            b1i: zeros(),
            b2i: zeros(),
            b3i: zeros(),
            s: (0..nscalars).map(|_| Array3::zeros(shape)).collect(),
            phi: if cfg.self_gravity {
                Some(zeros())
            } else {
                None
            },
            x1_mass_flux: if cfg.self_gravity {
                Some(zeros())
            } else {
                None
            },
            x2_mass_flux: if cfg.self_gravity {
                Some(zeros())
            } else {
                None
            },
            x3_mass_flux: if cfg.self_gravity {
                Some(zeros())
            } else {
                None
            },
            t: 0.0,
        }
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        let s = self.d.dim();
        (s.0, s.1, s.2)
    }

    /// Recomputes cell-centered field averages from the face-centered
    /// state, per spec section 4.8 ("B-averaging"). Must be called after
    /// every full conservative update.
    pub fn average_face_fields(&mut self, domain: &Domain) {
        for k in domain.ks()..=domain.ke() {
            for j in domain.js()..=domain.je() {
                for i in domain.is()..=domain.ie() {
                    self.b1c[[k, j, i]] = 0.5 * (self.b1i[[k, j, i]] + self.b1i[[k, j, i + 1]]);
                    self.b2c[[k, j, i]] = 0.5 * (self.b2i[[k, j, i]] + self.b2i[[k, j + 1, i]]);
                    self.b3c[[k, j, i]] = 0.5 * (self.b3i[[k, j, i]] + self.b3i[[k + 1, j, i]]);
                }
            }
        }
    }
}
