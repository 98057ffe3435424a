//! The interface-state reconstruction collaborator (spec section 4.1,
//! `lr_states`): turns a pencil of cell-centered primitive states into the
//! left/right states presented to the Riemann solver at a face.

use crate::config::Config;
use crate::state::Prim1D;

/// Reconstructs left/right interface states at the face between `stencil[1]`
/// and `stencil[2]` (a four-point stencil `[i-1, i, i+1, i+2]`), given the
/// field component `bx` parallel to the sweep and `dtodx = dt / dx`.
pub trait Reconstruction {
    fn reconstruct(
        &self,
        stencil: &[Prim1D; 4],
        bx: f64,
        dtodx: f64,
        cfg: &Config,
    ) -> (Prim1D, Prim1D);
}

fn minmod(a: f64, b: f64) -> f64 {
    if a * b <= 0.0 {
        0.0
    } else if a.abs() < b.abs() {
        a
    } else {
        b
    }
}

/// Piecewise-linear reconstruction with a min-mod slope limiter and a
/// time-centered upwind correction along the local fluid velocity (spec
/// section 4.1's half-step predictor, approximated here without a full
/// characteristic decomposition of the MHD Jacobian).
pub struct PiecewiseLinear;

impl PiecewiseLinear {
    fn recon_one(
        &self,
        vm: f64,
        v0: f64,
        vp: f64,
        vel: f64,
        dtodx: f64,
    ) -> (f64, f64) {
        let slope = minmod(v0 - vm, vp - v0);
        let wl = v0 + 0.5 * slope * (1.0 - vel.max(0.0) * dtodx);
        let wr = v0 + 0.5 * slope * (-1.0 - vel.min(0.0) * dtodx);
        (wl, wr)
    }
}

impl Reconstruction for PiecewiseLinear {
    fn reconstruct(
        &self,
        stencil: &[Prim1D; 4],
        _bx: f64,
        dtodx: f64,
        cfg: &Config,
    ) -> (Prim1D, Prim1D) {
        let wim1 = &stencil[0];
        let wi = &stencil[1];
        let wip1 = &stencil[2];
        let wip2 = &stencil[3];

        let mut wl = Prim1D::default();
        let mut wr = Prim1D::default();

        let (l, _) = self.recon_one(wim1.d, wi.d, wip1.d, wi.vx, dtodx);
        wl.d = l;
        let (_, r) = self.recon_one(wi.d, wip1.d, wip2.d, wip1.vx, dtodx);
        wr.d = r;

        let (l, _) = self.recon_one(wim1.vx, wi.vx, wip1.vx, wi.vx, dtodx);
        wl.vx = l;
        let (_, r) = self.recon_one(wi.vx, wip1.vx, wip2.vx, wip1.vx, dtodx);
        wr.vx = r;

        let (l, _) = self.recon_one(wim1.vy, wi.vy, wip1.vy, wi.vx, dtodx);
        wl.vy = l;
        let (_, r) = self.recon_one(wi.vy, wip1.vy, wip2.vy, wip1.vx, dtodx);
        wr.vy = r;

        let (l, _) = self.recon_one(wim1.vz, wi.vz, wip1.vz, wi.vx, dtodx);
        wl.vz = l;
        let (_, r) = self.recon_one(wi.vz, wip1.vz, wip2.vz, wip1.vx, dtodx);
        wr.vz = r;

        if !cfg.barotropic {
            let (l, _) = self.recon_one(wim1.p, wi.p, wip1.p, wi.vx, dtodx);
            wl.p = l;
            let (_, r) = self.recon_one(wi.p, wip1.p, wip2.p, wip1.vx, dtodx);
            wr.p = r;
        }

        if cfg.mhd {
            let (l, _) = self.recon_one(wim1.by, wi.by, wip1.by, wi.vx, dtodx);
            wl.by = l;
            let (_, r) = self.recon_one(wi.by, wip1.by, wip2.by, wip1.vx, dtodx);
            wr.by = r;

            let (l, _) = self.recon_one(wim1.bz, wi.bz, wip1.bz, wi.vx, dtodx);
            wl.bz = l;
            let (_, r) = self.recon_one(wi.bz, wip1.bz, wip2.bz, wip1.vx, dtodx);
            wr.bz = r;
        }

        for n in 0..cfg.nscalars {
            let (l, _) = self.recon_one(wim1.r[n], wi.r[n], wip1.r[n], wi.vx, dtodx);
            wl.r[n] = l;
            let (_, r) = self.recon_one(wi.r[n], wip1.r[n], wip2.r[n], wip1.vx, dtodx);
            wr.r[n] = r;
        }

        (wl, wr)
    }
}
