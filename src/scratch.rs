//! Scratch buffers used across one call to [`crate::integrator::Integrator::step`].
//!
//! All work arrays are owned by one `ScratchSpace` value held by the
//! `Integrator`, not by module-level statics (spec section 9, "scratch
//! arrays as module-level statics") so an `Integrator` is a plain, `Send`
//! value with no hidden global state.

use ndarray::Array3;

use crate::grid::Domain;
use crate::state::Cons1D;

/// One scratch array per quantity, sized to the full ghost-padded grid.
/// Interface-indexed quantities (fluxes, half-step face fields, corner EMFs)
/// are stored at the same index as their "left" neighbor, matching the
/// reference convention (`x1Flux[k][j][i]` lives at the `i-1/2` face).
pub struct ScratchSpace {
    pub x1_flux: Array3<Cons1D>,
    pub x2_flux: Array3<Cons1D>,
    pub x3_flux: Array3<Cons1D>,

    /// Interface states produced by the first sweep, kept around so the
    /// transverse flux-gradient correction (spec section 4.4) can adjust
    /// them before the second, final Riemann solve.
    pub x1_ul: Array3<Cons1D>,
    pub x1_ur: Array3<Cons1D>,
    pub x2_ul: Array3<Cons1D>,
    pub x2_ur: Array3<Cons1D>,
    pub x3_ul: Array3<Cons1D>,
    pub x3_ur: Array3<Cons1D>,

    pub b1_x1_face: Array3<f64>,
    pub b2_x2_face: Array3<f64>,
    pub b3_x3_face: Array3<f64>,

    pub emf1: Array3<f64>,
    pub emf2: Array3<f64>,
    pub emf3: Array3<f64>,
    pub emf1_cc: Array3<f64>,
    pub emf2_cc: Array3<f64>,
    pub emf3_cc: Array3<f64>,

    pub dhalf: Array3<f64>,
    pub phalf: Array3<f64>,
    pub m1_half: Array3<f64>,
    pub m2_half: Array3<f64>,
    pub m3_half: Array3<f64>,
    pub e_half: Array3<f64>,

    /// Cell-centered average of the half-step CT face fields (spec section
    /// 4.5's `Bch`): the magnetic term of `phalf` and the second
    /// cell-centered EMF pass both need the time-centered field, not the
    /// stale `t^n` cell average still sitting in `grid.b{1,2,3}c`.
    pub bch1: Array3<f64>,
    pub bch2: Array3<f64>,
    pub bch3: Array3<f64>,

    pub eta1: Array3<f64>,
    pub eta2: Array3<f64>,
    pub eta3: Array3<f64>,
}

impl ScratchSpace {
    pub fn new(domain: &Domain) -> ScratchSpace {
        let shape = (domain.nx3_tot(), domain.nx2_tot(), domain.nx1_tot());
        let zeros_f = || Array3::<f64>::zeros(shape);
        let zeros_c = || Array3::<Cons1D>::from_elem(shape, Cons1D::default());

        ScratchSpace {
            x1_flux: zeros_c(),
            x2_flux: zeros_c(),
            x3_flux: zeros_c(),

            x1_ul: zeros_c(),
            x1_ur: zeros_c(),
            x2_ul: zeros_c(),
            x2_ur: zeros_c(),
            x3_ul: zeros_c(),
            x3_ur: zeros_c(),

            b1_x1_face: zeros_f(),
            b2_x2_face: zeros_f(),
            b3_x3_face: zeros_f(),

            emf1: zeros_f(),
            emf2: zeros_f(),
            emf3: zeros_f(),
            emf1_cc: zeros_f(),
            emf2_cc: zeros_f(),
            emf3_cc: zeros_f(),

            dhalf: zeros_f(),
            phalf: zeros_f(),
            m1_half: zeros_f(),
            m2_half: zeros_f(),
            m3_half: zeros_f(),
            e_half: zeros_f(),

            bch1: zeros_f(),
            bch2: zeros_f(),
            bch3: zeros_f(),

            eta1: zeros_f(),
            eta2: zeros_f(),
            eta3: zeros_f(),
        }
    }
}
