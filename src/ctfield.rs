//! The constrained-transport face-field update (spec section 4.3 for the
//! half step, section 4.8 for the full step): both are the same stencil
//! applied with a different time increment, so one function serves both.

use ndarray::Array3;

use crate::grid::Domain;

/// Advances face-centered fields by `dt` using the corner EMFs, matching
/// Stone & Gardiner's constrained-transport stencil:
///
/// ```text
/// B1i += q3*(emf2[k+1] - emf2[k]) - q2*(emf3[j+1] - emf3[j])
/// B2i += q1*(emf3[i+1] - emf3[i]) - q3*(emf1[k+1] - emf1[k])
/// B3i += q2*(emf1[j+1] - emf1[j]) - q1*(emf2[i+1] - emf2[i])
/// ```
#[allow(clippy::too_many_arguments)]
pub fn update_face_fields(
    dt: f64,
    domain: &Domain,
    emf1: &Array3<f64>,
    emf2: &Array3<f64>,
    emf3: &Array3<f64>,
    b1i: &mut Array3<f64>,
    b2i: &mut Array3<f64>,
    b3i: &mut Array3<f64>,
) {
    let q1 = dt / domain.dx1;
    let q2 = dt / domain.dx2;
    let q3 = dt / domain.dx3;

    for k in domain.ks()..=domain.ke() {
        for j in domain.js()..=domain.je() {
            for i in domain.is()..=domain.ie() + 1 {
                b1i[[k, j, i]] += q3 * (emf2[[k + 1, j, i]] - emf2[[k, j, i]])
                    - q2 * (emf3[[k, j + 1, i]] - emf3[[k, j, i]]);
            }
        }
    }
    for k in domain.ks()..=domain.ke() {
        for j in domain.js()..=domain.je() + 1 {
            for i in domain.is()..=domain.ie() {
                b2i[[k, j, i]] += q1 * (emf3[[k, j, i + 1]] - emf3[[k, j, i]])
                    - q3 * (emf1[[k + 1, j, i]] - emf1[[k, j, i]]);
            }
        }
    }
    for k in domain.ks()..=domain.ke() + 1 {
        for j in domain.js()..=domain.je() {
            for i in domain.is()..=domain.ie() {
                b3i[[k, j, i]] += q2 * (emf1[[k, j + 1, i]] - emf1[[k, j, i]])
                    - q1 * (emf2[[k, j, i + 1]] - emf2[[k, j, i]]);
            }
        }
    }
}
