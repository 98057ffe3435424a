//! Error types for the integrator, following spec section 7: resource
//! acquisition failures, configuration mismatches, and numerical-regime
//! failures signalled by a collaborator.

use error_chain::error_chain;

error_chain! {
    errors {
        /// A scratch-buffer allocation failed during `Integrator::init`.
        AllocationFailed(what: String) {
            description("scratch allocation failed")
            display("allocation failed for '{}'", what)
        }
        /// `step` was called with a grid whose dimensions don't match the
        /// sizes passed to `init`.
        DimensionMismatch { expected: (usize, usize, usize), got: (usize, usize, usize) } {
            description("grid dimensions do not match initialized scratch size")
            display("grid dimensions {:?} do not match initialized size {:?}", got, expected)
        }
        /// A collaborator (reconstruction or Riemann solver) signalled a
        /// numerical failure (negative density/pressure, NaN).
        CollaboratorFailure(what: String) {
            description("collaborator signalled a numerical failure")
            display("collaborator failure: {}", what)
        }
    }
}
