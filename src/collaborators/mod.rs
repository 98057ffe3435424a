//! Collaborator traits: the seams where problem-specific physics plugs into
//! the integrator, per spec section 6. Each trait ships a null-object
//! default so a caller who doesn't need the hook can ignore it entirely.

pub mod cooling;
pub mod potential;
pub mod reconstruction;
pub mod riemann;
pub mod shear_remap;

pub use cooling::{CoolingFunction, NoCooling};
pub use potential::{NoGravity, StaticGravityPotential};
pub use reconstruction::{PiecewiseLinear, Reconstruction};
pub use riemann::{Hlle, RiemannSolver};
pub use shear_remap::{NoRemap, ShearRemap};
