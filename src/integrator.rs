//! The top-level integrator: owns scratch state and the collaborator set,
//! and drives the twelve-step unsplit CTU+CT update described across
//! `sweep`, `emf`, `ctfield`, `transverse`, `predictor`, `hcorrection`,
//! `sources` and `update`.
//!
//! 1-3.  Directional Riemann sweeps (`sweep::run_sweep`, once per axis).
//! 4a.   Cell-centered EMF from the initial state (`emf::cell_centered_emf`).
//! 4b.   Corner EMF reconstruction (`emf::emf{1,2,3}_corner`).
//! 4c.   Half-step face-field CT update (`ctfield::update_face_fields`).
//! 5-7.  Transverse flux-gradient correction (`transverse::correct_interface_states`).
//! 8.    Half-step cell-centered predictor (`predictor::compute_half_step_state`).
//! 9a.   H-correction (`hcorrection`).
//! 9b.   Second, final Riemann solve per axis (`run_final_sweep`, below).
//! 10a.  Cell-centered EMF from the half-step predictor state.
//! 10b.  Corner EMF reconstruction from the final fluxes.
//! 10c.  Full-step face-field CT update.
//! 11.   Full-step source terms (`sources`).
//! 12.   Conservative update + B-averaging (`update::conservative_update`).

use crate::collaborators::{CoolingFunction, Reconstruction, RiemannSolver, StaticGravityPotential};
use crate::config::Config;
use crate::direction::Direction;
use crate::errors::{Result, ResultExt};
use crate::grid::{Domain, Grid};
use crate::scratch::ScratchSpace;
use crate::{ctfield, emf, hcorrection, predictor, sources, sweep, transverse, update};

/// Owns every scratch buffer and collaborator needed to advance a [`Grid`]
/// by one timestep. Not `Sync` (the collaborators are trait objects without
/// a `Sync` bound) but safely `Send`, so a caller may move an `Integrator`
/// to a worker thread but not share one across threads concurrently.
pub struct Integrator {
    config: Config,
    domain: Domain,
    scratch: ScratchSpace,
    reconstruction: Box<dyn Reconstruction>,
    riemann: Box<dyn RiemannSolver>,
    gravity: Box<dyn StaticGravityPotential>,
    cooling: Box<dyn CoolingFunction>,
}

impl Integrator {
    pub fn init(
        domain: Domain,
        config: Config,
        reconstruction: Box<dyn Reconstruction>,
        riemann: Box<dyn RiemannSolver>,
        gravity: Box<dyn StaticGravityPotential>,
        cooling: Box<dyn CoolingFunction>,
    ) -> Result<Integrator> {
        config.assert_valid();
        if domain.nghost < 2 {
            return Err(crate::errors::ErrorKind::AllocationFailed(
                "nghost must be at least 2 for piecewise-linear reconstruction".into(),
            )
            .into());
        }
        let scratch = ScratchSpace::new(&domain);
        Ok(Integrator {
            config,
            domain,
            scratch,
            reconstruction,
            riemann,
            gravity,
            cooling,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Advances `grid` by `dt`, running the full twelve-step update.
    pub fn step(&mut self, grid: &mut Grid, dt: f64) -> Result<()> {
        let got = grid.dims();
        let expected = (
            self.domain.nx3_tot(),
            self.domain.nx2_tot(),
            self.domain.nx1_tot(),
        );
        if got != expected {
            return Err(crate::errors::ErrorKind::DimensionMismatch { expected, got }.into());
        }

        if self.config.mhd {
            grid.average_face_fields(&self.domain);
        }

        for dir in Direction::all().iter().copied() {
            sweep::run_sweep(
                dir,
                dt,
                grid,
                &self.domain,
                &mut self.scratch,
                &self.config,
                self.reconstruction.as_ref(),
                self.riemann.as_ref(),
                self.gravity.as_ref(),
                self.cooling.as_ref(),
            )
            .chain_err(|| format!("first sweep along {:?} failed", dir))?;
        }

        if self.config.mhd {
            emf::cell_centered_emf(
                &grid.d, &grid.m1, &grid.m2, &grid.m3, &grid.b1c, &grid.b2c, &grid.b3c, &self.domain,
                &mut self.scratch.emf1_cc, &mut self.scratch.emf2_cc, &mut self.scratch.emf3_cc,
            );
            emf::emf1_corner(grid, &self.domain, &mut self.scratch);
            emf::emf2_corner(grid, &self.domain, &mut self.scratch);
            emf::emf3_corner(grid, &self.domain, &mut self.scratch);

            self.scratch.b1_x1_face.assign(&grid.b1i);
            self.scratch.b2_x2_face.assign(&grid.b2i);
            self.scratch.b3_x3_face.assign(&grid.b3i);
            ctfield::update_face_fields(
                0.5 * dt,
                &self.domain,
                &self.scratch.emf1,
                &self.scratch.emf2,
                &self.scratch.emf3,
                &mut self.scratch.b1_x1_face,
                &mut self.scratch.b2_x2_face,
                &mut self.scratch.b3_x3_face,
            );
        }

        for dir in Direction::all().iter().copied() {
            transverse::correct_interface_states(dir, dt, grid, &self.domain, &mut self.scratch, &self.config, self.gravity.as_ref());
        }

        predictor::compute_half_step_state(dt, grid, &self.domain, &mut self.scratch, &self.config, self.gravity.as_ref());

        if self.config.h_correction {
            hcorrection::compute_face_eta(&self.domain, &mut self.scratch, &self.config);
            hcorrection::broaden_to_etah(&self.domain, &mut self.scratch);
        }

        for dir in Direction::all().iter().copied() {
            run_final_sweep(dir, &self.domain, &mut self.scratch, &self.config, self.riemann.as_ref());
        }

        if self.config.mhd {
            let dhalf = self.scratch.dhalf.clone();
            let m1h = self.scratch.m1_half.clone();
            let m2h = self.scratch.m2_half.clone();
            let m3h = self.scratch.m3_half.clone();
            let bch1 = self.scratch.bch1.clone();
            let bch2 = self.scratch.bch2.clone();
            let bch3 = self.scratch.bch3.clone();
            emf::cell_centered_emf(
                &dhalf, &m1h, &m2h, &m3h, &bch1, &bch2, &bch3, &self.domain,
                &mut self.scratch.emf1_cc, &mut self.scratch.emf2_cc, &mut self.scratch.emf3_cc,
            );
            emf::emf1_corner(grid, &self.domain, &mut self.scratch);
            emf::emf2_corner(grid, &self.domain, &mut self.scratch);
            emf::emf3_corner(grid, &self.domain, &mut self.scratch);

            ctfield::update_face_fields(
                dt,
                &self.domain,
                &self.scratch.emf1,
                &self.scratch.emf2,
                &self.scratch.emf3,
                &mut grid.b1i,
                &mut grid.b2i,
                &mut grid.b3i,
            );
        }

        sources::apply_static_sources(dt, grid, &self.domain, &self.scratch, &self.config, self.gravity.as_ref(), self.cooling.as_ref());
        if self.config.self_gravity {
            sources::apply_self_gravity(dt, grid, &self.domain, &self.scratch, &self.config);
        }
        if self.config.shearing_box {
            sources::apply_shearing_box(dt, grid, &self.domain, &self.scratch, &self.config);
        }

        update::conservative_update(dt, grid, &self.domain, &self.scratch, &self.config);

        grid.t += dt;
        Ok(())
    }
}

/// The second, final Riemann solve (spec section 4.6): re-resolves each
/// face using the transverse-corrected interface states and the half-step
/// face field, with the H-correction dissipation folded in.
fn run_final_sweep(dir: Direction, domain: &Domain, scratch: &mut ScratchSpace, cfg: &Config, riemann: &dyn RiemannSolver) {
    let (nt1, nt2, na) = match dir {
        Direction::X1 => (domain.nx3_tot(), domain.nx2_tot(), domain.nx1_tot()),
        Direction::X2 => (domain.nx3_tot(), domain.nx1_tot(), domain.nx2_tot()),
        Direction::X3 => (domain.nx2_tot(), domain.nx1_tot(), domain.nx3_tot()),
    };

    for t1 in 1..nt1 - 1 {
        for t2 in 1..nt2 - 1 {
            for a in 2..na - 1 {
                let (k, j, i) = dir.compose(a, t1, t2);
                let (ul, ur, bx) = match dir {
                    Direction::X1 => (scratch.x1_ul[[k, j, i]], scratch.x1_ur[[k, j, i]], scratch.b1_x1_face[[k, j, i]]),
                    Direction::X2 => (scratch.x2_ul[[k, j, i]], scratch.x2_ur[[k, j, i]], scratch.b2_x2_face[[k, j, i]]),
                    Direction::X3 => (scratch.x3_ul[[k, j, i]], scratch.x3_ur[[k, j, i]], scratch.b3_x3_face[[k, j, i]]),
                };
                let etah = match dir {
                    Direction::X1 => scratch.eta1[[k, j, i]],
                    Direction::X2 => scratch.eta2[[k, j, i]],
                    Direction::X3 => scratch.eta3[[k, j, i]],
                };
                let flux = riemann.solve(&ul, &ur, bx, etah, cfg);
                match dir {
                    Direction::X1 => scratch.x1_flux[[k, j, i]] = flux,
                    Direction::X2 => scratch.x2_flux[[k, j, i]] = flux,
                    Direction::X3 => scratch.x3_flux[[k, j, i]] = flux,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{Hlle, NoCooling, NoGravity, PiecewiseLinear};

    #[test]
    fn uniform_hydro_state_is_stationary() {
        let domain = Domain::new(6, 6, 6, 2, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let cfg = Config {
            mhd: false,
            ..Config::default()
        };
        let mut grid = Grid::new(&domain, &cfg);
        grid.d.fill(1.0);
        grid.e.fill(2.5);

        let mut integrator = Integrator::init(
            domain,
            cfg,
            Box::new(PiecewiseLinear),
            Box::new(Hlle),
            Box::new(NoGravity),
            Box::new(NoCooling),
        )
        .unwrap();

        integrator.step(&mut grid, 0.01).unwrap();

        let (k, j, i) = (integrator.domain().ks(), integrator.domain().js(), integrator.domain().is());
        assert!((grid.d[[k, j, i]] - 1.0).abs() < 1e-8);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let domain = Domain::new(4, 4, 4, 2, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let cfg = Config {
            mhd: false,
            ..Config::default()
        };
        let mut integrator = Integrator::init(
            domain,
            cfg,
            Box::new(PiecewiseLinear),
            Box::new(Hlle),
            Box::new(NoGravity),
            Box::new(NoCooling),
        )
        .unwrap();

        let wrong_domain = Domain::new(8, 8, 8, 2, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let mut wrong_grid = Grid::new(&wrong_domain, &cfg);
        assert!(integrator.step(&mut wrong_grid, 0.01).is_err());
    }
}
