//! Bounded Levenberg–Marquardt for small nonlinear least squares problems.
//!
//! Problems expose their residual vector, optionally an analytic Jacobian, and
//! a projection onto their feasible box. Each iteration solves the damped
//! normal equations `(JᵀJ + λ·diag(JᵀJ)) δ = −Jᵀr` by Cholesky factorization
//! and projects the trial point. Accepted steps shrink `λ`; rejected ones
//! grow it. Every trial counts against the iteration cap.

use crate::compute_budget::{Interrupt, StopSignal};
use crate::errors::FinanceResult;
use nalgebra::{DMatrix, DVector};

/// Damping above which the search is considered stalled at a minimum.
const MAX_LAMBDA: f64 = 1e16;
const MIN_LAMBDA: f64 = 1e-15;
/// Floor for diagonal scaling so flat directions still get damped.
const DIAG_FLOOR: f64 = 1e-12;

/// A nonlinear least squares problem `min Σ r_i(p)²`.
pub trait LeastSquaresProblem {
    /// Residual vector at `params`.
    ///
    /// An error marks `params` as infeasible; the optimizer rejects that trial.
    fn residuals(&self, params: &[f64]) -> FinanceResult<Vec<f64>>;

    /// Jacobian of the residuals, `rows = residuals`, `cols = params`.
    ///
    /// Defaults to forward finite differences.
    fn jacobian(&self, params: &[f64], residuals: &[f64]) -> FinanceResult<DMatrix<f64>> {
        finite_difference_jacobian(self, params, residuals)
    }

    /// Move `params` onto the feasible set. Unbounded by default.
    fn project(&self, _params: &mut [f64]) {}
}

/// Forward-difference Jacobian, falling back to a backward step when the
/// forward point is infeasible.
pub fn finite_difference_jacobian<P: LeastSquaresProblem + ?Sized>(
    problem: &P,
    params: &[f64],
    residuals: &[f64],
) -> FinanceResult<DMatrix<f64>> {
    let step_scale = f64::EPSILON.sqrt();
    let mut jacobian = DMatrix::zeros(residuals.len(), params.len());
    let mut shifted = params.to_vec();

    for k in 0..params.len() {
        let h = step_scale * params[k].abs().max(1.0);
        shifted[k] = params[k] + h;
        let (perturbed, sign) = match problem.residuals(&shifted) {
            Ok(r) => (r, 1.0),
            Err(_) => {
                shifted[k] = params[k] - h;
                (problem.residuals(&shifted)?, -1.0)
            }
        };
        for (i, (rp, r0)) in perturbed.iter().zip(residuals).enumerate() {
            jacobian[(i, k)] = sign * (rp - r0) / h;
        }
        shifted[k] = params[k];
    }

    Ok(jacobian)
}

/// Levenberg–Marquardt settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LmSettings {
    /// Maximum number of trial steps
    pub max_iterations: usize,
    /// Tolerance for the relative-reduction, step and gradient tests
    pub tolerance: f64,
    /// Initial damping factor
    pub initial_lambda: f64,
}

impl Default for LmSettings {
    fn default() -> Self {
        Self {
            max_iterations: 300,
            tolerance: 1e-10,
            initial_lambda: 1e-3,
        }
    }
}

/// Why the optimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// An accepted step reduced the RSS by less than the relative tolerance
    RelativeReduction,
    /// An accepted step was shorter than the step tolerance
    SmallStep,
    /// The gradient `Jᵀr` vanished
    SmallGradient,
    /// The residuals are zero to machine precision
    ZeroResidual,
    /// No further descent step exists under maximal damping after at least
    /// one accepted step
    Stalled,
    /// Damping was exhausted before any step was accepted
    NoProgress,
    /// The iteration cap was reached
    MaxIterations,
    /// The stop signal tripped
    Interrupted(Interrupt),
}

impl Termination {
    /// Whether this termination indicates a local minimum.
    pub fn is_converged(self) -> bool {
        matches!(
            self,
            Termination::RelativeReduction
                | Termination::SmallStep
                | Termination::SmallGradient
                | Termination::ZeroResidual
                | Termination::Stalled
        )
    }
}

/// Final state of a Levenberg–Marquardt run.
#[derive(Debug, Clone, PartialEq)]
pub struct LmOutcome {
    /// Parameters at termination
    pub params: Vec<f64>,
    /// Residuals at `params`
    pub residuals: Vec<f64>,
    /// Residual sum of squares at `params`
    pub rss: f64,
    /// Trial steps taken
    pub iterations: usize,
    /// Stopping reason
    pub termination: Termination,
}

impl LmOutcome {
    /// Whether the run stopped at a local minimum.
    pub fn converged(&self) -> bool {
        self.termination.is_converged()
    }
}

fn sum_of_squares(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

/// Minimize `problem` from `start`.
///
/// The stop signal is checked before every trial step; an interrupted run
/// returns its current point with [`Termination::Interrupted`].
///
/// # Errors
/// Propagates a failure to evaluate residuals or the Jacobian at an
/// accepted point (including the projected start).
pub fn levenberg_marquardt<P: LeastSquaresProblem + ?Sized>(
    problem: &P,
    start: &[f64],
    settings: &LmSettings,
    stop: &StopSignal,
) -> FinanceResult<LmOutcome> {
    let mut params = start.to_vec();
    problem.project(&mut params);
    let mut residuals = problem.residuals(&params)?;
    let mut rss = sum_of_squares(&residuals);
    let mut jacobian = problem.jacobian(&params, &residuals)?;
    let zero_rss = (f64::EPSILON * f64::EPSILON) * residuals.len() as f64;

    let mut lambda = settings.initial_lambda;
    let mut iterations = 0;
    let mut accepted = 0;
    let tol = settings.tolerance;

    let termination = loop {
        if let Some(interrupt) = stop.check() {
            break Termination::Interrupted(interrupt);
        }
        if rss <= zero_rss {
            break Termination::ZeroResidual;
        }

        let jt = jacobian.transpose();
        let jtj = &jt * &jacobian;
        let gradient = &jt * DVector::from_column_slice(&residuals);
        if gradient.amax() <= tol {
            break Termination::SmallGradient;
        }
        if lambda > MAX_LAMBDA {
            break if accepted > 0 {
                Termination::Stalled
            } else {
                Termination::NoProgress
            };
        }
        if iterations >= settings.max_iterations {
            break Termination::MaxIterations;
        }
        iterations += 1;

        let mut damped = jtj.clone();
        for i in 0..damped.nrows() {
            damped[(i, i)] += lambda * jtj[(i, i)].max(DIAG_FLOOR);
        }
        let step = match damped.cholesky() {
            Some(factor) => factor.solve(&(-gradient)),
            None => {
                lambda *= 10.0;
                continue;
            }
        };

        let mut candidate: Vec<f64> = params.iter().zip(step.iter()).map(|(p, d)| p + d).collect();
        problem.project(&mut candidate);

        let trial = match problem.residuals(&candidate) {
            Ok(trial) => trial,
            Err(_) => {
                lambda *= 10.0;
                continue;
            }
        };
        let trial_rss = sum_of_squares(&trial);
        if !(trial_rss.is_finite() && trial_rss < rss) {
            lambda *= 10.0;
            continue;
        }

        let decrease = rss - trial_rss;
        let step_norm = params
            .iter()
            .zip(&candidate)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt();
        let param_norm = sum_of_squares(&params).sqrt();
        let previous_rss = rss;

        params = candidate;
        residuals = trial;
        rss = trial_rss;
        accepted += 1;
        lambda = (lambda / 10.0).max(MIN_LAMBDA);

        if decrease <= tol * previous_rss {
            break Termination::RelativeReduction;
        }
        if step_norm <= tol * (param_norm + tol) {
            break Termination::SmallStep;
        }
        jacobian = problem.jacobian(&params, &residuals)?;
    };

    Ok(LmOutcome {
        params,
        residuals,
        rss,
        iterations,
        termination,
    })
}
