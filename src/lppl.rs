//! # Log-Periodic Power Law crash fitting
//!
//! Fits
//!
//! ```text
//! ln p(t) ≈ A + B(tc − t)^m + C(tc − t)^m cos(ω ln(tc − t) − φ)
//! ```
//!
//! to a price history and reports the critical time `tc` at which the
//! super-exponential growth of a bubble is expected to end.
//!
//! ## Method
//!
//! The fit works in `time_unit`s measured from the last observation, so every
//! observation sits at `t ≤ 0` and `tc` is a positive offset. For fixed
//! `(tc, m, ω)` the model is linear in `A, B, C·cosφ, C·sinφ`, which are
//! solved by QR ("slaving"). A grid and a set of seeded random points over
//! `(tc, m, ω)` are screened by their profiled RSS; the best are refined by
//! Levenberg–Marquardt, first on the profiled three-parameter problem and then
//! on all seven parameters with an analytic Jacobian. Refinements run in
//! parallel and the lowest-RSS converged candidate strictly inside the bounds
//! wins. Parameters are reported in seconds since the Unix epoch.

use crate::compute_budget::{CancellationToken, ComputeBudget, Interrupt, StopSignal};
use crate::errors::{
    validate_data_length, validate_parameter, validate_positive_prices, FinanceError,
    FinanceResult,
};
use crate::math_utils::{constants::SECONDS_PER_DAY, float_ops::wrap_angle, float_total_cmp};
use crate::optimizer::{levenberg_marquardt, LeastSquaresProblem, LmSettings, Termination};
use nalgebra::{DMatrix, DVector, SVD};
use rand::Rng;
use time::OffsetDateTime;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fewest observations that leave residual degrees of freedom for seven parameters.
pub const MIN_LPPL_OBSERVATIONS: usize = 8;

const OPERATION: &str = "lppl_fit";
const SVD_MAX_ITERATIONS: usize = 500;

/// Search space and budget for the LPPL fit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LpplConfig {
    /// Minimum distance of `tc` past the last observation, in seconds
    pub tc_gap: f64,
    /// Internal time unit in seconds
    pub time_unit: f64,
    /// Furthest `tc` as a multiple of the observation window past the last observation
    pub horizon_factor: f64,
    /// Bounds on the power-law exponent, inside `(0, 1)`
    pub m_bounds: (f64, f64),
    /// Bounds on the log-periodic angular frequency
    pub omega_bounds: (f64, f64),
    /// Grid points along `tc` (geometrically spaced)
    pub tc_steps: usize,
    /// Grid points along `m`
    pub m_steps: usize,
    /// Grid points along `ω`
    pub omega_steps: usize,
    /// Seeded random starting points added to the grid
    pub random_starts: usize,
    /// Number of best-screened starts refined by Levenberg–Marquardt
    pub refine_top: usize,
    /// Iteration, time and seed budget
    pub budget: ComputeBudget,
}

impl Default for LpplConfig {
    fn default() -> Self {
        Self {
            tc_gap: SECONDS_PER_DAY,
            time_unit: SECONDS_PER_DAY,
            horizon_factor: 2.0,
            m_bounds: (0.01, 0.99),
            omega_bounds: (2.0, 25.0),
            tc_steps: 12,
            m_steps: 6,
            omega_steps: 16,
            random_starts: 16,
            refine_top: 32,
            budget: ComputeBudget::default(),
        }
    }
}

impl LpplConfig {
    /// Coarse search for quick interactive fits.
    pub fn fast() -> Self {
        Self {
            tc_steps: 6,
            m_steps: 4,
            omega_steps: 8,
            random_starts: 8,
            refine_top: 8,
            ..Self::default()
        }
    }

    /// Check bounds and search sizes.
    pub fn validate(&self) -> FinanceResult<()> {
        validate_parameter(self.tc_gap, f64::MIN_POSITIVE, f64::MAX, "tc_gap")?;
        validate_parameter(self.time_unit, f64::MIN_POSITIVE, f64::MAX, "time_unit")?;
        validate_parameter(self.horizon_factor, f64::MIN_POSITIVE, f64::MAX, "horizon_factor")?;

        let (m_lo, m_hi) = self.m_bounds;
        validate_parameter(m_lo, f64::MIN_POSITIVE, 1.0, "m_bounds.0")?;
        validate_parameter(m_hi, m_lo, 1.0, "m_bounds.1")?;
        if m_lo >= m_hi || m_hi >= 1.0 {
            return Err(invalid("m_bounds", m_hi, "0 < lower < upper < 1"));
        }

        let (w_lo, w_hi) = self.omega_bounds;
        validate_parameter(w_lo, f64::MIN_POSITIVE, f64::MAX, "omega_bounds.0")?;
        validate_parameter(w_hi, w_lo, f64::MAX, "omega_bounds.1")?;
        if w_lo >= w_hi {
            return Err(invalid("omega_bounds", w_hi, "0 < lower < upper"));
        }

        for (name, steps) in [
            ("tc_steps", self.tc_steps),
            ("m_steps", self.m_steps),
            ("omega_steps", self.omega_steps),
            ("refine_top", self.refine_top),
        ] {
            if steps == 0 {
                return Err(invalid(name, 0.0, ">= 1"));
            }
        }
        if self.budget.max_iterations == 0 {
            return Err(invalid("max_iterations", 0.0, ">= 1"));
        }
        validate_parameter(
            self.budget.convergence_tolerance,
            0.0,
            1.0,
            "convergence_tolerance",
        )
    }

    fn lm_settings(&self) -> LmSettings {
        LmSettings {
            max_iterations: self.budget.max_iterations,
            tolerance: self.budget.convergence_tolerance,
            ..LmSettings::default()
        }
    }
}

fn invalid(parameter: &str, value: f64, constraint: &str) -> FinanceError {
    FinanceError::InvalidParameter {
        parameter: parameter.to_string(),
        value,
        constraint: constraint.to_string(),
    }
}

/// Fitted LPPL parameters in seconds since the Unix epoch.
///
/// `C` is reported non-negative with `φ` in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LpplParameters {
    /// Critical time, seconds since the Unix epoch
    pub tc: f64,
    /// Power-law exponent
    pub m: f64,
    /// Log-periodic angular frequency
    pub omega: f64,
    /// Log-price at the critical time
    #[cfg_attr(feature = "serde", serde(rename = "A"))]
    pub a: f64,
    /// Power-law amplitude (negative for a bubble)
    #[cfg_attr(feature = "serde", serde(rename = "B"))]
    pub b: f64,
    /// Log-periodic amplitude
    #[cfg_attr(feature = "serde", serde(rename = "C"))]
    pub c: f64,
    /// Log-periodic phase
    pub phi: f64,
}

impl LpplParameters {
    /// Model log-price at `t` seconds since the epoch, `None` at or past `tc`.
    pub fn evaluate(&self, t: f64) -> Option<f64> {
        let tau = self.tc - t;
        if tau <= 0.0 {
            return None;
        }
        let f = tau.powf(self.m);
        Some(self.a + self.b * f + self.c * f * (self.omega * tau.ln() - self.phi).cos())
    }

    /// Model log-price at a timestamp.
    pub fn evaluate_at(&self, timestamp: OffsetDateTime) -> Option<f64> {
        self.evaluate(unix_seconds(timestamp))
    }

    /// `tc` as a UTC timestamp.
    pub fn critical_time(&self) -> FinanceResult<OffsetDateTime> {
        let nanos = (self.tc * 1e9).round();
        if !nanos.is_finite() || nanos.abs() > i128::MAX as f64 {
            return Err(invalid("tc", self.tc, "representable timestamp"));
        }
        OffsetDateTime::from_unix_timestamp_nanos(nanos as i128)
            .map_err(|_| invalid("tc", self.tc, "representable timestamp"))
    }

    /// Whether the power-law term describes a growing bubble (`B < 0`).
    pub fn is_bubble(&self) -> bool {
        self.b < 0.0
    }
}

/// Accepted LPPL fit with search diagnostics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LpplFit {
    /// Accepted parameters
    pub parameters: LpplParameters,
    /// Residual sum of squares in log-price
    pub rss: f64,
    /// Starting points screened
    pub starts_attempted: usize,
    /// Refinements that converged inside the bounds
    pub starts_converged: usize,
    /// Optimizer iterations across every refinement
    pub iterations: usize,
}

/// Seconds since the Unix epoch, with sub-second precision.
pub fn unix_seconds(timestamp: OffsetDateTime) -> f64 {
    timestamp.unix_timestamp_nanos() as f64 / 1e9
}

/// Observations in internal units plus the nonlinear search box.
struct LpplData {
    t: Vec<f64>,
    y: Vec<f64>,
    tc_bounds: (f64, f64),
    m_bounds: (f64, f64),
    omega_bounds: (f64, f64),
}

impl LpplData {
    fn project_nonlinear(&self, p: &mut [f64]) {
        p[0] = p[0].clamp(self.tc_bounds.0, self.tc_bounds.1);
        p[1] = p[1].clamp(self.m_bounds.0, self.m_bounds.1);
        p[2] = p[2].clamp(self.omega_bounds.0, self.omega_bounds.1);
    }

    fn strictly_inside(&self, p: &[f64]) -> bool {
        let inside = |v: f64, (lo, hi): (f64, f64)| v > lo && v < hi;
        inside(p[0], self.tc_bounds)
            && inside(p[1], self.m_bounds)
            && inside(p[2], self.omega_bounds)
    }

    /// `[1, f, f·cos(ω lnτ), f·sin(ω lnτ)]` for each observation.
    fn design(&self, tc: f64, m: f64, omega: f64) -> FinanceResult<DMatrix<f64>> {
        let mut design = DMatrix::zeros(self.t.len(), 4);
        for (i, &t) in self.t.iter().enumerate() {
            let tau = tc - t;
            if tau <= 0.0 {
                return Err(FinanceError::NumericalError {
                    reason: format!("tc {} does not lie past observation {}", tc, t),
                    operation: Some(OPERATION.to_string()),
                });
            }
            let f = tau.powf(m);
            let angle = omega * tau.ln();
            design[(i, 0)] = 1.0;
            design[(i, 1)] = f;
            design[(i, 2)] = f * angle.cos();
            design[(i, 3)] = f * angle.sin();
        }
        Ok(design)
    }

    /// Solve the linear parameters for fixed `(tc, m, ω)`.
    ///
    /// Returns `[A, B, C, φ]`, the residuals and the RSS. Singular values
    /// below `1e-12` of the largest are dropped, so a collinear design gives
    /// the minimum-norm solution.
    fn slave(&self, tc: f64, m: f64, omega: f64) -> FinanceResult<([f64; 4], Vec<f64>, f64)> {
        let design = self.design(tc, m, omega)?;
        let y = DVector::from_column_slice(&self.y);
        let svd = design
            .iter()
            .all(|v| v.is_finite())
            .then(|| SVD::try_new(design.clone(), true, true, f64::EPSILON, SVD_MAX_ITERATIONS))
            .flatten()
            .ok_or_else(|| FinanceError::NumericalError {
                reason: "LPPL design matrix is not decomposable".to_string(),
                operation: Some(OPERATION.to_string()),
            })?;
        let cutoff = svd.singular_values.max() * 1e-12;
        let coefficients = svd
            .solve(&y, cutoff)
            .map_err(|reason| FinanceError::NumericalError {
                reason: reason.to_string(),
                operation: Some(OPERATION.to_string()),
            })?;
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(FinanceError::NumericalError {
                reason: "non-finite linear parameters".to_string(),
                operation: Some(OPERATION.to_string()),
            });
        }

        let residuals = y - design * &coefficients;
        let rss = residuals.norm_squared();
        let c = &coefficients;
        let linear = [c[0], c[1], c[2].hypot(c[3]), c[3].atan2(c[2])];
        Ok((linear, residuals.iter().copied().collect(), rss))
    }
}

/// `(tc, m, ω)` with the linear parameters profiled out.
struct ProfiledProblem<'a> {
    data: &'a LpplData,
}

impl LeastSquaresProblem for ProfiledProblem<'_> {
    fn residuals(&self, p: &[f64]) -> FinanceResult<Vec<f64>> {
        Ok(self.data.slave(p[0], p[1], p[2])?.1)
    }

    fn project(&self, p: &mut [f64]) {
        self.data.project_nonlinear(p);
    }
}

/// All seven parameters `[tc, m, ω, A, B, C, φ]`.
struct FullProblem<'a> {
    data: &'a LpplData,
}

impl LeastSquaresProblem for FullProblem<'_> {
    fn residuals(&self, p: &[f64]) -> FinanceResult<Vec<f64>> {
        let [tc, m, omega, a, b, c, phi] = seven(p);
        self.data
            .t
            .iter()
            .zip(&self.data.y)
            .map(|(&t, &y)| {
                let tau = tc - t;
                if tau <= 0.0 {
                    return Err(FinanceError::NumericalError {
                        reason: format!("tc {} does not lie past observation {}", tc, t),
                        operation: Some(OPERATION.to_string()),
                    });
                }
                let f = tau.powf(m);
                Ok(y - (a + b * f + c * f * (omega * tau.ln() - phi).cos()))
            })
            .collect()
    }

    fn jacobian(&self, p: &[f64], _residuals: &[f64]) -> FinanceResult<DMatrix<f64>> {
        let [tc, m, omega, _a, b, c, phi] = seven(p);
        let mut jacobian = DMatrix::zeros(self.data.t.len(), 7);
        for (i, &t) in self.data.t.iter().enumerate() {
            let tau = tc - t;
            let ln_tau = tau.ln();
            let f = tau.powf(m);
            let (h, g) = (omega * ln_tau - phi).sin_cos();
            let model_grad = [
                (m * f / tau) * (b + c * g) - c * f * h * omega / tau,
                ln_tau * f * (b + c * g),
                -c * f * h * ln_tau,
                1.0,
                f,
                f * g,
                c * f * h,
            ];
            for (k, d) in model_grad.iter().enumerate() {
                jacobian[(i, k)] = -d;
            }
        }
        Ok(jacobian)
    }

    fn project(&self, p: &mut [f64]) {
        self.data.project_nonlinear(p);
    }
}

fn seven(p: &[f64]) -> [f64; 7] {
    [p[0], p[1], p[2], p[3], p[4], p[5], p[6]]
}

/// A refined start.
struct Candidate {
    params: [f64; 7],
    rss: f64,
    acceptable: bool,
}

/// Result of refining one start.
struct Refinement {
    candidate: Option<Candidate>,
    iterations: usize,
    interrupt: Option<Interrupt>,
}

/// Multi-start LPPL fitter.
#[derive(Debug, Clone, Default)]
pub struct LpplFitter {
    config: LpplConfig,
}

impl LpplFitter {
    /// Fitter with the given search configuration.
    pub fn new(config: LpplConfig) -> Self {
        Self { config }
    }

    /// The search configuration.
    pub fn config(&self) -> &LpplConfig {
        &self.config
    }

    /// Fit the model to a price series.
    ///
    /// # Errors
    /// * `InsufficientData` with fewer than [`MIN_LPPL_OBSERVATIONS`] prices
    /// * `InvalidParameter` for non-positive prices or an invalid configuration
    /// * `FitConvergence` when no refinement converges inside the bounds
    pub fn fit(&self, timestamps: &[OffsetDateTime], prices: &[f64]) -> FinanceResult<LpplFit> {
        self.fit_with_cancellation(timestamps, prices, &CancellationToken::new())
    }

    /// [`fit`](Self::fit) that stops early once `token` is cancelled.
    ///
    /// # Errors
    /// As [`fit`](Self::fit), plus `Cancelled` when the token trips. No partial
    /// result is returned.
    pub fn fit_with_cancellation(
        &self,
        timestamps: &[OffsetDateTime],
        prices: &[f64],
        token: &CancellationToken,
    ) -> FinanceResult<LpplFit> {
        self.config.validate()?;
        let stop = StopSignal::from_budget(&self.config.budget, token.clone());
        let data = self.prepare(timestamps, prices)?;

        let starts = self.starting_points(&data);
        let starts_attempted = starts.len();
        let mut screened: Vec<([f64; 3], f64)> = starts
            .into_iter()
            .filter_map(|s| data.slave(s[0], s[1], s[2]).ok().map(|(_, _, rss)| (s, rss)))
            .filter(|(_, rss)| rss.is_finite())
            .collect();
        screened.sort_by(|a, b| float_total_cmp(&a.1, &b.1));
        screened.truncate(self.config.refine_top);

        log::debug!(
            "LPPL screened {} starts over {} observations, refining {}",
            starts_attempted,
            data.t.len(),
            screened.len()
        );
        if stop.check() == Some(Interrupt::Cancelled) {
            return Err(cancelled());
        }

        let settings = self.config.lm_settings();

        #[cfg(feature = "parallel")]
        let refinements: Vec<Refinement> = screened
            .par_iter()
            .map(|(start, _)| refine(&data, start, &settings, &stop))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let refinements: Vec<Refinement> = screened
            .iter()
            .map(|(start, _)| refine(&data, start, &settings, &stop))
            .collect();

        if token.is_cancelled()
            || refinements
                .iter()
                .any(|r| r.interrupt == Some(Interrupt::Cancelled))
        {
            return Err(cancelled());
        }
        if refinements
            .iter()
            .any(|r| r.interrupt == Some(Interrupt::DeadlineExceeded))
        {
            log::warn!(
                "LPPL fit exhausted its {} ms budget, selecting among finished refinements",
                self.config.budget.max_computation_ms
            );
        }

        let iterations = refinements.iter().map(|r| r.iterations).sum();
        let accepted: Vec<Candidate> = refinements
            .into_iter()
            .filter_map(|r| r.candidate)
            .filter(|c| c.acceptable)
            .collect();
        let starts_converged = accepted.len();

        let best = accepted
            .into_iter()
            .min_by(|a, b| float_total_cmp(&a.rss, &b.rss))
            .ok_or_else(|| FinanceError::FitConvergence {
                reason: "no refinement converged inside the parameter bounds".to_string(),
                starts_attempted,
            })?;

        let parameters = self.to_epoch_units(&best.params, timestamps);
        if !parameters.is_bubble() {
            log::warn!(
                "Accepted LPPL fit has B = {:.3e} >= 0, not a bubble signature",
                parameters.b
            );
        }
        log::debug!(
            "LPPL accepted rss {:.6e} from {} converged refinements ({} iterations)",
            best.rss,
            starts_converged,
            iterations
        );

        Ok(LpplFit {
            parameters,
            rss: best.rss,
            starts_attempted,
            starts_converged,
            iterations,
        })
    }

    fn prepare(&self, timestamps: &[OffsetDateTime], prices: &[f64]) -> FinanceResult<LpplData> {
        if timestamps.len() != prices.len() {
            return Err(FinanceError::InvalidTimeSeries {
                reason: format!(
                    "{} timestamps but {} prices",
                    timestamps.len(),
                    prices.len()
                ),
            });
        }
        validate_data_length(prices, MIN_LPPL_OBSERVATIONS)?;
        validate_positive_prices(prices)?;
        if timestamps.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FinanceError::InvalidTimeSeries {
                reason: "timestamps must be strictly increasing".to_string(),
            });
        }

        let unit = self.config.time_unit;
        let last = timestamps[timestamps.len() - 1];
        let t: Vec<f64> = timestamps
            .iter()
            .map(|ts| (*ts - last).as_seconds_f64() / unit)
            .collect();
        let y = prices.iter().map(|p| p.ln()).collect();

        let window = -t[0];
        let tc_lo = self.config.tc_gap / unit;
        let tc_hi = self.config.horizon_factor * window;
        if tc_hi <= tc_lo {
            return Err(invalid(
                "horizon_factor",
                self.config.horizon_factor,
                "horizon past the last observation must exceed tc_gap",
            ));
        }

        Ok(LpplData {
            t,
            y,
            tc_bounds: (tc_lo, tc_hi),
            m_bounds: self.config.m_bounds,
            omega_bounds: self.config.omega_bounds,
        })
    }

    /// Interior grid over `(tc, m, ω)` followed by seeded random points.
    fn starting_points(&self, data: &LpplData) -> Vec<[f64; 3]> {
        let cfg = &self.config;
        let (tc_lo, tc_hi) = data.tc_bounds;
        let geometric = |u: f64| tc_lo * (tc_hi / tc_lo).powf(u);
        let linear = |(lo, hi): (f64, f64), u: f64| lo + (hi - lo) * u;
        let interior = |k: usize, steps: usize| (k + 1) as f64 / (steps + 1) as f64;

        let mut starts = Vec::with_capacity(
            cfg.tc_steps * cfg.m_steps * cfg.omega_steps + cfg.random_starts,
        );
        for i in 0..cfg.tc_steps {
            for j in 0..cfg.m_steps {
                for k in 0..cfg.omega_steps {
                    starts.push([
                        geometric(interior(i, cfg.tc_steps)),
                        linear(data.m_bounds, interior(j, cfg.m_steps)),
                        linear(data.omega_bounds, interior(k, cfg.omega_steps)),
                    ]);
                }
            }
        }

        let mut rng = cfg.budget.create_deterministic_rng("lppl_random_starts");
        for _ in 0..cfg.random_starts {
            let u: [f64; 3] = [rng.gen(), rng.gen(), rng.gen()];
            starts.push([
                geometric(u[0]),
                linear(data.m_bounds, u[1]),
                linear(data.omega_bounds, u[2]),
            ]);
        }
        starts
    }

    /// Convert internal parameters to seconds since the Unix epoch.
    fn to_epoch_units(&self, p: &[f64; 7], timestamps: &[OffsetDateTime]) -> LpplParameters {
        let [tc, m, omega, a, b, c, phi] = *p;
        let unit = self.config.time_unit;
        let scale = unit.powf(m);
        let last = timestamps.last().map_or(0.0, |ts| unix_seconds(*ts));

        let (c, phi) = if c < 0.0 {
            (-c, phi + std::f64::consts::PI)
        } else {
            (c, phi)
        };

        LpplParameters {
            tc: last + tc * unit,
            m,
            omega,
            a,
            b: b / scale,
            c: c / scale,
            phi: wrap_angle(phi + omega * unit.ln()),
        }
    }
}

fn cancelled() -> FinanceError {
    FinanceError::Cancelled {
        operation: OPERATION.to_string(),
    }
}

/// Two-stage refinement of one screened start.
fn refine(
    data: &LpplData,
    start: &[f64; 3],
    settings: &LmSettings,
    stop: &StopSignal,
) -> Refinement {
    let profiled = match levenberg_marquardt(&ProfiledProblem { data }, start, settings, stop) {
        Ok(outcome) => outcome,
        Err(_) => return Refinement::failed(0, None),
    };
    if let Some(interrupt) = interrupted(&profiled.termination) {
        return Refinement::failed(profiled.iterations, Some(interrupt));
    }

    let [tc, m, omega] = [profiled.params[0], profiled.params[1], profiled.params[2]];
    let linear = match data.slave(tc, m, omega) {
        Ok((linear, _, _)) => linear,
        Err(_) => return Refinement::failed(profiled.iterations, None),
    };
    let full_start = [tc, m, omega, linear[0], linear[1], linear[2], linear[3]];

    let full = match levenberg_marquardt(&FullProblem { data }, &full_start, settings, stop) {
        Ok(outcome) => outcome,
        Err(_) => return Refinement::failed(profiled.iterations, None),
    };
    let iterations = profiled.iterations + full.iterations;
    if let Some(interrupt) = interrupted(&full.termination) {
        return Refinement::failed(iterations, Some(interrupt));
    }

    let params = seven(&full.params);
    Refinement {
        candidate: Some(Candidate {
            // full stage starts at the profiled minimum
            acceptable: profiled.converged()
                && (full.converged() || full.termination == Termination::NoProgress)
                && full.rss.is_finite()
                && data.strictly_inside(&params),
            params,
            rss: full.rss,
        }),
        iterations,
        interrupt: None,
    }
}

fn interrupted(termination: &Termination) -> Option<Interrupt> {
    match termination {
        Termination::Interrupted(interrupt) => Some(*interrupt),
        _ => None,
    }
}

impl Refinement {
    fn failed(iterations: usize, interrupt: Option<Interrupt>) -> Self {
        Self {
            candidate: None,
            iterations,
            interrupt,
        }
    }
}

/// Fit an LPPL model with `config`.
pub fn fit_lppl(
    timestamps: &[OffsetDateTime],
    prices: &[f64],
    config: &LpplConfig,
) -> FinanceResult<LpplFit> {
    LpplFitter::new(config.clone()).fit(timestamps, prices)
}
