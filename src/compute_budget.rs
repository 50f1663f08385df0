//! Compute budgets and cooperative cancellation for iterative fits.
//!
//! The LPPL fitter is the only iterative computation in the crate. Its latency
//! is bounded by a per-start iteration cap and an aggregate wall-clock limit,
//! and a caller can abort it through a [`CancellationToken`].

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Environment variable consulted by [`from_environment`].
pub const ENVIRONMENT_VARIABLE: &str = "LPPL_FINANCE_ENV";

/// Resource limits and reproducibility settings for iterative fits.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComputeBudget {
    /// Master seed for randomized multi-start positions.
    /// Each operation derives its own stream from this value.
    pub master_seed: u64,

    /// Maximum optimizer iterations per local refinement stage.
    pub max_iterations: usize,

    /// Wall-clock limit for a whole fit, in milliseconds.
    pub max_computation_ms: u64,

    /// Relative tolerance for convergence checks.
    pub convergence_tolerance: f64,
}

impl Default for ComputeBudget {
    fn default() -> Self {
        Self {
            master_seed: 42,
            max_iterations: 300,
            max_computation_ms: 60_000,
            convergence_tolerance: 1e-10,
        }
    }
}

impl ComputeBudget {
    /// Production budget: generous iteration cap, tight tolerance.
    pub fn production() -> Self {
        Self {
            master_seed: 42,
            max_iterations: 500,
            max_computation_ms: 120_000,
            convergence_tolerance: 1e-12,
        }
    }

    /// Development budget with faster feedback.
    pub fn development() -> Self {
        Self {
            master_seed: 42,
            max_iterations: 200,
            max_computation_ms: 20_000,
            convergence_tolerance: 1e-8,
        }
    }

    /// Test budget with a different seed and relaxed tolerance.
    pub fn test() -> Self {
        Self {
            master_seed: 12345,
            max_iterations: 150,
            max_computation_ms: 30_000,
            convergence_tolerance: 1e-8,
        }
    }

    /// Aggregate wall-clock limit as a [`Duration`].
    pub fn max_computation(&self) -> Duration {
        Duration::from_millis(self.max_computation_ms)
    }

    /// Create a deterministic RNG for a specific operation.
    ///
    /// The seed is `master_seed ⊕ hash(operation)`, so the same operation
    /// always replays the same sequence while different operations diverge.
    pub fn create_deterministic_rng(&self, operation: &str) -> ChaCha20Rng {
        let mut hasher = DefaultHasher::new();
        operation.hash(&mut hasher);
        ChaCha20Rng::seed_from_u64(self.master_seed ^ hasher.finish())
    }
}

/// Builder for [`ComputeBudget`].
#[derive(Debug, Default)]
pub struct ComputeBudgetBuilder {
    budget: ComputeBudget,
}

impl ComputeBudgetBuilder {
    /// Start from the default budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the master seed.
    pub fn master_seed(mut self, seed: u64) -> Self {
        self.budget.master_seed = seed;
        self
    }

    /// Set maximum iterations per refinement stage.
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.budget.max_iterations = iterations;
        self
    }

    /// Set the aggregate wall-clock limit in ms.
    pub fn max_computation_ms(mut self, ms: u64) -> Self {
        self.budget.max_computation_ms = ms;
        self
    }

    /// Set convergence tolerance.
    pub fn convergence_tolerance(mut self, tolerance: f64) -> Self {
        self.budget.convergence_tolerance = tolerance;
        self
    }

    /// Build and return the budget.
    pub fn build(self) -> ComputeBudget {
        self.budget
    }
}

/// Environment-based budget detection (`LPPL_FINANCE_ENV`).
pub fn from_environment() -> ComputeBudget {
    let env = std::env::var(ENVIRONMENT_VARIABLE).unwrap_or_else(|_| "production".to_string());
    budget_for_environment(&env)
}

fn budget_for_environment(env: &str) -> ComputeBudget {
    match env {
        "production" | "prod" => ComputeBudget::production(),
        "development" | "dev" => ComputeBudget::development(),
        "test" => ComputeBudget::test(),
        other => {
            log::debug!("Unknown {} value '{}', using default budget", ENVIRONMENT_VARIABLE, other);
            ComputeBudget::default()
        }
    }
}

/// Cooperative cancellation flag shared between a caller and fit workers.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Workers observe it at their next iteration.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Why an iterative computation must stop early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// The caller cancelled the computation
    Cancelled,
    /// The wall-clock budget ran out
    DeadlineExceeded,
}

/// Cancellation token plus deadline, checked between optimizer iterations.
#[derive(Debug, Clone)]
pub struct StopSignal {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl StopSignal {
    /// Signal that only trips on the given token and deadline.
    pub fn new(token: CancellationToken, deadline: Option<Instant>) -> Self {
        Self { token, deadline }
    }

    /// Signal derived from a budget, starting the clock now.
    pub fn from_budget(budget: &ComputeBudget, token: CancellationToken) -> Self {
        Self::new(token, Instant::now().checked_add(budget.max_computation()))
    }

    /// A signal that never trips.
    pub fn never() -> Self {
        Self::new(CancellationToken::new(), None)
    }

    /// Returns the reason to stop, if any. Cancellation takes precedence.
    pub fn check(&self) -> Option<Interrupt> {
        if self.token.is_cancelled() {
            Some(Interrupt::Cancelled)
        } else if self.deadline.map_or(false, |d| Instant::now() >= d) {
            Some(Interrupt::DeadlineExceeded)
        } else {
            None
        }
    }
}
