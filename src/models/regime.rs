// src/models/regime.rs
//! Regime-Switching Markov Chain
//!
//! # Model
//!
//! A finite set of volatility regimes, each carrying a multiplier `δ_i` applied
//! to the GARCH constant `ω`, evolves as a discrete-time Markov chain:
//! ```text
//! P(regime_{t+1} = j | regime_t = i) = P_ij,    Σ_j P_ij = 1
//! ```
//! Shifting `ω` moves the long-run variance target to `δ ω / (1 - α - β)`,
//! producing calm (`δ < 1`) and stressed (`δ > 1`) episodes.
//!
//! # Sampling
//!
//! One uniform draw `r ∈ [0, 1)` per step, inverse-CDF over the current row:
//! the next regime is the first index whose cumulative probability reaches `r`.
//! States with zero transition probability are never selected, so absorbing
//! rows stay absorbing for every possible draw.
//!
//! The chain is always tracked by integer index; multipliers are only looked up,
//! never searched for.

use crate::error::{SdeError, SdeResult};
use crate::rng;
use nalgebra::{DMatrix, DVector};
use ndarray::{Array2, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tolerance on each transition row summing to one
pub const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// Built-in regime spaces
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultRegimes {
    /// Calm / normal / stressed
    ThreeState,
    FiveState,
    NineState,
}

impl DefaultRegimes {
    pub fn regimes(&self) -> Vec<f64> {
        match self {
            DefaultRegimes::ThreeState => vec![0.5, 1.0, 1.5],
            DefaultRegimes::FiveState => vec![0.5, 0.75, 1.0, 1.25, 1.5],
            DefaultRegimes::NineState => {
                vec![0.25, 0.5, 0.75, 0.9, 1.0, 1.1, 1.25, 1.5, 2.0]
            }
        }
    }

    pub fn transition(&self) -> Vec<Vec<f64>> {
        match self {
            DefaultRegimes::ThreeState => vec![
                vec![0.97, 0.029, 0.001],
                vec![0.015, 0.95, 0.035],
                vec![0.00, 0.04, 0.96],
            ],
            DefaultRegimes::FiveState => vec![
                vec![0.97, 0.025, 0.004, 0.001, 0.0],
                vec![0.02, 0.95, 0.025, 0.004, 0.001],
                vec![0.002, 0.023, 0.95, 0.023, 0.002],
                vec![0.001, 0.004, 0.03, 0.94, 0.025],
                vec![0.0, 0.001, 0.009, 0.04, 0.95],
            ],
            DefaultRegimes::NineState => vec![
                vec![0.96, 0.03, 0.008, 0.002, 0.0, 0.0, 0.0, 0.0, 0.0],
                vec![0.02, 0.95, 0.022, 0.006, 0.002, 0.0, 0.0, 0.0, 0.0],
                vec![0.004, 0.025, 0.94, 0.023, 0.006, 0.002, 0.0, 0.0, 0.0],
                vec![0.001, 0.004, 0.025, 0.94, 0.024, 0.005, 0.001, 0.0, 0.0],
                vec![0.0, 0.001, 0.004, 0.025, 0.94, 0.025, 0.004, 0.001, 0.0],
                vec![0.0, 0.0, 0.001, 0.005, 0.03, 0.93, 0.027, 0.006, 0.001],
                vec![0.0, 0.0, 0.0, 0.002, 0.006, 0.035, 0.92, 0.03, 0.007],
                vec![0.0, 0.0, 0.0, 0.0, 0.003, 0.01, 0.045, 0.91, 0.032],
                vec![0.0, 0.0, 0.0, 0.0, 0.001, 0.004, 0.015, 0.05, 0.93],
            ],
        }
    }

    pub fn space(&self) -> SdeResult<RegimeSpace> {
        RegimeSpace::new(self.regimes(), self.transition())
    }
}

/// Regime configuration: one of the built-in spaces or a caller-supplied one
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeSelection {
    Default(DefaultRegimes),
    Custom {
        regimes: Vec<f64>,
        transition: Vec<Vec<f64>>,
    },
}

impl RegimeSelection {
    pub fn resolve(&self) -> SdeResult<RegimeSpace> {
        match self {
            RegimeSelection::Default(defaults) => defaults.space(),
            RegimeSelection::Custom {
                regimes,
                transition,
            } => RegimeSpace::new(regimes.clone(), transition.clone()),
        }
    }
}

impl Default for RegimeSelection {
    fn default() -> Self {
        RegimeSelection::Default(DefaultRegimes::ThreeState)
    }
}

/// Validated regime multipliers and their row-stochastic transition matrix
#[derive(Clone, Debug, PartialEq)]
pub struct RegimeSpace {
    regimes: Vec<f64>,
    transition: Array2<f64>,
    cumulative: Array2<f64>,
}

impl RegimeSpace {
    pub fn new(regimes: Vec<f64>, transition: Vec<Vec<f64>>) -> SdeResult<Self> {
        let n = regimes.len();
        if n == 0 {
            return Err(SdeError::configuration(
                "regimes",
                "at least one regime is required",
            ));
        }
        if transition.len() != n {
            return Err(SdeError::configuration(
                "transition",
                format!("has {} rows but there are {} regimes", transition.len(), n),
            ));
        }

        for (i, &multiplier) in regimes.iter().enumerate() {
            if !multiplier.is_finite() || multiplier <= 0.0 {
                return Err(SdeError::InvalidParameters {
                    parameter: format!("regimes[{}]", i),
                    value: multiplier,
                    constraint: "must be positive and finite".to_string(),
                });
            }
            if regimes[..i].contains(&multiplier) {
                return Err(SdeError::configuration(
                    "regimes",
                    format!("multiplier {} appears more than once", multiplier),
                ));
            }
        }

        let mut flat = Vec::with_capacity(n * n);
        for (i, row) in transition.iter().enumerate() {
            if row.len() != n {
                return Err(SdeError::configuration(
                    "transition",
                    format!("row {} has {} entries, expected {}", i, row.len(), n),
                ));
            }
            if let Some(&p) = row.iter().find(|p| !p.is_finite() || **p < 0.0) {
                return Err(SdeError::configuration(
                    "transition",
                    format!("row {} contains invalid probability {}", i, p),
                ));
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(SdeError::configuration(
                    "transition",
                    format!("row {} sums to {}, expected 1", i, sum),
                ));
            }
            flat.extend_from_slice(row);
        }

        let transition = Array2::from_shape_vec((n, n), flat)
            .map_err(|e| SdeError::configuration("transition", e.to_string()))?;

        let mut cumulative = transition.clone();
        for mut row in cumulative.rows_mut() {
            let mut running = 0.0;
            for p in row.iter_mut() {
                running += *p;
                *p = running;
            }
        }

        Ok(RegimeSpace {
            regimes,
            transition,
            cumulative,
        })
    }

    pub fn len(&self) -> usize {
        self.regimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regimes.is_empty()
    }

    pub fn regimes(&self) -> &[f64] {
        &self.regimes
    }

    pub fn multiplier(&self, index: usize) -> f64 {
        self.regimes[index]
    }

    pub fn transition(&self) -> &Array2<f64> {
        &self.transition
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.transition.row(index)
    }

    /// Index of the multiplier closest to 1 (the "normal" market).
    pub fn neutral_index(&self) -> usize {
        self.regimes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - 1.0).abs().total_cmp(&(*b - 1.0).abs()))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Inverse-CDF selection of the next regime for a uniform draw `u ∈ [0, 1)`.
    pub fn next_index(&self, current: usize, u: f64) -> usize {
        let probs = self.transition.row(current);
        let cumulative = self.cumulative.row(current);

        let mut last_reachable = current;
        for (j, (&p, &c)) in probs.iter().zip(cumulative.iter()).enumerate() {
            if p <= 0.0 {
                continue;
            }
            if c >= u {
                return j;
            }
            last_reachable = j;
        }

        // Row sums can fall a rounding error short of the draw
        last_reachable
    }

    /// Advance one step from `current`, consuming exactly one uniform draw.
    pub fn advance<R: Rng + ?Sized>(&self, current: usize, rng: &mut R) -> usize {
        let u = rng::get_uniform_draw(rng);
        self.next_index(current, u)
    }

    /// Stationary distribution π with π P = π and Σ π = 1.
    ///
    /// Fails when the chain has no unique stationary law (reducible chains such
    /// as the identity matrix).
    pub fn stationary_distribution(&self) -> SdeResult<Vec<f64>> {
        let n = self.len();
        // (Pᵀ - I) π = 0 with the last equation replaced by Σ π = 1
        let system = DMatrix::from_fn(n, n, |i, j| {
            if i == n - 1 {
                1.0
            } else if i == j {
                self.transition[[j, i]] - 1.0
            } else {
                self.transition[[j, i]]
            }
        });
        let mut rhs = DVector::zeros(n);
        rhs[n - 1] = 1.0;

        let solution = system.lu().solve(&rhs).ok_or_else(|| {
            SdeError::configuration(
                "transition",
                "chain has no unique stationary distribution",
            )
        })?;

        if solution.iter().any(|p| !p.is_finite() || *p < -ROW_SUM_TOLERANCE) {
            return Err(SdeError::configuration(
                "transition",
                "chain has no unique stationary distribution",
            ));
        }

        Ok(solution.iter().map(|p| p.max(0.0)).collect())
    }

    /// Long-run average of the multiplier under the stationary distribution
    pub fn expected_multiplier(&self) -> SdeResult<f64> {
        let stationary = self.stationary_distribution()?;
        Ok(stationary
            .iter()
            .zip(self.regimes.iter())
            .map(|(p, d)| p * d)
            .sum())
    }
}

/// Mutable chain state for a single simulation run
#[derive(Debug)]
pub struct RegimeChain<'a> {
    space: &'a RegimeSpace,
    current: usize,
    history: Vec<usize>,
}

impl<'a> RegimeChain<'a> {
    pub fn new(space: &'a RegimeSpace, initial: usize) -> SdeResult<Self> {
        if initial >= space.len() {
            return Err(SdeError::configuration(
                "initial_regime",
                format!("index {} out of range for {} regimes", initial, space.len()),
            ));
        }

        Ok(RegimeChain {
            space,
            current: initial,
            history: vec![initial],
        })
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn multiplier(&self) -> f64 {
        self.space.multiplier(self.current)
    }

    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        self.current = self.space.advance(self.current, rng);
        self.history.push(self.current);
        self.current
    }

    /// Visited regime indices, starting with the initial one
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    pub fn into_history(self) -> Vec<usize> {
        self.history
    }
}
