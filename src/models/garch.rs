// src/models/garch.rs
//! GARCH(1,1) baseline variance recursion
//!
//! # Mathematical Framework
//!
//! With the shock term replaced by its conditional expectation, the GARCH(1,1)
//! variance forecast obeys the deterministic recursion
//! ```text
//! σ²_{t+1} = ω + (α + β) σ²_t
//! ```
//! For `α + β < 1` it converges geometrically to the long-run variance
//! ```text
//! σ²_∞ = ω / (1 - α - β)
//! σ²_h = σ²_∞ + (α + β)^h (σ²_0 - σ²_∞)
//! ```
//!
//! Parameters are estimated elsewhere; this module only consumes them through
//! the `GarchFitter` seam.

use super::model::VolatilityModel;
use crate::error::{validation::*, SdeError, SdeResult};
use crate::forecast::ForecastPath;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fitted GARCH(1,1) coefficients
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedParameters {
    pub omega: f64, // Constant term of the variance equation
    pub alpha: f64, // ARCH (shock) coefficient
    pub beta: f64,  // GARCH (persistence) coefficient
}

impl FittedParameters {
    pub fn new(omega: f64, alpha: f64, beta: f64) -> SdeResult<Self> {
        let params = Self { omega, alpha, beta };
        params.validate()?;
        Ok(params)
    }

    /// Covariance stationarity: ω > 0, α, β ∈ [0, 1], α + β < 1
    pub fn validate(&self) -> SdeResult<()> {
        validate_positive("omega", self.omega)?;
        validate_range("alpha", self.alpha, 0.0, 1.0)?;
        validate_range("beta", self.beta, 0.0, 1.0)?;

        let persistence = self.persistence();
        if persistence >= 1.0 {
            return Err(SdeError::InvalidParameters {
                parameter: "alpha+beta".to_string(),
                value: persistence,
                constraint: "must be < 1 for a finite long-run variance".to_string(),
            });
        }

        Ok(())
    }

    pub fn persistence(&self) -> f64 {
        self.alpha + self.beta
    }

    pub fn long_run_variance(&self) -> f64 {
        self.omega / (1.0 - self.persistence())
    }

    pub fn long_run_volatility(&self) -> f64 {
        self.long_run_variance().sqrt()
    }

    /// Steps until a deviation from the long-run variance halves
    pub fn half_life(&self) -> f64 {
        let persistence = self.persistence();
        if persistence <= 0.0 {
            0.0
        } else {
            0.5f64.ln() / persistence.ln()
        }
    }

    /// Closed-form h-step variance forecast from an initial variance
    pub fn forecast_variance(&self, initial_variance: f64, h: usize) -> f64 {
        let longrun = self.long_run_variance();
        longrun + self.persistence().powi(h as i32) * (initial_variance - longrun)
    }
}

/// Output of the external fitting routine
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GarchFit {
    /// Last conditional volatility of the fitted sample
    pub seed_volatility: f64,
    pub params: FittedParameters,
}

impl GarchFit {
    pub fn new(seed_volatility: f64, params: FittedParameters) -> SdeResult<Self> {
        validate_non_negative("seed_volatility", seed_volatility)?;
        params.validate()?;
        Ok(Self {
            seed_volatility,
            params,
        })
    }
}

/// Maximum-likelihood GARCH(1,1) estimation lives outside this crate; callers
/// plug their estimator in through this trait.
pub trait GarchFitter {
    fn fit(&self, log_returns: &[f64]) -> SdeResult<GarchFit>;
}

/// Deterministic GARCH(1,1) forecaster
#[derive(Clone, Debug)]
pub struct Garch {
    pub params: FittedParameters,
    pub seed_volatility: f64,
    pub horizon: usize,
}

impl Garch {
    pub fn new(seed_volatility: f64, horizon: usize, params: FittedParameters) -> SdeResult<Self> {
        params.validate()?;
        validate_non_negative("seed_volatility", seed_volatility)?;
        validate_steps("horizon", horizon)?;

        Ok(Garch {
            params,
            seed_volatility,
            horizon,
        })
    }

    /// One step of the variance recursion
    pub fn step_variance(&self, variance: f64) -> f64 {
        self.params.omega + self.params.persistence() * variance
    }

    pub fn forecast(&self) -> ForecastPath {
        let mut path = Vec::with_capacity(self.horizon + 1);
        path.push(self.seed_volatility);

        let mut variance = self.seed_volatility * self.seed_volatility;
        for _ in 0..self.horizon {
            variance = self.step_variance(variance);
            path.push(variance.sqrt());
        }

        ForecastPath::from_values(path)
    }
}

impl VolatilityModel for Garch {
    fn name(&self) -> &'static str {
        "GARCH"
    }

    fn path_len(&self) -> usize {
        self.horizon + 1
    }

    fn simulate<R: Rng + ?Sized>(&self, _rng: &mut R) -> SdeResult<ForecastPath> {
        Ok(self.forecast())
    }
}
