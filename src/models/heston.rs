// src/models/heston.rs
//! Heston Stochastic Variance Simulator
//!
//! # Mathematical Framework
//!
//! The Heston variance follows the CIR square-root diffusion:
//! ```text
//! dV_t = κ(θ - V_t) dt + σ√V_t dW_t
//! ```
//!
//! Where:
//! - V_t: Instantaneous variance
//! - κ: Mean reversion speed
//! - θ: Long-term variance level
//! - σ: Volatility of variance (vol-of-vol)
//!
//! Only the variance leg is simulated here; its square root is the volatility
//! forecast compared against the GARCH curves.
//!
//! # Feller Condition
//!
//! ```text
//! 2κθ > σ²
//! ```
//! When violated the variance touches zero. The QE scheme handles this without
//! truncation, so a violation is reported but not rejected.
//!
//! # Discretization Schemes
//!
//! 1. **Andersen QE**: moment-matched, non-negative by construction, no bias
//!    from flooring
//! 2. **Full Truncation Euler**: Euler step with `max(V, 0)` floors, kept for
//!    comparison

use super::garch::FittedParameters;
use super::model::VolatilityModel;
use crate::error::{validation::*, SdeError, SdeResult};
use crate::forecast::ForecastPath;
use crate::math_utils::{cir_conditional_mean, cir_conditional_variance};
use crate::rng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Critical ψ switching between the quadratic and exponential QE branches
pub const DEFAULT_PSI_C: f64 = 1.5;
/// Total simulated horizon T
pub const DEFAULT_HESTON_T: f64 = 2.75;
/// Grid points N
pub const DEFAULT_HESTON_N: usize = 1001;
/// Vol-of-vol used when Heston is driven from fitted GARCH parameters
pub const DEFAULT_HESTON_SIGMA: f64 = 0.6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceScheme {
    #[default]
    AndersenQE,
    FullTruncationEuler,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HestonParams {
    pub kappa: f64, // Mean reversion speed
    pub theta: f64, // Long-term variance
    pub v0: f64,    // Initial variance
    pub sigma: f64, // Volatility of variance (vol-of-vol)
}

impl HestonParams {
    /// Map fitted GARCH persistence onto CIR dynamics:
    /// `κ = 1 - α - β`, `θ = ω / κ`, `V_0 = seed²`.
    pub fn from_garch(
        params: &FittedParameters,
        seed_volatility: f64,
        sigma: f64,
    ) -> SdeResult<Self> {
        params.validate()?;
        validate_non_negative("seed_volatility", seed_volatility)?;

        let kappa = 1.0 - params.persistence();
        let heston = HestonParams {
            kappa,
            theta: params.omega / kappa,
            v0: seed_volatility * seed_volatility,
            sigma,
        };
        heston.validate()?;
        Ok(heston)
    }

    /// `σ = 0` is accepted as the deterministic mean-reversion limit.
    pub fn validate(&self) -> SdeResult<()> {
        validate_positive("kappa", self.kappa)?;
        validate_positive("theta", self.theta)?;
        validate_non_negative("v0", self.v0)?;
        validate_non_negative("sigma", self.sigma)?;
        Ok(())
    }

    pub fn feller_satisfied(&self) -> bool {
        2.0 * self.kappa * self.theta > self.sigma * self.sigma
    }

    /// Exact mean of V_t given V_0
    pub fn expected_variance(&self, t: f64) -> f64 {
        cir_conditional_mean(self.v0, self.kappa, self.theta, t)
    }
}

/// Time grid and scheme settings
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HestonSimConfig {
    /// Total horizon T
    pub t: f64,
    /// Number of grid points N (the path holds N values, dt = T / N)
    pub steps: usize,
    pub psi_c: f64,
    pub scheme: VarianceScheme,
}

impl HestonSimConfig {
    pub fn validate(&self) -> SdeResult<()> {
        validate_positive("t", self.t)?;
        validate_steps("steps", self.steps)?;
        // Andersen recommends ψ_c in [1, 2]
        validate_range("psi_c", self.psi_c, 1.0, 2.0)?;
        Ok(())
    }

    pub fn dt(&self) -> f64 {
        self.t / self.steps as f64
    }
}

impl Default for HestonSimConfig {
    fn default() -> Self {
        HestonSimConfig {
            t: DEFAULT_HESTON_T,
            steps: DEFAULT_HESTON_N,
            psi_c: DEFAULT_PSI_C,
            scheme: VarianceScheme::AndersenQE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Heston {
    pub params: HestonParams,
    pub config: HestonSimConfig,
}

impl Heston {
    pub fn new(params: HestonParams, config: HestonSimConfig) -> SdeResult<Self> {
        params.validate()?;
        config.validate()?;

        if !params.feller_satisfied() {
            warn!(
                kappa = params.kappa,
                theta = params.theta,
                sigma = params.sigma,
                "Feller condition violated (2κθ ≤ σ²); variance will touch zero"
            );
        }

        Ok(Heston { params, config })
    }

    /// Advance the variance by one grid step
    pub fn step<R: Rng + ?Sized>(&self, v: &mut f64, dt: f64, rng: &mut R) -> SdeResult<()> {
        if !v.is_finite() || *v < 0.0 {
            return Err(SdeError::instability(
                "Heston step",
                format!("variance is invalid: {}", v),
            ));
        }

        *v = match self.config.scheme {
            VarianceScheme::AndersenQE => self.step_andersen_qe(*v, dt, rng),
            VarianceScheme::FullTruncationEuler => self.step_full_truncation_euler(*v, dt, rng),
        };

        if !v.is_finite() || *v < 0.0 {
            return Err(SdeError::instability(
                &format!("Heston {}", self.scheme_name()),
                format!("variance became invalid after step: {}", v),
            ));
        }

        Ok(())
    }

    /// Andersen's Quadratic Exponential (QE) scheme
    ///
    /// # Mathematical Description
    ///
    /// Match the exact conditional moments of the CIR transition:
    /// ```text
    /// m  = θ + (V_n - θ)e^(-κΔt)
    /// s² = V_n σ² e^(-κΔt)/κ (1 - e^(-κΔt)) + θσ²/(2κ) (1 - e^(-κΔt))²
    /// ψ  = s² / m²
    /// ```
    ///
    /// ## ψ ≤ ψ_c: squared shifted normal
    /// ```text
    /// b² = 2/ψ - 1 + √(2/ψ (2/ψ - 1)),   a = m / (1 + b²)
    /// V_{n+1} = a (b + Z)²,              Z ~ N(0,1)
    /// ```
    ///
    /// ## ψ > ψ_c: atom at zero plus exponential tail
    /// ```text
    /// p = (ψ - 1)/(ψ + 1),   β = (1 - p)/m
    /// V_{n+1} = 0                        if U ≤ p
    /// V_{n+1} = ln((1 - p)/(1 - U)) / β  otherwise,  U ~ U(0,1)
    /// ```
    ///
    /// Both branches are non-negative without any flooring. A vanishing ψ
    /// (no vol-of-vol) returns the conditional mean without drawing.
    fn step_andersen_qe<R: Rng + ?Sized>(&self, v: f64, dt: f64, rng: &mut R) -> f64 {
        let HestonParams {
            kappa,
            theta,
            sigma,
            ..
        } = self.params;

        let m = cir_conditional_mean(v, kappa, theta, dt);
        let s2 = cir_conditional_variance(v, kappa, theta, sigma, dt);
        let psi = s2 / (m * m);

        if psi <= f64::EPSILON {
            return m;
        }

        if psi <= self.config.psi_c {
            let inv_psi = 1.0 / psi;
            let b2 = 2.0 * inv_psi - 1.0 + (2.0 * inv_psi * (2.0 * inv_psi - 1.0)).sqrt();
            let a = m / (1.0 + b2);
            let z = rng::get_normal_draw(rng);
            a * (b2.sqrt() + z).powi(2)
        } else {
            let p = (psi - 1.0) / (psi + 1.0);
            let beta = (1.0 - p) / m;
            let u = rng::get_uniform_draw(rng);
            if u <= p {
                0.0
            } else {
                ((1.0 - p) / (1.0 - u)).ln() / beta
            }
        }
    }

    /// Full Truncation Euler
    ///
    /// ```text
    /// V_{n+1} = max(0, V_n + κ(θ - V_n)Δt + σ√max(V_n, 0) √Δt Z)
    /// ```
    fn step_full_truncation_euler<R: Rng + ?Sized>(&self, v: f64, dt: f64, rng: &mut R) -> f64 {
        let z = rng::get_normal_draw(rng);
        let sqrt_v = v.max(0.0).sqrt();
        let dv = self.params.kappa * (self.params.theta - v) * dt
            + self.params.sigma * sqrt_v * dt.sqrt() * z;
        (v + dv).max(0.0)
    }

    /// Variance path of `config.steps` values starting at `v0`
    pub fn simulate_variance<R: Rng + ?Sized>(&self, rng: &mut R) -> SdeResult<Vec<f64>> {
        let dt = self.config.dt();
        let mut variances = Vec::with_capacity(self.config.steps);
        let mut v = self.params.v0;
        variances.push(v);

        for _ in 1..self.config.steps {
            self.step(&mut v, dt, rng)?;
            variances.push(v);
        }

        debug!(
            steps = self.config.steps,
            dt,
            scheme = self.scheme_name(),
            "Heston variance path simulated"
        );

        Ok(variances)
    }

    pub fn forecast<R: Rng + ?Sized>(&self, rng: &mut R) -> SdeResult<ForecastPath> {
        let variances = self.simulate_variance(rng)?;
        Ok(ForecastPath::from_values(
            variances.into_iter().map(f64::sqrt).collect(),
        ))
    }

    /// Get current scheme name for reporting
    pub fn scheme_name(&self) -> &'static str {
        match self.config.scheme {
            VarianceScheme::AndersenQE => "Andersen QE",
            VarianceScheme::FullTruncationEuler => "Full Truncation Euler",
        }
    }
}

impl VolatilityModel for Heston {
    fn name(&self) -> &'static str {
        "Heston"
    }

    fn path_len(&self) -> usize {
        self.config.steps
    }

    fn simulate<R: Rng + ?Sized>(&self, rng: &mut R) -> SdeResult<ForecastPath> {
        self.forecast(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seed_rng_from_u64;
    use approx::assert_relative_eq;

    fn params(sigma: f64) -> HestonParams {
        HestonParams {
            kappa: 2.0,
            theta: 0.04,
            v0: 0.04,
            sigma,
        }
    }

    #[test]
    fn test_heston_schemes() {
        for scheme in [VarianceScheme::AndersenQE, VarianceScheme::FullTruncationEuler] {
            let config = HestonSimConfig {
                scheme,
                ..Default::default()
            };
            let heston = Heston::new(params(0.3), config).expect("Valid parameters");
            let mut rng = seed_rng_from_u64(42);

            let mut v = heston.params.v0;
            for _ in 0..100 {
                heston
                    .step(&mut v, 0.01, &mut rng)
                    .expect("Step should succeed");
                assert!(v >= 0.0, "Variance must be non-negative");
            }
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let bad = [
            HestonParams { kappa: 0.0, ..params(0.3) },
            HestonParams { theta: -0.04, ..params(0.3) },
            HestonParams { v0: -0.01, ..params(0.3) },
            HestonParams { sigma: -0.3, ..params(0.3) },
        ];
        for p in bad {
            let err = Heston::new(p, HestonSimConfig::default()).unwrap_err();
            assert!(err.is_configuration_error());
        }

        let bad_grid = HestonSimConfig {
            steps: 0,
            ..Default::default()
        };
        assert!(Heston::new(params(0.3), bad_grid).is_err());

        let bad_psi = HestonSimConfig {
            psi_c: 3.0,
            ..Default::default()
        };
        assert!(Heston::new(params(0.3), bad_psi).is_err());
    }

    #[test]
    fn test_feller_violation_is_accepted() {
        let p = params(1.0);
        assert!(!p.feller_satisfied());
        assert!(Heston::new(p, HestonSimConfig::default()).is_ok());
    }

    #[test]
    fn test_from_garch_mapping() {
        let fitted = FittedParameters::new(0.02, 0.05, 0.90).unwrap();
        let p = HestonParams::from_garch(&fitted, 1.2, DEFAULT_HESTON_SIGMA).unwrap();
        assert_relative_eq!(p.kappa, 0.05, epsilon = 1e-12);
        assert_relative_eq!(p.theta, 0.4, epsilon = 1e-9);
        assert_relative_eq!(p.v0, 1.44, epsilon = 1e-12);
        assert_eq!(p.sigma, DEFAULT_HESTON_SIGMA);
    }

    #[test]
    fn test_exponential_branch_hits_zero() {
        // Large vol-of-vol against a tiny long-run level forces ψ > ψ_c
        let p = HestonParams {
            kappa: 0.5,
            theta: 0.01,
            v0: 0.001,
            sigma: 2.0,
        };
        let heston = Heston::new(p, HestonSimConfig::default()).unwrap();
        let variances = heston.simulate_variance(&mut seed_rng_from_u64(8)).unwrap();

        assert_eq!(variances.len(), DEFAULT_HESTON_N);
        assert!(variances.iter().all(|v| *v >= 0.0));
        assert!(variances.iter().any(|v| *v == 0.0));
    }

    #[test]
    fn test_path_starts_at_seed() {
        let heston = Heston::new(params(0.3), HestonSimConfig::default()).unwrap();
        let path = heston.forecast(&mut seed_rng_from_u64(1)).unwrap();
        assert_eq!(path.len(), DEFAULT_HESTON_N);
        assert_relative_eq!(path.seed(), 0.2, epsilon = 1e-15);
    }
}
