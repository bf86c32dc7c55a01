// src/models/garch_fx.rs
//! Stochastic GARCH extension (GARCH-FX)
//!
//! # Mathematical Framework
//!
//! The deterministic GARCH recursion feeds back its own lagged variance. GARCH-FX
//! replaces that lagged variance with a Gamma draw whose *mode* sits on it:
//! ```text
//! k_t   = v_t / θ + 1                 (shape, always > 1)
//! X_t   ~ Gamma(k_t, θ)               mode(X_t) = (k_t - 1) θ = v_t
//! v_t+1 = δ_t ω + (α + β) X_t
//! ```
//! `θ` is the dispersion (scale): as `θ → 0` the draw collapses onto `v_t` and
//! the plain GARCH curve is recovered; larger `θ` gives heavier volatility
//! spikes. `δ_t` is the multiplier of the current regime when regime switching
//! is enabled, and 1 otherwise.
//!
//! # Conventions
//!
//! - The regime multiplier scales `ω` only, never the sampled variance.
//! - Random draws per step, in order: one uniform for the regime chain (when
//!   enabled), then one Gamma variate.
//! - `θ = 0` is the degenerate limit: no Gamma draw is taken and the step is the
//!   deterministic recursion.

use super::garch::FittedParameters;
use super::model::VolatilityModel;
use super::regime::{RegimeChain, RegimeSelection, RegimeSpace};
use crate::error::{validation::*, SdeError, SdeResult};
use crate::forecast::ForecastPath;
use rand::Rng;
use rand_distr::{Distribution, Gamma};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Dispersion used when none is configured
pub const DEFAULT_THETA: f64 = 1e-3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarchFxConfig {
    /// Gamma scale θ controlling volatility of volatility
    pub theta: f64,
    /// `None` disables regime switching
    pub regime: Option<RegimeSelection>,
    /// Starting regime index; defaults to the multiplier closest to 1
    pub initial_regime: Option<usize>,
}

impl GarchFxConfig {
    pub fn validate(&self) -> SdeResult<()> {
        validate_non_negative("theta", self.theta)?;
        // Subnormal dispersions overflow the Gamma shape v / θ
        if self.theta != 0.0 && !self.theta.is_normal() {
            return Err(SdeError::InvalidParameters {
                parameter: "theta".to_string(),
                value: self.theta,
                constraint: format!("must be 0 or at least {:e}", f64::MIN_POSITIVE),
            });
        }

        match (&self.regime, self.initial_regime) {
            (Some(selection), initial) => {
                let space = selection.resolve()?;
                if let Some(initial) = initial {
                    if initial >= space.len() {
                        return Err(SdeError::configuration(
                            "initial_regime",
                            format!("index {} out of range for {} regimes", initial, space.len()),
                        ));
                    }
                }
            }
            (None, Some(_)) => {
                return Err(SdeError::configuration(
                    "initial_regime",
                    "set without regime switching",
                ));
            }
            (None, None) => {}
        }
        Ok(())
    }

    pub fn with_regimes(mut self, selection: RegimeSelection) -> Self {
        self.regime = Some(selection);
        self
    }
}

impl Default for GarchFxConfig {
    fn default() -> Self {
        GarchFxConfig {
            theta: DEFAULT_THETA,
            regime: None,
            initial_regime: None,
        }
    }
}

/// Volatility path together with the regimes visited while producing it
#[derive(Clone, Debug)]
pub struct RegimeForecast {
    pub path: ForecastPath,
    /// `horizon + 1` indices (initial regime first); `None` without switching
    pub regimes: Option<Vec<usize>>,
}

#[derive(Clone, Debug)]
pub struct GarchFx {
    pub params: FittedParameters,
    pub seed_volatility: f64,
    pub horizon: usize,
    theta: f64,
    regimes: Option<RegimeSpace>,
    initial_regime: usize,
}

impl GarchFx {
    pub fn new(
        seed_volatility: f64,
        horizon: usize,
        params: FittedParameters,
        config: &GarchFxConfig,
    ) -> SdeResult<Self> {
        params.validate()?;
        validate_non_negative("seed_volatility", seed_volatility)?;
        validate_steps("horizon", horizon)?;
        config.validate()?;

        let regimes = config
            .regime
            .as_ref()
            .map(RegimeSelection::resolve)
            .transpose()?;
        let initial_regime = match (&regimes, config.initial_regime) {
            (Some(_), Some(index)) => index,
            (Some(space), None) => space.neutral_index(),
            (None, _) => 0,
        };

        // θ is not capped; dispersions wider than the long-run level are only flagged
        let long_run = params.long_run_variance();
        if config.theta > long_run {
            warn!(
                theta = config.theta,
                long_run_variance = long_run,
                "GARCH-FX dispersion exceeds the long-run variance; expect extreme spikes"
            );
        }

        Ok(GarchFx {
            params,
            seed_volatility,
            horizon,
            theta: config.theta,
            regimes,
            initial_regime,
        })
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn regime_space(&self) -> Option<&RegimeSpace> {
        self.regimes.as_ref()
    }

    pub fn initial_regime(&self) -> usize {
        self.initial_regime
    }

    /// Mode-matched Gamma draw around `variance`
    fn perturb<R: Rng + ?Sized>(&self, variance: f64, rng: &mut R) -> SdeResult<f64> {
        if self.theta == 0.0 {
            return Ok(variance);
        }

        let shape = variance / self.theta + 1.0;
        if !shape.is_finite() {
            return Err(SdeError::InvalidParameters {
                parameter: "theta".to_string(),
                value: self.theta,
                constraint: format!("too small for variance {}", variance),
            });
        }
        let gamma = Gamma::new(shape, self.theta).map_err(|e| {
            SdeError::instability(
                "GARCH-FX",
                format!("gamma(shape={}, scale={}) rejected: {}", shape, self.theta, e),
            )
        })?;
        Ok(gamma.sample(rng))
    }

    /// Simulate one path, also reporting the regime sequence
    pub fn forecast_with_regimes<R: Rng + ?Sized>(&self, rng: &mut R) -> SdeResult<RegimeForecast> {
        let mut chain = self
            .regimes
            .as_ref()
            .map(|space| RegimeChain::new(space, self.initial_regime))
            .transpose()?;

        let mut path = Vec::with_capacity(self.horizon + 1);
        path.push(self.seed_volatility);

        let persistence = self.params.persistence();
        let mut variance = self.seed_volatility * self.seed_volatility;

        for step in 0..self.horizon {
            let delta = match chain.as_mut() {
                Some(chain) => {
                    chain.advance(rng);
                    chain.multiplier()
                }
                None => 1.0,
            };

            let stochastic_variance = self.perturb(variance, rng)?;
            variance = self.params.omega * delta + persistence * stochastic_variance;

            if !variance.is_finite() || variance < 0.0 {
                return Err(SdeError::instability(
                    "GARCH-FX",
                    format!("variance became invalid at step {}: {}", step + 1, variance),
                ));
            }
            path.push(variance.sqrt());
        }

        debug!(
            horizon = self.horizon,
            theta = self.theta,
            regimes = self.regimes.as_ref().map_or(0, RegimeSpace::len),
            "GARCH-FX path simulated"
        );

        Ok(RegimeForecast {
            path: ForecastPath::from_values(path),
            regimes: chain.map(RegimeChain::into_history),
        })
    }

    pub fn forecast<R: Rng + ?Sized>(&self, rng: &mut R) -> SdeResult<ForecastPath> {
        self.forecast_with_regimes(rng).map(|f| f.path)
    }
}

impl VolatilityModel for GarchFx {
    fn name(&self) -> &'static str {
        "GARCH-FX"
    }

    fn path_len(&self) -> usize {
        self.horizon + 1
    }

    fn simulate<R: Rng + ?Sized>(&self, rng: &mut R) -> SdeResult<ForecastPath> {
        self.forecast(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::garch::Garch;
    use crate::models::regime::DefaultRegimes;
    use crate::rng::seed_rng_from_u64;
    use approx::assert_relative_eq;

    fn params() -> FittedParameters {
        FittedParameters::new(0.02, 0.05, 0.90).expect("Valid parameters")
    }

    #[test]
    fn test_zero_theta_recovers_garch() {
        let cfg = GarchFxConfig {
            theta: 0.0,
            ..Default::default()
        };
        let fx = GarchFx::new(1.0, 5, params(), &cfg).unwrap();
        let garch = Garch::new(1.0, 5, params()).unwrap();

        let mut rng = seed_rng_from_u64(1);
        let stochastic = fx.forecast(&mut rng).unwrap();
        assert_eq!(stochastic.values(), garch.forecast().values());
        assert_relative_eq!(stochastic.values()[1], (0.02f64 + 0.95).sqrt());
    }

    #[test]
    fn test_negative_theta_rejected() {
        let cfg = GarchFxConfig {
            theta: -1e-3,
            ..Default::default()
        };
        let err = GarchFx::new(1.0, 5, params(), &cfg).unwrap_err();
        assert!(err.is_configuration_error());

        let cfg = GarchFxConfig {
            theta: f64::NAN,
            ..Default::default()
        };
        assert!(GarchFx::new(1.0, 5, params(), &cfg).is_err());
    }

    #[test]
    fn test_path_shape_and_positivity() {
        let cfg = GarchFxConfig {
            theta: 0.05,
            ..Default::default()
        };
        let fx = GarchFx::new(0.8, 500, params(), &cfg).unwrap();
        let path = fx.forecast(&mut seed_rng_from_u64(9)).unwrap();

        assert_eq!(path.len(), 501);
        assert_eq!(path.seed(), 0.8);
        // ω > 0 keeps every forecast strictly positive
        assert!(path.values().iter().all(|v| *v > 0.0));
    }

    #[test]
    fn test_regime_history_reported() {
        let cfg = GarchFxConfig::default().with_regimes(RegimeSelection::Default(
            DefaultRegimes::ThreeState,
        ));
        let fx = GarchFx::new(1.0, 200, params(), &cfg).unwrap();
        assert_eq!(fx.initial_regime(), 1);

        let result = fx.forecast_with_regimes(&mut seed_rng_from_u64(5)).unwrap();
        let regimes = result.regimes.expect("Regime switching enabled");
        assert_eq!(regimes.len(), 201);
        assert_eq!(regimes[0], 1);
        assert!(regimes.iter().all(|&r| r < 3));
    }

    #[test]
    fn test_out_of_range_initial_regime() {
        let cfg = GarchFxConfig {
            initial_regime: Some(3),
            ..GarchFxConfig::default().with_regimes(RegimeSelection::default())
        };
        assert!(GarchFx::new(1.0, 10, params(), &cfg).is_err());

        // An initial regime without a regime space is a mismatch, not ignored
        let cfg = GarchFxConfig {
            initial_regime: Some(42),
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.is_configuration_error());
        assert!(format!("{}", err).contains("initial_regime"));
        assert!(GarchFx::new(1.0, 10, params(), &cfg).is_err());
    }

    #[test]
    fn test_subnormal_theta_rejected() {
        let cfg = GarchFxConfig {
            theta: 1e-310,
            ..Default::default()
        };
        let err = GarchFx::new(1.0, 10, params(), &cfg).unwrap_err();
        assert!(matches!(
            err,
            SdeError::InvalidParameters { ref parameter, .. } if parameter == "theta"
        ));

        // The smallest normal dispersion still produces a path
        let cfg = GarchFxConfig {
            theta: f64::MIN_POSITIVE,
            ..Default::default()
        };
        let fx = GarchFx::new(1.0, 10, params(), &cfg).unwrap();
        let path = fx.forecast(&mut seed_rng_from_u64(2)).unwrap();
        assert_eq!(path.len(), 11);
        assert!(path.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_absorbing_regime_shifts_long_run_level() {
        // Always in the 1.5 regime: the target becomes 1.5 ω / (1 - α - β)
        let cfg = GarchFxConfig {
            theta: 0.0,
            regime: Some(RegimeSelection::Custom {
                regimes: vec![0.5, 1.5],
                transition: vec![vec![0.0, 1.0], vec![0.0, 1.0]],
            }),
            initial_regime: Some(0),
        };
        let fx = GarchFx::new(1.0, 2000, params(), &cfg).unwrap();
        let path = fx.forecast(&mut seed_rng_from_u64(11)).unwrap();
        let terminal_variance = path.terminal().powi(2);
        assert_relative_eq!(terminal_variance, 1.5 * 0.4, epsilon = 1e-9);
    }
}
