// src/forecast.rs
//! Forecast paths and the three pure forecasting entry points.
//!
//! ```rust
//! use garch_fx::forecast::{garch_forecast, stochastic_forecast};
//! use garch_fx::models::garch::FittedParameters;
//! use garch_fx::models::regime::RegimeSelection;
//! use garch_fx::rng::seed_rng_from_u64;
//!
//! let params = FittedParameters::new(0.02, 0.05, 0.90).expect("Valid parameters");
//! let baseline = garch_forecast(1.0, 250, &params).expect("Valid inputs");
//!
//! let mut rng = seed_rng_from_u64(100);
//! let regime = RegimeSelection::default();
//! let noisy = stochastic_forecast(1.0, 250, &params, 1e-3, Some(&regime), &mut rng)
//!     .expect("Valid inputs");
//! assert_eq!(baseline.len(), noisy.len());
//! ```

use crate::error::SdeResult;
use crate::math_utils::{annualizer, TRADING_DAYS_PER_YEAR};
use crate::models::garch::{FittedParameters, Garch};
use crate::models::garch_fx::{GarchFx, GarchFxConfig, RegimeForecast};
use crate::models::heston::{Heston, HestonParams, HestonSimConfig};
use crate::models::regime::RegimeSelection;
use rand::Rng;
use serde::Serialize;

/// Ordered volatility forecasts; the first value is the seed volatility.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastPath(Vec<f64>);

impl ForecastPath {
    pub(crate) fn from_values(values: Vec<f64>) -> Self {
        ForecastPath(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Starting volatility
    pub fn seed(&self) -> f64 {
        self.0.first().copied().unwrap_or(0.0)
    }

    /// Volatility at the end of the horizon
    pub fn terminal(&self) -> f64 {
        self.0.last().copied().unwrap_or(0.0)
    }

    pub fn variances(&self) -> Vec<f64> {
        self.0.iter().map(|v| v * v).collect()
    }

    /// Rescale every value, e.g. `0.01` to turn percent units into fractions
    pub fn scaled(&self, factor: f64) -> ForecastPath {
        ForecastPath(self.0.iter().map(|v| v * factor).collect())
    }

    /// Per-period volatilities turned into annual ones
    pub fn annualized(&self, periods_per_year: f64) -> ForecastPath {
        self.scaled(annualizer(periods_per_year))
    }

    /// Annualised assuming daily steps
    pub fn annualized_daily(&self) -> ForecastPath {
        self.annualized(TRADING_DAYS_PER_YEAR)
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

impl AsRef<[f64]> for ForecastPath {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Deterministic GARCH(1,1) reference curve of `horizon + 1` values.
pub fn garch_forecast(
    seed_volatility: f64,
    horizon: usize,
    params: &FittedParameters,
) -> SdeResult<ForecastPath> {
    Ok(Garch::new(seed_volatility, horizon, *params)?.forecast())
}

/// GARCH-FX forecast; `regime: None` disables regime switching.
pub fn stochastic_forecast<R: Rng + ?Sized>(
    seed_volatility: f64,
    horizon: usize,
    params: &FittedParameters,
    theta: f64,
    regime: Option<&RegimeSelection>,
    rng: &mut R,
) -> SdeResult<ForecastPath> {
    let config = GarchFxConfig {
        theta,
        regime: regime.cloned(),
        initial_regime: None,
    };
    GarchFx::new(seed_volatility, horizon, *params, &config)?.forecast(rng)
}

/// GARCH-FX forecast that also returns the visited regime indices.
pub fn stochastic_forecast_with_regimes<R: Rng + ?Sized>(
    seed_volatility: f64,
    horizon: usize,
    params: &FittedParameters,
    config: &GarchFxConfig,
    rng: &mut R,
) -> SdeResult<RegimeForecast> {
    GarchFx::new(seed_volatility, horizon, *params, config)?.forecast_with_regimes(rng)
}

/// Heston QE volatility path on the default grid (T = 2.75, N = 1001, ψ_c = 1.5).
pub fn heston_forecast<R: Rng + ?Sized>(
    kappa: f64,
    theta: f64,
    v0: f64,
    sigma: f64,
    rng: &mut R,
) -> SdeResult<ForecastPath> {
    let params = HestonParams {
        kappa,
        theta,
        v0,
        sigma,
    };
    heston_forecast_with(params, HestonSimConfig::default(), rng)
}

/// Heston volatility path on an explicit grid and scheme.
pub fn heston_forecast_with<R: Rng + ?Sized>(
    params: HestonParams,
    config: HestonSimConfig,
    rng: &mut R,
) -> SdeResult<ForecastPath> {
    Heston::new(params, config)?.forecast(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seed_rng_from_u64;
    use approx::assert_relative_eq;

    #[test]
    fn test_path_accessors() {
        let path = ForecastPath::from_values(vec![1.0, 2.0, 3.0]);
        assert_eq!(path.seed(), 1.0);
        assert_eq!(path.terminal(), 3.0);
        assert_eq!(path.variances(), vec![1.0, 4.0, 9.0]);
        assert_eq!(path.scaled(0.5).values(), &[0.5, 1.0, 1.5]);
        assert_relative_eq!(path.annualized_daily().values()[1], 2.0 * 252f64.sqrt());
    }

    #[test]
    fn test_entry_points_validate() {
        let params = FittedParameters {
            omega: 0.02,
            alpha: 0.5,
            beta: 0.6,
        };
        assert!(garch_forecast(1.0, 5, &params).is_err());

        let mut rng = seed_rng_from_u64(1);
        assert!(heston_forecast(0.0, 0.04, 0.04, 0.3, &mut rng).is_err());
        assert!(heston_forecast(2.0, 0.04, 0.04, -0.3, &mut rng).is_err());
    }

    #[test]
    fn test_regime_path_matches_plain_forecast() {
        let params = FittedParameters::new(0.02, 0.05, 0.90).unwrap();
        let config = GarchFxConfig::default().with_regimes(RegimeSelection::default());

        let with_regimes =
            stochastic_forecast_with_regimes(1.0, 50, &params, &config, &mut seed_rng_from_u64(4))
                .unwrap();
        let plain = stochastic_forecast(
            1.0,
            50,
            &params,
            config.theta,
            config.regime.as_ref(),
            &mut seed_rng_from_u64(4),
        )
        .unwrap();

        assert_eq!(with_regimes.path, plain);
        assert_eq!(with_regimes.regimes.map(|r| r.len()), Some(51));
    }

    #[test]
    fn test_stochastic_forecast_custom_regime_mismatch() {
        let params = FittedParameters::new(0.02, 0.05, 0.90).unwrap();
        let regime = RegimeSelection::Custom {
            regimes: vec![0.8, 1.0, 1.2],
            transition: vec![vec![0.5, 0.5], vec![0.5, 0.5]],
        };
        let mut rng = seed_rng_from_u64(1);
        let err = stochastic_forecast(1.0, 10, &params, 1e-3, Some(&regime), &mut rng)
            .unwrap_err();
        assert!(err.is_configuration_error());
    }
}
