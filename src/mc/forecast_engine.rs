// src/mc/forecast_engine.rs
use crate::error::{validation::*, SdeError, SdeResult};
use crate::forecast::ForecastPath;
use crate::models::garch::{Garch, GarchFit};
use crate::models::garch_fx::{GarchFx, GarchFxConfig};
use crate::models::heston::{Heston, HestonParams, HestonSimConfig, DEFAULT_HESTON_SIGMA};
use crate::rng::{RngFactory, DEFAULT_SEED};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ModelSelection: u32 {
        const GARCH    = 1 << 0;
        const GARCH_FX = 1 << 1;
        const HESTON   = 1 << 2;
    }
}

/// Random stream used by each stochastic model within one engine run
const GARCH_FX_STREAM: u64 = 0;
const HESTON_STREAM: u64 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub horizon: usize,
    pub garch_fx: GarchFxConfig,
    /// Vol-of-vol for the GARCH-derived Heston run
    pub heston_sigma: f64,
    pub heston: HestonSimConfig,
    pub models: ModelSelection,
    pub seed: u64,
}

impl ForecastConfig {
    /// Validate the forecast configuration
    pub fn validate(&self) -> SdeResult<()> {
        validate_steps("horizon", self.horizon)?;
        self.garch_fx.validate()?;
        validate_non_negative("heston_sigma", self.heston_sigma)?;
        self.heston.validate()?;

        if self.models.is_empty() {
            return Err(SdeError::configuration(
                "models",
                "at least one model must be selected",
            ));
        }

        Ok(())
    }

    pub fn from_json_str(json: &str) -> SdeResult<Self> {
        let cfg: ForecastConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> SdeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            horizon: 1_000,
            garch_fx: GarchFxConfig::default(),
            heston_sigma: DEFAULT_HESTON_SIGMA,
            heston: HestonSimConfig::default(),
            models: ModelSelection::all(),
            seed: DEFAULT_SEED,
        }
    }
}

/// Paths produced by one engine run; models that were not selected are `None`.
#[derive(Clone, Debug, Default)]
pub struct ForecastSet {
    pub garch: Option<ForecastPath>,
    pub garch_fx: Option<ForecastPath>,
    /// Regime indices visited by the GARCH-FX run, when switching is enabled
    pub regimes: Option<Vec<usize>>,
    pub heston: Option<ForecastPath>,
}

impl ForecastSet {
    /// Named paths in display order
    pub fn columns(&self) -> Vec<(&'static str, &ForecastPath)> {
        [
            ("garch", self.garch.as_ref()),
            ("garch_fx", self.garch_fx.as_ref()),
            ("heston", self.heston.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, path)| path.map(|p| (name, p)))
        .collect()
    }
}

/// Run every selected simulator from one fitted model.
///
/// GARCH-FX and Heston each draw from their own stream derived from
/// `cfg.seed`, so toggling one model never changes the other's path.
pub fn run_forecasts(fit: &GarchFit, cfg: &ForecastConfig) -> SdeResult<ForecastSet> {
    cfg.validate()?;
    let factory = RngFactory::new(cfg.seed);
    let mut set = ForecastSet::default();

    info!(
        horizon = cfg.horizon,
        theta = cfg.garch_fx.theta,
        regimes = cfg.garch_fx.regime.is_some(),
        persistence = fit.params.persistence(),
        "running volatility forecasts"
    );

    if cfg.models.contains(ModelSelection::GARCH) {
        let garch = Garch::new(fit.seed_volatility, cfg.horizon, fit.params)?;
        set.garch = Some(garch.forecast());
    }

    if cfg.models.contains(ModelSelection::GARCH_FX) {
        let fx = GarchFx::new(fit.seed_volatility, cfg.horizon, fit.params, &cfg.garch_fx)?;
        let mut rng = factory.create_std_rng(GARCH_FX_STREAM);
        let result = fx.forecast_with_regimes(&mut rng)?;
        set.garch_fx = Some(result.path);
        set.regimes = result.regimes;
    }

    if cfg.models.contains(ModelSelection::HESTON) {
        let params = HestonParams::from_garch(&fit.params, fit.seed_volatility, cfg.heston_sigma)?;
        let heston = Heston::new(params, cfg.heston)?;
        let mut rng = factory.create_std_rng(HESTON_STREAM);
        set.heston = Some(heston.forecast(&mut rng)?);
    }

    Ok(set)
}
