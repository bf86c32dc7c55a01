// src/analytics/summary.rs
//! Descriptive statistics for forecast paths and the realised-volatility
//! benchmark they are compared against.
//!
//! # Roughness Index
//!
//! ```text
//! R = s / x̄          s: sample std (n - 1), x̄: mean of the path
//! ```
//! A flat GARCH curve has a small `R`; a spiky GARCH-FX path a large one.
//!
//! # Realised Volatility
//!
//! ```text
//! RV_i = std_pop(r_{i-w}, ..., r_{i-1})      i = start, ..., start + steps - 1
//! ```
//! When fewer than `w` returns precede `i`, all of them are used.

use crate::error::{validation::*, SdeError, SdeResult};
use crate::forecast::ForecastPath;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Rolling window used for realised volatility when none is given
pub const DEFAULT_REALIZED_WINDOW: usize = 180;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub mean: f64,
    /// Value at the end of the horizon
    pub terminal: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub roughness: f64,
}

impl ForecastSummary {
    pub fn from_path(path: &ForecastPath) -> SdeResult<Self> {
        Self::from_values(path.values())
    }

    pub fn from_values(values: &[f64]) -> SdeResult<Self> {
        if values.len() < 2 {
            return Err(SdeError::configuration(
                "path",
                format!("need at least 2 values to summarise, got {}", values.len()),
            ));
        }

        let mean = values.iter().mean();
        let std_dev = values.iter().std_dev();
        let roughness = if mean != 0.0 { std_dev / mean } else { f64::NAN };

        Ok(ForecastSummary {
            mean,
            terminal: values[values.len() - 1],
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
            std_dev,
            roughness,
        })
    }

    /// Label/value rows in display order
    pub fn rows(&self, horizon: usize) -> Vec<(String, String)> {
        vec![
            ("Mean Forecasted Volatility".to_string(), format!("{:.5}", self.mean)),
            (
                format!("Volatility at Horizon ({} days)", horizon),
                format!("{:.5}", self.terminal),
            ),
            (
                "Min / Max Volatility".to_string(),
                format!("{:.5} / {:.5}", self.min, self.max),
            ),
            ("Standard Deviation".to_string(), format!("{:.5}", self.std_dev)),
            (
                "Roughness Index (std / mean)".to_string(),
                format!("{:.3}", self.roughness),
            ),
        ]
    }
}

/// Log returns `ln(p_t / p_{t-1})` of a positive price series
pub fn log_returns(prices: &[f64]) -> SdeResult<Vec<f64>> {
    for price in prices {
        validate_positive("price", *price)?;
    }
    Ok(prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
}

/// Trailing-window realised volatility for `steps` consecutive indices
/// starting at `start`.
pub fn realized_volatility(
    returns: &[f64],
    window: usize,
    start: usize,
    steps: usize,
) -> SdeResult<Vec<f64>> {
    if window == 0 {
        return Err(SdeError::configuration("window", "must be greater than 0"));
    }
    if start == 0 {
        return Err(SdeError::configuration(
            "start",
            "at least one return must precede the first index",
        ));
    }
    let end = start + steps;
    if end > returns.len() + 1 {
        return Err(SdeError::configuration(
            "steps",
            format!(
                "{} returns cannot cover indices {}..{}",
                returns.len(),
                start,
                end
            ),
        ));
    }

    Ok((start..end)
        .map(|i| {
            let history = &returns[i.saturating_sub(window)..i];
            history.iter().population_std_dev()
        })
        .collect())
}
