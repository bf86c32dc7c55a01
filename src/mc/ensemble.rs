// src/mc/ensemble.rs
//! Monte Carlo ensembles of independent forecast paths
//!
//! Each run `i` draws from its own generator seeded with `seed + i`, so the
//! ensemble is identical no matter how many Rayon threads execute it. Paths
//! are stored row-wise in an `Array2` (runs × path length) for per-step
//! statistics.

use crate::error::{validation::*, SdeError, SdeResult};
use crate::models::model::VolatilityModel;
use crate::rng::{RngFactory, DEFAULT_SEED};
use ndarray::{Array2, ArrayView1, Axis};
use ndarray::parallel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    pub runs: usize,
    pub seed: u64,
}

impl EnsembleConfig {
    pub fn validate(&self) -> SdeResult<()> {
        validate_paths(self.runs)
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        EnsembleConfig {
            runs: 1_000,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EnsembleResult {
    paths: Array2<f64>,
}

impl EnsembleResult {
    pub fn runs(&self) -> usize {
        self.paths.nrows()
    }

    pub fn steps(&self) -> usize {
        self.paths.ncols()
    }

    pub fn paths(&self) -> &Array2<f64> {
        &self.paths
    }

    pub fn path(&self, run: usize) -> ArrayView1<'_, f64> {
        self.paths.row(run)
    }

    /// Cross-sectional mean at every step
    pub fn mean_path(&self) -> Vec<f64> {
        self.paths
            .mean_axis(Axis(0))
            .map(|mean| mean.to_vec())
            .unwrap_or_default()
    }

    /// Cross-sectional sample standard deviation at every step
    pub fn std_path(&self) -> Vec<f64> {
        let ddof = if self.runs() > 1 { 1.0 } else { 0.0 };
        self.paths.std_axis(Axis(0), ddof).to_vec()
    }

    /// Linearly interpolated quantile at every step
    pub fn quantile_path(&self, q: f64) -> SdeResult<Vec<f64>> {
        validate_range("q", q, 0.0, 1.0)?;

        Ok(self
            .paths
            .axis_iter(Axis(1))
            .map(|column| {
                let mut sorted = column.to_vec();
                sorted.sort_by(f64::total_cmp);
                interpolate_quantile(&sorted, q)
            })
            .collect())
    }

    pub fn terminal_values(&self) -> Vec<f64> {
        match self.steps() {
            0 => Vec::new(),
            n => self.paths.column(n - 1).to_vec(),
        }
    }
}

fn interpolate_quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Simulate `cfg.runs` independent paths of `model` in parallel.
pub fn run_ensemble<M>(model: &M, cfg: &EnsembleConfig) -> SdeResult<EnsembleResult>
where
    M: VolatilityModel + Sync,
{
    cfg.validate()?;
    let factory = RngFactory::new(cfg.seed);
    let steps = model.path_len();

    let mut paths = Array2::<f64>::zeros((cfg.runs, steps));
    paths
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .try_for_each(|(i, mut row)| -> SdeResult<()> {
            let mut rng = factory.create_std_rng(i as u64);
            let path = model.simulate(&mut rng)?;
            if path.len() != steps {
                return Err(SdeError::instability(
                    model.name(),
                    format!("path has {} values, expected {}", path.len(), steps),
                ));
            }
            row.assign(&ArrayView1::from(path.values()));
            Ok(())
        })?;

    debug!(
        model = model.name(),
        runs = cfg.runs,
        steps,
        seed = cfg.seed,
        "ensemble simulated"
    );

    Ok(EnsembleResult { paths })
}
