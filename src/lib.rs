//! # garch-fx: Stochastic Volatility Forecasting
//!
//! Forward volatility simulation from a fitted GARCH(1,1) model, with three
//! simulators compared side by side.
//!
//! ## Key Features
//!
//! - **GARCH baseline**: deterministic mean-reverting variance recursion
//! - **GARCH-FX**: mode-matched Gamma perturbation of the lagged variance,
//!   with optional Markov regime switching of the intercept
//! - **Heston**: CIR variance paths via the Andersen Quadratic-Exponential scheme
//! - **Ensembles**: parallel, reproducible Monte Carlo runs with Rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use garch_fx::mc::forecast_engine::{run_forecasts, ForecastConfig};
//! use garch_fx::models::garch::{FittedParameters, GarchFit};
//!
//! let params = FittedParameters::new(0.02, 0.05, 0.90).expect("Valid parameters");
//! let fit = GarchFit::new(1.0, params).expect("Valid fit");
//!
//! let cfg = ForecastConfig {
//!     horizon: 250,
//!     ..Default::default()
//! };
//! let set = run_forecasts(&fit, &cfg).expect("Valid configuration");
//! for (name, path) in set.columns() {
//!     println!("{}: terminal volatility {:.4}", name, path.terminal());
//! }
//! ```
//!
//! ## Mathematical Foundation
//!
//! ```text
//! GARCH     v_t+1 = ω + (α + β) v_t
//! GARCH-FX  v_t+1 = δ_t ω + (α + β) X_t,   X_t ~ Gamma(v_t/θ + 1, θ)
//! Heston    dV_t  = κ(θ - V_t) dt + σ√V_t dW_t
//! ```
//! Every path is reported as volatilities (square roots of the variances),
//! starting from the fitted seed volatility.

// Module declarations
pub mod analytics;
pub mod error;
pub mod forecast;
pub mod math_utils;
pub mod mc;
pub mod models;
pub mod output;
pub mod rng;

// Re-export commonly used types for convenience
pub use error::{SdeError, SdeResult};
pub use forecast::{garch_forecast, heston_forecast, stochastic_forecast, ForecastPath};
pub use models::garch::{FittedParameters, GarchFit, GarchFitter};
pub use models::regime::{DefaultRegimes, RegimeSelection};
