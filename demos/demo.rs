// demos/demo.rs
use garch_fx::analytics::summary::ForecastSummary;
use garch_fx::math_utils::Timer;
use garch_fx::mc::ensemble::{run_ensemble, EnsembleConfig};
use garch_fx::mc::forecast_engine::{run_forecasts, ForecastConfig};
use garch_fx::models::garch::{FittedParameters, GarchFit};
use garch_fx::models::garch_fx::GarchFx;
use garch_fx::models::regime::{DefaultRegimes, RegimeSelection};
use garch_fx::output;
use garch_fx::SdeResult;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let result = if args.len() > 2 && args[1] == "--config" {
        ForecastConfig::from_json_file(&args[2]).and_then(run_demo_mode)
    } else {
        run_demo_mode(default_config())
    };

    if let Err(e) = result {
        eprintln!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

fn default_config() -> ForecastConfig {
    let mut cfg = ForecastConfig {
        horizon: 1_000,
        ..Default::default()
    };
    cfg.garch_fx.theta = 1e-3;
    cfg.garch_fx.regime = Some(RegimeSelection::Default(DefaultRegimes::ThreeState));
    cfg
}

/// Daily percent-return fit of a liquid equity index
fn fitted_model() -> SdeResult<GarchFit> {
    let params = FittedParameters::new(0.0183, 0.1039, 0.8806)?;
    GarchFit::new(1.1425, params)
}

fn run_demo_mode(cfg: ForecastConfig) -> SdeResult<()> {
    println!("Running garch-fx Volatility Forecast Demo\n");

    let fit = fitted_model()?;
    println!("Fitted GARCH(1,1):");
    println!("  omega = {:.4}, alpha = {:.4}, beta = {:.4}", fit.params.omega, fit.params.alpha, fit.params.beta);
    println!("  persistence        = {:.4}", fit.params.persistence());
    println!("  long-run vol       = {:.4}", fit.params.long_run_volatility());
    println!("  half-life (days)   = {:.1}", fit.params.half_life());
    println!("  seed volatility    = {:.4}\n", fit.seed_volatility);

    let mut timer = Timer::new();
    timer.start();
    let set = run_forecasts(&fit, &cfg)?;
    println!("Forecasts computed in {:.2} ms\n", timer.elapsed_ms());

    for (name, path) in set.columns() {
        let summary = ForecastSummary::from_path(path)?;
        println!("--- {} ({} values) ---", name, path.len());
        for (label, value) in summary.rows(path.len() - 1) {
            println!("  {:<32} {}", label, value);
        }
        println!();
    }

    if let Some(regimes) = &set.regimes {
        let mut counts = vec![0usize; regimes.iter().max().map_or(0, |m| m + 1)];
        for &r in regimes {
            counts[r] += 1;
        }
        println!("Regime occupancy over the horizon:");
        for (index, count) in counts.iter().enumerate() {
            println!("  regime {}: {:>5} steps", index, count);
        }
        println!();
    }

    // Spread of the stochastic forecast across independent runs
    let fx = GarchFx::new(fit.seed_volatility, cfg.horizon, fit.params, &cfg.garch_fx)?;
    let ens_cfg = EnsembleConfig {
        runs: 2_000,
        seed: cfg.seed,
    };
    timer.start();
    let ensemble = run_ensemble(&fx, &ens_cfg)?;
    let elapsed = timer.elapsed_ms();
    let mean = ensemble.mean_path();
    let low = ensemble.quantile_path(0.05)?;
    let high = ensemble.quantile_path(0.95)?;
    let last = ensemble.steps() - 1;

    println!("GARCH-FX ensemble: {} runs in {:.2} ms", ensemble.runs(), elapsed);
    for step in [0, last / 4, last / 2, last] {
        println!(
            "  step {:>5}: mean {:.4}  5% {:.4}  95% {:.4}",
            step, mean[step], low[step], high[step]
        );
    }

    let current_dir = std::env::current_dir()?;
    let forecast_file = current_dir.join("forecasts.csv");
    output::write_forecasts_to_csv(&forecast_file, &set.columns())?;

    if let Some(path) = &set.garch_fx {
        let summary = ForecastSummary::from_path(path)?;
        let summary_file = current_dir.join("garch_fx_summary.csv");
        output::write_summary_to_csv(&summary_file, &summary.rows(cfg.horizon))?;
        println!("\nSummary written to {}", summary_file.display());
    }
    println!("Forecast paths written to {}", forecast_file.display());

    Ok(())
}
