// tests/ensemble_test.rs
use garch_fx::mc::ensemble::{run_ensemble, EnsembleConfig};
use garch_fx::models::garch::FittedParameters;
use garch_fx::models::garch_fx::{GarchFx, GarchFxConfig};
use garch_fx::models::heston::{Heston, HestonParams, HestonSimConfig};
use garch_fx::models::regime::{DefaultRegimes, RegimeSelection};

fn pool(threads: usize) -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .expect("Thread pool")
}

#[test]
fn test_garch_fx_ensemble_independent_of_thread_count() {
    let params = FittedParameters::new(0.0183, 0.1039, 0.8806).unwrap();
    let cfg = GarchFxConfig {
        theta: 2e-3,
        ..GarchFxConfig::default().with_regimes(RegimeSelection::Default(DefaultRegimes::FiveState))
    };
    let fx = GarchFx::new(1.1425, 250, params, &cfg).unwrap();
    let ens_cfg = EnsembleConfig { runs: 500, seed: 100 };

    let single = pool(1).install(|| run_ensemble(&fx, &ens_cfg)).unwrap();
    let many = pool(4).install(|| run_ensemble(&fx, &ens_cfg)).unwrap();

    assert_eq!(single.paths(), many.paths());
    assert_eq!(single.mean_path(), many.mean_path());
}

#[test]
fn test_heston_ensemble_independent_of_thread_count() {
    let params = HestonParams {
        kappa: 2.0,
        theta: 0.04,
        v0: 0.09,
        sigma: 0.5,
    };
    let cfg = HestonSimConfig {
        t: 1.0,
        steps: 100,
        ..Default::default()
    };
    let heston = Heston::new(params, cfg).unwrap();
    let ens_cfg = EnsembleConfig { runs: 300, seed: 9 };

    let single = pool(1).install(|| run_ensemble(&heston, &ens_cfg)).unwrap();
    let many = pool(3).install(|| run_ensemble(&heston, &ens_cfg)).unwrap();
    assert_eq!(single.paths(), many.paths());
}

#[test]
fn test_ensemble_statistics_are_consistent() {
    let params = FittedParameters::new(0.02, 0.05, 0.90).unwrap();
    let cfg = GarchFxConfig {
        theta: 0.02,
        ..Default::default()
    };
    let fx = GarchFx::new(1.0, 100, params, &cfg).unwrap();
    let result = run_ensemble(&fx, &EnsembleConfig { runs: 1_000, seed: 3 }).unwrap();

    let median = result.quantile_path(0.5).unwrap();
    let low = result.quantile_path(0.05).unwrap();
    let high = result.quantile_path(0.95).unwrap();
    let std = result.std_path();

    // The seed is shared by every run
    assert_eq!(std[0], 0.0);
    assert_eq!(median[0], 1.0);
    for step in 1..result.steps() {
        assert!(low[step] <= median[step] && median[step] <= high[step]);
        assert!(std[step] > 0.0);
    }

    let terminal = result.terminal_values();
    let min = terminal.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = terminal.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert!(min <= low[100] && high[100] <= max);
    println!(
        "terminal: min {:.4}, 5% {:.4}, median {:.4}, 95% {:.4}, max {:.4}",
        min, low[100], median[100], high[100], max
    );
}
