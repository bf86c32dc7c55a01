// tests/heston_qe_test.rs
use approx::assert_relative_eq;
use garch_fx::forecast::{heston_forecast, heston_forecast_with};
use garch_fx::mc::ensemble::{run_ensemble, EnsembleConfig};
use garch_fx::models::heston::{Heston, HestonParams, HestonSimConfig, VarianceScheme};
use garch_fx::rng::seed_rng_from_u64;
use proptest::prelude::*;

fn short_grid(scheme: VarianceScheme) -> HestonSimConfig {
    HestonSimConfig {
        t: 1.0,
        steps: 200,
        scheme,
        ..Default::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn qe_variance_is_never_negative(
        kappa in 0.1f64..5.0,
        theta in 0.005f64..0.3,
        v0 in 0.0f64..0.5,
        sigma in 0.0f64..3.0,
        seed in any::<u64>(),
    ) {
        let params = HestonParams { kappa, theta, v0, sigma };
        let heston = Heston::new(params, short_grid(VarianceScheme::AndersenQE)).unwrap();
        let variances = heston.simulate_variance(&mut seed_rng_from_u64(seed)).unwrap();

        prop_assert_eq!(variances.len(), 200);
        prop_assert!(variances.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn full_truncation_euler_is_floored(
        sigma in 0.0f64..3.0,
        seed in any::<u64>(),
    ) {
        let params = HestonParams { kappa: 1.0, theta: 0.04, v0: 0.04, sigma };
        let heston = Heston::new(params, short_grid(VarianceScheme::FullTruncationEuler)).unwrap();
        let variances = heston.simulate_variance(&mut seed_rng_from_u64(seed)).unwrap();
        prop_assert!(variances.iter().all(|v| *v >= 0.0));
    }
}

#[test]
fn test_sigma_sweep_covers_both_branches() {
    // Low vol-of-vol stays in the quadratic branch: strictly positive values
    let calm = HestonParams {
        kappa: 2.0,
        theta: 0.04,
        v0: 0.04,
        sigma: 0.05,
    };
    let path = Heston::new(calm, HestonSimConfig::default())
        .unwrap()
        .simulate_variance(&mut seed_rng_from_u64(1))
        .unwrap();
    assert!(path.iter().all(|v| *v > 0.0));

    // Extreme vol-of-vol lands in the exponential branch, whose atom is exactly zero
    let wild = HestonParams {
        kappa: 0.5,
        theta: 0.01,
        v0: 0.01,
        sigma: 3.0,
    };
    let path = Heston::new(wild, HestonSimConfig::default())
        .unwrap()
        .simulate_variance(&mut seed_rng_from_u64(1))
        .unwrap();
    let zeros = path.iter().filter(|v| **v == 0.0).count();
    println!("exponential branch: {} exact zeros out of {}", zeros, path.len());
    assert!(zeros > 0);
    assert!(path.iter().all(|v| *v >= 0.0));
}

#[test]
fn test_zero_sigma_is_deterministic_mean_reversion() {
    let cfg = HestonSimConfig::default();
    let dt = cfg.dt();

    for v0 in [0.04, 0.09, 0.0] {
        let params = HestonParams {
            kappa: 2.0,
            theta: 0.04,
            v0,
            sigma: 0.0,
        };
        let heston = Heston::new(params, cfg).unwrap();
        let a = heston.simulate_variance(&mut seed_rng_from_u64(1)).unwrap();
        let b = heston.simulate_variance(&mut seed_rng_from_u64(2)).unwrap();
        assert_eq!(a, b, "σ = 0 must not depend on the random source");

        for (i, v) in a.iter().enumerate() {
            let t = i as f64 * dt;
            let expected = 0.04 + (v0 - 0.04) * (-2.0 * t).exp();
            assert_relative_eq!(*v, expected, max_relative = 1e-10, epsilon = 1e-14);
        }
    }
}

#[test]
fn test_seeded_heston_is_bit_identical() {
    let first = heston_forecast(0.05, 0.4, 1.44, 0.6, &mut seed_rng_from_u64(100)).unwrap();
    let second = heston_forecast(0.05, 0.4, 1.44, 0.6, &mut seed_rng_from_u64(100)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 1001);
    assert_eq!(first.seed(), 1.2);
}

#[test]
fn test_qe_mean_matches_exact_conditional_mean() {
    let params = HestonParams {
        kappa: 2.0,
        theta: 0.04,
        v0: 0.09,
        sigma: 0.3,
    };
    let cfg = HestonSimConfig {
        t: 1.0,
        steps: 100,
        ..Default::default()
    };
    let heston = Heston::new(params, cfg).unwrap();
    let ensemble = run_ensemble(&heston, &EnsembleConfig { runs: 4_000, seed: 5 }).unwrap();

    let terminal = ensemble.terminal_values();
    let mean_variance = terminal.iter().map(|vol| vol * vol).sum::<f64>() / terminal.len() as f64;
    let horizon = (cfg.steps - 1) as f64 * cfg.dt();
    let expected = params.expected_variance(horizon);

    println!("E[V_T]: simulated {:.5}, exact {:.5}", mean_variance, expected);
    assert!((mean_variance - expected).abs() < 3e-3);
}

#[test]
fn test_custom_grid_length() {
    let params = HestonParams {
        kappa: 1.5,
        theta: 0.04,
        v0: 0.04,
        sigma: 0.4,
    };
    let cfg = HestonSimConfig {
        t: 0.5,
        steps: 126,
        ..Default::default()
    };
    let path = heston_forecast_with(params, cfg, &mut seed_rng_from_u64(8)).unwrap();
    assert_eq!(path.len(), 126);
    assert_relative_eq!(path.seed(), 0.2);
}
