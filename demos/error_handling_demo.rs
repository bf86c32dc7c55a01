// demos/error_handling_demo.rs
use garch_fx::error::SdeError;
use garch_fx::forecast::stochastic_forecast;
use garch_fx::mc::forecast_engine::ForecastConfig;
use garch_fx::models::garch::{FittedParameters, Garch};
use garch_fx::models::garch_fx::{GarchFx, GarchFxConfig};
use garch_fx::models::heston::{Heston, HestonParams, HestonSimConfig};
use garch_fx::models::regime::{RegimeSelection, RegimeSpace};
use garch_fx::rng::seed_rng_from_u64;
use tracing_subscriber::EnvFilter;

fn report<T>(result: Result<T, SdeError>) {
    match result {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    println!("Error Handling Demo for garch-fx");
    println!("================================\n");

    let params = FittedParameters {
        omega: 0.02,
        alpha: 0.05,
        beta: 0.90,
    };

    // Test 1: Non-stationary GARCH parameters
    println!("1. Testing alpha + beta >= 1...");
    let explosive = FittedParameters {
        alpha: 0.15,
        beta: 0.90,
        ..params
    };
    report(Garch::new(1.0, 100, explosive));

    // Test 2: Negative dispersion
    println!("\n2. Testing negative theta...");
    let cfg = GarchFxConfig {
        theta: -0.01,
        ..Default::default()
    };
    report(GarchFx::new(1.0, 100, params, &cfg));

    // Test 3: Regime vector and matrix disagree
    println!("\n3. Testing regime/transition size mismatch...");
    let mismatch = RegimeSelection::Custom {
        regimes: vec![0.5, 1.0, 1.5],
        transition: vec![vec![0.9, 0.1], vec![0.1, 0.9]],
    };
    let mut rng = seed_rng_from_u64(42);
    report(stochastic_forecast(1.0, 100, &params, 1e-3, Some(&mismatch), &mut rng));

    // Test 4: Row that is not a probability distribution
    println!("\n4. Testing transition row that does not sum to 1...");
    report(RegimeSpace::new(
        vec![0.8, 1.2],
        vec![vec![0.7, 0.2], vec![0.5, 0.5]],
    ));

    // Test 5: Extreme but valid parameters should warn, not fail
    println!("\n5. Testing Heston parameters violating the Feller condition...");
    let feller_violation = HestonParams {
        kappa: 0.05,
        theta: 0.4,
        v0: 1.0,
        sigma: 0.6,
    };
    match Heston::new(feller_violation, HestonSimConfig::default()) {
        Ok(_) => println!("   ✓ Created with warning (Feller condition violated)"),
        Err(e) => println!("   Error: {}", e),
    }

    // Test 6: Invalid JSON configuration
    println!("\n6. Testing malformed configuration file contents...");
    report(ForecastConfig::from_json_str(r#"{ "horizon": "ten" }"#));

    // Test 7: Error type matching
    println!("\n7. Testing error type matching...");
    let bad_heston = HestonParams {
        kappa: 2.0,
        theta: 0.04,
        v0: 0.04,
        sigma: -0.3,
    };
    match Heston::new(bad_heston, HestonSimConfig::default()) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(SdeError::InvalidParameters {
            parameter,
            value,
            constraint,
        }) => {
            println!("   ✓ Caught InvalidParameters: {} = {} ({})", parameter, value, constraint);
        }
        Err(other) => println!("   Unexpected error type: {}", other),
    }

    // Test 8: Valid configuration should work
    println!("\n8. Testing valid configuration...");
    match Garch::new(1.0, 250, params) {
        Ok(garch) => println!(
            "   ✓ Success: terminal volatility = {:.4} (long-run {:.4})",
            garch.forecast().terminal(),
            params.long_run_volatility()
        ),
        Err(e) => println!("   Unexpected error: {}", e),
    }

    println!("\n✓ Error handling demo complete!");
    println!("All error cases were properly caught and handled.");
}
