// scripts/benchmark.rs
use garch_fx::math_utils::Timer;
use garch_fx::mc::ensemble::{run_ensemble, EnsembleConfig};
use garch_fx::models::garch::{FittedParameters, Garch};
use garch_fx::models::garch_fx::{GarchFx, GarchFxConfig};
use garch_fx::models::heston::{Heston, HestonParams, HestonSimConfig, VarianceScheme, DEFAULT_HESTON_SIGMA};
use garch_fx::models::model::VolatilityModel;
use garch_fx::models::regime::{DefaultRegimes, RegimeSelection};
use garch_fx::SdeResult;
use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::process::Command;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_model: String,
    cpu_cores: usize,
    rust_version: String,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_model: Self::cpu_model(),
            cpu_cores: num_cpus::get(),
            rust_version: Command::new("rustc")
                .arg("--version")
                .output()
                .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
                .unwrap_or_else(|_| "Unknown Rust version".to_string()),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }

    fn cpu_model() -> String {
        // /proc/cpuinfo on Linux, sysctl elsewhere
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|line| line.starts_with("model name"))
                    .and_then(|line| line.split(':').nth(1))
                    .map(|s| s.trim().to_string())
            })
            .or_else(|| {
                Command::new("sysctl")
                    .args(["-n", "machdep.cpu.brand_string"])
                    .output()
                    .ok()
                    .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or_else(|| "Unknown CPU".to_string())
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    runs: usize,
    steps: usize,
    time_ms: f64,
    throughput_paths_per_sec: f64,
    mean_terminal: f64,
    reference: Option<f64>,
}

impl BenchmarkResult {
    fn relative_error(&self) -> Option<f64> {
        self.reference
            .map(|r| (self.mean_terminal - r).abs() / r)
    }
}

const HORIZON: usize = 1_000;
const SEED: u64 = 42;

fn fitted_params() -> SdeResult<FittedParameters> {
    FittedParameters::new(0.0183, 0.1039, 0.8806)
}

fn time_ensemble<M: VolatilityModel + Sync>(
    name: String,
    model: &M,
    runs: usize,
    reference: Option<f64>,
) -> SdeResult<BenchmarkResult> {
    let cfg = EnsembleConfig { runs, seed: SEED };
    let mut timer = Timer::new();
    timer.start();
    let result = run_ensemble(model, &cfg)?;
    let time_ms = timer.elapsed_ms();

    let terminal = result.terminal_values();
    let mean_terminal = terminal.iter().sum::<f64>() / terminal.len() as f64;
    info!(model = model.name(), runs, time_ms, "ensemble timed");

    Ok(BenchmarkResult {
        name,
        runs,
        steps: result.steps(),
        time_ms,
        throughput_paths_per_sec: runs as f64 / (time_ms / 1000.0),
        mean_terminal,
        reference,
    })
}

fn run_garch_benchmarks() -> SdeResult<Vec<BenchmarkResult>> {
    let mut results = Vec::new();
    let params = fitted_params()?;
    let seed_vol = 1.1425;

    let garch = Garch::new(seed_vol, HORIZON, params)?;
    let deterministic = garch.forecast().terminal();
    results.push(time_ensemble("GARCH baseline".to_string(), &garch, 1_000, Some(deterministic))?);

    let runs_configs = [1_000, 10_000, 50_000];
    for &runs in &runs_configs {
        println!("Running GARCH-FX benchmarks with {} runs...", runs);

        let plain = GarchFx::new(seed_vol, HORIZON, params, &GarchFxConfig::default())?;
        results.push(time_ensemble(
            format!("GARCH-FX ({}k runs)", runs / 1000),
            &plain,
            runs,
            None,
        )?);

        let switching_cfg = GarchFxConfig::default()
            .with_regimes(RegimeSelection::Default(DefaultRegimes::ThreeState));
        let switching = GarchFx::new(seed_vol, HORIZON, params, &switching_cfg)?;
        results.push(time_ensemble(
            format!("GARCH-FX 3-regime ({}k runs)", runs / 1000),
            &switching,
            runs,
            None,
        )?);
    }

    Ok(results)
}

fn run_heston_benchmarks() -> SdeResult<Vec<BenchmarkResult>> {
    let mut results = Vec::new();
    let params = HestonParams::from_garch(&fitted_params()?, 1.1425, DEFAULT_HESTON_SIGMA)?;

    let schemes = [
        (VarianceScheme::AndersenQE, "Andersen QE"),
        (VarianceScheme::FullTruncationEuler, "Full Truncation Euler"),
    ];

    let runs = 10_000;
    for (scheme, scheme_name) in &schemes {
        println!("Benchmarking Heston {} scheme...", scheme_name);

        let config = HestonSimConfig {
            scheme: *scheme,
            ..Default::default()
        };
        let heston = Heston::new(params, config)?;
        // E[√V_T] sits below √E[V_T]; the reference is only a scale check
        let reference = params.expected_variance(config.t).sqrt();
        results.push(time_ensemble(
            format!("Heston {}", scheme_name),
            &heston,
            runs,
            Some(reference),
        )?);
    }

    Ok(results)
}

fn write_results_to_csv(
    results: &[BenchmarkResult],
    system_info: &SystemInfo,
    filename: &str,
) -> io::Result<()> {
    let mut file = File::create(filename)?;

    // Write system information as comments
    writeln!(file, "# System Information")?;
    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU: {}", system_info.cpu_model)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# Rust Version: {}", system_info.rust_version)?;
    writeln!(file, "# RUSTFLAGS: {}", system_info.rustc_flags)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "#")?;

    writeln!(
        file,
        "Benchmark,Runs,Steps,Time_ms,Throughput_paths_per_sec,Mean_Terminal,Reference,Relative_Error"
    )?;

    for result in results {
        writeln!(
            file,
            "{},{},{},{:.2},{:.0},{:.6},{},{}",
            result.name,
            result.runs,
            result.steps,
            result.time_ms,
            result.throughput_paths_per_sec,
            result.mean_terminal,
            result
                .reference
                .map(|v| format!("{:.6}", v))
                .unwrap_or_else(|| "N/A".to_string()),
            result
                .relative_error()
                .map(|e| format!("{:.6}", e))
                .unwrap_or_else(|| "N/A".to_string())
        )?;
    }

    println!("Results written to {}", filename);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    println!("garch-fx Ensemble Benchmark Suite");
    println!("=================================\n");

    println!("Gathering system information...");
    let system_info = SystemInfo::gather();

    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU: {}", system_info.cpu_model);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  Rust Version: {}", system_info.rust_version);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    println!("Running GARCH benchmarks...");
    let mut all_results = match run_garch_benchmarks() {
        Ok(results) => results,
        Err(e) => {
            eprintln!("GARCH benchmarks failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("\nRunning Heston benchmarks...");
    match run_heston_benchmarks() {
        Ok(results) => all_results.extend(results),
        Err(e) => {
            eprintln!("Heston benchmarks failed: {}", e);
            std::process::exit(1);
        }
    }

    println!("\n{:=<90}", "");
    println!("BENCHMARK RESULTS");
    println!("{:=<90}", "");
    println!(
        "{:<32} {:>8} {:>6} {:>12} {:>15} {:>10} {:>10}",
        "Benchmark", "Runs", "Steps", "Time (ms)", "Throughput", "Terminal", "Rel Error"
    );
    println!("{:-<90}", "");

    for result in &all_results {
        println!(
            "{:<32} {:>8} {:>6} {:>12.2} {:>15.0} {:>10.4} {:>10}",
            result.name,
            result.runs,
            result.steps,
            result.time_ms,
            result.throughput_paths_per_sec,
            result.mean_terminal,
            result
                .relative_error()
                .map(|e| format!("{:.2}%", e * 100.0))
                .unwrap_or_else(|| "N/A".to_string())
        );
    }

    println!("{:=<90}", "");

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("benchmark_results_{}.csv", timestamp);
    if let Err(e) = write_results_to_csv(&all_results, &system_info, &filename) {
        eprintln!("Could not write {}: {}", filename, e);
        std::process::exit(1);
    }

    println!("\nBenchmark complete!");
    println!("\nTo reproduce these results:");
    println!("1. Use Rust version: {}", system_info.rust_version);
    println!("2. Set RUSTFLAGS: {}", system_info.rustc_flags);
    println!("3. Run: cargo run --bin benchmark --release");
    println!(
        "4. Ensure {} CPU threads available",
        system_info.rayon_threads
    );
}
