// src/math_utils.rs
//! Closed-form helpers shared by the simulators.

/// Trading days used to annualise daily volatilities
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Wall-clock stopwatch for demos and benchmarks
pub struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Multiplier turning a per-period volatility into an annual one
pub fn annualizer(periods_per_year: f64) -> f64 {
    periods_per_year.sqrt()
}

/// Exact conditional mean of a CIR variance after `dt`:
/// `θ + (v - θ)e^(-κΔt)`
pub fn cir_conditional_mean(v: f64, kappa: f64, theta: f64, dt: f64) -> f64 {
    theta + (v - theta) * (-kappa * dt).exp()
}

/// Exact conditional variance of a CIR variance after `dt`:
/// `v σ² e^(-κΔt)/κ (1 - e^(-κΔt)) + θσ²/(2κ) (1 - e^(-κΔt))²`
pub fn cir_conditional_variance(v: f64, kappa: f64, theta: f64, sigma: f64, dt: f64) -> f64 {
    let decay = (-kappa * dt).exp();
    let sigma2 = sigma * sigma;
    v * sigma2 * decay / kappa * (1.0 - decay)
        + theta * sigma2 / (2.0 * kappa) * (1.0 - decay).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_annualizer() {
        assert_relative_eq!(annualizer(TRADING_DAYS_PER_YEAR), 252f64.sqrt());
    }

    #[test]
    fn test_cir_moments_limits() {
        // Starting at the long-run level the mean does not move
        assert_relative_eq!(cir_conditional_mean(0.04, 2.0, 0.04, 0.5), 0.04);
        // Zero vol-of-vol has no conditional variance
        assert_eq!(cir_conditional_variance(0.04, 2.0, 0.04, 0.0, 0.5), 0.0);
        // Long horizon converges to the stationary gamma variance θσ²/(2κ)
        let stationary = cir_conditional_variance(0.09, 2.0, 0.04, 0.3, 1e3);
        assert_relative_eq!(stationary, 0.04 * 0.09 / 4.0, epsilon = 1e-12);
    }
}
