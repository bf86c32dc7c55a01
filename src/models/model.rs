// src/models/model.rs
use crate::error::SdeResult;
use crate::forecast::ForecastPath;
use rand::Rng;

/// A forward volatility simulator producing one path per call.
///
/// Implementations hold only validated, immutable parameters; every source of
/// randomness arrives through `rng`, so a model can be shared across threads
/// while each run owns its generator.
pub trait VolatilityModel {
    fn name(&self) -> &'static str;

    /// Number of values in every path returned by `simulate`
    fn path_len(&self) -> usize;

    fn simulate<R: Rng + ?Sized>(&self, rng: &mut R) -> SdeResult<ForecastPath>;
}
