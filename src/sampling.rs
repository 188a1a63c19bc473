//! Random subset selection and extrapolation of subset counts.

use crate::error::ConfigError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

/// Population size plus an optional sampling percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSpec {
    population: usize,
    percent: Option<f32>,
}

impl SampleSpec {
    /// Validates `percent`, which must lie in (0, 100] when given.
    pub fn new(population: usize, percent: Option<f32>) -> Result<Self, ConfigError> {
        check_percent(percent)?;
        Ok(Self {
            population,
            percent,
        })
    }

    /// Measure the whole population.
    pub fn exhaustive(population: usize) -> Self {
        Self {
            population,
            percent: None,
        }
    }

    pub fn population(&self) -> usize {
        self.population
    }

    pub fn percent(&self) -> Option<f32> {
        self.percent
    }

    /// Whether a proper subset will be measured and scaled.
    pub fn is_sampled(&self) -> bool {
        self.percent.is_some() && self.population > 0
    }

    /// k = max(1, round(N * p / 100)), or N without a percentage.
    pub fn subset_size(&self) -> usize {
        match self.percent {
            _ if self.population == 0 => 0,
            None => self.population,
            Some(percent) => {
                let k = (self.population as f64 * f64::from(percent) / 100.0).round() as usize;
                k.clamp(1, self.population)
            }
        }
    }

    /// Scale a count measured on the subset up to the whole population.
    pub fn extrapolate(&self, measured: u64) -> Estimate {
        let sample_size = self.subset_size();
        let value = if self.is_sampled() && sample_size < self.population {
            (measured as f64 * self.population as f64 / sample_size as f64).round() as u64
        } else {
            measured
        };

        Estimate {
            value,
            measured,
            sample_size,
            population: self.population,
            extrapolated: self.is_sampled(),
        }
    }
}

/// Reject percentages outside (0, 100]. NaN is rejected too.
pub fn check_percent(percent: Option<f32>) -> Result<(), ConfigError> {
    match percent {
        Some(p) if !(p > 0.0 && p <= 100.0) => Err(ConfigError::InvalidSubsetPercent(p)),
        _ => Ok(()),
    }
}

/// A population count, exact or projected from a subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Estimate {
    pub value: u64,
    pub measured: u64,
    pub sample_size: usize,
    pub population: usize,
    pub extrapolated: bool,
}

/// Picks uniformly random subsets without replacement.
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    /// Sampler seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sampler.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Select `spec.subset_size()` items from `items`, keeping their relative order.
    pub fn select<T: Clone>(&mut self, spec: &SampleSpec, items: &[T]) -> Vec<T> {
        let amount = spec.subset_size().min(items.len());
        if amount == items.len() {
            return items.to_vec();
        }

        let mut picked = rand::seq::index::sample(&mut self.rng, items.len(), amount).into_vec();
        picked.sort_unstable();
        picked.into_iter().map(|i| items[i].clone()).collect()
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Measure `items` (or a random subset of them) and extrapolate the count.
///
/// The percentage is validated before any measurement runs. An empty
/// population yields an exact zero without calling `measure`.
pub fn extrapolate_count<T, E, F>(
    items: &[T],
    percent: Option<f32>,
    sampler: &mut Sampler,
    measure: F,
) -> Result<Estimate, E>
where
    T: Clone,
    E: From<ConfigError>,
    F: FnOnce(&[T]) -> Result<u64, E>,
{
    let spec = SampleSpec::new(items.len(), percent)?;
    if items.is_empty() {
        return Ok(spec.extrapolate(0));
    }

    let subset = sampler.select(&spec, items);
    let measured = measure(&subset)?;
    Ok(spec.extrapolate(measured))
}
