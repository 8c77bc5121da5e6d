//! First-order and total-order Sobol indices from a Saltelli design.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use rand_distr::Uniform;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::config::ParameterSpace;

/// Two-sided 95% standard normal quantile
const CONFIDENCE_Z: f64 = 1.959_963_984_540_054;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Bootstrap resamples for confidence intervals; 0 disables them
    pub resamples: usize,
    pub seed: u64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            resamples: 100,
            seed: 0,
        }
    }
}

/// Indices for one outcome series, one entry per parameter in space order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SobolIndices {
    pub names: Vec<String>,
    pub s1: Vec<f64>,
    pub s1_conf: Vec<f64>,
    pub st: Vec<f64>,
    pub st_conf: Vec<f64>,
}

impl SobolIndices {
    fn zeros(names: Vec<String>) -> Self {
        let d = names.len();
        Self {
            names,
            s1: vec![0.0; d],
            s1_conf: vec![0.0; d],
            st: vec![0.0; d],
            st_conf: vec![0.0; d],
        }
    }
}

/// Standardised outputs split into the `A`, `B` and `AB_j` blocks
struct Blocks {
    a: Vec<f64>,
    b: Vec<f64>,
    ab: Vec<Vec<f64>>,
}

impl Blocks {
    fn split(outcome: &[f64], d: usize) -> Self {
        let group = 2 * d + 2;
        let n = outcome.len() / group;
        let mut blocks = Self {
            a: Vec::with_capacity(n),
            b: Vec::with_capacity(n),
            ab: vec![Vec::with_capacity(n); d],
        };
        for chunk in outcome.chunks_exact(group) {
            blocks.a.push(chunk[0]);
            blocks.b.push(chunk[group - 1]);
            for (j, ab) in blocks.ab.iter_mut().enumerate() {
                ab.push(chunk[1 + j]);
            }
        }
        blocks
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Population variance
fn variance(values: &[f64]) -> f64 {
    let m = mean(values.iter().copied());
    mean(values.iter().map(|v| (v - m).powi(2)))
}

/// Sample standard deviation (n - 1 denominator)
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values.iter().copied());
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// `(S1, ST)` for column `j` over the base points in `idx`
fn indices_at(blocks: &Blocks, j: usize, idx: &[usize]) -> (f64, f64) {
    let pooled: Vec<f64> = idx
        .iter()
        .map(|&i| blocks.a[i])
        .chain(idx.iter().map(|&i| blocks.b[i]))
        .collect();
    let var = variance(&pooled);
    if var == 0.0 {
        return (0.0, 0.0);
    }

    let ab = &blocks.ab[j];
    let first = mean(idx.iter().map(|&i| blocks.b[i] * (ab[i] - blocks.a[i])));
    let total = 0.5 * mean(idx.iter().map(|&i| (blocks.a[i] - ab[i]).powi(2)));
    (first / var, total / var)
}

/// Sobol indices of every parameter in `space` for one outcome series laid
/// out as produced by [`saltelli_sample`](super::saltelli_sample).
///
/// Outputs are standardised before estimation. A constant outcome yields all
/// zero indices. Values slightly outside `[0, 1]` are sampling noise and are
/// returned as is.
pub fn analyze(
    space: &ParameterSpace,
    outcome: &[f64],
    options: &AnalysisOptions,
) -> Result<SobolIndices, ConfigError> {
    let d = space.dim();
    let group = 2 * d + 2;
    if outcome.is_empty() || outcome.len() % group != 0 {
        return Err(ConfigError::OutcomeLength {
            len: outcome.len(),
            group,
        });
    }
    let n = outcome.len() / group;
    let names = space.names();

    let mu = mean(outcome.iter().copied());
    let sigma = variance(outcome).sqrt();
    if sigma == 0.0 || !sigma.is_finite() {
        tracing::debug!("outcome has no variance, indices set to zero");
        return Ok(SobolIndices::zeros(names));
    }
    let standardised: Vec<f64> = outcome.iter().map(|y| (y - mu) / sigma).collect();
    let blocks = Blocks::split(&standardised, d);

    let all: Vec<usize> = (0..n).collect();
    let mut result = SobolIndices::zeros(names);
    for j in 0..d {
        let (s1, st) = indices_at(&blocks, j, &all);
        result.s1[j] = s1;
        result.st[j] = st;
    }

    if options.resamples > 0 {
        let picks = Uniform::new(0, n).map_err(|_| ConfigError::InvalidSampleCount(n))?;
        let mut rng = SmallRng::seed_from_u64(options.seed);
        let draws: Vec<Vec<usize>> = (0..options.resamples)
            .map(|_| (0..n).map(|_| rng.sample(picks)).collect())
            .collect();

        for j in 0..d {
            let (s1_boot, st_boot): (Vec<f64>, Vec<f64>) =
                draws.iter().map(|idx| indices_at(&blocks, j, idx)).unzip();
            result.s1_conf[j] = CONFIDENCE_Z * sample_std(&s1_boot);
            result.st_conf[j] = CONFIDENCE_Z * sample_std(&st_boot);
        }
    }

    Ok(result)
}
