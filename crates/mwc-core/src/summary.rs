//! Posterior summaries of sampled draws.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{pooled_effective_sample_size, split_rhat};
use crate::math;

/// Empirical cumulative distribution: sorted values and `(i + 1) / n`.
pub fn ecdf(data: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut x = data.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));
    let n = x.len() as f64;
    let y = (1..=x.len()).map(|i| i as f64 / n).collect();
    (x, y)
}

/// Shortest interval containing `mass` of the draws.
///
/// Sorts the draws, slides a window of `⌊mass·n⌋` positions across them
/// and returns the narrowest `(lower, upper)`. `None` for empty input or
/// `mass` outside `(0, 1)`.
pub fn hpd(draws: &[f64], mass: f64) -> Option<(f64, f64)> {
    if draws.is_empty() || !(mass > 0.0 && mass < 1.0) {
        return None;
    }
    let mut d = draws.to_vec();
    d.sort_by(|a, b| a.total_cmp(b));
    let n = d.len();
    let span = (math::floor(mass * n as f64) as usize).min(n - 1);

    let (start, _) = (0..n - span)
        .map(|i| (i, d[i + span] - d[i]))
        .min_by(|a, b| a.1.total_cmp(&b.1))?;
    Some((d[start], d[start + span]))
}

/// Median, averaging the two middle values for even lengths.
pub fn median(draws: &[f64]) -> Option<f64> {
    if draws.is_empty() {
        return None;
    }
    let mut d = draws.to_vec();
    d.sort_by(|a, b| a.total_cmp(b));
    let n = d.len();
    Some(if n % 2 == 1 {
        d[n / 2]
    } else {
        0.5 * (d[n / 2 - 1] + d[n / 2])
    })
}

/// Summary statistics of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    /// Parameter name, e.g. `"alpha[2]"`.
    pub parameter: String,
    /// Value at the draw with the highest log-density.
    pub mode: f64,
    /// Posterior mean.
    pub mean: f64,
    /// Posterior median.
    pub median: f64,
    /// Lower end of the highest posterior density interval.
    pub hpd_min: f64,
    /// Upper end of the highest posterior density interval.
    pub hpd_max: f64,
    /// Effective sample size summed over chains.
    pub ess: f64,
    /// Split-R̂ across chains.
    pub rhat: f64,
}

/// Summarize one parameter from per-chain draws.
///
/// `log_density[c][i]` scores `chains[c][i]` and selects the mode. `None`
/// if there are no draws or the shapes disagree.
pub fn summarize(
    parameter: &str,
    chains: &[Vec<f64>],
    log_density: &[Vec<f64>],
    mass: f64,
) -> Option<ParameterSummary> {
    if chains.len() != log_density.len()
        || chains.iter().zip(log_density).any(|(c, l)| c.len() != l.len())
    {
        return None;
    }
    let all: Vec<f64> = chains.iter().flatten().copied().collect();
    if all.is_empty() {
        return None;
    }

    let (mode, _) = all
        .iter()
        .zip(log_density.iter().flatten())
        .max_by(|a, b| a.1.total_cmp(b.1))?;
    let (hpd_min, hpd_max) = hpd(&all, mass)?;

    Some(ParameterSummary {
        parameter: parameter.into(),
        mode: *mode,
        mean: all.iter().sum::<f64>() / all.len() as f64,
        median: median(&all)?,
        hpd_min,
        hpd_max,
        ess: pooled_effective_sample_size(chains),
        rhat: split_rhat(chains),
    })
}
