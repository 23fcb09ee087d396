//! Convergence diagnostics for sampled chains.

extern crate alloc;

use alloc::vec::Vec;

use crate::math;

/// Longest lag summed by [`effective_sample_size`].
const MAX_LAG: usize = 1_000;

/// Autocorrelations below this end the lag sum.
const ACF_CUTOFF: f64 = 0.05;

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Lag-`k` autocorrelation of `chain`.
///
/// Uses the biased (divide by `n`) variance in the denominator. Returns 0
/// for lags beyond the chain or a constant chain.
pub fn autocorrelation(chain: &[f64], k: usize) -> f64 {
    let n = chain.len();
    if k >= n {
        return 0.0;
    }
    let m = mean(chain);
    let var = chain.iter().map(|&x| math::sq(x - m)).sum::<f64>() / n as f64;
    if var < 1e-300 {
        return 0.0;
    }
    lagged(chain, k, m, var)
}

fn lagged(chain: &[f64], k: usize, mean: f64, var: f64) -> f64 {
    let n = chain.len();
    let cov: f64 = (0..n - k)
        .map(|i| (chain[i] - mean) * (chain[i + k] - mean))
        .sum::<f64>()
        / (n - k) as f64;
    cov / var
}

/// Effective sample size of a single chain.
///
/// `n / (1 + 2 Σ ρ_k)`, summing lags until the autocorrelation drops
/// below 0.05. A constant chain counts as independent.
pub fn effective_sample_size(chain: &[f64]) -> f64 {
    let n = chain.len();
    if n < 2 {
        return n as f64;
    }

    let m = mean(chain);
    let var = chain.iter().map(|&x| math::sq(x - m)).sum::<f64>() / n as f64;
    if var < 1e-12 * (1.0 + m * m) {
        return n as f64;
    }

    let mut sum_rho = 0.0;
    for k in 1..=MAX_LAG.min(n / 2) {
        let rho_k = lagged(chain, k, m, var);
        if rho_k < ACF_CUTOFF {
            break;
        }
        sum_rho += rho_k;
    }

    n as f64 / (1.0 + 2.0 * sum_rho)
}

/// Effective sample size summed over chains.
pub fn pooled_effective_sample_size<C: AsRef<[f64]>>(chains: &[C]) -> f64 {
    chains
        .iter()
        .map(|c| effective_sample_size(c.as_ref()))
        .sum()
}

/// Split-R̂ (potential scale reduction) across chains.
///
/// Each chain is halved and the halves compared as separate chains, so a
/// single drifting chain is also caught. Values near 1 indicate the chains
/// agree. `NaN` when fewer than two half-chains of length ≥ 2 exist;
/// `+∞` when the halves are individually constant but disagree.
pub fn split_rhat<C: AsRef<[f64]>>(chains: &[C]) -> f64 {
    let half = chains
        .iter()
        .map(|c| c.as_ref().len() / 2)
        .min()
        .unwrap_or(0);
    if half < 2 {
        return f64::NAN;
    }

    let mut halves: Vec<&[f64]> = Vec::with_capacity(2 * chains.len());
    for c in chains {
        let c = c.as_ref();
        // drop the middle draw of odd-length chains
        halves.push(&c[..half]);
        halves.push(&c[c.len() - half..]);
    }

    let n = half as f64;
    let m = halves.len() as f64;
    let means: Vec<f64> = halves.iter().map(|h| mean(h)).collect();
    let grand = mean(&means);

    let between = n / (m - 1.0) * means.iter().map(|&mu| math::sq(mu - grand)).sum::<f64>();
    let within = halves
        .iter()
        .zip(&means)
        .map(|(h, &mu)| h.iter().map(|&x| math::sq(x - mu)).sum::<f64>() / (n - 1.0))
        .sum::<f64>()
        / m;

    if within <= 0.0 {
        return if between <= 0.0 { 1.0 } else { f64::INFINITY };
    }
    let var_plus = (n - 1.0) / n * within + between / n;
    math::sqrt(var_plus / within)
}
