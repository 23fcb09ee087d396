//! Log-probability densities used by the two models.
//!
//! All densities are fully normalised and return `f64::NEG_INFINITY`
//! outside their support, so a sampler can reject such draws without
//! special casing.

use crate::constants::{LN_2, LOG_2PI};
use crate::math;

/// Normal log-density `ln N(x | mu, sigma)`.
pub fn normal_lpdf(x: f64, mu: f64, sigma: f64) -> f64 {
    if !(sigma > 0.0) || !x.is_finite() || !mu.is_finite() {
        return f64::NEG_INFINITY;
    }
    let z = (x - mu) / sigma;
    -0.5 * LOG_2PI - math::ln(sigma) - 0.5 * z * z
}

/// Half-normal log-density with location 0 and scale `sigma`, support `x ≥ 0`.
pub fn half_normal_lpdf(x: f64, sigma: f64) -> f64 {
    if x < 0.0 || !x.is_finite() {
        return f64::NEG_INFINITY;
    }
    LN_2 + normal_lpdf(x, 0.0, sigma)
}

/// Log-normal log-density: `ln x ~ N(mu, sigma)`, support `x > 0`.
pub fn lognormal_lpdf(x: f64, mu: f64, sigma: f64) -> f64 {
    if !(x > 0.0) || !x.is_finite() {
        return f64::NEG_INFINITY;
    }
    let ln_x = math::ln(x);
    normal_lpdf(ln_x, mu, sigma) - ln_x
}

/// Exact Binomial log-mass `ln P(k | n, p)`.
pub fn binomial_lpmf(k: u64, n: u64, p: f64) -> f64 {
    if k > n || !(0.0..=1.0).contains(&p) {
        return f64::NEG_INFINITY;
    }
    let (k_f, n_f) = (k as f64, n as f64);
    let ln_choose =
        math::ln_gamma(n_f + 1.0) - math::ln_gamma(k_f + 1.0) - math::ln_gamma(n_f - k_f + 1.0);
    // 0 · ln 0 = 0 at the edges of p.
    let success = if k == 0 { 0.0 } else { k_f * math::ln(p) };
    let failure = if k == n { 0.0 } else { (n_f - k_f) * math::ln_1p(-p) };
    ln_choose + success + failure
}

/// Continuous relaxation of the Binomial(n, 1/2) partitioning statistic.
///
/// Two sibling cells with intensities `i1`, `i2` are taken to hold
/// `i1 / alpha` and `i2 / alpha` molecules of a mother cell's
/// `(i1 + i2) / alpha`, where `alpha` is the fluorescence per molecule:
///
/// ```text
/// ln p(I1, I2 | α) = -ln α + lnΓ((I1+I2)/α + 1) - lnΓ(I1/α + 1) - lnΓ(I2/α + 1)
///                    - ((I1+I2)/α)·ln 2
/// ```
///
/// The `-ln α` term is the change of variables from molecule counts to
/// intensity. Returns `-∞` when `alpha` is not strictly positive and finite.
pub fn partition_lpdf(i1: f64, i2: f64, alpha: f64) -> f64 {
    if !(alpha > 0.0) || !alpha.is_finite() {
        return f64::NEG_INFINITY;
    }
    let n1 = i1 / alpha;
    let n2 = i2 / alpha;
    let n_tot = n1 + n2;
    // Summed before subtracting so swapping the siblings is bit-for-bit symmetric.
    let ln_siblings = math::ln_gamma(n1 + 1.0) + math::ln_gamma(n2 + 1.0);
    -math::ln(alpha) + math::ln_gamma(n_tot + 1.0) - ln_siblings - n_tot * LN_2
}
