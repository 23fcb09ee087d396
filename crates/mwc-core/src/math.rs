//! Math functions for no_std compatibility.
//!
//! In no_std mode, f64 doesn't have transcendental methods like sqrt, ln, exp, etc.
//! This module provides these functions using libm.

/// Square root.
#[inline]
pub fn sqrt(x: f64) -> f64 {
    libm::sqrt(x)
}

/// Natural logarithm.
#[inline]
pub fn ln(x: f64) -> f64 {
    libm::log(x)
}

/// `ln(1 + x)`, accurate for small `x`.
#[inline]
pub fn ln_1p(x: f64) -> f64 {
    libm::log1p(x)
}

/// Exponential (e^x).
#[inline]
pub fn exp(x: f64) -> f64 {
    libm::exp(x)
}

/// Natural logarithm of the gamma function, `ln Γ(x)` for `x > 0`.
#[inline]
pub fn ln_gamma(x: f64) -> f64 {
    libm::lgamma(x)
}

/// Power (x^y).
#[inline]
pub fn pow(x: f64, y: f64) -> f64 {
    libm::pow(x, y)
}

/// Floor (round down).
#[inline]
pub fn floor(x: f64) -> f64 {
    libm::floor(x)
}

/// Square (x^2).
#[inline]
pub fn sq(x: f64) -> f64 {
    x * x
}

/// Absolute value.
#[inline]
pub fn abs(x: f64) -> f64 {
    libm::fabs(x)
}

/// Softplus `ln(1 + e^x)` without overflow for large `x`.
#[inline]
pub fn ln_1p_exp(x: f64) -> f64 {
    if x > 0.0 {
        x + ln_1p(exp(-x))
    } else {
        ln_1p(exp(x))
    }
}

/// Logistic function `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + exp(-x))
    } else {
        let e = exp(x);
        e / (1.0 + e)
    }
}

/// `ln(sigmoid(x))`, stable in both tails.
#[inline]
pub fn ln_sigmoid(x: f64) -> f64 {
    -ln_1p_exp(-x)
}

/// Inverse of [`sigmoid`] for `p ∈ (0, 1)`.
#[inline]
pub fn logit(p: f64) -> f64 {
    ln(p) - ln_1p(-p)
}
