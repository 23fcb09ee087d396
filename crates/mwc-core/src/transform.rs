//! Maps between constrained parameters and the unconstrained space a
//! sampler or optimizer walks in.
//!
//! | Constraint          | `y = f(x)`                        | `ln |dy/dx|`                          |
//! |---------------------|-----------------------------------|---------------------------------------|
//! | `Unconstrained`     | `x`                               | `0`                                   |
//! | `Positive`          | `e^x`                             | `x`                                   |
//! | `LowerBound(lb)`    | `lb + e^x`                        | `x`                                   |
//! | `Interval { a, b }` | `a + (b - a)·sigmoid(x)`          | `ln(b - a) + ln σ(x) + ln σ(-x)`      |

use serde::{Deserialize, Serialize};

use crate::math;

/// Support of a single scalar parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    /// The whole real line.
    Unconstrained,
    /// Strictly positive reals.
    Positive,
    /// `(lb, ∞)`.
    LowerBound(f64),
    /// `(lower, upper)`.
    Interval {
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },
}

impl Constraint {
    /// Map an unconstrained value into the constrained support.
    pub fn to_constrained(&self, x: f64) -> f64 {
        match *self {
            Self::Unconstrained => x,
            Self::Positive => math::exp(x),
            Self::LowerBound(lb) => lb + math::exp(x),
            Self::Interval { lower, upper } => lower + (upper - lower) * math::sigmoid(x),
        }
    }

    /// Map a constrained value back to the real line.
    ///
    /// Values on or outside the boundary map to `±∞` (or NaN), which the
    /// log-density then rejects.
    pub fn to_unconstrained(&self, y: f64) -> f64 {
        match *self {
            Self::Unconstrained => y,
            Self::Positive => math::ln(y),
            Self::LowerBound(lb) => math::ln(y - lb),
            Self::Interval { lower, upper } => math::logit((y - lower) / (upper - lower)),
        }
    }

    /// `ln |d to_constrained(x) / dx|`.
    pub fn log_abs_det_jacobian(&self, x: f64) -> f64 {
        match *self {
            Self::Unconstrained => 0.0,
            Self::Positive | Self::LowerBound(_) => x,
            Self::Interval { lower, upper } => {
                math::ln(upper - lower) + math::ln_sigmoid(x) + math::ln_sigmoid(-x)
            }
        }
    }

    /// Whether `y` lies strictly inside the support.
    pub fn contains(&self, y: f64) -> bool {
        match *self {
            Self::Unconstrained => y.is_finite(),
            Self::Positive => y > 0.0 && y.is_finite(),
            Self::LowerBound(lb) => y > lb && y.is_finite(),
            Self::Interval { lower, upper } => y > lower && y < upper,
        }
    }
}
