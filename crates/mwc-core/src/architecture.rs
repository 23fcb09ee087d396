//! Thermodynamic models of simple repression by an allosteric repressor.
//!
//! The fold-change of a simply repressed promoter in the weak-promoter
//! approximation is
//!
//! ```text
//! fold-change = 1 / (1 + p_act · (R / N_NS) · e^{-Δε_R})
//! ```
//!
//! where `p_act` is the probability that a repressor is in its active state,
//! given by the Monod–Wyman–Changeux (MWC) model of allostery:
//!
//! ```text
//! p_act = (1 + c/K_A)^n / ((1 + c/K_A)^n + e^{-Δε_AI} (1 + c/K_I)^n)
//! ```
//!
//! All energies are in units of k_BT.

use serde::{Deserialize, Serialize};

use crate::constants::N_NS;
use crate::error::ValidationError;
use crate::math;

/// Literature values for the wild-type LacI repressor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiteratureConstants {
    /// O1 operator binding energy.
    pub o1: f64,
    /// O2 operator binding energy.
    pub o2: f64,
    /// O3 operator binding energy.
    pub o3: f64,
    /// Oid operator binding energy.
    pub oid: f64,
    /// Active-state inducer dissociation constant (µM).
    pub ka: f64,
    /// Inactive-state inducer dissociation constant (µM).
    pub ki: f64,
    /// Inducer binding sites per repressor.
    pub n_sites: f64,
    /// Nonspecific binding sites.
    pub n_ns: f64,
    /// Energy difference between the inactive and active states.
    pub ep_ai: f64,
}

/// Literature constants for wild-type LacI.
pub const LITERATURE: LiteratureConstants = LiteratureConstants {
    o1: -15.3,
    o2: -13.9,
    o3: -9.7,
    oid: -17.0,
    ka: 139.0,
    ki: 0.53,
    n_sites: 2.0,
    n_ns: N_NS,
    ep_ai: 4.5,
};

/// Monod–Wyman–Changeux allosteric repressor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mwc {
    effector_conc: f64,
    ka: f64,
    ki: f64,
    ep_ai: f64,
    n_sites: f64,
}

impl Mwc {
    /// Create an MWC repressor.
    ///
    /// # Errors
    /// `InvalidDomain` when `ka` or `ki` is not strictly positive, or when the
    /// effector concentration or number of sites is negative.
    pub fn new(
        effector_conc: f64,
        ka: f64,
        ki: f64,
        ep_ai: f64,
        n_sites: f64,
    ) -> Result<Self, ValidationError> {
        positive("ka", ka)?;
        positive("ki", ki)?;
        non_negative("effector_conc", effector_conc)?;
        non_negative("n_sites", n_sites)?;
        finite("ep_ai", ep_ai)?;
        Ok(Self {
            effector_conc,
            ka,
            ki,
            ep_ai,
            n_sites,
        })
    }

    /// Create an MWC repressor from `ln K_A` and `ln K_I`.
    pub fn from_log_constants(
        effector_conc: f64,
        ln_ka: f64,
        ln_ki: f64,
        ep_ai: f64,
        n_sites: f64,
    ) -> Result<Self, ValidationError> {
        Self::new(effector_conc, math::exp(ln_ka), math::exp(ln_ki), ep_ai, n_sites)
    }

    /// LacI with literature constants at effector concentration `c` (µM).
    pub fn lac_repressor(effector_conc: f64) -> Result<Self, ValidationError> {
        let k = LITERATURE;
        Self::new(effector_conc, k.ka, k.ki, k.ep_ai, k.n_sites)
    }

    /// Probability that the repressor is active.
    pub fn p_active(&self) -> f64 {
        let n = self.n_sites;
        let numer = math::pow(1.0 + self.effector_conc / self.ka, n);
        let inactive = math::pow(1.0 + self.effector_conc / self.ki, n);
        let denom = numer + math::exp(-self.ep_ai) * inactive;
        numer / denom
    }

    /// `p_active` in the limit of saturating effector.
    pub fn saturation(&self) -> f64 {
        1.0 / (1.0 + math::exp(-self.ep_ai) * math::pow(self.ka / self.ki, self.n_sites))
    }

    /// `p_active` in the absence of effector.
    pub fn leakiness(&self) -> f64 {
        1.0 / (1.0 + math::exp(-self.ep_ai))
    }
}

/// `ln` fold-change of simple repression at a given active fraction.
///
/// Exactly `0.0` when no active repressor is present (`p_act · R = 0`),
/// whatever the binding energy. Otherwise computed as
/// `-softplus(ln(p_act · R / N_NS) - Δε_R)`, which stays finite for any
/// finite energy.
pub fn log_fold_change(p_active: f64, repressors: f64, n_ns: f64, ep_r: f64) -> f64 {
    let active = p_active * repressors;
    if active == 0.0 {
        return 0.0;
    }
    -math::ln_1p_exp(math::ln(active / n_ns) - ep_r)
}

/// Fold-change of simple repression at a given active fraction.
pub fn fold_change(p_active: f64, repressors: f64, n_ns: f64, ep_r: f64) -> f64 {
    math::exp(log_fold_change(p_active, repressors, n_ns, ep_r))
}

/// A simply repressed promoter, optionally with an allosteric repressor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimpleRepression {
    repressors: f64,
    ep_r: f64,
    n_ns: f64,
    allostery: Option<Mwc>,
}

impl SimpleRepression {
    /// `repressors` per cell binding with energy `ep_r` against `n_ns`
    /// nonspecific sites.
    pub fn new(repressors: f64, ep_r: f64, n_ns: f64) -> Result<Self, ValidationError> {
        non_negative("repressors", repressors)?;
        positive("n_ns", n_ns)?;
        finite("ep_r", ep_r)?;
        Ok(Self {
            repressors,
            ep_r,
            n_ns,
            allostery: None,
        })
    }

    /// Make the repressor allosteric.
    pub fn with_allostery(mut self, mwc: Mwc) -> Self {
        self.allostery = Some(mwc);
        self
    }

    fn p_active(&self) -> f64 {
        self.allostery.map_or(1.0, |m| m.p_active())
    }

    /// Fold-change in gene expression.
    pub fn fold_change(&self) -> f64 {
        fold_change(self.p_active(), self.repressors, self.n_ns, self.ep_r)
    }

    /// Fold-change at an explicit active fraction (non-allosteric use).
    ///
    /// # Errors
    /// `InvalidDomain` unless `p_active ∈ [0, 1]`.
    pub fn fold_change_at(&self, p_active: f64) -> Result<f64, ValidationError> {
        if !(0.0..=1.0).contains(&p_active) {
            return Err(ValidationError::InvalidDomain {
                field: "p_active",
                position: None,
                value: p_active,
                requirement: "in [0, 1]",
            });
        }
        Ok(fold_change(p_active, self.repressors, self.n_ns, self.ep_r))
    }

    /// Fold-change at saturating effector. `None` without allostery.
    pub fn saturation(&self) -> Option<f64> {
        self.allostery
            .map(|m| fold_change(m.saturation(), self.repressors, self.n_ns, self.ep_r))
    }

    /// Fold-change without effector.
    pub fn leakiness(&self) -> f64 {
        let p = self.allostery.map_or(1.0, |m| m.leakiness());
        fold_change(p, self.repressors, self.n_ns, self.ep_r)
    }

    /// Saturation minus leakiness. `None` without allostery.
    pub fn dynamic_range(&self) -> Option<f64> {
        self.saturation().map(|sat| sat - self.leakiness())
    }

    /// Bohr parameter `ln p_act + ln(R / N_NS) - Δε_R`; fold-change is
    /// `1 / (1 + e^{bohr})`.
    pub fn bohr_parameter(&self) -> f64 {
        math::ln(self.p_active()) + math::ln(self.repressors / self.n_ns) - self.ep_r
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(domain(field, value, "> 0"))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(domain(field, value, ">= 0"))
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(domain(field, value, "finite"))
    }
}

fn domain(field: &'static str, value: f64, requirement: &'static str) -> ValidationError {
    ValidationError::InvalidDomain {
        field,
        position: None,
        value,
        requirement,
    }
}
