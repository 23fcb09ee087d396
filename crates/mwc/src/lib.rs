//! # mwc
//!
//! Fit the two statistical models of the MWC induction study:
//!
//! - **Thermodynamic model**: Van't Hoff dependence of the repressor
//!   binding energy on temperature, scored against measured fold-change.
//! - **Calibration model**: hierarchical fluorescence calibration factor
//!   from how fluorescent molecules partition between sibling cells.
//!
//! The log-densities and numerics live in `mwc-core`; this crate adds
//! configuration, parallel chains, logging and JSON output.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mwc::{fit_thermo, thermo_from_json, to_json_pretty, Inference};
//!
//! let input = thermo_from_json(&std::fs::read_to_string("thermo.json")?)?;
//! let fit = fit_thermo(&input, &Inference::new().seed(42))?;
//!
//! for s in &fit.posterior.summary {
//!     println!("{}: {:.3} [{:.3}, {:.3}]", s.parameter, s.median, s.hpd_min, s.hpd_max);
//! }
//! println!("{}", to_json_pretty(&fit.map)?);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod inference;
mod input;
pub mod output;
mod result;

pub use config::Config;
pub use error::FitError;
pub use inference::Inference;
pub use input::{calibration_from_json, thermo_from_json};
pub use output::{to_json, to_json_pretty};
pub use result::{Fit, MapEstimate, Posterior};

// Re-export the core models and types
pub use mwc_core::{
    CalibrationData, CalibrationInput, Chain, Constraint, ConvergenceStatus, DeviationSupport,
    HierarchicalCalibration, LogDensity, Mwc, ParameterSummary, SimpleRepression,
    SingleCalibration, ThermoData, ThermoInput, ThermoModel, ThermoParams, ValidationError,
};

/// Validate a thermodynamic-model record, find its mode and sample it.
///
/// # Errors
///
/// [`FitError::Validation`] for malformed input; otherwise see
/// [`Inference::fit`].
pub fn fit_thermo(input: &ThermoInput, inference: &Inference) -> Result<Fit, FitError> {
    let model = ThermoModel::from_input(input)?;
    tracing::info!(
        "thermodynamic model: {} measurements over {} temperatures",
        model.data().len(),
        model.data().levels()
    );
    inference.fit(&model)
}

/// Validate a calibration-model record, find its mode and sample it.
///
/// Raw deviations use the default non-negative support; build a
/// [`HierarchicalCalibration`] directly to choose another.
///
/// # Errors
///
/// [`FitError::Validation`] for malformed input; otherwise see
/// [`Inference::fit`].
pub fn fit_calibration(input: &CalibrationInput, inference: &Inference) -> Result<Fit, FitError> {
    let model = HierarchicalCalibration::from_input(input)?;
    tracing::info!(
        "calibration model: {} sibling pairs, {} experiments, {} groups",
        model.data().len(),
        model.data().experiments(),
        model.data().groups()
    );
    inference.fit(&model)
}
