//! Parsing of the two model input records from JSON.
//!
//! Field names follow the models' data blocks (`J`, `N`, `Nns`, `temps`,
//! `idx`, `R`, `foldchange` and `J1`, `J2`, `N`, `index_1`, `index_2`,
//! `I_1`, `I_2`). Parsing only checks the JSON shape; the models validate
//! sizes, indices and domains.

use mwc_core::{CalibrationInput, ThermoInput};

use crate::error::FitError;

/// Parse a thermodynamic-model input record.
///
/// # Errors
///
/// [`FitError::Serialization`] on malformed JSON or missing fields.
pub fn thermo_from_json(json: &str) -> Result<ThermoInput, FitError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a calibration-model input record.
///
/// # Errors
///
/// [`FitError::Serialization`] on malformed JSON or missing fields.
pub fn calibration_from_json(json: &str) -> Result<CalibrationInput, FitError> {
    Ok(serde_json::from_str(json)?)
}
