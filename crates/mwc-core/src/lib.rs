//! Core models and inference for the MWC thermodynamic and calibration
//! factor analyses.
//!
//! This crate provides the log-densities of two models together with the
//! numerical machinery to fit them, designed to work in `no_std`
//! environments with only an allocator:
//!
//! - [`thermo`]: Van't Hoff temperature dependence of the repressor binding
//!   energy, scored against measured fold-change.
//! - [`calibration`]: hierarchical fluorescence calibration factor from the
//!   Binomial partitioning of molecules between sibling cells.
//!
//! # Features
//!
//! - `std` (default): `std::error::Error` impls and std-backed RNG support
//!
//! # Usage
//!
//! This crate is typically used through the `mwc` crate, which adds
//! configuration, parallel chains, logging and JSON output. The models can
//! also be evaluated directly:
//!
//! ```ignore
//! use mwc_core::{LogDensity, ThermoInput, ThermoModel};
//!
//! let model = ThermoModel::from_input(&input)?;
//! let lp = model.log_density(&[0.1, -12.0, 3500.0, 1.0]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod architecture;
pub mod calibration;
pub mod constants;
pub mod density;
pub mod diagnostics;
pub mod error;
pub mod math;
pub mod model;
pub mod optimize;
pub mod sampler;
pub mod summary;
pub mod thermo;
pub mod transform;

// Re-export commonly used items at crate root
pub use architecture::{Mwc, SimpleRepression, LITERATURE};
pub use calibration::{
    CalibrationData, CalibrationInput, DeviationSupport, HierarchicalCalibration,
    SingleCalibration,
};
pub use error::ValidationError;
pub use model::LogDensity;
pub use optimize::{ConvergenceStatus, NelderMead, OptimizationResult};
pub use sampler::{Chain, MetropolisSampler};
pub use summary::ParameterSummary;
pub use thermo::{ThermoData, ThermoInput, ThermoModel, ThermoParams};
pub use transform::Constraint;
