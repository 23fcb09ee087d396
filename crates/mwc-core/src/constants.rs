//! Physical constants, prior hyperparameters and inference defaults.

/// Default deterministic seed for RNG operations.
///
/// Same seed + same data = same draws. The value `0x6D7763` is "mwc"
/// encoded in ASCII.
pub const DEFAULT_SEED: u64 = 0x6D7763;

/// Offset between the Celsius and Kelvin scales.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Natural log of 2, the per-molecule cost of an unbiased partition.
pub const LN_2: f64 = core::f64::consts::LN_2;

/// Natural log of 2*pi, used in normal log-pdf computation.
pub const LOG_2PI: f64 = 1.8378770664093453;

/// Number of nonspecific binding sites: the approximate length of the
/// *E. coli* genome in base pairs.
pub const N_NS: f64 = 4.6e6;

// =============================================================================
// Thermodynamic model priors
// =============================================================================

/// Scale of the half-normal prior on the log fold-change noise `sigma`.
pub const SIGMA_PRIOR_SCALE: f64 = 0.1;

/// Location of the normal prior on the reference free-energy offset (k_BT).
pub const EPSILON_PRIOR_MU: f64 = -12.0;

/// Scale of the normal prior on the reference free-energy offset (k_BT).
pub const EPSILON_PRIOR_SD: f64 = 6.0;

/// Log-normal prior `(mu, sigma)` on the enthalpy-like parameter.
pub const DEL_H_PRIOR: (f64, f64) = (0.0, 10.0);

/// Log-normal prior `(mu, sigma)` on the entropy-like intercept.
pub const DEL_S_PRIOR: (f64, f64) = (0.0, 1.0);

// =============================================================================
// Calibration model priors
// =============================================================================

/// Log-normal prior `(mu, sigma)` on each group mean calibration factor.
pub const ALPHA_MU_PRIOR: (f64, f64) = (3.0, 3.0);

/// Upper bound of the group mean calibration factor (a.u. per molecule).
///
/// A 12-bit camera cannot report more than 4096 counts per molecule.
pub const ALPHA_MU_UPPER: f64 = 4096.0;

/// Scale of the half-normal prior on the between-experiment deviation `tau`.
pub const TAU_PRIOR_SCALE: f64 = 1.0;

/// Scale of the half-normal prior on a single lineage's calibration factor.
pub const SINGLE_ALPHA_PRIOR_SCALE: f64 = 500.0;

// =============================================================================
// Inference defaults
// =============================================================================

/// Default number of independent Markov chains.
pub const DEFAULT_CHAINS: usize = 4;

/// Default warm-up (adaptation) iterations per chain, discarded.
pub const DEFAULT_WARMUP: usize = 2_000;

/// Default retained draws per chain.
pub const DEFAULT_DRAWS: usize = 2_000;

/// Optimal random-walk Metropolis acceptance rate in moderate dimension.
pub const TARGET_ACCEPTANCE: f64 = 0.234;

/// Default probability mass of reported highest posterior density intervals.
pub const DEFAULT_HPD_MASS: f64 = 0.95;

/// Default Nelder–Mead iteration limit.
pub const DEFAULT_MAX_ITERATIONS: usize = 5_000;

/// Default Nelder–Mead convergence tolerance on the simplex spread.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Default number of optimizer restarts from the previous optimum.
pub const DEFAULT_RESTARTS: usize = 3;

/// Split-R̂ above which chains are reported as not mixed.
pub const RHAT_THRESHOLD: f64 = 1.05;
