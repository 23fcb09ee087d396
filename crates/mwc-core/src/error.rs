//! Input validation errors.
//!
//! Malformed data is a hard failure reported here, before any density is
//! evaluated. Parameter values outside a model's support are not errors:
//! the log-density returns `f64::NEG_INFINITY` for them instead.

use core::fmt;

/// Error returned when model input data fails validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A 1-based index points outside its target collection.
    InvalidIndex {
        /// Name of the index field (e.g. `"idx"`).
        field: &'static str,
        /// 0-based position of the offending entry.
        position: usize,
        /// The index value found, which may be negative in raw input.
        value: i64,
        /// Largest valid index (the collection size).
        max: usize,
    },

    /// A value lies outside its required domain.
    InvalidDomain {
        /// Name of the field.
        field: &'static str,
        /// 0-based position for vector fields, `None` for scalars.
        position: Option<usize>,
        /// The value found.
        value: f64,
        /// Human-readable requirement, e.g. `"> 0"`.
        requirement: &'static str,
    },

    /// A declared size disagrees with the length of a vector field.
    LengthMismatch {
        /// Name of the vector field.
        field: &'static str,
        /// Length implied by the declared sizes.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// A collection that must be non-empty is empty.
    Empty {
        /// Name of the field.
        field: &'static str,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIndex {
                field,
                position,
                value,
                max,
            } => write!(
                f,
                "invalid index: {field}[{position}] = {value} is outside 1..={max}"
            ),
            Self::InvalidDomain {
                field,
                position: Some(position),
                value,
                requirement,
            } => write!(
                f,
                "invalid domain: {field}[{position}] = {value} must be {requirement}"
            ),
            Self::InvalidDomain {
                field,
                position: None,
                value,
                requirement,
            } => write!(f, "invalid domain: {field} = {value} must be {requirement}"),
            Self::LengthMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "length mismatch: {field} has {actual} entries, expected {expected}"
            ),
            Self::Empty { field } => write!(f, "{field} must not be empty"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ValidationError {}

// =============================================================================
// Shared checks
// =============================================================================

pub(crate) fn check_len(
    field: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ValidationError> {
    if expected != actual {
        return Err(ValidationError::LengthMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn check_non_empty(field: &'static str, len: usize) -> Result<(), ValidationError> {
    if len == 0 {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

/// Convert 1-based indices into 0-based ones, checking each lies in `1..=max`.
pub(crate) fn zero_based(
    field: &'static str,
    indices: &[i64],
    max: usize,
) -> Result<alloc::vec::Vec<usize>, ValidationError> {
    indices
        .iter()
        .enumerate()
        .map(|(position, &value)| match usize::try_from(value) {
            Ok(index) if (1..=max).contains(&index) => Ok(index - 1),
            _ => Err(ValidationError::InvalidIndex {
                field,
                position,
                value,
                max,
            }),
        })
        .collect()
}

/// Require every entry to satisfy `ok`, reporting the first that does not.
pub(crate) fn check_each(
    field: &'static str,
    values: &[f64],
    requirement: &'static str,
    ok: impl Fn(f64) -> bool,
) -> Result<(), ValidationError> {
    match values.iter().position(|&v| !ok(v)) {
        Some(position) => Err(ValidationError::InvalidDomain {
            field,
            position: Some(position),
            value: values[position],
            requirement,
        }),
        None => Ok(()),
    }
}
