//! Field-level validation shared by every record kind.
//!
//! # Responsibility
//! - Define the single validation error type surfaced before persistence.
//! - Hold the numeric and text bounds every record is checked against.
//!
//! # Invariants
//! - Validation never coerces: an out-of-bounds value is rejected, not
//!   clamped or truncated.
//! - Text limits count characters, not bytes.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound for "minutes per day" fields (one day in minutes).
pub const MAX_MINUTES_PER_DAY: u16 = 1440;
/// Upper bound for the survey safety rating.
pub const MAX_SAFE_RATING: u16 = 10;
/// Maximum number of characters in free-text comment fields.
pub const MAX_COMMENT_CHARS: usize = 5000;
/// Largest value a non-negative small-integer column can hold.
pub const SMALL_INT_MAX: u16 = 32_767;
/// Largest value a non-negative integer column can hold.
pub const INT_MAX: u32 = 2_147_483_647;

/// Validation failure for a record or submission.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field was absent.
    MissingField(&'static str),
    /// An integer field is negative or above its maximum.
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    /// A text field exceeds its character limit.
    TextTooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
    /// A tag is not part of the field's vocabulary.
    UnknownTag { field: &'static str, value: String },
    /// Latitude/longitude are not finite or outside WGS84 bounds.
    InvalidCoordinate {
        field: &'static str,
        latitude: f64,
        longitude: f64,
    },
    /// Record identity must not be the nil UUID.
    NilId,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field} is required"),
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field} ({value}) must be between {min} and {max}"),
            Self::TextTooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{field} has {actual_chars} characters; at most {max_chars} allowed"
            ),
            Self::UnknownTag { field, value } => {
                write!(f, "`{value}` is not a valid choice for {field}")
            }
            Self::InvalidCoordinate {
                field,
                latitude,
                longitude,
            } => write!(
                f,
                "{field} ({latitude}, {longitude}) is not a valid latitude/longitude"
            ),
            Self::NilId => write!(f, "record id must not be nil"),
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub(crate) fn required<T>(field: &'static str, value: Option<T>) -> ValidationResult<T> {
    value.ok_or(ValidationError::MissingField(field))
}

/// Converts a raw submitted integer into a bounded small integer.
pub(crate) fn small_int(field: &'static str, value: i64, max: u16) -> ValidationResult<u16> {
    if !(0..=i64::from(max)).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min: 0,
            max: i64::from(max),
        });
    }
    // Bounds checked above.
    Ok(value as u16)
}

/// Converts a raw submitted integer into a non-negative integer.
pub(crate) fn int(field: &'static str, value: i64) -> ValidationResult<u32> {
    if !(0..=i64::from(INT_MAX)).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min: 0,
            max: i64::from(INT_MAX),
        });
    }
    Ok(value as u32)
}

pub(crate) fn check_small_int(field: &'static str, value: u16, max: u16) -> ValidationResult<()> {
    small_int(field, i64::from(value), max).map(|_| ())
}

pub(crate) fn check_int(field: &'static str, value: u32) -> ValidationResult<()> {
    int(field, i64::from(value)).map(|_| ())
}

pub(crate) fn check_text(field: &'static str, value: &str, max_chars: usize) -> ValidationResult<()> {
    let actual_chars = value.chars().count();
    if actual_chars > max_chars {
        return Err(ValidationError::TextTooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(())
}
