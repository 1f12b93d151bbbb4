//! Boundary validation for identifiers and order-keys arriving as text.
//!
//! Each function checks one external form and returns the parsed value or a
//! typed error. Nothing here panics or retries; the same input always gives
//! the same answer.

use rustc_hash::FxHashSet;

use crate::error::{FractionalIndexError, NuttyIdError};
use crate::model::{FractionalIndex, NuttyId, ShortCode};

/// Validates a bare short code: 7 base-58 characters, at most `zmM9z4E`.
pub fn validate_short_code(code: &str) -> Result<ShortCode, NuttyIdError> {
    ShortCode::parse(code)
}

/// Validates a wire identifier, including its short-code checksum.
pub fn validate_wire_id(wire: &str) -> Result<NuttyId, NuttyIdError> {
    NuttyId::from_wire_string(wire)
}

/// Validates a fractional index string.
pub fn validate_index(index: &str) -> Result<FractionalIndex, FractionalIndexError> {
    FractionalIndex::new(index)
}

/// Checks that no two sibling indices denote the same position.
///
/// Returns the first duplicate found. Siblings sharing a position still sort
/// deterministically (by ID) but nothing can be inserted between them.
pub fn validate_siblings<'a, I>(indices: I) -> Result<(), FractionalIndexError>
where
    I: IntoIterator<Item = &'a FractionalIndex>,
{
    let mut seen = FxHashSet::default();
    for index in indices {
        if !seen.insert(index) {
            return Err(FractionalIndexError::IdenticalIndices {
                index: index.as_str().to_string(),
            });
        }
    }
    Ok(())
}
