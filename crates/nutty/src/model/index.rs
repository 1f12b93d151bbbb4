//! Fractional indices for ordering sibling content blocks.
//!
//! An index is a base-94 fraction written with the printable ASCII range
//! `!` (digit 0) through `~` (digit 93), most significant digit first. A new
//! index can always be generated strictly between two distinct ones, so
//! moving a block only ever rewrites that block's index.
//!
//! Indices compare as fractions: the shorter one is right-padded with `!`
//! before a lexicographic comparison. `"a"` and `"a!"` are therefore the same
//! position. Equality, hashing and [`FractionalIndex::between`] all follow
//! this rule.
//!
//! There is no length cap. Repeatedly inserting into the same narrow gap
//! grows the keys by about one character per halving.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FractionalIndexError;
use crate::limits::{INDEX_BASE, INDEX_MAX_CHAR, INDEX_MIN_CHAR};

/// A base-94 order-key.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FractionalIndex(String);

impl FractionalIndex {
    /// Creates an index, checking that every character is in `!`..=`~`.
    pub fn new(index: impl Into<String>) -> Result<Self, FractionalIndexError> {
        let index = index.into();
        check_index(&index)?;
        Ok(Self(index))
    }

    /// The lowest single-digit index, `!`.
    pub fn start() -> Self {
        Self((INDEX_MIN_CHAR as char).to_string())
    }

    /// The highest single-digit index, `~`.
    pub fn end() -> Self {
        Self((INDEX_MAX_CHAR as char).to_string())
    }

    /// Generates the index halfway between `before` and `after`.
    ///
    /// Argument order does not matter; the result lies strictly between the
    /// smaller and the larger of the two.
    ///
    /// # Errors
    ///
    /// Returns [`FractionalIndexError::IdenticalIndices`] if both indices
    /// denote the same position.
    pub fn between(before: &Self, after: &Self) -> Result<Self, FractionalIndexError> {
        if before == after {
            debug!(index = before.as_str(), "between() on identical indices");
            return Err(FractionalIndexError::IdenticalIndices {
                index: before.0.clone(),
            });
        }

        let width = before.0.len().max(after.0.len());
        let lhs = before.padded_digits(width);
        let rhs = after.padded_digits(width);

        // Add, least significant digit first. `carry` ends up as the integer
        // part of the sum, 0 or 1, since both operands are below 1.
        let mut sum = vec![0u32; width];
        let mut carry = 0;
        for i in (0..width).rev() {
            let s = lhs[i] + rhs[i] + carry;
            sum[i] = s % INDEX_BASE;
            carry = s / INDEX_BASE;
        }

        // Halve, most significant digit first. An odd remainder is worth
        // half a unit of the next digit.
        let mut result = String::with_capacity(width + 1);
        let mut remainder = carry;
        for s in sum {
            let value = remainder * INDEX_BASE + s;
            result.push(digit_char(value / 2));
            remainder = value % 2;
        }
        if remainder > 0 {
            result.push(digit_char(INDEX_BASE / 2));
        }

        Ok(Self(result))
    }

    /// Generates an index after this one.
    ///
    /// Below [`Self::end`] this is the midpoint to `~`. At or past `~` (for
    /// example `~P`), the upper bound is this index with a `~` appended.
    pub fn after(&self) -> Result<Self, FractionalIndexError> {
        let end = Self::end();
        if *self < end {
            Self::between(self, &end)
        } else {
            Self::between(self, &Self(format!("{}~", self.0)))
        }
    }

    /// Generates an index before this one (halfway from [`Self::start`]).
    pub fn before(&self) -> Result<Self, FractionalIndexError> {
        Self::between(&Self::start(), self)
    }

    /// The index as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of digits, including any trailing `!`.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; an index has at least one digit.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Digit values, right-padded with zeros to `width`.
    fn padded_digits(&self, width: usize) -> Vec<u32> {
        self.0
            .bytes()
            .map(|b| (b - INDEX_MIN_CHAR) as u32)
            .chain(std::iter::repeat(0))
            .take(width)
            .collect()
    }

    /// The index without trailing `!` padding.
    fn significant(&self) -> &[u8] {
        self.0.trim_end_matches(INDEX_MIN_CHAR as char).as_bytes()
    }
}

#[inline]
fn digit_char(digit: u32) -> char {
    (digit as u8 + INDEX_MIN_CHAR) as char
}

/// Checks that `index` is a non-empty run of `!`..=`~`.
pub fn check_index(index: &str) -> Result<(), FractionalIndexError> {
    if index.is_empty() {
        return Err(FractionalIndexError::Empty);
    }
    for (position, c) in index.chars().enumerate() {
        if !(INDEX_MIN_CHAR as char..=INDEX_MAX_CHAR as char).contains(&c) {
            return Err(FractionalIndexError::InvalidCharacter { char: c, position });
        }
    }
    Ok(())
}

impl Ord for FractionalIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self.0.len().max(other.0.len());
        let pad = std::iter::repeat(INDEX_MIN_CHAR);
        let lhs = self.0.bytes().chain(pad.clone()).take(width);
        let rhs = other.0.bytes().chain(pad).take(width);
        lhs.cmp(rhs)
    }
}

impl PartialOrd for FractionalIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FractionalIndex {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for FractionalIndex {}

impl Hash for FractionalIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl fmt::Display for FractionalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for FractionalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FractionalIndex({:?})", self.0)
    }
}

impl FromStr for FractionalIndex {
    type Err = FractionalIndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FractionalIndex {
    type Error = FractionalIndexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FractionalIndex> for String {
    fn from(index: FractionalIndex) -> String {
        index.0
    }
}
