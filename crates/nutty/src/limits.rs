//! Format constants for Nutty IDs and fractional indices.

/// Number of low UUID bits folded into a short code.
///
/// 58^7 lies between 2^41 and 2^42, so 41 bits is the most that always fits
/// in seven base-58 characters.
pub const SHORT_CODE_BITS: u32 = 41;

/// Mask selecting the short-code bits of a 128-bit UUID value.
pub const SHORT_CODE_MASK: u128 = (1 << SHORT_CODE_BITS) - 1;

/// Length of a short code in characters.
pub const SHORT_CODE_LEN: usize = 7;

/// Base-58 rendering of [`SHORT_CODE_MASK`], the largest valid short code.
pub const MAX_SHORT_CODE: &str = "zmM9z4E";

/// Width of the UUID segment of a wire-form identifier.
///
/// 58^22 > 2^128, so every UUID fits.
pub const WIRE_UUID_LEN: usize = 22;

/// Separator between the UUID segment and the short code on the wire.
pub const WIRE_SEPARATOR: char = ':';

/// Total length of a wire-form identifier.
pub const WIRE_LEN: usize = WIRE_UUID_LEN + 1 + SHORT_CODE_LEN;

/// Number of leading UUID bits holding the Unix timestamp in milliseconds.
pub const TIMESTAMP_BITS: u32 = 48;

/// Smallest fractional index digit, `!`.
pub const INDEX_MIN_CHAR: u8 = b'!';

/// Largest fractional index digit, `~`.
pub const INDEX_MAX_CHAR: u8 = b'~';

/// Radix of a fractional index.
pub const INDEX_BASE: u32 = (INDEX_MAX_CHAR - INDEX_MIN_CHAR) as u32 + 1;
