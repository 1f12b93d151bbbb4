//! Base-58 integer codec.
//!
//! Big-endian digits over the Bitcoin alphabet, which leaves out `0`, `O`,
//! `I` and `l` because they are easy to misread. The zero digit is `1`, so
//! left-padding with `1` never changes the value.

use lazy_static::lazy_static;

use crate::error::CodecError;

/// The base-58 alphabet, in digit order.
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const BASE: u128 = 58;

/// Marks bytes outside the alphabet in [`DIGITS`].
const NOT_A_DIGIT: u8 = 0xFF;

lazy_static! {
    /// Digit value for every ASCII byte, [`NOT_A_DIGIT`] for the rest.
    static ref DIGITS: [u8; 128] = {
        let mut table = [NOT_A_DIGIT; 128];
        for (value, &symbol) in ALPHABET.iter().enumerate() {
            table[symbol as usize] = value as u8;
        }
        table
    };
}

/// Returns the digit value of `c`, or `None` if it is not in the alphabet.
#[inline]
pub fn digit_value(c: char) -> Option<u8> {
    if !c.is_ascii() {
        return None;
    }
    match DIGITS[c as usize] {
        NOT_A_DIGIT => None,
        value => Some(value),
    }
}

/// Returns true if `c` is one of the 58 alphabet symbols.
#[inline]
pub fn is_base58_char(c: char) -> bool {
    digit_value(c).is_some()
}

/// Encodes `value` as big-endian base-58, left-padded with `1` to `min_width`.
///
/// Zero encodes as a single `1` (or `min_width` of them).
pub fn encode(value: u128, min_width: usize) -> String {
    // 22 digits cover u128::MAX.
    let mut digits = [0u8; 22];
    let mut len = 0;
    let mut remaining = value;

    while remaining > 0 {
        digits[len] = ALPHABET[(remaining % BASE) as usize];
        remaining /= BASE;
        len += 1;
    }
    if len == 0 {
        digits[0] = ALPHABET[0];
        len = 1;
    }

    let width = min_width.max(len);
    let mut out = String::with_capacity(width);
    for _ in len..width {
        out.push(ALPHABET[0] as char);
    }
    for &symbol in digits[..len].iter().rev() {
        out.push(symbol as char);
    }
    out
}

/// Encodes a signed value, rejecting negatives.
pub fn encode_signed(value: i128, min_width: usize) -> Result<String, CodecError> {
    if value < 0 {
        return Err(CodecError::NegativeValue { value });
    }
    Ok(encode(value as u128, min_width))
}

/// Decodes base-58 text back to its integer value.
///
/// Leading `1`s are padding and contribute nothing.
pub fn decode(text: &str) -> Result<u128, CodecError> {
    if text.is_empty() {
        return Err(CodecError::Empty);
    }

    let mut value: u128 = 0;
    for (position, c) in text.chars().enumerate() {
        let digit = digit_value(c).ok_or(CodecError::InvalidCharacter { char: c, position })?;
        value = value
            .checked_mul(BASE)
            .and_then(|v| v.checked_add(digit as u128))
            .ok_or_else(|| CodecError::Overflow {
                text: text.to_string(),
            })?;
    }
    Ok(value)
}
