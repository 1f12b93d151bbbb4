//! Text codecs for Nutty identifiers.
//!
//! Only base-58 is needed today: both the 128-bit UUID segment of a wire
//! identifier and the 41-bit short code use it.

pub mod base58;

pub use base58::{ALPHABET, decode, encode, encode_signed, is_base58_char};
