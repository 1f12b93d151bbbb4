//! Nutty IDs: UUIDv7 identifiers with a seven-character base-58 short code.
//!
//! A [`NuttyId`] wraps a UUID and derives two things from it:
//! - a [`ShortCode`] from the low 41 bits, for permalinks such as
//!   `https://nuttyver.se/qfWLRgy`
//! - a creation timestamp from the leading 48 bits (UUIDv7 layout)
//!
//! On the wire a Nutty ID travels as `<base58(uuid), 22 chars>:<short code>`.
//! The short code doubles as a checksum: decoding recomputes it from the UUID
//! segment and rejects the identifier if the two disagree.
//!
//! A short code on its own is *dissociated*. Many UUIDs share each code, so
//! the full identifier can only be recovered by looking it up (see
//! [`crate::tree::BlockTree::resolve`]).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use tracing::{debug, trace};
use uuid::{NoContext, Timestamp, Uuid};

use crate::codec::base58;
use crate::error::NuttyIdError;
use crate::limits::{
    MAX_SHORT_CODE, SHORT_CODE_LEN, SHORT_CODE_MASK, TIMESTAMP_BITS, WIRE_SEPARATOR,
    WIRE_UUID_LEN,
};

// =============================================================================
// SHORT CODE
// =============================================================================

/// Seven base-58 characters encoding the low 41 bits of a UUID.
///
/// Ordering matches the numeric order of the encoded bits, since all codes
/// have the same width and the alphabet is sorted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortCode([u8; SHORT_CODE_LEN]);

impl ShortCode {
    /// Parses a bare short code.
    pub fn parse(code: &str) -> Result<Self, NuttyIdError> {
        check_short_code(code).map_err(|reason| {
            debug!(code, reason, "rejected short code");
            NuttyIdError::InvalidShortCode {
                input: code.to_string(),
                reason,
            }
        })?;

        let mut bytes = [0u8; SHORT_CODE_LEN];
        bytes.copy_from_slice(code.as_bytes());
        Ok(Self(bytes))
    }

    /// Derives the short code of a UUID.
    pub fn from_uuid(uuid: &Uuid) -> Self {
        Self::from_bits(uuid.as_u128() & SHORT_CODE_MASK)
    }

    /// Encodes a 41-bit value. Higher bits are masked off.
    fn from_bits(bits: u128) -> Self {
        let encoded = base58::encode(bits & SHORT_CODE_MASK, SHORT_CODE_LEN);
        let mut bytes = [0u8; SHORT_CODE_LEN];
        bytes.copy_from_slice(encoded.as_bytes());
        Self(bytes)
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only alphabet bytes are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// The 41-bit value this code encodes.
    pub fn bits(&self) -> u64 {
        self.0
            .iter()
            .fold(0u64, |acc, &b| acc * 58 + base58::digit_value(b as char).unwrap_or(0) as u64)
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Debug for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShortCode({})", self.as_str())
    }
}

impl FromStr for ShortCode {
    type Err = NuttyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ShortCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ShortCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

/// Returns true if `code` could have been derived from some UUID.
///
/// Checks length, alphabet and the 41-bit upper bound.
pub fn is_valid_short_code(code: &str) -> bool {
    check_short_code(code).is_ok()
}

fn check_short_code(code: &str) -> Result<(), &'static str> {
    if code.len() != SHORT_CODE_LEN {
        return Err("must be exactly 7 characters");
    }
    if !code.chars().all(base58::is_base58_char) {
        return Err("contains a character outside the base-58 alphabet");
    }
    // Fixed width over a sorted alphabet: string order is numeric order.
    if code > MAX_SHORT_CODE {
        return Err("exceeds the largest 41-bit value");
    }
    Ok(())
}

// =============================================================================
// NUTTY ID
// =============================================================================

/// A UUID together with its derived short code.
///
/// Ordered by UUID, which for UUIDv7 is creation order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NuttyId {
    uuid: Uuid,
    short_code: ShortCode,
}

impl NuttyId {
    /// Derives a Nutty ID from a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            short_code: ShortCode::from_uuid(&uuid),
        }
    }

    /// Creates a Nutty ID from a fresh UUIDv7.
    pub fn now() -> Self {
        let id = Self::new(Uuid::now_v7());
        trace!(id = %id, "generated nutty id");
        id
    }

    /// Creates a Nutty ID from a UUIDv7 stamped with `instant`.
    ///
    /// Instants before the Unix epoch are clamped to it.
    pub fn at(instant: DateTime<Utc>) -> Self {
        let millis = u64::try_from(instant.timestamp_millis()).unwrap_or(0);
        let ts = Timestamp::from_unix(
            NoContext,
            millis / 1000,
            (millis % 1000) as u32 * 1_000_000,
        );
        Self::new(Uuid::new_v7(ts))
    }

    /// The underlying UUID.
    pub fn uuid(&self) -> &Uuid {
        &self.uuid
    }

    /// The derived short code.
    pub fn short_code(&self) -> ShortCode {
        self.short_code
    }

    /// Milliseconds since the Unix epoch, read from the leading 48 bits.
    pub fn created_at_millis(&self) -> u64 {
        (self.uuid.as_u128() >> (128 - TIMESTAMP_BITS)) as u64
    }

    /// Creation time in the local time zone of the machine doing the decoding.
    ///
    /// The same ID shows different wall-clock times in different zones; the
    /// instant is the same.
    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at_in(&Local)
    }

    /// Creation time in an explicit time zone.
    pub fn created_at_in<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Tz> {
        // 48 bits of milliseconds are always within chrono's range.
        DateTime::<Utc>::from_timestamp_millis(self.created_at_millis() as i64)
            .unwrap_or_default()
            .with_timezone(tz)
    }

    /// Formats the wire form, `<22 base-58 chars>:<short code>`.
    pub fn to_wire_string(&self) -> String {
        let mut s = base58::encode(self.uuid.as_u128(), WIRE_UUID_LEN);
        s.push(WIRE_SEPARATOR);
        s.push_str(self.short_code.as_str());
        s
    }

    /// Parses the wire form, verifying the short code against the UUID.
    pub fn from_wire_string(input: &str) -> Result<Self, NuttyIdError> {
        let Some((uuid_part, code_part)) = input.split_once(WIRE_SEPARATOR) else {
            return Err(NuttyIdError::MalformedWire {
                input: input.to_string(),
            });
        };
        if code_part.contains(WIRE_SEPARATOR) {
            return Err(NuttyIdError::MalformedWire {
                input: input.to_string(),
            });
        }

        let len = uuid_part.chars().count();
        if len != WIRE_UUID_LEN {
            return Err(NuttyIdError::UuidSegmentLength {
                len,
                expected: WIRE_UUID_LEN,
            });
        }

        let id = Self::new(Uuid::from_u128(base58::decode(uuid_part)?));
        if id.short_code.as_str() != code_part {
            debug!(
                input,
                expected = id.short_code.as_str(),
                "short code checksum mismatch"
            );
            return Err(NuttyIdError::ChecksumMismatch {
                expected: id.short_code.to_string(),
                found: code_part.to_string(),
            });
        }
        Ok(id)
    }
}

impl fmt::Display for NuttyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire_string())
    }
}

impl fmt::Debug for NuttyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NuttyId({}, {})", self.uuid, self.short_code)
    }
}

impl FromStr for NuttyId {
    type Err = NuttyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire_string(s)
    }
}

impl From<Uuid> for NuttyId {
    fn from(uuid: Uuid) -> Self {
        Self::new(uuid)
    }
}

impl From<NuttyId> for Uuid {
    fn from(id: NuttyId) -> Uuid {
        id.uuid
    }
}

impl Serialize for NuttyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NuttyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_wire_string(&s).map_err(de::Error::custom)
    }
}

// =============================================================================
// ANY NUTTY ID
// =============================================================================

/// Either a full [`NuttyId`] or a dissociated [`ShortCode`].
///
/// For signatures that accept whatever the user typed: a pasted wire
/// identifier or just the seven characters from a permalink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyNuttyId {
    Associated(NuttyId),
    Dissociated(ShortCode),
}

impl AnyNuttyId {
    /// Parses a wire identifier (contains `:`) or a bare short code.
    pub fn parse(input: &str) -> Result<Self, NuttyIdError> {
        if input.contains(WIRE_SEPARATOR) {
            NuttyId::from_wire_string(input).map(AnyNuttyId::Associated)
        } else {
            ShortCode::parse(input).map(AnyNuttyId::Dissociated)
        }
    }

    /// The short code, available for both variants.
    pub fn short_code(&self) -> ShortCode {
        match self {
            AnyNuttyId::Associated(id) => id.short_code(),
            AnyNuttyId::Dissociated(code) => *code,
        }
    }

    /// The full ID, if known.
    pub fn nutty_id(&self) -> Option<&NuttyId> {
        match self {
            AnyNuttyId::Associated(id) => Some(id),
            AnyNuttyId::Dissociated(_) => None,
        }
    }

    /// Returns true if `id` carries this short code (or is this ID).
    pub fn matches(&self, id: &NuttyId) -> bool {
        match self {
            AnyNuttyId::Associated(own) => own == id,
            AnyNuttyId::Dissociated(code) => *code == id.short_code(),
        }
    }
}

impl From<NuttyId> for AnyNuttyId {
    fn from(id: NuttyId) -> Self {
        AnyNuttyId::Associated(id)
    }
}

impl From<ShortCode> for AnyNuttyId {
    fn from(code: ShortCode) -> Self {
        AnyNuttyId::Dissociated(code)
    }
}

impl fmt::Display for AnyNuttyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyNuttyId::Associated(id) => fmt::Display::fmt(id, f),
            AnyNuttyId::Dissociated(code) => fmt::Display::fmt(code, f),
        }
    }
}
