//! Error types for identifier encoding, order-key arithmetic and the sibling tree.

use thiserror::Error;

/// The four classes every failure in this crate falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// N001: Malformed base-58 text, negative input or a bad wire layout
    Codec,
    /// N002: Short code disagrees with the one recomputed from the UUID
    Checksum,
    /// N003: Fractional index character outside `!`..=`~`
    InvalidCharacter,
    /// N004: Requested a key strictly between two equal keys
    DegenerateInterval,
}

impl ErrorKind {
    /// Returns the error code string (e.g., "N001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Codec => "N001",
            ErrorKind::Checksum => "N002",
            ErrorKind::InvalidCharacter => "N003",
            ErrorKind::DegenerateInterval => "N004",
        }
    }
}

/// Error converting between integers and base-58 text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("[N001] cannot decode empty base-58 text")]
    Empty,

    #[error("[N001] invalid base-58 character {char:?} at position {position}")]
    InvalidCharacter { char: char, position: usize },

    #[error("[N001] cannot encode negative value {value}")]
    NegativeValue { value: i128 },

    #[error("[N001] base-58 text {text:?} does not fit in 128 bits")]
    Overflow { text: String },
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Codec
    }
}

/// Error parsing a Nutty ID or a short code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NuttyIdError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("[N001] wire identifier {input:?} must contain exactly one ':' separator")]
    MalformedWire { input: String },

    #[error("[N001] wire identifier UUID segment has length {len}, expected {expected}")]
    UuidSegmentLength { len: usize, expected: usize },

    #[error("[N001] invalid short code {input:?}: {reason}")]
    InvalidShortCode { input: String, reason: &'static str },

    #[error("[N002] short code mismatch: transmitted {found:?}, recomputed {expected:?}")]
    ChecksumMismatch { expected: String, found: String },
}

impl NuttyIdError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NuttyIdError::ChecksumMismatch { .. } => ErrorKind::Checksum,
            _ => ErrorKind::Codec,
        }
    }
}

/// Error constructing or deriving a fractional index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FractionalIndexError {
    #[error("[N003] fractional index cannot be empty")]
    Empty,

    #[error("[N003] invalid character {char:?} at position {position} in fractional index")]
    InvalidCharacter { char: char, position: usize },

    #[error("[N004] cannot generate an index between identical indices {index:?}")]
    IdenticalIndices { index: String },
}

impl FractionalIndexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FractionalIndexError::IdenticalIndices { .. } => ErrorKind::DegenerateInterval,
            _ => ErrorKind::InvalidCharacter,
        }
    }
}

/// Error parsing a `[[code|text]]` tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("invalid tag format: {input:?}")]
    InvalidFormat { input: String },

    #[error("invalid tag {input:?}: {source}")]
    InvalidId {
        input: String,
        #[source]
        source: NuttyIdError,
    },
}

/// Error assembling a content block.
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("content block requires a fractional index")]
    MissingIndex,

    #[error("content block requires content")]
    MissingContent,

    #[error("block content JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error mutating a [`crate::tree::BlockTree`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("block {id} already exists")]
    DuplicateBlock { id: String },

    #[error("block {id} not found")]
    UnknownBlock { id: String },

    #[error("block {id} is not a child of {parent}")]
    NotASibling { id: String, parent: String },

    #[error("blocks {prev} and {next} are not adjacent siblings")]
    NotAdjacent { prev: String, next: String },

    #[error("cannot move block {id} beneath itself or its descendants")]
    Cycle { id: String },

    #[error("block {id} still has {count} children")]
    HasChildren { id: String, count: usize },

    #[error("short code {code} matches no block")]
    Unresolved { code: String },

    #[error("short code {code} matches {count} blocks")]
    Ambiguous { code: String, count: usize },

    #[error(transparent)]
    Index(#[from] FractionalIndexError),
}
