//! Nutty: identifiers and order-keys for a hierarchical content-block store.
//!
//! This crate provides the two primitives every content block carries:
//!
//! - **Nutty IDs**: UUIDv7 identifiers with a seven-character base-58 short
//!   code derived from the low 41 bits. The wire form
//!   `<base58(uuid)>:<short code>` is self-checking.
//! - **Fractional indices**: base-94 order-keys that always admit a new key
//!   strictly between any two distinct keys, so reordering a block never
//!   touches its siblings.
//!
//! # Quick Start
//!
//! ```rust
//! use nutty::{FractionalIndex, NuttyId};
//!
//! // Identifiers
//! let id = NuttyId::now();
//! let wire = id.to_wire_string();
//! let decoded = NuttyId::from_wire_string(&wire).unwrap();
//! assert_eq!(id, decoded);
//! assert_eq!(id.short_code().as_str().len(), 7);
//!
//! // Order-keys
//! let first = FractionalIndex::between(&FractionalIndex::start(), &FractionalIndex::end()).unwrap();
//! let second = first.after().unwrap();
//! let middle = FractionalIndex::between(&first, &second).unwrap();
//! assert!(first < middle && middle < second);
//! ```
//!
//! # Modules
//!
//! - [`codec`]: Base-58 integer codec
//! - [`model`]: Identifiers, order-keys, tags and content blocks
//! - [`tree`]: In-memory sibling tree with tag links
//! - [`validate`]: Boundary validation of external string forms
//! - [`error`]: Error types
//! - [`limits`]: Format constants
//!
//! # Wire Format
//!
//! - Identifier: `^[1-9A-HJ-NP-Za-km-z]{22}:[1-9A-HJ-NP-Za-km-z]{7}$`
//! - Short code: 7 base-58 characters, at most `zmM9z4E`
//! - Fractional index: one or more characters in `!`..=`~`

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod tree;
pub mod validate;

// Re-export commonly used types at crate root
pub use error::{
    BlockError, CodecError, ErrorKind, FractionalIndexError, NuttyIdError, TagError, TreeError,
};
pub use model::{
    AnyNuttyId, BlockContent, ContentBlock, ContentBlockBuilder, ContentLink, FractionalIndex,
    NuttyId, NuttyTag, ShortCode, is_valid_short_code,
};
pub use tree::{BlockContext, BlockTree};
pub use validate::{validate_index, validate_short_code, validate_siblings, validate_wire_id};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
