//! Directed links between content blocks.
//!
//! Links are derived, never written by hand: saving a block resolves the
//! `[[code]]` tags in its content and records one link per distinct target.

use serde::{Deserialize, Serialize};

use crate::model::NuttyId;

/// A link from the block holding a tag to the block the tag names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentLink {
    id: NuttyId,
    pub source_id: NuttyId,
    pub target_id: NuttyId,
}

impl ContentLink {
    pub fn new(id: NuttyId, source_id: NuttyId, target_id: NuttyId) -> Self {
        Self {
            id,
            source_id,
            target_id,
        }
    }

    /// Creates a link with a freshly generated ID.
    pub fn now(source_id: NuttyId, target_id: NuttyId) -> Self {
        Self::new(NuttyId::now(), source_id, target_id)
    }

    pub fn id(&self) -> &NuttyId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_json() {
        let (source, target) = (NuttyId::now(), NuttyId::now());
        let link = ContentLink::now(source, target);
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["source_id"], source.to_wire_string());
        assert_eq!(value["target_id"], target.to_wire_string());
        assert_eq!(serde_json::from_value::<ContentLink>(value).unwrap(), link);
    }
}
