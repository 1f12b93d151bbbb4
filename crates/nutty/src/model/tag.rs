//! Wikilink-style references to content blocks.
//!
//! A tag is written `[[abcdefg]]` or `[[abcdefg|Display Text]]`, where
//! `abcdefg` is a short code and the optional display text replaces it when
//! rendered.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::TagError;
use crate::model::ShortCode;

lazy_static! {
    /// Matches `[[…]]` where `…` contains no `]`.
    static ref TAG_PATTERN: Regex = Regex::new(r"\[\[([^\]]+)\]\]").expect("tag pattern is valid");
}

/// A parsed `[[code]]` or `[[code|text]]` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuttyTag {
    short_code: ShortCode,
    display_text: Option<String>,
}

impl NuttyTag {
    pub fn new(short_code: ShortCode, display_text: Option<String>) -> Self {
        Self {
            short_code,
            display_text,
        }
    }

    /// Parses a single tag. Whitespace around the code and the text is trimmed.
    pub fn parse(value: &str) -> Result<Self, TagError> {
        let invalid = || TagError::InvalidFormat {
            input: value.to_string(),
        };

        let content = value
            .strip_prefix("[[")
            .and_then(|rest| rest.strip_suffix("]]"))
            .ok_or_else(invalid)?;

        let mut parts = content.split('|');
        let code = parts.next().unwrap_or_default().trim();
        let display_text = parts.next().map(|text| text.trim().to_string());
        if parts.next().is_some() {
            return Err(invalid());
        }

        let short_code = ShortCode::parse(code).map_err(|source| TagError::InvalidId {
            input: value.to_string(),
            source,
        })?;

        Ok(Self {
            short_code,
            display_text,
        })
    }

    /// Extracts every valid tag from `text`, in order. Invalid tags are skipped.
    pub fn parse_all(text: &str) -> Vec<Self> {
        TAG_PATTERN
            .find_iter(text)
            .filter_map(|m| Self::parse(m.as_str()).ok())
            .collect()
    }

    pub fn short_code(&self) -> ShortCode {
        self.short_code
    }

    pub fn display_text(&self) -> Option<&str> {
        self.display_text.as_deref()
    }
}

impl fmt::Display for NuttyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_text {
            Some(text) => write!(f, "[[{}|{}]]", self.short_code, text),
            None => write!(f, "[[{}]]", self.short_code),
        }
    }
}

impl TryFrom<&str> for NuttyTag {
    type Error = TagError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
