//! Parent references
//!
//! Comments and flashcards point at their highlight with a `kind:id`
//! string, e.g. `text-highlight:12pZ9mTPjY`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotations::AnnotationKind;

/// Errors parsing a `kind:id` reference
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefParseError {
    #[error("Reference has no ':' separator: {0}")]
    MissingSeparator(String),

    #[error("Unknown reference kind: {0}")]
    UnknownKind(String),

    #[error("Reference target must be a highlight, got {0}")]
    NotPrimary(AnnotationKind),

    #[error("Reference has an empty id")]
    EmptyId,
}

/// Reference from a child annotation to its parent highlight
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnnotationRef {
    pub kind: AnnotationKind,
    pub id: String,
}

impl AnnotationRef {
    pub fn new(kind: AnnotationKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for AnnotationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

impl FromStr for AnnotationRef {
    type Err = RefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| RefParseError::MissingSeparator(s.to_string()))?;

        let kind: AnnotationKind = kind
            .parse()
            .map_err(|_| RefParseError::UnknownKind(kind.to_string()))?;

        if !kind.is_primary() {
            return Err(RefParseError::NotPrimary(kind));
        }

        if id.is_empty() {
            return Err(RefParseError::EmptyId);
        }

        Ok(Self::new(kind, id))
    }
}

impl TryFrom<String> for AnnotationRef {
    type Error = RefParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AnnotationRef> for String {
    fn from(value: AnnotationRef) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_highlight_ref() {
        let r: AnnotationRef = "text-highlight:abc123".parse().unwrap();
        assert_eq!(r.kind, AnnotationKind::TextHighlight);
        assert_eq!(r.id, "abc123");
        assert_eq!(r.to_string(), "text-highlight:abc123");
    }

    #[test]
    fn test_parse_area_highlight_ref() {
        let r: AnnotationRef = "area-highlight:z".parse().unwrap();
        assert_eq!(r.kind, AnnotationKind::AreaHighlight);
    }

    #[test]
    fn test_reject_bad_refs() {
        assert_eq!(
            "abc123".parse::<AnnotationRef>(),
            Err(RefParseError::MissingSeparator("abc123".to_string()))
        );
        assert_eq!(
            "page:4".parse::<AnnotationRef>(),
            Err(RefParseError::UnknownKind("page".to_string()))
        );
        assert_eq!(
            "comment:4".parse::<AnnotationRef>(),
            Err(RefParseError::NotPrimary(AnnotationKind::Comment))
        );
        assert_eq!(
            "text-highlight:".parse::<AnnotationRef>(),
            Err(RefParseError::EmptyId)
        );
    }

    #[test]
    fn test_serde_as_string() {
        let r = AnnotationRef::new(AnnotationKind::TextHighlight, "h1");
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, "\"text-highlight:h1\"");
    }
}
