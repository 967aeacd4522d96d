//! Normalized annotation records
//!
//! Every annotation kind shown in the sidebar is converted into a single
//! `DocAnnotation` shape. The index only reads `id`, `page_num` and
//! `position`; everything else rides along for the view layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metadata::{AnnotationRef, Author};

/// Kinds of annotations shown in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationKind {
    /// Highlight over text
    TextHighlight,
    /// Highlight over a page region
    AreaHighlight,
    /// Comment attached to a highlight
    Comment,
    /// Flashcard attached to a highlight
    Flashcard,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 4] = [
        AnnotationKind::TextHighlight,
        AnnotationKind::AreaHighlight,
        AnnotationKind::Comment,
        AnnotationKind::Flashcard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::TextHighlight => "text-highlight",
            AnnotationKind::AreaHighlight => "area-highlight",
            AnnotationKind::Comment => "comment",
            AnnotationKind::Flashcard => "flashcard",
        }
    }

    /// Highlights stand on their own
    pub fn is_primary(&self) -> bool {
        matches!(self, AnnotationKind::TextHighlight | AnnotationKind::AreaHighlight)
    }

    /// Comments and flashcards need a parent highlight to be shown
    pub fn is_child(&self) -> bool {
        !self.is_primary()
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnnotationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnnotationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown annotation kind: {}", s))
    }
}

/// Position on a page, used only for ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Fields carried through from the source record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationPayload {
    /// Highlighted text, comment body or flashcard front
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// HTML form of the text, when the source had one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Highlight color (CSS color value)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Flashcard fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// A normalized annotation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocAnnotation {
    /// Unique identifier within the index
    pub id: String,
    pub kind: AnnotationKind,
    /// Page number (1-indexed)
    pub page_num: u32,
    pub position: Position,
    /// Parent highlight for comments and flashcards
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub parent_ref: Option<AnnotationRef>,
    #[serde(default)]
    pub payload: AnnotationPayload,
}

impl DocAnnotation {
    /// Create a record with an empty payload
    pub fn new(id: impl Into<String>, kind: AnnotationKind, page_num: u32, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            page_num,
            position,
            parent_ref: None,
            payload: AnnotationPayload::default(),
        }
    }

    /// Set the parent reference
    pub fn with_parent(mut self, parent_ref: AnnotationRef) -> Self {
        self.parent_ref = Some(parent_ref);
        self
    }

    /// Set the payload
    pub fn with_payload(mut self, payload: AnnotationPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Whether the sidebar can show this record
    ///
    /// Children without a parent reference predate refs and have nowhere
    /// to attach.
    pub fn is_displayable(&self) -> bool {
        self.kind.is_primary() || self.parent_ref.is_some()
    }
}
