//! Document metadata types
//!
//! These mirror the records stored in the doc-meta object of the sync
//! backend. Field names are camelCase on the wire. Change listeners deliver
//! the raw JSON form of these records; the converters deserialize them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::annotations::Position;

use super::refs::AnnotationRef;

/// The metadata record of one document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocMeta {
    pub doc_info: DocInfo,
    /// Per-page annotation records keyed by page number (1-indexed)
    #[serde(default)]
    pub page_metas: BTreeMap<u32, PageMeta>,
}

/// Document identity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocInfo {
    /// Stable content fingerprint, shared by every copy of the document
    pub fingerprint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Page context delivered alongside every annotation event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Page number (1-indexed)
    pub num: u32,
}

/// All annotation records of a single page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page_info: PageInfo,
    #[serde(default)]
    pub text_highlights: BTreeMap<String, TextHighlight>,
    #[serde(default)]
    pub area_highlights: BTreeMap<String, AreaHighlight>,
    #[serde(default)]
    pub comments: BTreeMap<String, Comment>,
    #[serde(default)]
    pub flashcards: BTreeMap<String, Flashcard>,
}

/// Rectangle in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Text content with optional HTML rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(rename = "TEXT", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "HTML", skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl Text {
    /// Plain text if present, otherwise the HTML source
    pub fn value(&self) -> Option<&str> {
        self.text.as_deref().or(self.html.as_deref())
    }
}

/// Who created an annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub guest: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
}

/// The signed-in user's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
}

impl UserProfile {
    /// Author record for annotations created by this user
    pub fn to_author(&self) -> Author {
        Author {
            name: self.name.clone(),
            guest: false,
            profile_id: Some(self.id.clone()),
        }
    }
}

/// Highlight over a run of text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextHighlight {
    pub id: String,
    pub created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// One rect per line, keyed by ordinal ("0", "1", ...)
    #[serde(default)]
    pub rects: BTreeMap<String, Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Text>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

/// Highlight over a rectangular region (figures, scanned pages)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaHighlight {
    pub id: String,
    pub created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rects: BTreeMap<String, Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

/// Comment attached to a highlight
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    pub content: Text,
    /// Parent reference (`text-highlight:<id>`); missing on old comments
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

/// Flashcard attached to a highlight
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Card fields, e.g. `front`/`back` or `text` for cloze cards
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

/// First rect in line order
///
/// Rect keys are ordinals stored as strings, so "10" must sort after "2".
pub fn first_rect(rects: &BTreeMap<String, Rect>) -> Option<&Rect> {
    rects
        .iter()
        .min_by_key(|&(key, _)| (key.parse::<u32>().unwrap_or(u32::MAX), key.as_str()))
        .map(|(_, rect)| rect)
}

impl DocMeta {
    /// Create an empty doc meta for a fingerprint
    pub fn new(fingerprint: &str) -> Self {
        Self {
            doc_info: DocInfo {
                fingerprint: fingerprint.to_string(),
                title: None,
            },
            page_metas: BTreeMap::new(),
        }
    }

    pub fn fingerprint(&self) -> &str {
        &self.doc_info.fingerprint
    }

    /// Get the page meta for a page number
    pub fn page(&self, num: u32) -> Option<&PageMeta> {
        self.page_metas.get(&num)
    }

    /// Get or create the page meta for a page number
    pub fn page_mut(&mut self, num: u32) -> &mut PageMeta {
        self.page_metas
            .entry(num)
            .or_insert_with(|| PageMeta::new(num))
    }

    /// Locate the primary highlight a reference points at
    ///
    /// The hinted page is searched first since children live on their
    /// parent's page; the rest of the document is scanned after that.
    pub fn primary_position(&self, reference: &AnnotationRef, page_hint: u32) -> Option<Position> {
        if let Some(position) = self
            .page(page_hint)
            .and_then(|page| page.primary_position(reference))
        {
            return Some(position);
        }

        self.page_metas
            .values()
            .filter(|page| page.page_info.num != page_hint)
            .find_map(|page| page.primary_position(reference))
    }
}

impl PageMeta {
    pub fn new(num: u32) -> Self {
        Self {
            page_info: PageInfo { num },
            text_highlights: BTreeMap::new(),
            area_highlights: BTreeMap::new(),
            comments: BTreeMap::new(),
            flashcards: BTreeMap::new(),
        }
    }

    fn primary_position(&self, reference: &AnnotationRef) -> Option<Position> {
        use crate::annotations::AnnotationKind;

        let rects = match reference.kind {
            AnnotationKind::TextHighlight => &self.text_highlights.get(&reference.id)?.rects,
            AnnotationKind::AreaHighlight => &self.area_highlights.get(&reference.id)?.rects,
            AnnotationKind::Comment | AnnotationKind::Flashcard => return None,
        };

        first_rect(rects).map(|rect| Position::new(rect.left, rect.top))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(left: f64, top: f64) -> Rect {
        Rect {
            left,
            top,
            width: 10.0,
            height: 2.0,
        }
    }

    #[test]
    fn test_first_rect_orders_numerically() {
        let mut rects = BTreeMap::new();
        rects.insert("10".to_string(), rect(1.0, 1.0));
        rects.insert("2".to_string(), rect(2.0, 2.0));

        let first = first_rect(&rects).unwrap();
        assert_eq!(first.left, 2.0);
    }

    #[test]
    fn test_first_rect_empty() {
        assert!(first_rect(&BTreeMap::new()).is_none());
    }

    #[test]
    fn test_deserialize_text_highlight() {
        let json = serde_json::json!({
            "id": "th-1",
            "created": "2019-03-01T12:00:00Z",
            "rects": { "0": { "left": 12.5, "top": 40.0, "width": 100.0, "height": 12.0 } },
            "text": { "TEXT": "hello world" },
            "color": "yellow"
        });

        let highlight: TextHighlight = serde_json::from_value(json).unwrap();
        assert_eq!(highlight.id, "th-1");
        assert_eq!(highlight.text.unwrap().value(), Some("hello world"));
        assert_eq!(highlight.rects.len(), 1);
    }

    #[test]
    fn test_comment_ref_field() {
        let json = serde_json::json!({
            "id": "c-1",
            "created": "2019-03-01T12:00:00Z",
            "content": { "HTML": "<p>note</p>" },
            "ref": "text-highlight:th-1"
        });

        let comment: Comment = serde_json::from_value(json).unwrap();
        assert_eq!(comment.reference.as_deref(), Some("text-highlight:th-1"));
        assert_eq!(comment.content.value(), Some("<p>note</p>"));
    }

    #[test]
    fn test_primary_position_searches_other_pages() {
        let mut doc_meta = DocMeta::new("fp");
        let highlight = TextHighlight {
            id: "th-1".to_string(),
            created: Utc::now(),
            last_updated: None,
            rects: BTreeMap::from([("0".to_string(), rect(7.0, 9.0))]),
            text: None,
            color: None,
            author: None,
        };
        doc_meta
            .page_mut(3)
            .text_highlights
            .insert(highlight.id.clone(), highlight);

        let reference: AnnotationRef = "text-highlight:th-1".parse().unwrap();
        assert_eq!(doc_meta.primary_position(&reference, 3), Some(Position::new(7.0, 9.0)));
        assert_eq!(doc_meta.primary_position(&reference, 1), Some(Position::new(7.0, 9.0)));

        let missing: AnnotationRef = "area-highlight:th-1".parse().unwrap();
        assert_eq!(doc_meta.primary_position(&missing, 3), None);
    }
}
