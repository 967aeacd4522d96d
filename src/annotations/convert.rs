//! Kind-specific converters
//!
//! Each converter turns one raw doc-meta record into a `DocAnnotation`.
//! The `*_value` functions take the raw JSON delivered by change listeners
//! and share the `Converter` signature so the reducer can dispatch on kind.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::metadata::{
    first_rect, AnnotationRef, AreaHighlight, Author, Comment, DocMeta, Flashcard, PageInfo, Rect,
    TextHighlight,
};

use super::types::{AnnotationKind, AnnotationPayload, DocAnnotation, Position};

/// Converter from a raw listener value to a normalized record
pub type Converter = fn(&DocMeta, Value, &PageInfo) -> Result<DocAnnotation, ConversionError>;

/// Errors converting a raw record
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The raw value does not have the shape of its kind
    #[error("Malformed {kind} value: {source}")]
    Malformed {
        kind: AnnotationKind,
        #[source]
        source: serde_json::Error,
    },

    /// Page numbers are 1-indexed
    #[error("Invalid page number {page} for {kind} {id}")]
    InvalidPage {
        kind: AnnotationKind,
        id: String,
        page: u32,
    },

    /// Highlight has no rects to position it with
    #[error("{kind} {id} has no rects")]
    MissingGeometry { kind: AnnotationKind, id: String },

    /// Highlight position is NaN or infinite
    #[error("{kind} {id} has non-finite coordinates")]
    InvalidGeometry { kind: AnnotationKind, id: String },
}

fn decode<T: DeserializeOwned>(kind: AnnotationKind, value: Value) -> Result<T, ConversionError> {
    serde_json::from_value(value).map_err(|source| ConversionError::Malformed { kind, source })
}

fn check_page(kind: AnnotationKind, id: &str, page: &PageInfo) -> Result<(), ConversionError> {
    if page.num == 0 {
        return Err(ConversionError::InvalidPage {
            kind,
            id: id.to_string(),
            page: page.num,
        });
    }
    Ok(())
}

fn highlight_position(
    kind: AnnotationKind,
    id: &str,
    rects: &std::collections::BTreeMap<String, Rect>,
) -> Result<Position, ConversionError> {
    let rect = first_rect(rects).ok_or_else(|| ConversionError::MissingGeometry {
        kind,
        id: id.to_string(),
    })?;

    let position = Position::new(rect.left, rect.top);
    if !position.is_finite() {
        return Err(ConversionError::InvalidGeometry {
            kind,
            id: id.to_string(),
        });
    }

    Ok(position)
}

/// Resolve a child's parent reference and sort position
///
/// An absent or unparsable reference is not an error: the record is
/// returned without a parent and the reducer hides it.
fn child_parent(
    doc_meta: &DocMeta,
    kind: AnnotationKind,
    id: &str,
    reference: Option<&str>,
    page: &PageInfo,
) -> (Option<AnnotationRef>, Position) {
    let parent_ref = match reference.map(str::parse::<AnnotationRef>) {
        Some(Ok(parent_ref)) => Some(parent_ref),
        Some(Err(e)) => {
            tracing::debug!("{} {} has an unusable ref: {}", kind, id, e);
            None
        }
        None => None,
    };

    let position = parent_ref
        .as_ref()
        .and_then(|parent_ref| doc_meta.primary_position(parent_ref, page.num))
        .unwrap_or_default();

    (parent_ref, position)
}

/// Convert a text highlight record
pub fn text_highlight(
    _doc_meta: &DocMeta,
    highlight: &TextHighlight,
    page: &PageInfo,
) -> Result<DocAnnotation, ConversionError> {
    let kind = AnnotationKind::TextHighlight;
    check_page(kind, &highlight.id, page)?;
    let position = highlight_position(kind, &highlight.id, &highlight.rects)?;

    let text = highlight.text.as_ref();
    let payload = AnnotationPayload {
        text: text.and_then(|t| t.text.clone()),
        html: text.and_then(|t| t.html.clone()),
        color: highlight.color.clone(),
        fields: Vec::new(),
        author: highlight.author.clone(),
        created: Some(highlight.created),
        last_updated: highlight.last_updated,
    };

    Ok(DocAnnotation::new(highlight.id.clone(), kind, page.num, position).with_payload(payload))
}

/// Convert an area highlight record
pub fn area_highlight(
    _doc_meta: &DocMeta,
    highlight: &AreaHighlight,
    page: &PageInfo,
) -> Result<DocAnnotation, ConversionError> {
    let kind = AnnotationKind::AreaHighlight;
    check_page(kind, &highlight.id, page)?;
    let position = highlight_position(kind, &highlight.id, &highlight.rects)?;

    let payload = AnnotationPayload {
        color: highlight.color.clone(),
        author: highlight.author.clone(),
        created: Some(highlight.created),
        last_updated: highlight.last_updated,
        ..Default::default()
    };

    Ok(DocAnnotation::new(highlight.id.clone(), kind, page.num, position).with_payload(payload))
}

/// Convert a comment record
pub fn comment(
    doc_meta: &DocMeta,
    comment: &Comment,
    page: &PageInfo,
) -> Result<DocAnnotation, ConversionError> {
    let kind = AnnotationKind::Comment;
    check_page(kind, &comment.id, page)?;
    let (parent_ref, position) =
        child_parent(doc_meta, kind, &comment.id, comment.reference.as_deref(), page);

    let payload = AnnotationPayload {
        text: comment.content.text.clone(),
        html: comment.content.html.clone(),
        author: comment.author.clone(),
        created: Some(comment.created),
        last_updated: comment.last_updated,
        ..Default::default()
    };

    let mut record = DocAnnotation::new(comment.id.clone(), kind, page.num, position).with_payload(payload);
    record.parent_ref = parent_ref;
    Ok(record)
}

/// Convert a flashcard record
pub fn flashcard(
    doc_meta: &DocMeta,
    flashcard: &Flashcard,
    page: &PageInfo,
) -> Result<DocAnnotation, ConversionError> {
    let kind = AnnotationKind::Flashcard;
    check_page(kind, &flashcard.id, page)?;
    let (parent_ref, position) =
        child_parent(doc_meta, kind, &flashcard.id, flashcard.reference.as_deref(), page);

    // front for front/back cards, text for cloze cards
    let text = flashcard
        .fields
        .get("front")
        .or_else(|| flashcard.fields.get("text"))
        .cloned();

    let payload = AnnotationPayload {
        text,
        fields: flashcard
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        author: flashcard.author.clone(),
        created: Some(flashcard.created),
        last_updated: flashcard.last_updated,
        ..Default::default()
    };

    let mut record = DocAnnotation::new(flashcard.id.clone(), kind, page.num, position).with_payload(payload);
    record.parent_ref = parent_ref;
    Ok(record)
}

pub fn text_highlight_value(
    doc_meta: &DocMeta,
    value: Value,
    page: &PageInfo,
) -> Result<DocAnnotation, ConversionError> {
    let highlight: TextHighlight = decode(AnnotationKind::TextHighlight, value)?;
    text_highlight(doc_meta, &highlight, page)
}

pub fn area_highlight_value(
    doc_meta: &DocMeta,
    value: Value,
    page: &PageInfo,
) -> Result<DocAnnotation, ConversionError> {
    let highlight: AreaHighlight = decode(AnnotationKind::AreaHighlight, value)?;
    area_highlight(doc_meta, &highlight, page)
}

pub fn comment_value(
    doc_meta: &DocMeta,
    value: Value,
    page: &PageInfo,
) -> Result<DocAnnotation, ConversionError> {
    let record: Comment = decode(AnnotationKind::Comment, value)?;
    comment(doc_meta, &record, page)
}

pub fn flashcard_value(
    doc_meta: &DocMeta,
    value: Value,
    page: &PageInfo,
) -> Result<DocAnnotation, ConversionError> {
    let record: Flashcard = decode(AnnotationKind::Flashcard, value)?;
    flashcard(doc_meta, &record, page)
}

/// Convert every displayable record stored in a doc meta
///
/// Records that fail conversion or have no parent are skipped with a
/// warning, the same way live events are treated.
pub fn doc_meta_annotations(doc_meta: &DocMeta) -> Vec<DocAnnotation> {
    let mut records = Vec::new();

    for page_meta in doc_meta.page_metas.values() {
        let page = &page_meta.page_info;

        let converted = page_meta
            .text_highlights
            .values()
            .map(|h| text_highlight(doc_meta, h, page))
            .chain(page_meta.area_highlights.values().map(|h| area_highlight(doc_meta, h, page)))
            .chain(page_meta.comments.values().map(|c| comment(doc_meta, c, page)))
            .chain(page_meta.flashcards.values().map(|f| flashcard(doc_meta, f, page)));

        for result in converted {
            match result {
                Ok(record) if record.is_displayable() => records.push(record),
                Ok(record) => {
                    tracing::warn!("Annotation hidden from sidebar: {} {}", record.kind, record.id);
                }
                Err(e) => {
                    tracing::warn!("Skipping annotation on page {}: {}", page.num, e);
                }
            }
        }
    }

    records
}

/// Stamp an author on records that have none
pub fn apply_author(records: &mut [DocAnnotation], author: &Author) {
    for record in records.iter_mut().filter(|r| r.payload.author.is_none()) {
        record.payload.author = Some(author.clone());
    }
}
