//! Annotation event reducer
//!
//! Turns listener events into index updates. The rules per kind live in a
//! dispatch table:
//!
//! - highlights drop create/update events that carry no value;
//! - comments and flashcards fall back to the previous value (their
//!   listeners report some deletions as an update with a null value) and
//!   are hidden when they carry no parent reference;
//! - deletes remove the id for every kind without converting anything.
//!
//! `reduce` is pure. `AnnotationEventReducer` owns the current index and
//! publishes the sorted records after every applied change.

use std::sync::Arc;

use serde_json::Value;

use crate::annotations::convert;
use crate::annotations::{AnnotationKind, ConversionError, Converter, DocAnnotation};
use crate::index::DocAnnotationIndex;
use crate::metadata::DocMeta;

use super::sink::RenderSink;
use super::types::{AnnotationEvent, MutationType};

/// Per-kind handling rules
#[derive(Clone, Copy)]
pub struct KindEntry {
    pub kind: AnnotationKind,
    pub converter: Converter,
    /// Child kinds fall back to the previous value and need a parent ref
    pub is_child: bool,
}

static DISPATCH: [KindEntry; 4] = [
    KindEntry {
        kind: AnnotationKind::TextHighlight,
        converter: convert::text_highlight_value,
        is_child: false,
    },
    KindEntry {
        kind: AnnotationKind::AreaHighlight,
        converter: convert::area_highlight_value,
        is_child: false,
    },
    KindEntry {
        kind: AnnotationKind::Comment,
        converter: convert::comment_value,
        is_child: true,
    },
    KindEntry {
        kind: AnnotationKind::Flashcard,
        converter: convert::flashcard_value,
        is_child: true,
    },
];

/// Look up the handling rules for a kind
pub fn entry(kind: AnnotationKind) -> &'static KindEntry {
    match kind {
        AnnotationKind::TextHighlight => &DISPATCH[0],
        AnnotationKind::AreaHighlight => &DISPATCH[1],
        AnnotationKind::Comment => &DISPATCH[2],
        AnnotationKind::Flashcard => &DISPATCH[3],
    }
}

/// Why an event left the index untouched
#[derive(Debug)]
pub enum DropReason {
    /// Create/update without a usable value
    MissingValue,
    /// Child record without a parent reference
    Orphaned { id: String },
    /// Raw value failed conversion
    Malformed(ConversionError),
}

/// What an event did
#[derive(Debug)]
pub enum Outcome {
    Upserted { id: String },
    Deleted { id: String, existed: bool },
    Dropped(DropReason),
}

impl Outcome {
    /// Whether the index was (re)written and a render is due
    pub fn is_applied(&self) -> bool {
        !matches!(self, Outcome::Dropped(_))
    }
}

/// Result of reducing one event
#[derive(Debug)]
pub struct Reduction {
    pub index: DocAnnotationIndex,
    pub outcome: Outcome,
}

impl Reduction {
    fn dropped(index: &DocAnnotationIndex, reason: DropReason) -> Self {
        Self {
            index: index.clone(),
            outcome: Outcome::Dropped(reason),
        }
    }
}

/// Apply one event to an index, producing the next index
///
/// Never fails: conversion problems are logged and reported as
/// `Outcome::Dropped` with the input index returned unchanged.
pub fn reduce(index: &DocAnnotationIndex, doc_meta: &DocMeta, event: &AnnotationEvent) -> Reduction {
    if event.mutation == MutationType::Delete {
        let existed = index.contains(&event.id);
        return Reduction {
            index: index.without([event.id.as_str()]),
            outcome: Outcome::Deleted {
                id: event.id.clone(),
                existed,
            },
        };
    }

    let rules = entry(event.kind);

    let value: Option<&Value> = if rules.is_child {
        event.present_value().or_else(|| event.present_previous_value())
    } else {
        event.present_value()
    };

    let Some(value) = value else {
        tracing::debug!("Dropping {} {} event for {} with no value", event.kind, mutation_name(event.mutation), event.id);
        return Reduction::dropped(index, DropReason::MissingValue);
    };

    let record = match (rules.converter)(doc_meta, value.clone(), &event.page) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Failed to convert {} {}: {}", event.kind, event.id, e);
            return Reduction::dropped(index, DropReason::Malformed(e));
        }
    };

    if rules.is_child && record.parent_ref.is_none() {
        // older children were written before refs existed
        tracing::warn!("Annotation hidden from sidebar: {} {}", record.kind, record.id);
        return Reduction::dropped(index, DropReason::Orphaned { id: record.id });
    }

    let id = record.id.clone();
    Reduction {
        index: index.rebuild([record]),
        outcome: Outcome::Upserted { id },
    }
}

fn mutation_name(mutation: MutationType) -> &'static str {
    match mutation {
        MutationType::Create => "create",
        MutationType::Update => "update",
        MutationType::Delete => "delete",
    }
}

/// Owns the sidebar index for one open document
pub struct AnnotationEventReducer {
    index: DocAnnotationIndex,
    sink: Arc<dyn RenderSink>,
}

impl AnnotationEventReducer {
    /// Create a reducer with an empty index
    pub fn new(sink: Arc<dyn RenderSink>) -> Self {
        Self {
            index: DocAnnotationIndex::new(),
            sink,
        }
    }

    /// Current index
    pub fn index(&self) -> &DocAnnotationIndex {
        &self.index
    }

    /// Insert records outside the event stream (initial load) and publish
    pub fn load(&mut self, records: impl IntoIterator<Item = DocAnnotation>) {
        self.index = self.index.rebuild(records);
        self.publish();
    }

    /// Handle one listener event
    pub fn handle(&mut self, doc_meta: &DocMeta, event: &AnnotationEvent) -> Outcome {
        let Reduction { index, outcome } = reduce(&self.index, doc_meta, event);
        self.index = index;

        if outcome.is_applied() {
            self.publish();
        }

        outcome
    }

    fn publish(&self) {
        let snapshot = self.index.snapshot();
        tracing::debug!("Publishing {} sidebar annotations", snapshot.len());
        self.sink.render(snapshot);
    }
}
