//! Annotation index
//!
//! Maps annotation ids to records and keeps the sidebar ordering alongside.
//! Values are immutable: `rebuild` and `without` return a new index and
//! leave the receiver untouched, so a reader holding an older index (or an
//! older `snapshot()`) keeps a consistent view while updates are published.

use std::collections::HashMap;
use std::sync::Arc;

use crate::annotations::DocAnnotation;

use super::score;

/// Id → record map plus the derived sorted sequence
#[derive(Debug, Clone, PartialEq)]
pub struct DocAnnotationIndex {
    annotations: Arc<HashMap<String, DocAnnotation>>,
    sorted: Arc<[DocAnnotation]>,
}

impl Default for DocAnnotationIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl DocAnnotationIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            annotations: Arc::new(HashMap::new()),
            sorted: Arc::from(Vec::new()),
        }
    }

    /// Build an index from records; later duplicates win
    pub fn from_annotations(records: impl IntoIterator<Item = DocAnnotation>) -> Self {
        Self::new().rebuild(records)
    }

    fn from_map(annotations: HashMap<String, DocAnnotation>) -> Self {
        let mut sorted: Vec<DocAnnotation> = annotations.values().cloned().collect();
        sorted.sort_by(score::compare);

        Self {
            annotations: Arc::new(annotations),
            sorted: Arc::from(sorted),
        }
    }

    /// New index with `records` inserted, overwriting by id
    pub fn rebuild(&self, records: impl IntoIterator<Item = DocAnnotation>) -> Self {
        let mut annotations = (*self.annotations).clone();
        for record in records {
            annotations.insert(record.id.clone(), record);
        }
        Self::from_map(annotations)
    }

    /// New index without the given ids; unknown ids are ignored
    pub fn without<I, S>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut annotations = (*self.annotations).clone();
        let mut removed = false;
        for id in ids {
            removed |= annotations.remove(id.as_ref()).is_some();
        }

        if !removed {
            return self.clone();
        }

        Self::from_map(annotations)
    }

    /// Insert or overwrite records
    pub fn put(&mut self, records: impl IntoIterator<Item = DocAnnotation>) {
        *self = self.rebuild(records);
    }

    /// Remove a record if present
    pub fn delete(&mut self, id: &str) {
        if self.contains(id) {
            *self = self.without([id]);
        }
    }

    /// Records in sidebar order
    pub fn sorted(&self) -> &[DocAnnotation] {
        &self.sorted
    }

    /// Shared handle to the sorted records
    pub fn snapshot(&self) -> Arc<[DocAnnotation]> {
        Arc::clone(&self.sorted)
    }

    pub fn get(&self, id: &str) -> Option<&DocAnnotation> {
        self.annotations.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.annotations.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{AnnotationKind, Position};

    fn at(id: &str, page: u32, x: f64, y: f64) -> DocAnnotation {
        DocAnnotation::new(id, AnnotationKind::TextHighlight, page, Position::new(x, y))
    }

    fn ids(index: &DocAnnotationIndex) -> Vec<&str> {
        index.sorted().iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_same_row_orders_by_x() {
        let mut index = DocAnnotationIndex::new();
        index.put([at("a", 1, 10.0, 5.0)]);
        index.put([at("b", 1, 5.0, 5.0)]);

        assert_eq!(ids(&index), vec!["b", "a"]);
    }

    #[test]
    fn test_orders_by_page_then_row() {
        let index = DocAnnotationIndex::from_annotations([
            at("p2", 2, 0.0, 0.0),
            at("p1-low", 1, 0.0, 300.0),
            at("p1-high", 1, 400.0, 20.0),
        ]);

        assert_eq!(ids(&index), vec!["p1-high", "p1-low", "p2"]);
    }

    #[test]
    fn test_identical_position_orders_by_id() {
        let index = DocAnnotationIndex::from_annotations([
            at("zeta", 4, 1.0, 1.0),
            at("alpha", 4, 1.0, 1.0),
            at("mu", 4, 1.0, 1.0),
        ]);

        assert_eq!(ids(&index), vec!["alpha", "mu", "zeta"]);
    }

    #[test]
    fn test_put_overwrites_by_id() {
        let mut index = DocAnnotationIndex::new();
        index.put([at("a", 1, 0.0, 0.0), at("b", 1, 0.0, 10.0)]);
        index.put([at("a", 5, 0.0, 0.0)]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("a").unwrap().page_num, 5);
        assert_eq!(ids(&index), vec!["b", "a"]);
    }

    #[test]
    fn test_put_is_idempotent() {
        let record = at("a", 1, 3.0, 4.0);

        let mut once = DocAnnotationIndex::new();
        once.put([record.clone()]);

        let mut twice = DocAnnotationIndex::new();
        twice.put([record.clone()]);
        twice.put([record]);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_put_nothing() {
        let mut index = DocAnnotationIndex::from_annotations([at("a", 1, 0.0, 0.0)]);
        let before = index.clone();
        index.put(Vec::new());

        assert_eq!(index, before);
    }

    #[test]
    fn test_delete_existing() {
        let mut index = DocAnnotationIndex::from_annotations([at("a", 1, 0.0, 0.0), at("b", 1, 1.0, 0.0)]);
        index.delete("a");

        assert!(!index.contains("a"));
        assert_eq!(ids(&index), vec!["b"]);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut index = DocAnnotationIndex::from_annotations([at("a", 1, 0.0, 0.0)]);
        let before = index.clone();
        index.delete("x");

        assert_eq!(index, before);
        assert_eq!(index.sorted(), before.sorted());
    }

    #[test]
    fn test_without_many() {
        let index = DocAnnotationIndex::from_annotations([
            at("a", 1, 0.0, 0.0),
            at("b", 1, 1.0, 0.0),
            at("c", 1, 2.0, 0.0),
        ]);
        let smaller = index.without(["a", "c", "missing"]);

        assert_eq!(ids(&smaller), vec!["b"]);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_rebuild_leaves_input_untouched() {
        let index = DocAnnotationIndex::from_annotations([at("a", 1, 0.0, 0.0)]);
        let snapshot = index.snapshot();

        let next = index.rebuild([at("b", 1, 0.0, 0.0), at("a", 9, 0.0, 0.0)]);

        assert_eq!(ids(&index), vec!["a"]);
        assert_eq!(index.get("a").unwrap().page_num, 1);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(ids(&next), vec!["b", "a"]);
    }

    #[test]
    fn test_sorted_is_repeatable() {
        let index = DocAnnotationIndex::from_annotations([at("a", 2, 0.0, 0.0), at("b", 1, 0.0, 0.0)]);
        assert_eq!(index.sorted(), index.sorted());
        assert_eq!(&*index.snapshot(), index.sorted());
    }

    #[test]
    fn test_no_duplicate_ids_after_mixed_operations() {
        let mut index = DocAnnotationIndex::new();
        for round in 0..20u32 {
            let id = format!("id-{}", round % 7);
            if round % 5 == 4 {
                index.delete(&id);
            } else {
                index.put([at(&id, round % 3 + 1, round as f64, 2.0)]);
            }

            let mut seen: Vec<&str> = ids(&index);
            let total = seen.len();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), total);
            assert_eq!(total, index.len());
        }
    }
}
