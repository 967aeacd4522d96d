//! Sidebar ordering
//!
//! Annotations are listed in reading order: by page, then top to bottom,
//! then left to right. The three keys are folded into one score.
//!
//! The fold assumes coordinates stay below 1000. A larger `x` or `y` can
//! push an annotation past ones on the following row or page. The formula
//! is kept as-is so existing sidebars order the same way.

use std::cmp::Ordering;

use crate::annotations::DocAnnotation;

const PAGE_WEIGHT: f64 = 100_000.0;
const ROW_WEIGHT: f64 = 100.0;

/// Linearize (page, y, x) into a single sort key
pub fn compute_score(annotation: &DocAnnotation) -> f64 {
    (annotation.page_num as f64 * PAGE_WEIGHT)
        + (annotation.position.y * ROW_WEIGHT)
        + annotation.position.x
}

/// Total order used by the sidebar: score, then id
pub fn compare(a: &DocAnnotation, b: &DocAnnotation) -> Ordering {
    compute_score(a)
        .total_cmp(&compute_score(b))
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{AnnotationKind, Position};

    fn at(id: &str, page: u32, x: f64, y: f64) -> DocAnnotation {
        DocAnnotation::new(id, AnnotationKind::TextHighlight, page, Position::new(x, y))
    }

    #[test]
    fn test_score_formula() {
        assert_eq!(compute_score(&at("a", 1, 10.0, 5.0)), 100_510.0);
        assert_eq!(compute_score(&at("b", 1, 5.0, 5.0)), 100_505.0);
        assert_eq!(compute_score(&at("c", 3, 0.0, 0.0)), 300_000.0);
    }

    #[test]
    fn test_page_before_position() {
        assert_eq!(compare(&at("a", 1, 900.0, 900.0), &at("b", 2, 0.0, 0.0)), Ordering::Less);
    }

    #[test]
    fn test_row_before_column() {
        assert_eq!(compare(&at("a", 1, 50.0, 4.0), &at("b", 1, 0.0, 5.0)), Ordering::Less);
    }

    #[test]
    fn test_tie_breaks_on_id() {
        assert_eq!(compare(&at("a", 1, 1.0, 1.0), &at("b", 1, 1.0, 1.0)), Ordering::Less);
        assert_eq!(compare(&at("b", 1, 1.0, 1.0), &at("a", 1, 1.0, 1.0)), Ordering::Greater);
        assert_eq!(compare(&at("a", 1, 1.0, 1.0), &at("a", 1, 1.0, 1.0)), Ordering::Equal);
    }

    #[test]
    fn test_large_coordinates_bleed_across_pages() {
        // out-of-range y outranks the next page; kept for compatibility
        assert_eq!(compare(&at("a", 1, 0.0, 1500.0), &at("b", 2, 0.0, 0.0)), Ordering::Greater);
    }
}
