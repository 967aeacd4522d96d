//! Document annotation index
//!
//! Deduplicates sidebar records by id and keeps them in a deterministic
//! reading order (page, then y, then x, then id).

mod doc_index;
mod score;

pub use doc_index::DocAnnotationIndex;
pub use score::{compare, compute_score};
