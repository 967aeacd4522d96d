//! Document metadata model
//!
//! Typed shapes of the per-page annotation records held by the remote
//! doc-meta object, plus the `kind:id` references children use to point
//! at their highlight.

mod refs;
mod types;

pub use refs::{AnnotationRef, RefParseError};
pub use types::{
    first_rect, AreaHighlight, Author, Comment, DocInfo, DocMeta, Flashcard, PageInfo, PageMeta,
    Rect, Text, TextHighlight, UserProfile,
};
