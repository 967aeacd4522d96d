//! Sidebar annotation records and the converters that produce them

pub mod convert;
mod types;

pub use convert::{ConversionError, Converter};
pub use types::{AnnotationKind, AnnotationPayload, DocAnnotation, Position};
