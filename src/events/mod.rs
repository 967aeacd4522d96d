//! Annotation change events and the reducer that applies them
//!
//! ```rust,ignore
//! use doc_annotations::events::{AnnotationEvent, AnnotationEventReducer, WatchSink};
//!
//! let (sink, rx) = WatchSink::new();
//! let mut reducer = AnnotationEventReducer::new(Arc::new(sink));
//!
//! reducer.handle(&doc_meta, &AnnotationEvent::created("h1", kind, 1, value));
//! let sorted = rx.borrow().clone();
//! ```

mod reducer;
mod sink;
mod types;

pub use reducer::{entry, reduce, AnnotationEventReducer, DropReason, KindEntry, Outcome, Reduction};
pub use sink::{RecordingSink, RenderSink, WatchSink};
pub use types::{AnnotationEvent, MutationType};
