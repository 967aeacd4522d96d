//! Document Annotations
//!
//! Core of the annotation sidebar: collects text highlights, area
//! highlights, comments and flashcards from doc-meta change listeners,
//! deduplicates them by id and keeps them in reading order.
//!
//! # Modules
//!
//! - `metadata`: Raw doc-meta records as stored by the sync backend
//! - `annotations`: Normalized sidebar records and per-kind converters
//! - `index`: Immutable id → record index with deterministic ordering
//! - `events`: Change events, the reducer and render sinks
//! - `sidebar`: Async session wiring listeners to the reducer
//!
//! # Usage
//!
//! ```ignore
//! let config = doc_annotations::Config::load();
//! doc_annotations::telemetry::init(&config);
//!
//! let session = SidebarSession::open(&config, backend, listeners, sink, fingerprint).await?;
//! // ...
//! session.close().await?;
//! ```

pub mod annotations;
pub mod config;
pub mod events;
pub mod index;
pub mod metadata;
pub mod sidebar;
pub mod telemetry;

pub use annotations::{AnnotationKind, DocAnnotation, Position};
pub use config::Config;
pub use events::{AnnotationEvent, AnnotationEventReducer, MutationType, RenderSink};
pub use index::DocAnnotationIndex;
pub use sidebar::SidebarSession;
