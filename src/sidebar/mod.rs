//! Annotation sidebar session
//!
//! Provides:
//! - Collaborator traits for the doc-meta store and change listeners
//! - `SidebarSession`, which loads a document's annotations, listens for
//!   changes on its doc meta (and group doc metas for signed-in users) and
//!   publishes the sorted records to a render sink
//!
//! # Lifecycle
//!
//! 1. Resolve the user profile
//! 2. Fetch the doc meta
//! 3. Register one listener per annotation kind, then publish its annotations
//! 4. Subscribe to group doc metas, attaching listeners as they are shared
//! 5. Apply events one at a time until `close`

mod collaborators;
mod error;
mod session;

pub use collaborators::{AnnotationListeners, DocMetaBackend, DocMetaCallback, EventCallback, ListenerRegistration};
pub use error::{Result, SessionError};
pub use session::SidebarSession;
