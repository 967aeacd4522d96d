//! Collaborator interfaces
//!
//! The sidebar core does not talk to the sync backend itself. The
//! application provides these traits: one to resolve the user and fetch
//! document metadata, one to attach change listeners.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::annotations::AnnotationKind;
use crate::events::AnnotationEvent;
use crate::metadata::{DocMeta, UserProfile};

/// Callback invoked by a listener for every change
pub type EventCallback = Arc<dyn Fn(AnnotationEvent) + Send + Sync>;

/// Callback invoked for every group doc meta shared with the user
pub type DocMetaCallback = Arc<dyn Fn(DocMeta) + Send + Sync>;

/// Access to the document metadata store
#[async_trait]
pub trait DocMetaBackend: Send + Sync {
    /// The signed-in user, if any
    async fn current_user_profile(&self) -> anyhow::Result<Option<UserProfile>>;

    /// Fetch the doc meta of the document being viewed
    async fn fetch_doc_meta(&self, fingerprint: &str) -> anyhow::Result<DocMeta>;

    /// Doc metas of the same document shared through groups
    async fn group_doc_metas(&self, _fingerprint: &str) -> anyhow::Result<Vec<DocMeta>> {
        Ok(Vec::new())
    }

    /// Deliver group doc metas now and as they are shared later
    ///
    /// The default delivers `group_doc_metas` once and returns no
    /// registration. Backends with a live subscription return a
    /// registration that stops delivery when dropped.
    async fn watch_group_doc_metas(
        &self,
        fingerprint: &str,
        callback: DocMetaCallback,
    ) -> anyhow::Result<Option<ListenerRegistration>> {
        for doc_meta in self.group_doc_metas(fingerprint).await? {
            callback(doc_meta);
        }
        Ok(None)
    }
}

/// Attaches per-kind change listeners to a doc meta
pub trait AnnotationListeners: Send + Sync {
    /// Start delivering `kind` changes of `doc_meta` to `callback`
    ///
    /// Events must stop once the returned registration is dropped.
    fn register(
        &self,
        doc_meta: Arc<DocMeta>,
        kind: AnnotationKind,
        callback: EventCallback,
    ) -> anyhow::Result<ListenerRegistration>;
}

/// Handle to an attached listener; unregisters on drop
pub struct ListenerRegistration {
    id: Uuid,
    /// `None` for a group doc meta subscription
    kind: Option<AnnotationKind>,
    unregister: Option<Box<dyn FnOnce() + Send>>,
}

impl ListenerRegistration {
    pub fn new(kind: AnnotationKind, unregister: impl FnOnce() + Send + 'static) -> Self {
        Self::with_kind(Some(kind), unregister)
    }

    /// Registration of a group doc meta subscription
    pub fn group_doc_metas(unregister: impl FnOnce() + Send + 'static) -> Self {
        Self::with_kind(None, unregister)
    }

    fn with_kind(kind: Option<AnnotationKind>, unregister: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            unregister: Some(Box::new(unregister)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Annotation kind of the listener, `None` for a group subscription
    pub fn kind(&self) -> Option<AnnotationKind> {
        self.kind
    }

    /// Detach the listener now
    pub fn unregister(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(unregister) = self.unregister.take() {
            match self.kind {
                Some(kind) => tracing::debug!("Unregistering {} listener {}", kind, self.id),
                None => tracing::debug!("Unregistering group doc meta subscription {}", self.id),
            }
            unregister();
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("attached", &self.unregister.is_some())
            .finish()
    }
}
