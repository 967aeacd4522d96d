//! Sidebar session
//!
//! Wires listeners to the reducer for one open document. Listener callbacks
//! only enqueue; a single task drains the queue and applies each event to
//! completion before taking the next one.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::annotations::{convert, AnnotationKind, DocAnnotation};
use crate::config::Config;
use crate::events::{AnnotationEvent, AnnotationEventReducer, MutationType, RenderSink, WatchSink};
use crate::metadata::{AreaHighlight, Author, DocMeta, TextHighlight, UserProfile};

use super::collaborators::{AnnotationListeners, DocMetaBackend, DocMetaCallback, ListenerRegistration};
use super::error::{Result, SessionError};

type Registrations = Arc<Mutex<Vec<ListenerRegistration>>>;

/// An event tagged with the doc meta whose listener produced it
struct Envelope {
    source: usize,
    event: AnnotationEvent,
}

/// Forwards renders to the view and keeps the latest for `snapshot()`
struct SessionSink {
    latest: WatchSink,
    view: Arc<dyn RenderSink>,
}

impl RenderSink for SessionSink {
    fn render(&self, annotations: Arc<[DocAnnotation]>) {
        self.latest.render(Arc::clone(&annotations));
        self.view.render(annotations);
    }
}

/// The annotation sidebar of one open document
pub struct SidebarSession {
    id: Uuid,
    fingerprint: String,
    registrations: Registrations,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    snapshots: watch::Receiver<Arc<[DocAnnotation]>>,
}

impl SidebarSession {
    /// Load the document's annotations and start listening for changes
    ///
    /// Nothing is published to `sink` unless the primary listeners attach.
    pub async fn open(
        config: &Config,
        backend: Arc<dyn DocMetaBackend>,
        listeners: Arc<dyn AnnotationListeners>,
        sink: Arc<dyn RenderSink>,
        fingerprint: &str,
    ) -> Result<Self> {
        let id = Uuid::new_v4();

        let profile = backend
            .current_user_profile()
            .await
            .map_err(SessionError::Profile)?;

        let doc_meta = backend
            .fetch_doc_meta(fingerprint)
            .await
            .map_err(|source| SessionError::DocMeta {
                fingerprint: fingerprint.to_string(),
                source,
            })?;

        let (latest, snapshots) = WatchSink::new();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let registrations: Registrations = Arc::new(Mutex::new(Vec::new()));

        let mut event_loop = EventLoop {
            reducer: AnnotationEventReducer::new(Arc::new(SessionSink { latest, view: sink })),
            docs: Vec::new(),
            listeners,
            registrations: Arc::clone(&registrations),
            events_tx,
        };

        // authors are stamped locally; nothing is written back
        let author = profile.as_ref().map(UserProfile::to_author);
        event_loop.attach(doc_meta, author.as_ref())?;

        let (group_tx, mut group_rx) = mpsc::unbounded_channel();
        if profile.is_some() && config.group_doc_metas {
            let callback: DocMetaCallback = Arc::new(move |doc_meta: DocMeta| {
                if group_tx.send(doc_meta).is_err() {
                    tracing::debug!("Dropping group doc meta after sidebar shutdown");
                }
            });

            match backend.watch_group_doc_metas(fingerprint, callback).await {
                Ok(Some(subscription)) => registrations.lock().push(subscription),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to watch group doc metas for {}: {}", fingerprint, e);
                }
            }
        }

        // group doc metas delivered while subscribing are attached before open returns
        while let Ok(group_doc) = group_rx.try_recv() {
            event_loop.attach_group(group_doc);
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(event_loop.run(events_rx, group_rx, shutdown_rx));

        let session = Self {
            id,
            fingerprint: fingerprint.to_string(),
            registrations,
            shutdown: Some(shutdown_tx),
            task: Some(task),
            snapshots,
        };

        tracing::info!(
            "Opened annotation sidebar {} for {} with {} listeners",
            session.id,
            session.fingerprint,
            session.listener_count()
        );

        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Number of attached annotation listeners
    pub fn listener_count(&self) -> usize {
        self.registrations
            .lock()
            .iter()
            .filter(|registration| registration.kind().is_some())
            .count()
    }

    /// Latest published sidebar records
    pub fn snapshot(&self) -> Arc<[DocAnnotation]> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Receiver notified on every publish
    pub fn subscribe(&self) -> watch::Receiver<Arc<[DocAnnotation]>> {
        self.snapshots.clone()
    }

    /// Detach listeners and stop the event loop
    ///
    /// Once this returns no further event is applied or published; events
    /// still queued are discarded.
    pub async fn close(mut self) -> Result<()> {
        self.detach_all();

        if let Some(shutdown) = self.shutdown.take() {
            // the loop may already be gone
            let _ = shutdown.send(());
        }

        if let Some(task) = self.task.take() {
            task.await?;
        }

        // a group doc meta may have been attached while shutting down
        self.detach_all();

        tracing::info!("Closed annotation sidebar {} for {}", self.id, self.fingerprint);
        Ok(())
    }

    fn detach_all(&self) {
        // unregister outside the lock
        let registrations = std::mem::take(&mut *self.registrations.lock());
        drop(registrations);
    }
}

impl Drop for SidebarSession {
    fn drop(&mut self) {
        self.detach_all();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// State owned by the event loop task
struct EventLoop {
    reducer: AnnotationEventReducer,
    /// Attached doc metas; an envelope's `source` indexes into this
    docs: Vec<DocMeta>,
    listeners: Arc<dyn AnnotationListeners>,
    registrations: Registrations,
    events_tx: mpsc::UnboundedSender<Envelope>,
}

impl EventLoop {
    /// Register listeners on a doc meta, then publish its annotations
    fn attach(&mut self, doc_meta: DocMeta, author: Option<&Author>) -> Result<()> {
        let source = self.docs.len();
        let registrations = register_all(self.listeners.as_ref(), &doc_meta, source, &self.events_tx)?;

        let mut records = convert::doc_meta_annotations(&doc_meta);
        if let Some(author) = author {
            convert::apply_author(&mut records, author);
        }

        self.registrations.lock().extend(registrations);
        self.docs.push(doc_meta);
        self.reducer.load(records);
        Ok(())
    }

    fn attach_group(&mut self, doc_meta: DocMeta) {
        let fingerprint = doc_meta.fingerprint().to_string();
        if let Err(e) = self.attach(doc_meta, None) {
            tracing::warn!("Failed to handle group doc meta for {}: {}", fingerprint, e);
        }
    }

    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<Envelope>,
        mut group_docs: mpsc::UnboundedReceiver<DocMeta>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        let mut group_docs_open = true;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => break,

                envelope = events.recv() => {
                    let Some(Envelope { source, event }) = envelope else {
                        break;
                    };
                    self.apply(source, &event);
                }

                group_doc = group_docs.recv(), if group_docs_open => match group_doc {
                    Some(group_doc) => self.attach_group(group_doc),
                    None => group_docs_open = false,
                },
            }
        }

        tracing::debug!("Annotation event loop stopped");
    }

    fn apply(&mut self, source: usize, event: &AnnotationEvent) {
        let Some(doc_meta) = self.docs.get_mut(source) else {
            tracing::warn!("Event {} from unknown doc meta {}", event.id, source);
            return;
        };

        mirror_highlight(doc_meta, event);
        let outcome = self.reducer.handle(doc_meta, event);
        tracing::debug!("{} {}: {:?}", event.kind, event.id, outcome);
    }
}

fn register_all(
    listeners: &dyn AnnotationListeners,
    doc_meta: &DocMeta,
    source: usize,
    tx: &mpsc::UnboundedSender<Envelope>,
) -> Result<Vec<ListenerRegistration>> {
    let handle = Arc::new(doc_meta.clone());
    let mut registrations = Vec::with_capacity(AnnotationKind::ALL.len());

    for kind in AnnotationKind::ALL {
        let tx = tx.clone();
        let callback = Arc::new(move |mut event: AnnotationEvent| {
            // the listener a change arrives on decides how it is handled
            if event.kind != kind {
                tracing::warn!("{} listener delivered {} event for {}", kind, event.kind, event.id);
                event.kind = kind;
            }

            if tx.send(Envelope { source, event }).is_err() {
                tracing::debug!("Dropping {} event after sidebar shutdown", kind);
            }
        });

        let registration = listeners
            .register(Arc::clone(&handle), kind, callback)
            .map_err(|source| SessionError::Register { kind, source })?;
        registrations.push(registration);
    }

    Ok(registrations)
}

/// Keep the local doc meta's highlights current
///
/// Comments and flashcards take their position from the parent highlight,
/// which may have been created after the session opened.
fn mirror_highlight(doc_meta: &mut DocMeta, event: &AnnotationEvent) {
    let page = event.page.num;

    match (event.kind, event.mutation) {
        (AnnotationKind::TextHighlight, MutationType::Delete) => {
            if let Some(page_meta) = doc_meta.page_metas.get_mut(&page) {
                page_meta.text_highlights.remove(&event.id);
            }
        }
        (AnnotationKind::AreaHighlight, MutationType::Delete) => {
            if let Some(page_meta) = doc_meta.page_metas.get_mut(&page) {
                page_meta.area_highlights.remove(&event.id);
            }
        }
        (AnnotationKind::TextHighlight, _) => {
            if let Some(highlight) = event
                .present_value()
                .and_then(|v| serde_json::from_value::<TextHighlight>(v.clone()).ok())
            {
                doc_meta
                    .page_mut(page)
                    .text_highlights
                    .insert(highlight.id.clone(), highlight);
            }
        }
        (AnnotationKind::AreaHighlight, _) => {
            if let Some(highlight) = event
                .present_value()
                .and_then(|v| serde_json::from_value::<AreaHighlight>(v.clone()).ok())
            {
                doc_meta
                    .page_mut(page)
                    .area_highlights
                    .insert(highlight.id.clone(), highlight);
            }
        }
        (AnnotationKind::Comment | AnnotationKind::Flashcard, _) => {}
    }
}
