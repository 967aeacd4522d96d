//! Sidebar session errors

use thiserror::Error;

use crate::annotations::AnnotationKind;

/// Errors opening or closing a sidebar session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to resolve user profile: {0}")]
    Profile(#[source] anyhow::Error),

    #[error("Failed to fetch doc meta {fingerprint}: {source}")]
    DocMeta {
        fingerprint: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to register {kind} listener: {source}")]
    Register {
        kind: AnnotationKind,
        #[source]
        source: anyhow::Error,
    },

    #[error("Annotation event loop failed: {0}")]
    EventLoop(#[from] tokio::task::JoinError),
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
