use ohako_client::ClientError;
use ohako_core::{OhakoError, RelationKind, SubjectId};
use thiserror::Error;

/// Errors that can occur in the sync core
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Gateway error: {0}")]
    Gateway(#[from] ClientError),

    #[error("Stale mutation on {kind}/{subject}: issued at v{issued}, now v{current}")]
    StaleMutation {
        kind: RelationKind,
        subject: SubjectId,
        issued: u64,
        current: u64,
    },

    #[error("Session changed while the request was in flight")]
    SessionChanged,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(#[from] OhakoError),
}

impl SyncError {
    /// Whether the failure came from the network layer
    pub fn is_network(&self) -> bool {
        matches!(self, SyncError::Gateway(e) if e.is_network())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
