//! Persistence collaborator: where documents are loaded from and saved to.
//!
//! The editor never blocks on storage. The host calls [`Persistence::save`]
//! with a snapshot taken by the engine and reports the outcome back through
//! `EngineCore::finish_save`; editing continues meanwhile. Futures are local
//! (not `Send`) because the browser runs everything on one thread.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use futures::future::LocalBoxFuture;

use crate::document::{Document, DocumentError};
use crate::error::ErrorCode;

/// Identifies a stored project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectRef(pub String);

/// Acknowledgement of a completed save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// Store-assigned revision of the saved document, if the store tracks one.
    pub revision: Option<u64>,
}

/// Storage failures.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("project not found: {0}")]
    NotFound(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("stored document rejected: {0}")]
    Document(#[from] DocumentError),
}

impl ErrorCode for PersistenceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_PROJECT_NOT_FOUND",
            Self::Unavailable(_) => "E_STORAGE_UNAVAILABLE",
            Self::Document(_) => "E_STORED_DOCUMENT",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Async document storage.
pub trait Persistence {
    fn load(&self, project: &ProjectRef) -> LocalBoxFuture<'_, Result<Document, PersistenceError>>;

    fn save(&self, project: &ProjectRef, document: Document) -> LocalBoxFuture<'_, Result<Ack, PersistenceError>>;
}

/// Outcome of the most recent save, mirrored in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    /// A snapshot has been handed to storage.
    Saving,
    Saved(Ack),
    Failed {
        code: &'static str,
        message: String,
        retryable: bool,
    },
}

impl SaveStatus {
    #[must_use]
    pub fn from_result(result: &Result<Ack, PersistenceError>) -> Self {
        match result {
            Ok(ack) => Self::Saved(ack.clone()),
            Err(e) => Self::Failed { code: e.error_code(), message: e.to_string(), retryable: e.retryable() },
        }
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        matches!(self, Self::Saving)
    }
}
