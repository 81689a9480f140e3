//! Error types
//!
//! Library code returns [`QnaError`]; the CLI wraps it with `anyhow` context.

use std::path::PathBuf;

use crate::remote::OperationState;

/// Every failure a public operation can end with.
#[derive(Debug, thiserror::Error)]
pub enum QnaError {
    /// Input file is empty or unreadable as delimited text.
    #[error("format error: {0}")]
    Format(String),

    /// Transport, authentication or non-success response from the service.
    #[error("remote service unavailable ({context}): {message}")]
    RemoteUnavailable { context: String, message: String },

    /// Operation finished in a non-success state or ran out of polls.
    #[error("operation {operation_id} did not succeed (last state: {state}){}", detail_suffix(.detail))]
    OperationTimedOutOrFailed {
        operation_id: String,
        state: OperationState,
        detail: Option<String>,
    },

    /// A mutation with no additions, updates or deletions.
    #[error("mutation batch is empty")]
    EmptyMutation,

    /// The remote knowledge base holds several entries with the same answer.
    #[error("knowledge base contains duplicate answers: {}", .0.join(" | "))]
    DuplicateAnswers(Vec<String>),

    /// No knowledge base id is configured or known yet.
    #[error("no knowledge base id configured; run `qna create` or set knowledge_base.id")]
    MissingKnowledgeBase,

    /// The wait was interrupted between polls.
    #[error("wait for operation {operation_id} was cancelled")]
    Cancelled { operation_id: String },

    /// Interrupted outside an operation wait (Ctrl-C or the deadline).
    #[error("interrupted before the command finished")]
    Interrupted,

    /// A caller-supplied argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, QnaError>;

impl QnaError {
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn remote(context: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::RemoteUnavailable {
            context: context.into(),
            message: message.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {}", d),
        None => String::new(),
    }
}
