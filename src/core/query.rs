//! Query façade
//!
//! Straight passthrough to the runtime query call. Ranking and scores come
//! from the service as-is.

use crate::error::{QnaError, Result};
use crate::remote::{Candidate, KnowledgeBaseIdentity, QnaBackend, Slice};

/// Default number of candidates returned by `ask`
pub const DEFAULT_TOP: usize = 1;

/// Ask one question against a slice
pub async fn ask<B: QnaBackend + ?Sized>(
    backend: &B,
    kb: &KnowledgeBaseIdentity,
    question: &str,
    slice: Slice,
    top: usize,
) -> Result<Vec<Candidate>> {
    if top == 0 {
        return Err(QnaError::invalid_argument(
            "number of answers must be at least 1",
        ));
    }
    backend.query(kb, question, slice, top).await
}
