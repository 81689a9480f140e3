//! Mutation submission

use tracing::info;

use super::reconcile::MutationBatch;
use crate::error::{QnaError, Result};
use crate::remote::{OperationHandle, QnaBackend};

/// Send a batch as a single update request
///
/// Empty batches are rejected before anything is sent.
pub async fn submit<B: QnaBackend + ?Sized>(
    backend: &B,
    kb_id: &str,
    batch: &MutationBatch,
) -> Result<OperationHandle> {
    if batch.is_empty() {
        return Err(QnaError::EmptyMutation);
    }

    info!(
        kb_id,
        additions = batch.additions.len(),
        updates = batch.updates.len(),
        deletions = batch.deletions.len(),
        "submitting mutation"
    );
    backend.update_knowledge_base(kb_id, batch).await
}
