//! Remote service module
//!
//! The knowledge base lives on a hosted service. Everything the core needs
//! from it goes through [`QnaBackend`]; [`HttpBackend`] is the REST
//! implementation.

mod client;
#[cfg(test)]
pub(crate) mod mock;
mod types;

use async_trait::async_trait;

use crate::core::reconcile::MutationBatch;
use crate::core::record::AnswerRecord;
use crate::error::Result;

pub use client::HttpBackend;
pub use types::*;

/// Identity of a created knowledge base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBaseIdentity {
    pub id: String,
    /// Runtime base URL used for queries and training
    pub query_endpoint: String,
    pub query_key: String,
}

/// Remote calls made by the core
///
/// Mutating calls return an [`OperationHandle`] that must be driven to
/// completion by the operation monitor.
#[async_trait]
pub trait QnaBackend: Send + Sync {
    /// Start creating a knowledge base seeded with `records`
    async fn create_knowledge_base(
        &self,
        name: &str,
        records: &[AnswerRecord],
    ) -> Result<OperationHandle>;

    async fn delete_knowledge_base(&self, kb_id: &str) -> Result<()>;

    /// Copy the test slice over the production slice
    async fn publish_knowledge_base(&self, kb_id: &str) -> Result<()>;

    /// Full contents of one slice
    async fn download_knowledge_base(&self, kb_id: &str, slice: Slice) -> Result<Vec<RemoteEntry>>;

    async fn update_knowledge_base(
        &self,
        kb_id: &str,
        batch: &MutationBatch,
    ) -> Result<OperationHandle>;

    async fn get_operation_status(&self, operation_id: &str) -> Result<OperationHandle>;

    /// Ranked answers for one question
    async fn query(
        &self,
        kb: &KnowledgeBaseIdentity,
        question: &str,
        slice: Slice,
        top: usize,
    ) -> Result<Vec<Candidate>>;

    async fn submit_training_feedback(
        &self,
        kb: &KnowledgeBaseIdentity,
        records: &[FeedbackRecord],
    ) -> Result<()>;

    /// Primary runtime key of the resource
    async fn get_query_key(&self) -> Result<String>;
}
