//! Knowledge base service
//!
//! Ties the pipeline together for each public operation:
//!
//! ```text
//! add/update:  snapshot -> reconcile -> submit -> monitor
//! create:      create -> monitor -> query key
//! train/ask:   query (-> training feedback)
//! ```
//!
//! The backend is handed in by the caller; nothing here is global.

use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::monitor::{CancelSignal, OperationMonitor};
use super::reconcile::{reconcile, MutationBatch};
use super::record::AnswerRecord;
use super::trainer::TrainReport;
use super::{query, snapshot, submit, trainer};
use crate::error::{QnaError, Result};
use crate::remote::{Candidate, KnowledgeBaseIdentity, OperationHandle, QnaBackend, Slice};

/// Outcome of an add, update or entry deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReport {
    pub additions: usize,
    pub updates: usize,
    pub deletions: usize,
    pub operation: OperationHandle,
}

impl MutationReport {
    fn new(batch: &MutationBatch, operation: OperationHandle) -> Self {
        Self {
            additions: batch.additions.len(),
            updates: batch.updates.len(),
            deletions: batch.deletions.len(),
            operation,
        }
    }
}

/// Public operations against one knowledge base
pub struct QnaService<B: QnaBackend> {
    backend: B,
    kb_id: Option<String>,
    query_endpoint: String,
    query_key: OnceCell<String>,
    monitor: OperationMonitor,
    reject_duplicate_answers: bool,
    cancel: CancelSignal,
}

impl<B: QnaBackend> QnaService<B> {
    pub fn new(backend: B, query_endpoint: impl Into<String>) -> Self {
        Self {
            backend,
            kb_id: None,
            query_endpoint: query_endpoint.into(),
            query_key: OnceCell::new(),
            monitor: OperationMonitor::default(),
            reject_duplicate_answers: false,
            cancel: CancelSignal::never(),
        }
    }

    pub fn with_kb_id(mut self, kb_id: Option<String>) -> Self {
        self.kb_id = kb_id;
        self
    }

    /// Use a known query key instead of looking it up
    pub fn with_query_key(mut self, key: Option<String>) -> Self {
        self.query_key = match key {
            Some(key) => OnceCell::new_with(Some(key)),
            None => OnceCell::new(),
        };
        self
    }

    pub fn with_monitor(mut self, monitor: OperationMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fail instead of keeping the first entry when answers are duplicated
    pub fn reject_duplicate_answers(mut self, reject: bool) -> Self {
        self.reject_duplicate_answers = reject;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn kb_id(&self) -> Result<&str> {
        self.kb_id.as_deref().ok_or(QnaError::MissingKnowledgeBase)
    }

    /// Identity used for runtime calls; fetches the query key once
    pub async fn identity(&self) -> Result<KnowledgeBaseIdentity> {
        let id = self.kb_id()?.to_string();
        let query_key = self
            .query_key
            .get_or_try_init(|| self.backend.get_query_key())
            .await?
            .clone();

        Ok(KnowledgeBaseIdentity {
            id,
            query_endpoint: self.query_endpoint.clone(),
            query_key,
        })
    }

    /// Create a knowledge base seeded with `records`
    ///
    /// On success the new id becomes this service's knowledge base.
    pub async fn create(&mut self, name: &str, records: &[AnswerRecord]) -> Result<KnowledgeBaseIdentity> {
        let cancel = self.cancel.clone();
        cancel.guard(self.create_inner(name, records)).await
    }

    async fn create_inner(&mut self, name: &str, records: &[AnswerRecord]) -> Result<KnowledgeBaseIdentity> {
        info!(name, entries = records.len(), "creating knowledge base");
        let op = self.backend.create_knowledge_base(name, records).await?;
        let op = self.monitor.monitor(&self.backend, op, &self.cancel).await?;

        let location = op.resource_location.ok_or_else(|| {
            QnaError::remote(
                "create knowledge base",
                format!("operation {} succeeded without a resource location", op.operation_id),
            )
        })?;
        let kb_id = location.replace("/knowledgebases/", "");
        info!(%kb_id, "knowledge base created");

        self.kb_id = Some(kb_id);
        self.identity().await
    }

    /// Add records; questions of existing answers are appended
    pub async fn add(&self, records: &[AnswerRecord], slice: Slice) -> Result<MutationReport> {
        self.cancel.guard(self.modify(records, slice, false)).await
    }

    /// Add records; questions of existing answers are replaced
    pub async fn update(&self, records: &[AnswerRecord], slice: Slice) -> Result<MutationReport> {
        self.cancel.guard(self.modify(records, slice, true)).await
    }

    async fn modify(
        &self,
        records: &[AnswerRecord],
        slice: Slice,
        overwrite_questions: bool,
    ) -> Result<MutationReport> {
        let kb_id = self.kb_id()?;
        let snapshot = snapshot::fetch(&self.backend, kb_id, slice).await?;

        let duplicates = snapshot.duplicate_answers();
        if !duplicates.is_empty() {
            if self.reject_duplicate_answers {
                return Err(QnaError::DuplicateAnswers(duplicates));
            }
            warn!(count = duplicates.len(), "duplicate answers in knowledge base; first entry is updated");
        }

        let batch = reconcile(records, &snapshot, overwrite_questions);
        self.apply(kb_id, batch).await
    }

    /// Delete entries by id
    pub async fn delete_entries(&self, ids: Vec<i32>) -> Result<MutationReport> {
        let kb_id = self.kb_id()?;
        self.cancel
            .guard(self.apply(kb_id, MutationBatch::deletions(ids)))
            .await
    }

    async fn apply(&self, kb_id: &str, batch: MutationBatch) -> Result<MutationReport> {
        let op = submit::submit(&self.backend, kb_id, &batch).await?;
        let op = self.monitor.monitor(&self.backend, op, &self.cancel).await?;
        Ok(MutationReport::new(&batch, op))
    }

    pub async fn train(&self, records: &[AnswerRecord], slice: Slice) -> Result<TrainReport> {
        self.cancel
            .guard(async {
                let kb = self.identity().await?;
                trainer::train(&self.backend, &kb, records, slice, &self.cancel).await
            })
            .await
    }

    pub async fn ask(&self, question: &str, slice: Slice, top: usize) -> Result<Vec<Candidate>> {
        self.cancel
            .guard(async {
                let kb = self.identity().await?;
                query::ask(&self.backend, &kb, question, slice, top).await
            })
            .await
    }

    /// Publish the test slice to production
    pub async fn publish(&self) -> Result<()> {
        let kb_id = self.kb_id()?;
        self.cancel
            .guard(self.backend.publish_knowledge_base(kb_id))
            .await?;
        info!(kb_id, "knowledge base published");
        Ok(())
    }

    pub async fn delete_knowledge_base(&self) -> Result<()> {
        let kb_id = self.kb_id()?;
        self.cancel
            .guard(self.backend.delete_knowledge_base(kb_id))
            .await?;
        info!(kb_id, "knowledge base deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::remote::mock::MockBackend;
    use crate::remote::{OperationState, RemoteEntry};

    fn service(backend: MockBackend) -> QnaService<MockBackend> {
        QnaService::new(backend, "http://localhost/qnamaker")
            .with_monitor(OperationMonitor::new(Duration::ZERO, 20))
    }

    fn rec(answer: &str, questions: &[&str]) -> AnswerRecord {
        AnswerRecord::new(answer, questions.iter().map(|q| q.to_string()).collect())
    }

    fn entry(id: i32, answer: &str, questions: &[&str]) -> RemoteEntry {
        RemoteEntry {
            id,
            answer: answer.to_string(),
            questions: questions.iter().map(|q| q.to_string()).collect(),
            source: None,
            metadata: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_then_ask_end_to_end() {
        let mut svc = service(MockBackend::new());
        let identity = svc
            .create("faq", &[rec("We open at nine.", &["When do you open?"])])
            .await
            .unwrap();

        assert_eq!(identity.id, "kb-mock");
        assert_eq!(identity.query_key, "mock-query-key");

        let answers = svc
            .ask("When do you open?", Slice::Test, query::DEFAULT_TOP)
            .await
            .unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].answer, "We open at nine.");
    }

    #[tokio::test]
    async fn test_query_key_fetched_once() {
        let svc = service(MockBackend::new()).with_kb_id(Some("kb".into()));
        svc.ask("a", Slice::Test, 1).await.unwrap();
        svc.ask("b", Slice::Test, 1).await.unwrap();
        assert_eq!(svc.backend().calls.lock().unwrap().query_key, 1);
    }

    #[tokio::test]
    async fn test_configured_query_key_skips_lookup() {
        let svc = service(MockBackend::new())
            .with_kb_id(Some("kb".into()))
            .with_query_key(Some("given".into()));
        let identity = svc.identity().await.unwrap();
        assert_eq!(identity.query_key, "given");
        assert_eq!(svc.backend().calls.lock().unwrap().query_key, 0);
    }

    #[tokio::test]
    async fn test_add_merges_and_update_replaces() {
        let backend = MockBackend::with_entries(vec![entry(1, "A", &["a1"])]);
        let svc = service(backend).with_kb_id(Some("kb".into()));

        let report = svc
            .add(&[rec("A", &["a2"]), rec("B", &["b1"])], Slice::Test)
            .await
            .unwrap();
        assert_eq!((report.additions, report.updates), (1, 1));
        assert_eq!(report.operation.state, OperationState::Succeeded);

        let entries = svc.backend().entries();
        assert_eq!(entries[0].questions, vec!["a1".to_string(), "a2".to_string()]);
        assert_eq!(entries[1].answer, "B");

        svc.update(&[rec("A", &["only"])], Slice::Test).await.unwrap();
        assert_eq!(svc.backend().entries()[0].questions, vec!["only".to_string()]);
        assert_eq!(svc.backend().calls.lock().unwrap().download, 2);
    }

    #[tokio::test]
    async fn test_no_records_is_empty_mutation() {
        let svc = service(MockBackend::new()).with_kb_id(Some("kb".into()));
        let err = svc.add(&[], Slice::Test).await.unwrap_err();
        assert!(matches!(err, QnaError::EmptyMutation));
        assert_eq!(svc.backend().calls.lock().unwrap().update, 0);
    }

    #[tokio::test]
    async fn test_duplicate_policy() {
        let entries = vec![entry(1, "A", &["x"]), entry(2, "A", &["y"])];

        let lenient = service(MockBackend::with_entries(entries.clone())).with_kb_id(Some("kb".into()));
        lenient.add(&[rec("A", &["z"])], Slice::Test).await.unwrap();
        assert_eq!(lenient.backend().last_batch().unwrap().updates[0].id, 1);

        let strict = service(MockBackend::with_entries(entries))
            .with_kb_id(Some("kb".into()))
            .reject_duplicate_answers(true);
        let err = strict.add(&[rec("A", &["z"])], Slice::Test).await.unwrap_err();
        assert!(matches!(err, QnaError::DuplicateAnswers(ref a) if a == &vec!["A".to_string()]));
        assert_eq!(strict.backend().calls.lock().unwrap().update, 0);
    }

    #[tokio::test]
    async fn test_failed_update_surfaces_operation_error() {
        let backend = MockBackend::new();
        backend.script(vec![OperationState::Failed]);
        let svc = service(backend).with_kb_id(Some("kb".into()));

        let err = svc.add(&[rec("A", &["q"])], Slice::Test).await.unwrap_err();
        assert!(matches!(
            err,
            QnaError::OperationTimedOutOrFailed { ref operation_id, .. } if operation_id == "op-update"
        ));
    }

    #[tokio::test]
    async fn test_delete_entries() {
        let backend = MockBackend::with_entries(vec![entry(1, "A", &["a"]), entry(2, "B", &["b"])]);
        let svc = service(backend).with_kb_id(Some("kb".into()));

        let report = svc.delete_entries(vec![1]).await.unwrap();
        assert_eq!(report.deletions, 1);
        let remaining = svc.backend().entries();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, 2);
    }

    #[tokio::test]
    async fn test_operations_need_kb_id() {
        let svc = service(MockBackend::new());
        assert!(matches!(svc.publish().await, Err(QnaError::MissingKnowledgeBase)));
        assert!(matches!(
            svc.ask("q", Slice::Test, 1).await,
            Err(QnaError::MissingKnowledgeBase)
        ));
        assert_eq!(svc.backend().calls.lock().unwrap().publish, 0);
    }

    #[tokio::test]
    async fn test_publish_and_delete() {
        let svc = service(MockBackend::new()).with_kb_id(Some("kb".into()));
        svc.publish().await.unwrap();
        svc.delete_knowledge_base().await.unwrap();
        let calls = svc.backend().calls.lock().unwrap();
        assert_eq!((calls.publish, calls.delete), (1, 1));
    }

    #[tokio::test]
    async fn test_interrupted_train_sends_no_feedback() {
        let (cancel_handle, signal) = CancelSignal::channel();
        let svc = service(MockBackend::with_entries(vec![entry(1, "A", &["a"])]))
            .with_kb_id(Some("kb".into()))
            .with_cancel(signal);
        cancel_handle.cancel();

        let err = svc.train(&[rec("A", &["a"])], Slice::Test).await.unwrap_err();
        assert!(matches!(err, QnaError::Interrupted));
        let calls = svc.backend().calls.lock().unwrap();
        assert_eq!((calls.query, calls.train), (0, 0));
    }
}
