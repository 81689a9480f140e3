//! In-memory backend for tests
//!
//! Keeps a tiny knowledge base in memory and counts the calls made against it.
//! Queries match questions exactly; operation status is scripted.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::error::QnaError;

#[derive(Debug, Default)]
pub struct Calls {
    pub create: usize,
    pub delete: usize,
    pub publish: usize,
    pub download: usize,
    pub update: usize,
    pub status: usize,
    pub query: usize,
    pub train: usize,
    pub query_key: usize,
}

#[derive(Default)]
struct State {
    entries: Vec<RemoteEntry>,
    next_id: i32,
    /// States returned by successive status polls; the last one repeats
    script: VecDeque<OperationState>,
    /// Canned query answers used instead of the stored entries
    canned: Option<Vec<Candidate>>,
    last_batch: Option<MutationBatch>,
    trained: Vec<FeedbackRecord>,
    fail_download: bool,
}

#[derive(Default)]
pub struct MockBackend {
    state: Mutex<State>,
    pub calls: Mutex<Calls>,
}

impl MockBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().next_id = 1;
        backend
    }

    pub fn with_entries(entries: Vec<RemoteEntry>) -> Self {
        let backend = Self::new();
        {
            let mut state = backend.state.lock().unwrap();
            state.next_id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
            state.entries = entries;
        }
        backend
    }

    /// Script the states returned by successive status polls
    pub fn script(&self, states: Vec<OperationState>) {
        self.state.lock().unwrap().script = states.into();
    }

    pub fn canned_answers(&self, answers: Vec<Candidate>) {
        self.state.lock().unwrap().canned = Some(answers);
    }

    pub fn fail_download(&self) {
        self.state.lock().unwrap().fail_download = true;
    }

    pub fn entries(&self) -> Vec<RemoteEntry> {
        self.state.lock().unwrap().entries.clone()
    }

    pub fn last_batch(&self) -> Option<MutationBatch> {
        self.state.lock().unwrap().last_batch.clone()
    }

    pub fn trained(&self) -> Vec<FeedbackRecord> {
        self.state.lock().unwrap().trained.clone()
    }

    fn add_records(state: &mut State, records: &[AnswerRecord]) {
        for record in records {
            let id = state.next_id;
            state.next_id += 1;
            state.entries.push(RemoteEntry {
                id,
                answer: record.answer.clone(),
                questions: record.questions.clone(),
                source: Some(EDITORIAL_SOURCE.to_string()),
                metadata: Vec::new(),
            });
        }
    }

    fn apply(state: &mut State, batch: &MutationBatch) {
        Self::add_records(state, &batch.additions);
        for update in &batch.updates {
            if let Some(entry) = state.entries.iter_mut().find(|e| e.id == update.id) {
                entry.questions = update.resulting_questions(&entry.questions);
            }
        }
        state.entries.retain(|e| !batch.deletions.contains(&e.id));
    }

    fn accepted(id: &str) -> OperationHandle {
        OperationHandle::new(id, OperationState::NotStarted)
    }
}

#[async_trait]
impl QnaBackend for MockBackend {
    async fn create_knowledge_base(
        &self,
        _name: &str,
        records: &[AnswerRecord],
    ) -> Result<OperationHandle> {
        self.calls.lock().unwrap().create += 1;
        let mut state = self.state.lock().unwrap();
        state.entries.clear();
        Self::add_records(&mut state, records);
        Ok(Self::accepted("op-create"))
    }

    async fn delete_knowledge_base(&self, _kb_id: &str) -> Result<()> {
        self.calls.lock().unwrap().delete += 1;
        self.state.lock().unwrap().entries.clear();
        Ok(())
    }

    async fn publish_knowledge_base(&self, _kb_id: &str) -> Result<()> {
        self.calls.lock().unwrap().publish += 1;
        Ok(())
    }

    async fn download_knowledge_base(
        &self,
        _kb_id: &str,
        _slice: Slice,
    ) -> Result<Vec<RemoteEntry>> {
        self.calls.lock().unwrap().download += 1;
        let state = self.state.lock().unwrap();
        if state.fail_download {
            return Err(QnaError::remote("download knowledge base", "connection refused"));
        }
        Ok(state.entries.clone())
    }

    async fn update_knowledge_base(
        &self,
        _kb_id: &str,
        batch: &MutationBatch,
    ) -> Result<OperationHandle> {
        self.calls.lock().unwrap().update += 1;
        let mut state = self.state.lock().unwrap();
        Self::apply(&mut state, batch);
        state.last_batch = Some(batch.clone());
        Ok(Self::accepted("op-update"))
    }

    async fn get_operation_status(&self, operation_id: &str) -> Result<OperationHandle> {
        self.calls.lock().unwrap().status += 1;
        let mut state = self.state.lock().unwrap();
        let next = if state.script.len() > 1 {
            state.script.pop_front()
        } else {
            state.script.front().copied()
        };
        let mut handle = OperationHandle::new(
            operation_id,
            next.unwrap_or(OperationState::Succeeded),
        );
        if operation_id == "op-create" {
            handle.resource_location = Some("/knowledgebases/kb-mock".to_string());
        }
        Ok(handle)
    }

    async fn query(
        &self,
        _kb: &KnowledgeBaseIdentity,
        question: &str,
        _slice: Slice,
        top: usize,
    ) -> Result<Vec<Candidate>> {
        self.calls.lock().unwrap().query += 1;
        let state = self.state.lock().unwrap();
        if let Some(canned) = &state.canned {
            return Ok(canned.iter().take(top).cloned().collect());
        }
        Ok(state
            .entries
            .iter()
            .filter(|e| e.questions.iter().any(|q| q == question))
            .take(top)
            .map(|e| Candidate {
                id: e.id,
                answer: e.answer.clone(),
                questions: e.questions.clone(),
                score: 100.0,
            })
            .collect())
    }

    async fn submit_training_feedback(
        &self,
        _kb: &KnowledgeBaseIdentity,
        records: &[FeedbackRecord],
    ) -> Result<()> {
        self.calls.lock().unwrap().train += 1;
        self.state
            .lock()
            .unwrap()
            .trained
            .extend(records.iter().cloned());
        Ok(())
    }

    async fn get_query_key(&self) -> Result<String> {
        self.calls.lock().unwrap().query_key += 1;
        Ok("mock-query-key".to_string())
    }
}
